//! CLI smoke entry point.
//!
//! Prints core linkage info, then lists open questions when `QNA_DB_PATH`
//! points at a database. Logging starts only when `QNA_LOG_DIR` is set.

use log::info;
use qna_core::db::open_db;
use qna_core::{init_logging, QnaConfig, SqliteQnaWorkflow};
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("qna_core ping={}", qna_core::ping());
    println!("qna_core version={}", qna_core::core_version());

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("qna_cli error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = QnaConfig::from_env()?;
    if let Some(log_dir) = config.log_dir.as_deref() {
        init_logging(config.log_level, log_dir)?;
    }

    let Some(db_path) = config.db_path.as_deref() else {
        return Ok(());
    };

    let conn = open_db(db_path)?;
    let workflow = SqliteQnaWorkflow::sqlite(&conn).with_page_limits(config.page_limits);
    let page = workflow.find_page(&workflow.page_request(0, None))?;

    println!(
        "open_questions={} pages={}",
        page.total_elements,
        page.total_pages()
    );
    for question in &page.items {
        println!(
            "#{} [{} answers] {} ({})",
            question.id.unwrap_or_default(),
            question.live_answers().count(),
            question.title,
            question.writer.login
        );
    }
    info!(
        "event=cli_list module=cli status=ok returned={}",
        page.items.len()
    );
    Ok(())
}
