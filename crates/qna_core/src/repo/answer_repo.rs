//! Answer store contract and SQLite implementation.
//!
//! # Invariants
//! - `save` refuses answers not linked to a question.
//! - Answers of one question are always returned in id order.

use crate::model::answer::{Answer, AnswerId};
use crate::model::question::QuestionId;
use crate::repo::user_repo::parse_writer_columns;
use crate::repo::{bool_to_int, parse_deleted_flag, RepoError, RepoResult};
use rusqlite::{params, Connection, Row};

const ANSWER_SELECT_SQL: &str = "SELECT
    a.id,
    a.question_id,
    a.contents,
    a.is_deleted,
    a.created_at,
    a.updated_at,
    u.id AS writer_id,
    u.login AS writer_login,
    u.name AS writer_name,
    u.email AS writer_email
FROM answers a
JOIN users u ON u.id = a.writer_id";

pub trait AnswerStore {
    /// Inserts when `id` is `None`, updates otherwise; returns the stored row.
    fn save(&self, answer: &Answer) -> RepoResult<Answer>;
    fn find_by_id(&self, id: AnswerId) -> RepoResult<Option<Answer>>;
    fn find_by_question(&self, question_id: QuestionId) -> RepoResult<Vec<Answer>>;
}

pub struct SqliteAnswerStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAnswerStore<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl AnswerStore for SqliteAnswerStore<'_> {
    fn save(&self, answer: &Answer) -> RepoResult<Answer> {
        answer.validate()?;
        let question_id = answer.question_id.ok_or_else(|| {
            RepoError::InvalidData("answer is not linked to a question".to_string())
        })?;

        let id = match answer.id {
            None => {
                self.conn.execute(
                    "INSERT INTO answers (question_id, writer_id, contents, is_deleted)
                     VALUES (?1, ?2, ?3, ?4);",
                    params![
                        question_id,
                        answer.writer.id,
                        answer.contents.as_str(),
                        bool_to_int(answer.deleted),
                    ],
                )?;
                self.conn.last_insert_rowid()
            }
            Some(id) => {
                let changed = self.conn.execute(
                    "UPDATE answers
                     SET
                        contents = ?1,
                        is_deleted = ?2,
                        updated_at = (strftime('%s', 'now') * 1000)
                     WHERE id = ?3;",
                    params![answer.contents.as_str(), bool_to_int(answer.deleted), id],
                )?;
                if changed == 0 {
                    return Err(RepoError::NotFound {
                        entity: "answer",
                        id,
                    });
                }
                id
            }
        };

        self.find_by_id(id)?
            .ok_or_else(|| RepoError::InvalidData(format!("answer {id} missing after save")))
    }

    fn find_by_id(&self, id: AnswerId) -> RepoResult<Option<Answer>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ANSWER_SELECT_SQL} WHERE a.id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_answer_row(row)?));
        }
        Ok(None)
    }

    fn find_by_question(&self, question_id: QuestionId) -> RepoResult<Vec<Answer>> {
        load_answers_for_question(self.conn, question_id)
    }
}

/// Loads every answer of one question, tombstoned ones included.
pub(crate) fn load_answers_for_question(
    conn: &Connection,
    question_id: QuestionId,
) -> RepoResult<Vec<Answer>> {
    let mut stmt = conn.prepare(&format!(
        "{ANSWER_SELECT_SQL} WHERE a.question_id = ?1 ORDER BY a.id ASC;"
    ))?;
    let mut rows = stmt.query([question_id])?;
    let mut answers = Vec::new();
    while let Some(row) = rows.next()? {
        answers.push(parse_answer_row(row)?);
    }
    Ok(answers)
}

fn parse_answer_row(row: &Row<'_>) -> RepoResult<Answer> {
    let answer = Answer {
        id: Some(row.get("id")?),
        question_id: Some(row.get("question_id")?),
        writer: parse_writer_columns(row)?,
        contents: row.get("contents")?,
        deleted: parse_deleted_flag(row.get("is_deleted")?, "answers.is_deleted")?,
        created_at: Some(row.get("created_at")?),
        updated_at: Some(row.get("updated_at")?),
    };
    answer.validate()?;
    Ok(answer)
}
