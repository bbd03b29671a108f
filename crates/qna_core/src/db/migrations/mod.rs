//! Q&A schema migrations.
//!
//! | Version | Name | Adds |
//! |---|---|---|
//! | 1 | `init` | `users`, `questions`, `answers` with soft-delete flags |
//! | 2 | `delete_history` | `delete_histories` audit rows and their answer snapshots |
//!
//! # Invariants
//! - Versions start at 1 and increase by exactly one.
//! - The applied version is mirrored to `PRAGMA user_version`.
//! - Pending migrations commit together; a failing step leaves the previous
//!   schema in place.
//! - Migrations only add tables/indexes; question and answer rows are never
//!   rewritten, so soft-deleted history survives upgrades.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

#[derive(Debug, Clone, Copy)]
struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "init",
        sql: include_str!("0001_init.sql"),
    },
    Migration {
        version: 2,
        name: "delete_history",
        sql: include_str!("0002_delete_history.sql"),
    },
];

/// Schema version this binary writes and understands.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Brings the Q&A schema up to `latest_version()`.
///
/// # Errors
/// - `DbError::UnsupportedSchemaVersion` when the file was written by a newer
///   binary; nothing is touched in that case.
/// - `DbError::Sqlite` when a step fails; the whole batch is rolled back.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let from_version = schema_version(conn)?;
    let latest = latest_version();
    if from_version > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: from_version,
            latest_supported: latest,
        });
    }

    let steps: Vec<&Migration> = pending(from_version).collect();
    if steps.is_empty() {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for migration in &steps {
        tx.execute_batch(migration.sql)?;
        tx.pragma_update(None, "user_version", migration.version)?;
        info!(
            "event=db_migrate_step module=db status=ok version={} name={}",
            migration.version, migration.name
        );
    }
    tx.commit()?;

    info!("event=db_migrate module=db status=ok from_version={from_version} to_version={latest}");
    Ok(())
}

fn pending(from_version: u32) -> impl Iterator<Item = &'static Migration> {
    MIGRATIONS
        .iter()
        .filter(move |migration| migration.version > from_version)
}

fn schema_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get::<_, u32>(0))?)
}
