//! Atomic boundary around one workflow operation.
//!
//! # Invariants
//! - Either every write made inside `atomically` is kept or none is.
//! - Nested scopes are allowed; the outermost scope decides the commit.

use crate::repo::RepoError;
use log::warn;
use rusqlite::Connection;

const SAVEPOINT_NAME: &str = "qna_unit_of_work";

/// Runs a closure as one all-or-nothing unit.
pub trait UnitOfWork {
    fn atomically<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
        E: From<RepoError>;
}

/// Savepoint-based unit of work on a shared SQLite connection.
///
/// Savepoints nest, so a caller already inside a transaction keeps control
/// of the final commit.
pub struct SqliteUnitOfWork<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUnitOfWork<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl UnitOfWork for SqliteUnitOfWork<'_> {
    fn atomically<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
        E: From<RepoError>,
    {
        self.conn
            .execute_batch(&format!("SAVEPOINT {SAVEPOINT_NAME};"))
            .map_err(|err| E::from(RepoError::from(err)))?;

        match work() {
            Ok(value) => {
                self.conn
                    .execute_batch(&format!("RELEASE SAVEPOINT {SAVEPOINT_NAME};"))
                    .map_err(|err| E::from(RepoError::from(err)))?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = self.conn.execute_batch(&format!(
                    "ROLLBACK TO SAVEPOINT {SAVEPOINT_NAME}; RELEASE SAVEPOINT {SAVEPOINT_NAME};"
                )) {
                    warn!(
                        "event=unit_of_work_rollback module=repo status=error error={rollback_err}"
                    );
                }
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{SqliteUnitOfWork, UnitOfWork};
    use crate::repo::RepoError;
    use rusqlite::Connection;

    fn count(conn: &Connection) -> i64 {
        conn.query_row("SELECT COUNT(*) FROM t;", [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn failed_work_rolls_back_every_write() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (v INTEGER);").unwrap();
        let unit = SqliteUnitOfWork::new(&conn);

        let result: Result<(), RepoError> = unit.atomically(|| {
            conn.execute("INSERT INTO t (v) VALUES (1);", [])?;
            conn.execute("INSERT INTO t (v) VALUES (2);", [])?;
            Err(RepoError::InvalidData("boom".to_string()))
        });

        assert!(result.is_err());
        assert_eq!(count(&conn), 0);
    }

    #[test]
    fn successful_work_is_kept() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (v INTEGER);").unwrap();
        let unit = SqliteUnitOfWork::new(&conn);

        let inserted: Result<usize, RepoError> =
            unit.atomically(|| Ok(conn.execute("INSERT INTO t (v) VALUES (1);", [])?));

        assert_eq!(inserted.unwrap(), 1);
        assert_eq!(count(&conn), 1);
    }
}
