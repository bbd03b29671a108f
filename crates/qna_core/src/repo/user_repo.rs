//! User store.
//!
//! Users are created and looked up only; the workflow never mutates them.

use crate::model::user::{User, UserId};
use crate::repo::{RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row};

const USER_SELECT_SQL: &str = "SELECT id, login, name, email FROM users";

pub trait UserStore {
    fn create(&self, login: &str, name: &str, email: Option<&str>) -> RepoResult<User>;
    fn find_by_id(&self, id: UserId) -> RepoResult<Option<User>>;
    fn find_by_login(&self, login: &str) -> RepoResult<Option<User>>;
}

pub struct SqliteUserStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserStore<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl UserStore for SqliteUserStore<'_> {
    fn create(&self, login: &str, name: &str, email: Option<&str>) -> RepoResult<User> {
        let login = login.trim();
        if login.is_empty() {
            return Err(RepoError::InvalidData("user login cannot be empty".to_string()));
        }

        self.conn.execute(
            "INSERT INTO users (login, name, email) VALUES (?1, ?2, ?3);",
            params![login, name, email],
        )?;
        let id = self.conn.last_insert_rowid();

        self.find_by_id(id)?.ok_or_else(|| {
            RepoError::InvalidData(format!("user {id} missing after insert"))
        })
    }

    fn find_by_id(&self, id: UserId) -> RepoResult<Option<User>> {
        let user = self
            .conn
            .query_row(
                &format!("{USER_SELECT_SQL} WHERE id = ?1;"),
                [id],
                parse_user_row,
            )
            .optional()?;
        Ok(user)
    }

    fn find_by_login(&self, login: &str) -> RepoResult<Option<User>> {
        let user = self
            .conn
            .query_row(
                &format!("{USER_SELECT_SQL} WHERE login = ?1;"),
                [login.trim()],
                parse_user_row,
            )
            .optional()?;
        Ok(user)
    }
}

fn parse_user_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get("id")?,
        login: row.get("login")?,
        name: row.get("name")?,
        email: row.get("email")?,
    })
}

/// Reads the `writer_*` columns produced by question/answer joins.
pub(crate) fn parse_writer_columns(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get("writer_id")?,
        login: row.get("writer_login")?,
        name: row.get("writer_name")?,
        email: row.get("writer_email")?,
    })
}
