//! Delete-history recorder contract and SQLite implementation.
//!
//! # Invariants
//! - One `save_all` call writes exactly one history row plus one child row
//!   per saved answer.
//! - History rows are append-only.

use crate::model::delete_history::{DeleteHistory, DeleteHistoryId, DeletedAnswer};
use crate::model::question::{Question, QuestionId};
use crate::model::user::User;
use crate::repo::{RepoError, RepoResult};
use rusqlite::{params, Connection};
use uuid::Uuid;

pub trait DeleteHistoryRecorder {
    /// Snapshots a deleted question and the answers it carries.
    fn save_all(&self, question: &Question, deleted_by: &User) -> RepoResult<DeleteHistoryId>;
    fn find_by_question(&self, question_id: QuestionId) -> RepoResult<Vec<DeleteHistory>>;
}

pub struct SqliteDeleteHistoryRecorder<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteDeleteHistoryRecorder<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn load_answers(&self, history_uuid: &str) -> RepoResult<Vec<DeletedAnswer>> {
        let mut stmt = self.conn.prepare(
            "SELECT answer_id, writer_id, contents
             FROM delete_history_answers
             WHERE history_uuid = ?1
             ORDER BY answer_id ASC;",
        )?;
        let rows = stmt.query_map([history_uuid], |row| {
            Ok(DeletedAnswer {
                answer_id: row.get("answer_id")?,
                writer_id: row.get("writer_id")?,
                contents: row.get("contents")?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}

impl DeleteHistoryRecorder for SqliteDeleteHistoryRecorder<'_> {
    fn save_all(&self, question: &Question, deleted_by: &User) -> RepoResult<DeleteHistoryId> {
        if !question.deleted {
            return Err(RepoError::InvalidData(
                "delete history requires a deleted question".to_string(),
            ));
        }
        let history = DeleteHistory::snapshot(question, deleted_by).ok_or_else(|| {
            RepoError::InvalidData("delete history requires a saved question".to_string())
        })?;
        let uuid = history.uuid.to_string();

        self.conn.execute(
            "INSERT INTO delete_histories (uuid, question_id, deleted_by, title, contents)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                uuid.as_str(),
                history.question_id,
                history.deleted_by,
                history.title.as_str(),
                history.contents.as_str(),
            ],
        )?;

        let mut insert_answer = self.conn.prepare(
            "INSERT INTO delete_history_answers (history_uuid, answer_id, writer_id, contents)
             VALUES (?1, ?2, ?3, ?4);",
        )?;
        for answer in &history.answers {
            insert_answer.execute(params![
                uuid.as_str(),
                answer.answer_id,
                answer.writer_id,
                answer.contents.as_str(),
            ])?;
        }

        Ok(history.uuid)
    }

    fn find_by_question(&self, question_id: QuestionId) -> RepoResult<Vec<DeleteHistory>> {
        let mut stmt = self.conn.prepare(
            "SELECT uuid, question_id, deleted_by, title, contents, created_at
             FROM delete_histories
             WHERE question_id = ?1
             ORDER BY created_at ASC, uuid ASC;",
        )?;
        let mut rows = stmt.query([question_id])?;
        let mut histories = Vec::new();

        while let Some(row) = rows.next()? {
            let uuid_text: String = row.get("uuid")?;
            let uuid = Uuid::parse_str(&uuid_text).map_err(|_| {
                RepoError::InvalidData(format!(
                    "invalid uuid value `{uuid_text}` in delete_histories.uuid"
                ))
            })?;
            histories.push(DeleteHistory {
                uuid,
                question_id: row.get("question_id")?,
                deleted_by: row.get("deleted_by")?,
                title: row.get("title")?,
                contents: row.get("contents")?,
                answers: self.load_answers(&uuid_text)?,
                created_at: Some(row.get("created_at")?),
            });
        }

        Ok(histories)
    }
}
