//! Delete-history audit records.
//!
//! One record is written per successful question delete. The snapshot keeps
//! question text and the answers that delete tombstoned, nothing older.

use crate::model::answer::AnswerId;
use crate::model::question::{Question, QuestionId};
use crate::model::user::{User, UserId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable audit id, never reused.
pub type DeleteHistoryId = Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteHistory {
    pub uuid: DeleteHistoryId,
    pub question_id: QuestionId,
    pub deleted_by: UserId,
    pub title: String,
    pub contents: String,
    pub answers: Vec<DeletedAnswer>,
    /// Epoch milliseconds, filled in by storage.
    pub created_at: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletedAnswer {
    pub answer_id: AnswerId,
    pub writer_id: UserId,
    pub contents: String,
}

impl DeleteHistory {
    /// Snapshots a question that `deleted_by` has just tombstoned.
    ///
    /// Every answer carried by `question` is copied, so callers pass only the
    /// answers removed by this delete. Returns `None` for unsaved questions;
    /// answers without ids never reached storage and are skipped.
    pub fn snapshot(question: &Question, deleted_by: &User) -> Option<Self> {
        let question_id = question.id?;
        let answers = question
            .answers
            .iter()
            .filter_map(|answer| {
                Some(DeletedAnswer {
                    answer_id: answer.id?,
                    writer_id: answer.writer.id,
                    contents: answer.contents.clone(),
                })
            })
            .collect();

        Some(Self {
            uuid: Uuid::new_v4(),
            question_id,
            deleted_by: deleted_by.id,
            title: question.title.clone(),
            contents: question.contents.clone(),
            answers,
            created_at: None,
        })
    }
}
