//! Question domain model.
//!
//! # Responsibility
//! - Hold question state together with its ordered answers.
//! - Enforce writer-only modification and soft-delete rules.
//!
//! # Invariants
//! - `title` is stored whitespace-normalized.
//! - `answers` are ordered by answer id.
//! - Deleting a question tombstones its live answers in the same step.

use crate::model::access::AccessError;
use crate::model::answer::Answer;
use crate::model::user::User;
use crate::model::validation::{normalize_title, validate_title, ValidationError};
use serde::{Deserialize, Serialize};

pub type QuestionId = i64;

/// Caller-supplied question fields for create and update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionDraft {
    pub title: String,
    pub contents: String,
}

impl QuestionDraft {
    pub fn new(title: impl Into<String>, contents: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            contents: contents.into(),
        }
    }

    /// Returns the normalized title after checking its length.
    pub fn checked_title(&self) -> Result<String, ValidationError> {
        let title = normalize_title(&self.title);
        validate_title(&title)?;
        Ok(title)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: Option<QuestionId>,
    pub title: String,
    pub contents: String,
    pub writer: User,
    pub deleted: bool,
    /// Epoch milliseconds, filled in by storage.
    pub created_at: Option<i64>,
    pub updated_at: Option<i64>,
    pub answers: Vec<Answer>,
}

impl Question {
    /// Builds an unsaved question written by `writer`.
    pub fn from_draft(writer: User, draft: &QuestionDraft) -> Result<Self, ValidationError> {
        Ok(Self {
            id: None,
            title: draft.checked_title()?,
            contents: draft.contents.clone(),
            writer,
            deleted: false,
            created_at: None,
            updated_at: None,
            answers: Vec::new(),
        })
    }

    pub fn is_owner(&self, user: &User) -> bool {
        self.writer.is_same(user)
    }

    pub fn is_active(&self) -> bool {
        !self.deleted
    }

    /// Answers that are not tombstoned, in id order.
    pub fn live_answers(&self) -> impl Iterator<Item = &Answer> {
        self.answers.iter().filter(|answer| answer.is_active())
    }

    /// Replaces title and contents on behalf of `actor`.
    pub fn modify(
        &mut self,
        actor: &User,
        update: &QuestionDraft,
    ) -> Result<(), QuestionChangeError> {
        self.ensure_mutable_by(actor)?;
        let title = update.checked_title()?;
        self.title = title;
        self.contents = update.contents.clone();
        Ok(())
    }

    /// Tombstones the question and its live answers on behalf of `actor`.
    ///
    /// Refused while another user's answer is still live.
    pub fn delete(&mut self, actor: &User) -> Result<(), AccessError> {
        self.ensure_mutable_by(actor)?;
        if self.live_answers().any(|answer| !answer.is_owner(actor)) {
            return Err(AccessError::ForeignAnswers);
        }

        self.deleted = true;
        for answer in self.answers.iter_mut().filter(|answer| answer.is_active()) {
            answer.deleted = true;
        }
        Ok(())
    }

    /// Links `answer` to this question and appends it.
    ///
    /// Anyone may answer; only deleted questions refuse.
    pub fn add_answer(&mut self, answer: &mut Answer) -> Result<(), AccessError> {
        if self.deleted {
            return Err(AccessError::AlreadyDeleted);
        }
        answer.question_id = self.id;
        self.answers.push(answer.clone());
        Ok(())
    }

    /// Checks stored state; used by stores before writing.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_title(&self.title)
    }

    fn ensure_mutable_by(&self, actor: &User) -> Result<(), AccessError> {
        if !self.is_owner(actor) {
            return Err(AccessError::NotOwner);
        }
        if self.deleted {
            return Err(AccessError::AlreadyDeleted);
        }
        Ok(())
    }
}

/// Failure of `Question::modify`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestionChangeError {
    Access(AccessError),
    Validation(ValidationError),
}

impl From<AccessError> for QuestionChangeError {
    fn from(value: AccessError) -> Self {
        Self::Access(value)
    }
}

impl From<ValidationError> for QuestionChangeError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}
