//! Answer domain model.
//!
//! # Invariants
//! - `id` and `question_id` are `None` until the answer is attached and saved.
//! - Only the writer may update or delete; a deleted answer is frozen.

use crate::model::access::AccessError;
use crate::model::question::QuestionId;
use crate::model::user::User;
use crate::model::validation::{validate_answer_contents, ValidationError};
use serde::{Deserialize, Serialize};

pub type AnswerId = i64;

/// Reply to a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub id: Option<AnswerId>,
    pub question_id: Option<QuestionId>,
    pub writer: User,
    pub contents: String,
    pub deleted: bool,
    /// Epoch milliseconds, filled in by storage.
    pub created_at: Option<i64>,
    pub updated_at: Option<i64>,
}

impl Answer {
    /// Creates an unsaved, unattached answer.
    pub fn new(writer: User, contents: impl Into<String>) -> Result<Self, ValidationError> {
        let contents = contents.into();
        validate_answer_contents(&contents)?;
        Ok(Self {
            id: None,
            question_id: None,
            writer,
            contents,
            deleted: false,
            created_at: None,
            updated_at: None,
        })
    }

    pub fn is_owner(&self, user: &User) -> bool {
        self.writer.is_same(user)
    }

    /// Replaces the contents on behalf of `actor`.
    ///
    /// Leaves the answer untouched when either check fails.
    pub fn update(&mut self, actor: &User, contents: &str) -> Result<(), AnswerChangeError> {
        self.ensure_mutable_by(actor)?;
        validate_answer_contents(contents)?;
        self.contents = contents.to_string();
        Ok(())
    }

    /// Tombstones this answer on behalf of `actor`.
    pub fn delete(&mut self, actor: &User) -> Result<(), AccessError> {
        self.ensure_mutable_by(actor)?;
        self.deleted = true;
        Ok(())
    }

    pub fn is_active(&self) -> bool {
        !self.deleted
    }

    /// Checks stored state; used by stores before writing.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_answer_contents(&self.contents)
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

/// Failure of `Answer::update`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerChangeError {
    Access(AccessError),
    Validation(ValidationError),
}

impl From<AccessError> for AnswerChangeError {
    fn from(value: AccessError) -> Self {
        Self::Access(value)
    }
}

impl From<ValidationError> for AnswerChangeError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

#[cfg(test)]
mod tests {
    use super::{Answer, AnswerChangeError};
    use crate::model::access::AccessError;
    use crate::model::user::User;
    use crate::model::validation::ValidationError;

    fn user(id: i64, login: &str) -> User {
        User {
            id,
            login: login.to_string(),
            name: login.to_string(),
            email: None,
        }
    }

    #[test]
    fn writer_can_update_and_delete() {
        let writer = user(1, "javajigi");
        let mut answer = Answer::new(writer.clone(), "first").unwrap();

        answer.update(&writer, "second").unwrap();
        assert_eq!(answer.contents, "second");

        answer.delete(&writer).unwrap();
        assert!(answer.deleted);
    }

    #[test]
    fn other_user_cannot_touch_answer() {
        let writer = user(1, "javajigi");
        let other = user(2, "sanjigi");
        let mut answer = Answer::new(writer, "first").unwrap();

        assert_eq!(
            answer.update(&other, "hijack"),
            Err(AnswerChangeError::Access(AccessError::NotOwner))
        );
        assert_eq!(answer.delete(&other), Err(AccessError::NotOwner));
        assert_eq!(answer.contents, "first");
        assert!(!answer.deleted);
    }

    #[test]
    fn deleted_answer_is_frozen() {
        let writer = user(1, "javajigi");
        let mut answer = Answer::new(writer.clone(), "first").unwrap();
        answer.delete(&writer).unwrap();

        assert_eq!(answer.delete(&writer), Err(AccessError::AlreadyDeleted));
        assert_eq!(
            answer.update(&writer, "again"),
            Err(AnswerChangeError::Access(AccessError::AlreadyDeleted))
        );
    }

    #[test]
    fn blank_update_is_rejected_without_mutation() {
        let writer = user(1, "javajigi");
        let mut answer = Answer::new(writer.clone(), "first").unwrap();

        assert_eq!(
            answer.update(&writer, "   "),
            Err(AnswerChangeError::Validation(ValidationError::BlankAnswer))
        );
        assert_eq!(answer.contents, "first");
    }
}
