//! Entity-level refusal reasons.
//!
//! These never leave the workflow: callers only see
//! `QnaError::NotFoundOrUnauthorized`. The reason is kept for logging.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Why an entity refused a mutation requested by an acting user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessError {
    /// Acting user is not the writer.
    NotOwner,
    /// Entity is already tombstoned.
    AlreadyDeleted,
    /// Question still has live answers written by someone else.
    ForeignAnswers,
}

impl AccessError {
    /// Stable reason code used in log lines.
    pub fn reason_code(self) -> &'static str {
        match self {
            Self::NotOwner => "not_owner",
            Self::AlreadyDeleted => "already_deleted",
            Self::ForeignAnswers => "foreign_answers",
        }
    }
}

impl Display for AccessError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotOwner => write!(f, "acting user is not the writer"),
            Self::AlreadyDeleted => write!(f, "entity is already deleted"),
            Self::ForeignAnswers => write!(f, "question has answers written by other users"),
        }
    }
}

impl Error for AccessError {}

/// Outcome of a lookup that also checks ownership.
///
/// Keeps "absent" and "present but foreign" apart until the caller decides
/// how much to reveal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OwnedLookup<T> {
    Owned(T),
    Foreign,
    Missing,
}

impl<T> OwnedLookup<T> {
    /// Returns the owned entity, if any.
    pub fn owned(self) -> Option<T> {
        match self {
            Self::Owned(value) => Some(value),
            Self::Foreign | Self::Missing => None,
        }
    }

    /// Reason code for log lines; `None` when owned.
    pub fn denial_reason(&self) -> Option<&'static str> {
        match self {
            Self::Owned(_) => None,
            Self::Foreign => Some(AccessError::NotOwner.reason_code()),
            Self::Missing => Some("missing"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::OwnedLookup;

    #[test]
    fn owned_lookup_only_yields_owned_values() {
        assert_eq!(OwnedLookup::Owned(7).owned(), Some(7));
        assert_eq!(OwnedLookup::<i32>::Foreign.owned(), None);
        assert_eq!(OwnedLookup::<i32>::Missing.owned(), None);
    }

    #[test]
    fn denial_reason_distinguishes_missing_from_foreign() {
        assert_eq!(OwnedLookup::<()>::Missing.denial_reason(), Some("missing"));
        assert_eq!(OwnedLookup::<()>::Foreign.denial_reason(), Some("not_owner"));
        assert_eq!(OwnedLookup::Owned(()).denial_reason(), None);
    }
}
