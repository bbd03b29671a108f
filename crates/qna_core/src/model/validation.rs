//! Content validation shared by entities and stores.
//!
//! # Invariants
//! - Titles are whitespace-collapsed before length checks.
//! - Length is counted in chars, not bytes.

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const TITLE_MIN_CHARS: usize = 3;
pub const TITLE_MAX_CHARS: usize = 100;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Rejected question/answer content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Normalized title length outside `TITLE_MIN_CHARS..=TITLE_MAX_CHARS`.
    TitleLength { chars: usize },
    /// Answer contents are empty or whitespace only.
    BlankAnswer,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TitleLength { chars } => write!(
                f,
                "title must be {TITLE_MIN_CHARS}..={TITLE_MAX_CHARS} characters, got {chars}"
            ),
            Self::BlankAnswer => write!(f, "answer contents cannot be blank"),
        }
    }
}

impl Error for ValidationError {}

/// Collapses runs of whitespace to one space and trims both ends.
pub fn normalize_title(title: &str) -> String {
    WHITESPACE_RE.replace_all(title, " ").trim().to_string()
}

/// Checks an already-normalized title.
pub fn validate_title(title: &str) -> Result<(), ValidationError> {
    let chars = title.chars().count();
    if !(TITLE_MIN_CHARS..=TITLE_MAX_CHARS).contains(&chars) {
        return Err(ValidationError::TitleLength { chars });
    }
    Ok(())
}

pub fn validate_answer_contents(contents: &str) -> Result<(), ValidationError> {
    if contents.trim().is_empty() {
        return Err(ValidationError::BlankAnswer);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{normalize_title, validate_answer_contents, validate_title, ValidationError};

    #[test]
    fn normalize_title_collapses_whitespace() {
        assert_eq!(normalize_title("  how\tdo\n\nI   borrow  "), "how do I borrow");
    }

    #[test]
    fn validate_title_counts_chars_not_bytes() {
        assert!(validate_title("질문이").is_ok());
        assert_eq!(
            validate_title("ab"),
            Err(ValidationError::TitleLength { chars: 2 })
        );
        let long = "x".repeat(101);
        assert_eq!(
            validate_title(&long),
            Err(ValidationError::TitleLength { chars: 101 })
        );
    }

    #[test]
    fn blank_answers_are_rejected() {
        assert_eq!(
            validate_answer_contents(" \n "),
            Err(ValidationError::BlankAnswer)
        );
        assert!(validate_answer_contents("use a RefCell").is_ok());
    }
}
