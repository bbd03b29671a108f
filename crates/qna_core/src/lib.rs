//! Core domain logic for the Q&A board.
//! This crate owns question/answer lifecycle rules and their persistence.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{ConfigError, QnaConfig};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::access::{AccessError, OwnedLookup};
pub use model::answer::{Answer, AnswerChangeError, AnswerId};
pub use model::delete_history::{DeleteHistory, DeleteHistoryId, DeletedAnswer};
pub use model::question::{Question, QuestionChangeError, QuestionDraft, QuestionId};
pub use model::user::{User, UserId};
pub use model::validation::ValidationError;
pub use repo::answer_repo::{AnswerStore, SqliteAnswerStore};
pub use repo::delete_history_repo::{DeleteHistoryRecorder, SqliteDeleteHistoryRecorder};
pub use repo::question_repo::{PageLimits, PageRequest, QuestionStore, SqliteQuestionStore};
pub use repo::unit_of_work::{SqliteUnitOfWork, UnitOfWork};
pub use repo::user_repo::{SqliteUserStore, UserStore};
pub use repo::{RepoError, RepoResult};
pub use service::qna_workflow::{QnaError, QnaResult, QnaWorkflow, QuestionPage, SqliteQnaWorkflow};

/// Minimal health-check API for linkage smoke tests.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
