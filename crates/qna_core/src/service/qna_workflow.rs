//! Question/answer use-case workflow.
//!
//! # Responsibility
//! - Orchestrate store calls into question/answer lifecycle operations.
//! - Collapse every lookup/ownership refusal into one caller-visible error.
//!
//! # Invariants
//! - Every mutating operation runs inside one `UnitOfWork` scope.
//! - A refused operation leaves storage untouched.
//! - Refusal reasons are logged as metadata, never returned.
//! - Deleting a question writes exactly one delete-history record.

use crate::model::access::{AccessError, OwnedLookup};
use crate::model::answer::{Answer, AnswerChangeError, AnswerId};
use crate::model::question::{Question, QuestionChangeError, QuestionDraft, QuestionId};
use crate::model::user::User;
use crate::model::validation::ValidationError;
use crate::repo::answer_repo::{AnswerStore, SqliteAnswerStore};
use crate::repo::delete_history_repo::{DeleteHistoryRecorder, SqliteDeleteHistoryRecorder};
use crate::repo::question_repo::{PageLimits, PageRequest, QuestionStore, SqliteQuestionStore};
use crate::repo::unit_of_work::{SqliteUnitOfWork, UnitOfWork};
use crate::repo::RepoError;
use log::{debug, info};
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type QnaResult<T> = Result<T, QnaError>;

/// Workflow error returned to callers.
#[derive(Debug)]
pub enum QnaError {
    /// Target is missing, deleted, or not owned by the acting user.
    /// Callers cannot tell these cases apart.
    NotFoundOrUnauthorized,
    /// Submitted content was rejected.
    Validation(ValidationError),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for QnaError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFoundOrUnauthorized => write!(f, "not found or not permitted"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for QnaError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::NotFoundOrUnauthorized => None,
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<RepoError> for QnaError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { .. } => Self::NotFoundOrUnauthorized,
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

impl From<ValidationError> for QnaError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

/// One page of non-deleted questions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionPage {
    pub items: Vec<Question>,
    /// Zero-based page index that was served.
    pub page: u32,
    /// Effective page size after applying limits.
    pub applied_size: u32,
    /// Count of all non-deleted questions.
    pub total_elements: u64,
}

impl QuestionPage {
    pub fn total_pages(&self) -> u64 {
        self.total_elements.div_ceil(u64::from(self.applied_size.max(1)))
    }
}

/// Question/answer workflow over pluggable stores.
pub struct QnaWorkflow<Q, A, H, U> {
    questions: Q,
    answers: A,
    history: H,
    unit_of_work: U,
    page_limits: PageLimits,
}

/// Workflow wired to SQLite stores sharing one connection.
pub type SqliteQnaWorkflow<'conn> = QnaWorkflow<
    SqliteQuestionStore<'conn>,
    SqliteAnswerStore<'conn>,
    SqliteDeleteHistoryRecorder<'conn>,
    SqliteUnitOfWork<'conn>,
>;

impl<'conn> SqliteQnaWorkflow<'conn> {
    /// Builds a workflow on a migrated connection.
    pub fn sqlite(conn: &'conn Connection) -> Self {
        QnaWorkflow::new(
            SqliteQuestionStore::new(conn),
            SqliteAnswerStore::new(conn),
            SqliteDeleteHistoryRecorder::new(conn),
            SqliteUnitOfWork::new(conn),
        )
    }
}

impl<Q, A, H, U> QnaWorkflow<Q, A, H, U>
where
    Q: QuestionStore,
    A: AnswerStore,
    H: DeleteHistoryRecorder,
    U: UnitOfWork,
{
    pub fn new(questions: Q, answers: A, history: H, unit_of_work: U) -> Self {
        Self {
            questions,
            answers,
            history,
            unit_of_work,
            page_limits: PageLimits::default(),
        }
    }

    /// Overrides the page-size policy used by `find_page`.
    pub fn with_page_limits(mut self, page_limits: PageLimits) -> Self {
        self.page_limits = page_limits;
        self
    }

    /// Stores a new question written by `actor`.
    pub fn create(&self, actor: &User, draft: &QuestionDraft) -> QnaResult<Question> {
        let question = Question::from_draft(actor.clone(), draft)?;
        let saved = self
            .unit_of_work
            .atomically(|| -> QnaResult<Question> { Ok(self.questions.save(&question)?) })?;

        info!(
            "event=question_create module=qna status=ok question_id={} writer_id={}",
            saved.id.unwrap_or_default(),
            actor.id
        );
        Ok(saved)
    }

    /// Plain lookup; tombstoned questions are returned too.
    pub fn find_question_by_id(&self, id: QuestionId) -> QnaResult<Option<Question>> {
        Ok(self.questions.find_by_id(id)?)
    }

    /// Plain lookup; tombstoned answers are returned too.
    pub fn find_answer_by_id(&self, id: AnswerId) -> QnaResult<Option<Answer>> {
        Ok(self.answers.find_by_id(id)?)
    }

    /// Returns a visible question for display.
    pub fn show(&self, id: QuestionId) -> QnaResult<Question> {
        match self.questions.find_by_id(id)? {
            Some(question) if question.is_active() => Ok(question),
            Some(_) => deny("question_show", id, None, AccessError::AlreadyDeleted.reason_code()),
            None => deny("question_show", id, None, "missing"),
        }
    }

    /// Looks a question up and classifies it against `actor`.
    ///
    /// Tombstoned questions count as missing.
    pub fn classify_question(
        &self,
        id: QuestionId,
        actor: &User,
    ) -> QnaResult<OwnedLookup<Question>> {
        let lookup = match self.questions.find_by_id(id)? {
            Some(question) if question.is_active() && question.is_owner(actor) => {
                OwnedLookup::Owned(question)
            }
            Some(question) if question.is_active() => OwnedLookup::Foreign,
            Some(_) | None => OwnedLookup::Missing,
        };
        Ok(lookup)
    }

    /// Returns the question only when `actor` owns it.
    pub fn find_question_owned(&self, id: QuestionId, actor: &User) -> QnaResult<Question> {
        let lookup = self.classify_question(id, actor)?;
        if let Some(reason) = lookup.denial_reason() {
            return deny("question_find_owned", id, Some(actor), reason);
        }
        lookup.owned().ok_or(QnaError::NotFoundOrUnauthorized)
    }

    /// Replaces title and contents of an owned question.
    pub fn update(
        &self,
        actor: &User,
        id: QuestionId,
        draft: &QuestionDraft,
    ) -> QnaResult<Question> {
        let saved = self.unit_of_work.atomically(|| -> QnaResult<Question> {
            let mut question = self.load_question("question_update", id, actor)?;
            question.modify(actor, draft).or_else(|err| match err {
                QuestionChangeError::Access(reason) => {
                    deny("question_update", id, Some(actor), reason.reason_code())
                }
                QuestionChangeError::Validation(err) => Err(QnaError::Validation(err)),
            })?;
            Ok(self.questions.save(&question)?)
        })?;

        info!(
            "event=question_update module=qna status=ok question_id={id} actor_id={}",
            actor.id
        );
        Ok(saved)
    }

    /// Soft-deletes an owned question with its answers and records history.
    pub fn delete_question(&self, actor: &User, id: QuestionId) -> QnaResult<Question> {
        let (deleted, history_id, cascaded) =
            self.unit_of_work.atomically(|| -> QnaResult<_> {
                let mut question = self.load_question("question_delete", id, actor)?;
                let cascaded: Vec<AnswerId> =
                    question.live_answers().filter_map(|answer| answer.id).collect();

                if let Err(reason) = question.delete(actor) {
                    return deny("question_delete", id, Some(actor), reason.reason_code());
                }

                for answer in question
                    .answers
                    .iter()
                    .filter(|answer| answer.id.is_some_and(|aid| cascaded.contains(&aid)))
                {
                    self.answers.save(answer)?;
                }
                let deleted = self.questions.save(&question)?;

                let mut removed = deleted.clone();
                removed
                    .answers
                    .retain(|answer| answer.id.is_some_and(|aid| cascaded.contains(&aid)));
                let history_id = self.history.save_all(&removed, actor)?;
                Ok((deleted, history_id, cascaded.len()))
            })?;

        info!(
            "event=question_delete module=qna status=ok question_id={id} actor_id={} cascaded_answers={cascaded} history_id={history_id}",
            actor.id
        );
        Ok(deleted)
    }

    /// Lists every non-deleted question in id order.
    pub fn find_all(&self) -> QnaResult<Vec<Question>> {
        Ok(self.questions.find_by_deleted(false)?)
    }

    /// Builds a page descriptor under this workflow's page-size policy.
    pub fn page_request(&self, page: u32, size: Option<u32>) -> PageRequest {
        PageRequest::with_limits(page, size, &self.page_limits)
    }

    /// Lists one zero-based page of non-deleted questions.
    ///
    /// The requested size is clamped again to this workflow's limits.
    pub fn find_page(&self, request: &PageRequest) -> QnaResult<QuestionPage> {
        let request = self.page_request(request.page, Some(request.size));
        let items = self.questions.find_page(&request)?;
        let total_elements = self.questions.count_by_deleted(false)?;
        debug!(
            "event=question_list module=qna status=ok page={} size={} returned={} total={total_elements}",
            request.page,
            request.size,
            items.len()
        );
        Ok(QuestionPage {
            items,
            page: request.page,
            applied_size: request.size,
            total_elements,
        })
    }

    /// Appends a new answer by `actor` to a visible question.
    pub fn add_answer(
        &self,
        actor: &User,
        question_id: QuestionId,
        contents: &str,
    ) -> QnaResult<Answer> {
        let saved = self.unit_of_work.atomically(|| -> QnaResult<Answer> {
            let mut question = match self.questions.find_by_id(question_id)? {
                Some(question) => question,
                None => return deny("answer_add", question_id, Some(actor), "missing"),
            };
            let mut answer = Answer::new(actor.clone(), contents)?;
            if let Err(reason) = question.add_answer(&mut answer) {
                return deny("answer_add", question_id, Some(actor), reason.reason_code());
            }
            Ok(self.answers.save(&answer)?)
        })?;

        info!(
            "event=answer_add module=qna status=ok question_id={question_id} answer_id={} writer_id={}",
            saved.id.unwrap_or_default(),
            actor.id
        );
        Ok(saved)
    }

    /// Returns a visible answer for display.
    pub fn show_answer(&self, answer_id: AnswerId) -> QnaResult<Answer> {
        match self.answers.find_by_id(answer_id)? {
            Some(answer) if answer.is_active() => Ok(answer),
            Some(_) => deny(
                "answer_show",
                answer_id,
                None,
                AccessError::AlreadyDeleted.reason_code(),
            ),
            None => deny("answer_show", answer_id, None, "missing"),
        }
    }

    /// Soft-deletes an owned answer.
    pub fn delete_answer(&self, actor: &User, id: AnswerId) -> QnaResult<Answer> {
        let deleted = self.unit_of_work.atomically(|| -> QnaResult<Answer> {
            let mut answer = self.load_answer("answer_delete", id, actor)?;
            if let Err(reason) = answer.delete(actor) {
                return deny("answer_delete", id, Some(actor), reason.reason_code());
            }
            Ok(self.answers.save(&answer)?)
        })?;

        info!(
            "event=answer_delete module=qna status=ok answer_id={id} actor_id={}",
            actor.id
        );
        Ok(deleted)
    }

    /// Replaces the contents of an owned answer.
    pub fn update_answer(
        &self,
        actor: &User,
        answer_id: AnswerId,
        contents: &str,
    ) -> QnaResult<Answer> {
        let updated = self.unit_of_work.atomically(|| -> QnaResult<Answer> {
            let mut answer = self.load_answer("answer_update", answer_id, actor)?;
            answer.update(actor, contents).or_else(|err| match err {
                AnswerChangeError::Access(reason) => {
                    deny("answer_update", answer_id, Some(actor), reason.reason_code())
                }
                AnswerChangeError::Validation(err) => Err(QnaError::Validation(err)),
            })?;
            Ok(self.answers.save(&answer)?)
        })?;

        info!(
            "event=answer_update module=qna status=ok answer_id={answer_id} actor_id={}",
            actor.id
        );
        Ok(updated)
    }

    fn load_question(
        &self,
        operation: &'static str,
        id: QuestionId,
        actor: &User,
    ) -> QnaResult<Question> {
        match self.questions.find_by_id(id)? {
            Some(question) => Ok(question),
            None => deny(operation, id, Some(actor), "missing"),
        }
    }

    fn load_answer(
        &self,
        operation: &'static str,
        id: AnswerId,
        actor: &User,
    ) -> QnaResult<Answer> {
        match self.answers.find_by_id(id)? {
            Some(answer) => Ok(answer),
            None => deny(operation, id, Some(actor), "missing"),
        }
    }
}

/// Logs a refusal and returns the collapsed caller-facing error.
fn deny<T>(
    operation: &'static str,
    target_id: i64,
    actor: Option<&User>,
    reason: &str,
) -> QnaResult<T> {
    match actor {
        Some(actor) => info!(
            "event={operation} module=qna status=denied target_id={target_id} actor_id={} reason={reason}",
            actor.id
        ),
        None => info!(
            "event={operation} module=qna status=denied target_id={target_id} reason={reason}"
        ),
    }
    Err(QnaError::NotFoundOrUnauthorized)
}

#[cfg(test)]
mod tests {
    use super::{QnaError, QuestionPage};
    use crate::model::validation::ValidationError;
    use crate::repo::RepoError;

    #[test]
    fn repo_not_found_collapses_to_not_found_or_unauthorized() {
        let err = QnaError::from(RepoError::NotFound {
            entity: "question",
            id: 1,
        });
        assert!(matches!(err, QnaError::NotFoundOrUnauthorized));
    }

    #[test]
    fn repo_validation_surfaces_as_validation() {
        let err = QnaError::from(RepoError::Validation(ValidationError::BlankAnswer));
        assert!(matches!(
            err,
            QnaError::Validation(ValidationError::BlankAnswer)
        ));
    }

    #[test]
    fn total_pages_rounds_up() {
        let page = QuestionPage {
            items: Vec::new(),
            page: 0,
            applied_size: 10,
            total_elements: 21,
        };
        assert_eq!(page.total_pages(), 3);
    }
}
