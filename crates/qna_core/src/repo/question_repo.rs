//! Question store contract, pagination and SQLite implementation.
//!
//! # Responsibility
//! - Persist question rows and load them with their answers.
//! - Serve deleted-flag filtered and paginated listings.
//!
//! # Invariants
//! - `save` never changes the writer of an existing question.
//! - Listings are ordered by `id ASC`.
//! - Paginated listings exclude tombstoned questions.

use crate::model::question::{Question, QuestionId};
use crate::repo::answer_repo::load_answers_for_question;
use crate::repo::user_repo::parse_writer_columns;
use crate::repo::{bool_to_int, parse_deleted_flag, RepoError, RepoResult};
use rusqlite::{params, Connection, Row};

pub const PAGE_SIZE_DEFAULT: u32 = 10;
pub const PAGE_SIZE_MAX: u32 = 50;

const QUESTION_SELECT_SQL: &str = "SELECT
    q.id,
    q.title,
    q.contents,
    q.is_deleted,
    q.created_at,
    q.updated_at,
    u.id AS writer_id,
    u.login AS writer_login,
    u.name AS writer_name,
    u.email AS writer_email
FROM questions q
JOIN users u ON u.id = q.writer_id";

/// Page-size policy applied to caller-requested sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    pub default_size: u32,
    pub max_size: u32,
}

impl Default for PageLimits {
    fn default() -> Self {
        Self {
            default_size: PAGE_SIZE_DEFAULT,
            max_size: PAGE_SIZE_MAX,
        }
    }
}

impl PageLimits {
    /// Resolves a requested size: missing uses the default, then clamps to
    /// `1..=max_size`.
    pub fn resolve(&self, requested: Option<u32>) -> u32 {
        let max = self.max_size.max(1);
        requested.unwrap_or(self.default_size).clamp(1, max)
    }
}

/// Zero-based page descriptor with an already-resolved size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
}

impl PageRequest {
    /// Builds a request using the default page limits.
    pub fn new(page: u32, size: Option<u32>) -> Self {
        Self::with_limits(page, size, &PageLimits::default())
    }

    pub fn with_limits(page: u32, size: Option<u32>, limits: &PageLimits) -> Self {
        Self {
            page,
            size: limits.resolve(size),
        }
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.size)
    }
}

pub trait QuestionStore {
    /// Inserts when `id` is `None`, updates otherwise; returns the stored row
    /// with answers loaded. Answers themselves are saved via `AnswerStore`.
    fn save(&self, question: &Question) -> RepoResult<Question>;
    /// Returns the question even when tombstoned.
    fn find_by_id(&self, id: QuestionId) -> RepoResult<Option<Question>>;
    fn find_by_deleted(&self, deleted: bool) -> RepoResult<Vec<Question>>;
    /// Returns one page of non-deleted questions.
    fn find_page(&self, request: &PageRequest) -> RepoResult<Vec<Question>>;
    fn count_by_deleted(&self, deleted: bool) -> RepoResult<u64>;
}

pub struct SqliteQuestionStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteQuestionStore<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn query_questions(
        &self,
        sql: &str,
        bind: impl rusqlite::Params,
    ) -> RepoResult<Vec<Question>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(bind)?;
        let mut questions = Vec::new();
        while let Some(row) = rows.next()? {
            questions.push(parse_question_row(row)?);
        }
        drop(rows);

        for question in &mut questions {
            if let Some(id) = question.id {
                question.answers = load_answers_for_question(self.conn, id)?;
            }
        }
        Ok(questions)
    }
}

impl QuestionStore for SqliteQuestionStore<'_> {
    fn save(&self, question: &Question) -> RepoResult<Question> {
        question.validate()?;

        let id = match question.id {
            None => {
                self.conn.execute(
                    "INSERT INTO questions (title, contents, writer_id, is_deleted)
                     VALUES (?1, ?2, ?3, ?4);",
                    params![
                        question.title.as_str(),
                        question.contents.as_str(),
                        question.writer.id,
                        bool_to_int(question.deleted),
                    ],
                )?;
                self.conn.last_insert_rowid()
            }
            Some(id) => {
                let changed = self.conn.execute(
                    "UPDATE questions
                     SET
                        title = ?1,
                        contents = ?2,
                        is_deleted = ?3,
                        updated_at = (strftime('%s', 'now') * 1000)
                     WHERE id = ?4;",
                    params![
                        question.title.as_str(),
                        question.contents.as_str(),
                        bool_to_int(question.deleted),
                        id,
                    ],
                )?;
                if changed == 0 {
                    return Err(RepoError::NotFound {
                        entity: "question",
                        id,
                    });
                }
                id
            }
        };

        self.find_by_id(id)?
            .ok_or_else(|| RepoError::InvalidData(format!("question {id} missing after save")))
    }

    fn find_by_id(&self, id: QuestionId) -> RepoResult<Option<Question>> {
        let mut found =
            self.query_questions(&format!("{QUESTION_SELECT_SQL} WHERE q.id = ?1;"), [id])?;
        Ok(found.pop())
    }

    fn find_by_deleted(&self, deleted: bool) -> RepoResult<Vec<Question>> {
        self.query_questions(
            &format!("{QUESTION_SELECT_SQL} WHERE q.is_deleted = ?1 ORDER BY q.id ASC;"),
            [bool_to_int(deleted)],
        )
    }

    fn find_page(&self, request: &PageRequest) -> RepoResult<Vec<Question>> {
        let offset = i64::try_from(request.offset())
            .map_err(|_| RepoError::InvalidData(format!("page offset overflow: {request:?}")))?;
        self.query_questions(
            &format!(
                "{QUESTION_SELECT_SQL}
                 WHERE q.is_deleted = 0
                 ORDER BY q.id ASC
                 LIMIT ?1 OFFSET ?2;"
            ),
            params![i64::from(request.size), offset],
        )
    }

    fn count_by_deleted(&self, deleted: bool) -> RepoResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM questions WHERE is_deleted = ?1;",
            [bool_to_int(deleted)],
            |row| row.get(0),
        )?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative question count `{count}`")))
    }
}

fn parse_question_row(row: &Row<'_>) -> RepoResult<Question> {
    let question = Question {
        id: Some(row.get("id")?),
        title: row.get("title")?,
        contents: row.get("contents")?,
        writer: parse_writer_columns(row)?,
        deleted: parse_deleted_flag(row.get("is_deleted")?, "questions.is_deleted")?,
        created_at: Some(row.get("created_at")?),
        updated_at: Some(row.get("updated_at")?),
        answers: Vec::new(),
    };
    question.validate()?;
    Ok(question)
}
