pub mod config;
pub mod memory;
pub mod schema;
pub mod sql;

use std::sync::Arc;

use chrono::NaiveDate;
use futures::future::BoxFuture;
use leitner_algo::{BoxNumber, ProgressState, StudyItem};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::db::config::{DbConfig, DbMode};
use crate::db::memory::MemoryRepository;
use crate::db::sql::SqlRepository;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: String,
    pub code: String,
    pub name: String,
    pub class_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Word {
    pub id: String,
    pub class_name: String,
    pub english: String,
    /// Accepted answers, `;`-separated
    pub turkish: String,
}

impl StudyItem for Word {
    fn item_id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub id: String,
    pub student_code: String,
    pub word_id: String,
    pub box_number: BoxNumber,
    pub last_studied_date: NaiveDate,
    pub correct_count: u32,
    pub wrong_count: u32,
    /// Bumped on every write; used for compare-and-swap updates
    pub version: i64,
}

impl ProgressRecord {
    pub fn state(&self) -> ProgressState {
        ProgressState {
            box_number: self.box_number,
            last_studied: self.last_studied_date,
            correct_count: self.correct_count,
            wrong_count: self.wrong_count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStudent {
    pub code: String,
    pub name: String,
    pub class_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewWord {
    pub class_name: String,
    pub english: String,
    pub turkish: String,
}

/// Result of a conditional progress write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Written,
    /// The stored version no longer matched the expected one
    Conflict,
}

#[derive(Debug, Error)]
pub enum RepoError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

pub type RepoResult<T> = Result<T, RepoError>;

/// Document-store style access to students, words and progress records.
///
/// Methods return boxed futures so the store can be shared as
/// `Arc<dyn Repository>`.
pub trait Repository: Send + Sync {
    fn find_student_by_code<'a>(&'a self, code: &'a str) -> BoxFuture<'a, RepoResult<Option<Student>>>;

    /// Words of a class in insertion order.
    fn find_words_by_class<'a>(&'a self, class_name: &'a str) -> BoxFuture<'a, RepoResult<Vec<Word>>>;

    fn find_word<'a>(&'a self, word_id: &'a str) -> BoxFuture<'a, RepoResult<Option<Word>>>;

    fn count_words_by_class<'a>(&'a self, class_name: &'a str) -> BoxFuture<'a, RepoResult<i64>>;

    fn find_progress_by_student<'a>(
        &'a self,
        student_code: &'a str,
    ) -> BoxFuture<'a, RepoResult<Vec<ProgressRecord>>>;

    fn find_progress<'a>(
        &'a self,
        student_code: &'a str,
        word_id: &'a str,
    ) -> BoxFuture<'a, RepoResult<Option<ProgressRecord>>>;

    /// Insert when `expected_version` is `None`, otherwise overwrite the row
    /// for `(student_code, word_id)` only if its version still equals
    /// `expected_version`. `record.version` is the version to store.
    fn upsert_progress<'a>(
        &'a self,
        record: &'a ProgressRecord,
        expected_version: Option<i64>,
    ) -> BoxFuture<'a, RepoResult<UpsertOutcome>>;

    /// Returns `false` when a student with the same code already exists.
    fn insert_student<'a>(&'a self, student: &'a NewStudent) -> BoxFuture<'a, RepoResult<bool>>;

    /// Returns `false` when the class already has a word with the same english text.
    fn insert_word<'a>(&'a self, word: &'a NewWord) -> BoxFuture<'a, RepoResult<bool>>;

    fn list_students(&self) -> BoxFuture<'_, RepoResult<Vec<Student>>>;

    fn list_words(&self) -> BoxFuture<'_, RepoResult<Vec<Word>>>;

    fn ping(&self) -> BoxFuture<'_, RepoResult<()>>;

    fn backend_name(&self) -> &'static str;
}

#[derive(Debug, Error)]
pub enum DbInitError {
    #[error("IO error: {0}")]
    Io(String),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

pub async fn connect(config: &DbConfig) -> Result<Arc<dyn Repository>, DbInitError> {
    let repository: Arc<dyn Repository> = match &config.mode {
        DbMode::Memory => Arc::new(MemoryRepository::new()),
        DbMode::ServerPostgres { url } => Arc::new(SqlRepository::connect_postgres(url, config).await?),
        DbMode::DesktopSqlite { path } => Arc::new(SqlRepository::connect_sqlite(path, config).await?),
    };

    tracing::info!(backend = repository.backend_name(), "repository ready");
    Ok(repository)
}
