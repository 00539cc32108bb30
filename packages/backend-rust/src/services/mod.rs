pub mod admin_auth;
pub mod import;
pub mod progress;
pub mod selector;
pub mod stats;

use thiserror::Error;

use crate::db::RepoError;

pub use progress::{AnswerResult, ProgressUpdater};
pub use selector::{WordChoice, WordSelector};
pub use stats::{StatsAggregator, StudentStats};

#[derive(Debug, Error)]
pub enum StudyError {
    #[error("student not found: {0}")]
    StudentNotFound(String),
    #[error("word not found: {0}")]
    WordNotFound(String),
    #[error("progress for {student_code}/{word_id} kept changing after {attempts} attempts")]
    Conflict {
        student_code: String,
        word_id: String,
        attempts: u32,
    },
    #[error(transparent)]
    Repository(#[from] RepoError),
}
