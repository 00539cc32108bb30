use std::collections::HashMap;
use std::sync::Arc;

use leitner_algo::{select_next, BoxNumber, ProgressState};
use serde::Serialize;

use crate::clock::Clock;
use crate::db::Repository;
use crate::services::StudyError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WordChoice {
    pub word_id: String,
    pub english: String,
    pub box_number: BoxNumber,
}

/// Picks the single next word a student should study today. Read-only.
#[derive(Clone)]
pub struct WordSelector {
    repo: Arc<dyn Repository>,
    clock: Clock,
}

impl WordSelector {
    pub fn new(repo: Arc<dyn Repository>, clock: Clock) -> Self {
        Self { repo, clock }
    }

    /// `Ok(None)` when the class has no words or everything was studied today.
    pub async fn select_next(&self, student_code: &str) -> Result<Option<WordChoice>, StudyError> {
        let student = self
            .repo
            .find_student_by_code(student_code)
            .await?
            .ok_or_else(|| StudyError::StudentNotFound(student_code.to_string()))?;

        let words = self.repo.find_words_by_class(&student.class_name).await?;
        if words.is_empty() {
            tracing::debug!(student_code, class_name = %student.class_name, "class has no words");
            return Ok(None);
        }

        let progress: HashMap<String, ProgressState> = self
            .repo
            .find_progress_by_student(student_code)
            .await?
            .into_iter()
            .map(|record| {
                let state = record.state();
                (record.word_id, state)
            })
            .collect();

        let today = self.clock.today();
        let choice = select_next(&words, &progress, today).map(|selection| WordChoice {
            word_id: selection.word.id.clone(),
            english: selection.word.english.clone(),
            box_number: selection.box_number,
        });

        if choice.is_none() {
            tracing::debug!(student_code, %today, "no words left for today");
        }

        Ok(choice)
    }
}
