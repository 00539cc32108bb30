use std::sync::Arc;

use leitner_algo::{apply_answer, check_answer, AnswerOutcome, BoxNumber};
use serde::Serialize;
use uuid::Uuid;

use crate::clock::Clock;
use crate::db::{ProgressRecord, Repository, UpsertOutcome};
use crate::services::StudyError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnswerResult {
    pub is_correct: bool,
    /// The word's whole answer field, not just the matched alternative
    pub correct_answer: String,
    pub new_box: BoxNumber,
}

/// Grades an answer and moves the word between boxes.
///
/// The progress row is written with a version check. When another request
/// updated the same (student, word) row in between, the row is re-read and
/// the answer re-applied on top of it, so no answer is lost. Retrying a call
/// of `record_answer` itself still counts the answer twice.
#[derive(Clone)]
pub struct ProgressUpdater {
    repo: Arc<dyn Repository>,
    clock: Clock,
    max_attempts: u32,
}

impl ProgressUpdater {
    pub fn new(repo: Arc<dyn Repository>, clock: Clock, max_attempts: u32) -> Self {
        Self {
            repo,
            clock,
            max_attempts: max_attempts.max(1),
        }
    }

    pub async fn record_answer(
        &self,
        student_code: &str,
        word_id: &str,
        answer: &str,
    ) -> Result<AnswerResult, StudyError> {
        let word = self
            .repo
            .find_word(word_id)
            .await?
            .ok_or_else(|| StudyError::WordNotFound(word_id.to_string()))?;

        // the student code is not checked against the roster; unknown codes
        // still accumulate progress rows
        let outcome = AnswerOutcome::from_correct(check_answer(answer, &word.turkish));
        let today = self.clock.today();

        for attempt in 1..=self.max_attempts {
            let current = self.repo.find_progress(student_code, word_id).await?;
            let previous = current.as_ref().map(ProgressRecord::state);
            let next = apply_answer(previous.as_ref(), outcome, today);

            let record = ProgressRecord {
                id: current
                    .as_ref()
                    .map(|record| record.id.clone())
                    .unwrap_or_else(|| Uuid::new_v4().to_string()),
                student_code: student_code.to_string(),
                word_id: word_id.to_string(),
                box_number: next.box_number,
                last_studied_date: next.last_studied,
                correct_count: next.correct_count,
                wrong_count: next.wrong_count,
                version: current.as_ref().map_or(1, |record| record.version + 1),
            };
            let expected_version = current.as_ref().map(|record| record.version);

            match self.repo.upsert_progress(&record, expected_version).await? {
                UpsertOutcome::Written => {
                    tracing::debug!(
                        student_code,
                        word_id,
                        correct = outcome.is_correct(),
                        new_box = record.box_number.get(),
                        "progress updated"
                    );
                    return Ok(AnswerResult {
                        is_correct: outcome.is_correct(),
                        correct_answer: word.turkish,
                        new_box: record.box_number,
                    });
                }
                UpsertOutcome::Conflict => {
                    tracing::warn!(student_code, word_id, attempt, "progress changed concurrently, retrying");
                }
            }
        }

        Err(StudyError::Conflict {
            student_code: student_code.to_string(),
            word_id: word_id.to_string(),
            attempts: self.max_attempts,
        })
    }
}
