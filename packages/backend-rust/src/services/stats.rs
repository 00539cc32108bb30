use std::sync::Arc;

use leitner_algo::{tally, BoxTally, ProgressState};
use serde::Serialize;

use crate::clock::Clock;
use crate::db::{ProgressRecord, Repository};
use crate::services::StudyError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudentStats {
    pub total_words: u64,
    pub box1_words: u64,
    pub box2_words: u64,
    pub box3_words: u64,
    pub box4_words: u64,
    pub box5_words: u64,
    pub studied_today: u64,
}

impl From<BoxTally> for StudentStats {
    fn from(t: BoxTally) -> Self {
        let [box1_words, box2_words, box3_words, box4_words, box5_words] = t.boxes;
        Self {
            total_words: t.total_words,
            box1_words,
            box2_words,
            box3_words,
            box4_words,
            box5_words,
            studied_today: t.studied_today,
        }
    }
}

#[derive(Clone)]
pub struct StatsAggregator {
    repo: Arc<dyn Repository>,
    clock: Clock,
}

impl StatsAggregator {
    pub fn new(repo: Arc<dyn Repository>, clock: Clock) -> Self {
        Self { repo, clock }
    }

    pub async fn compute_stats(&self, student_code: &str) -> Result<StudentStats, StudyError> {
        let student = self
            .repo
            .find_student_by_code(student_code)
            .await?
            .ok_or_else(|| StudyError::StudentNotFound(student_code.to_string()))?;

        let total_words = self.repo.count_words_by_class(&student.class_name).await?;
        let states: Vec<ProgressState> = self
            .repo
            .find_progress_by_student(student_code)
            .await?
            .iter()
            .map(ProgressRecord::state)
            .collect();

        let totals = tally(u64::try_from(total_words).unwrap_or(0), &states, self.clock.today());
        Ok(totals.into())
    }
}
