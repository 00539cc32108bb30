//! Box State Machine
//!
//! A correct answer moves a word one box up (capped at the last box), any
//! wrong answer sends it back to box 1. A word with no progress yet behaves
//! as box 1 with zero counters. There is no terminal state: a mastered word
//! stays reachable for review and can fall back to box 1.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::{BoxNumber, ProgressState};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerOutcome {
    Correct,
    Incorrect,
}

impl AnswerOutcome {
    pub fn from_correct(is_correct: bool) -> Self {
        if is_correct {
            Self::Correct
        } else {
            Self::Incorrect
        }
    }

    pub fn is_correct(self) -> bool {
        matches!(self, Self::Correct)
    }
}

/// Fold an answer onto the previous state (if any) and stamp it with `today`.
pub fn apply_answer(
    previous: Option<&ProgressState>,
    outcome: AnswerOutcome,
    today: NaiveDate,
) -> ProgressState {
    let (box_number, correct_count, wrong_count) = match previous {
        None => match outcome {
            AnswerOutcome::Correct => (BoxNumber::FIRST.promote(), 1, 0),
            AnswerOutcome::Incorrect => (BoxNumber::FIRST, 0, 1),
        },
        Some(prev) => match outcome {
            AnswerOutcome::Correct => (
                prev.box_number.promote(),
                prev.correct_count.saturating_add(1),
                prev.wrong_count,
            ),
            AnswerOutcome::Incorrect => (
                BoxNumber::FIRST,
                prev.correct_count,
                prev.wrong_count.saturating_add(1),
            ),
        },
    };

    ProgressState {
        box_number,
        last_studied: today,
        correct_count,
        wrong_count,
    }
}
