//! Box Tallies
//!
//! Counts a student's words per box. Words the student has never answered
//! have no progress and are counted in box 1, so the box-1 figure can be
//! larger than the number of stored box-1 records.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::{BoxNumber, ProgressState, BOX_COUNT};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoxTally {
    pub total_words: u64,
    /// Indexed by `BoxNumber::index()`
    pub boxes: [u64; BOX_COUNT],
    pub studied_today: u64,
}

impl BoxTally {
    pub fn in_box(&self, box_number: BoxNumber) -> u64 {
        self.boxes[box_number.index()]
    }
}

pub fn tally<'a, I>(total_words: u64, records: I, today: NaiveDate) -> BoxTally
where
    I: IntoIterator<Item = &'a ProgressState>,
{
    let mut out = BoxTally {
        total_words,
        ..BoxTally::default()
    };

    let mut with_progress = 0u64;
    for record in records {
        out.boxes[record.box_number.index()] += 1;
        with_progress += 1;
        if record.studied_on(today) {
            out.studied_today += 1;
        }
    }

    // progress left behind by words no longer in the class must not drive box 1 negative
    out.boxes[BoxNumber::FIRST.index()] += total_words.saturating_sub(with_progress);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
    }

    fn record(box_number: u8, last_studied: NaiveDate) -> ProgressState {
        ProgressState {
            box_number: BoxNumber::new(box_number).unwrap(),
            last_studied,
            correct_count: 0,
            wrong_count: 0,
        }
    }

    #[test]
    fn test_unanswered_words_count_as_box_one() {
        let yesterday = today().pred_opt().unwrap();
        let records = [record(2, yesterday), record(3, today())];
        let stats = tally(5, &records, today());
        assert_eq!(stats.boxes, [3, 1, 1, 0, 0]);
        assert_eq!(stats.total_words, 5);
        assert_eq!(stats.studied_today, 1);
    }

    #[test]
    fn test_explicit_box_one_records_add_up() {
        let records = [record(1, today()), record(1, today()), record(5, today())];
        let stats = tally(4, &records, today());
        assert_eq!(stats.in_box(BoxNumber::FIRST), 3);
        assert_eq!(stats.in_box(BoxNumber::MASTERED), 1);
        assert_eq!(stats.studied_today, 3);
    }

    #[test]
    fn test_more_records_than_words_saturates() {
        let records = [record(2, today()), record(4, today())];
        let stats = tally(1, &records, today());
        assert_eq!(stats.boxes, [0, 1, 0, 1, 0]);
    }

    #[test]
    fn test_empty_class() {
        let stats = tally(0, &[], today());
        assert_eq!(stats, BoxTally::default());
    }
}
