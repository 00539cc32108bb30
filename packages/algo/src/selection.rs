//! Next-Word Selection
//!
//! Words are grouped into one bucket per box. A word without progress goes
//! to box 1; a word already answered today is left out for the rest of the
//! day. Buckets are scanned 4, 3, 2, 1 so near-mastered words come up for
//! review ahead of new ones; box 5 is served only when nothing else is due.
//! Within a bucket the caller's enumeration order decides.

use std::collections::HashMap;
use std::iter;

use chrono::NaiveDate;

use crate::types::{BoxNumber, ProgressState, BOX_COUNT, MAX_BOX, REVIEW_ORDER};

/// Anything that can be scheduled: it only needs a stable id to look up its
/// progress.
pub trait StudyItem {
    fn item_id(&self) -> &str;
}

impl<T: StudyItem + ?Sized> StudyItem for &T {
    fn item_id(&self) -> &str {
        (**self).item_id()
    }
}

/// The bucket a word belongs to today, or `None` if it was studied today.
pub fn placement(progress: Option<&ProgressState>, today: NaiveDate) -> Option<BoxNumber> {
    match progress {
        None => Some(BoxNumber::FIRST),
        Some(state) if state.studied_on(today) => None,
        Some(state) => Some(state.box_number),
    }
}

#[derive(Debug)]
pub struct Selection<'a, W> {
    pub word: &'a W,
    /// The word's current box (1 when it has no progress yet)
    pub box_number: BoxNumber,
}

#[derive(Debug)]
pub struct Buckets<'a, W> {
    slots: [Vec<&'a W>; BOX_COUNT],
}

impl<'a, W: StudyItem> Buckets<'a, W> {
    pub fn partition<I>(words: I, progress: &HashMap<String, ProgressState>, today: NaiveDate) -> Self
    where
        I: IntoIterator<Item = &'a W>,
    {
        let mut slots: [Vec<&'a W>; BOX_COUNT] = std::array::from_fn(|_| Vec::new());
        for word in words {
            if let Some(box_number) = placement(progress.get(word.item_id()), today) {
                slots[box_number.index()].push(word);
            }
        }
        Self { slots }
    }

    pub fn bucket(&self, box_number: BoxNumber) -> &[&'a W] {
        &self.slots[box_number.index()]
    }

    /// Words still available today across all buckets.
    pub fn available(&self) -> usize {
        self.slots.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.available() == 0
    }

    pub fn next(&self) -> Option<Selection<'a, W>> {
        REVIEW_ORDER
            .iter()
            .copied()
            .chain(iter::once(MAX_BOX))
            .filter_map(BoxNumber::new)
            .find_map(|box_number| {
                self.slots[box_number.index()]
                    .first()
                    .map(|word| Selection { word: *word, box_number })
            })
    }
}

/// Partition `words` and pick the next one to study, if any is left today.
pub fn select_next<'a, W: StudyItem>(
    words: &'a [W],
    progress: &HashMap<String, ProgressState>,
    today: NaiveDate,
) -> Option<Selection<'a, W>> {
    Buckets::partition(words, progress, today).next()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Card(String);

    impl StudyItem for Card {
        fn item_id(&self) -> &str {
            &self.0
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 9, 16).unwrap()
    }

    fn yesterday() -> NaiveDate {
        today().pred_opt().unwrap()
    }

    fn cards(ids: &[&str]) -> Vec<Card> {
        ids.iter().map(|id| Card((*id).to_string())).collect()
    }

    fn at_box(box_number: u8, last_studied: NaiveDate) -> ProgressState {
        ProgressState {
            box_number: BoxNumber::new(box_number).unwrap(),
            last_studied,
            correct_count: box_number as u32 - 1,
            wrong_count: 0,
        }
    }

    #[test]
    fn test_new_words_start_in_box_one() {
        let words = cards(&["a", "b"]);
        let picked = select_next(&words, &HashMap::new(), today()).unwrap();
        assert_eq!(picked.word.0, "a");
        assert_eq!(picked.box_number, BoxNumber::FIRST);
    }

    #[test]
    fn test_empty_pool_selects_nothing() {
        let words: Vec<Card> = Vec::new();
        assert!(select_next(&words, &HashMap::new(), today()).is_none());
    }

    #[test]
    fn test_priority_walks_boxes_four_to_one_then_five() {
        let words = cards(&["new1", "new2", "three", "four", "five"]);
        let mut progress = HashMap::new();
        progress.insert("three".to_string(), at_box(3, yesterday()));
        progress.insert("four".to_string(), at_box(4, yesterday()));
        progress.insert("five".to_string(), at_box(5, yesterday()));

        let mut served = Vec::new();
        while let Some(picked) = select_next(&words, &progress, today()) {
            served.push((picked.word.0.clone(), picked.box_number.get()));
            // answering stamps the word with today's date
            progress.insert(picked.word.0.clone(), at_box(picked.box_number.get(), today()));
        }

        assert_eq!(
            served,
            vec![
                ("four".to_string(), 4),
                ("three".to_string(), 3),
                ("new1".to_string(), 1),
                ("new2".to_string(), 1),
                ("five".to_string(), 5),
            ]
        );
    }

    #[test]
    fn test_studied_today_is_excluded_regardless_of_box() {
        let words = cards(&["a", "b"]);
        let mut progress = HashMap::new();
        progress.insert("a".to_string(), at_box(4, today()));
        progress.insert("b".to_string(), at_box(1, today()));
        let buckets = Buckets::partition(&words, &progress, today());
        assert!(buckets.is_empty());
        assert!(buckets.next().is_none());
    }

    #[test]
    fn test_bucket_keeps_enumeration_order() {
        let words = cards(&["x", "y", "z"]);
        let mut progress = HashMap::new();
        for id in ["x", "y", "z"] {
            progress.insert(id.to_string(), at_box(2, yesterday()));
        }
        let buckets = Buckets::partition(&words, &progress, today());
        let ids: Vec<&str> = buckets
            .bucket(BoxNumber::new(2).unwrap())
            .iter()
            .map(|c| c.0.as_str())
            .collect();
        assert_eq!(ids, vec!["x", "y", "z"]);
        assert_eq!(buckets.next().unwrap().word.0, "x");
    }

    #[test]
    fn test_mastered_word_served_when_nothing_else_due() {
        let words = cards(&["m", "done"]);
        let mut progress = HashMap::new();
        progress.insert("m".to_string(), at_box(5, yesterday()));
        progress.insert("done".to_string(), at_box(2, today()));
        let picked = select_next(&words, &progress, today()).unwrap();
        assert_eq!(picked.word.0, "m");
        assert!(picked.box_number.is_mastered());
    }

    proptest! {
        #[test]
        fn prop_without_progress_first_word_in_box_one(n in 1usize..50) {
            let words: Vec<Card> = (0..n).map(|i| Card(format!("w{i}"))).collect();
            let picked = select_next(&words, &HashMap::new(), today()).unwrap();
            prop_assert_eq!(picked.word.0.as_str(), "w0");
            prop_assert_eq!(picked.box_number, BoxNumber::FIRST);
        }

        #[test]
        fn prop_selection_is_highest_due_box_below_five(
            boxes in proptest::collection::vec((1u8..=5, any::<bool>()), 1..30),
        ) {
            let words: Vec<Card> = (0..boxes.len()).map(|i| Card(format!("w{i}"))).collect();
            let progress: HashMap<String, ProgressState> = boxes
                .iter()
                .enumerate()
                .map(|(i, (b, studied_today))| {
                    let day = if *studied_today { today() } else { yesterday() };
                    (format!("w{i}"), at_box(*b, day))
                })
                .collect();

            let due: Vec<u8> = boxes
                .iter()
                .filter(|(_, studied_today)| !studied_today)
                .map(|(b, _)| *b)
                .collect();
            let expected = due
                .iter()
                .copied()
                .filter(|b| *b < 5)
                .max()
                .or_else(|| due.iter().copied().find(|b| *b == 5));

            let picked = select_next(&words, &progress, today()).map(|s| s.box_number.get());
            prop_assert_eq!(picked, expected);
        }
    }
}
