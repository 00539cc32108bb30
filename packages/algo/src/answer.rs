//! Answer Matching
//!
//! A word stores one or more accepted answers separated by `;`. A submission
//! is correct when, after trimming and lower-casing, it equals one of them
//! exactly. No fuzzy matching, no partial credit.

use crate::types::ANSWER_SEPARATOR;

/// Trim surrounding whitespace and lower-case.
pub fn normalize_answer(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// The normalised accepted answers of a stored answer field, in stored order.
pub fn accepted_answers(stored: &str) -> impl Iterator<Item = String> + '_ {
    stored.split(ANSWER_SEPARATOR).map(normalize_answer)
}

pub fn check_answer(submitted: &str, stored: &str) -> bool {
    let submitted = normalize_answer(submitted);
    accepted_answers(stored).any(|candidate| candidate == submitted)
}
