//! Common Types and Constants
//!
//! Shared data structures used across the scheduling modules.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==================== Constants ====================

/// Lowest box; new and failed words live here
pub const MIN_BOX: u8 = 1;

/// Highest box; "mastered" words
pub const MAX_BOX: u8 = 5;

/// Number of boxes
pub const BOX_COUNT: usize = MAX_BOX as usize;

/// Review priority for due words. Box 5 is only served once these are empty.
pub const REVIEW_ORDER: [u8; 4] = [4, 3, 2, 1];

/// Separator between accepted answers in a word's answer field
pub const ANSWER_SEPARATOR: char = ';';

// ==================== Box Number ====================

/// A Leitner box, always within `MIN_BOX..=MAX_BOX`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct BoxNumber(u8);

impl BoxNumber {
    pub const FIRST: Self = Self(MIN_BOX);
    pub const MASTERED: Self = Self(MAX_BOX);

    pub fn new(value: u8) -> Option<Self> {
        (MIN_BOX..=MAX_BOX).contains(&value).then_some(Self(value))
    }

    /// Reads a box number coming out of storage. Missing or zero values are
    /// treated as box 1, anything above the last box as the last box.
    pub fn from_stored(value: i64) -> Self {
        Self(value.clamp(MIN_BOX as i64, MAX_BOX as i64) as u8)
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// One box up, saturating at the mastered box.
    pub fn promote(self) -> Self {
        Self((self.0 + 1).min(MAX_BOX))
    }

    pub fn is_mastered(self) -> bool {
        self.0 == MAX_BOX
    }

    /// Zero-based slot, for per-box arrays.
    pub fn index(self) -> usize {
        (self.0 - MIN_BOX) as usize
    }

    pub fn all() -> impl Iterator<Item = Self> {
        (MIN_BOX..=MAX_BOX).map(Self)
    }
}

impl Default for BoxNumber {
    fn default() -> Self {
        Self::FIRST
    }
}

impl fmt::Display for BoxNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<BoxNumber> for u8 {
    fn from(value: BoxNumber) -> Self {
        value.0
    }
}

impl TryFrom<u8> for BoxNumber {
    type Error = InvalidBoxNumber;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(InvalidBoxNumber(value))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("box number {0} is outside {MIN_BOX}..={MAX_BOX}")]
pub struct InvalidBoxNumber(pub u8);

// ==================== Progress ====================

/// Per (student, word) learning state, as far as scheduling is concerned.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressState {
    pub box_number: BoxNumber,
    /// Calendar date of the last answer, no time component
    pub last_studied: NaiveDate,
    pub correct_count: u32,
    pub wrong_count: u32,
}

impl ProgressState {
    pub fn studied_on(&self, day: NaiveDate) -> bool {
        self.last_studied == day
    }
}
