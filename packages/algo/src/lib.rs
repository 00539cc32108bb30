//! # leitner-algo - five-box scheduling core
//!
//! Pure, I/O-free pieces of the five-box (Leitner) vocabulary scheduler:
//!
//! - **Box model** - box numbers 1..=5 and how an answer moves a word between them
//! - **Answer matching** - normalisation and `;`-separated accepted answers
//! - **Selection** - bucketing a class's words by box and picking the next one
//! - **Stats** - per-box tallies for a student
//!
//! Storage, HTTP and CSV import live in `leitner-backend`; everything here
//! works on plain values so it can be tested and benchmarked in isolation.
//!
//! ## Module structure
//!
//! - [`types`] - box numbers, progress state, constants
//! - [`answer`] - answer normalisation and matching
//! - [`boxes`] - box state machine
//! - [`selection`] - bucket partitioning and next-word selection
//! - [`stats`] - box tallies
//!
//! ## Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use leitner_algo::{apply_answer, check_answer, AnswerOutcome, BoxNumber};
//!
//! let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
//! let outcome = AnswerOutcome::from_correct(check_answer(" Merhaba ", "merhaba;selam"));
//! let state = apply_answer(None, outcome, today);
//! assert_eq!(state.box_number, BoxNumber::new(2).unwrap());
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod answer;
pub mod boxes;
pub mod selection;
pub mod stats;
pub mod types;

// ============================================================================
// Re-exports
// ============================================================================

pub use types::*;

pub use answer::{accepted_answers, check_answer, normalize_answer};
pub use boxes::{apply_answer, AnswerOutcome};
pub use selection::{placement, select_next, Buckets, Selection, StudyItem};
pub use stats::{tally, BoxTally};
