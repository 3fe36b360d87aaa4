//! Exam Session Utilities
//!
//! ## Current API
//!
//! - Read questions and topics through a `QuestionStore`
//! - Build sessions for by-topic practice, topic exams and the SIECOPOL mock exam
//! - Record, clear and lock answers
//! - Drive stopwatch and countdown timers, with a cancellable ticker
//! - Score sessions and list mistakes for review
//! - Narrate topics for the audio study mode
//! - Validate questions for data-integrity defects
//!
pub mod attempt;
pub mod audio;
pub mod error;
pub mod generation;
pub mod misc;
pub mod score;
pub mod store;
pub mod ticker;
pub mod timer;

pub use schema::{Question, Topic};
