//! Question bank records
//!
//! Shapes of the `topics` and `questions` collections, as stored in MongoDB
//! and served to clients.
pub mod db;

use serde::{Deserialize, Serialize};

/// A study topic, e.g. "Constitución Política del Perú".
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub short_name: String,
}

/// A multiple-choice question belonging to exactly one topic.
///
/// `correct_option` holds the text of the correct option, not its index, so
/// options can be reordered freely without touching the answer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    #[serde(rename = "_id")]
    pub id: String,
    pub topic_id: String,
    #[serde(rename = "question_text")]
    pub text: String,
    pub options: Vec<String>,
    pub correct_option: String,
    #[serde(rename = "tips", default, skip_serializing_if = "Option::is_none")]
    pub tip: Option<String>,
}

impl Question {
    /// Position of the correct option within `options`, if present.
    pub fn correct_index(&self) -> Option<usize> {
        self.options.iter().position(|o| o == &self.correct_option)
    }
}
