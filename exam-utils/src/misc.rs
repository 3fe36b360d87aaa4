use std::{collections::HashSet, fmt};

use schema::Question;

use crate::generation::MockExamConfig;

/// A data-quality defect in a stored question.
///
/// Defects are advisory: sessions still run, but the defect shows up in
/// results (a question without its correct option can never be answered
/// correctly).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IntegrityIssue {
    EmptyText,
    TooFewOptions(usize),
    DuplicateOption(String),
    MissingCorrectOption(String),
}

impl fmt::Display for IntegrityIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntegrityIssue::EmptyText => write!(f, "question text is empty"),
            IntegrityIssue::TooFewOptions(n) => write!(f, "only {n} option(s), at least 2 required"),
            IntegrityIssue::DuplicateOption(o) => write!(f, "option {o:?} appears more than once"),
            IntegrityIssue::MissingCorrectOption(o) => {
                write!(f, "correct option {o:?} is not among the options")
            }
        }
    }
}

/// Validate Question:
/// - `text` is not empty
/// - `options` has at least two entries
/// - `options` has no duplicates
/// - `correct_option` is one of `options`
pub fn validate_question(question: &Question) -> Vec<IntegrityIssue> {
    let mut issues = vec![];

    if question.text.trim().is_empty() {
        issues.push(IntegrityIssue::EmptyText);
    }
    if question.options.len() < 2 {
        issues.push(IntegrityIssue::TooFewOptions(question.options.len()));
    }

    let mut seen = HashSet::new();
    for option in &question.options {
        if !seen.insert(option) {
            issues.push(IntegrityIssue::DuplicateOption(option.clone()));
        }
    }

    if question.correct_index().is_none() {
        issues.push(IntegrityIssue::MissingCorrectOption(
            question.correct_option.clone(),
        ));
    }

    issues
}

/// A mock exam topic whose bank cannot supply its quota.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuotaShortfall {
    pub topic_id: String,
    pub required: usize,
    pub available: usize,
}

/// Checks every quota of `config` against per-topic question counts.
///
/// A "solvable" config has enough questions in every topic block.
pub fn validate_mock_config<F>(config: &MockExamConfig, mut count_for: F) -> Vec<QuotaShortfall>
where
    F: FnMut(&str) -> usize,
{
    config
        .topics
        .iter()
        .filter_map(|quota| {
            let available = count_for(&quota.topic_id);
            (available < quota.number_of_questions).then(|| QuotaShortfall {
                topic_id: quota.topic_id.clone(),
                required: quota.number_of_questions,
                available,
            })
        })
        .collect()
}
