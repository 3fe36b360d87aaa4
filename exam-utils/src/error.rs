#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("topic {topic_id} has {available} questions, {requested} requested")]
    InsufficientQuestions {
        topic_id: String,
        requested: usize,
        available: usize,
    },
    #[error("topic {0} has no questions")]
    EmptyResult(String),
    #[error("{0} not found")]
    NotFound(String),
    #[error("question count must be a positive number, got {0}")]
    InvalidCount(usize),
    #[error("position {position} is outside a session of {len} questions")]
    InvalidPosition { position: usize, len: usize },
    #[error("option {option} is outside question {position} with {len} options")]
    InvalidOption {
        position: usize,
        option: usize,
        len: usize,
    },
    #[error("session already finished")]
    Finished,
    #[error("{0}")]
    Generation(String),
    #[error("{0}")]
    Store(String),
}
