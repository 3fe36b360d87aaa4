use std::{collections::HashSet, sync::Arc};

use rand::{Rng, seq::SliceRandom};
use schema::{Question, Topic};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, trace};

use crate::{
    attempt::{Session, SessionKind, SessionQuestion, TopicBlock},
    error::Error,
    store::QuestionStore,
    timer::Timer,
};

/// Length of the SIECOPOL mock exam.
pub const MOCK_EXAM_DURATION_IN_S: u64 = 2 * 60 * 60;

/// Number of questions drawn from one topic in a mock exam.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicQuota {
    pub topic_id: String,
    pub number_of_questions: usize,
}

/// Composition of a fixed mock exam: topic blocks in exam order, plus its length.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MockExamConfig {
    pub duration_in_s: u64,
    pub topics: Vec<TopicQuota>,
}

impl MockExamConfig {
    /// The SIECOPOL table: 18 topics, 100 questions, two hours.
    pub fn siecopol() -> Self {
        const QUOTAS: [(&str, usize); 18] = [
            ("topic_01", 8),
            ("topic_02", 4),
            ("topic_03", 7),
            ("topic_04", 9),
            ("topic_05", 5),
            ("topic_06", 4),
            ("topic_07", 9),
            ("topic_08", 5),
            ("topic_09", 12),
            ("topic_10", 12),
            ("topic_11", 2),
            ("topic_12", 4),
            ("topic_13", 3),
            ("topic_14", 4),
            ("topic_15", 6),
            ("topic_16", 2),
            ("topic_17", 2),
            ("topic_18", 2),
        ];

        Self {
            duration_in_s: MOCK_EXAM_DURATION_IN_S,
            topics: QUOTAS
                .iter()
                .map(|(topic_id, number_of_questions)| TopicQuota {
                    topic_id: topic_id.to_string(),
                    number_of_questions: *number_of_questions,
                })
                .collect(),
        }
    }

    pub fn total_questions(&self) -> usize {
        self.topics.iter().map(|t| t.number_of_questions).sum()
    }
}

impl Default for MockExamConfig {
    fn default() -> Self {
        Self::siecopol()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QuizMode {
    /// Every question of the topic in store order.
    Practice { topic_id: String },
    /// `count` random questions of the topic.
    TopicExam { topic_id: String, count: usize },
    Mock(MockExamConfig),
}

/// Clamps a requested exam size to what a topic can supply, never below one.
pub fn clamp_count(requested: usize, available: usize) -> usize {
    requested.min(available).max(1)
}

/// Draws `count` distinct items in uniformly random order.
///
/// Fails rather than returning fewer than `count`.
pub fn draw<T, R: Rng + ?Sized>(
    mut items: Vec<T>,
    count: usize,
    topic_id: &str,
    rng: &mut R,
) -> Result<Vec<T>, Error> {
    if count == 0 {
        return Err(Error::InvalidCount(count));
    }
    if items.is_empty() {
        return Err(Error::EmptyResult(topic_id.to_string()));
    }
    if items.len() < count {
        return Err(Error::InsufficientQuestions {
            topic_id: topic_id.to_string(),
            requested: count,
            available: items.len(),
        });
    }

    items.shuffle(rng);
    items.truncate(count);
    trace!(topic_id, count, "drew questions");
    Ok(items)
}

/// Practice order: store order kept, each question's options shuffled.
pub fn practice_questions<R: Rng + ?Sized>(
    questions: Vec<Question>,
    rng: &mut R,
) -> Vec<SessionQuestion> {
    questions
        .into_iter()
        .map(|q| SessionQuestion::shuffled(Arc::new(q), rng))
        .collect()
}

/// A random subsample of one topic, each question's options shuffled.
pub fn topic_exam_questions<R: Rng + ?Sized>(
    questions: Vec<Question>,
    topic_id: &str,
    count: usize,
    rng: &mut R,
) -> Result<Vec<SessionQuestion>, Error> {
    let drawn = draw(questions, count, topic_id, rng)?;
    Ok(practice_questions(drawn, rng))
}

/// Fetches what `mode` needs from `store` and builds a fresh session.
///
/// Refuses to build an empty session.
#[instrument(skip_all, err(Debug))]
pub async fn start_session<S, R>(store: &S, mode: &QuizMode, rng: &mut R) -> Result<Session, Error>
where
    S: QuestionStore + ?Sized,
    R: Rng + ?Sized,
{
    let session = match mode {
        QuizMode::Practice { topic_id } => {
            let (topic, questions) = fetch_topic(store, topic_id).await?;
            let questions = practice_questions(questions, rng);
            single_topic_session(SessionKind::Practice, topic, questions)
        }
        QuizMode::TopicExam { topic_id, count } => {
            if *count == 0 {
                return Err(Error::InvalidCount(0));
            }
            let (topic, questions) = fetch_topic(store, topic_id).await?;
            let questions = topic_exam_questions(questions, topic_id, *count, rng)?;
            single_topic_session(SessionKind::TopicExam, topic, questions)
        }
        QuizMode::Mock(config) => mock_session(store, config, rng).await?,
    };

    debug!(
        kind = ?session.kind(),
        questions = session.len(),
        "session started"
    );
    Ok(session)
}

async fn fetch_topic<S: QuestionStore + ?Sized>(
    store: &S,
    topic_id: &str,
) -> Result<(Topic, Vec<Question>), Error> {
    let topic = store.get_topic(topic_id).await?;
    let questions = store.list_questions(topic_id).await?;
    if questions.is_empty() {
        return Err(Error::EmptyResult(topic_id.to_string()));
    }
    Ok((topic, questions))
}

fn single_topic_session(
    kind: SessionKind,
    topic: Topic,
    questions: Vec<SessionQuestion>,
) -> Session {
    let block = TopicBlock {
        topic_id: topic.id,
        name: topic.name.clone(),
        short_name: topic.short_name,
        start: 0,
        len: questions.len(),
    };
    Session::new(kind, Some(topic.name), questions, vec![block], Timer::stopwatch())
}

async fn mock_session<S, R>(
    store: &S,
    config: &MockExamConfig,
    rng: &mut R,
) -> Result<Session, Error>
where
    S: QuestionStore + ?Sized,
    R: Rng + ?Sized,
{
    let topics = store.list_topics().await?;
    let mut questions: Vec<SessionQuestion> = Vec::with_capacity(config.total_questions());
    let mut blocks = vec![];

    for quota in config.topics.iter().filter(|q| q.number_of_questions > 0) {
        let available = store.list_questions(&quota.topic_id).await?;
        let drawn = topic_exam_questions(
            available,
            &quota.topic_id,
            quota.number_of_questions,
            rng,
        )?;

        // Topics absent from the topic list are labelled by id.
        let topic = topics.iter().find(|t| t.id == quota.topic_id);
        blocks.push(TopicBlock {
            topic_id: quota.topic_id.clone(),
            name: topic.map_or_else(|| quota.topic_id.clone(), |t| t.name.clone()),
            short_name: topic.map_or_else(|| quota.topic_id.clone(), |t| t.short_name.clone()),
            start: questions.len(),
            len: drawn.len(),
        });
        questions.extend(drawn);
    }

    if questions.is_empty() {
        return Err(Error::EmptyResult("mock exam".to_string()));
    }
    validate_generation(&questions)?;

    Ok(Session::new(
        SessionKind::Mock,
        None,
        questions,
        blocks,
        Timer::countdown(config.duration_in_s),
    ))
}

/// Given generated session questions, validate basic properties:
/// 1) No duplicate question ids
pub fn validate_generation(questions: &[SessionQuestion]) -> Result<(), Error> {
    let mut seen = HashSet::with_capacity(questions.len());
    for question in questions {
        if !seen.insert(question.id()) {
            return Err(Error::Generation(format!(
                "question id {} appears more than once",
                question.id()
            )));
        }
    }
    Ok(())
}
