use std::sync::Arc;

use async_trait::async_trait;
use rand::{SeedableRng, rngs::StdRng};
use schema::{Question, Topic};
use tokio::sync::Mutex;

use crate::{error::Error, generation::draw};

/// Read-only access to the question bank.
///
/// Store order for `list_questions` is ascending question id; topics are
/// listed alphabetically by name.
#[async_trait]
pub trait QuestionStore: Send + Sync {
    async fn list_topics(&self) -> Result<Vec<Topic>, Error>;

    async fn get_topic(&self, topic_id: &str) -> Result<Topic, Error>;

    async fn list_questions(&self, topic_id: &str) -> Result<Vec<Question>, Error>;

    async fn get_question(&self, id: &str) -> Result<Question, Error>;

    /// Draws `count` distinct questions of a topic in random order.
    ///
    /// Fails with `InsufficientQuestions` rather than returning a short list.
    async fn sample_questions(&self, topic_id: &str, count: usize) -> Result<Vec<Question>, Error>;

    async fn count_questions(&self, topic_id: &str) -> Result<usize, Error>;

    /// Checks the backend is reachable.
    async fn ping(&self) -> Result<(), Error> {
        Ok(())
    }
}

/// Question bank held in memory, used for fixtures and tests.
///
/// Clones share one sampling RNG.
#[derive(Clone, Debug)]
pub struct InMemoryStore {
    topics: Vec<Topic>,
    questions: Vec<Question>,
    rng: Arc<Mutex<StdRng>>,
}

impl InMemoryStore {
    pub fn new(topics: Vec<Topic>, questions: Vec<Question>) -> Self {
        Self::with_rng(topics, questions, StdRng::from_os_rng())
    }

    /// A store whose `sample_questions` draws from `rng`.
    pub fn with_rng(topics: Vec<Topic>, questions: Vec<Question>, rng: StdRng) -> Self {
        Self {
            topics,
            questions,
            rng: Arc::new(Mutex::new(rng)),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new(vec![], vec![])
    }
}

#[async_trait]
impl QuestionStore for InMemoryStore {
    async fn list_topics(&self) -> Result<Vec<Topic>, Error> {
        let mut topics = self.topics.clone();
        topics.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(topics)
    }

    async fn get_topic(&self, topic_id: &str) -> Result<Topic, Error> {
        self.topics
            .iter()
            .find(|t| t.id == topic_id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("topic {topic_id}")))
    }

    async fn list_questions(&self, topic_id: &str) -> Result<Vec<Question>, Error> {
        let mut questions: Vec<Question> = self
            .questions
            .iter()
            .filter(|q| q.topic_id == topic_id)
            .cloned()
            .collect();
        questions.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(questions)
    }

    async fn get_question(&self, id: &str) -> Result<Question, Error> {
        self.questions
            .iter()
            .find(|q| q.id == id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("question {id}")))
    }

    async fn sample_questions(&self, topic_id: &str, count: usize) -> Result<Vec<Question>, Error> {
        let questions = self.list_questions(topic_id).await?;
        let mut rng = self.rng.lock().await;
        draw(questions, count, topic_id, &mut *rng)
    }

    async fn count_questions(&self, topic_id: &str) -> Result<usize, Error> {
        Ok(self
            .questions
            .iter()
            .filter(|q| q.topic_id == topic_id)
            .count())
    }
}
