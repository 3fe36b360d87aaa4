use std::fmt::Display;

use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::{Client, Collection, bson::doc};
use tracing::{debug, instrument};

use exam_utils::{error::Error, store::QuestionStore};
use schema::{
    Question, Topic,
    db::{DbError, QUESTION_COLLECTION, TOPIC_COLLECTION, default_database, get_collection},
};

/// Question bank backed by the `topics` and `questions` collections.
#[derive(Clone, Debug)]
pub struct MongoQuestionStore {
    client: Client,
    topics: Collection<Topic>,
    questions: Collection<Question>,
}

impl MongoQuestionStore {
    pub fn new(client: Client) -> Result<Self, DbError> {
        let topics = get_collection::<Topic>(&client, TOPIC_COLLECTION)?;
        let questions = get_collection::<Question>(&client, QUESTION_COLLECTION)?;
        Ok(Self {
            client,
            topics,
            questions,
        })
    }
}

fn store_error(e: impl Display) -> Error {
    Error::Store(e.to_string())
}

#[async_trait]
impl QuestionStore for MongoQuestionStore {
    #[instrument(skip_all, err(Debug))]
    async fn list_topics(&self) -> Result<Vec<Topic>, Error> {
        self.topics
            .find(doc! {})
            .sort(doc! {"name": 1})
            .await
            .map_err(store_error)?
            .try_collect()
            .await
            .map_err(store_error)
    }

    #[instrument(skip(self), err(Debug))]
    async fn get_topic(&self, topic_id: &str) -> Result<Topic, Error> {
        self.topics
            .find_one(doc! {"_id": topic_id})
            .await
            .map_err(store_error)?
            .ok_or_else(|| Error::NotFound(format!("topic {topic_id}")))
    }

    #[instrument(skip(self), err(Debug))]
    async fn list_questions(&self, topic_id: &str) -> Result<Vec<Question>, Error> {
        self.questions
            .find(doc! {"topic_id": topic_id})
            .sort(doc! {"_id": 1})
            .await
            .map_err(store_error)?
            .try_collect()
            .await
            .map_err(store_error)
    }

    #[instrument(skip(self), err(Debug))]
    async fn get_question(&self, id: &str) -> Result<Question, Error> {
        self.questions
            .find_one(doc! {"_id": id})
            .await
            .map_err(store_error)?
            .ok_or_else(|| Error::NotFound(format!("question {id}")))
    }

    /// `$sample` picks distinct documents, so the pool size is checked first
    /// instead of accepting a short draw.
    #[instrument(skip(self), err(Debug))]
    async fn sample_questions(&self, topic_id: &str, count: usize) -> Result<Vec<Question>, Error> {
        if count == 0 {
            return Err(Error::InvalidCount(count));
        }
        let available = self.count_questions(topic_id).await?;
        if available == 0 {
            return Err(Error::EmptyResult(topic_id.to_string()));
        }
        if available < count {
            return Err(Error::InsufficientQuestions {
                topic_id: topic_id.to_string(),
                requested: count,
                available,
            });
        }

        let questions: Vec<Question> = self
            .questions
            .aggregate([
                doc! {"$match": {"topic_id": topic_id}},
                doc! {"$sample": {"size": count as i64}},
            ])
            .with_type::<Question>()
            .await
            .map_err(store_error)?
            .try_collect()
            .await
            .map_err(store_error)?;
        debug!(drawn = questions.len(), "sampled questions");

        Ok(questions)
    }

    #[instrument(skip(self), err(Debug))]
    async fn count_questions(&self, topic_id: &str) -> Result<usize, Error> {
        let count = self
            .questions
            .count_documents(doc! {"topic_id": topic_id})
            .await
            .map_err(store_error)?;
        Ok(count as usize)
    }

    async fn ping(&self) -> Result<(), Error> {
        default_database(&self.client)
            .map_err(store_error)?
            .run_command(doc! {"ping": 1})
            .await
            .map_err(store_error)?;
        Ok(())
    }
}
