//! Runs against the database in `MONGODB_URI`, read-only. Skipped when unset.
use futures_util::TryStreamExt;
use mongodb::bson::{Document, doc};

use exam_utils::{misc::validate_question, store::QuestionStore};
use question_service::db::MongoQuestionStore;
use schema::{
    Question, Topic,
    db::{QUESTION_COLLECTION, TOPIC_COLLECTION, client, get_collection},
};

async fn connect() -> Option<mongodb::Client> {
    let Ok(uri) = std::env::var("MONGODB_URI") else {
        eprintln!("MONGODB_URI not set, skipping");
        return None;
    };
    Some(client(&uri, "question-service-tests").await.unwrap())
}

/// Every stored record deserializes into the schema types.
#[tokio::test]
async fn stored_records_match_schema() {
    let Some(client) = connect().await else {
        return;
    };

    let topics = get_collection::<Document>(&client, TOPIC_COLLECTION).unwrap();
    let mut cursor = topics.find(doc! {}).await.unwrap();
    while let Some(raw) = cursor.try_next().await.unwrap() {
        let id = raw.get("_id").cloned();
        mongodb::bson::from_document::<Topic>(raw)
            .unwrap_or_else(|e| panic!("topic {id:?} does not match schema: {e}"));
    }

    let questions = get_collection::<Document>(&client, QUESTION_COLLECTION).unwrap();
    let mut cursor = questions.find(doc! {}).await.unwrap();
    while let Some(raw) = cursor.try_next().await.unwrap() {
        let id = raw.get("_id").cloned();
        mongodb::bson::from_document::<Question>(raw)
            .unwrap_or_else(|e| panic!("question {id:?} does not match schema: {e}"));
    }
}

#[tokio::test]
async fn store_contract_holds() {
    let Some(client) = connect().await else {
        return;
    };
    let store = MongoQuestionStore::new(client).unwrap();
    store.ping().await.unwrap();

    let topics = store.list_topics().await.unwrap();
    assert!(topics.windows(2).all(|w| w[0].name <= w[1].name));

    for topic in topics.iter().take(3) {
        let questions = store.list_questions(&topic.id).await.unwrap();
        assert!(questions.windows(2).all(|w| w[0].id < w[1].id));
        assert_eq!(
            store.count_questions(&topic.id).await.unwrap(),
            questions.len()
        );

        if questions.is_empty() {
            continue;
        }
        let k = questions.len().min(5);
        let sample = store.sample_questions(&topic.id, k).await.unwrap();
        assert_eq!(sample.len(), k);
        assert!(sample.iter().all(|q| q.topic_id == topic.id));

        let too_many = store.sample_questions(&topic.id, questions.len() + 1).await;
        assert!(too_many.is_err());

        let issues = validate_question(&questions[0]);
        if !issues.is_empty() {
            eprintln!("{}: {issues:?}", questions[0].id);
        }
    }
}
