use std::collections::HashMap;

use anyhow::Context;
use futures_util::StreamExt;
use indicatif::ProgressBar;
use mongodb::{Client, bson::doc};
use tracing::{debug, warn};

use exam_utils::misc::validate_question;
use schema::{
    Question,
    db::{QUESTION_COLLECTION, get_collection},
};

/// Walks every stored question and logs integrity issues.
///
/// Returns the number of questions with at least one issue.
pub async fn audit_questions(client: &Client) -> anyhow::Result<u64> {
    let question_collection = get_collection::<Question>(client, QUESTION_COLLECTION)?;

    let question_count = question_collection
        .count_documents(doc! {})
        .await
        .context("unable to get question count")?;

    let mut question_cursor = question_collection
        .find(doc! {})
        .sort(doc! {"_id": 1})
        .batch_size(100)
        .await?;

    let pb = ProgressBar::new(question_count);
    let mut flagged = 0;
    let mut per_topic: HashMap<String, u64> = HashMap::new();

    while let Some(question) = question_cursor.next().await {
        pb.inc(1);
        let question = match question {
            Ok(q) => q,
            Err(e) => {
                warn!(error = %e, "unable to deserialize question");
                flagged += 1;
                continue;
            }
        };

        *per_topic.entry(question.topic_id.clone()).or_default() += 1;

        let issues = validate_question(&question);
        if !issues.is_empty() {
            flagged += 1;
            for issue in issues {
                warn!(question = %question.id, topic = %question.topic_id, %issue);
            }
        }
    }

    pb.finish_with_message("Questions checked");
    for (topic_id, count) in &per_topic {
        debug!(topic_id, count, "questions per topic");
    }

    Ok(flagged)
}
