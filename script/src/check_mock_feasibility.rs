use std::collections::HashMap;

use mongodb::{Client, bson::doc};
use tracing::{error, info};

use exam_utils::{generation::MockExamConfig, misc::validate_mock_config};
use schema::{
    Question,
    db::{QUESTION_COLLECTION, get_collection},
};

/// Checks that every SIECOPOL quota can be met by the stored bank.
pub async fn check_mock_feasibility(client: &Client) -> anyhow::Result<bool> {
    let question_collection = get_collection::<Question>(client, QUESTION_COLLECTION)?;
    let config = MockExamConfig::siecopol();

    let mut counts = HashMap::new();
    for quota in &config.topics {
        let count = question_collection
            .count_documents(doc! {"topic_id": quota.topic_id.as_str()})
            .await?;
        counts.insert(quota.topic_id.clone(), count as usize);
    }

    let shortfalls = validate_mock_config(&config, |topic_id| {
        counts.get(topic_id).copied().unwrap_or_default()
    });
    for shortfall in &shortfalls {
        error!(
            topic_id = %shortfall.topic_id,
            required = shortfall.required,
            available = shortfall.available,
            "topic cannot fill its mock exam block"
        );
    }
    info!(
        total = config.total_questions(),
        topics = config.topics.len(),
        "mock exam configuration checked"
    );

    Ok(shortfalls.is_empty())
}
