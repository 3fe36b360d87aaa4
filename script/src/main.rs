use anyhow::Context;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod audit_questions;
mod check_mock_feasibility;
use audit_questions::audit_questions;
use check_mock_feasibility::check_mock_feasibility;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let file = std::fs::File::create("logs.jsonl").context("unable to create logs.jsonl")?;
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{}=info", env!("CARGO_CRATE_NAME")).into()),
        )
        .with(tracing_subscriber::fmt::layer().pretty())
        .with(tracing_subscriber::fmt::layer().json().with_writer(file))
        .init();
    dotenvy::dotenv().ok();

    let mongo_uri = std::env::var("MONGODB_URI").context("MONGODB_URI required")?;
    let client = schema::db::client(&mongo_uri, "question-bank-audit").await?;

    match audit_questions(&client).await {
        Ok(flagged) => info!(flagged, "question audit finished"),
        Err(e) => error!("{e:?}"),
    }
    match check_mock_feasibility(&client).await {
        Ok(true) => info!("mock exam can be generated from the current bank"),
        Ok(false) => error!("mock exam cannot be generated from the current bank"),
        Err(e) => error!("{e:?}"),
    }

    Ok(())
}
