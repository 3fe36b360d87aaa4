use mongodb::{Client, Collection, Database, bson::doc, options::ClientOptions};
use serde::{Serialize, de::DeserializeOwned};
use tracing::debug;

pub const TOPIC_COLLECTION: &str = "topics";
pub const QUESTION_COLLECTION: &str = "questions";

#[derive(thiserror::Error, Debug)]
pub enum DbError {
    #[error("database needs to be defined in the URI")]
    MissingDatabase,
    // Froms
    #[error("{0}")]
    MongoDB(#[from] mongodb::error::Error),
}

/// Database named in the connection URI.
pub fn default_database(client: &Client) -> Result<Database, DbError> {
    client.default_database().ok_or(DbError::MissingDatabase)
}

/// Returns a typed handle to `collection_name` in the database named by the URI.
pub fn get_collection<T>(client: &Client, collection_name: &str) -> Result<Collection<T>, DbError>
where
    T: Send + Sync + DeserializeOwned + Serialize,
{
    let db = default_database(client)?;
    Ok(db.collection::<T>(collection_name))
}

/// Connects to the cluster and pings the default database.
pub async fn client(uri: &str, app_name: &str) -> Result<Client, DbError> {
    let mut client_options = ClientOptions::parse(uri).await?;
    client_options.app_name = Some(app_name.to_string());

    let client = Client::with_options(client_options)?;

    default_database(&client)?
        .run_command(doc! {"ping": 1})
        .await?;
    debug!(app_name, "connected to database");

    Ok(client)
}
