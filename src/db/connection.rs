use dotenvy::dotenv;
use mongodb::{
    bson::doc,
    options::{ClientOptions, IndexOptions},
    Client, Database, IndexModel,
};
use std::env;
use tracing::info;

use crate::models::vote_record_models::VoteRecord;
use crate::utils::error::{AppError, AppResult};

pub async fn init_db() -> AppResult<Database> {
    dotenv().ok();

    let mongo_uri = env::var("MONGO_URI")
        .map_err(|_| AppError::InternalError("MONGO_URI must be set in .env".to_string()))?;
    let db_name = env::var("DB_NAME")
        .map_err(|_| AppError::InternalError("DB_NAME must be set in .env".to_string()))?;

    let mut client_options = ClientOptions::parse(&mongo_uri)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to parse MongoDB URI: {}", e)))?;

    client_options.app_name = Some("RealtimePolls".to_string());

    let client = Client::with_options(client_options).map_err(|e| {
        AppError::DatabaseError(format!("Failed to initialize MongoDB client: {}", e))
    })?;

    let db = client.database(&db_name);
    ensure_vote_indexes(&db).await?;

    info!("database connection established");

    Ok(db)
}

/// The unique index on `(voter_id, option_id)` is the serialization point
/// for duplicate votes: of two racing inserts for the same pair, the
/// storage layer rejects the second one.
pub async fn ensure_vote_indexes(db: &Database) -> AppResult<()> {
    let votes = db.collection::<VoteRecord>("vote_records");

    let index = IndexModel::builder()
        .keys(doc! { "voter_id": 1, "option_id": 1 })
        .options(IndexOptions::builder().unique(true).build())
        .build();

    votes.create_index(index).await?;

    Ok(())
}
