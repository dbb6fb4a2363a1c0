use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::poll_models::Poll;
use crate::services::aggregation::{Aggregate, OptionCount};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePollRequest {
    pub question: String,
    pub options: Vec<String>,
    pub creator_id: String,
    #[serde(default)]
    pub is_published: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishPollRequest {
    pub is_published: bool,
}

#[derive(Debug, Deserialize)]
pub struct ListPollsQuery {
    pub published: Option<bool>,
}

/// Poll responses embed the derived per-option counts, so every read of a
/// poll already carries its current results.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PollResponse {
    pub id: String,
    pub question: String,
    pub creator_id: String,
    pub options: Vec<OptionCount>,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub total_votes: i64,
}

impl PollResponse {
    pub fn from_parts(poll: Poll, aggregate: Aggregate) -> Self {
        Self {
            id: poll.id.to_hex(),
            question: poll.question,
            creator_id: poll.creator_id.to_hex(),
            options: aggregate.results,
            is_published: poll.is_published,
            created_at: poll.created_at,
            total_votes: aggregate.total_votes,
        }
    }
}
