use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// A poll and its options as stored in the `polls` collection.
///
/// Options carry no vote counter. Counts are always re-derived from the
/// committed `vote_records`, so concurrent writers cannot drift a stored
/// number out of sync with the votes that actually exist.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Poll {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub question: String,
    pub creator_id: ObjectId,
    pub options: Vec<PollOption>,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PollOption {
    pub id: String,
    pub text: String,
}
