use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// One committed vote. Append-only: records are never updated or removed.
///
/// The `vote_records` collection holds a unique index on
/// `(voter_id, option_id)`, so at most one record can ever exist per pair.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct VoteRecord {
    #[serde(rename = "_id")]
    pub id: ObjectId,

    pub voter_id: ObjectId,

    pub option_id: String,

    pub created_at: DateTime<Utc>,
}
