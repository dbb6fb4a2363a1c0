use chrono::Utc;
use mongodb::{
    bson::{doc, oid::ObjectId},
    error::{ErrorKind, WriteFailure},
    Database,
};

use crate::models::{poll_models::Poll, user_models::User, vote_record_models::VoteRecord};
use crate::services::aggregation::{self, Aggregate};
use crate::utils::error::{AppError, AppResult};

/// MongoDB server error code for a unique-index violation.
const DUPLICATE_KEY: i32 = 11000;

/// Commits one vote for `(voter_id, option_id)` and returns the aggregate
/// recomputed after the insert.
///
/// There is no lookup of an existing vote before the insert: uniqueness is
/// enforced entirely by the storage-level index, so of two racing requests
/// for the same pair exactly one commits and the other surfaces as
/// `Conflict`. The conflict is an expected outcome, never retried and
/// never reported as an internal fault.
pub async fn record_vote(db: &Database, voter_id: &str, option_id: &str) -> AppResult<Aggregate> {
    let voter_obj_id = ObjectId::parse_str(voter_id)
        .map_err(|_| AppError::BadRequest("Invalid voter id".to_string()))?;

    let users = db.collection::<User>("users");
    users
        .find_one(doc! { "_id": voter_obj_id })
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let polls = db.collection::<Poll>("polls");
    let poll = polls
        .find_one(doc! { "options.id": option_id })
        .await?
        .ok_or_else(|| AppError::NotFound("Poll option not found".to_string()))?;

    let vote = VoteRecord {
        id: ObjectId::new(),
        voter_id: voter_obj_id,
        option_id: option_id.to_string(),
        created_at: Utc::now(),
    };

    let votes = db.collection::<VoteRecord>("vote_records");
    if let Err(err) = votes.insert_one(&vote).await {
        if is_duplicate_key(&err) {
            return Err(AppError::Conflict(
                "User has already voted for this option".to_string(),
            ));
        }
        return Err(err.into());
    }

    aggregation::compute_for_poll(db, &poll).await
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    match *err.kind {
        ErrorKind::Write(WriteFailure::WriteError(ref write_error)) => {
            write_error.code == DUPLICATE_KEY
        }
        _ => false,
    }
}
