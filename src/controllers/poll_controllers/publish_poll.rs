use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use mongodb::bson::{doc, oid::ObjectId, to_bson};

use crate::controllers::poll_controllers::models::{PollResponse, PublishPollRequest};
use crate::models::poll_models::Poll;
use crate::services::aggregation;
use crate::state::AppState;
use crate::utils::error::{AppError, AppResult};

/// The publication flag is the only part of a poll this service mutates
/// after creation.
pub async fn publish_poll(
    Path(poll_id): Path<String>,
    State(state): State<AppState>,
    Json(payload): Json<PublishPollRequest>,
) -> AppResult<Json<PollResponse>> {
    let obj_id = ObjectId::parse_str(&poll_id)
        .map_err(|_| AppError::BadRequest("Invalid poll id".to_string()))?;

    let polls = state.db.collection::<Poll>("polls");

    polls
        .find_one(doc! { "_id": obj_id })
        .await?
        .ok_or_else(|| AppError::NotFound("Poll not found".to_string()))?;

    polls
        .update_one(
            doc! { "_id": obj_id },
            doc! { "$set": {
                "is_published": payload.is_published,
                "updated_at": to_bson(&Utc::now())?,
            } },
        )
        .await?;

    let updated = polls
        .find_one(doc! { "_id": obj_id })
        .await?
        .ok_or_else(|| AppError::NotFound("Poll not found".to_string()))?;

    let aggregate = aggregation::compute_for_poll(&state.db, &updated).await?;

    Ok(Json(PollResponse::from_parts(updated, aggregate)))
}
