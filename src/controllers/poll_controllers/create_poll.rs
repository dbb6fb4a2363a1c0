use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use mongodb::bson::{doc, oid::ObjectId};

use crate::controllers::poll_controllers::models::{CreatePollRequest, PollResponse};
use crate::models::poll_models::{Poll, PollOption};
use crate::models::user_models::User;
use crate::services::aggregation;
use crate::state::AppState;
use crate::utils::error::{AppError, AppResult};

pub async fn create_poll(
    State(state): State<AppState>,
    Json(payload): Json<CreatePollRequest>,
) -> AppResult<(StatusCode, Json<PollResponse>)> {
    if payload.question.trim().is_empty() {
        return Err(AppError::ValidationError(
            "Question and at least 2 options are required".to_string(),
        ));
    }

    let options: Vec<String> = payload
        .options
        .iter()
        .map(|option| option.trim().to_string())
        .filter(|option| !option.is_empty())
        .collect();

    if options.len() < 2 {
        return Err(AppError::ValidationError(
            "Question and at least 2 options are required".to_string(),
        ));
    }

    let mut deduped = Vec::new();
    for option in &options {
        if !deduped.contains(option) {
            deduped.push(option.clone());
        }
    }

    if deduped.len() != options.len() {
        return Err(AppError::ValidationError(
            "Poll options must be unique".to_string(),
        ));
    }

    let creator_id = ObjectId::parse_str(&payload.creator_id)
        .map_err(|_| AppError::BadRequest("Invalid creator id".to_string()))?;

    state
        .db
        .collection::<User>("users")
        .find_one(doc! { "_id": creator_id })
        .await?
        .ok_or_else(|| AppError::NotFound("Creator not found".to_string()))?;

    let now = Utc::now();

    let poll = Poll {
        id: ObjectId::new(),
        question: payload.question,
        creator_id,
        options: options
            .into_iter()
            .map(|text| PollOption {
                id: ObjectId::new().to_hex(),
                text,
            })
            .collect(),
        is_published: payload.is_published,
        created_at: now,
        updated_at: now,
    };

    state
        .db
        .collection::<Poll>("polls")
        .insert_one(&poll)
        .await?;

    let aggregate = aggregation::zeroed(&poll);

    Ok((
        StatusCode::CREATED,
        Json(PollResponse::from_parts(poll, aggregate)),
    ))
}
