use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    Json,
};
use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId};

use crate::controllers::vote_controllers::models::UserVoteResponse;
use crate::models::{poll_models::Poll, user_models::User, vote_record_models::VoteRecord};
use crate::state::AppState;
use crate::utils::error::{AppError, AppResult};

pub async fn get_user_votes(
    Path(user_id): Path<String>,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<UserVoteResponse>>> {
    let user_obj_id = ObjectId::parse_str(&user_id)
        .map_err(|_| AppError::BadRequest("Invalid user id".to_string()))?;

    state
        .db
        .collection::<User>("users")
        .find_one(doc! { "_id": user_obj_id })
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let votes = state.db.collection::<VoteRecord>("vote_records");
    let records: Vec<VoteRecord> = votes
        .find(doc! { "voter_id": user_obj_id })
        .sort(doc! { "created_at": -1 })
        .await?
        .try_collect()
        .await?;

    let option_ids: Vec<String> = records.iter().map(|vote| vote.option_id.clone()).collect();

    let polls: Vec<Poll> = state
        .db
        .collection::<Poll>("polls")
        .find(doc! { "options.id": { "$in": option_ids } })
        .await?
        .try_collect()
        .await?;

    let mut context: HashMap<String, (String, String, String)> = HashMap::new();
    for poll in &polls {
        for option in &poll.options {
            context.insert(
                option.id.clone(),
                (poll.id.to_hex(), poll.question.clone(), option.text.clone()),
            );
        }
    }

    let responses: Vec<UserVoteResponse> = records
        .into_iter()
        .filter_map(|vote| {
            context
                .get(&vote.option_id)
                .map(|(poll_id, question, option_text)| UserVoteResponse {
                    id: vote.id.to_hex(),
                    poll_id: poll_id.clone(),
                    question: question.clone(),
                    option_id: vote.option_id,
                    option_text: option_text.clone(),
                    created_at: vote.created_at,
                })
        })
        .collect();

    Ok(Json(responses))
}
