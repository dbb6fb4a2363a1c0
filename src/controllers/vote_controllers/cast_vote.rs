use axum::{extract::State, http::StatusCode, Json};

use crate::controllers::vote_controllers::models::CastVoteRequest;
use crate::realtime::dispatcher::VoteUpdate;
use crate::services::aggregation::Aggregate;
use crate::services::vote_recorder;
use crate::state::AppState;
use crate::utils::error::{AppError, AppResult};

pub async fn cast_vote(
    State(state): State<AppState>,
    Json(payload): Json<CastVoteRequest>,
) -> AppResult<(StatusCode, Json<Aggregate>)> {
    let (Some(voter_id), Some(option_id)) = (payload.voter_id, payload.option_id) else {
        return Err(AppError::BadRequest(
            "Voter ID and option ID are required".to_string(),
        ));
    };

    let aggregate = vote_recorder::record_vote(&state.db, &voter_id, &option_id).await?;

    // The vote is already durable; the push to observers is best effort.
    state.updates.publish(VoteUpdate::from(aggregate.clone()));

    Ok((StatusCode::CREATED, Json(aggregate)))
}
