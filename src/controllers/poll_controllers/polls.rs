use axum::{
    extract::{Query, State},
    Json,
};
use futures::TryStreamExt;
use mongodb::bson::doc;

use crate::controllers::poll_controllers::models::{ListPollsQuery, PollResponse};
use crate::models::poll_models::Poll;
use crate::services::aggregation;
use crate::state::AppState;
use crate::utils::error::AppResult;

pub async fn get_all_polls(
    Query(query): Query<ListPollsQuery>,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<PollResponse>>> {
    let filter = match query.published {
        Some(published) => doc! { "is_published": published },
        None => doc! {},
    };

    let polls: Vec<Poll> = state
        .db
        .collection::<Poll>("polls")
        .find(filter)
        .sort(doc! { "created_at": -1 })
        .await?
        .try_collect()
        .await?;

    let mut responses = Vec::with_capacity(polls.len());
    for poll in polls {
        let aggregate = aggregation::compute_for_poll(&state.db, &poll).await?;
        responses.push(PollResponse::from_parts(poll, aggregate));
    }

    Ok(Json(responses))
}
