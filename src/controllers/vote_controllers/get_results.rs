use axum::{
    extract::{Path, State},
    Json,
};

use crate::services::aggregation::{self, Aggregate};
use crate::state::AppState;
use crate::utils::error::AppResult;

pub async fn get_poll_results(
    Path(poll_id): Path<String>,
    State(state): State<AppState>,
) -> AppResult<Json<Aggregate>> {
    let aggregate = aggregation::compute(&state.db, &poll_id).await?;

    Ok(Json(aggregate))
}
