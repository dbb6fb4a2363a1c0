use axum::{
    routing::{get, post},
    Router,
};

use crate::controllers::vote_controllers::{cast_vote, get_results, get_user_votes};
use crate::state::AppState;

pub fn vote_routes(state: AppState) -> Router {
    Router::new()
        .route("/", post(cast_vote::cast_vote))
        .route("/poll/:pollId", get(get_results::get_poll_results))
        .route("/user/:userId", get(get_user_votes::get_user_votes))
        .with_state(state)
}
