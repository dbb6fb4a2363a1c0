use axum::{
    routing::get,
    Router,
};

use crate::controllers::poll_controllers::{create_poll, get_poll, polls, publish_poll};
use crate::state::AppState;

pub fn poll_routes(state: AppState) -> Router {
    Router::new()
        .route(
            "/",
            get(polls::get_all_polls).post(create_poll::create_poll),
        )
        .route(
            "/:pollId",
            get(get_poll::get_poll).put(publish_poll::publish_poll),
        )
        .with_state(state)
}
