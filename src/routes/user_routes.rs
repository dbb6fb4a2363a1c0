use axum::{
    routing::{get, post},
    Router,
};

use crate::controllers::user_controllers::{create_user, get_user};
use crate::state::AppState;

pub fn user_routes(state: AppState) -> Router {
    Router::new()
        .route("/", post(create_user::create_user))
        .route("/:userId", get(get_user::get_user))
        .with_state(state)
}
