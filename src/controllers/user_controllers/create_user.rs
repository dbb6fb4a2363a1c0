use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use mongodb::bson::oid::ObjectId;

use crate::controllers::user_controllers::models::{CreateUserRequest, UserResponse};
use crate::models::user_models::User;
use crate::state::AppState;
use crate::utils::error::{AppError, AppResult};

pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    let name = payload
        .name
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .ok_or_else(|| AppError::ValidationError("Name is required".to_string()))?;

    let user = User {
        id: ObjectId::new(),
        name,
        created_at: Utc::now(),
    };

    state
        .db
        .collection::<User>("users")
        .insert_one(&user)
        .await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}
