use axum::{
    extract::{Path, State},
    Json,
};
use mongodb::bson::{doc, oid::ObjectId};

use crate::controllers::user_controllers::models::UserResponse;
use crate::models::user_models::User;
use crate::state::AppState;
use crate::utils::error::{AppError, AppResult};

pub async fn get_user(
    Path(user_id): Path<String>,
    State(state): State<AppState>,
) -> AppResult<Json<UserResponse>> {
    let obj_id = ObjectId::parse_str(&user_id)
        .map_err(|_| AppError::BadRequest("Invalid user id".to_string()))?;

    let user = state
        .db
        .collection::<User>("users")
        .find_one(doc! { "_id": obj_id })
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(UserResponse::from(user)))
}
