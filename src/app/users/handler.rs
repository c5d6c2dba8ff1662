//! 用户处理器

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::Json,
};
use serde_json::Value;

use super::{
    model::{User, UserPayload},
    service::UserRegistry,
};
use crate::core::{error::CoreError, extract::UserId, response::ApiResponse};

#[derive(Clone)]
pub struct AppState {
    pub user_registry: UserRegistry,
}

pub async fn list_users(State(state): State<AppState>) -> Json<ApiResponse<Vec<User>>> {
    let users = state.user_registry.list();
    let count = users.len();
    Json(ApiResponse::success(users).with_count(count))
}

pub async fn get_user(
    State(state): State<AppState>,
    UserId(id): UserId,
) -> Result<Json<ApiResponse<User>>, CoreError> {
    let user = state.user_registry.get(id)?;
    Ok(Json(ApiResponse::success(user)))
}

pub async fn create_user(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<User>>), CoreError> {
    let payload = UserPayload::from_body(body)?;
    let user = state.user_registry.create(payload)?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(user).with_message("User created successfully")),
    ))
}

pub async fn update_user(
    State(state): State<AppState>,
    UserId(id): UserId,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ApiResponse<User>>, CoreError> {
    let payload = match UserPayload::from_body(body) {
        Ok(payload) => payload,
        Err(err) => {
            // 未知 ID 优先报告 404
            state.user_registry.get(id)?;
            return Err(err);
        }
    };

    let user = state.user_registry.update(id, payload)?;
    Ok(Json(
        ApiResponse::success(user).with_message("User updated successfully"),
    ))
}

pub async fn delete_user(
    State(state): State<AppState>,
    UserId(id): UserId,
) -> Result<Json<ApiResponse<User>>, CoreError> {
    let user = state.user_registry.delete(id)?;
    Ok(Json(
        ApiResponse::success(user).with_message("User deleted successfully"),
    ))
}
