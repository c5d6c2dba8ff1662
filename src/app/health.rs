//! 健康检查

use axum::response::Json;

use crate::core::response::HealthResponse;

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::running())
}
