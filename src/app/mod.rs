//! 应用层：路由装配

pub mod health;
pub mod users;

use std::any::Any;

use axum::{
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

use crate::core::{error::CoreError, middleware::request_logging_middleware};
use users::handler::{self, AppState};

/// 构建完整的 HTTP 路由
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/users",
            get(handler::list_users)
                .post(handler::create_user)
                .fallback(method_not_allowed),
        )
        .route(
            "/users/:id",
            get(handler::get_user)
                .put(handler::update_user)
                .delete(handler::delete_user)
                .fallback(method_not_allowed),
        )
        .route(
            "/health",
            get(health::health_check).fallback(method_not_allowed),
        )
        .fallback(endpoint_not_found)
        .layer(middleware::from_fn(request_logging_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::custom(handle_panic))
        .with_state(state)
}

async fn endpoint_not_found() -> CoreError {
    CoreError::endpoint_not_found()
}

async fn method_not_allowed() -> CoreError {
    CoreError::MethodNotAllowed
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");

    CoreError::InternalServerError(format!("处理请求时发生 panic: {detail}")).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::to_bytes, http::StatusCode};
    use serde_json::{json, Value};

    #[tokio::test]
    async fn panics_become_internal_error_envelope() {
        let response = handle_panic(Box::new("boom"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(!text.contains("boom"));

        let body: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(
            body,
            json!({ "status": "error", "message": "Internal server error" })
        );
    }

    #[tokio::test]
    async fn owned_panic_messages_are_hidden_too() {
        let response = handle_panic(Box::new(String::from("secret detail")));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(!String::from_utf8_lossy(&bytes).contains("secret"));
    }
}
