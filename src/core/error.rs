//! 核心错误处理模块

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Serialize, Serializer};
use tracing::error;

use super::response::Status;

/// 单个字段的校验错误，序列化时只输出 `message`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }

    /// 必填字段缺失或为空
    pub fn required(field: &'static str) -> Self {
        Self::new(field, format!("{field} is required"))
    }
}

impl Serialize for FieldError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.message)
    }
}

/// 写入错误响应扩展中的错误分类，供请求日志中间件读取
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorKind(pub &'static str);

/// 核心错误类型
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("{0}")]
    BadRequest(String),
    #[error("Validation failed")]
    ValidationFailed(Vec<FieldError>),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    NotFound(String),
    #[error("Method not allowed")]
    MethodNotAllowed,
    #[error("internal error: {0}")]
    InternalServerError(String),
}

impl CoreError {
    pub fn user_not_found() -> Self {
        CoreError::NotFound("User not found".to_string())
    }

    pub fn endpoint_not_found() -> Self {
        CoreError::NotFound("Endpoint not found".to_string())
    }

    pub fn no_data() -> Self {
        CoreError::BadRequest("No data provided".to_string())
    }

    pub fn email_taken() -> Self {
        CoreError::Conflict("Email already exists".to_string())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            CoreError::BadRequest(_) | CoreError::ValidationFailed(_) => StatusCode::BAD_REQUEST,
            CoreError::Conflict(_) => StatusCode::CONFLICT,
            CoreError::NotFound(_) => StatusCode::NOT_FOUND,
            CoreError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            CoreError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        ErrorKind(match self {
            CoreError::BadRequest(_) => "bad_request",
            CoreError::ValidationFailed(_) => "validation_failed",
            CoreError::Conflict(_) => "conflict",
            CoreError::NotFound(_) => "not_found",
            CoreError::MethodNotAllowed => "method_not_allowed",
            CoreError::InternalServerError(_) => "internal",
        })
    }
}

impl From<JsonRejection> for CoreError {
    fn from(rejection: JsonRejection) -> Self {
        CoreError::BadRequest(format!("Invalid JSON body: {}", rejection.body_text()))
    }
}

/// 错误响应结构
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub status: Status,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: Status::Error,
            message: message.into(),
            errors: Vec::new(),
        }
    }

    /// 内部错误统一信封，不暴露任何内部细节
    pub fn internal() -> Self {
        Self::new("Internal server error")
    }
}

impl IntoResponse for CoreError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let kind = self.kind();
        let body = match self {
            CoreError::ValidationFailed(errors) => ErrorResponse {
                errors,
                ..ErrorResponse::new("Validation failed")
            },
            CoreError::InternalServerError(detail) => {
                error!("内部错误: {}", detail);
                ErrorResponse::internal()
            }
            CoreError::BadRequest(msg) | CoreError::Conflict(msg) | CoreError::NotFound(msg) => {
                ErrorResponse::new(msg)
            }
            CoreError::MethodNotAllowed => ErrorResponse::new("Method not allowed"),
        };

        let mut response = (status, Json(body)).into_response();
        response.extensions_mut().insert(kind);
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn validation_errors_serialize_as_plain_messages() {
        let body = ErrorResponse {
            errors: vec![
                FieldError::required("name"),
                FieldError::new("email", "Invalid email format"),
            ],
            ..ErrorResponse::new("Validation failed")
        };

        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "status": "error",
                "message": "Validation failed",
                "errors": ["name is required", "Invalid email format"],
            })
        );
    }

    #[test]
    fn error_responses_carry_their_kind() {
        let response = CoreError::email_taken().into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(
            response.extensions().get::<ErrorKind>(),
            Some(&ErrorKind("conflict"))
        );
    }
}
