//! 核心中间件模块

use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;
use tracing::{info, warn};

use super::error::ErrorKind;

/// 请求日志中间件
///
/// 成功请求记为 `info`；错误响应记为 `warn`，并带上 `CoreError` 写入的错误分类。
pub async fn request_logging_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let response = next.run(req).await;
    let status = response.status().as_u16();
    let elapsed_ms = start.elapsed().as_millis() as u64;

    match response.extensions().get::<ErrorKind>() {
        Some(ErrorKind(kind)) => warn!(%method, %path, status, elapsed_ms, kind = *kind, "请求被拒绝"),
        None if response.status().is_client_error() || response.status().is_server_error() => {
            warn!(%method, %path, status, elapsed_ms, "请求失败")
        }
        None => info!(%method, %path, status, elapsed_ms, "请求完成"),
    }

    response
}
