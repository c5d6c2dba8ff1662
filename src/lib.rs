//! # 用户注册表服务
//!
//! 进程内的用户 CRUD 服务，通过 JSON over HTTP 暴露：
//! - `app`：路由、处理器、用户模型与注册表服务
//! - `core`：统一错误类型、响应信封、路径提取器、请求日志中间件
//! - `infrastructure`：TOML 配置与 tracing 日志

pub mod app;
pub mod core;
pub mod infrastructure;

pub use app::{router, users::handler::AppState, users::service::UserRegistry};
pub use crate::core::error::CoreError;
