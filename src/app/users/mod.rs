//! 用户资源：模型、注册表服务和 HTTP 处理器

pub mod handler;
pub mod model;
pub mod service;
