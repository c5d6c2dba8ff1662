use std::path::PathBuf;

use anyhow::Context;
use tokio::{net::TcpListener, signal};
use tracing::info;
use user_registry::{
    infrastructure::{config::load_config, logger::Logger},
    router, AppState, UserRegistry,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = load_config(config_path.as_deref()).context("加载配置失败")?;
    config.validate().context("配置无效")?;

    Logger::init(&config.logging.level);
    info!("启动用户注册表服务...");

    let user_registry = if config.registry.seed_fixtures {
        UserRegistry::with_fixtures()
    } else {
        UserRegistry::new()
    };
    let app = router(AppState { user_registry });

    let addr = config.socket_addr()?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("无法绑定到 {addr}"))?;

    info!("🚀 服务器运行在 http://{}", addr);
    info!("📖 API 端点:");
    info!("   GET    /users       - 获取所有用户");
    info!("   GET    /users/:id   - 获取特定用户");
    info!("   POST   /users       - 创建新用户");
    info!("   PUT    /users/:id   - 更新用户");
    info!("   DELETE /users/:id   - 删除用户");
    info!("   GET    /health      - 健康检查");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("服务器运行失败")?;

    info!("服务器已停止");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("监听 Ctrl+C 失败: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("监听 SIGTERM 失败: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("收到关闭信号，正在停止...");
}
