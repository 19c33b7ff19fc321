//! SkyView Bridge - 远程访问服务控制桥
//!
//! 把前端的服务控制请求（RDP / VNC / SSH / native-rdp 的状态、配置、启停）
//! 转换为控制脚本调用，并以统一的 JSON 结构返回结果

pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod infra;
pub mod middleware;
pub mod services;
pub mod state;

#[cfg(test)]
pub(crate) mod test_support;

use anyhow::Context;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::{EnvConfig, LogFormat};
use crate::state::AppState;

/// 命令行覆盖项
#[derive(Debug, Clone, Default)]
pub struct RuntimeConfig {
    pub port_override: Option<u16>,
    pub bind_override: Option<String>,
    pub lib_dir_override: Option<PathBuf>,
}

impl RuntimeConfig {
    /// 把命令行参数叠加到环境配置上
    pub fn apply(&self, config: &mut EnvConfig) {
        if let Some(port) = self.port_override {
            config.port = port;
        }
        if let Some(bind) = &self.bind_override {
            config.bind = bind.clone();
        }
        if let Some(lib_dir) = &self.lib_dir_override {
            config.lib_dir = lib_dir.clone();
        }
    }
}

/// 初始化日志
///
/// `RUST_LOG` 优先，默认 info
pub fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(fmt::layer()).init(),
    }
}

/// 加载配置、启动 HTTP 服务，直到收到退出信号
pub async fn init_and_run_with_config(runtime: RuntimeConfig) -> anyhow::Result<()> {
    let mut config = EnvConfig::from_env();
    runtime.apply(&mut config);

    init_tracing(config.log_format);

    let ip: IpAddr = config
        .bind
        .parse()
        .with_context(|| format!("Invalid listen address {}", config.bind))?;
    let addr = SocketAddr::new(ip, config.port);

    let state = Arc::new(AppState::new(config));
    let app = api::router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!(%addr, version = crate::config::env::constants::VERSION, "SkyView bridge listening");

    let shutdown = CancellationToken::new();
    tokio::spawn(watch_signals(shutdown.clone()));

    let token = shutdown.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move { token.cancelled().await })
        .await
        .context("HTTP server error")?;

    tracing::info!("SkyView bridge stopped");
    Ok(())
}

/// 等待 Ctrl-C / SIGTERM 并触发关闭
async fn watch_signals(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl-C, shutting down"),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }

    shutdown.cancel();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_config;

    #[test]
    fn test_runtime_overrides() {
        let mut config = test_config();
        let runtime = RuntimeConfig {
            port_override: Some(4000),
            bind_override: None,
            lib_dir_override: Some(PathBuf::from("/opt/skyview/lib")),
        };

        runtime.apply(&mut config);

        assert_eq!(config.port, 4000);
        assert_eq!(config.bind, "127.0.0.1");
        assert_eq!(config.lib_dir, PathBuf::from("/opt/skyview/lib"));
    }
}
