//! 应用状态

use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::config::env::EnvConfig;
use crate::infra::{ScriptExecutor, ScriptRunner};
use crate::services::ControlRouter;

/// 应用状态
///
/// 只保存启动时确定的只读数据，请求之间没有共享的可变状态
pub struct AppState {
    /// 环境配置
    pub config: EnvConfig,
    /// 服务控制路由器
    pub router: ControlRouter,
    /// 服务启动时间
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// 用真实的脚本执行器创建应用状态
    pub fn new(config: EnvConfig) -> Self {
        let runner = ScriptRunner::new(config.runner_config());

        tracing::info!(
            bind = %config.bind,
            port = config.port,
            lib_dir = %config.lib_dir.display(),
            shell = %config.shell,
            exec_timeout = ?config.exec_timeout,
            api_key = config.api_key.is_some(),
            "Loaded configuration"
        );

        if !config.lib_dir.is_dir() {
            tracing::warn!(
                lib_dir = %config.lib_dir.display(),
                "Control script directory does not exist, service scripts will fail"
            );
        }

        Self::with_executor(config, Arc::new(runner))
    }

    /// 使用指定的执行器创建应用状态
    pub fn with_executor(config: EnvConfig, executor: Arc<dyn ScriptExecutor>) -> Self {
        let router = ControlRouter::new(executor).with_os_version(config.os_version.clone());
        Self {
            config,
            router,
            started_at: Utc::now(),
        }
    }

    /// 已配置的 API Key
    pub fn api_key(&self) -> Option<&str> {
        self.config.api_key.as_deref()
    }

    /// 运行时长（秒）
    pub fn uptime_secs(&self) -> i64 {
        (Utc::now() - self.started_at).num_seconds()
    }
}
