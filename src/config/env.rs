//! 环境变量配置加载

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use self::constants::{DEFAULT_BIND, DEFAULT_EXEC_TIMEOUT_SECS, DEFAULT_PORT, DEFAULT_SHELL};
use crate::infra::RunnerConfig;

/// 日志输出格式
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    pub fn from_str(s: &str) -> Self {
        if s.eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Pretty
        }
    }
}

/// 环境配置
#[derive(Clone, Debug)]
pub struct EnvConfig {
    /// 监听地址
    pub bind: String,
    /// 服务监听端口
    pub port: u16,
    /// 控制脚本目录
    pub lib_dir: PathBuf,
    /// 运行脚本的解释器
    pub shell: String,
    /// 单次脚本调用超时
    pub exec_timeout: Duration,
    /// API 密钥（未设置时不校验）
    pub api_key: Option<String>,
    /// detect-system 报告的系统版本
    pub os_version: String,
    /// 日志格式
    pub log_format: LogFormat,
}

impl EnvConfig {
    /// 从环境变量加载配置
    pub fn from_env() -> Self {
        let bind = env::var("SKYVIEW_BIND").unwrap_or_else(|_| DEFAULT_BIND.to_string());

        let port = load_with_fallback("SKYVIEW_PORT", "PORT")
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let lib_dir = load_with_fallback("SKYVIEW_LIB_DIR", "LIB_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(default_lib_dir);

        let shell = env::var("SKYVIEW_SHELL")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_SHELL.to_string());

        let exec_timeout = Duration::from_secs(
            env::var("SKYVIEW_EXEC_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|secs: &u64| *secs > 0)
                .unwrap_or(DEFAULT_EXEC_TIMEOUT_SECS),
        );

        let api_key = env::var("SKYVIEW_API_KEY").ok().filter(|s| !s.is_empty());

        let os_version = env::var("SKYVIEW_OS_VERSION").unwrap_or_default();

        let log_format = env::var("SKYVIEW_LOG_FORMAT")
            .map(|v| LogFormat::from_str(&v))
            .unwrap_or(LogFormat::Pretty);

        Self {
            bind,
            port,
            lib_dir,
            shell,
            exec_timeout,
            api_key,
            os_version,
            log_format,
        }
    }

    /// 执行器配置
    pub fn runner_config(&self) -> RunnerConfig {
        RunnerConfig {
            shell: self.shell.clone(),
            lib_dir: self.lib_dir.clone(),
            timeout: self.exec_timeout,
        }
    }
}

/// 默认脚本目录：当前目录下的 lib/
fn default_lib_dir() -> PathBuf {
    env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join("lib")
}

/// 加载环境变量，支持 fallback
fn load_with_fallback(primary: &str, fallback: &str) -> Option<String> {
    env::var(primary).ok().or_else(|| env::var(fallback).ok())
}

/// 常量
pub mod constants {
    /// 默认监听地址
    pub const DEFAULT_BIND: &str = "127.0.0.1";

    /// 默认端口
    pub const DEFAULT_PORT: u16 = 3001;

    /// 默认解释器
    pub const DEFAULT_SHELL: &str = "bash";

    /// 脚本调用默认超时（秒）
    pub const DEFAULT_EXEC_TIMEOUT_SECS: u64 = 10;

    /// 版本号
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
}
