//! 测试辅助：记录调用的假执行器与测试配置

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::config::{EnvConfig, LogFormat};
use crate::domain::{ExecutionRequest, ExecutionResult};
use crate::infra::ScriptExecutor;

type Responder = Box<dyn Fn(&ExecutionRequest) -> ExecutionResult + Send + Sync>;

/// 记录所有调用的假执行器，从不启动进程
pub struct RecordingExecutor {
    calls: Mutex<Vec<ExecutionRequest>>,
    respond: Responder,
}

impl RecordingExecutor {
    pub fn new(
        respond: impl Fn(&ExecutionRequest) -> ExecutionResult + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            respond: Box::new(respond),
        })
    }

    /// 所有调用都以退出码 0、空输出返回
    pub fn ok() -> Arc<Self> {
        Self::new(|_| ExecutionResult::exited(0, String::new(), String::new()))
    }

    pub fn calls(&self) -> Vec<ExecutionRequest> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ScriptExecutor for RecordingExecutor {
    async fn execute(&self, request: ExecutionRequest) -> ExecutionResult {
        let result = (self.respond)(&request);
        self.calls.lock().unwrap().push(request);
        result
    }
}

pub fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// 不读取环境变量的测试配置
pub fn test_config() -> EnvConfig {
    EnvConfig {
        bind: "127.0.0.1".to_string(),
        port: 0,
        lib_dir: PathBuf::from("/nonexistent/skyview/lib"),
        shell: "sh".to_string(),
        exec_timeout: Duration::from_secs(5),
        api_key: None,
        os_version: "test".to_string(),
        log_format: LogFormat::Pretty,
    }
}
