//! 执行请求与执行结果

use serde::Serialize;

use super::service::ServiceId;

/// 被执行的外部例程
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// LIB_DIR 下的控制脚本
    Script(&'static str),
    /// 固定的内联脚本片段（仅限编译期常量，绝不包含请求数据）
    Snippet(&'static str),
}

/// 解析完成的外部调用
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionRequest {
    pub target: Target,
    pub args: Vec<String>,
}

impl ExecutionRequest {
    pub fn script(script: &'static str, args: Vec<String>) -> Self {
        Self {
            target: Target::Script(script),
            args,
        }
    }

    pub fn snippet(snippet: &'static str) -> Self {
        Self {
            target: Target::Snippet(snippet),
            args: Vec::new(),
        }
    }

    /// 用于日志的简短标识
    pub fn label(&self) -> &'static str {
        match self.target {
            Target::Script(name) => name,
            Target::Snippet(_) => "<inline>",
        }
    }
}

/// 单次外部进程调用的归一化结果
///
/// 三种互斥形态：
/// 1. 退出码 0：`success=true, exit_code=Some(0)`
/// 2. 非零退出码：`success=false, exit_code=Some(code)`，`error` 为空
/// 3. 未产生退出码（启动失败、超时、被信号终止）：`exit_code=None`，`error` 必须有值
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResult {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExecutionResult {
    /// 进程正常退出（情形 1 / 2）
    pub fn exited(code: i32, stdout: String, stderr: String) -> Self {
        Self {
            success: code == 0,
            stdout,
            stderr,
            exit_code: Some(code),
            error: None,
        }
    }

    /// 进程未能启动或被强制终止（情形 3）
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            stdout: String::new(),
            stderr: String::new(),
            exit_code: None,
            error: Some(error.into()),
        }
    }

    /// 进程运行过但没有退出码（被信号终止），保留已捕获的输出
    pub fn terminated(error: impl Into<String>, stdout: String, stderr: String) -> Self {
        Self {
            success: false,
            stdout,
            stderr,
            exit_code: None,
            error: Some(error.into()),
        }
    }

    /// 是否满足三种形态之一
    #[cfg(test)]
    pub fn is_well_formed(&self) -> bool {
        match self.exit_code {
            Some(code) => self.success == (code == 0) && self.error.is_none(),
            None => !self.success && self.error.as_deref().is_some_and(|e| !e.is_empty()),
        }
    }
}

/// 路由阶段的拒绝（未触发任何进程）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoutingFailure {
    pub success: bool,
    pub error: String,
}

impl RoutingFailure {
    pub fn unknown_service() -> Self {
        Self {
            success: false,
            error: "Unknown service".to_string(),
        }
    }
}

/// start/stop/restart 的响应
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ControlResponse {
    Executed(ExecutionResult),
    Rejected(RoutingFailure),
}

/// 按服务聚合的结果，四个键始终存在
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceMap<T> {
    pub rdp: T,
    pub ssh: T,
    pub vnc: T,
    pub native_rdp: T,
}

impl<T> ServiceMap<T> {
    pub fn get(&self, service: ServiceId) -> &T {
        match service {
            ServiceId::Rdp => &self.rdp,
            ServiceId::Ssh => &self.ssh,
            ServiceId::Vnc => &self.vnc,
            ServiceId::NativeRdp => &self.native_rdp,
        }
    }

    pub fn map<U>(self, mut f: impl FnMut(ServiceId, T) -> U) -> ServiceMap<U> {
        ServiceMap {
            rdp: f(ServiceId::Rdp, self.rdp),
            ssh: f(ServiceId::Ssh, self.ssh),
            vnc: f(ServiceId::Vnc, self.vnc),
            native_rdp: f(ServiceId::NativeRdp, self.native_rdp),
        }
    }
}

/// 四个服务的 status 原始结果
pub type AggregatedResults = ServiceMap<ExecutionResult>;
