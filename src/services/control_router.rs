//! 服务控制路由器
//!
//! 把逻辑控制操作（如 "configure RDP"、"start VNC"）映射为一次脚本调用，
//! 并把执行结果整理成调用方需要的形状。路由器本身无状态，可随意构造，
//! 执行器通过构造参数注入。

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::domain::{
    AggregatedResults, ArgList, ControlOperation, ControlResponse, ExecutionRequest,
    ExecutionResult, RdpOptions, RoutingFailure, ServiceId, ServiceMap, ServiceStatus,
    SshOptions, SystemDetection, Verb, VncOptions,
};
use crate::domain::system::DETECT_SNIPPET;
use crate::infra::ScriptExecutor;

/// 服务控制路由器
#[derive(Clone)]
pub struct ControlRouter {
    executor: Arc<dyn ScriptExecutor>,
    /// detect-system 返回的系统版本
    os_version: String,
}

impl ControlRouter {
    pub fn new(executor: Arc<dyn ScriptExecutor>) -> Self {
        Self {
            executor,
            os_version: String::new(),
        }
    }

    pub fn with_os_version(mut self, os_version: impl Into<String>) -> Self {
        self.os_version = os_version.into();
        self
    }

    /// 把控制操作解析为脚本调用：`<verb flag> [extra...]`
    pub fn resolve(operation: ControlOperation, extra: ArgList) -> ExecutionRequest {
        let mut args = ArgList::new().flag(operation.verb.flag()).into_vec();
        args.extend(extra.into_vec());
        ExecutionRequest::script(operation.service.script(), args)
    }

    async fn run(&self, operation: ControlOperation, extra: ArgList) -> ExecutionResult {
        let request = Self::resolve(operation, extra);
        debug!(operation = %operation, args = ?request.args, "Dispatching control operation");

        let result = self.executor.execute(request).await;

        if operation.verb.is_mutating() {
            info!(
                operation = %operation,
                success = result.success,
                exit_code = ?result.exit_code,
                "Control operation completed"
            );
        }
        if let Some(error) = &result.error {
            warn!(operation = %operation, error = %error, "Control operation did not produce an exit code");
        }
        result
    }

    // ========== 单服务操作 ==========

    /// 查询服务状态（`--status`），原样返回执行结果
    pub async fn status(&self, service: ServiceId) -> ExecutionResult {
        self.run(ControlOperation::new(service, Verb::Status), ArgList::new())
            .await
    }

    pub async fn configure_rdp(&self, options: &RdpOptions) -> ExecutionResult {
        let mut extra = ArgList::new();
        options.append_to(&mut extra);
        self.run(ControlOperation::new(ServiceId::Rdp, Verb::Configure), extra)
            .await
    }

    pub async fn configure_ssh(&self, options: &SshOptions) -> ExecutionResult {
        let mut extra = ArgList::new();
        options.append_to(&mut extra);
        self.run(ControlOperation::new(ServiceId::Ssh, Verb::Configure), extra)
            .await
    }

    pub async fn configure_vnc(&self, options: &VncOptions) -> ExecutionResult {
        let mut extra = ArgList::new();
        options.append_to(&mut extra);
        self.run(ControlOperation::new(ServiceId::Vnc, Verb::Configure), extra)
            .await
    }

    pub async fn configure_native_rdp(&self) -> ExecutionResult {
        self.run(
            ControlOperation::new(ServiceId::NativeRdp, Verb::Configure),
            ArgList::new(),
        )
        .await
    }

    // ========== 生命周期操作 ==========

    pub async fn start(&self, service: &str) -> ControlResponse {
        self.lifecycle(Verb::Start, service).await
    }

    pub async fn stop(&self, service: &str) -> ControlResponse {
        self.lifecycle(Verb::Stop, service).await
    }

    pub async fn restart(&self, service: &str) -> ControlResponse {
        self.lifecycle(Verb::Restart, service).await
    }

    /// 未知服务直接拒绝，不启动任何进程
    async fn lifecycle(&self, verb: Verb, service: &str) -> ControlResponse {
        let Some(service) = ServiceId::from_str(service) else {
            warn!(service = %service, verb = ?verb, "Rejected control request for unknown service");
            return ControlResponse::Rejected(RoutingFailure::unknown_service());
        };
        let result = self
            .run(ControlOperation::new(service, verb), ArgList::new())
            .await;
        ControlResponse::Executed(result)
    }

    // ========== 聚合查询 ==========

    /// 并发查询四个服务的状态，全部完成后一起返回
    pub async fn all_services_status(&self) -> AggregatedResults {
        let (rdp, ssh, vnc, native_rdp) = tokio::join!(
            self.status(ServiceId::Rdp),
            self.status(ServiceId::Ssh),
            self.status(ServiceId::Vnc),
            self.status(ServiceId::NativeRdp),
        );

        let results = ServiceMap {
            rdp,
            ssh,
            vnc,
            native_rdp,
        };

        let failed = ServiceId::ALL
            .iter()
            .filter(|s| !results.get(**s).success)
            .count();
        debug!(failed, "Collected status for all services");

        results
    }

    /// 状态摘要视图
    pub async fn services_summary(&self) -> ServiceMap<ServiceStatus> {
        self.all_services_status()
            .await
            .map(|service, result| ServiceStatus::from_result(service, &result))
    }

    // ========== 系统探测 ==========

    pub async fn detect_system(&self) -> SystemDetection {
        let result = self
            .executor
            .execute(ExecutionRequest::snippet(DETECT_SNIPPET))
            .await;

        if !result.success {
            debug!(
                exit_code = ?result.exit_code,
                error = ?result.error,
                "System detection script did not succeed"
            );
        }

        SystemDetection::parse(&result.stdout, &self.os_version)
    }
}
