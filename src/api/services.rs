//! 服务状态与配置 API
//!
//! 包含 /api/{rdp,ssh,vnc,native-rdp}/{status,configure} 以及聚合查询端点。
//! 脚本执行失败时仍返回 200，失败信息在 `success` / `exitCode` / `error` 中。

use axum::{extract::State, routing::post, Json, Router};
use std::sync::Arc;

use super::extract::OptionalJson;
use crate::domain::{
    AggregatedResults, ExecutionResult, NoOptions, RdpOptions, ServiceId, ServiceMap,
    ServiceStatus, SshOptions, VncOptions,
};
use crate::middleware::RequireApiKey;
use crate::state::AppState;

/// 创建服务路由
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/rdp/status", post(rdp_status))
        .route("/api/rdp/configure", post(rdp_configure))
        .route("/api/ssh/status", post(ssh_status))
        .route("/api/ssh/configure", post(ssh_configure))
        .route("/api/vnc/status", post(vnc_status))
        .route("/api/vnc/configure", post(vnc_configure))
        .route("/api/native-rdp/status", post(native_rdp_status))
        .route("/api/native-rdp/configure", post(native_rdp_configure))
        .route("/api/services/all", post(all_services))
        .route("/api/services/summary", post(services_summary))
}

async fn rdp_status(
    _auth: RequireApiKey,
    State(state): State<Arc<AppState>>,
) -> Json<ExecutionResult> {
    Json(state.router.status(ServiceId::Rdp).await)
}

/// POST /api/rdp/configure
///
/// Body: `{"method": "auto" | "xrdp" | "vnc" | "native" | "ssh"}`，缺省为 auto
async fn rdp_configure(
    _auth: RequireApiKey,
    State(state): State<Arc<AppState>>,
    OptionalJson(options): OptionalJson<RdpOptions>,
) -> Json<ExecutionResult> {
    Json(state.router.configure_rdp(&options).await)
}

async fn ssh_status(
    _auth: RequireApiKey,
    State(state): State<Arc<AppState>>,
) -> Json<ExecutionResult> {
    Json(state.router.status(ServiceId::Ssh).await)
}

/// POST /api/ssh/configure
///
/// Body: `port`, `passwordAuth`, `rootLogin`, `keyPath`, `x11Forwarding`，均可选，按给出顺序传给脚本
async fn ssh_configure(
    _auth: RequireApiKey,
    State(state): State<Arc<AppState>>,
    OptionalJson(options): OptionalJson<SshOptions>,
) -> Json<ExecutionResult> {
    Json(state.router.configure_ssh(&options).await)
}

async fn vnc_status(
    _auth: RequireApiKey,
    State(state): State<Arc<AppState>>,
) -> Json<ExecutionResult> {
    Json(state.router.status(ServiceId::Vnc).await)
}

/// POST /api/vnc/configure
///
/// Body: `{"port": 5900}`，可选
async fn vnc_configure(
    _auth: RequireApiKey,
    State(state): State<Arc<AppState>>,
    OptionalJson(options): OptionalJson<VncOptions>,
) -> Json<ExecutionResult> {
    Json(state.router.configure_vnc(&options).await)
}

async fn native_rdp_status(
    _auth: RequireApiKey,
    State(state): State<Arc<AppState>>,
) -> Json<ExecutionResult> {
    Json(state.router.status(ServiceId::NativeRdp).await)
}

async fn native_rdp_configure(
    _auth: RequireApiKey,
    State(state): State<Arc<AppState>>,
    OptionalJson(NoOptions {}): OptionalJson<NoOptions>,
) -> Json<ExecutionResult> {
    Json(state.router.configure_native_rdp().await)
}

/// POST /api/services/all
///
/// 并发查询所有服务，返回 `{rdp, ssh, vnc, nativeRdp}`
async fn all_services(
    _auth: RequireApiKey,
    State(state): State<Arc<AppState>>,
) -> Json<AggregatedResults> {
    Json(state.router.all_services_status().await)
}

/// POST /api/services/summary
async fn services_summary(
    _auth: RequireApiKey,
    State(state): State<Arc<AppState>>,
) -> Json<ServiceMap<ServiceStatus>> {
    Json(state.router.services_summary().await)
}
