//! 服务生命周期 API
//!
//! POST /api/start, /api/stop, /api/restart

use axum::{extract::State, routing::post, Json, Router};
use serde::Deserialize;
use std::sync::Arc;

use super::extract::OptionalJson;
use crate::domain::ControlResponse;
use crate::middleware::RequireApiKey;
use crate::state::AppState;

/// 生命周期请求
#[derive(Debug, Default, Deserialize)]
pub struct ServiceRequest {
    /// "rdp" | "ssh" | "vnc" | "native-rdp"；缺失时按未知服务处理
    #[serde(default)]
    pub service: Option<String>,
}

impl ServiceRequest {
    fn service(&self) -> &str {
        self.service.as_deref().unwrap_or_default()
    }
}

/// 创建生命周期路由
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/start", post(start_service))
        .route("/api/stop", post(stop_service))
        .route("/api/restart", post(restart_service))
}

async fn start_service(
    _auth: RequireApiKey,
    State(state): State<Arc<AppState>>,
    OptionalJson(request): OptionalJson<ServiceRequest>,
) -> Json<ControlResponse> {
    Json(state.router.start(request.service()).await)
}

async fn stop_service(
    _auth: RequireApiKey,
    State(state): State<Arc<AppState>>,
    OptionalJson(request): OptionalJson<ServiceRequest>,
) -> Json<ControlResponse> {
    Json(state.router.stop(request.service()).await)
}

async fn restart_service(
    _auth: RequireApiKey,
    State(state): State<Arc<AppState>>,
    OptionalJson(request): OptionalJson<ServiceRequest>,
) -> Json<ControlResponse> {
    Json(state.router.restart(request.service()).await)
}
