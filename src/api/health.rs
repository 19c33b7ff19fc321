//! 健康检查 API

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;

use crate::config::env::constants::VERSION;
use crate::state::AppState;

/// 健康检查响应
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthResponse {
    status: &'static str,
    service: &'static str,
    version: &'static str,
    timestamp: String,
    started_at: String,
    uptime_secs: i64,
    lib_dir: String,
}

/// 创建健康检查路由
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(health_check))
}

/// 健康检查
///
/// GET /health
/// 无需认证
async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: "skyview-bridge",
        version: VERSION,
        timestamp: chrono::Utc::now().to_rfc3339(),
        started_at: state.started_at.to_rfc3339(),
        uptime_secs: state.uptime_secs(),
        lib_dir: state.config.lib_dir.display().to_string(),
    })
}
