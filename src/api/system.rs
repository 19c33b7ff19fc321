//! 系统探测 API

use axum::{extract::State, routing::post, Json, Router};
use std::sync::Arc;

use crate::domain::SystemDetection;
use crate::middleware::RequireApiKey;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/api/detect-system", post(detect_system))
}

/// 探测操作系统、桌面环境和会话类型
///
/// POST /api/detect-system
/// 探测失败时各字段为 "unknown"
async fn detect_system(
    _auth: RequireApiKey,
    State(state): State<Arc<AppState>>,
) -> Json<SystemDetection> {
    Json(state.router.detect_system().await)
}
