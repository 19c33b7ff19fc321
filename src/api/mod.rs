//! API 模块
//!
//! HTTP handlers 和路由组装

pub mod control;
pub mod extract;
pub mod health;
pub mod services;
pub mod system;

use axum::{http::Uri, Router};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::error::ApiError;
use crate::state::AppState;

/// 构建完整的 API 路由
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health
        .merge(health::router())
        // System detection
        .merge(system::router())
        // Service status / configure
        .merge(services::router())
        // Start / stop / restart
        .merge(control::router())
        .fallback(not_found)
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn not_found(uri: Uri) -> ApiError {
    ApiError::not_found(uri.path())
}
