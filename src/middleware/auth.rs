//! API Key 认证中间件
//!
//! 提供 `RequireApiKey` extractor。未配置 `SKYVIEW_API_KEY` 时放行所有请求，
//! 配置后要求 `x-api-key` header 匹配

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::HeaderMap, request::Parts},
};
use std::sync::Arc;

use crate::error::ApiError;
use crate::state::AppState;

/// API Key 认证 Extractor
///
/// # Example
///
/// ```ignore
/// async fn protected_handler(
///     _auth: RequireApiKey,
///     State(state): State<Arc<AppState>>,
/// ) -> impl IntoResponse {
///     // handler 逻辑...
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RequireApiKey;

#[async_trait]
impl FromRequestParts<Arc<AppState>> for RequireApiKey {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        match state.api_key() {
            Some(expected) => verify_api_key(&parts.headers, expected),
            None => Ok(RequireApiKey),
        }
    }
}

/// 验证 API Key
///
/// 检查 `x-api-key` header 是否与配置的 API key 匹配
pub fn verify_api_key(headers: &HeaderMap, expected_key: &str) -> Result<RequireApiKey, ApiError> {
    let provided_key = headers.get("x-api-key").and_then(|v| v.to_str().ok());

    match provided_key {
        Some(key) if key == expected_key => Ok(RequireApiKey),
        Some(_) => {
            tracing::warn!("Invalid API key provided");
            Err(ApiError::unauthorized())
        }
        None => {
            tracing::warn!("Missing x-api-key header");
            Err(ApiError::unauthorized())
        }
    }
}
