//! 请求体提取
//!
//! 前端调用很多端点时不带请求体，空请求体视为 `T::default()`；
//! 非空但无法解析的请求体返回 400

use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// 可选的 JSON 请求体
#[derive(Debug, Clone, Default)]
pub struct OptionalJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for OptionalJson<T>
where
    T: DeserializeOwned + Default,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| ApiError::bad_request(e.body_text()))?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self(T::default()));
        }

        serde_json::from_slice(&bytes).map(Self).map_err(|e| {
            tracing::warn!(error = %e, "Rejected malformed request body");
            ApiError::invalid_body(e.to_string())
        })
    }
}
