//! 统一错误处理
//!
//! `ApiError` 只用于传输层错误（格式错误的请求、认证失败、未知路径）。
//! 脚本执行失败不是错误，而是以 `ExecutionResult` 的形式正常返回。

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// API 错误响应结构
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// 统一 API 错误类型
#[derive(Debug, Error)]
pub enum ApiError {
    /// 401 - API Key 无效或缺失
    #[error("Unauthorized")]
    Unauthorized,
    /// 404 - 路径不存在
    #[error("Not found: {0}")]
    NotFound(String),
    /// 400 - 请求体无效
    #[error("Bad request: {message}")]
    BadRequest {
        message: String,
        details: Option<String>,
    },
}

impl ApiError {
    pub fn unauthorized() -> Self {
        Self::Unauthorized
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound(resource.into())
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
            details: None,
        }
    }

    /// 带底层解析错误详情的 400
    pub fn invalid_body(details: impl Into<String>) -> Self {
        Self::BadRequest {
            message: "Invalid request body".to_string(),
            details: Some(details.into()),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match self {
            ApiError::Unauthorized => {
                ErrorResponse::new("unauthorized", "Invalid or missing API key")
            }
            ApiError::NotFound(resource) => {
                ErrorResponse::new("not_found", format!("{} not found", resource))
            }
            ApiError::BadRequest { message, details } => {
                let resp = ErrorResponse::new("bad_request", message);
                match details {
                    Some(details) => resp.with_details(details),
                    None => resp,
                }
            }
        };

        (status, Json(body)).into_response()
    }
}
