//! # API 统一错误处理
//!
//! 将交易所客户端的错误统一映射到 HTTP 状态码与 `{error, detail?}` JSON 响应体。

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use bitdash_core::exchange::error::ExchangeError;
use thiserror::Error;

use crate::types::ApiErrorResponse;

/// API 层统一错误枚举
#[derive(Error, Debug)]
pub enum ApiError {
    /// 缺少会话 Cookie (401)
    #[error("{0}")]
    Unauthorized(String),

    /// 请求体缺字段或格式错误 (400)，在调用交易所之前返回
    #[error("{0}")]
    BadRequest(String),

    /// 交易所调用失败 (500)，错误信息透传给调用方
    #[error("{error}")]
    Upstream {
        error: String,
        detail: Option<String>,
    },

    /// 本地内部错误 (500)
    #[error("内部服务错误: {0}")]
    Internal(String),
}

/// 将 `ApiError` 转换为 axum 的 HTTP 响应
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, ApiErrorResponse::from_msg(msg)),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, ApiErrorResponse::from_msg(msg)),
            ApiError::Upstream { error, detail } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiErrorResponse { error, detail },
            ),
            ApiError::Internal(msg) => {
                // 内部错误只记录日志，不向客户端透传细节
                tracing::error!("内部服务错误: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiErrorResponse::from_msg("Internal Server Error"),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

/// 从 `ExchangeError` 转换
impl From<ExchangeError> for ApiError {
    fn from(err: ExchangeError) -> Self {
        match &err {
            ExchangeError::InvalidRequest(msg) => ApiError::BadRequest(msg.clone()),
            _ => ApiError::Upstream {
                error: err.to_string(),
                detail: None,
            },
        }
    }
}
