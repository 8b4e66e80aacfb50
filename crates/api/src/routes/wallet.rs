//! # 资金操作路由控制器
//!
//! 账户间划转与链上提现。请求体在本地校验通过后才会调用交易所，
//! 交易所响应原样透传。请求体按 JSON 解析，不要求 `Content-Type` 头。

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use bitdash_core::exchange::entity::Envelope;
use serde_json::Value;

use crate::error::ApiError;
use crate::server::AppState;
use crate::types::{ApiErrorResponse, TransferBody, WithdrawBody};

/// 请求体不是合法 JSON 时统一返回 400，字段校验留给调用方
fn parse_body(body: &[u8]) -> Result<Value, ApiError> {
    serde_json::from_slice(body).map_err(|e| {
        tracing::warn!("请求体解析失败: {}", e);
        ApiError::BadRequest("Invalid request body".into())
    })
}

/// 账户间划转
#[utoipa::path(
    post,
    path = "/transfer",
    tag = "资金 (Wallet)",
    security(("session_cookie" = [])),
    request_body = TransferBody,
    responses(
        (status = 200, description = "交易所划转响应，原样透传"),
        (status = 400, description = "请求体不是 JSON、缺少字段或账户类型非法", body = ApiErrorResponse),
        (status = 401, description = "未登录", body = ApiErrorResponse),
        (status = 500, description = "交易所调用失败", body = ApiErrorResponse)
    )
)]
pub async fn transfer(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Envelope<Value>>, ApiError> {
    let request = TransferBody::from_value(&parse_body(&body)?).validate()?;

    tracing::info!(
        "划转 {} {}: {:?} -> {:?}",
        request.amount,
        request.currency,
        request.from_account_type,
        request.to_account_type
    );
    let envelope = state.exchange.transfer(&request).await?;

    Ok(Json(envelope))
}

/// 链上提现
#[utoipa::path(
    post,
    path = "/withdraw",
    tag = "资金 (Wallet)",
    security(("session_cookie" = [])),
    request_body = WithdrawBody,
    responses(
        (status = 200, description = "交易所提现响应，原样透传"),
        (status = 400, description = "请求体不是 JSON 或缺少字段", body = ApiErrorResponse),
        (status = 401, description = "未登录", body = ApiErrorResponse),
        (status = 500, description = "交易所调用失败", body = ApiErrorResponse)
    )
)]
pub async fn withdraw(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Envelope<Value>>, ApiError> {
    let request = WithdrawBody::from_value(&parse_body(&body)?).validate()?;

    tracing::info!(
        "提现 {} {} 至 {} 链",
        request.amount,
        request.currency,
        request.chain
    );
    let envelope = state.exchange.withdraw(&request).await?;

    Ok(Json(envelope))
}
