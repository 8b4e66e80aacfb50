//! # 账户资产路由控制器
//!
//! `/balance` 原样透传交易所的账户 Envelope；`/portfolio` 在其基础上逐币种估值。

use axum::Json;
use axum::extract::State;
use bitdash_core::exchange::entity::{AssetValuation, Envelope};
use bitdash_exchange::valuation::balances_from_account;
use serde_json::Value;

use crate::error::ApiError;
use crate::server::AppState;
use crate::types::ApiErrorResponse;

/// 获取现货账户余额
///
/// 交易所返回的 `data` 不做任何解析或改写 (未知字段、数字金额均保留)，业务失败码同样以 200 透传。
#[utoipa::path(
    get,
    path = "/balance",
    tag = "账户 (Account)",
    security(("session_cookie" = [])),
    responses(
        (status = 200, description = "交易所账户响应，原样透传"),
        (status = 401, description = "未登录", body = ApiErrorResponse),
        (status = 500, description = "交易所调用失败", body = ApiErrorResponse)
    )
)]
pub async fn get_balance(State(state): State<AppState>) -> Result<Json<Envelope<Value>>, ApiError> {
    let envelope = state.exchange.account().await?;
    Ok(Json(envelope))
}

/// 获取资产估值
///
/// 查询余额后逐币种拉取 `{币种}USDT` 最新价并折算 USDT 价值。
/// 单个币种查价失败不影响整体，该行标记为 `priceAvailable = false`。
#[utoipa::path(
    get,
    path = "/portfolio",
    tag = "账户 (Account)",
    security(("session_cookie" = [])),
    responses(
        (status = 200, description = "按持仓顺序排列的估值列表", body = Vec<AssetValuation>),
        (status = 401, description = "未登录", body = ApiErrorResponse),
        (status = 500, description = "余额查询失败", body = ApiErrorResponse)
    )
)]
pub async fn get_portfolio(State(state): State<AppState>) -> Result<Json<Vec<AssetValuation>>, ApiError> {
    let envelope = state.exchange.account().await?;

    if !envelope.is_success() {
        tracing::warn!("余额查询被交易所拒绝: code={} msg={}", envelope.code, envelope.msg);
        return Err(ApiError::Upstream {
            error: "Exchange rejected account request".into(),
            detail: Some(format!("{} {}", envelope.code, envelope.msg)),
        });
    }

    let assets = balances_from_account(envelope.data.as_ref());
    let rows = state.valuator.value_assets(assets).await;

    Ok(Json(rows))
}
