//! # 行情路由控制器
//!
//! 公开的最新成交价查询，交易所响应原样透传。

use axum::Json;
use axum::extract::{Query, State};
use bitdash_core::exchange::entity::Envelope;
use bitdash_core::exchange::error::ExchangeError;
use serde_json::Value;

use crate::error::ApiError;
use crate::server::AppState;
use crate::types::{ApiErrorResponse, LastPriceQuery};

const DEFAULT_SYMBOL: &str = "BTCUSDT";

/// 查询最新成交价 (公开接口，无需登录)
#[utoipa::path(
    get,
    path = "/last-price",
    tag = "行情 (Market)",
    params(LastPriceQuery),
    responses(
        (status = 200, description = "交易所行情响应，原样透传"),
        (status = 400, description = "交易对格式非法", body = ApiErrorResponse),
        (status = 500, description = "交易所调用失败", body = ApiErrorResponse)
    )
)]
pub async fn last_price(
    State(state): State<AppState>,
    Query(query): Query<LastPriceQuery>,
) -> Result<Json<Envelope<Value>>, ApiError> {
    let symbol = query
        .symbol
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_SYMBOL.to_string());

    match state.exchange.last_price(&symbol).await {
        Ok(envelope) => Ok(Json(envelope)),
        Err(ExchangeError::InvalidRequest(msg)) => Err(ApiError::BadRequest(msg)),
        Err(err) => {
            tracing::error!("行情查询失败 {}: {}", symbol, err);
            Err(ApiError::Upstream {
                error: "Exchange fetch failed".into(),
                detail: Some(err.to_string()),
            })
        }
    }
}
