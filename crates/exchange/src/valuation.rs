use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use bitdash_core::exchange::entity::{AssetValuation, Balance, Envelope, account_asset_rows};
use bitdash_core::exchange::port::ExchangePort;
use futures::StreamExt;
use rust_decimal::Decimal;
use serde_json::Value;

/// 计价币种，自身价格恒为 1，无需查询
pub const QUOTE_CURRENCY: &str = "USDT";

/// # Summary
/// 资产估值服务：为每个持仓币种查询 USDT 价格并计算估值。
///
/// # Invariants
/// - 同时在途的价格查询不超过 `concurrency`。
/// - 单个币种查询失败或超时不影响整批结果：该币种估值为 `0.00` 并标记 `price_available = false`，
///   绝不会从输出中丢弃。
/// - 输出顺序与输入一致。
pub struct PortfolioValuator {
    port: Arc<dyn ExchangePort>,
    concurrency: usize,
    lookup_timeout: Duration,
}

impl PortfolioValuator {
    pub fn new(port: Arc<dyn ExchangePort>, concurrency: usize, lookup_timeout: Duration) -> Self {
        Self {
            port,
            concurrency: concurrency.max(1),
            lookup_timeout,
        }
    }

    /// # Summary
    /// 对全部持仓估值。
    ///
    /// # Logic
    /// 1. 每个币种生成一个估值 future。
    /// 2. 通过 `buffered` 限制并发，保持输入顺序。
    /// 3. 每个 future 自带超时，失败时降级为零值。
    pub async fn value_assets(&self, assets: Vec<Balance>) -> Vec<AssetValuation> {
        futures::stream::iter(assets.into_iter().map(|balance| self.value_one(balance)))
            .buffered(self.concurrency)
            .collect()
            .await
    }

    async fn value_one(&self, balance: Balance) -> AssetValuation {
        let quantity = match holding_quantity(&balance) {
            Ok(quantity) => quantity,
            Err(reason) => {
                tracing::warn!("Cannot value {}: {}", balance.currency, reason);
                return unpriced(balance, reason);
            }
        };

        if balance.currency.eq_ignore_ascii_case(QUOTE_CURRENCY) {
            return priced(balance, Decimal::ONE, quantity);
        }

        let symbol = format!("{}{}", balance.currency.to_uppercase(), QUOTE_CURRENCY);
        match tokio::time::timeout(self.lookup_timeout, self.port.last_price(&symbol)).await {
            Ok(Ok(envelope)) => match price_from_envelope(&envelope) {
                Some(price) => priced(balance, price, quantity),
                None => {
                    tracing::warn!("Unusable price payload for {}: code={} msg={}", symbol, envelope.code, envelope.msg);
                    unpriced(balance, format!("No price available for {}", symbol))
                }
            },
            Ok(Err(e)) => {
                tracing::warn!("Price lookup for {} failed: {}", symbol, e);
                unpriced(balance, e.to_string())
            }
            Err(_) => {
                tracing::warn!("Price lookup for {} timed out after {:?}", symbol, self.lookup_timeout);
                unpriced(balance, format!("Price lookup for {} timed out", symbol))
            }
        }
    }
}

/// # Summary
/// 从账户接口的原始 `data` 中宽松提取持仓。
///
/// # Logic
/// 缺少币种的行被跳过并记录告警，金额字段接受字符串或数字。
pub fn balances_from_account(data: Option<&Value>) -> Vec<Balance> {
    account_asset_rows(data)
        .iter()
        .filter_map(|row| {
            let balance = Balance::from_value(row);
            if balance.is_none() {
                tracing::warn!("Skipping asset row without currency: {}", row);
            }
            balance
        })
        .collect()
}

/// # Summary
/// 从最新价 Envelope 中提取价格。
///
/// # Logic
/// `data` 可能是字符串、数字，或包含 `price` / `lastPrice` / `last` 字段的对象。
/// 业务失败码或非正价格一律视为不可用。
pub fn price_from_envelope(envelope: &Envelope<Value>) -> Option<Decimal> {
    if !envelope.is_success() {
        return None;
    }
    envelope
        .data
        .as_ref()
        .and_then(price_from_value)
        .filter(|price| *price > Decimal::ZERO)
}

fn price_from_value(value: &Value) -> Option<Decimal> {
    match value {
        Value::String(s) => Decimal::from_str(s.trim()).ok(),
        Value::Number(n) => Decimal::from_str(&n.to_string()).ok(),
        Value::Object(map) => ["price", "lastPrice", "last"]
            .iter()
            .find_map(|key| map.get(*key))
            .and_then(price_from_value),
        _ => None,
    }
}

/// 空串视为 0，无法解析时返回 `None`
fn parse_amount(raw: &str) -> Option<Decimal> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Some(Decimal::ZERO);
    }
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .ok()
}

/// 可用 + 冻结，溢出或无法解析时返回错误描述
fn holding_quantity(balance: &Balance) -> Result<Decimal, String> {
    let available = parse_amount(&balance.available)
        .ok_or_else(|| format!("Unparseable balance amount: {:?}", balance.available))?;
    let frozen = parse_amount(&balance.frozen)
        .ok_or_else(|| format!("Unparseable balance amount: {:?}", balance.frozen))?;
    available
        .checked_add(frozen)
        .ok_or_else(|| "valuation overflow".to_string())
}

fn priced(balance: Balance, price: Decimal, quantity: Decimal) -> AssetValuation {
    let Some(value) = quantity.checked_mul(price) else {
        tracing::warn!("Valuation of {} overflowed at price {}", balance.currency, price);
        return unpriced(balance, "valuation overflow".to_string());
    };
    AssetValuation {
        currency: balance.currency,
        available: balance.available,
        frozen: balance.frozen,
        price: Some(price.normalize().to_string()),
        usdt_value: format!("{:.2}", value.round_dp(2)),
        price_available: true,
        error: None,
    }
}

fn unpriced(balance: Balance, error: String) -> AssetValuation {
    AssetValuation {
        currency: balance.currency,
        available: balance.available,
        frozen: balance.frozen,
        price: None,
        usdt_value: "0.00".to_string(),
        price_available: false,
        error: Some(error),
    }
}
