use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use bitdash_core::exchange::entity::{Balance, Envelope, TransferRequest, WithdrawalRequest};
use bitdash_core::exchange::error::ExchangeError;
use bitdash_core::exchange::port::ExchangePort;
use bitdash_exchange::valuation::PortfolioValuator;
use serde_json::Value;

/// 价格查询 Mock：`FOO` 总是失败，`SLOW` 永远不返回，其余返回固定价格。
/// 同时记录在途查询的峰值以验证并发上限。
#[derive(Default)]
struct MockPricePort {
    lookups: AtomicUsize,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
    delay_ms: u64,
}

#[async_trait]
impl ExchangePort for MockPricePort {
    async fn account(&self) -> Result<Envelope<Value>, ExchangeError> {
        unimplemented!()
    }

    async fn last_price(&self, symbol: &str) -> Result<Envelope<Value>, ExchangeError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

        if self.delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
        }
        if symbol == "SLOWUSDT" {
            tokio::time::sleep(Duration::from_secs(30)).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match symbol {
            "FOOUSDT" => Err(ExchangeError::Http {
                status: 404,
                raw_body: "symbol not found".into(),
            }),
            "BTCUSDT" => Ok(Envelope {
                code: 0,
                msg: "ok".into(),
                data: Some(Value::String("60000".into())),
            }),
            _ => Ok(Envelope {
                code: 0,
                msg: "ok".into(),
                data: Some(serde_json::json!({"price": "2"})),
            }),
        }
    }

    async fn transfer(&self, _request: &TransferRequest) -> Result<Envelope<Value>, ExchangeError> {
        unimplemented!()
    }

    async fn withdraw(&self, _request: &WithdrawalRequest) -> Result<Envelope<Value>, ExchangeError> {
        unimplemented!()
    }
}

fn balance(currency: &str, available: &str) -> Balance {
    Balance {
        currency: currency.to_string(),
        available: available.to_string(),
        frozen: "0".to_string(),
    }
}

#[tokio::test]
async fn test_failed_lookup_does_not_fail_batch() {
    let port = Arc::new(MockPricePort::default());
    let valuator = PortfolioValuator::new(port.clone(), 8, Duration::from_secs(5));

    let rows = valuator
        .value_assets(vec![
            balance("USDT", "150.5"),
            balance("BTC", "0.5"),
            balance("FOO", "1000"),
        ])
        .await;

    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].currency, "USDT");
    assert_eq!(rows[0].usdt_value, "150.50");
    assert!(rows[0].price_available);

    assert_eq!(rows[1].currency, "BTC");
    assert_eq!(rows[1].usdt_value, "30000.00");

    assert_eq!(rows[2].currency, "FOO");
    assert_eq!(rows[2].usdt_value, "0.00");
    assert!(!rows[2].price_available);
    assert!(rows[2].error.as_deref().unwrap_or_default().contains("404"));

    // USDT 自身计价，不发起查询
    assert_eq!(port.lookups.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_concurrency_is_bounded() {
    let port = Arc::new(MockPricePort {
        delay_ms: 20,
        ..MockPricePort::default()
    });
    let valuator = PortfolioValuator::new(port.clone(), 3, Duration::from_secs(5));

    let assets: Vec<Balance> = (0..20).map(|i| balance(&format!("C{}", i), "1")).collect();
    let rows = valuator.value_assets(assets).await;

    assert_eq!(rows.len(), 20);
    assert!(rows.iter().all(|row| row.usdt_value == "2.00"));
    // 输出顺序与输入一致
    assert_eq!(rows[7].currency, "C7");
    assert!(port.peak_in_flight.load(Ordering::SeqCst) <= 3);
    assert_eq!(port.lookups.load(Ordering::SeqCst), 20);
}

#[tokio::test]
async fn test_slow_lookup_times_out_individually() {
    let port = Arc::new(MockPricePort::default());
    let valuator = PortfolioValuator::new(port, 4, Duration::from_millis(100));

    let rows = valuator
        .value_assets(vec![balance("SLOW", "3"), balance("ETH", "2")])
        .await;

    assert_eq!(rows[0].usdt_value, "0.00");
    assert!(!rows[0].price_available);
    assert!(rows[0].error.as_deref().unwrap_or_default().contains("timed out"));
    assert_eq!(rows[1].usdt_value, "4.00");
}

#[tokio::test]
async fn test_empty_portfolio() {
    let valuator = PortfolioValuator::new(Arc::new(MockPricePort::default()), 8, Duration::from_secs(1));
    assert!(valuator.value_assets(vec![]).await.is_empty());
}

#[tokio::test]
async fn test_overflowing_balance_is_flagged_not_fatal() {
    let port = Arc::new(MockPricePort::default());
    let valuator = PortfolioValuator::new(port, 4, Duration::from_secs(5));

    let rows = valuator
        .value_assets(vec![
            balance("BTC", "79228162514264337593543950335"),
            balance("ETH", "3"),
        ])
        .await;

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].usdt_value, "0.00");
    assert!(!rows[0].price_available);
    assert_eq!(rows[0].error.as_deref(), Some("valuation overflow"));
    assert_eq!(rows[1].usdt_value, "6.00");
}
