use crate::exchange::entity::{Envelope, TransferRequest, WithdrawalRequest};
use crate::exchange::error::ExchangeError;
use async_trait::async_trait;
use serde_json::Value;

/// # Summary
/// 交易所访问端口 (Port)。路由层与估值服务只依赖此契约，不感知签名与传输细节。
///
/// # Invariants
/// - 每次调用都是一次全新的网络往返，不缓存、不重试。
/// - 需要签名的方法在凭证缺失时必须返回 `ExchangeError::Configuration` 且不发起任何 I/O。
#[async_trait]
pub trait ExchangePort: Send + Sync {
    /// # Summary
    /// 查询现货账户余额。
    ///
    /// # Returns
    /// 交易所原始 Envelope，`data` 原样保留 (账户对象或资产数组)，不做任何字段裁剪。
    async fn account(&self) -> Result<Envelope<Value>, ExchangeError>;

    /// # Summary
    /// 查询交易对最新成交价 (公开接口，无需签名)。
    ///
    /// # Arguments
    /// * `symbol`: 交易对，例如 `BTCUSDT`。
    async fn last_price(&self, symbol: &str) -> Result<Envelope<Value>, ExchangeError>;

    /// # Summary
    /// 现货与合约账户之间的资金划转。
    ///
    /// # Invariants
    /// - 写操作，超时只能报告 `UnknownOutcome`，不得重试。
    async fn transfer(&self, request: &TransferRequest) -> Result<Envelope<Value>, ExchangeError>;

    /// # Summary
    /// 发起链上提现。
    ///
    /// # Invariants
    /// - 写操作，超时只能报告 `UnknownOutcome`，不得重试。
    async fn withdraw(&self, request: &WithdrawalRequest)
    -> Result<Envelope<Value>, ExchangeError>;
}
