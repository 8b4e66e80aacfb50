//! # `bitdash-exchange` - 交易所签名客户端
//!
//! 实现 `bitdash_core::exchange::port::ExchangePort`：
//! - `credentials`: API Key / Secret 的安全持有
//! - `signer`: 可切换的请求签名策略
//! - `transport`: HTTP 传输抽象 (生产使用 reqwest)
//! - `client`: 构造、签名、发送并解析交易所请求
//! - `valuation`: 有界并发的资产估值

pub mod client;
pub mod credentials;
pub mod signer;
pub mod transport;
pub mod valuation;
