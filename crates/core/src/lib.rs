//! # `bitdash-core` - 领域模型与端口定义
//!
//! 存放交易所代理面板的全部领域实体、错误枚举与端口 (Port) 契约。
//! 本 crate 不做任何 I/O，具体实现由 `bitdash-exchange` 与 `bitdash-api` 提供。

pub mod common;
pub mod config;
pub mod exchange;
