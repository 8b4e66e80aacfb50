//! # `bitdash-api` - HTTP API 网关
//!
//! 本 crate 是交易所代理面板的 HTTP/REST 服务入口。
//! 使用 `axum` 构建路由与控制器，通过 `utoipa` 自动生成 OpenAPI 3.0 Swagger 文档。
//!
//! ## 架构职责
//! - 接收浏览器的 HTTP 请求
//! - 通过会话 Cookie 区分公开路由与受保护路由
//! - 调用下层 `ExchangePort` 完成余额、划转、提现等操作
//! - 交易所的 Envelope 原样透传，本地错误统一为 `{error, detail?}`

pub mod error;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod types;
