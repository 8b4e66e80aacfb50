use std::time::Duration;

use async_trait::async_trait;
use bitdash_core::exchange::entity::HttpMethod;
use bitdash_core::exchange::error::ExchangeError;
use reqwest::Client;

/// # Summary
/// 一次完整构造好的出站请求，签名已完成。
///
/// # Invariants
/// - `Debug` 只输出请求头名称，签名与 Key 的值不会出现在日志中。
#[derive(Clone)]
pub struct OutboundRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl std::fmt::Debug for OutboundRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let header_names: Vec<&str> = self.headers.iter().map(|(name, _)| name.as_str()).collect();
        f.debug_struct("OutboundRequest")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("headers", &header_names)
            .field("body_len", &self.body.as_ref().map(String::len))
            .finish()
    }
}

/// 交易所的原始响应
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// # Summary
/// HTTP 传输抽象，便于在测试中替换为计数的 Mock。
///
/// # Invariants
/// - 实现必须自行保证单次请求的截止时间。
/// - 不得重试：写请求超时要报告 `UnknownOutcome`。
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: OutboundRequest) -> Result<TransportResponse, ExchangeError>;
}

/// # Summary
/// 为 rustls 安装进程级 ring 加密后端。
///
/// # Logic
/// reqwest 以 `rustls-no-provider` 方式编译，构造 Client 前必须有可用的 CryptoProvider。
/// 重复安装会返回 Err，此时说明已有后端，直接忽略。
pub fn install_crypto_provider() {
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        tracing::trace!("rustls crypto provider already installed");
    }
}

/// 基于 `reqwest` 的生产传输实现
#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// # Summary
    /// 创建带有统一截止时间的传输层。
    ///
    /// # Arguments
    /// * `timeout`: 单次请求 (含读取响应体) 的截止时间。
    pub fn new(timeout: Duration) -> Result<Self, ExchangeError> {
        install_crypto_provider();
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ExchangeError::Configuration(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    fn map_error(method: HttpMethod, url: &str, err: reqwest::Error) -> ExchangeError {
        if err.is_timeout() {
            let target = format!("{} {}", method, url);
            return match method {
                HttpMethod::Get => ExchangeError::Timeout(target),
                HttpMethod::Post => ExchangeError::UnknownOutcome(target),
            };
        }
        ExchangeError::Network(err.to_string())
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: OutboundRequest) -> Result<TransportResponse, ExchangeError> {
        let OutboundRequest {
            method,
            url,
            headers,
            body,
        } = request;

        let mut builder = match method {
            HttpMethod::Get => self.client.get(&url),
            HttpMethod::Post => self.client.post(&url),
        };
        for (name, value) in &headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = body {
            builder = builder.body(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| Self::map_error(method, &url, e))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| Self::map_error(method, &url, e))?;

        Ok(TransportResponse { status, body })
    }
}
