use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bitdash_core::common::time::{RealTimeProvider, TimeProvider};
use bitdash_core::config::ExchangeConfig;
use bitdash_core::exchange::entity::{Envelope, HttpMethod, TransferRequest, WithdrawalRequest};
use bitdash_core::exchange::error::ExchangeError;
use bitdash_core::exchange::port::ExchangePort;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::credentials::Credentials;
use crate::signer::{RequestDescriptor, RequestSigner, generate_nonce, signer_for};
use crate::transport::{HttpTransport, OutboundRequest, ReqwestTransport, TransportResponse};

/// 交易所接口路径。
///
/// 划转与提现路径沿用既有实现的推断值，上线前必须与交易所官方文档核对。
pub mod endpoints {
    pub const ACCOUNT: &str = "/api/spot/v1/user/account";
    pub const LAST_PRICE: &str = "/api/spot/v1/market/last_price";
    pub const TRANSFER: &str = "/api/spot/v1/transfer";
    pub const WITHDRAW: &str = "/api/spot/v1/withdraw/apply";
}

/// # Summary
/// 交易所签名客户端，`ExchangePort` 的生产实现。
///
/// # Invariants
/// - 凭证与签名方案在构造后不可变。
/// - 每次调用都是新的网络往返：不缓存、不重试、签名后立即发送。
#[derive(Clone)]
pub struct ExchangeClient {
    base_url: String,
    credentials: Credentials,
    signer: Arc<dyn RequestSigner>,
    transport: Arc<dyn HttpTransport>,
    clock: Arc<dyn TimeProvider>,
}

impl ExchangeClient {
    /// # Summary
    /// 根据启动配置构造客户端。
    ///
    /// # Logic
    /// 1. 从配置读取凭证 (缺失时只告警，调用时再拒绝)。
    /// 2. 按 `signing_scheme` 选择签名实现。
    /// 3. 以 `timeout_ms` 构造 reqwest 传输层。
    pub fn new(config: &ExchangeConfig) -> Result<Self, ExchangeError> {
        let credentials = Credentials::from_config(config);
        if credentials.ensure_usable().is_err() {
            tracing::error!("Missing EXCHANGE_API_KEY or EXCHANGE_API_SECRET, signed calls will be refused");
        }

        let transport = ReqwestTransport::new(Duration::from_millis(config.timeout_ms))?;
        Ok(Self::with_parts(
            &config.base_url,
            credentials,
            signer_for(config.signing_scheme),
            Arc::new(transport),
            Arc::new(RealTimeProvider),
        ))
    }

    /// 以显式组件构造，供测试注入 Mock 传输层与固定时钟
    pub fn with_parts(
        base_url: &str,
        credentials: Credentials,
        signer: Arc<dyn RequestSigner>,
        transport: Arc<dyn HttpTransport>,
        clock: Arc<dyn TimeProvider>,
    ) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
            signer,
            transport,
            clock,
        }
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// # Summary
    /// 执行一次签名调用。
    ///
    /// # Logic
    /// 1. 凭证为空时直接返回 `Configuration`，不触发任何 I/O。
    /// 2. 规范化路径，序列化请求体 (无请求体时为空字符串)。
    /// 3. 取当前毫秒时间戳，按需生成 nonce，计算认证头。
    /// 4. 发送，并把响应解析为 `Envelope<T>`。
    ///
    /// # Arguments
    /// * `endpoint`: 接口路径，缺少前导 `/` 时自动补齐。
    /// * `body`: 仅在 POST 时随请求发送，但始终参与签名。
    pub async fn call<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        method: HttpMethod,
        body: Option<&Value>,
    ) -> Result<Envelope<T>, ExchangeError> {
        self.credentials.ensure_usable()?;

        let path = normalize_endpoint(endpoint);
        let has_body = body.is_some();
        let body = match body {
            Some(value) => serde_json::to_string(value)
                .map_err(|e| ExchangeError::Protocol(format!("Failed to encode body: {}", e)))?,
            None => String::new(),
        };

        let descriptor = RequestDescriptor {
            method,
            path,
            body,
            timestamp: self.clock.epoch_millis(),
            nonce: self.signer.requires_nonce().then(generate_nonce),
        };
        let auth_headers = self
            .signer
            .compute_auth_headers(&self.credentials, &descriptor)?;

        let mut headers = vec![("Content-Type".to_string(), "application/json".to_string())];
        headers.extend(
            auth_headers
                .into_iter()
                .map(|(name, value)| (name.to_string(), value)),
        );

        let url = format!("{}{}", self.base_url, descriptor.path);
        tracing::debug!(
            method = %method,
            url = %url,
            timestamp = %descriptor.timestamp,
            scheme = ?self.signer.scheme(),
            "Sending signed exchange request"
        );

        let request = OutboundRequest {
            method,
            url,
            headers,
            body: (method == HttpMethod::Post && has_body).then_some(descriptor.body),
        };
        let response = self.transport.send(request).await?;
        decode_envelope(method, &descriptor.path, response)
    }

    /// # Summary
    /// 执行一次无签名的公开 GET 调用 (行情类接口)，不要求凭证。
    pub async fn public_get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
    ) -> Result<Envelope<T>, ExchangeError> {
        let path = normalize_endpoint(endpoint);
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(url = %url, "Sending public exchange request");

        let request = OutboundRequest {
            method: HttpMethod::Get,
            url,
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body: None,
        };
        let response = self.transport.send(request).await?;
        decode_envelope(HttpMethod::Get, &path, response)
    }
}

/// 保证接口路径以 `/` 开头
pub fn normalize_endpoint(endpoint: &str) -> String {
    if endpoint.starts_with('/') {
        endpoint.to_string()
    } else {
        format!("/{}", endpoint)
    }
}

fn decode_envelope<T: DeserializeOwned>(
    method: HttpMethod,
    path: &str,
    response: TransportResponse,
) -> Result<Envelope<T>, ExchangeError> {
    if !response.is_success() {
        tracing::error!(status = response.status, body = %response.body, "[{} {}] Exchange returned error status", method, path);
        return Err(ExchangeError::Http {
            status: response.status,
            raw_body: response.body,
        });
    }

    let envelope: Envelope<T> = serde_json::from_str(&response.body).map_err(|e| {
        tracing::error!("[{} {}] Malformed exchange response: {}", method, path, e);
        ExchangeError::Protocol(e.to_string())
    })?;

    if !envelope.is_success() {
        tracing::warn!(code = envelope.code, msg = %envelope.msg, "[{} {}] Exchange business error", method, path);
    }
    Ok(envelope)
}

fn to_body<B: serde::Serialize>(body: &B) -> Result<Value, ExchangeError> {
    serde_json::to_value(body)
        .map_err(|e| ExchangeError::Protocol(format!("Failed to encode body: {}", e)))
}

#[async_trait]
impl ExchangePort for ExchangeClient {
    async fn account(&self) -> Result<Envelope<Value>, ExchangeError> {
        self.call(endpoints::ACCOUNT, HttpMethod::Get, None).await
    }

    async fn last_price(&self, symbol: &str) -> Result<Envelope<Value>, ExchangeError> {
        if symbol.is_empty() || !symbol.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ExchangeError::InvalidRequest(format!("Invalid symbol: {}", symbol)));
        }
        self.public_get(&format!("{}?symbol={}", endpoints::LAST_PRICE, symbol))
            .await
    }

    async fn transfer(&self, request: &TransferRequest) -> Result<Envelope<Value>, ExchangeError> {
        let body = to_body(request)?;
        self.call(endpoints::TRANSFER, HttpMethod::Post, Some(&body)).await
    }

    async fn withdraw(
        &self,
        request: &WithdrawalRequest,
    ) -> Result<Envelope<Value>, ExchangeError> {
        let body = to_body(request)?;
        self.call(endpoints::WITHDRAW, HttpMethod::Post, Some(&body)).await
    }
}
