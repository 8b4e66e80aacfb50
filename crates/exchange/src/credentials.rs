//! 交易所 API 凭证。
//!
//! Secret 使用 `secrecy::SecretString` 包装，防止被意外打印，并在释放时清零内存。

use bitdash_core::config::ExchangeConfig;
use bitdash_core::exchange::entity::CredentialStatus;
use bitdash_core::exchange::error::ExchangeError;
use secrecy::{ExposeSecret, SecretString};

/// API Key 长度低于此值视为格式可疑
const MIN_KEY_LENGTH: usize = 10;

/// 状态接口允许展示的 API Key 前缀长度
const KEY_PREFIX_LEN: usize = 4;

/// # Summary
/// 进程级只读凭证，启动时从配置构造一次。
///
/// # Invariants
/// - 构造时已去除首尾空白。
/// - 允许以空值构造 (以便状态接口报告缺失)，但 `ensure_usable` 会拒绝空凭证。
#[derive(Clone)]
pub struct Credentials {
    api_key: String,
    secret: SecretString,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>, secret: impl Into<String>) -> Self {
        let api_key: String = api_key.into();
        let secret: String = secret.into();
        Self {
            api_key: api_key.trim().to_string(),
            secret: SecretString::from(secret.trim().to_string()),
        }
    }

    /// 从已加载的配置读取，缺失项以空字符串代替
    pub fn from_config(config: &ExchangeConfig) -> Self {
        Self::new(
            config.api_key.clone().unwrap_or_default(),
            config.api_secret.clone().unwrap_or_default(),
        )
    }

    /// API Key (公开信息，但仍只应以前缀形式出现在日志中)
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// 暴露 Secret 用于签名计算。
    ///
    /// **WARNING**: 返回值不得写入日志或响应体。
    pub fn expose_secret(&self) -> &str {
        self.secret.expose_secret()
    }

    /// # Summary
    /// 校验凭证可用于签名请求。
    ///
    /// # Returns
    /// Key 或 Secret 为空时返回 `ExchangeError::Configuration`。
    pub fn ensure_usable(&self) -> Result<(), ExchangeError> {
        if self.api_key.is_empty() || self.expose_secret().is_empty() {
            return Err(ExchangeError::Configuration("Missing API keys".into()));
        }
        Ok(())
    }

    /// 生成不含敏感信息的配置状态
    pub fn status(&self) -> CredentialStatus {
        let key_present = !self.api_key.is_empty();
        let secret_present = !self.expose_secret().is_empty();
        let key_length_valid = self.api_key.chars().count() > MIN_KEY_LENGTH;
        CredentialStatus {
            configured: key_present && secret_present,
            key_present,
            secret_present,
            key_length_valid,
            key_prefix: key_length_valid.then(|| self.key_prefix()),
        }
    }

    /// 可安全展示的 Key 前缀
    pub fn key_prefix(&self) -> String {
        self.api_key.chars().take(KEY_PREFIX_LEN).collect()
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key_prefix", &self.key_prefix())
            .field("secret", &"[REDACTED]")
            .finish()
    }
}
