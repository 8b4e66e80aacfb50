use serde::{Deserialize, Serialize};

/// 全局应用配置
///
/// # Invariants
/// - 仅在进程启动时加载一次，之后以只读形式注入各组件，运行期不再读取环境变量。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub exchange: ExchangeConfig,
    pub session: SessionConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// 生产模式下会话 Cookie 附带 `Secure` 属性
    pub production: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            production: false,
        }
    }
}

/// 交易所请求签名方案
///
/// 交易所的签名约定在不同版本间变更过多次，因此作为可切换的配置项。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SigningScheme {
    /// HMAC-SHA256, `X-BX-*` 请求头
    #[default]
    HmacBx,
    /// HMAC-SHA256, `X-BITUNIX-*` 请求头
    HmacLegacy,
    /// 双重 SHA256 + 随机 nonce
    NonceSha256,
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExchangeConfig {
    /// 交易所 REST API 根地址 (未经官方文档确认)
    pub base_url: String,
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
    pub signing_scheme: SigningScheme,
    /// 单次请求的截止时间 (毫秒)
    pub timeout_ms: u64,
    /// 资产估值时并发价格查询的上限
    pub price_concurrency: usize,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            base_url: "https://openapi.bitunix.com".to_string(),
            api_key: None,
            api_secret: None,
            signing_scheme: SigningScheme::default(),
            timeout_ms: 5_000,
            price_concurrency: 8,
        }
    }
}

impl std::fmt::Debug for ExchangeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExchangeConfig")
            .field("base_url", &self.base_url)
            .field("api_key_present", &self.api_key.is_some())
            .field("api_secret", &"[REDACTED]")
            .field("signing_scheme", &self.signing_scheme)
            .field("timeout_ms", &self.timeout_ms)
            .field("price_concurrency", &self.price_concurrency)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub cookie_name: String,
    pub ttl_secs: i64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "bitdash_session".to_string(),
            ttl_secs: 60 * 60 * 24,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `RUST_LOG` 未设置时使用的过滤级别
    pub level: String,
    /// 滚动日志文件目录
    pub dir: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            dir: "logs".to_string(),
        }
    }
}
