//! # 启动配置加载
//!
//! 优先级由低到高：内置默认值 → `bitdash.toml` (可选) → `BITDASH__*` 环境变量
//! → `EXCHANGE_API_KEY` / `EXCHANGE_API_SECRET`。

use bitdash_core::config::AppConfig;
use config::{Config, ConfigError, Environment, File};

/// 配置文件名 (不含扩展名)，从工作目录查找
pub const CONFIG_FILE: &str = "bitdash";
pub const ENV_PREFIX: &str = "BITDASH";
pub const API_KEY_ENV: &str = "EXCHANGE_API_KEY";
pub const API_SECRET_ENV: &str = "EXCHANGE_API_SECRET";

/// 从工作目录与进程环境加载配置。仅在启动时调用一次。
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from(
        CONFIG_FILE,
        std::env::var(API_KEY_ENV).ok(),
        std::env::var(API_SECRET_ENV).ok(),
    )
}

/// # Summary
/// 按固定优先级合并各配置源。
///
/// # Arguments
/// * `file`: 配置文件路径或文件名，文件不存在时跳过。
/// * `api_key` / `api_secret`: 交易所凭证，存在时覆盖其它来源。
pub fn load_config_from(
    file: &str,
    api_key: Option<String>,
    api_secret: Option<String>,
) -> Result<AppConfig, ConfigError> {
    let defaults = Config::try_from(&AppConfig::default())?;

    Config::builder()
        .add_source(defaults)
        .add_source(File::with_name(file).required(false))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
        .set_override_option("exchange.api_key", api_key)?
        .set_override_option("exchange.api_secret", api_secret)?
        .build()?
        .try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bitdash_core::config::SigningScheme;

    #[test]
    fn test_defaults_without_file() {
        let config = load_config_from("does-not-exist-bitdash", None, None).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.exchange.signing_scheme, SigningScheme::HmacBx);
        assert_eq!(config.session.ttl_secs, 86400);
        assert!(config.exchange.api_key.is_none());
    }

    #[test]
    fn test_credentials_override() {
        let config = load_config_from(
            "does-not-exist-bitdash",
            Some("abcdefghijkl".into()),
            Some("s3cret".into()),
        )
        .unwrap();
        assert_eq!(config.exchange.api_key.as_deref(), Some("abcdefghijkl"));
        assert_eq!(config.exchange.api_secret.as_deref(), Some("s3cret"));
    }

    #[test]
    fn test_file_overrides_defaults() {
        let path = std::env::temp_dir().join(format!("bitdash-settings-{}.toml", std::process::id()));
        std::fs::write(
            &path,
            r#"
[server]
port = 9090
production = true

[exchange]
signing_scheme = "nonce-sha256"
price_concurrency = 2
"#,
        )
        .unwrap();

        let config = load_config_from(path.to_str().unwrap(), None, None).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.server.port, 9090);
        assert!(config.server.production);
        assert_eq!(config.exchange.signing_scheme, SigningScheme::NonceSha256);
        assert_eq!(config.exchange.price_concurrency, 2);
        // 未出现在文件中的字段保留默认值
        assert_eq!(config.exchange.timeout_ms, 5000);
    }
}
