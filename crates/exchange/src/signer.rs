//! 交易所请求签名。
//!
//! 签名是纯函数：相同输入必然得到相同输出，不做 I/O、不保留状态。
//! 交易所的签名约定曾多次变更，因此以 `RequestSigner` trait 抽象，
//! 具体方案由配置中的 `SigningScheme` 选择。

use std::sync::Arc;

use bitdash_core::config::SigningScheme;
use bitdash_core::exchange::entity::HttpMethod;
use bitdash_core::exchange::error::ExchangeError;
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

use crate::credentials::Credentials;

type HmacSha256 = Hmac<Sha256>;

/// nonce 的随机字节数 (hex 编码后长度翻倍)
pub const NONCE_BYTES: usize = 16;

/// 签名产出的认证请求头，按插入顺序附加到请求上
pub type AuthHeaders = Vec<(&'static str, String)>;

/// # Summary
/// 单次出站请求的签名输入，在发送前即时构造，用后即弃。
///
/// # Invariants
/// - `path` 以 `/` 开头，可以带查询串。
/// - `body` 在无请求体时为空字符串，而不是 `"null"`。
#[derive(Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    pub method: HttpMethod,
    pub path: String,
    pub body: String,
    pub timestamp: String,
    pub nonce: Option<String>,
}

/// # Summary
/// 签名能力接口。
///
/// # Invariants
/// - 实现必须是确定性的：nonce 由调用方写入 `RequestDescriptor`，实现内部不得生成随机数。
pub trait RequestSigner: Send + Sync {
    /// 当前实现对应的配置方案
    fn scheme(&self) -> SigningScheme;

    /// 是否需要调用方在描述符中提供 nonce
    fn requires_nonce(&self) -> bool {
        false
    }

    /// # Summary
    /// 计算该请求需要附加的全部认证头。
    ///
    /// # Returns
    /// Secret 为空返回 `Configuration`，其余输入非法返回 `Signing`。
    fn compute_auth_headers(
        &self,
        credentials: &Credentials,
        request: &RequestDescriptor,
    ) -> Result<AuthHeaders, ExchangeError>;
}

/// # Summary
/// HMAC-SHA256 签名。
///
/// # Logic
/// 1. 拼接 `timestamp || METHOD || path || body`。
/// 2. 以 Secret 为密钥计算 HMAC-SHA256。
/// 3. 返回小写 hex。
///
/// # Arguments
/// * `body`: `None` 与 `Some("")` 等价。
pub fn sign(
    secret: &str,
    timestamp: &str,
    method: HttpMethod,
    path: &str,
    body: Option<&str>,
) -> Result<String, ExchangeError> {
    if secret.is_empty() {
        return Err(ExchangeError::Configuration("API secret is empty".into()));
    }
    if !path.starts_with('/') {
        return Err(ExchangeError::Signing(format!(
            "request path must start with '/': {}",
            path
        )));
    }

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| ExchangeError::Signing(e.to_string()))?;
    mac.update(timestamp.as_bytes());
    mac.update(method.as_str().as_bytes());
    mac.update(path.as_bytes());
    mac.update(body.unwrap_or_default().as_bytes());

    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// # Summary
/// 双重 SHA256 nonce 签名。
///
/// # Logic
/// 1. `digest = hex(SHA256(nonce || timestamp || key || body))`
/// 2. `sign = hex(SHA256(digest || secret))`
pub fn sign_nonced(
    api_key: &str,
    secret: &str,
    nonce: &str,
    timestamp: &str,
    body: Option<&str>,
) -> Result<String, ExchangeError> {
    if secret.is_empty() {
        return Err(ExchangeError::Configuration("API secret is empty".into()));
    }
    if nonce.is_empty() {
        return Err(ExchangeError::Signing("nonce is required".into()));
    }

    let mut stage_one = Sha256::new();
    stage_one.update(nonce.as_bytes());
    stage_one.update(timestamp.as_bytes());
    stage_one.update(api_key.as_bytes());
    stage_one.update(body.unwrap_or_default().as_bytes());
    let digest = hex::encode(stage_one.finalize());

    let mut stage_two = Sha256::new();
    stage_two.update(digest.as_bytes());
    stage_two.update(secret.as_bytes());

    Ok(hex::encode(stage_two.finalize()))
}

/// 生成一次性 nonce：来自线程本地 CSPRNG 的 16 字节随机数，hex 编码
pub fn generate_nonce() -> String {
    hex::encode(rand::random::<[u8; NONCE_BYTES]>())
}

/// HMAC 方案的请求头名称
#[derive(Debug, Clone, Copy)]
struct HmacHeaderNames {
    api_key: &'static str,
    timestamp: &'static str,
    signature: &'static str,
}

/// `timestamp || METHOD || path || body` 的 HMAC-SHA256 签名，请求头名称随方案不同
pub struct HmacSigner {
    scheme: SigningScheme,
    headers: HmacHeaderNames,
}

impl HmacSigner {
    /// `X-BX-APIKEY` / `X-BX-TIMESTAMP` / `X-BX-SIGNATURE`
    pub fn bx() -> Self {
        Self {
            scheme: SigningScheme::HmacBx,
            headers: HmacHeaderNames {
                api_key: "X-BX-APIKEY",
                timestamp: "X-BX-TIMESTAMP",
                signature: "X-BX-SIGNATURE",
            },
        }
    }

    /// `X-BITUNIX-APIKEY` / `X-BITUNIX-TIMESTAMP` / `X-BITUNIX-SIGN`
    pub fn legacy() -> Self {
        Self {
            scheme: SigningScheme::HmacLegacy,
            headers: HmacHeaderNames {
                api_key: "X-BITUNIX-APIKEY",
                timestamp: "X-BITUNIX-TIMESTAMP",
                signature: "X-BITUNIX-SIGN",
            },
        }
    }
}

impl RequestSigner for HmacSigner {
    fn scheme(&self) -> SigningScheme {
        self.scheme
    }

    fn compute_auth_headers(
        &self,
        credentials: &Credentials,
        request: &RequestDescriptor,
    ) -> Result<AuthHeaders, ExchangeError> {
        let signature = sign(
            credentials.expose_secret(),
            &request.timestamp,
            request.method,
            &request.path,
            Some(&request.body),
        )?;

        Ok(vec![
            (self.headers.api_key, credentials.api_key().to_string()),
            (self.headers.timestamp, request.timestamp.clone()),
            (self.headers.signature, signature),
        ])
    }
}

/// 双重 SHA256 + nonce 签名，请求头为 `api-key` / `nonce` / `timestamp` / `sign`
pub struct NoncedSigner;

impl RequestSigner for NoncedSigner {
    fn scheme(&self) -> SigningScheme {
        SigningScheme::NonceSha256
    }

    fn requires_nonce(&self) -> bool {
        true
    }

    fn compute_auth_headers(
        &self,
        credentials: &Credentials,
        request: &RequestDescriptor,
    ) -> Result<AuthHeaders, ExchangeError> {
        let nonce = request
            .nonce
            .as_deref()
            .ok_or_else(|| ExchangeError::Signing("nonce is required".into()))?;

        let signature = sign_nonced(
            credentials.api_key(),
            credentials.expose_secret(),
            nonce,
            &request.timestamp,
            Some(&request.body),
        )?;

        Ok(vec![
            ("api-key", credentials.api_key().to_string()),
            ("nonce", nonce.to_string()),
            ("timestamp", request.timestamp.clone()),
            ("sign", signature),
        ])
    }
}

/// 按配置选择签名实现
pub fn signer_for(scheme: SigningScheme) -> Arc<dyn RequestSigner> {
    match scheme {
        SigningScheme::HmacBx => Arc::new(HmacSigner::bx()),
        SigningScheme::HmacLegacy => Arc::new(HmacSigner::legacy()),
        SigningScheme::NonceSha256 => Arc::new(NoncedSigner),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn descriptor(nonce: Option<&str>) -> RequestDescriptor {
        RequestDescriptor {
            method: HttpMethod::Post,
            path: "/api/spot/v1/transfer".into(),
            body: r#"{"amount":"1"}"#.into(),
            timestamp: "1700000000000".into(),
            nonce: nonce.map(str::to_string),
        }
    }

    #[test]
    fn test_sign_matches_manual_hmac() {
        let signature = sign(
            "my_secret",
            "1700000000000",
            HttpMethod::Post,
            "/api/spot/v1/transfer",
            Some(r#"{"amount":"1"}"#),
        )
        .unwrap();

        let mut mac = HmacSha256::new_from_slice(b"my_secret").unwrap();
        mac.update(br#"1700000000000POST/api/spot/v1/transfer{"amount":"1"}"#);
        let expected = hex::encode(mac.finalize().into_bytes());

        assert_eq!(signature, expected);
        assert_eq!(signature.len(), 64);
        assert!(signature.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_sign_is_deterministic() {
        let a = sign("s", "1", HttpMethod::Get, "/a", Some("b")).unwrap();
        let b = sign("s", "1", HttpMethod::Get, "/a", Some("b")).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_sign_empty_body_equals_omitted_body() {
        for path in ["/", "/api/spot/v1/user/account", "/x?symbol=BTCUSDT"] {
            let omitted = sign("secret", "123", HttpMethod::Get, path, None).unwrap();
            let empty = sign("secret", "123", HttpMethod::Get, path, Some("")).unwrap();
            assert_eq!(omitted, empty);
        }
    }

    #[test]
    fn test_sign_differs_by_method() {
        let get = sign("secret", "123", HttpMethod::Get, "/a", None).unwrap();
        let post = sign("secret", "123", HttpMethod::Post, "/a", None).unwrap();
        assert_ne!(get, post);
    }

    #[test]
    fn test_sign_rejects_bad_input() {
        assert!(matches!(
            sign("", "1", HttpMethod::Get, "/a", None),
            Err(ExchangeError::Configuration(_))
        ));
        assert!(matches!(
            sign("s", "1", HttpMethod::Get, "api/no/slash", None),
            Err(ExchangeError::Signing(_))
        ));
    }

    #[test]
    fn test_sign_nonced_two_stage() {
        // 第一阶段输入 "a" || "b" || "c" = "abc"，SHA256("abc") 为公开测试向量
        let stage_one = "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad";
        let expected = hex::encode(Sha256::digest(format!("{}{}", stage_one, "secret").as_bytes()));

        let signature = sign_nonced("c", "secret", "a", "b", None).unwrap();
        assert_eq!(signature, expected);
        assert_eq!(signature, sign_nonced("c", "secret", "a", "b", Some("")).unwrap());
    }

    #[test]
    fn test_sign_nonced_rejects_missing_inputs() {
        assert!(matches!(
            sign_nonced("k", "", "n", "t", None),
            Err(ExchangeError::Configuration(_))
        ));
        assert!(matches!(
            sign_nonced("k", "s", "", "t", None),
            Err(ExchangeError::Signing(_))
        ));
    }

    #[test]
    fn test_generate_nonce_format() {
        let nonce = generate_nonce();
        assert_eq!(nonce.len(), NONCE_BYTES * 2);
        assert!(nonce.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_nonces_are_distinct() {
        let nonces: HashSet<String> = (0..10_000).map(|_| generate_nonce()).collect();
        assert_eq!(nonces.len(), 10_000);
    }

    #[test]
    fn test_hmac_signer_headers() {
        let creds = Credentials::new("key_123", "secret");
        let request = descriptor(None);

        let headers = HmacSigner::bx().compute_auth_headers(&creds, &request).unwrap();
        let names: Vec<&str> = headers.iter().map(|(name, _)| *name).collect();
        assert_eq!(names, ["X-BX-APIKEY", "X-BX-TIMESTAMP", "X-BX-SIGNATURE"]);
        assert_eq!(headers[0].1, "key_123");
        assert_eq!(headers[1].1, "1700000000000");
        assert_eq!(
            headers[2].1,
            sign("secret", "1700000000000", HttpMethod::Post, "/api/spot/v1/transfer", Some(r#"{"amount":"1"}"#)).unwrap()
        );

        let legacy = HmacSigner::legacy().compute_auth_headers(&creds, &request).unwrap();
        assert_eq!(legacy[2].0, "X-BITUNIX-SIGN");
        assert_eq!(legacy[2].1, headers[2].1);
    }

    #[test]
    fn test_nonced_signer_requires_nonce() {
        let creds = Credentials::new("key_123", "secret");
        let signer = NoncedSigner;
        assert!(signer.requires_nonce());
        assert!(matches!(
            signer.compute_auth_headers(&creds, &descriptor(None)),
            Err(ExchangeError::Signing(_))
        ));

        let headers = signer
            .compute_auth_headers(&creds, &descriptor(Some("00ff")))
            .unwrap();
        assert_eq!(headers[1], ("nonce", "00ff".to_string()));
        assert_eq!(
            headers[3].1,
            sign_nonced("key_123", "secret", "00ff", "1700000000000", Some(r#"{"amount":"1"}"#)).unwrap()
        );
    }

    #[test]
    fn test_signer_for_scheme() {
        for scheme in [
            SigningScheme::HmacBx,
            SigningScheme::HmacLegacy,
            SigningScheme::NonceSha256,
        ] {
            assert_eq!(signer_for(scheme).scheme(), scheme);
        }
    }
}
