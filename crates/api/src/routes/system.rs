//! # 系统信息路由控制器

use axum::Json;
use axum::extract::State;
use axum::http::HeaderMap;
use bitdash_core::exchange::entity::CredentialStatus;

use crate::server::AppState;
use crate::types::IpResponse;

/// 凭证配置状态
///
/// 只暴露是否配置、长度是否合法与 API Key 的 4 位前缀，Secret 不会出现在响应中。
#[utoipa::path(
    get,
    path = "/system/status",
    tag = "系统 (System)",
    responses(
        (status = 200, description = "凭证配置状态", body = CredentialStatus)
    )
)]
pub async fn status(State(state): State<AppState>) -> Json<CredentialStatus> {
    Json(state.credential_status.clone())
}

/// 调用方出口 IP
///
/// 取 `X-Forwarded-For` 的第一跳，缺失时返回 `unknown`。
/// 用于在交易所后台配置 API Key 的 IP 白名单。
#[utoipa::path(
    get,
    path = "/ip",
    tag = "系统 (System)",
    responses(
        (status = 200, description = "出口 IP", body = IpResponse)
    )
)]
pub async fn ip(headers: HeaderMap) -> Json<IpResponse> {
    Json(client_ip(&headers))
}

fn client_ip(headers: &HeaderMap) -> IpResponse {
    let raw = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    let ip = raw
        .as_deref()
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or("unknown")
        .to_string();

    IpResponse { ip, raw }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_first_forwarded_hop() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.7, 10.0.0.1"));
        let resp = client_ip(&headers);
        assert_eq!(resp.ip, "203.0.113.7");
        assert_eq!(resp.raw.as_deref(), Some("203.0.113.7, 10.0.0.1"));
    }

    #[test]
    fn test_missing_header() {
        let resp = client_ip(&HeaderMap::new());
        assert_eq!(resp.ip, "unknown");
        assert!(resp.raw.is_none());
    }
}
