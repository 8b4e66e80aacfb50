//! # 会话中间件
//!
//! 基于 Cookie 存在性的两态会话：有 Cookie 即视为已登录，Cookie 的值不参与校验。

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use bitdash_core::config::SessionConfig;

use crate::error::ApiError;
use crate::server::AppState;

/// 写入 Cookie 的固定值
pub const SESSION_VALUE: &str = "authenticated";

/// 会话状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Anonymous,
    Authenticated,
}

/// # Summary
/// 会话守卫，负责检查、签发与清除会话 Cookie。
///
/// # Invariants
/// - 签发与清除都是幂等的，重复调用只会覆盖同名 Cookie。
/// - Cookie 始终为 HttpOnly、`Path=/`、`SameSite=Lax`。
#[derive(Debug, Clone)]
pub struct SessionGate {
    cookie_name: String,
    ttl: time::Duration,
    secure: bool,
}

impl SessionGate {
    pub fn new(cookie_name: impl Into<String>, ttl: time::Duration, secure: bool) -> Self {
        Self {
            cookie_name: cookie_name.into(),
            ttl,
            secure,
        }
    }

    /// 生产环境下 Cookie 追加 `Secure` 标记
    pub fn from_config(config: &SessionConfig, production: bool) -> Self {
        Self::new(
            config.cookie_name.clone(),
            time::Duration::seconds(config.ttl_secs),
            production,
        )
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    pub fn is_authenticated(&self, jar: &CookieJar) -> bool {
        jar.get(&self.cookie_name).is_some()
    }

    pub fn state(&self, jar: &CookieJar) -> SessionState {
        if self.is_authenticated(jar) {
            SessionState::Authenticated
        } else {
            SessionState::Anonymous
        }
    }

    /// 签发会话 Cookie
    pub fn establish(&self, jar: CookieJar) -> CookieJar {
        let cookie = Cookie::build((self.cookie_name.clone(), SESSION_VALUE))
            .http_only(true)
            .secure(self.secure)
            .path("/")
            .same_site(SameSite::Lax)
            .max_age(self.ttl);
        jar.add(cookie)
    }

    /// 下发过期 Cookie 清除会话，未登录时同样生效
    pub fn clear(&self, jar: CookieJar) -> CookieJar {
        jar.remove(Cookie::build((self.cookie_name.clone(), "")).path("/"))
    }
}

/// 受保护路由的前置校验。未携带会话 Cookie 时直接返回 401，Handler 不会被调用。
pub async fn require_session(
    State(state): State<AppState>,
    jar: CookieJar,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if state.session.state(&jar) == SessionState::Anonymous {
        tracing::warn!("拒绝未登录请求: {} {}", req.method(), req.uri().path());
        return Err(ApiError::Unauthorized("Unauthorized".into()));
    }

    Ok(next.run(req).await)
}
