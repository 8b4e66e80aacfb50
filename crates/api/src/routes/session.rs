//! # 会话路由控制器
//!
//! 登录签发会话 Cookie，登出清除会话 Cookie。

use axum::Json;
use axum::extract::State;
use axum_extra::extract::cookie::CookieJar;

use crate::server::AppState;
use crate::types::SessionResponse;

/// 登录
///
/// 不校验任何凭据，直接签发 24 小时有效的会话 Cookie。
#[utoipa::path(
    post,
    path = "/login",
    tag = "会话 (Session)",
    responses(
        (status = 200, description = "已签发会话 Cookie", body = SessionResponse)
    )
)]
pub async fn login(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Json<SessionResponse>) {
    tracing::info!("签发会话 Cookie");
    (
        state.session.establish(jar),
        Json(SessionResponse { authenticated: true }),
    )
}

/// 登出
#[utoipa::path(
    post,
    path = "/logout",
    tag = "会话 (Session)",
    responses(
        (status = 200, description = "会话 Cookie 已清除", body = SessionResponse)
    )
)]
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Json<SessionResponse>) {
    (
        state.session.clear(jar),
        Json(SessionResponse { authenticated: false }),
    )
}
