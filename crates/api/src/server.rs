//! # API 服务启动器
//!
//! 组装 axum 路由、挂载 Swagger UI、配置 CORS 并绑定 TCP 端口对外提供服务。
//! 本模块不直接启动 `main()`, 而是由 `crates/app` 组装依赖后调用。

use std::sync::Arc;

use axum::Router;
use bitdash_core::exchange::entity::CredentialStatus;
use bitdash_core::exchange::port::ExchangePort;
use bitdash_exchange::valuation::PortfolioValuator;
use tower_http::cors::{Any, CorsLayer};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;
use utoipa_swagger_ui::SwaggerUi;

use crate::middleware::session::{SessionGate, require_session};
use crate::routes::{balance, market, session, system, wallet};

// ============================================================
//  共享应用状态
// ============================================================

/// 全局应用状态，通过 axum 的 `State` 提取器注入到每个 Handler 中。
///
/// # Invariants
/// - 所有字段在服务启动前组装完毕，生命周期与进程等同，运行期只读。
/// - `credential_status` 在启动时计算一次，不含 Secret 的任何部分。
#[derive(Clone)]
pub struct AppState {
    /// 交易所端口
    pub exchange: Arc<dyn ExchangePort>,
    /// 资产估值器 (有界并发查价)
    pub valuator: Arc<PortfolioValuator>,
    /// 会话守卫
    pub session: SessionGate,
    pub credential_status: CredentialStatus,
}

// ============================================================
//  OpenAPI 文档定义
// ============================================================

/// 全局 OpenAPI 文档结构
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Bitdash 交易所代理面板 API",
        version = "0.1.0",
        description = "代理交易所 REST 接口的本地网关。提供余额查询、资产估值、账户划转与提现功能，交易所 API Secret 只保存在服务端。",
        license(name = "MIT")
    ),
    tags(
        (name = "会话 (Session)", description = "会话 Cookie 的签发与清除"),
        (name = "账户 (Account)", description = "现货余额与资产估值"),
        (name = "资金 (Wallet)", description = "账户间划转与链上提现"),
        (name = "行情 (Market)", description = "最新成交价"),
        (name = "系统 (System)", description = "凭证配置状态与出口 IP")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// 为 OpenAPI 文档注入会话 Cookie 鉴权方案。
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);

        // 先调用 /login 获取 Cookie，浏览器会自动携带
        components.add_security_scheme(
            "session_cookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "bitdash_session",
                "调用 POST /login 后由浏览器自动携带的会话 Cookie",
            ))),
        );
    }
}

// ============================================================
//  服务构建与启动
// ============================================================

/// 构建完整的 axum 应用路由树 (含 Swagger UI 与 CORS)。
///
/// # Logic
/// 1. 公开路由：登录、登出、行情、系统信息。
/// 2. 受保护路由：余额、估值、划转、提现，统一挂载 `require_session`。
/// 3. 合并路由并收集 OpenAPI 文档。
pub fn build_router(state: AppState) -> Router {
    // 1. 无需会话的公开路由
    let public_router = OpenApiRouter::new()
        .routes(routes!(session::login))
        .routes(routes!(session::logout))
        .routes(routes!(market::last_price))
        .routes(routes!(system::status))
        .routes(routes!(system::ip));

    // 2. 需要会话 Cookie 的路由，未登录请求不会到达 Handler
    let protected_router = OpenApiRouter::new()
        .routes(routes!(balance::get_balance))
        .routes(routes!(balance::get_portfolio))
        .routes(routes!(wallet::transfer))
        .routes(routes!(wallet::withdraw))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            require_session,
        ));

    // 3. 合并所有路由与自动收集的 OpenAPI Doc
    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .merge(public_router)
        .merge(protected_router)
        .with_state(state)
        .split_for_parts();

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    router
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api))
        .layer(cors)
}

/// 绑定端口并启动 HTTP 服务，收到 Ctrl-C 后优雅退出。
///
/// # Arguments
/// * `state` - 组装完毕的共享状态
/// * `bind_addr` - 监听的地址与端口，如 `"0.0.0.0:8080"`
pub async fn start_server(state: AppState, bind_addr: &str) -> Result<(), Box<dyn std::error::Error>> {
    let app = build_router(state);

    tracing::info!("🚀 Bitdash API Server listening on {}", bind_addr);
    tracing::info!("📖 Swagger UI: http://{}/swagger-ui/", bind_addr);

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("API Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        // 无法监听信号时保持运行，由进程管理器负责终止
        tracing::error!("无法监听 Ctrl-C 信号: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("收到退出信号，停止接收新请求");
}
