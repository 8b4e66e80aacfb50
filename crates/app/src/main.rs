mod logging;
mod settings;

use std::sync::Arc;
use std::time::Duration;

use bitdash_api::middleware::session::SessionGate;
use bitdash_api::server::{AppState, start_server};
use bitdash_core::exchange::port::ExchangePort;
use bitdash_exchange::client::ExchangeClient;
use bitdash_exchange::valuation::PortfolioValuator;
use tracing::{info, warn};

/// # Summary
/// 应用启动入口，纯粹的组装层。
/// 负责实例化具体实现并通过 `Arc<dyn ExchangePort>` 注入 API 层。
///
/// # Logic
/// 1. 加载 `.env` 与启动配置。
/// 2. 初始化全局日志。
/// 3. 构造交易所客户端并计算凭证状态。
/// 4. 构造估值器与会话守卫。
/// 5. 启动 HTTP 服务，直到收到退出信号。
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. 加载配置
    let env_file = dotenvy::dotenv().ok();
    let config = settings::load_config()?;

    // 2. 初始化日志
    let _log_guard = logging::init_logging(&config.log);
    info!("Bitdash starting...");
    if let Some(path) = env_file {
        info!("已加载环境文件 {}", path.display());
    }

    // 3. 实例化交易所客户端
    let client = ExchangeClient::new(&config.exchange)?;
    let credential_status = client.credentials().status();
    if credential_status.configured {
        info!(
            "交易所凭证已配置 (key 前缀 {}), 签名方案 {:?}",
            client.credentials().key_prefix(),
            config.exchange.signing_scheme
        );
    } else {
        warn!("交易所凭证未配置，需签名的接口将返回 500");
    }
    let exchange: Arc<dyn ExchangePort> = Arc::new(client);

    // 4. 构造应用服务层
    let valuator = Arc::new(PortfolioValuator::new(
        exchange.clone(),
        config.exchange.price_concurrency,
        Duration::from_millis(config.exchange.timeout_ms),
    ));
    let session = SessionGate::from_config(&config.session, config.server.production);

    let state = AppState {
        exchange,
        valuator,
        session,
        credential_status,
    };

    // 5. 启动服务
    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    start_server(state, &bind_addr).await?;

    info!("Shutdown complete.");
    Ok(())
}
