use bitdash_core::config::LogConfig;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// # Summary
/// 初始化全局日志：控制台输出 + 按天滚动的文件输出。
///
/// # Logic
/// `RUST_LOG` 优先，未设置时使用配置中的 `log.level`。
///
/// # Returns
/// 文件写入线程的守卫，必须持有到进程退出，否则缓冲的日志会丢失。
pub fn init_logging(config: &LogConfig) -> WorkerGuard {
    let file_appender = tracing_appender::rolling::daily(&config.dir, "bitdash.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(fmt::layer().with_writer(file_writer).with_ansi(false))
        .init();

    guard
}
