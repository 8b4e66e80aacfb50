use thiserror::Error;

/// # Summary
/// 交易所调用错误枚举，覆盖配置、签名、传输及响应解析各阶段。
///
/// # Invariants
/// - 必须通过 `thiserror` 派生 `Error` trait。
/// - 任何变体的消息中都不得包含 API Secret 或签名值。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExchangeError {
    /// 凭证缺失或格式错误，调用在任何网络 I/O 之前即被拒绝
    #[error("Server configuration error: {0}")]
    Configuration(String),

    /// 签名输入不合法 (如路径缺少前导 `/`)
    #[error("Signing error: {0}")]
    Signing(String),

    /// 请求参数不合法，未发起 I/O
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// 交易所返回非 2xx 状态码
    #[error("Exchange API error: {status} {raw_body}")]
    Http { status: u16, raw_body: String },

    /// 响应体不是预期的 Envelope 结构
    #[error("Exchange protocol error: {0}")]
    Protocol(String),

    // 连接、DNS、TLS 等底层传输错误
    #[error("Network error: {0}")]
    Network(String),

    // 只读请求超时
    #[error("Exchange request timed out: {0}")]
    Timeout(String),

    /// 写请求 (划转、提现) 超时，交易所端是否已执行未知，禁止自动重试
    #[error("Exchange write timed out, outcome unknown: {0}")]
    UnknownOutcome(String),
}
