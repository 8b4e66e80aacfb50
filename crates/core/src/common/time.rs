use chrono::{DateTime, Utc};

/// # Summary
/// 时间供给器接口，用于隔离物理系统时钟。
/// 交易所签名所用的时间戳必须通过此接口获取，以便测试时注入固定时间。
pub trait TimeProvider: Send + Sync {
    /// 获取当前时间
    fn now(&self) -> DateTime<Utc>;

    /// # Summary
    /// 以字符串形式返回 Unix 毫秒时间戳，即交易所签名要求的格式。
    fn epoch_millis(&self) -> String {
        self.now().timestamp_millis().to_string()
    }
}

/// # Summary
/// 生产环境使用的真实时钟，直接返回操作系统当前时间。
pub struct RealTimeProvider;

impl TimeProvider for RealTimeProvider {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// # Summary
/// 测试专用的冻结时钟，始终返回构造时给定的时刻。
///
/// # Invariants
/// - 不可变：同一实例的多次调用返回完全相同的时间。
pub struct FixedTimeProvider {
    frozen_at: DateTime<Utc>,
}

impl FixedTimeProvider {
    /// 使用指定时刻创建冻结时钟
    pub fn new(frozen_at: DateTime<Utc>) -> Self {
        Self { frozen_at }
    }
}

impl TimeProvider for FixedTimeProvider {
    fn now(&self) -> DateTime<Utc> {
        self.frozen_at
    }
}
