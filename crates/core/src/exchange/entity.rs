use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

/// # Summary
/// 发往交易所的 HTTP 方法。交易所接口只使用 GET 与 POST 两种。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    /// 参与签名拼接的大写方法名
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// # Summary
/// 交易所统一响应包装 `{code, msg, data}`。
///
/// # Invariants
/// - 代理层原样透传，只检查 `code`，不改写 `data`。
/// - 业务失败时交易所会返回 `data: null`，因此 `data` 为可选。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Envelope<T> {
    /// 业务状态码，0 或 200 表示成功
    #[schema(example = 0)]
    pub code: i64,
    /// 状态描述
    #[schema(example = "success")]
    #[serde(default)]
    pub msg: String,
    /// 业务数据
    #[serde(default = "Option::default")]
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    /// 交易所的成功码不统一，0 与 200 均视为成功
    pub fn is_success(&self) -> bool {
        self.code == 0 || self.code == 200
    }
}

/// # Summary
/// 单个币种的现货余额，仅用于估值。`/balance` 直接透传交易所原始 `data`，不经过此类型。
///
/// # Invariants
/// - 数量以交易所原文保存：字符串原样保留，数字转为十进制字符串，缺失时为空串。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Balance {
    #[schema(example = "BTC")]
    pub currency: String,
    #[schema(example = "0.5")]
    pub available: String,
    #[schema(example = "0.01")]
    pub frozen: String,
}

impl Balance {
    /// # Summary
    /// 从交易所返回的单行资产宽松解析。
    ///
    /// # Returns
    /// 缺少非空 `currency` 时返回 `None`，其余字段缺失或类型不符时按空串处理。
    pub fn from_value(row: &Value) -> Option<Self> {
        let currency = row
            .get("currency")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|c| !c.is_empty())?;

        Some(Self {
            currency: currency.to_string(),
            available: amount_text(row.get("available")),
            frozen: amount_text(row.get("frozen")),
        })
    }
}

fn amount_text(field: Option<&Value>) -> String {
    match field {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

/// # Summary
/// 取出账户接口 `data` 中的资产行。
///
/// # Logic
/// 交易所通常返回 `{uid, assets: [...]}`，部分版本直接返回资产数组；
/// 其他形状或缺少 `assets` 时视为空持仓。
pub fn account_asset_rows(data: Option<&Value>) -> &[Value] {
    match data {
        Some(Value::Array(rows)) => rows.as_slice(),
        Some(Value::Object(account)) => account
            .get("assets")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default(),
        _ => &[],
    }
}

/// 划转的账户类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum AccountType {
    Spot,
    Futures,
}

impl FromStr for AccountType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "SPOT" => Ok(AccountType::Spot),
            "FUTURES" => Ok(AccountType::Futures),
            _ => Err(format!("Unknown account type: {}", s)),
        }
    }
}

/// 账户间划转请求 (已校验)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    #[schema(example = "100")]
    pub amount: String,
    #[schema(example = "USDT")]
    pub currency: String,
    pub from_account_type: AccountType,
    pub to_account_type: AccountType,
}

/// 链上提现请求 (已校验)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct WithdrawalRequest {
    #[schema(example = "USDT")]
    pub currency: String,
    #[schema(example = "50")]
    pub amount: String,
    pub address: String,
    /// 链名称，例如 `TRC20`
    #[schema(example = "TRC20")]
    pub chain: String,
}

/// # Summary
/// 凭证配置状态，供 `/system/status` 展示。
///
/// # Invariants
/// - 只允许暴露 API Key 的短前缀，Secret 的任何部分都不得出现。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CredentialStatus {
    pub configured: bool,
    pub key_present: bool,
    pub secret_present: bool,
    pub key_length_valid: bool,
    #[schema(example = "ab12")]
    pub key_prefix: Option<String>,
}

/// 单个资产的估值结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssetValuation {
    #[schema(example = "BTC")]
    pub currency: String,
    pub available: String,
    pub frozen: String,
    /// 计价所用的 USDT 单价，查询失败时为空
    pub price: Option<String>,
    /// 保留两位小数的 USDT 估值，查询失败时为 `0.00`
    #[schema(example = "32500.00")]
    pub usdt_value: String,
    pub price_available: bool,
    pub error: Option<String>,
}
