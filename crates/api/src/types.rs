//! # DTO (Data Transfer Object) 层
//!
//! 浏览器请求体与本地响应体。交易所的 Envelope 直接透传，不在此重复定义。
//! 所有 DTO 必须派生 `utoipa::ToSchema` 以自动进入 Swagger 文档。

use bitdash_core::exchange::entity::{AccountType, TransferRequest, WithdrawalRequest};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};

use crate::error::ApiError;

const MISSING_FIELDS: &str = "Missing required fields";

/// 取出非空字段，空白字符串视同缺失
fn required(field: Option<String>) -> Option<String> {
    field
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// # Summary
/// 从任意 JSON 中读取一个文本字段。
///
/// # Logic
/// 字符串原样取出，数字转为十进制字符串 (数字 0 视同缺失)，其余类型视为缺失。
fn field_text(body: &Value, key: &str) -> Option<String> {
    match body.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        _ => None,
    }
}

// ============================================================
//  资金操作请求体
// ============================================================

/// 划转请求体。字段全部可选，以便缺字段时返回 400 而不是反序列化失败。
/// 金额可以是字符串或数字。
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransferBody {
    #[schema(example = "100")]
    pub amount: Option<String>,
    #[schema(example = "USDT")]
    pub currency: Option<String>,
    #[schema(example = "SPOT")]
    pub from_account_type: Option<String>,
    #[schema(example = "FUTURES")]
    pub to_account_type: Option<String>,
}

impl TransferBody {
    /// 从已解析的 JSON 宽松读取，非对象或类型不符的字段一律视为缺失
    pub fn from_value(body: &Value) -> Self {
        Self {
            amount: field_text(body, "amount"),
            currency: field_text(body, "currency"),
            from_account_type: field_text(body, "fromAccountType"),
            to_account_type: field_text(body, "toAccountType"),
        }
    }

    /// # Summary
    /// 校验并转换为领域请求。
    ///
    /// # Returns
    /// 任一字段缺失返回 `Missing required fields`，账户类型非法返回 `Invalid account type`。
    pub fn validate(self) -> Result<TransferRequest, ApiError> {
        let (Some(amount), Some(currency), Some(from), Some(to)) = (
            required(self.amount),
            required(self.currency),
            required(self.from_account_type),
            required(self.to_account_type),
        ) else {
            return Err(ApiError::BadRequest(MISSING_FIELDS.into()));
        };

        let from_account_type: AccountType = from
            .parse()
            .map_err(|_| ApiError::BadRequest("Invalid account type".into()))?;
        let to_account_type: AccountType = to
            .parse()
            .map_err(|_| ApiError::BadRequest("Invalid account type".into()))?;

        Ok(TransferRequest {
            amount,
            currency,
            from_account_type,
            to_account_type,
        })
    }
}

/// 提现请求体
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct WithdrawBody {
    #[schema(example = "50")]
    pub amount: Option<String>,
    #[schema(example = "USDT")]
    pub currency: Option<String>,
    pub address: Option<String>,
    #[schema(example = "TRC20")]
    pub chain: Option<String>,
}

impl WithdrawBody {
    pub fn from_value(body: &Value) -> Self {
        Self {
            amount: field_text(body, "amount"),
            currency: field_text(body, "currency"),
            address: field_text(body, "address"),
            chain: field_text(body, "chain"),
        }
    }

    pub fn validate(self) -> Result<WithdrawalRequest, ApiError> {
        let (Some(amount), Some(currency), Some(address), Some(chain)) = (
            required(self.amount),
            required(self.currency),
            required(self.address),
            required(self.chain),
        ) else {
            return Err(ApiError::BadRequest(MISSING_FIELDS.into()));
        };

        Ok(WithdrawalRequest {
            currency,
            amount,
            address,
            chain,
        })
    }
}

/// 行情查询参数
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LastPriceQuery {
    /// 交易对，缺省为 `BTCUSDT`
    pub symbol: Option<String>,
}

// ============================================================
//  本地响应 DTO
// ============================================================

/// 登录 / 登出后的会话状态
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SessionResponse {
    pub authenticated: bool,
}

/// 调用方出口 IP (取自反向代理的 `X-Forwarded-For`)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct IpResponse {
    #[schema(example = "203.0.113.7")]
    pub ip: String,
    pub raw: Option<String>,
}

/// 统一错误响应体 `{error, detail?}`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiErrorResponse {
    /// 错误描述信息
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ApiErrorResponse {
    /// 从错误信息构建
    pub fn from_msg(msg: impl Into<String>) -> Self {
        Self {
            error: msg.into(),
            detail: None,
        }
    }
}
