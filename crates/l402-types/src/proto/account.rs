//! Account-level responses: identity, balances, stored payment methods.
//!
//! These are returned as the server sends them; they take no part in the
//! offer/payment lifecycle and need no domain translation.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ids::ServerId;
use crate::timestamp::Timestamp;

/// Body of `GET /v0/users/me`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: ServerId,
    pub email: String,
    pub created_at: Timestamp,
}

/// One entry of `GET /v0/wallets`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    pub currency: String,
    pub balance: Decimal,
}

/// One entry of `GET /v0/stripe/payment-methods`.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredPaymentMethod {
    pub id: ServerId,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub last4: Option<String>,
    pub brand: Option<String>,
    pub exp_month: Option<u32>,
    pub exp_year: Option<u32>,
    pub is_default: Option<bool>,
}

/// Untyped acknowledgement, e.g. of `POST /v0/users/webhook/set`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Acknowledgement(pub serde_json::Value);
