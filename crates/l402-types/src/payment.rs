//! Payment instructions, statuses and records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::fmt::{Display, Formatter};

use crate::ids::{ContextToken, PaymentId};
use crate::offer::{OfferKind, PaymentMethod};
use crate::timestamp::Timestamp;

/// Method-specific payload telling the buyer how to pay.
///
/// Payloads carrying a `lightning_invoice` string are recognised as Lightning
/// instructions; anything else is kept as an opaque map so that vendor
/// extensions survive untouched. Built only from the wire payload, so the
/// wire form is always recovered exactly.
///
/// In client format the server's own keys are nested under `extra` or
/// `payload` and never mix with `method` or `invoice`:
///
/// ```
/// use l402_types::PaymentRequest;
/// use serde_json::json;
///
/// let serde_json::Value::Object(map) = json!({"lightning_invoice": "lnbc1", "method": "x"}) else {
///     unreachable!()
/// };
/// let request = PaymentRequest::from(map);
/// assert_eq!(
///     serde_json::to_value(&request).unwrap(),
///     json!({"method": "lightning", "invoice": "lnbc1", "extra": {"method": "x"}})
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PaymentRequest(Instructions);

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "method", rename_all = "snake_case")]
enum Instructions {
    Lightning {
        invoice: String,
        #[serde(skip_serializing_if = "Map::is_empty")]
        extra: Map<String, Value>,
    },
    Opaque {
        payload: Map<String, Value>,
    },
}

impl PaymentRequest {
    /// Wire key holding the Lightning invoice.
    pub const LIGHTNING_INVOICE_KEY: &'static str = "lightning_invoice";

    /// BOLT11 invoice to pay, for Lightning instructions.
    pub fn lightning_invoice(&self) -> Option<&str> {
        match &self.0 {
            Instructions::Lightning { invoice, .. } => Some(invoice),
            Instructions::Opaque { .. } => None,
        }
    }

    pub fn is_lightning(&self) -> bool {
        matches!(self.0, Instructions::Lightning { .. })
    }

    /// Payload fields other than the Lightning invoice.
    pub fn extra(&self) -> &Map<String, Value> {
        match &self.0 {
            Instructions::Lightning { extra, .. } => extra,
            Instructions::Opaque { payload } => payload,
        }
    }
}

impl From<Map<String, Value>> for PaymentRequest {
    fn from(mut payload: Map<String, Value>) -> Self {
        let instructions = match payload.remove(Self::LIGHTNING_INVOICE_KEY) {
            Some(Value::String(invoice)) => Instructions::Lightning {
                invoice,
                extra: payload,
            },
            Some(other) => {
                payload.insert(Self::LIGHTNING_INVOICE_KEY.to_string(), other);
                Instructions::Opaque { payload }
            }
            None => Instructions::Opaque { payload },
        };
        PaymentRequest(instructions)
    }
}

impl From<PaymentRequest> for Map<String, Value> {
    fn from(request: PaymentRequest) -> Self {
        match request.0 {
            Instructions::Lightning { invoice, mut extra } => {
                extra.insert(
                    PaymentRequest::LIGHTNING_INVOICE_KEY.to_string(),
                    Value::String(invoice),
                );
                extra
            }
            Instructions::Opaque { payload } => payload,
        }
    }
}

/// Instructions for completing payment of one offer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDetails {
    pub(crate) expires_at: Timestamp,
    pub(crate) offer_id: String,
    pub(crate) payment_request: PaymentRequest,
    pub(crate) version: String,
}

impl PaymentDetails {
    pub fn expires_at(&self) -> &Timestamp {
        &self.expires_at
    }

    pub fn offer_id(&self) -> &str {
        &self.offer_id
    }

    pub fn payment_request(&self) -> &PaymentRequest {
        &self.payment_request
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Best-effort client-side expiry check.
    ///
    /// Returns `None` when the expiry timestamp cannot be interpreted. The
    /// server performs the authoritative check when the payment is made.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> Option<bool> {
        self.expires_at.to_datetime().map(|expiry| now >= expiry)
    }
}

/// Settlement state reported by the server, e.g. `"pending"` or `"paid"`.
///
/// The set of states is vendor-defined; the string is preserved verbatim and
/// never validated. Observed lifecycle: `pending` → `paid` | `failed` |
/// `expired`, terminal once out of `pending`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentState(String);

impl PaymentState {
    pub const PENDING: &'static str = "pending";
    pub const PAID: &'static str = "paid";
    pub const FAILED: &'static str = "failed";
    pub const EXPIRED: &'static str = "expired";

    pub fn new(state: impl Into<String>) -> Self {
        Self(state.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_pending(&self) -> bool {
        self.0 == Self::PENDING
    }

    pub fn is_paid(&self) -> bool {
        self.0 == Self::PAID
    }

    /// Any state other than `pending` is final.
    pub fn is_terminal(&self) -> bool {
        !self.is_pending()
    }
}

impl From<&str> for PaymentState {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl Display for PaymentState {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Current settlement state of an offer bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentStatus {
    pub(crate) status: PaymentState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) paid_at: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) amount: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) offer_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) payment_context_token: Option<ContextToken>,
}

impl PaymentStatus {
    pub fn status(&self) -> &PaymentState {
        &self.status
    }

    pub fn paid_at(&self) -> Option<&Timestamp> {
        self.paid_at.as_ref()
    }

    /// Settled amount in minor units, once known.
    pub fn amount(&self) -> Option<u64> {
        self.amount
    }

    pub fn currency(&self) -> Option<&str> {
        self.currency.as_deref()
    }

    /// Offer that was paid, once known.
    pub fn offer_id(&self) -> Option<&str> {
        self.offer_id.as_deref()
    }

    pub fn payment_context_token(&self) -> Option<&ContextToken> {
        self.payment_context_token.as_ref()
    }
}

/// A single completed or in-flight purchase.
///
/// The server-assigned [`PaymentId`] is immutable and is the only key for
/// later lookups; status and settlement fields may change between lookups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRecord {
    pub(crate) id: PaymentId,
    pub(crate) status: PaymentState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) created_at: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) payment_method: Option<PaymentMethod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) amount: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) invoice: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) is_test: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) payment_context_token: Option<ContextToken>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) payment_request_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) preimage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) title: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub(crate) kind: Option<OfferKind>,
}

impl PaymentRecord {
    pub fn id(&self) -> &PaymentId {
        &self.id
    }

    pub fn status(&self) -> &PaymentState {
        &self.status
    }

    pub fn created_at(&self) -> Option<&Timestamp> {
        self.created_at.as_ref()
    }

    pub fn payment_method(&self) -> Option<&PaymentMethod> {
        self.payment_method.as_ref()
    }

    pub fn amount(&self) -> Option<u64> {
        self.amount
    }

    pub fn currency(&self) -> Option<&str> {
        self.currency.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Lightning invoice that was paid, when the payment went over Lightning.
    pub fn invoice(&self) -> Option<&str> {
        self.invoice.as_deref()
    }

    /// Proof of payment for Lightning payments.
    pub fn preimage(&self) -> Option<&str> {
        self.preimage.as_deref()
    }

    pub fn is_test(&self) -> Option<bool> {
        self.is_test
    }

    pub fn payment_context_token(&self) -> Option<&ContextToken> {
        self.payment_context_token.as_ref()
    }

    pub fn payment_request_url(&self) -> Option<&str> {
        self.payment_request_url.as_deref()
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn kind(&self) -> Option<&OfferKind> {
        self.kind.as_ref()
    }
}

/// Direct Lightning invoice payment, outside of any offer bundle.
///
/// Currency defaults to `"USD"` and description to an empty string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LightningPayment {
    pub(crate) invoice: String,
    pub(crate) amount: u64,
    pub(crate) currency: String,
    pub(crate) description: String,
}

impl LightningPayment {
    pub const DEFAULT_CURRENCY: &'static str = "USD";

    pub fn new(invoice: impl Into<String>, amount: u64) -> Self {
        Self {
            invoice: invoice.into(),
            amount,
            currency: Self::DEFAULT_CURRENCY.to_string(),
            description: String::new(),
        }
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn invoice(&self) -> &str {
        &self.invoice
    }

    pub fn amount(&self) -> u64 {
        self.amount
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}
