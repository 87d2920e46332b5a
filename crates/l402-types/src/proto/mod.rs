//! Wire format types for L402 API messages.
//!
//! Everything in this module mirrors the JSON exchanged with the server:
//! snake_case field names, flat payment request payloads, optional fields
//! omitted rather than nulled on output. The serde attributes on these records
//! are the field-name table of each entity; translation to and from the domain
//! model lives in [`crate::translate`].
//!
//! Unknown fields are ignored on decode so that newer servers stay readable.
//!
//! # Key Types
//!
//! - [`OfferData`] / [`L402OffersData`] - Offers and the bundle returned by `POST /v0/l402/offers`
//! - [`PaymentDetailsData`] - Instructions returned by the bundle's payment request URL
//! - [`PaymentStatusData`] - Body of `GET /v0/l402/payment-status`
//! - [`PaymentResponseData`] - Payment records returned by the purchase endpoints
//! - Request bodies: [`CreateOffersRequest`], [`PaymentDetailsRequest`],
//!   [`PayOfferRequest`], [`PayLightningRequest`], [`SetWebhookRequest`]

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::ids::{ContextToken, PaymentId};
use crate::offer::{OfferKind, PaymentMethod};
use crate::payment::PaymentState;
use crate::timestamp::Timestamp;

pub mod account;

pub use account::*;

/// A single offer as exchanged with the server.
///
/// `payment_methods` defaults to an empty list and `type` to `"one-off"`
/// when absent.
///
/// ```json
/// {
///   "offer_id": "o1",
///   "amount": 1,
///   "currency": "USD",
///   "description": "A simple 1 cent offer",
///   "title": "One Cent Offer",
///   "payment_methods": ["lightning"],
///   "type": "one-off"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferData {
    pub offer_id: String,
    pub amount: u64,
    pub currency: String,
    pub description: String,
    pub title: String,
    #[serde(default)]
    pub payment_methods: Vec<PaymentMethod>,
    #[serde(rename = "type", default)]
    pub kind: OfferKind,
}

/// An offer bundle: offers plus the shared payment context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct L402OffersData {
    pub offers: Vec<OfferData>,
    pub payment_context_token: ContextToken,
    pub payment_request_url: String,
    pub version: String,
}

/// Payment instructions for one offer.
///
/// `payment_request` is method-specific, e.g. `{"lightning_invoice": "lnbc..."}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentDetailsData {
    pub expires_at: Timestamp,
    pub offer_id: String,
    pub payment_request: Map<String, Value>,
    pub version: String,
}

/// Settlement state of an offer bundle.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentStatusData {
    pub status: PaymentState,
    pub paid_at: Option<Timestamp>,
    pub amount: Option<u64>,
    pub currency: Option<String>,
    pub offer_id: Option<String>,
    pub payment_context_token: Option<ContextToken>,
}

/// A payment record as returned by the purchase and lookup endpoints.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentResponseData {
    pub id: PaymentId,
    pub status: PaymentState,
    pub created_at: Option<Timestamp>,
    pub payment_method: Option<PaymentMethod>,
    pub amount: Option<u64>,
    pub currency: Option<String>,
    pub description: Option<String>,
    pub invoice: Option<String>,
    pub is_test: Option<bool>,
    pub payment_context_token: Option<ContextToken>,
    pub payment_request_url: Option<String>,
    pub preimage: Option<String>,
    pub title: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<OfferKind>,
}

/// Body of `POST /v0/l402/offers`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateOffersRequest {
    pub offers: Vec<OfferData>,
}

/// Body posted to a bundle's payment request URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentDetailsRequest {
    pub offer_id: String,
    pub payment_method: PaymentMethod,
    pub payment_context_token: ContextToken,
}

/// Body of `POST /v0/l402/purchases/from-offer`.
///
/// The whole bundle is sent back flattened next to the id of the offer to
/// charge; the server uses the rest of the bundle as payment context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayOfferRequest {
    pub offer_id: String,
    #[serde(flatten)]
    pub bundle: L402OffersData,
}

/// Body of `POST /v0/l402/purchases/lightning`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayLightningRequest {
    pub invoice: String,
    pub amount: u64,
    pub currency: String,
    pub description: String,
}

/// Body of `POST /v0/users/webhook/set`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetWebhookRequest {
    pub webhook_url: String,
}
