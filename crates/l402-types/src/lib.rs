#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Core types for the L402 pay-per-use purchase protocol.
//!
//! This crate provides the domain model shared by L402 clients and tools:
//! offers a vendor publishes, the bundles the server answers with, payment
//! instructions, payment statuses and payment records. It performs no I/O;
//! HTTP access lives in `l402-reqwest`.
//!
//! # Overview
//!
//! A vendor publishes one or more [`Offer`]s and receives an [`OfferBundle`]
//! carrying a context token and a payment request URL. A buyer asks that URL
//! for [`PaymentDetails`] in a chosen [`PaymentMethod`], or has the server
//! settle an offer directly, which yields a [`PaymentRecord`]. The bundle's
//! settlement state is polled as a [`PaymentStatus`].
//!
//! # Modules
//!
//! - [`config`] - Client configuration, API key resolution, environment variable references
//! - [`error`] - Construction-time validation failures
//! - [`ids`] - Context tokens and server-assigned identifiers
//! - [`offer`] - Offers and offer bundles
//! - [`payment`] - Payment instructions, statuses, records and direct Lightning payments
//! - [`proto`] - Wire format records exchanged with the server
//! - [`translate`] - Lossless mapping between wire records and the domain model
//! - [`timestamp`] - Server-reported points in time
//! - [`util`] - Money amount parsing

pub mod config;
pub mod error;
pub mod ids;
pub mod offer;
pub mod payment;
pub mod proto;
pub mod timestamp;
pub mod translate;
pub mod util;

pub use config::{API_KEY_ENV, ApiKey, ClientConfig, ConfigError, DEFAULT_BASE_URL, LiteralOrEnv};
pub use error::ValidationError;
pub use ids::{ContextToken, PaymentId, ServerId};
pub use offer::{CustomMethod, Offer, OfferBundle, OfferKind, PaymentMethod, validate_offer_set};
pub use payment::{
    LightningPayment, PaymentDetails, PaymentRecord, PaymentRequest, PaymentState, PaymentStatus,
};
pub use timestamp::Timestamp;
pub use translate::{WireFormat, decode_wire, encode_wire};
pub use util::MoneyAmount;
