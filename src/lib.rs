//! Rust client for the L402 pay-per-use purchase protocol.
//!
//! Vendors publish priced offers and receive a bundle with a payment context
//! token; buyers pay an offer of the bundle through Lightning or a card, and
//! either side polls the payment status until it settles.
//!
//! This crate gathers the workspace:
//!
//! - [`l402_types`] holds the domain values, the wire records and the
//!   translation between them, plus client configuration.
//! - [`l402_reqwest`] holds [`L402Client`], which performs the protocol calls
//!   over a pluggable [`Transport`].
//!
//! The `l402` binary built from this package exposes every client operation
//! as a subcommand.

pub use l402_reqwest;
pub use l402_types;

pub use l402_reqwest::{L402Client, L402Error, ReqwestTransport, Transport};
pub use l402_types::{
    ClientConfig, LightningPayment, Offer, OfferBundle, PaymentDetails, PaymentMethod,
    PaymentRecord, PaymentStatus,
};
