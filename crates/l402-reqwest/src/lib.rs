#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Reqwest-based client for the L402 pay-per-use purchase protocol.
//!
//! [`L402Client`] covers the whole purchase lifecycle: a vendor publishes
//! offers, a buyer fetches payment instructions or pays an offer directly,
//! and either side polls the bundle's payment status.
//!
//! ## Quickstart
//!
//! ```rust,no_run
//! use l402_reqwest::L402Client;
//! use l402_types::ClientConfig;
//!
//! # async fn run() -> Result<(), l402_reqwest::L402Error> {
//! // Reads FEWSATS_API_KEY when the config carries no key
//! let client = L402Client::new(&ClientConfig::new())?;
//! let me = client.me().await?;
//! println!("{}", me.email);
//! # Ok(())
//! # }
//! ```
//!
//! ## Errors
//!
//! Failures are reported as [`L402Error`], which separates configuration
//! problems, invalid local input, transport failures (unreachable server,
//! non-2xx status, timeout) and protocol failures (a response that does not
//! decode, or an explained refusal).
//!
//! ## Features
//!
//! - `telemetry` - `tracing` spans named `l402.client.<operation>` around every call

mod client;
mod error;
pub mod transport;

pub use client::*;
pub use error::*;
pub use transport::{ReqwestTransport, Target, Transport, TransportError, TransportRequest};
