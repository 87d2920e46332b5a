//! Utility types and functions for L402.
//!
//! - [`money_amount`] - Human-readable currency amount parsing and minor-unit rendering

pub mod money_amount;

pub use money_amount::*;
