//! Opaque identifiers issued by the L402 server.
//!
//! The client never inspects these values. They are threaded from one call to
//! the next exactly as the server returned them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::{Display, Formatter};

/// Token correlating an offer bundle with its payment lifecycle.
///
/// Required to poll the payment status of a bundle and to pay any offer in it.
/// No format validation is applied: whatever string the server hands out is
/// accepted and sent back verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContextToken(String);

impl ContextToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for ContextToken {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for ContextToken {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl AsRef<str> for ContextToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for ContextToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Server-assigned identifier that may arrive either as a JSON number or a string.
///
/// The original JSON representation is preserved, so a numeric id is sent back
/// as a number and a textual id as a string.
///
/// ```
/// use l402_types::ServerId;
///
/// let id: ServerId = serde_json::from_str("42").unwrap();
/// assert_eq!(id, ServerId::Number(42));
/// assert_eq!(id.to_string(), "42");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ServerId {
    Number(u64),
    Text(String),
}

/// Stable handle of a payment record, used for `outgoing-payments` lookups.
pub type PaymentId = ServerId;

impl Display for ServerId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ServerId::Number(n) => write!(f, "{n}"),
            ServerId::Text(s) => f.write_str(s),
        }
    }
}

impl From<u64> for ServerId {
    fn from(value: u64) -> Self {
        ServerId::Number(value)
    }
}

impl From<String> for ServerId {
    fn from(value: String) -> Self {
        ServerId::Text(value)
    }
}

impl From<&str> for ServerId {
    fn from(value: &str) -> Self {
        ServerId::Text(value.to_string())
    }
}
