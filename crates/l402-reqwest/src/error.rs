use http::StatusCode;
use l402_types::{ConfigError, ValidationError};

use crate::transport::TransportError;

/// The server answered, but not with what the protocol expects.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("Failed to decode response: {context}: {source}")]
    Decode {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("Failed to encode request body: {context}: {source}")]
    Encode {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },
    /// The server refused the request and said why.
    #[error("Rejected by server with status {status}: {context}: {message}")]
    Rejected {
        context: &'static str,
        status: StatusCode,
        message: String,
    },
}

/// Any failure of an [`L402Client`](crate::L402Client) operation.
///
/// No operation retries on its own. Re-invoking a status or record lookup
/// after a failure is safe; re-invoking a payment is not, since the first
/// attempt may have settled.
#[derive(Debug, thiserror::Error)]
pub enum L402Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

impl L402Error {
    pub fn is_timeout(&self) -> bool {
        matches!(self, L402Error::Transport(e) if e.is_timeout())
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, L402Error::Transport(_))
    }

    pub fn is_protocol(&self) -> bool {
        matches!(self, L402Error::Protocol(_))
    }

    pub fn is_malformed_input(&self) -> bool {
        matches!(self, L402Error::Validation(_))
    }

    pub fn is_config(&self) -> bool {
        matches!(self, L402Error::Config(_))
    }
}
