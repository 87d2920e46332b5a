//! Timestamps carried by L402 payment messages.
//!
//! The server emits ISO 8601 strings (`expires_at`, `paid_at`, `created_at`).
//! [`Timestamp`] keeps the exact string so that re-encoding a record never
//! alters it, and interprets it lazily when a caller needs a point in time.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// A server-issued timestamp, stored verbatim.
///
/// # Example
///
/// ```
/// use l402_types::timestamp::Timestamp;
///
/// let ts = Timestamp::new("2030-01-01T00:00:00Z");
/// assert_eq!(ts.to_datetime().unwrap().timestamp(), 1893456000);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(String);

impl Timestamp {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Interprets the timestamp as a UTC instant.
    ///
    /// RFC 3339 strings are honoured with their offset. ISO 8601 strings
    /// without an offset are taken as UTC. Returns `None` for anything else.
    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(&self.0) {
            return Some(dt.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(&self.0, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|naive| naive.and_utc())
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(value: DateTime<Utc>) -> Self {
        Self(value.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }
}

impl Display for Timestamp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
