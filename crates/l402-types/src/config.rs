//! Client configuration and credential resolution.
//!
//! A client needs a base URL and an API key. The key is taken from explicit
//! configuration first and from the `FEWSATS_API_KEY` environment variable
//! otherwise; when neither is present, construction fails.
//!
//! # Environment Variable Resolution
//!
//! Values in a JSON configuration file can be literals or references to
//! environment variables through [`LiteralOrEnv`]:
//!
//! ```json
//! {
//!   "api_key": "$FEWSATS_API_KEY",
//!   "base_url": "https://api.fewsats.com",
//!   "timeout_ms": 10000,
//!   "payment_timeout_ms": 30000
//! }
//! ```

use serde::Deserialize;
use std::fmt;
use std::fmt::{Debug, Formatter};
use std::fs;
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use url::Url;

/// Environment variable consulted for the API key.
pub const API_KEY_ENV: &str = "FEWSATS_API_KEY";

/// Base URL of the hosted L402 API.
pub const DEFAULT_BASE_URL: &str = "https://api.fewsats.com";

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(
        "The API key must be set either explicitly or through the {env} environment variable",
        env = API_KEY_ENV
    )]
    MissingApiKey,
    #[error("The API key may only contain visible ASCII characters")]
    InvalidApiKey,
    #[error("Base URL cannot carry API paths: {0}")]
    InvalidBaseUrl(Url),
    #[error("Failed to read config file at {0}: {1}")]
    FileRead(PathBuf, std::io::Error),
    #[error("Failed to parse config file: {0}")]
    JsonParse(#[from] serde_json::Error),
}

/// Static bearer credential for the L402 API.
///
/// Never printed: `Debug` shows a redacted placeholder.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wraps a key.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::MissingApiKey`] for an empty or whitespace-only key
    /// - [`ConfigError::InvalidApiKey`] if the key cannot be sent in an HTTP header
    pub fn new(key: impl Into<String>) -> Result<Self, ConfigError> {
        let key = key.into();
        let key = key.trim();
        if key.is_empty() {
            Err(ConfigError::MissingApiKey)
        } else if !key.chars().all(|c| c.is_ascii_graphic()) {
            Err(ConfigError::InvalidApiKey)
        } else {
            Ok(Self(key.to_string()))
        }
    }

    /// The raw key, for building the `Authorization` header.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl Debug for ApiKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

impl FromStr for ApiKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ApiKey::new(s)
    }
}

/// A transparent wrapper that resolves environment variables during deserialization.
///
/// Supports both literal values and environment variable references:
/// - Literal: `"sk_live_123"`
/// - Simple env var: `"$FEWSATS_API_KEY"`
/// - Braced env var: `"${FEWSATS_API_KEY}"`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiteralOrEnv<T>(T);

impl<T> LiteralOrEnv<T> {
    pub fn from_literal(value: T) -> Self {
        Self(value)
    }

    pub fn inner(&self) -> &T {
        &self.0
    }

    pub fn into_inner(self) -> T {
        self.0
    }

    /// Returns the variable name if the string matches `$VAR` or `${VAR}` syntax.
    fn parse_env_var_syntax(s: &str) -> Option<&str> {
        if let Some(braced) = s.strip_prefix("${").and_then(|rest| rest.strip_suffix('}')) {
            Some(braced)
        } else if let Some(var_name) = s.strip_prefix('$') {
            let valid = !var_name.is_empty()
                && var_name.chars().all(|c| c.is_alphanumeric() || c == '_');
            valid.then_some(var_name)
        } else {
            None
        }
    }
}

impl<T> Deref for LiteralOrEnv<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<'de, T> Deserialize<'de> for LiteralOrEnv<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;

        let value = if let Some(var_name) = Self::parse_env_var_syntax(&s) {
            std::env::var(var_name).map_err(|_| {
                serde::de::Error::custom(format!(
                    "Environment variable '{}' not found (referenced as '{}')",
                    var_name, s
                ))
            })?
        } else {
            s
        };

        let parsed = value
            .parse::<T>()
            .map_err(|e| serde::de::Error::custom(format!("Failed to parse value: {}", e)))?;

        Ok(LiteralOrEnv(parsed))
    }
}

/// Settings for an L402 API client.
///
/// Fields absent from a configuration file fall back to defaults: the hosted
/// API base URL and the client's built-in timeouts.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    api_key: Option<LiteralOrEnv<ApiKey>>,
    #[serde(default = "config_defaults::default_base_url")]
    base_url: Url,
    #[serde(default)]
    timeout_ms: Option<u64>,
    #[serde(default)]
    payment_timeout_ms: Option<u64>,
}

fn saturating_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

pub mod config_defaults {
    use super::*;

    pub fn default_base_url() -> Url {
        Url::parse(DEFAULT_BASE_URL).expect("valid default base url")
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: config_defaults::default_base_url(),
            timeout_ms: None,
            payment_timeout_ms: None,
        }
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_api_key(mut self, api_key: ApiKey) -> Self {
        self.api_key = Some(LiteralOrEnv::from_literal(api_key));
        self
    }

    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = base_url;
        self
    }

    /// Overrides the deadline of read and metadata calls.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = Some(saturating_millis(timeout));
        self
    }

    /// Overrides the deadline of payment execution calls.
    pub fn with_payment_timeout(mut self, timeout: Duration) -> Self {
        self.payment_timeout_ms = Some(saturating_millis(timeout));
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    pub fn payment_timeout(&self) -> Option<Duration> {
        self.payment_timeout_ms.map(Duration::from_millis)
    }

    /// Resolves the API key: explicit configuration, then `FEWSATS_API_KEY`.
    ///
    /// # Errors
    ///
    /// [`ConfigError::MissingApiKey`] when neither source yields a non-empty key.
    pub fn resolve_api_key(&self) -> Result<ApiKey, ConfigError> {
        self.resolve_api_key_with(|name| std::env::var(name).ok())
    }

    /// Like [`ClientConfig::resolve_api_key`], reading the environment through `lookup`.
    pub fn resolve_api_key_with<F>(&self, lookup: F) -> Result<ApiKey, ConfigError>
    where
        F: FnOnce(&str) -> Option<String>,
    {
        if let Some(api_key) = &self.api_key {
            return Ok(api_key.inner().clone());
        }
        match lookup(API_KEY_ENV) {
            Some(key) => ApiKey::new(key),
            None => Err(ConfigError::MissingApiKey),
        }
    }

    /// Checks that the base URL can have API paths appended to it.
    pub fn validated_base_url(&self) -> Result<&Url, ConfigError> {
        if self.base_url.cannot_be_a_base() {
            Err(ConfigError::InvalidBaseUrl(self.base_url.clone()))
        } else {
            Ok(&self.base_url)
        }
    }

    /// Loads configuration from a JSON file.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            fs::read_to_string(path).map_err(|e| ConfigError::FileRead(path.to_path_buf(), e))?;
        let config: ClientConfig = serde_json::from_str(&content)?;
        Ok(config)
    }
}
