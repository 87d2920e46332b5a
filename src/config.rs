//! Configuration of the `l402` command line client.
//!
//! Settings come from three layers, later ones winning:
//! a JSON file (`--config` / `L402_CONFIG`), then command line flags and
//! their environment variables (`--api-key` / `FEWSATS_API_KEY`,
//! `--base-url` / `FEWSATS_BASE_URL`). A `.env` file is loaded beforehand.

use clap::Parser;
use l402_types::{ApiKey, ClientConfig, ConfigError};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::cli::Command;

/// CLI arguments for the L402 client.
#[derive(Parser, Debug)]
#[command(name = "l402")]
#[command(about = "Client for the L402 pay-per-use purchase protocol", version)]
pub struct CliArgs {
    /// Path to a JSON configuration file
    #[arg(long, short, env = "L402_CONFIG")]
    pub config: Option<PathBuf>,
    /// API key, sent as `Authorization: Token <key>`
    #[arg(long, env = "FEWSATS_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,
    /// Base URL of the L402 API
    #[arg(long, env = "FEWSATS_BASE_URL")]
    pub base_url: Option<Url>,
    /// Deadline of read calls, in milliseconds
    #[arg(long)]
    pub timeout_ms: Option<u64>,
    /// Deadline of payment calls, in milliseconds
    #[arg(long)]
    pub payment_timeout_ms: Option<u64>,
    #[command(subcommand)]
    pub command: Command,
}

impl CliArgs {
    /// Merges the configuration file, if any, with the flags.
    pub fn client_config(&self) -> Result<ClientConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => load_from_path(path)?,
            None => ClientConfig::default(),
        };
        if let Some(api_key) = &self.api_key {
            config = config.with_api_key(ApiKey::new(api_key.as_str())?);
        }
        if let Some(base_url) = &self.base_url {
            config = config.with_base_url(base_url.clone());
        }
        if let Some(timeout_ms) = self.timeout_ms {
            config = config.with_timeout(Duration::from_millis(timeout_ms));
        }
        if let Some(timeout_ms) = self.payment_timeout_ms {
            config = config.with_payment_timeout(Duration::from_millis(timeout_ms));
        }
        Ok(config)
    }
}

fn load_from_path(path: &Path) -> Result<ClientConfig, ConfigError> {
    let path = path
        .canonicalize()
        .map_err(|e| ConfigError::FileRead(path.to_path_buf(), e))?;
    ClientConfig::load_from_path(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn parse(args: &[&str]) -> CliArgs {
        CliArgs::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_flags_override_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"api_key": "sk_file", "base_url": "https://file.example", "timeout_ms": 1000}}"#
        )
        .unwrap();
        let path = file.path().to_str().unwrap();

        let args = parse(&[
            "l402",
            "--config",
            path,
            "--api-key",
            "sk_flag",
            "--base-url",
            "https://flag.example",
            "balance",
        ]);
        let config = args.client_config().unwrap();
        assert_eq!(config.base_url().as_str(), "https://flag.example/");
        assert_eq!(config.timeout(), Some(Duration::from_millis(1000)));
        let key = config.resolve_api_key_with(|_| None).unwrap();
        assert_eq!(key.expose(), "sk_flag");
    }

    #[test]
    fn test_missing_file() {
        let args = parse(&["l402", "--config", "/definitely/not/here.json", "me"]);
        assert!(matches!(
            args.client_config(),
            Err(ConfigError::FileRead(_, _))
        ));
    }

    #[test]
    fn test_invalid_flag_key() {
        let args = parse(&["l402", "--api-key", "has space", "me"]);
        assert!(matches!(
            args.client_config(),
            Err(ConfigError::InvalidApiKey)
        ));
    }
}
