//! `l402` command line client.
//!
//! Talks to an L402 API on behalf of a vendor or a buyer: publish offers,
//! fetch payment instructions, pay, and track purchases. Run `l402 demo` for
//! the whole flow end to end.
//!
//! Environment:
//! - `.env` values loaded at startup
//! - `FEWSATS_API_KEY`, `FEWSATS_BASE_URL` and `L402_CONFIG` configure the client
//! - `RUST_LOG` filters the log output written to stderr
//! - `OTEL_*` variables enable span export over OTLP

mod cli;
mod config;
mod demo;
mod run;
mod telemetry;

use std::process;

use crate::run::run;

#[tokio::main]
async fn main() {
    let result = run().await;
    if let Err(e) = result {
        eprintln!("{e}");
        process::exit(1)
    }
}
