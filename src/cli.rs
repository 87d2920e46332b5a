//! Subcommands of the `l402` binary.
//!
//! Every command prints its result as pretty JSON in client format. Offer
//! bundles can be saved with `create-offer --out` and fed back to `details`
//! and `pay-offer` through `--bundle`; those files use the wire format.

use clap::Subcommand;
use l402_reqwest::{L402Client, L402Error, Transport};
use l402_types::util::money_amount::{DEFAULT_CURRENCY_EXPONENT, MoneyAmountParseError};
use l402_types::{
    LightningPayment, MoneyAmount, Offer, OfferBundle, PaymentId, PaymentMethod, decode_wire,
    encode_wire,
};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::demo;

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Show the account the API key belongs to
    Me,
    /// Show wallet balances
    Balance,
    /// List stored card payment methods
    PaymentMethods,
    /// Publish a single offer and print the resulting bundle
    CreateOffer {
        #[arg(long)]
        offer_id: String,
        /// Price in minor currency units (cents for USD)
        #[arg(
            long,
            allow_negative_numbers = true,
            required_unless_present = "price",
            conflicts_with = "price"
        )]
        amount: Option<i64>,
        /// Price in major units, e.g. "0.50" or "$1,000"
        #[arg(long)]
        price: Option<MoneyAmount>,
        #[arg(long, default_value = "USD")]
        currency: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        /// Accepted payment method, repeatable
        #[arg(long = "method", default_value = "lightning")]
        methods: Vec<String>,
        /// Offer kind, "one-off" when omitted
        #[arg(long)]
        kind: Option<String>,
        /// Save the bundle to this file
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Show the payment status of a bundle
    Status {
        /// Payment context token of the bundle
        token: String,
    },
    /// Fetch payment instructions for an offer of a saved bundle
    Details {
        #[arg(long)]
        bundle: PathBuf,
        #[arg(long)]
        offer_id: String,
        #[arg(long, default_value = "lightning")]
        method: String,
    },
    /// Pay an offer of a saved bundle
    PayOffer {
        #[arg(long)]
        bundle: PathBuf,
        #[arg(long)]
        offer_id: String,
    },
    /// Show a payment record
    PaymentInfo {
        /// Payment id as returned by a payment
        id: String,
    },
    /// Pay a Lightning invoice directly
    PayLightning {
        invoice: String,
        /// Amount in minor currency units
        #[arg(long)]
        amount: u64,
        #[arg(long, default_value = LightningPayment::DEFAULT_CURRENCY)]
        currency: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Register the account webhook URL
    SetWebhook { url: String },
    /// Run the full vendor and buyer flow against the API
    Demo {
        /// Seconds to wait before re-checking the payment status
        #[arg(long, default_value_t = 5)]
        delay_secs: u64,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Client(#[from] L402Error),
    #[error("Invalid price: {0}")]
    Price(#[from] MoneyAmountParseError),
    #[error("Failed to read bundle file at {0}: {1}")]
    BundleRead(PathBuf, std::io::Error),
    #[error("Failed to write bundle file at {0}: {1}")]
    BundleWrite(PathBuf, std::io::Error),
    #[error("Invalid bundle file at {0}: {1}")]
    BundleParse(PathBuf, serde_json::Error),
    #[error("Failed to render output: {0}")]
    Output(serde_json::Error),
}

impl Command {
    pub async fn run<T: Transport>(self, client: &L402Client<T>) -> Result<(), CliError> {
        match self {
            Command::Me => print_json(&client.me().await?),
            Command::Balance => print_json(&client.balance().await?),
            Command::PaymentMethods => print_json(&client.payment_methods().await?),
            Command::CreateOffer {
                offer_id,
                amount,
                price,
                currency,
                title,
                description,
                methods,
                kind,
                out,
            } => {
                let amount = match (amount, price) {
                    (Some(amount), _) => amount,
                    (None, Some(price)) => minor_units(&price)?,
                    (None, None) => 0,
                };
                let mut offer = Offer::new(offer_id, amount, currency, title, description)
                    .map_err(L402Error::from)?
                    .with_payment_methods(methods);
                if let Some(kind) = kind {
                    offer = offer.with_kind(kind);
                }
                let bundle = client.create_offers(&[offer]).await?;
                tracing::info!("Created offer bundle\n{bundle}");
                if let Some(path) = out {
                    save_bundle(&path, &bundle)?;
                    tracing::info!(path = %path.display(), "Saved offer bundle");
                }
                print_json(&bundle)
            }
            Command::Status { token } => print_json(&client.get_payment_status(token).await?),
            Command::Details {
                bundle,
                offer_id,
                method,
            } => {
                let bundle = load_bundle(&bundle)?;
                let details = client
                    .get_payment_details_for(&bundle, &offer_id, PaymentMethod::from(method))
                    .await?;
                print_json(&details)
            }
            Command::PayOffer { bundle, offer_id } => {
                let bundle = load_bundle(&bundle)?;
                print_json(&client.pay_offer(&offer_id, &bundle).await?)
            }
            Command::PaymentInfo { id } => {
                print_json(&client.payment_info(&parse_payment_id(&id)).await?)
            }
            Command::PayLightning {
                invoice,
                amount,
                currency,
                description,
            } => {
                let payment = LightningPayment::new(invoice, amount)
                    .with_currency(currency)
                    .with_description(description);
                print_json(&client.pay_lightning(&payment).await?)
            }
            Command::SetWebhook { url } => print_json(&client.set_webhook(&url).await?),
            Command::Demo { delay_secs } => {
                demo::run(client, Duration::from_secs(delay_secs)).await
            }
        }
    }
}

pub fn print_json<S: Serialize>(value: &S) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value).map_err(CliError::Output)?;
    println!("{rendered}");
    Ok(())
}

/// Numeric ids are looked up as numbers, anything else verbatim.
pub fn parse_payment_id(id: &str) -> PaymentId {
    id.parse::<u64>()
        .map(PaymentId::from)
        .unwrap_or_else(|_| PaymentId::from(id))
}

fn minor_units(price: &MoneyAmount) -> Result<i64, CliError> {
    let minor = price.to_minor_units(DEFAULT_CURRENCY_EXPONENT)?;
    i64::try_from(minor).map_err(|_| CliError::Price(MoneyAmountParseError::OutOfRange))
}

pub fn save_bundle(path: &Path, bundle: &OfferBundle) -> Result<(), CliError> {
    let wire = encode_wire(bundle).map_err(CliError::Output)?;
    let rendered = serde_json::to_vec_pretty(&wire).map_err(CliError::Output)?;
    fs::write(path, rendered).map_err(|e| CliError::BundleWrite(path.to_path_buf(), e))
}

pub fn load_bundle(path: &Path) -> Result<OfferBundle, CliError> {
    let bytes = fs::read(path).map_err(|e| CliError::BundleRead(path.to_path_buf(), e))?;
    decode_wire(&bytes).map_err(|e| CliError::BundleParse(path.to_path_buf(), e))
}
