//! Full vendor and buyer walk-through.
//!
//! Publishes a one-cent offer, checks that its bundle is pending, pays it,
//! looks the payment up by id, waits, and checks the bundle status again.
//! The wait ends early on Ctrl-C.

use l402_reqwest::{L402Client, Transport};
use l402_types::{Offer, PaymentMethod};
use std::time::Duration;

use crate::cli::{CliError, print_json};

pub const DEMO_OFFER_ID: &str = "o1";

pub fn demo_offer() -> Result<Offer, CliError> {
    let offer = Offer::new(
        DEMO_OFFER_ID,
        1,
        "USD",
        "One Cent Offer",
        "A simple 1 cent offer",
    )
    .map_err(l402_reqwest::L402Error::from)?
    .with_payment_methods([PaymentMethod::Lightning]);
    Ok(offer)
}

pub async fn run<T: Transport>(client: &L402Client<T>, delay: Duration) -> Result<(), CliError> {
    let bundle = client.create_offers(&[demo_offer()?]).await?;
    tracing::info!("Created offer bundle\n{bundle}");
    print_json(&bundle)?;

    let status = client
        .get_payment_status(bundle.payment_context_token())
        .await?;
    tracing::info!(status = %status.status(), "Payment status before paying");
    print_json(&status)?;

    let record = client.pay_offer(DEMO_OFFER_ID, &bundle).await?;
    tracing::info!(payment_id = %record.id(), status = %record.status(), "Paid offer");
    print_json(&record)?;

    let info = client.payment_info(record.id()).await?;
    print_json(&info)?;

    if !delay.is_zero() {
        tracing::info!("Waiting {delay:?} for settlement");
        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = tokio::signal::ctrl_c() => {
                tracing::warn!("Interrupted, checking status now");
            }
        }
    }

    let status = client
        .get_payment_status(bundle.payment_context_token())
        .await?;
    tracing::info!(status = %status.status(), "Payment status after paying");
    print_json(&status)?;
    Ok(())
}
