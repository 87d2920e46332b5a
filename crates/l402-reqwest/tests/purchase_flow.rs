//! End-to-end purchase flows against a mock L402 server.

use l402_reqwest::{L402Client, L402Error};
use l402_types::{ApiKey, ClientConfig, LightningPayment, Offer, PaymentMethod, WireFormat};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(mock_server: &MockServer) -> L402Client {
    let config = ClientConfig::new()
        .with_api_key(ApiKey::new("sk_test").unwrap())
        .with_base_url(mock_server.uri().parse().unwrap());
    L402Client::new(&config).unwrap()
}

fn one_cent_offer() -> Offer {
    Offer::new("o1", 1, "USD", "One Cent Offer", "A simple 1 cent offer")
        .unwrap()
        .with_payment_methods([PaymentMethod::Lightning])
}

async fn mount_offers(mock_server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/v0/l402/offers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "offers": [{
                "offer_id": "o1",
                "amount": 1,
                "currency": "USD",
                "description": "A simple 1 cent offer",
                "title": "One Cent Offer",
                "payment_methods": ["lightning"],
                "type": "one-off",
                "created_by": "vendor-7"
            }],
            "payment_context_token": "edb53dec-28f5-4cbb-924a-20e9003c20e1",
            "payment_request_url": format!("{}/l402/payment-request", mock_server.uri()),
            "version": "0.2.2"
        })))
        .mount(mock_server)
        .await;
}

#[tokio::test]
async fn create_offer_then_status_is_pending() {
    let mock_server = MockServer::start().await;
    mount_offers(&mock_server).await;
    Mock::given(method("GET"))
        .and(path("/v0/l402/payment-status"))
        .and(query_param(
            "payment_context_token",
            "edb53dec-28f5-4cbb-924a-20e9003c20e1",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "pending"})))
        .mount(&mock_server)
        .await;

    let client = client(&mock_server);
    let bundle = client.create_offers(&[one_cent_offer()]).await.unwrap();
    assert_eq!(bundle.offers()[0].offer_id(), "o1");
    assert!(!bundle.payment_context_token().is_empty());

    // Undocumented fields do not survive decoding.
    assert_eq!(bundle.to_wire().offers[0], one_cent_offer().to_wire());

    let status = client
        .get_payment_status(bundle.payment_context_token())
        .await
        .unwrap();
    assert_eq!(status.status().as_str(), "pending");
}

#[tokio::test]
async fn pay_offer_then_lookup_by_id() {
    let mock_server = MockServer::start().await;
    mount_offers(&mock_server).await;
    Mock::given(method("POST"))
        .and(path("/v0/l402/purchases/from-offer"))
        .and(body_partial_json(json!({
            "offer_id": "o1",
            "payment_context_token": "edb53dec-28f5-4cbb-924a-20e9003c20e1"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 4211,
            "status": "pending",
            "payment_method": "lightning",
            "amount": 1,
            "currency": "USD",
            "is_test": true
        })))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v0/l402/outgoing-payments/4211"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 4211,
            "status": "paid",
            "payment_method": "lightning",
            "amount": 1,
            "currency": "USD",
            "is_test": true,
            "preimage": "9f3b"
        })))
        .mount(&mock_server)
        .await;

    let client = client(&mock_server);
    let bundle = client.create_offers(&[one_cent_offer()]).await.unwrap();
    let record = client.pay_offer("o1", &bundle).await.unwrap();
    assert!(!record.id().to_string().is_empty());
    assert!(record.status().is_pending() || record.status().is_paid());

    let info = client.payment_info(record.id()).await.unwrap();
    assert_eq!(info.id(), record.id());
    assert!(info.status().is_terminal());
}

#[tokio::test]
async fn payment_details_then_direct_lightning_payment() {
    let mock_server = MockServer::start().await;
    mount_offers(&mock_server).await;
    Mock::given(method("POST"))
        .and(path("/l402/payment-request"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "expires_at": "2099-01-01T00:00:00Z",
            "offer_id": "o1",
            "payment_request": {"lightning_invoice": "lnbc10n1pexample"},
            "version": "0.2.2"
        })))
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v0/l402/purchases/lightning"))
        .and(body_partial_json(json!({"invoice": "lnbc10n1pexample", "amount": 1})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "lnpay_1",
            "status": "paid",
            "invoice": "lnbc10n1pexample"
        })))
        .mount(&mock_server)
        .await;

    let client = client(&mock_server);
    let bundle = client.create_offers(&[one_cent_offer()]).await.unwrap();
    let details = client
        .get_payment_details_for(&bundle, "o1", PaymentMethod::Lightning)
        .await
        .unwrap();
    assert_eq!(details.is_expired_at(chrono::Utc::now()), Some(false));
    let invoice = details.payment_request().lightning_invoice().unwrap();

    let record = client
        .pay_lightning(&LightningPayment::new(invoice, 1).with_description("One Cent Offer"))
        .await
        .unwrap();
    assert_eq!(record.invoice(), Some(invoice));
}

#[tokio::test]
async fn slow_server_times_out_as_transport_error() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v0/l402/payment-status"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"status": "pending"}))
                .set_delay(Duration::from_millis(400)),
        )
        .mount(&mock_server)
        .await;

    let err = client(&mock_server)
        .with_timeout(Duration::from_millis(40))
        .get_payment_status("ctx")
        .await
        .unwrap_err();
    assert!(matches!(err, L402Error::Transport(_)));
    assert!(err.is_timeout());
}
