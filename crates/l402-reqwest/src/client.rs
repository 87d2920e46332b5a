//! The L402 protocol client.
//!
//! [`L402Client`] drives the purchase lifecycle against the L402 API: publish
//! offers, fetch payment instructions, pay, look up records, and poll status.
//! Each operation is one HTTP call. Requests are built from the wire records
//! of [`l402_types::proto`] and responses are translated back into domain
//! values; the client keeps no state between calls.
//!
//! ## Example
//!
//! ```rust,no_run
//! use l402_reqwest::L402Client;
//! use l402_types::{ClientConfig, Offer, PaymentMethod};
//!
//! # async fn run() -> Result<(), l402_reqwest::L402Error> {
//! let client = L402Client::new(&ClientConfig::new())?;
//! let offer = Offer::new("o1", 1, "USD", "One Cent Offer", "A simple 1 cent offer")?
//!     .with_payment_methods([PaymentMethod::Lightning]);
//! let bundle = client.create_offers(&[offer]).await?;
//! let status = client.get_payment_status(bundle.payment_context_token()).await?;
//! assert!(status.status().is_pending());
//! # Ok(())
//! # }
//! ```
//!
//! ## Timeouts
//!
//! Reads and metadata calls are bounded by [`DEFAULT_TIMEOUT`]. Payment
//! execution may wait on external settlement rails and is bounded by
//! [`PAYMENT_TIMEOUT`]. Both can be overridden.

use bytes::Bytes;
use http::StatusCode;
use l402_types::proto::{
    Acknowledgement, Balance, CreateOffersRequest, PayOfferRequest, PaymentDetailsRequest,
    SetWebhookRequest, StoredPaymentMethod, UserInfo,
};
use l402_types::{
    ClientConfig, ContextToken, LightningPayment, Offer, OfferBundle, PaymentDetails, PaymentId,
    PaymentMethod, PaymentRecord, PaymentStatus, WireFormat, decode_wire, validate_offer_set,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use url::Url;

use crate::error::{L402Error, ProtocolError};
use crate::transport::{ReqwestTransport, Target, Transport, TransportError, TransportRequest};

#[cfg(feature = "telemetry")]
use tracing::instrument;

/// Deadline of read and metadata calls.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Deadline of payment execution calls.
pub const PAYMENT_TIMEOUT: Duration = Duration::from_secs(30);

const USERS_ME: [&str; 3] = ["v0", "users", "me"];
const WALLETS: [&str; 2] = ["v0", "wallets"];
const STRIPE_PAYMENT_METHODS: [&str; 3] = ["v0", "stripe", "payment-methods"];
const OFFERS: [&str; 3] = ["v0", "l402", "offers"];
const PAYMENT_STATUS: [&str; 3] = ["v0", "l402", "payment-status"];
const WEBHOOK_SET: [&str; 4] = ["v0", "users", "webhook", "set"];
const PURCHASE_LIGHTNING: [&str; 4] = ["v0", "l402", "purchases", "lightning"];
const PURCHASE_FROM_OFFER: [&str; 4] = ["v0", "l402", "purchases", "from-offer"];

/// A client for the L402 API.
///
/// Generic over its [`Transport`]; the default sends requests with reqwest.
/// Cloning is cheap when the transport is.
#[derive(Clone, Debug)]
pub struct L402Client<T = ReqwestTransport> {
    transport: T,
    timeout: Duration,
    payment_timeout: Duration,
}

impl L402Client<ReqwestTransport> {
    /// Builds a reqwest-backed client from `config`.
    ///
    /// # Errors
    ///
    /// [`L402Error::Config`] if no API key is configured or present in the
    /// environment, or if the base URL cannot carry API paths.
    pub fn new(config: &ClientConfig) -> Result<Self, L402Error> {
        let api_key = config.resolve_api_key()?;
        let base_url = config.validated_base_url()?.clone();
        let mut client = Self::with_transport(ReqwestTransport::new(base_url, &api_key));
        if let Some(timeout) = config.timeout() {
            client.timeout = timeout;
        }
        if let Some(timeout) = config.payment_timeout() {
            client.payment_timeout = timeout;
        }
        Ok(client)
    }
}

impl<T: Transport> L402Client<T> {
    /// Wraps a transport, using the default timeouts.
    pub fn with_transport(transport: T) -> Self {
        Self {
            transport,
            timeout: DEFAULT_TIMEOUT,
            payment_timeout: PAYMENT_TIMEOUT,
        }
    }

    /// Sets the deadline of read and metadata calls.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the deadline of [`L402Client::pay_offer`] and [`L402Client::pay_lightning`].
    pub fn with_payment_timeout(mut self, timeout: Duration) -> Self {
        self.payment_timeout = timeout;
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn payment_timeout(&self) -> Duration {
        self.payment_timeout
    }

    /// `GET /v0/users/me`: the account the API key belongs to.
    #[cfg_attr(feature = "telemetry", instrument(name = "l402.client.me", skip_all, err))]
    pub async fn me(&self) -> Result<UserInfo, L402Error> {
        let context = "GET /v0/users/me";
        let body = self
            .call(TransportRequest::get(Target::api(USERS_ME), context, self.timeout))
            .await?;
        decode_json(context, &body)
    }

    /// `GET /v0/wallets`: balances per currency.
    #[cfg_attr(feature = "telemetry", instrument(name = "l402.client.balance", skip_all, err))]
    pub async fn balance(&self) -> Result<Vec<Balance>, L402Error> {
        let context = "GET /v0/wallets";
        let body = self
            .call(TransportRequest::get(Target::api(WALLETS), context, self.timeout))
            .await?;
        decode_json(context, &body)
    }

    /// `GET /v0/stripe/payment-methods`: cards stored on the account.
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "l402.client.payment_methods", skip_all, err)
    )]
    pub async fn payment_methods(&self) -> Result<Vec<StoredPaymentMethod>, L402Error> {
        let context = "GET /v0/stripe/payment-methods";
        let body = self
            .call(TransportRequest::get(
                Target::api(STRIPE_PAYMENT_METHODS),
                context,
                self.timeout,
            ))
            .await?;
        decode_json(context, &body)
    }

    /// Publishes `offers` and returns the bundle the server issued for them.
    ///
    /// The offers are checked locally first: an empty slice or a repeated id
    /// fails with [`L402Error::Validation`] without contacting the server.
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "l402.client.create_offers", skip_all, err, fields(offers = offers.len()))
    )]
    pub async fn create_offers(&self, offers: &[Offer]) -> Result<OfferBundle, L402Error> {
        validate_offer_set(offers)?;
        let context = "POST /v0/l402/offers";
        let request = CreateOffersRequest {
            offers: offers.iter().map(Offer::to_wire).collect(),
        };
        let body = self
            .call(TransportRequest::post(
                Target::api(OFFERS),
                context,
                self.timeout,
                encode(context, &request)?,
            ))
            .await?;
        decode(context, &body)
    }

    /// Current settlement state of the bundle identified by `payment_context_token`.
    ///
    /// Read-only and safe to poll. The token is sent as given.
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "l402.client.get_payment_status", skip_all, err)
    )]
    pub async fn get_payment_status(
        &self,
        payment_context_token: impl AsRef<str>,
    ) -> Result<PaymentStatus, L402Error> {
        let context = "GET /v0/l402/payment-status";
        let target = Target::api(PAYMENT_STATUS)
            .with_query("payment_context_token", payment_context_token.as_ref());
        let body = self
            .call(TransportRequest::get(target, context, self.timeout))
            .await?;
        decode(context, &body)
    }

    /// Asks a bundle's payment request URL for instructions to pay `offer_id`
    /// with `payment_method`.
    ///
    /// The URL may live on another host and receives no credentials. Whether
    /// the offer accepts the method is left to the server.
    #[cfg_attr(
        feature = "telemetry",
        instrument(
            name = "l402.client.get_payment_details",
            skip_all,
            err,
            fields(offer_id = %offer_id)
        )
    )]
    pub async fn get_payment_details(
        &self,
        payment_request_url: &str,
        offer_id: &str,
        payment_method: impl Into<PaymentMethod>,
        payment_context_token: impl AsRef<str>,
    ) -> Result<PaymentDetails, L402Error> {
        let context = "POST payment request URL";
        let url = Url::parse(payment_request_url)
            .map_err(|source| TransportError::UrlParse { context, source })?;
        let request = PaymentDetailsRequest {
            offer_id: offer_id.to_string(),
            payment_method: payment_method.into(),
            payment_context_token: ContextToken::new(payment_context_token.as_ref()),
        };
        let body = self
            .call(TransportRequest::post(
                Target::External(url),
                context,
                self.timeout,
                encode(context, &request)?,
            ))
            .await?;
        decode(context, &body)
    }

    /// [`L402Client::get_payment_details`] using the URL and token of `bundle`.
    pub async fn get_payment_details_for(
        &self,
        bundle: &OfferBundle,
        offer_id: &str,
        payment_method: impl Into<PaymentMethod>,
    ) -> Result<PaymentDetails, L402Error> {
        self.get_payment_details(
            bundle.payment_request_url(),
            offer_id,
            payment_method,
            bundle.payment_context_token(),
        )
        .await
    }

    /// Pays `offer_id` out of `bundle`.
    ///
    /// The whole bundle is sent as payment context. Not idempotent: after a
    /// timeout, check the bundle's status before trying again.
    #[cfg_attr(
        feature = "telemetry",
        instrument(
            name = "l402.client.pay_offer",
            skip_all,
            err,
            fields(offer_id = %offer_id, timeout = ?self.payment_timeout)
        )
    )]
    pub async fn pay_offer(
        &self,
        offer_id: &str,
        bundle: &OfferBundle,
    ) -> Result<PaymentRecord, L402Error> {
        let context = "POST /v0/l402/purchases/from-offer";
        let request = PayOfferRequest {
            offer_id: offer_id.to_string(),
            bundle: bundle.to_wire(),
        };
        let body = self
            .call(TransportRequest::post(
                Target::api(PURCHASE_FROM_OFFER),
                context,
                self.payment_timeout,
                encode(context, &request)?,
            ))
            .await?;
        decode(context, &body)
    }

    /// Looks up a payment record by the id the server assigned to it.
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "l402.client.payment_info", skip_all, err, fields(payment_id = %payment_id))
    )]
    pub async fn payment_info(&self, payment_id: &PaymentId) -> Result<PaymentRecord, L402Error> {
        let context = "GET /v0/l402/outgoing-payments/{id}";
        let id = payment_id.to_string();
        let target = Target::api(["v0", "l402", "outgoing-payments", id.as_str()]);
        let body = self
            .call(TransportRequest::get(target, context, self.timeout))
            .await?;
        decode(context, &body)
    }

    /// Pays a Lightning invoice directly, outside any offer bundle.
    ///
    /// Not idempotent, like [`L402Client::pay_offer`].
    #[cfg_attr(
        feature = "telemetry",
        instrument(
            name = "l402.client.pay_lightning",
            skip_all,
            err,
            fields(amount = payment.amount(), currency = %payment.currency())
        )
    )]
    pub async fn pay_lightning(
        &self,
        payment: &LightningPayment,
    ) -> Result<PaymentRecord, L402Error> {
        let context = "POST /v0/l402/purchases/lightning";
        let body = self
            .call(TransportRequest::post(
                Target::api(PURCHASE_LIGHTNING),
                context,
                self.payment_timeout,
                encode(context, &payment.to_wire())?,
            ))
            .await?;
        decode(context, &body)
    }

    /// Registers the URL the server notifies about account events.
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "l402.client.set_webhook", skip_all, err)
    )]
    pub async fn set_webhook(&self, webhook_url: &str) -> Result<Acknowledgement, L402Error> {
        let context = "POST /v0/users/webhook/set";
        let request = SetWebhookRequest {
            webhook_url: webhook_url.to_string(),
        };
        let body = self
            .call(TransportRequest::post(
                Target::api(WEBHOOK_SET),
                context,
                self.timeout,
                encode(context, &request)?,
            ))
            .await?;
        decode_json(context, &body)
    }

    async fn call(&self, request: TransportRequest) -> Result<Bytes, L402Error> {
        self.transport.send(request).await.map_err(classify)
    }
}

/// Splits explained refusals off from other transport failures.
fn classify(error: TransportError) -> L402Error {
    match error {
        TransportError::HttpStatus {
            context,
            status,
            body,
        } if status == StatusCode::BAD_REQUEST || status == StatusCode::UNPROCESSABLE_ENTITY => {
            match server_message(&body) {
                Some(message) => ProtocolError::Rejected {
                    context,
                    status,
                    message,
                }
                .into(),
                None => TransportError::HttpStatus {
                    context,
                    status,
                    body,
                }
                .into(),
            }
        }
        other => other.into(),
    }
}

/// Extracts the reason from `{"detail": ...}`, `{"message": ...}` or `{"error": ...}`.
///
/// A `detail` list of validation errors is joined by their `msg` fields.
fn server_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["detail", "message", "error"]
        .iter()
        .find_map(|key| match value.get(key)? {
            Value::String(message) => Some(message.clone()),
            Value::Array(items) => {
                let messages: Vec<&str> = items
                    .iter()
                    .filter_map(|item| item.get("msg").and_then(Value::as_str))
                    .collect();
                (!messages.is_empty()).then(|| messages.join("; "))
            }
            _ => None,
        })
}

fn encode<S: Serialize>(context: &'static str, request: &S) -> Result<Value, L402Error> {
    serde_json::to_value(request).map_err(|source| ProtocolError::Encode { context, source }.into())
}

fn decode<E: WireFormat>(context: &'static str, body: &[u8]) -> Result<E, L402Error> {
    decode_wire(body).map_err(|source| ProtocolError::Decode { context, source }.into())
}

fn decode_json<R: DeserializeOwned>(context: &'static str, body: &[u8]) -> Result<R, L402Error> {
    serde_json::from_slice(body).map_err(|source| ProtocolError::Decode { context, source }.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use l402_types::{ApiKey, ServerId};
    use serde_json::json;
    use std::sync::{Arc, Mutex};
    use wiremock::matchers::{any, body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(mock_server: &MockServer) -> L402Client {
        let config = ClientConfig::new()
            .with_api_key(ApiKey::new("sk_test").unwrap())
            .with_base_url(mock_server.uri().parse().unwrap());
        L402Client::new(&config).unwrap()
    }

    fn offer(id: &str) -> Offer {
        Offer::new(id, 1, "USD", "One Cent Offer", "A simple 1 cent offer")
            .unwrap()
            .with_payment_methods(["lightning"])
    }

    fn bundle_json(payment_request_url: &str) -> Value {
        json!({
            "offers": [{
                "offer_id": "o1",
                "amount": 1,
                "currency": "USD",
                "description": "A simple 1 cent offer",
                "title": "One Cent Offer",
                "payment_methods": ["lightning"],
                "type": "one-off"
            }],
            "payment_context_token": "ctx-123",
            "payment_request_url": payment_request_url,
            "version": "0.2.2"
        })
    }

    fn record_json(id: u64, status: &str) -> Value {
        json!({
            "id": id,
            "status": status,
            "created_at": "2024-03-01T12:00:00Z",
            "payment_method": "lightning",
            "amount": 1,
            "currency": "USD",
            "payment_context_token": "ctx-123",
            "title": "One Cent Offer",
            "type": "one-off"
        })
    }

    fn bundle() -> OfferBundle {
        decode_wire(
            serde_json::to_vec(&bundle_json("https://pay.example/l402/payment-request"))
                .unwrap()
                .as_slice(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_create_offers_sends_wire_offers() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v0/l402/offers"))
            .and(header("authorization", "Token sk_test"))
            .and(body_json(json!({
                "offers": [{
                    "offer_id": "o1",
                    "amount": 1,
                    "currency": "USD",
                    "description": "A simple 1 cent offer",
                    "title": "One Cent Offer",
                    "payment_methods": ["lightning"],
                    "type": "one-off"
                }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(bundle_json("https://pay.example/r")))
            .expect(1)
            .mount(&mock_server)
            .await;

        let bundle = client(&mock_server).create_offers(&[offer("o1")]).await.unwrap();
        assert_eq!(bundle.offers()[0].offer_id(), "o1");
        assert_eq!(bundle.payment_context_token().as_str(), "ctx-123");
        assert_eq!(bundle.payment_request_url(), "https://pay.example/r");
        assert_eq!(bundle.version(), "0.2.2");
    }

    #[tokio::test]
    async fn test_create_offers_validates_before_sending() {
        let mock_server = MockServer::start().await;
        Mock::given(any())
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&mock_server)
            .await;
        let client = client(&mock_server);

        let err = client.create_offers(&[]).await.unwrap_err();
        assert!(err.is_malformed_input());
        let err = client
            .create_offers(&[offer("o1"), offer("o1")])
            .await
            .unwrap_err();
        assert!(err.is_malformed_input());
    }

    #[tokio::test]
    async fn test_get_payment_status_is_idempotent() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v0/l402/payment-status"))
            .and(query_param("payment_context_token", "ctx-123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "pending",
                "offer_id": null,
                "amount": null
            })))
            .expect(2)
            .mount(&mock_server)
            .await;

        let client = client(&mock_server);
        let first = client.get_payment_status("ctx-123").await.unwrap();
        let second = client
            .get_payment_status(ContextToken::new("ctx-123"))
            .await
            .unwrap();
        assert_eq!(first, second);
        assert!(first.status().is_pending());
        assert_eq!(first.offer_id(), None);
    }

    #[tokio::test]
    async fn test_get_payment_details_calls_bundle_url_without_credentials() {
        let api = MockServer::start().await;
        let payments = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/l402/payment-request"))
            .and(body_json(json!({
                "offer_id": "o1",
                "payment_method": "lightning",
                "payment_context_token": "ctx-123"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "expires_at": "2030-01-01T00:00:00Z",
                "offer_id": "o1",
                "payment_request": {"lightning_invoice": "lnbc10n1pexample"},
                "version": "0.2.2"
            })))
            .expect(1)
            .mount(&payments)
            .await;

        let url = format!("{}/l402/payment-request", payments.uri());
        let details = client(&api)
            .get_payment_details(&url, "o1", PaymentMethod::Lightning, "ctx-123")
            .await
            .unwrap();
        assert_eq!(details.offer_id(), "o1");
        assert_eq!(
            details.payment_request().lightning_invoice(),
            Some("lnbc10n1pexample")
        );

        let requests = payments.received_requests().await.unwrap();
        assert!(requests[0].headers.get("authorization").is_none());
        assert!(api.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_payment_details_bad_url_is_transport_error() {
        let mock_server = MockServer::start().await;
        let err = client(&mock_server)
            .get_payment_details("not a url", "o1", "lightning", "ctx")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            L402Error::Transport(TransportError::UrlParse { .. })
        ));
    }

    #[tokio::test]
    async fn test_get_payment_details_opaque_payload() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/pay"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "expires_at": "2030-01-01T00:00:00Z",
                "offer_id": "o1",
                "payment_request": {"checkout_url": "https://cards.example/s/1"},
                "version": "0.2.2"
            })))
            .mount(&mock_server)
            .await;

        let bundle = OfferBundle::new(
            vec![offer("o1")],
            "ctx-123",
            format!("{}/pay", mock_server.uri()),
            "0.2.2",
        )
        .unwrap();
        let details = client(&mock_server)
            .get_payment_details_for(&bundle, "o1", PaymentMethod::CreditCard)
            .await
            .unwrap();
        assert!(!details.payment_request().is_lightning());
    }

    #[tokio::test]
    async fn test_pay_offer_sends_whole_bundle() {
        let mock_server = MockServer::start().await;
        let mut expected = bundle_json("https://pay.example/l402/payment-request");
        expected["offer_id"] = json!("o1");
        Mock::given(method("POST"))
            .and(path("/v0/l402/purchases/from-offer"))
            .and(header("authorization", "Token sk_test"))
            .and(body_json(expected))
            .respond_with(ResponseTemplate::new(200).set_body_json(record_json(991, "pending")))
            .expect(1)
            .mount(&mock_server)
            .await;

        let record = client(&mock_server).pay_offer("o1", &bundle()).await.unwrap();
        assert_eq!(record.id(), &ServerId::Number(991));
        assert!(record.status().is_pending());
    }

    #[tokio::test]
    async fn test_payment_info_uses_id_in_path() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v0/l402/outgoing-payments/991"))
            .respond_with(ResponseTemplate::new(200).set_body_json(record_json(991, "paid")))
            .expect(1)
            .mount(&mock_server)
            .await;

        let record = client(&mock_server)
            .payment_info(&ServerId::Number(991))
            .await
            .unwrap();
        assert_eq!(record.id().to_string(), "991");
        assert!(record.status().is_paid());
    }

    #[tokio::test]
    async fn test_pay_lightning_defaults() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v0/l402/purchases/lightning"))
            .and(body_json(json!({
                "invoice": "lnbc10n1pexample",
                "amount": 1,
                "currency": "USD",
                "description": ""
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "pay_1",
                "status": "success",
                "invoice": "lnbc10n1pexample",
                "preimage": "00ff"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let record = client(&mock_server)
            .pay_lightning(&LightningPayment::new("lnbc10n1pexample", 1))
            .await
            .unwrap();
        assert_eq!(record.id(), &ServerId::Text("pay_1".to_string()));
        assert_eq!(record.preimage(), Some("00ff"));
        assert_eq!(record.created_at(), None);
    }

    #[tokio::test]
    async fn test_account_endpoints() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v0/users/me"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 12,
                "email": "vendor@example.com",
                "created_at": "2024-01-01T00:00:00",
                "plan": "free"
            })))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v0/wallets"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([{"currency": "USD", "balance": 1250}])),
            )
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v0/stripe/payment-methods"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": 3, "last4": "4242", "brand": "visa", "is_default": true}
            ])))
            .mount(&mock_server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v0/users/webhook/set"))
            .and(body_json(json!({"webhook_url": "https://vendor.example/hook"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .mount(&mock_server)
            .await;

        let client = client(&mock_server);
        assert_eq!(client.me().await.unwrap().email, "vendor@example.com");
        assert_eq!(client.balance().await.unwrap()[0].currency, "USD");
        assert_eq!(
            client.payment_methods().await.unwrap()[0].last4.as_deref(),
            Some("4242")
        );
        let ack = client
            .set_webhook("https://vendor.example/hook")
            .await
            .unwrap();
        assert_eq!(ack.0, json!({"ok": true}));
    }

    #[tokio::test]
    async fn test_rejection_with_detail_is_protocol_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v0/l402/offers"))
            .respond_with(
                ResponseTemplate::new(422).set_body_json(json!({"detail": "currency not supported"})),
            )
            .mount(&mock_server)
            .await;

        let err = client(&mock_server)
            .create_offers(&[offer("o1")])
            .await
            .unwrap_err();
        match err {
            L402Error::Protocol(ProtocolError::Rejected {
                status, message, ..
            }) => {
                assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
                assert_eq!(message, "currency not supported");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_rejection_with_validation_list() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(422).set_body_json(json!({
                "detail": [
                    {"loc": ["body", "offers", 0, "amount"], "msg": "value is not a valid integer"},
                    {"loc": ["body", "offers", 0, "currency"], "msg": "field required"}
                ]
            })))
            .mount(&mock_server)
            .await;

        let err = client(&mock_server)
            .create_offers(&[offer("o1")])
            .await
            .unwrap_err();
        assert!(err.is_protocol());
        assert!(err.to_string().contains("value is not a valid integer; field required"));
    }

    #[tokio::test]
    async fn test_bad_request_without_message_stays_transport_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(400).set_body_string("<html>bad</html>"))
            .mount(&mock_server)
            .await;

        let err = client(&mock_server).me().await.unwrap_err();
        assert!(err.is_transport());
    }

    #[tokio::test]
    async fn test_server_error_is_transport_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({"detail": "boom"})))
            .mount(&mock_server)
            .await;

        let err = client(&mock_server)
            .get_payment_status("ctx")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            L402Error::Transport(TransportError::HttpStatus { status, .. })
                if status == StatusCode::INTERNAL_SERVER_ERROR
        ));
    }

    #[tokio::test]
    async fn test_malformed_body_is_protocol_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v0/l402/payment-status"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"paid_at": null})))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v0/l402/outgoing-payments/1"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&mock_server)
            .await;

        let client = client(&mock_server);
        let err = client.get_payment_status("ctx").await.unwrap_err();
        assert!(matches!(err, L402Error::Protocol(ProtocolError::Decode { .. })));
        let err = client.payment_info(&ServerId::Number(1)).await.unwrap_err();
        assert!(err.is_protocol());
        assert!(!err.is_transport());
    }

    #[tokio::test]
    async fn test_deadline_expiry_is_transport_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"status": "pending"}))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&mock_server)
            .await;

        let err = client(&mock_server)
            .with_timeout(Duration::from_millis(50))
            .get_payment_status("ctx")
            .await
            .unwrap_err();
        assert!(err.is_timeout());
        assert!(err.is_transport());
        assert!(!err.is_protocol() && !err.is_malformed_input());
    }

    #[tokio::test]
    async fn test_payment_uses_longer_deadline() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v0/l402/purchases/from-offer"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(record_json(7, "paid"))
                    .set_delay(Duration::from_millis(200)),
            )
            .mount(&mock_server)
            .await;

        let record = client(&mock_server)
            .with_timeout(Duration::from_millis(50))
            .pay_offer("o1", &bundle())
            .await
            .unwrap();
        assert_eq!(record.id(), &ServerId::Number(7));
    }

    /// Records requests and answers each with the same body.
    struct RecordingTransport {
        requests: Mutex<Vec<TransportRequest>>,
        response: &'static str,
    }

    impl Transport for RecordingTransport {
        async fn send(&self, request: TransportRequest) -> Result<Bytes, TransportError> {
            self.requests.lock().unwrap().push(request);
            Ok(Bytes::from_static(self.response.as_bytes()))
        }
    }

    #[tokio::test]
    async fn test_custom_transport_sees_deadlines() {
        let transport = Arc::new(RecordingTransport {
            requests: Mutex::new(Vec::new()),
            response: r#"{"id": 1, "status": "pending"}"#,
        });
        let client = L402Client::with_transport(transport.clone())
            .with_payment_timeout(Duration::from_secs(45));

        client.pay_offer("o1", &bundle()).await.unwrap();
        client.payment_info(&ServerId::Number(1)).await.unwrap();

        let requests = transport.requests.lock().unwrap();
        assert_eq!(requests[0].timeout, Duration::from_secs(45));
        assert_eq!(requests[0].context, "POST /v0/l402/purchases/from-offer");
        assert_eq!(requests[1].timeout, DEFAULT_TIMEOUT);
        assert_eq!(
            requests[1].target,
            Target::api(["v0", "l402", "outgoing-payments", "1"])
        );
    }
}
