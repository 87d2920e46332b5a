//! The HTTP seam of the L402 client.
//!
//! [`L402Client`](crate::L402Client) never talks to the network itself. It
//! describes each call as a [`TransportRequest`] and hands it to a
//! [`Transport`], which returns the raw response body of a successful call.
//! [`ReqwestTransport`] is the default implementation.
//!
//! ## Error Handling
//!
//! Every failure below the protocol layer is a [`TransportError`]:
//! - URL construction
//! - HTTP transport failures
//! - Deadline expiry
//! - Unexpected HTTP status responses

use bytes::Bytes;
use http::header::{AUTHORIZATION, CONTENT_TYPE};
use http::{HeaderValue, Method, StatusCode};
use l402_types::ApiKey;
use reqwest::Client;
use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

#[cfg(feature = "telemetry")]
use tracing::{Span, instrument};

/// Where a request is sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// A path below the configured API base URL, sent with credentials.
    Api {
        /// Unescaped path segments, e.g. `["v0", "l402", "offers"]`.
        segments: Vec<String>,
        query: Vec<(String, String)>,
    },
    /// An absolute URL handed out by the server, e.g. a bundle's payment
    /// request URL. Sent without credentials.
    External(Url),
}

impl Target {
    pub fn api<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Target::Api {
            segments: segments.into_iter().map(Into::into).collect(),
            query: Vec::new(),
        }
    }

    /// Appends a query parameter. No-op for external targets.
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        if let Target::Api { query, .. } = &mut self {
            query.push((key.into(), value.into()));
        }
        self
    }
}

/// One request issued by the client.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method: Method,
    pub target: Target,
    /// JSON body, if any.
    pub body: Option<serde_json::Value>,
    /// Deadline for the whole exchange, body included.
    pub timeout: Duration,
    /// Human-readable label used in errors and traces, e.g. `"POST /v0/l402/offers"`.
    pub context: &'static str,
}

impl TransportRequest {
    pub fn get(target: Target, context: &'static str, timeout: Duration) -> Self {
        Self {
            method: Method::GET,
            target,
            body: None,
            timeout,
            context,
        }
    }

    pub fn post(
        target: Target,
        context: &'static str,
        timeout: Duration,
        body: serde_json::Value,
    ) -> Self {
        Self {
            method: Method::POST,
            target,
            body: Some(body),
            timeout,
            context,
        }
    }
}

/// Errors that can occur while moving a request over the network.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("URL parse error: {context}: {source}")]
    UrlParse {
        context: &'static str,
        #[source]
        source: url::ParseError,
    },
    #[error("URL cannot carry path segments: {context}: {url}")]
    UrlBuild { context: &'static str, url: Url },
    #[error("HTTP error: {context}: {source}")]
    Http {
        context: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("Request timed out after {timeout:?}: {context}")]
    Timeout {
        context: &'static str,
        timeout: Duration,
    },
    #[error("Unexpected HTTP status {status}: {context}: {body}")]
    HttpStatus {
        context: &'static str,
        status: StatusCode,
        body: String,
    },
    #[error("Failed to read response body: {context}: {source}")]
    ResponseBodyRead {
        context: &'static str,
        #[source]
        source: reqwest::Error,
    },
}

impl TransportError {
    pub fn context(&self) -> &'static str {
        match self {
            TransportError::UrlParse { context, .. }
            | TransportError::UrlBuild { context, .. }
            | TransportError::Http { context, .. }
            | TransportError::Timeout { context, .. }
            | TransportError::HttpStatus { context, .. }
            | TransportError::ResponseBodyRead { context, .. } => context,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, TransportError::Timeout { .. })
    }
}

/// Performs the network exchange for [`L402Client`](crate::L402Client).
///
/// Implementations return the body of a 2xx response and fail with a
/// [`TransportError`] on network failure, non-2xx status, or deadline expiry.
/// They must not retry.
pub trait Transport {
    fn send(
        &self,
        request: TransportRequest,
    ) -> impl Future<Output = Result<Bytes, TransportError>> + Send;
}

impl<T: Transport> Transport for Arc<T> {
    fn send(
        &self,
        request: TransportRequest,
    ) -> impl Future<Output = Result<Bytes, TransportError>> + Send {
        self.as_ref().send(request)
    }
}

/// [`Transport`] backed by a shared [`reqwest::Client`].
///
/// API targets are resolved against the base URL and carry
/// `Authorization: Token <key>`; external targets carry no credentials.
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    /// Base URL of the L402 API (e.g. `https://api.fewsats.com/`)
    base_url: Url,
    /// Shared Reqwest HTTP client
    client: Client,
    /// Precomputed `Authorization` header value
    authorization: HeaderValue,
}

impl ReqwestTransport {
    pub fn new(base_url: Url, api_key: &ApiKey) -> Self {
        let mut authorization = HeaderValue::from_str(&format!("Token {}", api_key.expose()))
            .expect("ApiKey only holds visible ASCII");
        authorization.set_sensitive(true);
        Self {
            base_url,
            client: Client::new(),
            authorization,
        }
    }

    /// Replaces the underlying reqwest client, e.g. to tune connection pooling.
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolves `segments` and `query` below the base URL.
    pub fn api_url(
        &self,
        segments: &[String],
        query: &[(String, String)],
        context: &'static str,
    ) -> Result<Url, TransportError> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| TransportError::UrlBuild {
                    context,
                    url: self.base_url.clone(),
                })?;
            path.pop_if_empty().extend(segments);
        }
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    async fn send_inner(&self, request: TransportRequest) -> Result<Bytes, TransportError> {
        let TransportRequest {
            method,
            target,
            body,
            timeout,
            context,
        } = request;
        let (url, authenticated) = match target {
            Target::Api { segments, query } => (self.api_url(&segments, &query, context)?, true),
            Target::External(url) => (url, false),
        };

        let mut req = self
            .client
            .request(method, url)
            .timeout(timeout)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if authenticated {
            req = req.header(AUTHORIZATION, self.authorization.clone());
        }
        if let Some(body) = &body {
            req = req.json(body);
        }

        let http_response = req
            .send()
            .await
            .map_err(|e| classify(context, timeout, e, |source| TransportError::Http { context, source }))?;

        let status = http_response.status();
        if status.is_success() {
            http_response.bytes().await.map_err(|e| {
                classify(context, timeout, e, |source| TransportError::ResponseBodyRead {
                    context,
                    source,
                })
            })
        } else {
            let body = http_response.text().await.map_err(|e| {
                classify(context, timeout, e, |source| TransportError::ResponseBodyRead {
                    context,
                    source,
                })
            })?;
            Err(TransportError::HttpStatus {
                context,
                status,
                body,
            })
        }
    }
}

impl Transport for ReqwestTransport {
    #[cfg_attr(
        feature = "telemetry",
        instrument(
            name = "l402.transport.send",
            skip_all,
            fields(
                context = request.context,
                method = %request.method,
                otel.status_code = tracing::field::Empty,
                error.message = tracing::field::Empty,
            )
        )
    )]
    async fn send(&self, request: TransportRequest) -> Result<Bytes, TransportError> {
        let result = self.send_inner(request).await;
        record_result_on_span(&result);
        result
    }
}

fn classify(
    context: &'static str,
    timeout: Duration,
    error: reqwest::Error,
    otherwise: impl FnOnce(reqwest::Error) -> TransportError,
) -> TransportError {
    if error.is_timeout() {
        TransportError::Timeout { context, timeout }
    } else {
        otherwise(error)
    }
}

/// Records the outcome of a request on a tracing span, including status and errors.
#[cfg(feature = "telemetry")]
fn record_result_on_span<R, E: Display>(result: &Result<R, E>) {
    let span = Span::current();
    match result {
        Ok(_) => {
            span.record("otel.status_code", "OK");
        }
        Err(err) => {
            span.record("otel.status_code", "ERROR");
            span.record("error.message", tracing::field::display(err));
            tracing::event!(tracing::Level::ERROR, error = %err, "Request to L402 API failed");
        }
    }
}

/// Noop if telemetry feature is off.
#[cfg(not(feature = "telemetry"))]
fn record_result_on_span<R, E: Display>(_result: &Result<R, E>) {}
