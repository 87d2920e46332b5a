//! Offers and offer bundles.
//!
//! An [`Offer`] is one purchasable item at a stated price. Publishing one or
//! more offers yields an [`OfferBundle`]: the offers echoed back by the server
//! together with the context token and payment request URL shared by all of
//! them.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashSet;
use std::fmt;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use crate::error::ValidationError;
use crate::ids::ContextToken;
use crate::util::money_amount::{DEFAULT_CURRENCY_EXPONENT, minor_to_major};

/// Identifier of a payment rail accepted for an offer.
///
/// Serialized as its identifier string. Identifiers without a dedicated
/// variant are kept verbatim in [`PaymentMethod::Other`]; it can only be
/// obtained by conversion from a string, so it never holds `"lightning"` or
/// `"credit_card"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PaymentMethod {
    /// Lightning network invoice.
    Lightning,
    /// Card payment processed by the vendor's card processor.
    CreditCard,
    Other(CustomMethod),
}

/// Vendor-specific payment method identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CustomMethod(String);

impl CustomMethod {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl PaymentMethod {
    pub const LIGHTNING: &'static str = "lightning";
    pub const CREDIT_CARD: &'static str = "credit_card";

    pub fn as_str(&self) -> &str {
        match self {
            PaymentMethod::Lightning => Self::LIGHTNING,
            PaymentMethod::CreditCard => Self::CREDIT_CARD,
            PaymentMethod::Other(other) => other.as_str(),
        }
    }
}

impl From<&str> for PaymentMethod {
    fn from(value: &str) -> Self {
        match value {
            Self::LIGHTNING => PaymentMethod::Lightning,
            Self::CREDIT_CARD => PaymentMethod::CreditCard,
            other => PaymentMethod::Other(CustomMethod(other.to_string())),
        }
    }
}

impl From<String> for PaymentMethod {
    fn from(value: String) -> Self {
        PaymentMethod::from(value.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(PaymentMethod::from(s))
    }
}

impl Display for PaymentMethod {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for PaymentMethod {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for PaymentMethod {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(PaymentMethod::from(s))
    }
}

/// Purchase model of an offer, e.g. `"one-off"`.
///
/// Vendor-defined and passed through verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OfferKind(String);

impl OfferKind {
    pub const ONE_OFF: &'static str = "one-off";

    pub fn new(kind: impl Into<String>) -> Self {
        Self(kind.into())
    }

    pub fn one_off() -> Self {
        Self(Self::ONE_OFF.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for OfferKind {
    fn default() -> Self {
        Self::one_off()
    }
}

impl From<&str> for OfferKind {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for OfferKind {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl Display for OfferKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One purchasable item at a stated price.
///
/// The amount is expressed in integer minor units of `currency` (cents for
/// USD). Construct with [`Offer::new`], which rejects negative amounts and
/// empty identifying fields.
///
/// ```
/// use l402_types::{Offer, PaymentMethod};
///
/// let offer = Offer::new("o1", 1, "USD", "One Cent Offer", "A simple 1 cent offer")
///     .unwrap()
///     .with_payment_methods([PaymentMethod::Lightning]);
/// assert_eq!(offer.amount(), 1);
/// assert_eq!(offer.kind().as_str(), "one-off");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Offer {
    pub(crate) offer_id: String,
    pub(crate) amount: u64,
    pub(crate) currency: String,
    pub(crate) description: String,
    pub(crate) title: String,
    pub(crate) payment_methods: Vec<PaymentMethod>,
    #[serde(rename = "type")]
    pub(crate) kind: OfferKind,
}

impl Offer {
    /// Creates an offer with no explicit payment methods and the default
    /// `"one-off"` kind.
    ///
    /// # Errors
    ///
    /// - [`ValidationError::NegativeAmount`] if `amount` is below zero
    /// - [`ValidationError::EmptyField`] if the id, currency, title or
    ///   description is empty or whitespace only
    pub fn new(
        offer_id: impl Into<String>,
        amount: i64,
        currency: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let offer_id = non_empty("offer_id", offer_id.into())?;
        let currency = non_empty("currency", currency.into())?;
        let title = non_empty("title", title.into())?;
        let description = non_empty("description", description.into())?;
        let amount = u64::try_from(amount).map_err(|_| ValidationError::NegativeAmount(amount))?;
        Ok(Self {
            offer_id,
            amount,
            currency,
            description,
            title,
            payment_methods: Vec::new(),
            kind: OfferKind::default(),
        })
    }

    pub fn with_payment_methods<I>(mut self, methods: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<PaymentMethod>,
    {
        self.payment_methods = methods.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_kind(mut self, kind: impl Into<OfferKind>) -> Self {
        self.kind = kind.into();
        self
    }

    pub fn offer_id(&self) -> &str {
        &self.offer_id
    }

    /// Price in integer minor units of [`Offer::currency`].
    pub fn amount(&self) -> u64 {
        self.amount
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Accepted payment methods. Empty when the vendor left the choice to the server.
    pub fn payment_methods(&self) -> &[PaymentMethod] {
        &self.payment_methods
    }

    pub fn accepts(&self, method: &PaymentMethod) -> bool {
        self.payment_methods.contains(method)
    }

    pub fn kind(&self) -> &OfferKind {
        &self.kind
    }
}

fn non_empty(field: &'static str, value: String) -> Result<String, ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::EmptyField(field))
    } else {
        Ok(value)
    }
}

/// Checks that `offers` is non-empty and that no two offers share an id.
pub fn validate_offer_set(offers: &[Offer]) -> Result<(), ValidationError> {
    if offers.is_empty() {
        return Err(ValidationError::EmptyBundle);
    }
    let mut seen = HashSet::with_capacity(offers.len());
    for offer in offers {
        if !seen.insert(offer.offer_id.as_str()) {
            return Err(ValidationError::DuplicateOfferId(offer.offer_id.clone()));
        }
    }
    Ok(())
}

/// Offers published together, sharing one payment context.
///
/// The context token is needed both to poll the bundle's payment status and to
/// pay any of its offers. The payment request URL is where method-specific
/// payment instructions are fetched; it may live on a different host than the
/// vendor API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferBundle {
    pub(crate) offers: Vec<Offer>,
    pub(crate) payment_context_token: ContextToken,
    pub(crate) payment_request_url: String,
    pub(crate) version: String,
}

impl OfferBundle {
    /// Assembles a bundle from its parts.
    ///
    /// # Errors
    ///
    /// - [`ValidationError::EmptyBundle`] if `offers` is empty
    /// - [`ValidationError::DuplicateOfferId`] if two offers share an id
    pub fn new(
        offers: Vec<Offer>,
        payment_context_token: impl Into<ContextToken>,
        payment_request_url: impl Into<String>,
        version: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        validate_offer_set(&offers)?;
        Ok(Self {
            offers,
            payment_context_token: payment_context_token.into(),
            payment_request_url: payment_request_url.into(),
            version: version.into(),
        })
    }

    pub fn offers(&self) -> &[Offer] {
        &self.offers
    }

    /// Looks up an offer of this bundle by id.
    pub fn offer(&self, offer_id: &str) -> Option<&Offer> {
        self.offers.iter().find(|o| o.offer_id == offer_id)
    }

    pub fn payment_context_token(&self) -> &ContextToken {
        &self.payment_context_token
    }

    pub fn payment_request_url(&self) -> &str {
        &self.payment_request_url
    }

    /// Protocol version reported by the server.
    pub fn version(&self) -> &str {
        &self.version
    }
}

impl Display for OfferBundle {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "L402 Offers:")?;
        for offer in &self.offers {
            match minor_to_major(offer.amount, DEFAULT_CURRENCY_EXPONENT) {
                Some(major) => writeln!(f, "- {} ({} {})", offer.title, major, offer.currency)?,
                None => writeln!(f, "- {} ({} minor units {})", offer.title, offer.amount, offer.currency)?,
            }
        }
        writeln!(f, "Payment URL: {}", self.payment_request_url)?;
        write!(f, "Context Token: {}", self.payment_context_token)
    }
}
