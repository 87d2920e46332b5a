/// Local sanity-check failures raised while constructing domain values.
///
/// These checks only fail fast before a network round trip; the server
/// remains the authority on what it accepts.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Offer amount must be non-negative, got {0}")]
    NegativeAmount(i64),
    #[error("Offer field `{0}` must not be empty")]
    EmptyField(&'static str),
    #[error("An offer bundle needs at least one offer")]
    EmptyBundle,
    #[error("Duplicate offer id in bundle: {0}")]
    DuplicateOfferId(String),
}
