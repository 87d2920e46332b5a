//! Human-readable currency amount parsing.
//!
//! L402 offers are priced in integer minor units (cents for USD). This module
//! converts between that representation and the decimal strings people type.
//!
//! # Supported Formats
//!
//! - Plain numbers: `"100"`, `"0.01"`
//! - With currency symbols: `"$10.50"`, `"€20"`
//! - With thousand separators: `"1,000"`, `"1,000,000.50"`
//!
//! # Example
//!
//! ```rust
//! use l402_types::util::money_amount::MoneyAmount;
//!
//! let amount = MoneyAmount::parse("$10.50").unwrap();
//! assert_eq!(amount.to_minor_units(2).unwrap(), 1050);
//! ```

use regex::Regex;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use std::fmt;
use std::fmt::Display;
use std::str::FromStr;
use std::sync::LazyLock;

/// Number of minor units per major unit for most ISO 4217 currencies.
pub const DEFAULT_CURRENCY_EXPONENT: u32 = 2;

/// A parsed monetary amount in major units, with decimal precision preserved.
#[derive(Debug, Clone, PartialEq)]
pub struct MoneyAmount(pub Decimal);

impl MoneyAmount {
    /// Returns the number of decimal places in the original input.
    pub fn scale(&self) -> u32 {
        self.0.scale()
    }

    /// Converts the amount to integer minor units for a currency whose minor
    /// unit is `10^-exponent` of the major unit.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyAmountParseError::WrongPrecision`] if the amount has more
    /// significant decimal places than the currency supports. Trailing zeros
    /// do not count, so `"1.500"` is 150 cents.
    pub fn to_minor_units(&self, exponent: u32) -> Result<u64, MoneyAmountParseError> {
        let scale = self.0.normalize().scale();
        if scale > exponent {
            return Err(MoneyAmountParseError::WrongPrecision {
                money: scale,
                currency: exponent,
            });
        }
        let factor = 10u64
            .checked_pow(exponent)
            .ok_or(MoneyAmountParseError::OutOfRange)?;
        let scaled = self
            .0
            .checked_mul(Decimal::from(factor))
            .ok_or(MoneyAmountParseError::OutOfRange)?;
        scaled.trunc().to_u64().ok_or(MoneyAmountParseError::OutOfRange)
    }
}

/// Renders integer minor units as a decimal amount in major units.
///
/// Returns `None` when `exponent` exceeds the precision [`Decimal`] can hold.
///
/// ```rust
/// use l402_types::util::money_amount::minor_to_major;
///
/// assert_eq!(minor_to_major(1, 2).unwrap().to_string(), "0.01");
/// ```
pub fn minor_to_major(amount: u64, exponent: u32) -> Option<Decimal> {
    let mut decimal = Decimal::from(amount);
    decimal.set_scale(exponent).ok()?;
    Some(decimal)
}

/// Errors that can occur when parsing a monetary amount.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum MoneyAmountParseError {
    /// The input string could not be parsed as a number.
    #[error("Invalid number format")]
    InvalidFormat,
    /// The value is outside the allowed range.
    #[error("Amount must be between 0 and {}", constants::MAX_STR)]
    OutOfRange,
    /// Negative values are not allowed.
    #[error("Negative value is not allowed")]
    Negative,
    /// The input has more decimal places than the currency supports.
    #[error("Too big of a precision: {money} vs {currency} on currency")]
    WrongPrecision {
        /// Decimal places in the input.
        money: u32,
        /// Decimal places supported by the currency.
        currency: u32,
    },
}

mod constants {
    use super::*;

    pub const MAX_STR: &str = "999999999";

    pub static MAX: LazyLock<Decimal> =
        LazyLock::new(|| Decimal::from_str(MAX_STR).expect("valid decimal"));

    pub static NON_NUMERIC: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"[^\d\.\-]+").expect("valid regex"));
}

impl MoneyAmount {
    /// Parses a human-readable currency string into a [`MoneyAmount`].
    ///
    /// Currency symbols, thousand separators, and whitespace are stripped
    /// before parsing. The result must be a non-negative number not above
    /// the allowed maximum.
    pub fn parse(input: &str) -> Result<Self, MoneyAmountParseError> {
        let cleaned = constants::NON_NUMERIC.replace_all(input, "").to_string();

        let parsed =
            Decimal::from_str(&cleaned).map_err(|_| MoneyAmountParseError::InvalidFormat)?;

        if parsed.is_sign_negative() && !parsed.is_zero() {
            return Err(MoneyAmountParseError::Negative);
        }

        if parsed > *constants::MAX {
            return Err(MoneyAmountParseError::OutOfRange);
        }

        Ok(MoneyAmount(parsed))
    }
}

impl FromStr for MoneyAmount {
    type Err = MoneyAmountParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MoneyAmount::parse(s)
    }
}

impl Display for MoneyAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}
