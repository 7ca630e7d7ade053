//! Type-safe price representation using decimal arithmetic.
//!
//! All amounts are US dollars; the shop never handles another currency.

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, Mul, Sub};
use core::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The input string is empty.
    #[error("price cannot be empty")]
    Empty,
    /// The input is not a decimal number.
    #[error("invalid price: {0}")]
    Invalid(String),
    /// The amount is below zero.
    #[error("price cannot be negative")]
    Negative,
    /// The amount is above [`Price::MAX_CENTS`].
    #[error("price cannot exceed $1,000,000.00")]
    TooLarge,
}

/// A dollar amount.
///
/// Serializes as a decimal string (`"129.99"`), and accepts either a string
/// or a JSON number when deserializing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Zero dollars.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Largest amount accepted when parsing, in cents.
    pub const MAX_CENTS: i64 = 100_000_000;

    /// Create a price from a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a price from a whole number of cents.
    #[must_use]
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, 2))
    }

    /// The decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Parse a price from free-form display text.
    ///
    /// Product cards may show a sale price next to the struck-through list
    /// price (`"$89.99 $129.99"`); the first `$<digits>.<digits>` amount wins.
    /// Text without such an amount is parsed with every `$` removed.
    ///
    /// # Errors
    ///
    /// Returns an error if no non-negative decimal amount can be read.
    pub fn parse_display(text: &str) -> Result<Self, PriceError> {
        if let Some(amount) = first_dollar_amount(text) {
            return amount.parse();
        }
        text.replace('$', "").parse()
    }

    /// Multiply by a line quantity. Saturates instead of overflowing.
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self(self.0.saturating_mul(Decimal::from(quantity)))
    }

    /// Round to whole cents (half away from zero).
    #[must_use]
    pub fn round_to_cents(self) -> Self {
        Self(self.0.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
    }

    /// Format for display (e.g., "$19.99").
    #[must_use]
    pub fn display(&self) -> String {
        self.to_string()
    }
}

/// Find the first `$<digits>.<digits>` run in `text`.
fn first_dollar_amount(text: &str) -> Option<&str> {
    text.match_indices('$').find_map(|(idx, _)| {
        let rest = text.get(idx + 1..)?;
        let int_len = rest.chars().take_while(char::is_ascii_digit).count();
        if int_len == 0 {
            return None;
        }
        let after_int = rest.get(int_len..)?;
        let frac = after_int.strip_prefix('.')?;
        let frac_len = frac.chars().take_while(char::is_ascii_digit).count();
        if frac_len == 0 {
            return None;
        }
        rest.get(..int_len + 1 + frac_len)
    })
}

impl FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(PriceError::Empty);
        }
        let amount =
            Decimal::from_str(trimmed).map_err(|_| PriceError::Invalid(trimmed.to_owned()))?;
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative);
        }
        if amount > Decimal::new(Self::MAX_CENTS, 2) {
            return Err(PriceError::TooLarge);
        }
        Ok(Self(amount))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cents = self.round_to_cents().0;
        write!(f, "${cents:.2}")
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Sub for Price {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_sub(rhs.0))
    }
}

impl Mul<Decimal> for Price {
    type Output = Self;

    fn mul(self, rhs: Decimal) -> Self::Output {
        Self(self.0.saturating_mul(rhs))
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}
