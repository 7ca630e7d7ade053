//! Payment method and status enums.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// How the customer chose to pay.
///
/// Serialized with the form values the checkout page posts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PaymentMethod {
    #[default]
    #[serde(rename = "credit-card")]
    CreditCard,
    #[serde(rename = "cod")]
    CashOnDelivery,
}

impl PaymentMethod {
    /// The value posted by the payment method radio button.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::CreditCard => "credit-card",
            Self::CashOnDelivery => "cod",
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::CreditCard => "Credit Card",
            Self::CashOnDelivery => "Cash on Delivery",
        }
    }

    /// Whether the card detail fields apply to this method.
    #[must_use]
    pub const fn requires_card(&self) -> bool {
        matches!(self, Self::CreditCard)
    }

    /// Status recorded on a freshly placed order.
    ///
    /// Cash on delivery stays pending until the parcel is paid for.
    #[must_use]
    pub const fn initial_status(&self) -> PaymentStatus {
        match self {
            Self::CashOnDelivery => PaymentStatus::Pending,
            Self::CreditCard => PaymentStatus::Paid,
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned for an unrecognised payment method value.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown payment method: {0}")]
pub struct UnknownPaymentMethod(pub String);

impl FromStr for PaymentMethod {
    type Err = UnknownPaymentMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "credit-card" => Ok(Self::CreditCard),
            "cod" => Ok(Self::CashOnDelivery),
            other => Err(UnknownPaymentMethod(other.to_owned())),
        }
    }
}

/// Payment state of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
}

impl PaymentStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_status() {
        assert_eq!(PaymentMethod::CreditCard.initial_status(), PaymentStatus::Paid);
        assert_eq!(
            PaymentMethod::CashOnDelivery.initial_status(),
            PaymentStatus::Pending
        );
    }

    #[test]
    fn test_parse_form_values() {
        assert_eq!("credit-card".parse(), Ok(PaymentMethod::CreditCard));
        assert_eq!("cod".parse(), Ok(PaymentMethod::CashOnDelivery));
        assert!("bitcoin".parse::<PaymentMethod>().is_err());
    }

    #[test]
    fn test_serde_matches_form_values() {
        assert_eq!(
            serde_json::to_string(&PaymentMethod::CashOnDelivery).unwrap(),
            "\"cod\""
        );
        assert_eq!(serde_json::to_string(&PaymentStatus::Paid).unwrap(), "\"paid\"");
    }
}
