//! Checkout form data and validation.

use core::fmt;

use serde::{Deserialize, Serialize};

use super::card;
use super::order::{CustomerInfo, ShippingAddress};
use crate::types::{Email, PaymentMethod};

pub const REQUIRED_MESSAGE: &str = "This field is required";
pub const INVALID_EMAIL_MESSAGE: &str = "Please enter a valid email address";
pub const INVALID_CARD_NUMBER_MESSAGE: &str = "Please enter a valid 16-digit card number";
pub const INVALID_CVV_MESSAGE: &str = "Please enter a valid CVV";
pub const PAYMENT_METHOD_MESSAGE: &str = "Please select a payment method";

/// Checkout form fields, in page order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    FirstName,
    LastName,
    Email,
    Phone,
    Address,
    City,
    State,
    Zip,
    Country,
    PaymentMethod,
    CardName,
    CardNumber,
    Expiry,
    Cvv,
}

impl Field {
    /// Every field, in page order.
    pub const ALL: [Self; 14] = [
        Self::FirstName,
        Self::LastName,
        Self::Email,
        Self::Phone,
        Self::Address,
        Self::City,
        Self::State,
        Self::Zip,
        Self::Country,
        Self::PaymentMethod,
        Self::CardName,
        Self::CardNumber,
        Self::Expiry,
        Self::Cvv,
    ];

    /// The form control name (and element id).
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::FirstName => "first-name",
            Self::LastName => "last-name",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Address => "address",
            Self::City => "city",
            Self::State => "state",
            Self::Zip => "zip",
            Self::Country => "country",
            Self::PaymentMethod => "payment-method",
            Self::CardName => "card-name",
            Self::CardNumber => "card-number",
            Self::Expiry => "expiry",
            Self::Cvv => "cvv",
        }
    }

    /// Always required, whatever the payment method.
    #[must_use]
    pub const fn is_always_required(&self) -> bool {
        !self.is_card_field() && !matches!(self, Self::PaymentMethod)
    }

    /// Part of the card details group.
    #[must_use]
    pub const fn is_card_field(&self) -> bool {
        matches!(
            self,
            Self::CardName | Self::CardNumber | Self::Expiry | Self::Cvv
        )
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One failed check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldError {
    pub field: Field,
    pub message: &'static str,
}

/// Failed checks in page order. At most one entry per field.
#[derive(thiserror::Error, Debug, Clone, Default, PartialEq, Eq)]
#[error("{} checkout field(s) invalid", .errors.len())]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    fn push(&mut self, field: Field, message: &'static str) {
        self.errors.push(FieldError { field, message });
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// The first invalid field on the page.
    #[must_use]
    pub fn first(&self) -> Option<Field> {
        self.errors.first().map(|e| e.field)
    }

    /// Message for `field`, if it failed.
    #[must_use]
    pub fn message(&self, field: Field) -> Option<&'static str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message)
    }

    #[must_use]
    pub fn is_invalid(&self, field: Field) -> bool {
        self.message(field).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.iter()
    }
}

/// Raw checkout form submission.
///
/// Field names match the page's form controls (`first-name`, `card-number`,
/// ...). Missing controls deserialize as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct CheckoutForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub country: String,
    pub payment_method: String,
    pub card_name: String,
    pub card_number: String,
    pub expiry: String,
    pub cvv: String,
}

/// A checkout form that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidCheckout {
    pub customer: CustomerInfo,
    pub shipping: ShippingAddress,
    pub payment_method: PaymentMethod,
}

impl CheckoutForm {
    /// Raw value of `field`.
    #[must_use]
    pub fn value(&self, field: Field) -> &str {
        match field {
            Field::FirstName => &self.first_name,
            Field::LastName => &self.last_name,
            Field::Email => &self.email,
            Field::Phone => &self.phone,
            Field::Address => &self.address,
            Field::City => &self.city,
            Field::State => &self.state,
            Field::Zip => &self.zip,
            Field::Country => &self.country,
            Field::PaymentMethod => &self.payment_method,
            Field::CardName => &self.card_name,
            Field::CardNumber => &self.card_number,
            Field::Expiry => &self.expiry,
            Field::Cvv => &self.cvv,
        }
    }

    /// The selected payment method, if it is one the shop accepts.
    #[must_use]
    pub fn selected_payment_method(&self) -> Option<PaymentMethod> {
        self.payment_method.parse().ok()
    }

    /// Copy of the form with the card number regrouped for display.
    #[must_use]
    pub fn with_formatted_card_number(mut self) -> Self {
        self.card_number = card::format_card_number(&self.card_number);
        self
    }

    /// Check every field and collect failures in page order.
    ///
    /// Each field reports at most one problem: a blank required field is
    /// "required"; format checks only run on non-blank values. Card fields
    /// are checked only when the card payment method is selected.
    ///
    /// # Errors
    ///
    /// Returns the failed checks if any field is invalid.
    pub fn validate(&self) -> Result<ValidCheckout, ValidationErrors> {
        let method = self.selected_payment_method();
        let mut errors = ValidationErrors::default();

        for field in Field::ALL {
            if let Some(message) = self.check(field, method) {
                errors.push(field, message);
            }
        }

        let (Some(payment_method), true) = (method, errors.is_empty()) else {
            return Err(errors);
        };
        let email = Email::parse(&self.email).map_err(|_| {
            let mut errors = ValidationErrors::default();
            errors.push(Field::Email, INVALID_EMAIL_MESSAGE);
            errors
        })?;

        Ok(ValidCheckout {
            customer: CustomerInfo {
                first_name: self.first_name.trim().to_owned(),
                last_name: self.last_name.trim().to_owned(),
                email,
                phone: self.phone.trim().to_owned(),
            },
            shipping: ShippingAddress {
                address: self.address.trim().to_owned(),
                city: self.city.trim().to_owned(),
                state: self.state.trim().to_owned(),
                zip: self.zip.trim().to_owned(),
                country: self.country.trim().to_owned(),
            },
            payment_method,
        })
    }

    fn check(&self, field: Field, method: Option<PaymentMethod>) -> Option<&'static str> {
        let raw = self.value(field);

        if field == Field::PaymentMethod {
            return method.is_none().then_some(PAYMENT_METHOD_MESSAGE);
        }

        let applies = field.is_always_required()
            || (field.is_card_field() && method.is_some_and(|m| m.requires_card()));
        if !applies {
            return None;
        }

        if raw.trim().is_empty() {
            return Some(REQUIRED_MESSAGE);
        }

        // Format checks see the value as typed: a padded email or CVV fails.
        match field {
            Field::Email if Email::parse(raw).is_err() => Some(INVALID_EMAIL_MESSAGE),
            Field::CardNumber if !card::is_valid_card_number(raw) => {
                Some(INVALID_CARD_NUMBER_MESSAGE)
            }
            Field::Cvv if !card::is_valid_cvv(raw) => Some(INVALID_CVV_MESSAGE),
            _ => None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn filled(method: &str) -> CheckoutForm {
        CheckoutForm {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: "ada@example.com".into(),
            phone: "555-0100".into(),
            address: "1 Analytical Way".into(),
            city: "London".into(),
            state: "LDN".into(),
            zip: "12345".into(),
            country: "UK".into(),
            payment_method: method.into(),
            card_name: "Ada Lovelace".into(),
            card_number: "4111 1111 1111 1111".into(),
            expiry: "12/30".into(),
            cvv: "123".into(),
        }
    }

    #[test]
    fn test_valid_card_checkout() {
        let valid = filled("credit-card").validate().unwrap();
        assert_eq!(valid.payment_method, PaymentMethod::CreditCard);
        assert_eq!(valid.customer.email.as_str(), "ada@example.com");
        assert_eq!(valid.shipping.city, "London");
    }

    #[test]
    fn test_all_empty_marks_every_required_field() {
        let form = CheckoutForm {
            payment_method: "credit-card".into(),
            ..CheckoutForm::default()
        };
        let errors = form.validate().unwrap_err();

        for field in Field::ALL {
            if field == Field::PaymentMethod {
                assert!(!errors.is_invalid(field));
            } else {
                assert_eq!(errors.message(field), Some(REQUIRED_MESSAGE), "{field}");
            }
        }
        assert_eq!(errors.first(), Some(Field::FirstName));
    }

    #[test]
    fn test_cod_skips_card_fields() {
        let form = CheckoutForm {
            card_name: String::new(),
            card_number: "bogus".into(),
            expiry: String::new(),
            cvv: String::new(),
            ..filled("cod")
        };
        let valid = form.validate().unwrap();
        assert_eq!(valid.payment_method, PaymentMethod::CashOnDelivery);
    }

    #[test]
    fn test_invalid_email() {
        let form = CheckoutForm {
            email: "not-an-email".into(),
            ..filled("credit-card")
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.message(Field::Email), Some(INVALID_EMAIL_MESSAGE));
        assert_eq!(errors.first(), Some(Field::Email));
    }

    #[test]
    fn test_short_card_number() {
        let form = CheckoutForm {
            card_number: "411111111111".into(),
            ..filled("credit-card")
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(
            errors.message(Field::CardNumber),
            Some(INVALID_CARD_NUMBER_MESSAGE)
        );
    }

    #[test]
    fn test_bad_cvv() {
        let form = CheckoutForm {
            cvv: "12".into(),
            ..filled("credit-card")
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.message(Field::Cvv), Some(INVALID_CVV_MESSAGE));
    }

    #[test]
    fn test_whitespace_only_is_empty() {
        let form = CheckoutForm {
            city: "   ".into(),
            ..filled("cod")
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.message(Field::City), Some(REQUIRED_MESSAGE));
    }

    #[test]
    fn test_unknown_payment_method() {
        let errors = filled("bitcoin").validate().unwrap_err();
        assert_eq!(
            errors.message(Field::PaymentMethod),
            Some(PAYMENT_METHOD_MESSAGE)
        );
        // Card fields are not checked without a card method.
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_values_are_trimmed() {
        let form = CheckoutForm {
            first_name: "  Ada ".into(),
            city: "London  ".into(),
            ..filled("cod")
        };
        let valid = form.validate().unwrap();
        assert_eq!(valid.customer.first_name, "Ada");
        assert_eq!(valid.shipping.city, "London");
    }

    #[test]
    fn test_padded_email_and_cvv_are_rejected() {
        let form = CheckoutForm {
            email: " ada@example.com".into(),
            cvv: " 123".into(),
            ..filled("credit-card")
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.message(Field::Email), Some(INVALID_EMAIL_MESSAGE));
        assert_eq!(errors.message(Field::Cvv), Some(INVALID_CVV_MESSAGE));
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_format_card_number_for_redisplay() {
        let form = CheckoutForm {
            card_number: "4111111111111111".into(),
            ..CheckoutForm::default()
        }
        .with_formatted_card_number();
        assert_eq!(form.card_number, "4111 1111 1111 1111");
    }

    #[test]
    fn test_deserialize_form_names() {
        let form: CheckoutForm = serde_json::from_value(serde_json::json!({
            "first-name": "Ada",
            "payment-method": "cod",
            "card-number": "4111"
        }))
        .unwrap();
        assert_eq!(form.first_name, "Ada");
        assert_eq!(form.selected_payment_method(), Some(PaymentMethod::CashOnDelivery));
        assert_eq!(form.card_number, "4111");
        assert!(form.last_name.is_empty());
    }
}
