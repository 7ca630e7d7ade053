//! Card number and CVV helpers.
//!
//! Card details are only checked for shape. Nothing here talks to a payment
//! processor and card data never ends up on an order.

/// Digits in an accepted card number.
pub const CARD_NUMBER_DIGITS: usize = 16;

/// Reformat free-typed input as `1234 5678 9012 3456`.
///
/// Non-digits are dropped and anything past the sixteenth digit is cut, so
/// the result is at most 19 characters long.
#[must_use]
pub fn format_card_number(input: &str) -> String {
    let mut formatted = String::with_capacity(CARD_NUMBER_DIGITS + 3);
    for (i, digit) in input
        .chars()
        .filter(char::is_ascii_digit)
        .take(CARD_NUMBER_DIGITS)
        .enumerate()
    {
        if i > 0 && i % 4 == 0 {
            formatted.push(' ');
        }
        formatted.push(digit);
    }
    formatted
}

/// Exactly sixteen digits once whitespace is removed.
#[must_use]
pub fn is_valid_card_number(input: &str) -> bool {
    let mut digits = 0usize;
    for c in input.chars().filter(|c| !c.is_whitespace()) {
        if !c.is_ascii_digit() {
            return false;
        }
        digits += 1;
    }
    digits == CARD_NUMBER_DIGITS
}

/// Three or four digits.
#[must_use]
pub fn is_valid_cvv(input: &str) -> bool {
    (3..=4).contains(&input.len()) && input.chars().all(|c| c.is_ascii_digit())
}
