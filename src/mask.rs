//! PCI-DSS style masking for anything that ends up in logs or `Debug`.
//!
//! Only the last four digits of a card number may be shown; security codes
//! are never shown at all.

use crate::detect::detect;

/// Masks a card number, keeping the last four digits and the brand grouping.
///
/// Non-digit characters in the input are ignored.
///
/// # Example
///
/// ```
/// use card_entry::mask::mask_number;
///
/// assert_eq!(mask_number("4242424242424242"), "**** **** **** 4242");
/// assert_eq!(mask_number("3782 822463 10005"), "**** ****** *0005");
/// assert_eq!(mask_number("42"), "42");
/// ```
pub fn mask_number(number: &str) -> String {
    let digits: Vec<char> = number.chars().filter(char::is_ascii_digit).collect();
    let visible_from = digits.len().saturating_sub(4);
    let positions = detect(number).separator_positions();

    let mut result = String::with_capacity(digits.len() + positions.len());
    for (i, &d) in digits.iter().enumerate() {
        if positions.contains(&result.len()) {
            result.push(' ');
        }
        result.push(if i < visible_from { '*' } else { d });
    }
    result
}

/// Masks a security code completely, keeping only its length.
///
/// ```
/// use card_entry::mask::mask_cvc;
///
/// assert_eq!(mask_cvc("1234"), "****");
/// ```
pub fn mask_cvc(cvc: &str) -> String {
    "*".repeat(cvc.chars().count())
}
