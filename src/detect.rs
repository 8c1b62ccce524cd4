//! Card brand detection from the leading digits of a (partial) card number.
//!
//! Detection runs after every keystroke in the number field, so it must cope
//! with prefixes that are too short to decide; those are `Unknown` until
//! enough digits arrive.

use crate::CardBrand;

/// Detects the brand of a card number as typed.
///
/// Separators and any other non-digit characters are skipped.
///
/// # Example
///
/// ```
/// use card_entry::detect::detect;
/// use card_entry::CardBrand;
///
/// assert_eq!(detect("4242 42"), CardBrand::Visa);
/// assert_eq!(detect("3782 822463 10005"), CardBrand::Amex);
/// assert_eq!(detect("3"), CardBrand::Unknown);
/// ```
pub fn detect(number_text: &str) -> CardBrand {
    let mut prefix = [0u8; 4];
    let mut len = 0;
    for b in number_text.bytes().filter(u8::is_ascii_digit).take(prefix.len()) {
        prefix[len] = b - b'0';
        len += 1;
    }
    detect_digits(&prefix[..len])
}

/// Detects the brand from a slice of digit values (0-9).
///
/// Only the first four digits are ever consulted.
#[inline]
pub fn detect_digits(digits: &[u8]) -> CardBrand {
    match digits {
        [4, ..] => CardBrand::Visa,

        // American Express: 34, 37
        [3, 4, ..] | [3, 7, ..] => CardBrand::Amex,

        // MasterCard: 51-55 or 2221-2720
        [5, 1..=5, ..] => CardBrand::MasterCard,
        [2, 2, 2, 1..=9, ..] => CardBrand::MasterCard,
        [2, 2, 3..=9, _, ..] => CardBrand::MasterCard,
        [2, 3..=6, _, _, ..] => CardBrand::MasterCard,
        [2, 7, 0..=1, _, ..] => CardBrand::MasterCard,
        [2, 7, 2, 0, ..] => CardBrand::MasterCard,

        // Discover: 6011, 644-649, 65
        [6, 0, 1, 1, ..] => CardBrand::Discover,
        [6, 4, 4..=9, ..] => CardBrand::Discover,
        [6, 5, ..] => CardBrand::Discover,

        _ => CardBrand::Unknown,
    }
}
