//! Luhn (mod 10) checksum over card number digits.
//!
//! The entry fields hold text, so the helpers here accept digit strings as
//! well as pre-parsed digit slices.

/// Doubled digit with 9 subtracted when the result exceeds 9, by digit.
const DOUBLE_TABLE: [u8; 10] = [0, 2, 4, 6, 8, 1, 3, 5, 7, 9];

/// Returns true if `digits` (values 0-9) pass the Luhn check.
///
/// An empty slice never passes.
///
/// # Example
///
/// ```
/// use card_entry::luhn::validate;
///
/// assert!(validate(&[4, 2, 4, 2, 4, 2, 4, 2, 4, 2, 4, 2, 4, 2, 4, 2]));
/// assert!(!validate(&[4, 2, 4, 2, 4, 2, 4, 2, 4, 2, 4, 2, 4, 2, 4, 1]));
/// ```
#[inline]
pub fn validate(digits: &[u8]) -> bool {
    !digits.is_empty() && checksum(digits) % 10 == 0
}

/// Returns true if the ASCII digit string passes the Luhn check.
///
/// Any non-digit character fails the check.
///
/// ```
/// use card_entry::luhn::validate_str;
///
/// assert!(validate_str("4242424242424242"));
/// assert!(!validate_str("4242 4242 4242 4242"));
/// ```
pub fn validate_str(number: &str) -> bool {
    if number.is_empty() || !number.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    let digits: Vec<u8> = number.bytes().map(|b| b - b'0').collect();
    validate(&digits)
}

/// Luhn sum (not reduced mod 10). The rightmost digit is not doubled.
#[inline]
pub fn checksum(digits: &[u8]) -> u32 {
    digits
        .iter()
        .rev()
        .enumerate()
        .map(|(i, &d)| {
            if i % 2 == 1 {
                DOUBLE_TABLE[d as usize] as u32
            } else {
                d as u32
            }
        })
        .sum()
}

/// Check digit that makes `partial` followed by it pass the Luhn check.
///
/// ```
/// use card_entry::luhn::check_digit;
///
/// assert_eq!(check_digit(&[4, 2, 4, 2, 4, 2, 4, 2, 4, 2, 4, 2, 4, 2, 4]), 2);
/// ```
pub fn check_digit(partial: &[u8]) -> u8 {
    // Appending a digit shifts every existing position by one, so the digits
    // doubled in the final number are the ones at even offsets from the right.
    let sum: u32 = partial
        .iter()
        .rev()
        .enumerate()
        .map(|(i, &d)| {
            if i % 2 == 0 {
                DOUBLE_TABLE[d as usize] as u32
            } else {
                d as u32
            }
        })
        .sum();
    ((10 - (sum % 10)) % 10) as u8
}
