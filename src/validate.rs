//! Per-field validation.
//!
//! [`validate`] looks at a field's text and the current brand and answers
//! one of three things: the field is valid (with its normalized value), it is
//! invalid (with the reason), or it is simply not filled in yet. It does not
//! decide *when* to run; the controller calls it once a field is full.
//!
//! # Example
//!
//! ```
//! use card_entry::validate::{validate, Verdict};
//! use card_entry::{CardBrand, FieldKind};
//!
//! assert!(validate(FieldKind::Number, "4242 4242 4242 4242", CardBrand::Visa).is_valid());
//! assert!(validate(FieldKind::Number, "4242 4242 4242 4241", CardBrand::Visa).is_invalid());
//! assert_eq!(validate(FieldKind::Number, "4242 4242 4242", CardBrand::Visa), Verdict::Incomplete);
//! ```

use zeroize::Zeroize;

use crate::error::FieldError;
use crate::expiry::{parse_expiry, ExpiryDate, YearMonth};
use crate::format::strip_separators;
use crate::{luhn, CardBrand, FieldKind, Validity};

/// Normalized content of a valid field.
#[derive(Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// Card number digits without separators.
    Number(String),
    /// Parsed expiry date.
    Expiry(ExpiryDate),
    /// Security code digits.
    Cvc(String),
    /// Postal code as entered.
    PostalCode(String),
}

impl FieldValue {
    /// The field this value belongs to.
    pub fn kind(&self) -> FieldKind {
        match self {
            Self::Number(_) => FieldKind::Number,
            Self::Expiry(_) => FieldKind::Expiry,
            Self::Cvc(_) => FieldKind::Cvc,
            Self::PostalCode(_) => FieldKind::PostalCode,
        }
    }
}

impl std::fmt::Debug for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => f
                .debug_tuple("Number")
                .field(&crate::mask::mask_number(n))
                .finish(),
            Self::Expiry(e) => f.debug_tuple("Expiry").field(e).finish(),
            Self::Cvc(c) => f.debug_tuple("Cvc").field(&crate::mask::mask_cvc(c)).finish(),
            Self::PostalCode(p) => f.debug_tuple("PostalCode").field(p).finish(),
        }
    }
}

impl Drop for FieldValue {
    fn drop(&mut self) {
        match self {
            Self::Number(s) | Self::Cvc(s) | Self::PostalCode(s) => s.zeroize(),
            Self::Expiry(_) => {}
        }
    }
}

/// Outcome of validating one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// The field is complete and correct.
    Valid(FieldValue),
    /// The field is complete but wrong.
    Invalid(FieldError),
    /// The field is not filled in yet.
    Incomplete,
}

impl Verdict {
    /// True for [`Verdict::Valid`].
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }

    /// True for [`Verdict::Invalid`].
    pub fn is_invalid(&self) -> bool {
        matches!(self, Self::Invalid(_))
    }

    /// The field validity this verdict maps to.
    pub fn validity(&self) -> Validity {
        match self {
            Self::Valid(_) => Validity::Valid,
            Self::Invalid(_) => Validity::Invalid,
            Self::Incomplete => Validity::Incomplete,
        }
    }
}

/// Validates field text against the current local month.
///
/// See [`validate_at`].
pub fn validate(kind: FieldKind, text: &str, brand: CardBrand) -> Verdict {
    validate_at(kind, text, brand, YearMonth::current())
}

/// Validates field text, treating `today` as the current month.
///
/// - **Number**: Luhn check plus exact digit count (15 Amex, 16 otherwise).
/// - **Expiry**: `MM/YY`, month 1-12, not before `today`.
/// - **CVC**: digits only, 4 for Amex, 3 otherwise.
/// - **Postal code**: any non-blank text. Postal formats vary too much by
///   country to check here.
pub fn validate_at(kind: FieldKind, text: &str, brand: CardBrand, today: YearMonth) -> Verdict {
    match kind {
        FieldKind::Number => validate_number(text, brand),
        FieldKind::Expiry => validate_expiry(text, today),
        FieldKind::Cvc => validate_cvc(text, brand),
        FieldKind::PostalCode => validate_postal_code(text),
    }
}

fn validate_number(text: &str, brand: CardBrand) -> Verdict {
    let digits = strip_separators(FieldKind::Number, text);
    if let Err(e) = check_digits(&digits) {
        return Verdict::Invalid(e);
    }

    let expected = brand.number_digits();
    if digits.len() < expected {
        return Verdict::Incomplete;
    }
    if digits.len() > expected {
        return Verdict::Invalid(FieldError::WrongLength {
            length: digits.len(),
            expected,
        });
    }
    if !luhn::validate_str(&digits) {
        return Verdict::Invalid(FieldError::InvalidChecksum);
    }

    Verdict::Valid(FieldValue::Number(digits))
}

fn validate_expiry(text: &str, today: YearMonth) -> Verdict {
    if text.chars().count() < FieldKind::Expiry.max_len(CardBrand::Unknown) {
        return Verdict::Incomplete;
    }

    match parse_expiry(text, today) {
        Ok(expiry) if expiry.is_expired_at(today) => Verdict::Invalid(FieldError::Expired {
            month: expiry.month(),
            year: expiry.year(),
        }),
        Ok(expiry) => Verdict::Valid(FieldValue::Expiry(expiry)),
        Err(e) => Verdict::Invalid(e),
    }
}

fn validate_cvc(text: &str, brand: CardBrand) -> Verdict {
    let expected = brand.cvc_len();
    let length = text.chars().count();
    if length < expected {
        return Verdict::Incomplete;
    }
    if let Err(e) = check_digits(text) {
        return Verdict::Invalid(e);
    }

    if length > expected {
        Verdict::Invalid(FieldError::WrongLength { length, expected })
    } else {
        Verdict::Valid(FieldValue::Cvc(text.to_string()))
    }
}

fn validate_postal_code(text: &str) -> Verdict {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Verdict::Incomplete;
    }
    Verdict::Valid(FieldValue::PostalCode(trimmed.to_string()))
}

fn check_digits(text: &str) -> Result<(), FieldError> {
    match text.chars().enumerate().find(|(_, c)| !c.is_ascii_digit()) {
        Some((position, character)) => Err(FieldError::InvalidCharacter {
            position,
            character,
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> YearMonth {
        YearMonth::new(2026, 10).unwrap()
    }

    fn check(kind: FieldKind, text: &str, brand: CardBrand) -> Verdict {
        validate_at(kind, text, brand, today())
    }

    #[test]
    fn test_number_verdicts() {
        assert_eq!(
            check(FieldKind::Number, "4242424242424242", CardBrand::Visa),
            Verdict::Valid(FieldValue::Number("4242424242424242".into()))
        );
        assert_eq!(
            check(FieldKind::Number, "4242424242424241", CardBrand::Visa),
            Verdict::Invalid(FieldError::InvalidChecksum)
        );
        assert_eq!(
            check(FieldKind::Number, "424242424242", CardBrand::Visa),
            Verdict::Incomplete
        );
    }

    #[test]
    fn test_number_accepts_display_text() {
        let verdict = check(FieldKind::Number, "3782 822463 10005", CardBrand::Amex);
        assert_eq!(
            verdict,
            Verdict::Valid(FieldValue::Number("378282246310005".into()))
        );
    }

    #[test]
    fn test_number_length_per_brand() {
        // 15 digits is complete for Amex only
        assert_eq!(
            check(FieldKind::Number, "378282246310005", CardBrand::Visa),
            Verdict::Incomplete
        );
        assert_eq!(
            check(FieldKind::Number, "4242424242424242", CardBrand::Amex),
            Verdict::Invalid(FieldError::WrongLength {
                length: 16,
                expected: 15
            })
        );
        // Unknown brands use the 16-digit default
        assert!(check(FieldKind::Number, "0000000000000000", CardBrand::Unknown).is_valid());
    }

    #[test]
    fn test_number_rejects_non_digits() {
        assert_eq!(
            check(FieldKind::Number, "4242-4242", CardBrand::Visa),
            Verdict::Invalid(FieldError::InvalidCharacter {
                position: 4,
                character: '-'
            })
        );
    }

    #[test]
    fn test_expiry_verdicts() {
        assert!(matches!(
            check(FieldKind::Expiry, "01/99", CardBrand::Visa),
            Verdict::Invalid(FieldError::Expired {
                month: 1,
                year: 1999
            })
        ));
        assert_eq!(
            check(FieldKind::Expiry, "13/30", CardBrand::Visa),
            Verdict::Invalid(FieldError::InvalidMonth(13))
        );
        assert!(check(FieldKind::Expiry, "09/30", CardBrand::Visa).is_valid());
        assert_eq!(check(FieldKind::Expiry, "09/3", CardBrand::Visa), Verdict::Incomplete);
    }

    #[test]
    fn test_expiry_current_month_is_valid() {
        assert!(check(FieldKind::Expiry, "10/26", CardBrand::Visa).is_valid());
        assert!(check(FieldKind::Expiry, "09/26", CardBrand::Visa).is_invalid());
    }

    #[test]
    fn test_expiry_value() {
        match check(FieldKind::Expiry, "12/34", CardBrand::Visa) {
            Verdict::Valid(FieldValue::Expiry(e)) => {
                assert_eq!((e.month(), e.year()), (12, 2034));
            }
            other => panic!("expected valid expiry, got {:?}", other),
        }
    }

    #[test]
    fn test_cvc_verdicts() {
        assert!(check(FieldKind::Cvc, "123", CardBrand::Visa).is_valid());
        assert!(check(FieldKind::Cvc, "1234", CardBrand::Amex).is_valid());
        assert_eq!(check(FieldKind::Cvc, "123", CardBrand::Amex), Verdict::Incomplete);
        assert_eq!(
            check(FieldKind::Cvc, "1234", CardBrand::Visa),
            Verdict::Invalid(FieldError::WrongLength {
                length: 4,
                expected: 3
            })
        );
        assert!(check(FieldKind::Cvc, "12a", CardBrand::Visa).is_invalid());
    }

    #[test]
    fn test_short_cvc_is_incomplete_before_content_check() {
        assert_eq!(check(FieldKind::Cvc, "1a", CardBrand::Visa), Verdict::Incomplete);
        assert_eq!(check(FieldKind::Cvc, "12a", CardBrand::Amex), Verdict::Incomplete);
        assert_eq!(
            check(FieldKind::Cvc, "1a3", CardBrand::Visa),
            Verdict::Invalid(FieldError::InvalidCharacter {
                position: 1,
                character: 'a'
            })
        );
    }

    #[test]
    fn test_expiry_with_far_reference_year() {
        let far = YearMonth::new(u16::MAX, 1).unwrap();
        assert!(matches!(
            validate_at(FieldKind::Expiry, "01/99", CardBrand::Visa, far),
            Verdict::Invalid(FieldError::Expired { year: 65499, .. })
        ));
    }

    #[test]
    fn test_postal_code_is_permissive() {
        assert!(check(FieldKind::PostalCode, "94107", CardBrand::Visa).is_valid());
        assert!(check(FieldKind::PostalCode, "SW1A", CardBrand::Visa).is_valid());
        assert!(check(FieldKind::PostalCode, "1", CardBrand::Visa).is_valid());
        assert_eq!(check(FieldKind::PostalCode, "", CardBrand::Visa), Verdict::Incomplete);
        assert_eq!(check(FieldKind::PostalCode, "   ", CardBrand::Visa), Verdict::Incomplete);
    }

    #[test]
    fn test_verdict_validity() {
        assert_eq!(Verdict::Incomplete.validity(), Validity::Incomplete);
        assert_eq!(
            Verdict::Invalid(FieldError::InvalidChecksum).validity(),
            Validity::Invalid
        );
    }

    #[test]
    fn test_value_debug_is_masked() {
        let value = FieldValue::Number("4242424242424242".into());
        assert!(!format!("{:?}", value).contains("4242424242424242"));
        let value = FieldValue::Cvc("123".into());
        assert!(!format!("{:?}", value).contains("123"));
    }
}
