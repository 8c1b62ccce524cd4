//! Card brands, their entry limits, and the aggregate card parameter record.
//!
//! Every length rule the formatter and validator apply is looked up here,
//! keyed by [`CardBrand`], so brand is always passed around as a value.

use std::fmt;
use zeroize::Zeroize;

use crate::expiry::ExpiryDate;
use crate::field::FieldKind;
use crate::validate::FieldValue;

/// Card brands recognised by the entry widget.
///
/// Anything that does not match a known prefix (including prefixes that are
/// still too short to decide) is [`CardBrand::Unknown`] and gets the default
/// 16-digit layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CardBrand {
    /// American Express - Prefix 34, 37, 15 digits
    Amex,
    /// Discover - Prefix 6011, 644-649, 65, 16 digits
    Discover,
    /// MasterCard - Prefix 51-55, 2221-2720, 16 digits
    MasterCard,
    /// Visa - Prefix 4, 16 digits
    Visa,
    /// No known prefix yet
    #[default]
    Unknown,
}

impl CardBrand {
    /// Number of digits a complete card number has for this brand.
    #[inline]
    pub const fn number_digits(&self) -> usize {
        match self {
            Self::Amex => 15,
            _ => 16,
        }
    }

    /// Maximum display length of the number field, separators included.
    #[inline]
    pub const fn number_max_len(&self) -> usize {
        match self {
            Self::Amex => 17,
            _ => 19,
        }
    }

    /// Display lengths at which a space is placed before the next digit.
    #[inline]
    pub const fn separator_positions(&self) -> &'static [usize] {
        match self {
            Self::Amex => &[4, 11],
            _ => &[4, 9, 14],
        }
    }

    /// Display lengths at which deleting the trailing digit also drops the
    /// separator in front of it.
    #[inline]
    pub const fn removal_positions(&self) -> &'static [usize] {
        match self {
            Self::Amex => &[6, 13],
            _ => &[6, 11, 16],
        }
    }

    /// Length of the card security code.
    #[inline]
    pub const fn cvc_len(&self) -> usize {
        match self {
            Self::Amex => 4,
            _ => 3,
        }
    }

    /// Returns a human-readable name for the card brand.
    #[inline]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Amex => "American Express",
            Self::Discover => "Discover",
            Self::MasterCard => "MasterCard",
            Self::Visa => "Visa",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for CardBrand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// The card data collected so far.
///
/// A component is present only while the matching field is valid; the
/// controller clears it the moment that field is edited again. Contents are
/// zeroed on drop and `Debug` never prints the number or the CVC.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct CardParameters {
    number: Option<String>,
    expiry: Option<ExpiryDate>,
    cvc: Option<String>,
    postal_code: Option<String>,
}

impl CardParameters {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Card number digits, without separators.
    ///
    /// # Security Warning
    ///
    /// This is the full card number. Hand it to the tokenizer, never to a log.
    #[inline]
    pub fn number(&self) -> Option<&str> {
        self.number.as_deref()
    }

    /// Expiry month (1-12).
    #[inline]
    pub fn exp_month(&self) -> Option<u8> {
        self.expiry.map(|e| e.month())
    }

    /// Four-digit expiry year.
    #[inline]
    pub fn exp_year(&self) -> Option<u16> {
        self.expiry.map(|e| e.year())
    }

    /// Expiry date as one value.
    #[inline]
    pub fn expiry(&self) -> Option<ExpiryDate> {
        self.expiry
    }

    /// Card security code.
    #[inline]
    pub fn cvc(&self) -> Option<&str> {
        self.cvc.as_deref()
    }

    /// Postal code as entered.
    #[inline]
    pub fn postal_code(&self) -> Option<&str> {
        self.postal_code.as_deref()
    }

    /// Brand of the stored number, `Unknown` when no number is stored.
    pub fn brand(&self) -> CardBrand {
        self.number
            .as_deref()
            .map(crate::detect::detect)
            .unwrap_or_default()
    }

    /// Last four digits of the stored number.
    pub fn last_four(&self) -> Option<&str> {
        self.number
            .as_deref()
            .map(|n| &n[n.len().saturating_sub(4)..])
    }

    /// True when all four components are populated.
    pub fn is_complete(&self) -> bool {
        self.number.is_some()
            && self.expiry.is_some()
            && self.cvc.is_some()
            && self.postal_code.is_some()
    }

    /// Whether the component belonging to `kind` is populated.
    pub fn has(&self, kind: FieldKind) -> bool {
        match kind {
            FieldKind::Number => self.number.is_some(),
            FieldKind::Expiry => self.expiry.is_some(),
            FieldKind::Cvc => self.cvc.is_some(),
            FieldKind::PostalCode => self.postal_code.is_some(),
        }
    }

    pub(crate) fn store(&mut self, mut value: FieldValue) {
        match &mut value {
            FieldValue::Number(n) => {
                wipe(&mut self.number);
                self.number = Some(std::mem::take(n));
            }
            FieldValue::Expiry(e) => self.expiry = Some(*e),
            FieldValue::Cvc(c) => {
                wipe(&mut self.cvc);
                self.cvc = Some(std::mem::take(c));
            }
            FieldValue::PostalCode(p) => {
                wipe(&mut self.postal_code);
                self.postal_code = Some(std::mem::take(p));
            }
        }
    }

    pub(crate) fn clear(&mut self, kind: FieldKind) {
        match kind {
            FieldKind::Number => wipe(&mut self.number),
            FieldKind::Expiry => self.expiry = None,
            FieldKind::Cvc => wipe(&mut self.cvc),
            FieldKind::PostalCode => wipe(&mut self.postal_code),
        }
    }

    pub(crate) fn clear_all(&mut self) {
        for kind in FieldKind::ALL {
            self.clear(kind);
        }
    }
}

impl fmt::Debug for CardParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CardParameters")
            .field("number", &self.number.as_deref().map(crate::mask::mask_number))
            .field("expiry", &self.expiry)
            .field("cvc", &self.cvc.as_deref().map(crate::mask::mask_cvc))
            .field("postal_code", &self.postal_code)
            .finish()
    }
}

impl Drop for CardParameters {
    fn drop(&mut self) {
        self.clear_all();
    }
}

pub(crate) fn wipe(slot: &mut Option<String>) {
    if let Some(mut value) = slot.take() {
        value.zeroize();
    }
}
