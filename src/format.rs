//! Edit formatting for the entry fields.
//!
//! [`apply_edit`] takes the text currently displayed in a field and one edit
//! (a character range plus replacement text, the way text inputs report
//! changes) and returns the text the field should display afterwards, or
//! rejects the edit. It never touches any state.
//!
//! # Format Conventions
//!
//! - **Number**: `XXXX XXXX XXXX XXXX`, American Express `XXXX XXXXXX XXXXX`
//! - **Expiry**: `MM/YY`, the slash appears once a third digit is typed
//! - **CVC**, **postal code**: kept exactly as typed
//!
//! # Example
//!
//! ```
//! use card_entry::format::{apply_edit, Edit};
//! use card_entry::{CardBrand, FieldKind};
//!
//! // Typing the fifth digit opens a new group
//! let text = apply_edit(FieldKind::Number, "4242", &Edit::append("4242", "4"), CardBrand::Visa).unwrap();
//! assert_eq!(text, "4242 4");
//!
//! // Backspace removes the digit and the separator in front of it
//! let text = apply_edit(FieldKind::Number, "4242 4", &Edit::backspace("4242 4"), CardBrand::Visa).unwrap();
//! assert_eq!(text, "4242");
//! ```

use std::fmt;
use std::ops::Range;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::detect::detect;
use crate::error::RejectedEdit;
use crate::{CardBrand, FieldKind};

/// A single change to a field: replace the characters in `range` with
/// `replacement`.
///
/// Ranges count characters, not bytes. Insertion is an empty range, deletion
/// an empty replacement, paste either of the two.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Edit {
    /// Characters of the current text being replaced.
    #[zeroize(skip)]
    pub range: Range<usize>,
    /// Text inserted in their place.
    pub replacement: String,
}

impl Edit {
    /// Replaces `range` with `replacement`.
    pub fn new(range: Range<usize>, replacement: impl Into<String>) -> Self {
        Self {
            range,
            replacement: replacement.into(),
        }
    }

    /// Inserts `text` before character `at`.
    pub fn insert(at: usize, text: impl Into<String>) -> Self {
        Self::new(at..at, text)
    }

    /// Deletes the characters in `range`.
    pub fn delete(range: Range<usize>) -> Self {
        Self::new(range, String::new())
    }

    /// Appends `text` to the end of `current`.
    pub fn append(current: &str, text: impl Into<String>) -> Self {
        Self::insert(current.chars().count(), text)
    }

    /// Deletes the last character of `current` (nothing if it is empty).
    pub fn backspace(current: &str) -> Self {
        let len = current.chars().count();
        Self::delete(len.saturating_sub(1)..len)
    }

    /// Replaces all of `current` with `text`.
    pub fn replace_all(current: &str, text: impl Into<String>) -> Self {
        Self::new(0..current.chars().count(), text)
    }
}

impl fmt::Debug for Edit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Edit")
            .field("range", &self.range)
            .field("replacement_len", &self.replacement.chars().count())
            .finish()
    }
}

/// Applies `edit` to the text displayed in a `kind` field.
///
/// Returns the complete new display text. Rejected edits leave the field as
/// it was; the caller simply does not apply them.
///
/// `brand` is the brand currently detected from the number field and sets
/// the CVC length. For the number field itself the brand is recomputed from
/// the edited digits, since the grouping depends on it.
///
/// # Errors
///
/// - [`RejectedEdit::RangeOutOfBounds`] if `edit.range` is reversed or runs
///   past the end of `current`
/// - [`RejectedEdit::InvalidCharacter`] if the number or expiry replacement
///   holds anything but digits and the field's separator
/// - [`RejectedEdit::TooLong`] if the result exceeds the field's maximum
///   display length
pub fn apply_edit(
    kind: FieldKind,
    current: &str,
    edit: &Edit,
    brand: CardBrand,
) -> Result<String, RejectedEdit> {
    let len = current.chars().count();
    if edit.range.start > edit.range.end || edit.range.end > len {
        return Err(RejectedEdit::RangeOutOfBounds {
            start: edit.range.start,
            end: edit.range.end,
            len,
        });
    }

    match kind {
        FieldKind::Number => {
            let digits = edited_digits(kind, current, edit)?;
            let brand = detect(&digits);
            let text = group_number(&digits, brand);
            check_len(kind, &text, brand.number_max_len())?;
            Ok(text)
        }
        FieldKind::Expiry => {
            let digits = edited_digits(kind, current, edit)?;
            let text = group_expiry(&digits);
            check_len(kind, &text, kind.max_len(brand))?;
            Ok(text)
        }
        FieldKind::Cvc | FieldKind::PostalCode => {
            let text = splice(current, edit);
            check_len(kind, &text, kind.max_len(brand))?;
            Ok(text)
        }
    }
}

/// Groups card number digits with spaces using the layout of `brand`.
///
/// Non-digit characters in `digits` are ignored, so this also normalizes
/// already formatted text. No trailing separator is ever produced.
///
/// ```
/// use card_entry::format::group_number;
/// use card_entry::CardBrand;
///
/// assert_eq!(group_number("4242424242424242", CardBrand::Visa), "4242 4242 4242 4242");
/// assert_eq!(group_number("378282246310005", CardBrand::Amex), "3782 822463 10005");
/// assert_eq!(group_number("42424", CardBrand::Visa), "4242 4");
/// ```
pub fn group_number(digits: &str, brand: CardBrand) -> String {
    let positions = brand.separator_positions();
    let mut out = String::with_capacity(digits.len() + positions.len());
    for c in digits.chars().filter(char::is_ascii_digit) {
        if positions.contains(&out.len()) {
            out.push(' ');
        }
        out.push(c);
    }
    out
}

/// Formats up to four expiry digits as `MM/YY`.
fn group_expiry(digits: &str) -> String {
    if digits.len() > 2 {
        format!("{}/{}", &digits[..2], &digits[2..])
    } else {
        digits.to_string()
    }
}

/// Removes the separators the formatter inserts for `kind`.
///
/// ```
/// use card_entry::format::strip_separators;
/// use card_entry::FieldKind;
///
/// assert_eq!(strip_separators(FieldKind::Number, "4242 4242"), "42424242");
/// assert_eq!(strip_separators(FieldKind::Expiry, "12/34"), "1234");
/// assert_eq!(strip_separators(FieldKind::PostalCode, "SW1A 1"), "SW1A 1");
/// ```
pub fn strip_separators(kind: FieldKind, text: &str) -> String {
    match kind.separator() {
        Some(sep) => text.chars().filter(|&c| c != sep).collect(),
        None => text.to_string(),
    }
}

/// Plain character splice of `edit` into `current`. Range must be valid.
fn splice(current: &str, edit: &Edit) -> String {
    let mut out = String::with_capacity(current.len() + edit.replacement.len());
    let mut chars = current.chars();
    out.extend(chars.by_ref().take(edit.range.start));
    out.push_str(&edit.replacement);
    out.extend(chars.skip(edit.range.end - edit.range.start));
    out
}

/// Digits of a separated field after `edit`.
///
/// A deletion that removes only separators also removes the digit in front
/// of them, so one backspace always costs the user exactly one digit.
fn edited_digits(kind: FieldKind, current: &str, edit: &Edit) -> Result<String, RejectedEdit> {
    let separator = kind.separator();
    for (position, character) in edit.replacement.chars().enumerate() {
        if !character.is_ascii_digit() && Some(character) != separator {
            return Err(RejectedEdit::InvalidCharacter {
                kind,
                position,
                character,
            });
        }
    }

    let chars: Vec<char> = current.chars().collect();
    let Range { mut start, end } = edit.range;
    let removed = &chars[start..end];
    if edit.replacement.is_empty()
        && !removed.is_empty()
        && !removed.iter().any(char::is_ascii_digit)
    {
        if let Some(previous) = chars[..start].iter().rposition(char::is_ascii_digit) {
            start = previous;
        }
    }

    let mut digits = String::with_capacity(chars.len() + edit.replacement.len());
    digits.extend(chars[..start].iter().filter(|c| c.is_ascii_digit()));
    digits.extend(edit.replacement.chars().filter(char::is_ascii_digit));
    digits.extend(chars[end..].iter().filter(|c| c.is_ascii_digit()));
    Ok(digits)
}

fn check_len(kind: FieldKind, text: &str, maximum: usize) -> Result<(), RejectedEdit> {
    let length = text.chars().count();
    if length > maximum {
        return Err(RejectedEdit::TooLong {
            kind,
            length,
            maximum,
        });
    }
    Ok(())
}
