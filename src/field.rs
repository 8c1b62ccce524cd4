//! The four entry fields and their per-field state.

use std::fmt;
use std::ops::{Index, IndexMut};
use zeroize::Zeroize;

use crate::CardBrand;

/// One of the four text fields of the entry widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum FieldKind {
    /// Card number, displayed in space separated groups.
    Number,
    /// Expiry date, displayed as `MM/YY`.
    Expiry,
    /// Card security code.
    Cvc,
    /// Billing postal code.
    PostalCode,
}

impl FieldKind {
    /// All fields in focus order.
    pub const ALL: [FieldKind; 4] = [
        FieldKind::Number,
        FieldKind::Expiry,
        FieldKind::Cvc,
        FieldKind::PostalCode,
    ];

    /// The field focus moves to once this one is valid.
    ///
    /// `None` for the postal code: completing it resigns focus.
    #[inline]
    pub const fn next(&self) -> Option<FieldKind> {
        match self {
            Self::Number => Some(Self::Expiry),
            Self::Expiry => Some(Self::Cvc),
            Self::Cvc => Some(Self::PostalCode),
            Self::PostalCode => None,
        }
    }

    /// Maximum display length of this field for `brand`.
    #[inline]
    pub const fn max_len(&self, brand: CardBrand) -> usize {
        match self {
            Self::Number => brand.number_max_len(),
            Self::Expiry => 5,
            Self::Cvc => brand.cvc_len(),
            Self::PostalCode => 5,
        }
    }

    /// Separator character the formatter inserts, if any.
    #[inline]
    pub const fn separator(&self) -> Option<char> {
        match self {
            Self::Number => Some(' '),
            Self::Expiry => Some('/'),
            Self::Cvc | Self::PostalCode => None,
        }
    }

    #[inline]
    const fn index(&self) -> usize {
        match self {
            Self::Number => 0,
            Self::Expiry => 1,
            Self::Cvc => 2,
            Self::PostalCode => 3,
        }
    }

    /// Returns a human-readable name for the field.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Number => "number",
            Self::Expiry => "expiry",
            Self::Cvc => "cvc",
            Self::PostalCode => "postal code",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A value per field, indexed by [`FieldKind`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMap<T>([T; 4]);

impl<T> FieldMap<T> {
    /// Builds a map by calling `f` for every field.
    pub fn from_fn(mut f: impl FnMut(FieldKind) -> T) -> Self {
        Self(FieldKind::ALL.map(&mut f))
    }

    /// Iterates fields in focus order.
    pub fn iter(&self) -> impl Iterator<Item = (FieldKind, &T)> {
        FieldKind::ALL.into_iter().zip(self.0.iter())
    }
}

impl<T> Index<FieldKind> for FieldMap<T> {
    type Output = T;

    #[inline]
    fn index(&self, kind: FieldKind) -> &T {
        &self.0[kind.index()]
    }
}

impl<T> IndexMut<FieldKind> for FieldMap<T> {
    #[inline]
    fn index_mut(&mut self, kind: FieldKind) -> &mut T {
        &mut self.0[kind.index()]
    }
}

/// Validation state of a single field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Validity {
    /// Not filled in yet, or edited since the last check. Neutral coloring.
    #[default]
    Incomplete,
    /// Filled in but rejected by the validator. Error coloring.
    Invalid,
    /// Filled in and accepted.
    Valid,
}

/// Text and validity of one field.
///
/// The display text is zeroed on drop and on [`FieldState::clear`].
#[derive(Clone, PartialEq, Eq)]
pub struct FieldState {
    kind: FieldKind,
    display: String,
    validity: Validity,
}

impl FieldState {
    /// Creates an empty field.
    pub fn new(kind: FieldKind) -> Self {
        Self {
            kind,
            display: String::new(),
            validity: Validity::Incomplete,
        }
    }

    /// Which field this is.
    #[inline]
    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    /// Text shown to the user, separators included.
    #[inline]
    pub fn display_text(&self) -> &str {
        &self.display
    }

    /// Display length in characters.
    #[inline]
    pub fn len(&self) -> usize {
        self.display.chars().count()
    }

    /// True when nothing has been entered.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.display.is_empty()
    }

    /// Display text with the field's separators removed.
    pub fn raw_value(&self) -> String {
        crate::format::strip_separators(self.kind, &self.display)
    }

    /// Current validation state.
    #[inline]
    pub fn validity(&self) -> Validity {
        self.validity
    }

    pub(crate) fn set_display(&mut self, text: String) {
        self.display.zeroize();
        self.display = text;
        self.validity = Validity::Incomplete;
    }

    pub(crate) fn set_validity(&mut self, validity: Validity) {
        self.validity = validity;
    }

    pub(crate) fn clear(&mut self) {
        self.set_display(String::new());
    }
}

impl fmt::Debug for FieldState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Length only; the text may be a card number
        f.debug_struct("FieldState")
            .field("kind", &self.kind)
            .field("len", &self.len())
            .field("validity", &self.validity)
            .finish()
    }
}

impl Drop for FieldState {
    fn drop(&mut self) {
        self.display.zeroize();
    }
}
