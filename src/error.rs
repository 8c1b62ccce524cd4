//! Error types for card entry.
//!
//! None of these abort anything. A [`RejectedEdit`] means the UI should not
//! apply a keystroke, a [`FieldError`] explains why a field is shown in error
//! colors, and [`TokenizeError`] is whatever the tokenize collaborator
//! reported, passed through untouched inside [`EntryError`].

use std::fmt;

use crate::FieldKind;

/// Why an edit was refused. The field keeps its previous text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectedEdit {
    /// The edited text would be longer than the field allows.
    TooLong {
        /// The field being edited.
        kind: FieldKind,
        /// Display length the edit would have produced.
        length: usize,
        /// Maximum display length for the field and current brand.
        maximum: usize,
    },

    /// The replacement text contains a character the field never accepts.
    InvalidCharacter {
        /// The field being edited.
        kind: FieldKind,
        /// Position within the replacement text (0-indexed).
        position: usize,
        /// The offending character.
        character: char,
    },

    /// The edit range is reversed or extends past the current text.
    RangeOutOfBounds {
        /// Range start.
        start: usize,
        /// Range end.
        end: usize,
        /// Current text length in characters.
        len: usize,
    },

    /// A token request is in flight; input is locked until it completes.
    Busy,
}

impl fmt::Display for RejectedEdit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooLong {
                kind,
                length,
                maximum,
            } => write!(
                f,
                "{} would be {} characters long, maximum is {}",
                kind, length, maximum
            ),
            Self::InvalidCharacter {
                kind,
                position,
                character,
            } => write!(
                f,
                "invalid character '{}' at position {} for {}",
                character.escape_default(),
                position,
                kind
            ),
            Self::RangeOutOfBounds { start, end, len } => write!(
                f,
                "edit range {}..{} is outside text of length {}",
                start, end, len
            ),
            Self::Busy => write!(f, "input is locked while a token request is pending"),
        }
    }
}

impl std::error::Error for RejectedEdit {}

/// Why a filled-in field failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    /// A character that is not allowed in this field.
    InvalidCharacter {
        /// Position in the field text, separators stripped (0-indexed).
        position: usize,
        /// The offending character.
        character: char,
    },

    /// More characters than the brand allows.
    WrongLength {
        /// Actual length.
        length: usize,
        /// Expected length for the brand.
        expected: usize,
    },

    /// The Luhn checksum failed, usually a typo.
    InvalidChecksum,

    /// Expiry is not in `MM/YY` form.
    InvalidFormat,

    /// Expiry month outside 1-12.
    InvalidMonth(u8),

    /// The card expired before the current month.
    Expired {
        /// Expiry month.
        month: u8,
        /// Expiry year.
        year: u16,
    },
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCharacter {
                position,
                character,
            } => write!(
                f,
                "invalid character '{}' at position {}",
                character.escape_default(),
                position
            ),
            Self::WrongLength { length, expected } => {
                write!(f, "expected {} characters, got {}", expected, length)
            }
            Self::InvalidChecksum => {
                write!(f, "invalid checksum (Luhn check failed) - please verify the card number")
            }
            Self::InvalidFormat => write!(f, "invalid expiry format (expected MM/YY)"),
            Self::InvalidMonth(m) => write!(f, "invalid month {}: must be 1-12", m),
            Self::Expired { month, year } => write!(f, "card expired ({:02}/{})", month, year),
        }
    }
}

impl std::error::Error for FieldError {}

/// Failure reported by the tokenize collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenizeError {
    /// The request never got a usable answer (network, timeout, SDK fault).
    Transport(String),

    /// The processor answered and refused the card.
    Declined {
        /// Processor error code.
        code: String,
        /// Processor message.
        message: String,
    },
}

impl fmt::Display for TokenizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(msg) => write!(f, "tokenization failed: {}", msg),
            Self::Declined { code, message } => {
                write!(f, "card declined ({}): {}", code, message)
            }
        }
    }
}

impl std::error::Error for TokenizeError {}

/// Errors from controller operations outside plain editing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryError {
    /// A token request is already in flight.
    Busy,

    /// Not every field is valid yet.
    Incomplete,

    /// No tokenize collaborator was configured.
    NoTokenizer,

    /// The completion does not belong to the request in flight.
    NoPendingRequest,

    /// The tokenize collaborator failed; its error is passed through as is.
    Tokenize(TokenizeError),
}

impl fmt::Display for EntryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Busy => write!(f, "a token request is already in flight"),
            Self::Incomplete => write!(f, "card details are incomplete or invalid"),
            Self::NoTokenizer => write!(f, "no tokenizer configured"),
            Self::NoPendingRequest => write!(f, "no matching token request in flight"),
            Self::Tokenize(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for EntryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Tokenize(e) => Some(e),
            _ => None,
        }
    }
}

impl From<TokenizeError> for EntryError {
    fn from(e: TokenizeError) -> Self {
        Self::Tokenize(e)
    }
}
