//! # card_entry
//!
//! Formatting and validation state machine for a four-field credit card form:
//! number, expiry, security code and postal code.
//!
//! The crate has no UI of its own. A view layer forwards every proposed text
//! change to [`CardEntryController::on_edit`] and displays whatever text comes
//! back. The controller groups the number for the detected brand, inserts the
//! expiry slash, enforces length limits, validates fields once they are full,
//! and reports to three collaborators:
//!
//! - a [`ValidityObserver`] that learns when the card as a whole becomes valid
//!   or stops being valid, and how each field checked out
//! - a [`FocusAdvance`] that moves the cursor on once a field is valid
//! - a [`Tokenizer`] that exchanges complete card data for a token
//!
//! ## Quick Start
//!
//! ```rust
//! use card_entry::{CardEntryController, Edit, FieldKind, YearMonth};
//!
//! let mut entry = CardEntryController::builder()
//!     .reference_date(YearMonth::new(2026, 10).unwrap())
//!     .build();
//!
//! // Pasting into the number field regroups it for the brand
//! let shown = entry
//!     .on_edit(FieldKind::Number, &Edit::insert(0, "378282246310005"))
//!     .unwrap();
//! assert_eq!(shown, "3782 822463 10005");
//! assert_eq!(entry.brand(), card_entry::CardBrand::Amex);
//!
//! // Edits that would overflow a field are refused
//! assert!(entry.on_edit(FieldKind::Cvc, &Edit::insert(0, "12345")).is_err());
//! ```
//!
//! ## Tokenization
//!
//! Token requests are asynchronous. The [`Tokenizer`] receives a
//! [`TokenRequest`] carrying a [`TokenTicket`]; when the processor answers,
//! the host passes the ticket and result to
//! [`CardEntryController::complete_token`]. Input is locked in between.
//!
//! ```rust
//! use card_entry::{CardEntryController, Edit, FieldKind, Token, TokenOutcome, YearMonth};
//!
//! let mut entry = CardEntryController::builder()
//!     .reference_date(YearMonth::new(2026, 10).unwrap())
//!     .tokenizer(())
//!     .build();
//!
//! for (kind, text) in [
//!     (FieldKind::Number, "4242424242424242"),
//!     (FieldKind::Expiry, "1234"),
//!     (FieldKind::Cvc, "123"),
//!     (FieldKind::PostalCode, "94107"),
//! ] {
//!     entry.on_edit(kind, &Edit::insert(0, text)).unwrap();
//! }
//!
//! let ticket = entry.request_token().unwrap();
//! assert!(entry.is_busy());
//!
//! let outcome = entry.complete_token(ticket, Ok(Token::new("tok_4242"))).unwrap();
//! assert_eq!(outcome, TokenOutcome::Issued(Token::new("tok_4242")));
//! assert!(!entry.is_busy());
//! ```
//!
//! ## Supported Card Brands
//!
//! | Brand | Prefix | Digits | Grouping | CVC |
//! |-------|--------|--------|----------|-----|
//! | Visa | 4 | 16 | 4-4-4-4 | 3 |
//! | MasterCard | 51-55, 2221-2720 | 16 | 4-4-4-4 | 3 |
//! | American Express | 34, 37 | 15 | 4-6-5 | 4 |
//! | Discover | 6011, 644-649, 65 | 16 | 4-4-4-4 | 3 |
//!
//! Any other prefix is treated as an unknown brand with the 16-digit layout.
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `serde` | Serialize brands, field kinds, dates and [`EntryConfig`] |
//! | `cli` | The `cardentry` command-line simulator |
//!
//! ## Security
//!
//! - Field text, edits and card parameters are zeroized when replaced or dropped
//! - `Debug` output masks card numbers and never shows security codes
//! - Log events carry field names and lengths, never digits
//! - No unsafe code (`#![deny(unsafe_code)]`)

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod card;
pub mod controller;
pub mod delegate;
pub mod detect;
pub mod error;
pub mod expiry;
pub mod field;
pub mod format;
pub mod luhn;
pub mod mask;
pub mod validate;

// Re-export main types at crate root
pub use card::{CardBrand, CardParameters};
pub use controller::{CardEntryController, CardEntryControllerBuilder, EntryConfig};
pub use delegate::{
    FocusAdvance, Token, TokenOutcome, TokenRequest, TokenTicket, Tokenizer, ValidityObserver,
};
pub use error::{EntryError, FieldError, RejectedEdit, TokenizeError};
pub use expiry::{ExpiryDate, YearMonth};
pub use field::{FieldKind, FieldMap, FieldState, Validity};
pub use format::{apply_edit, Edit};
pub use validate::{validate, validate_at, FieldValue, Verdict};

#[cfg(test)]
mod tests {
    use super::*;

    fn oct_2026() -> YearMonth {
        YearMonth::new(2026, 10).unwrap()
    }

    #[test]
    fn test_pure_pipeline() {
        let text = apply_edit(
            FieldKind::Number,
            "",
            &Edit::insert(0, "4242424242424242"),
            CardBrand::Unknown,
        )
        .unwrap();
        assert_eq!(text, "4242 4242 4242 4242");
        assert!(validate_at(FieldKind::Number, &text, CardBrand::Visa, oct_2026()).is_valid());
    }

    #[test]
    fn test_paste_completes_fields() {
        let mut entry = CardEntryController::builder()
            .reference_date(oct_2026())
            .build();
        entry
            .on_edit(FieldKind::Number, &Edit::insert(0, "5555555555554444"))
            .unwrap();
        entry
            .on_edit(FieldKind::Expiry, &Edit::insert(0, "0930"))
            .unwrap();
        entry.on_edit(FieldKind::Cvc, &Edit::insert(0, "737")).unwrap();
        entry
            .on_edit(FieldKind::PostalCode, &Edit::insert(0, "10001"))
            .unwrap();

        assert!(entry.is_complete());
        assert_eq!(entry.brand(), CardBrand::MasterCard);
        assert_eq!(entry.params().last_four(), Some("4444"));
        assert_eq!(entry.params().exp_year(), Some(2030));
    }

    #[test]
    fn test_thread_safety() {
        // Data types are Send + Sync; the controller holds boxed collaborators
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CardParameters>();
        assert_send_sync::<CardBrand>();
        assert_send_sync::<FieldState>();
        assert_send_sync::<Edit>();
        assert_send_sync::<Verdict>();
        assert_send_sync::<EntryError>();
        assert_send_sync::<RejectedEdit>();
        assert_send_sync::<TokenRequest>();
    }
}
