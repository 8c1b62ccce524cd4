//! Collaborator interfaces the controller reports to.
//!
//! The controller never draws anything or talks to a payment processor. It
//! tells a UI adapter about validity and focus changes, and hands complete
//! card data to a tokenizer. `()` implements every trait here as a no-op.

use std::fmt;

use crate::{CardParameters, FieldKind, Validity};

/// Receives validity notifications.
pub trait ValidityObserver {
    /// Called on every accepted edit with `valid = false`, and once with
    /// `valid = true` each time all four fields become valid.
    fn on_validity_changed(&mut self, params: &CardParameters, valid: bool);

    /// Called after a field is checked so the UI can color it: neutral for
    /// `Incomplete`, error colors for `Invalid`.
    fn on_field_status(&mut self, kind: FieldKind, validity: Validity) {
        let _ = (kind, validity);
    }
}

/// Moves input focus between fields.
pub trait FocusAdvance {
    /// `from` just became valid. Focus should move to `from.next()`, or be
    /// resigned when that is `None`. Returns whether the request was handled.
    fn on_advance_focus(&mut self, from: FieldKind) -> bool;
}

/// Exchanges card data for a token.
pub trait Tokenizer {
    /// Starts a token request and returns immediately.
    ///
    /// The implementation must eventually report the result exactly once
    /// through [`CardEntryController::complete_token`] with the request's
    /// ticket. Input stays locked until it does.
    ///
    /// [`CardEntryController::complete_token`]: crate::CardEntryController::complete_token
    fn request_token(&mut self, request: TokenRequest);
}

impl ValidityObserver for () {
    fn on_validity_changed(&mut self, _params: &CardParameters, _valid: bool) {}
}

impl FocusAdvance for () {
    fn on_advance_focus(&mut self, _from: FieldKind) -> bool {
        false
    }
}

impl Tokenizer for () {
    fn request_token(&mut self, _request: TokenRequest) {}
}

/// Identifies one token request.
///
/// Carries the controller generation it was issued in, so a result that
/// arrives after a reset can be recognised and dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TokenTicket {
    pub(crate) id: u64,
    pub(crate) generation: u64,
}

impl TokenTicket {
    /// Sequence number of the request.
    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }
}

/// What the tokenizer receives.
#[derive(Debug, Clone)]
pub struct TokenRequest {
    /// Pass back to `complete_token`.
    pub ticket: TokenTicket,
    /// Snapshot of the complete card data.
    pub params: CardParameters,
}

/// An opaque token issued for the card.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token(String);

impl Token {
    /// Wraps a token string from the processor.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The token string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Result of reporting a token completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenOutcome {
    /// The request succeeded for the current card data.
    Issued(Token),
    /// The controller was reset after the request went out; the result was
    /// discarded.
    Stale,
}
