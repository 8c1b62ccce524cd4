//! The card entry state machine.
//!
//! [`CardEntryController`] owns the four fields, sequences every edit through
//! the formatter and validator, keeps [`CardParameters`] in step with field
//! validity, and reports to its collaborators. Everything runs synchronously
//! on the caller's thread; the only asynchronous step is tokenization, which
//! is started here and finished by [`CardEntryController::complete_token`].
//!
//! # Example
//!
//! ```
//! use card_entry::{CardEntryController, Edit, FieldKind, Validity, YearMonth};
//!
//! let mut entry = CardEntryController::builder()
//!     .reference_date(YearMonth::new(2026, 10).unwrap())
//!     .build();
//!
//! for (kind, text) in [
//!     (FieldKind::Number, "4242424242424242"),
//!     (FieldKind::Expiry, "1234"),
//!     (FieldKind::Cvc, "123"),
//!     (FieldKind::PostalCode, "94107"),
//! ] {
//!     for c in text.chars() {
//!         let current = entry.display_text(kind).to_string();
//!         entry.on_edit(kind, &Edit::append(&current, c)).unwrap();
//!     }
//! }
//!
//! assert_eq!(entry.display_text(FieldKind::Number), "4242 4242 4242 4242");
//! assert_eq!(entry.field(FieldKind::Expiry).validity(), Validity::Valid);
//! assert!(entry.is_complete());
//! assert_eq!(entry.params().exp_year(), Some(2034));
//! ```

use std::fmt;
use tracing::{debug, info, warn};

use crate::delegate::{
    FocusAdvance, Token, TokenOutcome, TokenRequest, TokenTicket, Tokenizer, ValidityObserver,
};
use crate::detect::detect;
use crate::error::{EntryError, RejectedEdit, TokenizeError};
use crate::expiry::YearMonth;
use crate::field::{FieldMap, FieldState};
use crate::format::{self, Edit};
use crate::mask::mask_number;
use crate::validate::{self, Verdict};
use crate::{CardBrand, CardParameters, FieldKind, Validity};

/// Behaviour switches for a controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EntryConfig {
    /// Request a token as soon as all four fields become valid.
    pub auto_generate_token: bool,
    /// Ask the focus collaborator to move on when a field becomes valid.
    pub advance_focus: bool,
    /// Month to check expiry against; the local current month when `None`.
    pub reference_date: Option<YearMonth>,
}

impl Default for EntryConfig {
    fn default() -> Self {
        Self {
            auto_generate_token: false,
            advance_focus: true,
            reference_date: None,
        }
    }
}

/// Builder for [`CardEntryController`].
pub struct CardEntryControllerBuilder {
    config: EntryConfig,
    observer: Box<dyn ValidityObserver>,
    focus: Box<dyn FocusAdvance>,
    tokenizer: Option<Box<dyn Tokenizer>>,
}

impl CardEntryControllerBuilder {
    fn new() -> Self {
        Self {
            config: EntryConfig::default(),
            observer: Box::new(()),
            focus: Box::new(()),
            tokenizer: None,
        }
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: EntryConfig) -> Self {
        self.config = config;
        self
    }

    /// See [`EntryConfig::auto_generate_token`].
    pub fn auto_generate_token(mut self, enabled: bool) -> Self {
        self.config.auto_generate_token = enabled;
        self
    }

    /// See [`EntryConfig::advance_focus`].
    pub fn advance_focus(mut self, enabled: bool) -> Self {
        self.config.advance_focus = enabled;
        self
    }

    /// See [`EntryConfig::reference_date`].
    pub fn reference_date(mut self, today: YearMonth) -> Self {
        self.config.reference_date = Some(today);
        self
    }

    /// Sets the validity observer.
    pub fn observer(mut self, observer: impl ValidityObserver + 'static) -> Self {
        self.observer = Box::new(observer);
        self
    }

    /// Sets the focus collaborator.
    pub fn focus(mut self, focus: impl FocusAdvance + 'static) -> Self {
        self.focus = Box::new(focus);
        self
    }

    /// Sets the tokenizer. Without one, no tokens are ever requested.
    pub fn tokenizer(mut self, tokenizer: impl Tokenizer + 'static) -> Self {
        self.tokenizer = Some(Box::new(tokenizer));
        self
    }

    /// Creates the controller with all fields empty.
    pub fn build(self) -> CardEntryController {
        CardEntryController {
            config: self.config,
            fields: FieldMap::from_fn(FieldState::new),
            brand: CardBrand::Unknown,
            params: CardParameters::new(),
            complete: false,
            pending: None,
            generation: 0,
            last_ticket: 0,
            observer: self.observer,
            focus: self.focus,
            tokenizer: self.tokenizer,
        }
    }
}

/// State machine behind a four-field card entry widget.
pub struct CardEntryController {
    config: EntryConfig,
    fields: FieldMap<FieldState>,
    brand: CardBrand,
    params: CardParameters,
    complete: bool,
    pending: Option<TokenTicket>,
    generation: u64,
    last_ticket: u64,
    observer: Box<dyn ValidityObserver>,
    focus: Box<dyn FocusAdvance>,
    tokenizer: Option<Box<dyn Tokenizer>>,
}

impl CardEntryController {
    /// Starts building a controller.
    pub fn builder() -> CardEntryControllerBuilder {
        CardEntryControllerBuilder::new()
    }

    /// Controller with default configuration and no collaborators.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Applies one edit to a field.
    ///
    /// On success returns the field's new display text, which the UI should
    /// show instead of applying the edit itself. The field's parameter
    /// component is cleared and observers are told the card is not valid
    /// before anything is re-checked. Once the field is full it is validated
    /// immediately, as by [`on_edit_complete`](Self::on_edit_complete).
    ///
    /// # Errors
    ///
    /// Any [`RejectedEdit`]. The field is left untouched.
    pub fn on_edit(&mut self, kind: FieldKind, edit: &Edit) -> Result<&str, RejectedEdit> {
        if self.pending.is_some() {
            debug!(field = %kind, "edit rejected while token request is pending");
            return Err(RejectedEdit::Busy);
        }

        let text = match format::apply_edit(kind, self.fields[kind].display_text(), edit, self.brand)
        {
            Ok(text) => text,
            Err(e) => {
                debug!(field = %kind, error = %e, "edit rejected");
                return Err(e);
            }
        };

        self.params.clear(kind);
        self.fields[kind].set_display(text);
        self.complete = false;
        self.observer.on_validity_changed(&self.params, false);
        debug!(field = %kind, len = self.fields[kind].len(), "edit accepted");

        if kind == FieldKind::Number {
            self.update_brand();
        }
        if self.fields[kind].len() == kind.max_len(self.brand) {
            self.check_field(kind, true);
        }

        Ok(self.fields[kind].display_text())
    }

    /// Validates a field now.
    ///
    /// [`on_edit`](Self::on_edit) already does this when a field fills up;
    /// call it directly when the user submits a shorter field, such as a
    /// short postal code.
    pub fn on_edit_complete(&mut self, kind: FieldKind) -> Validity {
        self.check_field(kind, true)
    }

    /// Empties one field.
    pub fn clear_field(&mut self, kind: FieldKind) -> Result<(), RejectedEdit> {
        let edit = Edit::replace_all(self.fields[kind].display_text(), "");
        self.on_edit(kind, &edit).map(|_| ())
    }

    /// Empties every field and forgets all card data.
    ///
    /// A token request still in flight keeps input locked until it
    /// completes, but its result will be reported as
    /// [`TokenOutcome::Stale`].
    pub fn reset(&mut self) {
        self.params.clear_all();
        self.brand = CardBrand::Unknown;
        self.complete = false;
        self.generation += 1;
        info!(generation = self.generation, "card entry reset");

        for kind in FieldKind::ALL {
            let previous = self.fields[kind].validity();
            self.fields[kind].clear();
            if previous != Validity::Incomplete {
                self.observer.on_field_status(kind, Validity::Incomplete);
            }
        }
        self.observer.on_validity_changed(&self.params, false);
    }

    /// Requests a token for the current card data (manual mode).
    ///
    /// # Errors
    ///
    /// [`EntryError::Busy`] while another request is in flight,
    /// [`EntryError::NoTokenizer`] without a tokenizer, and
    /// [`EntryError::Incomplete`] unless every field is valid.
    pub fn request_token(&mut self) -> Result<TokenTicket, EntryError> {
        if self.pending.is_some() {
            return Err(EntryError::Busy);
        }
        if self.tokenizer.is_none() {
            return Err(EntryError::NoTokenizer);
        }
        if !self.params.is_complete() {
            return Err(EntryError::Incomplete);
        }
        self.start_token_request()
    }

    /// Reports the result of a token request and unlocks input.
    ///
    /// Collaborator errors come back unchanged as [`EntryError::Tokenize`];
    /// nothing is retried.
    ///
    /// # Errors
    ///
    /// [`EntryError::NoPendingRequest`] if `ticket` is not the request in
    /// flight, [`EntryError::Tokenize`] if the request failed.
    pub fn complete_token(
        &mut self,
        ticket: TokenTicket,
        result: Result<Token, TokenizeError>,
    ) -> Result<TokenOutcome, EntryError> {
        if self.pending != Some(ticket) {
            warn!(ticket = ticket.id, "completion for a token request that is not in flight");
            return Err(EntryError::NoPendingRequest);
        }
        self.pending = None;

        if ticket.generation != self.generation {
            warn!(ticket = ticket.id, "discarding token result issued before reset");
            return Ok(TokenOutcome::Stale);
        }

        match result {
            Ok(token) => {
                info!(ticket = ticket.id, "token issued");
                Ok(TokenOutcome::Issued(token))
            }
            Err(e) => {
                warn!(ticket = ticket.id, error = %e, "token request failed");
                Err(EntryError::Tokenize(e))
            }
        }
    }

    /// State of one field.
    #[inline]
    pub fn field(&self, kind: FieldKind) -> &FieldState {
        &self.fields[kind]
    }

    /// Text currently displayed in a field.
    #[inline]
    pub fn display_text(&self, kind: FieldKind) -> &str {
        self.fields[kind].display_text()
    }

    /// Brand detected from the number field.
    #[inline]
    pub fn brand(&self) -> CardBrand {
        self.brand
    }

    /// Card data from the fields that are currently valid.
    #[inline]
    pub fn params(&self) -> &CardParameters {
        &self.params
    }

    /// True while all four fields are valid.
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// True while a token request is in flight.
    #[inline]
    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    /// Active configuration.
    #[inline]
    pub fn config(&self) -> &EntryConfig {
        &self.config
    }

    fn today(&self) -> YearMonth {
        self.config.reference_date.unwrap_or_else(YearMonth::current)
    }

    fn update_brand(&mut self) {
        let brand = detect(self.fields[FieldKind::Number].display_text());
        if brand == self.brand {
            return;
        }
        debug!(from = %self.brand, to = %brand, "card brand changed");
        self.brand = brand;

        // The CVC length depends on the brand
        let cvc = &self.fields[FieldKind::Cvc];
        if !cvc.is_empty() {
            if cvc.len() >= FieldKind::Cvc.max_len(brand) {
                self.check_field(FieldKind::Cvc, false);
            } else {
                self.params.clear(FieldKind::Cvc);
                self.fields[FieldKind::Cvc].set_validity(Validity::Incomplete);
                self.observer.on_field_status(FieldKind::Cvc, Validity::Incomplete);
            }
        }
    }

    fn check_field(&mut self, kind: FieldKind, advance: bool) -> Validity {
        let verdict = validate::validate_at(
            kind,
            self.fields[kind].display_text(),
            self.brand,
            self.today(),
        );
        let validity = verdict.validity();

        match verdict {
            Verdict::Valid(value) => self.params.store(value),
            Verdict::Invalid(e) => {
                debug!(field = %kind, reason = %e, "field invalid");
                self.params.clear(kind);
            }
            Verdict::Incomplete => self.params.clear(kind),
        }
        self.fields[kind].set_validity(validity);
        self.observer.on_field_status(kind, validity);

        if validity == Validity::Valid && advance && self.config.advance_focus {
            let handled = self.focus.on_advance_focus(kind);
            debug!(field = %kind, handled, "focus advance requested");
        }

        self.check_aggregate();
        validity
    }

    fn check_aggregate(&mut self) {
        let complete = self.params.is_complete();
        if complete == self.complete {
            return;
        }
        self.complete = complete;
        info!(complete, brand = %self.brand, "card validity changed");
        self.observer.on_validity_changed(&self.params, complete);

        if complete && self.config.auto_generate_token && self.tokenizer.is_some() {
            if let Err(e) = self.start_token_request() {
                warn!(error = %e, "automatic token request not started");
            }
        }
    }

    fn start_token_request(&mut self) -> Result<TokenTicket, EntryError> {
        if self.pending.is_some() {
            return Err(EntryError::Busy);
        }
        self.last_ticket += 1;
        let ticket = TokenTicket {
            id: self.last_ticket,
            generation: self.generation,
        };
        let request = TokenRequest {
            ticket,
            params: self.params.clone(),
        };

        let tokenizer = self.tokenizer.as_mut().ok_or(EntryError::NoTokenizer)?;
        info!(
            ticket = ticket.id,
            card = %mask_number(request.params.number().unwrap_or_default()),
            "requesting token"
        );
        self.pending = Some(ticket);
        tokenizer.request_token(request);
        Ok(ticket)
    }
}

impl Default for CardEntryController {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CardEntryController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CardEntryController")
            .field("config", &self.config)
            .field("brand", &self.brand)
            .field("fields", &self.fields)
            .field("params", &self.params)
            .field("complete", &self.complete)
            .field("pending", &self.pending)
            .finish_non_exhaustive()
    }
}
