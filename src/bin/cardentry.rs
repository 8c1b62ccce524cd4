//! Command-line simulator for the card entry controller.
//!
//! # Usage
//!
//! ```bash
//! # Type a whole card one keystroke at a time and tokenize it
//! cardentry simulate --number 4242424242424242 --expiry 1234 --cvc 123 --postal 94107
//!
//! # Same, with automatic tokenization and a fixed "today"
//! cardentry simulate -n 378282246310005 -e 0930 -c 1234 -p 10001 --auto-token --today 2026-10
//!
//! # Show how a field reformats while typing
//! cardentry format number 378282246310005
//!
//! # Detect the brand of a (partial) number
//! cardentry detect 5105
//! ```
//!
//! Logs go to stderr and are filtered with `RUST_LOG` (default `info`).

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use card_entry::mask::{mask_cvc, mask_number};
use card_entry::{
    apply_edit, detect, CardBrand, CardEntryController, CardParameters, Edit, EntryConfig,
    FieldKind, FocusAdvance, Token, TokenOutcome, TokenRequest, Tokenizer, Validity,
    ValidityObserver, YearMonth,
};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "cardentry")]
#[command(author, version, about = "Replay keystrokes into a card entry form")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Type a full card into the form and request a token
    Simulate {
        /// Card number keystrokes
        #[arg(short, long, default_value = "")]
        number: String,

        /// Expiry keystrokes (the slash is inserted automatically)
        #[arg(short, long, default_value = "")]
        expiry: String,

        /// Security code keystrokes
        #[arg(short, long, default_value = "")]
        cvc: String,

        /// Postal code keystrokes
        #[arg(short, long, default_value = "")]
        postal: String,

        /// JSON file with an entry configuration
        #[arg(long)]
        config: Option<PathBuf>,

        /// Request a token as soon as the card is valid
        #[arg(long)]
        auto_token: bool,

        /// Month to check expiry against (YYYY-MM)
        #[arg(long, value_parser = parse_year_month)]
        today: Option<YearMonth>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        output: OutputFormat,
    },

    /// Show a field's display text after each keystroke
    Format {
        /// Field to type into
        field: FieldArg,

        /// Keystrokes
        text: String,

        /// Card brand, for the security code length
        #[arg(short, long, default_value = "unknown")]
        brand: BrandArg,

        /// Output format
        #[arg(short, long, default_value = "text")]
        output: OutputFormat,
    },

    /// Detect card brand from a number
    Detect {
        /// Card number (or partial number)
        card_number: String,

        /// Output format
        #[arg(short, long, default_value = "text")]
        output: OutputFormat,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
enum FieldArg {
    Number,
    Expiry,
    Cvc,
    Postal,
}

impl From<FieldArg> for FieldKind {
    fn from(arg: FieldArg) -> Self {
        match arg {
            FieldArg::Number => FieldKind::Number,
            FieldArg::Expiry => FieldKind::Expiry,
            FieldArg::Cvc => FieldKind::Cvc,
            FieldArg::Postal => FieldKind::PostalCode,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum BrandArg {
    Visa,
    Mastercard,
    Amex,
    Discover,
    Unknown,
}

impl From<BrandArg> for CardBrand {
    fn from(arg: BrandArg) -> Self {
        match arg {
            BrandArg::Visa => CardBrand::Visa,
            BrandArg::Mastercard => CardBrand::MasterCard,
            BrandArg::Amex => CardBrand::Amex,
            BrandArg::Discover => CardBrand::Discover,
            BrandArg::Unknown => CardBrand::Unknown,
        }
    }
}

fn parse_year_month(s: &str) -> Result<YearMonth, String> {
    let (year, month) = s
        .split_once('-')
        .ok_or_else(|| format!("expected YYYY-MM, got {s:?}"))?;
    let year: u16 = year.parse().map_err(|e| format!("bad year: {e}"))?;
    let month: u8 = month.parse().map_err(|e| format!("bad month: {e}"))?;
    YearMonth::new(year, month).ok_or_else(|| format!("month {month} is not 1-12"))
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Simulate {
            number,
            expiry,
            cvc,
            postal,
            config,
            auto_token,
            today,
            output,
        } => {
            let mut config = match config {
                Some(path) => load_config(&path),
                None => EntryConfig::default(),
            };
            if auto_token {
                config.auto_generate_token = true;
            }
            if today.is_some() {
                config.reference_date = today;
            }
            let keystrokes = [
                (FieldKind::Number, number),
                (FieldKind::Expiry, expiry),
                (FieldKind::Cvc, cvc),
                (FieldKind::PostalCode, postal),
            ];
            cmd_simulate(config, &keystrokes, output);
        }
        Commands::Format {
            field,
            text,
            brand,
            output,
        } => {
            cmd_format(field.into(), &text, brand.into(), output);
        }
        Commands::Detect {
            card_number,
            output,
        } => {
            cmd_detect(&card_number, output);
        }
    }
}

fn load_config(path: &Path) -> EntryConfig {
    let parsed = std::fs::read_to_string(path)
        .map_err(|e| e.to_string())
        .and_then(|json| serde_json::from_str(&json).map_err(|e| e.to_string()));
    match parsed {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: cannot load config {}: {}", path.display(), e);
            std::process::exit(2);
        }
    }
}

// ============================================================================
// Collaborators
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum Event {
    Rejected {
        field: FieldKind,
        reason: String,
    },
    FieldStatus {
        field: FieldKind,
        validity: Validity,
    },
    Focus {
        from: FieldKind,
        to: Option<FieldKind>,
    },
    CardValidity {
        valid: bool,
    },
    TokenRequested {
        ticket: u64,
        card: String,
    },
    TokenIssued {
        token: String,
    },
    TokenFailed {
        reason: String,
    },
}

impl Event {
    fn describe(&self) -> String {
        match self {
            Event::Rejected { field, reason } => format!("{field}: rejected ({reason})"),
            Event::FieldStatus { field, validity } => format!("{field}: {validity:?}"),
            Event::Focus { from, to: Some(to) } => format!("focus: {from} -> {to}"),
            Event::Focus { from, to: None } => format!("focus: {from} -> done"),
            Event::CardValidity { valid } => format!("card valid: {valid}"),
            Event::TokenRequested { ticket, card } => {
                format!("token requested #{ticket} for {card}")
            }
            Event::TokenIssued { token } => format!("token issued: {token}"),
            Event::TokenFailed { reason } => format!("token failed: {reason}"),
        }
    }
}

/// Shared event log plus the token request waiting for a "processor" answer.
#[derive(Clone, Default)]
struct Session {
    events: Rc<RefCell<Vec<Event>>>,
    pending: Rc<RefCell<Option<TokenRequest>>>,
    last_validity: Rc<RefCell<Option<bool>>>,
}

impl Session {
    fn push(&self, event: Event) {
        self.events.borrow_mut().push(event);
    }
}

impl ValidityObserver for Session {
    fn on_validity_changed(&mut self, _params: &CardParameters, valid: bool) {
        // Every keystroke reports "not valid"; only log transitions
        let previous = self.last_validity.borrow_mut().replace(valid);
        if previous != Some(valid) {
            self.push(Event::CardValidity { valid });
        }
    }

    fn on_field_status(&mut self, field: FieldKind, validity: Validity) {
        self.push(Event::FieldStatus { field, validity });
    }
}

impl FocusAdvance for Session {
    fn on_advance_focus(&mut self, from: FieldKind) -> bool {
        self.push(Event::Focus {
            from,
            to: from.next(),
        });
        true
    }
}

impl Tokenizer for Session {
    fn request_token(&mut self, request: TokenRequest) {
        self.push(Event::TokenRequested {
            ticket: request.ticket.id(),
            card: mask_number(request.params.number().unwrap_or_default()),
        });
        *self.pending.borrow_mut() = Some(request);
    }
}

/// Answers a token request the way a test processor would.
fn issue_token(request: &TokenRequest) -> Token {
    Token::new(format!(
        "tok_{}_{}",
        request.params.brand().name().to_lowercase().replace(' ', "_"),
        request.params.last_four().unwrap_or("0000")
    ))
}

// ============================================================================
// Commands
// ============================================================================

#[derive(Serialize)]
struct FieldReport {
    field: FieldKind,
    display: String,
    validity: Validity,
}

#[derive(Serialize)]
struct SimulationReport {
    brand: CardBrand,
    complete: bool,
    fields: Vec<FieldReport>,
    token: Option<String>,
    events: Vec<Event>,
}

fn cmd_simulate(config: EntryConfig, keystrokes: &[(FieldKind, String)], output: OutputFormat) {
    let session = Session::default();
    let mut entry = CardEntryController::builder()
        .config(config)
        .observer(session.clone())
        .focus(session.clone())
        .tokenizer(session.clone())
        .build();

    for (kind, text) in keystrokes {
        for c in text.chars() {
            let edit = Edit::append(entry.display_text(*kind), c);
            if let Err(e) = entry.on_edit(*kind, &edit) {
                session.push(Event::Rejected {
                    field: *kind,
                    reason: e.to_string(),
                });
            }
        }
        // Submitting a field that did not fill up, e.g. a short postal code
        if !text.is_empty() && entry.field(*kind).validity() == Validity::Incomplete {
            entry.on_edit_complete(*kind);
        }
    }

    if entry.is_complete() && !entry.is_busy() {
        if let Err(e) = entry.request_token() {
            session.push(Event::TokenFailed {
                reason: e.to_string(),
            });
        }
    }

    let mut token = None;
    let pending = session.pending.borrow_mut().take();
    if let Some(request) = pending {
        match entry.complete_token(request.ticket, Ok(issue_token(&request))) {
            Ok(TokenOutcome::Issued(issued)) => {
                session.push(Event::TokenIssued {
                    token: issued.to_string(),
                });
                token = Some(issued.to_string());
            }
            Ok(TokenOutcome::Stale) => {}
            Err(e) => session.push(Event::TokenFailed {
                reason: e.to_string(),
            }),
        }
    }

    let fields = FieldKind::ALL
        .iter()
        .map(|&kind| {
            let state = entry.field(kind);
            let display = match kind {
                FieldKind::Number => mask_number(state.display_text()),
                FieldKind::Cvc => mask_cvc(state.display_text()),
                _ => state.display_text().to_string(),
            };
            FieldReport {
                field: kind,
                display,
                validity: state.validity(),
            }
        })
        .collect();

    let report = SimulationReport {
        brand: entry.brand(),
        complete: entry.is_complete(),
        fields,
        token,
        events: session.events.take(),
    };

    match output {
        OutputFormat::Text => {
            for event in &report.events {
                println!("{}", event.describe());
            }
            println!();
            println!("Brand: {}", report.brand.name());
            for field in &report.fields {
                println!("{:<12} {:<20} {:?}", field.field.name(), field.display, field.validity);
            }
            println!("Complete: {}", if report.complete { "yes" } else { "no" });
            if let Some(token) = &report.token {
                println!("Token: {}", token);
            }
        }
        OutputFormat::Json => print_json(&report),
    }

    let success = report.complete && report.token.is_some();
    std::process::exit(if success { 0 } else { 1 });
}

#[derive(Serialize)]
struct Keystroke {
    key: char,
    display: Option<String>,
    rejected: Option<String>,
}

fn cmd_format(kind: FieldKind, text: &str, brand: CardBrand, output: OutputFormat) {
    let mut display = String::new();
    let mut steps = Vec::new();

    for key in text.chars() {
        let current_brand = match kind {
            FieldKind::Number => detect::detect(&display),
            _ => brand,
        };
        match apply_edit(kind, &display, &Edit::append(&display, key), current_brand) {
            Ok(next) => {
                display = next;
                steps.push(Keystroke {
                    key,
                    display: Some(display.clone()),
                    rejected: None,
                });
            }
            Err(e) => steps.push(Keystroke {
                key,
                display: None,
                rejected: Some(e.to_string()),
            }),
        }
    }

    match output {
        OutputFormat::Text => {
            for step in &steps {
                match (&step.display, &step.rejected) {
                    (Some(shown), _) => println!("{:?} -> {:?}", step.key, shown),
                    (None, Some(reason)) => println!("{:?} rejected: {}", step.key, reason),
                    (None, None) => {}
                }
            }
        }
        OutputFormat::Json => print_json(&serde_json::json!({
            "field": kind,
            "display": display,
            "steps": steps,
        })),
    }
}

fn cmd_detect(card_number: &str, output: OutputFormat) {
    if !card_number.chars().any(|c| c.is_ascii_digit()) {
        eprintln!("Error: No digits provided");
        std::process::exit(1);
    }

    let brand = detect::detect(card_number);
    match output {
        OutputFormat::Text => {
            println!("Detected Brand: {}", brand.name());
            println!("Digits: {}", brand.number_digits());
            println!("Separators At: {:?}", brand.separator_positions());
            println!("CVC Length: {}", brand.cvc_len());
        }
        OutputFormat::Json => print_json(&serde_json::json!({
            "brand": brand,
            "name": brand.name(),
            "digits": brand.number_digits(),
            "separator_positions": brand.separator_positions(),
            "cvc_len": brand.cvc_len(),
        })),
    }
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
