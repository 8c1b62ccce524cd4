//! Expiry dates as typed into the `MM/YY` field.
//!
//! Two-digit years are resolved to the century that puts them closest to the
//! reference month, so `34` is 2034 and `99` is 1999 when checked in 2026.
//!
//! # Example
//!
//! ```
//! use card_entry::expiry::{parse_expiry, YearMonth};
//!
//! let today = YearMonth::new(2026, 10).unwrap();
//! let expiry = parse_expiry("12/34", today).unwrap();
//! assert_eq!(expiry.month(), 12);
//! assert_eq!(expiry.year(), 2034);
//! assert!(!expiry.is_expired_at(today));
//!
//! let expiry = parse_expiry("01/99", today).unwrap();
//! assert_eq!(expiry.year(), 1999);
//! assert!(expiry.is_expired_at(today));
//! ```

use chrono::{Datelike, Local};
use std::fmt;

use crate::error::FieldError;

/// Latest year the system clock is trusted to report.
const MAX_YEAR: i32 = 9999;

/// A calendar month, used as "today" when checking expiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct YearMonth {
    year: u16,
    month: u8,
}

impl YearMonth {
    /// Creates a year/month pair. Returns `None` unless month is 1-12.
    pub fn new(year: u16, month: u8) -> Option<Self> {
        if !(1..=12).contains(&month) {
            return None;
        }
        Some(Self { year, month })
    }

    /// The current month in local time.
    pub fn current() -> Self {
        let now = Local::now();
        Self {
            year: now.year().clamp(0, MAX_YEAR) as u16,
            month: now.month() as u8,
        }
    }

    /// Four-digit year.
    #[inline]
    pub const fn year(&self) -> u16 {
        self.year
    }

    /// Month (1-12).
    #[inline]
    pub const fn month(&self) -> u8 {
        self.month
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// A card expiry month. The card is usable through the end of that month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExpiryDate {
    month: u8,
    year: u16,
}

impl ExpiryDate {
    /// Creates a new expiry date.
    ///
    /// Returns `None` if the month is invalid (not 1-12).
    pub fn new(month: u8, year: u16) -> Option<Self> {
        if !(1..=12).contains(&month) {
            return None;
        }
        Some(Self { month, year })
    }

    /// Returns the month (1-12).
    #[inline]
    pub const fn month(&self) -> u8 {
        self.month
    }

    /// Returns the four-digit year.
    #[inline]
    pub const fn year(&self) -> u16 {
        self.year
    }

    /// True if the card expired before `today`'s month.
    pub fn is_expired_at(&self, today: YearMonth) -> bool {
        (self.year, self.month) < (today.year, today.month)
    }

    /// True if the card has expired as of the current local month.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(YearMonth::current())
    }
}

impl fmt::Display for ExpiryDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}/{:02}", self.month, self.year % 100)
    }
}

/// Parses a complete `MM/YY` field, resolving the year against `today`.
///
/// Does not check whether the date has passed; see
/// [`ExpiryDate::is_expired_at`].
///
/// # Errors
///
/// [`FieldError::InvalidFormat`] unless the text is exactly two digits, a
/// slash, and two digits; [`FieldError::InvalidMonth`] for months outside
/// 1-12.
pub fn parse_expiry(text: &str, today: YearMonth) -> Result<ExpiryDate, FieldError> {
    let bytes = text.as_bytes();
    let well_formed = bytes.len() == 5
        && bytes[2] == b'/'
        && [0, 1, 3, 4].iter().all(|&i| bytes[i].is_ascii_digit());
    if !well_formed {
        return Err(FieldError::InvalidFormat);
    }

    let month = (bytes[0] - b'0') * 10 + (bytes[1] - b'0');
    if !(1..=12).contains(&month) {
        return Err(FieldError::InvalidMonth(month));
    }
    let yy = u16::from((bytes[3] - b'0') * 10 + (bytes[4] - b'0'));

    Ok(ExpiryDate {
        month,
        year: resolve_year(yy, today.year),
    })
}

/// Picks the century for a two-digit year so it lands within 50 years of
/// `current_year`.
fn resolve_year(yy: u16, current_year: u16) -> u16 {
    let current = i32::from(current_year);
    let mut year = current - current % 100 + i32::from(yy);
    if year > current + 50 {
        year -= 100;
    } else if year + 50 < current {
        year += 100;
    }
    year.clamp(0, i32::from(u16::MAX)) as u16
}
