// src/data/datekey.rs

//! Implements [`DateKey`], the fixed-width comparable date prefix of a
//! log line, e.g. `"2024-12-02"`.
//!
//! A `DateKey` compares byte-wise which, for ISO-8601 dates, matches
//! chronological order. That lexicographic ordering is the predicate the
//! binary search in [`RangeLocator`] relies upon.
//!
//! [`DateKey`]: self::DateKey
//! [`RangeLocator`]: crate::readers::rangelocator::RangeLocator

use crate::common::{ExtractError, FileOffset, Result};

use std::fmt;

use ::chrono::NaiveDate;
#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// DateKey
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Number of bytes of the date prefix at the start of every log line;
/// `"YYYY-MM-DD"` is ten bytes.
pub const DATE_KEY_SZ: usize = 10;

/// `chrono` format string matching a [`DateKey`] in text form.
pub const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

/// The first [`DATE_KEY_SZ`] bytes of a log line, stored verbatim.
///
/// Ordering is derived byte-wise (`[u8; 10]`), which for the fixed-width
/// `YYYY-MM-DD` shape is chronological ordering.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateKey([u8; DATE_KEY_SZ]);

impl DateKey {
    /// Create a `DateKey` from the user-passed target date string.
    ///
    /// Validates strictly: exactly [`DATE_KEY_SZ`] bytes and a real
    /// calendar date according to [`NaiveDate::parse_from_str`]
    /// (`"2024-02-30"` is rejected, so is `"2024-1-2"`).
    pub fn from_target(target: &str) -> Result<DateKey> {
        defñ!("({:?})", target);
        if target.len() != DATE_KEY_SZ
            || NaiveDate::parse_from_str(target, DATE_KEY_FORMAT).is_err()
        {
            return Err(ExtractError::InvalidTargetDate {
                found: String::from(target),
            });
        }
        let mut key = [0u8; DATE_KEY_SZ];
        key.copy_from_slice(target.as_bytes());

        Ok(DateKey(key))
    }

    /// Create a `DateKey` from the leading bytes of a log line beginning at
    /// file offset `offset` (the offset is only carried for error context).
    ///
    /// Validates shape, not calendar correctness: ASCII digits with `-` at
    /// positions 4 and 7. A probe only needs a comparable key; rejecting
    /// month `13` here would not make the sortedness invariant any truer.
    pub fn from_line_prefix(
        prefix: &[u8; DATE_KEY_SZ],
        offset: FileOffset,
    ) -> Result<DateKey> {
        for (index, byte) in prefix.iter().enumerate() {
            let ok = match index {
                4 | 7 => *byte == b'-',
                _ => byte.is_ascii_digit(),
            };
            if !ok {
                return Err(ExtractError::InvalidDateFormat {
                    offset,
                    found: String::from_utf8_lossy(prefix).into_owned(),
                });
            }
        }

        Ok(DateKey(*prefix))
    }

    /// The key bytes verbatim.
    pub const fn as_bytes(&self) -> &[u8; DATE_KEY_SZ] {
        &self.0
    }
}

impl fmt::Display for DateKey {
    fn fmt(
        &self,
        f: &mut fmt::Formatter,
    ) -> fmt::Result {
        // the constructors only accept ASCII digits and dashes
        for byte in self.0.iter() {
            write!(f, "{}", *byte as char)?;
        }

        Ok(())
    }
}

impl fmt::Debug for DateKey {
    fn fmt(
        &self,
        f: &mut fmt::Formatter,
    ) -> fmt::Result {
        write!(f, "DateKey({})", self)
    }
}
