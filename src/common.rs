// src/common.rs
//
// common imports, type aliases, constants, and the crate error type
// (avoids circular imports)

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// file-handling
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub use std::fs::File;
pub use std::path::Path;

use ::thiserror::Error;

/// `F`ake `Path` or `F`ile `Path`
pub type FPath = String;
pub type FileMetadata = std::fs::Metadata;
pub type FileOpenOptions = std::fs::OpenOptions;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// offsets, sizes, counts
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Offset into a file in bytes. Zero based.
pub type FileOffset = u64;

/// Size of a file in bytes.
pub type FileSz = u64;

/// A general-purpose counter.
pub type Count = u64;

/// Sequence of bytes.
pub type Bytes = Vec<u8>;

/// Single-byte newline as `char`.
#[allow(dead_code, non_upper_case_globals)]
pub const NLc: char = '\n';
/// Single-byte newline as `u8`.
#[allow(non_upper_case_globals)]
pub const NLu8: u8 = 10;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// the crate error type
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// All failures surfaced by the extraction engine.
///
/// Every variant carries enough context, path or byte offset, for a caller
/// to diagnose the failure. None are retried internally; all are structural
/// (bad input or bad file) rather than transient.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// File missing, unreadable, not a regular file, or an I/O failure
    /// mid-read. Fatal.
    #[error("file access failed for {path:?}: {source}")]
    FileAccess {
        path: FPath,
        #[source]
        source: std::io::Error,
    },

    /// The user-passed target date does not parse as a calendar date
    /// in `YYYY-MM-DD` form. Fatal; there is nothing to search for.
    #[error("invalid target date {found:?}; expected \"YYYY-MM-DD\"")]
    InvalidTargetDate { found: String },

    /// A line encountered during a binary-search probe does not begin with
    /// a `YYYY-MM-DD` shaped prefix. Propagated, never silently skipped.
    #[error("invalid date prefix {found:?} at file offset {offset}")]
    InvalidDateFormat { offset: FileOffset, found: String },

    /// No line terminator found within the allowed maximum line length.
    /// Signals file corruption or a wrong `--line-max` setting. Fatal.
    #[error("no line terminator within {max} bytes of file offset {offset}")]
    MalformedLine { offset: FileOffset, max: u64 },

    /// End-of-file reached mid-prefix. Only legitimate at the true file
    /// end; elsewhere indicates corruption.
    #[error(
        "truncated record at file offset {offset}; {remaining} bytes remain, need {need}"
    )]
    TruncatedRecord {
        offset: FileOffset,
        remaining: u64,
        need: u64,
    },

    /// Failed writing matched lines to the output sink.
    #[error("failed writing to the output sink: {0}")]
    SinkWrite(#[source] std::io::Error),

    /// The caller-provided interruption flag was observed set between
    /// chunk reads.
    #[error("interrupted at file offset {offset}")]
    Interrupted { offset: FileOffset },
}

impl ExtractError {
    /// Helper to wrap a [`std::io::Error`] with the offending path.
    pub fn from_io(path: &FPath, source: std::io::Error) -> ExtractError {
        ExtractError::FileAccess {
            path: path.clone(),
            source,
        }
    }
}

/// Crate-wide `Result` specialized to [`ExtractError`].
pub type Result<T> = std::result::Result<T, ExtractError>;
