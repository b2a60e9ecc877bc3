// src/readers/summary.rs

//! Implements [`Summary`], statistics about one completed extraction.
//!
//! [`Summary`]: self::Summary

use crate::common::{Count, FileSz};

use crate::readers::rangelocator::MatchRange;

use std::fmt;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Accumulated statistics about processing one file for one target date.
///
/// Returned by [`DateLogExtractor::extract`]; printed by the `sdle`
/// program for CLI option `--summary`.
///
/// [`DateLogExtractor::extract`]: crate::readers::extractor::DateLogExtractor#method.extract
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Summary {
    /// File size in bytes, snapshotted at open.
    pub filesz: FileSz,
    /// The located byte range of matching lines.
    pub range: MatchRange,
    /// Count of lines emitted to the sink.
    pub count_lines: Count,
    /// Count of bytes emitted to the sink; equals `range.len()`.
    pub count_bytes: Count,
    /// Count of chunks read from the file across both the locate and the
    /// stream phases (cache hits excluded).
    pub count_chunks_read: Count,
    /// Count of bytes read from the file (cache hits excluded).
    pub count_bytes_read: Count,
}

impl fmt::Display for Summary {
    fn fmt(
        &self,
        f: &mut fmt::Formatter,
    ) -> fmt::Result {
        writeln!(f, "file size      : {} bytes", self.filesz)?;
        writeln!(f, "match range    : {}", self.range)?;
        writeln!(f, "lines emitted  : {}", self.count_lines)?;
        writeln!(f, "bytes emitted  : {}", self.count_bytes)?;
        writeln!(f, "chunks read    : {}", self.count_chunks_read)?;
        write!(f, "bytes read     : {}", self.count_bytes_read)
    }
}
