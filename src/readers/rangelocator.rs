// src/readers/rangelocator.rs

//! Implements [`MatchRange`] and [`RangeLocator`], the binary search over
//! the file's byte-offset space.
//!
//! Relies on the sortedness invariant: date keys are monotonically
//! non-decreasing across increasing line-start offsets for the whole file.
//! A probe line that fails to parse aborts the search; the invariant
//! cannot be trusted on a file that is not what it claims to be.
//!
//! [`MatchRange`]: self::MatchRange
//! [`RangeLocator`]: self::RangeLocator

use crate::common::{FPath, FileOffset, FileSz, Result};

use crate::data::datekey::DateKey;

use crate::readers::chunkreader::ChunkSz;
use crate::readers::linescanner::LineScanner;

use std::fmt;

#[allow(unused_imports)]
use ::more_asserts::{debug_assert_le, debug_assert_lt};
#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ, den, deo, dex, deñ};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// MatchRange
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Half-open byte interval `[start, end)` spanning all lines whose
/// [`DateKey`] equals the search target.
///
/// Both `start` and `end` are line starts (or the file size). Empty
/// (`start == end`) when no line matches.
///
/// [`DateKey`]: crate::data::datekey::DateKey
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MatchRange {
    pub start: FileOffset,
    pub end: FileOffset,
}

impl MatchRange {
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Length of the interval in bytes.
    pub const fn len(&self) -> u64 {
        self.end - self.start
    }
}

impl fmt::Display for MatchRange {
    fn fmt(
        &self,
        f: &mut fmt::Formatter,
    ) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// Which predicate boundary a single binary search converges to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Bound {
    /// First line start whose key is `>=` the target.
    Lower,
    /// First line start whose key is `>` the target.
    Upper,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// RangeLocator
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Computes the [`MatchRange`] for a target [`DateKey`] with two
/// independent binary searches over `[0, filesz)`, _O(log n)_ probes each,
/// using a [`LineScanner`] for boundary resolution and key extraction.
///
/// [`MatchRange`]: self::MatchRange
/// [`DateKey`]: crate::data::datekey::DateKey
/// [`LineScanner`]: crate::readers::linescanner::LineScanner
pub struct RangeLocator {
    pub(crate) linescanner: LineScanner,
}

impl fmt::Debug for RangeLocator {
    fn fmt(
        &self,
        f: &mut fmt::Formatter,
    ) -> fmt::Result {
        f.debug_struct("RangeLocator")
            .field("linescanner", &self.linescanner)
            .finish()
    }
}

impl RangeLocator {
    /// Open the file at `path` via a new [`LineScanner`].
    ///
    /// [`LineScanner`]: crate::readers::linescanner::LineScanner
    pub fn new(
        path: &FPath,
        chunksz: ChunkSz,
        line_sz_max: u64,
    ) -> Result<RangeLocator> {
        defñ!("({:?}, {}, {})", path, chunksz, line_sz_max);
        let linescanner = LineScanner::new(path, chunksz, line_sz_max)?;

        Ok(RangeLocator { linescanner })
    }

    /// See [`ChunkReader::filesz`].
    ///
    /// [`ChunkReader::filesz`]: crate::readers::chunkreader::ChunkReader#method.filesz
    pub const fn filesz(&self) -> FileSz {
        self.linescanner.filesz()
    }

    /// Give up this `RangeLocator`, handing back the underlying
    /// [`LineScanner`].
    ///
    /// [`LineScanner`]: crate::readers::linescanner::LineScanner
    pub fn into_linescanner(self) -> LineScanner {
        self.linescanner
    }

    /// Compute the [`MatchRange`] of all lines whose key equals `target`.
    ///
    /// The lower bound is the first line start with key `>=` target, the
    /// upper bound the first with key `>` target. Ties all fall inside the
    /// range because both searches converge to true predicate boundaries,
    /// not to any single matching line. A target dated before the first
    /// line yields an empty range at offset `0`; after the last line, an
    /// empty range at `filesz`.
    ///
    /// [`MatchRange`]: self::MatchRange
    pub fn find_match_range(
        &mut self,
        target: &DateKey,
    ) -> Result<MatchRange> {
        defn!("({:?})", target);
        let start: FileOffset = self.search_bound(target, Bound::Lower)?;
        let end: FileOffset = self.search_bound(target, Bound::Upper)?;
        debug_assert_le!(start, end, "bounds crossed for target {:?}", target);
        let range = MatchRange { start, end };
        defx!("({:?}): return {}", target, range);

        Ok(range)
    }

    /// One monotonic-predicate binary search.
    ///
    /// The predicate over byte offsets is "the first line starting at or
    /// after this offset has a key at or past the target (or no line
    /// starts there at all)"; it is monotone because keys are sorted. The
    /// search converges on the smallest offset satisfying it, which is
    /// then resolved forward to the line start it denotes.
    fn search_bound(
        &mut self,
        target: &DateKey,
        bound: Bound,
    ) -> Result<FileOffset> {
        defn!("({:?}, {:?})", target, bound);
        let filesz: FileSz = self.linescanner.filesz();
        // invariant: 0 <= lo <= hi <= filesz, the predicate is false
        // below `lo` and true at or past `hi`
        let mut lo: FileOffset = 0;
        let mut hi: FileOffset = filesz;
        while lo < hi {
            let mid: FileOffset = lo + (hi - lo) / 2;
            let line_start: FileOffset = self
                .linescanner
                .find_line_start_forward(mid)?;
            defo!("window [{}, {}) mid {} line_start {}", lo, hi, mid, line_start);
            if line_start >= hi {
                // no line begins within [mid, hi); the probe at `mid`
                // resolves to the same line start a probe at `hi` would,
                // where the predicate already holds
                hi = mid;
                continue;
            }
            let key: DateKey = self
                .linescanner
                .extract_date_key(line_start)?;
            let before_target: bool = match bound {
                Bound::Lower => key < *target,
                Bound::Upper => key <= *target,
            };
            if before_target {
                // every line start at or before `line_start` fails the
                // predicate
                lo = line_start + 1;
            } else {
                hi = line_start;
            }
        }
        // `lo` is the smallest offset satisfying the predicate; the bound
        // is the line start it resolves to
        let line_start: FileOffset = self
            .linescanner
            .find_line_start_forward(lo)?;
        defx!("({:?}, {:?}): return {}", target, bound, line_start);

        Ok(line_start)
    }
}
