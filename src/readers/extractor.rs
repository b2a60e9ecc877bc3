// src/readers/extractor.rs

//! Implements [`DateLogExtractor`], the driver of one complete
//! locate-then-stream extraction.
//!
//! A [`RangeLocator`] computes the match range once; a [`ChunkedStreamer`]
//! then performs a single linear pass over that range only. Both phases
//! share one [`ChunkReader`], so the file is opened once and the file-size
//! snapshot is taken once.
//!
//! [`DateLogExtractor`]: self::DateLogExtractor
//! [`RangeLocator`]: crate::readers::rangelocator::RangeLocator
//! [`ChunkedStreamer`]: crate::readers::streamer::ChunkedStreamer
//! [`ChunkReader`]: crate::readers::chunkreader::ChunkReader

use crate::common::{FPath, Result};

use crate::data::datekey::DateKey;

use crate::readers::chunkreader::{ChunkReader, ChunkSz, CHUNKSZ_DEF};
use crate::readers::linescanner::{LineScanner, LINE_SZ_MAX_DEF};
use crate::readers::rangelocator::{MatchRange, RangeLocator};
use crate::readers::streamer::ChunkedStreamer;
use crate::readers::summary::Summary;

use std::io::Write;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// DateLogExtractor
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Caller-tunable settings for a [`DateLogExtractor`].
///
/// [`DateLogExtractor`]: self::DateLogExtractor
#[derive(Clone, Debug)]
pub struct ExtractorOptions {
    /// Chunk size in bytes for file reads; see [`CHUNKSZ_DEF`].
    ///
    /// [`CHUNKSZ_DEF`]: crate::readers::chunkreader::CHUNKSZ_DEF
    pub chunksz: ChunkSz,
    /// Maximum allowed line length in bytes; see [`LINE_SZ_MAX_DEF`].
    ///
    /// [`LINE_SZ_MAX_DEF`]: crate::readers::linescanner::LINE_SZ_MAX_DEF
    pub line_sz_max: u64,
    /// Optional cooperative interruption flag checked between chunk reads
    /// during streaming.
    pub interrupt: Option<Arc<AtomicBool>>,
}

impl Default for ExtractorOptions {
    fn default() -> ExtractorOptions {
        ExtractorOptions {
            chunksz: CHUNKSZ_DEF,
            line_sz_max: LINE_SZ_MAX_DEF,
            interrupt: None,
        }
    }
}

/// One-shot driver: open the file, locate the byte range of lines dated
/// `target`, stream that range to a sink, and report a [`Summary`].
///
/// [`Summary`]: crate::readers::summary::Summary
pub struct DateLogExtractor {
    rangelocator: RangeLocator,
    target: DateKey,
    interrupt: Option<Arc<AtomicBool>>,
}

impl DateLogExtractor {
    /// Open the file at `path`.
    pub fn new(
        path: &FPath,
        target: DateKey,
        options: ExtractorOptions,
    ) -> Result<DateLogExtractor> {
        defñ!("({:?}, {:?}, {:?})", path, target, options);
        let rangelocator = RangeLocator::new(path, options.chunksz, options.line_sz_max)?;

        Ok(DateLogExtractor {
            rangelocator,
            target,
            interrupt: options.interrupt,
        })
    }

    /// Locate the match range, then stream it to `sink`. Consumes this
    /// `DateLogExtractor`; one instance performs one extraction.
    pub fn extract<W: Write>(
        mut self,
        sink: &mut W,
    ) -> Result<Summary> {
        defn!("({:?})", self.target);
        let filesz = self.rangelocator.filesz();
        let range: MatchRange = self
            .rangelocator
            .find_match_range(&self.target)?;
        defo!("located {}", range);
        let linescanner: LineScanner = self.rangelocator.into_linescanner();
        let chunkreader: ChunkReader = linescanner.into_chunkreader();
        let mut streamer = ChunkedStreamer::new(chunkreader, self.interrupt);
        let count_lines = streamer.stream(&range, sink)?;
        let chunkreader: ChunkReader = streamer.into_chunkreader();
        let summary = Summary {
            filesz,
            range,
            count_lines,
            count_bytes: range.len(),
            count_chunks_read: chunkreader.count_chunks_read(),
            count_bytes_read: chunkreader.count_bytes_read(),
        };
        defx!("({:?}): return {:?}", self.target, summary);

        Ok(summary)
    }
}
