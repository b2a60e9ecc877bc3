// src/readers/streamer.rs

//! Implements [`ChunkedStreamer`], the sequential extractor that copies a
//! located [`MatchRange`] to an output sink.
//!
//! The streamer never materializes the whole range. It walks the range one
//! chunk at a time, emits every complete line it sees, and carries the
//! bytes of a line begun in one chunk but not yet terminated (the
//! _pending tail_) into the next chunk. Total bytes emitted equal exactly
//! the bytes of the range, in original order.
//!
//! [`ChunkedStreamer`]: self::ChunkedStreamer
//! [`MatchRange`]: crate::readers::rangelocator::MatchRange

use crate::common::{Bytes, Count, ExtractError, FileOffset, NLu8, Result};

use crate::readers::chunkreader::{ChunkIndex, ChunkOffset, ChunkP, ChunkReader, ChunkSz};
use crate::readers::rangelocator::MatchRange;

use std::fmt;
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use ::memchr::{memchr, memchr_iter, memrchr};
#[allow(unused_imports)]
use ::more_asserts::{debug_assert_le, debug_assert_lt};
#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ, den, deo, dex, deñ};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// ChunkedStreamer
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Copies a byte range of the file to a [`Write`] sink, line-wise, in
/// bounded-memory chunks.
///
/// One instance performs one linear pass; the caller supplies the range
/// computed by [`RangeLocator`]. An optional interruption flag is checked
/// between chunk reads, a cooperative checkpoint, never preemptive.
///
/// [`Write`]: std::io::Write
/// [`RangeLocator`]: crate::readers::rangelocator::RangeLocator
pub struct ChunkedStreamer {
    pub(crate) chunkreader: ChunkReader,
    /// Set by an external caller (e.g. a Ctrl+C handler) to request that
    /// streaming stop at the next chunk boundary.
    interrupt: Option<Arc<AtomicBool>>,
}

impl fmt::Debug for ChunkedStreamer {
    fn fmt(
        &self,
        f: &mut fmt::Formatter,
    ) -> fmt::Result {
        f.debug_struct("ChunkedStreamer")
            .field("chunkreader", &self.chunkreader)
            .field("interruptible", &self.interrupt.is_some())
            .finish()
    }
}

impl ChunkedStreamer {
    pub fn new(
        chunkreader: ChunkReader,
        interrupt: Option<Arc<AtomicBool>>,
    ) -> ChunkedStreamer {
        defñ!("(ChunkReader {:?})", chunkreader);

        ChunkedStreamer {
            chunkreader,
            interrupt,
        }
    }

    /// Give up this `ChunkedStreamer`, handing back the underlying
    /// [`ChunkReader`].
    ///
    /// [`ChunkReader`]: crate::readers::chunkreader::ChunkReader
    pub fn into_chunkreader(self) -> ChunkReader {
        self.chunkreader
    }

    /// Copy `range` of the file to `sink`, byte-for-byte, emitting whole
    /// lines. Returns the count of lines emitted.
    ///
    /// A pending tail held when the read cursor reaches `range.end` is
    /// flushed as a final complete line; `range.end` was computed as a
    /// line boundary so the tail cannot be a fragment of a larger line.
    pub fn stream<W: Write>(
        &mut self,
        range: &MatchRange,
        sink: &mut W,
    ) -> Result<Count> {
        defn!("({})", range);
        debug_assert_le!(range.start, range.end, "bad MatchRange {}", range);
        debug_assert_le!(
            range.end,
            self.chunkreader.filesz(),
            "MatchRange {} ends past file size {}",
            range,
            self.chunkreader.filesz(),
        );
        if range.is_empty() {
            defx!("({}): return 0; empty range", range);
            return Ok(0);
        }
        let chunksz: ChunkSz = self.chunkreader.chunksz();
        let mut pending_tail = Bytes::new();
        let mut count_lines: Count = 0;
        let mut fo: FileOffset = range.start;
        while fo < range.end {
            if let Some(flag) = &self.interrupt {
                if flag.load(Ordering::Relaxed) {
                    defx!("({}): return Err(Interrupted) at {}", range, fo);
                    return Err(ExtractError::Interrupted { offset: fo });
                }
            }
            let co: ChunkOffset = ChunkReader::chunk_offset_at_file_offset(fo, chunksz);
            let chunkp: ChunkP = self.chunkreader.read_chunk(co)?;
            let chunk_fo: FileOffset = ChunkReader::file_offset_at_chunk_offset(co, chunksz);
            let bi_beg: ChunkIndex = (fo - chunk_fo) as ChunkIndex;
            let bi_end: ChunkIndex =
                std::cmp::min(chunkp.len(), (range.end - chunk_fo) as ChunkIndex);
            let mut slice: &[u8] = &chunkp[bi_beg..bi_end];
            defo!("chunk {} slice [{}, {}) tail {} bytes", co, bi_beg, bi_end, pending_tail.len());
            // first, complete any line begun in the previous chunk
            if !pending_tail.is_empty() {
                match memchr(NLu8, slice) {
                    Some(nl) => {
                        pending_tail.extend_from_slice(&slice[..=nl]);
                        sink.write_all(&pending_tail)
                            .map_err(ExtractError::SinkWrite)?;
                        count_lines += 1;
                        pending_tail.clear();
                        slice = &slice[nl + 1..];
                    }
                    None => {
                        // the line straddles this entire chunk
                        pending_tail.extend_from_slice(slice);
                        fo = chunk_fo + bi_end as FileOffset;
                        continue;
                    }
                }
            }
            // emit all complete lines of this chunk in one write, then
            // retain the unterminated remainder
            match memrchr(NLu8, slice) {
                Some(nl) => {
                    let whole: &[u8] = &slice[..=nl];
                    sink.write_all(whole)
                        .map_err(ExtractError::SinkWrite)?;
                    count_lines += memchr_iter(NLu8, whole).count() as Count;
                    pending_tail.extend_from_slice(&slice[nl + 1..]);
                }
                None => {
                    pending_tail.extend_from_slice(slice);
                }
            }
            fo = chunk_fo + bi_end as FileOffset;
        }
        if !pending_tail.is_empty() {
            // the final line of the range carries no terminator (true file
            // end without a trailing newline)
            sink.write_all(&pending_tail)
                .map_err(ExtractError::SinkWrite)?;
            count_lines += 1;
        }
        defx!("({}): return {} lines", range, count_lines);

        Ok(count_lines)
    }
}
