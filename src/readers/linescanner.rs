// src/readers/linescanner.rs

//! Implements a [`LineScanner`], the resolver of line boundaries and
//! date keys using a [`ChunkReader`].
//!
//! A _line start_ is a byte offset that either is `0` or immediately
//! follows a newline. The file-size snapshot `filesz` acts as the boundary
//! past the last line.
//!
//! [`LineScanner`]: self::LineScanner
//! [`ChunkReader`]: crate::readers::chunkreader::ChunkReader

use crate::common::{Bytes, ExtractError, FPath, FileOffset, FileSz, NLu8, Result};

use crate::data::datekey::{DateKey, DATE_KEY_SZ};

use crate::readers::chunkreader::{ChunkIndex, ChunkOffset, ChunkP, ChunkReader, ChunkSz};

use std::fmt;

use ::memchr::{memchr, memrchr};
#[allow(unused_imports)]
use ::more_asserts::{debug_assert_le, debug_assert_lt};
#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ, den, deo, dex, deñ};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// LineScanner
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Default maximum allowed line length in bytes (32 KiB).
///
/// A scan for a line boundary that covers this many bytes without finding
/// a newline fails with [`ExtractError::MalformedLine`]. Caps the
/// worst-case cost of a binary-search probe and catches files that are not
/// actually line-oriented.
pub const LINE_SZ_MAX_DEF: u64 = 0x8000;

/// A specialized reader that uses a [`ChunkReader`] to find line starts
/// near arbitrary byte offsets, and to extract the [`DateKey`] at a line
/// start.
///
/// All functions are pure over the file bytes; a `LineScanner` mutates
/// only its reader's internal cache.
///
/// [`ChunkReader`]: crate::readers::chunkreader::ChunkReader
/// [`DateKey`]: crate::data::datekey::DateKey
pub struct LineScanner {
    pub(crate) chunkreader: ChunkReader,
    /// Maximum allowed line length in bytes; see [`LINE_SZ_MAX_DEF`].
    line_sz_max: u64,
}

impl fmt::Debug for LineScanner {
    fn fmt(
        &self,
        f: &mut fmt::Formatter,
    ) -> fmt::Result {
        f.debug_struct("LineScanner")
            .field("chunkreader", &self.chunkreader)
            .field("line_sz_max", &self.line_sz_max)
            .finish()
    }
}

impl LineScanner {
    /// Open the file at `path` via a new [`ChunkReader`].
    ///
    /// [`ChunkReader`]: crate::readers::chunkreader::ChunkReader
    pub fn new(
        path: &FPath,
        chunksz: ChunkSz,
        line_sz_max: u64,
    ) -> Result<LineScanner> {
        defñ!("({:?}, {}, {})", path, chunksz, line_sz_max);
        assert_ne!(0, line_sz_max, "maximum line length cannot be 0");
        let chunkreader = ChunkReader::open(path, chunksz)?;

        Ok(LineScanner {
            chunkreader,
            line_sz_max,
        })
    }

    /// See [`ChunkReader::filesz`].
    ///
    /// [`ChunkReader::filesz`]: crate::readers::chunkreader::ChunkReader#method.filesz
    pub const fn filesz(&self) -> FileSz {
        self.chunkreader.filesz()
    }

    /// See [`ChunkReader::path`].
    ///
    /// [`ChunkReader::path`]: crate::readers::chunkreader::ChunkReader#method.path
    pub const fn path(&self) -> &FPath {
        self.chunkreader.path()
    }

    /// Maximum allowed line length in bytes.
    pub const fn line_sz_max(&self) -> u64 {
        self.line_sz_max
    }

    /// Give up this `LineScanner`, handing back the underlying
    /// [`ChunkReader`].
    ///
    /// [`ChunkReader`]: crate::readers::chunkreader::ChunkReader
    pub fn into_chunkreader(self) -> ChunkReader {
        self.chunkreader
    }

    /// Single byte at `file_offset` (must be within the file).
    fn byte_at(
        &mut self,
        file_offset: FileOffset,
    ) -> Result<u8> {
        debug_assert_lt!(file_offset, self.filesz());
        let chunksz: ChunkSz = self.chunkreader.chunksz();
        let co: ChunkOffset = ChunkReader::chunk_offset_at_file_offset(file_offset, chunksz);
        let chunkp: ChunkP = self.chunkreader.read_chunk(co)?;
        let bi: ChunkIndex = ChunkReader::chunk_index_at_file_offset(file_offset, chunksz);

        Ok(chunkp[bi])
    }

    /// Find the smallest line start at or after `file_offset`.
    ///
    /// Returns `filesz` when no further line start exists (the file end is
    /// the boundary). Fails with [`ExtractError::MalformedLine`] when
    /// [`line_sz_max`] bytes are scanned without finding a newline or the
    /// file end.
    ///
    /// [`line_sz_max`]: LineScanner::line_sz_max
    pub fn find_line_start_forward(
        &mut self,
        file_offset: FileOffset,
    ) -> Result<FileOffset> {
        defn!("({})", file_offset);
        let filesz: FileSz = self.filesz();
        if file_offset == 0 {
            defx!("({}): return 0; file start", file_offset);
            return Ok(0);
        }
        if file_offset >= filesz {
            defx!("({}): return {}; file end", file_offset, filesz);
            return Ok(filesz);
        }
        // `file_offset` is itself a line start if the preceding byte is a
        // newline
        if self.byte_at(file_offset - 1)? == NLu8 {
            defx!("({}): return {}; already a line start", file_offset, file_offset);
            return Ok(file_offset);
        }
        // scan forward for the next newline
        let chunksz: ChunkSz = self.chunkreader.chunksz();
        let mut fo: FileOffset = file_offset;
        let mut scanned: u64 = 0;
        while fo < filesz {
            if scanned >= self.line_sz_max {
                defx!("({}): return Err(MalformedLine)", file_offset);
                return Err(ExtractError::MalformedLine {
                    offset: file_offset,
                    max: self.line_sz_max,
                });
            }
            let co: ChunkOffset = ChunkReader::chunk_offset_at_file_offset(fo, chunksz);
            let chunkp: ChunkP = self.chunkreader.read_chunk(co)?;
            let bi: ChunkIndex = ChunkReader::chunk_index_at_file_offset(fo, chunksz);
            let budget: usize = (self.line_sz_max - scanned) as usize;
            let bi_end: ChunkIndex = std::cmp::min(chunkp.len(), bi.saturating_add(budget));
            match memchr(NLu8, &chunkp[bi..bi_end]) {
                Some(i) => {
                    let line_start: FileOffset = fo + i as FileOffset + 1;
                    defx!("({}): return {}", file_offset, line_start);
                    return Ok(line_start);
                }
                None => {
                    scanned += (bi_end - bi) as u64;
                    fo += (bi_end - bi) as FileOffset;
                }
            }
        }
        defx!("({}): return {}; no newline before file end", file_offset, filesz);

        Ok(filesz)
    }

    /// Find the largest line start at or before `file_offset`.
    ///
    /// The file start is always a boundary, so this returns `0` when no
    /// newline precedes `file_offset`. Fails with
    /// [`ExtractError::MalformedLine`] under the same scan bound as
    /// [`find_line_start_forward`].
    ///
    /// [`find_line_start_forward`]: LineScanner::find_line_start_forward
    pub fn find_line_start_backward(
        &mut self,
        file_offset: FileOffset,
    ) -> Result<FileOffset> {
        defn!("({})", file_offset);
        if file_offset == 0 {
            defx!("({}): return 0; file start", file_offset);
            return Ok(0);
        }
        let chunksz: ChunkSz = self.chunkreader.chunksz();
        // exclusive end of the region in which to find the last newline;
        // a newline at `p` makes `p + 1` the line start
        let mut remaining: FileOffset = std::cmp::min(file_offset, self.filesz());
        let mut scanned: u64 = 0;
        while remaining > 0 {
            if scanned >= self.line_sz_max {
                defx!("({}): return Err(MalformedLine)", file_offset);
                return Err(ExtractError::MalformedLine {
                    offset: file_offset,
                    max: self.line_sz_max,
                });
            }
            let co: ChunkOffset =
                ChunkReader::chunk_offset_at_file_offset(remaining - 1, chunksz);
            let chunk_fo: FileOffset = ChunkReader::file_offset_at_chunk_offset(co, chunksz);
            let bi_end: ChunkIndex = (remaining - chunk_fo) as ChunkIndex;
            let budget: usize = (self.line_sz_max - scanned) as usize;
            let bi_beg: ChunkIndex = bi_end.saturating_sub(budget);
            let chunkp: ChunkP = self.chunkreader.read_chunk(co)?;
            match memrchr(NLu8, &chunkp[bi_beg..bi_end]) {
                Some(i) => {
                    let line_start: FileOffset = chunk_fo + (bi_beg + i) as FileOffset + 1;
                    debug_assert_le!(line_start, file_offset);
                    defx!("({}): return {}", file_offset, line_start);
                    return Ok(line_start);
                }
                None => {
                    scanned += (bi_end - bi_beg) as u64;
                    remaining = chunk_fo + bi_beg as FileOffset;
                }
            }
        }
        defx!("({}): return 0; no newline before offset", file_offset);

        Ok(0)
    }

    /// Extract the [`DateKey`] of the line beginning at `line_start`.
    ///
    /// Fails with [`ExtractError::TruncatedRecord`] when fewer than
    /// [`DATE_KEY_SZ`] bytes remain in the file, and with
    /// [`ExtractError::InvalidDateFormat`] when the bytes are not
    /// `YYYY-MM-DD` shaped.
    ///
    /// [`DateKey`]: crate::data::datekey::DateKey
    /// [`DATE_KEY_SZ`]: crate::data::datekey::DATE_KEY_SZ
    pub fn extract_date_key(
        &mut self,
        line_start: FileOffset,
    ) -> Result<DateKey> {
        defn!("({})", line_start);
        let bytes: Bytes = self
            .chunkreader
            .read_bytes_at(line_start, DATE_KEY_SZ)?;
        if bytes.len() < DATE_KEY_SZ {
            defx!("({}): return Err(TruncatedRecord)", line_start);
            return Err(ExtractError::TruncatedRecord {
                offset: line_start,
                remaining: bytes.len() as u64,
                need: DATE_KEY_SZ as u64,
            });
        }
        let mut prefix = [0u8; DATE_KEY_SZ];
        prefix.copy_from_slice(&bytes);
        let key = DateKey::from_line_prefix(&prefix, line_start)?;
        defx!("({}): return {:?}", line_start, key);

        Ok(key)
    }
}
