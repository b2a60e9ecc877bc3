// src/readers/chunkreader.rs

//! Implements [`Chunk`s] and [`ChunkReader`], the driver of reading bytes
//! from the log file.
//!
//! A `ChunkReader` serves two access patterns from the same small
//! machinery: random-access reads for binary-search probes, and sequential
//! reads for streaming the matched range. The file size is snapshotted at
//! open; all reads stay within `[0, filesz)` of that snapshot, so bytes
//! appended by a concurrent writer are never observed.
//!
//! [`Chunk`s]: crate::readers::chunkreader::Chunk
//! [`ChunkReader`]: crate::readers::chunkreader::ChunkReader

use crate::common::{
    Bytes,
    Count,
    ExtractError,
    FPath,
    File,
    FileMetadata,
    FileOffset,
    FileOpenOptions,
    FileSz,
    Path,
    Result,
};

use std::fmt;
use std::io::{Error, ErrorKind, Read, Seek, SeekFrom, Take};
use std::num::NonZeroUsize;
use std::sync::Arc;

use ::lru::LruCache;
#[allow(unused_imports)]
use ::more_asserts::{debug_assert_ge, debug_assert_le, debug_assert_lt};
#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ, den, deo, dex, deñ};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// [`Chunk`] size in bytes.
pub type ChunkSz = u64;

/// Offset into a file in [`Chunk`s], depends on [`ChunkSz`] runtime value.
/// Zero based.
///
/// [`Chunk`s]: self::Chunk
pub type ChunkOffset = u64;

/// Byte offset _into_ a [`Chunk`] from the beginning of that `Chunk`.
/// Zero based.
pub type ChunkIndex = usize;

/// A _chunk_ of bytes read from the log file.
pub type Chunk = Vec<u8>;

/// Shared pointer to a [`Chunk`].
///
/// [`Chunk`]: self::Chunk
pub type ChunkP = Arc<Chunk>;

/// Internal [LRU cache] of recently read [`Chunk`s], used by
/// [`ChunkReader::read_chunk`].
///
/// [LRU cache]: https://docs.rs/lru/latest/lru/index.html
/// [`Chunk`s]: self::Chunk
pub type ChunksLRUCache = LruCache<ChunkOffset, ChunkP>;

/// Minimum [`Chunk`] size in bytes.
pub const CHUNKSZ_MIN: ChunkSz = 0x2;
/// Maximum [`Chunk`] size in bytes (1 GiB).
pub const CHUNKSZ_MAX: ChunkSz = 0x4000_0000;
/// Default [`Chunk`] size in bytes (10 MiB).
pub const CHUNKSZ_DEF: ChunkSz = 0xA0_0000;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// ChunkReader
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A specialized reader that reads fixed-size chunks of a plain file at
/// arbitrary chunk offsets.
///
/// Holds at most [`READ_CHUNK_LRU_CACHE_SZ`] chunks in memory. The cache
/// absorbs the repeated nearby probes at the tail of each binary search and
/// the boundary-check reads of the line scanner.
///
/// [`READ_CHUNK_LRU_CACHE_SZ`]: ChunkReader::READ_CHUNK_LRU_CACHE_SZ
pub struct ChunkReader {
    /// Path to the log file.
    path: FPath,
    /// The opened log file.
    file: File,
    /// File size in bytes, snapshotted at open.
    ///
    /// Bytes at or past this offset are never read, even if the file has
    /// since grown.
    filesz: FileSz,
    /// Chunk size in bytes to use for reads.
    chunksz: ChunkSz,
    /// Internal LRU cache of read chunks. Lookups _O(1)_.
    read_chunk_lru_cache: ChunksLRUCache,
    /// Count of chunks read from the file (cache hits excluded).
    count_chunks_read: Count,
    /// Count of bytes read from the file (cache hits excluded).
    count_bytes_read: Count,
}

impl fmt::Debug for ChunkReader {
    fn fmt(
        &self,
        f: &mut fmt::Formatter,
    ) -> fmt::Result {
        f.debug_struct("ChunkReader")
            .field("path", &self.path)
            .field("filesz", &self.filesz)
            .field("chunksz", &self.chunksz)
            .field("chunks read", &self.count_chunks_read)
            .field("bytes read", &self.count_bytes_read)
            .finish()
    }
}

impl ChunkReader {
    /// Capacity of the internal LRU cache in chunks.
    ///
    /// Kept deliberately small; the design target is one chunk plus one
    /// pending tail resident, and the cache only smooths over probes that
    /// land in the same chunk repeatedly.
    const READ_CHUNK_LRU_CACHE_SZ: usize = 2;

    /// Open the file at `path` read-only and snapshot its size.
    pub fn open(
        path: &FPath,
        chunksz: ChunkSz,
    ) -> Result<ChunkReader> {
        defn!("({:?}, {:?})", path, chunksz);

        assert_ne!(0, chunksz, "Chunk Size cannot be 0");
        debug_assert_ge!(chunksz, CHUNKSZ_MIN, "Chunk Size {} is too small", chunksz);
        debug_assert_le!(chunksz, CHUNKSZ_MAX, "Chunk Size {} is too big", chunksz);

        let path_std: &Path = Path::new(path);
        let mut open_options = FileOpenOptions::new();
        defo!("open_options.read(true).open({:?})", path);
        let file: File = match open_options
            .read(true)
            .open(path_std)
        {
            Ok(val) => val,
            Err(err) => {
                defx!("return {:?}", err);
                return Err(ExtractError::from_io(path, err));
            }
        };
        let metadata: FileMetadata = match file.metadata() {
            Ok(val) => val,
            Err(err) => {
                defx!("return {:?}", err);
                return Err(ExtractError::from_io(path, err));
            }
        };
        if !metadata.is_file() {
            defx!("return Err(Unsupported)");
            return Err(ExtractError::from_io(
                path,
                Error::new(
                    // TODO: use `ErrorKind::IsADirectory` when it is stable
                    ErrorKind::Unsupported,
                    format!("not a regular file {:?}", path),
                ),
            ));
        }
        let filesz: FileSz = metadata.len() as FileSz;
        defx!("opened {:?}, filesz {}", path, filesz);

        Ok(ChunkReader {
            path: path.clone(),
            file,
            filesz,
            chunksz,
            read_chunk_lru_cache: ChunksLRUCache::new(
                NonZeroUsize::new(ChunkReader::READ_CHUNK_LRU_CACHE_SZ).unwrap(),
            ),
            count_chunks_read: 0,
            count_bytes_read: 0,
        })
    }

    /// Path of the opened file.
    pub const fn path(&self) -> &FPath {
        &self.path
    }

    /// File size in bytes as snapshotted at open.
    pub const fn filesz(&self) -> FileSz {
        self.filesz
    }

    /// Chunk size in bytes.
    pub const fn chunksz(&self) -> ChunkSz {
        self.chunksz
    }

    /// Count of chunks read from the file so far (cache hits excluded).
    pub const fn count_chunks_read(&self) -> Count {
        self.count_chunks_read
    }

    /// Count of bytes read from the file so far (cache hits excluded).
    pub const fn count_bytes_read(&self) -> Count {
        self.count_bytes_read
    }

    /// `ChunkOffset` of the chunk containing the passed `FileOffset`.
    pub const fn chunk_offset_at_file_offset(
        file_offset: FileOffset,
        chunksz: ChunkSz,
    ) -> ChunkOffset {
        (file_offset / chunksz) as ChunkOffset
    }

    /// `FileOffset` of the first byte of the passed `ChunkOffset`.
    pub const fn file_offset_at_chunk_offset(
        chunk_offset: ChunkOffset,
        chunksz: ChunkSz,
    ) -> FileOffset {
        (chunk_offset * chunksz) as FileOffset
    }

    /// `ChunkIndex` of the passed `FileOffset` within its chunk.
    pub const fn chunk_index_at_file_offset(
        file_offset: FileOffset,
        chunksz: ChunkSz,
    ) -> ChunkIndex {
        (file_offset
            - ChunkReader::file_offset_at_chunk_offset(
                ChunkReader::chunk_offset_at_file_offset(file_offset, chunksz),
                chunksz,
            )) as ChunkIndex
    }

    /// `ChunkOffset` of the last chunk of the file (zero for an empty
    /// file).
    pub const fn chunk_offset_last(&self) -> ChunkOffset {
        if self.filesz == 0 {
            return 0;
        }
        ChunkReader::chunk_offset_at_file_offset(self.filesz - 1, self.chunksz)
    }

    /// Size in bytes of the chunk at the passed `ChunkOffset`. Only the
    /// last chunk of the file may be smaller than `self.chunksz`.
    pub const fn chunksz_at_chunkoffset(
        &self,
        chunk_offset: ChunkOffset,
    ) -> ChunkSz {
        let fo_beg: FileOffset =
            ChunkReader::file_offset_at_chunk_offset(chunk_offset, self.chunksz);
        if fo_beg + self.chunksz > self.filesz {
            self.filesz - fo_beg
        } else {
            self.chunksz
        }
    }

    /// Read the chunk at `chunk_offset` from the file (or the LRU cache).
    ///
    /// The returned chunk has length [`chunksz_at_chunkoffset`]; only the
    /// last chunk of the file is short.
    ///
    /// [`chunksz_at_chunkoffset`]: ChunkReader::chunksz_at_chunkoffset
    pub fn read_chunk(
        &mut self,
        chunk_offset: ChunkOffset,
    ) -> Result<ChunkP> {
        defn!("({})", chunk_offset);
        debug_assert_le!(
            ChunkReader::file_offset_at_chunk_offset(chunk_offset, self.chunksz),
            self.filesz,
            "chunk offset {} is past file size {}",
            chunk_offset,
            self.filesz,
        );

        if let Some(chunkp) = self
            .read_chunk_lru_cache
            .get(&chunk_offset)
        {
            defx!("({}): return cached Chunk len {}", chunk_offset, chunkp.len());
            return Ok(chunkp.clone());
        }

        let seek: u64 = self.chunksz * chunk_offset;
        deo!("self.file.seek({})", seek);
        if let Err(err) = self
            .file
            .seek(SeekFrom::Start(seek))
        {
            defx!("({}): return Err({})", chunk_offset, err);
            return Err(ExtractError::from_io(&self.path, err));
        }
        let cap: usize = self.chunksz_at_chunkoffset(chunk_offset) as usize;
        let mut buffer = Chunk::with_capacity(cap);
        let mut reader: Take<&File> = (&self.file).take(cap as u64);
        deo!("reader.read_to_end(buffer (capacity {}))", cap);
        match reader.read_to_end(&mut buffer) {
            Ok(sz) => {
                if sz != cap {
                    // the file shrank below the size snapshot taken at open
                    defx!("({}): short read {} (expected {})", chunk_offset, sz, cap);
                    return Err(ExtractError::from_io(
                        &self.path,
                        Error::new(
                            ErrorKind::UnexpectedEof,
                            format!(
                                "short read {} of {} bytes at file offset {} of {:?}",
                                sz, cap, seek, self.path
                            ),
                        ),
                    ));
                }
            }
            Err(err) => {
                defx!("({}): return Err({})", chunk_offset, err);
                return Err(ExtractError::from_io(&self.path, err));
            }
        }
        self.count_chunks_read += 1;
        self.count_bytes_read += cap as Count;
        let chunkp: ChunkP = ChunkP::new(buffer);
        self.read_chunk_lru_cache
            .put(chunk_offset, chunkp.clone());
        defx!("({}): return Chunk len {}", chunk_offset, cap);

        Ok(chunkp)
    }

    /// Copy up to `sz` bytes beginning at `file_offset` into a new
    /// [`Bytes`], possibly spanning chunks.
    ///
    /// Returns fewer than `sz` bytes only when the file ends first; the
    /// caller decides whether that is an error.
    pub fn read_bytes_at(
        &mut self,
        file_offset: FileOffset,
        sz: usize,
    ) -> Result<Bytes> {
        defn!("({}, {})", file_offset, sz);
        let end: FileOffset = std::cmp::min(file_offset + sz as FileOffset, self.filesz);
        let mut buffer = Bytes::with_capacity(sz);
        let mut fo: FileOffset = std::cmp::min(file_offset, end);
        while fo < end {
            let co: ChunkOffset = ChunkReader::chunk_offset_at_file_offset(fo, self.chunksz);
            let chunkp: ChunkP = self.read_chunk(co)?;
            let bi: ChunkIndex = ChunkReader::chunk_index_at_file_offset(fo, self.chunksz);
            let take: usize = std::cmp::min((end - fo) as usize, chunkp.len() - bi);
            buffer.extend_from_slice(&chunkp[bi..bi + take]);
            fo += take as FileOffset;
        }
        defx!("({}, {}): return {} bytes", file_offset, sz, buffer.len());

        Ok(buffer)
    }
}
