// src/tests/streamer_tests.rs

#![allow(non_snake_case)]

use crate::common::{Bytes, ExtractError, FileOffset};

use crate::readers::chunkreader::{ChunkReader, ChunkSz};
use crate::readers::rangelocator::MatchRange;
use crate::readers::streamer::ChunkedStreamer;

use crate::tests::common::{
    create_temp_file,
    ntf_fpath,
    oracle_count,
    LOG_BOUNDARY,
    LOG_NO_TRAILING_NL,
};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use ::tempfile::NamedTempFile;
use ::test_case::test_case;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

// the `NamedTempFile` is returned to keep the file alive alongside the
// open `ChunkedStreamer`
fn streamer_with(
    data: &str,
    chunksz: ChunkSz,
) -> (NamedTempFile, ChunkedStreamer) {
    let ntf = create_temp_file(data);
    let fpath = ntf_fpath(&ntf);
    let chunkreader = ChunkReader::open(&fpath, chunksz).unwrap();
    let streamer = ChunkedStreamer::new(chunkreader, None);

    (ntf, streamer)
}

/// Chunk-size invariance: streaming the whole file is a byte-for-byte
/// copy at every chunk size, including one larger than the file.
#[test_case(2)]
#[test_case(3)]
#[test_case(7)]
#[test_case(16)]
#[test_case(0x400)]
fn test_stream_whole_file_any_chunk_size(chunksz: ChunkSz) {
    let (_ntf, mut streamer) = streamer_with(LOG_BOUNDARY, chunksz);
    let range = MatchRange {
        start: 0,
        end: LOG_BOUNDARY.len() as FileOffset,
    };
    let mut sink = Bytes::new();
    let count = streamer.stream(&range, &mut sink).unwrap();
    assert_eq!(&sink[..], LOG_BOUNDARY.as_bytes());
    assert_eq!(count, 6);
}

#[test]
fn test_stream_subrange_not_chunk_aligned() {
    // the 2024-12-02 lines of `LOG_BOUNDARY` occupy [47, 79); neither
    // bound is a multiple of the chunk size
    let (_ntf, mut streamer) = streamer_with(LOG_BOUNDARY, 16);
    let range = MatchRange { start: 47, end: 79 };
    let mut sink = Bytes::new();
    let count = streamer.stream(&range, &mut sink).unwrap();
    assert_eq!(&sink[..], b"2024-12-02 four\n2024-12-02 five\n");
    assert_eq!(count, 2);
}

#[test]
fn test_stream_line_straddles_chunk_boundary() {
    // chunk size 32 puts a chunk boundary at offset 64, inside the
    // "2024-12-02 five" line spanning [63, 79); the line must be emitted
    // whole and exactly once
    let (_ntf, mut streamer) = streamer_with(LOG_BOUNDARY, 32);
    let range = MatchRange { start: 47, end: 79 };
    let mut sink = Bytes::new();
    let count = streamer.stream(&range, &mut sink).unwrap();
    assert_eq!(&sink[..], b"2024-12-02 four\n2024-12-02 five\n");
    assert_eq!(count, 2);
    assert_eq!(
        count,
        oracle_count(LOG_BOUNDARY.as_bytes(), "2024-12-02"),
    );
}

#[test]
fn test_stream_line_straddles_many_chunks() {
    // chunk size 2 splits every line across many chunks
    let (_ntf, mut streamer) = streamer_with(LOG_BOUNDARY, 2);
    let range = MatchRange { start: 79, end: 94 };
    let mut sink = Bytes::new();
    let count = streamer.stream(&range, &mut sink).unwrap();
    assert_eq!(&sink[..], b"2024-12-03 six\n");
    assert_eq!(count, 1);
}

#[test]
fn test_stream_empty_range() {
    let (_ntf, mut streamer) = streamer_with(LOG_BOUNDARY, 16);
    let range = MatchRange { start: 47, end: 47 };
    let mut sink = Bytes::new();
    let count = streamer.stream(&range, &mut sink).unwrap();
    assert!(sink.is_empty());
    assert_eq!(count, 0);
}

#[test]
fn test_stream_final_line_without_newline() {
    // a pending tail held at `range.end` is flushed as a complete line
    let (_ntf, mut streamer) = streamer_with(LOG_NO_TRAILING_NL, 8);
    let range = MatchRange {
        start: 15,
        end: LOG_NO_TRAILING_NL.len() as FileOffset,
    };
    let mut sink = Bytes::new();
    let count = streamer.stream(&range, &mut sink).unwrap();
    assert_eq!(&sink[..], b"2024-12-02 two\n2024-12-02 last");
    assert_eq!(count, 2);
}

#[test]
fn test_stream_interrupted() {
    let ntf = create_temp_file(LOG_BOUNDARY);
    let fpath = ntf_fpath(&ntf);
    let chunkreader = ChunkReader::open(&fpath, 16).unwrap();
    let interrupt = Arc::new(AtomicBool::new(false));
    interrupt.store(true, Ordering::Relaxed);
    let mut streamer = ChunkedStreamer::new(chunkreader, Some(interrupt));
    let range = MatchRange { start: 0, end: 94 };
    let mut sink = Bytes::new();
    let result = streamer.stream(&range, &mut sink);
    match result {
        Err(ExtractError::Interrupted { offset }) => {
            assert_eq!(offset, 0, "interrupt observed before any chunk read");
        }
        _ => panic!("expected Interrupted, got {:?}", result),
    }
    assert!(sink.is_empty());
}

#[test]
fn test_stream_sink_write_failure() {
    /// A sink that always fails.
    struct FailingSink;
    impl std::io::Write for FailingSink {
        fn write(
            &mut self,
            _buf: &[u8],
        ) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "no space"))
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    let (_ntf, mut streamer) = streamer_with(LOG_BOUNDARY, 16);
    let range = MatchRange { start: 0, end: 94 };
    let result = streamer.stream(&range, &mut FailingSink {});
    assert!(
        matches!(result, Err(ExtractError::SinkWrite(_))),
        "expected SinkWrite, got {:?}",
        result,
    );
}
