// src/readers/mod.rs

//! The package of reader structs that do the heavy lifting.
//!
//! Layered bottom-up:
//! [`ChunkReader`] reads raw chunks of the file,
//! [`LineScanner`] resolves line boundaries and date keys within those
//! chunks,
//! [`RangeLocator`] binary-searches the file's offset space for the byte
//! range matching a target date,
//! [`ChunkedStreamer`] copies that range to an output sink,
//! and [`DateLogExtractor`] drives locate-then-stream in one pass.
//!
//! [`ChunkReader`]: crate::readers::chunkreader::ChunkReader
//! [`LineScanner`]: crate::readers::linescanner::LineScanner
//! [`RangeLocator`]: crate::readers::rangelocator::RangeLocator
//! [`ChunkedStreamer`]: crate::readers::streamer::ChunkedStreamer
//! [`DateLogExtractor`]: crate::readers::extractor::DateLogExtractor

pub mod chunkreader;
pub mod extractor;
pub mod linescanner;
pub mod rangelocator;
pub mod streamer;
pub mod summary;
