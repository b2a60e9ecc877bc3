// src/tests/common.rs

//! Common testing helpers: temporary log files, shared fixtures, a naive
//! full-scan oracle, and a one-call in-memory extraction runner.

#![allow(non_upper_case_globals)]

use crate::common::{Bytes, FPath, NLu8, Result};

use crate::data::datekey::DateKey;

use crate::readers::chunkreader::ChunkSz;
use crate::readers::extractor::{DateLogExtractor, ExtractorOptions};
use crate::readers::summary::Summary;

use std::io::Write;

use ::lazy_static::lazy_static;
use ::tempfile::NamedTempFile;

/// NamedTempFile instances default to this file name prefix.
pub const STR_TEMPFILE_PREFIX: &str = "tmp-sdle-test-";

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// temporary file helper functions
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Testing helper function to write a `[u8]` to a specially-named
/// temporary file.
pub fn create_temp_file_bytes(data: &[u8]) -> NamedTempFile {
    let mut ntf = match tempfile::Builder::new()
        // use known prefix for easier cleanup
        .prefix::<str>(STR_TEMPFILE_PREFIX)
        .tempfile()
    {
        Ok(val) => val,
        Err(err) => {
            panic!("NamedTempFile::new() return Err {}", err);
        }
    };
    match ntf.write_all(data) {
        Ok(_) => {}
        Err(err) => {
            panic!("NamedTempFile::write_all() return Err {}", err);
        }
    }

    ntf
}

/// Testing helper function to write a `str` to a specially-named
/// temporary file.
pub fn create_temp_file(data: &str) -> NamedTempFile {
    create_temp_file_bytes(data.as_bytes())
}

/// Testing helper function to get a `FPath` from a `NamedTempFile`.
pub fn ntf_fpath(ntf: &NamedTempFile) -> FPath {
    FPath::from(ntf.path().to_str().unwrap())
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// oracle and runners
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// The ground-truth oracle: a naive full-scan linear filter of `data` for
/// lines beginning with `date`, terminators preserved.
pub fn oracle_extract(
    data: &[u8],
    date: &str,
) -> Bytes {
    let mut out = Bytes::new();
    for line in data.split_inclusive(|byte| *byte == NLu8) {
        if line.starts_with(date.as_bytes()) {
            out.extend_from_slice(line);
        }
    }

    out
}

/// Count of lines of `data` beginning with `date`.
pub fn oracle_count(
    data: &[u8],
    date: &str,
) -> u64 {
    data.split_inclusive(|byte| *byte == NLu8)
        .filter(|line| line.starts_with(date.as_bytes()))
        .count() as u64
}

/// Run one complete extraction of `date` from the file at `path` into an
/// in-memory sink.
pub fn extract_to_vec(
    path: &FPath,
    date: &str,
    chunksz: ChunkSz,
    line_sz_max: u64,
) -> Result<(Bytes, Summary)> {
    let target = DateKey::from_target(date)?;
    let options = ExtractorOptions {
        chunksz,
        line_sz_max,
        interrupt: None,
    };
    let extractor = DateLogExtractor::new(path, target, options)?;
    let mut sink = Bytes::new();
    let summary = extractor.extract(&mut sink)?;

    Ok((sink, summary))
}

/// Build a synthetic sorted log: for each `(date, count)` entry emit
/// `count` lines dated `date` with deterministically varied lengths.
pub fn build_log(entries: &[(&str, usize)]) -> String {
    let mut log = String::new();
    let mut index: usize = 0;
    for (date, count) in entries.iter() {
        for k in 0..*count {
            // vary the message length so lines straddle chunk boundaries
            // at irregular positions
            let pad = "x".repeat(index % 17);
            log.push_str(&format!("{} entry-{}-{} {}\n", date, index, k, pad));
            index += 1;
        }
    }

    log
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// shared fixtures
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// The boundary scenario: three dates with tied entries.
///
/// Line starts at offsets 0, 15, 30, 47, 63, 79; file size 94.
pub const LOG_BOUNDARY: &str = "\
2024-12-01 one
2024-12-01 two
2024-12-01 three
2024-12-02 four
2024-12-02 five
2024-12-03 six
";

/// Two lines, starts at offsets 0 and 15; file size 30.
pub const LOG_TWO_LINES: &str = "2024-12-01 one\n2024-12-02 two\n";

/// A single line.
pub const LOG_ONE_LINE: &str = "2024-12-02 only\n";

/// Final line carries no trailing newline; line starts 0, 15, 30.
pub const LOG_NO_TRAILING_NL: &str = "2024-12-01 one\n2024-12-02 two\n2024-12-02 last";

lazy_static! {
    pub static ref NTF_EMPTY: NamedTempFile = create_temp_file("");
    pub static ref NTF_EMPTY_PATH: FPath = ntf_fpath(&NTF_EMPTY);
    pub static ref NTF_BOUNDARY: NamedTempFile = create_temp_file(LOG_BOUNDARY);
    pub static ref NTF_BOUNDARY_PATH: FPath = ntf_fpath(&NTF_BOUNDARY);
    pub static ref NTF_TWO_LINES: NamedTempFile = create_temp_file(LOG_TWO_LINES);
    pub static ref NTF_TWO_LINES_PATH: FPath = ntf_fpath(&NTF_TWO_LINES);
    pub static ref NTF_ONE_LINE: NamedTempFile = create_temp_file(LOG_ONE_LINE);
    pub static ref NTF_ONE_LINE_PATH: FPath = ntf_fpath(&NTF_ONE_LINE);
    pub static ref NTF_NO_TRAILING_NL: NamedTempFile = create_temp_file(LOG_NO_TRAILING_NL);
    pub static ref NTF_NO_TRAILING_NL_PATH: FPath = ntf_fpath(&NTF_NO_TRAILING_NL);
}
