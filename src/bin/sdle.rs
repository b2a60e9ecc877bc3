// src/bin/sdle.rs

//! Driver program _sdle_ drives the [_sdlelib_] extraction engine.
//!
//! Processes user-passed command-line arguments, resolves the output
//! path, wires `Ctrl+C` to the engine's cooperative interruption flag,
//! then runs one locate-then-stream extraction via a
//! [`DateLogExtractor`].
//!
//! `sdle` writes matched log lines to the output file and prints
//! informational messages to _STDERR_. With `--summary` a final
//! [`Summary`] is also printed.
//!
//! [_sdlelib_]: sdlelib
//! [`DateLogExtractor`]: sdlelib::readers::extractor::DateLogExtractor
//! [`Summary`]: sdlelib::readers::summary::Summary

use std::fs::{create_dir_all, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use ::anyhow::{Context, Result};
use ::clap::Parser;
use ::const_format::concatcp;
#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx};

use ::sdlelib::common::{Count, ExtractError, FPath};
use ::sdlelib::data::datekey::DateKey;
use ::sdlelib::debug::printers::{e_err, e_wrn};
use ::sdlelib::readers::chunkreader::{ChunkSz, CHUNKSZ_DEF, CHUNKSZ_MAX, CHUNKSZ_MIN};
use ::sdlelib::readers::extractor::{DateLogExtractor, ExtractorOptions};
use ::sdlelib::readers::linescanner::LINE_SZ_MAX_DEF;
use ::sdlelib::readers::summary::Summary;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// command-line parsing
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

const CLI_HELP_AFTER: &str = concatcp!(
    "\
DATE must be in \"YYYY-MM-DD\" form, matching the sorted date prefix at
the start of every line of the input file.

The input file must be chronologically sorted by that prefix. sdle binary
searches the file for the byte range of matching entries, then streams
only that range, so even terabyte-scale files are processed in
O(log(file size)) probes plus one pass over the matched range.

Chunk size default is ",
    CHUNKSZ_DEF,
    " bytes (10 MiB).",
);

/// clap command-line arguments build-time definitions.
#[derive(Parser, Debug)]
#[clap(
    about = env!("CARGO_PKG_DESCRIPTION"),
    name = "sdle",
    // write expanded information for the `--version` output
    version = concatcp!(
        "(Speedy Date Log Extractor)\n",
        "Version: ",
        env!("CARGO_PKG_VERSION_MAJOR"), ".",
        env!("CARGO_PKG_VERSION_MINOR"), ".",
        env!("CARGO_PKG_VERSION_PATCH"), "\n",
        "MSRV: ", env!("CARGO_PKG_RUST_VERSION"), "\n",
        "License: ", env!("CARGO_PKG_LICENSE"),
    ),
    after_help = CLI_HELP_AFTER,
    verbatim_doc_comment,
)]
#[allow(non_camel_case_types)]
struct CLI_Args {
    /// Date to extract log entries for, "YYYY-MM-DD" format.
    date: String,

    /// Path of the input log file.
    #[clap(short = 'i', long)]
    input: String,

    /// Output file path. Defaults to "./output/output_<DATE>.txt"
    /// (the directory is created if missing).
    #[clap(short = 'o', long)]
    output: Option<String>,

    /// Chunk size in bytes for file reads.
    #[clap(
        short = 'c',
        long,
        default_value_t = CHUNKSZ_DEF,
        value_parser = cli_parse_chunksz,
    )]
    chunk_size: ChunkSz,

    /// Maximum allowed line length in bytes. A longer run of bytes
    /// without a newline fails the extraction as a malformed file.
    #[clap(long, default_value_t = LINE_SZ_MAX_DEF)]
    line_max: u64,

    /// Print a summary of the extraction after it completes.
    #[clap(short = 's', long)]
    summary: bool,
}

/// `clap` argument validator for `--chunk-size`.
fn cli_parse_chunksz(chunksz_str: &str) -> std::result::Result<ChunkSz, String> {
    let chunksz: ChunkSz = chunksz_str
        .parse::<ChunkSz>()
        .map_err(|err| err.to_string())?;
    if !(CHUNKSZ_MIN..=CHUNKSZ_MAX).contains(&chunksz) {
        return Err(format!(
            "--chunk-size {} is not within the allowed range [{}, {}]",
            chunksz, CHUNKSZ_MIN, CHUNKSZ_MAX
        ));
    }

    Ok(chunksz)
}

/// Resolve the output file path, creating the default `output/` directory
/// when the user did not pass `--output`.
fn resolve_output_path(
    output: &Option<String>,
    date: &str,
) -> Result<PathBuf> {
    match output {
        Some(path) => Ok(PathBuf::from(path)),
        None => {
            let dir = Path::new("output");
            create_dir_all(dir)
                .with_context(|| format!("failed to create output directory {:?}", dir))?;

            Ok(dir.join(format!("output_{}.txt", date)))
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// processing
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// One extraction run; all fallible setup and processing lives here so
/// `main` only has to present the error.
fn run(args: &CLI_Args) -> Result<(Count, Summary, PathBuf)> {
    defn!("({:?})", args);
    let target: DateKey = DateKey::from_target(&args.date)?;
    let out_path: PathBuf = resolve_output_path(&args.output, &args.date)?;
    let out_file: File = File::create(&out_path)
        .with_context(|| format!("failed to create output file {:?}", out_path))?;
    let mut sink = BufWriter::new(out_file);

    // Ctrl+C requests a cooperative stop at the next chunk boundary
    let interrupt = Arc::new(AtomicBool::new(false));
    let interrupt_handler = interrupt.clone();
    ctrlc::set_handler(move || {
        interrupt_handler.store(true, Ordering::Relaxed);
    })
    .context("failed to set the Ctrl+C handler")?;

    let input: FPath = args.input.clone();
    let options = ExtractorOptions {
        chunksz: args.chunk_size,
        line_sz_max: args.line_max,
        interrupt: Some(interrupt),
    };
    eprintln!("Starting log extraction for date: {}", target);
    let extractor = DateLogExtractor::new(&input, target, options)?;
    let summary: Summary = extractor.extract(&mut sink)?;
    sink.into_inner()
        .map_err(|err| ExtractError::SinkWrite(err.into_error()))?;
    defx!("return ({}, {:?})", summary.count_lines, summary);

    Ok((summary.count_lines, summary, out_path))
}

pub fn main() -> ExitCode {
    let args = CLI_Args::parse();
    match run(&args) {
        Ok((count, summary, out_path)) => {
            if count == 0 {
                e_wrn!("no log entries found for {}", args.date);
            }
            eprintln!(
                "Extraction complete. Found {} log entries for {}",
                count, args.date
            );
            eprintln!("Results saved to: {}", out_path.display());
            if args.summary {
                println!("{}", summary);
            }

            ExitCode::SUCCESS
        }
        Err(err) => {
            e_err!("{:#}", err);

            ExitCode::FAILURE
        }
    }
}
