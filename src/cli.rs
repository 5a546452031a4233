//! cli component of huffpack.
//!
//! lines starting with `> ` are invocations the current implementation accepts. `<description>` denotes a
//! required argument, `[description]` an optional one.
//!
//! # Compression
//!
//! > `huffpack enc <input> [output] [--raw] [--no-sidecar]`
//!
//! the input is read twice: once to count how often every byte occurs, once to encode it. the counts are
//! what the decoder needs to rebuild the code tree, so by default they are written in a small header in
//! front of the payload. if no output path is given, `foo.txt` compresses to `foo_compressed.huf`.
//!
//! `--raw` drops the header and writes nothing but code bits. the counts then go to a
//! `{output stem}.freq.json` side-car next to the output, unless `--no-sidecar` is passed, in which case
//! the only way back is to recount the original file (see `--reference` below).
//!
//! # Decompression
//!
//! > `huffpack dec <input> [output] [--freq-file <path>] [--reference <path>]`
//!
//! without flags the input is expected to carry a header. either flag switches to raw mode:
//!     1. `--freq-file` reads the counts from a side-car written by `enc --raw`.
//!     2. `--reference` recounts the counts from a copy of the original input.
//!
//! if no output path is given, `foo_compressed.huf` decompresses to `foo_decompressed.txt`.
//!
//! # Testing
//!
//! > `huffpack test <input> <output dir>`
//!
//! compresses and decompresses the file in memory and compares the result with the original. on a
//! discrepancy the compressed and decompressed bytes are written into the output directory.
//!
//! > `huffpack corpus <dir>`
//!
//! round-trips every file below a directory and prints timings and ratios.
//!
//! # Inspection
//!
//! > `huffpack inspect <input> [--json]`
//!
//! prints the frequency of every byte, its code, and the predicted output size.
use clap::{Args, Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::huffman::{Symbol, error::CodecError, frequency::FrequencyMap};

pub mod corpus;
pub mod decode;
pub mod encode;
pub mod inspect;

/// Error types for CLI operations
#[derive(Debug, Error)]
pub enum CliError {
    #[error("I/O error on {path}: {source}")]
    Io { path: PathBuf, source: io::Error },

    #[error("{path}: {source}")]
    Codec { path: PathBuf, source: CodecError },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid frequency file {path}: {reason}")]
    FrequencyFile { path: PathBuf, reason: String },

    #[error("Invalid output path: {0}")]
    OutputPath(PathBuf),

    #[error("Round trip failed for {0}")]
    RoundTrip(String),
}

pub type Result<T> = std::result::Result<T, CliError>;

/// Attaches a path to low-level errors.
pub trait WithPath<T> {
    fn at(self, path: &Path) -> Result<T>;
}

impl<T> WithPath<T> for io::Result<T> {
    fn at(self, path: &Path) -> Result<T> {
        self.map_err(|source| CliError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl<T> WithPath<T> for std::result::Result<T, CodecError> {
    fn at(self, path: &Path) -> Result<T> {
        self.map_err(|source| CliError::Codec {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// CLI arguments for the huffpack application
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Supported commands for huffpack
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Encode (compress) a file
    #[command(alias = "enc")]
    Encode(EncodeArgs),

    /// Decode (decompress) a file
    #[command(alias = "dec")]
    Decode(DecodeArgs),

    /// Test compression/decompression roundtrip on a file
    Test(TestArgs),

    /// Roundtrip every file below a directory
    Corpus(CorpusArgs),

    /// Show the frequency map and code table of a file
    Inspect(InspectArgs),
}

/// Arguments specific to the encode command
#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Path to the input file
    pub input: PathBuf,

    /// Path for the output file
    pub output: Option<PathBuf>,

    /// Write only the code bits, without the frequency header
    #[arg(long)]
    pub raw: bool,

    /// With --raw, do not write the `.freq.json` side-car
    #[arg(long, requires = "raw")]
    pub no_sidecar: bool,
}

/// Arguments specific to the decode command
#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Path to the compressed file
    pub input: PathBuf,

    /// Path for the output file
    pub output: Option<PathBuf>,

    /// Decode a raw stream using frequencies from a side-car file
    #[arg(long, conflicts_with = "reference")]
    pub freq_file: Option<PathBuf>,

    /// Decode a raw stream using frequencies recounted from the original file
    #[arg(long)]
    pub reference: Option<PathBuf>,
}

/// Where a decoder gets its frequencies from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FrequencySource {
    Header,
    FromFile(PathBuf),
    Reference(PathBuf),
}

impl DecodeArgs {
    pub fn frequency_source(&self) -> FrequencySource {
        match (&self.freq_file, &self.reference) {
            (Some(path), _) => FrequencySource::FromFile(path.clone()),
            (None, Some(path)) => FrequencySource::Reference(path.clone()),
            (None, None) => FrequencySource::Header,
        }
    }
}

/// Arguments specific to the test command
#[derive(Args, Debug)]
pub struct TestArgs {
    /// Path to the original file
    pub input: PathBuf,

    /// Directory that receives the compressed and decompressed bytes on failure
    pub output_dir: PathBuf,
}

/// Arguments specific to the corpus command
#[derive(Args, Debug)]
pub struct CorpusArgs {
    /// Directory to walk
    #[arg(default_value = "./test_data")]
    pub dir: PathBuf,
}

/// Arguments specific to the inspect command
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Path to the input file
    pub input: PathBuf,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

/// Serializable frequency side-car
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FrequencyFile {
    /// Version of huffpack that wrote the file
    pub version: String,

    /// Sum of all frequencies
    pub total_symbols: u64,

    /// Occurrences of every byte value that appears in the input
    pub frequencies: BTreeMap<Symbol, u64>,
}

impl FrequencyFile {
    pub fn new(frequencies: &FrequencyMap) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            total_symbols: frequencies.total(),
            frequencies: frequencies.iter().collect(),
        }
    }
}

/// Side-car handling for raw streams
pub struct FileFormatHandler;

impl FileFormatHandler {
    /// `{stem}.freq.json` next to `base_path`.
    pub fn frequency_file_path(base_path: &Path) -> Result<PathBuf> {
        let stem = base_path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| CliError::OutputPath(base_path.to_path_buf()))?;
        Ok(base_path.with_file_name(format!("{}.freq.json", stem)))
    }

    /// Save the frequencies next to the compressed file and return where they went.
    pub fn save_frequency_file(frequencies: &FrequencyMap, base_path: &Path) -> Result<PathBuf> {
        let path = Self::frequency_file_path(base_path)?;
        let json = serde_json::to_string_pretty(&FrequencyFile::new(frequencies))?;
        fs::write(&path, json).at(&path)?;
        Ok(path)
    }

    pub fn load_frequency_file(path: &Path) -> Result<FrequencyMap> {
        let json = fs::read_to_string(path).at(path)?;
        let file: FrequencyFile = serde_json::from_str(&json)?;

        let invalid = |reason: String| CliError::FrequencyFile {
            path: path.to_path_buf(),
            reason,
        };
        if let Some((symbol, _)) = file.frequencies.iter().find(|&(_, &count)| count == 0) {
            return Err(invalid(format!("symbol {} has zero frequency", symbol)));
        }
        let frequencies = FrequencyMap::from_counts(file.frequencies)
            .ok_or_else(|| invalid("frequencies sum past u64::MAX".to_string()))?;
        if frequencies.total() != file.total_symbols {
            return Err(invalid(format!(
                "frequencies sum to {} but total_symbols is {}",
                frequencies.total(),
                file.total_symbols
            )));
        }
        Ok(frequencies)
    }

    /// Count the frequencies of an original file.
    pub fn count_reference(path: &Path) -> Result<FrequencyMap> {
        let file = File::open(path).at(path)?;
        FrequencyMap::count(BufReader::new(file)).at(path)
    }
}

/// `foo.txt` -> `foo_compressed.huf`, in the same directory.
pub fn default_encode_output(input: &Path) -> Result<PathBuf> {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| CliError::OutputPath(input.to_path_buf()))?;
    Ok(input.with_file_name(format!("{}_compressed.huf", stem)))
}

/// `foo_compressed.huf` -> `foo_decompressed.txt`, in the same directory.
pub fn default_decode_output(input: &Path) -> Result<PathBuf> {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| CliError::OutputPath(input.to_path_buf()))?;
    let base = stem.strip_suffix("_compressed").unwrap_or(stem);
    Ok(input.with_file_name(format!("{}_decompressed.txt", base)))
}

/// Function to parse CLI arguments and execute the chosen command
pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Encode(args) => encode::encode(args),
        Command::Decode(args) => decode::decode(args),
        Command::Test(args) => test::test(args),
        Command::Corpus(args) => corpus::corpus(args),
        Command::Inspect(args) => inspect::inspect(args),
    }
}
