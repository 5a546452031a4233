//! Error types for the Huffman codec.

use thiserror::Error;

use crate::huffman::Symbol;

/// Error variants for codec operations.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The underlying stream could not be read or written.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The encode pass met a symbol the count pass never saw.
    #[error("symbol {symbol:#04x} at offset {offset} has no code; the input changed between passes")]
    UnknownSymbol { symbol: Symbol, offset: u64 },

    /// A stage produced a different amount of data than the frequency map predicts.
    #[error("expected {expected} {unit}, got {actual}")]
    CountMismatch {
        unit: &'static str,
        expected: u64,
        actual: u64,
    },

    /// The bit stream ended in the middle of a code.
    #[error("bit stream truncated after {bits_read} bits")]
    Truncated { bits_read: u64 },

    /// Bits were fed to a decoder that has no tree to descend.
    #[error("bit stream present but the alphabet is empty")]
    MissingTree,

    /// Frequencies too large for the totals derived from them.
    #[error("{0} overflows u64")]
    Overflow(&'static str),

    /// Bytes follow the last payload byte.
    #[error("unexpected data after the payload")]
    TrailingData,

    /// The container header is malformed.
    #[error("invalid header: {0}")]
    InvalidHeader(String),
}

/// A specialized Result type for codec operations.
pub type Result<T> = std::result::Result<T, CodecError>;
