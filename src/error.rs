use thiserror::Error;

/// Result alias used across the crate
pub type QrResult<T> = Result<T, Error>;

/// Everything that can go wrong while encoding or decoding.
///
/// The encoder validates inputs up front and fails fast. The decoder
/// tolerates recoverable trouble (one bad format-info copy, a missed
/// alignment pattern) and only surfaces terminal failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("payload needs {needed_bits} bits but the symbol holds {capacity_bits}")]
    CapacityExceeded {
        needed_bits: usize,
        capacity_bits: usize,
    },

    #[error("expected 3 finder patterns, confirmed {found}")]
    FinderNotFound { found: usize },

    #[error("format info unreadable at both locations")]
    FormatInfoUnreadable,

    #[error("version info unreadable and pitch estimate inconsistent")]
    VersionInfoUnreadable,

    #[error("sampling failed: {0}")]
    SamplingFailed(String),

    #[error("block {block} exceeds Reed-Solomon correction capacity")]
    Uncorrectable { block: usize },

    #[error("decoded bitstream violates segment structure: {0}")]
    DecodingMismatch(String),
}
