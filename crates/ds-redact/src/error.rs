//! Error types for the redaction engine.

use thiserror::Error;

/// Result type for redaction operations.
pub type Result<T> = std::result::Result<T, RedactError>;

/// Errors that can occur while building a redaction chain.
///
/// Configuration errors are returned synchronously from chain construction;
/// no stages are started and no ledger entries are produced. Stream errors
/// during redaction travel through the stage pipes instead and surface as
/// `io::Error` at the final reader.
#[derive(Error, Debug)]
pub enum RedactError {
    /// A file glob in a redact spec failed to compile.
    #[error("invalid file glob {glob:?} in redact spec {spec}: {source}")]
    FileGlob {
        spec: usize,
        glob: String,
        source: globset::Error,
    },

    /// A removal regex in a redact spec failed to compile.
    #[error("invalid {field} regex {pattern:?} in redact spec {spec}: {source}")]
    Pattern {
        spec: usize,
        field: &'static str,
        pattern: String,
        source: regex::Error,
    },

    /// I/O error while driving a redaction stream.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
