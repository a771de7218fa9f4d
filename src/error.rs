//! Error types for record conversion.
//!
//! This module provides the [`TabError`] type for all library operations
//! and the [`Result`] convenience type.

use thiserror::Error;

/// Error type for all tabconv operations.
///
/// Configuration errors (bad field specification, unknown dialect or
/// encoding) are raised before any data is read. I/O errors are split by
/// the side of the conversion they occur on.
#[derive(Error, Debug)]
pub enum TabError {
    /// A field specification token was malformed or selected column 0.
    #[error("Invalid field specification: {0}")]
    InvalidFieldSpec(String),

    /// No dialect is registered under the requested name.
    #[error(
        "Unknown format: {0:?} (expected one of: {known})",
        known = crate::dialect::names().join(", ")
    )]
    UnknownDialect(String),

    /// The encoding label is not recognized.
    #[error("Unknown encoding: {0:?}")]
    UnknownEncoding(String),

    /// The encoding is recognized but cannot drive a line-oriented reader.
    #[error("Unsupported encoding: {0} (line-oriented formats need an ASCII-compatible encoding)")]
    UnsupportedEncoding(String),

    /// Reading from an input stream failed.
    #[error("Read error: {0}")]
    SourceReadError(#[source] std::io::Error),

    /// Writing to the output stream failed.
    #[error("Write error: {0}")]
    SinkWriteError(#[source] std::io::Error),

    /// A record was written after the sink was finished.
    #[error("Cannot write to a finished sink")]
    WriterFinished,
}

impl TabError {
    /// Wrap a delimited-parser failure raised while reading.
    #[must_use]
    pub fn read(err: csv::Error) -> Self {
        TabError::SourceReadError(err.into())
    }

    /// Wrap a delimited-writer failure raised while writing.
    #[must_use]
    pub fn write(err: csv::Error) -> Self {
        TabError::SinkWriteError(err.into())
    }

    /// Whether this error stems from invalid user configuration rather
    /// than from the data streams.
    #[must_use]
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self,
            TabError::InvalidFieldSpec(_)
                | TabError::UnknownDialect(_)
                | TabError::UnknownEncoding(_)
                | TabError::UnsupportedEncoding(_)
        )
    }

    /// Process exit status for this error: 2 for invalid arguments, 1 otherwise.
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        if self.is_usage_error() {
            2
        } else {
            1
        }
    }
}

/// Convenience type alias for [`std::result::Result`] with [`TabError`].
pub type Result<T> = std::result::Result<T, TabError>;
