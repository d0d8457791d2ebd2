//! Error handling for the filtering pipeline.
//!
//! Only input loading can fail: the filtering core itself always produces
//! output, so errors are confined to I/O and FASTA parsing.

use thiserror::Error;

/// Error type for all geese-filter operations.
#[derive(Error, Debug)]
pub enum FilterError {
    /// I/O errors (file operations, stream reading)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// FASTA parsing error from the sequence source
    #[error("FASTA parsing error: {0}")]
    Fasta(#[from] needletail::errors::ParseError),
}

impl FilterError {
    /// Create an I/O error from a plain message
    pub fn io_error(message: impl Into<String>) -> Self {
        Self::Io(std::io::Error::other(message.into()))
    }
}

/// Result type alias for geese-filter operations.
pub type Result<T> = std::result::Result<T, FilterError>;
