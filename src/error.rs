//! Error types for the genematrix library.

use thiserror::Error;

/// Errors that can occur while building a dataset.
#[derive(Debug, Error)]
pub enum Error {
    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A parse error occurred while reading input data or request tokens.
    #[error("{0}")]
    Parse(String),

    /// A validation constraint was violated.
    #[error("{0}")]
    Validation(String),

    /// A rendered dataset line did not have the expected shape.
    #[error("{0}")]
    Format(String),

    /// The requested codon positions and partition strategy map to no layout.
    #[error("unsupported combination of codon positions ({positions}) and partitioning ({partitioning})")]
    UnsupportedCombination {
        positions: String,
        partitioning: String,
    },
}
