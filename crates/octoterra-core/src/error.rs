//! Error types for terrain storage and generation.

use thiserror::Error;

/// Crate-wide error type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Configuration rejected before any allocation happened
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Backing storage could not be allocated or grown
    #[error("Out of memory: {0}")]
    OutOfMemory(String),

    /// A pool index does not fit in the 24-bit child address field
    #[error("Address space exhausted: slot {index} does not fit in a 24-bit child address")]
    AddressSpaceExhausted { index: u32 },

    /// Out of bounds access
    #[error("Out of bounds: {0}")]
    OutOfBounds(String),

    /// Invalid data error
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
