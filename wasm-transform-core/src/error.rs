//! Error types for the request transform
//!
//! Every error here is recoverable for the current call: the pipeline stops and
//! `transform` returns `0`. Unrecoverable faults never become a value; they go
//! through the abort path in [`crate::diagnostics`].

#![allow(missing_docs)]

use crate::abi::Status;
use thiserror::Error;

/// Result type alias for transform operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for a single transform call
#[derive(Error, Debug)]
pub enum Error {
    /// Host had no request descriptor to hand over
    #[error("Fetch error: host returned {0}")]
    Fetch(Status),

    /// Descriptor bytes are not well-formed JSON
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Host refused the outgoing descriptor
    #[error("Reject error: host returned {0}")]
    Reject(Status),

    /// Buffer outside guest memory or too long for the 32-bit ABI
    #[error("Buffer error: {0}")]
    Buffer(#[from] BufferError),

    /// Transform configuration is invalid
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Coarse classification of [`Error`] as seen by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// No descriptor could be obtained
    Fetch,
    /// The descriptor could not be decoded
    Decode,
    /// The host rejected the result
    Reject,
    /// The transform was misconfigured
    Config,
}

impl Error {
    /// Classify the error
    pub fn kind(&self) -> ErrorKind {
        match self {
            // an outgoing descriptor too long for the ABI never reaches the host
            Error::Buffer(BufferError::TooLarge { .. }) => ErrorKind::Reject,
            Error::Fetch(_) | Error::Buffer(_) => ErrorKind::Fetch,
            Error::Decode(_) => ErrorKind::Decode,
            Error::Reject(_) => ErrorKind::Reject,
            Error::Config(_) => ErrorKind::Config,
        }
    }
}

/// Malformed request JSON
#[derive(Error, Debug)]
#[error("malformed request JSON: {0}")]
pub struct DecodeError(#[from] serde_json::Error);

impl DecodeError {
    /// Line of the first offending character (1-based)
    pub fn line(&self) -> usize {
        self.0.line()
    }

    /// Column of the first offending character (1-based)
    pub fn column(&self) -> usize {
        self.0.column()
    }
}

/// Invalid (address, length) handle
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BufferError {
    /// Null address
    #[error("null address for {len} byte buffer")]
    Null { len: usize },

    /// Address plus length wraps around
    #[error("buffer {addr:#x}+{len} overflows the address space")]
    Overflow { addr: usize, len: usize },

    /// Range extends past the end of linear memory
    #[error("buffer {addr:#x}+{len} exceeds linear memory of {memory_size} bytes")]
    OutOfBounds {
        addr: usize,
        len: usize,
        memory_size: usize,
    },

    /// Length does not fit the 32-bit ABI
    #[error("buffer of {len} bytes does not fit a 32-bit length")]
    TooLarge { len: usize },
}

/// Configuration errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Invalid configuration value
    #[error("Invalid configuration value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    /// Missing required configuration
    #[error("Missing required configuration: {field}")]
    MissingField { field: String },
}
