//! Host/guest ABI definitions
//!
//! This module contains the integer encodings that cross the WASM boundary:
//! status codes returned by host imports, log severity levels, return values of
//! the `transform` export and the (address, length) buffer handles used to move
//! bytes between the two runtimes.

use crate::error::BufferError;
use std::fmt;

/// Return value of `transform` telling the host to apply the submitted request
pub const APPLY: i32 = 1;

/// Return value of `transform` telling the host to keep the original request
pub const DISCARD: i32 = 0;

/// Size of a WASM linear memory page in bytes
pub const WASM_PAGE_SIZE: usize = 65_536;

/// Size of the out-parameter slots the host writes into (`u32`, little-endian)
pub const SLOT_SIZE: usize = 4;

/// Status codes returned by host imports
///
/// The numeric values are the wire contract and must never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    /// Call succeeded
    Ok,
    /// Host had no request in context or failed internally
    InternalFailure,
    /// An argument was rejected (e.g. unknown log level)
    BadArgument,
    /// Host could not read or write the referenced guest memory
    InvalidMemoryAccess,
    /// Host could not parse the JSON it was handed
    InvalidJson,
    /// Any code this guest does not know about
    Unknown(i32),
}

impl Status {
    /// Decode a raw status returned by an import
    pub fn from_raw(code: i32) -> Self {
        match code {
            0 => Status::Ok,
            1 => Status::InternalFailure,
            2 => Status::BadArgument,
            3 => Status::InvalidMemoryAccess,
            11 => Status::InvalidJson,
            other => Status::Unknown(other),
        }
    }

    /// Raw integer value of the status
    pub fn code(&self) -> i32 {
        match self {
            Status::Ok => 0,
            Status::InternalFailure => 1,
            Status::BadArgument => 2,
            Status::InvalidMemoryAccess => 3,
            Status::InvalidJson => 11,
            Status::Unknown(code) => *code,
        }
    }

    /// Check whether the status signals success
    pub fn is_ok(&self) -> bool {
        matches!(self, Status::Ok)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Status::Ok => "ok",
            Status::InternalFailure => "internal failure",
            Status::BadArgument => "bad argument",
            Status::InvalidMemoryAccess => "invalid memory access",
            Status::InvalidJson => "invalid json",
            Status::Unknown(_) => "unknown status",
        };
        write!(f, "{} ({})", name, self.code())
    }
}

/// Severity of a message passed to the host `log` import
///
/// Ordered from least to most severe. The discriminants are the integers the
/// host expects in the `level` argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(i32)]
pub enum LogLevel {
    /// Debug output
    Debug = 0,
    /// Informational output
    Info = 1,
    /// Warnings
    Warn = 2,
    /// Errors, including abort reports
    Error = 3,
}

impl LogLevel {
    /// Decode a raw level; anything outside `0..=3` is not a level
    pub fn from_raw(level: i32) -> Option<Self> {
        match level {
            0 => Some(LogLevel::Debug),
            1 => Some(LogLevel::Info),
            2 => Some(LogLevel::Warn),
            3 => Some(LogLevel::Error),
            _ => None,
        }
    }

    /// Raw integer passed to the host
    pub fn code(&self) -> i32 {
        *self as i32
    }
}

impl From<tracing::Level> for LogLevel {
    fn from(level: tracing::Level) -> Self {
        if level == tracing::Level::ERROR {
            LogLevel::Error
        } else if level == tracing::Level::WARN {
            LogLevel::Warn
        } else if level == tracing::Level::INFO {
            LogLevel::Info
        } else {
            // the host has no trace level
            LogLevel::Debug
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        };
        f.write_str(name)
    }
}

/// An (address, length) pair naming a byte range in guest linear memory
///
/// A handle is only meaningful for the duration of the call that produced it.
/// Use [`BufferHandle::validate`] before turning it into a slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferHandle {
    addr: usize,
    len: usize,
}

impl BufferHandle {
    /// Create an unchecked handle
    pub fn new(addr: usize, len: usize) -> Self {
        Self { addr, len }
    }

    /// Start address
    pub fn addr(&self) -> usize {
        self.addr
    }

    /// Length in bytes
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the handle covers no bytes
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Exclusive end address, if it does not overflow
    pub fn end(&self) -> Option<usize> {
        self.addr.checked_add(self.len)
    }

    /// Check the handle against the current size of linear memory
    ///
    /// Returns the handle unchanged when `addr..addr + len` is non-null and lies
    /// entirely inside `memory_size` bytes.
    pub fn validate(self, memory_size: usize) -> Result<Self, BufferError> {
        if self.addr == 0 {
            return Err(BufferError::Null { len: self.len });
        }
        let end = self.end().ok_or(BufferError::Overflow {
            addr: self.addr,
            len: self.len,
        })?;
        if end > memory_size {
            return Err(BufferError::OutOfBounds {
                addr: self.addr,
                len: self.len,
                memory_size,
            });
        }
        Ok(self)
    }
}

impl fmt::Display for BufferHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}+{}", self.addr, self.len)
    }
}

/// Handle of the payload of a length-prefixed string stored at `addr`
///
/// The layout is a little-endian `u32` byte count followed by the bytes;
/// `header` holds the four bytes read from `addr`.
pub fn prefixed_payload(addr: usize, header: [u8; SLOT_SIZE]) -> Result<BufferHandle, BufferError> {
    let len = u32::from_le_bytes(header) as usize;
    let start = addr.checked_add(SLOT_SIZE).ok_or(BufferError::Overflow {
        addr,
        len: SLOT_SIZE,
    })?;
    Ok(BufferHandle::new(start, len))
}

/// Linear memory size in bytes for a page count
pub fn memory_bytes(pages: usize) -> usize {
    pages.saturating_mul(WASM_PAGE_SIZE)
}
