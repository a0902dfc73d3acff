//! Abort reporting
//!
//! Unrecoverable faults (panics, runtime aborts) never surface as a
//! [`crate::Error`]. The guest formats an [`AbortReport`], sends it to the host
//! at [`LogLevel::Error`] and then traps, so the host sees a failed call
//! instead of a return value.

use crate::abi::LogLevel;
use std::any::Any;
use std::fmt;

/// Level at which abort reports are logged
pub const ABORT_LEVEL: LogLevel = LogLevel::Error;

/// Where an abort happened
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    /// Source file
    pub file: String,
    /// Line (1-based)
    pub line: u32,
    /// Column (1-based)
    pub column: u32,
}

impl SourceLocation {
    /// Create a location
    pub fn new(file: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({}:{})", self.file, self.line, self.column)
    }
}

/// Diagnostic produced on the abort path
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AbortReport {
    /// Abort message, if the runtime supplied one
    pub message: Option<String>,
    /// Source location, if known
    pub location: Option<SourceLocation>,
}

impl AbortReport {
    /// Create a report
    pub fn new(message: Option<String>, location: Option<SourceLocation>) -> Self {
        Self { message, location }
    }

    /// Build a report from a panic payload and location
    pub fn from_panic(payload: &(dyn Any + Send), location: Option<SourceLocation>) -> Self {
        Self::new(panic_message(payload).map(str::to_string), location)
    }
}

/// Renders as `abort: <message> at: <file>(<line>:<column>)`; absent parts are
/// left out.
impl fmt::Display for AbortReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("abort: ")?;
        if let Some(message) = &self.message {
            f.write_str(message)?;
        }
        if let Some(location) = &self.location {
            write!(f, " at: {}", location)?;
        }
        Ok(())
    }
}

/// Extract the message of a panic payload
///
/// `panic!("literal")` carries a `&str`, formatted panics carry a `String`.
pub fn panic_message(payload: &(dyn Any + Send)) -> Option<&str> {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        Some(*message)
    } else {
        payload.downcast_ref::<String>().map(String::as_str)
    }
}
