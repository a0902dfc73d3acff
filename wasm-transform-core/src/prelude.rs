//! Prelude module
//!
//! Re-exports the types a plugin or host harness needs most often.

pub use crate::abi::{BufferHandle, LogLevel, Status, APPLY, DISCARD};
pub use crate::config::{TransformConfig, TransformConfigBuilder};
pub use crate::diagnostics::{AbortReport, SourceLocation};
pub use crate::env::{Environment, MapEnv, ProcessEnv};
pub use crate::error::{Error, ErrorKind, Result};
pub use crate::logging::with_host_logging;
pub use crate::request::{ObjectNode, RequestDocument};
pub use crate::transform::{return_code, HostAbi, Mutation, Stage, Transformer};

pub use thiserror::Error as ThisError;
