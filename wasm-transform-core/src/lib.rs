//! # wasm-transform core
//!
//! Portable half of a request-transform plugin that runs as a WASM guest inside
//! an API gateway. The host hands the guest a JSON request descriptor, the
//! guest adds headers and hands it back, and the return value of `transform`
//! tells the host whether to apply the result.
//!
//! This crate contains everything that does not touch raw imports:
//!
//! - ABI encodings (status codes, log levels, buffer handles)
//! - Error types
//! - The request model and the transform pipeline
//! - Abort reporting and host log forwarding
//!
//! The `wasm-transform-guest` crate wires these to the actual imports and
//! exports.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs, missing_debug_implementations, rust_2018_idioms)]

pub mod abi;
pub mod config;
pub mod diagnostics;
pub mod env;
pub mod error;
pub mod logging;
pub mod request;
pub mod transform;

pub mod prelude;

pub use abi::{BufferHandle, LogLevel, Status, APPLY, DISCARD};
pub use config::TransformConfig;
pub use diagnostics::{AbortReport, SourceLocation};
pub use env::{Environment, MapEnv, ProcessEnv};
pub use error::{BufferError, ConfigError, DecodeError, Error, ErrorKind, Result};
pub use request::{ObjectNode, RequestDocument};
pub use transform::{return_code, HostAbi, Mutation, Stage, Transformer};
