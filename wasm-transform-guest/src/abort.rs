//! Abort reports from raw arguments

use crate::memory::GuestMemory;
use wasm_transform_core::diagnostics::{AbortReport, SourceLocation};

/// Build the report for an `abort_proc_exit(message, file, line, column)` call
///
/// `message` and `file` are addresses of length-prefixed strings or `0`.
/// Unreadable arguments are described in the report instead of failing, since
/// the call is about to trap anyway.
pub fn abort_report<M: GuestMemory + ?Sized>(
    memory: &M,
    message: usize,
    file: usize,
    line: u32,
    column: u32,
) -> AbortReport {
    let message = read_text(memory, message, "message");
    let location = read_text(memory, file, "file").map(|file| SourceLocation::new(file, line, column));
    AbortReport::new(message, location)
}

fn read_text<M: GuestMemory + ?Sized>(memory: &M, addr: usize, what: &str) -> Option<String> {
    match memory.read_prefixed(addr) {
        Ok(bytes) => bytes.map(|bytes| String::from_utf8_lossy(&bytes).into_owned()),
        Err(err) => Some(format!("<unreadable {}: {}>", what, err)),
    }
}
