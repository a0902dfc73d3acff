//! Host imports
//!
//! The gateway provides these functions in the `env` module. All pointers are
//! 32-bit addresses into this module's linear memory.

use crate::memory::GuestMemory;
use tracing::debug;
use wasm_transform_core::abi::{BufferHandle, LogLevel, Status};
use wasm_transform_core::error::{BufferError, Error, Result};
use wasm_transform_core::transform::HostAbi;

#[link(wasm_import_module = "env")]
extern "C" {
    /// Host allocates the descriptor through `allocate` and writes its
    /// address and length into the two 4-byte slots.
    fn get_request_json(addr_out: *mut u32, len_out: *mut u32) -> i32;

    /// Host copies the descriptor out of `addr..addr + len`.
    fn set_request_json(addr: *const u8, len: u32) -> i32;

    #[link_name = "log"]
    fn log_message(level: i32, addr: *const u8, len: i32) -> i32;
}

/// Send a message to the host log
///
/// Best effort: a message that does not fit the ABI or is refused by the host
/// is dropped.
pub fn host_log(level: LogLevel, message: &str) {
    let Ok(len) = i32::try_from(message.len()) else {
        return;
    };
    // Safety: `message` is valid for `len` bytes for the duration of the call.
    let _ = unsafe { log_message(level.code(), message.as_ptr(), len) };
}

/// [`HostAbi`] over the `env` imports
#[derive(Debug)]
pub struct EnvImports<M> {
    memory: M,
}

impl<M: GuestMemory> EnvImports<M> {
    /// Create the import bindings for `memory`
    pub fn new(memory: M) -> Self {
        Self { memory }
    }
}

impl<M: GuestMemory> HostAbi for EnvImports<M> {
    fn fetch_request(&mut self) -> Result<Vec<u8>> {
        // per-call slots; nothing is shared between invocations
        let mut addr: u32 = 0;
        let mut len: u32 = 0;

        // Safety: both slots are live, aligned `u32`s on this stack frame.
        let status = Status::from_raw(unsafe { get_request_json(&mut addr, &mut len) });
        if !status.is_ok() {
            return Err(Error::Fetch(status));
        }

        let handle = BufferHandle::new(addr as usize, len as usize);
        let bytes = self.memory.read(handle)?;
        debug!(handle = %handle, "fetched request descriptor");
        Ok(bytes)
    }

    fn submit_request(&mut self, json: &[u8]) -> Result<()> {
        let len = u32::try_from(json.len()).map_err(|_| BufferError::TooLarge { len: json.len() })?;

        // Safety: `json` stays borrowed, and therefore valid, until the host returns.
        let status = Status::from_raw(unsafe { set_request_json(json.as_ptr(), len) });
        if !status.is_ok() {
            return Err(Error::Reject(status));
        }
        Ok(())
    }
}
