//! Request-transform WASM guest
//!
//! Module contract (build for `wasm32-wasip1`):
//!
//! - Exports `allocate(size) -> addr`: zeroed memory the host writes into.
//! - Exports `transform() -> i32`: fetches the request descriptor through
//!   `env.get_request_json`, adds headers and hands the result back with
//!   `env.set_request_json`. Returns `1` when the host should apply the new
//!   descriptor and `0` otherwise.
//! - Exports `abort_proc_exit(message, file, line, column)`: reports an
//!   unrecoverable error through `env.log` and traps. Its string arguments
//!   are `u32` length-prefixed UTF-8, not AssemblyScript's native UTF-16.
//!
//! Host configuration such as the `secret` entry is read from the WASI
//! environment. Panics are reported the same way as `abort_proc_exit`.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs, missing_debug_implementations, rust_2018_idioms)]

pub mod abort;
pub mod memory;
pub mod panic;

#[cfg(target_arch = "wasm32")]
pub mod imports;

#[cfg(target_arch = "wasm32")]
mod exports {
    use crate::abort::abort_report;
    use crate::imports::{host_log, EnvImports};
    use crate::memory::{allocate_pinned, LinearMemory};
    use crate::panic::install_panic_hook;
    use wasm_transform_core::diagnostics::ABORT_LEVEL;
    use wasm_transform_core::env::ProcessEnv;
    use wasm_transform_core::logging::with_host_logging;
    use wasm_transform_core::transform::{return_code, Transformer};

    #[no_mangle]
    pub extern "C" fn allocate(size: u32) -> *mut u8 {
        install_panic_hook(host_log);
        allocate_pinned(size as usize)
    }

    #[no_mangle]
    pub extern "C" fn transform() -> i32 {
        install_panic_hook(host_log);
        with_host_logging(host_log, || {
            let mut host = EnvImports::new(LinearMemory);
            return_code(&Transformer::default().run(&mut host, &ProcessEnv))
        })
    }

    /// Report an unrecoverable error and trap
    ///
    /// `message` and `file` are addresses of strings laid out as a
    /// little-endian `u32` byte count followed by that many UTF-8 bytes, so
    /// the text starts at `addr + 4`. `0` means the argument is absent.
    /// Invalid UTF-8 is decoded lossily.
    ///
    /// This is not the AssemblyScript runtime's native string layout, where
    /// the pointer addresses UTF-16 code units and the byte length sits at
    /// `ptr - 4`. A caller holding such a string must re-encode it first.
    #[no_mangle]
    pub extern "C" fn abort_proc_exit(message: u32, file: u32, line: u32, column: u32) {
        install_panic_hook(host_log);
        let report = abort_report(&LinearMemory, message as usize, file as usize, line, column);
        host_log(ABORT_LEVEL, &report.to_string());
        core::arch::wasm32::unreachable()
    }
}
