//! Guest linear memory
//!
//! The host places data into guest memory through the exported `allocate`
//! and refers to it by (address, length). Every handle coming from the host is
//! validated against the current memory size before it is read, and reads copy
//! the bytes out so nothing borrowed from host-written memory outlives the
//! call.

use wasm_transform_core::abi::{prefixed_payload, BufferHandle, SLOT_SIZE};
use wasm_transform_core::error::BufferError;

/// Reserve `size` zeroed bytes that stay valid until the instance is torn down
///
/// Nothing is ever freed; the host drops the whole instance after the call.
/// At least one byte is reserved so the host never sees a null address.
pub fn allocate_pinned(size: usize) -> *mut u8 {
    let buffer = vec![0u8; size.max(1)].into_boxed_slice();
    Box::leak(buffer).as_mut_ptr()
}

/// Byte-addressed memory the host can point into
pub trait GuestMemory {
    /// Current size in bytes
    fn size(&self) -> usize;

    /// Copy out a range that has already passed [`BufferHandle::validate`]
    fn copy_validated(&self, handle: BufferHandle) -> Vec<u8>;

    /// Validate a handle and copy its bytes
    fn read(&self, handle: BufferHandle) -> Result<Vec<u8>, BufferError> {
        let handle = handle.validate(self.size())?;
        Ok(self.copy_validated(handle))
    }

    /// Read a length-prefixed string; address `0` means absent
    fn read_prefixed(&self, addr: usize) -> Result<Option<Vec<u8>>, BufferError> {
        if addr == 0 {
            return Ok(None);
        }
        let header = self.read(BufferHandle::new(addr, SLOT_SIZE))?;
        let mut len = [0u8; SLOT_SIZE];
        len.copy_from_slice(&header);
        let payload = prefixed_payload(addr, len)?;
        self.read(payload).map(Some)
    }
}

/// The module's own linear memory (memory index 0)
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearMemory;

#[cfg(target_arch = "wasm32")]
impl GuestMemory for LinearMemory {
    fn size(&self) -> usize {
        wasm_transform_core::abi::memory_bytes(core::arch::wasm32::memory_size(0))
    }

    fn copy_validated(&self, handle: BufferHandle) -> Vec<u8> {
        if handle.is_empty() {
            return Vec::new();
        }
        // Safety: the handle is non-null and lies inside linear memory, every
        // byte of which is addressable.
        let bytes = unsafe { std::slice::from_raw_parts(handle.addr() as *const u8, handle.len()) };
        bytes.to_vec()
    }
}

/// Vec-backed memory where addresses are offsets
#[cfg(test)]
pub(crate) struct ScratchMemory {
    bytes: Vec<u8>,
}

#[cfg(test)]
impl ScratchMemory {
    pub(crate) fn new(size: usize) -> Self {
        Self {
            bytes: vec![0; size],
        }
    }

    pub(crate) fn write(&mut self, addr: usize, data: &[u8]) {
        self.bytes[addr..addr + data.len()].copy_from_slice(data);
    }

    pub(crate) fn write_prefixed(&mut self, addr: usize, text: &str) {
        self.write(addr, &(text.len() as u32).to_le_bytes());
        self.write(addr + SLOT_SIZE, text.as_bytes());
    }
}

#[cfg(test)]
impl GuestMemory for ScratchMemory {
    fn size(&self) -> usize {
        self.bytes.len()
    }

    fn copy_validated(&self, handle: BufferHandle) -> Vec<u8> {
        self.bytes[handle.addr()..handle.addr() + handle.len()].to_vec()
    }
}
