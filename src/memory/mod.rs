//! Process memory access
//!
//! Everything the engine knows about the game comes through the
//! [`MemoryReader`] trait. The host attaches a reader (a platform reader or
//! [`MockMemoryReader`] in tests) and the engine wraps it in a
//! [`MemoryProbe`] that understands module-relative address paths.
//! - Windows: `ReadProcessMemory`
//! - Linux: `process_vm_readv` (Proton/Wine)

#[cfg(target_os = "windows")]
mod windows;

#[cfg(target_os = "linux")]
mod linux;

mod mock;
mod pointer;
mod probe;

pub use mock::MockMemoryReader;
pub use pointer::Pointer;
pub use probe::{AddressPath, MemoryProbe, ReadFailure};

#[cfg(target_os = "windows")]
pub use windows::WindowsMemoryReader;

#[cfg(target_os = "linux")]
pub use linux::LinuxMemoryReader;

/// Platform-agnostic memory reading trait
pub trait MemoryReader: Send + Sync {
    /// Read raw bytes from memory
    fn read_bytes(&self, address: usize, size: usize) -> Option<Vec<u8>>;

    /// Read a u8 value
    fn read_u8(&self, address: usize) -> Option<u8> {
        self.read_bytes(address, 1).map(|b| b[0])
    }

    /// Read a u32 value (little-endian)
    fn read_u32(&self, address: usize) -> Option<u32> {
        self.read_bytes(address, 4)
            .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// Read an i32 value (little-endian)
    fn read_i32(&self, address: usize) -> Option<i32> {
        self.read_bytes(address, 4)
            .map(|b| i32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// Read a u64 value (little-endian)
    fn read_u64(&self, address: usize) -> Option<u64> {
        self.read_bytes(address, 8).map(|b| {
            u64::from_le_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]])
        })
    }

    /// Read a pointer sized for the target process, not for the host.
    ///
    /// `stvoy.exe` is a 32-bit binary, so readers attached to it are asked
    /// for 4-byte pointers even on a 64-bit host.
    fn read_ptr(&self, address: usize, is_64_bit: bool) -> Option<usize> {
        if is_64_bit {
            self.read_u64(address).map(|v| v as usize)
        } else {
            self.read_u32(address).map(|v| v as usize)
        }
    }

    /// Whether the target process is still alive
    fn is_valid(&self) -> bool {
        true
    }

    /// Current size of the main module, if the reader can query it.
    ///
    /// Used to retry version detection when the size seen at attach time
    /// was not final yet.
    fn module_size(&self) -> Option<usize> {
        None
    }
}
