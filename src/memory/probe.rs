//! Typed reads through module-relative address paths

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{MemoryReader, Pointer};

/// A soft read failure.
///
/// The process may be mid-transition, the page may be unmapped, or the
/// process may be gone. Callers skip the update for this tick instead of
/// treating the value as zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ReadFailure {
    #[error("could not read {size} bytes at 0x{address:X}")]
    Unreadable { address: usize, size: usize },
    #[error("null pointer while following offset #{offset_index}")]
    NullPointer { offset_index: usize },
    #[error("no string data at 0x{address:X}")]
    EmptyString { address: usize },
    #[error("unprintable string data at 0x{address:X}")]
    InvalidString { address: usize },
}

/// Location of a value relative to the main module base.
///
/// In TOML/JSON an offset is a plain integer and a chain is an array:
/// `game_state = 0xB9E78`, `boss_health = [0x641C28, 0x7A04]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AddressPath {
    /// `base + offset`
    Offset(i64),
    /// Pointer chase: every offset but the last is dereferenced
    Chain(Vec<i64>),
}

impl AddressPath {
    /// The offsets to hand to a [`Pointer`] rooted at the module base
    pub fn offsets(&self) -> &[i64] {
        match self {
            AddressPath::Offset(offset) => std::slice::from_ref(offset),
            AddressPath::Chain(offsets) => offsets,
        }
    }
}

impl fmt::Display for AddressPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .offsets()
            .iter()
            .map(|o| format!("0x{:X}", o))
            .collect();
        write!(f, "[{}]", parts.join(", "))
    }
}

/// Memory access for one attached process
pub struct MemoryProbe {
    reader: Arc<dyn MemoryReader>,
    /// Base address of the main module
    base_address: usize,
    /// Size of the main module as reported at attach time
    module_size: usize,
    /// Process ID
    process_id: u32,
}

impl MemoryProbe {
    /// Create a probe for a 32-bit process such as `stvoy.exe`
    pub fn new(
        reader: Arc<dyn MemoryReader>,
        base_address: usize,
        module_size: usize,
        process_id: u32,
    ) -> Self {
        Self {
            reader,
            base_address,
            module_size,
            process_id,
        }
    }

    pub fn base_address(&self) -> usize {
        self.base_address
    }

    pub fn process_id(&self) -> u32 {
        self.process_id
    }

    /// Module size as currently known.
    ///
    /// Prefers a live value from the reader over the attach-time value.
    pub fn module_size(&self) -> usize {
        self.reader.module_size().unwrap_or(self.module_size)
    }

    /// Whether the target process is still alive
    pub fn is_valid(&self) -> bool {
        self.reader.is_valid()
    }

    /// Resolve a path to an absolute address
    pub fn resolve(&self, path: &AddressPath) -> Result<usize, ReadFailure> {
        Pointer::new(self.base_address, path.offsets(), false).resolve(&*self.reader)
    }

    /// Read a little-endian i32
    pub fn read_int(&self, path: &AddressPath) -> Result<i32, ReadFailure> {
        let address = self.resolve(path)?;
        self.reader
            .read_i32(address)
            .ok_or(ReadFailure::Unreadable { address, size: 4 })
    }

    /// Read a 4-byte flag, non-zero meaning set
    pub fn read_flag(&self, path: &AddressPath) -> Result<bool, ReadFailure> {
        self.read_int(path).map(|v| v != 0)
    }

    /// Read a NUL-terminated string of at most `max_len` bytes.
    ///
    /// Zero usable bytes is a failure, never an empty string. So is any byte
    /// that is not printable ASCII, which is what a half-written buffer
    /// looks like.
    pub fn read_fixed_string(
        &self,
        path: &AddressPath,
        max_len: usize,
    ) -> Result<String, ReadFailure> {
        let address = self.resolve(path)?;
        let bytes = self
            .reader
            .read_bytes(address, max_len)
            .ok_or(ReadFailure::Unreadable {
                address,
                size: max_len,
            })?;

        let len = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
        if len == 0 {
            return Err(ReadFailure::EmptyString { address });
        }

        let text = &bytes[..len];
        if !text.iter().all(|b| b.is_ascii_graphic()) {
            return Err(ReadFailure::InvalidString { address });
        }

        Ok(text.iter().map(|&b| b as char).collect())
    }
}

impl fmt::Debug for MemoryProbe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryProbe")
            .field("base_address", &format_args!("0x{:X}", self.base_address))
            .field("module_size", &self.module_size)
            .field("process_id", &self.process_id)
            .finish()
    }
}
