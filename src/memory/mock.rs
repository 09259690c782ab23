//! Scripted memory for tests and host-side dry runs
//!
//! The mock is shared behind an `Arc` with the engine, so all writers take
//! `&self` and memory can be changed between ticks.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use parking_lot::RwLock;

use super::MemoryReader;

/// Bytes reserved behind every string written with [`MockMemoryReader::write_c_string`]
const STRING_BLOCK_LEN: usize = 64;

/// Mock memory reader that returns data from a pre-configured memory map
pub struct MockMemoryReader {
    /// Memory contents: block start -> bytes
    memory: RwLock<HashMap<usize, Vec<u8>>>,
    /// Live module size, 0 meaning "unknown"
    module_size: AtomicUsize,
    /// Whether the process is "running"
    valid: AtomicBool,
}

impl MockMemoryReader {
    /// Create a new, empty mock memory reader
    pub fn new() -> Self {
        Self {
            memory: RwLock::new(HashMap::new()),
            module_size: AtomicUsize::new(0),
            valid: AtomicBool::new(true),
        }
    }

    /// Set the module size reported to version detection
    pub fn with_module_size(self, size: usize) -> Self {
        self.set_module_size(size);
        self
    }

    /// Change the module size reported to version detection
    pub fn set_module_size(&self, size: usize) {
        self.module_size.store(size, Ordering::SeqCst);
    }

    /// Write bytes to mock memory, replacing any block starting at `address`
    pub fn write_bytes(&self, address: usize, data: &[u8]) {
        self.memory.write().insert(address, data.to_vec());
    }

    /// Write a u32 to mock memory
    pub fn write_u32(&self, address: usize, value: u32) {
        self.write_bytes(address, &value.to_le_bytes());
    }

    /// Write an i32 to mock memory
    pub fn write_i32(&self, address: usize, value: i32) {
        self.write_bytes(address, &value.to_le_bytes());
    }

    /// Write a u64 to mock memory
    pub fn write_u64(&self, address: usize, value: u64) {
        self.write_bytes(address, &value.to_le_bytes());
    }

    /// Write a NUL-terminated string padded with zeros, like a fixed char buffer
    pub fn write_c_string(&self, address: usize, value: &str) {
        let mut data = value.as_bytes().to_vec();
        data.resize(STRING_BLOCK_LEN.max(data.len() + 1), 0);
        self.write_bytes(address, &data);
    }

    /// Remove whatever block starts at `address`
    pub fn clear(&self, address: usize) {
        self.memory.write().remove(&address);
    }

    /// Invalidate the process (simulate process exit)
    pub fn invalidate(&self) {
        self.valid.store(false, Ordering::SeqCst);
    }
}

impl Default for MockMemoryReader {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryReader for MockMemoryReader {
    fn read_bytes(&self, address: usize, size: usize) -> Option<Vec<u8>> {
        if !self.valid.load(Ordering::SeqCst) {
            return None;
        }

        let memory = self.memory.read();

        // Check for exact match first
        if let Some(data) = memory.get(&address) {
            if data.len() >= size {
                return Some(data[..size].to_vec());
            }
        }

        // Check if the address falls within any stored block
        memory.iter().find_map(|(&start, data)| {
            let offset = address.checked_sub(start)?;
            (offset + size <= data.len()).then(|| data[offset..offset + size].to_vec())
        })
    }

    fn is_valid(&self) -> bool {
        self.valid.load(Ordering::SeqCst)
    }

    fn module_size(&self) -> Option<usize> {
        match self.module_size.load(Ordering::SeqCst) {
            0 => None,
            size => Some(size),
        }
    }
}
