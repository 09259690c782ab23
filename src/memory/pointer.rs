//! Pointer chain resolution
//!
//! A [`Pointer`] is a base address plus a list of offsets. Every offset
//! except the last is added and dereferenced; the last one is only added to
//! produce the final address.

use super::{MemoryReader, ReadFailure};

/// A pointer with offset chain for resolving nested memory addresses
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pointer {
    /// Base address (absolute, usually the module base)
    pub base: usize,
    /// Chain of offsets to follow
    pub offsets: Vec<i64>,
    /// Whether the target process uses 8-byte pointers
    pub is_64_bit: bool,
}

impl Pointer {
    /// Create a pointer from a base address and an offset chain
    pub fn new(base: usize, offsets: &[i64], is_64_bit: bool) -> Self {
        Self {
            base,
            offsets: offsets.to_vec(),
            is_64_bit,
        }
    }

    /// Resolve the chain to the final address.
    ///
    /// A failed intermediate read or a null intermediate pointer ends the
    /// walk with a [`ReadFailure`]; there is no partially resolved address.
    pub fn resolve(&self, reader: &dyn MemoryReader) -> Result<usize, ReadFailure> {
        let mut ptr = self.base;
        let last = self.offsets.len().saturating_sub(1);
        let ptr_size = if self.is_64_bit { 8 } else { 4 };

        for (i, &offset) in self.offsets.iter().enumerate() {
            let address = offset_address(ptr, offset);
            if i == last {
                ptr = address;
                break;
            }

            ptr = reader
                .read_ptr(address, self.is_64_bit)
                .ok_or(ReadFailure::Unreadable {
                    address,
                    size: ptr_size,
                })?;

            if ptr == 0 {
                return Err(ReadFailure::NullPointer { offset_index: i });
            }
        }

        Ok(ptr)
    }
}

fn offset_address(base: usize, offset: i64) -> usize {
    if offset >= 0 {
        base.wrapping_add(offset as usize)
    } else {
        base.wrapping_sub(offset.unsigned_abs() as usize)
    }
}
