//! Linux memory reader implementation (Proton/Wine)

#![cfg(target_os = "linux")]

use std::fs;
use std::path::Path;

use super::MemoryReader;
use crate::game::MODULE_NAME;

/// Memory reader using `process_vm_readv` on the Wine process
pub struct LinuxMemoryReader {
    pid: i32,
    /// File name of the main module as it appears in `/proc/<pid>/maps`
    module_name: String,
}

impl LinuxMemoryReader {
    pub fn new(pid: i32) -> Self {
        Self::with_module(pid, MODULE_NAME)
    }

    /// Reader whose [`MemoryReader::module_size`] reports `module_name`
    pub fn with_module(pid: i32, module_name: &str) -> Self {
        Self {
            pid,
            module_name: module_name.to_string(),
        }
    }

    pub fn pid(&self) -> i32 {
        self.pid
    }
}

impl MemoryReader for LinuxMemoryReader {
    fn read_bytes(&self, address: usize, size: usize) -> Option<Vec<u8>> {
        let mut buffer = vec![0u8; size];

        let local_iov = libc::iovec {
            iov_base: buffer.as_mut_ptr() as *mut _,
            iov_len: size,
        };

        let remote_iov = libc::iovec {
            iov_base: address as *mut _,
            iov_len: size,
        };

        let result = unsafe { libc::process_vm_readv(self.pid, &local_iov, 1, &remote_iov, 1, 0) };

        if result == size as isize {
            Some(buffer)
        } else {
            None
        }
    }

    fn is_valid(&self) -> bool {
        Path::new(&format!("/proc/{}", self.pid)).exists()
    }

    fn module_size(&self) -> Option<usize> {
        let maps = fs::read_to_string(format!("/proc/{}/maps", self.pid)).ok()?;
        module_span(&maps, &self.module_name).map(|(_, size)| size)
    }
}

/// Base address and size of a mapped file, from the text of `/proc/<pid>/maps`.
///
/// Spans from the start of the first mapping of the file to the end of the
/// last one. The file name is matched case-insensitively.
fn module_span(maps: &str, module_name: &str) -> Option<(usize, usize)> {
    let mut base_address = None;
    let mut end_address = 0usize;

    for line in maps.lines() {
        let parts: Vec<&str> = line.split_whitespace().collect();
        // address perms offset dev inode pathname
        if parts.len() < 6 {
            continue;
        }

        let file_name = parts[5..].join(" ");
        let file_name = file_name.rsplit('/').next().unwrap_or_default();
        if !file_name.eq_ignore_ascii_case(module_name) {
            continue;
        }

        let Some((start, end)) = parts[0].split_once('-') else {
            continue;
        };
        let (Ok(start), Ok(end)) = (
            usize::from_str_radix(start, 16),
            usize::from_str_radix(end, 16),
        ) else {
            continue;
        };

        if base_address.is_none() {
            base_address = Some(start);
        }
        end_address = end_address.max(end);
    }

    let base = base_address?;
    Some((base, end_address - base))
}
