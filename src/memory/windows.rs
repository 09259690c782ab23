//! Windows memory reader implementation

#![cfg(target_os = "windows")]

use super::MemoryReader;
use crate::game::MODULE_NAME;
use windows::Win32::Foundation::{CloseHandle, HANDLE};
use windows::Win32::System::Diagnostics::Debug::ReadProcessMemory;
use windows::Win32::System::Diagnostics::ToolHelp::{
    CreateToolhelp32Snapshot, Module32FirstW, Module32NextW, MODULEENTRY32W, TH32CS_SNAPMODULE,
    TH32CS_SNAPMODULE32,
};
use windows::Win32::System::Threading::{GetExitCodeProcess, GetProcessId};

// STILL_ACTIVE is 259 (STATUS_PENDING)
const STILL_ACTIVE: u32 = 259;

/// Memory reader over a handle opened by the host with `PROCESS_VM_READ`
/// and `PROCESS_QUERY_INFORMATION`. The handle stays owned by the host.
pub struct WindowsMemoryReader {
    handle: HANDLE,
    /// Module whose size [`MemoryReader::module_size`] reports
    module_name: String,
}

impl WindowsMemoryReader {
    pub fn new(handle: HANDLE) -> Self {
        Self::with_module(handle, MODULE_NAME)
    }

    pub fn with_module(handle: HANDLE, module_name: &str) -> Self {
        Self {
            handle,
            module_name: module_name.to_string(),
        }
    }

    pub fn handle(&self) -> HANDLE {
        self.handle
    }
}

impl MemoryReader for WindowsMemoryReader {
    fn read_bytes(&self, address: usize, size: usize) -> Option<Vec<u8>> {
        let mut buffer = vec![0u8; size];
        let mut bytes_read = 0;

        let result = unsafe {
            ReadProcessMemory(
                self.handle,
                address as *const _,
                buffer.as_mut_ptr() as *mut _,
                size,
                Some(&mut bytes_read),
            )
        };

        if result.is_ok() && bytes_read == size {
            Some(buffer)
        } else {
            None
        }
    }

    fn is_valid(&self) -> bool {
        if self.handle.is_invalid() {
            return false;
        }

        let mut exit_code = 0u32;
        unsafe { GetExitCodeProcess(self.handle, &mut exit_code) }.is_ok()
            && exit_code == STILL_ACTIVE
    }

    fn module_size(&self) -> Option<usize> {
        let pid = unsafe { GetProcessId(self.handle) };
        if pid == 0 {
            return None;
        }
        module_entry_size(pid, &self.module_name)
    }
}

/// Size of a loaded module, from a ToolHelp module snapshot
fn module_entry_size(pid: u32, module_name: &str) -> Option<usize> {
    unsafe {
        let snapshot =
            CreateToolhelp32Snapshot(TH32CS_SNAPMODULE | TH32CS_SNAPMODULE32, pid).ok()?;

        let mut entry = MODULEENTRY32W {
            dwSize: std::mem::size_of::<MODULEENTRY32W>() as u32,
            ..Default::default()
        };

        let mut size = None;
        if Module32FirstW(snapshot, &mut entry).is_ok() {
            loop {
                let len = entry
                    .szModule
                    .iter()
                    .position(|&c| c == 0)
                    .unwrap_or(entry.szModule.len());
                let name = String::from_utf16_lossy(&entry.szModule[..len]);

                if name.eq_ignore_ascii_case(module_name) {
                    size = Some(entry.modBaseSize as usize);
                    break;
                }

                if Module32NextW(snapshot, &mut entry).is_err() {
                    break;
                }
            }
        }

        let _ = CloseHandle(snapshot);
        size
    }
}

// HANDLE is not Send/Sync by default; the engine only reads from the
// polling thread.
unsafe impl Send for WindowsMemoryReader {}
unsafe impl Sync for WindowsMemoryReader {}
