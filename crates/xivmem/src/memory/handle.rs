//! OS process handle.
//!
//! On Windows this wraps `OpenProcess` and the ToolHelp snapshot APIs. Other
//! hosts can still compile the crate but cannot open a process.

use super::TargetProcess;
use crate::error::{Error, Result};
use crate::module::ModuleDescriptor;

#[cfg(target_os = "windows")]
use windows::Win32::Foundation::{CloseHandle, HANDLE};

/// An opened handle to another process.
///
/// The handle is closed when this value is dropped.
#[derive(Debug)]
pub struct ProcessHandle {
    pub pid: u32,
    pointer_width: usize,
    #[cfg(target_os = "windows")]
    handle: HANDLE,
}

// SAFETY: a process HANDLE is a kernel object reference; ReadProcessMemory and
// WriteProcessMemory may be called on it concurrently from any thread.
#[cfg(target_os = "windows")]
unsafe impl Send for ProcessHandle {}
#[cfg(target_os = "windows")]
unsafe impl Sync for ProcessHandle {}

#[cfg(target_os = "windows")]
impl ProcessHandle {
    /// Open a process by PID with read, write and query rights
    pub fn open(pid: u32) -> Result<Self> {
        use windows::Win32::System::Threading::{
            OpenProcess, PROCESS_QUERY_INFORMATION, PROCESS_VM_OPERATION, PROCESS_VM_READ,
            PROCESS_VM_WRITE,
        };

        // SAFETY: OpenProcess has no memory-safety preconditions.
        let handle = unsafe {
            OpenProcess(
                PROCESS_VM_READ | PROCESS_VM_WRITE | PROCESS_VM_OPERATION | PROCESS_QUERY_INFORMATION,
                false,
                pid,
            )
        }
        .map_err(|e| Error::ProcessOpenFailed(format!("PID {}: {}", pid, e)))?;

        let pointer_width = match query_pointer_width(handle) {
            Ok(width) => width,
            Err(e) => {
                // SAFETY: handle was returned by OpenProcess above and is not used afterwards.
                let _ = unsafe { CloseHandle(handle) };
                return Err(e);
            }
        };

        tracing::debug!("Opened process {} ({}-bit)", pid, pointer_width * 8);

        Ok(Self {
            pid,
            pointer_width,
            handle,
        })
    }

    /// Find the first process whose executable name matches exactly and open it
    pub fn find_by_name(exe_name: &str) -> Result<Self> {
        let pid = find_pid(exe_name)?
            .ok_or_else(|| Error::ProcessNotFound(exe_name.to_string()))?;
        Self::open(pid)
    }
}

#[cfg(not(target_os = "windows"))]
impl ProcessHandle {
    pub fn open(pid: u32) -> Result<Self> {
        Err(Error::ProcessOpenFailed(format!(
            "PID {}: process memory access is only supported on Windows",
            pid
        )))
    }

    pub fn find_by_name(exe_name: &str) -> Result<Self> {
        Err(Error::ProcessNotFound(format!(
            "{} (process discovery is only supported on Windows)",
            exe_name
        )))
    }
}

#[cfg(target_os = "windows")]
impl Drop for ProcessHandle {
    fn drop(&mut self) {
        // SAFETY: the handle is owned by this value and closed exactly once.
        if let Err(e) = unsafe { CloseHandle(self.handle) } {
            tracing::warn!("Failed to close handle for process {}: {}", self.pid, e);
        }
    }
}

#[cfg(target_os = "windows")]
impl TargetProcess for ProcessHandle {
    fn read_into(&self, address: u64, buf: &mut [u8]) -> Result<()> {
        use windows::Win32::System::Diagnostics::Debug::ReadProcessMemory;

        let len = buf.len();
        let denied = |message: String| Error::AccessDenied {
            address,
            len,
            message,
        };
        let target = usize::try_from(address)
            .map_err(|_| denied("address exceeds host pointer width".to_string()))?;

        let mut read = 0usize;
        // SAFETY: buf is a valid, exclusively borrowed buffer of `len` bytes.
        unsafe {
            ReadProcessMemory(
                self.handle,
                target as *const _,
                buf.as_mut_ptr().cast(),
                len,
                Some(&mut read),
            )
        }
        .map_err(|e| denied(e.to_string()))?;

        if read != len {
            return Err(denied(format!("partial read ({} of {} bytes)", read, len)));
        }
        Ok(())
    }

    fn write_from(&self, address: u64, data: &[u8]) -> Result<()> {
        use windows::Win32::System::Diagnostics::Debug::WriteProcessMemory;

        let len = data.len();
        let denied = |message: String| Error::AccessDenied {
            address,
            len,
            message,
        };
        let target = usize::try_from(address)
            .map_err(|_| denied("address exceeds host pointer width".to_string()))?;

        let mut written = 0usize;
        // SAFETY: data is a valid buffer of `len` bytes for the duration of the call.
        unsafe {
            WriteProcessMemory(
                self.handle,
                target as *const _,
                data.as_ptr().cast(),
                len,
                Some(&mut written),
            )
        }
        .map_err(|e| denied(e.to_string()))?;

        if written != len {
            return Err(denied(format!(
                "partial write ({} of {} bytes)",
                written, len
            )));
        }
        Ok(())
    }

    fn pointer_width(&self) -> usize {
        self.pointer_width
    }

    fn modules(&self) -> Result<Vec<ModuleDescriptor>> {
        snapshot_modules(self.pid)
    }
}

#[cfg(not(target_os = "windows"))]
impl TargetProcess for ProcessHandle {
    fn read_into(&self, address: u64, buf: &mut [u8]) -> Result<()> {
        Err(Error::AccessDenied {
            address,
            len: buf.len(),
            message: "unsupported platform".to_string(),
        })
    }

    fn write_from(&self, address: u64, data: &[u8]) -> Result<()> {
        Err(Error::AccessDenied {
            address,
            len: data.len(),
            message: "unsupported platform".to_string(),
        })
    }

    fn pointer_width(&self) -> usize {
        self.pointer_width
    }

    fn modules(&self) -> Result<Vec<ModuleDescriptor>> {
        Ok(Vec::new())
    }
}

/// Closes a ToolHelp snapshot on drop
#[cfg(target_os = "windows")]
struct Snapshot(HANDLE);

#[cfg(target_os = "windows")]
impl Drop for Snapshot {
    fn drop(&mut self) {
        // SAFETY: the snapshot handle is owned by this guard.
        let _ = unsafe { CloseHandle(self.0) };
    }
}

#[cfg(target_os = "windows")]
fn from_wide(buf: &[u16]) -> String {
    let len = buf.iter().position(|&c| c == 0).unwrap_or(buf.len());
    String::from_utf16_lossy(&buf[..len])
}

#[cfg(target_os = "windows")]
fn query_pointer_width(handle: HANDLE) -> Result<usize> {
    use windows::Win32::System::SystemInformation::{
        IMAGE_FILE_MACHINE, IMAGE_FILE_MACHINE_ARMNT, IMAGE_FILE_MACHINE_I386,
        IMAGE_FILE_MACHINE_UNKNOWN,
    };
    use windows::Win32::System::Threading::IsWow64Process2;

    let mut process_machine = IMAGE_FILE_MACHINE::default();
    let mut native_machine = IMAGE_FILE_MACHINE::default();
    // SAFETY: both out-pointers reference live stack locals.
    unsafe { IsWow64Process2(handle, &mut process_machine, Some(&mut native_machine)) }
        .map_err(|e| Error::ProcessOpenFailed(format!("IsWow64Process2 failed: {}", e)))?;

    // A non-UNKNOWN process machine means the target runs under WOW64
    if process_machine != IMAGE_FILE_MACHINE_UNKNOWN {
        return Ok(4);
    }

    if native_machine == IMAGE_FILE_MACHINE_I386 || native_machine == IMAGE_FILE_MACHINE_ARMNT {
        Ok(4)
    } else {
        Ok(8)
    }
}

#[cfg(target_os = "windows")]
fn snapshot_modules(pid: u32) -> Result<Vec<ModuleDescriptor>> {
    use windows::Win32::System::Diagnostics::ToolHelp::{
        CreateToolhelp32Snapshot, MODULEENTRY32W, Module32FirstW, Module32NextW,
        TH32CS_SNAPMODULE, TH32CS_SNAPMODULE32,
    };

    // SAFETY: CreateToolhelp32Snapshot has no memory-safety preconditions.
    let snapshot = unsafe { CreateToolhelp32Snapshot(TH32CS_SNAPMODULE | TH32CS_SNAPMODULE32, pid) }
        .map(Snapshot)
        .map_err(|e| Error::AccessDenied {
            address: 0,
            len: 0,
            message: format!("module snapshot failed for PID {}: {}", pid, e),
        })?;

    let mut entry = MODULEENTRY32W {
        dwSize: std::mem::size_of::<MODULEENTRY32W>() as u32,
        ..Default::default()
    };

    let mut modules = Vec::new();
    // SAFETY: entry is a properly sized MODULEENTRY32W with dwSize set.
    let mut ok = unsafe { Module32FirstW(snapshot.0, &mut entry) }.is_ok();
    while ok {
        let path = from_wide(&entry.szExePath);
        modules.push(ModuleDescriptor {
            name: from_wide(&entry.szModule),
            base: entry.modBaseAddr as u64,
            size: u64::from(entry.modBaseSize),
            path: (!path.is_empty()).then(|| path.into()),
        });
        // SAFETY: same entry buffer as above.
        ok = unsafe { Module32NextW(snapshot.0, &mut entry) }.is_ok();
    }

    Ok(modules)
}

#[cfg(target_os = "windows")]
fn find_pid(exe_name: &str) -> Result<Option<u32>> {
    use windows::Win32::System::Diagnostics::ToolHelp::{
        CreateToolhelp32Snapshot, PROCESSENTRY32W, Process32FirstW, Process32NextW,
        TH32CS_SNAPPROCESS,
    };

    // SAFETY: CreateToolhelp32Snapshot has no memory-safety preconditions.
    let snapshot = unsafe { CreateToolhelp32Snapshot(TH32CS_SNAPPROCESS, 0) }
        .map(Snapshot)
        .map_err(|e| Error::ProcessNotFound(format!("process snapshot failed: {}", e)))?;

    let mut entry = PROCESSENTRY32W {
        dwSize: std::mem::size_of::<PROCESSENTRY32W>() as u32,
        ..Default::default()
    };

    // SAFETY: entry is a properly sized PROCESSENTRY32W with dwSize set.
    let mut ok = unsafe { Process32FirstW(snapshot.0, &mut entry) }.is_ok();
    while ok {
        if from_wide(&entry.szExeFile) == exe_name {
            return Ok(Some(entry.th32ProcessID));
        }
        // SAFETY: same entry buffer as above.
        ok = unsafe { Process32NextW(snapshot.0, &mut entry) }.is_ok();
    }

    Ok(None)
}
