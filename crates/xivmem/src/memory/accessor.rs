use tracing::{debug, trace};

use super::{Scalar, StringEncoding, TargetProcess};
use crate::config::AccessorConfig;
use crate::error::{Error, Result};
use crate::module::{ModuleCatalog, ModuleDescriptor};

/// Typed, byte-exact access to a target process.
///
/// The accessor owns its [`TargetProcess`]; dropping the accessor releases the
/// underlying handle. No locking is added on top of the OS primitives, so a
/// write issued while another thread resolves a pointer chain may be observed
/// halfway through that chain.
#[derive(Debug)]
pub struct MemoryAccessor<P: TargetProcess> {
    process: P,
    pointer_width: usize,
    config: AccessorConfig,
}

impl<P: TargetProcess> MemoryAccessor<P> {
    /// Wrap a process with the default configuration.
    ///
    /// Fails with [`Error::IncompatibleBitness`] if the target's pointers are
    /// wider than the host's.
    pub fn open(process: P) -> Result<Self> {
        Self::with_config(process, AccessorConfig::default())
    }

    /// Wrap a process with a custom configuration
    pub fn with_config(process: P, config: AccessorConfig) -> Result<Self> {
        let pointer_width = process.pointer_width();
        let host_width = std::mem::size_of::<usize>();

        if !matches!(pointer_width, 4 | 8) || pointer_width > host_width {
            return Err(Error::IncompatibleBitness {
                target_width: pointer_width,
                host_width,
            });
        }

        debug!(
            "Opened memory accessor (pointer width: {} bytes, string bound: {} bytes)",
            pointer_width, config.max_string_len
        );

        Ok(Self {
            process,
            pointer_width,
            config,
        })
    }

    pub fn process(&self) -> &P {
        &self.process
    }

    pub fn config(&self) -> &AccessorConfig {
        &self.config
    }

    /// Native pointer size of the target in bytes (4 or 8)
    pub fn pointer_width(&self) -> usize {
        self.pointer_width
    }

    /// Currently loaded modules, queried fresh from the target
    pub fn modules(&self) -> Result<Vec<ModuleDescriptor>> {
        ModuleCatalog::list_modules(&self.process)
    }

    /// Base address of the named module, queried fresh from the target
    pub fn module_base(&self, name: &str) -> Result<u64> {
        ModuleCatalog::resolve_base(&self.process, name)
    }

    // ------------------------------------------------------------------
    // Readers
    // ------------------------------------------------------------------

    /// Read exactly `len` bytes
    pub fn read_bytes(&self, address: u64, len: usize) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        buf.try_reserve_exact(len)
            .map_err(|e| Error::BufferAllocation {
                len,
                message: e.to_string(),
            })?;
        buf.resize(len, 0);
        if len > 0 {
            self.process.read_into(address, &mut buf)?;
        }
        trace!("Read {} bytes at {:#x}", len, address);
        Ok(buf)
    }

    /// Read a little-endian scalar
    pub fn read<T: Scalar>(&self, address: u64) -> Result<T> {
        let bytes = self.read_bytes(address, T::SIZE)?;
        T::from_le_slice(&bytes).ok_or_else(|| Error::AccessDenied {
            address,
            len: T::SIZE,
            message: format!("expected {} bytes, got {}", T::SIZE, bytes.len()),
        })
    }

    pub fn read_u8(&self, address: u64) -> Result<u8> {
        self.read(address)
    }

    pub fn read_u16(&self, address: u64) -> Result<u16> {
        self.read(address)
    }

    pub fn read_u32(&self, address: u64) -> Result<u32> {
        self.read(address)
    }

    pub fn read_i32(&self, address: u64) -> Result<i32> {
        self.read(address)
    }

    pub fn read_u64(&self, address: u64) -> Result<u64> {
        self.read(address)
    }

    pub fn read_f32(&self, address: u64) -> Result<f32> {
        self.read(address)
    }

    pub fn read_f64(&self, address: u64) -> Result<f64> {
        self.read(address)
    }

    /// Read one pointer-width unsigned value, zero-extended to u64
    pub fn read_pointer(&self, address: u64) -> Result<u64> {
        match self.pointer_width {
            4 => self.read::<u32>(address).map(u64::from),
            _ => self.read::<u64>(address),
        }
    }

    /// Read a null-terminated string.
    ///
    /// Reads one code unit per OS call until a zero unit is found. Fails with
    /// [`Error::UnterminatedString`] if no terminator appears within
    /// `max_string_len` bytes; nothing past that bound is read.
    pub fn read_string(&self, address: u64, encoding: StringEncoding) -> Result<String> {
        let unit = encoding.unit_size();
        let max_len = self.config.max_string_len;
        let mut bytes = Vec::new();
        let mut consumed = 0usize;

        while consumed + unit <= max_len {
            let code_unit = self.read_bytes(address.wrapping_add(consumed as u64), unit)?;
            consumed += unit;

            if code_unit.iter().all(|&b| b == 0) {
                return encoding.decode(&bytes);
            }
            bytes.extend_from_slice(&code_unit);
        }

        Err(Error::UnterminatedString { address, max_len })
    }

    // ------------------------------------------------------------------
    // Writers
    // ------------------------------------------------------------------

    /// Write a byte buffer in a single OS call
    pub fn write_bytes(&self, address: u64, data: &[u8]) -> Result<()> {
        if data.is_empty() {
            return Ok(());
        }
        self.process.write_from(address, data)?;
        trace!("Wrote {} bytes at {:#x}", data.len(), address);
        Ok(())
    }

    /// Write a little-endian scalar
    pub fn write<T: Scalar>(&self, address: u64, value: T) -> Result<()> {
        self.write_bytes(address, &value.to_le_vec())
    }

    /// Write one pointer-width value.
    ///
    /// Fails with [`Error::PointerOverflow`] before writing if `value` does not
    /// fit in the target's pointer width.
    pub fn write_pointer(&self, address: u64, value: u64) -> Result<()> {
        match self.pointer_width {
            4 => {
                let narrow = u32::try_from(value).map_err(|_| Error::PointerOverflow {
                    value,
                    width: self.pointer_width,
                })?;
                self.write(address, narrow)
            }
            _ => self.write(address, value),
        }
    }

    /// Write a string, optionally followed by a zero terminator
    pub fn write_string(
        &self,
        address: u64,
        text: &str,
        encoding: StringEncoding,
        zero_terminate: bool,
    ) -> Result<()> {
        let bytes = encoding.encode(text, zero_terminate)?;
        self.write_bytes(address, &bytes)
    }
}
