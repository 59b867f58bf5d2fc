//! In-memory target process for tests.
//!
//! ```
//! use xivmem::memory::mock::MockProcessBuilder;
//! use xivmem::memory::MemoryAccessor;
//!
//! let process = MockProcessBuilder::new()
//!     .module("ffxiv_dx11.exe", 0x1_4000_0000, 0x200_0000)
//!     .pointer(0x1_4000_0010, 0x2000)
//!     .bytes(0x2000, &[0u8; 0x100])
//!     .build();
//! let accessor = MemoryAccessor::open(process).unwrap();
//! assert_eq!(accessor.read_pointer(0x1_4000_0010).unwrap(), 0x2000);
//! ```

use std::cell::{Cell, RefCell};
use std::path::PathBuf;

use super::TargetProcess;
use crate::error::{Error, Result};
use crate::module::ModuleDescriptor;

#[derive(Debug, Clone)]
struct Region {
    base: u64,
    data: Vec<u8>,
}

impl Region {
    /// Byte range inside this region covering `[address, address + len)`
    fn span(&self, address: u64, len: usize) -> Option<std::ops::Range<usize>> {
        let start = usize::try_from(address.checked_sub(self.base)?).ok()?;
        let end = start.checked_add(len)?;
        (end <= self.data.len()).then_some(start..end)
    }
}

/// Mock target process backed by a list of byte regions
#[derive(Debug)]
pub struct MockProcess {
    pointer_width: usize,
    regions: RefCell<Vec<Region>>,
    modules: Vec<ModuleDescriptor>,
    reads: Cell<usize>,
    writes: Cell<usize>,
}

impl MockProcess {
    /// Number of `read_into` calls made so far
    pub fn read_count(&self) -> usize {
        self.reads.get()
    }

    /// Number of `write_from` calls made so far
    pub fn write_count(&self) -> usize {
        self.writes.get()
    }

    /// Overwrite bytes inside an existing region, bypassing the counters
    pub fn poke(&self, address: u64, data: &[u8]) {
        let mut regions = self.regions.borrow_mut();
        if let Some((region, span)) = regions
            .iter_mut()
            .find_map(|r| r.span(address, data.len()).map(|s| (r, s)))
        {
            region.data[span].copy_from_slice(data);
        }
    }
}

impl TargetProcess for MockProcess {
    fn read_into(&self, address: u64, buf: &mut [u8]) -> Result<()> {
        self.reads.set(self.reads.get() + 1);

        let regions = self.regions.borrow();
        let (region, span) = regions
            .iter()
            .find_map(|r| r.span(address, buf.len()).map(|s| (r, s)))
            .ok_or_else(|| Error::AccessDenied {
                address,
                len: buf.len(),
                message: "address not mapped in mock memory".to_string(),
            })?;

        buf.copy_from_slice(&region.data[span]);
        Ok(())
    }

    fn write_from(&self, address: u64, data: &[u8]) -> Result<()> {
        self.writes.set(self.writes.get() + 1);

        let mut regions = self.regions.borrow_mut();
        let (region, span) = regions
            .iter_mut()
            .find_map(|r| r.span(address, data.len()).map(|s| (r, s)))
            .ok_or_else(|| Error::AccessDenied {
                address,
                len: data.len(),
                message: "address not mapped in mock memory".to_string(),
            })?;

        region.data[span].copy_from_slice(data);
        Ok(())
    }

    fn pointer_width(&self) -> usize {
        self.pointer_width
    }

    fn modules(&self) -> Result<Vec<ModuleDescriptor>> {
        Ok(self.modules.clone())
    }
}

/// Builder for [`MockProcess`]
#[derive(Debug, Clone)]
pub struct MockProcessBuilder {
    pointer_width: usize,
    regions: Vec<Region>,
    modules: Vec<ModuleDescriptor>,
}

impl Default for MockProcessBuilder {
    fn default() -> Self {
        Self {
            pointer_width: 8,
            regions: Vec::new(),
            modules: Vec::new(),
        }
    }
}

impl MockProcessBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pointer_width(mut self, width: usize) -> Self {
        self.pointer_width = width;
        self
    }

    /// Map a region holding `data` at `base`
    pub fn bytes(mut self, base: u64, data: &[u8]) -> Self {
        self.regions.push(Region {
            base,
            data: data.to_vec(),
        });
        self
    }

    /// Map a zero-filled region
    pub fn zeroed(self, base: u64, len: usize) -> Self {
        self.bytes(base, &vec![0u8; len])
    }

    /// Map a pointer-width region at `address` holding `value`
    pub fn pointer(self, address: u64, value: u64) -> Self {
        let width = self.pointer_width.min(8);
        let bytes = value.to_le_bytes();
        self.bytes(address, &bytes[..width])
    }

    /// Register a loaded module. Its image is not mapped; use `bytes` for that.
    pub fn module(mut self, name: &str, base: u64, size: u64) -> Self {
        self.modules.push(ModuleDescriptor {
            name: name.to_string(),
            base,
            size,
            path: None,
        });
        self
    }

    /// Register a loaded module with an on-disk path
    pub fn module_with_path(mut self, name: &str, base: u64, size: u64, path: PathBuf) -> Self {
        self.modules.push(ModuleDescriptor {
            name: name.to_string(),
            base,
            size,
            path: Some(path),
        });
        self
    }

    pub fn build(self) -> MockProcess {
        MockProcess {
            pointer_width: self.pointer_width,
            regions: RefCell::new(self.regions),
            modules: self.modules,
            reads: Cell::new(0),
            writes: Cell::new(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_read_from_middle() {
        let process = MockProcessBuilder::new()
            .bytes(0x1000, &[0x01, 0x02, 0x03, 0x04, 0x05])
            .build();

        let mut buf = [0u8; 2];
        process.read_into(0x1002, &mut buf).unwrap();
        assert_eq!(buf, [0x03, 0x04]);
        assert_eq!(process.read_count(), 1);
    }

    #[test]
    fn test_mock_pointer_respects_width() {
        let process = MockProcessBuilder::new()
            .pointer_width(4)
            .pointer(0x10, 0xAABB_CCDD)
            .build();

        let mut buf = [0u8; 4];
        process.read_into(0x10, &mut buf).unwrap();
        assert_eq!(u32::from_le_bytes(buf), 0xAABB_CCDD);

        let mut wide = [0u8; 8];
        assert!(process.read_into(0x10, &mut wide).is_err());
    }

    #[test]
    fn test_mock_write_and_poke() {
        let process = MockProcessBuilder::new().zeroed(0x40, 8).build();

        process.write_from(0x42, &[9, 9]).unwrap();
        process.poke(0x40, &[7]);

        let mut buf = [0u8; 4];
        process.read_into(0x40, &mut buf).unwrap();
        assert_eq!(buf, [7, 0, 9, 9]);
        assert_eq!(process.write_count(), 1);
    }

    #[test]
    fn test_mock_modules_in_order() {
        let process = MockProcessBuilder::new()
            .module("ffxiv_dx11.exe", 0x1_4000_0000, 0x100)
            .module("ntdll.dll", 0x7FF0_0000_0000, 0x200)
            .build();

        let modules = process.modules().unwrap();
        assert_eq!(modules.len(), 2);
        assert_eq!(modules[0].name, "ffxiv_dx11.exe");
        assert_eq!(modules[1].base, 0x7FF0_0000_0000);
    }
}
