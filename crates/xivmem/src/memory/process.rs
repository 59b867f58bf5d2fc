use crate::error::Result;
use crate::module::ModuleDescriptor;

/// Raw access to another process's address space.
///
/// Implementors perform exactly one OS call per operation and report any
/// short read or write as a failure. Typed access lives in
/// [`MemoryAccessor`](super::MemoryAccessor).
pub trait TargetProcess {
    /// Fill `buf` with the bytes at `address`
    fn read_into(&self, address: u64, buf: &mut [u8]) -> Result<()>;

    /// Write all of `data` at `address`
    fn write_from(&self, address: u64, data: &[u8]) -> Result<()>;

    /// Native pointer size of the target in bytes (4 or 8)
    fn pointer_width(&self) -> usize;

    /// Modules currently loaded in the target, in OS-reported order
    fn modules(&self) -> Result<Vec<ModuleDescriptor>>;
}

impl<T: TargetProcess + ?Sized> TargetProcess for &T {
    fn read_into(&self, address: u64, buf: &mut [u8]) -> Result<()> {
        (**self).read_into(address, buf)
    }

    fn write_from(&self, address: u64, data: &[u8]) -> Result<()> {
        (**self).write_from(address, data)
    }

    fn pointer_width(&self) -> usize {
        (**self).pointer_width()
    }

    fn modules(&self) -> Result<Vec<ModuleDescriptor>> {
        (**self).modules()
    }
}
