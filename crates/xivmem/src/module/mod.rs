//! Name to base-address lookup over the modules currently loaded in a target.
//!
//! Nothing here is cached: module bases move on every process restart, so each
//! call re-queries the live module list.

use std::path::PathBuf;

use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::memory::TargetProcess;

/// A loaded executable or library image
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleDescriptor {
    /// File name including extension, e.g. `ffxiv_dx11.exe`
    pub name: String,
    pub base: u64,
    pub size: u64,
    /// Full on-disk path, when the OS reports one
    pub path: Option<PathBuf>,
}

impl ModuleDescriptor {
    /// One past the last byte of the image
    pub fn end(&self) -> u64 {
        self.base.saturating_add(self.size)
    }

    pub fn contains(&self, address: u64) -> bool {
        address >= self.base && address < self.end()
    }
}

/// Stateless module lookups against a [`TargetProcess`]
pub struct ModuleCatalog;

impl ModuleCatalog {
    /// All modules in OS-reported load order
    pub fn list_modules<P: TargetProcess + ?Sized>(process: &P) -> Result<Vec<ModuleDescriptor>> {
        process.modules()
    }

    /// First module whose name matches exactly (case-sensitive, with extension)
    pub fn find<P: TargetProcess + ?Sized>(process: &P, name: &str) -> Result<ModuleDescriptor> {
        let module = process
            .modules()?
            .into_iter()
            .find(|m| m.name == name)
            .ok_or_else(|| Error::ModuleNotFound(name.to_string()))?;

        debug!("Module {} at {:#x} (size {:#x})", module.name, module.base, module.size);
        Ok(module)
    }

    /// Base address of the named module
    pub fn resolve_base<P: TargetProcess + ?Sized>(process: &P, name: &str) -> Result<u64> {
        Self::find(process, name).map(|m| m.base)
    }

    /// The first reported module, which is the process executable
    pub fn main_module<P: TargetProcess + ?Sized>(process: &P) -> Result<ModuleDescriptor> {
        process
            .modules()?
            .into_iter()
            .next()
            .ok_or_else(|| Error::ModuleNotFound("<main module>".to_string()))
    }

    /// Module whose image contains `address`, if any
    pub fn module_containing<P: TargetProcess + ?Sized>(
        process: &P,
        address: u64,
    ) -> Result<Option<ModuleDescriptor>> {
        Ok(process.modules()?.into_iter().find(|m| m.contains(address)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::mock::MockProcessBuilder;

    fn process() -> crate::memory::mock::MockProcess {
        MockProcessBuilder::new()
            .module("ffxiv_dx11.exe", 0x1_4000_0000, 0x200_0000)
            .module("ntdll.dll", 0x7FFA_0000_0000, 0x1F_0000)
            .module("ffxiv_dx11.exe", 0x2_0000_0000, 0x10)
            .build()
    }

    #[test]
    fn test_resolve_base_first_match() {
        let process = process();
        assert_eq!(
            ModuleCatalog::resolve_base(&process, "ffxiv_dx11.exe").unwrap(),
            0x1_4000_0000
        );
    }

    #[test]
    fn test_resolve_base_is_case_sensitive() {
        let process = process();
        assert!(matches!(
            ModuleCatalog::resolve_base(&process, "FFXIV_DX11.EXE"),
            Err(Error::ModuleNotFound(name)) if name == "FFXIV_DX11.EXE"
        ));
        assert!(ModuleCatalog::resolve_base(&process, "ffxiv_dx11").is_err());
    }

    #[test]
    fn test_list_modules_keeps_order() {
        let names: Vec<_> = ModuleCatalog::list_modules(&process())
            .unwrap()
            .into_iter()
            .map(|m| m.name)
            .collect();
        assert_eq!(names, ["ffxiv_dx11.exe", "ntdll.dll", "ffxiv_dx11.exe"]);
    }

    #[test]
    fn test_main_module_and_containment() {
        let process = process();
        assert_eq!(ModuleCatalog::main_module(&process).unwrap().name, "ffxiv_dx11.exe");

        let hit = ModuleCatalog::module_containing(&process, 0x7FFA_0000_1000).unwrap();
        assert_eq!(hit.map(|m| m.name).as_deref(), Some("ntdll.dll"));
        assert!(ModuleCatalog::module_containing(&process, 0x10).unwrap().is_none());
    }

    #[test]
    fn test_lookups_do_not_read_memory() {
        let process = process();
        let _ = ModuleCatalog::resolve_base(&process, "missing.dll");
        assert_eq!(process.read_count(), 0);
    }
}
