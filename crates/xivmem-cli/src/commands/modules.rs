//! Modules command implementation.

use anyhow::Result;
use xivmem::{MemoryAccessor, ModuleDescriptor, TargetProcess};

pub fn run<P: TargetProcess>(accessor: &MemoryAccessor<P>) -> Result<()> {
    let modules = accessor.modules()?;
    print!("{}", format_modules(&modules));
    println!();
    println!("{} modules", modules.len());
    Ok(())
}

fn format_modules(modules: &[ModuleDescriptor]) -> String {
    let width = modules.iter().map(|m| m.name.len()).max().unwrap_or(0);

    modules
        .iter()
        .map(|m| format!("{:<width$}  0x{:016X}  0x{:X}\n", m.name, m.base, m.size))
        .collect()
}
