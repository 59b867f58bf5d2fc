//! Resolve command implementation.

use anyhow::{Context, Result};
use xivmem::pointer::format_offset;
use xivmem::{MemoryAccessor, Pointer, PointerBase, TargetProcess, Walk};

use crate::target::parse_pointer;

pub fn run<P: TargetProcess>(accessor: &MemoryAccessor<P>, descriptor: &str) -> Result<()> {
    let pointer = parse_pointer(descriptor)?;
    let walk = pointer
        .walk(accessor)
        .with_context(|| format!("Failed to resolve {}", pointer))?;

    print!("{}", format_walk(accessor, &pointer, &walk)?);
    Ok(())
}

fn format_walk<P: TargetProcess>(
    accessor: &MemoryAccessor<P>,
    pointer: &Pointer,
    walk: &Walk,
) -> Result<String> {
    let mut out = format!("{}\n", pointer);

    match pointer.base() {
        PointerBase::Absolute(address) => {
            out += &format!("  base   0x{:X}\n", address);
        }
        PointerBase::ModuleRelative { module, offset } => {
            let module_base = accessor.module_base(module)?;
            out += &format!(
                "  base   {} = 0x{:X}, {} -> 0x{:X}\n",
                module,
                module_base,
                format_offset(*offset),
                xivmem::offset_address(module_base, *offset, accessor.pointer_width())
            );
        }
    }

    for (i, step) in walk.steps.iter().enumerate() {
        out += &format!(
            "  [{}]    [0x{:X}] = 0x{:X}, {} -> 0x{:X}\n",
            i,
            step.read_at,
            step.value,
            format_offset(step.offset),
            step.next
        );
    }

    out += &format!("  => 0x{:X}\n", walk.address);
    Ok(out)
}
