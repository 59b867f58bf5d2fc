//! Attaching to the game and turning descriptors into addresses.

use anyhow::{Context, Result};
use tracing::info;
use xivmem::{MemoryAccessor, Offset, Pointer, ProcessHandle, TargetProcess, offset_address};

use crate::config::CliConfig;

/// Open the process by PID, or by executable name when no PID is given
pub fn attach(
    pid: Option<u32>,
    process_name: Option<&str>,
    config: &CliConfig,
) -> Result<MemoryAccessor<ProcessHandle>> {
    let process = match pid {
        Some(pid) => ProcessHandle::open(pid)?,
        None => {
            let name = process_name.unwrap_or(&config.process_name);
            ProcessHandle::find_by_name(name)
                .with_context(|| format!("Is {} running?", name))?
        }
    };
    info!("Attached to process {} ({}-bit)", process.pid, process.pointer_width() * 8);

    Ok(MemoryAccessor::with_config(process, config.accessor_config())?)
}

pub fn parse_pointer(descriptor: &str) -> Result<Pointer> {
    descriptor
        .parse()
        .with_context(|| format!("Invalid descriptor '{}'", descriptor))
}

/// Parse a signed hex offset given on the command line
pub fn parse_extra_offset(offset: Option<&str>) -> Result<Offset> {
    offset
        .map(|text| xivmem::pointer::parse_offset(text).context("Invalid --offset"))
        .transpose()
        .map(|offset| offset.unwrap_or(0))
}

/// Resolve `descriptor` and add `extra` to the result
pub fn resolve_address<P: TargetProcess>(
    accessor: &MemoryAccessor<P>,
    descriptor: &str,
    extra: Offset,
) -> Result<u64> {
    let mut pointer = parse_pointer(descriptor)?;
    let address = pointer
        .resolve(accessor)
        .with_context(|| format!("Failed to resolve {}", pointer))?;
    Ok(offset_address(address, extra, accessor.pointer_width()))
}
