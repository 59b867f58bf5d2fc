//! Read command implementation.

use anyhow::Result;
use xivmem::{MemoryAccessor, StringEncoding, TargetProcess};

use super::hexdump;
use crate::cli::ValueKind;
use crate::target::{parse_extra_offset, resolve_address};

/// What to read at the resolved address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadMode {
    Scalar(ValueKind),
    Bytes(usize),
    String(StringEncoding),
}

impl ReadMode {
    pub fn from_args(
        kind: Option<ValueKind>,
        bytes: Option<usize>,
        string: Option<StringEncoding>,
    ) -> Self {
        match (kind, bytes, string) {
            (_, Some(len), _) => ReadMode::Bytes(len),
            (_, _, Some(encoding)) => ReadMode::String(encoding),
            (Some(kind), _, _) => ReadMode::Scalar(kind),
            (None, None, None) => ReadMode::Scalar(ValueKind::Ptr),
        }
    }
}

pub fn run<P: TargetProcess>(
    accessor: &MemoryAccessor<P>,
    descriptor: &str,
    mode: ReadMode,
    offset: Option<&str>,
) -> Result<()> {
    let address = resolve_address(accessor, descriptor, parse_extra_offset(offset)?)?;
    print!("{}", read_formatted(accessor, address, mode)?);
    Ok(())
}

fn read_formatted<P: TargetProcess>(
    accessor: &MemoryAccessor<P>,
    address: u64,
    mode: ReadMode,
) -> Result<String> {
    let text = match mode {
        ReadMode::Bytes(len) => {
            let bytes = accessor.read_bytes(address, len)?;
            format!(
                "Hexdump at 0x{:X} ({} bytes):\n\n{}",
                address,
                len,
                hexdump::format(address, &bytes)
            )
        }
        ReadMode::String(encoding) => {
            let text = accessor.read_string(address, encoding)?;
            format!("0x{:X}: {:?}\n", address, text)
        }
        ReadMode::Scalar(kind) => format!("0x{:X}: {}\n", address, read_scalar(accessor, address, kind)?),
    };
    Ok(text)
}

fn read_scalar<P: TargetProcess>(
    accessor: &MemoryAccessor<P>,
    address: u64,
    kind: ValueKind,
) -> Result<String> {
    let text = match kind {
        ValueKind::U8 => hex_and_decimal(accessor.read::<u8>(address)?.into()),
        ValueKind::U16 => hex_and_decimal(accessor.read::<u16>(address)?.into()),
        ValueKind::U32 => hex_and_decimal(accessor.read::<u32>(address)?.into()),
        ValueKind::U64 => hex_and_decimal(accessor.read::<u64>(address)?),
        ValueKind::Ptr => format!("0x{:X}", accessor.read_pointer(address)?),
        ValueKind::I8 => accessor.read::<i8>(address)?.to_string(),
        ValueKind::I16 => accessor.read::<i16>(address)?.to_string(),
        ValueKind::I32 => accessor.read::<i32>(address)?.to_string(),
        ValueKind::I64 => accessor.read::<i64>(address)?.to_string(),
        ValueKind::F32 => accessor.read::<f32>(address)?.to_string(),
        ValueKind::F64 => accessor.read::<f64>(address)?.to_string(),
    };
    Ok(text)
}

fn hex_and_decimal(value: u64) -> String {
    format!("{} (0x{:X})", value, value)
}
