//! Write command implementation.

use anyhow::{Context, Result, bail};
use tracing::info;
use xivmem::{MemoryAccessor, Scalar, StringEncoding, TargetProcess};

use crate::cli::ValueKind;
use crate::target::{parse_extra_offset, resolve_address};

/// What to write at the resolved address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    Scalar(ValueKind),
    String {
        encoding: StringEncoding,
        zero_terminate: bool,
    },
}

pub fn run<P: TargetProcess>(
    accessor: &MemoryAccessor<P>,
    descriptor: &str,
    mode: WriteMode,
    offset: Option<&str>,
    value: &str,
) -> Result<()> {
    let address = resolve_address(accessor, descriptor, parse_extra_offset(offset)?)?;
    let written = write_value(accessor, address, mode, value)?;
    info!("Wrote {} bytes at {:#x}", written, address);
    println!("0x{:X}: wrote {} bytes", address, written);
    Ok(())
}

/// Write `value` and return the number of bytes written
fn write_value<P: TargetProcess>(
    accessor: &MemoryAccessor<P>,
    address: u64,
    mode: WriteMode,
    value: &str,
) -> Result<usize> {
    match mode {
        WriteMode::String {
            encoding,
            zero_terminate,
        } => {
            let bytes = encoding.encode(value, zero_terminate)?;
            accessor.write_bytes(address, &bytes)?;
            Ok(bytes.len())
        }
        WriteMode::Scalar(kind) => match kind {
            ValueKind::U8 => put(accessor, address, parse_unsigned::<u8>(value)?),
            ValueKind::U16 => put(accessor, address, parse_unsigned::<u16>(value)?),
            ValueKind::U32 => put(accessor, address, parse_unsigned::<u32>(value)?),
            ValueKind::U64 => put(accessor, address, parse_unsigned::<u64>(value)?),
            ValueKind::I8 => put(accessor, address, parse_signed::<i8>(value)?),
            ValueKind::I16 => put(accessor, address, parse_signed::<i16>(value)?),
            ValueKind::I32 => put(accessor, address, parse_signed::<i32>(value)?),
            ValueKind::I64 => put(accessor, address, parse_signed::<i64>(value)?),
            ValueKind::F32 => put(accessor, address, parse_f32(value)?),
            ValueKind::F64 => put(accessor, address, parse_float(value)?),
            ValueKind::Ptr => {
                accessor.write_pointer(address, parse_unsigned::<u64>(value)?)?;
                Ok(accessor.pointer_width())
            }
        },
    }
}

fn put<P: TargetProcess, T: Scalar>(
    accessor: &MemoryAccessor<P>,
    address: u64,
    value: T,
) -> Result<usize> {
    accessor.write(address, value)?;
    Ok(T::SIZE)
}

/// Decimal, or hex with a `0x` prefix
fn parse_unsigned<T: TryFrom<u64>>(text: &str) -> Result<T> {
    let value = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => text.parse::<u64>(),
    }
    .with_context(|| format!("Invalid unsigned value '{}'", text))?;

    T::try_from(value).map_err(|_| anyhow::anyhow!("Value {} out of range", text))
}

fn parse_signed<T: TryFrom<i64>>(text: &str) -> Result<T> {
    let (negative, rest) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };

    let value = match rest.strip_prefix("0x").or_else(|| rest.strip_prefix("0X")) {
        Some(hex) => i64::from_str_radix(&format!("{}{}", if negative { "-" } else { "" }, hex), 16),
        None => text.parse::<i64>(),
    }
    .with_context(|| format!("Invalid signed value '{}'", text))?;

    T::try_from(value).map_err(|_| anyhow::anyhow!("Value {} out of range", text))
}

fn parse_float(text: &str) -> Result<f64> {
    let value: f64 = text
        .parse()
        .with_context(|| format!("Invalid float value '{}'", text))?;
    if !value.is_finite() {
        bail!("Value {} is not finite", text);
    }
    Ok(value)
}

/// [`parse_float`] narrowed to f32; values beyond the f32 range are rejected
fn parse_f32(text: &str) -> Result<f32> {
    let value = parse_float(text)? as f32;
    if !value.is_finite() {
        bail!("Value {} is out of range for f32", text);
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use xivmem::memory::mock::{MockProcess, MockProcessBuilder};

    fn accessor() -> MemoryAccessor<MockProcess> {
        MemoryAccessor::open(MockProcessBuilder::new().zeroed(0x4000, 0x100).build()).unwrap()
    }

    #[test]
    fn test_write_scalars() {
        let accessor = accessor();

        assert_eq!(write_value(&accessor, 0x4000, WriteMode::Scalar(ValueKind::U16), "0x1F4").unwrap(), 2);
        assert_eq!(accessor.read_u16(0x4000).unwrap(), 500);

        write_value(&accessor, 0x4008, WriteMode::Scalar(ValueKind::I32), "-0x10").unwrap();
        assert_eq!(accessor.read_i32(0x4008).unwrap(), -16);

        write_value(&accessor, 0x4010, WriteMode::Scalar(ValueKind::F64), "2.25").unwrap();
        assert_eq!(accessor.read_f64(0x4010).unwrap(), 2.25);

        write_value(&accessor, 0x4018, WriteMode::Scalar(ValueKind::F32), "1e38").unwrap();
        assert_eq!(accessor.read_f32(0x4018).unwrap(), 1e38f32);

        assert_eq!(write_value(&accessor, 0x4020, WriteMode::Scalar(ValueKind::Ptr), "0x7FF600001000").unwrap(), 8);
        assert_eq!(accessor.read_pointer(0x4020).unwrap(), 0x7FF6_0000_1000);
    }

    #[test]
    fn test_write_string() {
        let accessor = accessor();
        let mode = WriteMode::String {
            encoding: StringEncoding::Utf16,
            zero_terminate: true,
        };

        assert_eq!(write_value(&accessor, 0x4040, mode, "Y'shtola").unwrap(), 18);
        assert_eq!(accessor.read_string(0x4040, StringEncoding::Utf16).unwrap(), "Y'shtola");
    }

    #[test]
    fn test_out_of_range_values() {
        let accessor = accessor();
        assert!(write_value(&accessor, 0x4000, WriteMode::Scalar(ValueKind::U8), "256").is_err());
        assert!(write_value(&accessor, 0x4000, WriteMode::Scalar(ValueKind::I8), "-129").is_err());
        assert!(write_value(&accessor, 0x4000, WriteMode::Scalar(ValueKind::U32), "-1").is_err());
        assert!(write_value(&accessor, 0x4000, WriteMode::Scalar(ValueKind::F32), "NaN").is_err());
        assert!(write_value(&accessor, 0x4000, WriteMode::Scalar(ValueKind::F32), "1e39").is_err());
        assert_eq!(accessor.process().write_count(), 0);
    }
}
