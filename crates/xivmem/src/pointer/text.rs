//! Compact textual pointer form: `[<module>+]<hex>(,<hex>)*`.
//!
//! Input accepts either hex case, an optional `0x` prefix and a leading `-`
//! on offsets. Output is canonical: uppercase digits, no prefix, no zero
//! padding, `-` for negative offsets. The module name is kept verbatim and is
//! split off at the last `+` of the first field.
//!
//! ```
//! use xivmem::Pointer;
//!
//! let pointer: Pointer = "ffxiv_dx11.exe+0x19d55e8,4c".parse().unwrap();
//! assert_eq!(pointer.to_string(), "ffxiv_dx11.exe+19D55E8,4C");
//! ```

use std::fmt;
use std::str::FromStr;

use super::{Offset, Pointer, PointerBase};
use crate::error::{Error, Result};

/// Format a signed offset in canonical hex
pub fn format_offset(offset: Offset) -> String {
    if offset < 0 {
        format!("-{:X}", offset.unsigned_abs())
    } else {
        format!("{:X}", offset)
    }
}

fn hex_digits(token: &str) -> Result<&str> {
    let digits = token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
        .unwrap_or(token);

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(Error::InvalidDescriptor(format!(
            "Invalid hex value '{}'",
            token
        )));
    }
    Ok(digits)
}

/// Parse an unsigned hex address
pub fn parse_address(token: &str) -> Result<u64> {
    let token = token.trim();
    let digits = hex_digits(token)?;
    u64::from_str_radix(digits, 16).map_err(|e| {
        Error::InvalidDescriptor(format!("Invalid hex address '{}': {}", token, e))
    })
}

/// Parse a signed hex offset
pub fn parse_offset(token: &str) -> Result<Offset> {
    let token = token.trim();
    let (negative, rest) = match token.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, token),
    };

    let magnitude = u64::from_str_radix(hex_digits(rest)?, 16).map_err(|e| {
        Error::InvalidDescriptor(format!("Invalid hex offset '{}': {}", token, e))
    })?;

    let out_of_range = || Error::InvalidDescriptor(format!("Offset out of range: '{}'", token));
    if negative {
        if magnitude > 1u64 << 63 {
            return Err(out_of_range());
        }
        Ok((magnitude as i64).wrapping_neg())
    } else {
        Offset::try_from(magnitude).map_err(|_| out_of_range())
    }
}

impl fmt::Display for PointerBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PointerBase::Absolute(address) => write!(f, "{:X}", address),
            PointerBase::ModuleRelative { module, offset } => {
                write!(f, "{}+{}", module, format_offset(*offset))
            }
        }
    }
}

impl fmt::Display for Pointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.base)?;
        for offset in &self.chain {
            write!(f, ",{}", format_offset(*offset))?;
        }
        Ok(())
    }
}

impl FromStr for PointerBase {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        match s.rfind('+') {
            Some(pos) => {
                let module = s[..pos].trim();
                if module.is_empty() {
                    return Err(Error::InvalidDescriptor(format!(
                        "Empty module name in '{}'",
                        s
                    )));
                }
                Ok(PointerBase::ModuleRelative {
                    module: module.to_string(),
                    offset: parse_offset(&s[pos + 1..])?,
                })
            }
            None => Ok(PointerBase::Absolute(parse_address(s)?)),
        }
    }
}

impl FromStr for Pointer {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut fields = s.split(',');
        let base = fields.next().unwrap_or_default().parse::<PointerBase>()?;
        let chain = fields.map(parse_offset).collect::<Result<Vec<_>>>()?;
        Ok(Pointer::new(base, chain))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_module_relative() {
        let pointer: Pointer = "ffxiv_dx11.exe+19D55E8,4C".parse().unwrap();
        assert_eq!(
            pointer.base(),
            &PointerBase::ModuleRelative {
                module: "ffxiv_dx11.exe".to_string(),
                offset: 0x19D55E8
            }
        );
        assert_eq!(pointer.chain(), &[0x4C]);
        assert_eq!(pointer.address(), None);
    }

    #[test]
    fn test_canonical_round_trip() {
        for text in [
            "mod.exe+100,8,4",
            "ffxiv_dx11.exe+19815F0,10,8,28,80",
            "ffxiv_dx11.exe+199DA38",
            "7FF6A1B20000,-10",
            "game.exe+-20,0",
        ] {
            let pointer: Pointer = text.parse().unwrap();
            assert_eq!(pointer.to_string(), text);
        }
    }

    #[test]
    fn test_normalization() {
        let pointer: Pointer = " mod.exe+0x00100 , 8 ,-4c".parse().unwrap();
        assert_eq!(pointer.to_string(), "mod.exe+100,8,-4C");
    }

    #[test]
    fn test_module_name_with_plus() {
        let pointer: Pointer = "c++runtime.dll+40,8".parse().unwrap();
        assert_eq!(pointer.module_name(), Some("c++runtime.dll"));
        assert_eq!(pointer.to_string(), "c++runtime.dll+40,8");
    }

    #[test]
    fn test_absolute_without_module() {
        let pointer: Pointer = "1A2B".parse().unwrap();
        assert_eq!(pointer.base(), &PointerBase::Absolute(0x1A2B));
        assert!(pointer.chain().is_empty());
    }

    #[test]
    fn test_invalid_inputs() {
        for text in ["", "+10", "mod.exe+", "mod.exe+10,", "mod.exe+10,,4", "mod.exe+xyz", "mod.exe+10,+4", "-10"] {
            assert!(
                matches!(text.parse::<Pointer>(), Err(Error::InvalidDescriptor(_))),
                "expected failure for {:?}",
                text
            );
        }
    }

    #[test]
    fn test_offset_bounds() {
        assert_eq!(parse_offset("-8000000000000000").unwrap(), i64::MIN);
        assert!(parse_offset("-8000000000000001").is_err());
        assert_eq!(parse_offset("7FFFFFFFFFFFFFFF").unwrap(), i64::MAX);
        assert!(parse_offset("8000000000000000").is_err());
        assert_eq!(format_offset(i64::MIN), "-8000000000000000");
        assert_eq!(parse_address("FFFFFFFFFFFFFFFF").unwrap(), u64::MAX);
    }
}
