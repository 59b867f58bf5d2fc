use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use tracing::debug;

use crate::error::{Error, Result};
use crate::memory::{MemoryAccessor, TargetProcess};
use crate::pointer::{Offset, Pointer, PointerBase, format_offset, parse_address, parse_offset};

/// Signed offset serialized as a canonical hex string.
///
/// Deserializes from a hex string or a plain JSON integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HexOffset(pub Offset);

/// Unsigned address serialized as a canonical hex string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HexAddress(pub u64);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawNumber {
    Text(String),
    Signed(i64),
    Unsigned(u64),
}

impl Serialize for HexOffset {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_offset(self.0))
    }
}

impl<'de> Deserialize<'de> for HexOffset {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        match RawNumber::deserialize(deserializer)? {
            RawNumber::Text(text) => parse_offset(&text).map(HexOffset).map_err(de::Error::custom),
            RawNumber::Signed(value) => Ok(HexOffset(value)),
            RawNumber::Unsigned(value) => Offset::try_from(value)
                .map(HexOffset)
                .map_err(|_| de::Error::custom(format!("offset {} out of range", value))),
        }
    }
}

impl Serialize for HexAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("{:X}", self.0))
    }
}

impl<'de> Deserialize<'de> for HexAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        match RawNumber::deserialize(deserializer)? {
            RawNumber::Text(text) => parse_address(&text).map(HexAddress).map_err(de::Error::custom),
            RawNumber::Unsigned(value) => Ok(HexAddress(value)),
            RawNumber::Signed(value) => u64::try_from(value)
                .map(HexAddress)
                .map_err(|_| de::Error::custom(format!("address {} is negative", value))),
        }
    }
}

/// Serialized form of a [`PointerBase`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum BaseDescriptor {
    Absolute {
        offset: HexAddress,
    },
    ModuleRelative {
        module: String,
        offset: HexOffset,
    },
}

/// Structured, process-independent form of a [`Pointer`].
///
/// ```json
/// { "base": { "kind": "moduleRelative", "module": "ffxiv_dx11.exe", "offset": "19D55E8" },
///   "chain": ["4C"] }
/// ```
///
/// `resolved` is advisory only; it is never used as the address on decode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointerDescriptor {
    pub base: BaseDescriptor,
    #[serde(default)]
    pub chain: Vec<HexOffset>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved: Option<HexAddress>,
}

impl PointerDescriptor {
    /// Rebuild the unresolved pointer definition
    pub fn to_pointer(&self) -> Pointer {
        let base = match &self.base {
            BaseDescriptor::Absolute { offset } => PointerBase::Absolute(offset.0),
            BaseDescriptor::ModuleRelative { module, offset } => PointerBase::ModuleRelative {
                module: module.clone(),
                offset: offset.0,
            },
        };
        Pointer::new(base, self.chain.iter().map(|o| o.0).collect())
    }
}

impl From<&Pointer> for PointerDescriptor {
    fn from(pointer: &Pointer) -> Self {
        let base = match pointer.base() {
            PointerBase::Absolute(address) => BaseDescriptor::Absolute {
                offset: HexAddress(*address),
            },
            PointerBase::ModuleRelative { module, offset } => BaseDescriptor::ModuleRelative {
                module: module.clone(),
                offset: HexOffset(*offset),
            },
        };

        Self {
            base,
            chain: pointer.chain().iter().copied().map(HexOffset).collect(),
            resolved: pointer.address().map(HexAddress),
        }
    }
}

/// A descriptor in either of its persisted shapes.
///
/// Anything matching neither shape is kept as [`DescriptorEntry::Invalid`] so
/// a single bad entry in a catalog fails on its own when decoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DescriptorEntry {
    /// Textual form, e.g. `"ffxiv_dx11.exe+19D55E8,4C"`
    Text(String),
    Structured(PointerDescriptor),
    Invalid(serde_json::Value),
}

impl DescriptorEntry {
    /// Rebuild the unresolved pointer definition
    pub fn to_pointer(&self) -> Result<Pointer> {
        match self {
            DescriptorEntry::Text(text) => text.parse(),
            DescriptorEntry::Structured(descriptor) => Ok(descriptor.to_pointer()),
            DescriptorEntry::Invalid(value) => {
                serde_json::from_value::<PointerDescriptor>(value.clone())
                    .map(|descriptor| descriptor.to_pointer())
                    .map_err(|e| Error::InvalidDescriptor(e.to_string()))
            }
        }
    }

    fn advisory(&self) -> Option<u64> {
        match self {
            DescriptorEntry::Text(_) | DescriptorEntry::Invalid(_) => None,
            DescriptorEntry::Structured(descriptor) => descriptor.resolved.map(|a| a.0),
        }
    }
}

impl From<&Pointer> for DescriptorEntry {
    fn from(pointer: &Pointer) -> Self {
        DescriptorEntry::Structured(pointer.into())
    }
}

/// Structured descriptor for a pointer, including its cached address as
/// advisory metadata
pub fn encode(pointer: &Pointer) -> PointerDescriptor {
    pointer.into()
}

/// Rebuild a pointer and resolve it against `accessor`.
///
/// Fails with whatever resolution produced, typically
/// [`ModuleNotFound`](crate::Error::ModuleNotFound) or
/// [`UnresolvableChain`](crate::Error::UnresolvableChain).
pub fn decode<P: TargetProcess>(
    descriptor: &PointerDescriptor,
    accessor: &MemoryAccessor<P>,
) -> Result<Pointer> {
    decode_entry(&DescriptorEntry::Structured(descriptor.clone()), accessor)
}

/// [`decode`] for either descriptor shape
pub fn decode_entry<P: TargetProcess>(
    entry: &DescriptorEntry,
    accessor: &MemoryAccessor<P>,
) -> Result<Pointer> {
    let mut pointer = entry.to_pointer()?;
    let address = pointer.resolve(accessor)?;

    if let Some(previous) = entry.advisory().filter(|&previous| previous != address) {
        debug!(
            "{} moved since it was saved: {:#x} -> {:#x}",
            pointer, previous, address
        );
    }

    Ok(pointer)
}

/// Pointers serialize through [`PointerDescriptor`]
impl Serialize for Pointer {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        PointerDescriptor::from(self).serialize(serializer)
    }
}

/// Pointers deserialize unresolved from either descriptor shape; see
/// [`Rebind`](super::Rebind) for binding them to a process
impl<'de> Deserialize<'de> for Pointer {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        DescriptorEntry::deserialize(deserializer)?
            .to_pointer()
            .map_err(de::Error::custom)
    }
}
