//! Binding deserialized structures to a live process.
//!
//! Deserialization and binding are two separate passes. serde first builds
//! plain values in which every [`Pointer`] is unresolved and every module is
//! only a name. [`Rebind`] then walks the structure and resolves each pointer
//! through [`ModuleCatalog`](crate::module::ModuleCatalog), whose lookup is a
//! leaf: it never calls back into pointer decoding.

use std::collections::BTreeMap;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::Result;
use crate::memory::{MemoryAccessor, TargetProcess};
use crate::pointer::Pointer;

/// A value containing pointers that must be resolved against a process
pub trait Rebind {
    fn rebind<P: TargetProcess>(&mut self, accessor: &MemoryAccessor<P>) -> Result<()>;
}

impl Rebind for Pointer {
    fn rebind<P: TargetProcess>(&mut self, accessor: &MemoryAccessor<P>) -> Result<()> {
        self.resolve(accessor).map(|_| ())
    }
}

impl<T: Rebind> Rebind for Option<T> {
    fn rebind<P: TargetProcess>(&mut self, accessor: &MemoryAccessor<P>) -> Result<()> {
        match self {
            Some(value) => value.rebind(accessor),
            None => Ok(()),
        }
    }
}

impl<T: Rebind> Rebind for Vec<T> {
    fn rebind<P: TargetProcess>(&mut self, accessor: &MemoryAccessor<P>) -> Result<()> {
        self.iter_mut().try_for_each(|value| value.rebind(accessor))
    }
}

impl<T: Rebind> Rebind for BTreeMap<String, T> {
    fn rebind<P: TargetProcess>(&mut self, accessor: &MemoryAccessor<P>) -> Result<()> {
        self.values_mut().try_for_each(|value| value.rebind(accessor))
    }
}

/// Deserialize `json` and resolve every embedded pointer against `accessor`
pub fn decode_bound<T, P>(json: &str, accessor: &MemoryAccessor<P>) -> Result<T>
where
    T: DeserializeOwned + Rebind,
    P: TargetProcess,
{
    let mut value: T = serde_json::from_str(json)?;
    value.rebind(accessor)?;
    Ok(value)
}

/// Serialize a structure embedding pointers as pretty JSON
pub fn encode_value<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}
