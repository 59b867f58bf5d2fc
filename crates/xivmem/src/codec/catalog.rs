//! Named pointer definitions for one game version.
//!
//! A catalog document maps symbolic names to descriptors, plus plain struct
//! field offsets:
//!
//! ```json
//! {
//!   "version": "2018.04.26.0000.0000",
//!   "pointers": {
//!     "ActorTable": "ffxiv_dx11.exe+199DA38",
//!     "TerritoryType": {
//!       "base": { "kind": "moduleRelative", "module": "ffxiv_dx11.exe", "offset": "19D55E8" },
//!       "chain": ["4C"]
//!     }
//!   },
//!   "fields": { "ActorID": "74", "Name": "30" }
//! }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::descriptor::{DescriptorEntry, HexOffset, decode_entry};
use crate::error::{Error, Result};
use crate::memory::{MemoryAccessor, TargetProcess};
use crate::pointer::{Offset, Pointer};

/// A persisted catalog, independent of any process
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefinitionCatalog {
    pub version: String,
    #[serde(default)]
    pub pointers: BTreeMap<String, DescriptorEntry>,
    #[serde(default)]
    pub fields: BTreeMap<String, HexOffset>,
}

/// One catalog entry that could not be decoded
#[derive(Debug)]
pub struct DecodeFailure {
    pub name: String,
    pub error: Error,
}

/// A catalog bound to one process
#[derive(Debug, Default)]
pub struct DecodedCatalog {
    pub version: String,
    pub pointers: BTreeMap<String, Pointer>,
    pub fields: BTreeMap<String, Offset>,
    pub failures: Vec<DecodeFailure>,
}

impl DefinitionCatalog {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            ..Default::default()
        }
    }

    /// Build a document from existing pointer definitions
    pub fn from_pointers<'a>(
        version: impl Into<String>,
        pointers: impl IntoIterator<Item = (&'a str, &'a Pointer)>,
        fields: impl IntoIterator<Item = (&'a str, Offset)>,
    ) -> Self {
        Self {
            version: version.into(),
            pointers: pointers
                .into_iter()
                .map(|(name, pointer)| (name.to_string(), DescriptorEntry::from(pointer)))
                .collect(),
            fields: fields
                .into_iter()
                .map(|(name, offset)| (name.to_string(), HexOffset(offset)))
                .collect(),
        }
    }

    pub fn insert_pointer(&mut self, name: impl Into<String>, pointer: &Pointer) {
        self.pointers.insert(name.into(), pointer.into());
    }

    pub fn insert_field(&mut self, name: impl Into<String>, offset: Offset) {
        self.fields.insert(name.into(), HexOffset(offset));
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)?;
        Self::from_json(&content)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, self.to_json_pretty()?)?;
        Ok(())
    }

    /// Decode and resolve every pointer against `accessor`.
    ///
    /// Each entry succeeds or fails on its own; failures are collected rather
    /// than aborting the remaining entries.
    pub fn decode_all<P: TargetProcess>(&self, accessor: &MemoryAccessor<P>) -> DecodedCatalog {
        let mut decoded = DecodedCatalog {
            version: self.version.clone(),
            fields: self.fields.iter().map(|(k, v)| (k.clone(), v.0)).collect(),
            ..Default::default()
        };

        for (name, entry) in &self.pointers {
            match decode_entry(entry, accessor) {
                Ok(pointer) => {
                    decoded.pointers.insert(name.clone(), pointer);
                }
                Err(error) => {
                    warn!("Failed to decode {}: {}", name, error);
                    decoded.failures.push(DecodeFailure {
                        name: name.clone(),
                        error,
                    });
                }
            }
        }

        debug!(
            "Decoded catalog {}: {} resolved, {} failed",
            self.version,
            decoded.pointers.len(),
            decoded.failures.len()
        );

        decoded
    }
}

impl DecodedCatalog {
    pub fn pointer(&self, name: &str) -> Option<&Pointer> {
        self.pointers.get(name)
    }

    pub fn field(&self, name: &str) -> Option<Offset> {
        self.fields.get(name).copied()
    }

    /// True when every entry resolved
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failed_names(&self) -> impl Iterator<Item = &str> {
        self.failures.iter().map(|f| f.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::mock::{MockProcess, MockProcessBuilder};
    use tempfile::NamedTempFile;

    const GAME: &str = "ffxiv_dx11.exe";
    const BASE: u64 = 0x1_4000_0000;

    fn accessor() -> MemoryAccessor<MockProcess> {
        let process = MockProcessBuilder::new()
            .module(GAME, BASE, 0x200_0000)
            .pointer(BASE + 0x19D55E8, 0x2_0000_0000)
            .pointer(BASE + 0x19579A8, 0x2_0001_0000)
            .build();
        MemoryAccessor::open(process).unwrap()
    }

    fn catalog() -> DefinitionCatalog {
        DefinitionCatalog::from_json(
            r#"{
                "version": "2018.04.26.0000.0000",
                "pointers": {
                    "ActorTable": "ffxiv_dx11.exe+199DA38",
                    "TerritoryType": {
                        "base": { "kind": "moduleRelative", "module": "ffxiv_dx11.exe", "offset": "19D55E8" },
                        "chain": ["4C"]
                    },
                    "Weather": "ffxiv_dx11.exe+19579A8,27",
                    "Time": "ffxiv_dx11.exe+19815F0,10,8,28,80",
                    "Overlay": "overlay_hook.dll+4000,8"
                },
                "fields": { "ActorID": "74", "Name": "30", "Job": "1788" }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_partial_decode_collects_failures() {
        let decoded = catalog().decode_all(&accessor());

        assert_eq!(decoded.pointers.len(), 3);
        assert_eq!(decoded.failures.len(), 2);
        assert!(!decoded.is_complete());

        assert_eq!(decoded.pointer("ActorTable").unwrap().address(), Some(BASE + 0x199DA38));
        assert_eq!(decoded.pointer("TerritoryType").unwrap().address(), Some(0x2_0000_004C));
        assert_eq!(decoded.pointer("Weather").unwrap().address(), Some(0x2_0001_0027));

        let failed: Vec<_> = decoded.failed_names().collect();
        assert_eq!(failed, ["Overlay", "Time"]);
        let overlay = decoded.failures.iter().find(|f| f.name == "Overlay").unwrap();
        assert!(matches!(overlay.error, Error::ModuleNotFound(_)));
        let time = decoded.failures.iter().find(|f| f.name == "Time").unwrap();
        assert!(matches!(time.error, Error::UnresolvableChain { step: 0, .. }));
    }

    #[test]
    fn test_fields_pass_through() {
        let decoded = catalog().decode_all(&accessor());
        assert_eq!(decoded.field("ActorID"), Some(0x74));
        assert_eq!(decoded.field("Job"), Some(0x1788));
        assert_eq!(decoded.field("Level"), None);
    }

    #[test]
    fn test_malformed_text_entry_is_a_single_failure() {
        let mut catalog = catalog();
        catalog.pointers.insert(
            "Broken".to_string(),
            DescriptorEntry::Text("ffxiv_dx11.exe+zz".to_string()),
        );

        let decoded = catalog.decode_all(&accessor());
        assert_eq!(decoded.pointers.len(), 3);
        let broken = decoded.failures.iter().find(|f| f.name == "Broken").unwrap();
        assert!(matches!(broken.error, Error::InvalidDescriptor(_)));
    }

    #[test]
    fn test_unknown_base_kind_is_a_single_failure() {
        let catalog = DefinitionCatalog::from_json(
            r#"{
                "version": "test",
                "pointers": {
                    "ActorTable": "ffxiv_dx11.exe+199DA38",
                    "TerritoryType": {
                        "base": { "kind": "moduleRelative", "module": "ffxiv_dx11.exe", "offset": "19D55E8" },
                        "chain": ["4C"]
                    },
                    "Weather": "ffxiv_dx11.exe+19579A8,27",
                    "Scratch": { "base": { "kind": "absolute", "offset": "2000" }, "chain": [] },
                    "Register": { "base": { "kind": "register", "offset": "10" }, "chain": [] }
                }
            }"#,
        )
        .unwrap();
        assert_eq!(catalog.pointers.len(), 5);

        let decoded = catalog.decode_all(&accessor());
        assert_eq!(decoded.pointers.len(), 4);
        assert_eq!(decoded.pointer("Scratch").unwrap().address(), Some(0x2000));
        let failed: Vec<_> = decoded.failed_names().collect();
        assert_eq!(failed, ["Register"]);
        assert!(matches!(decoded.failures[0].error, Error::InvalidDescriptor(_)));
    }

    #[test]
    fn test_save_and_load() {
        let temp_file = NamedTempFile::new().unwrap();

        let mut catalog = DefinitionCatalog::new("test");
        catalog.insert_pointer("TerritoryType", &Pointer::module(GAME, 0x19D55E8, vec![0x4C]));
        catalog.insert_field("OwnerID", 0x84);
        catalog.save(temp_file.path()).unwrap();

        let loaded = DefinitionCatalog::load(temp_file.path()).unwrap();
        assert_eq!(loaded, catalog);
        assert_eq!(
            loaded.pointers["TerritoryType"].to_pointer().unwrap().to_string(),
            "ffxiv_dx11.exe+19D55E8,4C"
        );
    }

    #[test]
    fn test_from_pointers() {
        let actor_table = Pointer::module(GAME, 0x199DA38, vec![]);
        let weather = Pointer::module(GAME, 0x19579A8, vec![0x27]);

        let catalog = DefinitionCatalog::from_pointers(
            "v1",
            [("ActorTable", &actor_table), ("Weather", &weather)],
            [("Name", 0x30)],
        );

        assert_eq!(catalog.pointers.len(), 2);
        assert_eq!(catalog.fields["Name"], HexOffset(0x30));
        let json = catalog.to_json_pretty().unwrap();
        assert!(json.contains("\"moduleRelative\""));
        assert!(json.contains("\"19579A8\""));
    }

    #[test]
    fn test_missing_file() {
        let result = DefinitionCatalog::load("/nonexistent/xivmem/catalog.json");
        assert!(result.unwrap_err().is_not_found());
    }
}
