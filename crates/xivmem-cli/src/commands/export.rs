//! Export command implementation.
//!
//! Builds a catalog document from textual descriptors without attaching to a
//! process, e.g.
//!
//! ```text
//! xivmem export --version 2018.04.26.0000.0000 --field Name=30 \
//!     TerritoryType=ffxiv_dx11.exe+19D55E8,4C Weather=ffxiv_dx11.exe+19579A8,27
//! ```

use anyhow::{Context, Result};
use xivmem::DefinitionCatalog;
use xivmem::pointer::parse_offset;

use crate::target::parse_pointer;

pub fn run(version: &str, fields: &[String], pointers: &[String]) -> Result<()> {
    let catalog = build_catalog(version, fields, pointers)?;
    println!("{}", catalog.to_json_pretty()?);
    Ok(())
}

fn build_catalog(version: &str, fields: &[String], pointers: &[String]) -> Result<DefinitionCatalog> {
    let mut catalog = DefinitionCatalog::new(version);

    for pair in pointers {
        let (name, descriptor) = split_pair(pair)?;
        catalog.insert_pointer(name, &parse_pointer(descriptor)?);
    }

    for pair in fields {
        let (name, offset) = split_pair(pair)?;
        let offset = parse_offset(offset).with_context(|| format!("Invalid field offset in '{}'", pair))?;
        catalog.insert_field(name, offset);
    }

    Ok(catalog)
}

fn split_pair(pair: &str) -> Result<(&str, &str)> {
    pair.split_once('=')
        .map(|(name, value)| (name.trim(), value.trim()))
        .filter(|(name, value)| !name.is_empty() && !value.is_empty())
        .with_context(|| format!("Expected NAME=VALUE, got '{}'", pair))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_build_catalog() {
        let catalog = build_catalog(
            "2018.04.26.0000.0000",
            &["Name=30".to_string(), "ActorID=0x74".to_string()],
            &[
                "TerritoryType=ffxiv_dx11.exe+19d55e8,4c".to_string(),
                "ActorTable=ffxiv_dx11.exe+199DA38".to_string(),
            ],
        )
        .unwrap();

        let value = serde_json::to_value(&catalog).unwrap();
        assert_eq!(
            value,
            json!({
                "version": "2018.04.26.0000.0000",
                "pointers": {
                    "ActorTable": {
                        "base": { "kind": "moduleRelative", "module": "ffxiv_dx11.exe", "offset": "199DA38" },
                        "chain": []
                    },
                    "TerritoryType": {
                        "base": { "kind": "moduleRelative", "module": "ffxiv_dx11.exe", "offset": "19D55E8" },
                        "chain": ["4C"]
                    }
                },
                "fields": { "ActorID": "74", "Name": "30" }
            })
        );
    }

    #[test]
    fn test_rejects_malformed_pairs() {
        assert!(build_catalog("v", &[], &["Weather".to_string()]).is_err());
        assert!(build_catalog("v", &[], &["=mod.exe+10".to_string()]).is_err());
        assert!(build_catalog("v", &["Name=zz".to_string()], &[]).is_err());
        assert!(build_catalog("v", &[], &["Weather=mod.exe+".to_string()]).is_err());
    }
}
