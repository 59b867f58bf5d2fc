//! Catalog command implementation.
//!
//! Fetches the definition catalog for the running client, bulk-decodes it
//! against the process and prints each entry.

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use xivmem::{DecodedCatalog, MemoryAccessor, TargetProcess};

use crate::config::CliConfig;
use crate::game::GameInfo;
use crate::store::{CachedStore, DefinitionStore, open_store};

pub struct CatalogArgs<'a> {
    pub version: Option<&'a str>,
    pub store: Option<&'a str>,
    pub refresh: bool,
}

pub fn run<P: TargetProcess>(
    accessor: &MemoryAccessor<P>,
    config: &CliConfig,
    args: CatalogArgs<'_>,
) -> Result<()> {
    let version = match args.version {
        Some(version) => version.to_string(),
        None => {
            let game = GameInfo::detect(accessor.process())?;
            eprintln!("Detected {} client, version {}", game.kind, game.version);
            game.version
        }
    };

    let location = args.store.or(config.store.as_deref()).context(
        "No definition store configured. Use --store or set `store` in the config file.",
    )?;
    let store: Box<dyn DefinitionStore> = match config.cache_dir() {
        Some(dir) => Box::new(
            CachedStore::new(open_store(location), dir, config.cache_max_age_secs)
                .refresh(args.refresh),
        ),
        None => open_store(location),
    };

    eprintln!("Loading catalog {} from {}", version, store.describe());
    let catalog = store.fetch(&version)?;

    let decoded = catalog.decode_all(accessor);
    print!("{}", format_decoded(&decoded));

    anyhow::ensure!(
        !decoded.pointers.is_empty() || catalog.pointers.is_empty(),
        "No catalog entry could be resolved"
    );
    Ok(())
}

fn format_decoded(decoded: &DecodedCatalog) -> String {
    let mut out = format!("Catalog {}\n\n", decoded.version.bold());

    let width = decoded
        .pointers
        .keys()
        .chain(decoded.failures.iter().map(|f| &f.name))
        .chain(decoded.fields.keys())
        .map(String::len)
        .max()
        .unwrap_or(0);

    for (name, pointer) in &decoded.pointers {
        let address = pointer.address().unwrap_or_default();
        out += &format!(
            "  {:<width$}  {}  {}\n",
            name,
            format!("0x{:X}", address).green(),
            pointer
        );
    }

    for failure in &decoded.failures {
        out += &format!("  {:<width$}  {}\n", failure.name, failure.error.to_string().red());
    }

    if !decoded.fields.is_empty() {
        out += "\nFields\n";
        for (name, offset) in &decoded.fields {
            out += &format!(
                "  {:<width$}  +{}\n",
                name,
                xivmem::pointer::format_offset(*offset).cyan()
            );
        }
    }

    out += &format!(
        "\n{} resolved, {} failed\n",
        decoded.pointers.len().green(),
        decoded.failures.len().red()
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use xivmem::memory::mock::MockProcessBuilder;

    fn strip_ansi(text: &str) -> String {
        let mut out = String::new();
        let mut chars = text.chars();
        while let Some(c) = chars.next() {
            if c == '\u{1b}' {
                for c in chars.by_ref() {
                    if c == 'm' {
                        break;
                    }
                }
            } else {
                out.push(c);
            }
        }
        out
    }

    #[test]
    fn test_local_store_end_to_end() {
        let defs = tempfile::tempdir().unwrap();
        std::fs::write(
            defs.path().join("v1.json"),
            r#"{
                "version": "v1",
                "pointers": {
                    "Weather": "ffxiv_dx11.exe+19579A8,27",
                    "Overlay": "overlay.dll+10"
                },
                "fields": { "Name": "30" }
            }"#,
        )
        .unwrap();

        let process = MockProcessBuilder::new()
            .module("ffxiv_dx11.exe", 0x1_4000_0000, 0x200_0000)
            .pointer(0x1_4195_79A8, 0x2_0000_0000)
            .build();
        let accessor = MemoryAccessor::open(process).unwrap();

        let catalog = open_store(&defs.path().display().to_string())
            .fetch("v1")
            .unwrap();
        let decoded = catalog.decode_all(&accessor);
        let text = strip_ansi(&format_decoded(&decoded));

        assert!(text.contains("Catalog v1"));
        assert!(text.contains("Weather  0x200000027  ffxiv_dx11.exe+19579A8,27"));
        assert!(text.contains("Overlay  Module not found: overlay.dll"));
        assert!(text.contains("Name     +30"));
        assert!(text.contains("1 resolved, 1 failed"));
    }
}
