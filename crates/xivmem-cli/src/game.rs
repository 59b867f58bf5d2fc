//! Game client detection from the attached process.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use strum::{Display, IntoStaticStr};
use tracing::debug;
use xivmem::{ModuleCatalog, ModuleDescriptor, TargetProcess};

const VERSION_FILE: &str = "ffxivgame.ver";

/// Rendering backend of the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr)]
pub enum GameKind {
    Dx9,
    Dx11,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameInfo {
    pub kind: GameKind,
    /// Contents of `ffxivgame.ver`, e.g. `2018.04.26.0000.0000`
    pub version: String,
}

impl GameInfo {
    pub fn detect<P: TargetProcess>(process: &P) -> Result<Self> {
        let main = ModuleCatalog::main_module(process).context("Target has no modules")?;
        Self::from_main_module(&main)
    }

    pub fn from_main_module(module: &ModuleDescriptor) -> Result<Self> {
        let kind = if module.name.contains("ffxiv_dx11") {
            GameKind::Dx11
        } else {
            GameKind::Dx9
        };

        let dir = module
            .path
            .as_deref()
            .and_then(Path::parent)
            .with_context(|| format!("No on-disk path reported for {}", module.name))?;
        let version = read_version(&dir.join(VERSION_FILE))?;

        debug!("Detected {} client, version {}", kind, version);
        Ok(Self { kind, version })
    }
}

fn read_version(path: &Path) -> Result<String> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let version = content.trim();
    anyhow::ensure!(!version.is_empty(), "{} is empty", path.display());
    Ok(version.to_string())
}
