use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::debug;
use xivmem::DefinitionCatalog;

use super::{DefinitionStore, document_name};

/// Reads `<dir>/<version>.json`
#[derive(Debug, Clone)]
pub struct LocalStore {
    dir: PathBuf,
}

impl LocalStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl DefinitionStore for LocalStore {
    fn fetch(&self, version: &str) -> Result<DefinitionCatalog> {
        let path = self.dir.join(document_name(version));
        debug!("Loading catalog from {}", path.display());
        DefinitionCatalog::load(&path)
            .with_context(|| format!("Failed to load catalog {}", path.display()))
    }

    fn describe(&self) -> String {
        self.dir.display().to_string()
    }
}
