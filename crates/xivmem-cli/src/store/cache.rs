//! On-disk cache in front of another store.
//!
//! Each fetched catalog is kept as `<cache_dir>/<version>.json` together with
//! the time it was fetched, and reused until it is older than the configured
//! maximum age.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use xivmem::DefinitionCatalog;

use super::{DefinitionStore, document_name};

/// Cached catalog envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedCatalog {
    pub version: String,
    pub catalog: DefinitionCatalog,
    pub created_at: DateTime<Utc>,
}

impl CachedCatalog {
    pub fn new(version: String, catalog: DefinitionCatalog) -> Self {
        Self {
            version,
            catalog,
            created_at: Utc::now(),
        }
    }

    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Option<Self> {
        let path = path.as_ref();

        let content = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                debug!("Cache file not found or unreadable: {}", e);
                return None;
            }
        };

        match serde_json::from_str::<CachedCatalog>(&content) {
            Ok(cache) => {
                debug!(
                    "Loaded cache: version={}, created_at={}",
                    cache.version, cache.created_at
                );
                Some(cache)
            }
            Err(e) => {
                warn!("Failed to parse cache file: {}", e);
                None
            }
        }
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create cache directory")?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        info!("Saved catalog cache to {}", path.display());
        Ok(())
    }

    /// Age in seconds, zero if the timestamp is in the future
    pub fn age_secs(&self) -> u64 {
        u64::try_from((Utc::now() - self.created_at).num_seconds()).unwrap_or(0)
    }

    pub fn is_valid_for(&self, version: &str, max_age_secs: u64) -> bool {
        if self.version != version {
            debug!(
                "Cache version mismatch: cached={}, current={}",
                self.version, version
            );
            return false;
        }

        let age = self.age_secs();
        if age > max_age_secs {
            debug!("Cache expired: age={} seconds", age);
            return false;
        }

        true
    }
}

/// Wraps a store with the on-disk cache
pub struct CachedStore<S> {
    inner: S,
    dir: PathBuf,
    max_age_secs: u64,
    refresh: bool,
}

impl<S: DefinitionStore> CachedStore<S> {
    pub fn new(inner: S, dir: impl Into<PathBuf>, max_age_secs: u64) -> Self {
        Self {
            inner,
            dir: dir.into(),
            max_age_secs,
            refresh: false,
        }
    }

    /// Ignore cached entries; fetched catalogs are still written back
    pub fn refresh(mut self, refresh: bool) -> Self {
        self.refresh = refresh;
        self
    }

    fn path_for(&self, version: &str) -> PathBuf {
        self.dir.join(document_name(version))
    }
}

impl<S: DefinitionStore> DefinitionStore for CachedStore<S> {
    fn fetch(&self, version: &str) -> Result<DefinitionCatalog> {
        let path = self.path_for(version);

        if !self.refresh
            && let Some(cache) = CachedCatalog::load_from_path(&path)
            && cache.is_valid_for(version, self.max_age_secs)
        {
            info!("Using cached catalog (version: {}, age: {}s)", version, cache.age_secs());
            return Ok(cache.catalog);
        }

        let catalog = self.inner.fetch(version)?;
        if let Err(e) = CachedCatalog::new(version.to_string(), catalog.clone()).save_to_path(&path) {
            warn!("Failed to save catalog cache: {}", e);
        }
        Ok(catalog)
    }

    fn describe(&self) -> String {
        format!("{} (cached in {})", self.inner.describe(), self.dir.display())
    }
}
