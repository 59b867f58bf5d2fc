//! CLI configuration file (TOML).
//!
//! ```toml
//! process_name = "ffxiv_dx11.exe"
//! store = "https://example.com/definitions/ffxiv"
//! cache_max_age_secs = 86400
//! max_string_len = 4096
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;
use xivmem::AccessorConfig;
use xivmem::config::DEFAULT_MAX_STRING_LEN;

pub const DEFAULT_PROCESS_NAME: &str = "ffxiv_dx11.exe";
/// 24 hours
pub const DEFAULT_CACHE_MAX_AGE_SECS: u64 = 24 * 60 * 60;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Executable to attach to when no PID is given
    pub process_name: String,
    /// Directory or http(s) base URL of the definition store
    pub store: Option<String>,
    /// Where fetched catalogs are cached; `None` uses the platform cache dir
    pub cache_dir: Option<PathBuf>,
    pub cache_max_age_secs: u64,
    pub max_string_len: usize,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            process_name: DEFAULT_PROCESS_NAME.to_string(),
            store: None,
            cache_dir: None,
            cache_max_age_secs: DEFAULT_CACHE_MAX_AGE_SECS,
            max_string_len: DEFAULT_MAX_STRING_LEN,
        }
    }
}

impl CliConfig {
    /// Load from `path`, or from the default location when `None`.
    ///
    /// A missing file at the default location yields defaults; a missing file
    /// given explicitly is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from_path(path),
            None => match default_config_path() {
                Some(path) if path.exists() => Self::load_from_path(&path),
                _ => {
                    debug!("No config file, using defaults");
                    Ok(Self::default())
                }
            },
        }
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn accessor_config(&self) -> AccessorConfig {
        AccessorConfig::builder()
            .max_string_len(self.max_string_len)
            .build()
    }

    /// Configured cache directory, falling back to `<cache dir>/xivmem`
    pub fn cache_dir(&self) -> Option<PathBuf> {
        self.cache_dir
            .clone()
            .or_else(|| dirs::cache_dir().map(|dir| dir.join("xivmem")))
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("xivmem").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "process_name = \"ffxiv.exe\"").unwrap();
        writeln!(file, "max_string_len = 256").unwrap();

        let config = CliConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.process_name, "ffxiv.exe");
        assert_eq!(config.max_string_len, 256);
        assert_eq!(config.store, None);
        assert_eq!(config.cache_max_age_secs, DEFAULT_CACHE_MAX_AGE_SECS);
        assert_eq!(config.accessor_config().max_string_len, 256);
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        assert!(CliConfig::load(Some(Path::new("/nonexistent/xivmem.toml"))).is_err());
    }

    #[test]
    fn test_invalid_toml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "max_string_len = \"lots\"").unwrap();
        assert!(CliConfig::load(Some(file.path())).is_err());
    }

    #[test]
    fn test_explicit_cache_dir() {
        let config = CliConfig {
            cache_dir: Some(PathBuf::from("/tmp/xivmem-cache")),
            ..Default::default()
        };
        assert_eq!(config.cache_dir(), Some(PathBuf::from("/tmp/xivmem-cache")));
    }
}
