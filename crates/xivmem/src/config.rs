//! Accessor configuration.
//!
//! ## Example
//!
//! ```
//! use xivmem::config::AccessorConfig;
//!
//! let config = AccessorConfig::builder().max_string_len(256).build();
//! assert_eq!(config.max_string_len, 256);
//! ```

/// Default upper bound for null-terminated string scans, in bytes
pub const DEFAULT_MAX_STRING_LEN: usize = 4096;

/// Configuration for a [`MemoryAccessor`](crate::memory::MemoryAccessor)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessorConfig {
    /// Maximum number of bytes scanned while looking for a string terminator.
    /// Counted in bytes for every encoding, so UTF-16 strings may hold at most
    /// half as many code units.
    pub max_string_len: usize,
}

impl Default for AccessorConfig {
    fn default() -> Self {
        Self {
            max_string_len: DEFAULT_MAX_STRING_LEN,
        }
    }
}

impl AccessorConfig {
    /// Create a new configuration builder
    pub fn builder() -> AccessorConfigBuilder {
        AccessorConfigBuilder::default()
    }
}

/// Builder for AccessorConfig
#[derive(Debug, Clone, Default)]
pub struct AccessorConfigBuilder {
    max_string_len: Option<usize>,
}

impl AccessorConfigBuilder {
    /// Set the string scan bound in bytes
    pub fn max_string_len(mut self, len: usize) -> Self {
        self.max_string_len = Some(len);
        self
    }

    /// Build the configuration
    pub fn build(self) -> AccessorConfig {
        let default = AccessorConfig::default();
        AccessorConfig {
            max_string_len: self.max_string_len.unwrap_or(default.max_string_len),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let config = AccessorConfig::builder().build();
        assert_eq!(config, AccessorConfig::default());
        assert_eq!(config.max_string_len, DEFAULT_MAX_STRING_LEN);
    }

    #[test]
    fn test_builder_override() {
        let config = AccessorConfig::builder().max_string_len(16).build();
        assert_eq!(config.max_string_len, 16);
    }
}
