use std::time::Duration;

use anyhow::{Context, Result};
use tracing::info;
use xivmem::DefinitionCatalog;

use super::{DefinitionStore, document_name};

/// HTTP GET of `<base_url>/<version>.json`
#[derive(Debug, Clone)]
pub struct RemoteStore {
    base_url: String,
}

impl RemoteStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    fn url_for(&self, version: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            document_name(version)
        )
    }
}

impl DefinitionStore for RemoteStore {
    fn fetch(&self, version: &str) -> Result<DefinitionCatalog> {
        let url = self.url_for(version);
        info!("Fetching catalog from {}", url);

        let config = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(10)))
            .build();
        let agent: ureq::Agent = config.into();

        let mut resp = agent
            .get(&url)
            .call()
            .with_context(|| format!("Failed to fetch {}", url))?;
        let body = resp
            .body_mut()
            .read_to_string()
            .context("Failed to read catalog response")?;

        DefinitionCatalog::from_json(&body).with_context(|| format!("Invalid catalog at {}", url))
    }

    fn describe(&self) -> String {
        self.base_url.clone()
    }
}
