//! Where definition catalogs come from.
//!
//! The library never fetches anything; the CLI picks a store from the
//! `--store` flag or the config file and hands the parsed document over.

mod cache;
mod local;
mod remote;

pub use cache::CachedStore;
pub use local::LocalStore;
pub use remote::RemoteStore;

use anyhow::Result;
use xivmem::DefinitionCatalog;

/// A source of catalogs keyed by game version
pub trait DefinitionStore {
    fn fetch(&self, version: &str) -> Result<DefinitionCatalog>;

    /// Human-readable location, for messages
    fn describe(&self) -> String;
}

impl<T: DefinitionStore + ?Sized> DefinitionStore for Box<T> {
    fn fetch(&self, version: &str) -> Result<DefinitionCatalog> {
        (**self).fetch(version)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// `http://` and `https://` locations are remote; anything else is a directory
pub fn open_store(location: &str) -> Box<dyn DefinitionStore> {
    if location.starts_with("http://") || location.starts_with("https://") {
        Box::new(RemoteStore::new(location))
    } else {
        Box::new(LocalStore::new(location))
    }
}

fn document_name(version: &str) -> String {
    format!("{}.json", version)
}
