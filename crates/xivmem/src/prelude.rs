//! Prelude module for convenient imports
//!
//! ```
//! use xivmem::prelude::*;
//! ```
//!
//! This brings the following into scope:
//!
//! - Process access: `MemoryAccessor`, `TargetProcess`, `ProcessHandle`
//! - Pointers: `Pointer`, `PointerBase`, `Offset`
//! - Persistence: `DefinitionCatalog`, `Rebind`
//! - Error handling: `Error`, `Result`

// Process access
pub use crate::memory::{MemoryAccessor, ProcessHandle, StringEncoding, TargetProcess};

// Error handling
pub use crate::error::{Error, Result};

// Pointer types
pub use crate::pointer::{Offset, Pointer, PointerBase};

// Module lookup
pub use crate::module::{ModuleCatalog, ModuleDescriptor};

// Persistence
pub use crate::codec::{DecodedCatalog, DefinitionCatalog, Rebind};
