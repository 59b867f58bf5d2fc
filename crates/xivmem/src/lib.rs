//! # xivmem
//!
//! Reading and writing the memory of a running game process through
//! relocation-independent pointer definitions.
//!
//! This crate provides:
//! - A typed memory accessor over any [`TargetProcess`] (Windows handles, or
//!   the in-memory mock behind the `mock` feature)
//! - Module lookup by name
//! - Multi-level pointers anchored at a module base, with a compact text form
//!   (`ffxiv_dx11.exe+19D55E8,4C`)
//! - JSON persistence of pointers and whole definition catalogs that re-resolve
//!   against a new process on load
//!
//! ```
//! use xivmem::memory::mock::MockProcessBuilder;
//! use xivmem::{MemoryAccessor, Pointer};
//!
//! let process = MockProcessBuilder::new()
//!     .module("ffxiv_dx11.exe", 0x1_4000_0000, 0x200_0000)
//!     .pointer(0x1_419D_55E8, 0x2000)
//!     .bytes(0x2000, &[0u8; 0x100])
//!     .build();
//! let accessor = MemoryAccessor::open(process).unwrap();
//!
//! let mut territory: Pointer = "ffxiv_dx11.exe+19D55E8,4C".parse().unwrap();
//! assert_eq!(territory.resolve(&accessor).unwrap(), 0x204C);
//! ```

pub mod codec;
pub mod config;
pub mod error;
pub mod memory;
pub mod module;
pub mod pointer;
pub mod prelude;

pub use codec::{
    DecodeFailure, DecodedCatalog, DefinitionCatalog, DescriptorEntry, PointerDescriptor, Rebind,
    decode_bound, encode_value,
};
pub use config::{AccessorConfig, AccessorConfigBuilder};
pub use error::{Error, Result};
pub use memory::{MemoryAccessor, ProcessHandle, Scalar, StringEncoding, TargetProcess};
pub use module::{ModuleCatalog, ModuleDescriptor};
pub use pointer::{ChainStep, Offset, Pointer, PointerBase, Walk, offset_address};
