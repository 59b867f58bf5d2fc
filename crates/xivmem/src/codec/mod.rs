//! Process-independent persistence of pointer definitions.
//!
//! A saved pointer records how to find an address (module name, offsets),
//! never the address itself. Decoding rebuilds the definition and resolves it
//! against whichever process the accessor is attached to.

mod bind;
mod catalog;
mod descriptor;

pub use bind::{Rebind, decode_bound, encode_value};
pub use catalog::{DecodeFailure, DecodedCatalog, DefinitionCatalog};
pub use descriptor::{
    BaseDescriptor, DescriptorEntry, HexAddress, HexOffset, PointerDescriptor, decode,
    decode_entry, encode,
};
