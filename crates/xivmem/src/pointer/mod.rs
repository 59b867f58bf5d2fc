//! Portable pointer definitions and the chain resolution engine.
//!
//! A [`Pointer`] describes where a value lives as a base (absolute, or an
//! offset from a named module) followed by a chain of offsets. Resolving it
//! against a [`MemoryAccessor`] walks the chain:
//!
//! ```text
//! current = base                      (module base + offset, or absolute)
//! for each offset o in chain:
//!     current = read_pointer(current) + o
//! ```
//!
//! Each chain element performs one dereference followed by one addition, and
//! nothing is dereferenced after the last element. An empty chain resolves to
//! the base itself.
//!
//! Address arithmetic wraps modulo 2^(8 * pointer width). A negative offset
//! that crosses zero, or a positive one that crosses the top of the address
//! space, produces the wrapped address rather than an error.

mod text;

pub use text::{format_offset, parse_address, parse_offset};

use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::memory::{MemoryAccessor, TargetProcess};

/// Signed offset applied to an address
pub type Offset = i64;

/// Where resolution starts
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PointerBase {
    Absolute(u64),
    /// Only valid while the named module is loaded in the target
    ModuleRelative { module: String, offset: Offset },
}

/// A base plus an ordered chain of dereference-then-add steps.
///
/// A `Pointer` holds no process reference. The cached address is advisory: it
/// reflects the last successful [`resolve`](Pointer::resolve) and goes stale
/// when the target restarts or rewrites any pointer along the chain.
#[derive(Debug, Clone)]
pub struct Pointer {
    base: PointerBase,
    chain: Vec<Offset>,
    /// Last resolved address and the pointer width it was resolved at
    resolved: Option<(u64, usize)>,
}

/// Equality compares the definition only, never the cached address
impl PartialEq for Pointer {
    fn eq(&self, other: &Self) -> bool {
        self.base == other.base && self.chain == other.chain
    }
}

impl Eq for Pointer {}

impl Pointer {
    pub fn new(base: PointerBase, chain: Vec<Offset>) -> Self {
        Self {
            base,
            chain,
            resolved: None,
        }
    }

    pub fn absolute(address: u64, chain: Vec<Offset>) -> Self {
        Self::new(PointerBase::Absolute(address), chain)
    }

    pub fn module(module: impl Into<String>, offset: Offset, chain: Vec<Offset>) -> Self {
        Self::new(
            PointerBase::ModuleRelative {
                module: module.into(),
                offset,
            },
            chain,
        )
    }

    pub fn base(&self) -> &PointerBase {
        &self.base
    }

    pub fn chain(&self) -> &[Offset] {
        &self.chain
    }

    /// Module this pointer depends on, if any
    pub fn module_name(&self) -> Option<&str> {
        match &self.base {
            PointerBase::Absolute(_) => None,
            PointerBase::ModuleRelative { module, .. } => Some(module),
        }
    }

    /// Address from the last successful resolution
    pub fn address(&self) -> Option<u64> {
        self.resolved.map(|(address, _)| address)
    }

    /// Drop the cached address
    pub fn invalidate(&mut self) {
        self.resolved = None;
    }

    /// Resolve without touching the cache.
    ///
    /// Fails with [`Error::ModuleNotFound`] before any memory read if the base
    /// module is absent, and with [`Error::UnresolvableChain`] if a dereference
    /// fails.
    pub fn evaluate<P: TargetProcess>(&self, accessor: &MemoryAccessor<P>) -> Result<u64> {
        self.walk_with(accessor, |_| {})
    }

    /// Resolve without touching the cache, recording every dereference
    pub fn walk<P: TargetProcess>(&self, accessor: &MemoryAccessor<P>) -> Result<Walk> {
        let mut steps = Vec::with_capacity(self.chain.len());
        let address = self.walk_with(accessor, |step| steps.push(step))?;
        Ok(Walk { address, steps })
    }

    fn walk_with<P: TargetProcess>(
        &self,
        accessor: &MemoryAccessor<P>,
        mut visit: impl FnMut(ChainStep),
    ) -> Result<u64> {
        let width = accessor.pointer_width();

        let mut current = match &self.base {
            PointerBase::Absolute(address) => wrap(*address, width),
            PointerBase::ModuleRelative { module, offset } => {
                let base = accessor.module_base(module)?;
                offset_address(base, *offset, width)
            }
        };

        for (step, offset) in self.chain.iter().enumerate() {
            let target = accessor
                .read_pointer(current)
                .map_err(|e| Error::UnresolvableChain {
                    step,
                    address: current,
                    source: Box::new(e),
                })?;
            let next = offset_address(target, *offset, width);
            trace!(
                "Step {}: [{:#x}] = {:#x}, offset {} -> {:#x}",
                step,
                current,
                target,
                format_offset(*offset),
                next
            );
            visit(ChainStep {
                read_at: current,
                value: target,
                offset: *offset,
                next,
            });
            current = next;
        }

        Ok(current)
    }

    /// Resolve and cache the result. On failure the cache is cleared.
    pub fn resolve<P: TargetProcess>(&mut self, accessor: &MemoryAccessor<P>) -> Result<u64> {
        match self.evaluate(accessor) {
            Ok(address) => {
                debug!("Resolved {} -> {:#x}", self, address);
                self.resolved = Some((address, accessor.pointer_width()));
                Ok(address)
            }
            Err(e) => {
                self.resolved = None;
                Err(e)
            }
        }
    }

    /// Cached address plus a constant, without re-walking the chain.
    ///
    /// Addresses a field of the struct the chain leads to. Wraps at the
    /// pointer width of the process the pointer was resolved against.
    pub fn field(&self, offset: Offset) -> Result<u64> {
        self.resolved
            .map(|(address, width)| offset_address(address, offset, width))
            .ok_or(Error::Unresolved)
    }

    /// A new definition whose final step lands `delta` bytes further.
    ///
    /// Shifts the last chain offset, or the base when the chain is empty. The
    /// result is unresolved.
    pub fn rebased(&self, delta: Offset) -> Self {
        let mut base = self.base.clone();
        let mut chain = self.chain.clone();

        match chain.last_mut() {
            Some(last) => *last = last.wrapping_add(delta),
            None => match &mut base {
                PointerBase::Absolute(address) => {
                    *address = address.wrapping_add_signed(delta);
                }
                PointerBase::ModuleRelative { offset, .. } => {
                    *offset = offset.wrapping_add(delta);
                }
            },
        }

        Self::new(base, chain)
    }

    /// A new definition that dereferences the current target once more and
    /// then adds `offset`
    pub fn then(&self, offset: Offset) -> Self {
        let mut chain = self.chain.clone();
        chain.push(offset);
        Self::new(self.base.clone(), chain)
    }
}

/// One dereference-then-add step of a chain walk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainStep {
    /// Address the pointer value was read from
    pub read_at: u64,
    pub value: u64,
    pub offset: Offset,
    /// `value + offset`, the address the next step starts from
    pub next: u64,
}

/// Result of [`Pointer::walk`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Walk {
    pub address: u64,
    pub steps: Vec<ChainStep>,
}

/// Truncate an address to `width` bytes
fn wrap(address: u64, width: usize) -> u64 {
    if width >= 8 {
        address
    } else {
        address & ((1u64 << (width * 8)) - 1)
    }
}

/// `address + offset` modulo 2^(8 * width)
pub fn offset_address(address: u64, offset: Offset, width: usize) -> u64 {
    wrap(address.wrapping_add_signed(offset), width)
}
