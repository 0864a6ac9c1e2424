// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Handle ownership registry.
//!
//! Opaque resources never cross the boundary by content; the managed side
//! holds an id referencing a slot in this registry. Each handle has exactly
//! one owning side at any time, and exactly one release is permitted.
//! Freed slots are reused under a bumped generation, so an id that outlives
//! its resource fails the liveness check instead of aliasing the slot's
//! next occupant.

use crate::error::Error;
use log::{debug, trace};
use parking_lot::Mutex;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// The two sides of the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// The native (Rust) side, where resources live.
    Native,
    /// The managed runtime side.
    Managed,
}

impl Side {
    /// The opposite side of the boundary.
    pub fn opposite(self) -> Self {
        match self {
            Self::Native => Self::Managed,
            Self::Managed => Self::Native,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Native => write!(f, "native"),
            Self::Managed => write!(f, "managed"),
        }
    }
}

/// Opaque handle identifier: slot index in the low 32 bits, slot generation
/// in the high 32 bits. `u64` keeps the id ABI-stable across the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandleId(u64);

impl HandleId {
    fn new(index: u32, generation: u32) -> Self {
        Self((u64::from(generation) << 32) | u64::from(index))
    }

    fn index(self) -> u32 {
        (self.0 & 0xFFFF_FFFF) as u32
    }

    fn generation(self) -> u32 {
        (self.0 >> 32) as u32
    }

    /// Raw id for transport across the boundary.
    pub fn raw(self) -> u64 {
        self.0
    }

    /// Reconstruct an id received from the boundary. Liveness is checked at
    /// use, not here.
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for HandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.g{}", self.index(), self.generation())
    }
}

/// Resources are stored type-erased; generated bindings downcast on resolve.
pub type Resource = Arc<dyn Any + Send + Sync>;

struct Entry {
    resource: Resource,
    owner: Side,
}

struct Slot {
    generation: u32,
    entry: Option<Entry>,
}

#[derive(Default)]
struct Table {
    slots: Vec<Slot>,
    free: Vec<u32>,
}

impl Table {
    /// Live entry for `id`, or `UseAfterRelease` if the id is released,
    /// stale, or was never issued.
    fn entry(&self, id: HandleId) -> Result<&Entry, Error> {
        self.slots
            .get(id.index() as usize)
            .filter(|slot| slot.generation == id.generation())
            .and_then(|slot| slot.entry.as_ref())
            .ok_or(Error::UseAfterRelease(id))
    }

    fn entry_mut(&mut self, id: HandleId) -> Result<&mut Entry, Error> {
        self.slots
            .get_mut(id.index() as usize)
            .filter(|slot| slot.generation == id.generation())
            .and_then(|slot| slot.entry.as_mut())
            .ok_or(Error::UseAfterRelease(id))
    }
}

/// Registry tracking every opaque handle that may cross the boundary.
///
/// A single mutex serializes all lifecycle operations; they are infrequent
/// relative to data transfer volume, so contention is not a concern.
pub struct HandleRegistry {
    inner: Mutex<Table>,
}

impl HandleRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Table::default()),
        }
    }

    /// Register a native resource, returning its handle. The given side is
    /// recorded as the initial owner.
    pub fn register(&self, resource: Resource, owner: Side) -> HandleId {
        let mut table = self.inner.lock();
        let id = match table.free.pop() {
            Some(index) => {
                let slot = &mut table.slots[index as usize];
                slot.entry = Some(Entry { resource, owner });
                HandleId::new(index, slot.generation)
            }
            None => {
                let index = table.slots.len() as u32;
                table.slots.push(Slot {
                    generation: 0,
                    entry: Some(Entry { resource, owner }),
                });
                HandleId::new(index, 0)
            }
        };
        debug!("handle {} registered, owner {}", id, owner);
        id
    }

    /// Resolve a live handle to its resource.
    pub fn resolve(&self, id: HandleId) -> Result<Resource, Error> {
        let table = self.inner.lock();
        Ok(table.entry(id)?.resource.clone())
    }

    /// Current owner of a live handle.
    pub fn owner(&self, id: HandleId) -> Result<Side, Error> {
        let table = self.inner.lock();
        Ok(table.entry(id)?.owner)
    }

    /// Move ownership of a live handle to `to`, returning the previous
    /// owner so callers can undo the transfer on downstream failure.
    pub fn transfer(&self, id: HandleId, to: Side) -> Result<Side, Error> {
        let mut table = self.inner.lock();
        let entry = table.entry_mut(id)?;
        let previous = entry.owner;
        entry.owner = to;
        trace!("handle {} transferred {} -> {}", id, previous, to);
        Ok(previous)
    }

    /// Release a handle. Only the owning side may release; a second release
    /// fails with `UseAfterRelease` rather than touching the slot.
    ///
    /// The slot's generation is bumped on release, so the freed index can be
    /// reissued for a new resource while every outstanding copy of the old
    /// id keeps failing the liveness check.
    pub fn release(&self, id: HandleId, caller: Side) -> Result<(), Error> {
        let mut table = self.inner.lock();
        let owner = table.entry(id)?.owner;
        if owner != caller {
            return Err(Error::OwnershipViolation {
                handle: id,
                owner,
                caller,
            });
        }
        let slot = &mut table.slots[id.index() as usize];
        slot.entry = None;
        slot.generation = slot.generation.wrapping_add(1);
        table.free.push(id.index());
        debug!("handle {} released by {}", id, caller);
        Ok(())
    }

    /// Whether the handle is currently live.
    pub fn is_live(&self, id: HandleId) -> bool {
        self.inner.lock().entry(id).is_ok()
    }

    /// Number of live handles. Stable across repeated transfers; the soak
    /// tests assert this to catch leaks.
    pub fn live_count(&self) -> usize {
        self.inner
            .lock()
            .slots
            .iter()
            .filter(|slot| slot.entry.is_some())
            .count()
    }
}

impl Default for HandleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resource(label: &str) -> Resource {
        Arc::new(label.to_string())
    }

    #[test]
    fn test_register_resolve() {
        let registry = HandleRegistry::new();
        let id = registry.register(resource("deck"), Side::Native);

        let resolved = registry.resolve(id).expect("resolve");
        let label = resolved.downcast_ref::<String>().expect("downcast");
        assert_eq!(label, "deck");
        assert_eq!(registry.owner(id).expect("owner"), Side::Native);
    }

    #[test]
    fn test_double_release_fails() {
        let registry = HandleRegistry::new();
        let id = registry.register(resource("deck"), Side::Native);

        registry.release(id, Side::Native).expect("first release");
        match registry.release(id, Side::Native) {
            Err(Error::UseAfterRelease(stale)) => assert_eq!(stale, id),
            other => panic!("expected UseAfterRelease, got {:?}", other),
        }
    }

    #[test]
    fn test_resolve_after_release_fails() {
        let registry = HandleRegistry::new();
        let id = registry.register(resource("deck"), Side::Native);
        registry.release(id, Side::Native).expect("release");

        assert!(matches!(
            registry.resolve(id),
            Err(Error::UseAfterRelease(_))
        ));
        assert!(!registry.is_live(id));
    }

    #[test]
    fn test_release_by_non_owner_fails() {
        let registry = HandleRegistry::new();
        let id = registry.register(resource("deck"), Side::Native);

        match registry.release(id, Side::Managed) {
            Err(Error::OwnershipViolation { owner, caller, .. }) => {
                assert_eq!(owner, Side::Native);
                assert_eq!(caller, Side::Managed);
            }
            other => panic!("expected OwnershipViolation, got {:?}", other),
        }
        // The failed release must not have consumed the handle.
        assert!(registry.is_live(id));
    }

    #[test]
    fn test_transfer_moves_ownership() {
        let registry = HandleRegistry::new();
        let id = registry.register(resource("deck"), Side::Native);

        let previous = registry.transfer(id, Side::Managed).expect("transfer");
        assert_eq!(previous, Side::Native);
        assert_eq!(registry.owner(id).expect("owner"), Side::Managed);

        // After transfer the native side may no longer release.
        assert!(matches!(
            registry.release(id, Side::Native),
            Err(Error::OwnershipViolation { .. })
        ));
        registry.release(id, Side::Managed).expect("managed release");
    }

    #[test]
    fn test_stale_id_after_slot_reuse() {
        let registry = HandleRegistry::new();
        let first = registry.register(resource("first"), Side::Native);
        registry.release(first, Side::Native).expect("release");

        // The slot is reused under a new generation...
        let second = registry.register(resource("second"), Side::Native);
        assert_ne!(first, second);

        // ...and the stale id keeps failing instead of aliasing it.
        assert!(matches!(
            registry.resolve(first),
            Err(Error::UseAfterRelease(_))
        ));
        let resolved = registry.resolve(second).expect("resolve");
        assert_eq!(resolved.downcast_ref::<String>().unwrap(), "second");
    }

    #[test]
    fn test_live_count() {
        let registry = HandleRegistry::new();
        assert_eq!(registry.live_count(), 0);

        let a = registry.register(resource("a"), Side::Native);
        let b = registry.register(resource("b"), Side::Native);
        assert_eq!(registry.live_count(), 2);

        registry.release(a, Side::Native).expect("release a");
        assert_eq!(registry.live_count(), 1);
        registry.release(b, Side::Native).expect("release b");
        assert_eq!(registry.live_count(), 0);
    }

    #[test]
    fn test_raw_round_trip() {
        let registry = HandleRegistry::new();
        let id = registry.register(resource("deck"), Side::Native);
        let wire = id.raw();
        assert_eq!(HandleId::from_raw(wire), id);
    }
}
