// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Per-side boundary contexts.
//!
//! A [`BoundaryContext`] binds one side of the FFI to the shared type and
//! handle registries and exposes the marshal operations. Unmarshaling runs
//! on the receiving side, so handles decoded by a context become owned by
//! that context's side; until then the sender keeps them live. Two contexts
//! over the same registries exercise the full boundary in-process, which is
//! how the integration tests are written.

use crate::codec;
use crate::descriptor::TypeDescriptor;
use crate::error::Error;
use crate::handle::{HandleId, HandleRegistry, Resource, Side};
use crate::registry::TypeRegistry;
use crate::value::Value;
use std::sync::Arc;

/// One side's view of the marshaling core.
#[derive(Clone)]
pub struct BoundaryContext {
    side: Side,
    types: Arc<TypeRegistry>,
    handles: Arc<HandleRegistry>,
}

impl BoundaryContext {
    /// Create a context for `side` over shared registries.
    pub fn new(side: Side, types: Arc<TypeRegistry>, handles: Arc<HandleRegistry>) -> Self {
        Self {
            side,
            types,
            handles,
        }
    }

    /// Create the native-side context with fresh registries.
    pub fn native() -> Self {
        Self::new(
            Side::Native,
            Arc::new(TypeRegistry::new()),
            Arc::new(HandleRegistry::new()),
        )
    }

    /// Create the context for the opposite side over the same registries.
    pub fn peer(&self) -> Self {
        Self::new(self.side.opposite(), self.types.clone(), self.handles.clone())
    }

    /// Which side this context represents.
    pub fn side(&self) -> Side {
        self.side
    }

    /// Shared type registry.
    pub fn types(&self) -> &Arc<TypeRegistry> {
        &self.types
    }

    /// Shared handle registry.
    pub fn handles(&self) -> &Arc<HandleRegistry> {
        &self.handles
    }

    /// Register a type's layout descriptor. Must happen before any value of
    /// the type is marshaled.
    pub fn register_type(&self, desc: TypeDescriptor) -> Result<Arc<TypeDescriptor>, Error> {
        self.types.register(desc)
    }

    /// Encode a value of a registered type into its wire representation.
    pub fn marshal(&self, desc: &TypeDescriptor, value: &Value) -> Result<Vec<u8>, Error> {
        self.require_registered(desc)?;
        codec::encode(desc, value, &self.handles)
    }

    /// Decode a wire representation back into a value. Handles inside the
    /// value become owned by this context's side; on failure the decode is
    /// atomic (no transfer sticks).
    pub fn unmarshal(&self, desc: &TypeDescriptor, bytes: &[u8]) -> Result<Value, Error> {
        self.require_registered(desc)?;
        codec::decode(desc, bytes, &self.handles, self.side)
    }

    /// Encode an ordered sequence of values sharing one element descriptor.
    pub fn marshal_sequence(
        &self,
        element: &TypeDescriptor,
        values: &[Value],
    ) -> Result<Vec<u8>, Error> {
        self.require_registered(element)?;
        codec::encode_sequence(element, values, &self.handles)
    }

    /// Decode a wire collection. Length, order and duplicates are preserved;
    /// the empty sequence decodes to an empty sequence. Handle elements
    /// transfer one by one and roll back together on mid-sequence failure.
    pub fn unmarshal_sequence(
        &self,
        element: &TypeDescriptor,
        bytes: &[u8],
    ) -> Result<Vec<Value>, Error> {
        self.require_registered(element)?;
        codec::decode_sequence(element, bytes, &self.handles, self.side)
    }

    /// Register a native resource, owned by this context's side.
    pub fn acquire(&self, resource: Resource) -> HandleId {
        self.handles.register(resource, self.side)
    }

    /// Resolve a live handle to its resource.
    pub fn resolve(&self, id: HandleId) -> Result<Resource, Error> {
        self.handles.resolve(id)
    }

    /// Release a handle owned by this context's side. Exactly one release
    /// per handle; the registry rejects the rest.
    pub fn release(&self, id: HandleId) -> Result<(), Error> {
        self.handles.release(id, self.side)
    }

    fn require_registered(&self, desc: &TypeDescriptor) -> Result<(), Error> {
        if desc.name.is_empty() || self.types.contains(&desc.name) {
            Ok(())
        } else {
            Err(Error::UnregisteredType(desc.name.clone()))
        }
    }
}
