// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Process-wide layout-descriptor registry.
//!
//! Append-only: descriptors go in at startup (generated registration code
//! runs in a defined order) and are never evicted or replaced. Lookups are
//! lock-free; registration is serialized by the order lock, which also makes
//! the conflict check atomic with the insert.

use crate::descriptor::{TypeDescriptor, TypeKind};
use crate::error::Error;
use dashmap::DashMap;
use log::debug;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;

/// Registry of every type shape known to the boundary.
pub struct TypeRegistry {
    by_name: DashMap<String, Arc<TypeDescriptor>>,
    order: Mutex<Vec<Arc<TypeDescriptor>>>,
}

impl TypeRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            by_name: DashMap::new(),
            order: Mutex::new(Vec::new()),
        }
    }

    /// Register a descriptor.
    ///
    /// Registering the same name with an identical shape is a no-op (shared
    /// types may be registered from several generated modules); a different
    /// shape under an existing name is a `RegistrationConflict`.
    pub fn register(&self, desc: TypeDescriptor) -> Result<Arc<TypeDescriptor>, Error> {
        validate(&desc)?;

        let mut order = self.order.lock();
        if let Some(existing) = self.by_name.get(&desc.name) {
            if **existing == desc {
                return Ok(existing.value().clone());
            }
            return Err(Error::RegistrationConflict(desc.name));
        }

        let desc = Arc::new(desc);
        self.by_name.insert(desc.name.clone(), desc.clone());
        order.push(desc.clone());
        debug!("registered type '{}' ({} total)", desc.name, order.len());
        Ok(desc)
    }

    /// Look up a descriptor by type name.
    pub fn lookup(&self, name: &str) -> Option<Arc<TypeDescriptor>> {
        self.by_name.get(name).map(|entry| entry.value().clone())
    }

    /// Whether a type is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Registered descriptors in registration order.
    pub fn registered(&self) -> Vec<Arc<TypeDescriptor>> {
        self.order.lock().clone()
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        self.order.lock().len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Reject descriptors that could never decode unambiguously. Walks the
/// whole shape, so anonymous nested enums/unions are held to the same
/// rules as top-level ones.
fn validate(desc: &TypeDescriptor) -> Result<(), Error> {
    validate_kind(&desc.name, &desc.kind)
}

fn validate_kind(type_name: &str, kind: &TypeKind) -> Result<(), Error> {
    let fail = |reason: String| Error::InvalidDescriptor {
        type_name: type_name.into(),
        reason,
    };

    match kind {
        TypeKind::Enum(e) => {
            if e.variants.is_empty() {
                return Err(fail("enum has no variants".into()));
            }
            if !e.underlying.is_discriminant() {
                return Err(fail(format!(
                    "{:?} cannot carry a discriminant",
                    e.underlying
                )));
            }
            let mut tags = HashSet::new();
            let mut names = HashSet::new();
            for v in &e.variants {
                if !tags.insert(v.tag) {
                    return Err(fail(format!("duplicate tag {}", v.tag)));
                }
                if !names.insert(v.name.as_str()) {
                    return Err(fail(format!("duplicate variant '{}'", v.name)));
                }
                if !e.underlying.fits_tag(v.tag) {
                    return Err(fail(format!(
                        "tag {} does not fit discriminant width {:?}",
                        v.tag, e.underlying
                    )));
                }
            }
        }
        TypeKind::Union(u) => {
            if u.cases.is_empty() {
                return Err(fail("union has no cases".into()));
            }
            if !u.discriminant.is_discriminant() {
                return Err(fail(format!(
                    "{:?} cannot carry a discriminant",
                    u.discriminant
                )));
            }
            let mut tags = HashSet::new();
            let mut names = HashSet::new();
            for case in &u.cases {
                if !tags.insert(case.tag) {
                    return Err(fail(format!("duplicate tag {}", case.tag)));
                }
                if !names.insert(case.name.as_str()) {
                    return Err(fail(format!("duplicate case '{}'", case.name)));
                }
                if !u.discriminant.fits_tag(case.tag) {
                    return Err(fail(format!(
                        "tag {} does not fit discriminant width {:?}",
                        case.tag, u.discriminant
                    )));
                }
                let mut fields = HashSet::new();
                for field in &case.fields {
                    if !fields.insert(field.name.as_str()) {
                        return Err(fail(format!(
                            "duplicate field '{}' in case '{}'",
                            field.name, case.name
                        )));
                    }
                    validate_kind(type_name, &field.type_desc.kind)?;
                }
            }
        }
        TypeKind::Struct(struct_fields) => {
            let mut fields = HashSet::new();
            for field in struct_fields {
                if !fields.insert(field.name.as_str()) {
                    return Err(fail(format!("duplicate field '{}'", field.name)));
                }
                validate_kind(type_name, &field.type_desc.kind)?;
            }
        }
        TypeKind::Sequence(seq) => validate_kind(type_name, &seq.element_type.kind)?,
        TypeKind::Nested(inner) => validate_kind(type_name, &inner.kind)?,
        TypeKind::Primitive(_) | TypeKind::Handle => {}
    }
    Ok(())
}
