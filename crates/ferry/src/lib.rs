// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # ferry
//!
//! Marshaling core for a cross-language interoperability layer: transports
//! enums (plain and discriminant-valued), tagged unions, collections, and
//! opaque resource handles across an FFI boundary between a native Rust
//! side and a managed runtime, preserving value identity and ownership.
//!
//! # Architecture
//!
//! - **Layout descriptors** ([`descriptor`]): static shape metadata,
//!   registered once and shared read-only.
//! - **Wire codec** ([`codec`]): discriminant codec, tagged-union codec and
//!   collection transport over a little-endian, alignment-aware format.
//! - **Registries** ([`registry`], [`handle`]): the append-only type table
//!   and the single-owner handle lifecycle.
//! - **Boundary contexts** ([`boundary`]): per-side marshal/unmarshal entry
//!   points.
//!
//! # Example
//!
//! ```rust
//! use ferry::{BoundaryContext, PrimitiveKind, StructBuilder, Value};
//!
//! let native = BoundaryContext::native();
//! let managed = native.peer();
//!
//! let point = native.register_type(
//!     StructBuilder::new("Point")
//!         .field("x", PrimitiveKind::I32)
//!         .field("y", PrimitiveKind::I32)
//!         .build(),
//! )?;
//!
//! let value = Value::struct_of([("x", 33i32.into()), ("y", 12345i32.into())]);
//! let wire = native.marshal(&point, &value)?;
//! let back = managed.unmarshal(&point, &wire)?;
//! assert_eq!(back, value);
//! # Ok::<(), ferry::Error>(())
//! ```

pub mod boundary;
pub mod codec;
pub mod descriptor;
mod error;
pub mod handle;
pub mod registry;
mod value;

pub use boundary::BoundaryContext;
pub use codec::{decode_variant, encode_variant};
pub use descriptor::{
    EnumBuilder, EnumDescriptor, EnumVariant, FieldDescriptor, PrimitiveKind, SequenceDescriptor,
    StructBuilder, TypeDescriptor, TypeKind, UnionBuilder, UnionCase, UnionDescriptor,
};
pub use error::Error;
pub use handle::{HandleId, HandleRegistry, Resource, Side};
pub use registry::TypeRegistry;
pub use value::Value;
