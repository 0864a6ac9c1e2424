// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Layout descriptors: static metadata describing the shape of every type
//! that crosses the boundary.
//!
//! Descriptors are built once (normally at startup, by generated
//! registration code), registered, and shared read-only behind `Arc` for the
//! rest of the process. All codecs dispatch on them.

mod builder;

pub use builder::{EnumBuilder, StructBuilder, UnionBuilder};

use std::sync::Arc;

/// Primitive type kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Bool,
    U8,
    U16,
    U32,
    U64,
    I8,
    I16,
    I32,
    I64,
    F32,
    F64,
    String { max_length: Option<usize> },
}

impl PrimitiveKind {
    /// Get the encoded size in bytes (None for strings).
    pub fn size(&self) -> Option<usize> {
        match self {
            Self::Bool | Self::U8 | Self::I8 => Some(1),
            Self::U16 | Self::I16 => Some(2),
            Self::U32 | Self::I32 | Self::F32 => Some(4),
            Self::U64 | Self::I64 | Self::F64 => Some(8),
            Self::String { .. } => None,
        }
    }

    /// Get wire alignment requirement.
    pub fn alignment(&self) -> usize {
        match self {
            Self::Bool | Self::U8 | Self::I8 => 1,
            Self::U16 | Self::I16 => 2,
            Self::U32 | Self::I32 | Self::F32 | Self::String { .. } => 4,
            Self::U64 | Self::I64 | Self::F64 => 8,
        }
    }

    /// Whether the kind can carry an enum/union discriminant.
    pub fn is_discriminant(&self) -> bool {
        matches!(
            self,
            Self::U8 | Self::U16 | Self::U32 | Self::I8 | Self::I16 | Self::I32 | Self::I64
        )
    }

    /// Whether `tag` is representable in this discriminant width.
    pub fn fits_tag(&self, tag: i64) -> bool {
        match self {
            Self::U8 => u8::try_from(tag).is_ok(),
            Self::U16 => u16::try_from(tag).is_ok(),
            Self::U32 => u32::try_from(tag).is_ok(),
            Self::I8 => i8::try_from(tag).is_ok(),
            Self::I16 => i16::try_from(tag).is_ok(),
            Self::I32 => i32::try_from(tag).is_ok(),
            Self::I64 => true,
            _ => false,
        }
    }
}

/// Type kind enumeration.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeKind {
    /// Primitive type.
    Primitive(PrimitiveKind),
    /// Fixed struct with named fields.
    Struct(Vec<FieldDescriptor>),
    /// Ordered homogeneous collection (dynamic length).
    Sequence(SequenceDescriptor),
    /// Enumeration with explicit discriminant values.
    Enum(EnumDescriptor),
    /// Tagged union: discriminant plus per-variant payload shape.
    Union(UnionDescriptor),
    /// Opaque resource handle; the value never crosses by content.
    Handle,
    /// Nested type reference.
    Nested(Arc<TypeDescriptor>),
}

/// A complete layout descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDescriptor {
    /// Type name, unique within the registry.
    pub name: String,
    /// Type kind.
    pub kind: TypeKind,
}

impl TypeDescriptor {
    /// Create a new descriptor.
    pub fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    /// Create a primitive descriptor.
    pub fn primitive(name: impl Into<String>, kind: PrimitiveKind) -> Self {
        Self::new(name, TypeKind::Primitive(kind))
    }

    /// Create a struct descriptor.
    pub fn struct_type(name: impl Into<String>, fields: Vec<FieldDescriptor>) -> Self {
        Self::new(name, TypeKind::Struct(fields))
    }

    /// Create a descriptor for an opaque handle type.
    pub fn handle(name: impl Into<String>) -> Self {
        Self::new(name, TypeKind::Handle)
    }

    /// Create an unbounded sequence descriptor over an element type.
    pub fn sequence_of(name: impl Into<String>, element: Arc<TypeDescriptor>) -> Self {
        Self::new(
            name,
            TypeKind::Sequence(SequenceDescriptor::unbounded(element)),
        )
    }

    /// Check if this is a primitive type.
    pub fn is_primitive(&self) -> bool {
        matches!(self.kind, TypeKind::Primitive(_))
    }

    /// Check if this is a struct type.
    pub fn is_struct(&self) -> bool {
        matches!(self.kind, TypeKind::Struct(_))
    }

    /// Check if this is an opaque handle type.
    pub fn is_handle(&self) -> bool {
        matches!(self.kind, TypeKind::Handle)
    }

    /// Get fields if this is a struct.
    pub fn fields(&self) -> Option<&[FieldDescriptor]> {
        match &self.kind {
            TypeKind::Struct(fields) => Some(fields),
            _ => None,
        }
    }

    /// Get field by name.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields()?.iter().find(|f| f.name == name)
    }

    /// Get the enum descriptor if this is an enumeration.
    pub fn as_enum(&self) -> Option<&EnumDescriptor> {
        match &self.kind {
            TypeKind::Enum(e) => Some(e),
            _ => None,
        }
    }

    /// Get the union descriptor if this is a tagged union.
    pub fn as_union(&self) -> Option<&UnionDescriptor> {
        match &self.kind {
            TypeKind::Union(u) => Some(u),
            _ => None,
        }
    }

    /// Get wire alignment requirement.
    pub fn alignment(&self) -> usize {
        match &self.kind {
            TypeKind::Primitive(p) => p.alignment(),
            TypeKind::Struct(fields) => fields
                .iter()
                .map(|f| f.type_desc.alignment())
                .max()
                .unwrap_or(1),
            TypeKind::Sequence(seq) => seq.element_type.alignment().max(4),
            TypeKind::Enum(e) => e.underlying.alignment(),
            TypeKind::Union(u) => u.discriminant.alignment().max(
                u.cases
                    .iter()
                    .flat_map(|c| c.fields.iter())
                    .map(|f| f.type_desc.alignment())
                    .max()
                    .unwrap_or(1),
            ),
            TypeKind::Handle => 8,
            TypeKind::Nested(inner) => inner.alignment(),
        }
    }
}

/// Field descriptor for struct members and variant payload fields.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    /// Field name.
    pub name: String,
    /// Field type.
    pub type_desc: Arc<TypeDescriptor>,
}

impl FieldDescriptor {
    /// Create a new field descriptor.
    pub fn new(name: impl Into<String>, type_desc: Arc<TypeDescriptor>) -> Self {
        Self {
            name: name.into(),
            type_desc,
        }
    }
}

/// Sequence type descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceDescriptor {
    /// Element type shared by every item.
    pub element_type: Arc<TypeDescriptor>,
    /// Maximum length (None = unbounded).
    pub max_length: Option<usize>,
}

impl SequenceDescriptor {
    /// Create unbounded sequence.
    pub fn unbounded(element_type: Arc<TypeDescriptor>) -> Self {
        Self {
            element_type,
            max_length: None,
        }
    }

    /// Create bounded sequence.
    pub fn bounded(element_type: Arc<TypeDescriptor>, max_length: usize) -> Self {
        Self {
            element_type,
            max_length: Some(max_length),
        }
    }
}

/// Enumeration type descriptor.
///
/// Variant tags are explicit and need not be contiguous; the mapping is a
/// bijection, enforced at registration.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumDescriptor {
    /// Enum variants with explicit discriminant values.
    pub variants: Vec<EnumVariant>,
    /// Wire representation of the discriminant (default u32).
    pub underlying: PrimitiveKind,
}

impl EnumDescriptor {
    /// Create enum descriptor with the default u32 discriminant width.
    pub fn new(variants: Vec<EnumVariant>) -> Self {
        Self {
            variants,
            underlying: PrimitiveKind::U32,
        }
    }

    /// Create with specific underlying discriminant kind.
    pub fn with_underlying(mut self, underlying: PrimitiveKind) -> Self {
        self.underlying = underlying;
        self
    }

    /// Get variant by name.
    pub fn variant(&self, name: &str) -> Option<&EnumVariant> {
        self.variants.iter().find(|v| v.name == name)
    }

    /// Get variant by discriminant value.
    pub fn variant_by_tag(&self, tag: i64) -> Option<&EnumVariant> {
        self.variants.iter().find(|v| v.tag == tag)
    }
}

/// Enum variant.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumVariant {
    /// Variant name.
    pub name: String,
    /// Explicit discriminant value.
    pub tag: i64,
}

impl EnumVariant {
    /// Create enum variant.
    pub fn new(name: impl Into<String>, tag: i64) -> Self {
        Self {
            name: name.into(),
            tag,
        }
    }
}

/// Tagged-union type descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct UnionDescriptor {
    /// Wire representation of the discriminant.
    pub discriminant: PrimitiveKind,
    /// Union cases, one per variant.
    pub cases: Vec<UnionCase>,
}

impl UnionDescriptor {
    /// Create union descriptor with the default u32 discriminant width.
    pub fn new(cases: Vec<UnionCase>) -> Self {
        Self {
            discriminant: PrimitiveKind::U32,
            cases,
        }
    }

    /// Get case by discriminant value.
    pub fn case_by_tag(&self, tag: i64) -> Option<&UnionCase> {
        self.cases.iter().find(|c| c.tag == tag)
    }

    /// Get case by variant name.
    pub fn case(&self, name: &str) -> Option<&UnionCase> {
        self.cases.iter().find(|c| c.name == name)
    }
}

/// Tagged-union case: one variant and its payload shape.
///
/// An empty field list is a unit variant; it encodes nothing past the tag
/// and decodes without reading payload bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct UnionCase {
    /// Variant name.
    pub name: String,
    /// Explicit discriminant value.
    pub tag: i64,
    /// Payload fields in declared (wire) order.
    pub fields: Vec<FieldDescriptor>,
}

impl UnionCase {
    /// Create a union case.
    pub fn new(name: impl Into<String>, tag: i64, fields: Vec<FieldDescriptor>) -> Self {
        Self {
            name: name.into(),
            tag,
            fields,
        }
    }

    /// Create a unit (no payload) case.
    pub fn unit(name: impl Into<String>, tag: i64) -> Self {
        Self::new(name, tag, Vec::new())
    }

    /// Whether this case carries no payload.
    pub fn is_unit(&self) -> bool {
        self.fields.is_empty()
    }
}
