// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Fluent builders for layout descriptors.
//!
//! The generated registration stubs use these to construct descriptors at
//! startup; duplicate-tag and duplicate-field validation happens once at
//! registration time, not here.

use crate::descriptor::{
    EnumDescriptor, EnumVariant, FieldDescriptor, PrimitiveKind, SequenceDescriptor,
    TypeDescriptor, TypeKind, UnionCase, UnionDescriptor,
};
use std::sync::Arc;

/// Builder for fixed-struct descriptors.
#[derive(Debug)]
pub struct StructBuilder {
    name: String,
    fields: Vec<FieldDescriptor>,
}

impl StructBuilder {
    /// Create a new builder for a struct type.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Add a primitive field.
    pub fn field(mut self, name: impl Into<String>, kind: PrimitiveKind) -> Self {
        let type_desc = Arc::new(TypeDescriptor::primitive("", kind));
        self.fields.push(FieldDescriptor::new(name, type_desc));
        self
    }

    /// Add a string field.
    pub fn string_field(self, name: impl Into<String>) -> Self {
        self.field(name, PrimitiveKind::String { max_length: None })
    }

    /// Add a field with an explicit type descriptor.
    pub fn field_with_type(
        mut self,
        name: impl Into<String>,
        type_desc: Arc<TypeDescriptor>,
    ) -> Self {
        self.fields.push(FieldDescriptor::new(name, type_desc));
        self
    }

    /// Add a sequence field over a primitive element type.
    pub fn sequence_field(mut self, name: impl Into<String>, element_kind: PrimitiveKind) -> Self {
        let element_type = Arc::new(TypeDescriptor::primitive("", element_kind));
        let seq_desc = SequenceDescriptor::unbounded(element_type);
        let type_desc = Arc::new(TypeDescriptor::new("", TypeKind::Sequence(seq_desc)));
        self.fields.push(FieldDescriptor::new(name, type_desc));
        self
    }

    /// Add a nested struct field.
    pub fn nested_field(mut self, name: impl Into<String>, nested: Arc<TypeDescriptor>) -> Self {
        let type_desc = Arc::new(TypeDescriptor::new("", TypeKind::Nested(nested)));
        self.fields.push(FieldDescriptor::new(name, type_desc));
        self
    }

    /// Build the descriptor.
    pub fn build(self) -> TypeDescriptor {
        TypeDescriptor::struct_type(self.name, self.fields)
    }
}

/// Builder for discriminant-enum descriptors.
#[derive(Debug)]
pub struct EnumBuilder {
    name: String,
    variants: Vec<EnumVariant>,
    next_tag: i64,
    underlying: PrimitiveKind,
}

impl EnumBuilder {
    /// Create a new enum builder.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            variants: Vec::new(),
            next_tag: 0,
            underlying: PrimitiveKind::U32,
        }
    }

    /// Add a variant with auto-incrementing tag.
    pub fn variant(mut self, name: impl Into<String>) -> Self {
        self.variants.push(EnumVariant::new(name, self.next_tag));
        self.next_tag += 1;
        self
    }

    /// Add a variant with explicit tag. Subsequent auto-incremented tags
    /// continue from it, matching source-language enum semantics.
    pub fn variant_tag(mut self, name: impl Into<String>, tag: i64) -> Self {
        self.variants.push(EnumVariant::new(name, tag));
        self.next_tag = tag + 1;
        self
    }

    /// Set the wire width of the discriminant.
    pub fn underlying(mut self, kind: PrimitiveKind) -> Self {
        self.underlying = kind;
        self
    }

    /// Build the descriptor.
    pub fn build(self) -> TypeDescriptor {
        let enum_desc = EnumDescriptor::new(self.variants).with_underlying(self.underlying);
        TypeDescriptor::new(self.name, TypeKind::Enum(enum_desc))
    }
}

/// Builder for tagged-union descriptors.
#[derive(Debug)]
pub struct UnionBuilder {
    name: String,
    discriminant: PrimitiveKind,
    cases: Vec<UnionCase>,
    next_tag: i64,
}

impl UnionBuilder {
    /// Create a new union builder with the default u32 discriminant.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            discriminant: PrimitiveKind::U32,
            cases: Vec::new(),
            next_tag: 0,
        }
    }

    /// Set the wire width of the discriminant.
    pub fn discriminant(mut self, kind: PrimitiveKind) -> Self {
        self.discriminant = kind;
        self
    }

    /// Add a unit (no payload) case with auto-incrementing tag.
    pub fn unit_case(mut self, name: impl Into<String>) -> Self {
        self.cases.push(UnionCase::unit(name, self.next_tag));
        self.next_tag += 1;
        self
    }

    /// Add a case carrying a single primitive field.
    pub fn primitive_case(
        mut self,
        name: impl Into<String>,
        field_name: impl Into<String>,
        kind: PrimitiveKind,
    ) -> Self {
        let field = FieldDescriptor::new(
            field_name,
            Arc::new(TypeDescriptor::primitive("", kind)),
        );
        self.cases
            .push(UnionCase::new(name, self.next_tag, vec![field]));
        self.next_tag += 1;
        self
    }

    /// Add a case with an explicit tag and payload fields in wire order.
    pub fn case(
        mut self,
        name: impl Into<String>,
        tag: i64,
        fields: Vec<FieldDescriptor>,
    ) -> Self {
        self.cases.push(UnionCase::new(name, tag, fields));
        self.next_tag = tag + 1;
        self
    }

    /// Add a case with payload fields and auto-incrementing tag.
    pub fn fields_case(
        mut self,
        name: impl Into<String>,
        fields: Vec<FieldDescriptor>,
    ) -> Self {
        self.cases.push(UnionCase::new(name, self.next_tag, fields));
        self.next_tag += 1;
        self
    }

    /// Build the descriptor.
    pub fn build(self) -> TypeDescriptor {
        let mut union_desc = UnionDescriptor::new(self.cases);
        union_desc.discriminant = self.discriminant;
        TypeDescriptor::new(self.name, TypeKind::Union(union_desc))
    }
}
