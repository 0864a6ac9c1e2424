// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Discriminant codec: symbolic variant names to explicit integer tags and
//! back.
//!
//! Tags are whatever the native enum declares; nothing assumes 0..N-1. An
//! unknown tag is a decode failure, never coerced to a default variant —
//! silent coercion would hide boundary corruption.

use crate::codec::{WireDecoder, WireEncoder};
use crate::descriptor::{EnumDescriptor, TypeDescriptor};
use crate::error::Error;
use crate::value::Value;

/// Look up the tag for a variant name. Pure lookup, no side effects.
pub fn encode_variant(desc: &TypeDescriptor, variant: &str) -> Result<i64, Error> {
    let e = desc.as_enum().ok_or_else(|| Error::TypeMismatch {
        expected: "enum".into(),
        found: desc.name.clone(),
    })?;
    e.variant(variant).map(|v| v.tag).ok_or_else(|| {
        Error::InvalidData(format!(
            "'{}' is not a variant of '{}'",
            variant, desc.name
        ))
    })
}

/// Look up the variant name for a tag. Fails with `UnknownDiscriminant` for
/// any tag outside the registered mapping.
pub fn decode_variant<'d>(desc: &'d TypeDescriptor, tag: i64) -> Result<&'d str, Error> {
    let e = desc.as_enum().ok_or_else(|| Error::TypeMismatch {
        expected: "enum".into(),
        found: desc.name.clone(),
    })?;
    e.variant_by_tag(tag)
        .map(|v| v.name.as_str())
        .ok_or(Error::UnknownDiscriminant {
            type_name: desc.name.clone(),
            tag,
        })
}

pub(crate) fn encode_enum(
    encoder: &mut WireEncoder<'_>,
    desc: &TypeDescriptor,
    e: &EnumDescriptor,
    value: &Value,
) -> Result<(), Error> {
    let Value::Enum(tag, name) = value else {
        return Err(Error::TypeMismatch {
            expected: "enum".into(),
            found: format!("{:?}", value),
        });
    };
    let variant = e.variant_by_tag(*tag).ok_or(Error::UnknownDiscriminant {
        type_name: desc.name.clone(),
        tag: *tag,
    })?;
    if !name.is_empty() && variant.name != *name {
        return Err(Error::InvalidData(format!(
            "enum '{}' tag {} belongs to variant '{}', value claims '{}'",
            desc.name, tag, variant.name, name
        )));
    }
    encoder.encode_tag(*tag, e.underlying)
}

pub(crate) fn decode_enum(
    decoder: &mut WireDecoder<'_, '_>,
    desc: &TypeDescriptor,
    e: &EnumDescriptor,
) -> Result<Value, Error> {
    let tag = decoder.decode_tag(e.underlying)?;
    let variant = e.variant_by_tag(tag).ok_or(Error::UnknownDiscriminant {
        type_name: desc.name.clone(),
        tag,
    })?;
    Ok(Value::Enum(tag, variant.name.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{EnumBuilder, PrimitiveKind};

    fn suit() -> TypeDescriptor {
        EnumBuilder::new("Suit")
            .variant_tag("Coins", 3)
            .variant_tag("Bamboo", 17)
            .variant_tag("Characters", 90)
            .build()
    }

    #[test]
    fn test_round_trip_is_identity_for_every_variant() {
        let desc = suit();
        for name in ["Coins", "Bamboo", "Characters"] {
            let tag = encode_variant(&desc, name).expect("encode");
            assert_eq!(decode_variant(&desc, tag).expect("decode"), name);
        }
    }

    #[test]
    fn test_unknown_tag_fails() {
        let desc = suit();
        match decode_variant(&desc, 42) {
            Err(Error::UnknownDiscriminant { type_name, tag }) => {
                assert_eq!(type_name, "Suit");
                assert_eq!(tag, 42);
            }
            other => panic!("expected UnknownDiscriminant, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_variant_name_fails() {
        let desc = suit();
        assert!(matches!(
            encode_variant(&desc, "Swords"),
            Err(Error::InvalidData(_))
        ));
    }

    #[test]
    fn test_non_contiguous_tags_survive_narrow_underlying() {
        let desc = EnumBuilder::new("Flags")
            .variant_tag("A", 1)
            .variant_tag("B", 128)
            .underlying(PrimitiveKind::U8)
            .build();
        assert_eq!(encode_variant(&desc, "B").expect("encode"), 128);
    }
}
