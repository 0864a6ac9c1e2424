// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Tagged-union codec.
//!
//! A union value crosses as its discriminant followed by the payload fields
//! of exactly one case, in declared order. Unit cases emit nothing past the
//! tag and decode without reading payload bytes — not by reading zeroed
//! fields. The payload must match the declared shape for the tag exactly;
//! drift is a contract violation surfaced as `PayloadShapeMismatch`.

use crate::codec::{WireDecoder, WireEncoder};
use crate::descriptor::{TypeDescriptor, UnionCase, UnionDescriptor};
use crate::error::Error;
use crate::value::Value;
use std::collections::HashMap;

fn shape_mismatch(type_name: &str, detail: impl Into<String>) -> Error {
    Error::PayloadShapeMismatch {
        type_name: type_name.into(),
        detail: detail.into(),
    }
}

pub(crate) fn encode_union(
    encoder: &mut WireEncoder<'_>,
    desc: &TypeDescriptor,
    u: &UnionDescriptor,
    value: &Value,
) -> Result<(), Error> {
    let Value::Union(tag, name, payload) = value else {
        return Err(Error::TypeMismatch {
            expected: "union".into(),
            found: format!("{:?}", value),
        });
    };
    let case = u.case_by_tag(*tag).ok_or(Error::UnknownDiscriminant {
        type_name: desc.name.clone(),
        tag: *tag,
    })?;
    if !name.is_empty() && case.name != *name {
        return Err(Error::InvalidData(format!(
            "union '{}' tag {} belongs to case '{}', value claims '{}'",
            desc.name, tag, case.name, name
        )));
    }

    encoder.encode_tag(*tag, u.discriminant)?;
    encode_payload(encoder, desc, case, payload)
}

fn encode_payload(
    encoder: &mut WireEncoder<'_>,
    desc: &TypeDescriptor,
    case: &UnionCase,
    payload: &Value,
) -> Result<(), Error> {
    if case.is_unit() {
        return match payload {
            Value::Null => Ok(()),
            other => Err(shape_mismatch(
                &desc.name,
                format!(
                    "case '{}' declares no payload but value carries {:?}",
                    case.name, other
                ),
            )),
        };
    }

    let Value::Struct(fields) = payload else {
        return Err(shape_mismatch(
            &desc.name,
            format!(
                "case '{}' declares {} field(s) but payload is {:?}",
                case.name,
                case.fields.len(),
                payload
            ),
        ));
    };
    if fields.len() != case.fields.len() {
        return Err(shape_mismatch(
            &desc.name,
            format!(
                "case '{}' declares {} field(s), payload carries {}",
                case.name,
                case.fields.len(),
                fields.len()
            ),
        ));
    }
    for field in &case.fields {
        let field_value = fields.get(&field.name).ok_or_else(|| {
            shape_mismatch(
                &desc.name,
                format!("case '{}' payload missing field '{}'", case.name, field.name),
            )
        })?;
        encoder.encode_value(&field.type_desc, field_value)?;
    }
    Ok(())
}

pub(crate) fn decode_union(
    decoder: &mut WireDecoder<'_, '_>,
    desc: &TypeDescriptor,
    u: &UnionDescriptor,
) -> Result<Value, Error> {
    let tag = decoder.decode_tag(u.discriminant)?;
    let case = u.case_by_tag(tag).ok_or(Error::UnknownDiscriminant {
        type_name: desc.name.clone(),
        tag,
    })?;

    // Unit cases are complete at the tag; no payload bytes are consumed.
    if case.is_unit() {
        return Ok(Value::Union(tag, case.name.clone(), Box::new(Value::Null)));
    }

    let payload = decoder.payload_scope(&desc.name, |d| {
        let mut fields = HashMap::new();
        for field in &case.fields {
            let value = d.decode_value(&field.type_desc)?;
            fields.insert(field.name.clone(), value);
        }
        Ok(Value::Struct(fields))
    })?;
    Ok(Value::Union(tag, case.name.clone(), Box::new(payload)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{decode, encode};
    use crate::descriptor::{PrimitiveKind, UnionBuilder};
    use crate::handle::{HandleRegistry, Side};
    use std::sync::Arc;

    fn message() -> TypeDescriptor {
        UnionBuilder::new("Message")
            .unit_case("Ping")
            .primitive_case("Text", "value", PrimitiveKind::String { max_length: None })
            .case(
                "Scored",
                7,
                vec![
                    crate::descriptor::FieldDescriptor::new(
                        "name",
                        Arc::new(TypeDescriptor::primitive(
                            "",
                            PrimitiveKind::String { max_length: None },
                        )),
                    ),
                    crate::descriptor::FieldDescriptor::new(
                        "score",
                        Arc::new(TypeDescriptor::primitive("", PrimitiveKind::I32)),
                    ),
                ],
            )
            .build()
    }

    #[test]
    fn test_unit_case_round_trip() {
        let desc = message();
        let handles = HandleRegistry::new();
        let value = Value::Union(0, "Ping".into(), Box::new(Value::Null));

        let bytes = encode(&desc, &value, &handles).expect("encode");
        // Nothing past the 4-byte tag.
        assert_eq!(bytes.len(), 4);
        let decoded = decode(&desc, &bytes, &handles, Side::Managed).expect("decode");
        assert_eq!(decoded, value);
    }

    #[test]
    fn test_single_field_case_round_trip() {
        let desc = message();
        let handles = HandleRegistry::new();
        let value = Value::Union(
            1,
            "Text".into(),
            Box::new(Value::struct_of([("value", "What a cool enum!".into())])),
        );

        let bytes = encode(&desc, &value, &handles).expect("encode");
        let decoded = decode(&desc, &bytes, &handles, Side::Managed).expect("decode");
        assert_eq!(decoded, value);
        assert_eq!(
            decoded
                .union_payload()
                .and_then(|p| p.get_field("value"))
                .and_then(Value::as_str),
            Some("What a cool enum!")
        );
    }

    #[test]
    fn test_multi_field_case_round_trip() {
        let desc = message();
        let handles = HandleRegistry::new();
        let value = Value::Union(
            7,
            "Scored".into(),
            Box::new(Value::struct_of([
                ("name", "Cool Guy McGee".into()),
                ("score", 69i32.into()),
            ])),
        );

        let bytes = encode(&desc, &value, &handles).expect("encode");
        let decoded = decode(&desc, &bytes, &handles, Side::Managed).expect("decode");
        assert_eq!(decoded, value);
    }

    #[test]
    fn test_unknown_tag_fails_decode() {
        let desc = message();
        let handles = HandleRegistry::new();
        let bytes = 99u32.to_le_bytes().to_vec();

        match decode(&desc, &bytes, &handles, Side::Managed) {
            Err(Error::UnknownDiscriminant { tag, .. }) => assert_eq!(tag, 99),
            other => panic!("expected UnknownDiscriminant, got {:?}", other),
        }
    }

    #[test]
    fn test_unit_payload_on_field_case_fails_encode() {
        let desc = message();
        let handles = HandleRegistry::new();
        let value = Value::Union(1, "Text".into(), Box::new(Value::Null));

        assert!(matches!(
            encode(&desc, &value, &handles),
            Err(Error::PayloadShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_extra_payload_field_fails_encode() {
        let desc = message();
        let handles = HandleRegistry::new();
        let value = Value::Union(
            1,
            "Text".into(),
            Box::new(Value::struct_of([
                ("value", "hi".into()),
                ("extra", 1u32.into()),
            ])),
        );

        assert!(matches!(
            encode(&desc, &value, &handles),
            Err(Error::PayloadShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_truncated_payload_fails_decode() {
        let desc = message();
        let handles = HandleRegistry::new();
        let value = Value::Union(
            7,
            "Scored".into(),
            Box::new(Value::struct_of([
                ("name", "Cool Guy McGee".into()),
                ("score", 69i32.into()),
            ])),
        );
        let bytes = encode(&desc, &value, &handles).expect("encode");

        // Cut into the payload, past the tag.
        let result = decode(&desc, &bytes[..8], &handles, Side::Managed);
        assert!(matches!(result, Err(Error::PayloadShapeMismatch { .. })));
    }
}
