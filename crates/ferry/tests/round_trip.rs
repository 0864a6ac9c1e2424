// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Cross-side round-trip coverage: every value marshaled by one side must
//! unmarshal on the other side to an equal value.

use ferry::{
    BoundaryContext, EnumBuilder, Error, FieldDescriptor, PrimitiveKind, StructBuilder,
    TypeDescriptor, UnionBuilder, Value,
};
use std::sync::Arc;

fn boundary() -> (BoundaryContext, BoundaryContext) {
    let native = BoundaryContext::native();
    let managed = native.peer();
    (native, managed)
}

fn string_field(name: &str) -> FieldDescriptor {
    FieldDescriptor::new(
        name,
        Arc::new(TypeDescriptor::primitive(
            "",
            PrimitiveKind::String { max_length: None },
        )),
    )
}

fn i32_field(name: &str) -> FieldDescriptor {
    FieldDescriptor::new(
        name,
        Arc::new(TypeDescriptor::primitive("", PrimitiveKind::I32)),
    )
}

#[test]
fn enum_round_trip_is_identity_for_every_variant() {
    let (native, managed) = boundary();
    let suit = native
        .register_type(
            EnumBuilder::new("Suit")
                .variant_tag("Coins", 2)
                .variant_tag("Bamboo", 40)
                .variant_tag("Characters", 41)
                .build(),
        )
        .expect("register");

    for (tag, name) in [(2, "Coins"), (40, "Bamboo"), (41, "Characters")] {
        let value = Value::Enum(tag, name.into());
        let wire = native.marshal(&suit, &value).expect("marshal");
        let back = managed.unmarshal(&suit, &wire).expect("unmarshal");
        assert_eq!(back, value);
    }
}

#[test]
fn out_of_range_discriminant_never_defaults() {
    let (native, managed) = boundary();
    native
        .register_type(
            EnumBuilder::new("Suit")
                .variant_tag("Coins", 2)
                .variant_tag("Bamboo", 40)
                .build(),
        )
        .expect("register");
    let suit = native.types().lookup("Suit").expect("lookup");

    // A tag the mapping never contained.
    let wire = 7u32.to_le_bytes().to_vec();
    match managed.unmarshal(&suit, &wire) {
        Err(Error::UnknownDiscriminant { tag, .. }) => assert_eq!(tag, 7),
        other => panic!("expected UnknownDiscriminant, got {:?}", other),
    }
}

#[test]
fn unit_variant_round_trips_without_payload() {
    let (native, managed) = boundary();
    let message = native
        .register_type(UnionBuilder::new("Greeting").unit_case("Hello").build())
        .expect("register");

    let value = Value::Union(0, "Hello".into(), Box::new(Value::Null));
    let wire = native.marshal(&message, &value).expect("marshal");
    let back = managed.unmarshal(&message, &wire).expect("unmarshal");
    assert_eq!(back, value);
}

#[test]
fn string_variant_round_trips_exactly() {
    let (native, managed) = boundary();
    let message = native
        .register_type(
            UnionBuilder::new("Greeting")
                .unit_case("Hello")
                .primitive_case(
                    "Excited",
                    "value",
                    PrimitiveKind::String { max_length: None },
                )
                .build(),
        )
        .expect("register");

    let value = Value::Union(
        1,
        "Excited".into(),
        Box::new(Value::struct_of([("value", "What a cool enum!".into())])),
    );
    let wire = native.marshal(&message, &value).expect("marshal");
    let back = managed.unmarshal(&message, &wire).expect("unmarshal");
    assert_eq!(back, value);
    assert_eq!(
        back.union_payload()
            .and_then(|p| p.get_field("value"))
            .and_then(Value::as_str),
        Some("What a cool enum!")
    );
}

#[test]
fn multi_field_variant_round_trips_both_fields() {
    let (native, managed) = boundary();
    let message = native
        .register_type(
            UnionBuilder::new("Player")
                .case("Named", 3, vec![string_field("name"), i32_field("score")])
                .build(),
        )
        .expect("register");

    let value = Value::Union(
        3,
        "Named".into(),
        Box::new(Value::struct_of([
            ("name", "Cool Guy McGee".into()),
            ("score", 69i32.into()),
        ])),
    );
    let wire = native.marshal(&message, &value).expect("marshal");
    let back = managed.unmarshal(&message, &wire).expect("unmarshal");
    assert_eq!(back, value);

    let payload = back.union_payload().expect("payload");
    assert_eq!(
        payload.get_field("name").and_then(Value::as_str),
        Some("Cool Guy McGee")
    );
    assert_eq!(payload.get_field("score").and_then(Value::as_i32), Some(69));
}

#[test]
fn union_values_originate_on_either_side() {
    let (native, managed) = boundary();
    let message = native
        .register_type(
            UnionBuilder::new("Player")
                .case("Named", 3, vec![string_field("name"), i32_field("score")])
                .build(),
        )
        .expect("register");

    let value = Value::Union(
        3,
        "Named".into(),
        Box::new(Value::struct_of([
            ("name", "returning".into()),
            ("score", (-12i32).into()),
        ])),
    );

    // Managed -> native, the reverse of the usual direction.
    let wire = managed.marshal(&message, &value).expect("marshal");
    let back = native.unmarshal(&message, &wire).expect("unmarshal");
    assert_eq!(back, value);
}

#[test]
fn struct_collection_round_trips_in_order() {
    let (native, managed) = boundary();
    let pair = native
        .register_type(
            StructBuilder::new("Pair")
                .field("value", PrimitiveKind::I32)
                .build(),
        )
        .expect("register");

    let items = vec![
        Value::struct_of([("value", 33i32.into())]),
        Value::struct_of([("value", 12345i32.into())]),
    ];
    let wire = native.marshal_sequence(&pair, &items).expect("marshal");
    let back = managed.unmarshal_sequence(&pair, &wire).expect("unmarshal");

    assert_eq!(back.len(), 2);
    assert_eq!(back, items);
    assert_eq!(
        back[0].get_field("value").and_then(Value::as_i32),
        Some(33)
    );
    assert_eq!(
        back[1].get_field("value").and_then(Value::as_i32),
        Some(12345)
    );
}

#[test]
fn empty_sequence_round_trips_to_empty_not_absent() {
    let (native, managed) = boundary();
    let element = native
        .register_type(TypeDescriptor::primitive("uint32", PrimitiveKind::U32))
        .expect("register");

    let wire = native.marshal_sequence(&element, &[]).expect("marshal");
    let back = managed.unmarshal_sequence(&element, &wire).expect("unmarshal");
    assert!(back.is_empty());
}

#[test]
fn sequence_preserves_duplicates_and_order() {
    let (native, managed) = boundary();
    let element = native
        .register_type(TypeDescriptor::primitive("uint32", PrimitiveKind::U32))
        .expect("register");

    let items: Vec<Value> = [5u32, 5, 1, 5, 2, 1].iter().map(|&v| v.into()).collect();
    let wire = native.marshal_sequence(&element, &items).expect("marshal");
    let back = managed.unmarshal_sequence(&element, &wire).expect("unmarshal");
    assert_eq!(back, items);
}

#[test]
fn randomized_primitive_sequences_round_trip() {
    let (native, managed) = boundary();
    let element = native
        .register_type(TypeDescriptor::primitive("uint64", PrimitiveKind::U64))
        .expect("register");

    fastrand::seed(0x5EED);
    for _ in 0..200 {
        let len = fastrand::usize(0..64);
        let items: Vec<Value> = (0..len).map(|_| fastrand::u64(..).into()).collect();
        let wire = native.marshal_sequence(&element, &items).expect("marshal");
        let back = managed.unmarshal_sequence(&element, &wire).expect("unmarshal");
        assert_eq!(back, items);
    }
}

#[test]
fn nested_struct_round_trips() {
    let (native, managed) = boundary();
    let point = Arc::new(
        StructBuilder::new("Point")
            .field("x", PrimitiveKind::I32)
            .field("y", PrimitiveKind::I32)
            .build(),
    );
    let segment = native
        .register_type(
            StructBuilder::new("Segment")
                .nested_field("from", point.clone())
                .nested_field("to", point)
                .string_field("label")
                .build(),
        )
        .expect("register");

    let value = Value::struct_of([
        (
            "from",
            Value::struct_of([("x", 1i32.into()), ("y", 2i32.into())]),
        ),
        (
            "to",
            Value::struct_of([("x", (-3i32).into()), ("y", 4i32.into())]),
        ),
        ("label", "diagonal".into()),
    ]);
    let wire = native.marshal(&segment, &value).expect("marshal");
    let back = managed.unmarshal(&segment, &wire).expect("unmarshal");
    assert_eq!(back, value);
}
