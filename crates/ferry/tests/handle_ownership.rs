// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Handle lifecycle across the boundary: single ownership, exactly one
//! release, and element-wise transfer for handle collections.

use ferry::{BoundaryContext, Error, TypeDescriptor, Value};
use std::sync::Arc;

fn boundary() -> (BoundaryContext, BoundaryContext) {
    let native = BoundaryContext::native();
    let managed = native.peer();
    (native, managed)
}

fn deck(native: &BoundaryContext, label: &str) -> ferry::HandleId {
    native.acquire(Arc::new(label.to_string()))
}

#[test]
fn double_release_fails_without_crashing() {
    let (native, _) = boundary();
    let id = deck(&native, "deck");

    native.release(id).expect("first release");
    match native.release(id) {
        Err(Error::UseAfterRelease(stale)) => assert_eq!(stale, id),
        other => panic!("expected UseAfterRelease, got {:?}", other),
    }
}

#[test]
fn resolve_after_release_fails() {
    let (native, _) = boundary();
    let id = deck(&native, "deck");
    native.release(id).expect("release");

    assert!(matches!(
        native.resolve(id),
        Err(Error::UseAfterRelease(_))
    ));
}

#[test]
fn transferred_handle_releases_on_receiving_side_only() {
    let (native, managed) = boundary();
    let desc = native
        .register_type(TypeDescriptor::handle("Deck"))
        .expect("register");

    let id = deck(&native, "deck");
    let wire = native.marshal(&desc, &Value::Handle(id)).expect("marshal");
    let back = managed.unmarshal(&desc, &wire).expect("unmarshal");
    assert_eq!(back.as_handle(), Some(id));

    // The prior owner must not independently release after transfer.
    assert!(matches!(
        native.release(id),
        Err(Error::OwnershipViolation { .. })
    ));
    managed.release(id).expect("receiver releases");
}

#[test]
fn handle_collection_round_trips_end_to_end() {
    let (native, managed) = boundary();
    let desc = native
        .register_type(TypeDescriptor::handle("Deck"))
        .expect("register");

    let ids: Vec<_> = (0..5).map(|i| deck(&native, &format!("deck-{}", i))).collect();
    let items: Vec<Value> = ids.iter().map(|&id| Value::Handle(id)).collect();

    let wire = native.marshal_sequence(&desc, &items).expect("marshal");
    let back = managed.unmarshal_sequence(&desc, &wire).expect("unmarshal");

    assert_eq!(back, items);
    for &id in &ids {
        // Every element now belongs to the managed side, and the resource
        // is still reachable through it.
        let resource = managed.resolve(id).expect("resolve");
        assert!(resource.downcast_ref::<String>().is_some());
        managed.release(id).expect("release");
    }
    assert_eq!(native.handles().live_count(), 0);
}

#[test]
fn failed_handle_collection_rolls_back_transfers() {
    let (native, managed) = boundary();
    native
        .register_type(TypeDescriptor::handle("Deck"))
        .expect("register");
    let desc = native.types().lookup("Deck").expect("lookup");

    let good = deck(&native, "good");
    let stale = deck(&native, "stale");
    native.release(stale).expect("release stale");

    // Forge a two-element wire collection whose second id is stale: length
    // header, padding to 8, then two raw ids.
    let mut wire = Vec::new();
    wire.extend_from_slice(&2u32.to_le_bytes());
    wire.extend_from_slice(&[0u8; 4]);
    wire.extend_from_slice(&good.raw().to_le_bytes());
    wire.extend_from_slice(&stale.raw().to_le_bytes());

    match managed.unmarshal_sequence(&desc, &wire) {
        Err(Error::UseAfterRelease(id)) => assert_eq!(id, stale),
        other => panic!("expected UseAfterRelease, got {:?}", other),
    }

    // The first element's transfer was rolled back: native still owns it
    // and can release it exactly once.
    native.release(good).expect("native still owns the good handle");
}

#[test]
fn stale_id_does_not_alias_reused_slot() {
    let (native, managed) = boundary();
    let desc = native
        .register_type(TypeDescriptor::handle("Deck"))
        .expect("register");

    let first = deck(&native, "first");
    native.release(first).expect("release");

    // The slot is reused for a new resource under a fresh generation.
    let second = deck(&native, "second");
    assert_ne!(first.raw(), second.raw());

    // Marshaling the stale id fails instead of shipping the new resource.
    assert!(matches!(
        native.marshal(&desc, &Value::Handle(first)),
        Err(Error::UseAfterRelease(_))
    ));

    let wire = native
        .marshal(&desc, &Value::Handle(second))
        .expect("marshal");
    managed.unmarshal(&desc, &wire).expect("unmarshal");
    managed.release(second).expect("release");
}

#[test]
fn mixed_struct_with_handle_field_transfers_atomically() {
    let (native, managed) = boundary();
    let deck_type = Arc::new(TypeDescriptor::handle("Deck"));
    let table = native
        .register_type(
            ferry::StructBuilder::new("Table")
                .string_field("label")
                .field_with_type("deck", deck_type)
                .build(),
        )
        .expect("register");

    let id = deck(&native, "deck");
    let value = Value::struct_of([
        ("label", "east table".into()),
        ("deck", Value::Handle(id)),
    ]);

    let wire = native.marshal(&table, &value).expect("marshal");

    // Truncate inside the handle field: the string decodes, the handle
    // does not, and no ownership change may stick.
    let result = managed.unmarshal(&table, &wire[..wire.len() - 4]);
    assert!(result.is_err());
    native.release(id).expect("native still owns after failed decode");
}
