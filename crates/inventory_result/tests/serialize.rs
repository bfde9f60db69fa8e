// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Integration tests for serializing results and reconstructing them.

use inventory_result::testing::{FakeInventory, NativeOp};
use inventory_result::{DefinitionId, Inventory, ItemDetails, ItemFlags, ItemId, ResultState};
use tick::Clock;

fn setup() -> (FakeInventory, Inventory) {
    let fake = FakeInventory::new();
    let inventory = Inventory::builder(fake.clone(), Clock::new_frozen()).build();
    (fake, inventory)
}

fn records() -> Vec<ItemDetails> {
    vec![
        ItemDetails::new(ItemId(1), DefinitionId(10), 3),
        ItemDetails::new(ItemId(2), DefinitionId(11), 1).with_flags(ItemFlags::REMOVED | ItemFlags::NO_TRADE),
        ItemDetails::new(ItemId(3), DefinitionId(12), 5).with_flags(ItemFlags::CONSUMED),
    ]
}

#[test]
fn serialize_uses_size_then_fill() {
    let (fake, inventory) = setup();
    let handle = fake.issue();
    fake.complete(handle, 5, records());
    let result = inventory.track(handle);
    fake.clear_operations();

    let bytes = result.serialize().expect("not disposed").expect("serializable");

    assert!(!bytes.is_empty());
    assert_eq!(
        fake.operations(),
        [
            NativeOp::Serialize { handle, with_buffer: false },
            NativeOp::Serialize { handle, with_buffer: true },
        ]
    );
}

#[test]
fn round_trip_reconstructs_equivalent_result() {
    let (fake, inventory) = setup();
    let handle = fake.issue();
    fake.complete(handle, 1_600_000_000, records());
    let original = inventory.track(handle);

    let bytes = original.serialize().expect("not disposed").expect("serializable");
    let restored = inventory.deserialize(&bytes).expect("buffer accepted");

    assert_ne!(restored.handle(), original.handle());
    assert_eq!(restored.state(), Ok(ResultState::Materialized));

    let original = original.materialized().expect("not disposed").expect("materialized");
    let restored = restored.materialized().expect("not disposed").expect("materialized");
    assert_eq!(restored.timestamp(), original.timestamp());
    assert_eq!(restored.items(), original.items());
    assert_eq!(restored.removed(), original.removed());
    assert_eq!(restored.consumed(), original.consumed());
}

#[test]
fn failed_fill_yields_nothing() {
    let (fake, inventory) = setup();
    let handle = fake.issue();
    fake.complete(handle, 5, records());
    let result = inventory.track(handle);

    fake.fail_serialization(true);

    assert_eq!(result.serialize(), Ok(None));
}

#[test]
fn pending_result_is_not_serializable() {
    let (fake, inventory) = setup();
    let result = inventory.track(fake.issue());

    assert_eq!(result.serialize(), Ok(None));
}

#[test]
fn rejected_buffer_is_not_reconstructed() {
    let (fake, inventory) = setup();

    assert!(inventory.deserialize(b"garbage").is_none());
    assert_eq!(fake.count(NativeOp::Deserialize(7)), 1);
}
