// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Integration tests for blocking and asynchronous waits.

use std::iter::repeat_n;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use futures::executor::block_on;
use inventory_result::testing::FakeInventory;
use inventory_result::{DefinitionId, Inventory, ItemDetails, ItemId, ResultCode, WaitOptions, WaitPolicy};
use tick::{Clock, ClockControl};

fn inventory(fake: &FakeInventory, clock: Clock, options: WaitOptions) -> Inventory {
    Inventory::builder(fake.clone(), clock).options(options).build()
}

fn record(id: u64) -> ItemDetails {
    ItemDetails::new(ItemId(id), DefinitionId(1), 1)
}

#[test]
fn block_returns_once_completed_elsewhere() {
    let fake = FakeInventory::new();
    let inventory = inventory(&fake, Clock::new_frozen(), WaitOptions::default());
    let handle = fake.issue();
    let result = Arc::new(inventory.track(handle));

    let completer = {
        let fake = fake.clone();
        let result = Arc::clone(&result);
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            fake.complete(handle, 1, vec![record(1)]);
            // Observing the completion here wakes the blocked thread.
            result.is_pending()
        })
    };

    assert_eq!(result.block(Duration::from_secs(60)), Ok(true));
    assert_eq!(completer.join().expect("completer should not panic"), Ok(false));
    assert_eq!(result.is_success(), Ok(true));
    assert!(result.materialized().expect("not disposed").is_some());
}

#[test]
fn block_gives_up_at_the_deadline() {
    let fake = FakeInventory::new();
    let clock = ClockControl::new().auto_advance(Duration::from_millis(100)).to_clock();
    let inventory = inventory(&fake, clock, WaitOptions::default());
    let result = inventory.track(fake.issue());

    assert_eq!(result.block(Duration::from_secs(1)), Ok(false));
    assert_eq!(result.is_success(), Ok(false));
    assert_eq!(result.is_pending(), Ok(true));
}

#[test]
fn block_default_uses_configured_max_wait() {
    let fake = FakeInventory::new();
    let clock = ClockControl::new().auto_advance(Duration::from_millis(100)).to_clock();
    let inventory = inventory(&fake, clock, WaitOptions::default().max_wait(Duration::from_millis(300)));
    let result = inventory.track(fake.issue());

    assert_eq!(result.block_default(), Ok(false));
}

#[test]
fn unbounded_policy_ignores_max_wait() {
    let fake = FakeInventory::new();
    let clock = ClockControl::new().auto_advance(Duration::from_secs(1)).to_clock();
    let options = WaitOptions::default().poll_interval(Duration::from_millis(1)).policy(WaitPolicy::Unbounded);
    let inventory = inventory(&fake, clock, options);

    let handle = fake.issue();
    let result = inventory.track(handle);
    fake.queue_statuses(handle, repeat_n(ResultCode::Pending, 20));
    fake.complete(handle, 1, vec![record(1)]);

    assert_eq!(result.block(Duration::ZERO), Ok(true));
}

#[test]
fn block_matches_is_success_after_failure() {
    let fake = FakeInventory::new();
    let inventory = inventory(&fake, Clock::new_frozen(), WaitOptions::default());
    let handle = fake.issue();
    let result = inventory.track(handle);
    fake.queue_statuses(handle, [ResultCode::Pending]);
    fake.fail(handle, ResultCode::Fail);

    let blocked = result.block(Duration::from_secs(1));

    assert_eq!(blocked, Ok(false));
    assert_eq!(result.is_success(), blocked);
}

#[test]
fn wait_completes_without_blocking_the_thread() {
    let fake = FakeInventory::new();
    let clock = ClockControl::new().auto_advance_timers(true).to_clock();
    let inventory = inventory(&fake, clock, WaitOptions::default());
    let handle = fake.issue();
    let result = inventory.track(handle);
    fake.queue_statuses(handle, repeat_n(ResultCode::Pending, 5));
    fake.complete(handle, 9, vec![record(1), record(2)]);

    assert_eq!(block_on(result.wait(Duration::from_secs(5))), Ok(true));
    assert_eq!(result.timestamp(), Ok(Some(9)));
    assert_eq!(inventory.items().len(), 2);
}

#[test]
fn wait_gives_up_at_the_deadline() {
    let fake = FakeInventory::new();
    let clock = ClockControl::new().auto_advance_timers(true).to_clock();
    let inventory = inventory(&fake, clock, WaitOptions::default());
    let result = inventory.track(fake.issue());

    assert_eq!(block_on(result.wait(Duration::from_millis(100))), Ok(false));
    assert_eq!(result.is_pending(), Ok(true));
}

#[test]
fn wait_on_invalid_handle_returns_immediately() {
    let fake = FakeInventory::new();
    let inventory = inventory(&fake, Clock::new_frozen(), WaitOptions::default());
    let result = inventory.track(inventory_result::ResultHandle::INVALID);

    assert_eq!(block_on(result.wait(Duration::from_secs(3600))), Ok(false));
    assert_eq!(result.block(Duration::from_secs(3600)), Ok(false));
}
