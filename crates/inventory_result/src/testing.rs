// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Fake native inventory subsystem for testing.
//!
//! This module provides [`FakeInventory`], an in-memory [`InventoryNative`] whose
//! operations are completed, failed or delayed by the test, and which records every call
//! made into it for later verification.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::{DefinitionId, InventoryNative, ItemDetails, ItemFlags, ItemId, ResultCode, ResultHandle};

/// A call made into a [`FakeInventory`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeOp {
    /// [`InventoryNative::result_status`] was called.
    Status(ResultHandle),
    /// [`InventoryNative::result_timestamp`] was called.
    Timestamp(ResultHandle),
    /// [`InventoryNative::result_items`] was called.
    Items(ResultHandle),
    /// [`InventoryNative::destroy_result`] was called.
    Destroy(ResultHandle),
    /// [`InventoryNative::serialize_result`] was called.
    Serialize {
        /// The handle to serialize.
        handle: ResultHandle,
        /// Whether a destination buffer was passed.
        with_buffer: bool,
    },
    /// [`InventoryNative::deserialize_result`] was called with this many bytes.
    Deserialize(usize),
}

#[derive(Debug)]
struct Operation {
    queued: VecDeque<ResultCode>,
    status: ResultCode,
    timestamp: u32,
    records: Option<Vec<ItemDetails>>,
}

#[derive(Debug, Default)]
struct State {
    next_handle: i32,
    operations: HashMap<ResultHandle, Operation>,
    calls: Vec<NativeOp>,
    fail_serialization: bool,
}

impl State {
    fn insert(&mut self, operation: Operation) -> ResultHandle {
        self.next_handle += 1;
        let handle = ResultHandle::from_raw(self.next_handle);
        self.operations.insert(handle, operation);
        handle
    }
}

/// A scriptable, recording fake of the native inventory subsystem.
///
/// Handles issued by the fake start out pending. Tests decide when and how they complete.
/// Clones share the same state, so a test can keep one clone for scripting while an
/// [`Inventory`][crate::Inventory] owns another.
///
/// # Examples
///
/// ```
/// use inventory_result::testing::FakeInventory;
/// use inventory_result::{DefinitionId, InventoryNative, ItemDetails, ItemId, ResultCode};
///
/// let fake = FakeInventory::new();
/// let handle = fake.issue();
/// assert_eq!(fake.result_status(handle), ResultCode::Pending);
///
/// fake.complete(handle, 1_700_000_000, vec![ItemDetails::new(ItemId(1), DefinitionId(10), 1)]);
/// assert_eq!(fake.result_status(handle), ResultCode::Ok);
/// assert_eq!(fake.result_items(handle).map(|r| r.len()), Some(1));
/// ```
#[derive(Debug, Clone, Default)]
pub struct FakeInventory {
    state: Arc<Mutex<State>>,
}

impl FakeInventory {
    /// Creates a fake with no operations.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a new pending operation.
    #[must_use]
    pub fn issue(&self) -> ResultHandle {
        self.state.lock().insert(Operation {
            queued: VecDeque::new(),
            status: ResultCode::Pending,
            timestamp: 0,
            records: None,
        })
    }

    /// Completes an operation successfully with the given records.
    pub fn complete(&self, handle: ResultHandle, timestamp: u32, records: Vec<ItemDetails>) {
        self.update(handle, |op| {
            op.status = ResultCode::Ok;
            op.timestamp = timestamp;
            op.records = Some(records);
        });
    }

    /// Completes an operation successfully but keeps its records unavailable.
    pub fn complete_without_records(&self, handle: ResultHandle, timestamp: u32) {
        self.update(handle, |op| {
            op.status = ResultCode::Ok;
            op.timestamp = timestamp;
            op.records = None;
        });
    }

    /// Fails an operation with the given code.
    pub fn fail(&self, handle: ResultHandle, code: ResultCode) {
        self.update(handle, |op| op.status = code);
    }

    /// Queues statuses that status queries report, one per query, before the
    /// operation's own status.
    pub fn queue_statuses(&self, handle: ResultHandle, statuses: impl IntoIterator<Item = ResultCode>) {
        self.update(handle, |op| op.queued.extend(statuses));
    }

    /// Makes every serialization attempt that passes a buffer fail.
    pub fn fail_serialization(&self, fail: bool) {
        self.state.lock().fail_serialization = fail;
    }

    /// Returns a copy of all recorded calls.
    #[must_use]
    pub fn operations(&self) -> Vec<NativeOp> {
        self.state.lock().calls.clone()
    }

    /// Clears the recorded calls.
    pub fn clear_operations(&self) {
        self.state.lock().calls.clear();
    }

    /// Number of recorded calls equal to `op`.
    #[must_use]
    pub fn count(&self, op: NativeOp) -> usize {
        self.state.lock().calls.iter().filter(|call| **call == op).count()
    }

    /// Whether `handle` refers to an operation that exists and was not destroyed.
    #[must_use]
    pub fn is_live(&self, handle: ResultHandle) -> bool {
        self.state.lock().operations.contains_key(&handle)
    }

    #[expect(clippy::panic, reason = "scripting an unknown handle is a bug in the test")]
    fn update(&self, handle: ResultHandle, f: impl FnOnce(&mut Operation)) {
        let mut state = self.state.lock();
        let operation = state
            .operations
            .get_mut(&handle)
            .unwrap_or_else(|| panic!("no live fake operation for handle {handle}"));
        f(operation);
    }

    fn record(&self, op: NativeOp) -> parking_lot::MutexGuard<'_, State> {
        let mut state = self.state.lock();
        state.calls.push(op);
        state
    }
}

impl InventoryNative for FakeInventory {
    fn result_status(&self, handle: ResultHandle) -> ResultCode {
        let mut state = self.record(NativeOp::Status(handle));
        match state.operations.get_mut(&handle) {
            Some(op) => op.queued.pop_front().unwrap_or(op.status),
            None => ResultCode::InvalidParam,
        }
    }

    fn result_timestamp(&self, handle: ResultHandle) -> u32 {
        let state = self.record(NativeOp::Timestamp(handle));
        state.operations.get(&handle).map_or(0, |op| op.timestamp)
    }

    fn result_items(&self, handle: ResultHandle) -> Option<Vec<ItemDetails>> {
        let state = self.record(NativeOp::Items(handle));
        state.operations.get(&handle).and_then(|op| op.records.clone())
    }

    fn destroy_result(&self, handle: ResultHandle) {
        let mut state = self.record(NativeOp::Destroy(handle));
        state.operations.remove(&handle);
    }

    fn serialize_result(&self, handle: ResultHandle, buffer: Option<&mut [u8]>, size: &mut u32) -> bool {
        let state = self.record(NativeOp::Serialize {
            handle,
            with_buffer: buffer.is_some(),
        });

        let encoded = state
            .operations
            .get(&handle)
            .filter(|op| op.status == ResultCode::Ok)
            .and_then(|op| op.records.as_ref().map(|records| encode(op.timestamp, records)));

        let Some(encoded) = encoded else {
            *size = 0;
            return false;
        };

        let Some(buffer) = buffer else {
            *size = u32::try_from(encoded.len()).unwrap_or(u32::MAX);
            return true;
        };

        if state.fail_serialization || buffer.len() < encoded.len() {
            return false;
        }

        buffer[..encoded.len()].copy_from_slice(&encoded);
        *size = u32::try_from(encoded.len()).unwrap_or(u32::MAX);
        true
    }

    fn deserialize_result(&self, data: &[u8]) -> Option<ResultHandle> {
        let mut state = self.record(NativeOp::Deserialize(data.len()));
        let (timestamp, records) = decode(data)?;

        Some(state.insert(Operation {
            queued: VecDeque::new(),
            status: ResultCode::Ok,
            timestamp,
            records: Some(records),
        }))
    }
}

const MAGIC: &[u8; 4] = b"FINV";
const RECORD_LEN: usize = 16;

fn encode(timestamp: u32, records: &[ItemDetails]) -> Vec<u8> {
    let mut out = Vec::with_capacity(MAGIC.len() + 8 + records.len() * RECORD_LEN);
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&timestamp.to_le_bytes());
    out.extend_from_slice(&u32::try_from(records.len()).unwrap_or(u32::MAX).to_le_bytes());

    for record in records {
        out.extend_from_slice(&record.item_id.0.to_le_bytes());
        out.extend_from_slice(&record.definition.0.to_le_bytes());
        out.extend_from_slice(&record.quantity.to_le_bytes());
        out.extend_from_slice(&record.flags.bits().to_le_bytes());
    }

    out
}

fn decode(data: &[u8]) -> Option<(u32, Vec<ItemDetails>)> {
    let rest = data.strip_prefix(MAGIC)?;
    let (timestamp, rest) = rest.split_first_chunk::<4>()?;
    let (count, mut rest) = rest.split_first_chunk::<4>()?;

    let count = usize::try_from(u32::from_le_bytes(*count)).ok()?;
    let mut records = Vec::with_capacity(count.min(rest.len() / RECORD_LEN));

    for _ in 0..count {
        let (id, tail) = rest.split_first_chunk::<8>()?;
        let (definition, tail) = tail.split_first_chunk::<4>()?;
        let (quantity, tail) = tail.split_first_chunk::<2>()?;
        let (flags, tail) = tail.split_first_chunk::<2>()?;
        rest = tail;

        records.push(
            ItemDetails::new(
                ItemId(u64::from_le_bytes(*id)),
                DefinitionId(i32::from_le_bytes(*definition)),
                u16::from_le_bytes(*quantity),
            )
            .with_flags(ItemFlags::from_bits(u16::from_le_bytes(*flags))),
        );
    }

    rest.is_empty().then_some((u32::from_le_bytes(*timestamp), records))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queued_statuses_come_first() {
        let fake = FakeInventory::new();
        let handle = fake.issue();
        fake.queue_statuses(handle, [ResultCode::Busy, ResultCode::Pending]);
        fake.complete(handle, 1, Vec::new());

        assert_eq!(fake.result_status(handle), ResultCode::Busy);
        assert_eq!(fake.result_status(handle), ResultCode::Pending);
        assert_eq!(fake.result_status(handle), ResultCode::Ok);
        assert_eq!(fake.count(NativeOp::Status(handle)), 3);
    }

    #[test]
    fn unknown_handles_are_invalid() {
        let fake = FakeInventory::new();

        assert_eq!(fake.result_status(ResultHandle::from_raw(77)), ResultCode::InvalidParam);
        assert_eq!(fake.result_items(ResultHandle::from_raw(77)), None);
    }

    #[test]
    fn destroy_forgets_operation() {
        let fake = FakeInventory::new();
        let handle = fake.issue();

        fake.destroy_result(handle);

        assert!(!fake.is_live(handle));
        assert_eq!(fake.result_status(handle), ResultCode::InvalidParam);
    }

    #[test]
    fn encoding_round_trips() {
        let records = vec![
            ItemDetails::new(ItemId(u64::MAX), DefinitionId(-5), 9).with_flags(ItemFlags::NO_TRADE),
            ItemDetails::new(ItemId(2), DefinitionId(7), 1),
        ];

        assert_eq!(decode(&encode(42, &records)), Some((42, records)));
    }

    #[test]
    fn decode_rejects_malformed_input() {
        let encoded = encode(1, &[ItemDetails::new(ItemId(1), DefinitionId(1), 1)]);

        assert_eq!(decode(&encoded[..encoded.len() - 1]), None);
        assert_eq!(decode(b"nope"), None);
        assert_eq!(decode(&[encoded.as_slice(), &[0]].concat()), None);
    }

    #[test]
    fn serialize_requires_completed_operation() {
        let fake = FakeInventory::new();
        let handle = fake.issue();
        let mut size = 0;

        assert!(!fake.serialize_result(handle, None, &mut size));
        assert_eq!(size, 0);
    }
}
