// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::sync::Arc;
use std::time::{Duration, SystemTime};

use crate::{DefinitionCatalog, Item, ItemDetails, ItemFlags, ResultHandle};

/// The items of a completed operation, partitioned by their lifecycle flags.
///
/// A materialized result is immutable. It is produced at most once per
/// [`InventoryResult`][crate::InventoryResult] and shared with every reader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterializedResult {
    handle: ResultHandle,
    timestamp: u32,
    items: Vec<Item>,
    removed: Vec<Item>,
    consumed: Vec<Item>,
}

impl MaterializedResult {
    /// Partitions raw records into active, removed and consumed items.
    ///
    /// Membership is decided by independent predicates: a record is removed if it carries
    /// [`ItemFlags::REMOVED`], consumed if it carries [`ItemFlags::CONSUMED`], and active
    /// only if it carries neither. A record with both bits lands in both the removed and
    /// the consumed partition. Record order is kept within each partition.
    pub(crate) fn from_records(handle: ResultHandle, timestamp: u32, records: &[ItemDetails], catalog: &Arc<dyn DefinitionCatalog>) -> Self {
        let mut items = Vec::new();
        let mut removed = Vec::new();
        let mut consumed = Vec::new();

        for record in records {
            let is_removed = record.flags.contains(ItemFlags::REMOVED);
            let is_consumed = record.flags.contains(ItemFlags::CONSUMED);

            if is_removed {
                removed.push(Item::from_details(record, catalog));
            }

            if is_consumed {
                consumed.push(Item::from_details(record, catalog));
            }

            if !is_removed && !is_consumed {
                items.push(Item::from_details(record, catalog));
            }
        }

        Self {
            handle,
            timestamp,
            items,
            removed,
            consumed,
        }
    }

    /// Handle of the operation this result was materialized from.
    #[must_use]
    pub const fn handle(&self) -> ResultHandle {
        self.handle
    }

    /// Completion time in seconds since the Unix epoch, as reported by the native subsystem.
    #[must_use]
    pub const fn timestamp(&self) -> u32 {
        self.timestamp
    }

    /// Completion time as a [`SystemTime`].
    #[must_use]
    pub fn completed_at(&self) -> SystemTime {
        SystemTime::UNIX_EPOCH + Duration::from_secs(u64::from(self.timestamp))
    }

    /// Items that are owned after the operation.
    #[must_use]
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Items the operation removed.
    #[must_use]
    pub fn removed(&self) -> &[Item] {
        &self.removed
    }

    /// Items the operation consumed.
    #[must_use]
    pub fn consumed(&self) -> &[Item] {
        &self.consumed
    }
}
