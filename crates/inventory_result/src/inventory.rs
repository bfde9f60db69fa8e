// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::collections::{HashMap, HashSet};
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tick::Clock;
use tracing::{Level, event};

use crate::{
    Definition, DefinitionCatalog, DefinitionId, InventoryNative, InventoryResult, Item, ItemId, MaterializedResult, ResultHandle,
    StaticCatalog, WaitOptions,
};

type Listener = Arc<dyn Fn(&MaterializedResult) + Send + Sync>;

/// Owning context of inventory results.
///
/// The inventory binds results to the native subsystem and the definition catalog, and
/// aggregates every materialized result into a running snapshot of owned items. Cloning
/// an `Inventory` is cheap; clones share the same snapshot.
///
/// # Examples
///
/// ```no_run
/// use std::time::Duration;
///
/// use inventory_result::{Inventory, InventoryNative, ResultHandle};
/// use tick::Clock;
///
/// # fn example(native: impl InventoryNative + 'static, clock: Clock, handle: ResultHandle) -> inventory_result::Result<()> {
/// let inventory = Inventory::builder(native, clock).build();
///
/// let result = inventory.track(handle);
/// if result.block(Duration::from_secs(5))? {
///     for item in inventory.items() {
///         println!("{} x{}", item.id(), item.quantity());
///     }
/// }
///
/// result.dispose()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Inventory {
    shared: Arc<Shared>,
}

pub(crate) struct Shared {
    pub(crate) native: Arc<dyn InventoryNative>,
    pub(crate) clock: Clock,
    pub(crate) options: WaitOptions,
    catalog: Arc<dyn DefinitionCatalog>,
    snapshot: Mutex<Snapshot>,
    listeners: RwLock<Vec<Listener>>,
}

impl Debug for Shared {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Shared")
            .field("native", &self.native)
            .field("clock", &self.clock)
            .field("options", &self.options)
            .field("catalog", &self.catalog)
            .field("snapshot", &self.snapshot)
            .field("listeners", &self.listeners.read().len())
            .finish()
    }
}

impl Shared {
    pub(crate) fn catalog(&self) -> &Arc<dyn DefinitionCatalog> {
        &self.catalog
    }

    pub(crate) fn apply_result(&self, result: &MaterializedResult) {
        self.snapshot.lock().apply(result);

        event!(
            Level::DEBUG,
            message = "applied inventory result",
            handle = result.handle().as_raw(),
            items = result.items().len(),
            removed = result.removed().len(),
            consumed = result.consumed().len(),
        );

        // Listeners run outside the snapshot lock so they may read the inventory.
        let listeners = self.listeners.read().clone();
        for listener in listeners {
            listener(result);
        }
    }
}

#[derive(Debug, Default)]
struct Snapshot {
    items: Vec<Item>,
    // Position of every owned item in `items`.
    positions: HashMap<ItemId, usize>,
    // Timestamp of the newest result that touched an id, including results that removed it.
    touched: HashMap<ItemId, u32>,
    last_update: Option<u32>,
}

impl Snapshot {
    /// Records that a result with `timestamp` touches `id`. Returns `false` if a newer
    /// result already did, in which case the older one must not change the item.
    fn claim(&mut self, id: ItemId, timestamp: u32) -> bool {
        match self.touched.get(&id) {
            Some(&newest) if newest > timestamp => false,
            _ => {
                self.touched.insert(id, timestamp);
                true
            }
        }
    }

    fn apply(&mut self, result: &MaterializedResult) {
        let timestamp = result.timestamp();

        for item in result.items() {
            if !self.claim(item.id(), timestamp) {
                continue;
            }

            match self.positions.get(&item.id()) {
                Some(&position) => self.items[position] = item.clone(),
                None => {
                    self.positions.insert(item.id(), self.items.len());
                    self.items.push(item.clone());
                }
            }
        }

        let gone: HashSet<_> = result
            .removed()
            .iter()
            .chain(result.consumed())
            .map(Item::id)
            .filter(|id| self.claim(*id, timestamp))
            .collect();

        if gone.iter().any(|id| self.positions.contains_key(id)) {
            self.items.retain(|item| !gone.contains(&item.id()));
            self.positions = self.items.iter().enumerate().map(|(position, item)| (item.id(), position)).collect();
        }

        self.last_update = self.last_update.max(Some(timestamp));
    }
}

impl Inventory {
    /// Starts building an inventory bound to `native`, using `clock` to time waits.
    #[must_use]
    pub fn builder(native: impl InventoryNative + 'static, clock: Clock) -> InventoryBuilder {
        InventoryBuilder {
            native: Arc::new(native),
            clock,
            catalog: None,
            options: WaitOptions::default(),
        }
    }

    /// Wraps a handle returned by the native subsystem in an [`InventoryResult`].
    ///
    /// The result is polled once right away, so an operation that already completed is
    /// materialized (and applied to this inventory) before `track` returns.
    #[must_use]
    pub fn track(&self, handle: ResultHandle) -> InventoryResult {
        let result = InventoryResult::new(Arc::clone(&self.shared), handle);

        if let Ok(state) = result.advance() {
            event!(Level::TRACE, message = "tracking inventory result", handle = handle.as_raw(), state = ?state);
        }

        result
    }

    /// Reconstructs a result from bytes produced by [`InventoryResult::serialize`].
    ///
    /// Returns `None` if the native subsystem rejects the buffer.
    #[must_use]
    pub fn deserialize(&self, data: &[u8]) -> Option<InventoryResult> {
        let Some(handle) = self.shared.native.deserialize_result(data) else {
            event!(Level::DEBUG, message = "serialized inventory result rejected", len = data.len());
            return None;
        };

        Some(self.track(handle))
    }

    /// Merges a materialized result into the snapshot and notifies listeners.
    ///
    /// Items of the result replace snapshot items with the same id or are appended;
    /// items the result removed or consumed leave the snapshot. An item is only changed
    /// by a result at least as recent as every result that touched it before, so results
    /// applied out of order neither revert quantities nor bring back removed items.
    /// Results call this themselves once, when they materialize.
    pub fn apply_result(&self, result: &MaterializedResult) {
        self.shared.apply_result(result);
    }

    /// Registers a callback invoked with every result applied to this inventory.
    pub fn on_update(&self, listener: impl Fn(&MaterializedResult) + Send + Sync + 'static) {
        self.shared.listeners.write().push(Arc::new(listener));
    }

    /// Items currently owned, according to the results applied so far.
    #[must_use]
    pub fn items(&self) -> Vec<Item> {
        self.shared.snapshot.lock().items.clone()
    }

    /// Newest completion timestamp among the results applied so far.
    #[must_use]
    pub fn last_update(&self) -> Option<u32> {
        self.shared.snapshot.lock().last_update
    }

    /// Looks up a definition in the catalog.
    #[must_use]
    pub fn find_definition(&self, id: DefinitionId) -> Option<Arc<Definition>> {
        self.shared.catalog.find_definition(id)
    }

    /// Wait tuning applied to results of this inventory.
    #[must_use]
    pub fn options(&self) -> &WaitOptions {
        &self.shared.options
    }

    /// Clock used to time waits.
    #[must_use]
    pub fn clock(&self) -> &Clock {
        &self.shared.clock
    }
}

/// Builder for [`Inventory`].
#[derive(Debug)]
pub struct InventoryBuilder {
    native: Arc<dyn InventoryNative>,
    clock: Clock,
    catalog: Option<Arc<dyn DefinitionCatalog>>,
    options: WaitOptions,
}

impl InventoryBuilder {
    /// Sets the catalog used to resolve item definitions. Defaults to an empty catalog.
    #[must_use]
    pub fn catalog(mut self, catalog: impl DefinitionCatalog + 'static) -> Self {
        self.catalog = Some(Arc::new(catalog));
        self
    }

    /// Sets the wait tuning of results created by the inventory.
    #[must_use]
    pub const fn options(mut self, options: WaitOptions) -> Self {
        self.options = options;
        self
    }

    /// Builds the inventory.
    #[must_use]
    pub fn build(self) -> Inventory {
        let catalog = self.catalog.unwrap_or_else(|| Arc::new(StaticCatalog::default()));

        Inventory {
            shared: Arc::new(Shared {
                native: self.native,
                clock: self.clock,
                options: self.options,
                catalog,
                snapshot: Mutex::default(),
                listeners: RwLock::default(),
            }),
        }
    }
}
