// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Typed, pollable results of asynchronous operations issued against a native inventory
//! subsystem.
//!
//! The native subsystem identifies every operation (granting items, consuming them,
//! loading the full inventory, ...) by an opaque [`ResultHandle`] and only offers a polling
//! status query to find out when it has finished. This crate wraps such handles in an
//! [`InventoryResult`] that:
//!
//! - polls the status and classifies it as pending, successful or failed,
//! - on the first observed success, fetches the produced item records once and partitions
//!   them into active, removed and consumed [`Item`]s,
//! - blocks a thread or suspends a task until the outcome is known, with a deadline,
//! - serializes its result into an opaque buffer the native subsystem can reconstruct,
//! - destroys the native handle on disposal or drop.
//!
//! # Overview
//!
//! - [`Inventory`] - Owning context. Binds results to the native subsystem, a definition
//!   catalog and a clock, and merges every materialized result into a snapshot of owned items.
//! - [`InventoryResult`] - One operation. Its lifecycle is described by [`ResultState`].
//! - [`MaterializedResult`] - The partitioned items and completion timestamp of a result.
//! - [`InventoryNative`] - The capabilities required from the native subsystem.
//! - [`DefinitionCatalog`] - Lookup of static item metadata.
//! - [`WaitOptions`] - Poll interval, default deadline and [`WaitPolicy`].
//!
//! # Example
//!
//! ```
//! # #[cfg(feature = "test-util")]
//! # fn main() -> inventory_result::Result<()> {
//! use std::time::Duration;
//!
//! use inventory_result::testing::FakeInventory;
//! use inventory_result::{DefinitionId, Inventory, ItemDetails, ItemFlags, ItemId};
//! use tick::Clock;
//!
//! let native = FakeInventory::new();
//! let inventory = Inventory::builder(native.clone(), Clock::new_frozen()).build();
//!
//! let handle = native.issue();
//! let result = inventory.track(handle);
//! assert!(result.is_pending()?);
//!
//! native.complete(
//!     handle,
//!     1_700_000_000,
//!     vec![
//!         ItemDetails::new(ItemId(1), DefinitionId(10), 3),
//!         ItemDetails::new(ItemId(2), DefinitionId(11), 1).with_flags(ItemFlags::CONSUMED),
//!     ],
//! );
//!
//! assert!(result.block(Duration::from_secs(1))?);
//!
//! let materialized = result.materialized()?.expect("result is materialized");
//! assert_eq!(materialized.items().len(), 1);
//! assert_eq!(materialized.consumed().len(), 1);
//!
//! result.dispose()?;
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "test-util"))]
//! # fn main() {}
//! ```
//!
//! # Features
//!
//! - **`test-util`** - Enables the [`testing`] module with [`testing::FakeInventory`], a
//!   scriptable fake of the native subsystem. **Only enable this in `dev-dependencies`.**

mod catalog;
mod error;
mod handle;
mod inventory;
mod item;
mod materialized;
mod native;
mod options;
mod result;
mod result_code;
mod signal;

#[cfg(any(feature = "test-util", test))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-util")))]
pub mod testing;

pub use catalog::{Definition, DefinitionCatalog, StaticCatalog};
pub use error::{Error, Result};
pub use handle::ResultHandle;
pub use inventory::{Inventory, InventoryBuilder};
pub use item::{DefinitionId, Item, ItemDetails, ItemFlags, ItemId};
pub use materialized::MaterializedResult;
pub use native::InventoryNative;
pub use options::{WaitOptions, WaitPolicy};
pub use result::{InventoryResult, ResultState};
pub use result_code::{ResultCode, StatusClass};
