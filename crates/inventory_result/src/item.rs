// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::fmt::{Display, Formatter};
use std::ops::{BitOr, BitOrAssign};
use std::sync::{Arc, Weak};

use crate::catalog::{Definition, DefinitionCatalog};

/// Unique identifier of an item instance, in the native subsystem's namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ItemId(pub u64);

impl Display for ItemId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of an item type in the definition catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DefinitionId(pub i32);

impl Display for DefinitionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle flags attached to a raw item record.
///
/// Bits without a named constant are carried along untouched.
///
/// # Examples
///
/// ```
/// use inventory_result::ItemFlags;
///
/// let flags = ItemFlags::REMOVED | ItemFlags::NO_TRADE;
/// assert!(flags.contains(ItemFlags::REMOVED));
/// assert!(!flags.contains(ItemFlags::CONSUMED));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ItemFlags(u16);

impl ItemFlags {
    /// No flags set: the record describes an item that is still owned.
    pub const NONE: Self = Self(0);
    /// The item cannot be traded.
    pub const NO_TRADE: Self = Self(1 << 0);
    /// The item was removed by the operation.
    pub const REMOVED: Self = Self(1 << 8);
    /// The item was consumed by the operation.
    pub const CONSUMED: Self = Self(1 << 9);

    /// Wraps raw flag bits.
    #[must_use]
    pub const fn from_bits(bits: u16) -> Self {
        Self(bits)
    }

    /// Returns the raw flag bits.
    #[must_use]
    pub const fn bits(self) -> u16 {
        self.0
    }

    /// Returns `true` if every bit of `other` is set in `self`.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for ItemFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for ItemFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// A raw item record as returned by the native subsystem for a completed operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ItemDetails {
    /// Instance identifier.
    pub item_id: ItemId,
    /// Catalog identifier of the item type.
    pub definition: DefinitionId,
    /// Stack size.
    pub quantity: u16,
    /// Lifecycle flags.
    pub flags: ItemFlags,
}

impl ItemDetails {
    /// Creates a record with no flags set.
    #[must_use]
    pub const fn new(item_id: ItemId, definition: DefinitionId, quantity: u16) -> Self {
        Self {
            item_id,
            definition,
            quantity,
            flags: ItemFlags::NONE,
        }
    }

    /// Returns the record with the given flags.
    #[must_use]
    pub const fn with_flags(mut self, flags: ItemFlags) -> Self {
        self.flags = flags;
        self
    }
}

/// An item materialized from a raw record of a completed operation.
///
/// The item keeps a non-owning reference to the catalog of its inventory and resolves
/// its [`Definition`] by id on each call to [`Item::definition`]. Catalogs that build
/// definitions on demand therefore work as well as ones that keep them around. Once the
/// catalog is gone, `definition` returns `None`.
#[derive(Debug, Clone)]
pub struct Item {
    id: ItemId,
    definition_id: DefinitionId,
    quantity: u16,
    trade_locked: bool,
    catalog: Weak<dyn DefinitionCatalog>,
}

impl Item {
    pub(crate) fn from_details(details: &ItemDetails, catalog: &Arc<dyn DefinitionCatalog>) -> Self {
        Self {
            id: details.item_id,
            definition_id: details.definition,
            quantity: details.quantity,
            trade_locked: details.flags.contains(ItemFlags::NO_TRADE),
            catalog: Arc::downgrade(catalog),
        }
    }

    /// Instance identifier.
    #[must_use]
    pub const fn id(&self) -> ItemId {
        self.id
    }

    /// Catalog identifier of the item type.
    #[must_use]
    pub const fn definition_id(&self) -> DefinitionId {
        self.definition_id
    }

    /// Stack size.
    #[must_use]
    pub const fn quantity(&self) -> u16 {
        self.quantity
    }

    /// Whether the item is currently excluded from trading.
    #[must_use]
    pub const fn trade_locked(&self) -> bool {
        self.trade_locked
    }

    /// The catalog definition of the item, if the catalog is still alive and knows it.
    #[must_use]
    pub fn definition(&self) -> Option<Arc<Definition>> {
        self.catalog.upgrade()?.find_definition(self.definition_id)
    }
}

/// Items compare by their record fields; the catalog reference is not part of the value.
impl PartialEq for Item {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.definition_id == other.definition_id
            && self.quantity == other.quantity
            && self.trade_locked == other.trade_locked
    }
}

impl Eq for Item {}
