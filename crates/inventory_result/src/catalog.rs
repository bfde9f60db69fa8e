// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

use crate::DefinitionId;

/// Static metadata describing an item type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Definition {
    id: DefinitionId,
    name: String,
    properties: HashMap<String, String>,
}

impl Definition {
    /// Creates a definition without properties.
    #[must_use]
    pub fn new(id: DefinitionId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            properties: HashMap::new(),
        }
    }

    /// Returns the definition with an additional property.
    #[must_use]
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Catalog identifier.
    #[must_use]
    pub const fn id(&self) -> DefinitionId {
        self.id
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Looks up a property by key.
    #[must_use]
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }
}

/// Resolves definition identifiers to catalog metadata.
///
/// Materialized items keep a weak reference to the catalog of their inventory and call
/// this lookup whenever their definition is requested, so implementations may either keep
/// definitions around or build them on demand. Unknown identifiers resolve to `None`,
/// which is not an error.
pub trait DefinitionCatalog: Debug + Send + Sync {
    /// Returns the definition for `id`, if known.
    fn find_definition(&self, id: DefinitionId) -> Option<Arc<Definition>>;
}

/// A fixed, in-memory [`DefinitionCatalog`].
///
/// # Examples
///
/// ```
/// use inventory_result::{Definition, DefinitionCatalog, DefinitionId, StaticCatalog};
///
/// let catalog = StaticCatalog::new([Definition::new(DefinitionId(10), "Crate")]);
/// assert!(catalog.find_definition(DefinitionId(10)).is_some());
/// assert!(catalog.find_definition(DefinitionId(11)).is_none());
/// ```
#[derive(Debug, Default)]
pub struct StaticCatalog {
    definitions: HashMap<DefinitionId, Arc<Definition>>,
}

impl StaticCatalog {
    /// Creates a catalog from a set of definitions. Later duplicates replace earlier ones.
    #[must_use]
    pub fn new(definitions: impl IntoIterator<Item = Definition>) -> Self {
        Self {
            definitions: definitions.into_iter().map(|d| (d.id(), Arc::new(d))).collect(),
        }
    }

    /// Number of known definitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Whether the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

impl DefinitionCatalog for StaticCatalog {
    fn find_definition(&self, id: DefinitionId) -> Option<Arc<Definition>> {
        self.definitions.get(&id).cloned()
    }
}
