// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Item registry: the ordered set of items a composite navigates over.
//!
//! Items are registered by whatever mounts them (for example, an item widget
//! being created) and unregistered when they go away. Identity is the item id;
//! the registry never holds element handles. Hosts resolve an id to a concrete
//! element through [`ElementHost`](crate::host::ElementHost), so an item that
//! outlives its element simply stops resolving.
//!
//! The free functions in this module are pure lookups over a slice snapshot.
//! They do not cache anything and are cheap enough to call on every event:
//!
//! - [`find_enabled_item_by_id`]
//! - [`find_first_enabled_item`] and [`find_last_enabled_item`]
//! - [`group_items_by_rows`] and [`find_first_enabled_item_in_last_row`]
//!
//! ```rust
//! use understory_composite::registry::{
//!     Item, ItemRegistry, find_first_enabled_item_in_last_row, group_items_by_rows,
//! };
//!
//! let mut items = ItemRegistry::new();
//! items.register(Item::new("a").with_row("r1")).unwrap();
//! items.register(Item::new("b").with_row("r1")).unwrap();
//! items.register(Item::new("c").with_row("r2")).unwrap();
//! items.register(Item::new("d").with_row("r2")).unwrap();
//!
//! assert_eq!(group_items_by_rows(items.items()).len(), 2);
//! let entry = find_first_enabled_item_in_last_row(items.items()).unwrap();
//! assert_eq!(entry.id, "c");
//! ```

use alloc::string::String;
use alloc::vec::Vec;
use core::hash::Hash;

use hashbrown::HashMap;
use smallvec::SmallVec;

/// A single selectable item.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Item<K> {
    /// Stable identity of the item.
    pub id: K,
    /// Whether the item is disabled.
    ///
    /// Disabled items stay registered but are invisible to navigation and to
    /// active-item resolution.
    pub disabled: bool,
    /// Row this item belongs to when the items form a grid.
    pub row_id: Option<String>,
    /// Text value of the item, used by inline completion.
    pub value: Option<String>,
}

impl<K> Item<K> {
    /// Create an enabled item with no row and no value.
    pub fn new(id: K) -> Self {
        Self {
            id,
            disabled: false,
            row_id: None,
            value: None,
        }
    }

    /// Set the disabled flag.
    #[must_use]
    pub fn with_disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Place the item in a grid row.
    #[must_use]
    pub fn with_row(mut self, row_id: impl Into<String>) -> Self {
        self.row_id = Some(row_id.into());
        self
    }

    /// Attach a text value.
    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Whether the item participates in navigation.
    pub fn is_enabled(&self) -> bool {
        !self.disabled
    }
}

/// One row of items as produced by [`group_items_by_rows`].
///
/// Rows are usually short, so they are stored inline.
pub type Row<'a, K> = SmallVec<[&'a Item<K>; 8]>;

/// Errors raised when mutating an [`ItemRegistry`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError<K> {
    /// An item with this id is already registered.
    #[error("item {0:?} is already registered")]
    DuplicateItem(K),
    /// No item with this id is registered.
    #[error("item {0:?} is not registered")]
    UnknownItem(K),
}

/// Ordered collection of items with an id index.
///
/// Order is the traversal order supplied by the caller: [`ItemRegistry::register`]
/// appends and [`ItemRegistry::insert`] places an item at an explicit position.
/// At most one item exists per id.
///
/// Every mutation bumps [`ItemRegistry::revision`], which engines use to notice
/// that the item collection changed without diffing it.
#[derive(Clone, Debug)]
pub struct ItemRegistry<K> {
    items: Vec<Item<K>>,
    index: HashMap<K, usize>,
    revision: u64,
}

impl<K> Default for ItemRegistry<K> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            index: HashMap::new(),
            revision: 0,
        }
    }
}

impl<K: Clone + Eq + Hash> ItemRegistry<K> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an item at the end of the traversal order.
    pub fn register(&mut self, item: Item<K>) -> Result<(), RegistryError<K>> {
        self.insert(self.items.len(), item)
    }

    /// Insert an item at `position` in the traversal order.
    ///
    /// Positions past the end append.
    pub fn insert(&mut self, position: usize, item: Item<K>) -> Result<(), RegistryError<K>> {
        if self.index.contains_key(&item.id) {
            return Err(RegistryError::DuplicateItem(item.id));
        }
        let position = position.min(self.items.len());
        self.items.insert(position, item);
        self.reindex_from(position);
        self.bump();
        Ok(())
    }

    /// Remove an item, returning it if it was registered.
    pub fn unregister(&mut self, id: &K) -> Option<Item<K>> {
        let position = self.index.remove(id)?;
        let item = self.items.remove(position);
        self.reindex_from(position);
        self.bump();
        Some(item)
    }

    /// Enable or disable an item.
    pub fn set_disabled(&mut self, id: &K, disabled: bool) -> Result<(), RegistryError<K>> {
        self.update(id, |item| item.disabled = disabled)
    }

    /// Replace an item's text value.
    pub fn set_value(&mut self, id: &K, value: Option<String>) -> Result<(), RegistryError<K>> {
        self.update(id, |item| item.value = value)
    }

    /// Move an item to another row (or out of any row).
    pub fn set_row(&mut self, id: &K, row_id: Option<String>) -> Result<(), RegistryError<K>> {
        self.update(id, |item| item.row_id = row_id)
    }

    /// Remove every item.
    pub fn clear(&mut self) {
        if self.items.is_empty() {
            return;
        }
        self.items.clear();
        self.index.clear();
        self.bump();
    }

    /// Look up an item by id, enabled or not.
    pub fn get(&self, id: &K) -> Option<&Item<K>> {
        self.index.get(id).map(|&i| &self.items[i])
    }

    /// Look up an item by id, returning it only when it is enabled.
    pub fn enabled(&self, id: &K) -> Option<&Item<K>> {
        self.get(id).filter(|item| item.is_enabled())
    }

    /// Position of an item in traversal order.
    pub fn position(&self, id: &K) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Whether an item with this id is registered.
    pub fn contains(&self, id: &K) -> bool {
        self.index.contains_key(id)
    }

    /// Items in traversal order.
    pub fn items(&self) -> &[Item<K>] {
        &self.items
    }

    /// Number of registered items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether no items are registered.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Counter bumped on every mutation of the collection.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn update(
        &mut self,
        id: &K,
        f: impl FnOnce(&mut Item<K>),
    ) -> Result<(), RegistryError<K>> {
        let Some(&position) = self.index.get(id) else {
            return Err(RegistryError::UnknownItem(id.clone()));
        };
        f(&mut self.items[position]);
        self.bump();
        Ok(())
    }

    fn reindex_from(&mut self, start: usize) {
        for (i, item) in self.items.iter().enumerate().skip(start) {
            self.index.insert(item.id.clone(), i);
        }
    }

    fn bump(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}

/// Find the item with `id`, but only if it is enabled.
///
/// `None` for `id` (the container itself) never matches an item.
pub fn find_enabled_item_by_id<'a, K: PartialEq>(
    items: &'a [Item<K>],
    id: Option<&K>,
) -> Option<&'a Item<K>> {
    let id = id?;
    items
        .iter()
        .find(|item| item.id == *id)
        .filter(|item| item.is_enabled())
}

/// First enabled item in traversal order.
pub fn find_first_enabled_item<K>(items: &[Item<K>]) -> Option<&Item<K>> {
    items.iter().find(|item| item.is_enabled())
}

/// Last enabled item in traversal order.
pub fn find_last_enabled_item<K>(items: &[Item<K>]) -> Option<&Item<K>> {
    items.iter().rev().find(|item| item.is_enabled())
}

/// Partition items into rows of consecutive equal `row_id`.
///
/// Item order within a row and row order are both preserved. Items without a
/// `row_id` each form their own row.
pub fn group_items_by_rows<K>(items: &[Item<K>]) -> Vec<Row<'_, K>> {
    let mut rows: Vec<Row<'_, K>> = Vec::new();
    for item in items {
        let continues_row = item.row_id.is_some()
            && rows
                .last()
                .and_then(|row| row.last())
                .is_some_and(|prev| prev.row_id == item.row_id);
        match rows.last_mut() {
            Some(row) if continues_row => row.push(item),
            _ => {
                let mut row = Row::new();
                row.push(item);
                rows.push(row);
            }
        }
    }
    rows
}

/// First enabled item of the last row, falling back to earlier rows when the
/// last row has no enabled item.
///
/// This is the entry point used when navigating "up" into a grid from outside.
pub fn find_first_enabled_item_in_last_row<K>(items: &[Item<K>]) -> Option<&Item<K>> {
    group_items_by_rows(items)
        .into_iter()
        .rev()
        .flatten()
        .find(|item| item.is_enabled())
}
