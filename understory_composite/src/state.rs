// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared composite state.
//!
//! [`CompositeState`] is owned by the application and lent to the engine for
//! each event. Item widgets register into it and the engine reads it; all
//! mutation goes through the methods here.

use core::fmt::Debug;
use core::hash::Hash;

use crate::registry::{
    Item, ItemRegistry, find_enabled_item_by_id, find_first_enabled_item, find_last_enabled_item,
};

/// Axis along which arrow keys navigate.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Orientation {
    /// Left/Right navigate.
    Horizontal,
    /// Up/Down navigate.
    Vertical,
    /// Every arrow key navigates.
    #[default]
    Both,
}

impl Orientation {
    /// Whether Up/Down participate in navigation.
    pub fn is_vertical(self) -> bool {
        self != Self::Horizontal
    }

    /// Whether Left/Right participate in navigation.
    pub fn is_horizontal(self) -> bool {
        self != Self::Vertical
    }
}

/// State shared between a composite container and its items.
///
/// `active_id == None` means the container itself is logically focused.
///
/// `moves` counts explicit [`move_to`](Self::move_to) calls. Effects that must
/// only react to explicit moves (focusing the active item, for example) compare
/// it against the last value they saw, so an incidental change of the active id
/// through [`set_active_id`](Self::set_active_id) does not trigger them.
#[derive(Clone, Debug)]
pub struct CompositeState<K> {
    items: ItemRegistry<K>,
    active_id: Option<K>,
    moves: u64,
    virtual_focus: bool,
    orientation: Orientation,
}

impl<K> Default for CompositeState<K> {
    fn default() -> Self {
        Self {
            items: ItemRegistry::default(),
            active_id: None,
            moves: 0,
            virtual_focus: false,
            orientation: Orientation::default(),
        }
    }
}

impl<K: Clone + Eq + Hash + Debug> CompositeState<K> {
    /// Create a roving-tabindex state with no items.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style virtual focus toggle.
    #[must_use]
    pub fn with_virtual_focus(mut self, virtual_focus: bool) -> Self {
        self.virtual_focus = virtual_focus;
        self
    }

    /// Builder-style orientation.
    #[must_use]
    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    /// Registered items.
    pub fn items(&self) -> &ItemRegistry<K> {
        &self.items
    }

    /// Registered items, for registration and unregistration.
    pub fn items_mut(&mut self) -> &mut ItemRegistry<K> {
        &mut self.items
    }

    /// Id of the logically focused item, `None` when the container is.
    pub fn active_id(&self) -> Option<&K> {
        self.active_id.as_ref()
    }

    /// The active item, if it exists and is enabled.
    pub fn active_item(&self) -> Option<&Item<K>> {
        find_enabled_item_by_id(self.items.items(), self.active_id.as_ref())
    }

    /// Number of explicit moves so far.
    pub fn moves(&self) -> u64 {
        self.moves
    }

    /// Whether the container keeps real focus and tracks the active item logically.
    pub fn virtual_focus(&self) -> bool {
        self.virtual_focus
    }

    /// Switch between virtual focus and roving tabindex.
    pub fn set_virtual_focus(&mut self, virtual_focus: bool) {
        self.virtual_focus = virtual_focus;
    }

    /// Arrow-key orientation.
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Change the arrow-key orientation.
    pub fn set_orientation(&mut self, orientation: Orientation) {
        self.orientation = orientation;
    }

    /// Explicitly move the active item and count the move.
    ///
    /// `None` moves logical focus back to the container.
    pub fn move_to(&mut self, id: Option<K>) {
        tracing::trace!(?id, moves = self.moves + 1, "composite move");
        self.active_id = id;
        self.moves += 1;
    }

    /// Change the active item without counting a move.
    pub fn set_active_id(&mut self, id: Option<K>) {
        self.active_id = id;
    }

    /// Id of the first enabled item.
    pub fn first(&self) -> Option<K> {
        find_first_enabled_item(self.items.items()).map(|item| item.id.clone())
    }

    /// Id of the last enabled item.
    pub fn last(&self) -> Option<K> {
        find_last_enabled_item(self.items.items()).map(|item| item.id.clone())
    }
}
