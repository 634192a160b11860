// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Combobox state: the composite state plus the text value and popover.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::Debug;
use core::hash::Hash;

use understory_composite::state::{CompositeState, Orientation};

use crate::completion::fold_for_matching;

/// Role of the popover content element, reported as `aria-haspopup`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum PopupRole {
    /// A listbox (the default).
    #[default]
    Listbox,
    /// A menu.
    Menu,
    /// A tree.
    Tree,
    /// A grid.
    Grid,
    /// A dialog.
    Dialog,
}

impl PopupRole {
    /// Attribute value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Listbox => "listbox",
            Self::Menu => "menu",
            Self::Tree => "tree",
            Self::Grid => "grid",
            Self::Dialog => "dialog",
        }
    }
}

/// The popover content element, as far as the combobox needs to know it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PopupContent {
    /// Element id, reported as `aria-controls`.
    pub id: String,
    /// Popup role of the element, if it has one.
    pub role: Option<PopupRole>,
}

impl PopupContent {
    /// Content with the given id and no role.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role: None,
        }
    }

    /// Builder-style [`role`](Self::role).
    #[must_use]
    pub fn with_role(mut self, role: PopupRole) -> Self {
        self.role = Some(role);
        self
    }
}

/// State shared by a combobox input, its popover, and its items.
///
/// Defaults to virtual focus and vertical orientation.
#[derive(Clone, Debug)]
pub struct ComboboxState<K> {
    composite: CompositeState<K>,
    value: String,
    open: bool,
    list: Vec<String>,
    limit: Option<usize>,
    content: Option<PopupContent>,
}

impl<K: Clone + Eq + Hash + Debug> Default for ComboboxState<K> {
    fn default() -> Self {
        Self {
            composite: CompositeState::default()
                .with_virtual_focus(true)
                .with_orientation(Orientation::Vertical),
            value: String::new(),
            open: false,
            list: Vec::new(),
            limit: None,
            content: None,
        }
    }
}

impl<K: Clone + Eq + Hash + Debug> ComboboxState<K> {
    /// Create an empty, closed combobox state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style initial value.
    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    /// Builder-style candidate list.
    #[must_use]
    pub fn with_list(mut self, list: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.set_list(list);
        self
    }

    /// Builder-style [`matches`](Self::matches) limit.
    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Underlying composite state.
    pub fn composite(&self) -> &CompositeState<K> {
        &self.composite
    }

    /// Underlying composite state, for item registration and moves.
    pub fn composite_mut(&mut self) -> &mut CompositeState<K> {
        &mut self.composite
    }

    /// The typed value.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Replace the typed value, returning whether it changed.
    pub fn set_value(&mut self, value: impl Into<String>) -> bool {
        let value = value.into();
        if value == self.value {
            return false;
        }
        self.value = value;
        true
    }

    /// Value of the active item, if it is enabled and has one.
    pub fn active_value(&self) -> Option<&str> {
        self.composite.active_item()?.value.as_deref()
    }

    /// Whether the popover is open.
    pub fn open(&self) -> bool {
        self.open
    }

    /// Open the popover.
    pub fn show(&mut self) {
        self.open = true;
    }

    /// Close the popover.
    pub fn hide(&mut self) {
        self.open = false;
    }

    /// Open or close the popover.
    pub fn set_open(&mut self, open: bool) {
        self.open = open;
    }

    /// Candidate strings.
    pub fn list(&self) -> &[String] {
        &self.list
    }

    /// Replace the candidate strings.
    pub fn set_list(&mut self, list: impl IntoIterator<Item = impl Into<String>>) {
        self.list = list.into_iter().map(Into::into).collect();
    }

    /// Maximum number of [`matches`](Self::matches).
    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Change the [`matches`](Self::matches) limit.
    pub fn set_limit(&mut self, limit: Option<usize>) {
        self.limit = limit;
    }

    /// The popover content element.
    pub fn content(&self) -> Option<&PopupContent> {
        self.content.as_ref()
    }

    /// Attach or detach the popover content element.
    pub fn set_content(&mut self, content: Option<PopupContent>) {
        self.content = content;
    }

    /// Candidates containing the typed value, ignoring case and diacritics.
    ///
    /// An empty value matches everything. At most [`limit`](Self::limit)
    /// candidates are returned, in list order.
    pub fn matches(&self) -> Vec<&str> {
        let needle = fold_for_matching(&self.value);
        self.list
            .iter()
            .filter(|candidate| fold_for_matching(candidate).contains(needle.as_str()))
            .take(self.limit.unwrap_or(usize::MAX))
            .map(String::as_str)
            .collect()
    }
}
