// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Combobox configuration.

use alloc::boxed::Box;
use core::fmt;

use understory_composite::composite::CompositeOptions;
use understory_composite::event::KeyboardEvent;

use crate::event::{ChangeEvent, PointerEvent};

/// How typed text and the active item interact.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum AutoComplete {
    /// Static items; the input shows exactly what was typed.
    #[default]
    None,
    /// Items are filtered by the typed value; the input shows exactly what was typed.
    List,
    /// Static items; the input temporarily shows the active item's value.
    Inline,
    /// Filtered items, and the input temporarily shows the active item's value.
    Both,
}

impl AutoComplete {
    /// Value of the `aria-autocomplete` attribute.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::List => "list",
            Self::Inline => "inline",
            Self::Both => "both",
        }
    }

    /// Whether the input shows the active item's value.
    pub fn is_inline(self) -> bool {
        matches!(self, Self::Inline | Self::Both)
    }

    /// Whether items are filtered by the typed value.
    pub fn is_list(self) -> bool {
        matches!(self, Self::List | Self::Both)
    }
}

/// A boolean option, or a predicate evaluated against the triggering event.
pub enum Gate<E> {
    /// Fixed answer.
    Value(bool),
    /// Decided per event.
    Predicate(Box<dyn Fn(&E) -> bool>),
}

impl<E> Gate<E> {
    /// A gate decided per event.
    pub fn predicate(f: impl Fn(&E) -> bool + 'static) -> Self {
        Self::Predicate(Box::new(f))
    }

    /// Whether the gated action runs for `event`.
    pub fn evaluate(&self, event: &E) -> bool {
        match self {
            Self::Value(value) => *value,
            Self::Predicate(f) => f(event),
        }
    }
}

impl<E> Default for Gate<E> {
    fn default() -> Self {
        Self::Value(true)
    }
}

impl<E> From<bool> for Gate<E> {
    fn from(value: bool) -> Self {
        Self::Value(value)
    }
}

impl<E> fmt::Debug for Gate<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Self::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

/// Combobox configuration.
///
/// Every gate defaults to `true`.
#[derive(Debug)]
pub struct ComboboxOptions<K> {
    /// Options of the underlying composite.
    pub composite: CompositeOptions,
    /// Activate the first item whenever the typed value changes by insertion.
    ///
    /// Only effective when the state uses virtual focus.
    pub auto_select: bool,
    /// Autocomplete mode.
    ///
    /// `None` resolves to [`AutoComplete::List`] when the state has a candidate
    /// list and [`AutoComplete::None`] otherwise.
    pub auto_complete: Option<AutoComplete>,
    /// Open the popover when the value changes.
    pub show_on_change: Gate<ChangeEvent>,
    /// Write the new value into the state when it changes.
    pub set_value_on_change: Gate<ChangeEvent>,
    /// Open the popover after a primary-button press on the input.
    pub show_on_pointer_down: Gate<PointerEvent>,
    /// Commit the displayed value when the input is clicked.
    pub set_value_on_click: Gate<PointerEvent>,
    /// Open the popover with Up or Down.
    pub show_on_key_down: Gate<KeyboardEvent<K>>,
}

impl<K> Default for ComboboxOptions<K> {
    fn default() -> Self {
        Self {
            composite: CompositeOptions::default(),
            auto_select: false,
            auto_complete: None,
            show_on_change: Gate::default(),
            set_value_on_change: Gate::default(),
            show_on_pointer_down: Gate::default(),
            set_value_on_click: Gate::default(),
            show_on_key_down: Gate::default(),
        }
    }
}

impl<K> ComboboxOptions<K> {
    /// Builder-style [`composite`](Self::composite).
    #[must_use]
    pub fn with_composite(mut self, composite: CompositeOptions) -> Self {
        self.composite = composite;
        self
    }

    /// Builder-style [`auto_select`](Self::auto_select).
    #[must_use]
    pub fn with_auto_select(mut self, auto_select: bool) -> Self {
        self.auto_select = auto_select;
        self
    }

    /// Builder-style [`auto_complete`](Self::auto_complete).
    #[must_use]
    pub fn with_auto_complete(mut self, auto_complete: AutoComplete) -> Self {
        self.auto_complete = Some(auto_complete);
        self
    }

    /// Builder-style [`show_on_change`](Self::show_on_change).
    #[must_use]
    pub fn with_show_on_change(mut self, gate: impl Into<Gate<ChangeEvent>>) -> Self {
        self.show_on_change = gate.into();
        self
    }

    /// Builder-style [`set_value_on_change`](Self::set_value_on_change).
    #[must_use]
    pub fn with_set_value_on_change(mut self, gate: impl Into<Gate<ChangeEvent>>) -> Self {
        self.set_value_on_change = gate.into();
        self
    }

    /// Builder-style [`show_on_pointer_down`](Self::show_on_pointer_down).
    #[must_use]
    pub fn with_show_on_pointer_down(mut self, gate: impl Into<Gate<PointerEvent>>) -> Self {
        self.show_on_pointer_down = gate.into();
        self
    }

    /// Builder-style [`set_value_on_click`](Self::set_value_on_click).
    #[must_use]
    pub fn with_set_value_on_click(mut self, gate: impl Into<Gate<PointerEvent>>) -> Self {
        self.set_value_on_click = gate.into();
        self
    }

    /// Builder-style [`show_on_key_down`](Self::show_on_key_down).
    #[must_use]
    pub fn with_show_on_key_down(mut self, gate: impl Into<Gate<KeyboardEvent<K>>>) -> Self {
        self.show_on_key_down = gate.into();
        self
    }
}
