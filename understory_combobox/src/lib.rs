// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Combobox: a headless combobox engine.
//!
//! A combobox is a text input whose composite items live in a popover. This
//! crate layers text behavior on [`understory_composite`]:
//! - **State** ([`ComboboxState`]): the composite state plus the typed value,
//!   the open flag, the candidate list, and the popover content element.
//! - **The engine** ([`Combobox`]): event handlers for typing, composition,
//!   pointer, and keys, and the effects that keep the active item, the
//!   displayed value, and the completion highlight consistent.
//! - **Completion** ([`completion`]): pure functions computing the displayed
//!   value and the highlighted completion range.
//! - **Options** ([`ComboboxOptions`]): autocomplete mode, auto-select, and
//!   boolean-or-predicate gates for each automatic action.
//!
//! ## Minimal example
//!
//! Inline completion with auto-select:
//!
//! ```rust
//! use understory_combobox::{
//!     AutoComplete, ChangeEvent, Combobox, ComboboxOptions, ComboboxState, TextInputHost,
//! };
//! use understory_composite::{Element, ElementHost, FocusEvent, FocusOptions, Item, KeyboardEvent};
//!
//! #[derive(Default)]
//! struct Input {
//!     selection: Option<(usize, usize)>,
//! }
//!
//! impl ElementHost<&'static str> for Input {
//!     fn is_mounted(&self, _id: &&'static str) -> bool { true }
//!     fn focus(&mut self, _el: &Element<&'static str>, _options: FocusOptions) {}
//!     fn scroll_into_view(&mut self, _id: &&'static str) {}
//!     fn dispatch_keyboard_event(
//!         &mut self,
//!         _id: &&'static str,
//!         _ev: &KeyboardEvent<&'static str>,
//!     ) -> bool {
//!         true
//!     }
//!     fn dispatch_focus_event(
//!         &mut self,
//!         _el: &Element<&'static str>,
//!         _ev: &FocusEvent<&'static str>,
//!     ) {
//!     }
//!     fn active_element(&self) -> Option<Element<&'static str>> { Some(Element::Container) }
//! }
//!
//! impl TextInputHost<&'static str> for Input {
//!     fn set_selection_range(&mut self, start: usize, end: usize) {
//!         self.selection = Some((start, end));
//!     }
//! }
//!
//! let mut state = ComboboxState::new();
//! for (id, value) in [("react", "React"), ("redux", "Redux")] {
//!     let item = Item::new(id).with_value(value);
//!     state.composite_mut().items_mut().register(item).unwrap();
//! }
//! let options = ComboboxOptions::default()
//!     .with_auto_complete(AutoComplete::Inline)
//!     .with_auto_select(true);
//! let mut combobox = Combobox::new(options);
//! let mut input = Input::default();
//! combobox.sync(&mut state, &mut input);
//!
//! combobox.on_change(&mut state, &mut input, &mut ChangeEvent::typed("r"));
//! assert_eq!(state.composite().active_id(), Some(&"react"));
//! assert_eq!(combobox.displayed_value(&state), "react");
//! assert_eq!(input.selection, Some((1, 5)));
//! ```
//!
//! ## Features
//!
//! - `std` (default): enables `std` support for `understory_composite`,
//!   `tracing`, and `unicode-normalization`.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod combobox;
pub mod completion;
pub mod event;
pub mod options;
pub mod state;

pub use combobox::{Combobox, ComboboxAttributes, ComboboxHandlers, TextInputHost};
pub use event::{Button, ChangeEvent, CompositionEvent, InputType, PRIMARY_BUTTON, PointerEvent};
pub use options::{AutoComplete, ComboboxOptions, Gate};
pub use state::{ComboboxState, PopupContent, PopupRole};
