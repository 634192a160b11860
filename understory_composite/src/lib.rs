// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Composite: a headless focus engine for composite widgets.
//!
//! A composite widget is one tab stop (the container) holding many
//! keyboard-navigable items: listboxes, menus, toolbars, grids. This crate
//! models:
//! - **Shared state** ([`CompositeState`]): the ordered item registry, the
//!   active item, the orientation, and whether focus is virtual.
//! - **The engine** ([`Composite`]): event handlers that keep real and logical
//!   focus consistent, proxy keys to the active item, and enter the items from
//!   the container with arrow, Home/End, and Page keys.
//! - **The host seam** ([`ElementHost`]): everything that touches real
//!   elements goes through the host, addressed by item id.
//! - **External handlers** ([`HandlerChain`]): application code runs first and
//!   can take over any event by preventing its default.
//!
//! ## Minimal example
//!
//! Entering a vertical list from its container and focusing the first item:
//!
//! ```rust
//! use understory_composite::{
//!     Composite, CompositeState, Element, ElementHost, FocusEvent, FocusOptions, Item, Key,
//!     KeyboardEvent, Orientation,
//! };
//!
//! #[derive(Default)]
//! struct Host {
//!     focused: Option<Element<u32>>,
//! }
//!
//! impl ElementHost<u32> for Host {
//!     fn is_mounted(&self, _id: &u32) -> bool { true }
//!     fn focus(&mut self, element: &Element<u32>, _options: FocusOptions) {
//!         self.focused = Some(element.clone());
//!     }
//!     fn scroll_into_view(&mut self, _id: &u32) {}
//!     fn dispatch_keyboard_event(&mut self, _id: &u32, _ev: &KeyboardEvent<u32>) -> bool { true }
//!     fn dispatch_focus_event(&mut self, _el: &Element<u32>, _ev: &FocusEvent<u32>) {}
//!     fn active_element(&self) -> Option<Element<u32>> { self.focused.clone() }
//! }
//!
//! let mut state = CompositeState::new().with_orientation(Orientation::Vertical);
//! for id in [1, 2, 3] {
//!     state.items_mut().register(Item::new(id)).unwrap();
//! }
//! let mut composite = Composite::default();
//! let mut host = Host::default();
//!
//! let mut ev = KeyboardEvent::down(Key::ArrowDown, Element::Container);
//! composite.dispatch_key_down(&mut state, &mut host, &mut ev);
//! assert_eq!(state.active_id(), Some(&1));
//!
//! // Focus lands on the next tick.
//! composite.flush(&state, &mut host);
//! assert_eq!(host.focused, Some(Element::Item(1)));
//! ```
//!
//! ## Features
//!
//! - `std` (default): enables `std` support for `tracing` and `thiserror`.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod composite;
pub mod dispatcher;
pub mod event;
pub mod host;
pub mod registry;
pub mod state;

pub use composite::{
    Composite, CompositeAttributes, CompositeHandlers, CompositeOptions, entry_item_for_key,
};
pub use dispatcher::{Handler, HandlerChain, Outcome};
pub use event::{
    Cancelable, Element, EventFlags, FocusEvent, FocusEventKind, Key, KeyEventKind,
    KeyboardEvent, Modifiers,
};
pub use host::{ElementHost, FocusOptions};
pub use registry::{Item, ItemRegistry, RegistryError, Row};
pub use state::{CompositeState, Orientation};
