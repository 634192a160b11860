// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The host seam: how the engine reaches real elements.
//!
//! The engine never stores element handles. Whenever it needs to touch an
//! element it asks the host, addressing items by id. A host that no longer has
//! an element for an id reports it through [`ElementHost::is_mounted`], and the
//! engine skips the step silently.

use crate::event::{Element, FocusEvent, KeyboardEvent};

/// Options for [`ElementHost::focus`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct FocusOptions {
    /// Focus without scrolling the element into view.
    pub prevent_scroll: bool,
}

/// Element operations the composite engine needs from its environment.
pub trait ElementHost<K> {
    /// Whether the element for item `id` currently exists.
    fn is_mounted(&self, id: &K) -> bool;

    /// Move real focus to `element`.
    fn focus(&mut self, element: &Element<K>, options: FocusOptions);

    /// Whether the element for item `id` can be scrolled into view.
    fn supports_scroll_into_view(&self, id: &K) -> bool {
        let _ = id;
        true
    }

    /// Scroll the element for item `id` to the nearest visible position.
    fn scroll_into_view(&mut self, id: &K);

    /// Dispatch a synthetic keyboard event on the element for item `id`.
    ///
    /// Returns `false` when a listener canceled the event.
    fn dispatch_keyboard_event(&mut self, id: &K, event: &KeyboardEvent<K>) -> bool;

    /// Dispatch a synthetic focus or blur event on `element`.
    fn dispatch_focus_event(&mut self, element: &Element<K>, event: &FocusEvent<K>);

    /// The element that currently holds real focus.
    fn active_element(&self) -> Option<Element<K>>;

    /// Whether the item element for `id` is a descendant of the container.
    ///
    /// Item elements rendered elsewhere (for example, in a portal) return
    /// `false`, in which case proxied key events do not bubble back into the
    /// container.
    fn container_contains(&self, id: &K) -> bool {
        let _ = id;
        true
    }
}
