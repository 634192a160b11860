// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The composite focus engine.
//!
//! ## Focus modes
//!
//! - **Roving tabindex** (`virtual_focus == false`): real focus moves between
//!   item elements and the container.
//! - **Virtual focus** (`virtual_focus == true`): the container keeps real
//!   focus. The active item is tracked in [`CompositeState`] and exposed as
//!   `aria-activedescendant`; keyboard events reaching the container are
//!   re-dispatched on the active item's element.
//!
//! ## Synthetic focus and blur
//!
//! Under virtual focus an item that receives real focus hands it straight back
//! to the container. That "bounce-back" produces intermediate focus and blur
//! events on the container which the engine swallows, and the engine emits the
//! blur events items would have seen under roving tabindex:
//!
//! - Container focused as a bounce-back from an item: the focus event is
//!   stopped and the item is remembered as the previously active element.
//! - Container blurred towards an item: a blur is emitted on whichever item the
//!   state considered active before the transition, then the event is stopped.
//! - Active id changed while a previous element is remembered: that element is
//!   blurred.
//! - Focus leaving the widget entirely: the active item is blurred.
//!
//! ## Driving the engine
//!
//! The host forwards events to the `on_*` handlers (or the `dispatch_*`
//! helpers, which run capture then bubble), calls [`Composite::sync`] after
//! mutating the state outside a handler, and calls [`Composite::flush`] once per
//! tick to run deferred focus work. Deferred work always re-reads the state, so
//! a focus scheduled for one item lands on whichever item is active when it runs.

use alloc::collections::VecDeque;
use core::fmt::Debug;
use core::hash::Hash;

use crate::dispatcher::HandlerChain;
use crate::event::{Cancelable, Element, FocusEvent, Key, KeyboardEvent, Modifiers};
use crate::host::{ElementHost, FocusOptions};
use crate::registry::{find_first_enabled_item, find_first_enabled_item_in_last_row};
use crate::state::CompositeState;

/// Composite configuration.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CompositeOptions {
    /// Whether the widget behaves as a composite at all.
    ///
    /// Set to `false` when nesting composites where only one should manage focus.
    pub composite: bool,
    /// Whether an explicit move focuses the active item.
    ///
    /// `None` follows [`composite`](Self::composite).
    pub focus_on_move: Option<bool>,
}

impl Default for CompositeOptions {
    fn default() -> Self {
        Self {
            composite: true,
            focus_on_move: None,
        }
    }
}

impl CompositeOptions {
    /// Builder-style [`composite`](Self::composite).
    #[must_use]
    pub fn with_composite(mut self, composite: bool) -> Self {
        self.composite = composite;
        self
    }

    /// Builder-style [`focus_on_move`](Self::focus_on_move).
    #[must_use]
    pub fn with_focus_on_move(mut self, focus_on_move: bool) -> Self {
        self.focus_on_move = Some(focus_on_move);
        self
    }

    /// Effective focus-on-move setting.
    pub fn focus_on_move(&self) -> bool {
        self.focus_on_move.unwrap_or(self.composite)
    }
}

/// External handlers, run before the engine's own handling of each event.
#[derive(Debug)]
pub struct CompositeHandlers<K> {
    /// Key down, capture phase.
    pub key_down_capture: HandlerChain<KeyboardEvent<K>>,
    /// Key up, capture phase.
    pub key_up_capture: HandlerChain<KeyboardEvent<K>>,
    /// Key down, bubble phase.
    pub key_down: HandlerChain<KeyboardEvent<K>>,
    /// Focus, capture phase.
    pub focus_capture: HandlerChain<FocusEvent<K>>,
    /// Focus, bubble phase.
    pub focus: HandlerChain<FocusEvent<K>>,
    /// Blur, capture phase.
    pub blur_capture: HandlerChain<FocusEvent<K>>,
}

impl<K> Default for CompositeHandlers<K> {
    fn default() -> Self {
        Self {
            key_down_capture: HandlerChain::new(),
            key_up_capture: HandlerChain::new(),
            key_down: HandlerChain::new(),
            focus_capture: HandlerChain::new(),
            focus: HandlerChain::new(),
            blur_capture: HandlerChain::new(),
        }
    }
}

/// Attributes the host applies to the container element.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompositeAttributes<K> {
    /// `aria-activedescendant`; only set under virtual focus.
    pub active_descendant: Option<K>,
    /// Whether the container is in the tab order.
    pub focusable: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Microtask {
    ScheduleFocus,
}

/// Composite focus engine.
///
/// Holds only per-widget bookkeeping; the shared [`CompositeState`] is lent to
/// each call.
#[derive(Debug)]
pub struct Composite<K> {
    options: CompositeOptions,
    handlers: CompositeHandlers<K>,
    /// Item that last bounced focus back to the container.
    previous_item: Option<K>,
    focus_scheduled: bool,
    /// A scheduled focus is waiting for its item to mount.
    focus_waiting: bool,
    microtasks: VecDeque<Microtask>,
    seen_moves: u64,
    seen_active_id: Option<Option<K>>,
}

impl<K> Default for Composite<K> {
    fn default() -> Self {
        Self {
            options: CompositeOptions::default(),
            handlers: CompositeHandlers::default(),
            previous_item: None,
            focus_scheduled: false,
            focus_waiting: false,
            microtasks: VecDeque::new(),
            seen_moves: 0,
            seen_active_id: None,
        }
    }
}

impl<K: Clone + Eq + Hash + Debug> Composite<K> {
    /// Create an engine with the given options.
    pub fn new(options: CompositeOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Current options.
    pub fn options(&self) -> &CompositeOptions {
        &self.options
    }

    /// Replace the options.
    pub fn set_options(&mut self, options: CompositeOptions) {
        self.options = options;
    }

    /// External handlers.
    pub fn handlers_mut(&mut self) -> &mut CompositeHandlers<K> {
        &mut self.handlers
    }

    /// Whether virtual focus is in effect for `state`.
    pub fn is_virtual_focus(&self, state: &CompositeState<K>) -> bool {
        self.options.composite && state.virtual_focus()
    }

    /// Item remembered as the previously focused element, if any.
    pub fn previous_item(&self) -> Option<&K> {
        self.previous_item.as_ref()
    }

    /// Whether a focus on the active item is waiting for [`flush`](Self::flush).
    pub fn is_focus_scheduled(&self) -> bool {
        self.focus_scheduled
    }

    /// Whether [`flush`](Self::flush) has anything to do.
    pub fn has_pending_work(&self) -> bool {
        self.focus_scheduled || !self.microtasks.is_empty()
    }

    /// Attributes for the container element.
    pub fn attributes(&self, state: &CompositeState<K>) -> CompositeAttributes<K> {
        let virtual_focus = self.is_virtual_focus(state);
        let active_descendant = if virtual_focus {
            state.active_item().map(|item| item.id.clone())
        } else {
            None
        };
        CompositeAttributes {
            active_descendant,
            focusable: self.options.composite && (virtual_focus || state.active_id().is_none()),
        }
    }

    /// Request focus on the active item at the next [`flush`](Self::flush).
    ///
    /// The request stays pending until an active item element exists.
    pub fn schedule_focus(&mut self) {
        tracing::trace!("focus on active item scheduled");
        self.focus_scheduled = true;
    }

    /// Explicitly move the active item, then synchronize.
    pub fn move_to<H: ElementHost<K>>(
        &mut self,
        state: &mut CompositeState<K>,
        host: &mut H,
        id: Option<K>,
    ) {
        state.move_to(id);
        self.sync(state, host);
    }

    /// Change the active item without counting a move, then synchronize.
    pub fn set_active_id<H: ElementHost<K>>(
        &mut self,
        state: &mut CompositeState<K>,
        host: &mut H,
        id: Option<K>,
    ) {
        state.set_active_id(id);
        self.sync(state, host);
    }

    /// Run the effects derived from state changes since the last call.
    ///
    /// Call this after mutating the state outside of the engine's handlers.
    pub fn sync<H: ElementHost<K>>(&mut self, state: &CompositeState<K>, host: &mut H) {
        let moves = state.moves();
        let moved = moves != self.seen_moves;
        let active_id = state.active_id().cloned();
        let active_changed = self.seen_active_id.as_ref() != Some(&active_id);
        self.seen_moves = moves;
        self.seen_active_id = Some(active_id);

        // Focus is deferred so that everything derived from this update has
        // settled before the item sees its focus event.
        if moved
            && self.options.focus_on_move()
            && Self::mounted_active_id(state, host).is_some()
        {
            self.schedule_focus();
        }

        // The active id moved on while an item still believes it has focus.
        if active_changed
            && self.is_virtual_focus(state)
            && let Some(previous) = self.previous_item.take()
        {
            let related = Self::mounted_active_id(state, host)
                .map(Element::Item)
                .or_else(|| host.active_element());
            Self::fire_blur(host, previous, related);
        }

        // An explicit move to the container itself.
        if moved && self.options.composite && state.active_id().is_none() {
            if let Some(previous) = self.previous_item.take() {
                Self::fire_blur(host, previous, Some(Element::Container));
            }
            host.focus(&Element::Container, FocusOptions::default());
        }
    }

    /// Run deferred work: queued microtasks, then any scheduled focus.
    pub fn flush<H: ElementHost<K>>(&mut self, state: &CompositeState<K>, host: &mut H) {
        while let Some(task) = self.microtasks.pop_front() {
            match task {
                Microtask::ScheduleFocus => self.schedule_focus(),
            }
        }
        if !self.focus_scheduled {
            return;
        }
        let Some(id) = Self::mounted_active_id(state, host) else {
            if !self.focus_waiting {
                tracing::debug!("scheduled focus deferred: no mounted active item");
                self.focus_waiting = true;
            }
            return;
        };
        self.focus_scheduled = false;
        self.focus_waiting = false;
        tracing::trace!(item = ?id, "focusing active item");
        let element = Element::Item(id.clone());
        if host.supports_scroll_into_view(&id) {
            host.focus(
                &element,
                FocusOptions {
                    prevent_scroll: true,
                },
            );
            host.scroll_into_view(&id);
        } else {
            host.focus(&element, FocusOptions::default());
        }
    }

    /// Key down, capture phase: proxy to the active item under virtual focus.
    pub fn on_key_down_capture<H: ElementHost<K>>(
        &mut self,
        state: &CompositeState<K>,
        host: &mut H,
        event: &mut KeyboardEvent<K>,
    ) {
        if !self.handlers.key_down_capture.run_and_proceed(event) {
            return;
        }
        self.proxy_keyboard_event(state, host, event);
    }

    /// Key up, capture phase: proxy to the active item under virtual focus.
    pub fn on_key_up_capture<H: ElementHost<K>>(
        &mut self,
        state: &CompositeState<K>,
        host: &mut H,
        event: &mut KeyboardEvent<K>,
    ) {
        if !self.handlers.key_up_capture.run_and_proceed(event) {
            return;
        }
        self.proxy_keyboard_event(state, host, event);
    }

    /// Key down, bubble phase: enter the items from the container.
    ///
    /// Only handled when the container itself is the target and no item is
    /// active. See [`entry_item_for_key`] for the key map.
    pub fn on_key_down<H: ElementHost<K>>(
        &mut self,
        state: &mut CompositeState<K>,
        host: &mut H,
        event: &mut KeyboardEvent<K>,
    ) {
        if !self.handlers.key_down.run_and_proceed(event) {
            return;
        }
        if !event.target.is_container() || state.active_item().is_some() {
            return;
        }
        let Some(id) = entry_item_for_key(state, event.key) else {
            return;
        };
        event.prevent_default();
        state.move_to(Some(id));
        self.sync(state, host);
    }

    /// Focus, capture phase: swallow bounce-back focus from items.
    pub fn on_focus_capture<H: ElementHost<K>>(
        &mut self,
        state: &CompositeState<K>,
        host: &mut H,
        event: &mut FocusEvent<K>,
    ) {
        if !self.handlers.focus_capture.run_and_proceed(event) {
            return;
        }
        if !self.is_virtual_focus(state) {
            return;
        }
        let Some(previous) = Self::registered_item(state, host, event.related_target.as_ref())
        else {
            return;
        };
        if event.target.is_container() {
            event.stop_propagation();
            self.previous_item = Some(previous);
        }
    }

    /// Focus, bubble phase: the container itself was focused.
    ///
    /// Under virtual focus this queues a focus on the active item for the next
    /// [`flush`](Self::flush), after any same-tick item registration. Under
    /// roving tabindex the container becomes the active element.
    pub fn on_focus<H: ElementHost<K>>(
        &mut self,
        state: &mut CompositeState<K>,
        host: &mut H,
        event: &mut FocusEvent<K>,
    ) {
        if !self.handlers.focus.run_and_proceed(event) {
            return;
        }
        if !self.options.composite || !event.target.is_container() {
            return;
        }
        if self.is_virtual_focus(state) {
            if !self.microtasks.contains(&Microtask::ScheduleFocus) {
                self.microtasks.push_back(Microtask::ScheduleFocus);
            }
        } else {
            state.set_active_id(None);
            self.sync(state, host);
        }
    }

    /// Blur, capture phase: emit the blur events items expect under virtual focus.
    pub fn on_blur_capture<H: ElementHost<K>>(
        &mut self,
        state: &CompositeState<K>,
        host: &mut H,
        event: &mut FocusEvent<K>,
    ) {
        if !self.handlers.blur_capture.run_and_proceed(event) {
            return;
        }
        if !self.is_virtual_focus(state) {
            return;
        }
        let active = Self::mounted_active_id(state, host);
        let next = Self::registered_item(state, host, event.related_target.as_ref());
        if event.target.is_container() && next.is_some() {
            // Intermediate blur: the container hands focus to an item that will
            // bounce it straight back.
            if next == active {
                // Keyboard move (state already points at the next item) or a
                // click on the active item.
                if let Some(previous) = self.previous_item.clone()
                    && next.as_ref() != Some(&previous)
                {
                    Self::fire_blur(host, previous, event.related_target.clone());
                }
            } else if let Some(active) = active {
                // Pointer on another item while one is active.
                Self::fire_blur(host, active, event.related_target.clone());
            }
            event.stop_propagation();
        } else {
            let target_is_item = Self::registered_item(state, host, Some(&event.target)).is_some();
            if !target_is_item && let Some(active) = active {
                // Focus is leaving the widget.
                if self.previous_item.as_ref() == Some(&active) {
                    self.previous_item = None;
                }
                Self::fire_blur(host, active, event.related_target.clone());
            }
        }
    }

    /// Key down through both phases.
    pub fn dispatch_key_down<H: ElementHost<K>>(
        &mut self,
        state: &mut CompositeState<K>,
        host: &mut H,
        event: &mut KeyboardEvent<K>,
    ) {
        self.on_key_down_capture(state, host, event);
        if event.is_propagation_stopped() {
            return;
        }
        self.on_key_down(state, host, event);
    }

    /// Key up through both phases.
    pub fn dispatch_key_up<H: ElementHost<K>>(
        &mut self,
        state: &CompositeState<K>,
        host: &mut H,
        event: &mut KeyboardEvent<K>,
    ) {
        self.on_key_up_capture(state, host, event);
    }

    /// Focus through both phases.
    pub fn dispatch_focus<H: ElementHost<K>>(
        &mut self,
        state: &mut CompositeState<K>,
        host: &mut H,
        event: &mut FocusEvent<K>,
    ) {
        self.on_focus_capture(state, host, event);
        if event.is_propagation_stopped() {
            return;
        }
        self.on_focus(state, host, event);
    }

    /// Blur through both phases.
    pub fn dispatch_blur<H: ElementHost<K>>(
        &mut self,
        state: &CompositeState<K>,
        host: &mut H,
        event: &mut FocusEvent<K>,
    ) {
        self.on_blur_capture(state, host, event);
    }

    fn proxy_keyboard_event<H: ElementHost<K>>(
        &self,
        state: &CompositeState<K>,
        host: &mut H,
        event: &mut KeyboardEvent<K>,
    ) {
        if !self.is_virtual_focus(state) || !can_proxy_keyboard_event(event) {
            return;
        }
        let Some(id) = Self::mounted_active_id(state, host) else {
            return;
        };
        let element = Element::Item(id.clone());
        // An item activated without focus (hover, for instance) gets focus
        // before it sees the key.
        if self.previous_item.as_ref() != Some(&id) {
            host.focus(&element, FocusOptions::default());
        }
        tracing::trace!(item = ?id, key = ?event.key, kind = ?event.kind, "proxying key event");
        let proxied = event.retarget(element);
        if !host.dispatch_keyboard_event(&id, &proxied) {
            event.prevent_default();
        }
        // The proxied event bubbles back through the container on its own.
        if host.container_contains(&id) {
            event.stop_propagation();
        }
    }

    fn mounted_active_id<H: ElementHost<K>>(state: &CompositeState<K>, host: &H) -> Option<K> {
        state
            .active_item()
            .filter(|item| host.is_mounted(&item.id))
            .map(|item| item.id.clone())
    }

    fn registered_item<H: ElementHost<K>>(
        state: &CompositeState<K>,
        host: &H,
        element: Option<&Element<K>>,
    ) -> Option<K> {
        let id = element?.item()?;
        (state.items().contains(id) && host.is_mounted(id)).then(|| id.clone())
    }

    fn fire_blur<H: ElementHost<K>>(host: &mut H, item: K, related: Option<Element<K>>) {
        if !host.is_mounted(&item) {
            tracing::debug!(?item, "synthetic blur skipped: item is not mounted");
            return;
        }
        tracing::debug!(?item, ?related, "synthetic blur");
        let element = Element::Item(item);
        let event = FocusEvent::blur(element.clone(), related);
        host.dispatch_focus_event(&element, &event);
    }
}

fn can_proxy_keyboard_event<K>(event: &KeyboardEvent<K>) -> bool {
    event.target.is_container()
        && !event.modifiers.contains(Modifiers::META)
        && event.key != Key::Tab
        // Stopped by an earlier handler: for example, a combobox keeps Home
        // and End on its text caret.
        && !event.is_propagation_stopped()
}

/// Item to enter when a key is pressed while the container itself is active.
///
/// Entering has no "current" item to step from, so keys jump to an extremity:
///
/// | Key | List | Grid |
/// |-----|------|------|
/// | Up (vertical) | last | first enabled of the last row |
/// | Down (vertical) | first | first |
/// | Right (horizontal) | first | first |
/// | Left (horizontal) | last | last |
/// | Home, PageUp | first | first |
/// | End, PageDown | last | last |
///
/// Items form a grid when the first enabled item has a row. In a grid every
/// arrow key applies regardless of orientation. Other keys yield `None`.
pub fn entry_item_for_key<K: Clone + Eq + Hash + Debug>(
    state: &CompositeState<K>,
    key: Key,
) -> Option<K> {
    let items = state.items().items();
    let is_grid = find_first_enabled_item(items).is_some_and(|item| item.row_id.is_some());
    let vertical = is_grid || state.orientation().is_vertical();
    let horizontal = is_grid || state.orientation().is_horizontal();
    match key {
        Key::ArrowUp if vertical => {
            if is_grid {
                find_first_enabled_item_in_last_row(items).map(|item| item.id.clone())
            } else {
                state.last()
            }
        }
        Key::ArrowDown if vertical => state.first(),
        Key::ArrowRight if horizontal => state.first(),
        Key::ArrowLeft if horizontal => state.last(),
        Key::Home | Key::PageUp => state.first(),
        Key::End | Key::PageDown => state.last(),
        _ => None,
    }
}
