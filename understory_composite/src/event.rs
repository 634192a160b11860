// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Events consumed by the engines, and the elements they target.
//!
//! Events are plain values owned by the host's dispatcher. Handlers record
//! "default prevented" and "propagation stopped" on the event itself through
//! [`Cancelable`]; the host reads those flags back after dispatch.

/// An element as seen by a composite widget.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Element<K> {
    /// The composite container (for a combobox, the text input).
    Container,
    /// The element rendered for the item with this id.
    Item(K),
    /// The popover or listbox content element.
    Popover,
    /// Anything outside the widget.
    Outside,
}

impl<K> Element<K> {
    /// The item id, if this is an item element.
    pub fn item(&self) -> Option<&K> {
        match self {
            Self::Item(id) => Some(id),
            _ => None,
        }
    }

    /// Whether this is the container element.
    pub fn is_container(&self) -> bool {
        matches!(self, Self::Container)
    }
}

/// Propagation flags carried by every event.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct EventFlags {
    default_prevented: bool,
    propagation_stopped: bool,
}

impl EventFlags {
    /// Mark the default action as prevented.
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    /// Stop propagation to later phases and ancestors.
    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    /// Whether the default action was prevented.
    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }

    /// Whether propagation was stopped.
    pub fn propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }
}

/// Events that can be canceled or stopped.
pub trait Cancelable {
    /// Propagation flags of this event.
    fn flags(&self) -> &EventFlags;
    /// Mutable propagation flags of this event.
    fn flags_mut(&mut self) -> &mut EventFlags;

    /// Prevent the default action (and the engine's own handling).
    fn prevent_default(&mut self) {
        self.flags_mut().prevent_default();
    }

    /// Stop propagation.
    fn stop_propagation(&mut self) {
        self.flags_mut().stop_propagation();
    }

    /// Whether the default action was prevented.
    fn is_default_prevented(&self) -> bool {
        self.flags().default_prevented()
    }

    /// Whether propagation was stopped.
    fn is_propagation_stopped(&self) -> bool {
        self.flags().propagation_stopped()
    }
}

/// Logical key of a keyboard event.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    /// A key producing a single printable character.
    Character(char),
    /// Up arrow.
    ArrowUp,
    /// Down arrow.
    ArrowDown,
    /// Left arrow.
    ArrowLeft,
    /// Right arrow.
    ArrowRight,
    /// Home.
    Home,
    /// End.
    End,
    /// Page Up.
    PageUp,
    /// Page Down.
    PageDown,
    /// Tab.
    Tab,
    /// Enter.
    Enter,
    /// Escape.
    Escape,
    /// Backspace.
    Backspace,
    /// Delete.
    Delete,
    /// Any other named key.
    Unidentified,
}

impl Key {
    /// Whether this key produces a single printable character.
    pub fn is_character(self) -> bool {
        matches!(self, Self::Character(_))
    }
}

bitflags::bitflags! {
    /// Modifier keys held during an event.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        /// Shift.
        const SHIFT   = 0b0000_0001;
        /// Control.
        const CONTROL = 0b0000_0010;
        /// Alt / Option.
        const ALT     = 0b0000_0100;
        /// Meta / Command / Windows.
        const META    = 0b0000_1000;
    }
}

/// Key down or key up.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum KeyEventKind {
    /// Key pressed.
    Down,
    /// Key released.
    Up,
}

/// A keyboard event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyboardEvent<K> {
    /// Down or up.
    pub kind: KeyEventKind,
    /// Logical key.
    pub key: Key,
    /// Held modifiers.
    pub modifiers: Modifiers,
    /// Element the event was dispatched to.
    pub target: Element<K>,
    flags: EventFlags,
}

impl<K> KeyboardEvent<K> {
    /// A key-down event.
    pub fn down(key: Key, target: Element<K>) -> Self {
        Self {
            kind: KeyEventKind::Down,
            key,
            modifiers: Modifiers::empty(),
            target,
            flags: EventFlags::default(),
        }
    }

    /// A key-up event.
    pub fn up(key: Key, target: Element<K>) -> Self {
        Self {
            kind: KeyEventKind::Up,
            ..Self::down(key, target)
        }
    }

    /// Builder-style modifiers.
    #[must_use]
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// A fresh copy of this event aimed at another element.
    ///
    /// Flags are not carried over.
    pub fn retarget(&self, target: Element<K>) -> Self {
        Self {
            kind: self.kind,
            key: self.key,
            modifiers: self.modifiers,
            target,
            flags: EventFlags::default(),
        }
    }
}

impl<K> Cancelable for KeyboardEvent<K> {
    fn flags(&self) -> &EventFlags {
        &self.flags
    }

    fn flags_mut(&mut self) -> &mut EventFlags {
        &mut self.flags
    }
}

/// Focus gained or lost.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum FocusEventKind {
    /// The target gained focus.
    Focus,
    /// The target lost focus.
    Blur,
}

/// A focus or blur event.
///
/// For `Focus`, `related_target` is the element losing focus; for `Blur`, it
/// is the element gaining it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FocusEvent<K> {
    /// Focus or blur.
    pub kind: FocusEventKind,
    /// Element the event was dispatched to.
    pub target: Element<K>,
    /// The other side of the focus transition, when known.
    pub related_target: Option<Element<K>>,
    flags: EventFlags,
}

impl<K> FocusEvent<K> {
    /// `target` gained focus from `related_target`.
    pub fn focus(target: Element<K>, related_target: Option<Element<K>>) -> Self {
        Self {
            kind: FocusEventKind::Focus,
            target,
            related_target,
            flags: EventFlags::default(),
        }
    }

    /// `target` lost focus to `related_target`.
    pub fn blur(target: Element<K>, related_target: Option<Element<K>>) -> Self {
        Self {
            kind: FocusEventKind::Blur,
            target,
            related_target,
            flags: EventFlags::default(),
        }
    }
}

impl<K> Cancelable for FocusEvent<K> {
    fn flags(&self) -> &EventFlags {
        &self.flags
    }

    fn flags_mut(&mut self) -> &mut EventFlags {
        &mut self.flags
    }
}
