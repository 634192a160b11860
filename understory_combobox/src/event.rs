// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Input-specific events consumed by the combobox.
//!
//! Keyboard and focus events come from [`understory_composite::event`].

use alloc::string::String;

use understory_composite::event::{Cancelable, EventFlags, Modifiers};

/// Kind of edit behind a [`ChangeEvent`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum InputType {
    /// Typed text.
    InsertText,
    /// Pasted text.
    InsertFromPaste,
    /// Text from an input method composition.
    InsertCompositionText,
    /// Backspace.
    DeleteContentBackward,
    /// Forward delete.
    DeleteContentForward,
    /// Anything else (drag and drop, undo, autofill...).
    Other,
}

/// The input's text changed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChangeEvent {
    /// New text of the input.
    pub value: String,
    /// Edit kind, when the platform reports one.
    pub input_type: Option<InputType>,
    flags: EventFlags,
}

impl ChangeEvent {
    /// A change with no reported edit kind.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            input_type: None,
            flags: EventFlags::default(),
        }
    }

    /// A change caused by typing.
    pub fn typed(value: impl Into<String>) -> Self {
        Self::new(value).with_input_type(InputType::InsertText)
    }

    /// Builder-style [`input_type`](Self::input_type).
    #[must_use]
    pub fn with_input_type(mut self, input_type: InputType) -> Self {
        self.input_type = Some(input_type);
        self
    }
}

/// An input method composition ended.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CompositionEvent {
    /// Committed text.
    pub data: String,
    flags: EventFlags,
}

impl CompositionEvent {
    /// A composition that committed `data`.
    pub fn new(data: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            flags: EventFlags::default(),
        }
    }
}

/// Pointer button identifier.
pub type Button = u8;

/// The primary (usually left) button.
pub const PRIMARY_BUTTON: Button = 0;

/// A pointer press, release, or click on the input.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct PointerEvent {
    /// Button involved.
    pub button: Button,
    /// Held modifiers.
    pub modifiers: Modifiers,
    flags: EventFlags,
}

impl PointerEvent {
    /// An event for `button` with no modifiers.
    pub fn new(button: Button) -> Self {
        Self {
            button,
            modifiers: Modifiers::empty(),
            flags: EventFlags::default(),
        }
    }

    /// An event for the primary button.
    pub fn primary() -> Self {
        Self::new(PRIMARY_BUTTON)
    }

    /// Builder-style modifiers.
    #[must_use]
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

macro_rules! impl_cancelable {
    ($($ty:ty),*) => {
        $(
            impl Cancelable for $ty {
                fn flags(&self) -> &EventFlags {
                    &self.flags
                }

                fn flags_mut(&mut self) -> &mut EventFlags {
                    &mut self.flags
                }
            }
        )*
    };
}

impl_cancelable!(ChangeEvent, CompositionEvent, PointerEvent);
