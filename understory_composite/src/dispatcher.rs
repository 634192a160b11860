// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Handler pipeline: run externally supplied handlers before the engine's own.
//!
//! Every event the engines consume first goes through a [`HandlerChain`] that
//! the embedding application fills. The chain is deliberately minimal:
//!
//! - Handlers run in insertion order.
//! - [`Outcome::Stop`] ends the chain immediately; later handlers are skipped.
//! - "Default prevented" lives on the event. After the chain ran, the engine
//!   checks [`Cancelable::is_default_prevented`] and skips its own handling when
//!   it is set. That is the override escape hatch.
//!
//! ## Minimal example
//!
//! ```
//! use understory_composite::dispatcher::{HandlerChain, Outcome};
//! use understory_composite::event::{Cancelable, Element, Key, KeyboardEvent};
//!
//! let mut chain: HandlerChain<KeyboardEvent<u32>> = HandlerChain::new();
//! chain.push(|ev| {
//!     if ev.key == Key::Home {
//!         // Take over Home: the engine will not navigate.
//!         ev.prevent_default();
//!         return Outcome::Stop;
//!     }
//!     Outcome::Continue
//! });
//!
//! let mut ev = KeyboardEvent::down(Key::Home, Element::Container);
//! let stopped_at = chain.run(&mut ev);
//! assert_eq!(stopped_at, Some(0));
//! assert!(ev.is_default_prevented());
//! ```

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

use crate::event::Cancelable;

/// Propagation control returned by a handler.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// Keep running later handlers.
    Continue,
    /// Skip the remaining handlers in the chain.
    Stop,
}

/// A boxed external handler.
pub type Handler<E> = Box<dyn FnMut(&mut E) -> Outcome>;

/// Ordered list of external handlers for one event kind.
pub struct HandlerChain<E> {
    handlers: Vec<Handler<E>>,
}

impl<E> fmt::Debug for HandlerChain<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerChain")
            .field("len", &self.handlers.len())
            .finish()
    }
}

impl<E> Default for HandlerChain<E> {
    fn default() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }
}

impl<E> HandlerChain<E> {
    /// Create an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a handler.
    pub fn push(&mut self, handler: impl FnMut(&mut E) -> Outcome + 'static) {
        self.handlers.push(Box::new(handler));
    }

    /// Builder-style [`push`](Self::push).
    #[must_use]
    pub fn with(mut self, handler: impl FnMut(&mut E) -> Outcome + 'static) -> Self {
        self.push(handler);
        self
    }

    /// Number of handlers.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Whether the chain has no handlers.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Remove every handler.
    pub fn clear(&mut self) {
        self.handlers.clear();
    }

    /// Run the chain over `event`.
    ///
    /// Returns the index of the handler that returned [`Outcome::Stop`], or
    /// `None` when every handler ran.
    pub fn run(&mut self, event: &mut E) -> Option<usize> {
        for (i, handler) in self.handlers.iter_mut().enumerate() {
            match handler(event) {
                Outcome::Continue => {}
                Outcome::Stop => return Some(i),
            }
        }
        None
    }
}

impl<E: Cancelable> HandlerChain<E> {
    /// Run the chain and report whether the engine should proceed.
    ///
    /// This is `false` when any handler prevented the default action.
    pub fn run_and_proceed(&mut self, event: &mut E) -> bool {
        self.run(event);
        !event.is_default_prevented()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{Element, Key, KeyboardEvent};
    use alloc::rc::Rc;
    use alloc::vec;
    use core::cell::RefCell;

    type Ev = KeyboardEvent<u32>;

    fn ev() -> Ev {
        KeyboardEvent::down(Key::ArrowDown, Element::Container)
    }

    #[test]
    fn handlers_run_in_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut chain: HandlerChain<Ev> = HandlerChain::new();
        for i in 0..3 {
            let seen = Rc::clone(&seen);
            chain.push(move |_| {
                seen.borrow_mut().push(i);
                Outcome::Continue
            });
        }
        assert_eq!(chain.run(&mut ev()), None);
        assert_eq!(*seen.borrow(), vec![0, 1, 2]);
    }

    #[test]
    fn stop_skips_later_handlers() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s1 = Rc::clone(&seen);
        let s2 = Rc::clone(&seen);
        let mut chain: HandlerChain<Ev> = HandlerChain::new()
            .with(move |_| {
                s1.borrow_mut().push(1);
                Outcome::Stop
            })
            .with(move |_| {
                s2.borrow_mut().push(2);
                Outcome::Continue
            });
        assert_eq!(chain.run(&mut ev()), Some(0));
        assert_eq!(*seen.borrow(), vec![1]);
    }

    #[test]
    fn prevent_default_blocks_engine() {
        let mut chain: HandlerChain<Ev> = HandlerChain::new().with(|e: &mut Ev| {
            e.prevent_default();
            Outcome::Continue
        });
        let mut e = ev();
        assert!(!chain.run_and_proceed(&mut e));

        let mut empty: HandlerChain<Ev> = HandlerChain::new();
        assert!(empty.run_and_proceed(&mut ev()));
    }
}
