// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The combobox engine.
//!
//! A [`Combobox`] wraps a [`Composite`] whose container is a text input. It
//! couples the typed value with the active item:
//!
//! - Printable keys stay on the input; Home and End move the caret unless the
//!   items form a grid with an active cell.
//! - Up and Down open a closed popover before they navigate.
//! - With auto-select, every text insertion (and every item list change that
//!   follows one) activates the first item.
//! - In inline modes the input displays the active item's value, or the typed
//!   value extended by a highlighted completion. That display is committed to
//!   the state when focus leaves the widget or the input is clicked.
//!
//! ## Effects
//!
//! State-derived effects run in [`Combobox::sync`], which every handler calls.
//! Call it yourself after mutating the state outside a handler (items arriving
//! asynchronously, the popover closing). The first call records the initial
//! state, and effects that react to updates do not run for it; handlers make
//! that call themselves before touching the state if nothing has yet.

use alloc::string::String;
use core::fmt::Debug;
use core::hash::Hash;

use understory_composite::composite::{Composite, CompositeAttributes};
use understory_composite::dispatcher::HandlerChain;
use understory_composite::event::{
    Cancelable, Element, FocusEvent, Key, KeyboardEvent, Modifiers,
};
use understory_composite::host::ElementHost;

use crate::completion::{completion_range, displayed_value, is_first_item_auto_selected};
use crate::event::{ChangeEvent, CompositionEvent, InputType, PRIMARY_BUTTON, PointerEvent};
use crate::options::{AutoComplete, ComboboxOptions};
use crate::state::{ComboboxState, PopupRole};

/// Effects settle in two or three passes; more means a feedback loop.
const MAX_EFFECT_PASSES: usize = 8;

/// Host operations a combobox needs beyond the composite ones.
pub trait TextInputHost<K>: ElementHost<K> {
    /// Select the `start..end` char range of the input's text.
    fn set_selection_range(&mut self, start: usize, end: usize);
}

/// External handlers for the input-specific events.
///
/// Composite events (key up, focus, blur, and the composite's own key down
/// chains) are configured through [`Combobox::composite_mut`].
#[derive(Debug)]
pub struct ComboboxHandlers<K> {
    /// Text changed.
    pub change: HandlerChain<ChangeEvent>,
    /// Composition ended.
    pub composition_end: HandlerChain<CompositionEvent>,
    /// Pointer pressed on the input.
    pub pointer_down: HandlerChain<PointerEvent>,
    /// Input clicked.
    pub click: HandlerChain<PointerEvent>,
    /// Key down, capture phase.
    pub key_down_capture: HandlerChain<KeyboardEvent<K>>,
    /// Key down, bubble phase.
    pub key_down: HandlerChain<KeyboardEvent<K>>,
}

impl<K> Default for ComboboxHandlers<K> {
    fn default() -> Self {
        Self {
            change: HandlerChain::new(),
            composition_end: HandlerChain::new(),
            pointer_down: HandlerChain::new(),
            click: HandlerChain::new(),
            key_down_capture: HandlerChain::new(),
            key_down: HandlerChain::new(),
        }
    }
}

/// Attributes the host applies to the input element.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComboboxAttributes<K> {
    /// Always `"combobox"`.
    pub role: &'static str,
    /// `aria-autocomplete`.
    pub auto_complete: AutoComplete,
    /// `aria-haspopup`.
    pub has_popup: PopupRole,
    /// `aria-expanded`.
    pub expanded: bool,
    /// `aria-controls`: id of the popover content element.
    pub controls: Option<String>,
    /// Text the input displays.
    pub value: String,
    /// Native `autocomplete`; always `"off"`.
    pub input_autocomplete: &'static str,
    /// Composite container attributes.
    pub composite: CompositeAttributes<K>,
}

/// Snapshot of everything the effects depend on.
#[derive(Clone, Debug, PartialEq, Eq)]
struct EffectDeps {
    value_updates: u64,
    value: String,
    active_value: Option<String>,
    items_revision: u64,
    auto_select: bool,
    inline: bool,
    open: bool,
}

/// Combobox engine.
#[derive(Debug)]
pub struct Combobox<K> {
    composite: Composite<K>,
    options: ComboboxOptions<K>,
    handlers: ComboboxHandlers<K>,
    /// Whether the last change inserted text.
    inserted_text: bool,
    /// Forced update counter; reruns effects when the value is textually unchanged.
    value_updates: u64,
    pending_show: bool,
    effects: Option<EffectDeps>,
}

impl<K: Clone + Eq + Hash + Debug> Default for Combobox<K> {
    fn default() -> Self {
        Self::new(ComboboxOptions::default())
    }
}

impl<K: Clone + Eq + Hash + Debug> Combobox<K> {
    /// Create an engine with the given options.
    pub fn new(options: ComboboxOptions<K>) -> Self {
        Self {
            composite: Composite::new(options.composite),
            options,
            handlers: ComboboxHandlers::default(),
            inserted_text: false,
            value_updates: 0,
            pending_show: false,
            effects: None,
        }
    }

    /// Current options.
    pub fn options(&self) -> &ComboboxOptions<K> {
        &self.options
    }

    /// Replace the options.
    pub fn set_options(&mut self, options: ComboboxOptions<K>) {
        self.composite.set_options(options.composite);
        self.options = options;
    }

    /// The underlying composite engine.
    pub fn composite(&self) -> &Composite<K> {
        &self.composite
    }

    /// The underlying composite engine, for its handler chains.
    pub fn composite_mut(&mut self) -> &mut Composite<K> {
        &mut self.composite
    }

    /// External handlers.
    pub fn handlers_mut(&mut self) -> &mut ComboboxHandlers<K> {
        &mut self.handlers
    }

    /// Effective auto-select: requested, and the state uses virtual focus.
    ///
    /// Under roving tabindex auto-select would pull real focus away from the
    /// input on every keystroke.
    pub fn auto_select(&self, state: &ComboboxState<K>) -> bool {
        self.options.auto_select && state.composite().virtual_focus()
    }

    /// Effective autocomplete mode.
    pub fn auto_complete(&self, state: &ComboboxState<K>) -> AutoComplete {
        self.options.auto_complete.unwrap_or(if state.list().is_empty() {
            AutoComplete::None
        } else {
            AutoComplete::List
        })
    }

    /// Whether the input shows the active item's value.
    pub fn is_inline(&self, state: &ComboboxState<K>) -> bool {
        self.auto_complete(state).is_inline()
    }

    /// Text the input displays.
    pub fn displayed_value(&self, state: &ComboboxState<K>) -> String {
        displayed_value(
            self.auto_complete(state),
            state.composite().items().items(),
            state.value(),
            state.active_value(),
            self.auto_select(state),
        )
    }

    /// Whether the last change inserted text.
    pub fn has_inserted_text(&self) -> bool {
        self.inserted_text
    }

    /// Whether a pointer press is waiting to open the popover.
    pub fn is_show_pending(&self) -> bool {
        self.pending_show
    }

    /// Attributes for the input element.
    pub fn attributes(&self, state: &ComboboxState<K>) -> ComboboxAttributes<K> {
        ComboboxAttributes {
            role: "combobox",
            auto_complete: self.auto_complete(state),
            has_popup: state
                .content()
                .and_then(|content| content.role)
                .unwrap_or_default(),
            expanded: state.open(),
            controls: state.content().map(|content| content.id.clone()),
            value: self.displayed_value(state),
            input_autocomplete: "off",
            composite: self.composite.attributes(state.composite()),
        }
    }

    /// Explicitly move the active item, then synchronize.
    pub fn move_to<H: TextInputHost<K>>(
        &mut self,
        state: &mut ComboboxState<K>,
        host: &mut H,
        id: Option<K>,
    ) {
        self.mount(state, host);
        state.composite_mut().move_to(id);
        self.sync(state, host);
    }

    /// Change the active item without counting a move, then synchronize.
    pub fn set_active_id<H: TextInputHost<K>>(
        &mut self,
        state: &mut ComboboxState<K>,
        host: &mut H,
        id: Option<K>,
    ) {
        self.mount(state, host);
        state.composite_mut().set_active_id(id);
        self.sync(state, host);
    }

    /// Record the initial state if no [`sync`](Self::sync) has run yet.
    fn mount<H: TextInputHost<K>>(&mut self, state: &mut ComboboxState<K>, host: &mut H) {
        if self.effects.is_none() {
            self.sync(state, host);
        }
    }

    /// Run the effects derived from state changes since the last call, then
    /// the composite's.
    pub fn sync<H: TextInputHost<K>>(&mut self, state: &mut ComboboxState<K>, host: &mut H) {
        let mut settled = false;
        for _ in 0..MAX_EFFECT_PASSES {
            let deps = self.effect_deps(state);
            if self.effects.as_ref() == Some(&deps) {
                settled = true;
                break;
            }
            let previous = self.effects.take();
            self.run_effects(state, host, previous.as_ref(), &deps);
            self.effects = Some(deps);
        }
        if !settled {
            tracing::debug!("combobox effects did not settle");
        }
        self.composite.sync(state.composite(), host);
    }

    /// Run deferred work: a pending pointer-down show, then the composite's.
    pub fn flush<H: TextInputHost<K>>(&mut self, state: &mut ComboboxState<K>, host: &mut H) {
        self.mount(state, host);
        if core::mem::take(&mut self.pending_show) {
            state.show();
            self.sync(state, host);
        }
        self.composite.flush(state.composite(), host);
    }

    /// The input's text changed.
    pub fn on_change<H: TextInputHost<K>>(
        &mut self,
        state: &mut ComboboxState<K>,
        host: &mut H,
        event: &mut ChangeEvent,
    ) {
        self.mount(state, host);
        if !self.handlers.change.run_and_proceed(event) {
            return;
        }
        if let Some(input_type) = event.input_type {
            self.inserted_text = input_type == InputType::InsertText;
        }
        if self.options.show_on_change.evaluate(event) {
            state.show();
        }
        if self.options.set_value_on_change.evaluate(event) {
            state.set_value(event.value.as_str());
        }
        let auto_select = self.auto_select(state);
        // Retyping the same text after a completion leaves the value unchanged
        // but must still rerun the highlight.
        if auto_select && self.is_inline(state) {
            self.value_updates += 1;
        }
        if !auto_select || !self.inserted_text {
            state.composite_mut().set_active_id(None);
        }
        self.sync(state, host);
    }

    /// An input method composition ended.
    ///
    /// Platforms disagree on the edit kind reported for composed text, so a
    /// composition always counts as an insertion.
    pub fn on_composition_end<H: TextInputHost<K>>(
        &mut self,
        state: &mut ComboboxState<K>,
        host: &mut H,
        event: &mut CompositionEvent,
    ) {
        self.mount(state, host);
        if !self.handlers.composition_end.run_and_proceed(event) {
            return;
        }
        self.inserted_text = true;
        if !self.auto_select(state) {
            return;
        }
        self.value_updates += 1;
        self.sync(state, host);
    }

    /// Pointer pressed on the input.
    ///
    /// Opening waits for the matching [`on_pointer_up`](Self::on_pointer_up)
    /// (or the next [`flush`](Self::flush)) so the press can still place the
    /// caret or start a text selection.
    pub fn on_pointer_down(&mut self, state: &ComboboxState<K>, event: &mut PointerEvent) {
        if !self.handlers.pointer_down.run_and_proceed(event) {
            return;
        }
        if event.button != PRIMARY_BUTTON || !event.modifiers.is_empty() {
            return;
        }
        if !self.options.show_on_pointer_down.evaluate(event) {
            return;
        }
        tracing::trace!(open = state.open(), "show deferred until pointer up");
        self.pending_show = true;
    }

    /// Pointer released: open the popover if a press asked for it.
    pub fn on_pointer_up<H: TextInputHost<K>>(
        &mut self,
        state: &mut ComboboxState<K>,
        host: &mut H,
    ) {
        self.mount(state, host);
        if core::mem::take(&mut self.pending_show) {
            state.show();
            self.sync(state, host);
        }
    }

    /// Input clicked: focus returns to the input and the display is committed.
    pub fn on_click<H: TextInputHost<K>>(
        &mut self,
        state: &mut ComboboxState<K>,
        host: &mut H,
        event: &mut PointerEvent,
    ) {
        self.mount(state, host);
        if !self.handlers.click.run_and_proceed(event) {
            return;
        }
        let displayed = self.displayed_value(state);
        state.composite_mut().set_active_id(None);
        if self.options.set_value_on_click.evaluate(event) {
            state.set_value(displayed);
        }
        self.sync(state, host);
    }

    /// Key down, capture phase.
    ///
    /// Keeps typing and caret movement on the input, then lets the composite
    /// proxy whatever remains to the active item.
    pub fn on_key_down_capture<H: TextInputHost<K>>(
        &mut self,
        state: &ComboboxState<K>,
        host: &mut H,
        event: &mut KeyboardEvent<K>,
    ) {
        if self.handlers.key_down_capture.run_and_proceed(event) {
            if is_printable_key(event) {
                event.stop_propagation();
            } else {
                let has_rows = state
                    .composite()
                    .items()
                    .items()
                    .iter()
                    .any(|item| item.row_id.is_some());
                let focusing_input_only = state.composite().active_id().is_none();
                let navigates_items = has_rows && !focusing_input_only;
                if !navigates_items && matches!(event.key, Key::Home | Key::End) {
                    event.stop_propagation();
                }
            }
        }
        self.composite
            .on_key_down_capture(state.composite(), host, event);
    }

    /// Key down, bubble phase.
    ///
    /// Up or Down on a closed popover with nothing active opens it instead of
    /// moving the caret.
    pub fn on_key_down<H: TextInputHost<K>>(
        &mut self,
        state: &mut ComboboxState<K>,
        host: &mut H,
        event: &mut KeyboardEvent<K>,
    ) {
        self.mount(state, host);
        let proceed = self.handlers.key_down.run_and_proceed(event);
        self.inserted_text = false;
        if proceed
            && event.modifiers.is_empty()
            && !state.open()
            && state.composite().active_id().is_none()
            && matches!(event.key, Key::ArrowUp | Key::ArrowDown)
            && self.options.show_on_key_down.evaluate(event)
        {
            event.prevent_default();
            state.show();
        }
        self.composite
            .on_key_down(state.composite_mut(), host, event);
        self.sync(state, host);
    }

    /// Key up, capture phase.
    pub fn on_key_up_capture<H: TextInputHost<K>>(
        &mut self,
        state: &ComboboxState<K>,
        host: &mut H,
        event: &mut KeyboardEvent<K>,
    ) {
        self.composite
            .on_key_up_capture(state.composite(), host, event);
    }

    /// Focus, capture phase.
    pub fn on_focus_capture<H: TextInputHost<K>>(
        &mut self,
        state: &ComboboxState<K>,
        host: &mut H,
        event: &mut FocusEvent<K>,
    ) {
        self.composite
            .on_focus_capture(state.composite(), host, event);
    }

    /// Focus, bubble phase.
    pub fn on_focus<H: TextInputHost<K>>(
        &mut self,
        state: &mut ComboboxState<K>,
        host: &mut H,
        event: &mut FocusEvent<K>,
    ) {
        self.mount(state, host);
        self.composite.on_focus(state.composite_mut(), host, event);
        self.sync(state, host);
    }

    /// Blur, capture phase.
    pub fn on_blur_capture<H: TextInputHost<K>>(
        &mut self,
        state: &ComboboxState<K>,
        host: &mut H,
        event: &mut FocusEvent<K>,
    ) {
        self.composite
            .on_blur_capture(state.composite(), host, event);
    }

    /// Focus left the input or the popover content element.
    ///
    /// In inline modes, focus leaving both commits the displayed value.
    pub fn on_focus_out<H: TextInputHost<K>>(
        &mut self,
        state: &mut ComboboxState<K>,
        host: &mut H,
        event: &FocusEvent<K>,
    ) {
        self.mount(state, host);
        if !self.is_inline(state) {
            return;
        }
        let outside = match &event.related_target {
            None | Some(Element::Outside) => true,
            Some(Element::Container) => false,
            // Items render inside the popover content.
            Some(Element::Popover | Element::Item(_)) => state.content().is_none(),
        };
        if !outside {
            return;
        }
        let displayed = self.displayed_value(state);
        tracing::debug!(value = ?displayed, "committing displayed value");
        state.set_value(displayed);
        self.sync(state, host);
    }

    /// Key down through both phases.
    pub fn dispatch_key_down<H: TextInputHost<K>>(
        &mut self,
        state: &mut ComboboxState<K>,
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
    pub fn dispatch_key_up<H: TextInputHost<K>>(
        &mut self,
        state: &ComboboxState<K>,
        host: &mut H,
        event: &mut KeyboardEvent<K>,
    ) {
        self.on_key_up_capture(state, host, event);
    }

    /// Focus through both phases.
    pub fn dispatch_focus<H: TextInputHost<K>>(
        &mut self,
        state: &mut ComboboxState<K>,
        host: &mut H,
        event: &mut FocusEvent<K>,
    ) {
        self.on_focus_capture(state, host, event);
        if event.is_propagation_stopped() {
            return;
        }
        self.on_focus(state, host, event);
    }

    /// Blur of the input, through capture and focus-out.
    ///
    /// The commit check sees every blur, including ones the composite stopped.
    pub fn dispatch_blur<H: TextInputHost<K>>(
        &mut self,
        state: &mut ComboboxState<K>,
        host: &mut H,
        event: &mut FocusEvent<K>,
    ) {
        self.on_blur_capture(state, host, event);
        self.on_focus_out(state, host, event);
    }

    fn effect_deps(&self, state: &ComboboxState<K>) -> EffectDeps {
        EffectDeps {
            value_updates: self.value_updates,
            value: state.value().into(),
            active_value: state.active_value().map(Into::into),
            items_revision: state.composite().items().revision(),
            auto_select: self.auto_select(state),
            inline: self.is_inline(state),
            open: state.open(),
        }
    }

    /// Effects in order. `previous` is `None` on the first sync, where only
    /// the effects that also run at mount fire.
    fn run_effects<H: TextInputHost<K>>(
        &mut self,
        state: &mut ComboboxState<K>,
        host: &mut H,
        previous: Option<&EffectDeps>,
        deps: &EffectDeps,
    ) {
        // A closed popover must not auto-select on the next item change.
        if previous.is_none_or(|p| p.open != deps.open) && !deps.open {
            self.inserted_text = false;
        }

        let highlight_changed = previous.is_none_or(|p| {
            p.value_updates != deps.value_updates
                || p.inline != deps.inline
                || p.active_value != deps.active_value
                || p.items_revision != deps.items_revision
                || p.auto_select != deps.auto_select
                || p.value != deps.value
        });
        if highlight_changed {
            Self::highlight_completion(state, host, deps);
        }

        let Some(previous) = previous else {
            return;
        };

        let value_changed =
            previous.value_updates != deps.value_updates || previous.value != deps.value;

        // Also reacts to item changes, so items that arrive after the
        // keystroke are still auto-selected.
        if (value_changed
            || previous.auto_select != deps.auto_select
            || previous.items_revision != deps.items_revision)
            && deps.auto_select
            && !state.composite().items().is_empty()
            && self.inserted_text
        {
            let first = state.composite().first();
            tracing::trace!(item = ?first, "auto-selecting first item");
            state.composite_mut().move_to(first);
        }

        if (value_changed || previous.auto_select != deps.auto_select) && !deps.auto_select {
            state.composite_mut().set_active_id(None);
        }
    }

    fn highlight_completion<H: TextInputHost<K>>(
        state: &ComboboxState<K>,
        host: &mut H,
        deps: &EffectDeps,
    ) {
        if !deps.inline {
            return;
        }
        let Some(active_value) = deps.active_value.as_deref() else {
            return;
        };
        let items = state.composite().items().items();
        if !is_first_item_auto_selected(items, Some(active_value), deps.auto_select) {
            return;
        }
        let Some((start, end)) = completion_range(&deps.value, active_value) else {
            return;
        };
        tracing::trace!(start, end, "highlighting completion");
        host.set_selection_range(start, end);
    }
}

fn is_printable_key<K>(event: &KeyboardEvent<K>) -> bool {
    event.key.is_character() && !event.modifiers.intersects(Modifiers::CONTROL | Modifiers::META)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::Gate;
    use crate::state::PopupContent;
    use alloc::vec::Vec;
    use understory_composite::event::FocusEventKind;
    use understory_composite::host::FocusOptions;
    use understory_composite::registry::Item;

    type Id = &'static str;

    #[derive(Clone, Debug, PartialEq, Eq)]
    enum Call {
        Focus(Element<Id>),
        Key(Id, Key),
        Blur(Element<Id>),
        Select(usize, usize),
    }

    #[derive(Debug, Default)]
    struct InputHost {
        calls: Vec<Call>,
    }

    impl InputHost {
        fn selection(&self) -> Option<(usize, usize)> {
            self.calls.iter().rev().find_map(|c| match c {
                Call::Select(start, end) => Some((*start, *end)),
                _ => None,
            })
        }

        fn proxied(&self) -> Vec<Key> {
            self.calls
                .iter()
                .filter_map(|c| match c {
                    Call::Key(_, key) => Some(*key),
                    _ => None,
                })
                .collect()
        }
    }

    impl ElementHost<Id> for InputHost {
        fn is_mounted(&self, _id: &Id) -> bool {
            true
        }

        fn focus(&mut self, element: &Element<Id>, _options: FocusOptions) {
            self.calls.push(Call::Focus(element.clone()));
        }

        fn scroll_into_view(&mut self, _id: &Id) {}

        fn dispatch_keyboard_event(&mut self, id: &Id, event: &KeyboardEvent<Id>) -> bool {
            self.calls.push(Call::Key(id, event.key));
            true
        }

        fn dispatch_focus_event(&mut self, element: &Element<Id>, event: &FocusEvent<Id>) {
            if event.kind == FocusEventKind::Blur {
                self.calls.push(Call::Blur(element.clone()));
            }
        }

        fn active_element(&self) -> Option<Element<Id>> {
            Some(Element::Container)
        }

        // Items live in the popover, outside the input.
        fn container_contains(&self, _id: &Id) -> bool {
            false
        }
    }

    impl TextInputHost<Id> for InputHost {
        fn set_selection_range(&mut self, start: usize, end: usize) {
            self.calls.push(Call::Select(start, end));
        }
    }

    fn frameworks() -> ComboboxState<Id> {
        let mut state = ComboboxState::new();
        for (id, value) in [("react", "React"), ("redux", "Redux")] {
            state
                .composite_mut()
                .items_mut()
                .register(Item::new(id).with_value(value))
                .unwrap();
        }
        state
    }

    fn mounted(
        options: ComboboxOptions<Id>,
        state: &mut ComboboxState<Id>,
    ) -> (Combobox<Id>, InputHost) {
        let mut combobox = Combobox::new(options);
        let mut host = InputHost::default();
        combobox.sync(state, &mut host);
        (combobox, host)
    }

    fn inline_auto_select() -> ComboboxOptions<Id> {
        ComboboxOptions::default()
            .with_auto_complete(AutoComplete::Inline)
            .with_auto_select(true)
    }

    fn type_text(
        combobox: &mut Combobox<Id>,
        state: &mut ComboboxState<Id>,
        host: &mut InputHost,
        text: &str,
    ) {
        combobox.on_change(state, host, &mut ChangeEvent::typed(text));
    }

    fn key(
        combobox: &mut Combobox<Id>,
        state: &mut ComboboxState<Id>,
        host: &mut InputHost,
        ev: KeyboardEvent<Id>,
    ) -> KeyboardEvent<Id> {
        let mut ev = ev;
        combobox.dispatch_key_down(state, host, &mut ev);
        ev
    }

    #[test]
    fn inline_auto_select_completes_first_item() {
        let mut state = frameworks();
        let (mut combobox, mut host) = mounted(inline_auto_select(), &mut state);

        type_text(&mut combobox, &mut state, &mut host, "r");
        assert!(state.open());
        assert_eq!(state.value(), "r");
        assert_eq!(state.composite().active_id(), Some(&"react"));
        assert_eq!(combobox.displayed_value(&state), "react");
        assert_eq!(host.selection(), Some((1, 5)));
        assert!(combobox.composite().is_focus_scheduled());
    }

    #[test]
    fn first_keystroke_auto_selects_without_prior_sync() {
        let mut state = frameworks();
        let mut combobox = Combobox::new(inline_auto_select());
        let mut host = InputHost::default();

        type_text(&mut combobox, &mut state, &mut host, "r");
        assert_eq!(state.composite().active_id(), Some(&"react"));
        assert_eq!(combobox.displayed_value(&state), "react");
        assert_eq!(host.selection(), Some((1, 5)));
    }

    #[test]
    fn retyping_same_text_rehighlights() {
        let mut state = frameworks();
        let (mut combobox, mut host) = mounted(inline_auto_select(), &mut state);
        type_text(&mut combobox, &mut state, &mut host, "r");
        host.calls.clear();

        type_text(&mut combobox, &mut state, &mut host, "r");
        assert_eq!(host.selection(), Some((1, 5)));
    }

    #[test]
    fn deletion_returns_focus_to_input() {
        let mut state = frameworks();
        let (mut combobox, mut host) = mounted(inline_auto_select(), &mut state);
        type_text(&mut combobox, &mut state, &mut host, "re");

        let mut ev = ChangeEvent::new("r").with_input_type(InputType::DeleteContentBackward);
        combobox.on_change(&mut state, &mut host, &mut ev);
        assert_eq!(state.composite().active_id(), None);
        assert_eq!(combobox.displayed_value(&state), "r");
    }

    #[test]
    fn list_mode_keeps_typed_text() {
        let mut state = frameworks();
        let options = ComboboxOptions::default()
            .with_auto_complete(AutoComplete::List)
            .with_auto_select(true);
        let (mut combobox, mut host) = mounted(options, &mut state);

        type_text(&mut combobox, &mut state, &mut host, "r");
        assert_eq!(state.composite().active_id(), Some(&"react"));
        assert_eq!(combobox.displayed_value(&state), "r");
        assert_eq!(host.selection(), None);
    }

    #[test]
    fn without_auto_select_typing_clears_active_item() {
        let mut state = frameworks();
        let (mut combobox, mut host) = mounted(ComboboxOptions::default(), &mut state);
        combobox.set_active_id(&mut state, &mut host, Some("redux"));

        type_text(&mut combobox, &mut state, &mut host, "x");
        assert_eq!(state.composite().active_id(), None);
    }

    #[test]
    fn auto_select_requires_virtual_focus() {
        let mut state = frameworks();
        state.composite_mut().set_virtual_focus(false);
        let (mut combobox, mut host) = mounted(inline_auto_select(), &mut state);
        assert!(!combobox.auto_select(&state));

        type_text(&mut combobox, &mut state, &mut host, "r");
        assert_eq!(state.composite().active_id(), None);
    }

    #[test]
    fn late_items_are_auto_selected() {
        let mut state = ComboboxState::new();
        let options = ComboboxOptions::default()
            .with_auto_complete(AutoComplete::List)
            .with_auto_select(true);
        let (mut combobox, mut host) = mounted(options, &mut state);
        type_text(&mut combobox, &mut state, &mut host, "r");
        assert_eq!(state.composite().active_id(), None);

        state
            .composite_mut()
            .items_mut()
            .register(Item::new("rust").with_value("Rust"))
            .unwrap();
        combobox.sync(&mut state, &mut host);
        assert_eq!(state.composite().active_id(), Some(&"rust"));
    }

    #[test]
    fn closing_popover_stops_auto_select() {
        let mut state = frameworks();
        let (mut combobox, mut host) = mounted(inline_auto_select(), &mut state);
        type_text(&mut combobox, &mut state, &mut host, "r");
        let moves = state.composite().moves();

        state.hide();
        combobox.sync(&mut state, &mut host);
        assert!(!combobox.has_inserted_text());

        state
            .composite_mut()
            .items_mut()
            .register(Item::new("ruby").with_value("Ruby"))
            .unwrap();
        combobox.sync(&mut state, &mut host);
        assert_eq!(state.composite().moves(), moves);
    }

    #[test]
    fn composition_end_counts_as_insertion() {
        let mut state = frameworks();
        let (mut combobox, mut host) = mounted(inline_auto_select(), &mut state);
        let mut ev = ChangeEvent::new("r").with_input_type(InputType::InsertCompositionText);
        combobox.on_change(&mut state, &mut host, &mut ev);
        assert_eq!(state.composite().active_id(), None);

        combobox.on_composition_end(&mut state, &mut host, &mut CompositionEvent::new("r"));
        assert!(combobox.has_inserted_text());
        assert_eq!(state.composite().active_id(), Some(&"react"));
        assert_eq!(host.selection(), Some((1, 5)));
    }

    #[test]
    fn printable_keys_stay_on_input() {
        let mut state = frameworks();
        let (mut combobox, mut host) = mounted(inline_auto_select(), &mut state);
        type_text(&mut combobox, &mut state, &mut host, "r");
        host.calls.clear();

        let ev = key(
            &mut combobox,
            &mut state,
            &mut host,
            KeyboardEvent::down(Key::Character('a'), Element::Container),
        );
        assert!(ev.is_propagation_stopped());
        assert!(host.proxied().is_empty());

        // Shortcuts are not typing.
        let ev = key(
            &mut combobox,
            &mut state,
            &mut host,
            KeyboardEvent::down(Key::Character('a'), Element::Container)
                .with_modifiers(Modifiers::CONTROL),
        );
        assert!(!ev.is_propagation_stopped());
        assert_eq!(host.proxied(), [Key::Character('a')]);
    }

    #[test]
    fn home_and_end_move_caret_without_grid() {
        let mut state = frameworks();
        let (mut combobox, mut host) = mounted(inline_auto_select(), &mut state);
        type_text(&mut combobox, &mut state, &mut host, "r");
        host.calls.clear();

        for k in [Key::Home, Key::End] {
            let ev = key(
                &mut combobox,
                &mut state,
                &mut host,
                KeyboardEvent::down(k, Element::Container),
            );
            assert!(ev.is_propagation_stopped());
        }
        assert!(host.proxied().is_empty());
        assert_eq!(state.composite().active_id(), Some(&"react"));
    }

    #[test]
    fn home_reaches_grid_only_with_active_cell() {
        let mut state: ComboboxState<Id> = ComboboxState::new();
        for (id, row) in [("a", "1"), ("b", "1"), ("c", "2")] {
            state
                .composite_mut()
                .items_mut()
                .register(Item::new(id).with_row(row).with_value(id))
                .unwrap();
        }
        let (mut combobox, mut host) = mounted(ComboboxOptions::default(), &mut state);

        let ev = key(
            &mut combobox,
            &mut state,
            &mut host,
            KeyboardEvent::down(Key::Home, Element::Container),
        );
        assert!(ev.is_propagation_stopped());
        assert_eq!(state.composite().active_id(), None);

        combobox.set_active_id(&mut state, &mut host, Some("b"));
        key(
            &mut combobox,
            &mut state,
            &mut host,
            KeyboardEvent::down(Key::Home, Element::Container),
        );
        assert_eq!(host.proxied(), [Key::Home]);
    }

    #[test]
    fn arrow_opens_closed_popover_before_navigating() {
        let mut state = frameworks();
        let (mut combobox, mut host) = mounted(ComboboxOptions::default(), &mut state);

        let ev = key(
            &mut combobox,
            &mut state,
            &mut host,
            KeyboardEvent::down(Key::ArrowDown, Element::Container),
        );
        assert!(ev.is_default_prevented());
        assert!(state.open());
        assert_eq!(state.composite().active_id(), None);

        key(
            &mut combobox,
            &mut state,
            &mut host,
            KeyboardEvent::down(Key::ArrowDown, Element::Container),
        );
        assert_eq!(state.composite().active_id(), Some(&"react"));
    }

    #[test]
    fn arrow_with_modifier_or_closed_gate_enters_list() {
        let mut state = frameworks();
        let options = ComboboxOptions::default().with_show_on_key_down(Gate::predicate(
            |ev: &KeyboardEvent<Id>| ev.key == Key::ArrowUp,
        ));
        let (mut combobox, mut host) = mounted(options, &mut state);

        key(
            &mut combobox,
            &mut state,
            &mut host,
            KeyboardEvent::down(Key::ArrowDown, Element::Container)
                .with_modifiers(Modifiers::SHIFT),
        );
        assert!(!state.open());
        assert_eq!(state.composite().active_id(), Some(&"react"));

        combobox.set_active_id(&mut state, &mut host, None);
        // The gate refuses ArrowDown, so the composite enters the list instead.
        key(
            &mut combobox,
            &mut state,
            &mut host,
            KeyboardEvent::down(Key::ArrowDown, Element::Container),
        );
        assert!(!state.open());
        assert_eq!(state.composite().active_id(), Some(&"react"));

        key(
            &mut combobox,
            &mut state,
            &mut host,
            KeyboardEvent::down(Key::ArrowUp, Element::Container),
        );
        assert!(!state.open());
        combobox.set_active_id(&mut state, &mut host, None);
        key(
            &mut combobox,
            &mut state,
            &mut host,
            KeyboardEvent::down(Key::ArrowUp, Element::Container),
        );
        assert!(state.open());
    }

    #[test]
    fn navigation_key_clears_insertion_flag() {
        let mut state = frameworks();
        let (mut combobox, mut host) = mounted(inline_auto_select(), &mut state);
        type_text(&mut combobox, &mut state, &mut host, "r");
        assert!(combobox.has_inserted_text());
        host.calls.clear();

        key(
            &mut combobox,
            &mut state,
            &mut host,
            KeyboardEvent::down(Key::ArrowDown, Element::Container),
        );
        assert!(!combobox.has_inserted_text());
        // Proxied to the active item, which never had real focus.
        assert_eq!(
            host.calls[..2],
            [Call::Focus(Element::Item("react")), Call::Key("react", Key::ArrowDown)]
        );
    }

    #[test]
    fn pointer_down_defers_show_until_pointer_up() {
        let mut state = frameworks();
        let (mut combobox, mut host) = mounted(ComboboxOptions::default(), &mut state);

        combobox.on_pointer_down(&state, &mut PointerEvent::new(2));
        combobox.on_pointer_down(
            &state,
            &mut PointerEvent::primary().with_modifiers(Modifiers::CONTROL),
        );
        combobox.on_pointer_down(
            &state,
            &mut PointerEvent::primary().with_modifiers(Modifiers::SHIFT),
        );
        assert!(!combobox.is_show_pending());

        combobox.on_pointer_down(&state, &mut PointerEvent::primary());
        assert!(combobox.is_show_pending());
        assert!(!state.open());
        combobox.on_pointer_up(&mut state, &mut host);
        assert!(state.open());

        state.hide();
        combobox.on_pointer_down(&state, &mut PointerEvent::primary());
        combobox.flush(&mut state, &mut host);
        assert!(state.open());
        assert!(!combobox.is_show_pending());
    }

    #[test]
    fn click_commits_displayed_value() {
        let mut state = frameworks();
        let (mut combobox, mut host) = mounted(inline_auto_select(), &mut state);
        type_text(&mut combobox, &mut state, &mut host, "r");

        combobox.on_click(&mut state, &mut host, &mut PointerEvent::primary());
        assert_eq!(state.value(), "react");
        assert_eq!(combobox.displayed_value(&state), "react");
    }

    #[test]
    fn click_without_commit_only_clears_active_item() {
        let mut state = frameworks();
        let options = inline_auto_select().with_set_value_on_click(false);
        let (mut combobox, mut host) = mounted(options, &mut state);
        type_text(&mut combobox, &mut state, &mut host, "r");

        combobox.on_click(&mut state, &mut host, &mut PointerEvent::primary());
        assert_eq!(state.value(), "r");
        assert_eq!(state.composite().active_id(), None);
    }

    #[test]
    fn leaving_widget_commits_inline_value() {
        let mut state = frameworks();
        let (mut combobox, mut host) = mounted(inline_auto_select(), &mut state);
        type_text(&mut combobox, &mut state, &mut host, "r");

        let mut ev = FocusEvent::blur(Element::Container, Some(Element::Outside));
        combobox.dispatch_blur(&mut state, &mut host, &mut ev);
        assert_eq!(state.value(), "react");
        assert!(host.calls.contains(&Call::Blur(Element::Item("react"))));
    }

    #[test]
    fn moving_into_popover_does_not_commit() {
        let mut state = frameworks();
        state.set_content(Some(PopupContent::new("listbox-1")));
        let (mut combobox, mut host) = mounted(inline_auto_select(), &mut state);
        type_text(&mut combobox, &mut state, &mut host, "r");

        let mut ev = FocusEvent::blur(Element::Container, Some(Element::Popover));
        combobox.dispatch_blur(&mut state, &mut host, &mut ev);
        assert_eq!(state.value(), "r");
    }

    #[test]
    fn leaving_popover_commits_inline_value() {
        let mut state = frameworks();
        state.set_content(Some(PopupContent::new("listbox-1")));
        let (mut combobox, mut host) = mounted(inline_auto_select(), &mut state);
        type_text(&mut combobox, &mut state, &mut host, "r");

        // Back to the input: still inside the widget.
        let ev = FocusEvent::blur(Element::Popover, Some(Element::Container));
        combobox.on_focus_out(&mut state, &mut host, &ev);
        assert_eq!(state.value(), "r");

        let ev = FocusEvent::blur(Element::Popover, Some(Element::Outside));
        combobox.on_focus_out(&mut state, &mut host, &ev);
        assert_eq!(state.value(), "react");
    }

    #[test]
    fn list_mode_never_commits_on_blur() {
        let mut state = frameworks();
        let (mut combobox, mut host) = mounted(ComboboxOptions::default(), &mut state);
        type_text(&mut combobox, &mut state, &mut host, "r");
        let mut ev = FocusEvent::blur(Element::Container, None);
        combobox.dispatch_blur(&mut state, &mut host, &mut ev);
        assert_eq!(state.value(), "r");
    }

    #[test]
    fn external_change_handler_can_take_over() {
        let mut state = frameworks();
        let (mut combobox, mut host) = mounted(inline_auto_select(), &mut state);
        combobox.handlers_mut().change.push(|ev| {
            ev.prevent_default();
            understory_composite::dispatcher::Outcome::Stop
        });
        type_text(&mut combobox, &mut state, &mut host, "r");
        assert_eq!(state.value(), "");
        assert!(!state.open());
    }

    #[test]
    fn attributes_reflect_state() {
        let mut state = frameworks();
        let (mut combobox, mut host) = mounted(inline_auto_select(), &mut state);
        let attrs = combobox.attributes(&state);
        assert_eq!(attrs.role, "combobox");
        assert_eq!(attrs.auto_complete, AutoComplete::Inline);
        assert_eq!(attrs.has_popup, PopupRole::Listbox);
        assert_eq!(attrs.controls, None);
        assert_eq!(attrs.input_autocomplete, "off");
        assert!(!attrs.expanded);

        state.set_content(Some(PopupContent::new("menu-1").with_role(PopupRole::Dialog)));
        type_text(&mut combobox, &mut state, &mut host, "r");
        let attrs = combobox.attributes(&state);
        assert!(attrs.expanded);
        assert_eq!(attrs.has_popup, PopupRole::Dialog);
        assert_eq!(attrs.controls.as_deref(), Some("menu-1"));
        assert_eq!(attrs.value, "react");
        assert_eq!(attrs.composite.active_descendant, Some("react"));
    }

    #[test]
    fn auto_complete_defaults_from_list() {
        let combobox: Combobox<Id> = Combobox::default();
        let state: ComboboxState<Id> = ComboboxState::new();
        assert_eq!(combobox.auto_complete(&state), AutoComplete::None);
        let state: ComboboxState<Id> = ComboboxState::new().with_list(["a"]);
        assert_eq!(combobox.auto_complete(&state), AutoComplete::List);
    }
}
