// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Inline completion: what the input displays and which part is highlighted.
//!
//! All functions here are pure. Offsets are in `char`s.
//!
//! ```rust
//! use understory_combobox::completion::{completion_range, has_completion_string};
//!
//! assert!(has_completion_string("re", "React"));
//! assert!(!has_completion_string("React", "re"));
//! assert_eq!(completion_range("r", "React"), Some((1, 5)));
//! ```

use alloc::string::String;

use understory_composite::registry::Item;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use crate::options::AutoComplete;

/// Decompose `value` and drop combining diacritical marks.
///
/// `"Crème brûlée"` becomes `"Creme brulee"`.
pub fn normalize_string(value: &str) -> String {
    value
        .nfd()
        .filter(|c| !('\u{0300}'..='\u{036f}').contains(c))
        .collect()
}

/// Like [`normalize_string`], but drops every combining mark.
///
/// Used for filtering, where marks outside the Latin diacritics block should
/// not affect matching either.
pub fn fold_for_matching(value: &str) -> String {
    value
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Whether `active_value` extends the typed `value`.
///
/// The active value must be strictly longer than the normalized typed value,
/// and start with it ignoring case.
pub fn has_completion_string(value: &str, active_value: &str) -> bool {
    if active_value.is_empty() {
        return false;
    }
    let value = normalize_string(value);
    active_value.chars().count() > value.chars().count()
        && active_value.to_lowercase().starts_with(&value.to_lowercase())
}

/// Whether the first enabled item with a value is the active one.
pub fn is_first_item_auto_selected<K>(
    items: &[Item<K>],
    active_value: Option<&str>,
    auto_select: bool,
) -> bool {
    if !auto_select {
        return false;
    }
    let first = items
        .iter()
        .find(|item| item.is_enabled() && item.value.as_deref().is_some_and(|v| !v.is_empty()));
    first.and_then(|item| item.value.as_deref()) == active_value
}

/// Text the input should display.
///
/// Outside inline modes this is the typed value. In inline modes, an
/// auto-selected first item extends the typed value with its completion
/// suffix; any other active item replaces the typed value.
pub fn displayed_value<K>(
    auto_complete: AutoComplete,
    items: &[Item<K>],
    value: &str,
    active_value: Option<&str>,
    auto_select: bool,
) -> String {
    if !auto_complete.is_inline() {
        return value.into();
    }
    if is_first_item_auto_selected(items, active_value, auto_select) {
        let Some(active) = active_value else {
            return value.into();
        };
        if has_completion_string(value, active) {
            let mut out = String::from(value);
            out.extend(active.chars().skip(value.chars().count()));
            return out;
        }
        return value.into();
    }
    match active_value {
        Some(active) if !active.is_empty() => active.into(),
        _ => value.into(),
    }
}

/// Char range of the completion suffix to select in the input.
///
/// `None` when `active_value` does not extend `value`.
pub fn completion_range(value: &str, active_value: &str) -> Option<(usize, usize)> {
    has_completion_string(value, active_value)
        .then(|| (value.chars().count(), active_value.chars().count()))
}
