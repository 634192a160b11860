// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property tests for the item registry lookups.
//!
//! 1. Grouping into rows keeps every item, in order.
//! 2. Each row is one run of equal row ids; items without a row stand alone.
//! 3. First/last enabled lookups agree with a linear scan.
//! 4. The last-row entry is the first enabled item scanning rows bottom-up.
//! 5. The registry index agrees with item positions after arbitrary removals.

use proptest::prelude::*;
use understory_composite::registry::{
    Item, ItemRegistry, find_first_enabled_item, find_first_enabled_item_in_last_row,
    find_last_enabled_item, group_items_by_rows,
};

// ── Helpers ─────────────────────────────────────────────────────────────

fn items_strategy() -> impl Strategy<Value = Vec<Item<usize>>> {
    prop::collection::vec((prop::option::of(0u8..3), any::<bool>()), 0..24).prop_map(|specs| {
        specs
            .into_iter()
            .enumerate()
            .map(|(id, (row, disabled))| {
                let item = Item::new(id).with_disabled(disabled);
                match row {
                    Some(row) => item.with_row(format!("row-{row}")),
                    None => item,
                }
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn rows_flatten_back_to_items(items in items_strategy()) {
        let rows = group_items_by_rows(&items);
        let flat: Vec<usize> = rows.iter().flat_map(|row| row.iter().map(|i| i.id)).collect();
        let expected: Vec<usize> = items.iter().map(|i| i.id).collect();
        prop_assert_eq!(flat, expected);
        prop_assert!(rows.iter().all(|row| !row.is_empty()));
    }
}

proptest! {
    #[test]
    fn rows_are_maximal_runs(items in items_strategy()) {
        let rows = group_items_by_rows(&items);
        for row in &rows {
            let first = row[0];
            if first.row_id.is_none() {
                prop_assert_eq!(row.len(), 1);
            } else {
                prop_assert!(row.iter().all(|i| i.row_id == first.row_id));
            }
        }
        for pair in rows.windows(2) {
            let prev = pair[0][pair[0].len() - 1];
            let next = pair[1][0];
            prop_assert!(prev.row_id.is_none() || prev.row_id != next.row_id);
        }
    }
}

proptest! {
    #[test]
    fn first_and_last_enabled_match_linear_scan(items in items_strategy()) {
        let first = items.iter().find(|i| !i.disabled).map(|i| i.id);
        let last = items.iter().rev().find(|i| !i.disabled).map(|i| i.id);
        prop_assert_eq!(find_first_enabled_item(&items).map(|i| i.id), first);
        prop_assert_eq!(find_last_enabled_item(&items).map(|i| i.id), last);
    }
}

proptest! {
    #[test]
    fn last_row_entry_scans_rows_bottom_up(items in items_strategy()) {
        let rows = group_items_by_rows(&items);
        let expected = rows
            .iter()
            .rev()
            .find_map(|row| row.iter().find(|i| i.is_enabled()).map(|i| i.id));
        let entry = find_first_enabled_item_in_last_row(&items).map(|i| i.id);
        prop_assert_eq!(entry, expected);
        // Entry exists exactly when some item is enabled.
        prop_assert_eq!(entry.is_some(), items.iter().any(|i| i.is_enabled()));
    }
}

proptest! {
    #[test]
    fn index_tracks_positions_after_removals(
        count in 0usize..20,
        removals in prop::collection::vec(0usize..20, 0..10),
    ) {
        let mut registry = ItemRegistry::new();
        for id in 0..count {
            registry.register(Item::new(id)).unwrap();
        }
        for id in &removals {
            let was_registered = registry.contains(id);
            prop_assert_eq!(registry.unregister(id).is_some(), was_registered);
        }
        for (position, item) in registry.items().iter().enumerate() {
            prop_assert_eq!(registry.position(&item.id), Some(position));
        }
        for id in &removals {
            prop_assert!(!registry.contains(id));
        }
    }
}
