//! Property-based invariant tests for fragment transformations.
//!
//! 1. Equivalence is reflexive and symmetric.
//! 2. No transformation mutates its input.
//! 3. Every transformation keeps the leaves and their order.
//! 4. Swapping twice gives back an equivalent fragment.
//! 5. Column split of a single-child run yields nothing.

use alm_core::{Area, Direction, Fragment, Item};
use alm_trafo::{all_transformations, apply_at, ColumnTrafo, FragmentRef, SwapTrafo, Transformation};
use proptest::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────────

fn leaf_strategy() -> impl Strategy<Value = Item> {
    prop::sample::select(vec!["TextView", "EditText", "Button", "ImageView"])
        .prop_map(|key| Item::Area(Area::new().with_id(key)))
}

fn direction_strategy() -> impl Strategy<Value = Direction> {
    prop::bool::ANY.prop_map(|h| if h { Direction::Horizontal } else { Direction::Vertical })
}

fn fragment_strategy() -> impl Strategy<Value = Fragment> {
    let leaf_run = (direction_strategy(), prop::collection::vec(leaf_strategy(), 0..6))
        .prop_map(|(direction, items)| Fragment::with_items(direction, items));
    leaf_run.prop_recursive(3, 24, 5, |inner| {
        (
            direction_strategy(),
            prop::collection::vec(
                prop_oneof![leaf_strategy(), inner.prop_map(Item::Fragment)],
                0..5,
            ),
        )
            .prop_map(|(direction, items)| Fragment::with_items(direction, items))
    })
}

fn leaf_keys(fragment: &Fragment) -> Vec<String> {
    fragment.areas().iter().map(|a| a.key().to_string()).collect()
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Equivalence is reflexive and symmetric
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn equivalence_reflexive_and_symmetric(a in fragment_strategy(), b in fragment_strategy()) {
        prop_assert!(a.is_equivalent(&a));
        prop_assert!(a.is_equivalent(&a.clone()));
        prop_assert_eq!(a.is_equivalent(&b), b.is_equivalent(&a));
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2 + 3. Purity and leaf order
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn transformations_are_pure(root in fragment_strategy()) {
        let snapshot = root.clone();
        let keys = leaf_keys(&root);
        for trafo in all_transformations() {
            for target in FragmentRef::targets(&root) {
                let out = apply_at(trafo.as_ref(), &root, &target).unwrap();
                prop_assert_eq!(&root, &snapshot, "{} mutated its input", trafo.name());
                for alternative in out {
                    prop_assert_eq!(leaf_keys(&alternative.fragment), keys.clone());
                    prop_assert!(!alternative.fragment.is_equivalent(&root));
                }
            }
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Swap involution
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn swap_twice_is_equivalent(root in fragment_strategy()) {
        if let Some(once) = SwapTrafo.apply(&root).pop() {
            let twice = SwapTrafo.apply(&once.fragment).pop();
            prop_assert!(twice.is_some());
            prop_assert!(twice.unwrap().fragment.is_equivalent(&root));
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5. Column split precondition
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn column_split_of_single_child_is_empty(child in prop_oneof![
        leaf_strategy(),
        fragment_strategy().prop_map(Item::Fragment),
    ]) {
        let run = Fragment::horizontal().with(child);
        prop_assert!(ColumnTrafo.apply(&run).is_empty());
    }
}
