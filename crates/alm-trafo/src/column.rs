//! One-to-two column split.

use alm_core::{Direction, Fragment, Item};

use crate::trafo::{keep_cookie, Alternative, Transformation};

/// Splits a horizontal run into two vertical groups under a vertical parent.
///
/// `h(a,b,c,d,e)` becomes `v(v(a,b,c),v(d,e))`: the first group takes the
/// larger half. Leaf order is kept. A half that is already a single vertical
/// fragment is used as the group directly.
#[derive(Debug, Clone, Copy, Default)]
pub struct ColumnTrafo;

impl Transformation for ColumnTrafo {
    fn name(&self) -> &'static str {
        "column"
    }

    fn is_applicable(&self, fragment: &Fragment) -> bool {
        fragment.is_horizontal() && fragment.len() >= 2
    }

    fn apply(&self, fragment: &Fragment) -> Vec<Alternative> {
        if !self.is_applicable(fragment) {
            return Vec::new();
        }

        let split = fragment.len().div_ceil(2);
        let (first, second) = fragment.items().split_at(split);
        let columns = [first, second].map(|items| match items {
            [item @ Item::Fragment(inner)] if inner.is_vertical() => item.clone(),
            _ => Item::Fragment(Fragment::with_items(Direction::Vertical, items.to_vec())),
        });
        let result = keep_cookie(fragment, Fragment::with_items(Direction::Vertical, columns));
        vec![Alternative::new(result, 1.0)]
    }
}
