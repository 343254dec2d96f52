//! The transformation trait and helpers to apply one inside a larger tree.

use std::fmt;

use alm_core::{Fragment, Item, TrafoError};

use crate::fragment_ref::FragmentRef;

/// One alternative produced by a transformation.
#[derive(Debug, Clone, PartialEq)]
pub struct Alternative {
    pub fragment: Fragment,
    /// Step quality reported by the transformation.
    pub quality: f64,
}

impl Alternative {
    pub fn new(fragment: Fragment, quality: f64) -> Self {
        Self { fragment, quality }
    }
}

/// A pure, structure-preserving rewrite of a fragment.
///
/// Implementations take the input by reference and build new fragments, so
/// the same source can feed any number of transformations. An input the
/// transformation cannot handle yields an empty list, never an error.
pub trait Transformation: fmt::Debug + Send + Sync {
    /// Stable name, recorded in the history.
    fn name(&self) -> &'static str;

    /// Whether `apply` can produce anything for `fragment`.
    fn is_applicable(&self, fragment: &Fragment) -> bool;

    /// All alternatives for `fragment`.
    fn apply(&self, fragment: &Fragment) -> Vec<Alternative>;
}

/// Apply `trafo` to the sub-fragment at `target` and return whole-tree
/// alternatives. `root` is not modified.
pub fn apply_at(
    trafo: &dyn Transformation,
    root: &Fragment,
    target: &FragmentRef,
) -> Result<Vec<Alternative>, TrafoError> {
    let sub = target.resolve(root)?;
    if !trafo.is_applicable(sub) {
        return Ok(Vec::new());
    }

    let mut out = Vec::new();
    for alternative in trafo.apply(sub) {
        let mut tree = root.clone();
        if tree.replace_at(target.path(), alternative.fragment).is_none() {
            return Err(TrafoError::UnresolvedReference {
                path: target.path().to_vec(),
            });
        }
        out.push(Alternative::new(tree, alternative.quality));
    }
    Ok(out)
}

/// Build a fragment of `direction` from items, keeping a lone item as is
/// instead of wrapping it.
pub(crate) fn group(direction: alm_core::Direction, mut items: Vec<Item>) -> Item {
    if items.len() == 1 {
        if let Some(item) = items.pop() {
            return item;
        }
    }
    Item::Fragment(Fragment::with_items(direction, items))
}

/// Copy `source`'s cookie onto a replacement fragment.
pub(crate) fn keep_cookie(source: &Fragment, mut fragment: Fragment) -> Fragment {
    fragment.set_cookie(source.cookie().cloned());
    fragment
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SwapTrafo;
    use alm_core::parse_notation;

    #[test]
    fn test_apply_at_nested_target() {
        let root = parse_notation("v(a,h(b,c))").unwrap();
        let out = apply_at(&SwapTrafo, &root, &FragmentRef::from_path(&[1])).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].fragment.structure_id(), "v(a,v(b,c))");
        assert_eq!(root.structure_id(), "v(a,h(b,c))");
    }

    #[test]
    fn test_apply_at_bad_reference() {
        let root = parse_notation("v(a,b)").unwrap();
        let err = apply_at(&SwapTrafo, &root, &FragmentRef::from_path(&[3])).unwrap_err();
        assert_eq!(err, TrafoError::UnresolvedReference { path: vec![3] });
    }

    #[test]
    fn test_apply_at_not_applicable() {
        let root = parse_notation("v(a)").unwrap();
        assert!(apply_at(&SwapTrafo, &root, &FragmentRef::root()).unwrap().is_empty());
    }
}
