//! Structural symmetry of fragment trees.

use alm_core::{Fragment, Item};
use indexmap::IndexMap;

/// Structural symmetry analysis of a fragment tree.
///
/// A fragment is symmetric when its children look alike: all leaves, or all
/// fragments of the same direction and length.
#[derive(Debug, Clone, Copy, Default)]
pub struct SymmetryAnalyzer;

/// Shape of a child used to compare siblings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Shape {
    Leaf,
    Group(char, usize),
}

fn shape(item: &Item) -> Shape {
    match item {
        Item::Area(_) => Shape::Leaf,
        Item::Fragment(f) => Shape::Group(f.direction().tag(), f.len()),
    }
}

impl SymmetryAnalyzer {
    /// Symmetry score in `[0, 1]`, 1 being maximally symmetric.
    ///
    /// For every fragment with at least two children the share of children
    /// with the most common shape is taken; the scores are averaged weighted
    /// by child count. A tree without such fragments is fully symmetric.
    pub fn symmetry(fragment: &Fragment) -> f64 {
        let mut weighted = 0.0;
        let mut total = 0usize;
        fragment.for_each_fragment(|_, f| {
            let n = f.len();
            if n < 2 {
                return;
            }
            let mut counts: IndexMap<Shape, usize> = IndexMap::new();
            for item in f.items() {
                *counts.entry(shape(item)).or_default() += 1;
            }
            let dominant = counts.values().copied().max().unwrap_or(0);
            weighted += dominant as f64;
            total += n;
        });

        if total == 0 {
            1.0
        } else {
            weighted / total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alm_core::parse_notation;

    fn symmetry(notation: &str) -> f64 {
        SymmetryAnalyzer::symmetry(&parse_notation(notation).unwrap())
    }

    #[test]
    fn test_flat_run_is_symmetric() {
        assert_eq!(symmetry("h(a,b,c)"), 1.0);
        assert_eq!(symmetry("h()"), 1.0);
        assert_eq!(symmetry("v(h(a,b),h(c,d))"), 1.0);
    }

    #[test]
    fn test_mixed_children_lower_symmetry() {
        // root: 1 of 2 alike, inner: 2 of 2 alike -> (1 + 2) / 4
        assert!((symmetry("v(a,h(b,c))") - 0.75).abs() < 1e-12);
        assert!(symmetry("v(h(a,b),h(c,d,e))") < 1.0);
    }
}
