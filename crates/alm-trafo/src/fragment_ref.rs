//! Position-based references to sub-fragments.

use std::fmt;

use alm_core::{Fragment, TrafoError};
use smallvec::SmallVec;

/// Reference to a sub-fragment as the path of child indices from the root.
///
/// References survive cloning because they name a position, not an instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct FragmentRef {
    path: SmallVec<[usize; 4]>,
}

impl FragmentRef {
    /// Reference to the root fragment.
    pub fn root() -> Self {
        Self::default()
    }

    pub fn from_path(path: &[usize]) -> Self {
        Self {
            path: SmallVec::from_slice(path),
        }
    }

    /// Reference to the `index`th child of this fragment.
    pub fn child(&self, index: usize) -> Self {
        let mut path = self.path.clone();
        path.push(index);
        Self { path }
    }

    pub fn path(&self) -> &[usize] {
        &self.path
    }

    pub fn is_root(&self) -> bool {
        self.path.is_empty()
    }

    /// Nesting level of the referenced fragment; the root is level 0.
    pub fn n_levels(&self) -> usize {
        self.path.len()
    }

    /// Resolve the reference inside `root`.
    pub fn resolve<'a>(&self, root: &'a Fragment) -> Result<&'a Fragment, TrafoError> {
        root.fragment_at(&self.path)
            .ok_or_else(|| TrafoError::UnresolvedReference {
                path: self.path.to_vec(),
            })
    }

    /// All references of `root` a transformation may target, in pre-order.
    ///
    /// Wrappers are skipped: they are transparent and the fragment they wrap
    /// is listed on its own.
    pub fn targets(root: &Fragment) -> Vec<FragmentRef> {
        let mut out = Vec::new();
        root.for_each_fragment(|path, fragment| {
            if !fragment.is_wrapper() {
                out.push(FragmentRef::from_path(path));
            }
        });
        out
    }
}

impl fmt::Display for FragmentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("/")?;
        for (i, index) in self.path.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            write!(f, "{}", index)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alm_core::parse_notation;

    #[test]
    fn test_targets_preorder() {
        let f = parse_notation("v(a,h(b,v(c,d)),e)").unwrap();
        let targets: Vec<_> = FragmentRef::targets(&f).iter().map(|r| r.to_string()).collect();
        assert_eq!(targets, ["/", "/1", "/1/1"]);
    }

    #[test]
    fn test_targets_skip_wrappers() {
        let f = parse_notation("h(v(a,b))").unwrap();
        let targets = FragmentRef::targets(&f);
        assert_eq!(targets, vec![FragmentRef::from_path(&[0])]);
    }

    #[test]
    fn test_resolve() {
        let f = parse_notation("v(a,h(b,c))").unwrap();
        let r = FragmentRef::root().child(1);
        assert_eq!(r.n_levels(), 1);
        assert_eq!(r.resolve(&f).unwrap().structure_id(), "h(b,c)");
        assert_eq!(
            FragmentRef::from_path(&[0]).resolve(&f),
            Err(TrafoError::UnresolvedReference { path: vec![0] })
        );
    }
}
