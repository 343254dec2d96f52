//! Transformation history of derived fragments.

use crate::fragment_ref::FragmentRef;

/// One applied transformation.
#[derive(Debug, Clone, PartialEq)]
pub struct TrafoEntry {
    pub trafo: &'static str,
    pub target: FragmentRef,
    pub quality: f64,
}

/// Append-only log of the transformations that derived a fragment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrafoHistory {
    entries: Vec<TrafoEntry>,
}

impl TrafoHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: TrafoEntry) {
        self.entries.push(entry);
    }

    /// Copy of this history with one more entry. The original is untouched
    /// so sibling candidates can extend the same parent history.
    pub fn extended(&self, trafo: &'static str, target: FragmentRef, quality: f64) -> Self {
        let mut next = self.clone();
        next.push(TrafoEntry {
            trafo,
            target,
            quality,
        });
        next
    }

    pub fn entries(&self) -> &[TrafoEntry] {
        &self.entries
    }

    pub fn last(&self) -> Option<&TrafoEntry> {
        self.entries.last()
    }

    /// Number of chained transformations.
    pub fn n_trafos(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of the per-step qualities.
    pub fn total_quality(&self) -> f64 {
        self.entries.iter().map(|e| e.quality).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extended_leaves_parent_untouched() {
        let parent = TrafoHistory::new().extended("swap", FragmentRef::root(), 1.0);
        let child = parent.extended("column", FragmentRef::from_path(&[1, 0]), 0.5);

        assert_eq!(parent.n_trafos(), 1);
        assert_eq!(child.n_trafos(), 2);
        assert_eq!(child.last().unwrap().target.n_levels(), 2);
        assert!((child.total_quality() - 1.5).abs() < 1e-12);
        assert!(TrafoHistory::new().last().is_none());
    }
}
