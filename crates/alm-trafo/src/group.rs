//! Detection of repeating child patterns.
//!
//! Forms often repeat the same run of components, e.g. label/input pairs:
//! `v(TextView,EditText,TextView,EditText)`. Wrapping every repetition into a
//! fragment of the parent's direction does not change the layout but gives
//! the transformations a handle on the pairs.

use std::fmt;

use alm_core::{Fragment, Item};

use crate::fragment_ref::FragmentRef;

/// Ranks detected patterns; higher comes first.
pub type GroupPreference = Box<dyn Fn(&[String]) -> f64 + Send + Sync>;

/// A repeating child pattern found in a fragment tree.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectedGroup {
    /// The fragment whose children repeat.
    pub target: FragmentRef,
    /// Structural ids of one repetition.
    pub pattern: Vec<String>,
    pub repetitions: usize,
    /// The whole tree with every repetition wrapped.
    pub fragment: Fragment,
}

/// Finds repeating child patterns.
#[derive(Default)]
pub struct GroupDetector {
    preference: Option<GroupPreference>,
}

impl fmt::Debug for GroupDetector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroupDetector")
            .field("preference", &self.preference.is_some())
            .finish()
    }
}

impl GroupDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Order detected groups by `preference`.
    pub fn with_preference<F>(mut self, preference: F) -> Self
    where
        F: Fn(&[String]) -> f64 + Send + Sync + 'static,
    {
        self.preference = Some(Box::new(preference));
        self
    }

    /// All repeating patterns of `root`, best first.
    pub fn detect(&self, root: &Fragment) -> Vec<DetectedGroup> {
        let mut found = Vec::new();
        root.for_each_fragment(|path, fragment| {
            if fragment.is_wrapper() {
                return;
            }
            let keys: Vec<String> = fragment.items().iter().map(Item::structure_id).collect();
            let Some(period) = repeating_period(&keys) else {
                return;
            };

            let mut grouped = fragment.clone();
            let wrapped: Vec<Item> = fragment
                .items()
                .chunks(period)
                .map(|run| Item::Fragment(Fragment::with_items(fragment.direction(), run.to_vec())))
                .collect();
            *grouped.items_mut() = wrapped;

            let mut tree = root.clone();
            if tree.replace_at(path, grouped).is_some() {
                found.push(DetectedGroup {
                    target: FragmentRef::from_path(path),
                    pattern: keys[..period].to_vec(),
                    repetitions: keys.len() / period,
                    fragment: tree,
                });
            }
        });

        if let Some(preference) = &self.preference {
            // stable: equally preferred groups keep tree order
            found.sort_by(|a, b| preference(&b.pattern).total_cmp(&preference(&a.pattern)));
        }
        tracing::trace!(groups = found.len(), "detected groups");
        found
    }

    /// Extra search seeds: the grouped trees, best first.
    pub fn seeds(&self, root: &Fragment) -> Vec<Fragment> {
        self.detect(root).into_iter().map(|g| g.fragment).collect()
    }
}

/// Smallest period `p >= 2` such that `keys` is at least two repetitions of
/// its first `p` keys. Runs of one repeated key have no meaningful grouping.
fn repeating_period(keys: &[String]) -> Option<usize> {
    let n = keys.len();
    if n < 4 || keys.iter().all(|k| *k == keys[0]) {
        return None;
    }
    (2..=n / 2).find(|&p| n % p == 0 && (p..n).all(|i| keys[i] == keys[i % p]))
}
