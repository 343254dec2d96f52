//! Classification of candidate fragments.
//!
//! The classifier measures a candidate through its `LayoutSpec` and keeps
//! the numbers the objective terms need. It never fails: a candidate whose
//! constraint system cannot be solved is classified as failed and scores
//! [`INVALID_OBJECTIVE`](crate::objective::INVALID_OBJECTIVE).

use std::sync::OnceLock;

use alm_constraint::{LayoutSpec, SolvedLayout, SpecArea};
use alm_core::{ConstraintError, Fragment, Size};
use alm_trafo::{SymmetryAnalyzer, TrafoHistory};

use crate::objective::{ObjectiveRegistry, TermValue};

/// Where the target rectangle comes from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TargetSource {
    /// A fixed rectangle.
    Fixed(Size),
    /// A rectangle with width and height exchanged.
    Rotated(Size),
    /// The measured size of the root fragment's component, rotated. Falls
    /// back to the root's preferred size when nothing was measured.
    FromRoot,
}

/// Metrics of one candidate. Derived data: built once, never changed.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub history: TrafoHistory,
    pub target: Size,
    pub min_size: Option<Size>,
    /// Unset for invalid candidates.
    pub preferred_size: Option<Size>,
    /// Squared deviation of solved widths from preferred widths, averaged
    /// over all leaves.
    pub pref_diff2_width: f64,
    /// Squared deviation of solved heights from preferred heights, averaged
    /// over all leaves.
    pub pref_diff2_height: f64,
    /// Structural symmetry in `[0, 1]`.
    pub symmetry: f64,
    /// The minimum size does not fit into the target.
    pub invalid: bool,
    /// The constraint system could not be solved.
    pub failed: bool,
}

impl Classification {
    fn unsolved(history: TrafoHistory, target: Size) -> Self {
        Self {
            history,
            target,
            min_size: None,
            preferred_size: None,
            pref_diff2_width: 0.0,
            pref_diff2_height: 0.0,
            symmetry: 0.0,
            invalid: false,
            failed: false,
        }
    }

    pub fn is_invalid(&self) -> bool {
        self.invalid || self.failed
    }
}

/// Classifies candidates against a target rectangle and scores them.
#[derive(Debug)]
pub struct Classifier {
    source: TargetSource,
    target: OnceLock<Size>,
    registry: ObjectiveRegistry,
}

impl Classifier {
    /// Classifier with the reference objective terms.
    pub fn new(source: TargetSource) -> Self {
        Self::with_registry(source, ObjectiveRegistry::with_default_terms())
    }

    pub fn with_registry(source: TargetSource, registry: ObjectiveRegistry) -> Self {
        Self {
            source,
            target: OnceLock::new(),
            registry,
        }
    }

    pub fn registry(&self) -> &ObjectiveRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ObjectiveRegistry {
        &mut self.registry
    }

    /// The target rectangle. It is resolved on the first call, from `root`
    /// if the source needs it, and reused for every later candidate.
    pub fn target(&self, root: &Fragment) -> Size {
        *self.target.get_or_init(|| {
            let target = match self.source {
                TargetSource::Fixed(size) => size,
                TargetSource::Rotated(size) => size.swapped(),
                TargetSource::FromRoot => root_size(root).swapped(),
            };
            tracing::debug!(%target, "resolved target");
            target
        })
    }

    /// Classify a candidate.
    pub fn classify(&self, fragment: &Fragment, history: &TrafoHistory) -> Classification {
        let target = self.target(fragment);
        let mut classification = Classification::unsolved(history.clone(), target);

        if let Err(err) = measure(fragment, target, &mut classification) {
            tracing::warn!(%fragment, error = %err, "constraint solve failed");
            classification.failed = true;
            classification.preferred_size = None;
        }

        tracing::trace!(
            %fragment,
            invalid = classification.is_invalid(),
            min = ?classification.min_size,
            pref = ?classification.preferred_size,
            "classified"
        );
        classification
    }

    pub fn objective_value(&self, classification: &Classification) -> f64 {
        self.registry.objective_value(classification)
    }

    pub fn term_values(&self, classification: &Classification) -> Vec<TermValue> {
        self.registry.term_values(classification)
    }
}

fn root_size(root: &Fragment) -> Size {
    if let Some(measured) = root.cookie().and_then(|c| c.measured) {
        return measured;
    }
    LayoutSpec::from_fragment(root)
        .preferred_size()
        .unwrap_or(Size::ZERO)
}

/// Fill in the measured fields of `out`. Stops after the minimum size when
/// it does not fit into the target.
fn measure(fragment: &Fragment, target: Size, out: &mut Classification) -> Result<(), ConstraintError> {
    let spec = LayoutSpec::from_fragment(fragment);

    let min = spec.min_size()?;
    out.min_size = Some(min);
    if !min.fits_in(&target) {
        out.invalid = true;
        return Ok(());
    }

    out.preferred_size = Some(spec.preferred_size()?);
    let solved = spec.solve(target)?;
    let (dw, dh) = pref_diff2(spec.areas(), &solved);
    out.pref_diff2_width = dw;
    out.pref_diff2_height = dh;
    out.symmetry = SymmetryAnalyzer::symmetry(fragment);
    Ok(())
}

/// Squared deviation of the solved area extents from the preferred size,
/// per axis, averaged over all leaves. Areas without a preferred extent add
/// nothing to the sum but still count.
fn pref_diff2(areas: &[SpecArea], solved: &SolvedLayout) -> (f64, f64) {
    if areas.is_empty() {
        return (0.0, 0.0);
    }
    let mut width = 0.0;
    let mut height = 0.0;
    for (area, bounds) in areas.iter().zip(&solved.areas) {
        if let Some(pref) = area.preferred.width {
            width += (bounds.width - pref).powi(2);
        }
        if let Some(pref) = area.preferred.height {
            height += (bounds.height - pref).powi(2);
        }
    }
    let n = areas.len() as f64;
    (width / n, height / n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objective::INVALID_OBJECTIVE;
    use alm_core::{parse_notation_with, Area, SizeHint};

    fn sized(notation: &str) -> Fragment {
        parse_notation_with(notation, |key| {
            Area::with_sizes(
                SizeHint::new(10.0, 10.0),
                SizeHint::new(20.0, 20.0),
                SizeHint::UNDEFINED,
            )
            .with_id(key)
        })
        .unwrap()
    }

    #[test]
    fn test_min_below_pref() {
        let f = parse_notation_with("h(a,b,c)", |key| {
            let pref = match key {
                "a" => SizeHint::new(20.0, 20.0),
                "b" => SizeHint::new(30.0, 10.0),
                _ => SizeHint::new(10.0, 30.0),
            };
            Area::with_sizes(SizeHint::new(10.0, 10.0), pref, SizeHint::UNDEFINED).with_id(key)
        })
        .unwrap();

        let classifier = Classifier::new(TargetSource::Fixed(Size::new(200.0, 100.0)));
        let c = classifier.classify(&f, &TrafoHistory::new());
        let min = c.min_size.unwrap();
        let pref = c.preferred_size.unwrap();
        assert!((min.width - 30.0).abs() < 1e-6 && (min.height - 10.0).abs() < 1e-6);
        assert!((pref.width - 60.0).abs() < 1e-6 && (pref.height - 30.0).abs() < 1e-6);
        assert!(min.width <= pref.width && min.height <= pref.height);
    }

    #[test]
    fn test_invalid_when_min_exceeds_target() {
        let classifier = Classifier::new(TargetSource::Fixed(Size::new(5.0, 5.0)));
        let c = classifier.classify(&sized("h(a,b)"), &TrafoHistory::new());
        assert!(c.invalid);
        assert!(c.preferred_size.is_none());
        assert_eq!(classifier.objective_value(&c), INVALID_OBJECTIVE);
    }

    #[test]
    fn test_target_is_cached() {
        let classifier = Classifier::new(TargetSource::FromRoot);
        let first = sized("h(a,b)");
        // preferred 40x20, rotated
        assert_eq!(classifier.target(&first), Size::new(20.0, 40.0));
        assert_eq!(classifier.target(&sized("v(a,b,c)")), Size::new(20.0, 40.0));
    }

    #[test]
    fn test_target_from_measured_root() {
        let root = alm_core::ComponentNode::new("LinearLayout").with_measured(Size::new(320.0, 480.0));
        let f = sized("v(a,b)").with_cookie(std::sync::Arc::new(root));
        let classifier = Classifier::new(TargetSource::FromRoot);
        assert_eq!(classifier.target(&f), Size::new(480.0, 320.0));
    }

    #[test]
    fn test_pref_diff_at_preferred_target() {
        // Target equals the preferred size, so every area gets its preference
        let classifier = Classifier::new(TargetSource::Fixed(Size::new(40.0, 20.0)));
        let c = classifier.classify(&sized("h(a,b)"), &TrafoHistory::new());
        assert!(!c.is_invalid());
        assert!(c.pref_diff2_width < 1e-6);
        assert!(c.pref_diff2_height < 1e-6);
        assert_eq!(c.symmetry, 1.0);
    }

    #[test]
    fn test_pref_diff_grows_with_slack() {
        let classifier = Classifier::new(TargetSource::Fixed(Size::new(40.0, 60.0)));
        let c = classifier.classify(&sized("h(a,b)"), &TrafoHistory::new());
        // both areas are 60 high instead of 20
        assert!((c.pref_diff2_height - 1600.0).abs() < 1e-6);
    }

    #[test]
    fn test_pref_diff_counts_unmeasured_leaves() {
        // only `a` has a preferred size; both areas end up 40 high
        let f = parse_notation_with("h(a,b)", |key| {
            let pref = if key == "a" { SizeHint::new(20.0, 20.0) } else { SizeHint::UNDEFINED };
            Area::with_sizes(SizeHint::new(10.0, 10.0), pref, SizeHint::UNDEFINED).with_id(key)
        })
        .unwrap();
        let classifier = Classifier::new(TargetSource::Fixed(Size::new(40.0, 40.0)));
        let c = classifier.classify(&f, &TrafoHistory::new());
        assert!(!c.is_invalid());
        assert!(c.pref_diff2_width < 1e-6);
        assert!((c.pref_diff2_height - 200.0).abs() < 1e-6);
    }
}
