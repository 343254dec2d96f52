//! Linear constraint solving for fragment trees.
//!
//! This crate implements:
//! - Cassowary simplex algorithm with constraint strengths
//! - Tab assignment for fragments and areas
//! - Minimum, preferred and target-size solves

mod cassowary;
mod layout_spec;

pub use cassowary::{Constraint, Expression, Relation, Solver, Strength, Variable};
pub use layout_spec::{AreaTabs, LayoutSpec, SolvedLayout, SpecArea, Tab, TabArena};

use alm_core::{ConstraintError, Fragment, Size};

/// Minimum and preferred size of a fragment tree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeRange {
    pub min: Size,
    pub preferred: Size,
}

/// Build the [`LayoutSpec`] of `fragment` and compute its minimum and preferred size.
pub fn measure_fragment(fragment: &Fragment) -> Result<SizeRange, ConstraintError> {
    let spec = LayoutSpec::from_fragment(fragment);
    let min = spec.min_size()?;
    let preferred = spec.preferred_size()?;
    tracing::trace!(%fragment, %min, %preferred, "measured fragment");
    Ok(SizeRange { min, preferred })
}

/// Build the [`LayoutSpec`] of `fragment` and solve it for `target`.
pub fn layout_fragment(fragment: &Fragment, target: Size) -> Result<SolvedLayout, ConstraintError> {
    let spec = LayoutSpec::from_fragment(fragment);
    let solved = spec.solve(target)?;
    tracing::trace!(%fragment, %target, size = %solved.size, "solved layout");
    Ok(solved)
}
