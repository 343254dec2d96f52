//! Axis swap.

use alm_core::Fragment;

use crate::trafo::{Alternative, Transformation};

/// Flips a fragment's direction without regrouping its children.
///
/// Applying it twice yields a fragment equivalent to the input.
#[derive(Debug, Clone, Copy, Default)]
pub struct SwapTrafo;

impl Transformation for SwapTrafo {
    fn name(&self) -> &'static str {
        "swap"
    }

    fn is_applicable(&self, fragment: &Fragment) -> bool {
        fragment.len() >= 2
    }

    fn apply(&self, fragment: &Fragment) -> Vec<Alternative> {
        if !self.is_applicable(fragment) {
            return Vec::new();
        }
        vec![Alternative::new(fragment.flipped(), 1.0)]
    }
}
