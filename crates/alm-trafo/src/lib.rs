//! Transformation catalog for fragment trees.
//!
//! This crate implements:
//! - Pure rewrites of a sub-fragment (swap, column split, flows, inverse flows)
//! - Position-based fragment references and the transformation history
//! - Structural symmetry analysis
//! - Detection of repeating child patterns

mod column;
mod flow;
mod fragment_ref;
mod group;
mod history;
mod swap;
mod symmetry;
mod trafo;

use std::sync::Arc;

pub use column::ColumnTrafo;
pub use flow::{ColumnFlowTrafo, InverseColumnFlowTrafo, InverseRowFlowTrafo, RowFlowTrafo};
pub use fragment_ref::FragmentRef;
pub use group::{DetectedGroup, GroupDetector, GroupPreference};
pub use history::{TrafoEntry, TrafoHistory};
pub use swap::SwapTrafo;
pub use symmetry::SymmetryAnalyzer;
pub use trafo::{apply_at, Alternative, Transformation};

use alm_core::TrafoError;

/// Every transformation of the catalog, in a fixed order.
pub fn all_transformations() -> Vec<Arc<dyn Transformation>> {
    vec![
        Arc::new(SwapTrafo),
        Arc::new(ColumnTrafo),
        Arc::new(RowFlowTrafo),
        Arc::new(ColumnFlowTrafo),
        Arc::new(InverseRowFlowTrafo),
        Arc::new(InverseColumnFlowTrafo),
    ]
}

/// Look up a transformation by its name.
pub fn transformation_by_name(name: &str) -> Result<Arc<dyn Transformation>, TrafoError> {
    all_transformations()
        .into_iter()
        .find(|t| t.name() == name)
        .ok_or_else(|| TrafoError::UnknownTransformation {
            name: name.to_string(),
        })
}
