//! Alternative layout search and scoring.
//!
//! This crate ties the layout model, the constraint solver and the
//! transformation catalog together:
//! - [`Classifier`] measures candidates and scores them with a registry of
//!   weighted objective terms
//! - [`FragmentAlternatives`] explores transformed layouts under a candidate
//!   and time budget, driven by pluggable [`SelectionStrategy`]s
//! - [`LayoutParser`] and [`render`] convert between host component trees
//!   and fragment trees
//!
//! ```no_run
//! use std::sync::Arc;
//! use alm_alternatives::{presets, FragmentAlternatives, LayoutParser, SearchConfig};
//! use alm_core::{AttributeMeasure, ComponentNode};
//!
//! # fn main() -> Result<(), alm_core::AlmError> {
//! let root = Arc::new(ComponentNode::new("LinearLayout"));
//! let fragment = LayoutParser::new(AttributeMeasure).parse_fragment(&root)?;
//!
//! let config = SearchConfig::default();
//! let mut preset = config.preset()?;
//! let classifier = config.classifier(preset.target)?;
//! let search = FragmentAlternatives::new(preset.catalog.clone())
//!     .with_options(config.search_options())
//!     .with_group_detector(presets::form_group_detector());
//! let best = search
//!     .calculate_alternatives(&fragment, &classifier, &mut preset.strategy)
//!     .ranked();
//! # let _ = best;
//! # Ok(())
//! # }
//! ```

pub mod classifier;
pub mod config;
pub mod ingest;
pub mod objective;
pub mod presets;
pub mod render;
pub mod search;
pub mod selection;

pub use classifier::{Classification, Classifier, TargetSource};
pub use config::SearchConfig;
pub use ingest::{LayoutParser, ParserOptions};
pub use objective::{ObjectiveRegistry, ObjectiveTerm, ObjectiveWeights, TermValue, INVALID_OBJECTIVE};
pub use presets::{landscape_to_portrait, portrait_to_landscape, Orientation, Preset};
pub use render::render;
pub use search::{rank_by_objective, Candidate, FragmentAlternatives, SearchOptions, SearchOutcome, StopReason};
pub use selection::{
    ApplyToAll, Catalog, ChainSelector, FrontierMember, RandomSelector, Selection, SelectionStrategy, TrafoId,
};
