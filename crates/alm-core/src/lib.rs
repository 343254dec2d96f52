//! Core types for exploring alternative Auckland Layout Model (ALM) layouts.
//!
//! This crate provides the layout tree model shared by all other crates:
//! - Size types with an explicit "undefined" state
//! - Leaf [`Area`]s and axis-tagged [`Fragment`]s
//! - Structural ids and equivalence between fragment trees
//! - The external component tree and the measurement interface
//! - A compact textual notation for fragment trees
//! - Error types

pub mod area;
pub mod component;
pub mod errors;
pub mod fragment;
pub mod notation;
pub mod types;

pub use area::{Area, Cookie};
pub use component::{AttributeMeasure, ComponentNode, MeasureProvider, Measurement};
pub use errors::*;
pub use fragment::{Fragment, Item};
pub use notation::{parse_notation, parse_notation_with};
pub use types::*;
