//! Error types for the layout alternatives engine.
//!
//! None of these are fatal to a search: a candidate whose constraint system
//! fails is scored as invalid, and budget exhaustion is a normal outcome.

use thiserror::Error;

/// Top-level error type.
#[derive(Debug, Error)]
pub enum AlmError {
    #[error(transparent)]
    Constraint(#[from] ConstraintError),

    #[error(transparent)]
    Trafo(#[from] TrafoError),

    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Notation(#[from] NotationError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors while building or solving a linear constraint system.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConstraintError {
    #[error("Unsatisfiable required constraint: {constraint_desc}")]
    Unsatisfiable { constraint_desc: String },

    #[error("Objective function is unbounded")]
    Unbounded,

    #[error("Internal solver error: {0}")]
    Internal(&'static str),
}

/// Errors while applying a transformation to a sub-fragment.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TrafoError {
    #[error("Fragment reference {path:?} does not resolve")]
    UnresolvedReference { path: Vec<usize> },

    #[error("Unknown transformation: {name}")]
    UnknownTransformation { name: String },
}

/// Errors while turning a component tree into a fragment tree.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum IngestError {
    #[error("Component {kind} is not a layout container")]
    NotAContainer { kind: String },

    #[error("Unknown orientation '{value}' on {kind}")]
    UnknownOrientation { kind: String, value: String },
}

/// Errors in the compact fragment notation.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum NotationError {
    #[error("Syntax error at offset {offset}")]
    Syntax { offset: usize },

    #[error("Notation does not describe a fragment")]
    NotAFragment,
}

/// Errors in search or classifier configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown objective term: {name}")]
    UnknownTerm { name: String },

    #[error("Weight for {name} must be finite and non-negative, got {weight}")]
    InvalidWeight { name: String, weight: f64 },

    #[error("Unknown preset: {name}")]
    UnknownPreset { name: String },
}
