//! Objective terms and their registry.
//!
//! The objective value of a candidate is the weighted sum of all registered
//! terms. Lower is better.

use std::fmt;

use alm_core::ConfigError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::classifier::Classification;

/// Objective value of an invalid candidate; worse than any valid value.
pub const INVALID_OBJECTIVE: f64 = f64::MAX;

pub const PREF_SIZE: &str = "Pref Size";
pub const MIN_SIZE: &str = "Min Size";
pub const SYMMETRY: &str = "Symmetry";
pub const LEVEL: &str = "Level";
pub const RATIO: &str = "Ratio";
pub const N_TRAFOS: &str = "N Trafos";

/// Chain length and nesting level at which their terms saturate.
const TRAFO_CEILING: f64 = 5.0;

/// Function computing the raw value of a term.
pub type TermFn = Box<dyn Fn(&Classification) -> f64 + Send + Sync>;

/// A named, weighted objective term.
pub struct ObjectiveTerm {
    name: String,
    weight: f64,
    value: TermFn,
}

impl fmt::Debug for ObjectiveTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectiveTerm")
            .field("name", &self.name)
            .field("weight", &self.weight)
            .finish()
    }
}

impl ObjectiveTerm {
    pub fn new<F>(name: impl Into<String>, weight: f64, value: F) -> Self
    where
        F: Fn(&Classification) -> f64 + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            weight,
            value: Box::new(value),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Raw, unweighted value of the term.
    pub fn value(&self, classification: &Classification) -> f64 {
        (self.value)(classification)
    }
}

/// Value of one term for one candidate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TermValue {
    pub name: String,
    pub value: f64,
    pub weighted: f64,
}

/// Weights by term name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectiveWeights(pub IndexMap<String, f64>);

impl Default for ObjectiveWeights {
    fn default() -> Self {
        Self(
            [
                (PREF_SIZE, 0.6),
                (MIN_SIZE, 0.17),
                (SYMMETRY, 0.15),
                (LEVEL, 0.05),
                (RATIO, 0.015),
                (N_TRAFOS, 0.015),
            ]
            .into_iter()
            .map(|(name, weight)| (name.to_string(), weight))
            .collect(),
        )
    }
}

impl ObjectiveWeights {
    pub fn get(&self, name: &str) -> Option<f64> {
        self.0.get(name).copied()
    }

    pub fn with(mut self, name: impl Into<String>, weight: f64) -> Self {
        self.0.insert(name.into(), weight);
        self
    }
}

/// Ordered registry of objective terms.
#[derive(Debug, Default)]
pub struct ObjectiveRegistry {
    terms: IndexMap<String, ObjectiveTerm>,
}

impl ObjectiveRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The reference terms with the default weights.
    pub fn with_default_terms() -> Self {
        let weights = ObjectiveWeights::default();
        let weight = |name: &str| weights.get(name).unwrap_or(0.0);

        let mut registry = Self::new();
        registry.register(ObjectiveTerm::new(PREF_SIZE, weight(PREF_SIZE), pref_size_term));
        registry.register(ObjectiveTerm::new(MIN_SIZE, weight(MIN_SIZE), min_size_term));
        registry.register(ObjectiveTerm::new(SYMMETRY, weight(SYMMETRY), symmetry_term));
        registry.register(ObjectiveTerm::new(LEVEL, weight(LEVEL), level_term));
        registry.register(ObjectiveTerm::new(RATIO, weight(RATIO), ratio_term));
        registry.register(ObjectiveTerm::new(N_TRAFOS, weight(N_TRAFOS), n_trafos_term));
        registry
    }

    /// Add a term, replacing a term of the same name.
    pub fn register(&mut self, term: ObjectiveTerm) {
        self.terms.insert(term.name.clone(), term);
    }

    pub fn get(&self, name: &str) -> Option<&ObjectiveTerm> {
        self.terms.get(name)
    }

    pub fn terms(&self) -> impl Iterator<Item = &ObjectiveTerm> {
        self.terms.values()
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Change the weight of a registered term.
    pub fn set_weight(&mut self, name: &str, weight: f64) -> Result<(), ConfigError> {
        if !weight.is_finite() || weight < 0.0 {
            return Err(ConfigError::InvalidWeight {
                name: name.to_string(),
                weight,
            });
        }
        let term = self.terms.get_mut(name).ok_or_else(|| ConfigError::UnknownTerm {
            name: name.to_string(),
        })?;
        term.weight = weight;
        Ok(())
    }

    /// Apply every weight of `weights`.
    pub fn apply_weights(&mut self, weights: &ObjectiveWeights) -> Result<(), ConfigError> {
        for (name, &weight) in &weights.0 {
            self.set_weight(name, weight)?;
        }
        Ok(())
    }

    /// Weighted sum of all terms, or [`INVALID_OBJECTIVE`].
    pub fn objective_value(&self, classification: &Classification) -> f64 {
        if classification.is_invalid() {
            return INVALID_OBJECTIVE;
        }
        self.terms
            .values()
            .map(|term| term.weight * term.value(classification))
            .sum()
    }

    /// Raw and weighted value of every term, in registration order.
    pub fn term_values(&self, classification: &Classification) -> Vec<TermValue> {
        self.terms
            .values()
            .map(|term| {
                let value = term.value(classification);
                TermValue {
                    name: term.name.clone(),
                    value,
                    weighted: term.weight * value,
                }
            })
            .collect()
    }
}

/// `value / target diagonal²`, zero for a degenerate target.
fn relative_to_target(value: f64, classification: &Classification) -> f64 {
    let norm = classification.target.diagonal_squared();
    if norm > 0.0 {
        value / norm
    } else {
        0.0
    }
}

/// Mean squared deviation from the preferred size, relative to the target.
pub fn pref_size_term(c: &Classification) -> f64 {
    relative_to_target(c.pref_diff2_width + c.pref_diff2_height, c)
}

/// Squared minimum size relative to the target.
pub fn min_size_term(c: &Classification) -> f64 {
    c.min_size
        .map_or(0.0, |min| relative_to_target(min.diagonal_squared(), c))
}

/// Relative difference between preferred and target aspect ratio, in `[0, 1]`.
pub fn ratio_term(c: &Classification) -> f64 {
    let Some(pref) = c.preferred_size else {
        return 0.0;
    };
    let target_ratio = c.target.ratio();
    let diff = ((pref.ratio() - target_ratio) / target_ratio).abs();
    if diff.is_finite() {
        diff.min(1.0)
    } else {
        1.0
    }
}

/// Chain length, saturating at five transformations.
pub fn n_trafos_term(c: &Classification) -> f64 {
    (c.history.n_trafos() as f64 / TRAFO_CEILING).min(1.0)
}

/// Nesting level of the last transformation target.
pub fn level_term(c: &Classification) -> f64 {
    c.history
        .last()
        .map_or(0.0, |entry| (entry.target.n_levels() as f64 / TRAFO_CEILING).min(1.0))
}

pub fn symmetry_term(c: &Classification) -> f64 {
    1.0 - c.symmetry
}
