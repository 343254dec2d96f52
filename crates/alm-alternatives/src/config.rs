//! Search configuration loaded from JSON.
//!
//! ```json
//! {
//!   "max_candidates": 200,
//!   "time_budget_ms": 10000,
//!   "seed": 42,
//!   "preset": "landscape_to_portrait",
//!   "weights": { "Pref Size": 0.5, "Symmetry": 0.25 }
//! }
//! ```
//!
//! Missing fields take their defaults. Weights not listed keep their
//! default value.

use std::time::Duration;

use alm_core::ConfigError;
use serde::{Deserialize, Serialize};

use crate::classifier::{Classifier, TargetSource};
use crate::objective::{ObjectiveRegistry, ObjectiveWeights};
use crate::presets::{Orientation, Preset};
use crate::search::SearchOptions;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchConfig {
    pub max_candidates: usize,
    /// `None` for no time limit.
    pub time_budget_ms: Option<u64>,
    /// Seed of the random selection stage.
    pub seed: u64,
    pub preset: String,
    pub weights: ObjectiveWeights,
}

impl Default for SearchConfig {
    fn default() -> Self {
        let options = SearchOptions::default();
        Self {
            max_candidates: options.max_candidates,
            time_budget_ms: Some(options.time_budget.as_millis() as u64),
            seed: 0,
            preset: Orientation::PortraitToLandscape.name().to_string(),
            weights: ObjectiveWeights::default(),
        }
    }
}

impl SearchConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: SearchConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check preset name and weights.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.orientation()?;
        self.registry().map(|_| ())
    }

    pub fn orientation(&self) -> Result<Orientation, ConfigError> {
        self.preset.parse()
    }

    pub fn search_options(&self) -> SearchOptions {
        SearchOptions {
            max_candidates: self.max_candidates,
            time_budget: self
                .time_budget_ms
                .map_or(Duration::MAX, Duration::from_millis),
        }
    }

    /// Reference terms with the configured weights.
    pub fn registry(&self) -> Result<ObjectiveRegistry, ConfigError> {
        let mut registry = ObjectiveRegistry::with_default_terms();
        registry.apply_weights(&self.weights)?;
        Ok(registry)
    }

    pub fn preset(&self) -> Result<Preset, ConfigError> {
        Ok(self.orientation()?.preset(self.seed))
    }

    /// Classifier for the preset's target with the configured weights.
    pub fn classifier(&self, target: TargetSource) -> Result<Classifier, ConfigError> {
        Ok(Classifier::with_registry(target, self.registry()?))
    }
}
