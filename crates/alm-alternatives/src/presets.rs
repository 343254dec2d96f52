//! Ready-made searches for rotating a layout.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use alm_core::ConfigError;
use alm_trafo::{ColumnTrafo, GroupDetector, InverseColumnFlowTrafo, InverseRowFlowTrafo, RowFlowTrafo, SwapTrafo};

use crate::classifier::TargetSource;
use crate::selection::{ApplyToAll, Catalog, ChainSelector, RandomSelector};

/// Direction of a rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    PortraitToLandscape,
    LandscapeToPortrait,
}

impl Orientation {
    pub fn name(&self) -> &'static str {
        match self {
            Orientation::PortraitToLandscape => "portrait_to_landscape",
            Orientation::LandscapeToPortrait => "landscape_to_portrait",
        }
    }

    /// Catalog and strategy for this rotation.
    pub fn preset(&self, seed: u64) -> Preset {
        match self {
            Orientation::PortraitToLandscape => portrait_to_landscape(seed),
            Orientation::LandscapeToPortrait => landscape_to_portrait(seed),
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Orientation {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "portrait_to_landscape" => Ok(Orientation::PortraitToLandscape),
            "landscape_to_portrait" => Ok(Orientation::LandscapeToPortrait),
            _ => Err(ConfigError::UnknownPreset { name: s.to_string() }),
        }
    }
}

/// A catalog with a matching strategy and target.
#[derive(Debug)]
pub struct Preset {
    pub orientation: Orientation,
    pub catalog: Catalog,
    pub strategy: ChainSelector,
    pub target: TargetSource,
}

impl Preset {
    /// Every catalog entry applied to all, in catalog order, then random
    /// picks among all remaining steps.
    fn chained(orientation: Orientation, catalog: Catalog, seed: u64) -> Self {
        let mut strategy = ChainSelector::new();
        for id in catalog.ids() {
            strategy = strategy.then(ApplyToAll::new(id));
        }
        let strategy = strategy.then(RandomSelector::new(seed));
        Self {
            orientation,
            catalog,
            strategy,
            target: TargetSource::FromRoot,
        }
    }
}

/// Swap, column split and inverse row flow, then random.
pub fn portrait_to_landscape(seed: u64) -> Preset {
    let catalog = Catalog::new(vec![
        Arc::new(SwapTrafo),
        Arc::new(ColumnTrafo),
        Arc::new(InverseRowFlowTrafo),
    ]);
    Preset::chained(Orientation::PortraitToLandscape, catalog, seed)
}

/// Swap, inverse column flow and row flow, then random.
pub fn landscape_to_portrait(seed: u64) -> Preset {
    let catalog = Catalog::new(vec![
        Arc::new(SwapTrafo),
        Arc::new(InverseColumnFlowTrafo),
        Arc::new(RowFlowTrafo),
    ]);
    Preset::chained(Orientation::LandscapeToPortrait, catalog, seed)
}

/// Prefers label/input pairs when grouping form rows.
pub fn label_input_preference(pattern: &[String]) -> f64 {
    match pattern {
        [label, input] if label == "TextView" && input == "EditText" => 1.0,
        _ => 0.0,
    }
}

/// Group detector ranking label/input pairs first.
pub fn form_group_detector() -> GroupDetector {
    GroupDetector::new().with_preference(label_input_preference)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::SelectionStrategy;

    #[test]
    fn test_orientation_names() {
        for orientation in [Orientation::PortraitToLandscape, Orientation::LandscapeToPortrait] {
            assert_eq!(orientation.name().parse::<Orientation>().unwrap(), orientation);
        }
        assert!(matches!(
            "sideways".parse::<Orientation>(),
            Err(ConfigError::UnknownPreset { .. })
        ));
    }

    #[test]
    fn test_preset_catalogs() {
        let names = |p: &Preset| {
            p.catalog.ids().filter_map(|id| p.catalog.get(id)).map(|t| t.name()).collect::<Vec<_>>()
        };
        assert_eq!(names(&portrait_to_landscape(0)), ["swap", "column", "inverse_row_flow"]);
        assert_eq!(
            names(&landscape_to_portrait(0)),
            ["swap", "inverse_column_flow", "row_flow"]
        );
        assert_eq!(portrait_to_landscape(0).strategy.len(), 4);
        assert_eq!(portrait_to_landscape(0).strategy.name(), "chain");
    }

    #[test]
    fn test_label_input_preference() {
        let pair = ["TextView".to_string(), "EditText".to_string()];
        assert_eq!(label_input_preference(&pair), 1.0);
        assert_eq!(label_input_preference(&pair[..1]), 0.0);
    }
}
