//! Building fragment trees from a host component tree.

use alm_core::{Area, Cookie, Direction, Fragment, IngestError, Item, MeasureProvider};

/// Container kind that becomes a fragment.
pub const LINEAR_LAYOUT: &str = "LinearLayout";
/// Attribute holding a container's direction.
pub const ORIENTATION: &str = "orientation";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserOptions {
    /// Component kind treated as a fragment; everything else is a leaf.
    pub container_kind: String,
    /// Reject orientation values other than `horizontal` and `vertical`
    /// instead of falling back to horizontal.
    pub strict_orientation: bool,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            container_kind: LINEAR_LAYOUT.to_string(),
            strict_orientation: false,
        }
    }
}

/// Turns component trees into fragment trees, measuring every leaf.
#[derive(Debug, Clone)]
pub struct LayoutParser<M> {
    measure: M,
    options: ParserOptions,
}

impl<M: MeasureProvider> LayoutParser<M> {
    pub fn new(measure: M) -> Self {
        Self::with_options(measure, ParserOptions::default())
    }

    pub fn with_options(measure: M, options: ParserOptions) -> Self {
        Self { measure, options }
    }

    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    /// Parse a component into an area or a fragment.
    pub fn parse(&self, component: &Cookie) -> Result<Item, IngestError> {
        if component.kind != self.options.container_kind {
            let measurement = self.measure.measure(component);
            return Ok(Item::Area(Area::from_component(component.clone(), measurement)));
        }

        let direction = self.direction(component)?;
        let mut fragment = Fragment::new(direction).with_cookie(component.clone());
        for child in &component.children {
            fragment.push(self.parse(child)?);
        }
        Ok(Item::Fragment(fragment))
    }

    /// Parse a container component into a fragment.
    pub fn parse_fragment(&self, component: &Cookie) -> Result<Fragment, IngestError> {
        match self.parse(component)? {
            Item::Fragment(fragment) => Ok(fragment),
            Item::Area(_) => Err(IngestError::NotAContainer {
                kind: component.kind.clone(),
            }),
        }
    }

    fn direction(&self, component: &Cookie) -> Result<Direction, IngestError> {
        match component.attribute(ORIENTATION) {
            None | Some("horizontal") => Ok(Direction::Horizontal),
            Some("vertical") => Ok(Direction::Vertical),
            Some(value) if self.options.strict_orientation => Err(IngestError::UnknownOrientation {
                kind: component.kind.clone(),
                value: value.to_string(),
            }),
            Some(value) => {
                tracing::debug!(kind = %component.kind, value, "unknown orientation, using horizontal");
                Ok(Direction::Horizontal)
            }
        }
    }
}
