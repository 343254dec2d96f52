//! The external component tree and the measurement interface.
//!
//! Components are owned by the host application. The layout model only holds
//! shared references to them (see [`crate::area::Cookie`]) and never mutates
//! or copies a component.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::types::{Size, SizeHint};

/// A node of the host's component tree (a widget, or a container of widgets).
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ComponentNode {
    /// Component kind / tag name, e.g. `TextView` or `LinearLayout`.
    pub kind: String,
    /// Optional host id.
    pub id: Option<String>,
    /// Host attributes in declaration order.
    pub attributes: IndexMap<String, String>,
    /// Child components in order.
    pub children: Vec<Arc<ComponentNode>>,
    /// Size measured by the host for the current rendering, if known.
    pub measured: Option<Size>,
}

impl ComponentNode {
    /// Create a component of the given kind.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            ..Default::default()
        }
    }

    /// Set the host id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set an attribute.
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Append a child.
    pub fn with_child(mut self, child: impl Into<Arc<ComponentNode>>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Set the measured size.
    pub fn with_measured(mut self, size: Size) -> Self {
        self.measured = Some(size);
        self
    }

    /// Look up an attribute value.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Parse an attribute as a number.
    pub fn numeric_attribute(&self, name: &str) -> Option<f64> {
        self.attribute(name)?.trim().parse().ok()
    }
}

/// Minimum, preferred and maximum size of a component.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Measurement {
    pub min: SizeHint,
    pub pref: SizeHint,
    pub max: SizeHint,
}

impl Measurement {
    /// Measurement of a component whose size could not be determined.
    pub const UNDEFINED: Self = Self {
        min: SizeHint::UNDEFINED,
        pref: SizeHint::UNDEFINED,
        max: SizeHint::UNDEFINED,
    };

    pub fn new(min: SizeHint, pref: SizeHint, max: SizeHint) -> Self {
        Self { min, pref, max }
    }
}

/// Measures components. Implementations must be deterministic for a fixed
/// component state. When a size cannot be determined the provider returns
/// undefined components rather than zero.
pub trait MeasureProvider {
    fn measure(&self, component: &ComponentNode) -> Measurement;
}

impl<F> MeasureProvider for F
where
    F: Fn(&ComponentNode) -> Measurement,
{
    fn measure(&self, component: &ComponentNode) -> Measurement {
        self(component)
    }
}

/// Reads sizes from numeric component attributes
/// (`minWidth`, `minHeight`, `prefWidth`, `prefHeight`, `maxWidth`, `maxHeight`).
///
/// Missing or unparsable attributes are reported as undefined.
#[derive(Debug, Clone, Copy, Default)]
pub struct AttributeMeasure;

impl AttributeMeasure {
    fn hint(component: &ComponentNode, width: &str, height: &str) -> SizeHint {
        let read = |name: &str| {
            component
                .numeric_attribute(name)
                .filter(|v| v.is_finite() && *v >= 0.0)
        };
        SizeHint {
            width: read(width),
            height: read(height),
        }
    }
}

impl MeasureProvider for AttributeMeasure {
    fn measure(&self, component: &ComponentNode) -> Measurement {
        Measurement {
            min: Self::hint(component, "minWidth", "minHeight"),
            pref: Self::hint(component, "prefWidth", "prefHeight"),
            max: Self::hint(component, "maxWidth", "maxHeight"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_measure() {
        let button = ComponentNode::new("Button")
            .with_attribute("minWidth", "10")
            .with_attribute("minHeight", "12.5")
            .with_attribute("prefWidth", "40")
            .with_attribute("maxWidth", "oops");

        let m = AttributeMeasure.measure(&button);
        assert_eq!(m.min, SizeHint::new(10.0, 12.5));
        assert_eq!(m.pref.width, Some(40.0));
        assert_eq!(m.pref.height, None);
        assert!(m.max.is_undefined());
    }

    #[test]
    fn test_closure_provider() {
        let provider = |_: &ComponentNode| Measurement::UNDEFINED;
        let m = provider.measure(&ComponentNode::new("View"));
        assert_eq!(m, Measurement::UNDEFINED);
    }

    #[test]
    fn test_builder() {
        let root = ComponentNode::new("LinearLayout")
            .with_id("root")
            .with_attribute("orientation", "vertical")
            .with_child(ComponentNode::new("TextView"))
            .with_measured(Size::new(320.0, 480.0));
        assert_eq!(root.children.len(), 1);
        assert_eq!(root.attribute("orientation"), Some("vertical"));
        assert_eq!(root.measured, Some(Size::new(320.0, 480.0)));
    }
}
