//! Leaf layout elements.

use std::sync::Arc;

use crate::component::{ComponentNode, Measurement};
use crate::types::SizeHint;

/// Shared reference to the external component an item originates from.
///
/// Cookies are shared, never copied: cloning an [`Area`] clones the `Arc`.
pub type Cookie = Arc<ComponentNode>;

/// Placeholder identity for areas without component or id.
pub const PLACEHOLDER_KEY: &str = "area";

/// A leaf layout element with minimum, preferred and maximum size.
///
/// Areas carry no constraint variables. Tabs are assigned by the constraint
/// builder for one solve only and live in its arena.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Area {
    cookie: Option<Cookie>,
    id: Option<String>,
    min_size: SizeHint,
    preferred_size: SizeHint,
    max_size: SizeHint,
}

impl Area {
    /// Create an area with undefined sizes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an area for a component with the given measurement.
    pub fn from_component(component: Cookie, measurement: Measurement) -> Self {
        Self {
            cookie: Some(component),
            id: None,
            min_size: measurement.min,
            preferred_size: measurement.pref,
            max_size: measurement.max,
        }
    }

    /// Create an area from explicit sizes.
    pub fn with_sizes(min: SizeHint, preferred: SizeHint, max: SizeHint) -> Self {
        Self {
            min_size: min,
            preferred_size: preferred,
            max_size: max,
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_cookie(mut self, cookie: Cookie) -> Self {
        self.cookie = Some(cookie);
        self
    }

    pub fn cookie(&self) -> Option<&Cookie> {
        self.cookie.as_ref()
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn min_size(&self) -> SizeHint {
        self.min_size
    }

    pub fn preferred_size(&self) -> SizeHint {
        self.preferred_size
    }

    pub fn max_size(&self) -> SizeHint {
        self.max_size
    }

    pub fn set_min_size(&mut self, size: SizeHint) {
        self.min_size = size;
    }

    pub fn set_preferred_size(&mut self, size: SizeHint) {
        self.preferred_size = size;
    }

    pub fn set_max_size(&mut self, size: SizeHint) {
        self.max_size = size;
    }

    /// Minimum size used for constraints: undefined components derive from
    /// the preferred size and stay undefined if that is undefined as well.
    pub fn effective_min_size(&self) -> SizeHint {
        self.min_size.or(self.preferred_size)
    }

    /// Identity used for structural equivalence: the component kind, else
    /// the area id, else a generic placeholder.
    pub fn key(&self) -> &str {
        match (&self.cookie, &self.id) {
            (Some(cookie), _) => &cookie.kind,
            (None, Some(id)) => id,
            (None, None) => PLACEHOLDER_KEY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_prefers_component_kind() {
        let component = Arc::new(ComponentNode::new("EditText"));
        let area = Area::from_component(component, Measurement::UNDEFINED).with_id("name");
        assert_eq!(area.key(), "EditText");
        assert_eq!(Area::new().with_id("a1").key(), "a1");
        assert_eq!(Area::new().key(), PLACEHOLDER_KEY);
    }

    #[test]
    fn test_clone_shares_cookie() {
        let component = Arc::new(ComponentNode::new("Button"));
        let area = Area::from_component(component.clone(), Measurement::UNDEFINED);
        let copy = area.clone();
        assert!(Arc::ptr_eq(area.cookie().unwrap(), copy.cookie().unwrap()));
        assert_eq!(Arc::strong_count(&component), 3);
    }

    #[test]
    fn test_effective_min_size() {
        let area = Area::with_sizes(
            SizeHint { width: Some(5.0), height: None },
            SizeHint { width: Some(20.0), height: Some(30.0) },
            SizeHint::UNDEFINED,
        );
        assert_eq!(area.effective_min_size(), SizeHint::new(5.0, 30.0));

        let unknown = Area::new();
        assert!(unknown.effective_min_size().is_undefined());
    }
}
