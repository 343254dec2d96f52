//! Materializing a fragment tree as a component tree.

use std::sync::Arc;

use alm_core::{ComponentNode, Fragment, Item};

use crate::ingest::{LINEAR_LAYOUT, ORIENTATION};

pub const LAYOUT_WIDTH: &str = "layout_width";
pub const LAYOUT_HEIGHT: &str = "layout_height";
pub const MATCH_PARENT: &str = "match_parent";
pub const WRAP_CONTENT: &str = "wrap_content";

/// Render a fragment tree as a container tree.
///
/// Containers reuse the attributes of the fragment's originating component
/// when there is one. Areas reuse their component as is; areas without one
/// become a placeholder of their key. The root fills its parent, nested
/// containers wrap their content.
pub fn render(fragment: &Fragment) -> ComponentNode {
    render_fragment(fragment, true)
}

fn render_fragment(fragment: &Fragment, is_root: bool) -> ComponentNode {
    let mut node = match fragment.cookie() {
        Some(cookie) => ComponentNode {
            children: Vec::new(),
            ..ComponentNode::clone(cookie)
        },
        None => ComponentNode::new(LINEAR_LAYOUT),
    };

    let orientation = if fragment.is_vertical() { "vertical" } else { "horizontal" };
    let extent = if is_root { MATCH_PARENT } else { WRAP_CONTENT };
    node.attributes.insert(ORIENTATION.to_string(), orientation.to_string());
    node.attributes.insert(LAYOUT_WIDTH.to_string(), extent.to_string());
    node.attributes.insert(LAYOUT_HEIGHT.to_string(), extent.to_string());

    for item in fragment.items() {
        let child = match item {
            Item::Area(area) => match area.cookie() {
                Some(cookie) => cookie.clone(),
                None => {
                    let mut placeholder = ComponentNode::new(area.key());
                    placeholder.id = area.id().map(str::to_string);
                    Arc::new(placeholder)
                }
            },
            Item::Fragment(child) => Arc::new(render_fragment(child, false)),
        };
        node.children.push(child);
    }
    node
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::LayoutParser;
    use alm_core::{parse_notation, AttributeMeasure};

    #[test]
    fn test_roundtrip_row() {
        let row = Arc::new(
            ComponentNode::new(LINEAR_LAYOUT)
                .with_child(ComponentNode::new("TextView"))
                .with_child(ComponentNode::new("EditText"))
                .with_child(ComponentNode::new("Button")),
        );
        let parser = LayoutParser::new(AttributeMeasure);
        let original = parser.parse_fragment(&row).unwrap();

        let rendered = Arc::new(render(&original));
        let reparsed = parser.parse_fragment(&rendered).unwrap();
        assert!(reparsed.is_equivalent(&original));
        assert!(Arc::ptr_eq(&rendered.children[0], &row.children[0]));
    }

    #[test]
    fn test_render_attributes() {
        let f = parse_notation("v(a,h(b,c))").unwrap();
        let node = render(&f);
        assert_eq!(node.kind, LINEAR_LAYOUT);
        assert_eq!(node.attribute(ORIENTATION), Some("vertical"));
        assert_eq!(node.attribute(LAYOUT_WIDTH), Some(MATCH_PARENT));
        assert_eq!(node.children[0].kind, "a");

        let nested = &node.children[1];
        assert_eq!(nested.attribute(ORIENTATION), Some("horizontal"));
        assert_eq!(nested.attribute(LAYOUT_HEIGHT), Some(WRAP_CONTENT));
        assert_eq!(nested.children.len(), 2);
    }

    #[test]
    fn test_rendered_transformation_reparses() {
        let f = parse_notation("h(v(a,b),v(c,d))").unwrap();
        let parser = LayoutParser::new(AttributeMeasure);
        let reparsed = parser.parse_fragment(&Arc::new(render(&f))).unwrap();
        assert!(reparsed.is_equivalent(&f));
    }
}
