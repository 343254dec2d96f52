//! Fragments: ordered, axis-tagged groupings of areas and sub-fragments.
//!
//! A fragment lays out its children contiguously along its direction. Child
//! order encodes adjacency and is preserved by every copy. Fragments are
//! values: cloning produces an independent tree that still shares the leaf
//! cookies.

use std::fmt;

use crate::area::{Area, Cookie};
use crate::types::Direction;

/// A child of a fragment.
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Area(Area),
    Fragment(Fragment),
}

impl Item {
    pub fn as_area(&self) -> Option<&Area> {
        match self {
            Item::Area(area) => Some(area),
            Item::Fragment(_) => None,
        }
    }

    pub fn as_fragment(&self) -> Option<&Fragment> {
        match self {
            Item::Fragment(fragment) => Some(fragment),
            Item::Area(_) => None,
        }
    }

    pub fn as_fragment_mut(&mut self) -> Option<&mut Fragment> {
        match self {
            Item::Fragment(fragment) => Some(fragment),
            Item::Area(_) => None,
        }
    }

    pub fn is_fragment(&self) -> bool {
        matches!(self, Item::Fragment(_))
    }

    /// The cookie of the area or fragment.
    pub fn cookie(&self) -> Option<&Cookie> {
        match self {
            Item::Area(area) => area.cookie(),
            Item::Fragment(fragment) => fragment.cookie(),
        }
    }

    /// Structural id of this item.
    pub fn structure_id(&self) -> String {
        let mut out = String::new();
        self.write_id(&mut out);
        out
    }

    fn write_id(&self, out: &mut String) {
        match self {
            Item::Area(area) => write_key(area.key(), out),
            Item::Fragment(fragment) => fragment.write_id(out),
        }
    }

    /// Number of leaf areas below (or at) this item.
    pub fn area_count(&self) -> usize {
        match self {
            Item::Area(_) => 1,
            Item::Fragment(fragment) => fragment.area_count(),
        }
    }
}

/// Leaf keys are escaped so that a key holding `(`, `)` or `,` cannot
/// read as tree structure.
fn write_key(key: &str, out: &mut String) {
    for c in key.chars() {
        if matches!(c, '(' | ')' | ',' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
}

impl From<Area> for Item {
    fn from(area: Area) -> Self {
        Item::Area(area)
    }
}

impl From<Fragment> for Item {
    fn from(fragment: Fragment) -> Self {
        Item::Fragment(fragment)
    }
}

/// An ordered sequence of items laid out along one direction.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Fragment {
    direction: Direction,
    items: Vec<Item>,
    cookie: Option<Cookie>,
}

impl Fragment {
    /// Create an empty fragment.
    pub fn new(direction: Direction) -> Self {
        Self {
            direction,
            items: Vec::new(),
            cookie: None,
        }
    }

    pub fn horizontal() -> Self {
        Self::new(Direction::Horizontal)
    }

    pub fn vertical() -> Self {
        Self::new(Direction::Vertical)
    }

    /// Create a fragment holding the given items.
    pub fn with_items(direction: Direction, items: impl IntoIterator<Item = Item>) -> Self {
        Self {
            direction,
            items: items.into_iter().collect(),
            cookie: None,
        }
    }

    /// Append an item (builder style).
    pub fn with(mut self, item: impl Into<Item>) -> Self {
        self.items.push(item.into());
        self
    }

    pub fn with_cookie(mut self, cookie: Cookie) -> Self {
        self.cookie = Some(cookie);
        self
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn set_direction(&mut self, direction: Direction) {
        self.direction = direction;
    }

    pub fn is_horizontal(&self) -> bool {
        self.direction == Direction::Horizontal
    }

    pub fn is_vertical(&self) -> bool {
        self.direction == Direction::Vertical
    }

    /// Copy of this fragment with the direction flipped. Children are not
    /// regrouped and keep their own directions.
    pub fn flipped(&self) -> Fragment {
        let mut copy = self.clone();
        copy.direction = self.direction.flipped();
        copy
    }

    pub fn cookie(&self) -> Option<&Cookie> {
        self.cookie.as_ref()
    }

    pub fn set_cookie(&mut self, cookie: Option<Cookie>) {
        self.cookie = cookie;
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn items_mut(&mut self) -> &mut Vec<Item> {
        &mut self.items
    }

    pub fn into_items(self) -> Vec<Item> {
        self.items
    }

    pub fn item(&self, index: usize) -> Option<&Item> {
        self.items.get(index)
    }

    pub fn push(&mut self, item: impl Into<Item>) {
        self.items.push(item.into());
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// A wrapper is a fragment whose only child is another fragment. It is
    /// transparent for tab assignment.
    pub fn is_wrapper(&self) -> bool {
        self.items.len() == 1 && self.items[0].is_fragment()
    }

    /// The fragment this one stands for once wrappers are collapsed.
    pub fn effective(&self) -> &Fragment {
        let mut current = self;
        while let [Item::Fragment(inner)] = current.items.as_slice() {
            current = inner;
        }
        current
    }

    /// Recursive structural id: direction tag followed by the children's ids,
    /// e.g. `h(TextView,v(Button,EditText))`.
    pub fn structure_id(&self) -> String {
        let mut out = String::new();
        self.write_id(&mut out);
        out
    }

    fn write_id(&self, out: &mut String) {
        out.push(self.direction.tag());
        out.push('(');
        for (i, item) in self.items.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            item.write_id(out);
        }
        out.push(')');
    }

    /// Two fragments are equivalent if their structural ids match, no matter
    /// which component instances the leaves refer to.
    pub fn is_equivalent(&self, other: &Fragment) -> bool {
        self.direction == other.direction
            && self.items.len() == other.items.len()
            && self.structure_id() == other.structure_id()
    }

    /// All leaf areas in layout order.
    pub fn areas(&self) -> Vec<&Area> {
        let mut out = Vec::new();
        self.collect_areas(&mut out);
        out
    }

    fn collect_areas<'a>(&'a self, out: &mut Vec<&'a Area>) {
        for item in &self.items {
            match item {
                Item::Area(area) => out.push(area),
                Item::Fragment(fragment) => fragment.collect_areas(out),
            }
        }
    }

    pub fn area_count(&self) -> usize {
        self.items.iter().map(Item::area_count).sum()
    }

    /// Number of fragments in this tree, including this one.
    pub fn fragment_count(&self) -> usize {
        1 + self
            .items
            .iter()
            .filter_map(Item::as_fragment)
            .map(Fragment::fragment_count)
            .sum::<usize>()
    }

    /// Nesting depth; a fragment holding only areas has depth 1.
    pub fn depth(&self) -> usize {
        1 + self
            .items
            .iter()
            .filter_map(Item::as_fragment)
            .map(Fragment::depth)
            .max()
            .unwrap_or(0)
    }

    /// Resolve a path of child indices to a sub-fragment.
    pub fn fragment_at(&self, path: &[usize]) -> Option<&Fragment> {
        let mut current = self;
        for &index in path {
            current = current.items.get(index)?.as_fragment()?;
        }
        Some(current)
    }

    /// Mutable variant of [`Fragment::fragment_at`].
    pub fn fragment_at_mut(&mut self, path: &[usize]) -> Option<&mut Fragment> {
        let mut current = self;
        for &index in path {
            current = current.items.get_mut(index)?.as_fragment_mut()?;
        }
        Some(current)
    }

    /// Replace the sub-fragment at `path`, returning the previous one.
    pub fn replace_at(&mut self, path: &[usize], replacement: Fragment) -> Option<Fragment> {
        let target = self.fragment_at_mut(path)?;
        Some(std::mem::replace(target, replacement))
    }

    /// Visit every fragment of the tree in pre-order together with its path.
    pub fn for_each_fragment<F>(&self, mut visit: F)
    where
        F: FnMut(&[usize], &Fragment),
    {
        let mut path = Vec::new();
        self.walk(&mut path, &mut visit);
    }

    fn walk<F>(&self, path: &mut Vec<usize>, visit: &mut F)
    where
        F: FnMut(&[usize], &Fragment),
    {
        visit(path.as_slice(), self);
        for (i, item) in self.items.iter().enumerate() {
            if let Item::Fragment(child) = item {
                path.push(i);
                child.walk(path, visit);
                path.pop();
            }
        }
    }
}

impl fmt::Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.structure_id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(key: &str) -> Area {
        Area::new().with_id(key)
    }

    fn form() -> Fragment {
        Fragment::vertical()
            .with(leaf("TextView"))
            .with(Fragment::horizontal().with(leaf("Button")).with(leaf("EditText")))
    }

    #[test]
    fn test_structure_id() {
        assert_eq!(form().structure_id(), "v(TextView,h(Button,EditText))");
        assert_eq!(Fragment::horizontal().structure_id(), "h()");
    }

    #[test]
    fn test_equivalence_ignores_instances() {
        let a = form();
        let b = form();
        assert!(a.is_equivalent(&b));
        assert!(!a.is_equivalent(&a.flipped()));
    }

    #[test]
    fn test_clone_is_independent() {
        let original = form();
        let mut copy = original.clone();
        copy.fragment_at_mut(&[1]).unwrap().set_direction(Direction::Vertical);
        assert_eq!(original.structure_id(), "v(TextView,h(Button,EditText))");
        assert_eq!(copy.structure_id(), "v(TextView,v(Button,EditText))");
    }

    #[test]
    fn test_keys_cannot_forge_structure() {
        let joined = Fragment::vertical().with(Fragment::horizontal().with(leaf("a,b")));
        let split = Fragment::vertical().with(Fragment::horizontal().with(leaf("a")).with(leaf("b")));
        assert_eq!(joined.structure_id(), r"v(h(a\,b))");
        assert!(!joined.is_equivalent(&split));
    }

    #[test]
    fn test_paths() {
        let f = form();
        let mut seen = Vec::new();
        f.for_each_fragment(|path, fragment| seen.push((path.to_vec(), fragment.len())));
        assert_eq!(seen, vec![(vec![], 2), (vec![1], 2)]);
        assert!(f.fragment_at(&[0]).is_none());
        assert!(f.fragment_at(&[5]).is_none());
    }

    #[test]
    fn test_counts() {
        let f = form();
        assert_eq!(f.area_count(), 3);
        assert_eq!(f.fragment_count(), 2);
        assert_eq!(f.depth(), 2);
        let keys: Vec<_> = f.areas().iter().map(|a| a.key().to_string()).collect();
        assert_eq!(keys, ["TextView", "Button", "EditText"]);
    }

    #[test]
    fn test_effective_collapses_wrappers() {
        let inner = Fragment::vertical().with(leaf("a")).with(leaf("b"));
        let wrapped = Fragment::horizontal().with(Fragment::horizontal().with(inner.clone()));
        assert!(wrapped.is_wrapper());
        assert_eq!(wrapped.effective(), &inner);
        assert!(!inner.is_wrapper());
    }

    #[test]
    fn test_replace_at() {
        let mut f = form();
        let old = f.replace_at(&[1], Fragment::vertical().with(leaf("x"))).unwrap();
        assert_eq!(old.structure_id(), "h(Button,EditText)");
        assert_eq!(f.structure_id(), "v(TextView,v(x))");
        assert!(f.replace_at(&[0], Fragment::vertical()).is_none());
    }
}
