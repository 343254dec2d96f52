//! Constraint builder: turns a fragment tree into a linear layout spec.
//!
//! Tabs are allocated from an arena owned by the [`LayoutSpec`]. Areas never
//! hold tabs themselves, so the same fragment can be built any number of
//! times and every build starts from a clean arena.

use std::fmt;

use alm_core::{Area, Axis, Bounds, ConstraintError, Fragment, Item, Size, SizeHint};
use indexmap::IndexMap;

use crate::cassowary::{Constraint, Expression, Relation, Solver, Strength, Variable};

/// A named layout variable: an x-tab (vertical line) or y-tab (horizontal
/// line).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tab {
    axis: Axis,
    index: usize,
}

impl Tab {
    pub fn axis(&self) -> Axis {
        self.axis
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.axis {
            Axis::X => write!(f, "x{}", self.index),
            Axis::Y => write!(f, "y{}", self.index),
        }
    }
}

/// Allocator for tabs of one build.
#[derive(Debug, Clone, Default)]
pub struct TabArena {
    x_count: usize,
    y_count: usize,
}

impl TabArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn x_tab(&mut self) -> Tab {
        self.x_count += 1;
        Tab {
            axis: Axis::X,
            index: self.x_count - 1,
        }
    }

    pub fn y_tab(&mut self) -> Tab {
        self.y_count += 1;
        Tab {
            axis: Axis::Y,
            index: self.y_count - 1,
        }
    }

    fn tab(&mut self, axis: Axis) -> Tab {
        match axis {
            Axis::X => self.x_tab(),
            Axis::Y => self.y_tab(),
        }
    }

    pub fn x_count(&self) -> usize {
        self.x_count
    }

    pub fn y_count(&self) -> usize {
        self.y_count
    }

    /// Forget all allocated tabs.
    pub fn reset(&mut self) {
        self.x_count = 0;
        self.y_count = 0;
    }
}

/// The four tabs bounding an area or fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AreaTabs {
    pub left: Tab,
    pub top: Tab,
    pub right: Tab,
    pub bottom: Tab,
}

impl AreaTabs {
    fn leading(&self, axis: Axis) -> Tab {
        match axis {
            Axis::X => self.left,
            Axis::Y => self.top,
        }
    }

    fn trailing(&self, axis: Axis) -> Tab {
        match axis {
            Axis::X => self.right,
            Axis::Y => self.bottom,
        }
    }

    /// Copy with the span along `axis` replaced.
    fn with_span(&self, axis: Axis, leading: Tab, trailing: Tab) -> AreaTabs {
        match axis {
            Axis::X => AreaTabs {
                left: leading,
                right: trailing,
                ..*self
            },
            Axis::Y => AreaTabs {
                top: leading,
                bottom: trailing,
                ..*self
            },
        }
    }
}

/// An area as placed in a layout spec.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecArea {
    pub tabs: AreaTabs,
    /// Minimum size after the preferred-size fallback.
    pub min: SizeHint,
    pub preferred: SizeHint,
    pub max: SizeHint,
}

impl SpecArea {
    fn new(area: &Area, tabs: AreaTabs) -> Self {
        Self {
            tabs,
            min: area.effective_min_size(),
            preferred: area.preferred_size(),
            max: area.max_size(),
        }
    }
}

/// Result of solving a layout spec for a target size.
#[derive(Debug, Clone, Default)]
pub struct SolvedLayout {
    /// Extent of the whole layout.
    pub size: Size,
    /// Bounds of every area in layout order.
    pub areas: Vec<Bounds>,
    tabs: IndexMap<Tab, f64>,
}

impl SolvedLayout {
    /// Solved position of a tab.
    pub fn tab(&self, tab: Tab) -> Option<f64> {
        self.tabs.get(&tab).copied()
    }
}

/// Linear layout specification of one fragment tree.
#[derive(Debug, Clone)]
pub struct LayoutSpec {
    arena: TabArena,
    areas: Vec<SpecArea>,
    bounds: AreaTabs,
}

impl LayoutSpec {
    /// Build the spec of a fragment tree.
    pub fn from_fragment(fragment: &Fragment) -> Self {
        let mut arena = TabArena::new();
        let bounds = Self::outer_tabs(&mut arena);
        let mut spec = Self {
            arena,
            areas: Vec::new(),
            bounds,
        };
        spec.assign(fragment, bounds);
        spec
    }

    /// Rebuild in place for another fragment, discarding all previous tabs.
    pub fn rebuild(&mut self, fragment: &Fragment) {
        self.arena.reset();
        self.areas.clear();
        self.bounds = Self::outer_tabs(&mut self.arena);
        let bounds = self.bounds;
        self.assign(fragment, bounds);
    }

    fn outer_tabs(arena: &mut TabArena) -> AreaTabs {
        let left = arena.x_tab();
        let top = arena.y_tab();
        let right = arena.x_tab();
        let bottom = arena.y_tab();
        AreaTabs {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Chain the children of `fragment` between the given tabs. Wrappers
    /// share their tabs with the fragment they wrap.
    fn assign(&mut self, fragment: &Fragment, bounds: AreaTabs) {
        let fragment = fragment.effective();
        let axis = fragment.direction().axis();
        let count = fragment.len();

        let mut leading = bounds.leading(axis);
        for (i, item) in fragment.items().iter().enumerate() {
            let trailing = if i + 1 == count {
                bounds.trailing(axis)
            } else {
                self.arena.tab(axis)
            };
            let item_bounds = bounds.with_span(axis, leading, trailing);
            match item {
                Item::Area(area) => self.areas.push(SpecArea::new(area, item_bounds)),
                Item::Fragment(child) => self.assign(child, item_bounds),
            }
            leading = trailing;
        }
    }

    /// Areas in layout order.
    pub fn areas(&self) -> &[SpecArea] {
        &self.areas
    }

    /// The global left, top, right and bottom tabs.
    pub fn bounds(&self) -> AreaTabs {
        self.bounds
    }

    pub fn arena(&self) -> &TabArena {
        &self.arena
    }

    /// Smallest bounding box satisfying every area minimum.
    pub fn min_size(&self) -> Result<Size, ConstraintError> {
        let mut system = TabSystem::new(&self.arena, self.bounds)?;
        for area in &self.areas {
            system.add_extent(area.tabs, area.min, Relation::GreaterOrEqual, Strength::REQUIRED)?;
        }
        system.pull_to_origin()?;
        Ok(system.size())
    }

    /// Size of the layout when every area gets at least its preferred size.
    ///
    /// Preferred sizes act as strong lower bounds, so the result is the sum
    /// of the preferred sizes along a fragment and their maximum across it.
    pub fn preferred_size(&self) -> Result<Size, ConstraintError> {
        let mut system = TabSystem::new(&self.arena, self.bounds)?;
        for area in &self.areas {
            system.add_extent(area.tabs, area.min, Relation::GreaterOrEqual, Strength::REQUIRED)?;
            system.add_extent(
                area.tabs,
                area.preferred,
                Relation::GreaterOrEqual,
                Strength::STRONG,
            )?;
            system.add_extent(area.tabs, area.max, Relation::LessOrEqual, Strength::MEDIUM)?;
        }
        system.pull_to_origin()?;
        Ok(system.size())
    }

    /// Solve the layout for a target size.
    pub fn solve(&self, target: Size) -> Result<SolvedLayout, ConstraintError> {
        let mut system = TabSystem::new(&self.arena, self.bounds)?;
        system.add_position(self.bounds.right, target.width, Strength::STRONG)?;
        system.add_position(self.bounds.bottom, target.height, Strength::STRONG)?;
        for area in &self.areas {
            system.add_extent(area.tabs, area.min, Relation::GreaterOrEqual, Strength::REQUIRED)?;
            system.add_extent(area.tabs, area.max, Relation::LessOrEqual, Strength::MEDIUM)?;
            system.add_extent(area.tabs, area.preferred, Relation::Equal, Strength::WEAK)?;
        }

        let areas = self
            .areas
            .iter()
            .map(|area| {
                Bounds::from_edges(
                    system.value(area.tabs.left),
                    system.value(area.tabs.top),
                    system.value(area.tabs.right),
                    system.value(area.tabs.bottom),
                )
            })
            .collect();

        let mut tabs = IndexMap::new();
        for index in 0..self.arena.x_count() {
            let tab = Tab { axis: Axis::X, index };
            tabs.insert(tab, system.value(tab));
        }
        for index in 0..self.arena.y_count() {
            let tab = Tab { axis: Axis::Y, index };
            tabs.insert(tab, system.value(tab));
        }

        Ok(SolvedLayout {
            size: system.size(),
            areas,
            tabs,
        })
    }
}

/// A fresh solver with one variable per tab of an arena.
struct TabSystem {
    solver: Solver,
    x: Vec<Variable>,
    y: Vec<Variable>,
    bounds: AreaTabs,
}

impl TabSystem {
    /// Create the system. The global left and top tabs are fixed at zero and
    /// no area may have a negative extent.
    fn new(arena: &TabArena, bounds: AreaTabs) -> Result<Self, ConstraintError> {
        let mut solver = Solver::new();
        let x = (0..arena.x_count()).map(|_| solver.new_variable()).collect();
        let y = (0..arena.y_count()).map(|_| solver.new_variable()).collect();
        let mut system = Self { solver, x, y, bounds };
        system.add_position(bounds.left, 0.0, Strength::REQUIRED)?;
        system.add_position(bounds.top, 0.0, Strength::REQUIRED)?;
        Ok(system)
    }

    fn var(&self, tab: Tab) -> Variable {
        match tab.axis {
            Axis::X => self.x[tab.index],
            Axis::Y => self.y[tab.index],
        }
    }

    fn value(&self, tab: Tab) -> f64 {
        self.solver.get_value(self.var(tab))
    }

    fn size(&self) -> Size {
        Size::new(
            self.value(self.bounds.right) - self.value(self.bounds.left),
            self.value(self.bounds.bottom) - self.value(self.bounds.top),
        )
    }

    /// `tab == value`
    fn add_position(&mut self, tab: Tab, value: f64, strength: Strength) -> Result<(), ConstraintError> {
        let expression = Expression::from_variable(self.var(tab)).plus(-value);
        self.solver
            .add_constraint(&Constraint::new(expression, Relation::Equal, strength))
    }

    /// `to - from <relation> value`
    fn add_span(
        &mut self,
        from: Tab,
        to: Tab,
        relation: Relation,
        value: f64,
        strength: Strength,
    ) -> Result<(), ConstraintError> {
        let expression = Expression::from_variable(self.var(to))
            .term(self.var(from), -1.0)
            .plus(-value);
        self.solver
            .add_constraint(&Constraint::new(expression, relation, strength))
    }

    /// Constrain width and height of an area. Undefined components add no
    /// constraint, except that a missing lower bound still keeps the extent
    /// non-negative.
    fn add_extent(
        &mut self,
        tabs: AreaTabs,
        hint: SizeHint,
        relation: Relation,
        strength: Strength,
    ) -> Result<(), ConstraintError> {
        let lower_bound = relation == Relation::GreaterOrEqual && strength.is_required();
        for (from, to, value) in [
            (tabs.left, tabs.right, hint.width),
            (tabs.top, tabs.bottom, hint.height),
        ] {
            match value {
                Some(value) => self.add_span(from, to, relation, value, strength)?,
                None if lower_bound => {
                    self.add_span(from, to, Relation::GreaterOrEqual, 0.0, Strength::REQUIRED)?
                }
                None => {}
            }
        }
        Ok(())
    }

    /// Pull the far edges towards the origin so the layout takes its
    /// smallest extent allowed by the other constraints.
    fn pull_to_origin(&mut self) -> Result<(), ConstraintError> {
        self.add_position(self.bounds.right, 0.0, Strength::WEAK)?;
        self.add_position(self.bounds.bottom, 0.0, Strength::WEAK)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alm_core::Direction;

    fn area(min: (f64, f64), pref: (f64, f64)) -> Area {
        Area::with_sizes(
            SizeHint::new(min.0, min.1),
            SizeHint::new(pref.0, pref.1),
            SizeHint::UNDEFINED,
        )
    }

    fn row() -> Fragment {
        Fragment::horizontal()
            .with(area((10.0, 10.0), (20.0, 20.0)))
            .with(area((10.0, 10.0), (30.0, 10.0)))
            .with(area((10.0, 10.0), (10.0, 30.0)))
    }

    fn close(a: Size, b: Size) -> bool {
        (a.width - b.width).abs() < 1e-6 && (a.height - b.height).abs() < 1e-6
    }

    #[test]
    fn test_adjacent_areas_share_tabs() {
        let spec = LayoutSpec::from_fragment(&row());
        let areas = spec.areas();
        assert_eq!(areas.len(), 3);
        assert_eq!(areas[0].tabs.left, spec.bounds().left);
        assert_eq!(areas[0].tabs.right, areas[1].tabs.left);
        assert_eq!(areas[1].tabs.right, areas[2].tabs.left);
        assert_eq!(areas[2].tabs.right, spec.bounds().right);
        assert!(areas.iter().all(|a| a.tabs.top == spec.bounds().top));
        assert_eq!(spec.arena().x_count(), 4);
        assert_eq!(spec.arena().y_count(), 2);
    }

    #[test]
    fn test_min_and_preferred_size_of_row() {
        let spec = LayoutSpec::from_fragment(&row());
        assert!(close(spec.min_size().unwrap(), Size::new(30.0, 10.0)));
        assert!(close(spec.preferred_size().unwrap(), Size::new(60.0, 30.0)));
    }

    #[test]
    fn test_column_sums_heights() {
        let mut column = row();
        column.set_direction(Direction::Vertical);
        let spec = LayoutSpec::from_fragment(&column);
        assert!(close(spec.min_size().unwrap(), Size::new(10.0, 30.0)));
        assert!(close(spec.preferred_size().unwrap(), Size::new(30.0, 60.0)));
    }

    #[test]
    fn test_nested_min_size() {
        // v(h(a,b), c): width is the larger of (a+b) and c
        let fragment = Fragment::vertical()
            .with(
                Fragment::horizontal()
                    .with(area((10.0, 5.0), (10.0, 5.0)))
                    .with(area((15.0, 8.0), (15.0, 8.0))),
            )
            .with(area((20.0, 4.0), (20.0, 4.0)));
        let spec = LayoutSpec::from_fragment(&fragment);
        assert!(close(spec.min_size().unwrap(), Size::new(25.0, 12.0)));
    }

    #[test]
    fn test_wrapper_shares_tabs() {
        let plain = row();
        let wrapped = Fragment::vertical().with(row());
        let a = LayoutSpec::from_fragment(&plain);
        let b = LayoutSpec::from_fragment(&wrapped);
        assert_eq!(a.areas(), b.areas());
    }

    #[test]
    fn test_undefined_sizes_add_no_minimum() {
        let fragment = Fragment::horizontal().with(Area::new()).with(Area::new());
        let spec = LayoutSpec::from_fragment(&fragment);
        assert!(close(spec.min_size().unwrap(), Size::ZERO));
        assert!(close(spec.preferred_size().unwrap(), Size::ZERO));
    }

    #[test]
    fn test_empty_fragment() {
        let spec = LayoutSpec::from_fragment(&Fragment::vertical());
        assert!(spec.areas().is_empty());
        assert!(close(spec.min_size().unwrap(), Size::ZERO));
    }

    #[test]
    fn test_solve_fills_target() {
        let spec = LayoutSpec::from_fragment(&row());
        let solved = spec.solve(Size::new(100.0, 40.0)).unwrap();
        assert!(close(solved.size, Size::new(100.0, 40.0)));
        assert_eq!(solved.areas.len(), 3);

        let widths: f64 = solved.areas.iter().map(|b| b.width).sum();
        assert!((widths - 100.0).abs() < 1e-6);
        assert!(solved.areas.iter().all(|b| b.width >= 10.0 - 1e-6));
        assert!(solved.areas.iter().all(|b| (b.height - 40.0).abs() < 1e-6));
        assert!(solved.tab(spec.bounds().left).is_some_and(|x| x.abs() < 1e-9));
    }

    #[test]
    fn test_solve_below_min_keeps_minimum() {
        let spec = LayoutSpec::from_fragment(&row());
        let solved = spec.solve(Size::new(5.0, 5.0)).unwrap();
        assert!(solved.size.width >= 30.0 - 1e-6);
        assert!(solved.size.height >= 10.0 - 1e-6);
    }

    #[test]
    fn test_rebuild_matches_fresh_build() {
        let other = Fragment::vertical().with(area((1.0, 2.0), (3.0, 4.0)));
        let mut spec = LayoutSpec::from_fragment(&row());
        spec.rebuild(&other);
        let fresh = LayoutSpec::from_fragment(&other);
        assert_eq!(spec.areas(), fresh.areas());
        assert_eq!(spec.arena().x_count(), fresh.arena().x_count());
        assert!(close(spec.min_size().unwrap(), fresh.min_size().unwrap()));
    }
}
