//! Row and column flows and their inverses.
//!
//! A flow breaks a single run into a stack of shorter runs (a grid-like
//! arrangement). The inverse flows flatten such a stack back into one run.

use alm_core::{Direction, Fragment, Item};

use crate::trafo::{group, keep_cookie, Alternative, Transformation};

/// Re-flow the children of a `run` fragment into chunks of `run` direction
/// stacked along the other direction. One alternative per distinct chunk
/// size, quality `1 / rows`.
fn flow(fragment: &Fragment, run: Direction) -> Vec<Alternative> {
    if fragment.direction() != run {
        return Vec::new();
    }

    let count = fragment.len();
    let mut seen_chunks = Vec::new();
    let mut out = Vec::new();
    for rows in 2..=count {
        let chunk = count.div_ceil(rows);
        // one item per row is just a swap
        if chunk < 2 || seen_chunks.contains(&chunk) {
            continue;
        }
        seen_chunks.push(chunk);

        let stacked: Vec<Item> = fragment
            .items()
            .chunks(chunk)
            .map(|items| group(run, items.to_vec()))
            .collect();
        let n_rows = stacked.len();
        let result = keep_cookie(fragment, Fragment::with_items(run.flipped(), stacked));
        out.push(Alternative::new(result, 1.0 / n_rows as f64));
    }
    out
}

/// Splice the `run` children of a stacked fragment into one `run` fragment.
/// Items that are not `run` fragments count as single-item runs.
fn inverse_flow(fragment: &Fragment, run: Direction) -> Vec<Alternative> {
    if !is_stack_of(fragment, run) {
        return Vec::new();
    }

    let mut items = Vec::new();
    for item in fragment.items() {
        match item {
            Item::Fragment(child) if child.direction() == run => {
                items.extend(child.items().iter().cloned())
            }
            other => items.push(other.clone()),
        }
    }
    let result = keep_cookie(fragment, Fragment::with_items(run, items));
    vec![Alternative::new(result, 1.0)]
}

fn is_stack_of(fragment: &Fragment, run: Direction) -> bool {
    fragment.direction() == run.flipped()
        && fragment.len() >= 2
        && fragment
            .items()
            .iter()
            .any(|item| item.as_fragment().is_some_and(|f| f.direction() == run))
}

/// `h(a,b,c,d)` → `v(h(a,b),h(c,d))`
#[derive(Debug, Clone, Copy, Default)]
pub struct RowFlowTrafo;

impl Transformation for RowFlowTrafo {
    fn name(&self) -> &'static str {
        "row_flow"
    }

    fn is_applicable(&self, fragment: &Fragment) -> bool {
        fragment.is_horizontal() && fragment.len() >= 3
    }

    fn apply(&self, fragment: &Fragment) -> Vec<Alternative> {
        flow(fragment, Direction::Horizontal)
    }
}

/// `v(a,b,c,d)` → `h(v(a,b),v(c,d))`
#[derive(Debug, Clone, Copy, Default)]
pub struct ColumnFlowTrafo;

impl Transformation for ColumnFlowTrafo {
    fn name(&self) -> &'static str {
        "column_flow"
    }

    fn is_applicable(&self, fragment: &Fragment) -> bool {
        fragment.is_vertical() && fragment.len() >= 3
    }

    fn apply(&self, fragment: &Fragment) -> Vec<Alternative> {
        flow(fragment, Direction::Vertical)
    }
}

/// `v(h(a,b),c,h(d,e))` → `h(a,b,c,d,e)`
///
/// Leaf order is kept. Row membership is lost, which is the point: the
/// result is the flat run a row flow could have started from.
#[derive(Debug, Clone, Copy, Default)]
pub struct InverseRowFlowTrafo;

impl Transformation for InverseRowFlowTrafo {
    fn name(&self) -> &'static str {
        "inverse_row_flow"
    }

    fn is_applicable(&self, fragment: &Fragment) -> bool {
        is_stack_of(fragment, Direction::Horizontal)
    }

    fn apply(&self, fragment: &Fragment) -> Vec<Alternative> {
        inverse_flow(fragment, Direction::Horizontal)
    }
}

/// `h(v(a,b),v(c,d))` → `v(a,b,c,d)`
#[derive(Debug, Clone, Copy, Default)]
pub struct InverseColumnFlowTrafo;

impl Transformation for InverseColumnFlowTrafo {
    fn name(&self) -> &'static str {
        "inverse_column_flow"
    }

    fn is_applicable(&self, fragment: &Fragment) -> bool {
        is_stack_of(fragment, Direction::Vertical)
    }

    fn apply(&self, fragment: &Fragment) -> Vec<Alternative> {
        inverse_flow(fragment, Direction::Vertical)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alm_core::parse_notation;

    fn ids(out: &[Alternative]) -> Vec<String> {
        out.iter().map(|a| a.fragment.structure_id()).collect()
    }

    #[test]
    fn test_row_flow_distinct_chunk_sizes() {
        let f = parse_notation("h(a,b,c,d,e,f)").unwrap();
        let out = RowFlowTrafo.apply(&f);
        assert_eq!(
            ids(&out),
            ["v(h(a,b,c),h(d,e,f))", "v(h(a,b),h(c,d),h(e,f))"]
        );
        assert!((out[0].quality - 0.5).abs() < 1e-12);
        assert!((out[1].quality - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_row_flow_short_last_row() {
        let f = parse_notation("h(a,b,c)").unwrap();
        assert_eq!(ids(&RowFlowTrafo.apply(&f)), ["v(h(a,b),c)"]);
        assert!(RowFlowTrafo.apply(&parse_notation("h(a,b)").unwrap()).is_empty());
    }

    #[test]
    fn test_column_flow() {
        let f = parse_notation("v(a,b,c,d)").unwrap();
        assert_eq!(ids(&ColumnFlowTrafo.apply(&f)), ["h(v(a,b),v(c,d))"]);
        assert!(ColumnFlowTrafo.apply(&parse_notation("h(a,b,c,d)").unwrap()).is_empty());
    }

    #[test]
    fn test_inverse_row_flow_undoes_row_flow() {
        let f = parse_notation("h(a,b,c,d,e)").unwrap();
        for alternative in RowFlowTrafo.apply(&f) {
            let back = InverseRowFlowTrafo.apply(&alternative.fragment);
            assert!(back[0].fragment.is_equivalent(&f));
        }
    }

    #[test]
    fn test_inverse_flow_keeps_other_items() {
        let f = parse_notation("v(h(a,b),c,v(d,e))").unwrap();
        assert_eq!(ids(&InverseRowFlowTrafo.apply(&f)), ["h(a,b,c,v(d,e))"]);

        let g = parse_notation("h(v(a,b),v(c,d))").unwrap();
        assert_eq!(ids(&InverseColumnFlowTrafo.apply(&g)), ["v(a,b,c,d)"]);
    }

    #[test]
    fn test_inverse_flow_needs_a_run() {
        assert!(InverseRowFlowTrafo.apply(&parse_notation("v(a,b)").unwrap()).is_empty());
        assert!(InverseRowFlowTrafo.apply(&parse_notation("v(h(a,b))").unwrap()).is_empty());
    }
}
