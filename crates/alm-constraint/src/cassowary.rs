//! Incremental simplex solver with constraint strengths.
//!
//! Follows Badros and Borning's Cassowary algorithm: required constraints
//! are hard, every other constraint adds its weighted error to the
//! objective, which is minimized after each insertion.
//!
//! All tableau maps are ordered by symbol id, so pivot choices and therefore
//! solutions are identical for identical constraint input.

use std::collections::BTreeMap;

use alm_core::ConstraintError;

/// Unique identifier for a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Variable(pub(crate) usize);

impl Variable {
    /// Index of the variable in creation order.
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Symbol kinds used internally in the solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
enum SymbolKind {
    /// An external variable (the actual unknowns we're solving for)
    External,
    /// A slack variable (for inequality constraints)
    Slack,
    /// An error variable (for non-required constraints)
    Error,
    /// A dummy variable (for required equality constraints)
    Dummy,
}

/// A tableau symbol. Ordered by id first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
struct Symbol {
    id: usize,
    kind: SymbolKind,
}

impl Symbol {
    fn is_external(&self) -> bool {
        self.kind == SymbolKind::External
    }

    fn is_dummy(&self) -> bool {
        self.kind == SymbolKind::Dummy
    }

    fn is_pivotable(&self) -> bool {
        matches!(self.kind, SymbolKind::Slack | SymbolKind::Error)
    }
}

/// A linear expression in the form: constant + Σ(coefficient * variable)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Expression {
    pub constant: f64,
    terms: Vec<(Variable, f64)>,
}

impl Expression {
    /// Create a constant expression.
    pub fn from_constant(value: f64) -> Self {
        Self {
            constant: value,
            terms: Vec::new(),
        }
    }

    /// Create an expression from a single variable.
    pub fn from_variable(var: Variable) -> Self {
        Self {
            constant: 0.0,
            terms: vec![(var, 1.0)],
        }
    }

    /// Add a term to the expression.
    pub fn add_term(&mut self, var: Variable, coefficient: f64) {
        self.terms.push((var, coefficient));
    }

    /// Builder variant of [`Expression::add_term`].
    pub fn term(mut self, var: Variable, coefficient: f64) -> Self {
        self.add_term(var, coefficient);
        self
    }

    /// Builder that adds to the constant.
    pub fn plus(mut self, constant: f64) -> Self {
        self.constant += constant;
        self
    }

    /// Get an iterator over the terms.
    pub fn terms(&self) -> impl Iterator<Item = &(Variable, f64)> {
        self.terms.iter()
    }
}

/// Tolerance for floating-point comparisons.
const EPSILON: f64 = 1e-8;

/// Near-zero check for floating point values.
fn near_zero(value: f64) -> bool {
    value.abs() < EPSILON
}

/// Constraint strength levels.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Strength(pub f64);

impl Strength {
    pub const REQUIRED: Strength = Strength(1_001_001_000.0);
    pub const STRONG: Strength = Strength(1_000_000.0);
    pub const MEDIUM: Strength = Strength(1_000.0);
    pub const WEAK: Strength = Strength(1.0);

    /// Create a custom strength.
    pub fn new(value: f64) -> Self {
        Self(value.min(Self::REQUIRED.0))
    }

    /// Check if this is a required constraint.
    pub fn is_required(&self) -> bool {
        self.0 >= Self::REQUIRED.0
    }
}

/// The relation of a constraint: `expression <op> 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    LessOrEqual,
    Equal,
    GreaterOrEqual,
}

/// A constraint to be added to the solver.
#[derive(Debug, Clone)]
pub struct Constraint {
    pub expression: Expression,
    pub relation: Relation,
    pub strength: Strength,
}

impl Constraint {
    /// Create a new constraint.
    pub fn new(expression: Expression, relation: Relation, strength: Strength) -> Self {
        Self {
            expression,
            relation,
            strength,
        }
    }
}

/// Marker symbols of an added constraint.
#[derive(Debug, Clone, Copy)]
struct Tag {
    marker: Symbol,
    other: Option<Symbol>,
}

/// A row in the simplex tableau.
#[derive(Debug, Clone, Default)]
struct Row {
    constant: f64,
    cells: BTreeMap<Symbol, f64>,
}

impl Row {
    fn new(constant: f64) -> Self {
        Self {
            constant,
            cells: BTreeMap::new(),
        }
    }

    fn insert_symbol(&mut self, symbol: Symbol, coefficient: f64) {
        let entry = self.cells.entry(symbol).or_insert(0.0);
        *entry += coefficient;
        if near_zero(*entry) {
            self.cells.remove(&symbol);
        }
    }

    fn insert_row(&mut self, other: &Row, coefficient: f64) {
        self.constant += other.constant * coefficient;
        for (&s, &c) in &other.cells {
            self.insert_symbol(s, c * coefficient);
        }
    }

    fn remove(&mut self, symbol: Symbol) {
        self.cells.remove(&symbol);
    }

    fn reverse_sign(&mut self) {
        self.constant = -self.constant;
        for c in self.cells.values_mut() {
            *c = -*c;
        }
    }

    fn coefficient(&self, symbol: Symbol) -> f64 {
        self.cells.get(&symbol).copied().unwrap_or(0.0)
    }

    /// Solve the row for `symbol`, which is removed from the cells.
    fn solve_for(&mut self, symbol: Symbol) {
        let Some(coeff) = self.cells.remove(&symbol) else {
            return;
        };
        let multiplier = -1.0 / coeff;
        self.constant *= multiplier;
        for c in self.cells.values_mut() {
            *c *= multiplier;
        }
    }

    /// Solve the row `lhs = self` for `rhs`.
    fn solve_for_symbols(&mut self, lhs: Symbol, rhs: Symbol) {
        self.insert_symbol(lhs, -1.0);
        self.solve_for(rhs);
    }

    /// Substitute a symbol in this row with another row.
    fn substitute(&mut self, symbol: Symbol, row: &Row) {
        if let Some(coeff) = self.cells.remove(&symbol) {
            self.insert_row(row, coeff);
        }
    }

    fn all_dummies(&self) -> bool {
        self.cells.keys().all(Symbol::is_dummy)
    }

    fn any_pivotable_symbol(&self) -> Option<Symbol> {
        self.cells.keys().copied().find(Symbol::is_pivotable)
    }
}

/// Which objective row an optimization pass works on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Objective {
    Main,
    Artificial,
}

/// The Cassowary constraint solver.
///
/// A solver is a single-use arena: variables are plain indices into it and
/// are meaningless for any other solver instance.
#[derive(Debug, Default)]
pub struct Solver {
    /// Counter for generating unique variable IDs
    var_counter: usize,
    /// Counter for generating unique symbol IDs
    symbol_counter: usize,
    /// The objective function row
    objective: Row,
    /// Artificial objective for phase 1
    artificial: Option<Row>,
    /// The tableau rows, keyed by their basic symbol
    rows: BTreeMap<Symbol, Row>,
    /// Mapping from variables to their external symbols
    var_symbols: BTreeMap<Variable, Symbol>,
    /// Number of constraints added so far
    constraint_count: usize,
}

impl Solver {
    /// Create a new solver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new variable.
    pub fn new_variable(&mut self) -> Variable {
        let var = Variable(self.var_counter);
        self.var_counter += 1;
        var
    }

    /// Number of constraints added so far.
    pub fn constraint_count(&self) -> usize {
        self.constraint_count
    }

    /// Get the current value of a variable. Variables that take part in no
    /// constraint, or are not basic, are zero.
    pub fn get_value(&self, var: Variable) -> f64 {
        self.var_symbols
            .get(&var)
            .and_then(|symbol| self.rows.get(symbol))
            .map_or(0.0, |row| row.constant)
    }

    /// Add a constraint to the solver.
    pub fn add_constraint(&mut self, constraint: &Constraint) -> Result<(), ConstraintError> {
        let (mut row, tag) = self.create_row(constraint);
        let mut subject = Self::choose_subject(&row, &tag);

        // A row holding only dummies is either redundant or a conflict
        if subject.is_none() && row.all_dummies() {
            if !near_zero(row.constant) {
                return Err(ConstraintError::Unsatisfiable {
                    constraint_desc: describe(constraint),
                });
            }
            subject = Some(tag.marker);
        }

        match subject {
            Some(subject) => {
                row.solve_for(subject);
                self.substitute(subject, &row);
                self.rows.insert(subject, row);
            }
            None => {
                if !self.add_with_artificial_variable(&row)? {
                    return Err(ConstraintError::Unsatisfiable {
                        constraint_desc: describe(constraint),
                    });
                }
            }
        }

        self.constraint_count += 1;
        self.optimize(Objective::Main)
    }

    /// Get or create the external symbol of a variable.
    fn var_symbol(&mut self, var: Variable) -> Symbol {
        if let Some(&symbol) = self.var_symbols.get(&var) {
            return symbol;
        }
        let symbol = self.new_symbol(SymbolKind::External);
        self.var_symbols.insert(var, symbol);
        symbol
    }

    /// Create a row for a constraint.
    fn create_row(&mut self, constraint: &Constraint) -> (Row, Tag) {
        let mut row = Row::new(constraint.expression.constant);

        // Add the terms to the row, substituting basic variables
        for &(var, coeff) in constraint.expression.terms() {
            if near_zero(coeff) {
                continue;
            }
            let symbol = self.var_symbol(var);
            match self.rows.get(&symbol) {
                Some(basic) => row.insert_row(basic, coeff),
                None => row.insert_symbol(symbol, coeff),
            }
        }

        let strength = constraint.strength;
        let tag = match constraint.relation {
            Relation::LessOrEqual | Relation::GreaterOrEqual => {
                let coeff = if constraint.relation == Relation::LessOrEqual {
                    1.0
                } else {
                    -1.0
                };
                let slack = self.new_symbol(SymbolKind::Slack);
                row.insert_symbol(slack, coeff);

                let other = if strength.is_required() {
                    None
                } else {
                    let error = self.new_symbol(SymbolKind::Error);
                    row.insert_symbol(error, -coeff);
                    self.objective.insert_symbol(error, strength.0);
                    Some(error)
                };
                Tag { marker: slack, other }
            }
            Relation::Equal => {
                if strength.is_required() {
                    let dummy = self.new_symbol(SymbolKind::Dummy);
                    row.insert_symbol(dummy, 1.0);
                    Tag { marker: dummy, other: None }
                } else {
                    let errplus = self.new_symbol(SymbolKind::Error);
                    let errminus = self.new_symbol(SymbolKind::Error);
                    row.insert_symbol(errplus, -1.0);
                    row.insert_symbol(errminus, 1.0);
                    self.objective.insert_symbol(errplus, strength.0);
                    self.objective.insert_symbol(errminus, strength.0);
                    Tag {
                        marker: errplus,
                        other: Some(errminus),
                    }
                }
            }
        };

        // Ensure the constant is non-negative
        if row.constant < 0.0 {
            row.reverse_sign();
        }

        (row, tag)
    }

    /// Generate a new symbol.
    fn new_symbol(&mut self, kind: SymbolKind) -> Symbol {
        let id = self.symbol_counter;
        self.symbol_counter += 1;
        Symbol { id, kind }
    }

    /// Choose a subject for the row: an external symbol if there is one,
    /// else a marker with a negative coefficient.
    fn choose_subject(row: &Row, tag: &Tag) -> Option<Symbol> {
        if let Some(&symbol) = row.cells.keys().find(|s| s.is_external()) {
            return Some(symbol);
        }

        [Some(tag.marker), tag.other]
            .into_iter()
            .flatten()
            .find(|s| s.is_pivotable() && row.coefficient(*s) < 0.0)
    }

    /// Add the row with an artificial variable. Returns whether the row
    /// could be satisfied.
    fn add_with_artificial_variable(&mut self, row: &Row) -> Result<bool, ConstraintError> {
        let art = self.new_symbol(SymbolKind::Slack);
        self.rows.insert(art, row.clone());
        self.artificial = Some(row.clone());

        self.optimize(Objective::Artificial)?;
        let success = self
            .artificial
            .take()
            .is_some_and(|artificial| near_zero(artificial.constant));

        if let Some(mut art_row) = self.rows.remove(&art) {
            if art_row.cells.is_empty() {
                return Ok(success);
            }
            let Some(entering) = art_row.any_pivotable_symbol() else {
                return Ok(false);
            };
            art_row.solve_for_symbols(art, entering);
            self.substitute(entering, &art_row);
            self.rows.insert(entering, art_row);
        }

        for r in self.rows.values_mut() {
            r.remove(art);
        }
        self.objective.remove(art);
        Ok(success)
    }

    /// Substitute a symbol throughout the tableau.
    fn substitute(&mut self, symbol: Symbol, row: &Row) {
        for r in self.rows.values_mut() {
            r.substitute(symbol, row);
        }
        self.objective.substitute(symbol, row);
        if let Some(ref mut art) = self.artificial {
            art.substitute(symbol, row);
        }
    }

    /// Optimize the objective function using the simplex algorithm.
    fn optimize(&mut self, which: Objective) -> Result<(), ConstraintError> {
        loop {
            let objective = match which {
                Objective::Main => &self.objective,
                Objective::Artificial => match &self.artificial {
                    Some(artificial) => artificial,
                    None => return Ok(()),
                },
            };

            // Find the entering variable (first negative coefficient in objective)
            let entering = objective
                .cells
                .iter()
                .find(|(s, c)| !s.is_dummy() && **c < 0.0)
                .map(|(&s, _)| s);

            let Some(entering) = entering else {
                return Ok(());
            };

            let Some((leaving, mut row)) = self.take_leaving_row(entering) else {
                return Err(ConstraintError::Unbounded);
            };

            // Pivot
            row.solve_for_symbols(leaving, entering);
            self.substitute(entering, &row);
            self.rows.insert(entering, row);
        }
    }

    /// Find and remove the row to leave the basis (minimum ratio test).
    fn take_leaving_row(&mut self, entering: Symbol) -> Option<(Symbol, Row)> {
        let mut min_ratio = f64::MAX;
        let mut leaving = None;

        for (&symbol, row) in &self.rows {
            if symbol.is_external() {
                continue;
            }
            let coeff = row.coefficient(entering);
            if coeff < 0.0 {
                let ratio = -row.constant / coeff;
                if ratio < min_ratio {
                    min_ratio = ratio;
                    leaving = Some(symbol);
                }
            }
        }

        let leaving = leaving?;
        self.rows.remove(&leaving).map(|row| (leaving, row))
    }
}

fn describe(constraint: &Constraint) -> String {
    let op = match constraint.relation {
        Relation::LessOrEqual => "<=",
        Relation::Equal => "==",
        Relation::GreaterOrEqual => ">=",
    };
    let mut out = String::new();
    for (var, coeff) in constraint.expression.terms() {
        out.push_str(&format!("{:+}*v{} ", coeff, var.0));
    }
    format!("{}{:+} {} 0", out, constraint.expression.constant, op)
}
