//! Selection strategies: which transformation to apply where next.

use std::collections::VecDeque;
use std::sync::Arc;

use alm_core::Fragment;
use alm_trafo::{FragmentRef, Transformation, TrafoHistory};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Index of a transformation in a [`Catalog`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TrafoId(pub usize);

/// Ordered, immutable set of transformations available to a search.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    trafos: Vec<Arc<dyn Transformation>>,
}

impl Catalog {
    pub fn new(trafos: Vec<Arc<dyn Transformation>>) -> Self {
        Self { trafos }
    }

    /// Every known transformation.
    pub fn all() -> Self {
        Self::new(alm_trafo::all_transformations())
    }

    pub fn get(&self, id: TrafoId) -> Option<&Arc<dyn Transformation>> {
        self.trafos.get(id.0)
    }

    /// Id of the transformation with the given name.
    pub fn find(&self, name: &str) -> Option<TrafoId> {
        self.trafos.iter().position(|t| t.name() == name).map(TrafoId)
    }

    pub fn ids(&self) -> impl Iterator<Item = TrafoId> {
        (0..self.trafos.len()).map(TrafoId)
    }

    pub fn len(&self) -> usize {
        self.trafos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trafos.is_empty()
    }

    /// References inside `fragment` that `id` applies to, in pre-order.
    pub fn eligible_targets(&self, id: TrafoId, fragment: &Fragment) -> Vec<FragmentRef> {
        let Some(trafo) = self.get(id) else {
            return Vec::new();
        };
        FragmentRef::targets(fragment)
            .into_iter()
            .filter(|target| target.resolve(fragment).is_ok_and(|f| trafo.is_applicable(f)))
            .collect()
    }
}

/// A fragment waiting to be transformed further.
#[derive(Debug, Clone)]
pub struct FrontierMember {
    pub fragment: Fragment,
    pub history: TrafoHistory,
}

/// Next step proposed by a strategy.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    /// Index into the frontier.
    pub member: usize,
    pub trafo: TrafoId,
    pub target: FragmentRef,
}

/// Chooses the next (frontier member, transformation, sub-fragment) triple.
///
/// The frontier only grows during a run, so strategies may remember how far
/// they have looked. [`reset`](SelectionStrategy::reset) is called at the
/// start of every run.
pub trait SelectionStrategy: Send {
    fn name(&self) -> &str;

    /// The next step, or `None` when the strategy has nothing left to offer.
    fn next(&mut self, frontier: &[FrontierMember], catalog: &Catalog) -> Option<Selection>;

    /// Forget all state from a previous run.
    fn reset(&mut self);
}

/// Applies one transformation to every eligible sub-fragment of every
/// frontier member, in frontier order. Fully deterministic.
#[derive(Debug, Clone)]
pub struct ApplyToAll {
    trafo: TrafoId,
    name: String,
    cursor: usize,
    pending: VecDeque<(usize, FragmentRef)>,
}

impl ApplyToAll {
    pub fn new(trafo: TrafoId) -> Self {
        Self {
            trafo,
            name: format!("apply_to_all({})", trafo.0),
            cursor: 0,
            pending: VecDeque::new(),
        }
    }

    /// Strategy for the catalog transformation named `name`.
    pub fn named(catalog: &Catalog, name: &str) -> Option<Self> {
        let mut strategy = Self::new(catalog.find(name)?);
        strategy.name = format!("apply_to_all({name})");
        Some(strategy)
    }
}

impl SelectionStrategy for ApplyToAll {
    fn name(&self) -> &str {
        &self.name
    }

    fn next(&mut self, frontier: &[FrontierMember], catalog: &Catalog) -> Option<Selection> {
        loop {
            if let Some((member, target)) = self.pending.pop_front() {
                return Some(Selection {
                    member,
                    trafo: self.trafo,
                    target,
                });
            }
            let member = frontier.get(self.cursor)?;
            let index = self.cursor;
            self.cursor += 1;
            self.pending.extend(
                catalog
                    .eligible_targets(self.trafo, &member.fragment)
                    .into_iter()
                    .map(|target| (index, target)),
            );
        }
    }

    fn reset(&mut self) {
        self.cursor = 0;
        self.pending.clear();
    }
}

/// Picks uniformly among all remaining (member, transformation, target)
/// triples. Seeded, so a run is reproducible for a given seed.
#[derive(Debug, Clone)]
pub struct RandomSelector {
    seed: u64,
    rng: StdRng,
    scanned: usize,
    remaining: Vec<Selection>,
}

impl RandomSelector {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: StdRng::seed_from_u64(seed),
            scanned: 0,
            remaining: Vec::new(),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl SelectionStrategy for RandomSelector {
    fn name(&self) -> &str {
        "random"
    }

    fn next(&mut self, frontier: &[FrontierMember], catalog: &Catalog) -> Option<Selection> {
        for (member, entry) in frontier.iter().enumerate().skip(self.scanned) {
            for trafo in catalog.ids() {
                for target in catalog.eligible_targets(trafo, &entry.fragment) {
                    self.remaining.push(Selection {
                        member,
                        trafo,
                        target,
                    });
                }
            }
        }
        self.scanned = self.scanned.max(frontier.len());

        if self.remaining.is_empty() {
            return None;
        }
        let index = self.rng.random_range(0..self.remaining.len());
        Some(self.remaining.swap_remove(index))
    }

    fn reset(&mut self) {
        self.rng = StdRng::seed_from_u64(self.seed);
        self.scanned = 0;
        self.remaining.clear();
    }
}

/// Runs strategies in order, moving to the next one once the current one
/// is exhausted.
#[derive(Default)]
pub struct ChainSelector {
    strategies: Vec<Box<dyn SelectionStrategy>>,
    current: usize,
}

impl std::fmt::Debug for ChainSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainSelector")
            .field(
                "strategies",
                &self.strategies.iter().map(|s| s.name()).collect::<Vec<_>>(),
            )
            .field("current", &self.current)
            .finish()
    }
}

impl ChainSelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a strategy (builder style).
    pub fn then(mut self, strategy: impl SelectionStrategy + 'static) -> Self {
        self.strategies.push(Box::new(strategy));
        self
    }

    pub fn push(&mut self, strategy: Box<dyn SelectionStrategy>) {
        self.strategies.push(strategy);
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}

impl SelectionStrategy for ChainSelector {
    fn name(&self) -> &str {
        "chain"
    }

    fn next(&mut self, frontier: &[FrontierMember], catalog: &Catalog) -> Option<Selection> {
        while let Some(strategy) = self.strategies.get_mut(self.current) {
            if let Some(selection) = strategy.next(frontier, catalog) {
                return Some(selection);
            }
            tracing::debug!(strategy = strategy.name(), "strategy exhausted");
            self.current += 1;
        }
        None
    }

    fn reset(&mut self) {
        self.current = 0;
        for strategy in &mut self.strategies {
            strategy.reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alm_core::parse_notation;

    fn frontier(notations: &[&str]) -> Vec<FrontierMember> {
        notations
            .iter()
            .map(|n| FrontierMember {
                fragment: parse_notation(n).unwrap(),
                history: TrafoHistory::new(),
            })
            .collect()
    }

    fn drain(strategy: &mut dyn SelectionStrategy, frontier: &[FrontierMember], catalog: &Catalog) -> Vec<Selection> {
        std::iter::from_fn(|| strategy.next(frontier, catalog)).collect()
    }

    #[test]
    fn test_apply_to_all_visits_every_target() {
        let catalog = Catalog::all();
        let frontier = frontier(&["v(a,h(b,c))", "h(a,b)"]);
        let mut strategy = ApplyToAll::named(&catalog, "swap").unwrap();
        let picks = drain(&mut strategy, &frontier, &catalog);

        let seen: Vec<_> = picks.iter().map(|s| (s.member, s.target.to_string())).collect();
        assert_eq!(seen, [(0, "/".to_string()), (0, "/1".to_string()), (1, "/".to_string())]);

        strategy.reset();
        assert_eq!(drain(&mut strategy, &frontier, &catalog), picks);
    }

    #[test]
    fn test_apply_to_all_sees_grown_frontier() {
        let catalog = Catalog::all();
        let mut members = frontier(&["h(a,b)"]);
        let mut strategy = ApplyToAll::named(&catalog, "swap").unwrap();
        assert!(strategy.next(&members, &catalog).is_some());
        assert!(strategy.next(&members, &catalog).is_none());

        members.extend(frontier(&["v(a,b)"]));
        let next = strategy.next(&members, &catalog).unwrap();
        assert_eq!(next.member, 1);
    }

    #[test]
    fn test_random_is_reproducible_and_exhausts() {
        let catalog = Catalog::all();
        let frontier = frontier(&["h(a,b,c,d)", "v(h(a,b),h(c,d))"]);

        let mut a = RandomSelector::new(7);
        let mut b = RandomSelector::new(7);
        let picks_a = drain(&mut a, &frontier, &catalog);
        let picks_b = drain(&mut b, &frontier, &catalog);
        assert_eq!(picks_a, picks_b);

        let total: usize = frontier
            .iter()
            .map(|m| catalog.ids().map(|id| catalog.eligible_targets(id, &m.fragment).len()).sum::<usize>())
            .sum();
        assert_eq!(picks_a.len(), total);
    }

    #[test]
    fn test_chain_falls_through() {
        let catalog = Catalog::all();
        let frontier = frontier(&["h(a,b,c)"]);
        let mut chain = ChainSelector::new()
            .then(ApplyToAll::named(&catalog, "swap").unwrap())
            .then(ApplyToAll::named(&catalog, "column").unwrap());

        let picks = drain(&mut chain, &frontier, &catalog);
        let trafos: Vec<_> = picks.iter().map(|s| s.trafo).collect();
        assert_eq!(trafos, [catalog.find("swap").unwrap(), catalog.find("column").unwrap()]);
        assert!(chain.next(&frontier, &catalog).is_none());

        chain.reset();
        assert_eq!(drain(&mut chain, &frontier, &catalog).len(), 2);
    }
}
