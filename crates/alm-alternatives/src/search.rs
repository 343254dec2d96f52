//! The alternative search driver.

use std::collections::HashSet;
use std::fmt;
use std::time::{Duration, Instant};

use alm_core::Fragment;
use alm_trafo::{apply_at, GroupDetector, TrafoHistory};

use crate::classifier::{Classification, Classifier};
use crate::objective::TermValue;
use crate::selection::{Catalog, FrontierMember, SelectionStrategy};

/// Budget of one search run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    /// Maximum number of accepted candidates, the root included.
    pub max_candidates: usize,
    /// Wall clock budget. `Duration::MAX` means unlimited.
    pub time_budget: Duration,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            max_candidates: 400,
            time_budget: Duration::from_secs(5 * 60),
        }
    }
}

impl SearchOptions {
    pub fn with_max_candidates(mut self, max_candidates: usize) -> Self {
        self.max_candidates = max_candidates;
        self
    }

    pub fn with_time_budget(mut self, time_budget: Duration) -> Self {
        self.time_budget = time_budget;
        self
    }

    pub fn unlimited_time(self) -> Self {
        self.with_time_budget(Duration::MAX)
    }
}

/// Why a search stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The candidate budget was reached.
    CandidateBudget,
    /// The time budget elapsed. The candidates found so far are kept.
    TimeBudget,
    /// The selection strategy had nothing left to offer.
    Exhausted,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::CandidateBudget => write!(f, "candidate budget"),
            StopReason::TimeBudget => write!(f, "time budget"),
            StopReason::Exhausted => write!(f, "exhausted"),
        }
    }
}

/// An accepted alternative.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub fragment: Fragment,
    pub classification: Classification,
    pub objective: f64,
    term_values: Vec<TermValue>,
}

impl Candidate {
    fn new(fragment: Fragment, classification: Classification, classifier: &Classifier) -> Self {
        let objective = classifier.objective_value(&classification);
        let term_values = classifier.term_values(&classification);
        Self {
            fragment,
            classification,
            objective,
            term_values,
        }
    }

    pub fn history(&self) -> &TrafoHistory {
        &self.classification.history
    }

    /// Raw and weighted value of every objective term.
    pub fn term_values(&self) -> &[TermValue] {
        &self.term_values
    }
}

/// Result of one search run.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    /// Accepted candidates in discovery order.
    pub candidates: Vec<Candidate>,
    pub stop_reason: StopReason,
    /// Number of transformation results looked at.
    pub evaluated: usize,
    /// Number of fragments classified, the root included.
    pub classified: usize,
    pub elapsed: Duration,
}

impl SearchOutcome {
    /// Candidates ordered by objective value, best first.
    pub fn ranked(mut self) -> Vec<Candidate> {
        rank_by_objective(&mut self.candidates);
        self.candidates
    }
}

/// Sort candidates by objective value, best first. Ties keep their order.
pub fn rank_by_objective(candidates: &mut [Candidate]) {
    candidates.sort_by(|a, b| a.objective.total_cmp(&b.objective));
}

/// Explores the fragments reachable from a root by chained transformations.
///
/// Each call of [`calculate_alternatives`](Self::calculate_alternatives)
/// starts from a fresh frontier; the driver itself holds no run state.
#[derive(Debug, Default)]
pub struct FragmentAlternatives {
    catalog: Catalog,
    options: SearchOptions,
    group_detector: Option<GroupDetector>,
}

impl FragmentAlternatives {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            options: SearchOptions::default(),
            group_detector: None,
        }
    }

    pub fn with_options(mut self, options: SearchOptions) -> Self {
        self.options = options;
        self
    }

    /// Seed the frontier with grouped variants of the root.
    pub fn with_group_detector(mut self, detector: GroupDetector) -> Self {
        self.group_detector = Some(detector);
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn options(&self) -> SearchOptions {
        self.options
    }

    /// Run a search from `root`.
    ///
    /// The root is expanded even when it is invalid itself. New fragments
    /// are dropped when an accepted candidate is equivalent, or when they
    /// classify as invalid; dropped fragments are never expanded. A fragment
    /// that was rejected as invalid is not classified again in the same run.
    pub fn calculate_alternatives(
        &self,
        root: &Fragment,
        classifier: &Classifier,
        strategy: &mut dyn SelectionStrategy,
    ) -> SearchOutcome {
        let span = tracing::info_span!("calculate_alternatives", root = %root);
        let _enter = span.enter();

        let start = Instant::now();
        let deadline = start.checked_add(self.options.time_budget);
        let max_candidates = self.options.max_candidates;
        strategy.reset();

        let mut frontier = vec![FrontierMember {
            fragment: root.clone(),
            history: TrafoHistory::new(),
        }];
        let mut candidates: Vec<Candidate> = Vec::new();
        let mut rejected: HashSet<String> = HashSet::new();
        let mut evaluated = 0;
        let mut classified = 1;

        let root_class = classifier.classify(root, &TrafoHistory::new());
        if root_class.is_invalid() {
            tracing::debug!("root is invalid for the target");
            rejected.insert(root.structure_id());
        } else if max_candidates > 0 {
            candidates.push(Candidate::new(root.clone(), root_class, classifier));
        }

        if let Some(detector) = &self.group_detector {
            for seed in detector.seeds(root) {
                if !frontier.iter().any(|m| m.fragment.is_equivalent(&seed)) {
                    tracing::debug!(seed = %seed, "grouped seed");
                    frontier.push(FrontierMember {
                        fragment: seed,
                        history: TrafoHistory::new(),
                    });
                }
            }
        }

        let stop_reason = loop {
            if candidates.len() >= max_candidates {
                break StopReason::CandidateBudget;
            }
            if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                break StopReason::TimeBudget;
            }
            let Some(selection) = strategy.next(&frontier, &self.catalog) else {
                break StopReason::Exhausted;
            };
            let (Some(trafo), Some(member)) = (
                self.catalog.get(selection.trafo),
                frontier.get(selection.member),
            ) else {
                tracing::warn!(?selection, "strategy proposed an unknown step");
                continue;
            };

            let base_history = member.history.clone();
            let alternatives = match apply_at(trafo.as_ref(), &member.fragment, &selection.target) {
                Ok(alternatives) => alternatives,
                Err(err) => {
                    tracing::warn!(error = %err, trafo = trafo.name(), "transformation failed");
                    continue;
                }
            };

            for alternative in alternatives {
                if candidates.len() >= max_candidates {
                    break;
                }
                evaluated += 1;

                let fragment = alternative.fragment;
                if candidates.iter().any(|c| c.fragment.is_equivalent(&fragment)) {
                    tracing::trace!(%fragment, "duplicate");
                    continue;
                }
                let id = fragment.structure_id();
                if rejected.contains(&id) {
                    tracing::trace!(%fragment, "already rejected");
                    continue;
                }

                let history =
                    base_history.extended(trafo.name(), selection.target.clone(), alternative.quality);
                let classification = classifier.classify(&fragment, &history);
                classified += 1;
                if classification.is_invalid() {
                    tracing::trace!(%fragment, "invalid");
                    rejected.insert(id);
                    continue;
                }

                let candidate = Candidate::new(fragment.clone(), classification, classifier);
                tracing::debug!(
                    %fragment,
                    trafo = trafo.name(),
                    objective = candidate.objective,
                    "accepted candidate"
                );
                candidates.push(candidate);
                frontier.push(FrontierMember { fragment, history });
            }
        };

        let elapsed = start.elapsed();
        tracing::info!(
            candidates = candidates.len(),
            evaluated,
            classified,
            ?elapsed,
            %stop_reason,
            "search finished"
        );

        SearchOutcome {
            candidates,
            stop_reason,
            evaluated,
            classified,
            elapsed,
        }
    }
}
