//! LRTA* with a bounded local search tree.
//!
//! Each iteration grows a breadth-first tree of up to `k` new states around
//! the current one, picks a boundary record, backs heuristic values up from
//! that record to the root, and commits only the first action on the chain.
//!
//! # Rules
//!
//! - The frontier is FIFO. Goal-proximate records are never expanded.
//! - Growth stops at `k` new records, an empty frontier, or
//!   `max_expansions` pops. A record counts as expanded only once all of its
//!   successors were processed.
//! - Boundary: scan unexpanded non-root records from newest to oldest. The
//!   first goal-proximate one wins outright; otherwise the minimum of
//!   `g + h` (strict `<`, so the newest wins ties).
//! - Backup runs leaf to root: `v = h(boundary)` (0 if goal-proximate), then
//!   per edge `v = max(h(parent), v + cost)` and `h(parent) = v`.

use std::collections::{HashMap, VecDeque};

use tracing::{debug, info, warn};

use super::heuristic::HeuristicTable;
use super::observe_state;
use super::outcome::{PlanOutcome, PlanStats, PlanStatus, PlannerPhase, StuckReason};
use super::registry::InvalidStateRegistry;
use super::successors::SuccessorGenerator;
use crate::core::{Action, Lattice, NavigationState, Pose2D};
use crate::error::Result;
use crate::world::{Executor, Observer};

/// Index of the root record.
const ROOT: usize = 0;

/// Configuration for the lookahead planner.
#[derive(Clone, Debug)]
pub struct LookaheadConfig {
    /// New records added per iteration (k)
    pub lookahead: usize,
    /// L1 distance (meters) under which the goal counts as reached
    pub goal_threshold: f64,
    /// Maximum action attempts before giving up
    pub max_iterations: usize,
    /// Maximum frontier pops per iteration
    pub max_expansions: usize,
}

impl Default for LookaheadConfig {
    fn default() -> Self {
        Self {
            lookahead: 8,
            goal_threshold: 1.0,
            max_iterations: 10_000,
            max_expansions: 512,
        }
    }
}

/// One node of the local search tree.
#[derive(Clone, Debug)]
struct LocalRecord {
    state: NavigationState,
    parent: Option<usize>,
    action: Option<Action>,
    /// Path cost from the root
    g: f64,
    expanded: bool,
    goal_proximate: bool,
}

/// Local search tree, records in the order they were created.
#[derive(Clone, Debug, Default)]
struct LocalTree {
    records: Vec<LocalRecord>,
    pops: usize,
}

impl LocalTree {
    /// Record whose parent is the root on the chain ending at `leaf`.
    fn root_child(&self, leaf: usize) -> usize {
        let mut idx = leaf;
        while let Some(parent) = self.records[idx].parent {
            if parent == ROOT {
                break;
            }
            idx = parent;
        }
        idx
    }
}

/// Lookahead planner for one goal.
pub struct LookaheadPlanner<G: SuccessorGenerator> {
    config: LookaheadConfig,
    generator: G,
    registry: InvalidStateRegistry,
    heuristics: HeuristicTable,
    phase: PlannerPhase,
}

impl<G: SuccessorGenerator> LookaheadPlanner<G> {
    /// Create a planner; fails when the goal cannot be placed on the lattice.
    pub fn new(
        config: LookaheadConfig,
        lattice: Lattice,
        goal: Pose2D,
        generator: G,
        registry: InvalidStateRegistry,
    ) -> Result<Self> {
        Ok(Self {
            config,
            generator,
            registry,
            heuristics: HeuristicTable::new(goal, lattice)?,
            phase: PlannerPhase::Planning,
        })
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> PlannerPhase {
        self.phase
    }

    /// Learned heuristic values.
    pub fn heuristics(&self) -> &HeuristicTable {
        &self.heuristics
    }

    /// Drive the agent until the goal is reached or no progress is possible.
    pub fn run<W: Executor + Observer + ?Sized>(&mut self, world: &mut W) -> Result<PlanOutcome> {
        let lattice = *self.heuristics.lattice();
        let goal = self.heuristics.goal();
        let mut stats = PlanStats::default();
        let mut current = observe_state(&lattice, &*world)?;
        let mut trajectory = vec![current];

        info!(
            "lookahead k={} from {} to {} (threshold {:.2}m)",
            self.config.lookahead, current, goal, self.config.goal_threshold
        );
        self.phase = PlannerPhase::Planning;

        let status = loop {
            if self.is_goal_proximate(&current) {
                break PlanStatus::GoalReached;
            }
            if stats.iterations >= self.config.max_iterations {
                warn!(
                    "lookahead hit max iterations ({}) at {}",
                    self.config.max_iterations, current
                );
                break PlanStatus::Stuck(StuckReason::IterationLimit);
            }

            let tree = self.build_tree(current);
            stats.expansions += tree.pops;

            let Some(boundary) = self.select_boundary(&tree) else {
                warn!("no unexpanded record around {}", current);
                break PlanStatus::Stuck(StuckReason::NoSuccessor);
            };
            stats.backups += self.back_up(&tree, boundary);

            let child = &tree.records[tree.root_child(boundary)];
            let Some(action) = child.action.as_ref() else {
                break PlanStatus::Stuck(StuckReason::NoSuccessor);
            };

            stats.iterations += 1;
            self.phase = PlannerPhase::Executing;
            debug!(
                "{} -> {} via {} (boundary {})",
                current, child.state, action, tree.records[boundary].state
            );

            if world.execute(action) {
                stats.moves += 1;
                stats.action_cost += action.cost();
            } else {
                self.registry.mark_invalid(child.state.cell());
                stats.failures += 1;
                debug!("marked {} invalid", child.state);
            }

            current = observe_state(&lattice, &*world)?;
            trajectory.push(current);
            self.phase = PlannerPhase::Planning;
        };

        self.phase = match status {
            PlanStatus::GoalReached => PlannerPhase::GoalReached,
            PlanStatus::Stuck(_) => PlannerPhase::Stuck,
        };
        match status {
            PlanStatus::GoalReached => info!(
                "goal reached at {} after {} iterations ({} expansions)",
                current, stats.iterations, stats.expansions
            ),
            PlanStatus::Stuck(reason) => warn!("stuck at {}: {}", current, reason.description()),
        }

        Ok(PlanOutcome {
            status,
            final_state: current,
            stats,
            trajectory,
        })
    }

    fn is_goal_proximate(&self, state: &NavigationState) -> bool {
        state.distance_to(self.heuristics.lattice(), self.heuristics.goal())
            < self.config.goal_threshold
    }

    /// Grow the breadth-first tree around `root`.
    fn build_tree(&self, root: NavigationState) -> LocalTree {
        let mut tree = LocalTree {
            records: vec![LocalRecord {
                state: root,
                parent: None,
                action: None,
                g: 0.0,
                expanded: false,
                goal_proximate: self.is_goal_proximate(&root),
            }],
            pops: 0,
        };
        let mut index: HashMap<NavigationState, usize> = HashMap::from([(root, ROOT)]);
        let mut frontier = VecDeque::from([ROOT]);
        let mut added = 0;

        while added < self.config.lookahead && tree.pops < self.config.max_expansions {
            let Some(idx) = frontier.pop_front() else {
                break;
            };
            tree.pops += 1;
            if tree.records[idx].goal_proximate {
                continue;
            }

            let parent_state = tree.records[idx].state;
            let parent_g = tree.records[idx].g;
            let mut complete = true;
            for successor in self.generator.successors(&parent_state, &self.registry) {
                if index.contains_key(&successor.state) {
                    continue;
                }
                if added >= self.config.lookahead {
                    complete = false;
                    break;
                }
                let new_idx = tree.records.len();
                index.insert(successor.state, new_idx);
                tree.records.push(LocalRecord {
                    state: successor.state,
                    parent: Some(idx),
                    g: parent_g + successor.action.cost(),
                    action: Some(successor.action),
                    expanded: false,
                    goal_proximate: self.is_goal_proximate(&successor.state),
                });
                frontier.push_back(new_idx);
                added += 1;
            }
            tree.records[idx].expanded = complete;
        }

        tree
    }

    /// Pick the record to back up from, or `None` when every record was expanded.
    fn select_boundary(&mut self, tree: &LocalTree) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for idx in (1..tree.records.len()).rev() {
            let record = &tree.records[idx];
            if record.expanded {
                continue;
            }
            if record.goal_proximate {
                return Some(idx);
            }
            let score = record.g + self.heuristics.get(&record.state);
            if best.is_none_or(|(_, s)| score < s) {
                best = Some((idx, score));
            }
        }
        best.map(|(idx, _)| idx)
    }

    /// Propagate values from `leaf` to the root; returns the number of updates.
    fn back_up(&mut self, tree: &LocalTree, leaf: usize) -> usize {
        let record = &tree.records[leaf];
        let mut value = if record.goal_proximate {
            0.0
        } else {
            self.heuristics.get(&record.state)
        };

        let mut updates = 0;
        let mut child = leaf;
        while let Some(parent) = tree.records[child].parent {
            let cost = tree.records[child]
                .action
                .as_ref()
                .map_or(0.0, Action::cost);
            value = self.heuristics.backup(&tree.records[parent].state, value + cost);
            updates += 1;
            child = parent;
        }
        updates
    }
}
