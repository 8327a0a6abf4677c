//! LRTA* with one-step lookahead.
//!
//! Each iteration scores every successor of the current state by
//! `h(successor) + cost(action)`, executes the cheapest, and raises
//! `h(current)` to that score. A failed action marks the successor's cell
//! invalid, so the next selection sees a smaller state space.

use tracing::{debug, info, warn};

use super::heuristic::HeuristicTable;
use super::observe_state;
use super::outcome::{PlanOutcome, PlanStats, PlanStatus, PlannerPhase, StuckReason};
use super::registry::InvalidStateRegistry;
use super::successors::{Successor, SuccessorGenerator};
use crate::core::{Lattice, NavigationState, Pose2D};
use crate::error::Result;
use crate::world::{Executor, Observer};

/// Configuration for the LRTA* planner.
#[derive(Clone, Debug)]
pub struct LrtaConfig {
    /// L1 distance (meters) under which the goal counts as reached
    pub goal_threshold: f64,
    /// Maximum action attempts before giving up
    pub max_iterations: usize,
}

impl Default for LrtaConfig {
    fn default() -> Self {
        Self {
            goal_threshold: 1.0,
            max_iterations: 10_000,
        }
    }
}

/// LRTA* planner for one goal.
pub struct LrtaPlanner<G: SuccessorGenerator> {
    config: LrtaConfig,
    generator: G,
    registry: InvalidStateRegistry,
    heuristics: HeuristicTable,
    phase: PlannerPhase,
}

impl<G: SuccessorGenerator> LrtaPlanner<G> {
    /// Create a planner; fails when the goal cannot be placed on the lattice.
    pub fn new(
        config: LrtaConfig,
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
    ///
    /// Execution failures are absorbed; the only errors are poses that cannot
    /// be placed on the lattice.
    pub fn run<W: Executor + Observer + ?Sized>(&mut self, world: &mut W) -> Result<PlanOutcome> {
        let lattice = *self.heuristics.lattice();
        let goal = self.heuristics.goal();
        let mut stats = PlanStats::default();
        let mut current = observe_state(&lattice, &*world)?;
        let mut trajectory = vec![current];

        info!(
            "LRTA* from {} to {} (threshold {:.2}m)",
            current, goal, self.config.goal_threshold
        );
        self.phase = PlannerPhase::Planning;

        let status = loop {
            if current.distance_to(&lattice, goal) < self.config.goal_threshold {
                break PlanStatus::GoalReached;
            }
            if stats.iterations >= self.config.max_iterations {
                warn!(
                    "LRTA* hit max iterations ({}) at {}",
                    self.config.max_iterations, current
                );
                break PlanStatus::Stuck(StuckReason::IterationLimit);
            }

            let successors = self.generator.successors(&current, &self.registry);
            let Some((best, score)) = self.select(successors) else {
                warn!("no valid successor from {}", current);
                break PlanStatus::Stuck(StuckReason::NoSuccessor);
            };

            stats.iterations += 1;
            self.phase = PlannerPhase::Executing;
            debug!("{} -> {} via {} (f={:.3})", current, best.state, best.action, score);

            if world.execute(&best.action) {
                self.heuristics.backup(&current, score);
                stats.backups += 1;
                stats.moves += 1;
                stats.action_cost += best.action.cost();
            } else {
                self.registry.mark_invalid(best.state.cell());
                stats.failures += 1;
                debug!("marked {} invalid", best.state);
            }

            // Failed actions may leave the agent partially moved
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
                "goal reached at {} after {} iterations",
                current, stats.iterations
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

    /// Cheapest successor by `h + cost`; the first generated wins ties.
    fn select(&mut self, successors: Vec<Successor>) -> Option<(Successor, f64)> {
        let mut best: Option<(Successor, f64)> = None;
        for successor in successors {
            let score = self.heuristics.get(&successor.state) + successor.action.cost();
            if best.as_ref().is_none_or(|(_, s)| score < *s) {
                best = Some((successor, score));
            }
        }
        best
    }
}

/// States visited in order; convenience for callers inspecting a run.
pub fn visited_cells(outcome: &PlanOutcome) -> Vec<NavigationState> {
    let mut cells: Vec<NavigationState> = Vec::with_capacity(outcome.trajectory.len());
    for state in &outcome.trajectory {
        if cells.last() != Some(state) {
            cells.push(*state);
        }
    }
    cells
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{AgentPose, HeadingSet, LatticeCoord};
    use crate::search::successors::GridAdjacency;
    use crate::world::GridWorld;
    use approx::assert_relative_eq;

    const DETOUR: &str = "\
#######
#.....#
#.###.#
#..S..#
#######
";

    fn unit_planner(
        world_goal: Pose2D,
        registry: InvalidStateRegistry,
        max_iterations: usize,
    ) -> LrtaPlanner<GridAdjacency> {
        let lattice = Lattice::new(1.0).unwrap();
        let generator = GridAdjacency::new(lattice, HeadingSet::Four, 1.0, 15.0).unwrap();
        let config = LrtaConfig {
            goal_threshold: 0.5,
            max_iterations,
        };
        LrtaPlanner::new(config, lattice, world_goal, generator, registry).unwrap()
    }

    #[test]
    fn test_straight_line() {
        let mut world = GridWorld::from_ascii("#####\n#.S.#\n#...#\n#...#\n#####", 1.0).unwrap();
        let mut planner = unit_planner(Pose2D::new(2.0, 3.0), InvalidStateRegistry::new(), 100);

        let outcome = planner.run(&mut world).unwrap();
        assert!(outcome.reached_goal());
        assert_eq!(planner.phase(), PlannerPhase::GoalReached);
        assert_eq!(outcome.stats.moves, 2);
        assert_eq!(outcome.stats.failures, 0);
        assert_relative_eq!(outcome.stats.action_cost, 1.0);
        assert_eq!(outcome.final_state.cell(), LatticeCoord::new(2, 3));
    }

    #[test]
    fn test_detour_marks_wall() {
        let mut world = GridWorld::from_ascii(DETOUR, 1.0).unwrap();
        let registry = InvalidStateRegistry::new();
        let mut planner = unit_planner(Pose2D::new(3.0, 1.0), registry.clone(), 1000);

        let outcome = planner.run(&mut world).unwrap();
        assert!(outcome.reached_goal());
        assert!(registry.is_invalid(LatticeCoord::new(3, 2)));
        assert!(outcome.stats.failures >= 1);

        // No invalid cell was ever occupied
        for state in &outcome.trajectory {
            assert!(!registry.contains_state(state));
        }
    }

    #[test]
    fn test_no_successor_is_stuck() {
        let mut world = GridWorld::from_ascii(DETOUR, 1.0).unwrap();
        let registry = InvalidStateRegistry::new();
        for cell in [(3, 4), (4, 3), (3, 2), (2, 3)] {
            registry.mark_invalid(LatticeCoord::new(cell.0, cell.1));
        }
        let mut planner = unit_planner(Pose2D::new(3.0, 1.0), registry, 100);

        let outcome = planner.run(&mut world).unwrap();
        assert_eq!(outcome.status, PlanStatus::Stuck(StuckReason::NoSuccessor));
        assert_eq!(planner.phase(), PlannerPhase::Stuck);
        assert_eq!(world.commands_executed(), 0);
    }

    #[test]
    fn test_goal_check_precedes_successors() {
        let mut world = GridWorld::from_ascii(DETOUR, 1.0).unwrap();
        let registry = InvalidStateRegistry::new();
        for cell in [(3, 4), (4, 3), (3, 2), (2, 3)] {
            registry.mark_invalid(LatticeCoord::new(cell.0, cell.1));
        }
        let mut planner = unit_planner(Pose2D::new(3.0, 3.0), registry, 100);

        let outcome = planner.run(&mut world).unwrap();
        assert!(outcome.reached_goal());
        assert_eq!(outcome.stats.iterations, 0);
    }

    #[test]
    fn test_iteration_limit() {
        let mut world = GridWorld::from_ascii(DETOUR, 1.0).unwrap();
        let mut planner = unit_planner(Pose2D::new(3.0, 1.0), InvalidStateRegistry::new(), 2);

        let outcome = planner.run(&mut world).unwrap();
        assert_eq!(
            outcome.status,
            PlanStatus::Stuck(StuckReason::IterationLimit)
        );
        assert_eq!(outcome.stats.iterations, 2);
    }

    #[test]
    fn test_heuristic_learning() {
        let mut world = GridWorld::from_ascii(DETOUR, 1.0).unwrap();
        let mut planner = unit_planner(Pose2D::new(3.0, 1.0), InvalidStateRegistry::new(), 1000);
        let outcome = planner.run(&mut world).unwrap();
        assert!(outcome.reached_goal());

        let heuristics = planner.heuristics();
        for state in &outcome.trajectory {
            if let Some(value) = heuristics.peek(state) {
                assert!(value >= heuristics.estimate(state) - 1e-9);
            }
        }
        // The start had to be raised above its L1 seed to escape the wall
        let start = NavigationState::new(LatticeCoord::new(3, 3), 0);
        assert!(heuristics.value(&start) > heuristics.estimate(&start));
    }

    #[test]
    fn test_visited_cells_collapses_repeats() {
        let mut world = GridWorld::from_ascii(DETOUR, 1.0).unwrap();
        world.set_pose(AgentPose::new(3.0, 3.0, 180));
        let mut planner = unit_planner(Pose2D::new(3.0, 1.0), InvalidStateRegistry::new(), 1000);
        let outcome = planner.run(&mut world).unwrap();

        let cells = visited_cells(&outcome);
        for pair in cells.windows(2) {
            assert_ne!(pair[0], pair[1]);
        }
        assert_eq!(cells.first(), outcome.trajectory.first());
    }
}
