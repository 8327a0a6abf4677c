//! Planner lifecycle and run results.

use crate::core::NavigationState;

/// Planner lifecycle phase.
///
/// `Planning -> Executing -> {Planning | GoalReached | Stuck}`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum PlannerPhase {
    /// Choosing the next action
    #[default]
    Planning,
    /// Waiting on the executor
    Executing,
    /// Within the goal threshold
    GoalReached,
    /// Gave up
    Stuck,
}

/// Why a run stopped without reaching the goal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StuckReason {
    /// Every successor of the current state is invalid
    NoSuccessor,
    /// The iteration cap was hit
    IterationLimit,
}

impl StuckReason {
    /// Human-readable description.
    pub fn description(&self) -> &'static str {
        match self {
            StuckReason::NoSuccessor => "No valid successor from current state",
            StuckReason::IterationLimit => "Iteration limit reached before the goal",
        }
    }
}

/// Terminal status of a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlanStatus {
    /// Agent ended within the goal threshold
    GoalReached,
    /// Agent could not make progress
    Stuck(StuckReason),
}

impl PlanStatus {
    /// True for [`PlanStatus::GoalReached`].
    pub fn is_goal_reached(&self) -> bool {
        matches!(self, PlanStatus::GoalReached)
    }
}

/// Counters collected during a run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlanStats {
    /// Outer loop iterations (successful and failed attempts)
    pub iterations: usize,
    /// Successful actions
    pub moves: usize,
    /// Failed actions
    pub failures: usize,
    /// Local tree records popped from the frontier
    pub expansions: usize,
    /// Heuristic updates
    pub backups: usize,
    /// Summed cost of successful actions
    pub action_cost: f64,
}

/// Result of driving toward one goal.
#[derive(Clone, Debug)]
pub struct PlanOutcome {
    /// How the run ended
    pub status: PlanStatus,
    /// State observed when the run ended
    pub final_state: NavigationState,
    /// Run counters
    pub stats: PlanStats,
    /// Observed states, starting with the initial one
    pub trajectory: Vec<NavigationState>,
}

impl PlanOutcome {
    /// True when the goal was reached.
    pub fn reached_goal(&self) -> bool {
        self.status.is_goal_reached()
    }
}
