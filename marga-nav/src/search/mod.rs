//! Online search: heuristic learning, successor generation and the planners.
//!
//! ## Planners
//! - [`LrtaPlanner`]: LRTA* with one-step lookahead (k = 1)
//! - [`LookaheadPlanner`]: LRTA* over a bounded breadth-first local tree (k > 1)
//!
//! ## Shared pieces
//! - [`InvalidStateRegistry`]: cells known to be blocked, shared across goals
//! - [`HeuristicTable`]: learned cost-to-goal estimates for one goal
//! - [`SuccessorGenerator`]: grid adjacency or ranked reachable positions

mod heuristic;
mod lookahead;
mod lrta;
mod outcome;
mod registry;
mod successors;

pub use heuristic::HeuristicTable;
pub use lookahead::{LookaheadConfig, LookaheadPlanner};
pub use lrta::{LrtaConfig, LrtaPlanner, visited_cells};
pub use outcome::{PlanOutcome, PlanStats, PlanStatus, PlannerPhase, StuckReason};
pub use registry::InvalidStateRegistry;
pub use successors::{
    GridAdjacency, RankedReachable, Successor, SuccessorGenerator, SuccessorSource,
    SuccessorStrategy,
};

use crate::core::{Lattice, NavigationState};
use crate::error::{MargaError, Result};
use crate::world::Observer;

/// Read the agent's pose and place it on the lattice.
pub(crate) fn observe_state<W: Observer + ?Sized>(
    lattice: &Lattice,
    world: &W,
) -> Result<NavigationState> {
    let pose = world.current_pose();
    NavigationState::from_pose(lattice, pose).ok_or_else(|| {
        MargaError::World(format!(
            "pose ({}, {}) cannot be placed on the lattice",
            pose.x, pose.z
        ))
    })
}
