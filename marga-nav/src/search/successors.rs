//! Successor generation.
//!
//! Two strategies produce the candidate moves out of a state:
//!
//! - [`GridAdjacency`]: one step along each heading of a [`HeadingSet`],
//!   rotating first when the heading changes.
//! - [`RankedReachable`]: teleport to the `count` nearest positions from a
//!   snapshot of known-traversable positions.
//!
//! Both drop candidates whose cell is in the [`InvalidStateRegistry`], so a
//! cell that failed once is never offered again.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::registry::InvalidStateRegistry;
use crate::core::{
    Action, HeadingSet, Lattice, LatticeCoord, NavigationState, Pose2D, Primitive,
    is_diagonal, rotation_between,
};
use crate::error::{MargaError, Result};
use crate::utils::{bearing_degrees, normalize_heading};
use crate::world::ReachabilityOracle;

/// Candidate next state and the action that reaches it.
#[derive(Clone, Debug, PartialEq)]
pub struct Successor {
    /// State reached when the action succeeds
    pub state: NavigationState,
    /// Action to execute
    pub action: Action,
}

/// Produces the successors of a state.
pub trait SuccessorGenerator {
    /// Successors in generation order, excluding invalid cells.
    fn successors(
        &self,
        state: &NavigationState,
        registry: &InvalidStateRegistry,
    ) -> Vec<Successor>;
}

/// Which successor generator to use.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuccessorStrategy {
    /// Lattice neighbors along each heading
    #[default]
    Grid,
    /// Nearest positions from the reachability oracle
    Ranked,
}

/// Lattice neighbors along each heading of a set.
#[derive(Clone, Debug)]
pub struct GridAdjacency {
    lattice: Lattice,
    headings: HeadingSet,
    step_size: f64,
    step_cells: i32,
    rotate_increment: f64,
}

impl GridAdjacency {
    /// Create a generator moving `step_size` meters per action.
    pub fn new(
        lattice: Lattice,
        headings: HeadingSet,
        step_size: f64,
        rotate_increment: f64,
    ) -> Result<Self> {
        if !step_size.is_finite() || step_size <= 0.0 {
            return Err(MargaError::Config(format!(
                "step_size must be positive, got {}",
                step_size
            )));
        }
        let step_cells = lattice.cells_for(step_size).ok_or_else(|| {
            MargaError::Config(format!(
                "step_size {} is not a whole number of {} m lattice cells",
                step_size,
                lattice.resolution()
            ))
        })?;
        Ok(Self {
            step_cells,
            lattice,
            headings,
            step_size,
            rotate_increment,
        })
    }

    /// Lattice cells covered by one step.
    pub fn step_cells(&self) -> i32 {
        self.step_cells
    }

    fn action_for(&self, from_theta: i32, heading: i32) -> Action {
        let mut primitives = Vec::with_capacity(2);
        if let Some(rotation) = rotation_between((heading - from_theta) as f64) {
            primitives.push(rotation);
        }
        let magnitude = if is_diagonal(heading) {
            self.step_size * std::f64::consts::SQRT_2
        } else {
            self.step_size
        };
        primitives.push(Primitive::Move { magnitude });
        Action::new(primitives, self.rotate_increment)
    }
}

impl SuccessorGenerator for GridAdjacency {
    fn successors(
        &self,
        state: &NavigationState,
        registry: &InvalidStateRegistry,
    ) -> Vec<Successor> {
        let mut successors = Vec::with_capacity(self.headings.headings().len());
        for &heading in self.headings.headings() {
            let Some((dx, dz)) = HeadingSet::offset(heading) else {
                continue;
            };
            let cell = state
                .cell()
                .offset(dx * self.step_cells, dz * self.step_cells);
            if registry.is_invalid(cell) {
                continue;
            }
            successors.push(Successor {
                state: NavigationState::new(cell, heading),
                action: self.action_for(state.theta(), heading),
            });
        }
        successors
    }
}

/// Nearest known-traversable positions, reached by teleporting.
#[derive(Clone, Debug)]
pub struct RankedReachable {
    lattice: Lattice,
    cells: Vec<LatticeCoord>,
    count: usize,
}

impl RankedReachable {
    /// Create a generator from a position snapshot.
    ///
    /// Positions are snapped to the lattice and de-duplicated, keeping the
    /// first occurrence. Positions that cannot be snapped are skipped.
    pub fn new(lattice: Lattice, positions: &[Pose2D], count: usize) -> Self {
        let mut seen = HashSet::with_capacity(positions.len());
        let cells = positions
            .iter()
            .filter_map(|p| lattice.snap(*p))
            .filter(|cell| seen.insert(*cell))
            .collect();
        Self {
            lattice,
            cells,
            count,
        }
    }

    /// Create a generator from an oracle's current snapshot.
    pub fn from_oracle<R: ReachabilityOracle + ?Sized>(
        lattice: Lattice,
        oracle: &R,
        count: usize,
    ) -> Self {
        Self::new(lattice, &oracle.reachable_positions(), count)
    }

    /// Number of distinct cells in the snapshot.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// True when the snapshot is empty.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl SuccessorGenerator for RankedReachable {
    fn successors(
        &self,
        state: &NavigationState,
        registry: &InvalidStateRegistry,
    ) -> Vec<Successor> {
        let current = state.cell();
        let mut ranked: Vec<(i64, LatticeCoord)> = self
            .cells
            .iter()
            .map(|cell| (current.manhattan_distance(cell), *cell))
            .collect();
        // Stable: equal distances keep snapshot order
        ranked.sort_by_key(|(distance, _)| *distance);

        let from = state.position(&self.lattice);
        ranked
            .into_iter()
            .map(|(_, cell)| cell)
            .filter(|cell| *cell != current && !registry.is_invalid(*cell))
            .take(self.count)
            .map(|cell| {
                let target = self.lattice.to_world(cell);
                let bearing = bearing_degrees(target.x - from.x, target.z - from.z).round() as i32;
                let heading = normalize_heading(bearing);
                let action = Action::with_default_increment(vec![
                    Primitive::TeleportRotation { heading },
                    Primitive::TeleportPosition {
                        x: target.x,
                        z: target.z,
                    },
                ]);
                Successor {
                    state: NavigationState::new(cell, heading),
                    action,
                }
            })
            .collect()
    }
}

/// Successor generator selected at runtime.
#[derive(Clone, Debug)]
pub enum SuccessorSource {
    /// Lattice neighbors
    Grid(GridAdjacency),
    /// Ranked teleport targets
    Ranked(RankedReachable),
}

impl SuccessorGenerator for SuccessorSource {
    fn successors(
        &self,
        state: &NavigationState,
        registry: &InvalidStateRegistry,
    ) -> Vec<Successor> {
        match self {
            SuccessorSource::Grid(generator) => generator.successors(state, registry),
            SuccessorSource::Ranked(generator) => generator.successors(state, registry),
        }
    }
}
