//! Learned cost-to-goal estimates.
//!
//! Values are seeded lazily with the L1 distance from a state's position to
//! the goal and only ever increase afterwards.

use std::collections::HashMap;

use crate::core::{Lattice, NavigationState, Pose2D};
use crate::error::{MargaError, Result};

/// Heuristic values for one goal.
#[derive(Clone, Debug)]
pub struct HeuristicTable {
    goal: Pose2D,
    lattice: Lattice,
    values: HashMap<NavigationState, f64>,
}

impl HeuristicTable {
    /// Create an empty table for a goal.
    ///
    /// Fails when the goal cannot be placed on the lattice.
    pub fn new(goal: Pose2D, lattice: Lattice) -> Result<Self> {
        if !goal.is_finite() || lattice.snap(goal).is_none() {
            return Err(MargaError::MalformedGoal {
                x: goal.x,
                z: goal.z,
            });
        }
        Ok(Self {
            goal,
            lattice,
            values: HashMap::new(),
        })
    }

    /// Goal position.
    pub fn goal(&self) -> Pose2D {
        self.goal
    }

    /// Lattice used to place states.
    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    /// Seed estimate: L1 distance from the state to the goal.
    #[inline]
    pub fn estimate(&self, state: &NavigationState) -> f64 {
        state.distance_to(&self.lattice, self.goal)
    }

    /// Current value, seeding the table on first access.
    pub fn get(&mut self, state: &NavigationState) -> f64 {
        let estimate = self.estimate(state);
        *self.values.entry(*state).or_insert(estimate)
    }

    /// Stored value, if the state has been seen.
    pub fn peek(&self, state: &NavigationState) -> Option<f64> {
        self.values.get(state).copied()
    }

    /// Current value without seeding.
    pub fn value(&self, state: &NavigationState) -> f64 {
        self.peek(state).unwrap_or_else(|| self.estimate(state))
    }

    /// Raise the stored value to `candidate` if that is larger.
    ///
    /// Returns the value stored afterwards.
    pub fn backup(&mut self, state: &NavigationState, candidate: f64) -> f64 {
        let current = self.get(state);
        let updated = current.max(candidate);
        self.values.insert(*state, updated);
        updated
    }

    /// Number of stored states.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when no state has been seen.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
