//! Registry of lattice cells known to be blocked.
//!
//! Cells are added when the executor reports a failed move into them and are
//! never removed. Every planner created by a [`Navigator`](crate::navigator::Navigator)
//! shares one registry, so a failure discovered while driving to one goal is
//! remembered for every later goal.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::core::{LatticeCoord, NavigationState};

/// Shared set of invalid lattice cells.
///
/// Clones share the same underlying set.
#[derive(Clone, Debug, Default)]
pub struct InvalidStateRegistry {
    cells: Arc<RwLock<HashSet<LatticeCoord>>>,
}

impl InvalidStateRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a cell as unreachable. Returns `true` if it was not known yet.
    pub fn mark_invalid(&self, cell: LatticeCoord) -> bool {
        self.cells.write().insert(cell)
    }

    /// Whether the cell has been recorded.
    pub fn is_invalid(&self, cell: LatticeCoord) -> bool {
        self.cells.read().contains(&cell)
    }

    /// Whether the state's cell has been recorded (heading is ignored).
    pub fn contains_state(&self, state: &NavigationState) -> bool {
        self.is_invalid(state.cell())
    }

    /// Number of recorded cells.
    pub fn len(&self) -> usize {
        self.cells.read().len()
    }

    /// True when nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.cells.read().is_empty()
    }

    /// Sorted copy of the recorded cells.
    pub fn snapshot(&self) -> Vec<LatticeCoord> {
        let mut cells: Vec<_> = self.cells.read().iter().copied().collect();
        cells.sort();
        cells
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mark_is_idempotent() {
        let registry = InvalidStateRegistry::new();
        assert!(registry.is_empty());

        let cell = LatticeCoord::new(3, -2);
        assert!(registry.mark_invalid(cell));
        assert!(!registry.mark_invalid(cell));
        assert_eq!(registry.len(), 1);
        assert!(registry.is_invalid(cell));
        assert!(!registry.is_invalid(LatticeCoord::new(-2, 3)));
    }

    #[test]
    fn test_state_lookup_ignores_heading() {
        let registry = InvalidStateRegistry::new();
        let cell = LatticeCoord::new(1, 1);
        registry.mark_invalid(cell);

        for theta in [0, 90, 225] {
            assert!(registry.contains_state(&NavigationState::new(cell, theta)));
        }
    }

    #[test]
    fn test_clones_share_cells() {
        let registry = InvalidStateRegistry::new();
        let other = registry.clone();

        other.mark_invalid(LatticeCoord::new(0, 5));
        registry.mark_invalid(LatticeCoord::new(-1, 0));

        assert_eq!(registry.len(), 2);
        assert_eq!(
            other.snapshot(),
            vec![LatticeCoord::new(-1, 0), LatticeCoord::new(0, 5)]
        );
    }

    #[test]
    fn test_shared_across_threads() {
        let registry = InvalidStateRegistry::new();
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let registry = registry.clone();
                std::thread::spawn(move || {
                    for z in 0..10 {
                        registry.mark_invalid(LatticeCoord::new(i, z));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(registry.len(), 40);
    }
}
