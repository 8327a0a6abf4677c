//! Agent pose and the search state derived from it.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use super::lattice::{Lattice, LatticeCoord, Pose2D};
use crate::utils::normalize_heading;

/// Discrete headings the agent may face.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeadingSet {
    /// Cardinal directions (90° increments)
    Four,
    /// Cardinal plus diagonal directions (45° increments)
    #[default]
    Eight,
}

impl HeadingSet {
    /// Headings in successor generation order (cardinals first).
    pub fn headings(&self) -> &'static [i32] {
        match self {
            HeadingSet::Four => &[0, 90, 180, 270],
            HeadingSet::Eight => &[0, 90, 180, 270, 45, 135, 225, 315],
        }
    }

    /// Unit lattice offset `(dx, dz)` for a heading, if it is one of the eight.
    pub fn offset(heading: i32) -> Option<(i32, i32)> {
        match normalize_heading(heading) {
            0 => Some((0, 1)),
            90 => Some((1, 0)),
            180 => Some((0, -1)),
            270 => Some((-1, 0)),
            45 => Some((1, 1)),
            135 => Some((1, -1)),
            225 => Some((-1, -1)),
            315 => Some((-1, 1)),
            _ => None,
        }
    }

    /// Whether the heading is part of this set.
    pub fn contains(&self, heading: i32) -> bool {
        self.headings().contains(&normalize_heading(heading))
    }

    /// Closest heading of the set (first one wins on ties).
    pub fn nearest(&self, theta: i32) -> i32 {
        let theta = normalize_heading(theta);
        let mut best = self.headings()[0];
        let mut best_diff = i32::MAX;
        for &heading in self.headings() {
            let diff = (heading - theta).rem_euclid(360);
            let diff = diff.min(360 - diff);
            if diff < best_diff {
                best = heading;
                best_diff = diff;
            }
        }
        best
    }
}

/// Whether a heading points along a diagonal.
#[inline]
pub fn is_diagonal(heading: i32) -> bool {
    normalize_heading(heading) % 90 != 0
}

/// Observed agent pose: planar position plus integer heading in degrees.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AgentPose {
    /// X coordinate (meters)
    pub x: f64,
    /// Z coordinate (meters)
    pub z: f64,
    /// Heading in degrees, 0 along +z, clockwise positive
    pub theta: i32,
}

impl AgentPose {
    /// Create a new pose.
    pub fn new(x: f64, z: f64, theta: i32) -> Self {
        Self { x, z, theta }
    }

    /// Planar position.
    #[inline]
    pub fn position(&self) -> Pose2D {
        Pose2D::new(self.x, self.z)
    }
}

/// Search state: lattice cell plus heading.
///
/// Equality and hashing use the cell only. Two states that differ only in
/// heading are the same key for the heuristic table and the invalid-state
/// registry.
#[derive(Clone, Copy, Debug)]
pub struct NavigationState {
    cell: LatticeCoord,
    theta: i32,
}

impl NavigationState {
    /// Create a state; the heading is normalized to [0, 360).
    pub fn new(cell: LatticeCoord, theta: i32) -> Self {
        Self {
            cell,
            theta: normalize_heading(theta),
        }
    }

    /// Snap an observed pose onto the lattice.
    pub fn from_pose(lattice: &Lattice, pose: AgentPose) -> Option<Self> {
        lattice
            .snap(pose.position())
            .map(|cell| Self::new(cell, pose.theta))
    }

    /// Lattice cell.
    #[inline]
    pub fn cell(&self) -> LatticeCoord {
        self.cell
    }

    /// Heading in degrees.
    #[inline]
    pub fn theta(&self) -> i32 {
        self.theta
    }

    /// Same position, different heading.
    pub fn with_theta(&self, theta: i32) -> Self {
        Self::new(self.cell, theta)
    }

    /// World position of the cell.
    #[inline]
    pub fn position(&self, lattice: &Lattice) -> Pose2D {
        lattice.to_world(self.cell)
    }

    /// L1 distance from this state to a world position.
    #[inline]
    pub fn distance_to(&self, lattice: &Lattice, goal: Pose2D) -> f64 {
        self.position(lattice).manhattan_distance(&goal)
    }
}

impl PartialEq for NavigationState {
    fn eq(&self, other: &Self) -> bool {
        self.cell == other.cell
    }
}

impl Eq for NavigationState {}

impl Hash for NavigationState {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.cell.hash(state);
    }
}

impl fmt::Display for NavigationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<NavigationState {}@{}>", self.cell, self.theta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::collections::hash_map::DefaultHasher;

    fn hash_of(state: &NavigationState) -> u64 {
        let mut hasher = DefaultHasher::new();
        state.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_equality_ignores_heading() {
        let cell = LatticeCoord::new(4, -7);
        for theta in [0, 45, 90, 180, 270, 315] {
            let a = NavigationState::new(cell, 0);
            let b = NavigationState::new(cell, theta);
            assert_eq!(a, b);
            assert_eq!(hash_of(&a), hash_of(&b));
        }

        let mut set = HashSet::new();
        set.insert(NavigationState::new(cell, 0));
        set.insert(NavigationState::new(cell, 90));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_different_cells_differ() {
        let a = NavigationState::new(LatticeCoord::new(1, 2), 0);
        let b = NavigationState::new(LatticeCoord::new(2, 1), 0);
        assert_ne!(a, b);
    }

    #[test]
    fn test_heading_normalized() {
        let state = NavigationState::new(LatticeCoord::default(), -90);
        assert_eq!(state.theta(), 270);
        assert_eq!(state.with_theta(405).theta(), 45);
    }

    #[test]
    fn test_from_pose_snaps() {
        let lattice = Lattice::new(0.05).unwrap();
        let state =
            NavigationState::from_pose(&lattice, AgentPose::new(0.1000001, -0.0499999, 90))
                .unwrap();
        assert_eq!(state.cell(), LatticeCoord::new(2, -1));
        assert_eq!(state.theta(), 90);
    }

    #[test]
    fn test_heading_sets() {
        assert_eq!(HeadingSet::Four.headings().len(), 4);
        assert_eq!(HeadingSet::Eight.headings().len(), 8);
        assert!(HeadingSet::Eight.contains(-45));
        assert!(!HeadingSet::Four.contains(45));

        for &heading in HeadingSet::Eight.headings() {
            assert!(HeadingSet::offset(heading).is_some());
        }
        assert_eq!(HeadingSet::offset(90), Some((1, 0)));
        assert_eq!(HeadingSet::offset(30), None);
    }

    #[test]
    fn test_nearest_heading() {
        assert_eq!(HeadingSet::Four.nearest(80), 90);
        assert_eq!(HeadingSet::Four.nearest(350), 0);
        assert_eq!(HeadingSet::Eight.nearest(30), 45);
        assert_eq!(HeadingSet::Eight.nearest(200), 180);
        // Exactly between 0 and 90: first listed heading wins
        assert_eq!(HeadingSet::Four.nearest(45), 0);
    }

    #[test]
    fn test_is_diagonal() {
        assert!(is_diagonal(45));
        assert!(is_diagonal(-135));
        assert!(!is_diagonal(180));
    }
}
