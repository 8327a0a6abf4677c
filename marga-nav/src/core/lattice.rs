//! Planar positions and the integer lattice used to key search state.
//!
//! Float positions drift under repeated addition, so every position that ends
//! up as a map key is first snapped to a [`LatticeCoord`].

use std::fmt;
use std::ops::Add;

use serde::{Deserialize, Serialize};

use crate::error::{MargaError, Result};

/// Relative slack when deciding a distance is a whole number of cells.
const CELL_TOLERANCE: f64 = 1e-6;

/// Planar world position in meters. The vertical axis is ignored.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose2D {
    /// X coordinate (meters)
    pub x: f64,
    /// Z coordinate (meters)
    pub z: f64,
}

impl Pose2D {
    /// Origin.
    pub const ZERO: Pose2D = Pose2D { x: 0.0, z: 0.0 };

    /// Create a new planar position.
    #[inline]
    pub fn new(x: f64, z: f64) -> Self {
        Self { x, z }
    }

    /// L1 ("manhattan") distance.
    #[inline]
    pub fn manhattan_distance(&self, other: &Pose2D) -> f64 {
        (other.x - self.x).abs() + (other.z - self.z).abs()
    }

    /// Both coordinates are finite.
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.z.is_finite()
    }
}

impl fmt::Display for Pose2D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.3}, {:.3})", self.x, self.z)
    }
}

/// Integer lattice coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct LatticeCoord {
    /// Cell index along x
    pub x: i32,
    /// Cell index along z
    pub z: i32,
}

impl LatticeCoord {
    /// Create a new lattice coordinate.
    #[inline]
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Offset by a number of cells along each axis.
    #[inline]
    pub fn offset(&self, dx: i32, dz: i32) -> Self {
        Self::new(self.x.saturating_add(dx), self.z.saturating_add(dz))
    }

    /// L1 distance in cells.
    #[inline]
    pub fn manhattan_distance(&self, other: &LatticeCoord) -> i64 {
        (other.x as i64 - self.x as i64).abs() + (other.z as i64 - self.z as i64).abs()
    }
}

impl Add for LatticeCoord {
    type Output = LatticeCoord;

    fn add(self, rhs: LatticeCoord) -> LatticeCoord {
        self.offset(rhs.x, rhs.z)
    }
}

impl fmt::Display for LatticeCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.x, self.z)
    }
}

/// Fixed-resolution lattice that maps world positions to integer cells.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Lattice {
    resolution: f64,
}

impl Lattice {
    /// Create a lattice with the given cell size in meters.
    pub fn new(resolution: f64) -> Result<Self> {
        if !resolution.is_finite() || resolution <= 0.0 {
            return Err(MargaError::InvalidLattice(format!(
                "resolution must be positive and finite, got {}",
                resolution
            )));
        }
        Ok(Self { resolution })
    }

    /// Cell size in meters.
    #[inline]
    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    /// Snap a world position to the nearest lattice point.
    ///
    /// Returns `None` when the position is not finite or lies outside the
    /// representable cell range.
    pub fn snap(&self, pose: Pose2D) -> Option<LatticeCoord> {
        Some(LatticeCoord::new(
            self.snap_axis(pose.x)?,
            self.snap_axis(pose.z)?,
        ))
    }

    fn snap_axis(&self, value: f64) -> Option<i32> {
        let cell = (value / self.resolution).round();
        if cell.is_finite() && cell >= i32::MIN as f64 && cell <= i32::MAX as f64 {
            Some(cell as i32)
        } else {
            None
        }
    }

    /// World position of a lattice point.
    #[inline]
    pub fn to_world(&self, coord: LatticeCoord) -> Pose2D {
        Pose2D::new(
            coord.x as f64 * self.resolution,
            coord.z as f64 * self.resolution,
        )
    }

    /// Number of cells spanned by `distance`, or `None` unless it is a
    /// whole, positive number of cells.
    pub fn cells_for(&self, distance: f64) -> Option<i32> {
        let ratio = distance / self.resolution;
        let cells = ratio.round();
        if !cells.is_finite() || cells < 1.0 || cells > i32::MAX as f64 {
            return None;
        }
        ((ratio - cells).abs() <= CELL_TOLERANCE * cells).then_some(cells as i32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_snap_round_trip() {
        let lattice = Lattice::new(0.05).unwrap();

        // Accumulated additions must land on the same cell
        let mut z = 0.0;
        for _ in 0..3 {
            z += 0.05;
        }
        let coord = lattice.snap(Pose2D::new(0.0, z)).unwrap();
        assert_eq!(coord, LatticeCoord::new(0, 3));

        let back = lattice.to_world(coord);
        assert_relative_eq!(back.z, 0.15, epsilon = 1e-12);
    }

    #[test]
    fn test_snap_rejects_unrepresentable() {
        let lattice = Lattice::new(0.05).unwrap();
        assert!(lattice.snap(Pose2D::new(f64::NAN, 0.0)).is_none());
        assert!(lattice.snap(Pose2D::new(0.0, f64::INFINITY)).is_none());
        assert!(lattice.snap(Pose2D::new(1e12, 0.0)).is_none());
    }

    #[test]
    fn test_invalid_resolution() {
        assert!(Lattice::new(0.0).is_err());
        assert!(Lattice::new(-1.0).is_err());
        assert!(Lattice::new(f64::NAN).is_err());
    }

    #[test]
    fn test_cells_for() {
        let lattice = Lattice::new(0.05).unwrap();
        assert_eq!(lattice.cells_for(0.05), Some(1));
        assert_eq!(lattice.cells_for(0.25), Some(5));
        assert_eq!(lattice.cells_for(0.15), Some(3));
        // Partial cells cannot be predicted
        assert_eq!(lattice.cells_for(0.01), None);
        assert_eq!(lattice.cells_for(0.07), None);
        assert_eq!(lattice.cells_for(0.0), None);
        assert_eq!(lattice.cells_for(f64::INFINITY), None);
    }

    #[test]
    fn test_manhattan_distance() {
        let a = LatticeCoord::new(-2, 3);
        let b = LatticeCoord::new(1, -1);
        assert_eq!(a.manhattan_distance(&b), 7);
        assert_relative_eq!(
            Pose2D::new(0.0, 0.0).manhattan_distance(&Pose2D::new(-1.0, 2.0)),
            3.0
        );
    }
}
