//! Primitive commands and compound actions.
//!
//! A compound [`Action`] keeps the primitives it was planned with (which
//! define its cost) and the executor-granular command list derived from them.
//! Angular primitives larger than the rotation increment are split into
//! increment-sized steps followed by the remainder.

use std::fmt;

/// Executor rotation granularity in degrees.
pub const DEFAULT_ROTATE_INCREMENT: f64 = 15.0;

/// Tolerance for angular remainders after decomposition.
const ANGLE_EPSILON: f64 = 1e-9;

/// Direction of an in-place rotation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RotateDirection {
    /// Counter-clockwise (heading decreases)
    Left,
    /// Clockwise (heading increases)
    Right,
}

/// A single executor command.
///
/// Angular magnitudes are non-negative degrees; the direction lives in the
/// variant.
#[derive(Clone, Debug, PartialEq)]
pub enum Primitive {
    /// Rotate in place
    Rotate {
        /// Rotation direction
        direction: RotateDirection,
        /// Magnitude in degrees
        degrees: f64,
    },
    /// Move forward along the current heading
    Move {
        /// Distance in meters
        magnitude: f64,
    },
    /// Set the heading directly
    TeleportRotation {
        /// Target heading in degrees
        heading: i32,
    },
    /// Set the position directly
    TeleportPosition {
        /// Target x (meters)
        x: f64,
        /// Target z (meters)
        z: f64,
    },
    /// Tilt the camera up
    LookUp {
        /// Magnitude in degrees
        degrees: f64,
    },
    /// Tilt the camera down
    LookDown {
        /// Magnitude in degrees
        degrees: f64,
    },
    /// Any other named command
    Other {
        /// Command name
        name: String,
    },
}

/// Closed set of primitive kinds, each with a cost weight and decomposition rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    /// In-place rotation
    Rotate,
    /// Forward motion
    Move,
    /// Direct pose assignment
    Teleport,
    /// Camera tilt up
    LookUp,
    /// Camera tilt down
    LookDown,
    /// Anything else
    Other,
}

impl PrimitiveKind {
    /// Cost contributed by one primitive of this kind.
    pub fn cost_weight(&self) -> f64 {
        match self {
            PrimitiveKind::Rotate => 1.0,
            PrimitiveKind::Teleport => 2.0,
            PrimitiveKind::Move
            | PrimitiveKind::LookUp
            | PrimitiveKind::LookDown
            | PrimitiveKind::Other => 0.5,
        }
    }

    /// Whether primitives of this kind are split at the rotation increment.
    pub fn is_angular(&self) -> bool {
        matches!(
            self,
            PrimitiveKind::Rotate | PrimitiveKind::LookUp | PrimitiveKind::LookDown
        )
    }
}

impl Primitive {
    /// Kind of this primitive.
    pub fn kind(&self) -> PrimitiveKind {
        match self {
            Primitive::Rotate { .. } => PrimitiveKind::Rotate,
            Primitive::Move { .. } => PrimitiveKind::Move,
            Primitive::TeleportRotation { .. } | Primitive::TeleportPosition { .. } => {
                PrimitiveKind::Teleport
            }
            Primitive::LookUp { .. } => PrimitiveKind::LookUp,
            Primitive::LookDown { .. } => PrimitiveKind::LookDown,
            Primitive::Other { .. } => PrimitiveKind::Other,
        }
    }

    /// Angular magnitude for rotate/look primitives.
    pub fn angular_degrees(&self) -> Option<f64> {
        match self {
            Primitive::Rotate { degrees, .. }
            | Primitive::LookUp { degrees }
            | Primitive::LookDown { degrees } => Some(*degrees),
            _ => None,
        }
    }

    fn with_degrees(&self, degrees: f64) -> Primitive {
        match self {
            Primitive::Rotate { direction, .. } => Primitive::Rotate {
                direction: *direction,
                degrees,
            },
            Primitive::LookUp { .. } => Primitive::LookUp { degrees },
            Primitive::LookDown { .. } => Primitive::LookDown { degrees },
            other => other.clone(),
        }
    }

    /// Split into executor-granular steps no larger than `increment`.
    ///
    /// Zero-degree remainders are dropped, so 180° at 15° yields exactly
    /// twelve steps. Non-angular primitives pass through unchanged.
    pub fn decompose(&self, increment: f64) -> Vec<Primitive> {
        let Some(degrees) = self.angular_degrees() else {
            return vec![self.clone()];
        };
        if increment.is_nan() || increment <= 0.0 || !degrees.is_finite() {
            return vec![self.clone()];
        }

        let mut steps = Vec::new();
        let mut remaining = degrees;
        while remaining > increment + ANGLE_EPSILON {
            steps.push(self.with_degrees(increment));
            remaining -= increment;
        }
        if remaining > ANGLE_EPSILON {
            steps.push(self.with_degrees(remaining));
        }
        steps
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Primitive::Rotate {
                direction: RotateDirection::Left,
                degrees,
            } => write!(f, "RotateLeft({:.1}°)", degrees),
            Primitive::Rotate {
                direction: RotateDirection::Right,
                degrees,
            } => write!(f, "RotateRight({:.1}°)", degrees),
            Primitive::Move { magnitude } => write!(f, "MoveAhead({:.3}m)", magnitude),
            Primitive::TeleportRotation { heading } => write!(f, "Teleport(rotation={}°)", heading),
            Primitive::TeleportPosition { x, z } => {
                write!(f, "Teleport(position=({:.3}, {:.3}))", x, z)
            }
            Primitive::LookUp { degrees } => write!(f, "LookUp({:.1}°)", degrees),
            Primitive::LookDown { degrees } => write!(f, "LookDown({:.1}°)", degrees),
            Primitive::Other { name } => write!(f, "{}", name),
        }
    }
}

/// Shorter-direction rotation for a heading delta in degrees.
///
/// Deltas in (0, 180) turn right, [180, 360) turn left by `360 - delta`;
/// negative deltas mirror that rule. A zero delta needs no rotation.
pub fn rotation_between(delta: f64) -> Option<Primitive> {
    let delta = delta % 360.0;
    if delta.abs() < ANGLE_EPSILON || !delta.is_finite() {
        return None;
    }

    let (direction, degrees) = if delta > 0.0 {
        if delta < 180.0 {
            (RotateDirection::Right, delta)
        } else {
            (RotateDirection::Left, 360.0 - delta)
        }
    } else if delta > -180.0 {
        (RotateDirection::Left, -delta)
    } else {
        (RotateDirection::Right, 360.0 + delta)
    };

    Some(Primitive::Rotate { direction, degrees })
}

/// Ordered primitive sequence executed as one planning-level move.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Action {
    primitives: Vec<Primitive>,
    commands: Vec<Primitive>,
}

impl Action {
    /// Build an action, decomposing angular primitives at `increment` degrees.
    pub fn new(primitives: Vec<Primitive>, increment: f64) -> Self {
        let commands = primitives
            .iter()
            .flat_map(|p| p.decompose(increment))
            .collect();
        Self {
            primitives,
            commands,
        }
    }

    /// Build an action with the default 15° increment.
    pub fn with_default_increment(primitives: Vec<Primitive>) -> Self {
        Self::new(primitives, DEFAULT_ROTATE_INCREMENT)
    }

    /// Action with no commands.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Sum of per-kind weights over the planned primitives.
    pub fn cost(&self) -> f64 {
        self.primitives.iter().map(|p| p.kind().cost_weight()).sum()
    }

    /// Primitives as planned.
    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    /// Executor-granular commands.
    pub fn commands(&self) -> &[Primitive] {
        &self.commands
    }

    /// True when there is nothing to execute.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Whether any planned primitive is of the given kind.
    pub fn contains_kind(&self, kind: PrimitiveKind) -> bool {
        self.primitives.iter().any(|p| p.kind() == kind)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Action[")?;
        for (i, command) in self.commands.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", command)?;
        }
        write!(f, "] cost={:.1}", self.cost())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn total_degrees(commands: &[Primitive]) -> f64 {
        commands.iter().filter_map(Primitive::angular_degrees).sum()
    }

    #[test]
    fn test_cost_weights() {
        let action = Action::with_default_increment(vec![
            Primitive::Rotate {
                direction: RotateDirection::Right,
                degrees: 90.0,
            },
            Primitive::Move { magnitude: 0.05 },
        ]);
        assert_relative_eq!(action.cost(), 1.5);

        let teleport = Action::with_default_increment(vec![
            Primitive::TeleportRotation { heading: 90 },
            Primitive::TeleportPosition { x: 1.0, z: 2.0 },
        ]);
        assert_relative_eq!(teleport.cost(), 4.0);

        let look = Action::with_default_increment(vec![
            Primitive::LookUp { degrees: 30.0 },
            Primitive::LookDown { degrees: 10.0 },
            Primitive::Other {
                name: "Done".to_string(),
            },
        ]);
        assert_relative_eq!(look.cost(), 1.5);
    }

    #[test]
    fn test_cost_ignores_decomposition() {
        // One planned rotation of 90° is six commands but still costs 1.0
        let action = Action::with_default_increment(vec![Primitive::Rotate {
            direction: RotateDirection::Left,
            degrees: 90.0,
        }]);
        assert_eq!(action.commands().len(), 6);
        assert_relative_eq!(action.cost(), 1.0);
    }

    #[test]
    fn test_cost_non_negative() {
        assert_relative_eq!(Action::empty().cost(), 0.0);
        let kinds = [
            PrimitiveKind::Rotate,
            PrimitiveKind::Move,
            PrimitiveKind::Teleport,
            PrimitiveKind::LookUp,
            PrimitiveKind::LookDown,
            PrimitiveKind::Other,
        ];
        for kind in kinds {
            assert!(kind.cost_weight() >= 0.0);
        }
    }

    #[test]
    fn test_decompose_with_remainder() {
        let rotate = Primitive::Rotate {
            direction: RotateDirection::Right,
            degrees: 40.0,
        };
        let steps = rotate.decompose(15.0);
        assert_eq!(steps.len(), 3);
        assert_eq!(steps[0].angular_degrees(), Some(15.0));
        assert_eq!(steps[1].angular_degrees(), Some(15.0));
        assert_relative_eq!(steps[2].angular_degrees().unwrap(), 10.0);
        assert_relative_eq!(total_degrees(&steps), 40.0);
    }

    #[test]
    fn test_decompose_exact_multiple() {
        let rotate = Primitive::Rotate {
            direction: RotateDirection::Left,
            degrees: 180.0,
        };
        let steps = rotate.decompose(15.0);
        assert_eq!(steps.len(), 12);
        assert!(steps.iter().all(|s| s.angular_degrees() == Some(15.0)));
    }

    #[test]
    fn test_decompose_passes_through_moves() {
        let step = Primitive::Move { magnitude: 0.5 };
        assert_eq!(step.decompose(15.0), vec![step.clone()]);

        let small = Primitive::LookDown { degrees: 10.0 };
        assert_eq!(small.decompose(15.0), vec![small.clone()]);
    }

    #[test]
    fn test_rotation_sign_convention() {
        let check = |delta: f64, direction: RotateDirection, degrees: f64| {
            match rotation_between(delta) {
                Some(Primitive::Rotate {
                    direction: d,
                    degrees: g,
                }) => {
                    assert_eq!(d, direction, "delta {}", delta);
                    assert_relative_eq!(g, degrees);
                }
                other => panic!("unexpected rotation for {}: {:?}", delta, other),
            }
        };

        check(90.0, RotateDirection::Right, 90.0);
        check(180.0, RotateDirection::Left, 180.0);
        check(270.0, RotateDirection::Left, 90.0);
        check(-90.0, RotateDirection::Left, 90.0);
        check(-180.0, RotateDirection::Right, 180.0);
        check(-270.0, RotateDirection::Right, 90.0);
        assert!(rotation_between(0.0).is_none());
        assert!(rotation_between(360.0).is_none());
    }

    #[test]
    fn test_display() {
        let action = Action::with_default_increment(vec![Primitive::Move { magnitude: 0.05 }]);
        assert_eq!(action.to_string(), "Action[MoveAhead(0.050m)] cost=0.5");
        assert!(action.contains_kind(PrimitiveKind::Move));
        assert!(!action.contains_kind(PrimitiveKind::Rotate));
    }
}
