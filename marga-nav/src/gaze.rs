//! Gaze controller: turn toward a target and tilt the camera until it is
//! centered in the frame.

use tracing::{debug, info, warn};

use crate::core::{Action, AgentPose, DEFAULT_ROTATE_INCREMENT, Pose2D, Primitive, rotation_between};
use crate::utils::bearing_degrees;
use crate::world::{Executor, Observer, VisibilityOracle};

/// Horizon tolerance when comparing against the tilt bounds.
const HORIZON_EPSILON: f64 = 1e-6;

/// Configuration for the gaze controller.
#[derive(Clone, Debug)]
pub struct GazeConfig {
    /// Lowest horizon (degrees, negative looks up)
    pub min_horizon: f64,
    /// Highest horizon (degrees, positive looks down)
    pub max_horizon: f64,
    /// Tilt per step (degrees)
    pub tilt_step: f64,
    /// Centering thresholds, applied in order
    pub thresholds: Vec<f64>,
    /// Executor rotation granularity (degrees)
    pub rotate_increment: f64,
}

impl Default for GazeConfig {
    fn default() -> Self {
        Self {
            min_horizon: -30.0,
            max_horizon: 60.0,
            tilt_step: 15.0,
            thresholds: vec![0.7, 0.3],
            rotate_increment: DEFAULT_ROTATE_INCREMENT,
        }
    }
}

/// Result of a gaze attempt.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GazeOutcome {
    /// Target centered within the tightest threshold that succeeded
    Centered {
        /// Threshold that was met
        threshold: f64,
    },
    /// Target in view but never centered
    VisibleOffCenter,
    /// Target never came into view
    NotVisible,
}

/// Direction of the search sweep when the target is out of view.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Sweep {
    Down,
    Up,
    Exhausted,
}

/// Turns the agent toward targets and centers them vertically.
pub struct GazeController {
    config: GazeConfig,
}

impl GazeController {
    /// Create a new controller with configuration.
    pub fn new(config: GazeConfig) -> Self {
        Self { config }
    }

    /// Create a new controller with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(GazeConfig::default())
    }

    /// Heading change (degrees, in [0, 360)) that faces the target.
    pub fn heading_delta(pose: &AgentPose, target: Pose2D) -> i32 {
        let bearing = bearing_degrees(target.x - pose.x, target.z - pose.z).round() as i32;
        (bearing - pose.theta).rem_euclid(360)
    }

    /// Rotation that faces the target, or `None` when already facing it.
    pub fn alignment_action(&self, pose: &AgentPose, target: Pose2D) -> Option<Action> {
        let delta = Self::heading_delta(pose, target);
        rotation_between(delta as f64)
            .map(|rotation| Action::new(vec![rotation], self.config.rotate_increment))
    }

    /// Face the target, then tilt until it is centered.
    ///
    /// A target that never becomes visible is logged and reported as
    /// [`GazeOutcome::NotVisible`].
    pub fn look_at<W>(&self, world: &mut W, target: Pose2D, object_id: &str) -> GazeOutcome
    where
        W: Executor + Observer + VisibilityOracle + ?Sized,
    {
        let pose = world.current_pose();
        if let Some(action) = self.alignment_action(&pose, target) {
            debug!("aligning toward {}: {}", object_id, action);
            if !world.execute(&action) {
                warn!("alignment toward {} failed", object_id);
            }
        }

        let mut achieved = None;
        for &threshold in &self.config.thresholds {
            if self.center_pass(world, object_id, threshold) {
                achieved = Some(threshold);
            }
        }

        match achieved {
            Some(threshold) => {
                info!(
                    "{} centered (threshold {:.2}, horizon {:.1}°)",
                    object_id,
                    threshold,
                    world.camera_horizon()
                );
                GazeOutcome::Centered { threshold }
            }
            None if world.is_visible(object_id) => GazeOutcome::VisibleOffCenter,
            None => {
                warn!("{} never became visible", object_id);
                GazeOutcome::NotVisible
            }
        }
    }

    /// One tilt pass; returns whether the target ended centered.
    fn center_pass<W>(&self, world: &mut W, object_id: &str, threshold: f64) -> bool
    where
        W: Executor + Observer + VisibilityOracle + ?Sized,
    {
        let Some(max_steps) = self.max_tilt_steps() else {
            warn!(
                "tilt step {} cannot move the camera, not centering {}",
                self.config.tilt_step, object_id
            );
            return world
                .frame_fraction(object_id)
                .filter(|_| world.is_visible(object_id))
                .is_some_and(|(u, _)| (u - 0.5).abs() * 2.0 < threshold);
        };
        let mut sweep = Sweep::Down;

        for _ in 0..max_steps {
            let fraction = world
                .frame_fraction(object_id)
                .filter(|_| world.is_visible(object_id));

            let command = match fraction {
                Some((u, _)) if (u - 0.5).abs() * 2.0 < threshold => return true,
                Some((u, _)) if u < 0.5 => Primitive::LookUp {
                    degrees: self.config.tilt_step,
                },
                Some(_) => Primitive::LookDown {
                    degrees: self.config.tilt_step,
                },
                None => {
                    let horizon = world.camera_horizon();
                    if sweep == Sweep::Down
                        && horizon + self.config.tilt_step
                            > self.config.max_horizon + HORIZON_EPSILON
                    {
                        sweep = Sweep::Up;
                    }
                    if sweep == Sweep::Up
                        && horizon - self.config.tilt_step
                            < self.config.min_horizon - HORIZON_EPSILON
                    {
                        sweep = Sweep::Exhausted;
                    }
                    match sweep {
                        Sweep::Down => Primitive::LookDown {
                            degrees: self.config.tilt_step,
                        },
                        Sweep::Up => Primitive::LookUp {
                            degrees: self.config.tilt_step,
                        },
                        Sweep::Exhausted => return false,
                    }
                }
            };

            let action = Action::new(vec![command], self.config.rotate_increment);
            if !world.execute(&action) {
                debug!("tilt limit reached while centering {}", object_id);
                if fraction.is_some() {
                    return false;
                }
                sweep = match sweep {
                    Sweep::Down => Sweep::Up,
                    _ => Sweep::Exhausted,
                };
            }
        }
        false
    }

    /// Tilt commands allowed in one pass; `None` when the step cannot tilt.
    fn max_tilt_steps(&self) -> Option<usize> {
        let step = self.config.tilt_step;
        if !step.is_finite() || step <= 0.0 {
            return None;
        }
        let span = (self.config.max_horizon - self.config.min_horizon).abs();
        let per_sweep = (span / step).ceil() as usize;
        Some(per_sweep.saturating_mul(2).saturating_add(4))
    }
}
