//! Contracts with the environment the planner drives.
//!
//! The planner never touches the world directly. It issues compound actions
//! through an [`Executor`], reads the pose back through an [`Observer`], and
//! optionally consults oracles for reachable positions, visibility and object
//! locations. [`GridWorld`] implements all of them for tests and the demo
//! binary.

mod sim;

pub use sim::{GridWorld, GridWorldConfig, WorldObject};

use crate::core::{Action, AgentPose, Pose2D, Primitive};

/// Applies commands to the agent.
pub trait Executor {
    /// Apply one executor-granular command; returns whether it succeeded.
    fn execute_primitive(&mut self, command: &Primitive) -> bool;

    /// Apply a compound action in order, stopping at the first failed command.
    ///
    /// A failure leaves the agent wherever the earlier commands put it;
    /// callers must re-observe the pose afterwards.
    fn execute(&mut self, action: &Action) -> bool {
        for command in action.commands() {
            tracing::debug!("executing {}", command);
            if !self.execute_primitive(command) {
                tracing::info!("command unsuccessful: {}", command);
                return false;
            }
        }
        true
    }
}

/// Reports the agent's current pose.
pub trait Observer {
    /// Current planar pose and heading.
    fn current_pose(&self) -> AgentPose;

    /// Camera tilt in degrees, positive looking down.
    fn camera_horizon(&self) -> f64 {
        0.0
    }
}

/// Snapshot of known-traversable positions.
pub trait ReachabilityOracle {
    /// All positions the agent can stand on.
    fn reachable_positions(&self) -> Vec<Pose2D>;
}

/// Visibility queries for the gaze controller.
pub trait VisibilityOracle {
    /// Whether the object is currently in view.
    fn is_visible(&self, object_id: &str) -> bool;

    /// Object center as (vertical, horizontal) fractions of the frame in [0, 1].
    fn frame_fraction(&self, object_id: &str) -> Option<(f64, f64)>;
}

/// Resolves object ids to planar positions.
pub trait ObjectLocator {
    /// Planar position of the object, if it exists.
    fn object_position(&self, object_id: &str) -> Option<Pose2D>;
}
