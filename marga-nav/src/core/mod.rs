//! Core value types for the navigation engine.
//!
//! ## Coordinates
//! - [`Pose2D`]: planar world position (x, z) in meters
//! - [`LatticeCoord`]: integer cell indices used as search keys
//! - [`Lattice`]: fixed-resolution snapping between the two
//!
//! ## Agent State
//! - [`AgentPose`]: observed pose with integer heading
//! - [`NavigationState`]: lattice cell plus heading, compared by cell only
//! - [`HeadingSet`]: the discrete headings the agent may face
//!
//! ## Actions
//! - [`Primitive`] / [`PrimitiveKind`]: executor commands and their cost class
//! - [`Action`]: compound command sequence with a declared cost

mod action;
mod lattice;
mod state;

pub use action::{
    Action, DEFAULT_ROTATE_INCREMENT, Primitive, PrimitiveKind, RotateDirection, rotation_between,
};
pub use lattice::{Lattice, LatticeCoord, Pose2D};
pub use state::{AgentPose, HeadingSet, NavigationState, is_diagonal};
