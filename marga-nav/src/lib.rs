//! # MargaNav
//!
//! Online navigation engine that learns its heuristic while it moves.
//!
//! ## Overview
//!
//! The agent knows its pose and a goal but not which cells are blocked. It
//! discovers obstacles by trying to move and failing. Planning uses LRTA*:
//!
//! - **k = 1**: score each successor by `h + cost`, execute the cheapest, and
//!   raise the current state's `h`
//! - **k > 1**: grow a bounded breadth-first tree, back values up from the
//!   best boundary record, commit only the first step
//!
//! Failed moves mark the target cell in a shared
//! [`InvalidStateRegistry`](search::InvalidStateRegistry) that outlives any
//! single goal.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use marga_nav::{GridWorld, InvalidStateRegistry, MargaConfig, Navigator, Pose2D};
//!
//! let config = MargaConfig::default();
//! let mut world = GridWorld::from_ascii(&std::fs::read_to_string("maps/kitchen.txt")?, 0.25)?;
//! let navigator = Navigator::new(&config, InvalidStateRegistry::new())?;
//!
//! let outcome = navigator.go_to(&mut world, Pose2D::new(1.0, 2.0))?;
//! println!("{:?} after {} iterations", outcome.status, outcome.stats.iterations);
//! ```
//!
//! ## Coordinate System
//!
//! Planar (x, z) in meters. Headings are integer degrees with 0 facing +z,
//! 90 facing +x, clockwise positive. Camera horizon is positive looking down.

// Core value types
pub mod core;

// Online search and planners
pub mod search;

// Camera gaze control
pub mod gaze;

// High-level navigation facade
pub mod navigator;

// Environment contracts and simulated world
pub mod world;

// Configuration
pub mod config;

pub mod error;
pub mod utils;

pub use config::MargaConfig;
pub use core::{Action, AgentPose, Lattice, LatticeCoord, NavigationState, Pose2D, Primitive};
pub use error::{MargaError, Result};
pub use gaze::{GazeConfig, GazeController, GazeOutcome};
pub use navigator::Navigator;
pub use search::{InvalidStateRegistry, PlanOutcome, PlanStatus, StuckReason};
pub use world::{
    Executor, GridWorld, ObjectLocator, Observer, ReachabilityOracle, VisibilityOracle,
};
