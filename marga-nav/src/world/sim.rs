//! Simulated grid world for tests and the demo binary.
//!
//! Maps are plain text, one character per cell:
//!
//! | Char | Meaning |
//! |------|---------|
//! | `#`  | wall |
//! | `.`  | floor |
//! | `S`  | floor, agent start (heading 0) |
//! | `a`-`z` | floor holding an object whose id is the letter |
//!
//! Row 0 is the lowest z, column 0 the lowest x. Anything outside the map
//! counts as a wall.

use std::collections::HashMap;
use std::time::Duration;

use tracing::{debug, warn};

use super::{Executor, ObjectLocator, Observer, ReachabilityOracle, VisibilityOracle};
use crate::core::{AgentPose, Pose2D, Primitive, RotateDirection};
use crate::error::{MargaError, Result};
use crate::utils::{bearing_degrees, normalize_heading, signed_degrees};

/// Horizon tolerance when checking tilt bounds.
const HORIZON_EPSILON: f64 = 1e-6;

/// Default height of objects placed from the map text (meters).
const DEFAULT_OBJECT_HEIGHT: f64 = 0.5;

/// Simulation parameters.
#[derive(Clone, Debug)]
pub struct GridWorldConfig {
    /// Pause before each command, mimicking simulator pacing
    pub step_interval: Duration,
    /// Maximum distance at which objects are visible (meters)
    pub view_distance: f64,
    /// Camera field of view, horizontal and vertical (degrees)
    pub field_of_view: f64,
    /// Camera height above the floor (meters)
    pub eye_height: f64,
    /// Lowest camera horizon (degrees, negative looks up)
    pub min_horizon: f64,
    /// Highest camera horizon (degrees, positive looks down)
    pub max_horizon: f64,
}

impl Default for GridWorldConfig {
    fn default() -> Self {
        Self {
            step_interval: Duration::ZERO,
            view_distance: 1.5,
            field_of_view: 60.0,
            eye_height: 0.9,
            min_horizon: -30.0,
            max_horizon: 60.0,
        }
    }
}

/// An object the agent can navigate to or look at.
#[derive(Clone, Debug, PartialEq)]
pub struct WorldObject {
    /// Planar position (meters)
    pub position: Pose2D,
    /// Height of the object's center above the floor (meters)
    pub height: f64,
}

/// Occupancy grid with a single agent.
pub struct GridWorld {
    /// Free flags, row-major
    free: Vec<bool>,
    width: usize,
    height: usize,
    /// Cell size in meters
    resolution: f64,
    /// World position of cell (0, 0)
    origin: Pose2D,
    /// Agent state
    pose: AgentPose,
    horizon: f64,
    objects: HashMap<String, WorldObject>,
    config: GridWorldConfig,
    /// Sum of successful move magnitudes (meters)
    path_length: f64,
    commands_executed: usize,
}

impl GridWorld {
    /// Parse a map with cell (0, 0) at the world origin.
    pub fn from_ascii(text: &str, resolution: f64) -> Result<Self> {
        Self::from_ascii_at(text, resolution, Pose2D::ZERO)
    }

    /// Parse a map with cell (0, 0) at `origin`.
    pub fn from_ascii_at(text: &str, resolution: f64, origin: Pose2D) -> Result<Self> {
        if !resolution.is_finite() || resolution <= 0.0 {
            return Err(MargaError::World(format!(
                "cell size must be positive, got {}",
                resolution
            )));
        }

        let rows: Vec<&str> = text
            .lines()
            .map(str::trim_end)
            .filter(|line| !line.is_empty())
            .collect();
        if rows.is_empty() {
            return Err(MargaError::World("map is empty".to_string()));
        }

        let width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);
        let height = rows.len();
        let mut free = vec![false; width * height];
        let mut start = None;
        let mut letters = Vec::new();

        for (row, line) in rows.iter().enumerate() {
            for (col, ch) in line.chars().enumerate() {
                let idx = row * width + col;
                match ch {
                    '#' => {}
                    '.' => free[idx] = true,
                    'S' => {
                        if start.is_some() {
                            return Err(MargaError::World(
                                "map has more than one start cell".to_string(),
                            ));
                        }
                        free[idx] = true;
                        start = Some((col, row));
                    }
                    'a'..='z' => {
                        free[idx] = true;
                        letters.push((ch, col, row));
                    }
                    other => {
                        return Err(MargaError::World(format!(
                            "unexpected character {:?} at row {}, column {}",
                            other, row, col
                        )));
                    }
                }
            }
        }

        let (start_col, start_row) =
            start.ok_or_else(|| MargaError::World("map has no start cell 'S'".to_string()))?;

        let cell_world = |col: usize, row: usize| {
            Pose2D::new(
                origin.x + col as f64 * resolution,
                origin.z + row as f64 * resolution,
            )
        };

        let start_pos = cell_world(start_col, start_row);
        let mut objects = HashMap::new();
        for (ch, col, row) in letters {
            objects.insert(
                ch.to_string(),
                WorldObject {
                    position: cell_world(col, row),
                    height: DEFAULT_OBJECT_HEIGHT,
                },
            );
        }

        debug!(
            "Loaded {}x{} map at {:.3}m/cell with {} objects",
            width,
            height,
            resolution,
            objects.len()
        );

        Ok(Self {
            free,
            width,
            height,
            resolution,
            origin,
            pose: AgentPose::new(start_pos.x, start_pos.z, 0),
            horizon: 0.0,
            objects,
            config: GridWorldConfig::default(),
            path_length: 0.0,
            commands_executed: 0,
        })
    }

    /// Replace the simulation parameters.
    pub fn with_config(mut self, config: GridWorldConfig) -> Self {
        self.config = config;
        self
    }

    /// Add or replace an object.
    pub fn with_object(mut self, id: &str, position: Pose2D, height: f64) -> Self {
        self.objects
            .insert(id.to_string(), WorldObject { position, height });
        self
    }

    /// Map width in cells.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Map height in cells.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Cell size in meters.
    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    /// Total distance travelled by successful moves (meters).
    pub fn path_length(&self) -> f64 {
        self.path_length
    }

    /// Number of commands attempted.
    pub fn commands_executed(&self) -> usize {
        self.commands_executed
    }

    /// Place the agent directly.
    pub fn set_pose(&mut self, pose: AgentPose) {
        self.pose = AgentPose::new(pose.x, pose.z, normalize_heading(pose.theta));
    }

    /// Set the camera horizon directly.
    pub fn set_horizon(&mut self, horizon: f64) {
        self.horizon = horizon;
    }

    /// Whether the agent may stand at the position.
    pub fn is_free(&self, x: f64, z: f64) -> bool {
        self.cell_index(x, z).is_some_and(|idx| self.free[idx])
    }

    fn cell_index(&self, x: f64, z: f64) -> Option<usize> {
        let col = ((x - self.origin.x) / self.resolution).round();
        let row = ((z - self.origin.z) / self.resolution).round();
        if col < 0.0 || row < 0.0 || !col.is_finite() || !row.is_finite() {
            return None;
        }
        let (col, row) = (col as usize, row as usize);
        if col < self.width && row < self.height {
            Some(row * self.width + col)
        } else {
            None
        }
    }

    fn tilt(&mut self, delta: f64) -> bool {
        let next = self.horizon + delta;
        if next < self.config.min_horizon - HORIZON_EPSILON
            || next > self.config.max_horizon + HORIZON_EPSILON
        {
            return false;
        }
        self.horizon = next;
        true
    }

    /// Angles of an object relative to the camera: (vertical, horizontal) in
    /// degrees, or `None` when it is out of range.
    fn view_angles(&self, object_id: &str) -> Option<(f64, f64)> {
        let object = self.objects.get(object_id)?;
        let dx = object.position.x - self.pose.x;
        let dz = object.position.z - self.pose.z;
        let distance = dx.hypot(dz);
        if distance > self.config.view_distance {
            return None;
        }

        let horizontal = signed_degrees(bearing_degrees(dx, dz) - self.pose.theta as f64);
        // Positive when the object sits below the camera
        let vertical = (self.config.eye_height - object.height)
            .atan2(distance)
            .to_degrees()
            - self.horizon;

        let half_fov = self.config.field_of_view / 2.0;
        if horizontal.abs() <= half_fov && vertical.abs() <= half_fov {
            Some((vertical, horizontal))
        } else {
            None
        }
    }
}

impl Executor for GridWorld {
    fn execute_primitive(&mut self, command: &Primitive) -> bool {
        if !self.config.step_interval.is_zero() {
            std::thread::sleep(self.config.step_interval);
        }
        self.commands_executed += 1;

        match command {
            Primitive::Rotate { direction, degrees } => {
                let step = degrees.round() as i32;
                let theta = match direction {
                    RotateDirection::Right => self.pose.theta + step,
                    RotateDirection::Left => self.pose.theta - step,
                };
                self.pose.theta = normalize_heading(theta);
                true
            }
            Primitive::TeleportRotation { heading } => {
                self.pose.theta = normalize_heading(*heading);
                true
            }
            Primitive::Move { magnitude } => {
                let heading = (self.pose.theta as f64).to_radians();
                let x = self.pose.x + heading.sin() * magnitude;
                let z = self.pose.z + heading.cos() * magnitude;
                if self.is_free(x, z) {
                    self.pose.x = x;
                    self.pose.z = z;
                    self.path_length += magnitude.abs();
                    true
                } else {
                    debug!("move blocked at ({:.3}, {:.3})", x, z);
                    false
                }
            }
            Primitive::TeleportPosition { x, z } => {
                if self.is_free(*x, *z) {
                    self.pose.x = *x;
                    self.pose.z = *z;
                    true
                } else {
                    debug!("teleport blocked at ({:.3}, {:.3})", x, z);
                    false
                }
            }
            Primitive::LookUp { degrees } => self.tilt(-degrees),
            Primitive::LookDown { degrees } => self.tilt(*degrees),
            Primitive::Other { name } => {
                warn!("unsupported command {}", name);
                false
            }
        }
    }
}

impl Observer for GridWorld {
    fn current_pose(&self) -> AgentPose {
        self.pose
    }

    fn camera_horizon(&self) -> f64 {
        self.horizon
    }
}

impl ReachabilityOracle for GridWorld {
    fn reachable_positions(&self) -> Vec<Pose2D> {
        let mut positions = Vec::new();
        for row in 0..self.height {
            for col in 0..self.width {
                if self.free[row * self.width + col] {
                    positions.push(Pose2D::new(
                        self.origin.x + col as f64 * self.resolution,
                        self.origin.z + row as f64 * self.resolution,
                    ));
                }
            }
        }
        positions
    }
}

impl VisibilityOracle for GridWorld {
    fn is_visible(&self, object_id: &str) -> bool {
        self.view_angles(object_id).is_some()
    }

    fn frame_fraction(&self, object_id: &str) -> Option<(f64, f64)> {
        let (vertical, horizontal) = self.view_angles(object_id)?;
        let fov = self.config.field_of_view;
        Some((0.5 + vertical / fov, 0.5 + horizontal / fov))
    }
}

impl ObjectLocator for GridWorld {
    fn object_position(&self, object_id: &str) -> Option<Pose2D> {
        self.objects.get(object_id).map(|o| o.position)
    }
}
