//! Configuration loading for MargaNav

use crate::core::{DEFAULT_ROTATE_INCREMENT, HeadingSet, Lattice};
use crate::error::{MargaError, Result};
use crate::gaze::GazeConfig;
use crate::search::{LookaheadConfig, LrtaConfig, SuccessorStrategy};
use crate::world::GridWorldConfig;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Default configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "marga.toml";

/// Main configuration structure
#[derive(Clone, Debug, Default, Deserialize)]
pub struct MargaConfig {
    #[serde(default)]
    pub planner: PlannerSettings,
    #[serde(default)]
    pub gaze: GazeSettings,
    #[serde(default)]
    pub world: WorldSettings,
}

/// Search settings
#[derive(Clone, Debug, Deserialize)]
pub struct PlannerSettings {
    /// Local tree size; 1 runs plain LRTA* (default: 1)
    #[serde(default = "default_lookahead")]
    pub lookahead: usize,

    /// L1 distance to the goal that counts as arrival, meters (default: 1.0)
    #[serde(default = "default_goal_threshold")]
    pub goal_threshold: f64,

    /// Distance of one move, meters (default: 0.05)
    #[serde(default = "default_step_size")]
    pub step_size: f64,

    /// Lattice cell size, meters (default: 0.05)
    #[serde(default = "default_lattice_resolution")]
    pub lattice_resolution: f64,

    /// Headings available to grid successors (default: eight)
    #[serde(default)]
    pub headings: HeadingSet,

    /// Successor generator (default: grid)
    #[serde(default)]
    pub successors: SuccessorStrategy,

    /// Candidates offered by the ranked generator (default: 8)
    #[serde(default = "default_ranked_count")]
    pub ranked_count: usize,

    /// Executor rotation granularity, degrees (default: 15)
    #[serde(default = "default_rotate_increment")]
    pub rotate_increment: f64,

    /// Action attempts per goal (default: 10000)
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,

    /// Frontier pops per lookahead iteration (default: 512)
    #[serde(default = "default_max_expansions")]
    pub max_expansions: usize,
}

/// Camera tilt settings
#[derive(Clone, Debug, Deserialize)]
pub struct GazeSettings {
    /// Lowest horizon, degrees (default: -30)
    #[serde(default = "default_min_horizon")]
    pub min_horizon: f64,

    /// Highest horizon, degrees (default: 60)
    #[serde(default = "default_max_horizon")]
    pub max_horizon: f64,

    /// Tilt per step, degrees (default: 15)
    #[serde(default = "default_tilt_step")]
    pub tilt_step: f64,

    /// Centering thresholds in order (default: [0.7, 0.3])
    #[serde(default = "default_thresholds")]
    pub thresholds: Vec<f64>,
}

/// Simulated world settings
#[derive(Clone, Debug, Deserialize)]
pub struct WorldSettings {
    /// Pause before each command, milliseconds (default: 150)
    #[serde(default = "default_step_interval_ms")]
    pub step_interval_ms: u64,

    /// Visibility range, meters (default: 1.5)
    #[serde(default = "default_view_distance")]
    pub view_distance: f64,

    /// Camera field of view, degrees (default: 60)
    #[serde(default = "default_field_of_view")]
    pub field_of_view: f64,
}

impl Default for PlannerSettings {
    fn default() -> Self {
        Self {
            lookahead: default_lookahead(),
            goal_threshold: default_goal_threshold(),
            step_size: default_step_size(),
            lattice_resolution: default_lattice_resolution(),
            headings: HeadingSet::default(),
            successors: SuccessorStrategy::default(),
            ranked_count: default_ranked_count(),
            rotate_increment: default_rotate_increment(),
            max_iterations: default_max_iterations(),
            max_expansions: default_max_expansions(),
        }
    }
}

impl Default for GazeSettings {
    fn default() -> Self {
        Self {
            min_horizon: default_min_horizon(),
            max_horizon: default_max_horizon(),
            tilt_step: default_tilt_step(),
            thresholds: default_thresholds(),
        }
    }
}

impl Default for WorldSettings {
    fn default() -> Self {
        Self {
            step_interval_ms: default_step_interval_ms(),
            view_distance: default_view_distance(),
            field_of_view: default_field_of_view(),
        }
    }
}

// Planner defaults
fn default_lookahead() -> usize {
    1
}
fn default_goal_threshold() -> f64 {
    1.0
}
fn default_step_size() -> f64 {
    0.05
}
fn default_lattice_resolution() -> f64 {
    0.05
}
fn default_ranked_count() -> usize {
    8
}
fn default_rotate_increment() -> f64 {
    DEFAULT_ROTATE_INCREMENT
}
fn default_max_iterations() -> usize {
    10_000
}
fn default_max_expansions() -> usize {
    512
}

// Gaze defaults
fn default_min_horizon() -> f64 {
    -30.0
}
fn default_max_horizon() -> f64 {
    60.0
}
fn default_tilt_step() -> f64 {
    15.0
}
fn default_thresholds() -> Vec<f64> {
    vec![0.7, 0.3]
}

// World defaults
fn default_step_interval_ms() -> u64 {
    150
}
fn default_view_distance() -> f64 {
    1.5
}
fn default_field_of_view() -> f64 {
    60.0
}

impl MargaConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| MargaError::Config(format!("Failed to read config file: {}", e)))?;
        Self::from_toml(&content)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: MargaConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `marga.toml` from the working directory, or fall back to defaults
    pub fn load_default() -> Result<Self> {
        let path = Path::new(DEFAULT_CONFIG_FILE);
        if path.exists() {
            tracing::info!("Loading configuration from {}", DEFAULT_CONFIG_FILE);
            Self::load(path)
        } else {
            tracing::info!("Using default configuration");
            Ok(Self::default())
        }
    }

    /// Reject values the planners cannot work with
    pub fn validate(&self) -> Result<()> {
        let planner = &self.planner;
        let positive = [
            ("planner.goal_threshold", planner.goal_threshold),
            ("planner.step_size", planner.step_size),
            ("planner.lattice_resolution", planner.lattice_resolution),
            ("planner.rotate_increment", planner.rotate_increment),
            ("gaze.tilt_step", self.gaze.tilt_step),
            ("world.view_distance", self.world.view_distance),
            ("world.field_of_view", self.world.field_of_view),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(MargaError::Config(format!(
                    "{} must be positive, got {}",
                    name, value
                )));
            }
        }

        if planner.lookahead == 0 {
            return Err(MargaError::Config(
                "planner.lookahead must be at least 1".to_string(),
            ));
        }
        if planner.max_iterations == 0 || planner.max_expansions == 0 {
            return Err(MargaError::Config(
                "planner.max_iterations and planner.max_expansions must be at least 1".to_string(),
            ));
        }
        if planner.successors == SuccessorStrategy::Ranked && planner.ranked_count == 0 {
            return Err(MargaError::Config(
                "planner.ranked_count must be at least 1".to_string(),
            ));
        }
        // Headings must be reachable in whole rotation increments
        let step = match planner.headings {
            HeadingSet::Four => 90.0,
            HeadingSet::Eight => 45.0,
        };
        if (step % planner.rotate_increment).abs() > 1e-9 {
            return Err(MargaError::Config(format!(
                "planner.rotate_increment {} does not divide heading step {}",
                planner.rotate_increment, step
            )));
        }

        // Grid moves must land exactly on the predicted cell
        let lattice = Lattice::new(planner.lattice_resolution)?;
        if lattice.cells_for(planner.step_size).is_none() {
            return Err(MargaError::Config(format!(
                "planner.step_size {} is not a whole multiple of planner.lattice_resolution {}",
                planner.step_size, planner.lattice_resolution
            )));
        }

        if self.gaze.min_horizon >= self.gaze.max_horizon {
            return Err(MargaError::Config(format!(
                "gaze.min_horizon ({}) must be below gaze.max_horizon ({})",
                self.gaze.min_horizon, self.gaze.max_horizon
            )));
        }
        if self.gaze.thresholds.iter().any(|t| !(0.0..=1.0).contains(t)) {
            return Err(MargaError::Config(
                "gaze.thresholds must lie in [0, 1]".to_string(),
            ));
        }
        Ok(())
    }

    /// Convert to the one-step planner configuration
    pub fn to_lrta_config(&self) -> LrtaConfig {
        LrtaConfig {
            goal_threshold: self.planner.goal_threshold,
            max_iterations: self.planner.max_iterations,
        }
    }

    /// Convert to the lookahead planner configuration
    pub fn to_lookahead_config(&self) -> LookaheadConfig {
        LookaheadConfig {
            lookahead: self.planner.lookahead,
            goal_threshold: self.planner.goal_threshold,
            max_iterations: self.planner.max_iterations,
            max_expansions: self.planner.max_expansions,
        }
    }

    /// Convert to the gaze controller configuration
    pub fn to_gaze_config(&self) -> GazeConfig {
        GazeConfig {
            min_horizon: self.gaze.min_horizon,
            max_horizon: self.gaze.max_horizon,
            tilt_step: self.gaze.tilt_step,
            thresholds: self.gaze.thresholds.clone(),
            rotate_increment: self.planner.rotate_increment,
        }
    }

    /// Convert to the simulated world configuration
    pub fn to_world_config(&self) -> GridWorldConfig {
        GridWorldConfig {
            step_interval: Duration::from_millis(self.world.step_interval_ms),
            view_distance: self.world.view_distance,
            field_of_view: self.world.field_of_view,
            min_horizon: self.gaze.min_horizon,
            max_horizon: self.gaze.max_horizon,
            ..GridWorldConfig::default()
        }
    }
}
