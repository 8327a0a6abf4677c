//! Test utilities for MargaNav integration tests.
//!
//! Provides canned maps and a world wrapper that records every command.

#![allow(dead_code)]

use marga_nav::core::{AgentPose, Primitive};
use marga_nav::world::{
    Executor, GridWorld, ObjectLocator, Observer, ReachabilityOracle, VisibilityOracle,
};
use marga_nav::{MargaConfig, Pose2D};

/// Walled rectangle of `cols` x `rows` cells with the start at (`start_col`, `start_row`).
pub fn room_text(cols: usize, rows: usize, start_col: usize, start_row: usize) -> String {
    let mut text = String::new();
    for row in 0..rows {
        for col in 0..cols {
            let ch = if row == 0 || col == 0 || row == rows - 1 || col == cols - 1 {
                '#'
            } else if (col, row) == (start_col, start_row) {
                'S'
            } else {
                '.'
            };
            text.push(ch);
        }
        text.push('\n');
    }
    text
}

/// Open room at 0.25m cells with the agent at the world origin, facing +z.
///
/// Free space spans x in [-1.0, 1.0] and z in [-1.0, 1.5].
pub fn origin_room() -> GridWorld {
    GridWorld::from_ascii_at(&room_text(11, 13, 5, 5), 0.25, Pose2D::new(-1.25, -1.25)).unwrap()
}

/// Unit-cell map with a wall between start (3, 3) and the goal cell (3, 1).
pub const DETOUR: &str = "\
#######
#.....#
#.###.#
#..S..#
#######
";

/// Unit-cell maze whose only route to (5, 1) winds around two walls.
pub const MAZE: &str = "\
#########
#...#...#
#.#.#.#.#
#.#...#.#
#S#####.#
#.......#
#########
";

/// Configuration for unit-cell maps: one cell per step, arrival means the exact cell.
pub fn unit_config(lookahead: usize) -> MargaConfig {
    let mut config = MargaConfig::default();
    config.planner.lookahead = lookahead;
    config.planner.goal_threshold = 0.5;
    config.planner.step_size = 1.0;
    config.planner.lattice_resolution = 1.0;
    config.planner.max_iterations = 5_000;
    config.world.step_interval_ms = 0;
    config
}

/// Grid world wrapper that records every command and its result.
pub struct RecordingWorld {
    pub inner: GridWorld,
    pub commands: Vec<(Primitive, bool)>,
}

impl RecordingWorld {
    pub fn new(inner: GridWorld) -> Self {
        Self {
            inner,
            commands: Vec::new(),
        }
    }

    /// Commands that succeeded, in order.
    pub fn succeeded(&self) -> Vec<&Primitive> {
        self.commands
            .iter()
            .filter(|(_, ok)| *ok)
            .map(|(c, _)| c)
            .collect()
    }
}

impl Executor for RecordingWorld {
    fn execute_primitive(&mut self, command: &Primitive) -> bool {
        let ok = self.inner.execute_primitive(command);
        self.commands.push((command.clone(), ok));
        ok
    }
}

impl Observer for RecordingWorld {
    fn current_pose(&self) -> AgentPose {
        self.inner.current_pose()
    }

    fn camera_horizon(&self) -> f64 {
        self.inner.camera_horizon()
    }
}

impl ReachabilityOracle for RecordingWorld {
    fn reachable_positions(&self) -> Vec<Pose2D> {
        self.inner.reachable_positions()
    }
}

impl VisibilityOracle for RecordingWorld {
    fn is_visible(&self, object_id: &str) -> bool {
        self.inner.is_visible(object_id)
    }

    fn frame_fraction(&self, object_id: &str) -> Option<(f64, f64)> {
        self.inner.frame_fraction(object_id)
    }
}

impl ObjectLocator for RecordingWorld {
    fn object_position(&self, object_id: &str) -> Option<Pose2D> {
        self.inner.object_position(object_id)
    }
}
