//! High-level navigation: drive to goals and objects, look at objects.
//!
//! A [`Navigator`] owns the configuration and a handle to the shared
//! [`InvalidStateRegistry`]. Each goal gets a fresh heuristic table and
//! planner, while blocked cells learned on earlier goals carry over.

use tracing::{debug, info, warn};

use crate::config::MargaConfig;
use crate::core::{Action, Lattice, Pose2D, Primitive, rotation_between};
use crate::error::Result;
use crate::gaze::{GazeController, GazeOutcome};
use crate::search::{
    GridAdjacency, InvalidStateRegistry, LookaheadPlanner, LrtaPlanner, PlanOutcome,
    RankedReachable, SuccessorSource, SuccessorStrategy,
};
use crate::world::{Executor, ObjectLocator, Observer, ReachabilityOracle, VisibilityOracle};

/// Entry point for goal-directed navigation.
pub struct Navigator {
    config: MargaConfig,
    lattice: Lattice,
    registry: InvalidStateRegistry,
    gaze: GazeController,
}

impl Navigator {
    /// Create a navigator sharing `registry` with any other navigators.
    pub fn new(config: &MargaConfig, registry: InvalidStateRegistry) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            lattice: Lattice::new(config.planner.lattice_resolution)?,
            gaze: GazeController::new(config.to_gaze_config()),
            config: config.clone(),
            registry,
        })
    }

    /// Shared invalid-state registry.
    pub fn registry(&self) -> &InvalidStateRegistry {
        &self.registry
    }

    /// Search lattice.
    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    /// Drive toward `goal` until within the goal threshold or stuck.
    ///
    /// Fails only for goals that cannot be placed on the lattice or poses the
    /// world reports outside it; an unreachable goal is a
    /// [`PlanStatus::Stuck`](crate::search::PlanStatus::Stuck) outcome.
    pub fn go_to<W>(&self, world: &mut W, goal: Pose2D) -> Result<PlanOutcome>
    where
        W: Executor + Observer + ReachabilityOracle + ?Sized,
    {
        let generator = self.generator(&*world)?;
        let planner = &self.config.planner;

        if planner.lookahead <= 1 {
            let mut lrta = LrtaPlanner::new(
                self.config.to_lrta_config(),
                self.lattice,
                goal,
                generator,
                self.registry.clone(),
            )?;
            self.align(world);
            lrta.run(world)
        } else {
            let mut lookahead = LookaheadPlanner::new(
                self.config.to_lookahead_config(),
                self.lattice,
                goal,
                generator,
                self.registry.clone(),
            )?;
            self.align(world);
            lookahead.run(world)
        }
    }

    /// Drive toward a named object; a missing object is logged and skipped.
    pub fn go_to_object<W>(&self, world: &mut W, object_id: &str) -> Result<Option<PlanOutcome>>
    where
        W: Executor + Observer + ReachabilityOracle + ObjectLocator + ?Sized,
    {
        let Some(position) = world.object_position(object_id) else {
            warn!("object {} not found, skipping navigation", object_id);
            return Ok(None);
        };
        info!("navigating to {} at {}", object_id, position);
        self.go_to(world, position).map(Some)
    }

    /// Turn toward a named object and center it; `None` if the object is missing.
    pub fn look_at_object<W>(&self, world: &mut W, object_id: &str) -> Option<GazeOutcome>
    where
        W: Executor + Observer + VisibilityOracle + ObjectLocator + ?Sized,
    {
        let Some(position) = world.object_position(object_id) else {
            warn!("object {} not found, skipping gaze", object_id);
            return None;
        };
        Some(self.gaze.look_at(world, position, object_id))
    }

    fn generator<W>(&self, world: &W) -> Result<SuccessorSource>
    where
        W: ReachabilityOracle + ?Sized,
    {
        let planner = &self.config.planner;
        Ok(match planner.successors {
            SuccessorStrategy::Grid => SuccessorSource::Grid(GridAdjacency::new(
                self.lattice,
                planner.headings,
                planner.step_size,
                planner.rotate_increment,
            )?),
            SuccessorStrategy::Ranked => SuccessorSource::Ranked(RankedReachable::from_oracle(
                self.lattice,
                world,
                planner.ranked_count,
            )),
        })
    }

    /// Level the camera and snap the heading onto the heading set.
    fn alignment_action<W: Observer + ?Sized>(&self, world: &W) -> Action {
        let mut primitives = Vec::with_capacity(2);

        let horizon = world.camera_horizon();
        if horizon > 0.0 {
            primitives.push(Primitive::LookUp { degrees: horizon });
        } else if horizon < 0.0 {
            primitives.push(Primitive::LookDown { degrees: -horizon });
        }

        let theta = world.current_pose().theta;
        let heading = self.config.planner.headings.nearest(theta);
        if let Some(rotation) = rotation_between((heading - theta) as f64) {
            primitives.push(rotation);
        }

        Action::new(primitives, self.config.planner.rotate_increment)
    }

    fn align<W: Executor + Observer + ?Sized>(&self, world: &mut W) {
        let action = self.alignment_action(&*world);
        if action.is_empty() {
            return;
        }
        debug!("aligning: {}", action);
        if !world.execute(&action) {
            warn!("alignment action failed, planning from current pose");
        }
    }
}
