//! MargaNav demo: drive a simulated agent across an ascii map.
//!
//! ```text
//! marga-nav [CONFIG] --map maps/kitchen.txt --goal 1.5,2.0
//! marga-nav marga.toml --map maps/kitchen.txt --object m --look
//! ```
//!
//! The agent does not see the map. It learns walls by bumping into them,
//! recording each blocked cell in the shared registry.

use std::path::PathBuf;

use clap::{ArgGroup, Parser};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use marga_nav::config::MargaConfig;
use marga_nav::search::visited_cells;
use marga_nav::{
    GridWorld, InvalidStateRegistry, Navigator, Observer, PlanOutcome, Pose2D, Result,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(group(ArgGroup::new("target").required(true).args(["goal", "object"])))]
struct Args {
    /// Configuration file (defaults to marga.toml when present)
    config: Option<PathBuf>,

    /// Ascii map file
    #[arg(short, long)]
    map: PathBuf,

    /// Goal position as "x,z" in meters
    #[arg(short, long, value_parser = parse_goal)]
    goal: Option<Pose2D>,

    /// Object id (map letter) to navigate to
    #[arg(short, long)]
    object: Option<String>,

    /// Look at the object after arriving
    #[arg(long, requires = "object")]
    look: bool,

    /// Map cell size in meters
    #[arg(long, default_value_t = 0.25)]
    cell_size: f64,
}

fn parse_goal(s: &str) -> std::result::Result<Pose2D, String> {
    let (x, z) = s
        .split_once(',')
        .ok_or_else(|| format!("expected \"x,z\", got {:?}", s))?;
    let x: f64 = x.trim().parse().map_err(|e| format!("bad x: {}", e))?;
    let z: f64 = z.trim().parse().map_err(|e| format!("bad z: {}", e))?;
    Ok(Pose2D::new(x, z))
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("marga_nav=info")),
        )
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            MargaConfig::load(path)?
        }
        None => MargaConfig::load_default()?,
    };

    info!("MargaNav v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Planner: lookahead={}, step={:.3}m, lattice={:.3}m, threshold={:.2}m, successors={:?}",
        config.planner.lookahead,
        config.planner.step_size,
        config.planner.lattice_resolution,
        config.planner.goal_threshold,
        config.planner.successors
    );

    let text = std::fs::read_to_string(&args.map)?;
    let mut world =
        GridWorld::from_ascii(&text, args.cell_size)?.with_config(config.to_world_config());
    info!(
        "Map {:?}: {}x{} cells, start {}",
        args.map,
        world.width(),
        world.height(),
        world.current_pose().position()
    );

    let registry = InvalidStateRegistry::new();
    let navigator = Navigator::new(&config, registry.clone())?;

    let outcome = match (&args.goal, &args.object) {
        (Some(goal), _) => Some(navigator.go_to(&mut world, *goal)?),
        (None, Some(object)) => navigator.go_to_object(&mut world, object)?,
        (None, None) => None,
    };

    if let Some(outcome) = &outcome {
        report(outcome);
    }

    if args.look
        && let Some(object) = &args.object
        && let Some(gaze) = navigator.look_at_object(&mut world, object)
    {
        info!("Gaze on {}: {:?}", object, gaze);
    }

    info!(
        "Path length {:.2}m over {} commands, {} blocked cells learned",
        world.path_length(),
        world.commands_executed(),
        registry.len()
    );
    Ok(())
}

fn report(outcome: &PlanOutcome) {
    let stats = &outcome.stats;
    if outcome.reached_goal() {
        info!("Goal reached at {}", outcome.final_state);
    } else {
        warn!("Navigation ended at {}: {:?}", outcome.final_state, outcome.status);
    }
    info!(
        "Iterations {}, moves {}, failures {}, backups {}, expansions {}, cost {:.1}, {} cells visited",
        stats.iterations,
        stats.moves,
        stats.failures,
        stats.backups,
        stats.expansions,
        stats.action_cost,
        visited_cells(outcome).len()
    );
}
