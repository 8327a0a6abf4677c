//! Gaze control against the simulated world.

mod common;

use approx::assert_relative_eq;
use common::{RecordingWorld, origin_room, unit_config};
use marga_nav::core::{Primitive, RotateDirection};
use marga_nav::world::{GridWorld, Observer};
use marga_nav::{GazeOutcome, InvalidStateRegistry, MargaConfig, Navigator, Pose2D};

#[test]
fn test_target_behind_turns_left_in_twelve_steps() {
    let world = origin_room().with_object("kettle", Pose2D::new(0.0, -1.0), 0.5);
    let mut world = RecordingWorld::new(world);
    let navigator = Navigator::new(&MargaConfig::default(), InvalidStateRegistry::new()).unwrap();

    let outcome = navigator.look_at_object(&mut world, "kettle").unwrap();
    assert_eq!(outcome, GazeOutcome::Centered { threshold: 0.3 });

    let rotations: Vec<_> = world
        .commands
        .iter()
        .filter(|(c, _)| matches!(c, Primitive::Rotate { .. }))
        .collect();
    assert_eq!(rotations.len(), 12);
    for (command, ok) in rotations {
        assert!(ok);
        assert_eq!(
            *command,
            Primitive::Rotate {
                direction: RotateDirection::Left,
                degrees: 15.0
            }
        );
    }
    assert_eq!(world.current_pose().theta, 180);
    assert_relative_eq!(world.camera_horizon(), 15.0);
}

#[test]
fn test_go_then_look() {
    let map = "\
#######
#S....#
#.....#
#....m#
#######
";
    let world = GridWorld::from_ascii(map, 1.0).unwrap();
    let mut world = RecordingWorld::new(world);
    let navigator = Navigator::new(&unit_config(1), InvalidStateRegistry::new()).unwrap();

    // Stop next to the object, then face it
    let outcome = navigator.go_to(&mut world, Pose2D::new(4.0, 3.0)).unwrap();
    assert!(outcome.reached_goal());

    let gaze = navigator.look_at_object(&mut world, "m").unwrap();
    assert_eq!(gaze, GazeOutcome::Centered { threshold: 0.3 });
    assert_eq!(world.current_pose().theta, 90);
}

#[test]
fn test_missing_object_is_skipped() {
    let mut world = RecordingWorld::new(origin_room());
    let navigator = Navigator::new(&MargaConfig::default(), InvalidStateRegistry::new()).unwrap();

    assert!(navigator.look_at_object(&mut world, "nothing").is_none());
    assert!(navigator.go_to_object(&mut world, "nothing").unwrap().is_none());
    assert!(world.commands.is_empty());
}

#[test]
fn test_out_of_range_object_not_visible() {
    let world = origin_room().with_object("far", Pose2D::new(0.0, 10.0), 0.5);
    let mut world = RecordingWorld::new(world);
    let navigator = Navigator::new(&MargaConfig::default(), InvalidStateRegistry::new()).unwrap();

    let outcome = navigator.look_at_object(&mut world, "far").unwrap();
    assert_eq!(outcome, GazeOutcome::NotVisible);
    // Only tilts were issued; the target was already straight ahead
    assert!(
        world
            .commands
            .iter()
            .all(|(c, _)| matches!(c, Primitive::LookUp { .. } | Primitive::LookDown { .. }))
    );
}
