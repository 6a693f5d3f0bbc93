mod common;

use approx::assert_relative_eq;
use common::{Attached, DT, Rig, controller};
use melee_controller::capabilities::{Collaborators, axis, button};
use melee_controller::character_controller::{IS_GROUNDED_PARAM, SPEED_PARAM, jump};
use melee_controller::error::ControllerError;

#[test]
fn late_jump_inside_coyote_window_is_accepted() {
    let mut controller = controller();
    let mut rig = Rig::default();
    rig.run(&mut controller, 0.25);

    rig.physics.remove_floor();
    rig.run(&mut controller, 8.0 * DT);
    let report = rig.tap(&mut controller, button::JUMP);

    assert!(report.jumped, "9 frames (0.15 s) after leaving the ground");
    assert_eq!(rig.animator.trigger_count(jump::JUMP_TRIGGER), 1);
}

#[test]
fn late_jump_after_coyote_window_is_rejected() {
    let mut controller = controller();
    let mut rig = Rig::default();
    rig.run(&mut controller, 0.25);

    rig.physics.remove_floor();
    rig.run(&mut controller, 14.0 * DT);
    let report = rig.tap(&mut controller, button::JUMP);

    assert!(!report.jumped, "15 frames (0.25 s) after leaving the ground");
    assert_eq!(rig.animator.trigger_count(jump::JUMP_TRIGGER), 0);
}

#[test]
fn launch_speed_reaches_jump_height() {
    let mut controller = controller();
    let mut rig = Rig::default();
    rig.run(&mut controller, 0.1);

    let report = rig.tap(&mut controller, button::JUMP);
    assert!(report.jumped);

    // Gravity has already been applied once in the launch frame.
    let vy = controller.kinematic().velocity.y;
    assert_relative_eq!(vy, 7.745_967 - 20.0 * DT, epsilon = 1e-4);
    let last_move = rig.physics.moves.last().copied().unwrap_or_default();
    assert_relative_eq!(last_move.y, vy * DT, epsilon = 1e-6);
}

#[test]
fn second_jump_next_frame_is_rejected_while_probe_still_reads_grounded() {
    let mut controller = controller();
    let mut rig = Rig::default();
    rig.physics.forced_grounded = Some(true);
    rig.run(&mut controller, 0.1);

    assert!(rig.tap(&mut controller, button::JUMP).jumped);
    for _ in 0..5 {
        let report = rig.tap(&mut controller, button::JUMP);
        assert!(!report.jumped);
    }
    assert_eq!(rig.animator.trigger_count(jump::JUMP_TRIGGER), 1);
    assert_eq!(rig.animator.bools.get(IS_GROUNDED_PARAM), Some(&false));
}

#[test]
fn double_jump_is_rejected_without_an_animator() {
    let mut controller = controller();
    let mut rig = Rig {
        attached: Attached {
            animator: false,
            ..Default::default()
        },
        ..Default::default()
    };
    rig.physics.forced_grounded = Some(true);
    rig.run(&mut controller, 0.1);

    assert!(rig.tap(&mut controller, button::JUMP).jumped);
    assert!(!rig.tap(&mut controller, button::JUMP).jumped);
}

#[test]
fn airborne_jump_state_blocks_and_landing_overrides_it() {
    let mut controller = controller();
    let mut rig = Rig::default();
    rig.run(&mut controller, 0.1);
    rig.animator.state = jump::JUMP_STATE.to_string();

    // Still on the floor: the stale state read does not matter.
    assert!(rig.tap(&mut controller, button::JUMP).jumped);

    rig.physics.remove_floor();
    rig.run(&mut controller, 1.0);
    assert!(!rig.tap(&mut controller, button::JUMP).jumped);
}

#[test]
fn animation_transition_alone_does_not_block() {
    let mut controller = controller();
    let mut rig = Rig::default();
    rig.run(&mut controller, 0.1);
    rig.animator.transitioning = true;

    assert!(rig.tap(&mut controller, button::JUMP).jumped);
}

#[test]
fn exactly_one_displacement_per_tick() {
    let mut controller = controller();
    let mut rig = Rig::default();
    rig.input.set_axis(axis::VERTICAL, 1.0);

    let mut ticks = 0;
    ticks += rig.run(&mut controller, 0.2).len();
    rig.tap(&mut controller, button::ATTACK);
    rig.tap(&mut controller, button::JUMP);
    rig.tap(&mut controller, button::INVENTORY);
    ticks += 3;
    ticks += rig.run(&mut controller, 0.2).len();
    rig.tap(&mut controller, button::INVENTORY);
    ticks += 1;

    assert_eq!(rig.physics.moves.len(), ticks);
    assert_eq!(rig.camera.poses.len(), ticks);
}

#[test]
fn movement_follows_camera_yaw_and_sprint() {
    let mut controller = controller();
    let mut rig = Rig::default();

    rig.input.set_axis(axis::VERTICAL, 1.0);
    rig.tick(&mut controller);
    let walk = rig.physics.moves.last().copied().unwrap_or_default();
    assert_relative_eq!(walk.z, -5.0 * DT, epsilon = 1e-4);
    assert_relative_eq!(walk.x, 0.0, epsilon = 1e-4);
    assert_eq!(rig.animator.floats.get(SPEED_PARAM), Some(&0.5));

    // Pointer right by 45 units at sensitivity 2 turns the view 90 degrees.
    rig.input.set_axis(axis::MOUSE_X, 45.0);
    rig.input.hold(button::SPRINT, true);
    rig.tick(&mut controller);
    rig.input.set_axis(axis::MOUSE_X, 0.0);

    let sprint = rig.physics.moves.last().copied().unwrap_or_default();
    assert_relative_eq!(sprint.x, 8.0 * DT, epsilon = 1e-4);
    assert_relative_eq!(sprint.z, 0.0, epsilon = 1e-4);
    assert_eq!(rig.animator.floats.get(SPEED_PARAM), Some(&1.0));
}

#[test]
fn facing_turns_smoothly_toward_travel() {
    let mut controller = controller();
    let mut rig = Rig::default();
    rig.input.set_axis(axis::HORIZONTAL, 1.0);

    rig.tick(&mut controller);
    let first = controller.kinematic().facing;
    assert!(first > 0.0 && first < 90.0, "first frame facing {first}");

    rig.run(&mut controller, 1.0);
    assert_relative_eq!(controller.kinematic().facing, 90.0, epsilon = 0.5);
    assert_eq!(rig.physics.headings.last().copied(), Some(controller.kinematic().facing));
}

#[test]
fn idle_input_inside_deadzone_stands_still() {
    let mut controller = controller();
    let mut rig = Rig::default();
    rig.input.set_axis(axis::HORIZONTAL, 0.05);
    rig.input.set_axis(axis::VERTICAL, 0.05);
    rig.run(&mut controller, 0.2);

    let last = rig.physics.moves.last().copied().unwrap_or_default();
    assert_eq!((last.x, last.z), (0.0, 0.0));
    assert_eq!(rig.animator.floats.get(SPEED_PARAM), Some(&0.0));
}

#[test]
fn falling_character_keeps_accelerating() {
    let mut controller = controller();
    let mut rig = Rig::default();
    rig.physics.remove_floor();

    rig.tick(&mut controller);
    let v1 = controller.kinematic().velocity.y;
    rig.tick(&mut controller);
    let v2 = controller.kinematic().velocity.y;
    assert_relative_eq!(v2 - v1, -20.0 * DT, epsilon = 1e-5);
}

#[test]
fn missing_physics_is_a_configuration_error() {
    let input = common::FakeInput::default();
    let result = Collaborators::builder().input(&input).build();
    assert!(matches!(
        result,
        Err(ControllerError::MissingCollaborator("physics"))
    ));

    let mut physics = common::FakePhysics::default();
    let result = Collaborators::builder().physics(&mut physics).build();
    assert!(matches!(
        result,
        Err(ControllerError::MissingCollaborator("input"))
    ));
}

#[test]
fn ticks_without_a_camera_still_move_and_fall() {
    let mut controller = controller();
    let mut rig = Rig {
        attached: Attached {
            camera: false,
            ..Default::default()
        },
        ..Default::default()
    };
    rig.physics.remove_floor();
    rig.input.set_axis(axis::VERTICAL, 1.0);

    let reports = rig.run(&mut controller, 0.1);
    assert_eq!(reports.len(), 6);
    assert_eq!(rig.physics.moves.len(), 6);
    assert!(rig.camera.poses.is_empty());

    assert_relative_eq!(controller.kinematic().horizontal_speed(), 5.0, epsilon = 1e-4);
    assert_relative_eq!(controller.kinematic().velocity.y, -20.0 * DT * 6.0, epsilon = 1e-4);
    let last = rig.physics.moves.last().copied().unwrap_or_default();
    assert_relative_eq!(last.z, -5.0 * DT, epsilon = 1e-4);
}
