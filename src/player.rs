//! The demo player: a kinematic capsule driven by a [`CharacterController`].
//!
//! Every frame `drive_player` assembles the capabilities from the ECS (input
//! frame, avian motor, animator, inventory panel), ticks the controller and
//! applies what it asked for. `follow_camera` runs the late camera phase in
//! `PostUpdate`, before transforms propagate.

use avian3d::prelude::*;
use bevy::prelude::*;
use bevy::transform::TransformSystem;
use bevy::window::{CursorGrabMode, PrimaryWindow};

use crate::animation::{AnimatedVisual, AnimatorGraph};
use crate::camera::{ThirdPersonCamera, TransformRig};
use crate::capabilities::{CaptureMode, Collaborators, HostEvent};
use crate::character_controller::{CharacterController, ControllerSet, InputFrame};
use crate::config::ControllerConfig;
use crate::error::ControllerError;
use crate::inventory::panel::{PanelUi, PanelWidgets};
use crate::physics::{AvianMotor, CharacterBody, GameLayer, MotorWorld, apply_impulses};

const CAPSULE_RADIUS: f32 = 0.4;
const CAPSULE_LENGTH: f32 = 1.0;
const SPAWN_POINT: Vec3 = Vec3::new(0.0, 1.5, 0.0);

/// Controller configuration the player is spawned with. Read from disk at
/// startup unless the app already inserted one.
#[derive(Resource, Debug, Clone, Default)]
pub struct PlayerConfig(pub ControllerConfig);

pub struct PlayerPlugin;

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(PreStartup, load_config)
            .add_systems(Startup, spawn_player)
            .add_systems(PostStartup, verify_rig)
            .add_systems(Update, drive_player.in_set(ControllerSet::Drive))
            .add_systems(
                PostUpdate,
                follow_camera.before(TransformSystem::TransformPropagate),
            );
    }
}

#[derive(Component)]
pub struct Player {
    pub controller: CharacterController,
}

fn load_config(
    mut commands: Commands,
    existing: Option<Res<PlayerConfig>>,
    mut exit: EventWriter<AppExit>,
) {
    if existing.is_some() {
        return;
    }
    match read_config() {
        Ok(config) => commands.insert_resource(PlayerConfig(config)),
        Err(err) => {
            let cause = std::error::Error::source(&err).map(ToString::to_string);
            error!(
                target: "controller",
                %err,
                cause = cause.as_deref().unwrap_or("unknown"),
                "invalid controller config"
            );
            exit.send(AppExit::error());
        }
    }
}

fn read_config() -> Result<ControllerConfig, ControllerError> {
    Ok(ControllerConfig::load_default()?)
}

fn spawn_player(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    config: Option<Res<PlayerConfig>>,
) {
    let Some(config) = config else { return };
    let controller = CharacterController::new(config.0.clone());
    info!(
        target: "controller",
        items = controller.overlay().inventory().len(),
        capacity = controller.overlay().capacity(),
        "spawning player"
    );

    commands
        .spawn((
            Name::new("Player"),
            Player { controller },
            CharacterBody,
            AnimatorGraph::default(),
            RigidBody::Kinematic,
            Collider::capsule(CAPSULE_RADIUS, CAPSULE_LENGTH),
            CollisionLayers::new(GameLayer::Character, [GameLayer::Ground, GameLayer::Target]),
            Transform::from_translation(SPAWN_POINT),
            Visibility::default(),
        ))
        .with_children(|parent: &mut ChildBuilder| {
            parent.spawn((
                AnimatedVisual,
                Mesh3d(meshes.add(Capsule3d::new(CAPSULE_RADIUS, CAPSULE_LENGTH))),
                MeshMaterial3d(materials.add(Color::srgb(0.8, 0.7, 0.6))),
                Transform::default(),
            ));
        });
}

/// The game cannot run without a player and a follow camera.
fn verify_rig(
    players: Query<(), With<Player>>,
    cameras: Query<(), With<ThirdPersonCamera>>,
    mut exit: EventWriter<AppExit>,
) {
    let missing = match (players.is_empty(), cameras.is_empty()) {
        (true, _) => Some("player"),
        (_, true) => Some("third-person camera"),
        _ => None,
    };
    if let Some(missing) = missing {
        error!(target: "controller", missing, "character rig is incomplete, exiting");
        exit.send(AppExit::error());
    }
}

#[allow(clippy::too_many_arguments)]
fn drive_player(
    time: Res<Time>,
    input: Res<InputFrame>,
    mut commands: Commands,
    mut widgets: ResMut<PanelWidgets>,
    mut players: Query<
        (Entity, &mut Player, &mut Transform, &Collider, Option<&mut AnimatorGraph>),
        With<CharacterBody>,
    >,
    motor_world: MotorWorld,
    mut receivers: Query<&mut ExternalImpulse>,
    mut windows: Query<&mut Window, With<PrimaryWindow>>,
) {
    let dt = time.delta_secs();

    for (entity, mut player, mut transform, collider, mut animator) in &mut players {
        let mut motor = AvianMotor::new(entity, &mut *transform, collider, &motor_world);

        let report = {
            let mut panel = PanelUi::new(&mut commands, &mut widgets);
            let mut builder = Collaborators::builder()
                .input(&*input)
                .physics(&mut motor);
            if let Some(animator) = animator.as_deref_mut() {
                builder = builder.animator(animator);
            }
            if let Some(panel) = panel.as_mut() {
                builder = builder.ui(panel);
            }
            let mut collaborators = match builder.build() {
                Ok(collaborators) => collaborators,
                Err(err) => {
                    error!(target: "controller", %err, "cannot tick player");
                    continue;
                }
            };
            player.controller.tick(dt, &mut collaborators)
        };

        apply_impulses(&mut commands, &mut receivers, motor.into_impulses());

        if report.targets_struck > 0 {
            info!(target: "combat", targets = report.targets_struck, "strike landed");
        }
        for event in report.host_events {
            match event {
                HostEvent::PointerCapture(mode) => {
                    if let Ok(mut window) = windows.get_single_mut() {
                        apply_capture(&mut window, mode);
                    }
                }
            }
        }
    }
}

fn apply_capture(window: &mut Window, mode: CaptureMode) {
    let (grab_mode, visible) = match mode {
        CaptureMode::Captured => (CursorGrabMode::Locked, false),
        CaptureMode::Free => (CursorGrabMode::None, true),
    };
    window.cursor_options.grab_mode = grab_mode;
    window.cursor_options.visible = visible;
}

fn follow_camera(
    input: Res<InputFrame>,
    mut players: Query<(Entity, &mut Player, &mut Transform, &Collider), With<CharacterBody>>,
    mut cameras: Query<&mut Transform, (With<ThirdPersonCamera>, Without<CharacterBody>)>,
    motor_world: MotorWorld,
) {
    let Ok(mut camera_transform) = cameras.get_single_mut() else {
        return;
    };
    let Ok((entity, mut player, mut transform, collider)) = players.get_single_mut() else {
        return;
    };

    let mut motor = AvianMotor::new(entity, transform.bypass_change_detection(), collider, &motor_world);
    let mut rig = TransformRig(&mut *camera_transform);
    let built = Collaborators::builder()
        .input(&*input)
        .physics(&mut motor)
        .camera(&mut rig)
        .build();
    match built {
        Ok(mut collaborators) => player.controller.late_tick(&mut collaborators),
        Err(err) => error!(target: "controller", %err, "cannot place camera"),
    }
}
