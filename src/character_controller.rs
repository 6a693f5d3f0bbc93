//! Third-person character controller.
//!
//! [`CharacterController`] is driven by the host once per frame with
//! [`CharacterController::tick`] and, after every other system has moved the
//! character, [`CharacterController::late_tick`] for the camera. It never
//! talks to the engine directly; see [`crate::capabilities`].

pub mod components;
pub mod input;
pub mod jump;
pub mod physics;

use bevy::prelude::*;

use crate::camera::OrbitCamera;
use crate::capabilities::{AnimationOracle, CaptureMode, Collaborators, HostEvent};
use crate::combat::{AttackEvent, AttackSettings, ComboAttackSequencer};
use crate::config::ControllerConfig;
use crate::inventory::{Inventory, InventoryOverlay};

pub use components::{CharacterKinematicState, TickReport, heading, yaw_rotation};
pub use input::{FrameInput, InputFrame};
pub use physics::{Gait, MotionIntegrator};

/// Animator bool mirroring the filtered grounded flag.
pub const IS_GROUNDED_PARAM: &str = "IsGrounded";
/// Animator float blending idle, walk and run.
pub const SPEED_PARAM: &str = "Speed";
pub const SPEED_DAMP_TIME: f32 = 0.1;

/// Ordering of the controller's systems inside `Update`.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControllerSet {
    /// Rebuilds the [`InputFrame`].
    Input,
    /// Ticks the controllers.
    Drive,
}

pub struct CharacterControllerPlugin;

impl Plugin for CharacterControllerPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<InputFrame>()
            .configure_sets(Update, (ControllerSet::Input, ControllerSet::Drive).chain())
            .add_systems(
                Update,
                (input::clear_input_frame, input::keyboard_input, input::gamepad_input)
                    .chain()
                    .in_set(ControllerSet::Input),
            );
    }
}

/// Optional collaborators already reported missing, so the warning is logged
/// once instead of every frame.
#[derive(Debug, Clone, Copy, Default)]
struct ReportedMissing {
    animator: bool,
    camera: bool,
}

#[derive(Debug, Clone)]
pub struct CharacterController {
    config: ControllerConfig,
    /// Seconds accumulated from `tick` deltas, in `f64` like bevy's elapsed time.
    clock: f64,
    motion: MotionIntegrator,
    camera: OrbitCamera,
    combat: ComboAttackSequencer,
    overlay: InventoryOverlay,
    pending_events: Vec<HostEvent>,
    reported: ReportedMissing,
}

impl CharacterController {
    pub fn new(config: ControllerConfig) -> Self {
        Self::with_heading(config, 0.0)
    }

    /// Controller whose character and camera both start facing `yaw` degrees.
    pub fn with_heading(config: ControllerConfig, yaw: f32) -> Self {
        let inventory = Inventory::new(config.starting_items.iter().cloned());
        Self {
            clock: 0.0,
            motion: MotionIntegrator::with_facing(yaw),
            camera: OrbitCamera::from_config(&config, yaw),
            combat: ComboAttackSequencer::new(AttackSettings::from(&config)),
            overlay: InventoryOverlay::new(config.inventory_capacity, inventory),
            // Gameplay starts with the pointer captured.
            pending_events: vec![HostEvent::PointerCapture(CaptureMode::Captured)],
            reported: ReportedMissing::default(),
            config,
        }
    }

    pub fn kinematic(&self) -> &CharacterKinematicState {
        self.motion.state()
    }

    pub fn camera(&self) -> &OrbitCamera {
        &self.camera
    }

    pub fn combat(&self) -> &ComboAttackSequencer {
        &self.combat
    }

    pub fn overlay(&self) -> &InventoryOverlay {
        &self.overlay
    }

    pub fn inventory_mut(&mut self) -> &mut Inventory {
        self.overlay.inventory_mut()
    }

    /// Interrupts the attack in flight, if any.
    pub fn cancel_attack(&mut self) {
        self.combat.cancel();
    }

    /// Runs one frame of the controller: grounded bookkeeping, the attack in
    /// flight, the inventory toggle, then either gameplay input or the
    /// overlay, gravity and exactly one displacement request.
    pub fn tick(&mut self, dt: f32, world: &mut Collaborators<'_>) -> TickReport {
        let mut report = TickReport {
            host_events: std::mem::take(&mut self.pending_events),
            ..Default::default()
        };
        self.clock += f64::from(dt);
        let now = self.clock;
        let input = FrameInput::sample(world.input);

        if world.animator.is_none() && !self.reported.animator {
            warn!(target: "controller", "no animator attached, animation parameters are skipped");
            self.reported.animator = true;
        }

        let grounded = self.motion.read_grounded(world.physics.is_grounded(), now);
        if let Some(animator) = world.animator.as_deref_mut() {
            animator.set_bool(IS_GROUNDED_PARAM, grounded);
        }

        let origin = world.physics.position();
        let forward = self.motion.state().forward();
        if let Some(AttackEvent::Struck { targets, .. }) =
            self.combat.advance(now, origin, forward, &mut *world.physics)
        {
            report.targets_struck = targets;
        }

        if input.toggle_inventory {
            let mode = self.overlay.toggle(world.ui.as_deref_mut());
            report.overlay_toggled = true;
            report.host_events.push(HostEvent::PointerCapture(mode));
        }

        if self.overlay.is_open() {
            self.motion.halt_horizontal();
            set_speed(world.animator.as_deref_mut(), Gait::Idle, dt);
        } else {
            self.camera.orbit(input.look_delta);

            let gait = self.motion.steer(
                input.move_axis,
                input.sprint,
                self.camera.yaw,
                (self.config.move_speed, self.config.sprint_speed),
                self.config.turn_smooth_time,
                dt,
            );
            set_speed(world.animator.as_deref_mut(), gait, dt);

            let time_since_grounded = self.motion.state().time_since_grounded(now);
            if jump::evaluate(
                grounded,
                time_since_grounded,
                self.config.coyote_time,
                world.animator.as_deref(),
                input.jump,
            ) {
                let launch_speed = self.config.jump_velocity();
                self.motion.launch(launch_speed);
                if let Some(animator) = world.animator.as_deref_mut() {
                    animator.set_trigger(jump::JUMP_TRIGGER);
                }
                report.jumped = true;
                info!(target: "controller", launch_speed, time_since_grounded, "jump");
            }

            if input.attack {
                report.attack_started = self
                    .combat
                    .try_begin(now, world.animator.as_deref_mut())
                    .is_some();
            }
        }

        self.motion.apply_gravity(self.config.gravity, dt);
        self.motion.displace(&mut *world.physics, dt);
        report
    }

    /// Places the camera behind the character. Runs whether or not the
    /// overlay is open.
    pub fn late_tick(&mut self, world: &mut Collaborators<'_>) {
        let Some(camera) = world.camera.as_deref_mut() else {
            if !self.reported.camera {
                warn!(target: "controller", "no camera rig attached, camera follow is skipped");
                self.reported.camera = true;
            }
            return;
        };
        let (translation, rotation) = self.camera.pose(world.physics.position());
        camera.set_pose(translation, rotation);
    }
}

fn set_speed(animator: Option<&mut (dyn AnimationOracle + '_)>, gait: Gait, dt: f32) {
    if let Some(animator) = animator {
        animator.set_float(SPEED_PARAM, gait.blend_speed(), SPEED_DAMP_TIME, dt);
    }
}
