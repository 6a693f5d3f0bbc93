use bevy::math::{Vec2, Vec3};

use crate::capabilities::CharacterPhysics;
use crate::character_controller::components::{CharacterKinematicState, heading};

/// Vertical velocity held while grounded so the collider stays seated between
/// discrete ground checks.
pub const STICK_TO_GROUND_VELOCITY: f32 = -2.0;
/// Input magnitude below which the character does not move.
pub const INPUT_DEADZONE: f32 = 0.1;

/// Gait picked by [`MotionIntegrator::steer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gait {
    Idle,
    Walk,
    Sprint,
}

impl Gait {
    /// Value written to the animator's `Speed` float.
    pub fn blend_speed(self) -> f32 {
        match self {
            Gait::Idle => 0.0,
            Gait::Walk => 0.5,
            Gait::Sprint => 1.0,
        }
    }
}

/// Owns the character's velocity and turns it into one displacement per frame.
#[derive(Debug, Clone, Default)]
pub struct MotionIntegrator {
    state: CharacterKinematicState,
}

impl MotionIntegrator {
    pub fn with_facing(facing: f32) -> Self {
        Self {
            state: CharacterKinematicState {
                facing: facing.rem_euclid(360.0),
                ..Default::default()
            },
        }
    }

    pub fn state(&self) -> &CharacterKinematicState {
        &self.state
    }

    /// Records the grounded flag of the frame. A rising character is never
    /// grounded, whatever the probe says; a grounded one is pinned to the floor.
    pub fn read_grounded(&mut self, physics_grounded: bool, now: f64) -> bool {
        let grounded = physics_grounded && self.state.velocity.y <= 0.0;
        if grounded {
            self.state.velocity.y = STICK_TO_GROUND_VELOCITY;
            self.state.last_grounded_at = now;
        }
        self.state.grounded = grounded;
        grounded
    }

    /// Sets horizontal velocity from camera-relative input and turns the
    /// facing toward the direction of travel.
    pub fn steer(
        &mut self,
        move_axis: Vec2,
        sprint: bool,
        camera_yaw: f32,
        speeds: (f32, f32),
        turn_smooth_time: f32,
        dt: f32,
    ) -> Gait {
        if move_axis.length() < INPUT_DEADZONE {
            self.halt_horizontal();
            return Gait::Idle;
        }

        let direction = move_axis.normalize();
        let (walk_speed, sprint_speed) = speeds;
        let (gait, speed) = if sprint {
            (Gait::Sprint, sprint_speed)
        } else {
            (Gait::Walk, walk_speed)
        };

        let target_angle = direction.x.atan2(direction.y).to_degrees() + camera_yaw;
        self.state.facing = smooth_damp_angle(
            self.state.facing,
            target_angle,
            &mut self.state.turn_velocity,
            turn_smooth_time,
            dt,
        )
        .rem_euclid(360.0);

        let travel = heading(target_angle) * speed;
        self.state.velocity.x = travel.x;
        self.state.velocity.z = travel.z;
        gait
    }

    pub fn halt_horizontal(&mut self) {
        self.state.velocity.x = 0.0;
        self.state.velocity.z = 0.0;
    }

    /// Launches upward and forgets the grounded history.
    pub fn launch(&mut self, vertical_speed: f32) {
        self.state.velocity.y = vertical_speed;
        self.state.invalidate_grounded_history();
    }

    pub fn apply_gravity(&mut self, gravity: f32, dt: f32) {
        self.state.velocity.y += gravity * dt;
    }

    /// The single displacement request of the frame.
    pub fn displace(&mut self, physics: &mut dyn CharacterPhysics, dt: f32) -> bool {
        physics.set_heading(self.state.facing);
        physics.move_by(self.displacement(dt))
    }

    pub fn displacement(&self, dt: f32) -> Vec3 {
        self.state.velocity * dt
    }
}

/// Signed shortest difference `target - current` in degrees, in `(-180, 180]`.
pub fn delta_angle(current: f32, target: f32) -> f32 {
    let delta = (target - current).rem_euclid(360.0);
    if delta > 180.0 { delta - 360.0 } else { delta }
}

/// Critically damped spring toward `target`, reaching it in roughly
/// `smooth_time` seconds without overshoot.
pub fn smooth_damp(current: f32, target: f32, velocity: &mut f32, smooth_time: f32, dt: f32) -> f32 {
    if dt <= 0.0 {
        return current;
    }
    let smooth_time = smooth_time.max(1.0e-4);
    let omega = 2.0 / smooth_time;
    let x = omega * dt;
    let decay = 1.0 / (1.0 + x + 0.48 * x * x + 0.235 * x * x * x);

    let change = current - target;
    let temp = (*velocity + omega * change) * dt;
    *velocity = (*velocity - omega * temp) * decay;
    let mut output = target + (change + temp) * decay;

    if (target - current > 0.0) == (output > target) {
        output = target;
        *velocity = 0.0;
    }
    output
}

/// [`smooth_damp`] for angles in degrees, taking the short way around.
pub fn smooth_damp_angle(current: f32, target: f32, velocity: &mut f32, smooth_time: f32, dt: f32) -> f32 {
    let target = current + delta_angle(current, target);
    smooth_damp(current, target, velocity, smooth_time, dt)
}
