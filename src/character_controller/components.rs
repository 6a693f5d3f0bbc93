use bevy::math::{Quat, Vec3};

use crate::capabilities::HostEvent;

/// Per-character motion state. Mutated once per frame by the
/// [`MotionIntegrator`](super::physics::MotionIntegrator) and never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct CharacterKinematicState {
    pub velocity: Vec3,
    /// Facing yaw in degrees, clockwise seen from above, in `[0, 360)`.
    pub facing: f32,
    /// Auxiliary velocity of the facing smoothing.
    pub turn_velocity: f32,
    /// Filtered grounded flag of the current frame.
    pub grounded: bool,
    /// Controller time of the last grounded frame. Negative infinity when the
    /// history has been invalidated.
    pub last_grounded_at: f64,
}

impl Default for CharacterKinematicState {
    fn default() -> Self {
        Self {
            velocity: Vec3::ZERO,
            facing: 0.0,
            turn_velocity: 0.0,
            grounded: false,
            last_grounded_at: f64::NEG_INFINITY,
        }
    }
}

impl CharacterKinematicState {
    pub fn time_since_grounded(&self, now: f64) -> f32 {
        (now - self.last_grounded_at) as f32
    }

    /// Pushes the last grounded time into the far past so coyote time cannot
    /// re-qualify the character.
    pub fn invalidate_grounded_history(&mut self) {
        self.last_grounded_at = f64::NEG_INFINITY;
    }

    pub fn forward(&self) -> Vec3 {
        heading(self.facing)
    }

    pub fn horizontal_speed(&self) -> f32 {
        self.velocity.x.hypot(self.velocity.z)
    }
}

/// World rotation for a yaw in degrees, clockwise seen from above.
pub fn yaw_rotation(yaw: f32) -> Quat {
    Quat::from_rotation_y(-yaw.to_radians())
}

/// Unit forward vector for a yaw in degrees. Yaw 0 looks down -Z, yaw 90 down +X.
pub fn heading(yaw: f32) -> Vec3 {
    yaw_rotation(yaw) * Vec3::NEG_Z
}

/// What happened during one [`CharacterController::tick`](super::CharacterController::tick).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub jumped: bool,
    pub attack_started: bool,
    /// Number of bodies pushed by a strike that landed this frame.
    pub targets_struck: usize,
    pub overlay_toggled: bool,
    pub host_events: Vec<HostEvent>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heading_is_clockwise_from_negative_z() {
        assert!((heading(0.0) - Vec3::NEG_Z).length() < 1e-5);
        assert!((heading(90.0) - Vec3::X).length() < 1e-5);
        assert!((heading(180.0) - Vec3::Z).length() < 1e-5);
    }

    #[test]
    fn invalidated_history_never_counts_as_recent() {
        let mut state = CharacterKinematicState {
            last_grounded_at: 3.0,
            ..Default::default()
        };
        state.invalidate_grounded_history();
        assert!(state.time_since_grounded(3.0) > 1.0e6);
    }

    #[test]
    fn short_gaps_stay_exact_late_in_a_session() {
        let state = CharacterKinematicState {
            last_grounded_at: 600_000.0,
            ..Default::default()
        };
        let gap = state.time_since_grounded(600_000.0 + 9.0 / 60.0);
        assert!((gap - 0.15).abs() < 1e-6, "gap {gap}");
    }
}
