use bevy::prelude::*;

use crate::capabilities::CameraRig;
use crate::config::ControllerConfig;

/// Height of the follow camera above the character's origin.
pub const CAMERA_HEIGHT_OFFSET: f32 = 1.5;

/// Orbit state of the follow camera. Angles are in degrees: yaw clockwise
/// seen from above, pitch positive looking down.
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitCamera {
    pub yaw: f32,
    pub pitch: f32,
    pub distance: f32,
    pub sensitivity: f32,
    pub pitch_min: f32,
    pub pitch_max: f32,
}

impl OrbitCamera {
    pub fn from_config(config: &ControllerConfig, yaw: f32) -> Self {
        Self {
            yaw,
            pitch: clamp_pitch(0.0, config.pitch_min, config.pitch_max),
            distance: config.camera_distance,
            sensitivity: config.mouse_sensitivity,
            pitch_min: config.pitch_min,
            pitch_max: config.pitch_max,
        }
    }

    /// Accumulates pointer movement. Pointer up (positive y) looks up.
    pub fn orbit(&mut self, look_delta: Vec2) {
        self.yaw += look_delta.x * self.sensitivity;
        self.pitch -= look_delta.y * self.sensitivity;
        self.pitch = clamp_pitch(self.pitch, self.pitch_min, self.pitch_max);
    }

    pub fn rotation(&self) -> Quat {
        Quat::from_rotation_y(-self.yaw.to_radians()) * Quat::from_rotation_x(-self.pitch.to_radians())
    }

    /// Camera pose for a character standing at `target`.
    pub fn pose(&self, target: Vec3) -> (Vec3, Quat) {
        let rotation = self.rotation();
        let translation =
            target - rotation * Vec3::NEG_Z * self.distance + Vec3::Y * CAMERA_HEIGHT_OFFSET;
        (translation, rotation)
    }
}

/// Like `f32::clamp`, but an inverted range from a hand-edited config pins
/// to `max` instead of panicking.
fn clamp_pitch(pitch: f32, min: f32, max: f32) -> f32 {
    pitch.max(min).min(max)
}

/// Marker for the camera that follows the player.
#[derive(Component, Default)]
pub struct ThirdPersonCamera;

/// [`CameraRig`] over the camera entity's transform.
pub struct TransformRig<'a>(pub &'a mut Transform);

impl CameraRig for TransformRig<'_> {
    fn set_pose(&mut self, translation: Vec3, rotation: Quat) {
        self.0.translation = translation;
        self.0.rotation = rotation;
    }
}

pub fn spawn_camera(mut commands: Commands) {
    commands.spawn((
        Camera3d::default(),
        Transform::from_xyz(0.0, CAMERA_HEIGHT_OFFSET, 5.0).looking_at(Vec3::ZERO, Vec3::Y),
        DistanceFog {
            color: Color::srgb_u8(43, 44, 100),
            falloff: FogFalloff::Exponential { density: 15e-3 },
            ..default()
        },
        ThirdPersonCamera,
    ));
}
