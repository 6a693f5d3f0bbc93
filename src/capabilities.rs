//! The engine-facing seams of the controller.
//!
//! The core never reaches into an engine directly. Each frame the host hands it
//! a [`Collaborators`] set: input and physics are required, the animator,
//! camera and inventory UI are optional and the matching feature is skipped
//! when they are absent.

use bevy::color::Color;
use bevy::math::{Quat, Vec3};

use crate::error::ControllerError;

/// Named axes read through [`InputSampler::axis`].
pub mod axis {
    pub const HORIZONTAL: &str = "Horizontal";
    pub const VERTICAL: &str = "Vertical";
    pub const MOUSE_X: &str = "Mouse X";
    pub const MOUSE_Y: &str = "Mouse Y";
}

/// Named buttons read through [`InputSampler::pressed_this_frame`] and
/// [`InputSampler::held`].
pub mod button {
    pub const JUMP: &str = "Jump";
    pub const ATTACK: &str = "Attack";
    /// Primary mouse button.
    pub const FIRE1: &str = "Fire1";
    pub const INVENTORY: &str = "Inventory";
    pub const SPRINT: &str = "Sprint";
}

pub trait InputSampler {
    /// Continuous value of a named axis. Unknown axes read as zero.
    fn axis(&self, name: &str) -> f32;
    /// True only on the frame the button went down.
    fn pressed_this_frame(&self, name: &str) -> bool;
    fn held(&self, name: &str) -> bool;
}

/// Animation state machine owned by the engine.
pub trait AnimationOracle {
    fn set_trigger(&mut self, name: &str);
    fn set_bool(&mut self, name: &str, value: bool);
    /// Moves the float toward `value`, damped over `damp_time` seconds.
    fn set_float(&mut self, name: &str, value: f32, damp_time: f32, dt: f32);
    fn set_int(&mut self, name: &str, value: i32);
    fn current_state_name(&self, layer: usize) -> &str;
    fn is_in_transition(&self, layer: usize) -> bool;
}

/// Opaque handle of a collider returned by [`CharacterPhysics::overlap_sphere`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColliderId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColliderHit {
    pub id: ColliderId,
    pub position: Vec3,
    /// Whether the collider belongs to a body that reacts to impulses.
    pub has_body: bool,
}

/// Bit mask of physics layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TargetLayers(pub u32);

impl TargetLayers {
    pub const ALL: Self = Self(u32::MAX);
}

/// Physics as seen by the character: a body that moves by a vector and reports
/// whether it ended up on the ground, plus the area queries melee needs.
pub trait CharacterPhysics {
    /// Moves the character and returns the grounded flag. The flag is only
    /// meaningful right after this call, so call it once per frame.
    fn move_by(&mut self, displacement: Vec3) -> bool;
    /// Grounded flag produced by the last [`CharacterPhysics::move_by`].
    fn is_grounded(&self) -> bool;
    fn position(&self) -> Vec3;
    /// Turns the character body to face `yaw` degrees (clockwise seen from above).
    fn set_heading(&mut self, yaw: f32);
    fn overlap_sphere(&self, center: Vec3, radius: f32, layers: TargetLayers) -> Vec<ColliderHit>;
    fn apply_impulse(&mut self, collider: ColliderId, impulse: Vec3);
}

pub trait CameraRig {
    fn set_pose(&mut self, translation: Vec3, rotation: Quat);
}

/// Widget surface of the inventory overlay.
pub trait InventoryUi {
    fn set_panel_visible(&mut self, visible: bool);
    fn destroy_slots(&mut self);
    fn instantiate_slot(&mut self, index: usize);
    fn set_slot_label(&mut self, index: usize, text: &str, visible: bool);
    fn set_slot_tint(&mut self, index: usize, tint: Color);
}

/// Cursor behaviour requested from the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureMode {
    /// Locked to the window and hidden, gameplay owns the pointer.
    Captured,
    /// Free and visible, for UI interaction.
    Free,
}

/// Side effects the controller asks the host to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEvent {
    PointerCapture(CaptureMode),
}

/// Everything the controller talks to during one frame.
pub struct Collaborators<'a> {
    pub input: &'a dyn InputSampler,
    pub physics: &'a mut dyn CharacterPhysics,
    pub animator: Option<&'a mut dyn AnimationOracle>,
    pub camera: Option<&'a mut dyn CameraRig>,
    pub ui: Option<&'a mut dyn InventoryUi>,
}

impl<'a> Collaborators<'a> {
    pub fn builder() -> CollaboratorsBuilder<'a> {
        CollaboratorsBuilder::default()
    }
}

#[derive(Default)]
pub struct CollaboratorsBuilder<'a> {
    input: Option<&'a dyn InputSampler>,
    physics: Option<&'a mut dyn CharacterPhysics>,
    animator: Option<&'a mut dyn AnimationOracle>,
    camera: Option<&'a mut dyn CameraRig>,
    ui: Option<&'a mut dyn InventoryUi>,
}

impl<'a> CollaboratorsBuilder<'a> {
    pub fn input(mut self, input: &'a dyn InputSampler) -> Self {
        self.input = Some(input);
        self
    }

    pub fn physics(mut self, physics: &'a mut dyn CharacterPhysics) -> Self {
        self.physics = Some(physics);
        self
    }

    pub fn animator(mut self, animator: &'a mut dyn AnimationOracle) -> Self {
        self.animator = Some(animator);
        self
    }

    pub fn camera(mut self, camera: &'a mut dyn CameraRig) -> Self {
        self.camera = Some(camera);
        self
    }

    pub fn ui(mut self, ui: &'a mut dyn InventoryUi) -> Self {
        self.ui = Some(ui);
        self
    }

    pub fn build(self) -> Result<Collaborators<'a>, ControllerError> {
        Ok(Collaborators {
            input: self.input.ok_or(ControllerError::MissingCollaborator("input"))?,
            physics: self.physics.ok_or(ControllerError::MissingCollaborator("physics"))?,
            animator: self.animator,
            camera: self.camera,
            ui: self.ui,
        })
    }
}
