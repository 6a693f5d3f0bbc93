#![allow(dead_code)]

use std::collections::{HashMap, HashSet};

use bevy::color::Color;
use bevy::math::{Quat, Vec3};
use melee_controller::capabilities::{
    AnimationOracle, CameraRig, CharacterPhysics, ColliderHit, ColliderId, Collaborators,
    InputSampler, InventoryUi, TargetLayers,
};
use melee_controller::character_controller::{CharacterController, TickReport};
use melee_controller::config::ControllerConfig;

pub const DT: f32 = 1.0 / 60.0;

#[derive(Default)]
pub struct FakeInput {
    axes: HashMap<String, f32>,
    pressed: HashSet<String>,
    held: HashSet<String>,
}

impl FakeInput {
    /// Button edge for the next tick only.
    pub fn press(&mut self, name: &str) {
        self.pressed.insert(name.to_string());
    }

    pub fn hold(&mut self, name: &str, down: bool) {
        if down {
            self.held.insert(name.to_string());
        } else {
            self.held.remove(name);
        }
    }

    pub fn set_axis(&mut self, name: &str, value: f32) {
        self.axes.insert(name.to_string(), value);
    }

    pub fn clear_edges(&mut self) {
        self.pressed.clear();
    }
}

impl InputSampler for FakeInput {
    fn axis(&self, name: &str) -> f32 {
        self.axes.get(name).copied().unwrap_or(0.0)
    }

    fn pressed_this_frame(&self, name: &str) -> bool {
        self.pressed.contains(name)
    }

    fn held(&self, name: &str) -> bool {
        self.held.contains(name)
    }
}

/// Point-mass body over an optional flat floor.
pub struct FakePhysics {
    pub position: Vec3,
    /// Height of the floor, `None` for a bottomless drop.
    pub floor: Option<f32>,
    /// Overrides the grounded flag regardless of position.
    pub forced_grounded: Option<bool>,
    pub grounded: bool,
    pub moves: Vec<Vec3>,
    pub headings: Vec<f32>,
    pub targets: Vec<ColliderHit>,
    pub overlap_queries: std::cell::Cell<usize>,
    pub impulses: Vec<(ColliderId, Vec3)>,
}

impl Default for FakePhysics {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            floor: Some(0.0),
            forced_grounded: None,
            grounded: true,
            moves: Vec::new(),
            headings: Vec::new(),
            targets: Vec::new(),
            overlap_queries: std::cell::Cell::new(0),
            impulses: Vec::new(),
        }
    }
}

impl FakePhysics {
    /// Leaves the floor behind: no ground under the body from now on.
    pub fn remove_floor(&mut self) {
        self.floor = None;
        self.grounded = false;
    }
}

impl CharacterPhysics for FakePhysics {
    fn move_by(&mut self, displacement: Vec3) -> bool {
        self.moves.push(displacement);
        self.position += displacement;
        self.grounded = match self.floor {
            Some(floor) if self.position.y <= floor => {
                self.position.y = floor;
                true
            }
            _ => false,
        };
        if let Some(forced) = self.forced_grounded {
            self.grounded = forced;
        }
        self.grounded
    }

    fn is_grounded(&self) -> bool {
        self.forced_grounded.unwrap_or(self.grounded)
    }

    fn position(&self) -> Vec3 {
        self.position
    }

    fn set_heading(&mut self, yaw: f32) {
        self.headings.push(yaw);
    }

    fn overlap_sphere(&self, center: Vec3, radius: f32, _layers: TargetLayers) -> Vec<ColliderHit> {
        self.overlap_queries.set(self.overlap_queries.get() + 1);
        self.targets
            .iter()
            .filter(|hit| hit.position.distance(center) <= radius)
            .copied()
            .collect()
    }

    fn apply_impulse(&mut self, collider: ColliderId, impulse: Vec3) {
        self.impulses.push((collider, impulse));
    }
}

pub struct FakeAnimator {
    pub state: String,
    pub transitioning: bool,
    pub triggers: Vec<String>,
    pub bools: HashMap<String, bool>,
    /// Last value written, damping ignored.
    pub floats: HashMap<String, f32>,
    pub int_writes: Vec<(String, i32)>,
}

impl Default for FakeAnimator {
    fn default() -> Self {
        Self {
            state: "Locomotion".to_string(),
            transitioning: false,
            triggers: Vec::new(),
            bools: HashMap::new(),
            floats: HashMap::new(),
            int_writes: Vec::new(),
        }
    }
}

impl FakeAnimator {
    pub fn trigger_count(&self, name: &str) -> usize {
        self.triggers.iter().filter(|t| *t == name).count()
    }

    pub fn ints_written(&self, name: &str) -> Vec<i32> {
        self.int_writes
            .iter()
            .filter(|(param, _)| param == name)
            .map(|(_, value)| *value)
            .collect()
    }
}

impl AnimationOracle for FakeAnimator {
    fn set_trigger(&mut self, name: &str) {
        self.triggers.push(name.to_string());
    }

    fn set_bool(&mut self, name: &str, value: bool) {
        self.bools.insert(name.to_string(), value);
    }

    fn set_float(&mut self, name: &str, value: f32, _damp_time: f32, _dt: f32) {
        self.floats.insert(name.to_string(), value);
    }

    fn set_int(&mut self, name: &str, value: i32) {
        self.int_writes.push((name.to_string(), value));
    }

    fn current_state_name(&self, _layer: usize) -> &str {
        &self.state
    }

    fn is_in_transition(&self, _layer: usize) -> bool {
        self.transitioning
    }
}

#[derive(Default)]
pub struct FakeCamera {
    pub poses: Vec<(Vec3, Quat)>,
}

impl CameraRig for FakeCamera {
    fn set_pose(&mut self, translation: Vec3, rotation: Quat) {
        self.poses.push((translation, rotation));
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FakeSlot {
    pub label: String,
    pub label_visible: bool,
    pub tint: Option<Color>,
}

#[derive(Default)]
pub struct FakeUi {
    pub panel_visible: bool,
    pub slots: Vec<FakeSlot>,
    pub rebuilds: usize,
}

impl InventoryUi for FakeUi {
    fn set_panel_visible(&mut self, visible: bool) {
        self.panel_visible = visible;
    }

    fn destroy_slots(&mut self) {
        self.slots.clear();
        self.rebuilds += 1;
    }

    fn instantiate_slot(&mut self, index: usize) {
        assert_eq!(index, self.slots.len(), "slots instantiated out of order");
        self.slots.push(FakeSlot {
            label: "template".to_string(),
            label_visible: true,
            tint: None,
        });
    }

    fn set_slot_label(&mut self, index: usize, text: &str, visible: bool) {
        let slot = &mut self.slots[index];
        slot.label = text.to_string();
        slot.label_visible = visible;
    }

    fn set_slot_tint(&mut self, index: usize, tint: Color) {
        self.slots[index].tint = Some(tint);
    }
}

/// Which optional collaborators are handed to the controller.
#[derive(Debug, Clone, Copy)]
pub struct Attached {
    pub animator: bool,
    pub camera: bool,
    pub ui: bool,
}

impl Default for Attached {
    fn default() -> Self {
        Self {
            animator: true,
            camera: true,
            ui: true,
        }
    }
}

#[derive(Default)]
pub struct Rig {
    pub input: FakeInput,
    pub physics: FakePhysics,
    pub animator: FakeAnimator,
    pub camera: FakeCamera,
    pub ui: FakeUi,
    pub attached: Attached,
}

impl Rig {
    pub fn tick(&mut self, controller: &mut CharacterController) -> TickReport {
        let mut builder = Collaborators::builder()
            .input(&self.input)
            .physics(&mut self.physics);
        if self.attached.animator {
            builder = builder.animator(&mut self.animator);
        }
        if self.attached.camera {
            builder = builder.camera(&mut self.camera);
        }
        if self.attached.ui {
            builder = builder.ui(&mut self.ui);
        }
        let mut collaborators = builder.build().expect("rig always has input and physics");
        let report = controller.tick(DT, &mut collaborators);
        controller.late_tick(&mut collaborators);
        self.input.clear_edges();
        report
    }

    /// Ticks for `seconds` with whatever input is held, returning every report.
    pub fn run(&mut self, controller: &mut CharacterController, seconds: f32) -> Vec<TickReport> {
        let frames = (seconds / DT).round() as usize;
        (0..frames).map(|_| self.tick(controller)).collect()
    }

    /// Presses `button` for one tick.
    pub fn tap(&mut self, controller: &mut CharacterController, button: &str) -> TickReport {
        self.input.press(button);
        self.tick(controller)
    }
}

pub fn controller() -> CharacterController {
    CharacterController::new(ControllerConfig::default())
}

pub fn controller_with(config: ControllerConfig) -> CharacterController {
    CharacterController::new(config)
}
