//! Animator state machine of the demo character.
//!
//! [`AnimatorGraph`] mirrors the parameter-driven state machines of
//! animation tools: the controller writes triggers, bools, floats and ints,
//! and [`advance_animators`] moves between `Locomotion`, `Jump` and `Attack`
//! with timed cross-fades. While a cross-fade runs the graph still reports
//! the state it is leaving, which is what the jump gate has to cope with.

use bevy::prelude::*;
use bevy::utils::{HashMap, HashSet};

use crate::capabilities::AnimationOracle;
use crate::character_controller::physics::smooth_damp;
use crate::character_controller::{ControllerSet, IS_GROUNDED_PARAM, SPEED_PARAM, jump};
use crate::combat::{ATTACK_TRIGGER, COMBO_INDEX_PARAM};

pub const LOCOMOTION_STATE: &str = "Locomotion";
pub const ATTACK_STATE: &str = "Attack";

const ENTER_JUMP_FADE: f32 = 0.1;
const ENTER_ATTACK_FADE: f32 = 0.1;
const EXIT_FADE: f32 = 0.15;
/// Minimum time in `Jump` before a landing is accepted.
const MIN_AIR_TIME: f32 = 0.25;
const ATTACK_CLIP_LENGTH: f32 = 0.6;

pub struct AnimatorPlugin;

impl Plugin for AnimatorPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<AnimState>().add_systems(
            Update,
            (advance_animators, pose_visuals)
                .chain()
                .after(ControllerSet::Drive),
        );
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Reflect)]
pub enum AnimState {
    Locomotion,
    Jump,
    Attack,
}

impl AnimState {
    pub fn name(self) -> &'static str {
        match self {
            AnimState::Locomotion => LOCOMOTION_STATE,
            AnimState::Jump => jump::JUMP_STATE,
            AnimState::Attack => ATTACK_STATE,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct CrossFade {
    to: AnimState,
    remaining: f32,
}

#[derive(Debug, Clone, Copy, Default)]
struct DampedFloat {
    value: f32,
    velocity: f32,
}

/// Single-layer animator. Triggers stay set until a transition consumes them.
#[derive(Component, Debug, Clone)]
pub struct AnimatorGraph {
    state: AnimState,
    state_time: f32,
    fade: Option<CrossFade>,
    triggers: HashSet<String>,
    bools: HashMap<String, bool>,
    floats: HashMap<String, DampedFloat>,
    ints: HashMap<String, i32>,
}

impl Default for AnimatorGraph {
    fn default() -> Self {
        Self {
            state: AnimState::Locomotion,
            state_time: 0.0,
            fade: None,
            triggers: HashSet::default(),
            bools: HashMap::default(),
            floats: HashMap::default(),
            ints: HashMap::default(),
        }
    }
}

impl AnimatorGraph {
    pub fn state(&self) -> AnimState {
        self.state
    }

    /// Target of the running cross-fade.
    pub fn fading_to(&self) -> Option<AnimState> {
        self.fade.map(|fade| fade.to)
    }

    pub fn float(&self, name: &str) -> f32 {
        self.floats.get(name).map_or(0.0, |f| f.value)
    }

    pub fn bool(&self, name: &str) -> bool {
        self.bools.get(name).copied().unwrap_or(false)
    }

    pub fn int(&self, name: &str) -> i32 {
        self.ints.get(name).copied().unwrap_or(0)
    }

    pub fn update(&mut self, dt: f32) {
        self.state_time += dt;

        if let Some(fade) = self.fade.as_mut() {
            fade.remaining -= dt;
            if fade.remaining <= 0.0 {
                self.state = fade.to;
                self.state_time = 0.0;
                self.fade = None;
                debug!(target: "controller", state = self.state.name(), "animator entered state");
            }
            return;
        }

        let state = self.state;
        let next = match state {
            AnimState::Locomotion if self.consume(jump::JUMP_TRIGGER) => {
                Some((AnimState::Jump, ENTER_JUMP_FADE))
            }
            AnimState::Locomotion if self.consume(ATTACK_TRIGGER) => {
                Some((AnimState::Attack, ENTER_ATTACK_FADE))
            }
            AnimState::Jump if self.state_time >= MIN_AIR_TIME && self.bool(IS_GROUNDED_PARAM) => {
                Some((AnimState::Locomotion, EXIT_FADE))
            }
            AnimState::Attack if self.consume(jump::JUMP_TRIGGER) => {
                Some((AnimState::Jump, ENTER_JUMP_FADE))
            }
            AnimState::Attack if self.state_time >= ATTACK_CLIP_LENGTH => {
                Some((AnimState::Locomotion, EXIT_FADE))
            }
            _ => None,
        };
        if let Some((to, duration)) = next {
            self.fade = Some(CrossFade {
                to,
                remaining: duration,
            });
        }
    }

    fn consume(&mut self, trigger: &str) -> bool {
        self.triggers.remove(trigger)
    }
}

impl AnimationOracle for AnimatorGraph {
    fn set_trigger(&mut self, name: &str) {
        self.triggers.insert(name.to_string());
    }

    fn set_bool(&mut self, name: &str, value: bool) {
        self.bools.insert(name.to_string(), value);
    }

    fn set_float(&mut self, name: &str, value: f32, damp_time: f32, dt: f32) {
        let param = self.floats.entry(name.to_string()).or_default();
        param.value = smooth_damp(param.value, value, &mut param.velocity, damp_time, dt);
    }

    fn set_int(&mut self, name: &str, value: i32) {
        self.ints.insert(name.to_string(), value);
    }

    fn current_state_name(&self, layer: usize) -> &str {
        if layer == jump::BASE_LAYER {
            self.state.name()
        } else {
            ""
        }
    }

    fn is_in_transition(&self, layer: usize) -> bool {
        layer == jump::BASE_LAYER && self.fade.is_some()
    }
}

pub fn advance_animators(time: Res<Time>, mut animators: Query<&mut AnimatorGraph>) {
    let dt = time.delta_secs();
    for mut animator in &mut animators {
        animator.update(dt);
    }
}

/// Child mesh posed from its parent's [`AnimatorGraph`] in place of clips.
#[derive(Component, Default)]
pub struct AnimatedVisual;

const POSE_SHARPNESS: f32 = 12.0;

/// Stretches the body while airborne, leans it into attacks and bobs it with
/// the `Speed` blend.
pub fn pose_visuals(
    time: Res<Time>,
    animators: Query<(&AnimatorGraph, &Children)>,
    mut visuals: Query<&mut Transform, With<AnimatedVisual>>,
) {
    let blend = 1.0 - (-POSE_SHARPNESS * time.delta_secs()).exp();
    for (animator, children) in &animators {
        let (scale, lean) = match animator.fading_to().unwrap_or(animator.state()) {
            AnimState::Jump => (Vec3::new(0.9, 1.15, 0.9), 0.0),
            AnimState::Attack => (Vec3::ONE, -0.35 - 0.1 * animator.int(COMBO_INDEX_PARAM) as f32),
            AnimState::Locomotion => (Vec3::ONE, -0.15 * animator.float(SPEED_PARAM)),
        };
        for &child in children.iter() {
            if let Ok(mut transform) = visuals.get_mut(child) {
                transform.scale = transform.scale.lerp(scale, blend);
                transform.rotation = transform.rotation.slerp(Quat::from_rotation_x(lean), blend);
            }
        }
    }
}
