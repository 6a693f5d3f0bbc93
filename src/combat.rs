//! Melee attacks with combo chaining.
//!
//! An attack is a two-step task: wind up until the hit lands, strike, then
//! cool down before the next attack may start. Instead of a hidden
//! continuation the sequencer stores the phase and the controller time at
//! which it resumes; [`ComboAttackSequencer::advance`] is called every frame.
//! Timestamps are `f64` seconds, durations `f32`.

use bevy::log::{debug, info};
use bevy::math::Vec3;

use crate::capabilities::{AnimationOracle, CharacterPhysics, TargetLayers};
use crate::config::ControllerConfig;

pub const ATTACK_TRIGGER: &str = "Attack";
pub const COMBO_INDEX_PARAM: &str = "ComboIndex";
/// Distance in front of the character where the strike sphere is centred.
pub const STRIKE_FORWARD_OFFSET: f32 = 1.0;
pub const STRIKE_IMPULSE: f32 = 5.0;

#[derive(Debug, Clone, PartialEq)]
pub struct AttackSettings {
    pub windup: f32,
    pub cooldown: f32,
    pub range: f32,
    pub combo_count: u32,
    pub reset_window: f32,
    pub layers: TargetLayers,
}

impl From<&ControllerConfig> for AttackSettings {
    fn from(config: &ControllerConfig) -> Self {
        Self {
            windup: config.attack_windup,
            cooldown: config.attack_cooldown,
            range: config.attack_range,
            combo_count: config.combo_count.max(1),
            reset_window: config.combo_reset_window,
            layers: TargetLayers(config.target_layers),
        }
    }
}

/// Which attack variant plays next and when the last one finished.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComboState {
    pub index: u32,
    pub last_attack_at: f64,
}

impl Default for ComboState {
    fn default() -> Self {
        Self {
            index: 0,
            last_attack_at: f64::NEG_INFINITY,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AttackPhase {
    Idle,
    Windup { resume_at: f64 },
    Cooldown { resume_at: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttackEvent {
    Struck { combo_index: u32, targets: usize },
    Finished { next_index: u32 },
}

#[derive(Debug, Clone)]
pub struct ComboAttackSequencer {
    settings: AttackSettings,
    phase: AttackPhase,
    combo: ComboState,
    /// The attack lock. The only thing that keeps two sequences apart.
    can_attack: bool,
}

impl ComboAttackSequencer {
    pub fn new(settings: AttackSettings) -> Self {
        Self {
            settings,
            phase: AttackPhase::Idle,
            combo: ComboState::default(),
            can_attack: true,
        }
    }

    pub fn can_attack(&self) -> bool {
        self.can_attack
    }

    pub fn phase(&self) -> AttackPhase {
        self.phase
    }

    pub fn combo(&self) -> ComboState {
        self.combo
    }

    pub fn settings(&self) -> &AttackSettings {
        &self.settings
    }

    /// Starts a sequence if the lock is open. Returns the combo index that
    /// plays, or `None` when an attack is already in flight.
    pub fn try_begin(
        &mut self,
        now: f64,
        animator: Option<&mut (dyn AnimationOracle + '_)>,
    ) -> Option<u32> {
        if !self.can_attack {
            return None;
        }
        if now - self.combo.last_attack_at > f64::from(self.settings.reset_window) {
            self.combo.index = 0;
        }
        self.can_attack = false;

        if let Some(animator) = animator {
            animator.set_int(COMBO_INDEX_PARAM, self.combo.index as i32);
            animator.set_trigger(ATTACK_TRIGGER);
        }

        self.phase = AttackPhase::Windup {
            resume_at: now + f64::from(self.settings.windup),
        };
        info!(target: "combat", combo_index = self.combo.index, "attack started");
        Some(self.combo.index)
    }

    /// Resumes the in-flight sequence when its wait is over. `origin` and
    /// `forward` describe the character at the moment of resumption.
    pub fn advance(
        &mut self,
        now: f64,
        origin: Vec3,
        forward: Vec3,
        physics: &mut dyn CharacterPhysics,
    ) -> Option<AttackEvent> {
        match self.phase {
            AttackPhase::Idle => None,
            AttackPhase::Windup { resume_at } if now >= resume_at => {
                let targets = strike(
                    physics,
                    origin,
                    forward,
                    self.settings.range,
                    self.settings.layers,
                );
                // Chained off the windup deadline, not the frame that noticed it.
                self.phase = AttackPhase::Cooldown {
                    resume_at: resume_at + f64::from(self.settings.cooldown),
                };
                Some(AttackEvent::Struck {
                    combo_index: self.combo.index,
                    targets,
                })
            }
            AttackPhase::Cooldown { resume_at } if now >= resume_at => {
                self.combo.last_attack_at = now;
                self.combo.index = (self.combo.index + 1) % self.settings.combo_count;
                self.can_attack = true;
                self.phase = AttackPhase::Idle;
                debug!(target: "combat", next_index = self.combo.index, "attack finished");
                Some(AttackEvent::Finished {
                    next_index: self.combo.index,
                })
            }
            AttackPhase::Windup { .. } | AttackPhase::Cooldown { .. } => None,
        }
    }

    /// Drops the in-flight sequence and reopens the lock, leaving the combo
    /// index where it was. Hook for interruptions such as character death.
    pub fn cancel(&mut self) {
        if self.phase != AttackPhase::Idle {
            info!(target: "combat", phase = ?self.phase, "attack cancelled");
        }
        self.phase = AttackPhase::Idle;
        self.can_attack = true;
    }
}

/// Pushes every body inside the strike sphere away from the character.
/// Returns how many bodies were pushed.
pub fn strike(
    physics: &mut dyn CharacterPhysics,
    origin: Vec3,
    forward: Vec3,
    range: f32,
    layers: TargetLayers,
) -> usize {
    let center = origin + forward * STRIKE_FORWARD_OFFSET;
    let mut pushed = 0;
    for hit in physics.overlap_sphere(center, range, layers) {
        if !hit.has_body {
            continue;
        }
        let direction = (hit.position - origin).normalize_or_zero();
        physics.apply_impulse(hit.id, direction * STRIKE_IMPULSE);
        pushed += 1;
    }
    debug!(target: "combat", pushed, "strike resolved");
    pushed
}
