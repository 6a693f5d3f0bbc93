//! Jump eligibility.
//!
//! The ground probe reports true as soon as the collider is near the floor,
//! including while a jump animation is still rising or falling. Grounded
//! history plus the animator's state name keep a single button press from
//! launching twice, and the coyote tolerance hides single-frame probe flicker.

use bevy::log::debug;

use crate::capabilities::AnimationOracle;

/// Animator state that marks an airborne jump.
pub const JUMP_STATE: &str = "Jump";
/// Animator trigger fired on launch.
pub const JUMP_TRIGGER: &str = "Jump";
pub const BASE_LAYER: usize = 0;

/// Inputs of one jump decision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JumpQuery<'a> {
    pub grounded_now: bool,
    pub time_since_grounded: f32,
    pub tolerance: f32,
    /// `None` when no animator is attached.
    pub current_anim_state: Option<&'a str>,
    pub is_transitioning: bool,
    pub jump_button_edge: bool,
}

impl JumpQuery<'_> {
    pub fn grounded_effective(&self) -> bool {
        self.grounded_now || self.time_since_grounded <= self.tolerance
    }

    /// A "Jump" state only blocks while the character is not effectively
    /// grounded; a fresh landing overrides a stale state read.
    pub fn animation_blocks_jump(&self) -> bool {
        self.current_anim_state == Some(JUMP_STATE) && !self.grounded_effective()
    }
}

pub fn can_jump(query: &JumpQuery<'_>) -> bool {
    query.jump_button_edge && query.grounded_effective() && !query.animation_blocks_jump()
}

/// Asks the animator (when present) about its base layer and evaluates
/// [`can_jump`]. The transition flag is reported but does not suppress.
pub fn evaluate(
    grounded_now: bool,
    time_since_grounded: f32,
    tolerance: f32,
    animator: Option<&(dyn AnimationOracle + '_)>,
    jump_button_edge: bool,
) -> bool {
    let query = JumpQuery {
        grounded_now,
        time_since_grounded,
        tolerance,
        current_anim_state: animator.map(|a| a.current_state_name(BASE_LAYER)),
        is_transitioning: animator.is_some_and(|a| a.is_in_transition(BASE_LAYER)),
        jump_button_edge,
    };
    let accepted = can_jump(&query);
    if jump_button_edge {
        debug!(
            target: "controller",
            accepted,
            grounded_now,
            time_since_grounded,
            state = query.current_anim_state.unwrap_or("<none>"),
            transitioning = query.is_transitioning,
            "jump request"
        );
    }
    accepted
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(grounded_now: bool, gap: f32, state: Option<&str>) -> JumpQuery<'_> {
        JumpQuery {
            grounded_now,
            time_since_grounded: gap,
            tolerance: 0.2,
            current_anim_state: state,
            is_transitioning: false,
            jump_button_edge: true,
        }
    }

    #[test]
    fn tolerance_window_is_inclusive() {
        for tolerance in [0.05_f32, 0.1, 0.2, 0.5, 1.0] {
            for gap in [0.0_f32, tolerance * 0.5, tolerance, tolerance * 1.01, tolerance * 3.0] {
                let q = JumpQuery {
                    tolerance,
                    ..query(false, gap, Some("Locomotion"))
                };
                assert_eq!(can_jump(&q), gap <= tolerance, "tolerance {tolerance} gap {gap}");
            }
        }
    }

    #[test]
    fn coyote_example() {
        assert!(can_jump(&query(false, 0.15, Some("Idle"))));
        assert!(!can_jump(&query(false, 0.25, Some("Idle"))));
    }

    #[test]
    fn airborne_jump_state_always_rejects() {
        for edge in [true, false] {
            let q = JumpQuery {
                jump_button_edge: edge,
                ..query(false, 5.0, Some(JUMP_STATE))
            };
            assert!(q.animation_blocks_jump());
            assert!(!can_jump(&q));
        }
    }

    #[test]
    fn landing_overrides_stale_jump_state() {
        assert!(can_jump(&query(true, 0.0, Some(JUMP_STATE))));
    }

    #[test]
    fn missing_animator_degrades_to_grounded_and_button() {
        assert!(can_jump(&query(true, f32::INFINITY, None)));
        assert!(!can_jump(&query(false, f32::INFINITY, None)));
        let no_edge = JumpQuery {
            jump_button_edge: false,
            ..query(true, 0.0, None)
        };
        assert!(!can_jump(&no_edge));
    }

    #[test]
    fn transition_flag_does_not_suppress() {
        let q = JumpQuery {
            is_transitioning: true,
            ..query(true, 0.0, Some("Locomotion"))
        };
        assert!(can_jump(&q));
    }
}
