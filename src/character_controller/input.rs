use bevy::input::ButtonInput;
use bevy::input::mouse::MouseMotion;
use bevy::math::Vec2;
use bevy::prelude::{EventReader, Gamepad, GamepadAxis, GamepadButton, KeyCode, MouseButton, Query, Res, ResMut, Resource, Time};
use bevy::utils::{HashMap, HashSet};

use crate::capabilities::{InputSampler, axis, button};

/// Pointer pixels to "Mouse X/Y" axis units.
const POINTER_SCALE: f32 = 0.05;
/// Right stick deflection per second to "Mouse X/Y" axis units.
const GAMEPAD_LOOK_RATE: f32 = 60.0;
const STICK_DEADZONE: f32 = 0.1;

/// Everything the controller reads from input in one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameInput {
    /// x is Horizontal (right positive), y is Vertical (forward positive).
    pub move_axis: Vec2,
    pub sprint: bool,
    /// x is Mouse X, y is Mouse Y (up positive).
    pub look_delta: Vec2,
    pub jump: bool,
    pub attack: bool,
    pub toggle_inventory: bool,
}

impl FrameInput {
    pub fn sample(input: &dyn InputSampler) -> Self {
        Self {
            move_axis: Vec2::new(input.axis(axis::HORIZONTAL), input.axis(axis::VERTICAL)),
            sprint: input.held(button::SPRINT),
            look_delta: Vec2::new(input.axis(axis::MOUSE_X), input.axis(axis::MOUSE_Y)),
            jump: input.pressed_this_frame(button::JUMP),
            attack: input.pressed_this_frame(button::ATTACK)
                || input.pressed_this_frame(button::FIRE1),
            toggle_inventory: input.pressed_this_frame(button::INVENTORY),
        }
    }
}

/// Input snapshot rebuilt every frame from keyboard, mouse and gamepads.
#[derive(Resource, Debug, Default)]
pub struct InputFrame {
    axes: HashMap<&'static str, f32>,
    pressed: HashSet<&'static str>,
    held: HashSet<&'static str>,
}

impl InputFrame {
    pub fn clear(&mut self) {
        self.axes.clear();
        self.pressed.clear();
        self.held.clear();
    }

    pub fn add_axis(&mut self, name: &'static str, value: f32) {
        *self.axes.entry(name).or_default() += value;
    }

    pub fn press(&mut self, name: &'static str) {
        self.pressed.insert(name);
        self.held.insert(name);
    }

    pub fn hold(&mut self, name: &'static str) {
        self.held.insert(name);
    }
}

impl InputSampler for InputFrame {
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

pub fn clear_input_frame(mut frame: ResMut<InputFrame>) {
    frame.clear();
}

/// Fills the [`InputFrame`] from keyboard and mouse.
pub fn keyboard_input(
    mut frame: ResMut<InputFrame>,
    keyboard_input: Res<ButtonInput<KeyCode>>,
    mouse_input: Res<ButtonInput<MouseButton>>,
    mut mouse_motion: EventReader<MouseMotion>,
) {
    let up = keyboard_input.any_pressed([KeyCode::KeyW, KeyCode::ArrowUp]);
    let down = keyboard_input.any_pressed([KeyCode::KeyS, KeyCode::ArrowDown]);
    let left = keyboard_input.any_pressed([KeyCode::KeyA, KeyCode::ArrowLeft]);
    let right = keyboard_input.any_pressed([KeyCode::KeyD, KeyCode::ArrowRight]);

    frame.add_axis(axis::HORIZONTAL, (right as i8 - left as i8) as f32);
    frame.add_axis(axis::VERTICAL, (up as i8 - down as i8) as f32);

    if keyboard_input.any_pressed([KeyCode::ShiftLeft, KeyCode::ShiftRight]) {
        frame.hold(button::SPRINT);
    }
    if keyboard_input.just_pressed(KeyCode::Space) {
        frame.press(button::JUMP);
    }
    if keyboard_input.just_pressed(KeyCode::KeyF) {
        frame.press(button::ATTACK);
    }
    if keyboard_input.any_just_pressed([KeyCode::Tab, KeyCode::KeyI]) {
        frame.press(button::INVENTORY);
    }
    if mouse_input.just_pressed(MouseButton::Left) {
        frame.press(button::FIRE1);
    }

    // Winit reports y growing downwards; the axis grows upwards.
    for event in mouse_motion.read() {
        frame.add_axis(axis::MOUSE_X, event.delta.x * POINTER_SCALE);
        frame.add_axis(axis::MOUSE_Y, -event.delta.y * POINTER_SCALE);
    }
}

/// Fills the [`InputFrame`] from every connected gamepad.
pub fn gamepad_input(mut frame: ResMut<InputFrame>, gamepads: Query<&Gamepad>, time: Res<Time>) {
    let dt = time.delta_secs();

    for gamepad in gamepads.iter() {
        if let (Some(x), Some(y)) = (
            gamepad.get(GamepadAxis::LeftStickX),
            gamepad.get(GamepadAxis::LeftStickY),
        ) {
            let stick = Vec2::new(x, y).clamp_length_max(1.0);
            if stick.length() > STICK_DEADZONE {
                frame.add_axis(axis::HORIZONTAL, stick.x);
                frame.add_axis(axis::VERTICAL, stick.y);
            }
        }

        if let (Some(x), Some(y)) = (
            gamepad.get(GamepadAxis::RightStickX),
            gamepad.get(GamepadAxis::RightStickY),
        ) {
            if x.abs() > STICK_DEADZONE || y.abs() > STICK_DEADZONE {
                frame.add_axis(axis::MOUSE_X, x * GAMEPAD_LOOK_RATE * dt);
                frame.add_axis(axis::MOUSE_Y, y * GAMEPAD_LOOK_RATE * dt);
            }
        }

        if gamepad.pressed(GamepadButton::RightTrigger2) {
            frame.hold(button::SPRINT);
        }
        if gamepad.just_pressed(GamepadButton::South) {
            frame.press(button::JUMP);
        }
        if gamepad.just_pressed(GamepadButton::West) {
            frame.press(button::ATTACK);
        }
        if gamepad.just_pressed(GamepadButton::Select) {
            frame.press(button::INVENTORY);
        }
    }
}
