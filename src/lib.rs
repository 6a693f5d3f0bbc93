//! Third-person melee character controller.
//!
//! The controller core ([`character_controller`], [`camera`], [`combat`],
//! [`inventory`]) only speaks to the engine through [`capabilities`]. The
//! remaining modules host it on bevy and avian3d.

pub mod animation;
pub mod camera;
pub mod capabilities;
pub mod character_controller;
pub mod combat;
pub mod config;
pub mod error;
pub mod inventory;
pub mod physics;
pub mod player;
pub mod world;

use bevy::prelude::*;

use crate::inventory::panel::{PanelWidgets, spawn_panel};

/// Everything the demo needs on top of `DefaultPlugins`.
pub struct MeleeControllerPlugin;

impl Plugin for MeleeControllerPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PanelWidgets>()
            .add_plugins((
                physics::PhysicsPlugin,
                character_controller::CharacterControllerPlugin,
                animation::AnimatorPlugin,
                player::PlayerPlugin,
                world::WorldPlugin,
            ))
            .add_systems(Startup, (camera::spawn_camera, spawn_panel));
    }
}
