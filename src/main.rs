use bevy::prelude::*;
use bevy_inspector_egui::quick::WorldInspectorPlugin;
use melee_controller::MeleeControllerPlugin;

fn main() -> AppExit {
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Melee controller".into(),
                ..default()
            }),
            ..default()
        }))
        .add_plugins(WorldInspectorPlugin::new())
        .add_plugins(MeleeControllerPlugin)
        .run()
}
