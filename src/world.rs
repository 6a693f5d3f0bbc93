use std::f32::consts::PI;

use avian3d::prelude::*;
use bevy::pbr::CascadeShadowConfigBuilder;
use bevy::prelude::*;
use rand::Rng;

use crate::physics::GameLayer;

const ARENA_SIZE: f32 = 60.0;
const TARGET_COUNT: usize = 12;
/// Targets are scattered in a ring around the spawn point.
const TARGET_RING: std::ops::Range<f32> = 4.0..14.0;
/// Below this height a target has left the arena and is put back.
const FALL_LIMIT: f32 = -20.0;

pub(crate) struct WorldPlugin;

impl Plugin for WorldPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<TrainingTarget>()
            .add_systems(Startup, setup)
            .add_systems(FixedUpdate, reset_fallen_targets);
    }
}

/// Dynamic prop that melee strikes can push around.
#[derive(Component, Reflect, Default)]
#[reflect(Component)]
pub struct TrainingTarget {
    pub home: Vec3,
}

fn setup(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    // Ground
    commands.spawn((
        Name::new("Ground"),
        RigidBody::Static,
        Collider::cuboid(ARENA_SIZE, 0.2, ARENA_SIZE),
        CollisionLayers::new(GameLayer::Ground, LayerMask::ALL),
        Mesh3d(meshes.add(Cuboid::new(ARENA_SIZE, 0.2, ARENA_SIZE))),
        MeshMaterial3d(materials.add(Color::srgb(0.3, 0.5, 0.3))),
        Transform::from_xyz(0.0, -0.1, 0.0),
    ));

    // A raised ledge to walk off and test late jumps from
    commands.spawn((
        Name::new("Ledge"),
        RigidBody::Static,
        Collider::cuboid(6.0, 1.0, 6.0),
        CollisionLayers::new(GameLayer::Ground, LayerMask::ALL),
        Mesh3d(meshes.add(Cuboid::new(6.0, 1.0, 6.0))),
        MeshMaterial3d(materials.add(Color::srgb(0.45, 0.42, 0.4))),
        Transform::from_xyz(-18.0, 0.5, -18.0),
    ));

    let target_mesh = meshes.add(Cuboid::new(0.8, 0.8, 0.8));
    let target_material = materials.add(Color::srgb(0.75, 0.3, 0.25));
    let mut rng = rand::thread_rng();
    for index in 0..TARGET_COUNT {
        let angle = rng.gen_range(0.0..(2.0 * PI));
        let radius = rng.gen_range(TARGET_RING);
        let home = Vec3::new(angle.cos() * radius, 0.5, angle.sin() * radius);
        commands.spawn((
            Name::new(format!("Target {index}")),
            TrainingTarget { home },
            RigidBody::Dynamic,
            Collider::cuboid(0.8, 0.8, 0.8),
            CollisionLayers::new(GameLayer::Target, LayerMask::ALL),
            Mass(rng.gen_range(0.5..2.0)),
            Mesh3d(target_mesh.clone()),
            MeshMaterial3d(target_material.clone()),
            Transform::from_translation(home).with_rotation(Quat::from_rotation_y(angle)),
        ));
    }

    // Light
    commands.spawn((
        Transform::from_rotation(Quat::from_euler(EulerRot::ZYX, 0.0, 1.0, -PI / 4.)),
        DirectionalLight {
            shadows_enabled: true,
            ..default()
        },
        CascadeShadowConfigBuilder {
            first_cascade_far_bound: 200.0,
            maximum_distance: 400.0,
            ..default()
        }
        .build(),
    ));
}

fn reset_fallen_targets(
    mut targets: Query<(
        &TrainingTarget,
        &mut Transform,
        &mut LinearVelocity,
        &mut AngularVelocity,
    )>,
) {
    for (target, mut transform, mut linear, mut angular) in &mut targets {
        if transform.translation.y < FALL_LIMIT {
            debug!(target: "combat", home = ?target.home, "target fell off the arena");
            transform.translation = target.home;
            transform.rotation = Quat::IDENTITY;
            linear.0 = Vec3::ZERO;
            angular.0 = Vec3::ZERO;
        }
    }
}
