//! avian3d side of the character: a kinematic capsule moved by shape casts.

use avian3d::prelude::*;
use bevy::ecs::system::SystemParam;
use bevy::log::debug;
use bevy::prelude::*;
use bevy::utils::HashMap;

use crate::capabilities::{CharacterPhysics, ColliderHit, ColliderId, TargetLayers};
use crate::character_controller::yaw_rotation;

/// Gap kept between the capsule and whatever it slides along.
const SKIN_WIDTH: f32 = 0.02;
const MAX_SLIDES: usize = 4;
/// How far below the capsule the ground probe reaches.
const GROUND_PROBE_DISTANCE: f32 = 0.08;
/// Steepest surface, in degrees, that still counts as ground.
const MAX_GROUND_ANGLE: f32 = 50.0;

pub(crate) struct PhysicsPlugin;

impl Plugin for PhysicsPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(PhysicsPlugins::default());
    }
}

/// Collision layers of the demo world. `Target` is bit 2, the default melee mask.
#[derive(PhysicsLayer, Clone, Copy, Debug, Default)]
pub enum GameLayer {
    #[default]
    Ground,
    Character,
    Target,
}

/// Marker for kinematic bodies moved by an [`AvianMotor`].
#[derive(Component, Default)]
pub struct CharacterBody;

/// What an [`AvianMotor`] needs from the physics world.
#[derive(SystemParam)]
pub struct MotorWorld<'w, 's> {
    spatial: SpatialQuery<'w, 's>,
    bodies: Query<'w, 's, (&'static GlobalTransform, Option<&'static RigidBody>), Without<CharacterBody>>,
}

/// [`CharacterPhysics`] for one character entity.
///
/// Impulses are collected while the controller runs and handed out by
/// [`AvianMotor::into_impulses`] so the caller can write them once the world
/// is no longer borrowed.
pub struct AvianMotor<'a, 'w, 's> {
    entity: Entity,
    transform: &'a mut Transform,
    collider: &'a Collider,
    world: &'a MotorWorld<'w, 's>,
    grounded: bool,
    impulses: HashMap<Entity, Vec3>,
}

impl<'a, 'w, 's> AvianMotor<'a, 'w, 's> {
    pub fn new(
        entity: Entity,
        transform: &'a mut Transform,
        collider: &'a Collider,
        world: &'a MotorWorld<'w, 's>,
    ) -> Self {
        let mut motor = Self {
            entity,
            transform,
            collider,
            world,
            grounded: false,
            impulses: HashMap::default(),
        };
        motor.grounded = motor.probe_ground();
        motor
    }

    pub fn into_impulses(self) -> HashMap<Entity, Vec3> {
        self.impulses
    }

    fn solid_filter(&self) -> SpatialQueryFilter {
        SpatialQueryFilter::from_mask([GameLayer::Ground, GameLayer::Target])
            .with_excluded_entities([self.entity])
    }

    fn probe_ground(&self) -> bool {
        self.world
            .spatial
            .cast_shape(
                self.collider,
                self.transform.translation,
                Quat::IDENTITY,
                Dir3::NEG_Y,
                &ShapeCastConfig::from_max_distance(GROUND_PROBE_DISTANCE + SKIN_WIDTH),
                &self.solid_filter(),
            )
            .is_some_and(|hit| Vec3::Y.angle_between(hit.normal1).to_degrees() <= MAX_GROUND_ANGLE)
    }
}

impl CharacterPhysics for AvianMotor<'_, '_, '_> {
    fn move_by(&mut self, displacement: Vec3) -> bool {
        let filter = self.solid_filter();
        let mut position = self.transform.translation;
        let mut remaining = displacement;

        for _ in 0..MAX_SLIDES {
            let Ok(direction) = Dir3::new(remaining) else { break };
            let distance = remaining.length();
            let Some(hit) = self.world.spatial.cast_shape(
                self.collider,
                position,
                Quat::IDENTITY,
                direction,
                &ShapeCastConfig::from_max_distance(distance + SKIN_WIDTH),
                &filter,
            ) else {
                position += remaining;
                break;
            };

            let travel = (hit.distance - SKIN_WIDTH).clamp(0.0, distance);
            position += direction * travel;
            let leftover = remaining - direction * travel;
            remaining = leftover - hit.normal1 * leftover.dot(hit.normal1);
        }

        self.transform.translation = position;
        self.grounded = self.probe_ground();
        self.grounded
    }

    fn is_grounded(&self) -> bool {
        self.grounded
    }

    fn position(&self) -> Vec3 {
        self.transform.translation
    }

    fn set_heading(&mut self, yaw: f32) {
        self.transform.rotation = yaw_rotation(yaw);
    }

    fn overlap_sphere(&self, center: Vec3, radius: f32, layers: TargetLayers) -> Vec<ColliderHit> {
        let filter =
            SpatialQueryFilter::from_mask(LayerMask(layers.0)).with_excluded_entities([self.entity]);
        self.world
            .spatial
            .shape_intersections(&Collider::sphere(radius), center, Quat::IDENTITY, &filter)
            .into_iter()
            .filter_map(|entity| {
                let (transform, body) = self.world.bodies.get(entity).ok()?;
                Some(ColliderHit {
                    id: ColliderId(entity.to_bits()),
                    position: transform.translation(),
                    has_body: body.is_some_and(RigidBody::is_dynamic),
                })
            })
            .collect()
    }

    fn apply_impulse(&mut self, collider: ColliderId, impulse: Vec3) {
        match Entity::try_from_bits(collider.0) {
            Ok(entity) => *self.impulses.entry(entity).or_default() += impulse,
            Err(_) => debug!(target: "combat", id = collider.0, "impulse for unknown collider dropped"),
        }
    }
}

/// Writes collected impulses, adding [`ExternalImpulse`] where it is missing.
pub fn apply_impulses(
    commands: &mut Commands,
    receivers: &mut Query<&mut ExternalImpulse>,
    impulses: HashMap<Entity, Vec3>,
) {
    for (entity, impulse) in impulses {
        match receivers.get_mut(entity) {
            Ok(mut external) => {
                external.apply_impulse(impulse);
            }
            Err(_) => {
                commands.entity(entity).insert(ExternalImpulse::new(impulse));
            }
        }
    }
}
