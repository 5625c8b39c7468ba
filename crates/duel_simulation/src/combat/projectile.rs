//! Projectile hazard launched by the special attack.

use bevy::math::bounding::Aabb2d;
use bevy::prelude::*;

use crate::combat::AttackDefinition;
use crate::components::Facing;
use crate::config::ProjectileTuning;

/// Moving hazard. Carries a snapshot of the move that launched it, so later
/// catalog edits never change a projectile already in flight.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
#[require(Transform)]
pub struct Projectile {
    /// Fighter that launched it; never struck by its own projectile
    pub owner: Entity,
    /// -1 or +1 along x
    pub direction: f32,
    pub speed: f32,
    pub attack: AttackDefinition,
    /// Scaled seconds left before it expires
    pub lifetime: f32,
    pub half_size: Vec2,
    pub despawn_on_hit: bool,
    pub hit_entities: Vec<Entity>,
    /// Launch order; projectiles update in this order
    pub serial: u64,
}

impl Projectile {
    pub fn bounds(&self, position: Vec2) -> Aabb2d {
        Aabb2d::new(position, self.half_size.abs())
    }

    pub fn velocity(&self) -> Vec2 {
        Vec2::new(self.direction * self.speed, 0.0)
    }

    /// Returns `false` if this projectile already struck `target`.
    pub fn record_hit(&mut self, target: Entity) -> bool {
        if self.hit_entities.contains(&target) {
            return false;
        }
        self.hit_entities.push(target);
        true
    }

    /// Counts the lifetime down; `true` once it has run out.
    pub fn tick_lifetime(&mut self, scaled_delta: f32) -> bool {
        self.lifetime -= scaled_delta.max(0.0);
        self.lifetime <= 0.0
    }
}

/// Monotonic launch counter (deterministic projectile order).
#[derive(Resource, Debug, Default, Reflect)]
#[reflect(Resource)]
pub struct ProjectileSerial(pub u64);

impl ProjectileSerial {
    pub fn next(&mut self) -> u64 {
        let serial = self.0;
        self.0 += 1;
        serial
    }
}

/// A special attack released its projectile.
#[derive(Event, Debug, Clone)]
pub struct ProjectileLaunched {
    pub projectile: Entity,
    pub owner: Entity,
    pub position: Vec2,
    pub direction: f32,
}

/// Spawns a projectile in front of `origin` travelling along `facing`.
pub fn launch_projectile(
    commands: &mut Commands,
    serial: &mut ProjectileSerial,
    owner: Entity,
    origin: Vec2,
    facing: Facing,
    attack: &AttackDefinition,
    tuning: &ProjectileTuning,
) -> (Entity, Vec2) {
    let (offset_x, offset_y) = tuning.spawn_offset;
    let position = origin + Vec2::new(offset_x * facing.sign(), offset_y);

    let projectile = Projectile {
        owner,
        direction: facing.sign(),
        speed: tuning.speed,
        attack: attack.clone(),
        lifetime: tuning.lifetime,
        half_size: Vec2::new(tuning.half_size.0, tuning.half_size.1),
        despawn_on_hit: tuning.despawn_on_hit,
        hit_entities: Vec::new(),
        serial: serial.next(),
    };

    let entity = commands
        .spawn((
            projectile,
            Transform::from_translation(position.extend(0.0)),
            Name::new("Projectile"),
        ))
        .id();
    (entity, position)
}
