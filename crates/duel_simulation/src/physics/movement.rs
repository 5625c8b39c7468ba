//! Kinematic body integration (stand-in for the game's physics service)

use bevy::prelude::*;

use crate::clock::SimClock;
use crate::components::PhysicsBody;
use crate::config::{ArenaConfig, MatchConfig};

/// System: gravity + velocity → Transform, clamped to the arena.
///
/// Runs after all gameplay sets with the scaled delta, so hitstop slows
/// bodies down together with everything else.
pub fn integrate_bodies(
    clock: Res<SimClock>,
    config: Res<MatchConfig>,
    mut bodies: Query<(&mut PhysicsBody, &mut Transform)>,
) {
    let delta = clock.scaled;
    if delta <= 0.0 {
        return;
    }

    for (mut body, mut transform) in bodies.iter_mut() {
        integrate_body(&mut body, &mut transform, &config.arena, delta);
    }
}

/// One integration step for a single body.
pub fn integrate_body(body: &mut PhysicsBody, transform: &mut Transform, arena: &ArenaConfig, delta: f32) {
    body.velocity.y += arena.gravity * body.gravity_scale * delta;
    transform.translation += (body.velocity * delta).extend(0.0);

    // Floor
    if transform.translation.y <= arena.floor_height {
        transform.translation.y = arena.floor_height;
        if body.velocity.y < 0.0 {
            body.velocity.y = 0.0;
        }
    }

    // Stage walls
    let half_width = arena.stage_half_width;
    if transform.translation.x.abs() > half_width {
        transform.translation.x = transform.translation.x.clamp(-half_width, half_width);
        if body.velocity.x * transform.translation.x.signum() > 0.0 {
            body.velocity.x = 0.0;
        }
    }
}
