//! Hit resolution: typed hit events and the defender's reaction.
//!
//! `receive_hit` is the only place health, stun and knockback of a struck
//! fighter change. Melee and projectile hits both end up here.

use bevy::prelude::*;

use crate::combat::{AttackDefinition, AttackId, AttackState, Guard, HeightClass};
use crate::components::{CombatTimers, Health, Locomotion};
use crate::config::CombatTuning;

// ============================================================================
// Hit data
// ============================================================================

/// What delivered the hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum HitSource {
    Melee,
    Projectile(Entity),
}

/// Knockback: unit direction plus horizontal and vertical magnitudes.
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct Knockback {
    pub direction: Vec2,
    pub force: f32,
    pub upward: f32,
}

/// A single hit delivered to one defender. Transient.
#[derive(Debug, Clone, PartialEq, Reflect)]
pub struct HitEvent {
    pub attacker: Entity,
    pub attack: AttackId,
    pub damage: f32,
    pub knockback: Knockback,
    pub stun_duration: f32,
    pub hitstop_duration: f32,
    pub height: HeightClass,
    pub source: HitSource,
}

impl HitEvent {
    pub fn from_definition(
        attacker: Entity,
        definition: &AttackDefinition,
        direction: Vec2,
        source: HitSource,
    ) -> Self {
        Self {
            attacker,
            attack: definition.id,
            damage: definition.damage,
            knockback: Knockback {
                direction,
                force: definition.knockback_force,
                upward: definition.knockback_upward,
            },
            stun_duration: definition.stun_duration,
            hitstop_duration: definition.hitstop_duration,
            height: definition.height,
            source,
        }
    }
}

/// Unit vector from `from` to `to`; falls back to `fallback_x` along x when
/// the two points coincide.
pub fn knockback_direction(from: Vec2, to: Vec2, fallback_x: f32) -> Vec2 {
    (to - from).try_normalize().unwrap_or(Vec2::new(fallback_x.signum(), 0.0))
}

// ============================================================================
// Events
// ============================================================================

/// A hit connected (blocked or not).
#[derive(Event, Debug, Clone)]
pub struct HitLanded {
    pub attacker: Entity,
    pub defender: Entity,
    pub attack: AttackId,
    pub source: HitSource,
    /// Damage actually removed from health
    pub damage: f32,
    pub blocked: bool,
    pub defender_health: f32,
}

/// A fighter's health reached zero.
#[derive(Event, Debug, Clone)]
pub struct FighterDefeated {
    pub fighter: Entity,
    pub killer: Option<Entity>,
}

// ============================================================================
// Defender reaction
// ============================================================================

/// Mutable view of the struck fighter.
pub struct Defender<'a> {
    pub health: &'a mut Health,
    pub velocity: &'a mut Vec2,
    pub timers: &'a mut CombatTimers,
    pub attack: &'a mut AttackState,
    pub locomotion: &'a mut Locomotion,
    pub guard: Guard,
}

/// Outcome of one hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitReaction {
    pub blocked: bool,
    pub damage_dealt: f32,
    /// Health went from > 0 to 0 with this hit
    pub defeated: bool,
    /// The hit knocked the defender out of whatever it was doing
    pub interrupted: bool,
}

/// Applies `event` to the defender.
///
/// Blocked: reduced damage and horizontal-only pushback, no stun.
/// Unblocked: full damage, stun per the stun policy, full knockback; a
/// defender who was not already stunned drops its attack, dash and crouch.
pub fn receive_hit(defender: Defender, event: &HitEvent, tuning: &CombatTuning) -> HitReaction {
    let was_alive = defender.health.is_alive();
    let knockback = event.knockback;

    if defender.guard.defeats(event.height) {
        let damage_dealt = defender
            .health
            .take_damage(event.damage * tuning.block_damage_ratio);
        defender.velocity.x = knockback.direction.x * knockback.force * tuning.block_knockback_ratio;
        defender.timers.block_flash = tuning.block_flash_duration;

        return HitReaction {
            blocked: true,
            damage_dealt,
            defeated: was_alive && !defender.health.is_alive(),
            interrupted: false,
        };
    }

    let already_stunned = defender.timers.is_stunned();
    let damage_dealt = defender.health.take_damage(event.damage);

    let stun = tuning
        .stun_policy
        .combine(defender.timers.stun, event.stun_duration);
    defender.timers.set_stun(stun);
    *defender.velocity = Vec2::new(knockback.direction.x * knockback.force, knockback.upward);
    defender.timers.hit_flash = tuning.hit_flash_duration;

    let interrupted = !already_stunned;
    if interrupted {
        defender.attack.cancel();
        defender.locomotion.return_to_neutral();
    }

    HitReaction {
        blocked: false,
        damage_dealt,
        defeated: was_alive && !defender.health.is_alive(),
        interrupted,
    }
}
