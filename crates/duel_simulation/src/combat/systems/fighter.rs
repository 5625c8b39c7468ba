//! Fighter step: input → facing/guard → dash → attacks → jump → velocity.
//!
//! Fighters update one after another in player order, so player 2 sees
//! player 1's state from the same tick. Melee hits of a fighter resolve
//! right after its own step.

use bevy::ecs::query::QueryData;
use bevy::math::bounding::Aabb2d;
use bevy::prelude::*;
use tracing::debug;

use crate::clock::SimClock;
use crate::combat::systems::dispatch::{build_hurtbox_index, deliver_hit};
use crate::combat::{
    knockback_direction, launch_projectile, AttackCatalog, AttackId, AttackState, ComboMemory,
    FighterDefeated, Guard, HitEvent, HitLanded, HitSource, Hitstop, Hurtbox, HurtboxIndex,
    ProjectileLaunched, ProjectileSerial, RootMotion,
};
use crate::components::{
    AnimationSignals, CombatTimers, Facing, Fighter, FighterIntent, Health, Locomotion,
    PhysicsBody,
};
use crate::config::MatchConfig;

/// Everything the fighter step reads and writes on one fighter.
#[derive(QueryData)]
#[query_data(mutable)]
pub struct FighterQuery {
    pub entity: Entity,
    pub fighter: &'static mut Fighter,
    pub transform: &'static mut Transform,
    pub body: &'static mut PhysicsBody,
    pub health: &'static mut Health,
    pub locomotion: &'static mut Locomotion,
    pub guard: &'static mut Guard,
    pub attack: &'static mut AttackState,
    pub timers: &'static mut CombatTimers,
    pub combo: &'static mut ComboMemory,
    pub intent: &'static mut FighterIntent,
}

/// Public state of the other fighter, read before this fighter steps.
#[derive(Debug, Clone, Copy)]
struct OpponentView {
    position: Vec2,
    stun_exits: u32,
}

/// Active melee instance to test against hurtboxes this tick.
#[derive(Debug, Clone, Copy)]
struct MeleeProbe {
    attack: AttackId,
    region: Aabb2d,
    origin: Vec2,
    facing: Facing,
}

/// Special attack ready to release its projectile.
#[derive(Debug, Clone, Copy)]
struct Launch {
    origin: Vec2,
    facing: Facing,
}

#[derive(Debug, Default)]
struct StepOutcome {
    probe: Option<MeleeProbe>,
    launch: Option<Launch>,
}

/// System: one tick of every fighter, in player order.
#[allow(clippy::too_many_arguments)]
pub fn step_fighters(
    clock: Res<SimClock>,
    config: Res<MatchConfig>,
    catalog: Res<AttackCatalog>,
    mut hitstop: ResMut<Hitstop>,
    mut serial: ResMut<ProjectileSerial>,
    mut fighters: Query<FighterQuery>,
    hurtboxes: Query<(Entity, &Hurtbox)>,
    parents: Query<&ChildOf>,
    mut commands: Commands,
    mut hits: EventWriter<HitLanded>,
    mut defeats: EventWriter<FighterDefeated>,
    mut launches: EventWriter<ProjectileLaunched>,
) {
    let mut order: Vec<(u8, Entity)> = fighters
        .iter()
        .map(|fighter| (fighter.fighter.index, fighter.entity))
        .collect();
    order.sort();

    // Positions only move in the physics set, so one index serves the whole phase
    let index = build_hurtbox_index(&fighters, &hurtboxes, &parents);

    for &(_, entity) in &order {
        let opponent = opponent_of(&fighters, entity, &order);

        let outcome = {
            let Ok(mut fighter) = fighters.get_mut(entity) else {
                continue;
            };
            advance_fighter(&mut fighter, opponent, &clock, &config, &catalog)
        };

        if let Some(launch) = outcome.launch {
            if let Some(special) = catalog.get(AttackId::Special) {
                let (projectile, position) = launch_projectile(
                    &mut commands,
                    &mut serial,
                    entity,
                    launch.origin,
                    launch.facing,
                    special,
                    &config.projectile,
                );
                debug!("🔥 {:?} launched projectile {:?}", entity, projectile);
                launches.write(ProjectileLaunched {
                    projectile,
                    owner: entity,
                    position,
                    direction: launch.facing.sign(),
                });
            }
        }

        if let Some(probe) = outcome.probe {
            resolve_melee(
                entity,
                probe,
                &index,
                &mut fighters,
                &catalog,
                &config,
                &mut hitstop,
                &mut hits,
                &mut defeats,
            );
        }
    }
}

fn opponent_of(
    fighters: &Query<FighterQuery>,
    me: Entity,
    order: &[(u8, Entity)],
) -> Option<OpponentView> {
    order
        .iter()
        .filter(|(_, entity)| *entity != me)
        .find_map(|(_, entity)| fighters.get(*entity).ok())
        .map(|other| OpponentView {
            position: other.transform.translation.truncate(),
            stun_exits: other.timers.stun_exits,
        })
}

/// Steps 1-12 of the fighter tick except hit resolution.
fn advance_fighter(
    f: &mut FighterQueryItem<'_>,
    opponent: Option<OpponentView>,
    clock: &SimClock,
    config: &MatchConfig,
    catalog: &AttackCatalog,
) -> StepOutcome {
    let tuning = &config.fighter;
    let scaled = clock.scaled;
    let player = f.fighter.index + 1;
    let mut outcome = StepOutcome::default();

    // Unscaled timers: freeze and flashes
    f.timers.tick_unscaled(clock.unscaled);

    if f.timers.tick_stun(scaled) {
        debug!("💫 P{} recovered from stun", player);
    }

    // Observed every tick so the clear lands on the tick after the exit
    if let Some(opponent) = opponent {
        if f.combo.observe_opponent(opponent.stun_exits) {
            debug!("🔄 P{} combo memory cleared", player);
        }
    }

    let position = f.transform.translation.truncate();

    if f.timers.is_stunned() || !f.health.is_alive() {
        hold_incapacitated(f, position, config);
        return outcome;
    }

    // Facing
    let axis = f.intent.sanitized_axis();
    if axis.x != 0.0 {
        f.locomotion.last_horizontal = axis.x;
    }
    let facing = match opponent {
        Some(opponent) => Facing::from_direction(opponent.position.x - position.x),
        None => Facing::from_direction(f.locomotion.last_horizontal),
    }
    .unwrap_or(f.fighter.facing);
    f.fighter.facing = facing;

    // Crouch and guard
    let crouching = axis.y < -tuning.crouch_threshold;
    let holding_back = axis.x * facing.sign() < -tuning.back_threshold;
    f.locomotion.crouching = crouching;
    *f.guard = Guard::from_input(holding_back, crouching);
    let horizontal = if crouching { 0.0 } else { axis.x };

    // Dash
    if f.locomotion.dash.tick(scaled) {
        debug!("P{} dash finished", player);
    }
    if f.locomotion.dash.observe(
        horizontal,
        scaled,
        tuning.tap_threshold,
        tuning.double_tap_window,
        tuning.dash_duration,
    ) {
        debug!("💨 P{} dash ({:+})", player, horizontal.signum());
    }

    // Attack instance expiry, then trigger resolution
    if let Some(finished) = f.attack.advance(scaled) {
        debug!("P{} {:?} finished", player, finished);
    }

    let grounded = f.locomotion.grounded;
    if let Some(requested) = requested_attack(&f.intent, grounded, crouching) {
        try_start_attack(f, requested, grounded, catalog);
    }

    if let Some(active) = f.attack.current.as_mut() {
        if active.id == AttackId::Special
            && !active.projectile_spawned
            && active.elapsed >= config.projectile.spawn_time
        {
            active.projectile_spawned = true;
            outcome.launch = Some(Launch {
                origin: position,
                facing,
            });
        }

        if let Some(region) = catalog.get(active.id).and_then(|d| d.hit_region) {
            outcome.probe = Some(MeleeProbe {
                attack: active.id,
                region: region.world_aabb(position, facing),
                origin: position,
                facing,
            });
        }
    }

    // Jump
    let jump_locked = f.attack.current_id().is_some_and(AttackId::locks_jump);
    if f.intent.jump && grounded && !jump_locked {
        f.body.velocity.y = tuning.jump_velocity;
        f.locomotion.grounded = false;
        debug!("⬆️ P{} jump", player);
    }

    // Horizontal velocity
    match f.attack.current_id().map(AttackId::root_motion) {
        Some(RootMotion::Keep) => {}
        Some(RootMotion::Planted) => f.body.velocity.x = 0.0,
        None => {
            let mut speed = match f.locomotion.dash.active {
                Some(dash) => dash.direction * tuning.walk_speed * tuning.dash_multiplier,
                None => horizontal * tuning.walk_speed,
            };
            if speed * facing.sign() < 0.0 {
                speed *= tuning.backward_speed_factor;
            }
            f.body.velocity.x = speed;
        }
    }

    // Vertical shaping on top of base gravity
    if f.locomotion.is_dashing() {
        f.body.gravity_scale = 0.0;
        f.body.velocity.y = 0.0;
    } else {
        f.body.gravity_scale = 1.0;
        let gravity = config.arena.gravity;
        let vertical = f.body.velocity.y;
        if vertical < 0.0 {
            f.body.velocity.y += gravity * (tuning.fall_multiplier - 1.0) * scaled;
        } else if vertical > 0.0 && !f.intent.jump_held {
            f.body.velocity.y += gravity * (tuning.low_jump_multiplier - 1.0) * scaled;
        }
    }

    // Ground latch / grounded
    let vertical = f.body.velocity.y;
    f.locomotion
        .update_grounding(position.y, vertical, tuning.settle_epsilon, tuning.ground_epsilon);

    f.intent.consume_triggers();
    outcome
}

/// Stunned or defeated: no input, no guard, base gravity only.
fn hold_incapacitated(f: &mut FighterQueryItem<'_>, position: Vec2, config: &MatchConfig) {
    *f.guard = Guard::None;
    f.attack.cancel();
    f.locomotion.dash.active = None;
    f.body.gravity_scale = 1.0;

    let vertical = f.body.velocity.y;
    f.locomotion.update_grounding(
        position.y,
        vertical,
        config.fighter.settle_epsilon,
        config.fighter.ground_epsilon,
    );
    f.intent.consume_triggers();
}

/// First pressed trigger in priority order, mapped to the move it asks for.
fn requested_attack(intent: &FighterIntent, grounded: bool, crouching: bool) -> Option<AttackId> {
    if intent.attack {
        return Some(match (grounded, crouching) {
            (false, _) => AttackId::AirKick,
            (true, true) => AttackId::Low,
            (true, false) => AttackId::Punch,
        });
    }
    if intent.heavy_attack {
        return Some(if grounded && crouching {
            AttackId::LowKick
        } else {
            AttackId::HeavyPunch
        });
    }
    if intent.special_attack {
        return Some(AttackId::Special);
    }
    None
}

fn try_start_attack(
    f: &mut FighterQueryItem<'_>,
    id: AttackId,
    grounded: bool,
    catalog: &AttackCatalog,
) -> bool {
    let player = f.fighter.index + 1;

    if f.attack.is_active() {
        return false;
    }
    if !id.stance().allows(grounded) {
        return false;
    }
    if !f.combo.allows(id) {
        debug!("🚫 P{} {:?} already landed this combo", player, id);
        return false;
    }
    let Some(definition) = catalog.get(id) else {
        debug!("P{} {:?} is disabled (no definition)", player, id);
        return false;
    };

    f.attack.start(id, definition.duration);
    debug!("⚔️ P{} starts {:?}", player, id);
    true
}

#[allow(clippy::too_many_arguments)]
fn resolve_melee(
    attacker_entity: Entity,
    probe: MeleeProbe,
    index: &HurtboxIndex,
    fighters: &mut Query<FighterQuery>,
    catalog: &AttackCatalog,
    config: &MatchConfig,
    hitstop: &mut Hitstop,
    hits: &mut EventWriter<HitLanded>,
    defeats: &mut EventWriter<FighterDefeated>,
) {
    let Some(definition) = catalog.get(probe.attack) else {
        return;
    };

    let targets: Vec<Entity> = index
        .overlapping(&probe.region, attacker_entity)
        .map(|entry| entry.owner)
        .collect();

    for target in targets {
        let Ok([mut attacker, mut defender]) = fighters.get_many_mut([attacker_entity, target])
        else {
            continue;
        };
        if !attacker.attack.record_hit(target) {
            continue;
        }

        let direction = knockback_direction(
            probe.origin,
            defender.transform.translation.truncate(),
            probe.facing.sign(),
        );
        let event = HitEvent::from_definition(attacker_entity, definition, direction, HitSource::Melee);

        let reaction = deliver_hit(&mut defender, &event, &config.combat, hitstop, hits, defeats);
        if !reaction.blocked {
            attacker.combo.remember(definition.id);
        }
        attacker.timers.refresh_freeze(event.hitstop_duration);
    }
}

/// System: rewrite presentation signals from the settled state.
pub fn publish_animation_signals(
    mut fighters: Query<(
        &Locomotion,
        &PhysicsBody,
        &AttackState,
        &CombatTimers,
        &Health,
        &mut AnimationSignals,
    )>,
) {
    for (locomotion, body, attack, timers, health, mut signals) in &mut fighters {
        let dashing = locomotion.is_dashing();
        signals.set_if_neq(AnimationSignals {
            walking: locomotion.grounded
                && !dashing
                && !attack.is_active()
                && body.velocity.x.abs() > f32::EPSILON,
            jumping: !locomotion.grounded && !dashing,
            crouching: locomotion.crouching,
            dashing,
            stunned: timers.is_stunned(),
            attack: attack.current_id(),
            blocked: timers.block_flash > 0.0,
            hit_flash: timers.hit_flash > 0.0,
            frozen: timers.is_frozen(),
            defeated: !health.is_alive(),
        });
    }
}
