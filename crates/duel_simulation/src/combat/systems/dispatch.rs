//! Shared hit dispatch for melee and projectile hits.

use bevy::prelude::*;
use tracing::{debug, info};

use crate::combat::systems::fighter::{FighterQuery, FighterQueryItem};
use crate::combat::{
    receive_hit, Defender, FighterDefeated, Guard, HitEvent, HitLanded, HitReaction, Hitstop,
    Hurtbox, HurtboxIndex,
};
use crate::config::CombatTuning;

/// Hurtbox snapshot for the current fighter positions.
pub fn build_hurtbox_index(
    fighters: &Query<FighterQuery>,
    hurtboxes: &Query<(Entity, &Hurtbox)>,
    parents: &Query<&ChildOf>,
) -> HurtboxIndex {
    HurtboxIndex::build(
        hurtboxes.iter().map(|(entity, hurtbox)| (entity, *hurtbox)),
        |entity| parents.get(entity).ok().map(ChildOf::parent),
        |entity| {
            fighters
                .get(entity)
                .ok()
                .map(|f| (f.transform.translation.truncate(), f.fighter.facing))
        },
    )
}

/// Applies one hit to `defender`, freezes it, starts hitstop and reports.
pub fn deliver_hit(
    defender: &mut FighterQueryItem<'_>,
    event: &HitEvent,
    tuning: &CombatTuning,
    hitstop: &mut Hitstop,
    hits: &mut EventWriter<HitLanded>,
    defeats: &mut EventWriter<FighterDefeated>,
) -> HitReaction {
    let reaction = receive_hit(
        Defender {
            health: &mut defender.health,
            velocity: &mut defender.body.velocity,
            timers: &mut defender.timers,
            attack: &mut defender.attack,
            locomotion: &mut defender.locomotion,
            guard: *defender.guard,
        },
        event,
        tuning,
    );

    // Stunned fighters cannot hold a block
    if defender.timers.is_stunned() {
        *defender.guard = Guard::None;
    }

    defender.timers.refresh_freeze(event.hitstop_duration);
    hitstop.activate(event.hitstop_duration);

    let player = defender.fighter.index + 1;
    debug!(
        "💥 {:?} hits P{} ({}): -{:.1} HP → {:.1}",
        event.attack,
        player,
        if reaction.blocked { "blocked" } else { "clean" },
        reaction.damage_dealt,
        defender.health.current,
    );

    hits.write(HitLanded {
        attacker: event.attacker,
        defender: defender.entity,
        attack: event.attack,
        source: event.source,
        damage: reaction.damage_dealt,
        blocked: reaction.blocked,
        defender_health: defender.health.current,
    });

    if reaction.defeated {
        info!("💀 P{} defeated by {:?}", player, event.attack);
        defeats.write(FighterDefeated {
            fighter: defender.entity,
            killer: Some(event.attacker),
        });
    }

    reaction
}
