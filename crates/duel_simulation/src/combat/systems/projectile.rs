//! Projectile flight and hits.

use bevy::prelude::*;
use tracing::debug;

use crate::clock::SimClock;
use crate::combat::systems::dispatch::{build_hurtbox_index, deliver_hit};
use crate::combat::systems::fighter::FighterQuery;
use crate::combat::{FighterDefeated, HitEvent, HitLanded, HitSource, Hitstop, Hurtbox, Projectile};
use crate::components::Fighter;
use crate::config::MatchConfig;

/// System: move every projectile, resolve its hits, expire it.
///
/// Runs after all fighters, in launch order. Owners are never struck by
/// their own projectile and there is no combo-memory interaction.
#[allow(clippy::too_many_arguments)]
pub fn step_projectiles(
    clock: Res<SimClock>,
    config: Res<MatchConfig>,
    mut hitstop: ResMut<Hitstop>,
    mut projectiles: Query<(Entity, &mut Projectile, &mut Transform), Without<Fighter>>,
    mut fighters: Query<FighterQuery>,
    hurtboxes: Query<(Entity, &Hurtbox)>,
    parents: Query<&ChildOf>,
    mut commands: Commands,
    mut hits: EventWriter<HitLanded>,
    mut defeats: EventWriter<FighterDefeated>,
) {
    if projectiles.is_empty() {
        return;
    }

    let index = build_hurtbox_index(&fighters, &hurtboxes, &parents);

    let mut order: Vec<(u64, Entity)> = projectiles
        .iter()
        .map(|(entity, projectile, _)| (projectile.serial, entity))
        .collect();
    order.sort();

    for (_, entity) in order {
        let Ok((_, mut projectile, mut transform)) = projectiles.get_mut(entity) else {
            continue;
        };

        let travel = projectile.velocity() * clock.scaled;
        transform.translation += travel.extend(0.0);

        let region = projectile.bounds(transform.translation.truncate());
        let targets: Vec<Entity> = index
            .overlapping(&region, projectile.owner)
            .map(|entry| entry.owner)
            .collect();

        let mut consumed = false;
        for target in targets {
            if !projectile.record_hit(target) {
                continue;
            }
            let Ok(mut defender) = fighters.get_mut(target) else {
                continue;
            };

            let event = HitEvent::from_definition(
                projectile.owner,
                &projectile.attack,
                Vec2::new(projectile.direction, 0.0),
                HitSource::Projectile(entity),
            );
            deliver_hit(&mut defender, &event, &config.combat, &mut hitstop, &mut hits, &mut defeats);

            if projectile.despawn_on_hit {
                consumed = true;
                break;
            }
        }

        if consumed {
            debug!("projectile {:?} spent on hit", entity);
            commands.entity(entity).despawn();
        } else if projectile.tick_lifetime(clock.scaled) {
            debug!("projectile {:?} expired", entity);
            commands.entity(entity).despawn();
        }
    }
}
