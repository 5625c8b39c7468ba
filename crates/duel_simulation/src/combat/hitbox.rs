//! Hurtboxes and the overlap query used by melee and projectile hits.

use bevy::math::bounding::{Aabb2d, IntersectsVolume};
use bevy::prelude::*;
use tracing::debug;

use crate::components::Facing;

/// Region a fighter can be struck in, relative to the owning fighter.
///
/// May sit on the fighter itself or on any descendant (`ChildOf` chain).
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Hurtbox {
    pub offset: Vec2,
    pub half_size: Vec2,
}

impl Default for Hurtbox {
    /// Full-body box for a fighter whose origin is at the feet.
    fn default() -> Self {
        Self {
            offset: Vec2::new(0.0, 0.9),
            half_size: Vec2::new(0.4, 0.9),
        }
    }
}

impl Hurtbox {
    pub fn world_aabb(&self, origin: Vec2, facing: Facing) -> Aabb2d {
        let center = origin + Vec2::new(self.offset.x * facing.sign(), self.offset.y);
        Aabb2d::new(center, self.half_size.abs())
    }
}

/// Hurtbox resolved to the fighter that takes the hit.
#[derive(Debug, Clone)]
pub struct HurtboxEntry {
    pub hurtbox: Entity,
    pub owner: Entity,
    /// Hurtbox entity and every ancestor up to the owner
    pub lineage: Vec<Entity>,
    pub bounds: Aabb2d,
}

/// Snapshot of every resolvable hurtbox for one query phase.
#[derive(Debug, Default)]
pub struct HurtboxIndex {
    entries: Vec<HurtboxEntry>,
}

impl HurtboxIndex {
    /// Resolves each hurtbox to its nearest fighter ancestor (itself included).
    ///
    /// `parent_of` walks the hierarchy; `fighter_at` answers the position and
    /// facing of an entity that can receive hits and `None` for anything else.
    /// Hurtboxes without such an owner are skipped.
    pub fn build(
        hurtboxes: impl IntoIterator<Item = (Entity, Hurtbox)>,
        parent_of: impl Fn(Entity) -> Option<Entity>,
        fighter_at: impl Fn(Entity) -> Option<(Vec2, Facing)>,
    ) -> Self {
        let mut entries = Vec::new();

        for (hurtbox_entity, hurtbox) in hurtboxes {
            let mut lineage = vec![hurtbox_entity];
            let mut current = hurtbox_entity;

            let resolved = loop {
                if let Some(pose) = fighter_at(current) {
                    break Some((current, pose));
                }
                match parent_of(current) {
                    // Guard against malformed cycles
                    Some(parent) if !lineage.contains(&parent) => {
                        lineage.push(parent);
                        current = parent;
                    }
                    _ => break None,
                }
            };

            let Some((owner, (origin, facing))) = resolved else {
                debug!("hurtbox {:?} has no fighter owner, skipped", hurtbox_entity);
                continue;
            };

            entries.push(HurtboxEntry {
                hurtbox: hurtbox_entity,
                owner,
                lineage,
                bounds: hurtbox.world_aabb(origin, facing),
            });
        }

        entries.sort_by_key(|entry| entry.hurtbox);
        Self { entries }
    }

    /// Hurtboxes overlapping `region`, skipping those belonging to `exclude`
    /// (the entity itself or anything below it).
    pub fn overlapping<'a>(
        &'a self,
        region: &'a Aabb2d,
        exclude: Entity,
    ) -> impl Iterator<Item = &'a HurtboxEntry> + 'a {
        self.entries.iter().filter(move |entry| {
            !entry.lineage.contains(&exclude) && region.intersects(&entry.bounds)
        })
    }
}
