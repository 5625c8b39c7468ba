//! Combat rules: attack catalog, hit query, hitstop, hit resolution,
//! combo memory, projectiles.
//!
//! Per tick (inside `SimulationStep`):
//! 1. `step_fighters`: player 1 then player 2: input, movement, attacks;
//!    each fighter's melee hits resolve right after its own step
//! 2. `step_projectiles`: same hit query and dispatch, owner excluded
//! 3. `publish_animation_signals`: presentation flags from settled state

use bevy::prelude::*;
use tracing::warn;

pub mod catalog;
pub mod components;
pub mod damage;
pub mod hitbox;
pub mod hitstop;
pub mod projectile;
pub mod systems;

pub use catalog::*;
pub use components::*;
pub use damage::*;
pub use hitbox::*;
pub use hitstop::*;
pub use projectile::*;
pub use systems::{publish_animation_signals, step_fighters, step_projectiles, FighterQuery};

use crate::config::MatchConfig;
use crate::{SimulationSet, SimulationStep};

/// Combat Plugin
///
/// Expects `MatchConfig` to be present (added by `SimulationPlugin`).
/// Inserts the standard catalog unless one was provided up front.
pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        let slowed_scale = app
            .world()
            .get_resource::<MatchConfig>()
            .map(|config| config.combat.hitstop_time_scale)
            .unwrap_or(0.05);

        let catalog = app
            .world_mut()
            .remove_resource::<AttackCatalog>()
            .unwrap_or_else(AttackCatalog::standard);
        let missing = catalog.missing();
        if !missing.is_empty() {
            warn!("attacks without definition are disabled: {:?}", missing);
        }

        app.insert_resource(catalog)
            .insert_resource(Hitstop::new(slowed_scale))
            .init_resource::<ProjectileSerial>()
            .add_event::<HitLanded>()
            .add_event::<FighterDefeated>()
            .add_event::<ProjectileLaunched>()
            .register_type::<AttackState>()
            .register_type::<ComboMemory>()
            .register_type::<Guard>()
            .register_type::<Hurtbox>()
            .register_type::<Projectile>()
            .register_type::<Hitstop>();

        app.add_systems(
            SimulationStep,
            (
                step_fighters.in_set(SimulationSet::Fighters),
                step_projectiles.in_set(SimulationSet::Projectiles),
                publish_animation_signals.in_set(SimulationSet::Aftermath),
            ),
        );
    }
}
