//! Two-fighter harness for system tests.

use bevy::ecs::event::Event;
use bevy::prelude::*;

use crate::combat::{AttackCatalog, AttackDefinition, AttackId};
use crate::components::FighterIntent;
use crate::config::MatchConfig;
use crate::{start_round, step_simulation, SimulationPlugin};

pub const DT: f32 = 1.0 / 64.0;

pub struct Duel {
    pub app: App,
    pub p1: Entity,
    pub p2: Entity,
}

impl Duel {
    pub fn new(config: MatchConfig, catalog: AttackCatalog) -> Self {
        let mut app = App::new();
        app.insert_resource(config)
            .insert_resource(catalog)
            .add_plugins(SimulationPlugin);

        let fighters = start_round(app.world_mut());
        let mut duel = Self {
            app,
            p1: fighters[0],
            p2: fighters[1],
        };
        // Ground latch needs one settled tick
        duel.ticks(2);
        duel
    }

    /// Fighters 0.8 apart: every standing melee move connects.
    pub fn close() -> Self {
        Self::new(config_at(-0.4, 0.4), AttackCatalog::standard())
    }

    pub fn world(&mut self) -> &mut World {
        self.app.world_mut()
    }

    pub fn tick(&mut self) {
        step_simulation(self.app.world_mut(), DT);
    }

    pub fn ticks(&mut self, count: usize) {
        for _ in 0..count {
            self.tick();
        }
    }

    pub fn get<T: Component>(&self, entity: Entity) -> &T {
        self.app.world().get::<T>(entity).unwrap()
    }

    pub fn get_mut<T: Component<Mutability = bevy::ecs::component::Mutable>>(
        &mut self,
        entity: Entity,
    ) -> Mut<'_, T> {
        self.app.world_mut().get_mut::<T>(entity).unwrap()
    }

    pub fn intent(&mut self, entity: Entity) -> Mut<'_, FighterIntent> {
        self.get_mut::<FighterIntent>(entity)
    }

    pub fn position(&self, entity: Entity) -> Vec2 {
        self.get::<Transform>(entity).translation.truncate()
    }

    pub fn drain<E: Event + Clone>(&mut self) -> Vec<E> {
        self.world().resource_mut::<Events<E>>().drain().collect()
    }
}

pub fn config_at(p1_x: f32, p2_x: f32) -> MatchConfig {
    let mut config = MatchConfig::default();
    config.roster[0].spawn_position = (p1_x, 0.0);
    config.roster[1].spawn_position = (p2_x, 0.0);
    config
}

/// Standard catalog with one move overridden.
pub fn catalog_with(id: AttackId, edit: impl FnOnce(&mut AttackDefinition)) -> AttackCatalog {
    let mut catalog = AttackCatalog::standard();
    let mut definition = catalog.get(id).cloned().unwrap();
    edit(&mut definition);
    catalog.set(definition).unwrap();
    catalog
}

/// Punch tuned to 10 damage, 0.5 s stun, knockback (1, 2).
pub fn scenario_punch() -> AttackCatalog {
    catalog_with(AttackId::Punch, |punch| {
        punch.damage = 10.0;
        punch.stun_duration = 0.5;
        punch.knockback_force = 1.0;
        punch.knockback_upward = 2.0;
        punch.hitstop_duration = 0.05;
    })
}
