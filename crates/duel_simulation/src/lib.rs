//! Duel Simulation Core
//!
//! Deterministic combat simulation of a two-player fighting game on Bevy 0.16 ECS:
//! movement, attacks, hit detection, damage, knockback, stun, blocking,
//! hitstop, combo restriction and projectiles.
//!
//! The core consumes per-tick intents (`FighterIntent`) and produces state
//! (`AnimationSignals`, `FighterSnapshot`, events). Rendering, audio, input
//! devices and character select live outside and talk to it through that data.
//!
//! One tick = one run of the [`SimulationStep`] schedule:
//! `Clock → Fighters → Projectiles → Physics → Aftermath`.

use std::time::Duration;

use bevy::ecs::schedule::{ExecutorKind, ScheduleLabel};
use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

pub mod bot;
pub mod clock;
pub mod combat;
pub mod components;
pub mod config;
pub mod logger;
pub mod physics;
pub mod round;

pub use clock::{advance_clock, SimClock};
pub use combat::{
    AttackCatalog, AttackDefinition, AttackId, CombatPlugin, FighterDefeated, HeightClass,
    HitLanded, Hitstop, Hurtbox, Projectile, ProjectileLaunched,
};
pub use components::*;
pub use config::{ConfigError, MatchConfig, StunPolicy};
pub use logger::init_logger;
pub use physics::PhysicsPlugin;
pub use round::{
    fighter_snapshots, reset_round, start_round, FighterSnapshot, RestartRequested, RoundPlugin,
};

/// Simulation tick rate (FixedUpdate)
pub const TICK_HZ: f64 = 64.0;

/// Schedule running exactly one simulation tick.
#[derive(ScheduleLabel, Debug, Clone, PartialEq, Eq, Hash)]
pub struct SimulationStep;

/// Phases of a tick, chained in this order.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimulationSet {
    /// Hitstop countdown, scaled/unscaled deltas
    Clock,
    /// Player 1, then player 2 (with their melee hits)
    Fighters,
    /// Projectiles in launch order
    Projectiles,
    /// Body integration
    Physics,
    /// Presentation signals, KO/restart bookkeeping
    Aftermath,
}

/// Main simulation plugin
///
/// Insert a `MatchConfig` (and optionally an `AttackCatalog`) before adding
/// it to override the defaults.
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        let mut schedule = Schedule::new(SimulationStep);
        // Fixed system order inside a tick, no parallel reordering
        schedule.set_executor_kind(ExecutorKind::SingleThreaded);
        schedule.configure_sets(
            (
                SimulationSet::Clock,
                SimulationSet::Fighters,
                SimulationSet::Projectiles,
                SimulationSet::Physics,
                SimulationSet::Aftermath,
            )
                .chain(),
        );

        app.add_schedule(schedule)
            .init_resource::<MatchConfig>()
            .init_resource::<SimClock>()
            .register_type::<MatchConfig>()
            .register_type::<SimClock>()
            .register_type::<Fighter>()
            .register_type::<Health>()
            .register_type::<FighterIntent>()
            .register_type::<Locomotion>()
            .register_type::<CombatTimers>()
            .register_type::<AnimationSignals>()
            .add_systems(SimulationStep, advance_clock.in_set(SimulationSet::Clock))
            .add_plugins((CombatPlugin, PhysicsPlugin, RoundPlugin))
            .add_systems(FixedUpdate, run_simulation_step);
    }
}

/// Runs one tick with an explicit unscaled delta (seconds).
pub fn step_simulation(world: &mut World, delta: f32) {
    world.resource_mut::<SimClock>().prepare(delta);
    world.run_schedule(SimulationStep);
}

/// System: drives [`SimulationStep`] from `FixedUpdate`.
pub fn run_simulation_step(world: &mut World) {
    let delta = world.resource::<Time<Fixed>>().delta_secs();
    step_simulation(world, delta);
}

/// Deterministic RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Minimal Bevy app for headless simulation.
///
/// Every `app.update()` advances virtual time by exactly one fixed period,
/// so each update runs exactly one simulation tick.
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(DeterministicRng::new(seed))
        .insert_resource(Time::<Fixed>::from_hz(TICK_HZ))
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(
            1.0 / TICK_HZ,
        )));

    app
}
