//! Round lifecycle: spawning fighters, KO → restart countdown, reset,
//! and read-only snapshots for camera / health-bar consumers.
//!
//! The core only *signals* a restart (`RestartRequested`); resetting is up to
//! the harness unless `MatchConfig::auto_restart` is set.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::clock::SimClock;
use crate::combat::{AttackId, AttackState, FighterDefeated, Hitstop, Hurtbox, Projectile};
use crate::components::{CombatTimers, Facing, Fighter, Health, PhysicsBody};
use crate::config::{FighterSetup, MatchConfig};
use crate::{SimulationSet, SimulationStep};

// ============================================================================
// Restart countdown
// ============================================================================

/// Armed once per round on the first KO; counts down on scaled time.
#[derive(Resource, Debug, Clone, Default, Reflect)]
#[reflect(Resource)]
pub struct RestartCountdown {
    pub remaining: Option<f32>,
    /// Fired this round already
    pub requested: bool,
}

impl RestartCountdown {
    /// Starts the countdown. Returns `false` if it was already armed or fired.
    pub fn arm(&mut self, delay: f32) -> bool {
        if self.remaining.is_some() || self.requested {
            return false;
        }
        self.remaining = Some(delay.max(0.0));
        true
    }

    pub fn is_armed(&self) -> bool {
        self.remaining.is_some()
    }

    /// Returns `true` on the tick the countdown elapses.
    pub fn tick(&mut self, delta: f32) -> bool {
        let Some(remaining) = self.remaining.as_mut() else {
            return false;
        };
        *remaining -= delta.max(0.0);
        if *remaining > 0.0 {
            return false;
        }
        self.remaining = None;
        self.requested = true;
        true
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// The configured delay after a KO has passed; the round should restart.
#[derive(Event, Debug, Clone)]
pub struct RestartRequested {
    /// Delay that was waited (seconds)
    pub after: f32,
}

/// System: arm the countdown on the first KO of the round.
pub fn arm_restart_countdown(
    mut defeats: EventReader<FighterDefeated>,
    mut countdown: ResMut<RestartCountdown>,
    config: Res<MatchConfig>,
) {
    for defeat in defeats.read() {
        if countdown.arm(config.combat.restart_delay) {
            info!(
                "🏁 {:?} is down, restart in {:.1}s",
                defeat.fighter, config.combat.restart_delay
            );
        }
    }
}

/// System: count down and request the restart.
pub fn tick_restart_countdown(
    clock: Res<SimClock>,
    config: Res<MatchConfig>,
    mut countdown: ResMut<RestartCountdown>,
    mut requests: EventWriter<RestartRequested>,
    mut commands: Commands,
) {
    if !countdown.tick(clock.scaled) {
        return;
    }

    info!("🔁 restart requested");
    requests.write(RestartRequested {
        after: config.combat.restart_delay,
    });

    if config.auto_restart {
        commands.queue(reset_round);
    }
}

// ============================================================================
// Spawning
// ============================================================================

/// Spawns one fighter with a full-body hurtbox child.
pub fn spawn_fighter(commands: &mut Commands, index: u8, setup: &FighterSetup) -> Entity {
    let (x, y) = setup.spawn_position;
    commands
        .spawn((
            Fighter::new(index, setup.character_id),
            Health::new(setup.max_health),
            Transform::from_xyz(x, y, 0.0),
            Name::new(format!("Player {}", index + 1)),
        ))
        .with_child((Hurtbox::default(), Name::new("Hurtbox")))
        .id()
}

/// Spawns every fighter of the roster in order.
pub fn spawn_round(commands: &mut Commands, config: &MatchConfig) -> Vec<Entity> {
    config
        .roster
        .iter()
        .enumerate()
        .map(|(index, setup)| spawn_fighter(commands, index as u8, setup))
        .collect()
}

/// Spawns the roster straight into `world`.
pub fn start_round(world: &mut World) -> Vec<Entity> {
    let config = world.get_resource::<MatchConfig>().cloned().unwrap_or_default();
    let fighters = {
        let mut commands = world.commands();
        spawn_round(&mut commands, &config)
    };
    world.flush();
    info!("🥊 round started with {} fighters", fighters.len());
    fighters
}

/// Despawns fighters and projectiles, clears round state, respawns the roster.
pub fn reset_round(world: &mut World) {
    let mut doomed = world.query_filtered::<Entity, Or<(With<Fighter>, With<Projectile>)>>();
    let entities: Vec<Entity> = doomed.iter(world).collect();
    for entity in entities {
        world.despawn(entity);
    }

    if let Some(mut hitstop) = world.get_resource_mut::<Hitstop>() {
        hitstop.reset();
    }
    if let Some(mut clock) = world.get_resource_mut::<SimClock>() {
        clock.reset();
    }
    if let Some(mut countdown) = world.get_resource_mut::<RestartCountdown>() {
        countdown.reset();
    }

    start_round(world);
}

/// Startup system: first round, unless a harness already spawned fighters.
fn spawn_initial_round(
    mut commands: Commands,
    config: Res<MatchConfig>,
    existing: Query<(), With<Fighter>>,
) {
    if !existing.is_empty() {
        return;
    }
    if let Err(err) = config.validate() {
        warn!("match config is invalid ({err}); spawning anyway with clamped values");
    }
    spawn_round(&mut commands, &config);
}

// ============================================================================
// Snapshots
// ============================================================================

/// Public per-fighter state for UI / camera consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FighterSnapshot {
    pub index: u8,
    pub character_id: u32,
    pub position: (f32, f32),
    pub velocity: (f32, f32),
    pub health: f32,
    pub max_health: f32,
    /// Health bar fill in [0, 1]
    pub health_fraction: f32,
    pub facing: Facing,
    pub stunned: bool,
    pub attack: Option<AttackId>,
}

/// Snapshots of all fighters, ordered by player index.
pub fn fighter_snapshots(world: &mut World) -> Vec<FighterSnapshot> {
    let mut query = world.query::<(
        &Fighter,
        &Transform,
        &PhysicsBody,
        &Health,
        &CombatTimers,
        &AttackState,
    )>();

    let mut snapshots: Vec<FighterSnapshot> = query
        .iter(world)
        .map(|(fighter, transform, body, health, timers, attack)| FighterSnapshot {
            index: fighter.index,
            character_id: fighter.character_id,
            position: (transform.translation.x, transform.translation.y),
            velocity: (body.velocity.x, body.velocity.y),
            health: health.current,
            max_health: health.max,
            health_fraction: health.fraction(),
            facing: fighter.facing,
            stunned: timers.is_stunned(),
            attack: attack.current_id(),
        })
        .collect();
    snapshots.sort_by_key(|snapshot| snapshot.index);
    snapshots
}

pub struct RoundPlugin;

impl Plugin for RoundPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<RestartCountdown>()
            .add_event::<RestartRequested>()
            .register_type::<RestartCountdown>()
            .add_systems(Startup, spawn_initial_round)
            .add_systems(
                SimulationStep,
                (arm_restart_countdown, tick_restart_countdown)
                    .chain()
                    .in_set(SimulationSet::Aftermath),
            );
    }
}
