//! Match configuration.
//!
//! One [`MatchConfig`] is built per match (character select → round start)
//! and inserted as a resource. Nothing here is global across matches: the
//! harness passes a fresh config every time it starts a round.
//!
//! Tuning numbers default to the values the game shipped with; a RON file can
//! override any subset of them (`#[serde(default)]` everywhere).

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Errors
// ============================================================================

/// Configuration problems detected at setup time.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse match config: {0}")]
    Parse(#[from] ron::error::SpannedError),

    #[error("`{field}` must be a finite value >= 0 (got {value})")]
    Negative { field: &'static str, value: f32 },

    #[error("`{field}` must be inside [0, 1] (got {value})")]
    NotARatio { field: &'static str, value: f32 },

    #[error("roster needs at least two fighters (got {0})")]
    RosterTooSmall(usize),

    #[error("fighter {index} has max_health {value}; must be > 0")]
    InvalidMaxHealth { index: usize, value: f32 },
}

// ============================================================================
// Stun stacking policy
// ============================================================================

/// How a new stun combines with a stun that is still running.
///
/// Hitstop always refreshes; stun historically stacked. Both behaviours are
/// legitimate design choices, so this stays configurable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Reflect)]
pub enum StunPolicy {
    /// remaining += new (combo extension)
    #[default]
    Stack,
    /// remaining = new
    Refresh,
    /// remaining = max(remaining, new)
    Longest,
}

impl StunPolicy {
    pub fn combine(self, remaining: f32, incoming: f32) -> f32 {
        let incoming = incoming.max(0.0);
        let remaining = remaining.max(0.0);
        match self {
            StunPolicy::Stack => remaining + incoming,
            StunPolicy::Refresh => incoming,
            StunPolicy::Longest => remaining.max(incoming),
        }
    }
}

// ============================================================================
// Tuning blocks
// ============================================================================

/// Movement tuning shared by both fighters.
#[derive(Debug, Clone, Serialize, Deserialize, Reflect)]
#[serde(default)]
pub struct FighterTuning {
    /// Walk speed (units/sec)
    pub walk_speed: f32,
    /// Speed multiplier while dashing
    pub dash_multiplier: f32,
    /// Dash length (seconds)
    pub dash_duration: f32,
    /// Max gap between two taps of a double-tap (seconds)
    pub double_tap_window: f32,
    /// Vertical velocity set by a jump
    pub jump_velocity: f32,
    /// Gravity multiplier while falling
    pub fall_multiplier: f32,
    /// Gravity multiplier while rising with jump released
    pub low_jump_multiplier: f32,
    /// Speed factor when walking away from the opponent
    pub backward_speed_factor: f32,
    /// vertical < -threshold → crouch
    pub crouch_threshold: f32,
    /// horizontal against facing beyond threshold → holding back
    pub back_threshold: f32,
    /// |horizontal| crossing this counts as a tap
    pub tap_threshold: f32,
    /// Height above the latched ground level still considered grounded
    pub ground_epsilon: f32,
    /// |vertical velocity| below this counts as "settled" for the ground latch
    pub settle_epsilon: f32,
}

impl Default for FighterTuning {
    fn default() -> Self {
        Self {
            walk_speed: 4.0,
            dash_multiplier: 2.5,
            dash_duration: 0.18,
            double_tap_window: 0.3,
            jump_velocity: 6.0,
            fall_multiplier: 2.5,
            low_jump_multiplier: 2.0,
            backward_speed_factor: 0.7,
            crouch_threshold: 0.5,
            back_threshold: 0.5,
            tap_threshold: 0.5,
            ground_epsilon: 0.05,
            settle_epsilon: 0.01,
        }
    }
}

/// Hit resolution tuning.
#[derive(Debug, Clone, Serialize, Deserialize, Reflect)]
#[serde(default)]
pub struct CombatTuning {
    /// Fraction of damage that goes through a successful block
    pub block_damage_ratio: f32,
    /// Fraction of horizontal knockback applied on a successful block
    pub block_knockback_ratio: f32,
    pub stun_policy: StunPolicy,
    /// Simulation time scale while hitstop is active
    pub hitstop_time_scale: f32,
    /// Hit flash length (unscaled seconds)
    pub hit_flash_duration: f32,
    /// Block reaction signal length (unscaled seconds)
    pub block_flash_duration: f32,
    /// Delay between a KO and the restart request (simulation seconds)
    pub restart_delay: f32,
}

impl Default for CombatTuning {
    fn default() -> Self {
        Self {
            block_damage_ratio: 0.2,
            block_knockback_ratio: 0.3,
            stun_policy: StunPolicy::Stack,
            hitstop_time_scale: 0.05,
            hit_flash_duration: 0.1,
            block_flash_duration: 0.15,
            restart_delay: 3.0,
        }
    }
}

/// Special-move projectile tuning.
#[derive(Debug, Clone, Serialize, Deserialize, Reflect)]
#[serde(default)]
pub struct ProjectileTuning {
    /// Time into the Special attack at which the projectile spawns
    pub spawn_time: f32,
    /// Spawn offset from the fighter origin (x mirrored by facing)
    pub spawn_offset: (f32, f32),
    pub speed: f32,
    /// Lifetime (seconds)
    pub lifetime: f32,
    pub despawn_on_hit: bool,
    /// Hit region half extents
    pub half_size: (f32, f32),
}

impl Default for ProjectileTuning {
    fn default() -> Self {
        Self {
            spawn_time: 0.25,
            spawn_offset: (0.9, 1.1),
            speed: 10.0,
            lifetime: 5.0,
            despawn_on_hit: true,
            half_size: (0.3, 0.3),
        }
    }
}

/// Stage parameters used by the kinematic body stand-in.
#[derive(Debug, Clone, Serialize, Deserialize, Reflect)]
#[serde(default)]
pub struct ArenaConfig {
    /// Base gravity (units/sec², negative = down)
    pub gravity: f32,
    pub floor_height: f32,
    /// Fighters are clamped to [-half_width, half_width]
    pub stage_half_width: f32,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            gravity: -30.0,
            floor_height: 0.0,
            stage_half_width: 12.0,
        }
    }
}

/// One entry of the roster, produced by character select.
#[derive(Debug, Clone, Serialize, Deserialize, Reflect)]
#[serde(default)]
pub struct FighterSetup {
    /// Character chosen on the select screen (opaque to the combat core)
    pub character_id: u32,
    pub spawn_position: (f32, f32),
    pub max_health: f32,
}

impl Default for FighterSetup {
    fn default() -> Self {
        Self {
            character_id: 0,
            spawn_position: (0.0, 0.0),
            max_health: 100.0,
        }
    }
}

// ============================================================================
// MatchConfig
// ============================================================================

/// Everything a round needs to start.
#[derive(Resource, Debug, Clone, Serialize, Deserialize, Reflect)]
#[reflect(Resource)]
#[serde(default)]
pub struct MatchConfig {
    pub fighter: FighterTuning,
    pub combat: CombatTuning,
    pub projectile: ProjectileTuning,
    pub arena: ArenaConfig,
    /// Index in this list = player index
    pub roster: Vec<FighterSetup>,
    /// Reset the round automatically once the restart delay elapses
    pub auto_restart: bool,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            fighter: FighterTuning::default(),
            combat: CombatTuning::default(),
            projectile: ProjectileTuning::default(),
            arena: ArenaConfig::default(),
            roster: vec![
                FighterSetup {
                    spawn_position: (-3.0, 0.0),
                    ..default()
                },
                FighterSetup {
                    spawn_position: (3.0, 0.0),
                    ..default()
                },
            ],
            auto_restart: false,
        }
    }
}

impl MatchConfig {
    /// Build a two-player config from character select results.
    pub fn with_characters(player1: u32, player2: u32) -> Self {
        let mut config = Self::default();
        config.roster[0].character_id = player1;
        config.roster[1].character_id = player2;
        config
    }

    /// Parse and validate a RON document.
    pub fn from_ron(source: &str) -> Result<Self, ConfigError> {
        let config: MatchConfig = ron::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let f = &self.fighter;
        for (field, value) in [
            ("fighter.walk_speed", f.walk_speed),
            ("fighter.dash_multiplier", f.dash_multiplier),
            ("fighter.dash_duration", f.dash_duration),
            ("fighter.double_tap_window", f.double_tap_window),
            ("fighter.jump_velocity", f.jump_velocity),
            ("fighter.fall_multiplier", f.fall_multiplier),
            ("fighter.low_jump_multiplier", f.low_jump_multiplier),
            ("fighter.ground_epsilon", f.ground_epsilon),
            ("fighter.settle_epsilon", f.settle_epsilon),
            ("combat.hit_flash_duration", self.combat.hit_flash_duration),
            ("combat.block_flash_duration", self.combat.block_flash_duration),
            ("combat.restart_delay", self.combat.restart_delay),
            ("projectile.spawn_time", self.projectile.spawn_time),
            ("projectile.speed", self.projectile.speed),
            ("projectile.lifetime", self.projectile.lifetime),
            ("arena.stage_half_width", self.arena.stage_half_width),
        ] {
            check_non_negative(field, value)?;
        }

        for (field, value) in [
            ("fighter.backward_speed_factor", f.backward_speed_factor),
            ("fighter.crouch_threshold", f.crouch_threshold),
            ("fighter.back_threshold", f.back_threshold),
            ("fighter.tap_threshold", f.tap_threshold),
            ("combat.block_damage_ratio", self.combat.block_damage_ratio),
            ("combat.block_knockback_ratio", self.combat.block_knockback_ratio),
            ("combat.hitstop_time_scale", self.combat.hitstop_time_scale),
        ] {
            check_ratio(field, value)?;
        }

        if self.roster.len() < 2 {
            return Err(ConfigError::RosterTooSmall(self.roster.len()));
        }

        for (index, setup) in self.roster.iter().enumerate() {
            if !(setup.max_health.is_finite() && setup.max_health > 0.0) {
                return Err(ConfigError::InvalidMaxHealth {
                    index,
                    value: setup.max_health,
                });
            }
        }

        Ok(())
    }
}

fn check_non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { field, value })
    }
}

fn check_ratio(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::NotARatio { field, value })
    }
}
