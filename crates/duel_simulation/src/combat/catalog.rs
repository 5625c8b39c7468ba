//! Attack catalog: authored move data looked up by [`AttackId`].
//!
//! Everything a move needs is authored here, including its length. The
//! presentation layer plays whatever clip it likes; the simulation never
//! asks an animation how long an attack lasts.

use bevy::math::bounding::Aabb2d;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::components::Facing;

// ============================================================================
// Identifiers
// ============================================================================

/// Every move a fighter can perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Reflect, Serialize, Deserialize)]
pub enum AttackId {
    Punch,
    HeavyPunch,
    /// Crouching light
    Low,
    /// Crouching heavy
    LowKick,
    AirKick,
    /// Launches a projectile
    Special,
}

impl AttackId {
    pub const ALL: [AttackId; 6] = [
        AttackId::Punch,
        AttackId::HeavyPunch,
        AttackId::Low,
        AttackId::LowKick,
        AttackId::AirKick,
        AttackId::Special,
    ];

    /// Where the move may be started.
    pub fn stance(self) -> AttackStance {
        match self {
            AttackId::AirKick => AttackStance::Air,
            _ => AttackStance::Ground,
        }
    }

    /// Specials ignore combo memory and may be repeated freely.
    pub fn bypasses_combo_memory(self) -> bool {
        matches!(self, AttackId::Special)
    }

    /// Standing punches lock out jumping while they run.
    pub fn locks_jump(self) -> bool {
        matches!(self, AttackId::Punch | AttackId::HeavyPunch)
    }

    /// How the fighter's horizontal velocity behaves during the move.
    pub fn root_motion(self) -> RootMotion {
        match self {
            AttackId::AirKick => RootMotion::Keep,
            _ => RootMotion::Planted,
        }
    }
}

/// Grounded/airborne constraint of a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttackStance {
    Ground,
    Air,
}

impl AttackStance {
    pub fn allows(self, grounded: bool) -> bool {
        match self {
            AttackStance::Ground => grounded,
            AttackStance::Air => !grounded,
        }
    }
}

/// Horizontal velocity policy while an attack runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootMotion {
    /// Horizontal velocity forced to zero
    Planted,
    /// Horizontal velocity left untouched (air kick carries momentum)
    Keep,
}

/// Which block stance stops an attack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect, Serialize, Deserialize)]
pub enum HeightClass {
    /// Blocked standing or crouching
    #[default]
    Normal,
    /// Must be blocked crouching
    Low,
    /// Must be blocked standing
    High,
}

// ============================================================================
// Definitions
// ============================================================================

/// Axis-aligned hit region relative to the fighter origin.
///
/// `offset.0` is along the facing direction (mirrored for left-facing fighters).
#[derive(Debug, Clone, Copy, PartialEq, Reflect, Serialize, Deserialize)]
pub struct HitRegion {
    pub offset: (f32, f32),
    pub half_size: (f32, f32),
}

impl HitRegion {
    pub fn new(offset: Vec2, half_size: Vec2) -> Self {
        Self {
            offset: (offset.x, offset.y),
            half_size: (half_size.x, half_size.y),
        }
    }

    /// World-space box for a fighter at `origin` facing `facing`.
    pub fn world_aabb(&self, origin: Vec2, facing: Facing) -> Aabb2d {
        let center = origin + Vec2::new(self.offset.0 * facing.sign(), self.offset.1);
        Aabb2d::new(center, Vec2::new(self.half_size.0.abs(), self.half_size.1.abs()))
    }
}

/// Immutable move data.
#[derive(Debug, Clone, PartialEq, Reflect, Serialize, Deserialize)]
pub struct AttackDefinition {
    pub id: AttackId,
    pub damage: f32,
    /// Horizontal knockback magnitude
    pub knockback_force: f32,
    /// Vertical knockback magnitude
    pub knockback_upward: f32,
    /// Seconds of stun on an unblocked hit
    pub stun_duration: f32,
    /// Seconds of global hitstop when the hit lands
    pub hitstop_duration: f32,
    #[serde(default)]
    pub height: HeightClass,
    /// Length of the attack instance (seconds)
    pub duration: f32,
    /// Melee hit region; `None` for moves that only spawn something
    #[serde(default)]
    pub hit_region: Option<HitRegion>,
}

impl AttackDefinition {
    pub fn validate(&self) -> Result<(), CatalogError> {
        for (field, value) in [
            ("damage", self.damage),
            ("knockback_force", self.knockback_force),
            ("stun_duration", self.stun_duration),
            ("hitstop_duration", self.hitstop_duration),
            ("duration", self.duration),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(CatalogError::InvalidValue {
                    attack: self.id,
                    field,
                    value,
                });
            }
        }

        if !self.knockback_upward.is_finite() {
            return Err(CatalogError::InvalidValue {
                attack: self.id,
                field: "knockback_upward",
                value: self.knockback_upward,
            });
        }

        if self.duration <= 0.0 {
            return Err(CatalogError::ZeroDuration(self.id));
        }

        Ok(())
    }
}

// ============================================================================
// Catalog
// ============================================================================

/// Catalog problems. Detected at load time; the offending move is disabled.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to parse attack catalog: {0}")]
    Parse(#[from] ron::error::SpannedError),

    #[error("{attack:?}: `{field}` must be finite and >= 0 (got {value})")]
    InvalidValue {
        attack: AttackId,
        field: &'static str,
        value: f32,
    },

    #[error("{0:?}: duration must be > 0")]
    ZeroDuration(AttackId),

    #[error("{0:?} defined more than once")]
    Duplicate(AttackId),
}

/// Lookup table of all moves of the match.
#[derive(Resource, Debug, Clone, Default)]
pub struct AttackCatalog {
    definitions: Vec<AttackDefinition>,
}

impl AttackCatalog {
    pub fn empty() -> Self {
        Self::default()
    }

    /// The shipped move list.
    pub fn standard() -> Self {
        let mut catalog = Self::empty();
        for definition in standard_definitions() {
            // Built-in data is valid by construction; see test_standard_catalog_valid
            if let Err(err) = catalog.insert(definition) {
                tracing::error!("built-in attack rejected: {err}");
            }
        }
        catalog
    }

    /// Parse a RON list of definitions.
    ///
    /// Syntax errors fail the whole load. Individually invalid entries are
    /// logged and skipped so the rest of the move list stays usable.
    pub fn from_ron(source: &str) -> Result<Self, CatalogError> {
        let definitions: Vec<AttackDefinition> = ron::from_str(source)?;
        let mut catalog = Self::empty();
        for definition in definitions {
            if let Err(err) = catalog.insert(definition) {
                tracing::warn!("attack disabled: {err}");
            }
        }
        Ok(catalog)
    }

    pub fn insert(&mut self, definition: AttackDefinition) -> Result<(), CatalogError> {
        definition.validate()?;
        if self.get(definition.id).is_some() {
            return Err(CatalogError::Duplicate(definition.id));
        }
        if definition.hit_region.is_none() && definition.id != AttackId::Special {
            tracing::warn!(
                "{:?} has no hit region assigned; it will play but never connect",
                definition.id
            );
        }
        self.definitions.push(definition);
        Ok(())
    }

    /// Inserts or replaces the definition of `definition.id`.
    pub fn set(&mut self, definition: AttackDefinition) -> Result<(), CatalogError> {
        definition.validate()?;
        self.definitions.retain(|d| d.id != definition.id);
        self.definitions.push(definition);
        Ok(())
    }

    /// Removes a move; it stays disabled for the match.
    pub fn remove(&mut self, id: AttackId) -> Option<AttackDefinition> {
        let position = self.definitions.iter().position(|d| d.id == id)?;
        Some(self.definitions.remove(position))
    }

    pub fn get(&self, id: AttackId) -> Option<&AttackDefinition> {
        self.definitions.iter().find(|d| d.id == id)
    }

    pub fn contains(&self, id: AttackId) -> bool {
        self.get(id).is_some()
    }

    /// Moves without a definition (disabled for this match).
    pub fn missing(&self) -> Vec<AttackId> {
        AttackId::ALL
            .into_iter()
            .filter(|id| !self.contains(*id))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AttackDefinition> {
        self.definitions.iter()
    }
}

fn standard_definitions() -> Vec<AttackDefinition> {
    vec![
        AttackDefinition {
            id: AttackId::Punch,
            damage: 5.0,
            knockback_force: 2.0,
            knockback_upward: 1.0,
            stun_duration: 0.3,
            hitstop_duration: 0.05,
            height: HeightClass::Normal,
            duration: 0.3,
            hit_region: Some(HitRegion::new(Vec2::new(0.8, 1.2), Vec2::new(0.45, 0.25))),
        },
        AttackDefinition {
            id: AttackId::HeavyPunch,
            damage: 12.0,
            knockback_force: 5.0,
            knockback_upward: 2.0,
            stun_duration: 0.6,
            hitstop_duration: 0.1,
            height: HeightClass::High,
            duration: 0.55,
            hit_region: Some(HitRegion::new(Vec2::new(0.9, 1.3), Vec2::new(0.55, 0.3))),
        },
        AttackDefinition {
            id: AttackId::Low,
            damage: 4.0,
            knockback_force: 1.5,
            knockback_upward: 0.0,
            stun_duration: 0.25,
            hitstop_duration: 0.04,
            height: HeightClass::Low,
            duration: 0.3,
            hit_region: Some(HitRegion::new(Vec2::new(0.8, 0.3), Vec2::new(0.45, 0.2))),
        },
        AttackDefinition {
            id: AttackId::LowKick,
            damage: 8.0,
            knockback_force: 3.0,
            knockback_upward: 0.5,
            stun_duration: 0.45,
            hitstop_duration: 0.07,
            height: HeightClass::Low,
            duration: 0.45,
            hit_region: Some(HitRegion::new(Vec2::new(1.0, 0.2), Vec2::new(0.6, 0.2))),
        },
        AttackDefinition {
            id: AttackId::AirKick,
            damage: 7.0,
            knockback_force: 3.0,
            knockback_upward: 1.5,
            stun_duration: 0.4,
            hitstop_duration: 0.06,
            height: HeightClass::High,
            duration: 0.4,
            hit_region: Some(HitRegion::new(Vec2::new(0.7, 0.6), Vec2::new(0.5, 0.35))),
        },
        AttackDefinition {
            id: AttackId::Special,
            damage: 15.0,
            knockback_force: 6.0,
            knockback_upward: 2.5,
            stun_duration: 0.8,
            hitstop_duration: 0.12,
            height: HeightClass::Normal,
            duration: 0.7,
            // Damage comes from the projectile
            hit_region: None,
        },
    ]
}
