//! Fighter identity and vitals: Fighter, Facing, Health

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::combat::{AttackState, ComboMemory, Guard};
use crate::components::{AnimationSignals, CombatTimers, FighterIntent, Locomotion, PhysicsBody};

/// Fighter (one per player): root component of a combatant.
///
/// Required components bring in the whole per-player state with defaults;
/// `round::spawn_fighter` overrides what the roster specifies.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
#[require(
    Transform,
    Health,
    PhysicsBody,
    Locomotion,
    FighterIntent,
    Guard,
    CombatTimers,
    AttackState,
    ComboMemory,
    AnimationSignals
)]
pub struct Fighter {
    /// 0 = player 1, 1 = player 2. Also the update order inside a tick.
    pub index: u8,
    pub facing: Facing,
    /// Chosen on the select screen; carried for presentation only
    pub character_id: u32,
}

impl Default for Fighter {
    fn default() -> Self {
        Self {
            index: 0,
            facing: Facing::Right,
            character_id: 0,
        }
    }
}

impl Fighter {
    pub fn new(index: u8, character_id: u32) -> Self {
        Self {
            index,
            // Players spawn left → right, so player 1 starts facing right
            facing: if index == 0 { Facing::Right } else { Facing::Left },
            character_id,
        }
    }
}

/// Horizontal facing (+1 right, -1 left).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect, Serialize, Deserialize)]
pub enum Facing {
    #[default]
    Right,
    Left,
}

impl Facing {
    pub fn sign(self) -> f32 {
        match self {
            Facing::Right => 1.0,
            Facing::Left => -1.0,
        }
    }

    /// Facing for a signed horizontal value; `None` for (near) zero.
    pub fn from_direction(value: f32) -> Option<Self> {
        if value > f32::EPSILON {
            Some(Facing::Right)
        } else if value < -f32::EPSILON {
            Some(Facing::Left)
        } else {
            None
        }
    }
}

/// Fighter health
///
/// Invariant: 0 ≤ current ≤ max
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Health {
    pub current: f32,
    pub max: f32,
}

impl Default for Health {
    fn default() -> Self {
        Self::new(100.0)
    }
}

impl Health {
    pub fn new(max: f32) -> Self {
        let max = if max.is_finite() { max.max(0.0) } else { 0.0 };
        Self { current: max, max }
    }

    /// Starts below full health (clamped into range).
    pub fn with_current(mut self, current: f32) -> Self {
        self.current = if current.is_finite() { current.clamp(0.0, self.max) } else { self.max };
        self
    }

    pub fn is_alive(&self) -> bool {
        self.current > 0.0
    }

    /// Subtracts `amount` (negative/NaN treated as 0), floored at zero.
    /// Returns the damage actually applied.
    pub fn take_damage(&mut self, amount: f32) -> f32 {
        let amount = if amount.is_finite() { amount.max(0.0) } else { 0.0 };
        let before = self.current;
        self.current = (self.current - amount).clamp(0.0, self.max);
        before - self.current
    }

    pub fn fraction(&self) -> f32 {
        if self.max > 0.0 {
            self.current / self.max
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_damage() {
        let mut health = Health::new(100.0);
        assert_eq!(health.current, 100.0);

        assert_eq!(health.take_damage(30.0), 30.0);
        assert_eq!(health.current, 70.0);
        assert!(health.is_alive());

        // Floored at zero, reports what was actually removed
        assert_eq!(health.take_damage(100.0), 70.0);
        assert_eq!(health.current, 0.0);
        assert!(!health.is_alive());
    }

    #[test]
    fn test_health_ignores_bad_amounts() {
        let mut health = Health::new(50.0);
        health.take_damage(-10.0);
        assert_eq!(health.current, 50.0);
        health.take_damage(f32::NAN);
        assert_eq!(health.current, 50.0);
    }

    #[test]
    fn test_health_fraction() {
        let mut health = Health::new(80.0);
        assert_eq!(health.fraction(), 1.0);

        health.take_damage(20.0);
        assert_eq!(health.fraction(), 0.75);

        // Degenerate max reads as empty
        assert_eq!(Health::new(0.0).fraction(), 0.0);
    }

    #[test]
    fn test_facing() {
        assert_eq!(Facing::Right.sign(), 1.0);
        assert_eq!(Facing::Left.sign(), -1.0);
        assert_eq!(Facing::from_direction(0.3), Some(Facing::Right));
        assert_eq!(Facing::from_direction(-2.0), Some(Facing::Left));
        assert_eq!(Facing::from_direction(0.0), None);
    }

    #[test]
    fn test_players_face_each_other_at_spawn() {
        assert_eq!(Fighter::new(0, 0).facing, Facing::Right);
        assert_eq!(Fighter::new(1, 0).facing, Facing::Left);
    }
}
