//! Block stance derived from input every tick.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::combat::HeightClass;

/// Current block stance.
///
/// Recomputed each tick: holding back (horizontal input opposing facing past
/// the threshold) blocks, crouching picks the low stance.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
pub enum Guard {
    #[default]
    None,
    Standing,
    Crouching,
}

impl Guard {
    pub fn from_input(holding_back: bool, crouching: bool) -> Self {
        match (holding_back, crouching) {
            (false, _) => Guard::None,
            (true, false) => Guard::Standing,
            (true, true) => Guard::Crouching,
        }
    }

    pub fn is_blocking(self) -> bool {
        self != Guard::None
    }

    pub fn is_stand_blocking(self) -> bool {
        self == Guard::Standing
    }

    pub fn is_crouch_blocking(self) -> bool {
        self == Guard::Crouching
    }

    /// Standing stops Normal and High; crouching stops Normal and Low.
    pub fn defeats(self, height: HeightClass) -> bool {
        match (self, height) {
            (Guard::None, _) => false,
            (_, HeightClass::Normal) => true,
            (Guard::Standing, HeightClass::High) => true,
            (Guard::Crouching, HeightClass::Low) => true,
            _ => false,
        }
    }
}
