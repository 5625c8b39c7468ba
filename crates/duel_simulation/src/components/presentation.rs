//! Presentation signals (core → animation/audio layer)

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::combat::AttackId;

/// Named state flags a presentation layer maps to animations and sounds.
///
/// Rewritten at the end of every fighter step; the core never reads it back.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
pub struct AnimationSignals {
    pub walking: bool,
    pub jumping: bool,
    pub crouching: bool,
    pub dashing: bool,
    pub stunned: bool,
    /// Move being performed, if any
    pub attack: Option<AttackId>,
    /// Block reaction playing
    pub blocked: bool,
    /// Hit flash playing
    pub hit_flash: bool,
    /// Inside a hitstop freeze
    pub frozen: bool,
    pub defeated: bool,
}
