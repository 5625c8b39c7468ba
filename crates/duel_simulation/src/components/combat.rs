//! Combat timers carried by every fighter

use bevy::prelude::*;

/// Countdown timers of a fighter.
///
/// Invariant: every field ≥ 0.
/// - `stun` counts down on scaled (simulation) time
/// - `freeze`, `hit_flash`, `block_flash` count down on unscaled time
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct CombatTimers {
    /// Seconds of stun left; no input is processed while > 0
    pub stun: f32,
    /// Hitstop this fighter is taking part in (attacker or defender)
    pub freeze: f32,
    pub hit_flash: f32,
    pub block_flash: f32,
    /// Times a running stun has reached zero. Observers compare it against
    /// the last value they saw, so a stun that starts and ends between two
    /// observations is still noticed.
    pub stun_exits: u32,
}

impl CombatTimers {
    pub fn is_stunned(&self) -> bool {
        self.stun > 0.0
    }

    pub fn is_frozen(&self) -> bool {
        self.freeze > 0.0
    }

    /// Counts the stun down; returns `true` on the tick it reaches zero.
    pub fn tick_stun(&mut self, scaled_delta: f32) -> bool {
        if self.stun <= 0.0 {
            self.stun = 0.0;
            return false;
        }
        self.set_stun(self.stun - scaled_delta.max(0.0))
    }

    /// Overwrites the stun. Returns `true` if a running stun ended.
    pub fn set_stun(&mut self, value: f32) -> bool {
        let was_stunned = self.is_stunned();
        self.stun = if value.is_nan() { 0.0 } else { value.max(0.0) };
        let ended = was_stunned && !self.is_stunned();
        if ended {
            self.stun_exits = self.stun_exits.wrapping_add(1);
        }
        ended
    }

    /// Counts the unscaled timers down. Returns `true` if the freeze ended
    /// this tick.
    pub fn tick_unscaled(&mut self, unscaled_delta: f32) -> bool {
        let delta = unscaled_delta.max(0.0);
        let was_frozen = self.is_frozen();
        self.freeze = (self.freeze - delta).max(0.0);
        self.hit_flash = (self.hit_flash - delta).max(0.0);
        self.block_flash = (self.block_flash - delta).max(0.0);
        was_frozen && !self.is_frozen()
    }

    /// Refresh (never stack) the freeze, same rule as the global hitstop.
    pub fn refresh_freeze(&mut self, duration: f32) {
        if duration > 0.0 {
            self.freeze = duration;
        }
    }
}
