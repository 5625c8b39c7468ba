//! Hitstop: global freeze-frame on impact.
//!
//! One resource per match owns the time-scale override. Activation snapshots
//! the scale that was in effect (only if no freeze is running), swaps in the
//! slowed scale and sets the remaining time. A second activation while frozen
//! refreshes the remaining time instead of adding to it, so the last hit
//! decides when everyone resumes.
//!
//! The countdown runs on unscaled time; otherwise a 0.05 scale would stretch a
//! 0.1 s freeze to two seconds.

use bevy::prelude::*;

// ============================================================================
// HIT STOP
// ============================================================================

#[derive(Resource, Debug, Clone, Reflect)]
#[reflect(Resource)]
pub struct Hitstop {
    /// Unscaled seconds until the original scale comes back
    pub remaining: f32,
    /// Scale that was active before the freeze; `Some` only while frozen
    pub original_scale: Option<f32>,
    /// Scale the simulation runs at right now
    pub time_scale: f32,
    /// Scale applied while frozen
    pub slowed_scale: f32,
}

impl Default for Hitstop {
    fn default() -> Self {
        Self::new(0.05)
    }
}

impl Hitstop {
    pub fn new(slowed_scale: f32) -> Self {
        Self {
            remaining: 0.0,
            original_scale: None,
            time_scale: 1.0,
            slowed_scale: slowed_scale.clamp(0.0, 1.0),
        }
    }

    pub fn is_active(&self) -> bool {
        self.original_scale.is_some()
    }

    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    /// Starts or refreshes the freeze. Non-positive durations are ignored.
    pub fn activate(&mut self, duration: f32) {
        if !(duration > 0.0) {
            return;
        }
        if self.original_scale.is_none() {
            self.original_scale = Some(self.time_scale);
        }
        self.time_scale = self.slowed_scale;
        self.remaining = duration;
    }

    /// Counts down with unscaled time. Returns `true` on the tick the
    /// original scale is restored.
    pub fn tick(&mut self, unscaled_delta: f32) -> bool {
        let Some(original) = self.original_scale else {
            return false;
        };
        self.remaining -= unscaled_delta.max(0.0);
        if self.remaining > 0.0 {
            return false;
        }
        self.remaining = 0.0;
        self.time_scale = original;
        self.original_scale = None;
        true
    }

    /// Drops any running freeze (round reset).
    pub fn reset(&mut self) {
        if let Some(original) = self.original_scale.take() {
            self.time_scale = original;
        }
        self.remaining = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activate_and_restore() {
        let mut hitstop = Hitstop::new(0.05);
        hitstop.activate(0.1);
        assert!(hitstop.is_active());
        assert_eq!(hitstop.time_scale(), 0.05);

        assert!(!hitstop.tick(0.06));
        assert!(hitstop.tick(0.06));
        assert!(!hitstop.is_active());
        assert_eq!(hitstop.time_scale(), 1.0);
    }

    #[test]
    fn test_shorter_refresh_shortens_freeze() {
        // 0.1 s hit, second 0.05 s hit 0.02 s later
        let mut hitstop = Hitstop::new(0.05);
        hitstop.activate(0.1);
        assert!(!hitstop.tick(0.02));
        hitstop.activate(0.05);
        assert_eq!(hitstop.remaining, 0.05);

        assert!(!hitstop.tick(0.045));
        assert!(hitstop.is_active());
        assert!(hitstop.tick(0.01));
        assert_eq!(hitstop.time_scale(), 1.0);
    }

    #[test]
    fn test_snapshot_taken_once() {
        let mut hitstop = Hitstop::new(0.1);
        hitstop.time_scale = 0.5;
        hitstop.activate(0.1);
        hitstop.activate(0.1);
        // Second activation must not snapshot the slowed scale
        assert_eq!(hitstop.original_scale, Some(0.5));
        hitstop.tick(1.0);
        assert_eq!(hitstop.time_scale(), 0.5);
    }

    #[test]
    fn test_ignores_empty_duration_and_resets() {
        let mut hitstop = Hitstop::default();
        hitstop.activate(0.0);
        hitstop.activate(f32::NAN);
        assert!(!hitstop.is_active());

        hitstop.activate(0.2);
        hitstop.reset();
        assert!(!hitstop.is_active());
        assert_eq!(hitstop.time_scale(), 1.0);
        assert!(!hitstop.tick(0.1));
    }
}
