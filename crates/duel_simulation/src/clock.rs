//! Simulation clock: one tick, two time bases.
//!
//! `unscaled` is the raw tick length. `scaled` is what gameplay sees and is
//! throttled by hitstop. Hitstop itself counts down on unscaled time.

use bevy::prelude::*;
use tracing::debug;

use crate::combat::Hitstop;

#[derive(Resource, Debug, Clone, Reflect)]
#[reflect(Resource)]
pub struct SimClock {
    /// Raw delta of the current tick (seconds)
    pub unscaled: f32,
    /// `unscaled * time_scale`
    pub scaled: f32,
    /// Scale in effect for the current tick
    pub time_scale: f32,
    /// Ticks simulated since the round began
    pub tick: u64,
    /// Unscaled seconds since the round began
    pub elapsed: f64,
}

impl Default for SimClock {
    fn default() -> Self {
        Self {
            unscaled: 0.0,
            scaled: 0.0,
            time_scale: 1.0,
            tick: 0,
            elapsed: 0.0,
        }
    }
}

impl SimClock {
    /// Sets the raw delta for the next tick. Negative/NaN becomes 0.
    pub fn prepare(&mut self, delta: f32) {
        self.unscaled = if delta.is_finite() { delta.max(0.0) } else { 0.0 };
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// System: ticks hitstop with unscaled time, then derives the scaled delta.
///
/// A freeze that ends this tick gives the tick full speed again; one that
/// starts during this tick only affects the next one.
pub fn advance_clock(mut clock: ResMut<SimClock>, mut hitstop: ResMut<Hitstop>) {
    if hitstop.tick(clock.unscaled) {
        debug!("⏱️ hitstop over, time scale back to {:.2}", hitstop.time_scale());
    }

    clock.time_scale = hitstop.time_scale();
    clock.scaled = clock.unscaled * clock.time_scale;
    clock.tick += 1;
    clock.elapsed += f64::from(clock.unscaled);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scaled_delta_follows_hitstop() {
        let mut world = World::new();
        world.init_resource::<SimClock>();
        world.insert_resource(Hitstop::new(0.05));

        world.resource_mut::<SimClock>().prepare(0.02);
        world.run_system_cached(advance_clock).unwrap();
        assert_eq!(world.resource::<SimClock>().scaled, 0.02);

        world.resource_mut::<Hitstop>().activate(0.03);
        world.run_system_cached(advance_clock).unwrap();
        let clock = world.resource::<SimClock>();
        assert!((clock.scaled - 0.001).abs() < 1e-6);
        assert_eq!(clock.tick, 2);

        // 0.03 - 0.02 - 0.02 < 0: restored before this tick is scaled
        world.run_system_cached(advance_clock).unwrap();
        assert_eq!(world.resource::<SimClock>().scaled, 0.02);
    }

    #[test]
    fn test_prepare_clamps() {
        let mut clock = SimClock::default();
        clock.prepare(-1.0);
        assert_eq!(clock.unscaled, 0.0);
        clock.prepare(f32::INFINITY);
        assert_eq!(clock.unscaled, 0.0);
    }
}
