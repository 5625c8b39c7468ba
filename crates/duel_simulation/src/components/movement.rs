//! Movement components: intents, kinematic body, locomotion state

use bevy::prelude::*;

/// Per-tick input record for one fighter.
///
/// Written by whatever drives the fighter (keyboard, pad, network, bot)
/// before each simulation step. The core never looks at devices.
///
/// Triggers are one-shot: the fighter step consumes them, so a harness that
/// forgets to clear a press does not fire the same attack every tick.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct FighterIntent {
    /// x = horizontal, y = vertical, both in [-1, 1]
    pub axis: Vec2,
    pub jump: bool,
    pub attack: bool,
    pub heavy_attack: bool,
    pub special_attack: bool,
    /// Jump button currently held (low-jump shaping)
    pub jump_held: bool,
}

impl FighterIntent {
    /// Axis clamped into [-1, 1]; NaN becomes 0.
    pub fn sanitized_axis(&self) -> Vec2 {
        Vec2::new(sanitize_axis(self.axis.x), sanitize_axis(self.axis.y))
    }

    pub fn consume_triggers(&mut self) {
        self.jump = false;
        self.attack = false;
        self.heavy_attack = false;
        self.special_attack = false;
    }
}

fn sanitize_axis(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(-1.0, 1.0)
    }
}

/// Kinematic body owned by the physics service.
///
/// The fighter step writes velocity; the body integrator moves the transform.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct PhysicsBody {
    pub velocity: Vec2,
    /// Multiplier on base gravity (0 while dashing)
    pub gravity_scale: f32,
}

impl Default for PhysicsBody {
    fn default() -> Self {
        Self {
            velocity: Vec2::ZERO,
            gravity_scale: 1.0,
        }
    }
}

/// Locomotion state: grounding, crouch, dash and double-tap tracking.
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
pub struct Locomotion {
    pub grounded: bool,
    /// Ground reference, latched the first tick the body settles after spawn
    pub ground_level: Option<f32>,
    pub crouching: bool,
    pub dash: DashState,
    /// Last non-zero horizontal direction (facing fallback without opponent)
    pub last_horizontal: f32,
}

impl Locomotion {
    pub fn is_dashing(&self) -> bool {
        self.dash.active.is_some()
    }

    /// Ground latch + grounded evaluation.
    ///
    /// Grounded requires being at (or below) the latched level and not moving
    /// upward, so a jump issued this tick stays airborne until the body lifts.
    pub fn update_grounding(
        &mut self,
        height: f32,
        vertical_velocity: f32,
        settle_epsilon: f32,
        ground_epsilon: f32,
    ) {
        if self.ground_level.is_none() && vertical_velocity.abs() <= settle_epsilon {
            self.ground_level = Some(height);
            tracing::debug!("ground level latched at {:.3}", height);
        }

        self.grounded = match self.ground_level {
            Some(level) => height <= level + ground_epsilon && vertical_velocity <= settle_epsilon,
            None => false,
        };
    }

    /// Drop dash and crouch (hit interrupt / round reset).
    pub fn return_to_neutral(&mut self) {
        self.crouching = false;
        self.dash.active = None;
        self.dash.clear_tap();
    }
}

/// Active dash.
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct ActiveDash {
    /// -1 or +1
    pub direction: f32,
    pub remaining: f32,
}

/// Double-tap dash detection.
///
/// A tap is the horizontal axis crossing from |x| < threshold to |x| >= threshold.
/// Two taps in the same direction inside the window start a dash.
#[derive(Debug, Clone, Copy, Default, PartialEq, Reflect)]
pub struct DashState {
    pub active: Option<ActiveDash>,
    /// Direction of the pending first tap (0 = none)
    pub last_tap_direction: f32,
    /// Seconds since the pending first tap
    pub since_last_tap: f32,
    /// Horizontal axis seen last tick (edge detection)
    pub previous_horizontal: f32,
}

impl DashState {
    /// Feeds one tick of horizontal input. Returns `true` if a dash started.
    pub fn observe(
        &mut self,
        horizontal: f32,
        delta: f32,
        threshold: f32,
        window: f32,
        dash_duration: f32,
    ) -> bool {
        let mut started = false;

        if self.last_tap_direction != 0.0 {
            self.since_last_tap += delta;
        }

        let direction = if horizontal >= threshold {
            1.0
        } else if horizontal <= -threshold {
            -1.0
        } else {
            0.0
        };
        let press_started = self.previous_horizontal.abs() < threshold && direction != 0.0;

        if press_started {
            if self.last_tap_direction == direction && self.since_last_tap <= window {
                // New dash overwrites any running one
                self.active = Some(ActiveDash {
                    direction,
                    remaining: dash_duration,
                });
                self.clear_tap();
                started = true;
            } else {
                self.last_tap_direction = direction;
                self.since_last_tap = 0.0;
            }
        }

        // Stale single tap
        if self.last_tap_direction != 0.0 && self.since_last_tap > window {
            self.clear_tap();
        }

        self.previous_horizontal = horizontal;
        started
    }

    /// Counts the running dash down; returns `true` on the tick it ends.
    pub fn tick(&mut self, delta: f32) -> bool {
        let Some(dash) = self.active.as_mut() else {
            return false;
        };
        dash.remaining -= delta;
        if dash.remaining <= 0.0 {
            self.active = None;
            return true;
        }
        false
    }

    pub fn clear_tap(&mut self) {
        self.last_tap_direction = 0.0;
        self.since_last_tap = 0.0;
    }
}
