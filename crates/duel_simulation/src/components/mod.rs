//! ECS components for fighters
//!
//! Organised by domain:
//! - actor: identity and vitals (Fighter, Facing, Health)
//! - movement: input intents, kinematic body, locomotion (dash, grounding)
//! - combat: stun / freeze / flash timers
//! - presentation: signals for the animation layer
//!
//! Attack state and combo memory live in `crate::combat` next to the rules
//! that mutate them.

pub mod actor;
pub mod combat;
pub mod movement;
pub mod presentation;

pub use actor::*;
pub use combat::*;
pub use movement::*;
pub use presentation::*;
