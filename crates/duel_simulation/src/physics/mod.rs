//! Physics stand-in
//!
//! Bodies are kinematic: gameplay writes `PhysicsBody::velocity`, this module
//! applies base gravity and moves transforms. Extra fall/low-jump gravity is
//! the fighter step's business.

use bevy::prelude::*;

pub mod movement;

pub use movement::{integrate_bodies, integrate_body};

use crate::{SimulationSet, SimulationStep};

pub struct PhysicsPlugin;

impl Plugin for PhysicsPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<crate::components::PhysicsBody>()
            .add_systems(SimulationStep, integrate_bodies.in_set(SimulationSet::Physics));
    }
}
