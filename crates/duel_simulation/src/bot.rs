//! Random-input bots for headless matches and determinism runs.
//!
//! Bots draw from `DeterministicRng`, so a seed fully determines a match.

use bevy::prelude::*;
use rand::Rng;

use crate::components::{Fighter, FighterIntent};
use crate::{run_simulation_step, DeterministicRng};

/// Marks a fighter as bot-controlled.
#[derive(Component, Debug, Clone, Default)]
pub struct Bot {
    /// Ticks the current stick direction is kept
    pub hold_ticks: u32,
    pub axis: Vec2,
}

/// Picks this tick's intent. The stick is held for a few ticks at a time so
/// walking, crouching and double-tap dashes actually happen.
pub fn next_intent(rng: &mut impl Rng, bot: &mut Bot) -> FighterIntent {
    if bot.hold_ticks == 0 {
        let horizontal = [-1.0, 0.0, 0.0, 1.0][rng.gen_range(0..4)];
        let vertical = if rng.gen_bool(0.15) { -1.0 } else { 0.0 };
        bot.axis = Vec2::new(horizontal, vertical);
        bot.hold_ticks = rng.gen_range(3..24);
    }
    bot.hold_ticks -= 1;

    FighterIntent {
        axis: bot.axis,
        jump: rng.gen_bool(0.02),
        attack: rng.gen_bool(0.08),
        heavy_attack: rng.gen_bool(0.04),
        special_attack: rng.gen_bool(0.01),
        jump_held: rng.gen_bool(0.6),
    }
}

/// System: every fighter without a controller becomes a bot.
pub fn attach_bots(mut commands: Commands, fighters: Query<Entity, (With<Fighter>, Without<Bot>)>) {
    for entity in &fighters {
        commands.entity(entity).insert(Bot::default());
    }
}

/// System: write bot intents, in player order.
pub fn drive_bots(
    mut rng: ResMut<DeterministicRng>,
    mut bots: Query<(&Fighter, &mut Bot, &mut FighterIntent)>,
) {
    let mut ordered: Vec<_> = bots.iter_mut().collect();
    ordered.sort_by_key(|(fighter, _, _)| fighter.index);

    for (_, mut bot, mut intent) in ordered {
        *intent = next_intent(&mut rng.rng, &mut bot);
    }
}

pub struct BotPlugin;

impl Plugin for BotPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            (attach_bots, drive_bots).chain().before(run_simulation_step),
        );
    }
}
