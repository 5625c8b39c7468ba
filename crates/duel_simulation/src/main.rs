//! Headless duel
//!
//! Two bots fight for 1000 ticks without rendering. Optional first argument:
//! path to a RON `MatchConfig`.

use tracing::{error, info};

use duel_simulation::bot::BotPlugin;
use duel_simulation::{create_headless_app, fighter_snapshots, MatchConfig, SimulationPlugin};

fn main() {
    let seed = 42;
    let mut app = create_headless_app(seed);

    let mut config = match std::env::args().nth(1) {
        Some(path) => match std::fs::read_to_string(&path)
            .map_err(|err| err.to_string())
            .and_then(|text| MatchConfig::from_ron(&text).map_err(|err| err.to_string()))
        {
            Ok(config) => config,
            Err(err) => {
                error!("cannot load match config {path}: {err}");
                std::process::exit(1);
            }
        },
        None => MatchConfig::default(),
    };
    config.auto_restart = true;

    info!("Starting headless duel (seed: {})", seed);
    app.insert_resource(config)
        .add_plugins((SimulationPlugin, BotPlugin));

    for tick in 0..1000 {
        app.update();

        if tick % 100 == 0 {
            for fighter in fighter_snapshots(app.world_mut()) {
                info!(
                    "Tick {}: P{} at ({:.2}, {:.2}) HP {:.1}/{:.1} ({:.0}%){}",
                    tick,
                    fighter.index + 1,
                    fighter.position.0,
                    fighter.position.1,
                    fighter.health,
                    fighter.max_health,
                    fighter.health_fraction * 100.0,
                    if fighter.stunned { " (stunned)" } else { "" },
                );
            }
        }
    }

    info!("Simulation complete!");
}
