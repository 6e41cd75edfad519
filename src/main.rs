//! Headless driver: runs the engine on autopilot and prints render snapshots

use std::path::PathBuf;
use std::process::ExitCode;

use chosen_one::sim::{GameEvent, TickInput, WorldState, tick};
use chosen_one::{CollisionPolicy, Settings, SettingsError};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "chosen-one")]
#[command(about = "Run the chase simulation headless with the autopilot at the controls")]
struct Args {
    /// RNG seed; the same seed and settings replay the same run
    #[arg(long, default_value_t = 0xC0FFEE)]
    seed: u64,

    /// Number of ticks to simulate
    #[arg(long, default_value_t = 3_600)]
    ticks: u64,

    /// JSON settings file; missing fields fall back to defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enemy-enemy collision policy (annihilate | bounce), overrides the config
    #[arg(long)]
    policy: Option<String>,

    /// Print a JSON render snapshot every N ticks (0 = never)
    #[arg(long, default_value_t = 0)]
    snapshot_every: u64,
}

fn load_settings(args: &Args) -> Result<Settings, SettingsError> {
    let mut settings = match &args.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    if let Some(policy) = &args.policy {
        settings.enemy.collision_policy =
            CollisionPolicy::from_str(policy).ok_or_else(|| SettingsError::Invalid {
                field: "enemy.collision_policy",
                reason: format!("unknown policy '{}'", policy),
            })?;
    }
    Ok(settings)
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let settings = match load_settings(&args) {
        Ok(settings) => settings,
        Err(e) => {
            log::error!("Bad settings: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let mut state = match WorldState::with_settings(settings, args.seed) {
        Ok(state) => state,
        Err(e) => {
            log::error!("Bad settings: {}", e);
            return ExitCode::FAILURE;
        }
    };
    log::info!(
        "Simulating {} ticks with seed {} ({} collisions)",
        args.ticks,
        args.seed,
        state.settings.enemy.collision_policy.as_str()
    );

    let mut deaths = 0u32;
    let mut best_level = 1u32;
    for _ in 0..args.ticks {
        let input = TickInput::autopilot(&state);
        tick(&mut state, &input);

        for event in &state.events {
            match event {
                GameEvent::PlayerCaught { score, level } => {
                    deaths += 1;
                    log::info!("Caught at tick {}: score {}, level {}", state.tick, score, level);
                }
                GameEvent::LevelUp { level } => best_level = best_level.max(*level),
                _ => {}
            }
        }

        if args.snapshot_every > 0 && state.tick % args.snapshot_every == 0 {
            match serde_json::to_string(&state.snapshot()) {
                Ok(json) => println!("{}", json),
                Err(e) => log::warn!("Snapshot serialization failed: {}", e),
            }
        }
    }

    log::info!(
        "Done after {} ticks: {} deaths, best level {}, high score {}, current score {}",
        state.tick,
        deaths,
        best_level,
        state.high_scores.top_score(),
        state.score
    );
    for (rank, entry) in state.high_scores.entries.iter().enumerate() {
        log::info!(
            "#{} score {} (level {}, tick {})",
            rank + 1,
            entry.score,
            entry.level,
            entry.tick
        );
    }

    ExitCode::SUCCESS
}
