//! Quota Shooter headless runner
//!
//! Plays a seeded session with a simple autopilot and prints the final frame
//! as JSON. Useful for replaying a seed or sanity-checking tuning tables.

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::path::PathBuf;

    use anyhow::{Context, Result};
    use clap::Parser;
    use glam::Vec2;

    use quota_shooter::distance;
    use quota_shooter::sim::{
        Action, GameEvent, GamePhase, GameState, MoveIntent, Snapshot, TickInput, tick,
    };
    use quota_shooter::{EnemyTable, Settings};

    /// Fixed simulation delta (60 Hz)
    const DT: f32 = 1.0 / 60.0;
    /// Close enough to a gold drop to stop steering on that axis
    const STEER_DEADZONE: f32 = 4.0;
    /// Buy health below this fraction when gold allows
    const HEAL_BELOW: f32 = 0.5;

    #[derive(Parser, Debug)]
    #[command(name = "quota-shooter")]
    #[command(about = "Run a headless, seeded Quota Shooter session with an autopilot")]
    pub struct Cli {
        /// Enemy tuning table (CSV); the built-in table is used when omitted
        #[arg(long)]
        enemies: Option<PathBuf>,
        /// Run settings (JSON); defaults are used when omitted
        #[arg(long)]
        settings: Option<PathBuf>,
        #[arg(long, default_value_t = 1)]
        seed: u64,
        /// Ticks to simulate before printing the final frame
        #[arg(long, default_value_t = 3_600)]
        ticks: u64,
        /// Starting level
        #[arg(long, default_value_t = 1)]
        level: u32,
    }

    pub fn run() -> Result<()> {
        let cli = Cli::parse();

        let table = match &cli.enemies {
            Some(path) => EnemyTable::load(path)
                .with_context(|| format!("loading enemy table {}", path.display()))?,
            None => EnemyTable::builtin().context("parsing built-in enemy table")?,
        };
        let settings = match &cli.settings {
            Some(path) => Settings::load(path).unwrap_or_else(|err| {
                log::warn!("Using default settings: {err}");
                Settings::default()
            }),
            None => Settings::default(),
        };

        let mut state = GameState::at_level(cli.seed, table, settings, cli.level)
            .context("building the first wave")?;
        log::info!(
            "Seed {} starting on level {} with {} enemies",
            cli.seed,
            state.level,
            state.enemies.len()
        );

        for _ in 0..cli.ticks {
            let input = autopilot(&state);
            tick(&mut state, &input, DT);
            for event in &state.events {
                log_event(state.time_ticks, event);
            }
            if state.phase == GamePhase::GameOver {
                break;
            }
        }

        let snapshot = Snapshot::capture(&state);
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        Ok(())
    }

    /// Aim at the nearest enemy with the trigger held; walk to gold once the wave is cleared
    pub fn autopilot(state: &GameState) -> TickInput {
        let pos = state.player.pos;
        let target = nearest(pos, state.enemies.iter().filter(|e| e.is_alive()).map(|e| e.pos));

        let mut input = TickInput {
            aim: target,
            fire_held: target.is_some(),
            ..Default::default()
        };

        if state.phase == GamePhase::Collection {
            if let Some(gold) = nearest(pos, state.gold_drops.iter().map(|g| g.pos)) {
                input.movement = steer(pos, gold);
            }
            let player = &state.player;
            if player.health < player.max_health * HEAL_BELOW {
                input.actions.push(Action::PurchaseHealth);
            }
        }
        input
    }

    fn nearest(from: Vec2, points: impl Iterator<Item = Vec2>) -> Option<Vec2> {
        points.min_by(|a, b| distance(from, *a).total_cmp(&distance(from, *b)))
    }

    fn steer(from: Vec2, to: Vec2) -> MoveIntent {
        let delta = to - from;
        MoveIntent {
            up: delta.y < -STEER_DEADZONE,
            down: delta.y > STEER_DEADZONE,
            left: delta.x < -STEER_DEADZONE,
            right: delta.x > STEER_DEADZONE,
        }
    }

    fn log_event(tick: u64, event: &GameEvent) {
        match event {
            GameEvent::EnemyKilled { kind, .. } => {
                log::info!("[{tick}] {} destroyed", kind.as_str());
            }
            GameEvent::PlayerHit { damage, guarded } => {
                log::info!("[{tick}] player hit for {damage} (guarded: {guarded})");
            }
            other => log::debug!("[{tick}] {other:?}"),
        }
    }

}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    headless::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The library is the wasm artifact; there is no browser entry point here
}
