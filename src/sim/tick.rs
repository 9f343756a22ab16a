//! Simulation tick
//!
//! Two clocks: `dt` (clamped) scales continuous motion, while `time_ms`
//! (advanced by the same clamped delta) drives every cooldown and timer.

use glam::Vec2;

use super::behavior::advance_enemies;
use super::collision::{advance_bullets, advance_mines, advance_turret_bullets};
use super::player::{MoveIntent, advance_player, check_death, fire, guard_smash, place_mine};
use super::state::GameState;
use super::{boss, economy};
use crate::consts::MAX_DELTA;
use crate::error::ConfigError;

/// Discrete, once-per-press inputs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Shoot once (smashes instead while guarding)
    Fire,
    PlaceMine,
    GuardToggle,
    GuardSmash,
    PurchaseHealth,
    PurchaseMine,
    /// Start a new run (only after game over)
    Restart,
}

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub movement: MoveIntent,
    /// Aim point; keeps the previous one when `None`
    pub aim: Option<Vec2>,
    /// Trigger held for auto-fire
    pub fire_held: bool,
    pub actions: Vec<Action>,
}

/// Advance the game state by `dt` seconds
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    let dt = dt.clamp(0.0, MAX_DELTA);
    state.events.clear();
    state.time_ms += f64::from(dt) * 1000.0;
    state.time_ticks += 1;

    if let Some(aim) = input.aim {
        state.aim = aim;
    }
    state.fire_held = input.fire_held;

    check_death(state);

    for action in &input.actions {
        if let Err(err) = apply_action(state, *action) {
            abort_run(state, err);
        }
    }

    if !state.is_game_over() {
        advance_player(state, input.movement, dt);
    }
    advance_bullets(state, dt);
    advance_mines(state);
    if !state.is_game_over() {
        advance_enemies(state, dt);
        if let Err(err) = boss::update_turret_respawns(state) {
            abort_run(state, err);
        }
        economy::start_collection_if_cleared(state);
    }
    advance_turret_bullets(state, dt);
    if let Err(err) = economy::advance_collection(state) {
        abort_run(state, err);
    }
}

fn apply_action(state: &mut GameState, action: Action) -> Result<(), ConfigError> {
    if state.is_game_over() {
        if action == Action::Restart {
            economy::restart(state)?;
        }
        return Ok(());
    }

    match action {
        Action::Fire if state.player.guarding => {
            guard_smash(state);
        }
        Action::Fire => fire(state),
        Action::PlaceMine => {
            place_mine(state);
        }
        Action::GuardToggle => state.player.guarding = !state.player.guarding,
        Action::GuardSmash => {
            guard_smash(state);
        }
        Action::PurchaseHealth => {
            economy::purchase_health(state);
        }
        Action::PurchaseMine => {
            economy::purchase_mine(state);
        }
        Action::Restart => {}
    }
    Ok(())
}

/// A wave could not be built from the enemy table; the loop has no error
/// channel, so the run ends here.
fn abort_run(state: &mut GameState, err: ConfigError) {
    log::error!("Configuration error, ending run: {err}");
    economy::end_run(state);
}
