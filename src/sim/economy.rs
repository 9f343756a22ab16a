//! Economy and level progression
//!
//! Combat → Collection (wave cleared, timer running) → next level or GameOver.
//! Purchases spend rollover gold before this level's gold.

use glam::Vec2;
use rand::Rng;

use super::boss;
use super::enemy::EnemyType;
use super::state::{BossSlots, GameEvent, GamePhase, GameState, Player, Purchase};
use crate::distance;
use crate::error::ConfigError;
use crate::tuning::is_boss_level;

/// Give up looking for a spawn point this far from the player after this many tries
const MAX_SPAWN_ATTEMPTS: u32 = 100;

/// Gold needed to pass a level whose waves drop `money_required`
pub fn quota(money_required: u32, fraction: f32) -> u32 {
    (money_required as f32 * fraction).ceil() as u32
}

/// Random point inside the spawn margins, away from the player when possible
pub fn random_spawn_point(state: &mut GameState) -> Vec2 {
    let settings = &state.settings;
    let margin = settings.spawn_margin;
    let (max_x, max_y) = (
        (settings.arena_width - margin).max(margin),
        (settings.arena_height - margin).max(margin),
    );

    let mut pos = Vec2::new(margin, margin);
    for _ in 0..MAX_SPAWN_ATTEMPTS {
        pos = Vec2::new(
            state.rng.random_range(margin..=max_x),
            state.rng.random_range(margin..=max_y),
        );
        if distance(pos, state.player.pos) >= settings.min_spawn_distance {
            break;
        }
    }
    pos
}

/// Clear the arena and populate it for `state.level`
pub fn spawn_wave(state: &mut GameState) -> Result<(), ConfigError> {
    state.enemies.clear();
    state.gold_drops.clear();
    state.turret_bullets.clear();
    state.mines.clear();
    state.boss_slots = BossSlots::default();

    state.is_boss_level = is_boss_level(state.level);
    state.phase = GamePhase::Combat;

    if state.is_boss_level {
        boss::spawn_boss_wave(state)?;
    } else {
        let mut total = 0;
        for ty in EnemyType::WAVE_ORDER {
            let count = state.table.spawn_count(ty, state.level);
            for _ in 0..count {
                let pos = random_spawn_point(state);
                state.spawn_enemy(ty, pos, None)?;
            }
            total += count;
        }
        state.player.money = 0;
        state.player.money_required = total;
    }

    log::info!(
        "Level {}: {} enemies{}",
        state.level,
        state.enemies.len(),
        if state.is_boss_level { " (boss)" } else { "" }
    );
    state.events.push(GameEvent::LevelStarted {
        level: state.level,
        boss: state.is_boss_level,
    });
    Ok(())
}

/// Enter the collection phase once the last enemy is gone
pub fn start_collection_if_cleared(state: &mut GameState) {
    if state.phase != GamePhase::Combat || !state.enemies.is_empty() {
        return;
    }
    state.phase = GamePhase::Collection;
    state.collection_started_ms = state.time_ms;
    log::info!("Level {} cleared, collection phase started", state.level);
    state.events.push(GameEvent::CollectionStarted);
}

/// Time left in the collection phase, if it is running
pub fn collection_remaining_ms(state: &GameState) -> Option<f64> {
    (state.phase == GamePhase::Collection).then(|| {
        (state.settings.economy.collection_duration_ms - (state.time_ms - state.collection_started_ms))
            .max(0.0)
    })
}

/// Resolve the collection phase when its timer runs out
pub fn advance_collection(state: &mut GameState) -> Result<(), ConfigError> {
    if collection_remaining_ms(state).is_none_or(|remaining| remaining > 0.0) {
        return Ok(());
    }

    let required = quota(state.player.money_required, state.settings.economy.quota_fraction);
    let collected = state.player.available();
    log::info!("Collection over: {collected} gold against a quota of {required}");

    if collected >= required {
        next_level(state)
    } else {
        end_run(state);
        Ok(())
    }
}

/// Bank this level's gold and start the next level
pub fn next_level(state: &mut GameState) -> Result<(), ConfigError> {
    state.player.total_money += state.player.money;
    state.player.money = 0;
    state.level += 1;
    spawn_wave(state)
}

/// End the run
pub fn end_run(state: &mut GameState) {
    if state.phase == GamePhase::GameOver {
        return;
    }
    state.phase = GamePhase::GameOver;
    log::info!("Game over on level {}", state.level);
    state.events.push(GameEvent::GameOver { level: state.level });
}

/// Start over from level 1 with a fresh ship
pub fn restart(state: &mut GameState) -> Result<(), ConfigError> {
    let center = state.settings.arena_center();
    state.player = Player::new(&state.settings.player, center);
    state.level = 1;
    state.aim = center;
    state.fire_held = false;
    state.last_shot_ms = None;
    state.bullets.clear();
    spawn_wave(state)
}

/// Spending `cost` during the collection phase must not drop gold below the quota
fn keeps_quota(state: &GameState, cost: u32) -> bool {
    if state.phase != GamePhase::Collection {
        return true;
    }
    let required = quota(state.player.money_required, state.settings.economy.quota_fraction);
    state.player.available().saturating_sub(cost) >= required
}

fn complete_purchase(state: &mut GameState, item: Purchase, cost: u32) -> bool {
    if !keeps_quota(state, cost) {
        log::warn!("Refused {item:?} purchase: it would drop gold below the level quota");
        state.events.push(GameEvent::PurchaseRefused { item });
        return false;
    }
    state.player.spend(cost);
    state.events.push(GameEvent::Purchased { item, cost });
    true
}

/// Buy health. Needs gold and missing health.
pub fn purchase_health(state: &mut GameState) -> bool {
    let cost = state.settings.economy.health_cost;
    let player = &state.player;
    if player.available() == 0 || player.available() < cost || player.health >= player.max_health {
        state.events.push(GameEvent::PurchaseRefused {
            item: Purchase::Health,
        });
        return false;
    }
    if !complete_purchase(state, Purchase::Health, cost) {
        return false;
    }
    let player = &mut state.player;
    player.health = (player.health + state.settings.economy.health_per_purchase).min(player.max_health);
    true
}

/// Buy a mine. Needs gold and a free mine slot.
pub fn purchase_mine(state: &mut GameState) -> bool {
    let cost = state.settings.economy.mine_cost;
    let player = &state.player;
    if player.available() < cost || player.mines >= player.max_mines {
        state.events.push(GameEvent::PurchaseRefused { item: Purchase::Mine });
        return false;
    }
    if !complete_purchase(state, Purchase::Mine, cost) {
        return false;
    }
    state.player.mines += 1;
    true
}
