//! Boss level: the boss, its two mounted turrets, and turret respawns

use glam::Vec2;

use super::enemy::{EnemyType, TurretSide};
use super::state::{BossSlots, GameEvent, GameState, TurretSlot};
use crate::error::ConfigError;

/// Mount position for a turret on `side` of a boss
pub fn mount_point(boss_pos: Vec2, boss_size: f32, side: TurretSide) -> Vec2 {
    boss_pos + Vec2::new(side.offset_sign() * boss_size, 0.0)
}

fn spawn_turret(
    state: &mut GameState,
    side: TurretSide,
    boss_pos: Vec2,
    boss_size: f32,
) -> Result<u32, ConfigError> {
    state.spawn_enemy(
        EnemyType::BossTurret,
        mount_point(boss_pos, boss_size, side),
        Some(side),
    )
}

/// Populate a boss level: boss at the arena center with both turrets attached
pub fn spawn_boss_wave(state: &mut GameState) -> Result<(), ConfigError> {
    let center = state.settings.arena_center();
    state.spawn_enemy(EnemyType::Boss, center, None)?;
    let boss_size = state
        .enemies
        .last()
        .map(|boss| boss.shape.extent())
        .unwrap_or_default();

    for side in [TurretSide::Left, TurretSide::Right] {
        spawn_turret(state, side, center, boss_size)?;
    }

    state.boss_slots = BossSlots::default();
    // Only the boss itself counts toward the quota
    state.player.money = 0;
    state.player.money_required = 1;
    Ok(())
}

/// Replace destroyed turrets once their respawn delay has passed.
/// Nothing respawns while the boss is dead.
pub fn update_turret_respawns(state: &mut GameState) -> Result<(), ConfigError> {
    let roster = state.roster();
    let Some(boss) = roster.boss else {
        return Ok(());
    };
    let (boss_pos, boss_size) = (state.enemies[boss].pos, state.enemies[boss].shape.extent());
    let now_ms = state.time_ms;
    let delay_ms = state.settings.boss_turret_respawn_ms;

    for side in [TurretSide::Left, TurretSide::Right] {
        if !state.boss_slots.slot(side).destroyed || roster.turret(side).is_some() {
            continue;
        }
        let started_ms = *state
            .boss_slots
            .slot_mut(side)
            .respawn_started_ms
            .get_or_insert(now_ms);
        if now_ms - started_ms < delay_ms {
            continue;
        }

        let id = spawn_turret(state, side, boss_pos, boss_size)?;
        *state.boss_slots.slot_mut(side) = TurretSlot::default();
        log::info!("Boss turret {} respawned", side.as_str());
        state.events.push(GameEvent::TurretRespawned { side, id });
    }
    Ok(())
}
