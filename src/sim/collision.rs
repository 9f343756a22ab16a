//! Collision detection and damage resolution
//!
//! Everything is a circle: bullets and mines by their radius, enemies by
//! `Enemy::collision_radius` (half the side for square bodies), the player by
//! `size`. A kill is resolved the moment health crosses zero; the corpse stays
//! in the list, ignored by every hit test, until `remove_dead` runs at the end
//! of the pass.

use glam::Vec2;

use super::enemy::Enemy;
use super::state::{GameEvent, GameState, GoldDrop, MineState, Roster};
use crate::consts::*;
use crate::{distance, unit_toward};

/// Strict circle overlap (touching circles do not collide)
#[inline]
pub fn circles_overlap(a: Vec2, radius_a: f32, b: Vec2, radius_b: f32) -> bool {
    distance(a, b) < radius_a + radius_b
}

/// Damage scale for hits on the boss given its standing turrets
pub fn boss_damage_multiplier(live_turrets: usize) -> f32 {
    BOSS_DAMAGE_BY_TURRETS[live_turrets.min(BOSS_DAMAGE_BY_TURRETS.len() - 1)]
}

/// Last-spawned live enemy overlapping the circle, if any
fn first_hit(state: &GameState, pos: Vec2, radius: f32) -> Option<usize> {
    (0..state.enemies.len()).rev().find(|&index| {
        let enemy = &state.enemies[index];
        enemy.is_alive() && circles_overlap(pos, radius, enemy.pos, enemy.collision_radius())
    })
}

/// Hurt `enemies[index]`: wakes sentinels and resolves a kill exactly once
pub fn damage_enemy(state: &mut GameState, index: usize, amount: f32) {
    let enemy = &mut state.enemies[index];
    enemy.activate();
    if enemy.apply_damage(amount) {
        on_enemy_killed(state, index);
    }
}

/// Gold drop and boss turret bookkeeping for a fresh kill
fn on_enemy_killed(state: &mut GameState, index: usize) {
    let enemy = &state.enemies[index];
    let (id, kind, pos) = (enemy.id, enemy.enemy_type(), enemy.pos);
    let turret_side = enemy.turret_side();

    // Boss turrets only pay out while the boss stands, checked right now
    let dropped_gold = turret_side.is_none() || state.boss_alive();
    if dropped_gold {
        let gold_id = state.next_entity_id();
        state.gold_drops.push(GoldDrop { id: gold_id, pos });
    }

    if let Some(side) = turret_side {
        let now_ms = state.time_ms;
        let slot = state.boss_slots.slot_mut(side);
        slot.destroyed = true;
        slot.respawn_started_ms.get_or_insert(now_ms);
    }

    log::debug!("Enemy {} ({}) killed at ({:.0}, {:.0})", id, kind.as_str(), pos.x, pos.y);
    state.events.push(GameEvent::EnemyKilled {
        id,
        kind,
        pos,
        dropped_gold,
    });
}

/// Drop every dead enemy from the list
pub fn remove_dead(state: &mut GameState) {
    state.enemies.retain(|e| e.is_alive());
}

/// Move player bullets and apply single-target hits
pub fn advance_bullets(state: &mut GameState, dt: f32) {
    let mut bullets = std::mem::take(&mut state.bullets);

    bullets.retain_mut(|bullet| {
        bullet.pos += bullet.vel * dt * FRAME_RATE;

        if let Some(index) = first_hit(state, bullet.pos, bullet.radius) {
            let mut damage = bullet.damage;
            if state.enemies[index].is_boss() {
                damage *= boss_damage_multiplier(Roster::build(&state.enemies).live_turrets());
            }
            damage_enemy(state, index, damage);
            return false;
        }

        state.settings.in_bounds(bullet.pos)
    });

    state.bullets = bullets;
    remove_dead(state);
}

/// Arm, detonate and expire mines
pub fn advance_mines(state: &mut GameState) {
    let now_ms = state.time_ms;
    let config = state.settings.mines.clone();
    let mut mines = std::mem::take(&mut state.mines);

    mines.retain_mut(|mine| match mine.state {
        MineState::Armed => {
            let touched = state.enemies.iter().any(|enemy| {
                enemy.is_alive()
                    && circles_overlap(mine.pos, mine.radius, enemy.pos, enemy.collision_radius())
            });
            if touched {
                mine.state = MineState::Exploding {
                    started_ms: now_ms,
                    last_damage_tick_ms: now_ms,
                };
            }
            true
        }
        MineState::Exploding {
            started_ms,
            last_damage_tick_ms,
        } => {
            let progress = ((now_ms - started_ms) / config.explosion_duration_ms) as f32;
            if progress >= 1.0 {
                return false;
            }
            mine.explosion_radius = config.explosion_max_radius * progress;

            if now_ms - last_damage_tick_ms >= config.tick_rate_ms {
                mine.state = MineState::Exploding {
                    started_ms,
                    last_damage_tick_ms: now_ms,
                };
                for index in (0..state.enemies.len()).rev() {
                    let enemy = &state.enemies[index];
                    if enemy.is_alive() && distance(mine.pos, enemy.pos) < mine.explosion_radius {
                        damage_enemy(state, index, config.damage_per_tick);
                    }
                }
            }
            true
        }
    });

    state.mines = mines;
    remove_dead(state);
}

/// Push `enemies[index]` and every overlapping neighbor apart by half the overlap each.
/// Boss turrets hold their mount position.
pub fn separate(enemies: &mut [Enemy], index: usize) {
    for other in 0..enemies.len() {
        if other == index || !enemies[other].is_alive() {
            continue;
        }
        let (a, b) = (&enemies[index], &enemies[other]);
        let min_distance = a.collision_radius() + b.collision_radius();
        let dist = distance(a.pos, b.pos);
        if dist >= min_distance {
            continue;
        }

        let push = unit_toward(b.pos, a.pos) * ((min_distance - dist) / 2.0);
        if enemies[index].is_pushable() {
            enemies[index].pos += push;
        }
        if enemies[other].is_pushable() {
            enemies[other].pos -= push;
        }
    }
}

/// Contact damage from `enemies[index]` to the player, with knockback
pub fn contact_player(state: &mut GameState, index: usize) {
    let enemy = &state.enemies[index];
    if !enemy.deals_contact_damage() || state.is_game_over() {
        return;
    }
    if !circles_overlap(enemy.pos, enemy.collision_radius(), state.player.pos, state.player.size) {
        return;
    }

    let damage = enemy.damage;
    let guarded = state.player.take_hit(damage);
    let away = unit_toward(state.player.pos, state.enemies[index].pos);
    state.enemies[index].pos += away * CONTACT_KNOCKBACK;
    state.events.push(GameEvent::PlayerHit { damage, guarded });
}

/// Move turret bullets; a hit on the player or leaving the arena removes them
pub fn advance_turret_bullets(state: &mut GameState, dt: f32) {
    let mut bullets = std::mem::take(&mut state.turret_bullets);

    bullets.retain_mut(|bullet| {
        bullet.pos += bullet.vel * dt * FRAME_RATE;

        if circles_overlap(bullet.pos, bullet.radius, state.player.pos, state.player.size) {
            let guarded = state.player.take_hit(bullet.damage);
            state.events.push(GameEvent::PlayerHit {
                damage: bullet.damage,
                guarded,
            });
            return false;
        }

        state.settings.in_bounds(bullet.pos)
    });

    state.turret_bullets = bullets;
}
