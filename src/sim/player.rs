//! Player ship: movement, stamina, weapons, guard smash and gold pickup

use std::f32::consts::FRAC_PI_2;

use glam::Vec2;

use super::economy;
use super::state::{Bullet, BulletOwner, GameEvent, GameState, Mine, MineState};
use crate::consts::*;
use crate::{angle_diff, angle_to, distance, heading};

/// Player bullet color
const PLAYER_BULLET_COLOR: &str = "#ffff00";

/// Held movement keys
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveIntent {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl MoveIntent {
    /// Unnormalized direction (diagonals are faster, as with separate axes)
    pub fn direction(&self) -> Vec2 {
        let axis = |neg: bool, pos: bool| f32::from(u8::from(pos)) - f32::from(u8::from(neg));
        Vec2::new(axis(self.left, self.right), axis(self.up, self.down))
    }
}

/// Move, face the aim point, regenerate stamina, auto-fire and pick up gold
pub fn advance_player(state: &mut GameState, movement: MoveIntent, dt: f32) {
    let (width, height) = (state.settings.arena_width, state.settings.arena_height);
    let player = &mut state.player;

    player.pos += movement.direction() * player.speed * FRAME_RATE * dt;
    player.pos.x = player.pos.x.clamp(player.size, (width - player.size).max(player.size));
    player.pos.y = player.pos.y.clamp(player.size, (height - player.size).max(player.size));
    player.rotation = angle_to(player.pos, state.aim);

    if !player.guarding {
        player.stamina = (player.stamina + player.stamina_regen_rate * dt).min(player.max_stamina);
    }

    if state.fire_held && !state.player.guarding && fire_ready(state) {
        fire(state);
    }

    collect_gold(state);
}

fn fire_ready(state: &GameState) -> bool {
    state
        .last_shot_ms
        .is_none_or(|last| state.time_ms - last >= state.settings.weapon.fire_cooldown_ms)
}

/// Shoot toward the aim point
pub fn fire(state: &mut GameState) {
    let weapon = &state.settings.weapon;
    let pos = state.player.pos;
    let vel = heading(angle_to(pos, state.aim)) * weapon.bullet_speed;
    let (radius, damage) = (weapon.bullet_radius, weapon.bullet_damage);

    let id = state.next_entity_id();
    state.bullets.push(Bullet {
        id,
        pos,
        vel,
        radius,
        damage,
        color: PLAYER_BULLET_COLOR.to_string(),
        owner: BulletOwner::Player,
    });
    state.last_shot_ms = Some(state.time_ms);
}

/// Shove nearby enemies away; enemies in front of the ship fly further.
/// Returns false when stamina is too low.
pub fn guard_smash(state: &mut GameState) -> bool {
    if state.player.stamina < GUARD_SMASH_COST {
        return false;
    }
    state.player.stamina = (state.player.stamina - GUARD_SMASH_COST).max(0.0);

    let (origin, facing) = (state.player.pos, state.player.rotation);
    for enemy in state.enemies.iter_mut().filter(|e| e.is_alive()) {
        if distance(origin, enemy.pos) >= GUARD_SMASH_RADIUS {
            continue;
        }
        let angle = angle_to(origin, enemy.pos);
        let push = if angle_diff(angle, facing).abs() < FRAC_PI_2 {
            GUARD_SMASH_FRONT_PUSH
        } else {
            GUARD_SMASH_REAR_PUSH
        };
        enemy.pos += heading(angle) * push;
    }
    true
}

/// Drop an armed mine under the ship
pub fn place_mine(state: &mut GameState) -> bool {
    if state.player.mines == 0 {
        return false;
    }
    state.player.mines -= 1;

    let id = state.next_entity_id();
    let config = &state.settings.mines;
    state.mines.push(Mine {
        id,
        pos: state.player.pos,
        radius: config.radius,
        core_radius: config.core_radius,
        state: MineState::Armed,
        explosion_radius: 0.0,
    });
    true
}

/// Pick up every gold drop within reach
pub fn collect_gold(state: &mut GameState) {
    let (pos, reach) = (state.player.pos, state.settings.economy.gold_pickup_radius);
    let before = state.gold_drops.len();
    state.gold_drops.retain(|gold| distance(gold.pos, pos) >= reach);

    let picked = (before - state.gold_drops.len()) as u32;
    if picked > 0 {
        state.player.money += picked;
        state.events.push(GameEvent::GoldCollected {
            money: state.player.money,
        });
    }
}

/// End the run if the ship has no health left
pub fn check_death(state: &mut GameState) {
    if state.player.is_dead() {
        economy::end_run(state);
    }
}
