//! Render snapshot
//!
//! Copies everything a frontend draws out of `GameState` into a flat,
//! serializable frame so the simulation never has to be shared with the renderer.

use glam::Vec2;
use serde::Serialize;

use super::economy::collection_remaining_ms;
use super::enemy::{Enemy, EnemyKind};
use super::state::{Bullet, GamePhase, GameState};
use crate::fraction;

/// HUD bars, each in `0..=1`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bars {
    pub health: f32,
    pub stamina: f32,
    /// Spendable gold against this level's drop count
    pub money: f32,
    pub mines: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerView {
    pub pos: Vec2,
    pub rotation: f32,
    pub size: f32,
    pub guarding: bool,
    pub money: u32,
    pub total_money: u32,
    pub money_required: u32,
    pub mines: u32,
}

/// Vision cone for enemies that have one
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConeView {
    pub facing: f32,
    pub fov: f32,
    pub peripheral_fov: f32,
    pub sight_range: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnemyView {
    pub id: u32,
    pub kind: &'static str,
    pub state: &'static str,
    pub pos: Vec2,
    pub radius: f32,
    pub color: String,
    pub health: f32,
    pub cone: Option<ConeView>,
    pub alertness: Option<f32>,
    pub screaming: bool,
    /// Fading afterimages `(pos, alpha)` left by an evading phantom
    pub trail: Vec<(Vec2, f32)>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BulletView {
    pub pos: Vec2,
    pub radius: f32,
    pub color: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MineView {
    pub pos: Vec2,
    pub radius: f32,
    pub explosion_radius: f32,
    pub exploding: bool,
}

/// One frame's worth of drawable state
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub time_ms: f64,
    pub level: u32,
    pub is_boss_level: bool,
    pub phase: GamePhase,
    /// Collection countdown, `None` outside the collection phase
    pub collection_remaining_ms: Option<f64>,
    pub player: PlayerView,
    pub bars: Bars,
    pub enemies: Vec<EnemyView>,
    pub bullets: Vec<BulletView>,
    pub turret_bullets: Vec<BulletView>,
    pub mines: Vec<MineView>,
    pub gold: Vec<Vec2>,
    /// Last-known player positions enemies are following up on
    pub ghosts: Vec<Vec2>,
}

impl Snapshot {
    pub fn capture(state: &GameState) -> Self {
        let player = &state.player;
        let bars = Bars {
            health: fraction(player.health, player.max_health),
            stamina: fraction(player.stamina, player.max_stamina),
            money: fraction(player.available() as f32, player.money_required as f32),
            mines: fraction(player.mines as f32, player.max_mines as f32),
        };

        let live = || state.enemies.iter().filter(|e| e.is_alive());

        Self {
            time_ms: state.time_ms,
            level: state.level,
            is_boss_level: state.is_boss_level,
            phase: state.phase,
            collection_remaining_ms: collection_remaining_ms(state),
            player: PlayerView {
                pos: player.pos,
                rotation: player.rotation,
                size: player.size,
                guarding: player.guarding,
                money: player.money,
                total_money: player.total_money,
                money_required: player.money_required,
                mines: player.mines,
            },
            bars,
            enemies: live().map(enemy_view).collect(),
            bullets: state.bullets.iter().map(bullet_view).collect(),
            turret_bullets: state.turret_bullets.iter().map(bullet_view).collect(),
            mines: state
                .mines
                .iter()
                .map(|mine| MineView {
                    pos: mine.pos,
                    radius: mine.radius,
                    explosion_radius: mine.explosion_radius,
                    exploding: mine.is_exploding(),
                })
                .collect(),
            gold: state.gold_drops.iter().map(|gold| gold.pos).collect(),
            ghosts: live()
                .filter(|e| e.is_investigating())
                .filter_map(|e| e.last_seen())
                .map(|ghost| ghost.pos)
                .collect(),
        }
    }
}

fn enemy_view(enemy: &Enemy) -> EnemyView {
    let (alertness, screaming) = match &enemy.kind {
        EnemyKind::Screamer(s) => (Some(s.alertness), s.is_screaming()),
        _ => (None, false),
    };
    let trail = match &enemy.kind {
        EnemyKind::Phantom(p) => p.evade.trail.iter().map(|t| (t.pos, t.alpha)).collect(),
        _ => Vec::new(),
    };

    EnemyView {
        id: enemy.id,
        kind: enemy.type_name(),
        state: enemy.state_name(),
        pos: enemy.pos,
        radius: enemy.collision_radius(),
        color: enemy.color.clone(),
        health: fraction(enemy.health, enemy.max_health),
        cone: enemy.vision().map(|v| ConeView {
            facing: v.facing,
            fov: v.fov,
            peripheral_fov: v.peripheral_fov,
            sight_range: v.sight_range,
        }),
        alertness,
        screaming,
        trail,
    }
}

fn bullet_view(bullet: &Bullet) -> BulletView {
    BulletView {
        pos: bullet.pos,
        radius: bullet.radius,
        color: bullet.color.clone(),
    }
}
