//! Enemy behavior engine
//!
//! One `update_enemy` call per live enemy per tick. Every branch sets the
//! enemy's velocity explicitly; nothing carries over from the previous frame.

use std::f32::consts::{FRAC_PI_2, TAU};

use glam::Vec2;

use super::collision::{contact_player, separate};
use super::enemy::{
    DashState, Dasher, Enemy, EnemyKind, Ghost, Gun, Lurker, LurkState, Phantom, ScreamState,
    Screamer, TrailPoint, WatchState, Watcher, Zone,
};
use super::state::{Bullet, BulletOwner, GameEvent, GameState, Roster};
use crate::consts::*;
use crate::{angle_diff, angle_to, distance, heading, unit_toward};

/// Turret bullet color
const TURRET_BULLET_COLOR: &str = "#ff0000";

/// What an enemy can see of the world during its update
#[derive(Debug, Clone, Copy)]
pub struct Surroundings<'a> {
    pub player_pos: Vec2,
    pub player_rotation: f32,
    /// Player bullets in flight
    pub bullets: &'a [Bullet],
    /// Live boss position and size
    pub boss: Option<(Vec2, f32)>,
    pub now_ms: f64,
    pub dt: f32,
}

impl Surroundings<'_> {
    fn ghost(&self) -> Ghost {
        Ghost {
            pos: self.player_pos,
            rotation: self.player_rotation,
        }
    }
}

/// Side effect an update asks the enemy pass to carry out
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reaction {
    None,
    Fire {
        pos: Vec2,
        vel: Vec2,
        radius: f32,
        damage: f32,
    },
    Scream {
        ghost: Ghost,
        radius: f32,
    },
}

/// Run one behavior step for `enemy`
pub fn update_enemy(enemy: &mut Enemy, env: &Surroundings) -> Reaction {
    let Enemy {
        pos,
        vel,
        speed,
        damage,
        kind,
        ..
    } = enemy;
    let toward_player = unit_toward(*pos, env.player_pos);

    match kind {
        EnemyKind::Blue(dasher) | EnemyKind::Boss(dasher) => {
            wake(dasher, env.now_ms);
            *vel = step_dash(dasher, *pos, *speed, env);
            Reaction::None
        }
        EnemyKind::Phantom(phantom) => {
            *vel = update_phantom(phantom, *pos, *speed, env);
            Reaction::None
        }
        EnemyKind::Purple(lurker) => {
            *vel = update_lurker(lurker, *pos, *speed, env.player_pos);
            Reaction::None
        }
        EnemyKind::Sentinel(sentinel) => {
            *vel = if sentinel.activated {
                toward_player * *speed
            } else {
                Vec2::ZERO
            };
            Reaction::None
        }
        EnemyKind::Turret(gun) => {
            *vel = Vec2::ZERO;
            fire(gun, *pos, *damage, env)
        }
        EnemyKind::BossTurret(turret) => {
            if let Some((boss_pos, boss_size)) = env.boss.filter(|_| turret.boss_attached) {
                *pos = boss_pos + Vec2::new(turret.side.offset_sign() * boss_size, 0.0);
            }
            *vel = Vec2::ZERO;
            fire(&mut turret.gun, *pos, *damage, env)
        }
        EnemyKind::Watcher(watcher) => {
            *vel = update_watcher(watcher, *pos, *speed, env);
            Reaction::None
        }
        EnemyKind::Screamer(screamer) => {
            *vel = Vec2::ZERO;
            update_screamer(screamer, *pos, env)
        }
    }
}

/// Dormant → pursue once the cooldown since the last dash start has passed
fn wake(dasher: &mut Dasher, now_ms: f64) {
    if dasher.state == DashState::Dormant && now_ms - dasher.last_dash_ms >= dasher.params.cooldown_ms {
        dasher.state = DashState::Pursue;
    }
}

/// Pursue / dash / dormant step; returns the new velocity
fn step_dash(dasher: &mut Dasher, pos: Vec2, speed: f32, env: &Surroundings) -> Vec2 {
    let toward = unit_toward(pos, env.player_pos);
    match dasher.state {
        DashState::Pursue if distance(pos, env.player_pos) <= dasher.params.radius => {
            dasher.state = DashState::Dash;
            dasher.last_dash_ms = env.now_ms;
            dasher.dash_dir = toward;
            toward * dasher.params.speed
        }
        DashState::Pursue => toward * speed,
        DashState::Dash if env.now_ms - dasher.last_dash_ms >= DASH_DURATION_MS => {
            dasher.state = DashState::Dormant;
            Vec2::ZERO
        }
        // Direction stays locked for the whole dash
        DashState::Dash => dasher.dash_dir * dasher.params.speed,
        DashState::Dormant => Vec2::ZERO,
    }
}

/// True if any player bullet within `range` is heading at `pos`
fn incoming_bullet(pos: Vec2, range: f32, bullets: &[Bullet]) -> bool {
    bullets.iter().any(|bullet| {
        if distance(bullet.pos, pos) >= range {
            return false;
        }
        let bullet_heading = bullet.vel.y.atan2(bullet.vel.x);
        angle_diff(bullet_heading, angle_to(bullet.pos, pos)).abs() < EVADE_HEADING_TOLERANCE
    })
}

fn update_phantom(phantom: &mut Phantom, pos: Vec2, speed: f32, env: &Surroundings) -> Vec2 {
    wake(&mut phantom.dash, env.now_ms);

    let evade = &mut phantom.evade;
    let threatened = phantom.dash.state == DashState::Pursue
        && evade.gauge < evade.gauge_max
        && incoming_bullet(pos, evade.range, env.bullets);

    let vel = if threatened {
        phantom.evading = true;
        let orbit = angle_to(env.player_pos, pos) + FRAC_PI_2 * evade.dir;
        evade.gauge = (evade.gauge + evade.rate * env.dt).min(evade.gauge_max);
        evade.trail.push(TrailPoint {
            pos,
            alpha: EVADE_TRAIL_ALPHA,
        });
        if evade.trail.len() > EVADE_TRAIL_LENGTH {
            evade.trail.remove(0);
        }
        heading(orbit) * phantom.dash.params.speed * EVADE_SPEED_FACTOR
    } else {
        phantom.evading = false;
        step_dash(&mut phantom.dash, pos, speed, env)
    };

    for point in &mut evade.trail {
        point.alpha -= EVADE_TRAIL_FADE * env.dt;
    }
    evade.trail.retain(|point| point.alpha > 0.0);

    vel
}

fn update_lurker(lurker: &mut Lurker, pos: Vec2, speed: f32, player_pos: Vec2) -> Vec2 {
    match lurker.state {
        LurkState::Idle => {
            if distance(pos, player_pos) <= lurker.activation_radius {
                lurker.state = LurkState::Chase;
            }
            Vec2::ZERO
        }
        LurkState::Chase => unit_toward(pos, player_pos) * speed,
    }
}

fn fire(gun: &mut Gun, pos: Vec2, damage: f32, env: &Surroundings) -> Reaction {
    if !gun.ready(env.now_ms) {
        return Reaction::None;
    }
    gun.last_shot_ms = Some(env.now_ms);
    Reaction::Fire {
        pos,
        vel: unit_toward(pos, env.player_pos) * gun.bullet_speed,
        radius: gun.bullet_radius,
        damage,
    }
}

fn watcher_chase(watcher: &mut Watcher, angle: f32, speed: f32, env: &Surroundings) -> Vec2 {
    watcher.state = WatchState::Chase;
    watcher.vision.facing = angle;
    watcher.last_seen = Some(env.ghost());
    heading(angle) * speed
}

fn update_watcher(watcher: &mut Watcher, pos: Vec2, speed: f32, env: &Surroundings) -> Vec2 {
    let sighting = watcher.vision.look(pos, env.player_pos);
    let was_aware = matches!(watcher.state, WatchState::Chase | WatchState::Caution);

    match sighting.zone {
        Zone::Main => return watcher_chase(watcher, sighting.angle, speed, env),
        Zone::Peripheral => {
            if watcher.state == WatchState::Chase {
                watcher.last_seen = Some(env.ghost());
            }
            watcher.state = WatchState::Caution;
            watcher.vision.turn_toward(sighting.diff, env.dt);
            return Vec2::ZERO;
        }
        Zone::Outside => {}
    }

    if was_aware && watcher.last_seen.is_some() {
        watcher.state = WatchState::Investigate;
        return Vec2::ZERO;
    }

    match watcher.state {
        WatchState::Investigate => {
            let Some(target) = watcher.last_seen else {
                watcher.state = WatchState::Idle;
                return Vec2::ZERO;
            };
            let angle = angle_to(pos, target.pos);
            watcher.vision.facing = angle;

            let vel = if distance(pos, target.pos) > INVESTIGATE_ARRIVAL_DISTANCE {
                heading(angle) * speed * INVESTIGATE_SPEED_FACTOR
            } else {
                watcher.state = WatchState::Scanning;
                watcher.scan_start_angle = angle;
                watcher.scan_progress = 0.0;
                Vec2::ZERO
            };

            // Turning toward the ghost may bring the player into view
            let sighting = watcher.vision.look(pos, env.player_pos);
            match sighting.zone {
                Zone::Main => watcher_chase(watcher, sighting.angle, speed, env),
                Zone::Peripheral => {
                    watcher.state = WatchState::Caution;
                    Vec2::ZERO
                }
                Zone::Outside => vel,
            }
        }
        WatchState::Scanning => {
            watcher.scan_progress += SCAN_SPEED * env.dt;
            watcher.vision.facing = watcher.scan_start_angle + watcher.scan_progress;

            let sighting = watcher.vision.look(pos, env.player_pos);
            match sighting.zone {
                Zone::Main => watcher_chase(watcher, sighting.angle, speed, env),
                Zone::Peripheral => {
                    watcher.state = WatchState::Caution;
                    Vec2::ZERO
                }
                Zone::Outside => {
                    if watcher.scan_progress >= TAU {
                        watcher.state = WatchState::Idle;
                        watcher.last_seen = None;
                    }
                    Vec2::ZERO
                }
            }
        }
        _ => {
            watcher.state = WatchState::Idle;
            Vec2::ZERO
        }
    }
}

/// Screamers never move; velocity is zeroed by the caller
fn update_screamer(screamer: &mut Screamer, pos: Vec2, env: &Surroundings) -> Reaction {
    if let Some(since) = screamer.screaming_since {
        if env.now_ms - since >= SCREAM_DURATION_MS {
            screamer.screaming_since = None;
            screamer.last_scream_ms = Some(env.now_ms);
            screamer.alertness = 0.0;
        }
        return Reaction::None;
    }

    let sighting = screamer.vision.look(pos, env.player_pos);
    match sighting.zone {
        Zone::Main => {
            screamer.state = ScreamState::Alert;
            screamer.vision.facing = sighting.angle;
            screamer.alertness += screamer.alert_rate * env.dt;
        }
        Zone::Peripheral => {
            screamer.state = ScreamState::Caution;
            screamer.alertness += screamer.alert_rate * PERIPHERAL_ALERT_FACTOR * env.dt;
            screamer.vision.turn_toward(sighting.diff, env.dt);
        }
        Zone::Outside => {
            screamer.state = ScreamState::Idle;
            screamer.alertness = (screamer.alertness - screamer.alert_decay_rate * env.dt).max(0.0);
            return Reaction::None;
        }
    }
    screamer.alertness = screamer.alertness.min(ALERTNESS_MAX);

    if !screamer.can_scream(env.now_ms) {
        return Reaction::None;
    }
    let ghost = env.ghost();
    screamer.alertness = ALERTNESS_MAX;
    screamer.screaming_since = Some(env.now_ms);
    screamer.ghost = Some(ghost);
    Reaction::Scream {
        ghost,
        radius: screamer.scream_radius,
    }
}

/// Broadcast a scream from `enemies[source]`. Watchers and screamers go to
/// investigate the ghost, sentinels wake up. Returns how many enemies reacted.
pub fn alert_nearby(enemies: &mut [Enemy], source: usize, ghost: Ghost, radius: f32) -> usize {
    let origin = enemies[source].pos;
    let mut alerted = 0;
    for (index, other) in enemies.iter_mut().enumerate() {
        if index == source || !other.is_alive() || distance(origin, other.pos) > radius {
            continue;
        }
        if other.investigate(ghost) {
            alerted += 1;
        } else if let EnemyKind::Sentinel(sentinel) = &mut other.kind {
            sentinel.activated = true;
            alerted += 1;
        }
    }
    alerted
}

/// Drop a screamer's ghost once nobody is following it up any more
fn clear_stale_ghost(enemies: &mut [Enemy], index: usize) {
    let EnemyKind::Screamer(screamer) = &enemies[index].kind else {
        return;
    };
    let Some(ghost) = screamer.ghost else {
        return;
    };
    if screamer.is_screaming() {
        return;
    }

    let followed = enemies.iter().enumerate().any(|(other_index, other)| {
        other_index != index
            && other.is_investigating()
            && other.last_seen().is_some_and(|seen| seen.pos == ghost.pos)
    });
    if followed {
        return;
    }
    if let EnemyKind::Screamer(screamer) = &mut enemies[index].kind {
        screamer.ghost = None;
    }
}

/// Enemy pass: behavior, integration, separation and contact with the player
pub fn advance_enemies(state: &mut GameState, dt: f32) {
    let now_ms = state.time_ms;

    for index in 0..state.enemies.len() {
        if !state.enemies[index].is_alive() {
            continue;
        }

        // Fresh lookup every time; positions move during the pass
        let boss = Roster::build(&state.enemies)
            .boss
            .map(|b| (state.enemies[b].pos, state.enemies[b].shape.extent()));
        let env = Surroundings {
            player_pos: state.player.pos,
            player_rotation: state.player.rotation,
            bullets: &state.bullets,
            boss,
            now_ms,
            dt,
        };
        let reaction = update_enemy(&mut state.enemies[index], &env);

        match reaction {
            Reaction::None => {}
            Reaction::Fire {
                pos,
                vel,
                radius,
                damage,
            } => {
                let id = state.next_entity_id();
                state.turret_bullets.push(Bullet {
                    id,
                    pos,
                    vel,
                    radius,
                    damage,
                    color: TURRET_BULLET_COLOR.to_string(),
                    owner: BulletOwner::Turret,
                });
            }
            Reaction::Scream { ghost, radius } => {
                let alerted = alert_nearby(&mut state.enemies, index, ghost, radius);
                let screamer = state.enemies[index].id;
                log::debug!("Screamer {screamer} screamed, {alerted} enemies alerted");
                state.events.push(GameEvent::Scream {
                    screamer,
                    ghost: ghost.pos,
                    alerted,
                });
            }
        }

        let enemy = &mut state.enemies[index];
        enemy.pos += enemy.vel * dt * FRAME_RATE;

        clear_stale_ghost(&mut state.enemies, index);
        separate(&mut state.enemies, index);
        contact_player(state, index);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::enemy::{EnemyType, TurretSide};
    use crate::sim::state::tests::empty_state;

    const DT: f32 = 1.0 / 60.0;

    fn env(player_pos: Vec2, now_ms: f64) -> Surroundings<'static> {
        Surroundings {
            player_pos,
            player_rotation: 0.0,
            bullets: &[],
            boss: None,
            now_ms,
            dt: DT,
        }
    }

    fn spawn(state: &mut crate::sim::state::GameState, ty: EnemyType, pos: Vec2) -> usize {
        state.spawn_enemy(ty, pos, None).unwrap();
        state.enemies.len() - 1
    }

    fn watcher(enemy: &Enemy) -> &Watcher {
        match &enemy.kind {
            EnemyKind::Watcher(w) => w,
            _ => panic!("expected watcher"),
        }
    }

    #[test]
    fn test_blue_dash_cycle() {
        let mut state = empty_state();
        let i = spawn(&mut state, EnemyType::Blue, Vec2::new(100.0, 100.0));
        let enemy = &mut state.enemies[i];

        // Far away: pursue at normal speed
        update_enemy(enemy, &env(Vec2::new(500.0, 100.0), 0.0));
        assert_eq!(enemy.state_name(), "pursue");
        assert!((enemy.vel - Vec2::new(1.5, 0.0)).length() < 1e-4);

        // Inside dash radius: dash, velocity locked
        update_enemy(enemy, &env(Vec2::new(200.0, 100.0), 1000.0));
        assert_eq!(enemy.state_name(), "dash");
        assert!((enemy.vel - Vec2::new(8.0, 0.0)).length() < 1e-4);
        update_enemy(enemy, &env(Vec2::new(100.0, 200.0), 1100.0));
        assert!((enemy.vel - Vec2::new(8.0, 0.0)).length() < 1e-4);

        // 300 ms later: dormant and still
        update_enemy(enemy, &env(Vec2::new(200.0, 100.0), 1300.0));
        assert_eq!(enemy.state_name(), "dormant");
        assert_eq!(enemy.vel, Vec2::ZERO);

        // Cooldown counts from the dash start
        update_enemy(enemy, &env(Vec2::new(500.0, 100.0), 2999.0));
        assert_eq!(enemy.state_name(), "dormant");
        update_enemy(enemy, &env(Vec2::new(500.0, 100.0), 3000.0));
        assert_eq!(enemy.state_name(), "pursue");
    }

    #[test]
    fn test_purple_chase_is_one_way() {
        let mut state = empty_state();
        let i = spawn(&mut state, EnemyType::Purple, Vec2::new(100.0, 100.0));
        let enemy = &mut state.enemies[i];

        update_enemy(enemy, &env(Vec2::new(250.0, 100.0), 0.0));
        assert_eq!(enemy.state_name(), "chase");
        assert_eq!(enemy.vel, Vec2::ZERO);

        update_enemy(enemy, &env(Vec2::new(1000.0, 100.0), 16.0));
        assert_eq!(enemy.state_name(), "chase");
        assert!((enemy.vel - Vec2::new(3.0, 0.0)).length() < 1e-4);
    }

    #[test]
    fn test_sentinel_waits_until_activated() {
        let mut state = empty_state();
        let i = spawn(&mut state, EnemyType::Sentinel, Vec2::new(100.0, 100.0));
        let enemy = &mut state.enemies[i];

        update_enemy(enemy, &env(Vec2::new(120.0, 100.0), 0.0));
        assert_eq!(enemy.vel, Vec2::ZERO);

        enemy.activate();
        update_enemy(enemy, &env(Vec2::new(200.0, 100.0), 16.0));
        assert_eq!(enemy.state_name(), "chase");
        assert!((enemy.vel - Vec2::new(2.5, 0.0)).length() < 1e-4);
    }

    #[test]
    fn test_turret_fires_on_cooldown() {
        let mut state = empty_state();
        let i = spawn(&mut state, EnemyType::Turret, Vec2::new(100.0, 100.0));
        let enemy = &mut state.enemies[i];
        let player = Vec2::new(100.0, 300.0);

        let Reaction::Fire { vel, radius, damage, .. } = update_enemy(enemy, &env(player, 0.0)) else {
            panic!("fresh turret should fire");
        };
        assert!((vel - Vec2::new(0.0, 5.0)).length() < 1e-4);
        assert_eq!(radius, 4.0);
        assert_eq!(damage, 10.0);

        assert_eq!(update_enemy(enemy, &env(player, 1499.0)), Reaction::None);
        assert!(matches!(update_enemy(enemy, &env(player, 1500.0)), Reaction::Fire { .. }));
    }

    #[test]
    fn test_boss_turret_snaps_to_boss() {
        let mut state = empty_state();
        state
            .spawn_enemy(EnemyType::BossTurret, Vec2::ZERO, Some(TurretSide::Right))
            .unwrap();
        let turret = &mut state.enemies[0];

        let mut surroundings = env(Vec2::new(0.0, 0.0), 0.0);
        surroundings.boss = Some((Vec2::new(400.0, 300.0), 80.0));
        update_enemy(turret, &surroundings);
        assert_eq!(turret.pos, Vec2::new(480.0, 300.0));
        assert_eq!(turret.vel, Vec2::ZERO);
    }

    #[test]
    fn test_phantom_evades_incoming_bullet() {
        let mut state = empty_state();
        let i = spawn(&mut state, EnemyType::Phantom, Vec2::new(600.0, 100.0));
        let enemy = &mut state.enemies[i];

        // Bullet 50 px to the left, flying right at the phantom
        let bullets = [Bullet {
            id: 99,
            pos: Vec2::new(550.0, 100.0),
            vel: Vec2::new(10.0, 0.0),
            radius: 5.0,
            damage: 10.0,
            color: String::new(),
            owner: BulletOwner::Player,
        }];
        let surroundings = Surroundings {
            bullets: &bullets,
            ..env(Vec2::new(100.0, 100.0), 0.0)
        };
        update_enemy(enemy, &surroundings);
        assert_eq!(enemy.state_name(), "evade");
        // Orbit is perpendicular to the player line at 0.7 × dash speed
        assert!(enemy.vel.x.abs() < 1e-4);
        assert!((enemy.vel.length() - 7.0 * 0.7).abs() < 1e-4);

        let EnemyKind::Phantom(phantom) = &enemy.kind else {
            panic!("expected phantom");
        };
        assert!((phantom.evade.gauge - 35.0 * DT).abs() < 1e-4);
        assert_eq!(phantom.evade.trail.len(), 1);

        // Threat gone: back to pursuit
        update_enemy(enemy, &env(Vec2::new(100.0, 100.0), 16.0));
        assert_eq!(enemy.state_name(), "pursue");
        assert!((enemy.vel - Vec2::new(-1.5, 0.0)).length() < 1e-4);
    }

    #[test]
    fn test_phantom_full_gauge_ignores_bullets() {
        let mut state = empty_state();
        let i = spawn(&mut state, EnemyType::Phantom, Vec2::new(600.0, 100.0));
        let enemy = &mut state.enemies[i];
        if let EnemyKind::Phantom(phantom) = &mut enemy.kind {
            phantom.evade.gauge = phantom.evade.gauge_max;
        }
        let bullets = [Bullet {
            id: 99,
            pos: Vec2::new(550.0, 100.0),
            vel: Vec2::new(10.0, 0.0),
            radius: 5.0,
            damage: 10.0,
            color: String::new(),
            owner: BulletOwner::Player,
        }];
        let surroundings = Surroundings {
            bullets: &bullets,
            ..env(Vec2::new(100.0, 100.0), 0.0)
        };
        update_enemy(enemy, &surroundings);
        assert_eq!(enemy.state_name(), "pursue");
    }

    #[test]
    fn test_watcher_chase_then_investigate() {
        let mut state = empty_state();
        let i = spawn(&mut state, EnemyType::Watcher, Vec2::new(100.0, 100.0));
        let enemy = &mut state.enemies[i];

        // Straight ahead (facing 0): chase and remember
        update_enemy(enemy, &env(Vec2::new(300.0, 100.0), 0.0));
        assert_eq!(enemy.state_name(), "chase");
        assert_eq!(watcher(enemy).last_seen.map(|g| g.pos), Some(Vec2::new(300.0, 100.0)));

        // Out of range: investigate, standing still for this frame
        update_enemy(enemy, &env(Vec2::new(1000.0, 600.0), 16.0));
        assert_eq!(enemy.state_name(), "investigate");
        assert_eq!(enemy.vel, Vec2::ZERO);

        // Walk toward the remembered spot at 0.6 × speed
        update_enemy(enemy, &env(Vec2::new(1000.0, 600.0), 32.0));
        assert_eq!(enemy.state_name(), "investigate");
        assert!((enemy.vel - Vec2::new(1.2, 0.0)).length() < 1e-4);

        // Arrival starts the scan
        enemy.pos = Vec2::new(295.0, 100.0);
        update_enemy(enemy, &env(Vec2::new(1000.0, 600.0), 48.0));
        assert_eq!(enemy.state_name(), "scanning");
    }

    #[test]
    fn test_watcher_peripheral_caution_turns() {
        let mut state = empty_state();
        let i = spawn(&mut state, EnemyType::Watcher, Vec2::new(100.0, 100.0));
        let enemy = &mut state.enemies[i];

        // 45° above the facing: peripheral
        update_enemy(enemy, &env(Vec2::new(200.0, 200.0), 0.0));
        assert_eq!(enemy.state_name(), "caution");
        assert_eq!(enemy.vel, Vec2::ZERO);
        assert!((watcher(enemy).vision.facing - 1.5 * DT).abs() < 1e-5);
    }

    #[test]
    fn test_watcher_scan_completes_after_full_turn() {
        let mut state = empty_state();
        let i = spawn(&mut state, EnemyType::Watcher, Vec2::new(100.0, 100.0));
        let enemy = &mut state.enemies[i];
        if let EnemyKind::Watcher(w) = &mut enemy.kind {
            w.state = WatchState::Scanning;
            w.scan_start_angle = 0.0;
            w.scan_progress = 0.0;
            w.last_seen = Some(Ghost {
                pos: Vec2::new(100.0, 100.0),
                rotation: 0.0,
            });
        }
        // Player far out of sight range the whole time
        let player = Vec2::new(1200.0, 700.0);

        // 2π / 1.5 s ≈ 251.3 frames
        for frame in 0..250 {
            update_enemy(enemy, &env(player, frame as f64 * 16.0));
        }
        assert_eq!(enemy.state_name(), "scanning");

        for frame in 250..253 {
            update_enemy(enemy, &env(player, frame as f64 * 16.0));
        }
        assert_eq!(enemy.state_name(), "idle");
        assert!(watcher(enemy).last_seen.is_none());
    }

    #[test]
    fn test_screamer_builds_alertness_and_screams() {
        let mut state = empty_state();
        let i = spawn(&mut state, EnemyType::Screamer, Vec2::new(100.0, 100.0));
        let enemy = &mut state.enemies[i];
        let player = Vec2::new(300.0, 100.0);

        let mut screamed_at = None;
        for frame in 0..200 {
            let now = frame as f64 * 1000.0 / 60.0;
            if let Reaction::Scream { ghost, radius } = update_enemy(enemy, &env(player, now)) {
                assert_eq!(ghost.pos, player);
                assert_eq!(radius, 300.0);
                screamed_at = Some(frame);
                break;
            }
        }
        // alertRate 40/s reaches 100 after 2.5 s
        let frame = screamed_at.expect("screamer never screamed");
        assert!((149..=151).contains(&frame));

        let EnemyKind::Screamer(s) = &enemy.kind else {
            panic!("expected screamer");
        };
        assert!(s.is_screaming());
        assert_eq!(s.alertness, 100.0);
    }

    fn screamer(enemy: &Enemy) -> &Screamer {
        match &enemy.kind {
            EnemyKind::Screamer(s) => s,
            _ => panic!("expected screamer"),
        }
    }

    #[test]
    fn test_scream_pulse_then_cooldown() {
        let mut state = empty_state();
        let i = spawn(&mut state, EnemyType::Screamer, Vec2::new(100.0, 100.0));
        let enemy = &mut state.enemies[i];
        // Straight ahead, inside the main cone for the whole test
        let player = Vec2::new(300.0, 100.0);
        if let EnemyKind::Screamer(s) = &mut enemy.kind {
            s.alertness = ALERTNESS_MAX;
        }

        assert!(matches!(update_enemy(enemy, &env(player, 1000.0)), Reaction::Scream { .. }));

        // Pulse lasts 600 ms
        assert_eq!(update_enemy(enemy, &env(player, 1599.0)), Reaction::None);
        assert!(screamer(enemy).is_screaming());
        assert_eq!(update_enemy(enemy, &env(player, 1600.0)), Reaction::None);
        assert!(!screamer(enemy).is_screaming());
        assert_eq!(screamer(enemy).alertness, 0.0);
        assert_eq!(screamer(enemy).last_scream_ms, Some(1600.0));

        // Full alertness is not enough until 5000 ms after the pulse ended
        if let EnemyKind::Screamer(s) = &mut enemy.kind {
            s.alertness = ALERTNESS_MAX;
        }
        assert_eq!(update_enemy(enemy, &env(player, 6599.0)), Reaction::None);
        assert!(!screamer(enemy).is_screaming());
        assert_eq!(screamer(enemy).alertness, ALERTNESS_MAX);

        let Reaction::Scream { ghost, .. } = update_enemy(enemy, &env(player, 6600.0)) else {
            panic!("cooldown elapsed, screamer should scream again");
        };
        assert_eq!(ghost.pos, player);
        assert_eq!(screamer(enemy).screaming_since, Some(6600.0));
    }

    /// Force a watcher into `state` facing `facing`, following up on a ghost at (300, 100)
    fn set_watcher(enemy: &mut Enemy, state: WatchState, facing: f32) {
        let EnemyKind::Watcher(w) = &mut enemy.kind else {
            panic!("expected watcher");
        };
        w.state = state;
        w.vision.facing = facing;
        w.scan_start_angle = facing;
        w.scan_progress = 0.0;
        w.last_seen = Some(Ghost {
            pos: Vec2::new(300.0, 100.0),
            rotation: 0.0,
        });
    }

    #[test]
    fn test_scanning_watcher_reacquires_player() {
        let mut state = empty_state();
        let i = spawn(&mut state, EnemyType::Watcher, Vec2::new(100.0, 100.0));
        let enemy = &mut state.enemies[i];

        // Main cone: chase and remember where the player is now
        set_watcher(enemy, WatchState::Scanning, 0.0);
        let player = Vec2::new(250.0, 120.0);
        update_enemy(enemy, &env(player, 0.0));
        assert_eq!(enemy.state_name(), "chase");
        assert_eq!(watcher(enemy).last_seen.map(|g| g.pos), Some(player));
        assert!(enemy.vel.length() > 0.0);

        // Peripheral cone: caution, standing still
        set_watcher(enemy, WatchState::Scanning, 0.0);
        update_enemy(enemy, &env(Vec2::new(200.0, 200.0), 16.0));
        assert_eq!(enemy.state_name(), "caution");
        assert_eq!(enemy.vel, Vec2::ZERO);

        // Just outside the peripheral edge until this frame's scan step turns toward it
        set_watcher(enemy, WatchState::Scanning, 0.0);
        let edge = 60f32.to_radians() + 0.01;
        let player = Vec2::new(100.0, 100.0) + heading(edge) * 200.0;
        update_enemy(enemy, &env(player, 32.0));
        assert_eq!(enemy.state_name(), "caution");
        assert!((watcher(enemy).vision.facing - SCAN_SPEED * DT).abs() < 1e-5);
    }

    #[test]
    fn test_investigating_watcher_reacquires_player() {
        let mut state = empty_state();
        let i = spawn(&mut state, EnemyType::Watcher, Vec2::new(100.0, 100.0));
        let enemy = &mut state.enemies[i];

        // Main cone: chase with a refreshed last-seen point
        set_watcher(enemy, WatchState::Investigate, 0.0);
        let player = Vec2::new(220.0, 90.0);
        update_enemy(enemy, &env(player, 0.0));
        assert_eq!(enemy.state_name(), "chase");
        assert_eq!(watcher(enemy).last_seen.map(|g| g.pos), Some(player));

        // Peripheral cone: caution
        set_watcher(enemy, WatchState::Investigate, 0.0);
        update_enemy(enemy, &env(Vec2::new(200.0, 200.0), 16.0));
        assert_eq!(enemy.state_name(), "caution");
        assert_eq!(enemy.vel, Vec2::ZERO);

        // Facing away: turning toward the ghost brings the player into the main cone
        set_watcher(enemy, WatchState::Investigate, std::f32::consts::PI);
        let player = Vec2::new(200.0, 100.0);
        update_enemy(enemy, &env(player, 32.0));
        assert_eq!(enemy.state_name(), "chase");
        assert_eq!(watcher(enemy).last_seen.map(|g| g.pos), Some(player));
        assert!((enemy.vel - Vec2::new(2.0, 0.0)).length() < 1e-4);
    }

    #[test]
    fn test_screamer_alertness_decays_to_zero() {
        let mut state = empty_state();
        let i = spawn(&mut state, EnemyType::Screamer, Vec2::new(100.0, 100.0));
        let enemy = &mut state.enemies[i];
        if let EnemyKind::Screamer(s) = &mut enemy.kind {
            s.alertness = 0.05;
        }
        update_enemy(enemy, &env(Vec2::new(1200.0, 700.0), 0.0));
        let EnemyKind::Screamer(s) = &enemy.kind else {
            panic!("expected screamer");
        };
        assert_eq!(s.state, ScreamState::Idle);
        assert_eq!(s.alertness, 0.0);
    }

    #[test]
    fn test_scream_sends_neighbors_to_ghost() {
        let mut state = empty_state();
        state.player.pos = Vec2::new(300.0, 100.0);
        let screamer = spawn(&mut state, EnemyType::Screamer, Vec2::new(100.0, 100.0));
        // Within scream range but beyond its own sight range of the player
        let near_watcher = spawn(&mut state, EnemyType::Watcher, Vec2::new(100.0, 390.0));
        let near_sentinel = spawn(&mut state, EnemyType::Sentinel, Vec2::new(50.0, 50.0));
        let far_watcher = spawn(&mut state, EnemyType::Watcher, Vec2::new(1200.0, 700.0));
        if let EnemyKind::Screamer(s) = &mut state.enemies[screamer].kind {
            s.alertness = 99.99;
        }

        let scream_pos = state.player.pos;
        state.time_ms = 10_000.0;
        advance_enemies(&mut state, DT);

        assert!(state.events.iter().any(|e| matches!(e, GameEvent::Scream { alerted: 2, .. })));
        let near = &state.enemies[near_watcher];
        assert!(near.is_investigating());
        assert_eq!(near.last_seen().map(|g| g.pos), Some(scream_pos));
        assert_eq!(state.enemies[near_sentinel].state_name(), "chase");
        assert_eq!(state.enemies[far_watcher].state_name(), "idle");

        // The ghost stays where the player was, not where the player goes
        state.player.pos = Vec2::new(600.0, 500.0);
        state.time_ms += 16.0;
        advance_enemies(&mut state, DT);
        assert_eq!(state.enemies[near_watcher].last_seen().map(|g| g.pos), Some(scream_pos));
    }

    #[test]
    fn test_ghost_cleared_when_nobody_investigates() {
        let mut state = empty_state();
        let screamer = spawn(&mut state, EnemyType::Screamer, Vec2::new(100.0, 100.0));
        if let EnemyKind::Screamer(s) = &mut state.enemies[screamer].kind {
            s.ghost = Some(Ghost {
                pos: Vec2::new(500.0, 500.0),
                rotation: 0.0,
            });
        }
        state.player.pos = Vec2::new(1200.0, 700.0);
        advance_enemies(&mut state, DT);
        let EnemyKind::Screamer(s) = &state.enemies[screamer].kind else {
            panic!("expected screamer");
        };
        assert!(s.ghost.is_none());
    }
}
