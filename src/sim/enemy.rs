//! Enemy model
//!
//! Every enemy shares a small common record (position, velocity, health, ...)
//! and carries a per-type `EnemyKind` holding exactly the state its behavior needs.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::{angle_diff, angle_to, distance};

/// Enemy type as named in the configuration table
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EnemyType {
    Blue,
    Purple,
    Sentinel,
    Turret,
    Boss,
    BossTurret,
    Watcher,
    Screamer,
    Phantom,
}

impl EnemyType {
    pub const ALL: [EnemyType; 9] = [
        EnemyType::Blue,
        EnemyType::Purple,
        EnemyType::Sentinel,
        EnemyType::Turret,
        EnemyType::Boss,
        EnemyType::BossTurret,
        EnemyType::Watcher,
        EnemyType::Screamer,
        EnemyType::Phantom,
    ];

    /// Spawn order for normal (non-boss) waves
    pub const WAVE_ORDER: [EnemyType; 7] = [
        EnemyType::Blue,
        EnemyType::Purple,
        EnemyType::Sentinel,
        EnemyType::Turret,
        EnemyType::Watcher,
        EnemyType::Screamer,
        EnemyType::Phantom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EnemyType::Blue => "blue",
            EnemyType::Purple => "purple",
            EnemyType::Sentinel => "sentinel",
            EnemyType::Turret => "turret",
            EnemyType::Boss => "boss",
            EnemyType::BossTurret => "boss-turret",
            EnemyType::Watcher => "watcher",
            EnemyType::Screamer => "screamer",
            EnemyType::Phantom => "phantom",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == name.trim())
    }

    /// Square-bodied types collide with `size / 2`, the rest with `radius`
    pub fn is_square(&self) -> bool {
        matches!(self, EnemyType::Turret | EnemyType::Boss | EnemyType::BossTurret)
    }
}

/// Which side of the boss a turret is bolted to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurretSide {
    Left,
    Right,
}

impl TurretSide {
    /// Turret x = boss x + sign × boss size
    pub fn offset_sign(&self) -> f32 {
        match self {
            TurretSide::Left => -1.0,
            TurretSide::Right => 1.0,
        }
    }

    /// Side named by a renderer type tag such as `boss-turret-left`
    pub fn from_type_name(name: &str) -> Option<Self> {
        [TurretSide::Left, TurretSide::Right]
            .into_iter()
            .find(|side| side.as_str() == name.trim())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TurretSide::Left => "boss-turret-left",
            TurretSide::Right => "boss-turret-right",
        }
    }
}

/// Collision body
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Circle { radius: f32 },
    Square { size: f32 },
}

impl Shape {
    pub fn collision_radius(&self) -> f32 {
        match *self {
            Shape::Circle { radius } => radius,
            Shape::Square { size } => size / 2.0,
        }
    }

    /// Full width for square bodies, diameter for circles
    pub fn extent(&self) -> f32 {
        match *self {
            Shape::Circle { radius } => radius * 2.0,
            Shape::Square { size } => size,
        }
    }
}

/// Recorded player position and orientation used for investigation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ghost {
    pub pos: Vec2,
    pub rotation: f32,
}

// ---------------------------------------------------------------------------
// Dash / dormant locomotion (blue, boss, phantom)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DashParams {
    /// Player distance that triggers a dash
    pub radius: f32,
    /// Pixels per frame while dashing
    pub speed: f32,
    /// Minimum time from dash start until pursuit resumes (ms)
    pub cooldown_ms: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DashState {
    Pursue,
    Dash,
    Dormant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dasher {
    pub state: DashState,
    pub params: DashParams,
    pub last_dash_ms: f64,
    /// Direction locked in when the current dash started
    pub dash_dir: Vec2,
}

impl Dasher {
    pub fn new(params: DashParams) -> Self {
        Self {
            state: DashState::Pursue,
            params,
            last_dash_ms: 0.0,
            dash_dir: Vec2::ZERO,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhantomState {
    Pursue,
    Evade,
    Dash,
    Dormant,
}

/// A faded afterimage left while evading (render-only)
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TrailPoint {
    pub pos: Vec2,
    pub alpha: f32,
}

/// Phantom bullet-evasion budget
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Evasion {
    /// Evasion spent so far; evading is possible while below `gauge_max`
    pub gauge: f32,
    pub gauge_max: f32,
    /// Gauge spent per second of evasion
    pub rate: f32,
    /// Bullets closer than this are considered threats
    pub range: f32,
    /// Orbit direction, +1 or -1
    pub dir: f32,
    #[serde(default)]
    pub trail: Vec<TrailPoint>,
}

/// A dasher that orbits away from incoming bullets
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Phantom {
    pub dash: Dasher,
    /// Only ever set while `dash.state` is `Pursue`
    pub evading: bool,
    pub evade: Evasion,
}

impl Phantom {
    pub fn state(&self) -> PhantomState {
        match self.dash.state {
            DashState::Pursue if self.evading => PhantomState::Evade,
            DashState::Pursue => PhantomState::Pursue,
            DashState::Dash => PhantomState::Dash,
            DashState::Dormant => PhantomState::Dormant,
        }
    }
}

// ---------------------------------------------------------------------------
// Triggered chasers (purple, sentinel)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LurkState {
    Idle,
    Chase,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lurker {
    pub state: LurkState,
    pub activation_radius: f32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Sentinel {
    /// Set when hit by a bullet, mine or scream; never cleared
    pub activated: bool,
}

// ---------------------------------------------------------------------------
// Shooters (turret, boss turrets)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Gun {
    pub shoot_cooldown_ms: f64,
    /// `None` until the first shot, so a fresh gun fires immediately
    pub last_shot_ms: Option<f64>,
    /// Pixels per frame
    pub bullet_speed: f32,
    pub bullet_radius: f32,
}

impl Gun {
    pub fn ready(&self, now_ms: f64) -> bool {
        self.last_shot_ms
            .is_none_or(|last| now_ms - last >= self.shoot_cooldown_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BossTurret {
    pub gun: Gun,
    pub side: TurretSide,
    /// While set, the turret is re-snapped to the boss every tick
    pub boss_attached: bool,
}

// ---------------------------------------------------------------------------
// Vision (watcher, screamer)
// ---------------------------------------------------------------------------

/// Where the player sits relative to a vision cone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zone {
    Main,
    Peripheral,
    Outside,
}

/// Result of looking at a target from a given facing
#[derive(Debug, Clone, Copy)]
pub struct Sighting {
    /// Absolute angle toward the target
    pub angle: f32,
    /// Signed difference between that angle and the facing, in [-π, π]
    pub diff: f32,
    pub zone: Zone,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vision {
    /// Main cone width (radians)
    pub fov: f32,
    /// Extra width added by peripheral vision (radians, split across both sides)
    pub peripheral_fov: f32,
    /// Radians per second when turning toward a peripheral sighting
    pub turn_speed: f32,
    pub sight_range: f32,
    pub facing: f32,
}

impl Vision {
    /// Classify `target` as seen from `from` with the current facing
    pub fn look(&self, from: Vec2, target: Vec2) -> Sighting {
        self.look_with_facing(from, target, self.facing)
    }

    pub fn look_with_facing(&self, from: Vec2, target: Vec2, facing: f32) -> Sighting {
        let angle = angle_to(from, target);
        let diff = angle_diff(angle, facing);
        let in_range = distance(from, target) <= self.sight_range;
        let zone = if !in_range {
            Zone::Outside
        } else if diff.abs() <= self.fov / 2.0 {
            Zone::Main
        } else if diff.abs() <= (self.fov + self.peripheral_fov) / 2.0 {
            Zone::Peripheral
        } else {
            Zone::Outside
        };
        Sighting { angle, diff, zone }
    }

    /// Rotate toward a peripheral sighting at `turn_speed`
    pub fn turn_toward(&mut self, diff: f32, dt: f32) {
        let dir = if diff > 0.0 { 1.0 } else { -1.0 };
        self.facing += dir * self.turn_speed * dt;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WatchState {
    Idle,
    Caution,
    Chase,
    Investigate,
    Scanning,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Watcher {
    pub state: WatchState,
    pub vision: Vision,
    pub last_seen: Option<Ghost>,
    pub scan_start_angle: f32,
    /// Radians rotated since the scan began
    pub scan_progress: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScreamState {
    Idle,
    Caution,
    Alert,
    /// Sent toward a ghost by another screamer
    Investigate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Screamer {
    pub state: ScreamState,
    pub vision: Vision,
    pub alertness: f32,
    /// Alertness per second with the player in the main cone
    pub alert_rate: f32,
    /// Alertness lost per second while nothing is seen
    pub alert_decay_rate: f32,
    pub scream_radius: f32,
    /// Start time of the scream in progress
    pub screaming_since: Option<f64>,
    /// End time of the last scream; `None` means no scream yet
    pub last_scream_ms: Option<f64>,
    /// Player position broadcast by this screamer's last scream
    pub ghost: Option<Ghost>,
    /// Ghost received from another screamer
    pub last_seen: Option<Ghost>,
}

impl Screamer {
    pub fn is_screaming(&self) -> bool {
        self.screaming_since.is_some()
    }

    pub fn can_scream(&self, now_ms: f64) -> bool {
        self.alertness >= crate::consts::ALERTNESS_MAX
            && self
                .last_scream_ms
                .is_none_or(|last| now_ms - last >= crate::consts::SCREAM_COOLDOWN_MS)
    }
}

/// Per-type enemy state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EnemyKind {
    Blue(Dasher),
    Boss(Dasher),
    Phantom(Phantom),
    Purple(Lurker),
    Sentinel(Sentinel),
    Turret(Gun),
    BossTurret(BossTurret),
    Watcher(Watcher),
    Screamer(Screamer),
}

/// An enemy entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub pos: Vec2,
    /// Pixels per frame
    pub vel: Vec2,
    pub health: f32,
    pub max_health: f32,
    /// Contact damage (or bullet damage for shooters)
    pub damage: f32,
    /// Pixels per frame
    pub speed: f32,
    pub color: String,
    pub shape: Shape,
    pub kind: EnemyKind,
}

impl Enemy {
    pub fn enemy_type(&self) -> EnemyType {
        match self.kind {
            EnemyKind::Blue(_) => EnemyType::Blue,
            EnemyKind::Boss(_) => EnemyType::Boss,
            EnemyKind::Phantom(_) => EnemyType::Phantom,
            EnemyKind::Purple(_) => EnemyType::Purple,
            EnemyKind::Sentinel(_) => EnemyType::Sentinel,
            EnemyKind::Turret(_) => EnemyType::Turret,
            EnemyKind::BossTurret(_) => EnemyType::BossTurret,
            EnemyKind::Watcher(_) => EnemyType::Watcher,
            EnemyKind::Screamer(_) => EnemyType::Screamer,
        }
    }

    /// Type tag used by the renderer (boss turrets report their side)
    pub fn type_name(&self) -> &'static str {
        match &self.kind {
            EnemyKind::BossTurret(t) => t.side.as_str(),
            _ => self.enemy_type().as_str(),
        }
    }

    /// Current state tag
    pub fn state_name(&self) -> &'static str {
        match &self.kind {
            EnemyKind::Blue(d) | EnemyKind::Boss(d) => match d.state {
                DashState::Pursue => "pursue",
                DashState::Dash => "dash",
                DashState::Dormant => "dormant",
            },
            EnemyKind::Phantom(p) => match p.state() {
                PhantomState::Pursue => "pursue",
                PhantomState::Evade => "evade",
                PhantomState::Dash => "dash",
                PhantomState::Dormant => "dormant",
            },
            EnemyKind::Purple(l) => match l.state {
                LurkState::Idle => "idle",
                LurkState::Chase => "chase",
            },
            EnemyKind::Sentinel(s) => {
                if s.activated {
                    "chase"
                } else {
                    "idle"
                }
            }
            EnemyKind::Turret(_) | EnemyKind::BossTurret(_) => "stationary",
            EnemyKind::Watcher(w) => match w.state {
                WatchState::Idle => "idle",
                WatchState::Caution => "caution",
                WatchState::Chase => "chase",
                WatchState::Investigate => "investigate",
                WatchState::Scanning => "scanning",
            },
            EnemyKind::Screamer(s) => match s.state {
                ScreamState::Idle => "idle",
                ScreamState::Caution => "caution",
                ScreamState::Alert => "alert",
                ScreamState::Investigate => "investigate",
            },
        }
    }

    pub fn collision_radius(&self) -> f32 {
        self.shape.collision_radius()
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }

    pub fn is_boss(&self) -> bool {
        matches!(self.kind, EnemyKind::Boss(_))
    }

    pub fn turret_side(&self) -> Option<TurretSide> {
        match &self.kind {
            EnemyKind::BossTurret(t) => Some(t.side),
            _ => None,
        }
    }

    /// Boss turrets are slaved to the boss and never pushed around
    pub fn is_pushable(&self) -> bool {
        !matches!(self.kind, EnemyKind::BossTurret(_))
    }

    /// Shooters never deal contact damage
    pub fn deals_contact_damage(&self) -> bool {
        !matches!(self.kind, EnemyKind::Turret(_) | EnemyKind::BossTurret(_))
    }

    pub fn vision(&self) -> Option<&Vision> {
        match &self.kind {
            EnemyKind::Watcher(w) => Some(&w.vision),
            EnemyKind::Screamer(s) => Some(&s.vision),
            _ => None,
        }
    }

    /// Investigation target, if any
    pub fn last_seen(&self) -> Option<Ghost> {
        match &self.kind {
            EnemyKind::Watcher(w) => w.last_seen,
            EnemyKind::Screamer(s) => s.last_seen,
            _ => None,
        }
    }

    /// Still following up on a ghost (walking to it or scanning around it)
    pub fn is_investigating(&self) -> bool {
        match &self.kind {
            EnemyKind::Watcher(w) => {
                matches!(w.state, WatchState::Investigate | WatchState::Scanning)
            }
            EnemyKind::Screamer(s) => s.state == ScreamState::Investigate,
            _ => false,
        }
    }

    /// Wake a dormant sentinel; no effect on anything else
    pub fn activate(&mut self) {
        if let EnemyKind::Sentinel(s) = &mut self.kind {
            s.activated = true;
        }
    }

    /// Send a vision enemy to investigate `ghost`; returns false for other types
    pub fn investigate(&mut self, ghost: Ghost) -> bool {
        match &mut self.kind {
            EnemyKind::Watcher(w) => {
                w.last_seen = Some(ghost);
                w.state = WatchState::Investigate;
            }
            EnemyKind::Screamer(s) => {
                s.last_seen = Some(ghost);
                s.state = ScreamState::Investigate;
            }
            _ => return false,
        }
        self.vel = Vec2::ZERO;
        true
    }

    /// Subtract damage; returns true if this hit crossed the death threshold
    pub fn apply_damage(&mut self, amount: f32) -> bool {
        let was_alive = self.is_alive();
        self.health -= amount;
        was_alive && !self.is_alive()
    }
}
