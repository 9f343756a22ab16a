//! Quota Shooter - an arena shooter with a per-level gold quota
//!
//! Core modules:
//! - `sim`: Deterministic simulation (enemy AI, collisions, economy, game state)
//! - `tuning`: Data-driven enemy configuration table
//! - `settings`: Run-level rules (arena, player, weapons, mines, timers)
//! - `error`: Configuration failures

pub mod error;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use error::ConfigError;
pub use settings::Settings;
pub use tuning::{EnemyConfig, EnemyTable};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Velocities are expressed in pixels per frame at this rate
    pub const FRAME_RATE: f32 = 60.0;
    /// Upper bound on a single tick's delta (seconds)
    pub const MAX_DELTA: f32 = 0.1;

    /// How long a dash lasts before the enemy goes dormant (ms)
    pub const DASH_DURATION_MS: f64 = 300.0;
    /// Phantom evasion triggers on bullets heading within this angle
    pub const EVADE_HEADING_TOLERANCE: f32 = std::f32::consts::FRAC_PI_3;
    /// Phantom orbit speed as a fraction of dash speed
    pub const EVADE_SPEED_FACTOR: f32 = 0.7;
    /// Maximum number of recorded evade trail points
    pub const EVADE_TRAIL_LENGTH: usize = 5;
    /// Alpha of a fresh trail point
    pub const EVADE_TRAIL_ALPHA: f32 = 0.4;
    /// Trail fade (alpha per second)
    pub const EVADE_TRAIL_FADE: f32 = 1.5;

    /// Watcher investigate speed as a fraction of normal speed
    pub const INVESTIGATE_SPEED_FACTOR: f32 = 0.6;
    /// Distance at which an investigator counts as arrived
    pub const INVESTIGATE_ARRIVAL_DISTANCE: f32 = 10.0;
    /// Scan rotation speed (radians per second)
    pub const SCAN_SPEED: f32 = 1.5;

    /// Alertness ceiling; reaching it triggers a scream
    pub const ALERTNESS_MAX: f32 = 100.0;
    /// Peripheral detection builds alertness at this fraction of the alert rate
    pub const PERIPHERAL_ALERT_FACTOR: f32 = 0.4;
    /// Scream duration (ms)
    pub const SCREAM_DURATION_MS: f64 = 600.0;
    /// Minimum gap between screams (ms)
    pub const SCREAM_COOLDOWN_MS: f64 = 5000.0;

    /// Knockback applied to an enemy after touching the player
    pub const CONTACT_KNOCKBACK: f32 = 20.0;

    /// Guard smash tuning
    pub const GUARD_SMASH_COST: f32 = 20.0;
    pub const GUARD_SMASH_RADIUS: f32 = 150.0;
    pub const GUARD_SMASH_FRONT_PUSH: f32 = 50.0;
    pub const GUARD_SMASH_REAR_PUSH: f32 = 25.0;

    /// Boss damage multipliers indexed by surviving turret count
    pub const BOSS_DAMAGE_BY_TURRETS: [f32; 3] = [1.5, 1.0, 0.5];

    /// Boss appears every this many levels
    pub const BOSS_LEVEL_INTERVAL: u32 = 10;
}

/// Shortest signed angular difference, normalized to [-π, π]
#[inline]
pub fn normalize_angle(angle: f32) -> f32 {
    angle.sin().atan2(angle.cos())
}

/// Facing angle from `from` toward `to`
#[inline]
pub fn angle_to(from: Vec2, to: Vec2) -> f32 {
    let d = to - from;
    d.y.atan2(d.x)
}

/// Signed difference `target - current`, normalized to [-π, π]
#[inline]
pub fn angle_diff(target: f32, current: f32) -> f32 {
    normalize_angle(target - current)
}

/// Unit vector for an angle
#[inline]
pub fn heading(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

/// Unit vector from `from` toward `to` (atan2-based so coincident points face +x)
#[inline]
pub fn unit_toward(from: Vec2, to: Vec2) -> Vec2 {
    heading(angle_to(from, to))
}

#[inline]
pub fn distance(a: Vec2, b: Vec2) -> f32 {
    (b - a).length()
}

/// `numerator / denominator` as a 0..=1 fraction, 0 when the denominator is not positive
#[inline]
pub fn fraction(numerator: f32, denominator: f32) -> f32 {
    if denominator <= 0.0 {
        0.0
    } else {
        (numerator / denominator).clamp(0.0, 1.0)
    }
}
