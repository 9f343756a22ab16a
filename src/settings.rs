//! Run-level game rules
//!
//! Everything about a run that isn't per-enemy-type: arena, player, weapons,
//! mines, economy and timers. Stored as JSON; every field has a default.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Player starting stats
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerSettings {
    /// Collision radius and wall margin
    pub size: f32,
    /// Pixels per frame (×60 for px/s)
    pub speed: f32,
    pub max_health: f32,
    pub max_stamina: f32,
    /// Stamina per second while not guarding
    pub stamina_regen_rate: f32,
    pub max_mines: u32,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            size: 20.0,
            speed: 5.0,
            max_health: 100.0,
            max_stamina: 100.0,
            stamina_regen_rate: 10.0,
            max_mines: 5,
        }
    }
}

/// Player weapon
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponSettings {
    /// Pixels per frame
    pub bullet_speed: f32,
    pub bullet_radius: f32,
    /// Base damage before boss scaling
    pub bullet_damage: f32,
    /// Auto-fire interval while the trigger is held (ms)
    pub fire_cooldown_ms: f64,
}

impl Default for WeaponSettings {
    fn default() -> Self {
        Self {
            bullet_speed: 10.0,
            bullet_radius: 5.0,
            bullet_damage: 10.0,
            fire_cooldown_ms: 200.0,
        }
    }
}

/// Mine explosion tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MineSettings {
    pub radius: f32,
    pub core_radius: f32,
    pub explosion_max_radius: f32,
    pub explosion_duration_ms: f64,
    pub damage_per_tick: f32,
    pub tick_rate_ms: f64,
}

impl Default for MineSettings {
    fn default() -> Self {
        Self {
            radius: 12.0,
            core_radius: 6.0,
            explosion_max_radius: 100.0,
            explosion_duration_ms: 1000.0,
            damage_per_tick: 5.0,
            tick_rate_ms: 100.0,
        }
    }
}

/// Currency, shop and quota rules
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomySettings {
    pub gold_pickup_radius: f32,
    pub health_cost: u32,
    /// Health restored per purchase
    pub health_per_purchase: f32,
    pub mine_cost: u32,
    /// Length of the collection phase (ms)
    pub collection_duration_ms: f64,
    /// Fraction of `money_required` needed to advance
    pub quota_fraction: f32,
}

impl Default for EconomySettings {
    fn default() -> Self {
        Self {
            gold_pickup_radius: 30.0,
            health_cost: 1,
            health_per_purchase: 1.0,
            mine_cost: 5,
            collection_duration_ms: 10_000.0,
            quota_fraction: 0.5,
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Arena ===
    pub arena_width: f32,
    pub arena_height: f32,
    /// Enemies spawn at least this far from the arena edge
    pub spawn_margin: f32,
    /// Enemies spawn at least this far from the player
    pub min_spawn_distance: f32,

    // === Entities ===
    pub player: PlayerSettings,
    pub weapon: WeaponSettings,
    pub mines: MineSettings,
    pub economy: EconomySettings,

    // === Boss ===
    /// Delay before a destroyed boss turret is replaced (ms)
    pub boss_turret_respawn_ms: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            arena_width: 1280.0,
            arena_height: 720.0,
            spawn_margin: 50.0,
            min_spawn_distance: 300.0,

            player: PlayerSettings::default(),
            weapon: WeaponSettings::default(),
            mines: MineSettings::default(),
            economy: EconomySettings::default(),

            boss_turret_respawn_ms: 10_000.0,
        }
    }
}

impl Settings {
    /// Parse settings from a JSON document
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Parse {
            path: "<settings>".to_string(),
            message: e.to_string(),
        })
    }

    /// Load settings from a JSON file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let settings = serde_json::from_str(&json).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Arena center
    pub fn arena_center(&self) -> glam::Vec2 {
        glam::Vec2::new(self.arena_width / 2.0, self.arena_height / 2.0)
    }

    /// Whether a point lies inside the arena rectangle (edges inclusive)
    pub fn in_bounds(&self, pos: glam::Vec2) -> bool {
        pos.x >= 0.0 && pos.x <= self.arena_width && pos.y >= 0.0 && pos.y <= self.arena_height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings =
            Settings::from_json(r#"{ "arena_width": 800, "economy": { "mine_cost": 7 } }"#)
                .unwrap();
        assert_eq!(settings.arena_width, 800.0);
        assert_eq!(settings.arena_height, 720.0);
        assert_eq!(settings.economy.mine_cost, 7);
        assert_eq!(settings.economy.health_cost, 1);
        assert_eq!(settings.player.max_mines, 5);
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let err = Settings::from_json("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = Settings::load(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_in_bounds() {
        let settings = Settings::default();
        assert!(settings.in_bounds(glam::Vec2::new(0.0, 720.0)));
        assert!(!settings.in_bounds(glam::Vec2::new(-0.1, 10.0)));
        assert!(!settings.in_bounds(glam::Vec2::new(10.0, 720.5)));
    }
}
