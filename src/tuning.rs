//! Data-driven enemy configuration
//!
//! One CSV row per enemy type. Empty cells mean "not configured"; which columns
//! a type actually needs is decided when an enemy of that type is built.

use std::collections::BTreeMap;
use std::path::Path;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::BOSS_LEVEL_INTERVAL;
use crate::error::ConfigError;
use crate::sim::enemy::{
    BossTurret, DashParams, Dasher, Enemy, EnemyKind, EnemyType, Evasion, Gun, LurkState, Lurker,
    Phantom, ScreamState, Screamer, Sentinel, Shape, TurretSide, Vision, WatchState,
    Watcher,
};

/// Enemy table shipped with the game
const BUILTIN_TABLE: &str = include_str!("../data/enemies.csv");

/// Base stats for one enemy type
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnemyConfig {
    pub color: Option<String>,
    pub max_health: Option<f32>,
    pub damage: Option<f32>,
    pub normal_speed: Option<f32>,
    pub dash_speed: Option<f32>,
    pub radius: Option<f32>,
    pub size: Option<f32>,
    pub activation_radius: Option<f32>,
    pub dash_radius: Option<f32>,
    pub dash_cooldown: Option<f32>,
    pub shoot_cooldown: Option<f32>,
    pub bullet_speed: Option<f32>,
    pub bullet_radius: Option<f32>,
    /// Radians (the table stores degrees)
    pub fov: Option<f32>,
    /// Radians (the table stores degrees)
    pub peripheral_fov: Option<f32>,
    pub turn_speed: Option<f32>,
    pub sight_range: Option<f32>,
    pub alert_rate: Option<f32>,
    pub alert_decay_rate: Option<f32>,
    pub scream_radius: Option<f32>,
    pub evade_gauge_max: Option<f32>,
    pub evade_rate: Option<f32>,
    pub evade_range: Option<f32>,
    pub min_level: Option<u32>,
    pub doubles_every: Option<u32>,
}

impl EnemyConfig {
    /// Assign one CSV cell by column name; unknown columns are ignored
    fn set(&mut self, column: &str, value: &str) -> Result<(), String> {
        let num = || {
            value
                .parse::<f32>()
                .map_err(|_| format!("column {column}: \"{value}\" is not a number"))
        };
        let int = || {
            value
                .parse::<u32>()
                .map_err(|_| format!("column {column}: \"{value}\" is not an integer"))
        };
        match column {
            "color" => self.color = Some(value.to_string()),
            "maxHealth" => self.max_health = Some(num()?),
            "damage" => self.damage = Some(num()?),
            "normalSpeed" => self.normal_speed = Some(num()?),
            "dashSpeed" => self.dash_speed = Some(num()?),
            "radius" => self.radius = Some(num()?),
            "size" => self.size = Some(num()?),
            "activationRadius" => self.activation_radius = Some(num()?),
            "dashRadius" => self.dash_radius = Some(num()?),
            "dashCooldown" => self.dash_cooldown = Some(num()?),
            "shootCooldown" => self.shoot_cooldown = Some(num()?),
            "bulletSpeed" => self.bullet_speed = Some(num()?),
            "bulletRadius" => self.bullet_radius = Some(num()?),
            "fov" => self.fov = Some(num()?.to_radians()),
            "peripheralFov" => self.peripheral_fov = Some(num()?.to_radians()),
            "turnSpeed" => self.turn_speed = Some(num()?),
            "sightRange" => self.sight_range = Some(num()?),
            "alertRate" => self.alert_rate = Some(num()?),
            "alertDecayRate" => self.alert_decay_rate = Some(num()?),
            "screamRadius" => self.scream_radius = Some(num()?),
            "evadeGaugeMax" => self.evade_gauge_max = Some(num()?),
            "evadeRate" => self.evade_rate = Some(num()?),
            "evadeRange" => self.evade_range = Some(num()?),
            "minLevel" => self.min_level = Some(int()?),
            "doublesEvery" => self.doubles_every = Some(int()?),
            _ => {}
        }
        Ok(())
    }
}

/// Fetch a required column or fail with `MissingField`
fn required<T: Copy>(ty: EnemyType, value: Option<T>, field: &'static str) -> Result<T, ConfigError> {
    value.ok_or_else(|| ConfigError::MissingField {
        enemy: ty.as_str().to_string(),
        field,
    })
}

/// Table of enemy configurations keyed by type
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnemyTable {
    configs: BTreeMap<EnemyType, EnemyConfig>,
}

impl EnemyTable {
    /// The table embedded in the crate
    pub fn builtin() -> Result<Self, ConfigError> {
        Self::from_csv(BUILTIN_TABLE)
    }

    /// Load a table from a CSV file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let table = Self::from_csv(&text).map_err(|err| match err {
            ConfigError::Parse { message, .. } => ConfigError::Parse {
                path: path.display().to_string(),
                message,
            },
            other => other,
        })?;
        log::info!("Loaded {} enemy types from {}", table.len(), path.display());
        Ok(table)
    }

    /// Parse CSV text. Bad rows are skipped with a warning; the whole load only
    /// fails when the header is unusable or no row survives.
    pub fn from_csv(text: &str) -> Result<Self, ConfigError> {
        let mut lines = text
            .lines()
            .map(str::trim)
            .enumerate()
            .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'));

        let Some((_, header_line)) = lines.next() else {
            return Err(ConfigError::EmptyTable);
        };
        let header: Vec<&str> = header_line.split(',').map(str::trim).collect();
        if !header.contains(&"type") {
            return Err(ConfigError::Parse {
                path: "<enemy table>".to_string(),
                message: "header has no \"type\" column".to_string(),
            });
        }

        let mut configs = BTreeMap::new();
        for (line_index, line) in lines {
            match parse_row(&header, line) {
                Ok((ty, config)) => {
                    configs.insert(ty, config);
                }
                Err(reason) => log::warn!("Skipping enemy row {}: {}", line_index + 1, reason),
            }
        }

        if configs.is_empty() {
            return Err(ConfigError::EmptyTable);
        }
        Ok(Self { configs })
    }

    pub fn get(&self, ty: EnemyType) -> Option<&EnemyConfig> {
        self.configs.get(&ty)
    }

    pub fn len(&self) -> usize {
        self.configs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }

    /// Build an enemy by type name. The side-specific boss turret names
    /// (`boss-turret-left`, `boss-turret-right`) attach to that side.
    pub fn create_named(
        &self,
        name: &str,
        id: u32,
        pos: Vec2,
        attach: Option<TurretSide>,
        rng: &mut impl Rng,
    ) -> Result<Enemy, ConfigError> {
        if let Some(side) = TurretSide::from_type_name(name) {
            return self.create_enemy(EnemyType::BossTurret, id, pos, Some(side), rng);
        }
        let ty = EnemyType::from_name(name)
            .ok_or_else(|| ConfigError::UnknownEnemyType(name.to_string()))?;
        self.create_enemy(ty, id, pos, attach, rng)
    }

    /// Build a fully initialized enemy of `ty` at `pos`.
    ///
    /// `attach` bolts a boss turret to the given side of the boss; it is ignored
    /// for every other type.
    pub fn create_enemy(
        &self,
        ty: EnemyType,
        id: u32,
        pos: Vec2,
        attach: Option<TurretSide>,
        rng: &mut impl Rng,
    ) -> Result<Enemy, ConfigError> {
        let config = self
            .get(ty)
            .ok_or_else(|| ConfigError::UnknownEnemyType(ty.as_str().to_string()))?;

        let max_health = required(ty, config.max_health, "maxHealth")?;
        let damage = required(ty, config.damage, "damage")?;
        let speed = required(ty, config.normal_speed, "normalSpeed")?;

        let shape = if ty.is_square() {
            Shape::Square {
                size: required(ty, config.size, "size")?,
            }
        } else {
            Shape::Circle {
                radius: required(ty, config.radius, "radius")?,
            }
        };

        let dash = || -> Result<DashParams, ConfigError> {
            Ok(DashParams {
                radius: required(ty, config.dash_radius, "dashRadius")?,
                speed: config.dash_speed.unwrap_or(speed),
                cooldown_ms: required(ty, config.dash_cooldown, "dashCooldown")? as f64,
            })
        };
        let gun = || -> Result<Gun, ConfigError> {
            Ok(Gun {
                shoot_cooldown_ms: required(ty, config.shoot_cooldown, "shootCooldown")? as f64,
                last_shot_ms: None,
                bullet_speed: required(ty, config.bullet_speed, "bulletSpeed")?,
                bullet_radius: required(ty, config.bullet_radius, "bulletRadius")?,
            })
        };
        let vision = || -> Result<Vision, ConfigError> {
            Ok(Vision {
                fov: required(ty, config.fov, "fov")?,
                peripheral_fov: config.peripheral_fov.unwrap_or(0.0),
                turn_speed: config.turn_speed.unwrap_or(0.0),
                sight_range: required(ty, config.sight_range, "sightRange")?,
                facing: 0.0,
            })
        };

        let kind = match ty {
            EnemyType::Blue => EnemyKind::Blue(Dasher::new(dash()?)),
            EnemyType::Boss => EnemyKind::Boss(Dasher::new(dash()?)),
            EnemyType::Phantom => EnemyKind::Phantom(Phantom {
                dash: Dasher::new(dash()?),
                evading: false,
                evade: Evasion {
                    gauge: 0.0,
                    gauge_max: required(ty, config.evade_gauge_max, "evadeGaugeMax")?,
                    rate: config.evade_rate.unwrap_or(35.0),
                    range: config.evade_range.unwrap_or(120.0),
                    dir: if rng.random_bool(0.5) { 1.0 } else { -1.0 },
                    trail: Vec::new(),
                },
            }),
            EnemyType::Purple => EnemyKind::Purple(Lurker {
                state: LurkState::Idle,
                activation_radius: required(ty, config.activation_radius, "activationRadius")?,
            }),
            EnemyType::Sentinel => EnemyKind::Sentinel(Sentinel::default()),
            EnemyType::Turret => EnemyKind::Turret(gun()?),
            EnemyType::BossTurret => EnemyKind::BossTurret(BossTurret {
                gun: gun()?,
                side: attach.unwrap_or(TurretSide::Left),
                boss_attached: attach.is_some(),
            }),
            EnemyType::Watcher => EnemyKind::Watcher(Watcher {
                state: WatchState::Idle,
                vision: vision()?,
                last_seen: None,
                scan_start_angle: 0.0,
                scan_progress: 0.0,
            }),
            EnemyType::Screamer => EnemyKind::Screamer(Screamer {
                state: ScreamState::Idle,
                vision: vision()?,
                alertness: 0.0,
                alert_rate: required(ty, config.alert_rate, "alertRate")?,
                alert_decay_rate: config.alert_decay_rate.unwrap_or(10.0),
                scream_radius: config.scream_radius.unwrap_or(300.0),
                screaming_since: None,
                last_scream_ms: None,
                ghost: None,
                last_seen: None,
            }),
        };

        Ok(Enemy {
            id,
            pos,
            vel: Vec2::ZERO,
            health: max_health,
            max_health,
            damage,
            speed,
            color: config.color.clone().unwrap_or_else(|| "#ffffff".to_string()),
            shape,
            kind,
        })
    }

    /// How many enemies of `ty` a normal wave at `level` contains.
    ///
    /// Pure function of the table row and the level.
    pub fn spawn_count(&self, ty: EnemyType, level: u32) -> u32 {
        let Some(config) = self.get(ty) else {
            return 0;
        };
        if config.min_level.is_some_and(|min| level < min) {
            return 0;
        }

        match ty {
            EnemyType::Blue => level / 2 + 1,
            EnemyType::Purple => level,
            EnemyType::Sentinel => match config.doubles_every {
                Some(every) if every > 0 => 2u32.saturating_pow(level / every),
                _ => 1,
            },
            EnemyType::Turret => match config.min_level {
                Some(min) => (level - min) / 5 + 1,
                None => 0,
            },
            EnemyType::Boss => u32::from(is_boss_level(level)),
            // Boss turrets come with the boss; the rest are placed explicitly
            EnemyType::BossTurret
            | EnemyType::Watcher
            | EnemyType::Screamer
            | EnemyType::Phantom => 0,
        }
    }
}

/// Every tenth level is a boss level
pub fn is_boss_level(level: u32) -> bool {
    level % BOSS_LEVEL_INTERVAL == 0
}

fn parse_row(header: &[&str], line: &str) -> Result<(EnemyType, EnemyConfig), String> {
    let values: Vec<&str> = line.split(',').map(str::trim).collect();
    let mut ty = None;
    let mut config = EnemyConfig::default();

    for (column, value) in header.iter().zip(values.iter()) {
        if value.is_empty() {
            continue;
        }
        if *column == "type" {
            ty = Some(
                EnemyType::from_name(value).ok_or_else(|| format!("unknown enemy type \"{value}\""))?,
            );
        } else {
            config.set(column, value)?;
        }
    }

    let ty = ty.ok_or_else(|| "row has no type".to_string())?;
    Ok((ty, config))
}
