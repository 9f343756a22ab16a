//! Game state and core simulation types
//!
//! `GameState` is the single simulation context every update pass receives.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::economy;
use super::enemy::{Enemy, EnemyType, TurretSide};
use crate::error::ConfigError;
use crate::settings::{PlayerSettings, Settings};
use crate::tuning::{EnemyTable, is_boss_level};

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Enemies remain
    Combat,
    /// Wave cleared, quota timer running
    Collection,
    /// Run ended (death or missed quota)
    GameOver,
}

/// The player ship
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    /// Facing toward the aim point (radians)
    pub rotation: f32,
    pub size: f32,
    /// Pixels per frame
    pub speed: f32,
    pub health: f32,
    pub max_health: f32,
    pub stamina: f32,
    pub max_stamina: f32,
    pub stamina_regen_rate: f32,
    /// Gold picked up this level
    pub money: u32,
    /// Gold rolled over from earlier levels
    pub total_money: u32,
    /// Gold that can drop this level
    pub money_required: u32,
    pub mines: u32,
    pub max_mines: u32,
    pub guarding: bool,
}

impl Player {
    pub fn new(settings: &PlayerSettings, pos: Vec2) -> Self {
        Self {
            pos,
            rotation: 0.0,
            size: settings.size,
            speed: settings.speed,
            health: settings.max_health,
            max_health: settings.max_health,
            stamina: settings.max_stamina,
            max_stamina: settings.max_stamina,
            stamina_regen_rate: settings.stamina_regen_rate,
            money: 0,
            total_money: 0,
            money_required: 0,
            mines: settings.max_mines,
            max_mines: settings.max_mines,
            guarding: false,
        }
    }

    /// Absorb a hit. Guarding with stamina left drains stamina instead of health.
    /// Returns whether the guard took it.
    pub fn take_hit(&mut self, damage: f32) -> bool {
        if self.guarding && self.stamina > 0.0 {
            self.stamina = (self.stamina - damage).max(0.0);
            true
        } else {
            self.health = (self.health - damage).max(0.0);
            false
        }
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0.0
    }

    /// Gold available to spend (this level plus rollover)
    pub fn available(&self) -> u32 {
        self.money + self.total_money
    }

    /// Spend `cost`, drawing on `total_money` before `money`
    pub fn spend(&mut self, cost: u32) {
        let from_total = cost.min(self.total_money);
        self.total_money -= from_total;
        self.money = self.money.saturating_sub(cost - from_total);
    }
}

/// Which side fired a bullet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BulletOwner {
    Player,
    Turret,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bullet {
    pub id: u32,
    pub pos: Vec2,
    /// Pixels per frame
    pub vel: Vec2,
    pub radius: f32,
    pub damage: f32,
    pub color: String,
    pub owner: BulletOwner,
}

/// Mine lifecycle: armed until touched, then exploding until the explosion ends
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MineState {
    Armed,
    Exploding {
        started_ms: f64,
        last_damage_tick_ms: f64,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mine {
    pub id: u32,
    pub pos: Vec2,
    /// Trigger radius
    pub radius: f32,
    pub core_radius: f32,
    pub state: MineState,
    /// Current blast radius, grows linearly while exploding
    pub explosion_radius: f32,
}

impl Mine {
    pub fn is_exploding(&self) -> bool {
        matches!(self.state, MineState::Exploding { .. })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoldDrop {
    pub id: u32,
    pub pos: Vec2,
}

/// Respawn bookkeeping for one boss turret mount
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TurretSlot {
    pub destroyed: bool,
    /// Set when the turret died; `None` while no respawn is pending
    pub respawn_started_ms: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BossSlots {
    pub left: TurretSlot,
    pub right: TurretSlot,
}

impl BossSlots {
    pub fn slot_mut(&mut self, side: TurretSide) -> &mut TurretSlot {
        match side {
            TurretSide::Left => &mut self.left,
            TurretSide::Right => &mut self.right,
        }
    }

    pub fn slot(&self, side: TurretSide) -> &TurretSlot {
        match side {
            TurretSide::Left => &self.left,
            TurretSide::Right => &self.right,
        }
    }
}

/// Indices of the well-known boss roles among live enemies.
///
/// Rebuilt whenever needed; never kept across a mutation of the enemy list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Roster {
    pub boss: Option<usize>,
    pub left: Option<usize>,
    pub right: Option<usize>,
}

impl Roster {
    pub fn build(enemies: &[Enemy]) -> Self {
        let mut roster = Self::default();
        for (index, enemy) in enemies.iter().enumerate() {
            if !enemy.is_alive() {
                continue;
            }
            if enemy.is_boss() && roster.boss.is_none() {
                roster.boss = Some(index);
            }
            match enemy.turret_side() {
                Some(TurretSide::Left) if roster.left.is_none() => roster.left = Some(index),
                Some(TurretSide::Right) if roster.right.is_none() => roster.right = Some(index),
                _ => {}
            }
        }
        roster
    }

    pub fn turret(&self, side: TurretSide) -> Option<usize> {
        match side {
            TurretSide::Left => self.left,
            TurretSide::Right => self.right,
        }
    }

    /// Number of boss turrets still standing
    pub fn live_turrets(&self) -> usize {
        usize::from(self.left.is_some()) + usize::from(self.right.is_some())
    }
}

/// Shop items
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Purchase {
    Health,
    Mine,
}

/// Something that happened during the last tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    EnemyKilled {
        id: u32,
        kind: EnemyType,
        pos: Vec2,
        dropped_gold: bool,
    },
    GoldCollected {
        money: u32,
    },
    PlayerHit {
        damage: f32,
        guarded: bool,
    },
    Scream {
        screamer: u32,
        ghost: Vec2,
        alerted: usize,
    },
    TurretRespawned {
        side: TurretSide,
        id: u32,
    },
    CollectionStarted,
    LevelStarted {
        level: u32,
        boss: bool,
    },
    GameOver {
        level: u32,
    },
    Purchased {
        item: Purchase,
        cost: u32,
    },
    PurchaseRefused {
        item: Purchase,
    },
}

/// Complete simulation context
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub(crate) rng: Pcg32,
    pub settings: Settings,
    pub table: EnemyTable,
    /// Simulation clock (ms); all cooldowns and timers compare against this
    pub time_ms: f64,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub level: u32,
    pub is_boss_level: bool,
    pub phase: GamePhase,
    pub collection_started_ms: f64,
    pub player: Player,
    /// Aim point (arena coordinates)
    pub aim: Vec2,
    pub fire_held: bool,
    /// `None` until the first shot
    pub last_shot_ms: Option<f64>,
    pub enemies: Vec<Enemy>,
    pub bullets: Vec<Bullet>,
    pub turret_bullets: Vec<Bullet>,
    pub mines: Vec<Mine>,
    pub gold_drops: Vec<GoldDrop>,
    pub boss_slots: BossSlots,
    /// Events produced by the last tick
    pub events: Vec<GameEvent>,
    /// Next entity ID
    next_id: u32,
}

impl GameState {
    /// Start a run at level 1
    pub fn new(seed: u64, table: EnemyTable, settings: Settings) -> Result<Self, ConfigError> {
        Self::at_level(seed, table, settings, 1)
    }

    /// Start a run at an arbitrary level (`0` is treated as 1)
    pub fn at_level(
        seed: u64,
        table: EnemyTable,
        settings: Settings,
        level: u32,
    ) -> Result<Self, ConfigError> {
        let center = settings.arena_center();
        let level = level.max(1);
        let mut state = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            player: Player::new(&settings.player, center),
            settings,
            table,
            time_ms: 0.0,
            time_ticks: 0,
            level,
            is_boss_level: is_boss_level(level),
            phase: GamePhase::Combat,
            collection_started_ms: 0.0,
            aim: center,
            fire_held: false,
            last_shot_ms: None,
            enemies: Vec::new(),
            bullets: Vec::new(),
            turret_bullets: Vec::new(),
            mines: Vec::new(),
            gold_drops: Vec::new(),
            boss_slots: BossSlots::default(),
            events: Vec::new(),
            next_id: 1,
        };

        economy::spawn_wave(&mut state)?;

        Ok(state)
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Build an enemy from the table and add it to the arena
    pub fn spawn_enemy(
        &mut self,
        ty: EnemyType,
        pos: Vec2,
        attach: Option<TurretSide>,
    ) -> Result<u32, ConfigError> {
        let id = self.next_entity_id();
        let enemy = self.table.create_enemy(ty, id, pos, attach, &mut self.rng)?;
        self.enemies.push(enemy);
        Ok(id)
    }

    pub fn enemy(&self, id: u32) -> Option<&Enemy> {
        self.enemies.iter().find(|e| e.id == id)
    }

    pub fn roster(&self) -> Roster {
        Roster::build(&self.enemies)
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    /// Whether the live boss is present
    pub fn boss_alive(&self) -> bool {
        self.roster().boss.is_some()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use proptest::prelude::*;

    /// A state with the builtin table and no enemies, for hand-built scenarios
    pub(crate) fn empty_state() -> GameState {
        let table = EnemyTable::builtin().unwrap();
        let mut state = GameState::new(42, table, Settings::default()).unwrap();
        state.enemies.clear();
        state.events.clear();
        state
    }

    fn player() -> Player {
        Player::new(&PlayerSettings::default(), Vec2::new(100.0, 100.0))
    }

    #[test]
    fn test_spend_total_money_first() {
        let mut p = player();
        p.total_money = 3;
        p.money = 4;
        p.spend(5);
        assert_eq!(p.total_money, 0);
        assert_eq!(p.money, 2);
    }

    #[test]
    fn test_spend_from_total_only() {
        let mut p = player();
        p.total_money = 10;
        p.money = 4;
        p.spend(5);
        assert_eq!(p.total_money, 5);
        assert_eq!(p.money, 4);
    }

    #[test]
    fn test_guarded_hit_drains_stamina() {
        let mut p = player();
        p.guarding = true;
        assert!(p.take_hit(30.0));
        assert_eq!(p.stamina, 70.0);
        assert_eq!(p.health, 100.0);

        // Empty stamina no longer protects
        p.stamina = 0.0;
        assert!(!p.take_hit(30.0));
        assert_eq!(p.health, 70.0);
    }

    #[test]
    fn test_new_state_spawns_first_wave() {
        let state = GameState::new(1, EnemyTable::builtin().unwrap(), Settings::default()).unwrap();
        assert_eq!(state.level, 1);
        assert_eq!(state.phase, GamePhase::Combat);
        // Level 1: one blue, one purple
        assert_eq!(state.enemies.len(), 2);
        assert_eq!(state.player.money_required, 2);
        assert!(state.events.contains(&GameEvent::LevelStarted { level: 1, boss: false }));
    }

    #[test]
    fn test_entity_ids_unique() {
        let mut state = empty_state();
        let a = state.next_entity_id();
        let b = state.next_entity_id();
        assert_ne!(a, b);
        let id = state.spawn_enemy(EnemyType::Blue, Vec2::ZERO, None).unwrap();
        assert!(state.enemy(id).is_some());
    }

    #[test]
    fn test_roster_skips_dead() {
        let mut state = empty_state();
        state.spawn_enemy(EnemyType::Boss, Vec2::new(640.0, 360.0), None).unwrap();
        state.spawn_enemy(EnemyType::BossTurret, Vec2::ZERO, Some(TurretSide::Left)).unwrap();
        state.spawn_enemy(EnemyType::BossTurret, Vec2::ZERO, Some(TurretSide::Right)).unwrap();
        assert_eq!(state.roster().live_turrets(), 2);

        state.enemies[1].health = 0.0;
        let roster = state.roster();
        assert_eq!(roster.boss, Some(0));
        assert_eq!(roster.left, None);
        assert_eq!(roster.right, Some(2));
    }

    proptest! {
        #[test]
        fn hits_keep_health_and_stamina_in_range(
            hits in proptest::collection::vec((0.0f32..80.0, any::<bool>()), 0..20)
        ) {
            let mut p = player();
            for (damage, guarding) in hits {
                p.guarding = guarding;
                p.take_hit(damage);
                prop_assert!((0.0..=p.max_health).contains(&p.health));
                prop_assert!((0.0..=p.max_stamina).contains(&p.stamina));
            }
        }
    }
}
