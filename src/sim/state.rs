//! World state and core simulation types
//!
//! The whole mutable world is one `WorldState`, owned by the caller and handed
//! to [`super::tick`] by `&mut` once per frame.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::boost::BoostState;
use super::obstacle::Obstacle;
use super::spawn;
use crate::highscores::HighScores;
use crate::settings::{Settings, SettingsError};

/// Enemy behaviour archetype, fixed at creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    /// Straight chase of the predicted position
    Aggressive,
    /// Cuts in from the side
    Flanker,
    /// Defends the bonus, attacks when the player comes for it
    Guard,
    /// Patrols until the player comes into range or sight
    Sentinel,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Aggressive, Role::Flanker, Role::Guard, Role::Sentinel];

    pub fn random(rng: &mut impl Rng) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }
}

/// Target-prediction sophistication, fixed at creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Intelligence {
    Low,
    Medium,
    High,
}

impl Intelligence {
    pub const ALL: [Intelligence; 3] = [Intelligence::Low, Intelligence::Medium, Intelligence::High];

    pub fn random(rng: &mut impl Rng) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }

    /// Whether this tier steers around obstacles
    pub fn avoids_obstacles(&self) -> bool {
        !matches!(self, Intelligence::Low)
    }
}

/// Guard behaviour state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GuardMode {
    #[default]
    Defending,
    Attacking,
}

/// The player-controlled particle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
}

impl Player {
    pub fn new(pos: Vec2, radius: f32) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            radius,
        }
    }
}

/// An autonomous chaser
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    /// Stable for the entity's lifetime; presentation keys off it
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Position before the latest integration step
    pub prev_pos: Vec2,
    pub role: Role,
    pub intelligence: Intelligence,
    pub speed_multiplier: f32,
    /// Only meaningful for guards
    pub guard_mode: GuardMode,
    /// Only used by sentinels
    pub patrol_target: Option<Vec2>,
    /// Facing direction in radians, toward the current target
    pub heading: f32,
    /// Player was inside this enemy's vision cone last tick
    pub player_spotted: bool,
}

impl Enemy {
    pub fn new(
        id: u32,
        pos: Vec2,
        role: Role,
        intelligence: Intelligence,
        speed_multiplier: f32,
    ) -> Self {
        Self {
            id,
            pos,
            vel: Vec2::ZERO,
            prev_pos: pos,
            role,
            intelligence,
            speed_multiplier,
            guard_mode: GuardMode::Defending,
            patrol_target: None,
            heading: 0.0,
            player_spotted: false,
        }
    }

    /// Guard currently attacking rather than defending
    pub fn is_engaged(&self) -> bool {
        self.role == Role::Guard && self.guard_mode == GuardMode::Attacking
    }
}

/// The collectible token
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bonus {
    pub pos: Vec2,
    pub size: f32,
}

/// Things that happened during the last tick, for sound and visual feedback
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    BonusCollected { score: u64 },
    LevelUp { level: u32 },
    ObstacleAdded,
    EnemiesSpawned { count: u32 },
    EnemiesCollided { a: u32, b: u32 },
    EnemyDestroyed { id: u32 },
    BoostActivated,
    BoostEnded,
    PlayerCaught { score: u64, level: u32 },
}

/// Score points needed per level
pub fn level_for_score(score: u64) -> u32 {
    (score / crate::consts::POINTS_PER_LEVEL) as u32 + 1
}

/// Complete world state
#[derive(Debug, Clone)]
pub struct WorldState {
    pub settings: Settings,
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    /// Simulation tick counter (not reset when the player is caught)
    pub tick: u64,
    pub score: u64,
    /// Always `level_for_score(score)`
    pub level: u32,
    pub player: Player,
    pub enemies: Vec<Enemy>,
    /// Absent only before the first spawn
    pub bonus: Option<Bonus>,
    pub obstacles: Vec<Obstacle>,
    pub boost: BoostState,
    /// Forecast player path while boost is active (read-only preview)
    pub trajectory: Vec<Vec2>,
    pub high_scores: HighScores,
    /// Events raised by the most recent tick
    pub events: Vec<GameEvent>,
    next_id: u32,
}

impl WorldState {
    /// Create a world with default settings
    pub fn new(seed: u64) -> Self {
        Self::build(Settings::default(), seed)
    }

    /// Create a world with custom settings, rejecting inconsistent ones
    pub fn with_settings(settings: Settings, seed: u64) -> Result<Self, SettingsError> {
        settings.validate()?;
        Ok(Self::build(settings, seed))
    }

    fn build(settings: Settings, seed: u64) -> Self {
        let center = Vec2::new(settings.arena.width / 2.0, settings.arena.height / 2.0);
        let player = Player::new(center, settings.player.radius);
        let mut state = Self {
            settings,
            seed,
            rng: Pcg32::seed_from_u64(seed),
            tick: 0,
            score: 0,
            level: 1,
            player,
            enemies: Vec::new(),
            bonus: None,
            obstacles: Vec::new(),
            boost: BoostState::default(),
            trajectory: Vec::new(),
            high_scores: HighScores::new(),
            events: Vec::new(),
            next_id: 1,
        };
        state.start_run();
        state
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Put every piece of dynamic state back to level 1 defaults
    fn start_run(&mut self) {
        let center = Vec2::new(
            self.settings.arena.width / 2.0,
            self.settings.arena.height / 2.0,
        );
        self.player = Player::new(center, self.settings.player.radius);
        self.score = 0;
        self.level = 1;
        self.enemies.clear();
        self.obstacles.clear();
        self.boost = BoostState::default();
        self.trajectory.clear();

        self.spawn_enemies_away_from_player(1);
        self.respawn_bonus();
    }

    /// Bank the current run and start over
    pub fn reset(&mut self) {
        if let Some(rank) = self.high_scores.add_score(self.score, self.level, self.tick) {
            log::info!("Run banked: score {} (rank {})", self.score, rank);
        }
        log::info!(
            "Player caught at tick {} (score {}, level {}), resetting",
            self.tick,
            self.score,
            self.level
        );
        self.start_run();
    }

    /// Add `count` enemies at a safe distance from the player
    pub fn spawn_enemies_away_from_player(&mut self, count: u32) {
        for _ in 0..count {
            let id = self.next_entity_id();
            let enemy =
                spawn::create_enemy_away_from_player(id, self.player.pos, &mut self.rng, &self.settings);
            log::debug!(
                "Spawned enemy {} ({:?}/{:?}) at ({:.0}, {:.0})",
                enemy.id,
                enemy.role,
                enemy.intelligence,
                enemy.pos.x,
                enemy.pos.y
            );
            self.enemies.push(enemy);
        }
    }

    /// Replace the bonus with a fresh one at a valid position
    pub fn respawn_bonus(&mut self) {
        self.bonus = Some(spawn::spawn_bonus(
            &mut self.rng,
            &self.settings,
            self.player.pos,
            &self.obstacles,
        ));
    }

    /// Generate one more obstacle clear of the player, the bonus, every enemy
    /// and the other obstacles
    pub fn add_obstacle(&mut self) {
        let enemies: Vec<Vec2> = self.enemies.iter().map(|e| e.pos).collect();
        let obstacle = Obstacle::generate(
            &mut self.rng,
            &self.settings,
            self.player.pos,
            self.bonus.map(|b| b.pos),
            &enemies,
            &self.obstacles,
        );
        log::info!("New obstacle: {:?}", obstacle);
        self.obstacles.push(obstacle);
    }

    /// Ensure stable iteration order by entity ID
    pub fn normalize_order(&mut self) {
        self.enemies.sort_by_key(|e| e.id);
    }
}
