//! Game balance settings
//!
//! Every tunable constant of the simulation lives here. Defaults reproduce the
//! shipped game; a JSON file may override any subset of fields.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Errors raised while loading or validating settings
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed settings JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid setting `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

fn invalid(field: &'static str, reason: impl Into<String>) -> SettingsError {
    SettingsError::Invalid {
        field,
        reason: reason.into(),
    }
}

/// What happens when two enemies touch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CollisionPolicy {
    /// Both enemies are removed
    Annihilate,
    /// Enemies exchange an impulse and are pushed apart
    #[default]
    ElasticBounce,
}

impl CollisionPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            CollisionPolicy::Annihilate => "annihilate",
            CollisionPolicy::ElasticBounce => "bounce",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "annihilate" | "annihilation" | "destroy" => Some(CollisionPolicy::Annihilate),
            "bounce" | "elastic" | "elastic-bounce" => Some(CollisionPolicy::ElasticBounce),
            _ => None,
        }
    }
}

/// What happens when an enemy runs into an obstacle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ObstacleContact {
    /// Enemy is removed from play
    #[default]
    Destroy,
    /// Enemy is put back where it was and rebounds at half speed
    Bounce,
}

impl ObstacleContact {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObstacleContact::Destroy => "destroy",
            ObstacleContact::Bounce => "bounce",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "destroy" => Some(ObstacleContact::Destroy),
            "bounce" => Some(ObstacleContact::Bounce),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaSettings {
    pub width: f32,
    pub height: f32,
}

impl Default for ArenaSettings {
    fn default() -> Self {
        Self {
            width: ARENA_WIDTH,
            height: ARENA_HEIGHT,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerSettings {
    pub radius: f32,
    /// Acceleration per tick while a direction is held
    pub acceleration: f32,
    pub friction: f32,
    pub velocity_epsilon: f32,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            radius: PLAYER_RADIUS,
            acceleration: PLAYER_ACCELERATION,
            friction: PLAYER_FRICTION,
            velocity_epsilon: VELOCITY_EPSILON,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemySettings {
    pub radius: f32,
    /// Base acceleration, multiplied by the enemy's speed multiplier
    pub acceleration: f32,
    /// Extra factor applied when acceleration is folded into velocity
    pub accel_factor: f32,
    pub friction: f32,
    pub velocity_epsilon: f32,
    /// Discrete speed classes an enemy may be created with
    pub speed_multipliers: Vec<f32>,
    /// Minimum spawn distance from the player for mid-game spawns
    pub min_spawn_distance: f32,
    pub spawn_attempts: u32,
    /// After this many failed attempts the candidate is projected outward
    pub spawn_fallback_after: u32,
    pub collision_policy: CollisionPolicy,
    pub restitution: f32,
    pub obstacle_contact: ObstacleContact,
}

impl Default for EnemySettings {
    fn default() -> Self {
        Self {
            radius: ENEMY_RADIUS,
            acceleration: ENEMY_ACCELERATION,
            accel_factor: 1.0,
            friction: ENEMY_FRICTION,
            velocity_epsilon: VELOCITY_EPSILON,
            speed_multipliers: vec![0.8, 1.0, 1.2],
            min_spawn_distance: 200.0,
            spawn_attempts: 50,
            spawn_fallback_after: 25,
            collision_policy: CollisionPolicy::default(),
            restitution: 0.8,
            obstacle_contact: ObstacleContact::default(),
        }
    }
}

/// Target prediction and avoidance tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiSettings {
    pub medium_lookahead_min: f32,
    pub medium_lookahead_max: f32,
    pub medium_jitter: f32,
    pub high_lookahead_min: f32,
    pub high_lookahead_max: f32,
    pub high_jitter: f32,
    /// Player-to-bonus distance under which high-tier enemies cut the player off
    pub intercept_radius: f32,
    /// How far along the player-to-bonus segment the interception point sits
    pub intercept_fraction: f32,
    /// Chance that a high-tier enemy leads the player instead of guessing a reversal
    pub lead_probability: f64,
    pub flank_offset: f32,
    /// No acceleration is produced closer to the target than this
    pub dead_zone: f32,
    pub avoidance_radius: f32,
    pub avoidance_mix_medium: f32,
    pub avoidance_mix_high: f32,
    /// Vision cone length before level growth
    pub cone_length: f32,
    /// Full opening angle of the vision cone (radians) before level growth
    pub cone_angle: f32,
    pub cone_length_per_level: f32,
    pub cone_angle_per_level: f32,
    /// Guards watch a narrower slice
    pub guard_cone_angle_factor: f32,
    /// Sentinels see further
    pub sentinel_cone_length_factor: f32,
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            medium_lookahead_min: 25.0,
            medium_lookahead_max: 40.0,
            medium_jitter: 20.0,
            high_lookahead_min: 30.0,
            high_lookahead_max: 50.0,
            high_jitter: 15.0,
            intercept_radius: 200.0,
            intercept_fraction: 0.7,
            lead_probability: 0.7,
            flank_offset: 50.0,
            dead_zone: 1.0,
            avoidance_radius: 60.0,
            avoidance_mix_medium: 0.5,
            avoidance_mix_high: 0.7,
            cone_length: 150.0,
            cone_angle: std::f32::consts::FRAC_PI_4,
            cone_length_per_level: 15.0,
            cone_angle_per_level: 0.05,
            guard_cone_angle_factor: 0.8,
            sentinel_cone_length_factor: 1.2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardSettings {
    pub engage_radius: f32,
    pub disengage_radius: f32,
    /// Radius around the bonus inside which a defending guard orbits
    pub patrol_radius: f32,
    /// Acceleration scale while orbiting
    pub patrol_scale: f32,
    /// Inward pull blended into the orbit near the edge of the patrol ring
    pub inward_bias: f32,
}

impl Default for GuardSettings {
    fn default() -> Self {
        Self {
            engage_radius: 150.0,
            disengage_radius: 220.0,
            patrol_radius: 60.0,
            patrol_scale: 0.1,
            inward_bias: 0.2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SentinelSettings {
    pub aggro_radius: f32,
    /// Patrol point counts as reached inside this distance
    pub patrol_reached: f32,
    pub patrol_attempts: u32,
}

impl Default for SentinelSettings {
    fn default() -> Self {
        Self {
            aggro_radius: 180.0,
            patrol_reached: 20.0,
            patrol_attempts: 50,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObstacleSettings {
    /// Obstacles added on each level-up
    pub per_level: u32,
    pub player_clearance: f32,
    pub bonus_clearance: f32,
    /// New obstacles keep this far from every enemy
    pub enemy_clearance: f32,
    /// Gap required between the bounding boxes of two obstacles
    pub spacing: f32,
    pub max_attempts: u32,
    /// Cross dimension of line-like shapes and arms
    pub line_thickness: f32,
}

impl Default for ObstacleSettings {
    fn default() -> Self {
        Self {
            per_level: 1,
            player_clearance: 50.0,
            bonus_clearance: 30.0,
            enemy_clearance: 20.0,
            spacing: 10.0,
            max_attempts: PLACEMENT_RETRY_CAP,
            line_thickness: 4.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BonusSettings {
    pub sizes: Vec<f32>,
    /// Keep the bonus this far from the arena edges
    pub margin: f32,
    pub min_player_distance: f32,
    pub max_attempts: u32,
    /// Strong pull inside this radius, always on
    pub auto_radius: f32,
    pub auto_pull: f32,
    /// Proportional pull inside this radius
    pub attraction_radius: f32,
    pub attraction_pull: f32,
    /// Only apply the wide attraction while boost is active
    pub attraction_requires_boost: bool,
    pub boost_amplification: f32,
    pub collection_resets_cooldown: bool,
}

impl Default for BonusSettings {
    fn default() -> Self {
        Self {
            sizes: vec![6.0, 8.0, 10.0],
            margin: 20.0,
            min_player_distance: 100.0,
            max_attempts: PLACEMENT_RETRY_CAP,
            auto_radius: 25.0,
            auto_pull: 2.0,
            attraction_radius: 100.0,
            attraction_pull: 1.0,
            attraction_requires_boost: false,
            boost_amplification: 2.0,
            collection_resets_cooldown: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BoostSettings {
    pub duration_frames: u32,
    pub cooldown_frames: u32,
    /// Time scale applied to enemy movement while boost is active
    pub enemy_time_scale: f32,
    /// Time scale applied to player movement while boost is active
    pub player_time_scale: f32,
    pub preview_steps: u32,
    pub preview_max_length: f32,
    pub homing_radius: f32,
    pub homing_factor: f32,
}

impl Default for BoostSettings {
    fn default() -> Self {
        Self {
            duration_frames: 3 * TICKS_PER_SECOND,
            cooldown_frames: 10 * TICKS_PER_SECOND,
            enemy_time_scale: 0.3,
            player_time_scale: 1.3,
            preview_steps: 90,
            preview_max_length: 400.0,
            homing_radius: 80.0,
            homing_factor: 3.0,
        }
    }
}

/// Complete simulation configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub arena: ArenaSettings,
    pub player: PlayerSettings,
    pub enemy: EnemySettings,
    pub ai: AiSettings,
    pub guard: GuardSettings,
    pub sentinel: SentinelSettings,
    pub obstacles: ObstacleSettings,
    pub bonus: BonusSettings,
    pub boost: BoostSettings,
}

impl Settings {
    /// Parse settings from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.as_ref().display());
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Every float the simulation does arithmetic or sampling with
    fn numeric_fields(&self) -> Vec<(&'static str, f32)> {
        let mut fields = vec![
            ("arena.width", self.arena.width),
            ("arena.height", self.arena.height),
            ("player.radius", self.player.radius),
            ("player.acceleration", self.player.acceleration),
            ("player.velocity_epsilon", self.player.velocity_epsilon),
            ("enemy.radius", self.enemy.radius),
            ("enemy.acceleration", self.enemy.acceleration),
            ("enemy.accel_factor", self.enemy.accel_factor),
            ("enemy.velocity_epsilon", self.enemy.velocity_epsilon),
            ("enemy.min_spawn_distance", self.enemy.min_spawn_distance),
            ("ai.medium_lookahead_min", self.ai.medium_lookahead_min),
            ("ai.medium_lookahead_max", self.ai.medium_lookahead_max),
            ("ai.medium_jitter", self.ai.medium_jitter),
            ("ai.high_lookahead_min", self.ai.high_lookahead_min),
            ("ai.high_lookahead_max", self.ai.high_lookahead_max),
            ("ai.high_jitter", self.ai.high_jitter),
            ("ai.intercept_radius", self.ai.intercept_radius),
            ("ai.intercept_fraction", self.ai.intercept_fraction),
            ("ai.flank_offset", self.ai.flank_offset),
            ("ai.dead_zone", self.ai.dead_zone),
            ("ai.avoidance_radius", self.ai.avoidance_radius),
            ("ai.avoidance_mix_medium", self.ai.avoidance_mix_medium),
            ("ai.avoidance_mix_high", self.ai.avoidance_mix_high),
            ("ai.cone_length", self.ai.cone_length),
            ("ai.cone_angle", self.ai.cone_angle),
            ("ai.cone_length_per_level", self.ai.cone_length_per_level),
            ("ai.cone_angle_per_level", self.ai.cone_angle_per_level),
            ("ai.guard_cone_angle_factor", self.ai.guard_cone_angle_factor),
            ("ai.sentinel_cone_length_factor", self.ai.sentinel_cone_length_factor),
            ("guard.patrol_radius", self.guard.patrol_radius),
            ("guard.patrol_scale", self.guard.patrol_scale),
            ("guard.inward_bias", self.guard.inward_bias),
            ("sentinel.aggro_radius", self.sentinel.aggro_radius),
            ("sentinel.patrol_reached", self.sentinel.patrol_reached),
            ("obstacles.player_clearance", self.obstacles.player_clearance),
            ("obstacles.bonus_clearance", self.obstacles.bonus_clearance),
            ("obstacles.enemy_clearance", self.obstacles.enemy_clearance),
            ("obstacles.spacing", self.obstacles.spacing),
            ("obstacles.line_thickness", self.obstacles.line_thickness),
            ("bonus.margin", self.bonus.margin),
            ("bonus.min_player_distance", self.bonus.min_player_distance),
            ("bonus.auto_radius", self.bonus.auto_radius),
            ("bonus.auto_pull", self.bonus.auto_pull),
            ("bonus.attraction_radius", self.bonus.attraction_radius),
            ("bonus.attraction_pull", self.bonus.attraction_pull),
            ("bonus.boost_amplification", self.bonus.boost_amplification),
            ("boost.enemy_time_scale", self.boost.enemy_time_scale),
            ("boost.player_time_scale", self.boost.player_time_scale),
            ("boost.preview_max_length", self.boost.preview_max_length),
            ("boost.homing_radius", self.boost.homing_radius),
            ("boost.homing_factor", self.boost.homing_factor),
        ];
        fields.extend(self.enemy.speed_multipliers.iter().map(|&m| ("enemy.speed_multipliers", m)));
        fields.extend(self.bonus.sizes.iter().map(|&size| ("bonus.sizes", size)));
        fields
    }

    /// Check the static invariants the simulation relies on
    pub fn validate(&self) -> Result<(), SettingsError> {
        // NaN slips through every ordered comparison below, so it goes first.
        // Nothing in the model is meaningfully negative either.
        for (field, value) in self.numeric_fields() {
            if !value.is_finite() {
                return Err(invalid(field, format!("{value} is not a finite number")));
            }
            if value < 0.0 {
                return Err(invalid(field, format!("{value} must not be negative")));
            }
        }

        let largest_radius = self.player.radius.max(self.enemy.radius);
        if self.player.radius == 0.0 {
            return Err(invalid("player.radius", "must be positive"));
        }
        if self.enemy.radius == 0.0 {
            return Err(invalid("enemy.radius", "must be positive"));
        }
        if self.arena.width <= 2.0 * largest_radius || self.arena.height <= 2.0 * largest_radius {
            return Err(invalid(
                "arena",
                format!(
                    "{}x{} cannot fit a body of radius {}",
                    self.arena.width, self.arena.height, largest_radius
                ),
            ));
        }
        for (field, friction) in [
            ("player.friction", self.player.friction),
            ("enemy.friction", self.enemy.friction),
        ] {
            if !(friction > 0.0 && friction < 1.0) {
                return Err(invalid(field, format!("{friction} is outside (0, 1)")));
            }
        }
        if self.enemy.speed_multipliers.is_empty() {
            return Err(invalid("enemy.speed_multipliers", "must not be empty"));
        }
        if !(0.0..=1.0).contains(&self.enemy.restitution) {
            return Err(invalid("enemy.restitution", "must be within [0, 1]"));
        }
        if self.enemy.spawn_attempts == 0 {
            return Err(invalid("enemy.spawn_attempts", "must be at least 1"));
        }
        if self.guard.engage_radius >= self.guard.disengage_radius {
            return Err(invalid(
                "guard.engage_radius",
                format!(
                    "engage radius {} must be smaller than disengage radius {}",
                    self.guard.engage_radius, self.guard.disengage_radius
                ),
            ));
        }
        if self.ai.medium_lookahead_min > self.ai.medium_lookahead_max
            || self.ai.high_lookahead_min > self.ai.high_lookahead_max
        {
            return Err(invalid("ai.lookahead", "min must not exceed max"));
        }
        if !(0.0..=1.0).contains(&self.ai.lead_probability) {
            return Err(invalid("ai.lead_probability", "must be within [0, 1]"));
        }
        if self.obstacles.line_thickness == 0.0 {
            return Err(invalid("obstacles.line_thickness", "must be positive"));
        }
        if self.bonus.sizes.is_empty() {
            return Err(invalid("bonus.sizes", "must not be empty"));
        }
        if 2.0 * self.bonus.margin >= self.arena.width.min(self.arena.height) {
            return Err(invalid("bonus.margin", "leaves no room in the arena"));
        }
        if self.boost.duration_frames == 0 {
            return Err(invalid("boost.duration_frames", "must be at least 1"));
        }
        Ok(())
    }
}
