//! Frame-stepped simulation tick
//!
//! One call advances the whole world by one discrete step. Work is never
//! scaled by wall-clock time, so the engine behaves the same whether the
//! scheduler runs at 60 Hz or stutters.

use glam::Vec2;

use super::boost::predict_trajectory;
use super::collision::{self, Caught};
use super::state::{Enemy, GameEvent, WorldState, level_for_score};
use super::steering::{SteeringContext, avoidance_direction, steer_enemy};
use super::bonus;
use crate::{clamp_to_arena, direction_to};

/// Autopilot keeps this far from enemies
const AUTOPILOT_DANGER_RADIUS: f32 = 80.0;
/// Autopilot fires the boost when an enemy gets this close
const AUTOPILOT_PANIC_RADIUS: f32 = 40.0;
/// Autopilot starts pushing off the arena edge inside this margin
const AUTOPILOT_WALL_MARGIN: f32 = 40.0;
/// Minimum axis component for a direction to press a key (~sin 22.5°)
const AXIS_THRESHOLD: f32 = 0.38;

/// Input intent for a single tick (deterministic)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    /// Edge-triggered: set only on the tick the key went down
    pub activate_boost: bool,
}

impl TickInput {
    /// Unit movement direction (screen coordinates, y down), zero when idle
    /// or when opposing keys cancel out
    pub fn direction(&self) -> Vec2 {
        let axis = |neg: bool, pos: bool| (pos as i8 - neg as i8) as f32;
        Vec2::new(axis(self.left, self.right), axis(self.up, self.down)).normalize_or_zero()
    }

    /// Press the keys closest to a desired direction
    pub fn from_direction(dir: Vec2) -> Self {
        let d = dir.normalize_or_zero();
        Self {
            up: d.y < -AXIS_THRESHOLD,
            down: d.y > AXIS_THRESHOLD,
            left: d.x < -AXIS_THRESHOLD,
            right: d.x > AXIS_THRESHOLD,
            activate_boost: false,
        }
    }

    /// Demo-mode player: go for the bonus, run from nearby enemies, keep off
    /// obstacles and walls, and burn the boost when cornered.
    pub fn autopilot(state: &WorldState) -> Self {
        let pos = state.player.pos;
        let settings = &state.settings;

        let mut desire = state
            .bonus
            .map(|b| direction_to(pos, b.pos))
            .unwrap_or(Vec2::ZERO);

        let mut nearest = f32::INFINITY;
        for enemy in &state.enemies {
            let dist = enemy.pos.distance(pos);
            nearest = nearest.min(dist);
            if dist < AUTOPILOT_DANGER_RADIUS {
                desire += direction_to(enemy.pos, pos) * (AUTOPILOT_DANGER_RADIUS / dist.max(1.0));
            }
        }

        desire += avoidance_direction(pos, &state.obstacles, settings.ai.avoidance_radius) * 1.5;

        let (w, h) = (settings.arena.width, settings.arena.height);
        if pos.x < AUTOPILOT_WALL_MARGIN {
            desire.x += 1.0;
        } else if pos.x > w - AUTOPILOT_WALL_MARGIN {
            desire.x -= 1.0;
        }
        if pos.y < AUTOPILOT_WALL_MARGIN {
            desire.y += 1.0;
        } else if pos.y > h - AUTOPILOT_WALL_MARGIN {
            desire.y -= 1.0;
        }

        Self {
            activate_boost: nearest < AUTOPILOT_PANIC_RADIUS && state.boost.is_ready(),
            ..Self::from_direction(desire)
        }
    }
}

/// Advance the world by one tick
pub fn tick(state: &mut WorldState, input: &TickInput) {
    state.events.clear();
    state.tick += 1;

    // Boost timers
    if state.boost.advance() {
        log::debug!("Boost ended at tick {}", state.tick);
        state.events.push(GameEvent::BoostEnded);
    }
    if input.activate_boost && state.boost.try_activate(&state.settings) {
        log::debug!("Boost activated at tick {}", state.tick);
        state.events.push(GameEvent::BoostActivated);
    }
    let (enemy_scale, player_scale) = state.boost.time_scales(&state.settings);

    // Enemies react to where the player was when the tick started
    let player_at_start = state.player;

    // Player physics
    let input_dir = input.direction();
    {
        let cfg = &state.settings.player;
        let player = &mut state.player;
        player.vel = (player.vel + input_dir * cfg.acceleration) * cfg.friction;
        if player.vel.length() < cfg.velocity_epsilon {
            player.vel = Vec2::ZERO;
        }
        player.pos = clamp_to_arena(
            player.pos + player.vel * player_scale,
            player.radius,
            state.settings.arena.width,
            state.settings.arena.height,
        );
    }

    // Trajectory preview
    if state.boost.active && (input_dir != Vec2::ZERO || state.player.vel != Vec2::ZERO) {
        state.trajectory =
            predict_trajectory(&state.player, input_dir, state.bonus.as_ref(), &state.settings);
    } else {
        state.trajectory.clear();
    }

    // Enemy AI and physics, as one batch over last tick's list
    let ctx = SteeringContext {
        player_pos: player_at_start.pos,
        player_vel: player_at_start.vel,
        bonus: state.bonus.map(|b| b.pos),
        obstacles: &state.obstacles,
        settings: &state.settings,
        time_scale: enemy_scale,
        level: state.level,
    };
    let rng = &mut state.rng;
    let moved: Vec<Enemy> = state
        .enemies
        .iter()
        .enumerate()
        .map(|(index, enemy)| steer_enemy(enemy, index, &ctx, rng))
        .collect();
    state.enemies = moved;

    // Enemy vs enemy
    for (a, b) in collision::resolve_enemy_collisions(&mut state.enemies, &state.settings) {
        state.events.push(GameEvent::EnemiesCollided { a, b });
    }

    // Enemy vs obstacle
    for id in collision::resolve_obstacle_hits(&mut state.enemies, &state.obstacles, &state.settings)
    {
        log::debug!("Enemy {} destroyed by obstacle", id);
        state.events.push(GameEvent::EnemyDestroyed { id });
    }

    update_bonus(state);

    // Terminal check
    if let Some(caught) =
        collision::player_contact(&state.player, &state.enemies, &state.obstacles, &state.settings)
    {
        match caught {
            Caught::ByEnemy(id) => log::debug!("Player caught by enemy {}", id),
            Caught::ByObstacle => log::debug!("Player ran into an obstacle"),
        }
        state.events.push(GameEvent::PlayerCaught {
            score: state.score,
            level: state.level,
        });
        state.reset();
    }

    state.normalize_order();
}

/// Bonus drift, pickup, and the level progression it drives
fn update_bonus(state: &mut WorldState) {
    let Some(mut token) = state.bonus else {
        return;
    };
    bonus::attract(
        &mut token,
        state.player.pos,
        state.boost.active,
        &state.settings.bonus,
    );
    state.bonus = Some(token);

    if !bonus::is_collected(&token, state.player.pos, state.player.radius) {
        return;
    }

    state.score += 1;
    let previous_level = state.level;
    state.level = level_for_score(state.score);
    state.events.push(GameEvent::BonusCollected { score: state.score });

    let count = state.level;
    state.spawn_enemies_away_from_player(count);
    state.events.push(GameEvent::EnemiesSpawned { count });
    state.respawn_bonus();

    if state.settings.bonus.collection_resets_cooldown {
        state.boost.cooldown_remaining = 0;
    }

    if state.level > previous_level {
        log::info!("Level {} reached at score {}", state.level, state.score);
        state.events.push(GameEvent::LevelUp { level: state.level });
        let new_obstacles = state.settings.obstacles.per_level * (state.level - previous_level);
        for _ in 0..new_obstacles {
            state.add_obstacle();
            state.events.push(GameEvent::ObstacleAdded);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{Bonus, Intelligence, Role};

    /// World with no enemies and the bonus sitting on the player
    fn world_with_bonus_on_player(seed: u64) -> WorldState {
        let mut state = WorldState::new(seed);
        state.enemies.clear();
        state.bonus = Some(Bonus {
            pos: state.player.pos,
            size: 8.0,
        });
        state
    }

    #[test]
    fn test_input_direction() {
        assert_eq!(TickInput::default().direction(), Vec2::ZERO);
        let diag = TickInput {
            up: true,
            right: true,
            ..Default::default()
        };
        let d = diag.direction();
        assert!((d.length() - 1.0).abs() < 1e-6);
        assert!(d.x > 0.0 && d.y < 0.0);
        let cancelled = TickInput {
            left: true,
            right: true,
            ..Default::default()
        };
        assert_eq!(cancelled.direction(), Vec2::ZERO);
    }

    #[test]
    fn test_tick_collects_bonus() {
        let mut state = world_with_bonus_on_player(5);
        tick(&mut state, &TickInput::default());

        assert_eq!(state.score, 1);
        assert_eq!(state.level, 1);
        assert_eq!(state.enemies.len(), 1);
        let bonus = state.bonus.unwrap();
        assert!(bonus.pos.distance(state.player.pos) >= state.settings.bonus.min_player_distance);
        assert!(state.events.contains(&GameEvent::BonusCollected { score: 1 }));
        assert!(state.events.contains(&GameEvent::EnemiesSpawned { count: 1 }));
    }

    #[test]
    fn test_level_up_adds_obstacle_and_enemies() {
        let mut state = world_with_bonus_on_player(6);
        state.score = 4;
        tick(&mut state, &TickInput::default());

        assert_eq!(state.score, 5);
        assert_eq!(state.level, 2);
        assert_eq!(state.enemies.len(), 2);
        assert_eq!(state.obstacles.len(), 1);
        assert!(state.events.contains(&GameEvent::LevelUp { level: 2 }));
    }

    #[test]
    fn test_player_moves_with_input() {
        let mut state = WorldState::new(8);
        state.enemies.clear();
        let start = state.player.pos;
        let right = TickInput {
            right: true,
            ..Default::default()
        };
        for _ in 0..10 {
            tick(&mut state, &right);
        }
        assert!(state.player.pos.x > start.x);
        assert!((state.player.pos.y - start.y).abs() < 1e-4);
    }

    #[test]
    fn test_boost_input_and_preview() {
        let mut state = WorldState::new(9);
        state.enemies.clear();
        let input = TickInput {
            right: true,
            activate_boost: true,
            ..Default::default()
        };
        tick(&mut state, &input);
        assert!(state.boost.active);
        assert!(state.events.contains(&GameEvent::BoostActivated));
        assert!(!state.trajectory.is_empty());

        // A second press during cooldown is ignored
        let cooldown = state.boost.cooldown_remaining;
        tick(&mut state, &input);
        assert_eq!(state.boost.cooldown_remaining, cooldown - 1);
        assert!(!state.events.contains(&GameEvent::BoostActivated));
    }

    #[test]
    fn test_boost_lasts_configured_ticks() {
        let mut state = WorldState::new(10);
        state.enemies.clear();
        state.settings.boost.duration_frames = 4;
        let press = TickInput {
            activate_boost: true,
            ..Default::default()
        };
        tick(&mut state, &press);
        let mut active_ticks = 1;
        for _ in 0..10 {
            tick(&mut state, &TickInput::default());
            if state.boost.active {
                active_ticks += 1;
            }
        }
        assert_eq!(active_ticks, 4);
        assert!(state.trajectory.is_empty());
    }

    #[test]
    fn test_caught_player_resets_run() {
        let mut state = WorldState::new(12);
        state.score = 3;
        state.level = level_for_score(3);
        let mut chaser = Enemy::new(
            99,
            state.player.pos + Vec2::new(2.0, 0.0),
            Role::Aggressive,
            Intelligence::Low,
            1.0,
        );
        chaser.prev_pos = chaser.pos;
        state.enemies = vec![chaser];

        tick(&mut state, &TickInput::default());

        assert!(state
            .events
            .contains(&GameEvent::PlayerCaught { score: 3, level: 1 }));
        assert_eq!(state.score, 0);
        assert_eq!(state.level, 1);
        assert_eq!(state.high_scores.top_score(), 3);
        assert_eq!(state.enemies.len(), 1);
        assert_ne!(state.enemies[0].id, 99);
    }

    #[test]
    fn test_same_seed_same_run() {
        let mut a = WorldState::new(42);
        let mut b = WorldState::new(42);
        for _ in 0..600 {
            let input_a = TickInput::autopilot(&a);
            let input_b = TickInput::autopilot(&b);
            assert_eq!(input_a, input_b);
            tick(&mut a, &input_a);
            tick(&mut b, &input_b);
        }
        assert_eq!(a.snapshot(), b.snapshot());
    }

    #[test]
    fn test_enemies_stay_sorted_by_id() {
        let mut state = WorldState::new(13);
        state.spawn_enemies_away_from_player(6);
        state.enemies.reverse();
        tick(&mut state, &TickInput::default());
        assert!(state.enemies.windows(2).all(|w| w[0].id < w[1].id));
    }

    #[test]
    fn test_autopilot_flees_and_boosts() {
        let mut state = WorldState::new(14);
        let pos = state.player.pos;
        state.bonus = Some(Bonus {
            pos: pos + Vec2::new(200.0, 0.0),
            size: 8.0,
        });
        state.enemies = vec![Enemy::new(
            50,
            pos + Vec2::new(20.0, 0.0),
            Role::Aggressive,
            Intelligence::Low,
            1.0,
        )];
        let input = TickInput::autopilot(&state);
        assert!(input.left);
        assert!(!input.right);
        assert!(input.activate_boost);
    }

    #[test]
    fn test_autopilot_heads_for_bonus() {
        let mut state = WorldState::new(15);
        state.enemies.clear();
        let pos = state.player.pos;
        state.bonus = Some(Bonus {
            pos: pos + Vec2::new(0.0, 150.0),
            size: 8.0,
        });
        let input = TickInput::autopilot(&state);
        assert!(input.down && !input.up && !input.left && !input.right);
        assert!(!input.activate_boost);
    }
}
