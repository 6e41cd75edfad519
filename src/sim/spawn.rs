//! Entity factory: enemies, the bonus and patrol points
//!
//! All randomness comes from the caller's RNG so a seeded world replays the
//! same spawns.

use glam::Vec2;
use rand::Rng;

use super::obstacle::Obstacle;
use super::state::{Bonus, Enemy, Intelligence, Role};
use crate::clamp_to_arena;
use crate::settings::Settings;

/// Uniform random point inside the arena, inset by `inset`
fn random_point(rng: &mut impl Rng, settings: &Settings, inset: f32) -> Vec2 {
    Vec2::new(
        rng.random_range(inset..=settings.arena.width - inset),
        rng.random_range(inset..=settings.arena.height - inset),
    )
}

/// Pick a random speed class
fn random_speed(rng: &mut impl Rng, settings: &Settings) -> f32 {
    let speeds = &settings.enemy.speed_multipliers;
    speeds[rng.random_range(0..speeds.len())]
}

/// Enemy with random role, speed and intelligence anywhere in the arena
pub fn create_enemy(id: u32, rng: &mut impl Rng, settings: &Settings) -> Enemy {
    let pos = random_point(rng, settings, settings.enemy.radius);
    enemy_at(id, pos, rng, settings)
}

fn enemy_at(id: u32, pos: Vec2, rng: &mut impl Rng, settings: &Settings) -> Enemy {
    let role = Role::random(rng);
    let speed = random_speed(rng, settings);
    let intelligence = Intelligence::random(rng);
    Enemy::new(id, pos, role, intelligence, speed)
}

/// Enemy placed at least `min_spawn_distance` from the player.
///
/// Rejection-samples random positions. Once `spawn_fallback_after` attempts
/// have failed, the candidate is pushed out along the player-to-candidate line
/// to exactly the minimum distance and wrapped back into the arena.
pub fn create_enemy_away_from_player(
    id: u32,
    player: Vec2,
    rng: &mut impl Rng,
    settings: &Settings,
) -> Enemy {
    let cfg = &settings.enemy;
    let radius = cfg.radius;
    let mut pos = random_point(rng, settings, radius);

    for attempt in 0..cfg.spawn_attempts {
        if pos.distance(player) >= cfg.min_spawn_distance {
            break;
        }
        if attempt + 1 >= cfg.spawn_fallback_after {
            pos = project_away(pos, player, settings);
            break;
        }
        pos = random_point(rng, settings, radius);
    }

    enemy_at(id, pos, rng, settings)
}

/// Push `candidate` to `min_spawn_distance` from the player, wrapping into the arena
fn project_away(candidate: Vec2, player: Vec2, settings: &Settings) -> Vec2 {
    let mut dir = (candidate - player).normalize_or_zero();
    if dir == Vec2::ZERO {
        dir = Vec2::X;
    }
    let projected = player + dir * settings.enemy.min_spawn_distance;
    let wrapped = Vec2::new(
        projected.x.rem_euclid(settings.arena.width),
        projected.y.rem_euclid(settings.arena.height),
    );
    clamp_to_arena(
        wrapped,
        settings.enemy.radius,
        settings.arena.width,
        settings.arena.height,
    )
}

/// Random point outside every obstacle, for sentinel patrols
pub fn random_patrol_point(rng: &mut impl Rng, settings: &Settings, obstacles: &[Obstacle]) -> Vec2 {
    let inset = settings.enemy.radius;
    let mut point = random_point(rng, settings, inset);
    let mut attempts = 0;
    while obstacles.iter().any(|o| o.contains_point(point))
        && attempts < settings.sentinel.patrol_attempts
    {
        point = random_point(rng, settings, inset);
        attempts += 1;
    }
    point
}

/// New bonus away from the player and clear of obstacles.
///
/// Falls back to the last candidate (with a warning) if the retry cap runs out.
pub fn spawn_bonus(
    rng: &mut impl Rng,
    settings: &Settings,
    player: Vec2,
    obstacles: &[Obstacle],
) -> Bonus {
    let cfg = &settings.bonus;
    let size = cfg.sizes[rng.random_range(0..cfg.sizes.len())];

    let mut pos = random_point(rng, settings, cfg.margin);
    for attempt in 0..cfg.max_attempts.max(1) {
        if attempt > 0 {
            pos = random_point(rng, settings, cfg.margin);
        }
        let clear_of_player = pos.distance(player) >= cfg.min_player_distance;
        let clear_of_obstacles = obstacles
            .iter()
            .all(|o| o.bounds_distance(pos) > size);
        if clear_of_player && clear_of_obstacles {
            return Bonus { pos, size };
        }
    }

    log::warn!(
        "No valid bonus position after {} attempts; arena too crowded, placing anyway",
        cfg.max_attempts
    );
    Bonus { pos, size }
}
