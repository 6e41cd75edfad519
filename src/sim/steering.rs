//! Enemy AI and steering
//!
//! Each tick every enemy picks a target in two layers. Its intelligence tier
//! decides how well it predicts the player, and its role decides what it does
//! with that prediction (chase, flank, guard the bonus, patrol). The target
//! becomes an acceleration, optionally bent around nearby obstacles, and is
//! integrated with friction.
//!
//! Steering reads a [`SteeringContext`] taken once per tick, so every enemy sees
//! the same player/bonus/obstacle state regardless of processing order.

use glam::Vec2;
use rand::Rng;

use super::obstacle::Obstacle;
use super::spawn::random_patrol_point;
use super::state::{Enemy, GuardMode, Intelligence, Role};
use crate::settings::{AiSettings, GuardSettings, Settings};
use crate::{angle_between, clamp_to_arena, direction_to, distance, perpendicular};

/// Read-only world view shared by all enemies during one tick
#[derive(Debug, Clone, Copy)]
pub struct SteeringContext<'a> {
    pub player_pos: Vec2,
    pub player_vel: Vec2,
    pub bonus: Option<Vec2>,
    pub obstacles: &'a [Obstacle],
    pub settings: &'a Settings,
    /// Movement time scale for enemies (slow motion while boost is active)
    pub time_scale: f32,
    /// Current level; vision cones widen and lengthen with it
    pub level: u32,
}

/// What an enemy is trying to do this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Steering {
    /// Head straight for a point
    Seek(Vec2),
    /// Circle slowly around a point
    Orbit(Vec2),
}

/// Where the player will be after `ticks` at the current velocity
#[inline]
fn lead(player_pos: Vec2, player_vel: Vec2, ticks: f32) -> Vec2 {
    player_pos + player_vel * ticks
}

#[inline]
fn jitter(rng: &mut impl Rng, amount: f32) -> Vec2 {
    if amount <= 0.0 {
        return Vec2::ZERO;
    }
    Vec2::new(
        rng.random_range(-amount..=amount),
        rng.random_range(-amount..=amount),
    )
}

/// Player position as predicted by an enemy of the given intelligence tier
pub fn intelligence_target(
    intelligence: Intelligence,
    ctx: &SteeringContext,
    rng: &mut impl Rng,
) -> Vec2 {
    let ai = &ctx.settings.ai;
    let player = ctx.player_pos;
    let vel = ctx.player_vel;

    match intelligence {
        Intelligence::Low => player,
        Intelligence::Medium => {
            let ticks = rng.random_range(ai.medium_lookahead_min..=ai.medium_lookahead_max);
            lead(player, vel, ticks) + jitter(rng, ai.medium_jitter)
        }
        Intelligence::High => {
            if let Some(bonus) = ctx.bonus {
                if player.distance(bonus) < ai.intercept_radius {
                    // Cut the player off on the way to the bonus
                    return player.lerp(bonus, ai.intercept_fraction);
                }
            }
            let ticks = rng.random_range(ai.high_lookahead_min..=ai.high_lookahead_max);
            let guess = if rng.random_bool(ai.lead_probability) {
                lead(player, vel, ticks)
            } else {
                // Bet on the player doubling back
                lead(player, -vel, ticks)
            };
            guess + jitter(rng, ai.high_jitter)
        }
    }
}

/// Guard state transition with hysteresis between engage and disengage radii
pub fn next_guard_mode(
    mode: GuardMode,
    player: Vec2,
    bonus: Option<Vec2>,
    guard: &GuardSettings,
) -> GuardMode {
    let player_to_bonus = distance(Some(player), bonus);
    match mode {
        GuardMode::Defending if player_to_bonus <= guard.engage_radius => GuardMode::Attacking,
        GuardMode::Attacking if player_to_bonus > guard.disengage_radius => GuardMode::Defending,
        mode => mode,
    }
}

/// `(length, full angle)` of a role's vision cone at `level`
pub fn vision_cone(role: Role, level: u32, ai: &AiSettings) -> (f32, f32) {
    let length = ai.cone_length + level as f32 * ai.cone_length_per_level;
    let angle = ai.cone_angle + level as f32 * ai.cone_angle_per_level;
    match role {
        Role::Guard => (length, angle * ai.guard_cone_angle_factor),
        Role::Sentinel => (length * ai.sentinel_cone_length_factor, angle),
        Role::Aggressive | Role::Flanker => (length, angle),
    }
}

/// Whether the player stands inside the enemy's forward vision cone
pub fn player_in_cone(enemy: &Enemy, player: Vec2, cone_length: f32, cone_angle: f32) -> bool {
    let to_player = player - enemy.pos;
    let dist = to_player.length();
    if dist > cone_length {
        return false;
    }
    if dist <= f32::EPSILON {
        return true;
    }
    let bearing = to_player.y.atan2(to_player.x);
    angle_between(bearing, enemy.heading) <= cone_angle / 2.0
}

/// Choose this tick's steering goal. Updates the role-specific state on `enemy`
/// (guard mode, patrol target, spotted flag).
pub fn select_steering(
    enemy: &mut Enemy,
    index: usize,
    ctx: &SteeringContext,
    rng: &mut impl Rng,
) -> Steering {
    let settings = ctx.settings;
    let predicted = intelligence_target(enemy.intelligence, ctx, rng);
    let (cone_length, cone_angle) = vision_cone(enemy.role, ctx.level, &settings.ai);
    enemy.player_spotted = player_in_cone(enemy, ctx.player_pos, cone_length, cone_angle);

    match enemy.role {
        Role::Aggressive => Steering::Seek(predicted),
        Role::Flanker => {
            let across = perpendicular((enemy.pos - ctx.player_pos).normalize_or_zero());
            let side = if index % 2 == 0 { 1.0 } else { -1.0 };
            Steering::Seek(predicted + across * settings.ai.flank_offset * side)
        }
        Role::Guard => {
            enemy.guard_mode =
                next_guard_mode(enemy.guard_mode, ctx.player_pos, ctx.bonus, &settings.guard);
            match (enemy.guard_mode, ctx.bonus) {
                (GuardMode::Defending, Some(bonus)) => {
                    if enemy.pos.distance(bonus) <= settings.guard.patrol_radius {
                        Steering::Orbit(bonus)
                    } else {
                        Steering::Seek(bonus)
                    }
                }
                // Nothing to defend: behave like a chaser
                _ => Steering::Seek(predicted),
            }
        }
        Role::Sentinel => {
            let in_range = enemy.pos.distance(ctx.player_pos) < settings.sentinel.aggro_radius;
            if in_range || enemy.player_spotted {
                Steering::Seek(predicted)
            } else {
                let reached = enemy
                    .patrol_target
                    .is_none_or(|p| enemy.pos.distance(p) < settings.sentinel.patrol_reached);
                if reached {
                    enemy.patrol_target = Some(random_patrol_point(rng, settings, ctx.obstacles));
                }
                Steering::Seek(enemy.patrol_target.unwrap_or(ctx.player_pos))
            }
        }
    }
}

/// Tangential acceleration direction for circling `center`, pulled back in near
/// the edge of the patrol ring
fn orbit_direction(pos: Vec2, center: Vec2, guard: &GuardSettings) -> Vec2 {
    let to_center = center - pos;
    let dist = to_center.length();
    let inward = to_center.normalize_or_zero();
    let tangent = perpendicular(inward);
    let pull = if dist > guard.patrol_radius * 0.7 {
        inward * guard.inward_bias
    } else {
        Vec2::ZERO
    };
    (tangent + pull).normalize_or_zero()
}

/// Acceleration toward the steering goal, before obstacle avoidance
pub fn seek_acceleration(enemy: &Enemy, steering: Steering, settings: &Settings) -> Vec2 {
    let strength = settings.enemy.acceleration * enemy.speed_multiplier;
    match steering {
        Steering::Seek(target) => {
            if enemy.pos.distance(target) > settings.ai.dead_zone {
                direction_to(enemy.pos, target) * strength
            } else {
                Vec2::ZERO
            }
        }
        Steering::Orbit(center) => {
            orbit_direction(enemy.pos, center, &settings.guard)
                * strength
                * settings.guard.patrol_scale
        }
    }
}

/// Summed, normalized repulsion from all obstacles within the avoidance radius
pub fn avoidance_direction(pos: Vec2, obstacles: &[Obstacle], avoidance_radius: f32) -> Vec2 {
    obstacles
        .iter()
        .filter(|o| pos.distance(o.center()) < avoidance_radius)
        .map(|o| o.avoidance_vector(pos, avoidance_radius))
        .sum::<Vec2>()
        .normalize_or_zero()
}

/// Blend seek acceleration with obstacle avoidance, keeping its magnitude.
///
/// `mix` is the share given to avoidance. With no seek input the enemy still
/// backs away at `fallback_strength`.
pub fn blend_avoidance(seek: Vec2, avoid: Vec2, mix: f32, fallback_strength: f32) -> Vec2 {
    if avoid == Vec2::ZERO {
        return seek;
    }
    let strength = if seek == Vec2::ZERO {
        fallback_strength
    } else {
        seek.length()
    };
    let blended = seek.normalize_or_zero() * (1.0 - mix) + avoid * mix;
    blended.normalize_or_zero() * strength
}

/// Final acceleration for this tick, with avoidance for tiers that use it
pub fn desired_acceleration(enemy: &Enemy, steering: Steering, ctx: &SteeringContext) -> Vec2 {
    let settings = ctx.settings;
    let seek = seek_acceleration(enemy, steering, settings);
    let mix = match enemy.intelligence {
        Intelligence::Low => return seek,
        Intelligence::Medium => settings.ai.avoidance_mix_medium,
        Intelligence::High => settings.ai.avoidance_mix_high,
    };
    let avoid = avoidance_direction(enemy.pos, ctx.obstacles, settings.ai.avoidance_radius);
    blend_avoidance(
        seek,
        avoid,
        mix,
        settings.enemy.acceleration * enemy.speed_multiplier,
    )
}

/// Fold acceleration into velocity with friction, then move and clamp
pub fn integrate(enemy: &mut Enemy, acceleration: Vec2, ctx: &SteeringContext) {
    let cfg = &ctx.settings.enemy;
    enemy.vel = (enemy.vel + acceleration * cfg.accel_factor) * cfg.friction;
    if enemy.vel.length() < cfg.velocity_epsilon {
        enemy.vel = Vec2::ZERO;
    }
    enemy.prev_pos = enemy.pos;
    enemy.pos = clamp_to_arena(
        enemy.pos + enemy.vel * ctx.time_scale,
        cfg.radius,
        ctx.settings.arena.width,
        ctx.settings.arena.height,
    );
}

/// Full per-enemy update: pick a goal, turn it into acceleration, integrate.
/// Returns the updated enemy; the input is the previous-tick state.
pub fn steer_enemy(
    enemy: &Enemy,
    index: usize,
    ctx: &SteeringContext,
    rng: &mut impl Rng,
) -> Enemy {
    let mut next = enemy.clone();
    let steering = select_steering(&mut next, index, ctx, rng);

    let facing = match steering {
        Steering::Seek(target) => target - next.pos,
        Steering::Orbit(center) => orbit_direction(next.pos, center, &ctx.settings.guard),
    };
    if facing.length_squared() > 0.0 {
        next.heading = facing.y.atan2(facing.x);
    }

    let acceleration = desired_acceleration(&next, steering, ctx);
    integrate(&mut next, acceleration, ctx);
    next
}
