//! The Chosen One - a 2D arcade chase simulation
//!
//! Core modules:
//! - `sim`: Deterministic simulation (steering, collisions, boost, game state)
//! - `settings`: Data-driven game balance
//! - `highscores`: Session leaderboard
//!
//! Rendering and input devices live outside this crate. They read
//! [`sim::RenderSnapshot`] and feed [`sim::TickInput`].

pub mod highscores;
pub mod settings;
pub mod sim;

pub use highscores::HighScores;
pub use settings::{CollisionPolicy, ObstacleContact, Settings, SettingsError};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Nominal tick rate of the external scheduler (the engine is frame-stepped)
    pub const TICKS_PER_SECOND: u32 = 60;

    /// Arena dimensions
    pub const ARENA_WIDTH: f32 = 800.0;
    pub const ARENA_HEIGHT: f32 = 600.0;

    /// Player and enemies share the same tiny body size
    pub const PLAYER_RADIUS: f32 = 3.0;
    pub const ENEMY_RADIUS: f32 = 3.0;

    pub const PLAYER_ACCELERATION: f32 = 0.3;
    pub const PLAYER_FRICTION: f32 = 0.93;
    pub const ENEMY_ACCELERATION: f32 = 0.2;
    pub const ENEMY_FRICTION: f32 = 0.96;

    /// Velocities shorter than this snap to zero
    pub const VELOCITY_EPSILON: f32 = 0.01;

    /// Score points per level
    pub const POINTS_PER_LEVEL: u64 = 5;

    /// Hard cap for every rejection-sampling loop
    pub const PLACEMENT_RETRY_CAP: u32 = 200;
}

/// Euclidean distance between two optional points.
///
/// Returns `f32::INFINITY` if either point is absent (e.g. bonus not spawned yet),
/// so "is it close?" comparisons are simply false.
#[inline]
pub fn distance(a: Option<Vec2>, b: Option<Vec2>) -> f32 {
    match (a, b) {
        (Some(a), Some(b)) => a.distance(b),
        _ => f32::INFINITY,
    }
}

/// Unit vector from `from` toward `to`, or zero if the points coincide
#[inline]
pub fn direction_to(from: Vec2, to: Vec2) -> Vec2 {
    (to - from).normalize_or_zero()
}

/// Left-hand perpendicular of a vector
#[inline]
pub fn perpendicular(v: Vec2) -> Vec2 {
    Vec2::new(-v.y, v.x)
}

/// Clamp a position into the arena, inset by the body radius
#[inline]
pub fn clamp_to_arena(pos: Vec2, radius: f32, width: f32, height: f32) -> Vec2 {
    Vec2::new(
        pos.x.clamp(radius, width - radius),
        pos.y.clamp(radius, height - radius),
    )
}

/// Smallest absolute difference between two angles (radians), in [0, π]
#[inline]
pub fn angle_between(a: f32, b: f32) -> f32 {
    use std::f32::consts::TAU;
    let diff = (a - b).rem_euclid(TAU);
    diff.min(TAU - diff)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_absent_is_infinite() {
        assert_eq!(distance(None, Some(Vec2::ZERO)), f32::INFINITY);
        assert_eq!(distance(Some(Vec2::ZERO), None), f32::INFINITY);
        assert!((distance(Some(Vec2::ZERO), Some(Vec2::new(3.0, 4.0))) - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_direction_to_coincident_is_zero() {
        let p = Vec2::new(10.0, 10.0);
        assert_eq!(direction_to(p, p), Vec2::ZERO);
        let d = direction_to(p, Vec2::new(20.0, 10.0));
        assert!((d - Vec2::X).length() < 1e-6);
    }

    #[test]
    fn test_clamp_to_arena() {
        let p = clamp_to_arena(Vec2::new(-5.0, 900.0), 3.0, 800.0, 600.0);
        assert_eq!(p, Vec2::new(3.0, 597.0));
    }

    #[test]
    fn test_angle_between_wraps() {
        use std::f32::consts::PI;
        assert!((angle_between(0.1, -0.1) - 0.2).abs() < 1e-5);
        assert!((angle_between(PI - 0.1, -PI + 0.1) - 0.2).abs() < 1e-5);
    }
}
