//! Boost / slow-motion controller
//!
//! A tick-counted state machine: activation is only accepted with the cooldown
//! at zero, then the boost runs for `duration_frames` while the cooldown counts
//! down independently. While active, enemies and the player move on separate
//! time scales and a forecast of the player's path is produced.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::{Bonus, Player};
use crate::clamp_to_arena;
use crate::settings::Settings;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoostState {
    pub active: bool,
    pub duration_remaining: u32,
    pub cooldown_remaining: u32,
}

impl BoostState {
    pub fn is_ready(&self) -> bool {
        self.cooldown_remaining == 0 && !self.active
    }

    /// Try to start a boost. Ignored (state untouched) while cooling down.
    pub fn try_activate(&mut self, settings: &Settings) -> bool {
        if !self.is_ready() {
            return false;
        }
        self.active = true;
        self.duration_remaining = settings.boost.duration_frames;
        self.cooldown_remaining = settings.boost.cooldown_frames;
        true
    }

    /// Advance both counters by one tick. Returns true when the boost just ended.
    pub fn advance(&mut self) -> bool {
        let mut ended = false;
        if self.active {
            self.duration_remaining = self.duration_remaining.saturating_sub(1);
            if self.duration_remaining == 0 {
                self.active = false;
                ended = true;
            }
        }
        if self.cooldown_remaining > 0 {
            self.cooldown_remaining -= 1;
        }
        ended
    }

    /// `(enemy, player)` movement time scales for this tick
    pub fn time_scales(&self, settings: &Settings) -> (f32, f32) {
        if self.active {
            (settings.boost.enemy_time_scale, settings.boost.player_time_scale)
        } else {
            (1.0, 1.0)
        }
    }

    /// Remaining cooldown as a fraction in [0, 1], for cooldown bars
    pub fn cooldown_fraction(&self, settings: &Settings) -> f32 {
        if settings.boost.cooldown_frames == 0 {
            return 0.0;
        }
        self.cooldown_remaining as f32 / settings.boost.cooldown_frames as f32
    }
}

/// Forecast the player's path while boosted.
///
/// Replays the player physics from a copy of the current state with the held
/// input. Once the path enters the homing radius it locks onto the bonus with
/// amplified acceleration for the rest of the forecast. Stops after `preview_steps` or once the path is longer than
/// `preview_max_length`. The real player is never touched.
pub fn predict_trajectory(
    player: &Player,
    input_dir: Vec2,
    bonus: Option<&Bonus>,
    settings: &Settings,
) -> Vec<Vec2> {
    let cfg = &settings.boost;
    let mut ghost = *player;
    let mut path = Vec::with_capacity(cfg.preview_steps as usize);
    let mut travelled = 0.0;
    let mut homing_on = None;

    for _ in 0..cfg.preview_steps {
        if homing_on.is_none() {
            homing_on = bonus.filter(|b| ghost.pos.distance(b.pos) < cfg.homing_radius);
        }
        let accel = match homing_on {
            Some(b) => {
                (b.pos - ghost.pos).normalize_or_zero()
                    * settings.player.acceleration
                    * cfg.homing_factor
            }
            None => input_dir * settings.player.acceleration,
        };

        ghost.vel = (ghost.vel + accel) * settings.player.friction;
        let next = clamp_to_arena(
            ghost.pos + ghost.vel * cfg.player_time_scale,
            ghost.radius,
            settings.arena.width,
            settings.arena.height,
        );
        travelled += next.distance(ghost.pos);
        ghost.pos = next;
        path.push(next);

        if travelled > cfg.preview_max_length {
            break;
        }
    }

    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activation_sets_timers() {
        let settings = Settings::default();
        let mut boost = BoostState::default();
        assert!(boost.try_activate(&settings));
        assert!(boost.active);
        assert_eq!(boost.duration_remaining, settings.boost.duration_frames);
        assert_eq!(boost.cooldown_remaining, settings.boost.cooldown_frames);
    }

    #[test]
    fn test_activation_ignored_during_cooldown() {
        let settings = Settings::default();
        let mut boost = BoostState {
            active: false,
            duration_remaining: 0,
            cooldown_remaining: 5,
        };
        let before = boost;
        assert!(!boost.try_activate(&settings));
        assert_eq!(boost, before);
    }

    #[test]
    fn test_full_cycle() {
        let mut settings = Settings::default();
        settings.boost.duration_frames = 3;
        settings.boost.cooldown_frames = 5;
        let mut boost = BoostState::default();
        boost.try_activate(&settings);

        assert!(!boost.advance());
        assert!(!boost.advance());
        assert!(boost.advance()); // duration hits zero
        assert!(!boost.active);
        assert_eq!(boost.cooldown_remaining, 2);
        assert!(!boost.try_activate(&settings));
        boost.advance();
        boost.advance();
        assert_eq!(boost.cooldown_remaining, 0);
        assert!(!boost.advance());
        assert_eq!(boost.cooldown_remaining, 0);
        assert!(boost.try_activate(&settings));
    }

    #[test]
    fn test_time_scales() {
        let settings = Settings::default();
        let mut boost = BoostState::default();
        assert_eq!(boost.time_scales(&settings), (1.0, 1.0));
        boost.try_activate(&settings);
        assert_eq!(
            boost.time_scales(&settings),
            (settings.boost.enemy_time_scale, settings.boost.player_time_scale)
        );
        assert!((boost.cooldown_fraction(&settings) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_trajectory_is_read_only() {
        let settings = Settings::default();
        let mut player = Player::new(Vec2::new(100.0, 300.0), 3.0);
        player.vel = Vec2::new(2.0, 0.0);
        let snapshot = player;
        let path = predict_trajectory(&player, Vec2::X, None, &settings);
        assert_eq!(player, snapshot);
        assert!(!path.is_empty());
        assert!(path.len() <= settings.boost.preview_steps as usize);
        // Moves right monotonically
        assert!(path.windows(2).all(|w| w[1].x >= w[0].x));
    }

    #[test]
    fn test_trajectory_length_cap() {
        let mut settings = Settings::default();
        settings.boost.preview_max_length = 20.0;
        let mut player = Player::new(Vec2::new(100.0, 300.0), 3.0);
        player.vel = Vec2::new(5.0, 0.0);
        let path = predict_trajectory(&player, Vec2::X, None, &settings);
        assert!(path.len() < settings.boost.preview_steps as usize);
    }

    #[test]
    fn test_trajectory_homes_on_bonus() {
        let settings = Settings::default();
        let player = Player::new(Vec2::new(300.0, 300.0), 3.0);
        let bonus = Bonus {
            pos: Vec2::new(300.0, 250.0),
            size: 8.0,
        };
        // Input pushes right, but the bonus is within homing range above
        let path = predict_trajectory(&player, Vec2::X, Some(&bonus), &settings);
        let closest = path
            .iter()
            .map(|p| p.distance(bonus.pos))
            .fold(f32::INFINITY, f32::min);
        assert!(closest < 10.0);
    }

    #[test]
    fn test_trajectory_stays_locked_on_after_overshoot() {
        let settings = Settings::default();
        let bonus = Bonus {
            pos: Vec2::new(400.0, 300.0),
            size: 8.0,
        };
        // Starts inside the homing radius, fast enough to shoot out the far side
        let mut player = Player::new(bonus.pos - Vec2::new(70.0, 0.0), 3.0);
        player.vel = Vec2::new(30.0, 0.0);
        let path = predict_trajectory(&player, Vec2::ZERO, Some(&bonus), &settings);

        let furthest = path.iter().map(|p| p.x).fold(f32::MIN, f32::max);
        assert!(furthest - bonus.pos.x > settings.boost.homing_radius);
        // Still pulled back toward the bonus after leaving the radius
        let last = path.last().unwrap();
        assert!(last.x < furthest - 1.0);
    }
}
