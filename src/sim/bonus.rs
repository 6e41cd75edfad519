//! Bonus attraction and pickup
//!
//! Close to the player the bonus is always pulled in hard. Within a wider band
//! it drifts toward the player proportionally to how close it is, stronger
//! while boost is active.

use glam::Vec2;

use super::state::Bonus;
use crate::settings::BonusSettings;

/// Distance the bonus moves toward the player this tick
pub fn attraction_step(distance: f32, boost_active: bool, cfg: &BonusSettings) -> f32 {
    let pull = if distance < cfg.auto_radius {
        cfg.auto_pull
    } else if distance < cfg.attraction_radius && (boost_active || !cfg.attraction_requires_boost)
    {
        let falloff = 1.0 - distance / cfg.attraction_radius;
        let amplification = if boost_active {
            cfg.boost_amplification
        } else {
            1.0
        };
        cfg.attraction_pull * falloff * amplification
    } else {
        0.0
    };
    // Never overshoot the player
    pull.min(distance)
}

/// Drift the bonus toward the player
pub fn attract(bonus: &mut Bonus, player: Vec2, boost_active: bool, cfg: &BonusSettings) {
    let dist = bonus.pos.distance(player);
    let step = attraction_step(dist, boost_active, cfg);
    if step > 0.0 {
        bonus.pos += (player - bonus.pos).normalize_or_zero() * step;
    }
}

/// Player touches the bonus
pub fn is_collected(bonus: &Bonus, player: Vec2, player_radius: f32) -> bool {
    bonus.pos.distance(player) < player_radius + bonus.size / 2.0
}
