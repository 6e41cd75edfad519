//! Read-only view of the world for renderers and HUDs

use glam::Vec2;
use serde::Serialize;

use super::boost::BoostState;
use super::obstacle::Obstacle;
use super::state::{GameEvent, Intelligence, Role, WorldState};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnemyView {
    pub id: u32,
    pub pos: Vec2,
    pub role: Role,
    pub intelligence: Intelligence,
    pub heading: f32,
    pub engaged: bool,
    pub player_spotted: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BonusView {
    pub pos: Vec2,
    pub size: f32,
}

/// Everything a presentation layer needs for one frame. Owned, so it can be
/// handed off and consumed later without borrowing the world.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderSnapshot {
    pub tick: u64,
    pub player: Vec2,
    pub player_radius: f32,
    pub enemies: Vec<EnemyView>,
    pub bonus: Option<BonusView>,
    pub obstacles: Vec<Obstacle>,
    pub boost: BoostState,
    /// Cooldown bar fill, 1.0 right after activation
    pub boost_cooldown: f32,
    pub trajectory: Vec<Vec2>,
    pub score: u64,
    pub level: u32,
    pub high_score: u64,
    pub events: Vec<GameEvent>,
}

impl WorldState {
    pub fn snapshot(&self) -> RenderSnapshot {
        RenderSnapshot {
            tick: self.tick,
            player: self.player.pos,
            player_radius: self.player.radius,
            enemies: self
                .enemies
                .iter()
                .map(|e| EnemyView {
                    id: e.id,
                    pos: e.pos,
                    role: e.role,
                    intelligence: e.intelligence,
                    heading: e.heading,
                    engaged: e.is_engaged(),
                    player_spotted: e.player_spotted,
                })
                .collect(),
            bonus: self.bonus.map(|b| BonusView {
                pos: b.pos,
                size: b.size,
            }),
            obstacles: self.obstacles.clone(),
            boost: self.boost,
            boost_cooldown: self.boost.cooldown_fraction(&self.settings),
            trajectory: self.trajectory.clone(),
            score: self.score,
            level: self.level,
            high_score: self.high_scores.top_score().max(self.score),
            events: self.events.clone(),
        }
    }
}
