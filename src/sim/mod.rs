//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Frame-stepped only (one call to [`tick`] is one step, never a time delta)
//! - Seeded RNG only, threaded through every random decision
//! - Stable iteration order (by entity ID)
//! - No rendering or input-device dependencies

pub mod bonus;
pub mod boost;
pub mod collision;
pub mod obstacle;
pub mod snapshot;
pub mod spawn;
pub mod state;
pub mod steering;
pub mod tick;

pub use boost::{BoostState, predict_trajectory};
pub use collision::{Caught, elastic_response};
pub use obstacle::{Obstacle, ObstacleKind};
pub use snapshot::{BonusView, EnemyView, RenderSnapshot};
pub use state::{
    Bonus, Enemy, GameEvent, GuardMode, Intelligence, Player, Role, WorldState, level_for_score,
};
pub use steering::{Steering, SteeringContext};
pub use tick::{TickInput, tick};
