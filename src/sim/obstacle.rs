//! Obstacle shapes
//!
//! Obstacles are axis-aligned compositions of boxes: a plain rectangle, thin
//! horizontal/vertical lines, an L-shaped angle and a U-shape. Each shape knows
//! its own containment test; avoidance works off the bounding-box center.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::settings::Settings;

/// Containment slack on the thin axis of line-like shapes and arms
pub const THIN_TOLERANCE: f32 = 2.0;

/// Shape tag, used when picking a random obstacle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObstacleKind {
    Rect,
    LineH,
    LineV,
    Angle,
    UShape,
}

impl ObstacleKind {
    pub const ALL: [ObstacleKind; 5] = [
        ObstacleKind::Rect,
        ObstacleKind::LineH,
        ObstacleKind::LineV,
        ObstacleKind::Angle,
        ObstacleKind::UShape,
    ];
}

/// A static obstacle. `pos` is always the top-left corner of the bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Obstacle {
    Rect {
        pos: Vec2,
        width: f32,
        height: f32,
    },
    LineH {
        pos: Vec2,
        length: f32,
        thickness: f32,
    },
    LineV {
        pos: Vec2,
        length: f32,
        thickness: f32,
    },
    /// Vertical arm `width` x `height` with a horizontal arm
    /// `arm_width` x `arm_height` along its bottom
    Angle {
        pos: Vec2,
        width: f32,
        height: f32,
        arm_width: f32,
        arm_height: f32,
    },
    /// Base `width` x `base_height` along the bottom, with vertical arms
    /// `arm_width` x `height` at both ends
    UShape {
        pos: Vec2,
        width: f32,
        height: f32,
        arm_width: f32,
        base_height: f32,
    },
}

/// Box test with independent slack per axis
#[inline]
fn box_contains(point: Vec2, min: Vec2, size: Vec2, slack: Vec2) -> bool {
    point.x >= min.x - slack.x
        && point.x <= min.x + size.x + slack.x
        && point.y >= min.y - slack.y
        && point.y <= min.y + size.y + slack.y
}

impl Obstacle {
    pub fn kind(&self) -> ObstacleKind {
        match self {
            Obstacle::Rect { .. } => ObstacleKind::Rect,
            Obstacle::LineH { .. } => ObstacleKind::LineH,
            Obstacle::LineV { .. } => ObstacleKind::LineV,
            Obstacle::Angle { .. } => ObstacleKind::Angle,
            Obstacle::UShape { .. } => ObstacleKind::UShape,
        }
    }

    pub fn pos(&self) -> Vec2 {
        match *self {
            Obstacle::Rect { pos, .. }
            | Obstacle::LineH { pos, .. }
            | Obstacle::LineV { pos, .. }
            | Obstacle::Angle { pos, .. }
            | Obstacle::UShape { pos, .. } => pos,
        }
    }

    /// Width and height of the bounding box
    pub fn extent(&self) -> Vec2 {
        match *self {
            Obstacle::Rect { width, height, .. } => Vec2::new(width, height),
            Obstacle::LineH {
                length, thickness, ..
            } => Vec2::new(length, thickness),
            Obstacle::LineV {
                length, thickness, ..
            } => Vec2::new(thickness, length),
            Obstacle::Angle {
                width,
                height,
                arm_width,
                ..
            } => Vec2::new(width.max(arm_width), height),
            Obstacle::UShape { width, height, .. } => Vec2::new(width, height),
        }
    }

    /// Center of the bounding box
    pub fn center(&self) -> Vec2 {
        self.pos() + self.extent() / 2.0
    }

    /// Whether a point lies inside the shape
    pub fn contains_point(&self, point: Vec2) -> bool {
        match *self {
            Obstacle::Rect { pos, width, height } => {
                box_contains(point, pos, Vec2::new(width, height), Vec2::ZERO)
            }
            Obstacle::LineH {
                pos,
                length,
                thickness,
            } => box_contains(
                point,
                pos,
                Vec2::new(length, thickness),
                Vec2::new(0.0, THIN_TOLERANCE),
            ),
            Obstacle::LineV {
                pos,
                length,
                thickness,
            } => box_contains(
                point,
                pos,
                Vec2::new(thickness, length),
                Vec2::new(THIN_TOLERANCE, 0.0),
            ),
            Obstacle::Angle {
                pos,
                width,
                height,
                arm_width,
                arm_height,
            } => {
                let vertical = box_contains(
                    point,
                    pos,
                    Vec2::new(width, height),
                    Vec2::new(THIN_TOLERANCE, 0.0),
                );
                let horizontal = box_contains(
                    point,
                    Vec2::new(pos.x, pos.y + height - arm_height),
                    Vec2::new(arm_width, arm_height),
                    Vec2::new(0.0, THIN_TOLERANCE),
                );
                vertical || horizontal
            }
            Obstacle::UShape {
                pos,
                width,
                height,
                arm_width,
                base_height,
            } => {
                let arm = Vec2::new(arm_width, height);
                let slack = Vec2::new(THIN_TOLERANCE, 0.0);
                let left = box_contains(point, pos, arm, slack);
                let right = box_contains(
                    point,
                    Vec2::new(pos.x + width - arm_width, pos.y),
                    arm,
                    slack,
                );
                let base = box_contains(
                    point,
                    Vec2::new(pos.x, pos.y + height - base_height),
                    Vec2::new(width, base_height),
                    Vec2::new(0.0, THIN_TOLERANCE),
                );
                left || right || base
            }
        }
    }

    /// Distance from a point to the bounding box (0 inside)
    pub fn bounds_distance(&self, point: Vec2) -> f32 {
        let min = self.pos();
        let max = min + self.extent();
        let closest = point.clamp(min, max);
        point.distance(closest)
    }

    /// Heuristic overlap test on bounding boxes, with a required gap
    pub fn overlaps(&self, other: &Obstacle, gap: f32) -> bool {
        let delta = (self.center() - other.center()).abs();
        let reach = (self.extent() + other.extent()) / 2.0 + Vec2::splat(gap);
        delta.x < reach.x && delta.y < reach.y
    }

    /// Repulsion from this obstacle's center toward `entity`.
    ///
    /// Unit direction scaled by `min(1, radius / distance)`; coincident points
    /// get a fixed `(1, 0)` push so the result is never NaN.
    pub fn avoidance_vector(&self, entity: Vec2, avoidance_radius: f32) -> Vec2 {
        let away = entity - self.center();
        let dist = away.length();
        if dist <= f32::EPSILON {
            return Vec2::X;
        }
        away / dist * (avoidance_radius / dist).min(1.0)
    }

    /// Random shape of the given kind at `pos`
    pub fn random_shape(kind: ObstacleKind, pos: Vec2, thickness: f32, rng: &mut impl Rng) -> Self {
        match kind {
            ObstacleKind::Rect => Obstacle::Rect {
                pos,
                width: rng.random_range(30.0..=80.0),
                height: rng.random_range(30.0..=80.0),
            },
            ObstacleKind::LineH => Obstacle::LineH {
                pos,
                length: rng.random_range(60.0..=160.0),
                thickness,
            },
            ObstacleKind::LineV => Obstacle::LineV {
                pos,
                length: rng.random_range(60.0..=160.0),
                thickness,
            },
            ObstacleKind::Angle => Obstacle::Angle {
                pos,
                width: thickness,
                height: rng.random_range(50.0..=110.0),
                arm_width: rng.random_range(50.0..=110.0),
                arm_height: thickness,
            },
            ObstacleKind::UShape => Obstacle::UShape {
                pos,
                width: rng.random_range(60.0..=120.0),
                height: rng.random_range(40.0..=90.0),
                arm_width: thickness,
                base_height: thickness,
            },
        }
    }

    fn with_pos(self, new_pos: Vec2) -> Self {
        match self {
            Obstacle::Rect { width, height, .. } => Obstacle::Rect {
                pos: new_pos,
                width,
                height,
            },
            Obstacle::LineH {
                length, thickness, ..
            } => Obstacle::LineH {
                pos: new_pos,
                length,
                thickness,
            },
            Obstacle::LineV {
                length, thickness, ..
            } => Obstacle::LineV {
                pos: new_pos,
                length,
                thickness,
            },
            Obstacle::Angle {
                width,
                height,
                arm_width,
                arm_height,
                ..
            } => Obstacle::Angle {
                pos: new_pos,
                width,
                height,
                arm_width,
                arm_height,
            },
            Obstacle::UShape {
                width,
                height,
                arm_width,
                base_height,
                ..
            } => Obstacle::UShape {
                pos: new_pos,
                width,
                height,
                arm_width,
                base_height,
            },
        }
    }

    /// Generate a new obstacle by rejection sampling.
    ///
    /// Candidates too close to the player, the bonus or any enemy, or
    /// overlapping an existing obstacle, are rejected. When the retry cap runs out the last candidate is
    /// placed anyway and a warning is logged.
    pub fn generate(
        rng: &mut impl Rng,
        settings: &Settings,
        player: Vec2,
        bonus: Option<Vec2>,
        enemies: &[Vec2],
        existing: &[Obstacle],
    ) -> Self {
        let cfg = &settings.obstacles;
        let kind = ObstacleKind::ALL[rng.random_range(0..ObstacleKind::ALL.len())];
        let shape = Self::random_shape(kind, Vec2::ZERO, cfg.line_thickness, rng);
        let extent = shape.extent();
        let max_x = (settings.arena.width - extent.x).max(0.0);
        let max_y = (settings.arena.height - extent.y).max(0.0);

        let mut candidate = shape;
        for _ in 0..cfg.max_attempts.max(1) {
            candidate = shape.with_pos(Vec2::new(
                rng.random_range(0.0..=max_x),
                rng.random_range(0.0..=max_y),
            ));

            if candidate.bounds_distance(player) < cfg.player_clearance {
                continue;
            }
            if let Some(bonus) = bonus {
                if candidate.bounds_distance(bonus) < cfg.bonus_clearance {
                    continue;
                }
            }
            if enemies
                .iter()
                .any(|&e| candidate.bounds_distance(e) < cfg.enemy_clearance)
            {
                continue;
            }
            if existing.iter().any(|o| candidate.overlaps(o, cfg.spacing)) {
                continue;
            }
            return candidate;
        }

        log::warn!(
            "No valid spot for a {:?} obstacle after {} attempts; arena too crowded, placing anyway",
            kind,
            cfg.max_attempts
        );
        candidate
    }
}
