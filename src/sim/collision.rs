//! Collision detection and response
//!
//! Enemy-vs-enemy contacts are resolved either by removing both enemies or by
//! an elastic impulse along the contact normal followed by overlap separation.
//! Enemy-vs-obstacle contacts destroy or bounce the enemy. Player contacts are
//! reported to the tick, which ends the run.

use glam::Vec2;

use super::obstacle::Obstacle;
use super::state::{Enemy, Player};
use crate::clamp_to_arena;
use crate::settings::{CollisionPolicy, ObstacleContact, Settings};

/// Velocities of two bodies after an impulse along `normal` (pointing from
/// body 1 to body 2). Bodies already moving apart are returned unchanged.
///
/// Standard equal-mass impulse: j = -(1 + e)(Δv·n) / 2
pub fn elastic_response(
    vel1: Vec2,
    vel2: Vec2,
    normal: Vec2,
    restitution: f32,
) -> (Vec2, Vec2) {
    let approach = (vel2 - vel1).dot(normal);
    if approach > 0.0 {
        return (vel1, vel2);
    }
    let impulse = -(1.0 + restitution) * approach / 2.0;
    (vel1 - normal * impulse, vel2 + normal * impulse)
}

/// Contact normal from `a` to `b`; coincident bodies get a fixed axis
#[inline]
fn contact_normal(a: Vec2, b: Vec2) -> Vec2 {
    let n = (b - a).normalize_or_zero();
    if n == Vec2::ZERO { Vec2::X } else { n }
}

/// Bounce two overlapping enemies off each other and push them apart
fn bounce_pair(a: &mut Enemy, b: &mut Enemy, settings: &Settings) {
    let radius = settings.enemy.radius;
    let normal = contact_normal(a.pos, b.pos);
    let (va, vb) = elastic_response(a.vel, b.vel, normal, settings.enemy.restitution);
    a.vel = va;
    b.vel = vb;

    let overlap = 2.0 * radius - a.pos.distance(b.pos);
    if overlap > 0.0 {
        let push = normal * (overlap / 2.0);
        let (w, h) = (settings.arena.width, settings.arena.height);
        a.pos = clamp_to_arena(a.pos - push, radius, w, h);
        b.pos = clamp_to_arena(b.pos + push, radius, w, h);
    }
}

/// Resolve all enemy-enemy contacts in one pass over the batch-updated list.
///
/// Returns the ID pairs that touched. Under [`CollisionPolicy::Annihilate`]
/// every enemy in a touching pair is removed after the pass.
pub fn resolve_enemy_collisions(enemies: &mut Vec<Enemy>, settings: &Settings) -> Vec<(u32, u32)> {
    let contact = 2.0 * settings.enemy.radius;
    let mut pairs = Vec::new();

    match settings.enemy.collision_policy {
        CollisionPolicy::Annihilate => {
            let mut doomed = vec![false; enemies.len()];
            for i in 0..enemies.len() {
                for j in (i + 1)..enemies.len() {
                    if enemies[i].pos.distance(enemies[j].pos) < contact {
                        doomed[i] = true;
                        doomed[j] = true;
                        pairs.push((enemies[i].id, enemies[j].id));
                    }
                }
            }
            let mut flags = doomed.into_iter();
            enemies.retain(|_| !flags.next().unwrap_or(false));
        }
        CollisionPolicy::ElasticBounce => {
            for i in 0..enemies.len() {
                for j in (i + 1)..enemies.len() {
                    if enemies[i].pos.distance(enemies[j].pos) < contact {
                        let (head, tail) = enemies.split_at_mut(j);
                        bounce_pair(&mut head[i], &mut tail[0], settings);
                        pairs.push((head[i].id, tail[0].id));
                    }
                }
            }
        }
    }

    pairs
}

/// Apply obstacle contacts to enemies; returns IDs of destroyed enemies.
///
/// Under [`ObstacleContact::Bounce`] an enemy whose previous position is also
/// inside an obstacle has nowhere to bounce back to and is destroyed as well.
pub fn resolve_obstacle_hits(
    enemies: &mut Vec<Enemy>,
    obstacles: &[Obstacle],
    settings: &Settings,
) -> Vec<u32> {
    if obstacles.is_empty() {
        return Vec::new();
    }
    let hits = |e: &Enemy| obstacles.iter().any(|o| o.contains_point(e.pos));

    match settings.enemy.obstacle_contact {
        ObstacleContact::Destroy => {
            let destroyed: Vec<u32> = enemies.iter().filter(|e| hits(e)).map(|e| e.id).collect();
            enemies.retain(|e| !hits(e));
            destroyed
        }
        ObstacleContact::Bounce => {
            let embedded = |e: &Enemy| obstacles.iter().any(|o| o.contains_point(e.prev_pos));
            let mut destroyed = Vec::new();
            enemies.retain_mut(|enemy| {
                if !hits(enemy) {
                    return true;
                }
                if embedded(enemy) {
                    destroyed.push(enemy.id);
                    return false;
                }
                enemy.pos = enemy.prev_pos;
                enemy.vel = -enemy.vel * 0.5;
                true
            });
            destroyed
        }
    }
}

/// What ended the run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Caught {
    ByEnemy(u32),
    ByObstacle,
}

/// Check whether the player touches an enemy or an obstacle
pub fn player_contact(
    player: &Player,
    enemies: &[Enemy],
    obstacles: &[Obstacle],
    settings: &Settings,
) -> Option<Caught> {
    let reach = player.radius + settings.enemy.radius;
    if let Some(enemy) = enemies.iter().find(|e| e.pos.distance(player.pos) < reach) {
        return Some(Caught::ByEnemy(enemy.id));
    }
    if obstacles.iter().any(|o| o.contains_point(player.pos)) {
        return Some(Caught::ByObstacle);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{Intelligence, Role};

    fn enemy_at(id: u32, pos: Vec2, vel: Vec2) -> Enemy {
        let mut e = Enemy::new(id, pos, Role::Aggressive, Intelligence::Low, 1.0);
        e.vel = vel;
        e
    }

    #[test]
    fn test_head_on_restitution() {
        let v = 2.0;
        let (v1, v2) = elastic_response(Vec2::new(v, 0.0), Vec2::new(-v, 0.0), Vec2::X, 0.8);
        // Relative normal speed goes from -2v (approaching) to +0.8 * 2v (separating)
        let after = (v2 - v1).dot(Vec2::X);
        assert!((after - 0.8 * 2.0 * v).abs() < 1e-5);
        assert!((v1.x + 1.6).abs() < 1e-5);
        assert!((v2.x - 1.6).abs() < 1e-5);
        // Momentum conserved
        assert!((v1 + v2).length() < 1e-5);
    }

    #[test]
    fn test_separating_bodies_untouched() {
        let v1 = Vec2::new(-1.0, 0.0);
        let v2 = Vec2::new(1.0, 0.0);
        assert_eq!(elastic_response(v1, v2, Vec2::X, 0.8), (v1, v2));
    }

    #[test]
    fn test_bounce_policy_separates() {
        let settings = Settings::default();
        let mut enemies = vec![
            enemy_at(1, Vec2::new(100.0, 100.0), Vec2::new(1.0, 0.0)),
            enemy_at(2, Vec2::new(104.0, 100.0), Vec2::new(-1.0, 0.0)),
        ];
        let pairs = resolve_enemy_collisions(&mut enemies, &settings);
        assert_eq!(pairs, vec![(1, 2)]);
        assert_eq!(enemies.len(), 2);
        let gap = enemies[0].pos.distance(enemies[1].pos);
        assert!((gap - 2.0 * settings.enemy.radius).abs() < 1e-4);
        assert!(enemies[0].vel.x < 0.0 && enemies[1].vel.x > 0.0);
    }

    #[test]
    fn test_coincident_enemies_do_not_produce_nan() {
        let settings = Settings::default();
        let mut enemies = vec![
            enemy_at(1, Vec2::new(100.0, 100.0), Vec2::ZERO),
            enemy_at(2, Vec2::new(100.0, 100.0), Vec2::ZERO),
        ];
        resolve_enemy_collisions(&mut enemies, &settings);
        for e in &enemies {
            assert!(e.pos.is_finite() && e.vel.is_finite());
        }
        assert!(enemies[0].pos != enemies[1].pos);
    }

    #[test]
    fn test_annihilation_removes_pairs_and_chains() {
        let mut settings = Settings::default();
        settings.enemy.collision_policy = CollisionPolicy::Annihilate;
        let mut enemies = vec![
            enemy_at(1, Vec2::new(100.0, 100.0), Vec2::ZERO),
            enemy_at(2, Vec2::new(104.0, 100.0), Vec2::ZERO),
            enemy_at(3, Vec2::new(108.0, 100.0), Vec2::ZERO),
            enemy_at(4, Vec2::new(300.0, 300.0), Vec2::ZERO),
        ];
        let pairs = resolve_enemy_collisions(&mut enemies, &settings);
        assert_eq!(pairs, vec![(1, 2), (2, 3)]);
        assert_eq!(enemies.len(), 1);
        assert_eq!(enemies[0].id, 4);
    }

    #[test]
    fn test_obstacle_destroys_enemy() {
        let settings = Settings::default();
        let obstacles = [Obstacle::Rect {
            pos: Vec2::new(50.0, 50.0),
            width: 20.0,
            height: 20.0,
        }];
        let mut enemies = vec![
            enemy_at(1, Vec2::new(55.0, 55.0), Vec2::ZERO),
            enemy_at(2, Vec2::new(200.0, 200.0), Vec2::ZERO),
        ];
        let destroyed = resolve_obstacle_hits(&mut enemies, &obstacles, &settings);
        assert_eq!(destroyed, vec![1]);
        assert_eq!(enemies.len(), 1);
        assert_eq!(enemies[0].id, 2);
    }

    #[test]
    fn test_obstacle_bounce_reverts_position() {
        let mut settings = Settings::default();
        settings.enemy.obstacle_contact = ObstacleContact::Bounce;
        let obstacles = [Obstacle::Rect {
            pos: Vec2::new(50.0, 50.0),
            width: 20.0,
            height: 20.0,
        }];
        let mut e = enemy_at(1, Vec2::new(52.0, 55.0), Vec2::new(4.0, 0.0));
        e.prev_pos = Vec2::new(48.0, 55.0);
        let mut enemies = vec![e];
        assert!(resolve_obstacle_hits(&mut enemies, &obstacles, &settings).is_empty());
        assert_eq!(enemies[0].pos, Vec2::new(48.0, 55.0));
        assert_eq!(enemies[0].vel, Vec2::new(-2.0, 0.0));
    }

    #[test]
    fn test_obstacle_bounce_drops_embedded_enemy() {
        let mut settings = Settings::default();
        settings.enemy.obstacle_contact = ObstacleContact::Bounce;
        let obstacles = [Obstacle::Rect {
            pos: Vec2::new(50.0, 50.0),
            width: 20.0,
            height: 20.0,
        }];
        // Obstacle appeared on top of the enemy: both positions are inside
        let mut stuck = enemy_at(1, Vec2::new(60.0, 60.0), Vec2::new(0.5, 0.0));
        stuck.prev_pos = Vec2::new(59.5, 60.0);
        let mut enemies = vec![stuck, enemy_at(2, Vec2::new(200.0, 200.0), Vec2::ZERO)];

        let destroyed = resolve_obstacle_hits(&mut enemies, &obstacles, &settings);
        assert_eq!(destroyed, vec![1]);
        assert_eq!(enemies.len(), 1);
        assert_eq!(enemies[0].id, 2);
    }

    #[test]
    fn test_player_contact() {
        let settings = Settings::default();
        let player = Player::new(Vec2::new(100.0, 100.0), settings.player.radius);
        let enemies = vec![enemy_at(9, Vec2::new(104.0, 100.0), Vec2::ZERO)];
        assert_eq!(
            player_contact(&player, &enemies, &[], &settings),
            Some(Caught::ByEnemy(9))
        );
        let far = vec![enemy_at(9, Vec2::new(110.0, 100.0), Vec2::ZERO)];
        assert_eq!(player_contact(&player, &far, &[], &settings), None);

        let wall = [Obstacle::LineV {
            pos: Vec2::new(99.0, 0.0),
            length: 300.0,
            thickness: 4.0,
        }];
        assert_eq!(
            player_contact(&player, &far, &wall, &settings),
            Some(Caught::ByObstacle)
        );
    }
}
