//! Enemy steering
//!
//! Enemies orbit their spawn pivot until the player comes within pursuit
//! range, then chase the player for the rest of their life.

use glam::Vec2;

use super::entity::{EnemyBrain, Entity, EntityKind};
use crate::consts::{COLLISION_MARGIN, PURSUIT_RANGE_FACTOR};
use crate::{dir_to_heading, rotate_about};

/// Distance under which a patrolling enemy starts chasing
#[inline]
pub fn pursuit_range(player_scale: f32) -> f32 {
    PURSUIT_RANGE_FACTOR * player_scale - COLLISION_MARGIN
}

/// Orbit the pivot by `angular_speed * dt` and face along the orbit
///
/// The heading is the angle between +X and the pivot offset. When that angle
/// drops below the previous frame's, it is negated so the sprite keeps turning
/// the same way instead of flipping back and forth.
pub fn patrol(enemy: &mut Entity, brain: &mut EnemyBrain, angular_speed: f32, dt: f32) {
    enemy.pos = rotate_about(enemy.pos, enemy.pivot, angular_speed * dt);

    let offset = enemy.pos - enemy.pivot;
    if offset.length_squared() <= f32::EPSILON {
        return;
    }

    let mut theta = Vec2::X.angle_to(offset).abs();
    if brain.prev_turn > theta {
        brain.prev_turn = theta;
        theta = -theta;
    } else {
        brain.prev_turn = theta;
    }
    enemy.heading = theta;
}

/// Head straight for the enemy's `target` at a fixed speed
pub fn pursue(enemy: &mut Entity, speed: f32) {
    let to_player = enemy.target - enemy.pos;
    if to_player.length_squared() > f32::EPSILON {
        enemy.heading = dir_to_heading(to_player);
    }
    enemy.vel = to_player.normalize_or_zero() * speed;
}

/// Run one frame of steering for an enemy
///
/// Dead enemies and a dead player suspend steering entirely.
pub fn steer(enemy: &mut Entity, player_dead: bool, angular_speed: f32, speed: f32, dt: f32) {
    let EntityKind::Enemy(mut brain) = enemy.kind else {
        return;
    };
    if player_dead || enemy.deceased {
        return;
    }

    if brain.pursuing {
        pursue(enemy, speed);
    } else {
        patrol(enemy, &mut brain, angular_speed, dt);
    }
    enemy.kind = EntityKind::Enemy(brain);
}

/// Latch pursuit once the player is in range. Returns true on the switch.
pub fn check_pursuit(enemy: &mut Entity, player_pos: Vec2, player_scale: f32) -> bool {
    let EntityKind::Enemy(ref mut brain) = enemy.kind else {
        return false;
    };
    if brain.pursuing || enemy.deceased {
        return false;
    }
    if enemy.pos.distance(player_pos) < pursuit_range(player_scale) {
        brain.pursuing = true;
        return true;
    }
    false
}

pub fn is_pursuing(enemy: &Entity) -> bool {
    matches!(enemy.kind, EntityKind::Enemy(EnemyBrain { pursuing: true, .. }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{PATROL_ANGULAR_SPEED, PURSUIT_SPEED};
    use crate::renderer::Texture;
    use crate::sim::entity::EntityId;
    use proptest::prelude::*;

    fn enemy_at(pos: Vec2) -> Entity {
        Entity::new(
            EntityId(3),
            EntityKind::Enemy(EnemyBrain {
                pursuing: false,
                prev_turn: 0.0,
            }),
            pos,
            Texture::EnemyBody,
        )
    }

    #[test]
    fn test_patrol_keeps_orbit_radius() {
        let mut e = enemy_at(Vec2::new(2.8, 0.0));
        let radius = e.pos.distance(e.pivot);
        for _ in 0..600 {
            steer(&mut e, false, PATROL_ANGULAR_SPEED, PURSUIT_SPEED, 1.0 / 60.0);
        }
        assert!((e.pos.distance(e.pivot) - radius).abs() < 1e-3);
        assert_eq!(e.vel, Vec2::ZERO);
        assert!(!is_pursuing(&e));
    }

    #[test]
    fn test_patrol_heading_tracks_offset_angle() {
        let mut e = enemy_at(Vec2::new(1.0, 1.0));
        steer(&mut e, false, PATROL_ANGULAR_SPEED, PURSUIT_SPEED, 0.1);
        let EntityKind::Enemy(brain) = e.kind else {
            panic!("not an enemy");
        };
        let expected = Vec2::X.angle_to(e.pos - e.pivot).abs();
        assert!((brain.prev_turn - expected).abs() < 1e-6);
        assert!((e.heading.abs() - expected).abs() < 1e-6);
    }

    #[test]
    fn test_patrol_heading_flips_sign_past_half_turn() {
        // Orbit the origin one degree per step from 170.75° to 190.75°
        let start = 170.75f32.to_radians();
        let mut e = enemy_at(Vec2::from_angle(start));
        e.pivot = Vec2::ZERO;
        e.kind = EntityKind::Enemy(EnemyBrain {
            pursuing: false,
            prev_turn: start,
        });
        let dt = 1f32.to_radians() / PATROL_ANGULAR_SPEED;

        let mut headings = Vec::new();
        for _ in 0..20 {
            steer(&mut e, false, PATROL_ANGULAR_SPEED, PURSUIT_SPEED, dt);
            let EntityKind::Enemy(brain) = e.kind else {
                panic!("not an enemy");
            };
            assert!(brain.prev_turn > 0.0);
            headings.push(e.heading.to_degrees());
        }

        let flip = headings
            .iter()
            .position(|h| *h < 0.0)
            .expect("heading never went negative");
        assert!((headings[flip - 1] - 179.75).abs() < 0.1);
        assert!((headings[flip] + 179.25).abs() < 0.1);
        // Rising toward +180 before the flip, then rising from -180 with no jump back
        assert!(headings[..flip].windows(2).all(|w| w[1] > w[0]));
        assert!(headings[flip..].iter().all(|h| *h < 0.0));
        assert!(headings[flip..].windows(2).all(|w| w[1] > w[0]));
        assert!((headings[19] + 169.25).abs() < 0.1);
    }

    #[test]
    fn test_pursue_moves_toward_player() {
        let mut e = enemy_at(Vec2::ZERO);
        e.target = Vec2::new(0.0, 3.0);
        check_pursuit(&mut e, Vec2::new(0.0, 1.0), 1.0);
        assert!(is_pursuing(&e));

        steer(&mut e, false, PATROL_ANGULAR_SPEED, PURSUIT_SPEED, 0.016);
        assert!((e.vel - Vec2::new(0.0, PURSUIT_SPEED)).length() < 1e-6);
        // Facing +Y is heading 0
        assert!(e.heading.abs() < 1e-6);
    }

    #[test]
    fn test_dead_player_freezes_steering() {
        let mut e = enemy_at(Vec2::new(1.0, 0.0));
        let before = e.pos;
        steer(&mut e, true, PATROL_ANGULAR_SPEED, PURSUIT_SPEED, 1.0);
        assert_eq!(e.pos, before);
    }

    #[test]
    fn test_dead_enemy_never_latches_pursuit() {
        let mut e = enemy_at(Vec2::ZERO);
        e.kill();
        assert!(!check_pursuit(&mut e, Vec2::ZERO, 1.0));
        assert!(!is_pursuing(&e));
    }

    #[test]
    fn test_pursuit_range() {
        assert!((pursuit_range(1.0) - 1.55).abs() < 1e-6);
        let mut e = enemy_at(Vec2::new(1.6, 0.0));
        assert!(!check_pursuit(&mut e, Vec2::ZERO, 1.0));
        e.pos = Vec2::new(1.5, 0.0);
        assert!(check_pursuit(&mut e, Vec2::ZERO, 1.0));
    }

    proptest! {
        #[test]
        fn prop_pursuit_is_monotonic(
            steps in prop::collection::vec((-4.0f32..4.0, -4.0f32..4.0, any::<bool>()), 1..40)
        ) {
            let mut e = enemy_at(Vec2::ZERO);
            let mut latched = false;
            for (x, y, dead) in steps {
                let player = Vec2::new(x, y);
                e.target = player;
                check_pursuit(&mut e, player, 1.0);
                steer(&mut e, dead, PATROL_ANGULAR_SPEED, PURSUIT_SPEED, 1.0 / 60.0);
                if latched {
                    prop_assert!(is_pursuing(&e));
                }
                latched = is_pursuing(&e);
            }
        }
    }
}
