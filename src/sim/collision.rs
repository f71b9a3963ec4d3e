//! Collision detection
//!
//! Two predicates: overlapping circles for bodies and pickups, and a short
//! swept segment for bullets against enemies.

use glam::Vec2;

use super::entity::Entity;
use crate::consts::{BULLET_HIT_RADIUS, COLLISION_MARGIN, RAY_TOLERANCE};

/// Circle overlap with the trigger radius derived from a sprite scale
///
/// Hits when `distance(a, b) < scale - COLLISION_MARGIN`.
#[inline]
pub fn circles_overlap(a: Vec2, b: Vec2, scale: f32) -> bool {
    a.distance(b) < scale - COLLISION_MARGIN
}

/// Body-vs-body test between two entities
///
/// Uses the larger of the two scales so the result doesn't depend on
/// argument order.
pub fn entities_collide(a: &Entity, b: &Entity) -> bool {
    circles_overlap(a.pos, b.pos, a.scale.x.max(b.scale.x))
}

/// Bullet lookahead segment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub start: Vec2,
    pub end: Vec2,
}

impl Ray {
    /// Segment from `start` one unit along `vel`
    pub fn unit(start: Vec2, vel: Vec2) -> Self {
        Self {
            start,
            end: start + vel.normalize_or_zero(),
        }
    }

    /// Segment covering the full frame displacement
    pub fn displacement(start: Vec2, vel: Vec2, dt: f32) -> Self {
        Self {
            start,
            end: start + vel * dt,
        }
    }

    #[inline]
    pub fn length(&self) -> f32 {
        self.start.distance(self.end)
    }

    /// Point on the segment nearest to `p`
    pub fn closest_point(&self, p: Vec2) -> Vec2 {
        let len = self.length();
        let dir = (self.end - self.start).normalize_or_zero();
        let t = (p - self.start).dot(dir).clamp(0.0, len);
        self.start + dir * t
    }
}

/// Swept segment-vs-circle test for a bullet against an enemy center
///
/// An endpoint within [`BULLET_HIT_RADIUS`] is an immediate hit. Otherwise the
/// enemy is projected onto the segment; the projection only counts when it
/// lies on the segment (endpoint distances sum to the ray length within
/// [`RAY_TOLERANCE`]) and is within the hit radius of the enemy.
pub fn ray_hits_circle(ray: Ray, center: Vec2) -> bool {
    if ray.start.distance(center) <= BULLET_HIT_RADIUS
        || ray.end.distance(center) <= BULLET_HIT_RADIUS
    {
        return true;
    }

    let len = ray.length();
    let closest = ray.closest_point(center);
    let along = closest.distance(ray.start) + closest.distance(ray.end);
    if (along - len).abs() > RAY_TOLERANCE {
        return false;
    }

    closest.distance(center) <= BULLET_HIT_RADIUS
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::Texture;
    use crate::sim::entity::{EntityId, EntityKind};
    use proptest::prelude::*;

    fn body(pos: Vec2, scale: f32) -> Entity {
        Entity::new(EntityId(0), EntityKind::Collectible, pos, Texture::Item)
            .with_scale(Vec2::splat(scale))
    }

    #[test]
    fn test_circles_overlap_threshold() {
        // scale 1 -> trigger distance 0.8
        assert!(circles_overlap(Vec2::ZERO, Vec2::new(0.79, 0.0), 1.0));
        assert!(!circles_overlap(Vec2::ZERO, Vec2::new(0.8, 0.0), 1.0));
        assert!(!circles_overlap(Vec2::ZERO, Vec2::new(2.0, 0.0), 1.0));
    }

    #[test]
    fn test_ray_hits_enemy_on_midpoint() {
        let ray = Ray::unit(Vec2::new(-0.5, 0.0), Vec2::new(100.0, 0.0));
        assert!((ray.length() - 1.0).abs() < 1e-6);
        assert!(ray_hits_circle(ray, Vec2::ZERO));
    }

    #[test]
    fn test_ray_hits_enemy_beside_segment() {
        // Endpoints far away, enemy 0.4 off the middle of a long segment
        let ray = Ray {
            start: Vec2::new(-2.0, 0.0),
            end: Vec2::new(2.0, 0.0),
        };
        assert!(ray_hits_circle(ray, Vec2::new(0.0, 0.4)));
        assert!(!ray_hits_circle(ray, Vec2::new(0.0, 0.6)));
    }

    #[test]
    fn test_ray_misses_enemy_behind() {
        let ray = Ray::unit(Vec2::ZERO, Vec2::new(0.0, 100.0));
        assert!(!ray_hits_circle(ray, Vec2::new(0.0, -0.51 - 1.0)));
    }

    #[test]
    fn test_ray_misses_far_enemy() {
        // Farther than 0.5 + len/2 from both endpoints
        let ray = Ray::unit(Vec2::ZERO, Vec2::new(1.0, 0.0));
        assert!(!ray_hits_circle(ray, Vec2::new(0.5, 1.01)));
        assert!(!ray_hits_circle(ray, Vec2::new(-1.01, 0.0)));
    }

    #[test]
    fn test_degenerate_ray_is_point_test() {
        let ray = Ray::unit(Vec2::ZERO, Vec2::ZERO);
        assert_eq!(ray.length(), 0.0);
        assert!(ray_hits_circle(ray, Vec2::new(0.5, 0.0)));
        assert!(!ray_hits_circle(ray, Vec2::new(0.0, 0.51)));
    }

    #[test]
    fn test_unit_ray_caps_length() {
        let fast = Ray::unit(Vec2::ZERO, Vec2::new(100.0, 0.0));
        assert!((fast.length() - 1.0).abs() < 1e-6);
        // Enemy 1.6 units ahead is missed by the unit lookahead...
        assert!(!ray_hits_circle(fast, Vec2::new(2.6, 0.0)));
        // ...but caught when the ray covers the frame displacement
        let swept = Ray::displacement(Vec2::ZERO, Vec2::new(100.0, 0.0), 1.0 / 30.0);
        assert!(ray_hits_circle(swept, Vec2::new(2.6, 0.0)));
    }

    proptest! {
        #[test]
        fn prop_entity_collision_is_symmetric(
            ax in -5.0f32..5.0, ay in -5.0f32..5.0, sa in 0.1f32..4.0,
            bx in -5.0f32..5.0, by in -5.0f32..5.0, sb in 0.1f32..4.0,
        ) {
            let a = body(Vec2::new(ax, ay), sa);
            let b = body(Vec2::new(bx, by), sb);
            prop_assert_eq!(entities_collide(&a, &b), entities_collide(&b, &a));
        }

        #[test]
        fn prop_ray_hits_anything_on_segment(t in 0.0f32..1.0, angle in -3.1f32..3.1) {
            let ray = Ray::unit(Vec2::new(1.0, -2.0), Vec2::from_angle(angle) * 100.0);
            let on = ray.start + (ray.end - ray.start) * t;
            prop_assert!(ray_hits_circle(ray, on));
        }
    }
}
