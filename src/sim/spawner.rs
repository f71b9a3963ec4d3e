//! Spawning: timed enemies, bullets with trails, and explosion effects

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::entity::{EffectKind, Entity, EntityId, EntityKind};
use super::state::{GameEvent, GameState};
use crate::renderer::{Mesh, Shader, Texture};
use crate::{heading_to_dir, rotate_about};

/// Muzzle position in the ship's local frame
const MUZZLE_OFFSET: Vec2 = Vec2::new(-0.5, 0.0);
/// Trail particles sit behind the bullet in its local frame
const TRAIL_OFFSET: Vec2 = Vec2::new(0.0, -0.5);
const TRAIL_SCALE: Vec2 = Vec2::new(0.05, 0.25);
const EXPLOSION_SCALE: f32 = 0.1;

/// Fires once each time the clock passes the next deadline
///
/// The deadline advances by a fixed interval rather than from the current
/// time, so a long frame yields one spawn and the schedule keeps its phase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpawnTimer {
    pub next_at: f64,
    pub interval: f64,
}

impl SpawnTimer {
    pub fn new(interval: f64) -> Self {
        Self {
            next_at: interval,
            interval,
        }
    }

    /// Returns true when a spawn is due, rescheduling additively
    pub fn poll(&mut self, now: f64) -> bool {
        if now > self.next_at {
            self.next_at += self.interval;
            true
        } else {
            false
        }
    }
}

impl GameState {
    /// Spawn an enemy if the spawn timer is due
    pub fn spawn_timed_enemy(&mut self) -> Option<EntityId> {
        if !self.spawner.poll(self.time) {
            return None;
        }

        let sub: i32 = self.rng.random_range(0..4);
        let x: i32 = self.rng.random_range(0..3) - sub;
        let y: i32 = self.rng.random_range(0..3) - sub;
        let pos = Vec2::new(x as f32, y as f32);

        let id = self.add_enemy(pos);
        log::debug!("Enemy {:?} spawned at {} (t={:.2})", id, pos, self.time);
        self.events.push(GameEvent::EnemySpawned { id, pos });
        Some(id)
    }

    /// Fire a bullet from the player's muzzle, with its trail
    ///
    /// Does nothing while the player's weapon is cooling down.
    pub fn spawn_bullet(&mut self) -> Option<EntityId> {
        let now = self.time;
        let speed = self.tuning.bullet_speed;
        let lifetime = self.tuning.bullet_lifetime_secs;
        let cooldown = self.tuning.fire_cooldown_secs;

        let player = self.player_entity();
        if player.cooldown_until.is_some() {
            return None;
        }
        let heading = player.heading;
        let origin = player.pos;
        let pos = rotate_about(origin + MUZZLE_OFFSET, origin, heading);

        let id = self.next_entity_id();
        let mut bullet = Entity::new(
            id,
            EntityKind::Bullet {
                start: pos,
                expires_at: now + lifetime,
            },
            pos,
            Texture::Bullet,
        )
        .with_heading(heading);
        bullet.pivot = origin;
        bullet.vel = heading_to_dir(heading) * speed;

        let trail_id = self.next_entity_id();
        let mut trail = Entity::new(
            trail_id,
            EntityKind::Effect(EffectKind::Trail { bullet: id }),
            TRAIL_OFFSET,
            Texture::Orb,
        )
        .with_scale(TRAIL_SCALE);
        trail.mesh = Mesh::TrailParticles;
        trail.shader = Shader::Particle;

        self.bullets.push(bullet);
        self.trails.push(trail);
        self.player_entity_mut().cooldown_until = Some(now + cooldown);

        self.stats.shots_fired += 1;
        log::debug!("Bullet {:?} fired from {} (t={:.2})", id, pos, now);
        self.events.push(GameEvent::BulletFired { id });
        Some(id)
    }

    /// Leave an explosion at `pos`
    ///
    /// The position is copied, so the effect survives its source being removed.
    pub fn spawn_explosion(&mut self, pos: Vec2) -> EntityId {
        let id = self.next_entity_id();
        let mut effect = Entity::new(
            id,
            EntityKind::Effect(EffectKind::Explosion),
            pos,
            Texture::Orb,
        )
        .with_scale(Vec2::splat(EXPLOSION_SCALE));
        effect.mesh = Mesh::ExplosionParticles;
        effect.shader = Shader::Particle;
        effect.despawn_at = Some(self.time + self.tuning.explosion_lifetime_secs);
        self.explosions.push(effect);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Tuning;

    #[test]
    fn test_spawn_timer_reschedules_additively() {
        let mut timer = SpawnTimer::new(7.0);
        assert!(!timer.poll(7.0));
        assert!(timer.poll(7.01));
        assert_eq!(timer.next_at, 14.0);
        assert!(!timer.poll(13.9));

        // A very late frame spawns once and keeps the 7 s phase
        assert!(timer.poll(30.0));
        assert_eq!(timer.next_at, 21.0);
    }

    #[test]
    fn test_timed_enemy_offset_is_small() {
        let mut state = GameState::empty(42, Tuning::default());
        for i in 1..=50 {
            state.time = 7.0 * i as f64 + 0.01;
            let id = state.spawn_timed_enemy().expect("spawn due");
            let enemy = state.enemies.iter().find(|e| e.id == id).unwrap();
            assert!((-3.0..=2.0).contains(&enemy.pos.x));
            assert!((-3.0..=2.0).contains(&enemy.pos.y));
            assert!(enemy.hostile);
        }
    }

    #[test]
    fn test_bullet_spawn_follows_heading() {
        let mut state = GameState::new(1, Tuning::default());
        state.player_entity_mut().heading = std::f32::consts::FRAC_PI_2;
        state.time = 2.0;

        let id = state.spawn_bullet().unwrap();
        let bullet = &state.bullets[0];
        assert_eq!(bullet.id, id);
        // Facing -X at heading π/2; muzzle offset rotates to (0, -0.5)
        assert!((bullet.pos - Vec2::new(0.0, -0.5)).length() < 1e-5);
        assert!((bullet.vel - Vec2::new(-100.0, 0.0)).length() < 1e-3);
        assert_eq!(
            bullet.kind,
            EntityKind::Bullet {
                start: bullet.pos,
                expires_at: 5.0
            }
        );
        assert_eq!(state.trails.len(), 1);
        assert_eq!(state.player_entity().cooldown_until, Some(3.0));

        // Cooling down
        assert!(state.spawn_bullet().is_none());
        assert_eq!(state.bullets.len(), 1);
    }

    #[test]
    fn test_explosion_copies_position() {
        let mut state = GameState::empty(1, Tuning::default());
        state.time = 1.5;
        state.spawn_explosion(Vec2::new(2.0, 3.0));
        let fx = &state.explosions[0];
        assert_eq!(fx.pos, Vec2::new(2.0, 3.0));
        assert_eq!(fx.despawn_at, Some(3.5));
        assert_eq!(fx.shader, Shader::Particle);
    }
}
