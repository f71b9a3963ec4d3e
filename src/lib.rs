//! Star Blade - a top-down arcade shooter
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, steering, collisions, game state)
//! - `renderer`: Opaque draw-call collaborator and batch packing
//! - `platform`: Clock abstraction for the frame loop
//! - `settings`: Runtime settings and gameplay tuning

pub mod error;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use error::GameError;
pub use settings::{Settings, SweptRay, Tuning};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Headless frame step (60 Hz)
    pub const FRAME_DT: f32 = 1.0 / 60.0;
    /// Largest delta a single frame may integrate (slow frames are clamped)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Camera zoom applied to the view matrix
    pub const CAMERA_ZOOM: f32 = 0.25;

    /// Player defaults
    pub const STARTING_LIVES: i32 = 2;
    pub const PLAYER_MAX_ACCEL: f32 = 5.0;
    pub const PLAYER_ACCEL_STEP: f32 = 0.05;
    /// Heading change per frame while a turn key is held (degrees)
    pub const PLAYER_TURN_STEP_DEG: f32 = 0.6;

    /// Pickups needed to trigger invulnerability
    pub const PICKUPS_FOR_INVULNERABILITY: u32 = 5;
    pub const INVULNERABILITY_SECS: f64 = 10.0;
    /// Delay between the final death and game over
    pub const DEATH_DELAY_SECS: f64 = 3.0;

    /// Bullet defaults
    pub const BULLET_SPEED: f32 = 100.0;
    pub const BULLET_LIFETIME_SECS: f64 = 3.0;
    pub const FIRE_COOLDOWN_SECS: f64 = 1.0;

    /// Enemy defaults
    pub const ENEMY_SPAWN_INTERVAL_SECS: f64 = 7.0;
    pub const ENEMY_DESPAWN_DELAY_SECS: f64 = 6.0;
    /// Patrol orbit speed (rad/s)
    pub const PATROL_ANGULAR_SPEED: f32 = 0.1;
    pub const PURSUIT_SPEED: f32 = 0.15;
    pub const PURSUIT_RANGE_FACTOR: f32 = 1.75;

    /// Explosion particle lifetime
    pub const EXPLOSION_LIFETIME_SECS: f64 = 2.0;

    /// Circle-circle trigger: distance < scale.x - COLLISION_MARGIN
    pub const COLLISION_MARGIN: f32 = 0.2;
    /// Enemy hit radius for the bullet ray test
    pub const BULLET_HIT_RADIUS: f32 = 0.5;
    /// Slack on the "closest point lies on the segment" check
    pub const RAY_TOLERANCE: f32 = 0.1;

    /// Blade spin per frame (radians)
    pub const BLADE_SPIN_STEP: f32 = 0.5;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Forward direction for a heading. Sprites face +Y at heading 0.
#[inline]
pub fn heading_to_dir(heading: f32) -> Vec2 {
    Vec2::new(-heading.sin(), heading.cos())
}

/// Heading that makes a sprite face along `dir`
#[inline]
pub fn dir_to_heading(dir: Vec2) -> f32 {
    normalize_angle(dir.y.atan2(dir.x) - std::f32::consts::FRAC_PI_2)
}

/// Rotate `point` counter-clockwise around `pivot` by `angle` radians
#[inline]
pub fn rotate_about(point: Vec2, pivot: Vec2, angle: f32) -> Vec2 {
    pivot + Vec2::from_angle(angle).rotate(point - pivot)
}
