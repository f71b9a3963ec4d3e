//! Entity model
//!
//! Every game object is one [`Entity`]; what it *is* lives in [`EntityKind`].
//! The frame updater dispatches on the kind instead of virtual calls.

use glam::{Mat4, Quat, Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::renderer::{DrawCall, Mesh, Renderer, Shader, Texture};

/// Stable handle to an entity, valid until the entity leaves its collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u32);

/// Enemy AI memory
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnemyBrain {
    /// Chasing the player; never reverts to patrol
    pub pursuing: bool,
    /// Last patrol turn angle (radians), keeps turns going one way
    pub prev_turn: f32,
}

/// Particle effect flavour
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EffectKind {
    /// Burst left where something died; position copied at spawn
    Explosion,
    /// Streak drawn in its bullet's frame
    Trail { bullet: EntityId },
}

/// What an entity is, plus the data only that kind carries
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EntityKind {
    Player,
    Collectible,
    Enemy(EnemyBrain),
    Bullet {
        start: Vec2,
        /// Simulation time after which the bullet is removed
        expires_at: f64,
    },
    /// Spinning blade drawn in its parent's frame
    Blade { parent: EntityId, spin: f32 },
    /// Static scenery that doesn't collide
    Decoration,
    Background,
    Effect(EffectKind),
}

/// A positioned, updatable, renderable game object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub kind: EntityKind,
    pub pos: Vec2,
    /// Draw order only
    pub depth: f32,
    pub vel: Vec2,
    pub scale: Vec2,
    /// Heading in radians (0 faces +Y)
    pub heading: f32,
    /// Rotation center for orbiting movement
    pub pivot: Vec2,
    /// Player position as of this frame
    pub target: Vec2,
    pub deceased: bool,
    /// Scheduled removal time; `None` means no removal is scheduled
    pub despawn_at: Option<f64>,
    pub hostile: bool,
    /// Thrust scalar applied to velocity by controls
    pub accel: f32,
    /// Time until which firing is blocked
    pub cooldown_until: Option<f64>,
    pub tiles: u32,
    pub mesh: Mesh,
    pub shader: Shader,
    pub texture: Texture,
}

impl Entity {
    pub fn new(id: EntityId, kind: EntityKind, pos: Vec2, texture: Texture) -> Self {
        Self {
            id,
            kind,
            pos,
            depth: 0.0,
            vel: Vec2::ZERO,
            scale: Vec2::ONE,
            heading: 0.0,
            pivot: pos - Vec2::splat(0.2),
            target: Vec2::ZERO,
            deceased: false,
            despawn_at: None,
            hostile: false,
            accel: 0.0,
            cooldown_until: None,
            tiles: 1,
            mesh: Mesh::Sprite,
            shader: Shader::Sprite,
            texture,
        }
    }

    pub fn with_scale(mut self, scale: Vec2) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_depth(mut self, depth: f32) -> Self {
        self.depth = depth;
        self
    }

    pub fn with_heading(mut self, heading: f32) -> Self {
        self.heading = heading;
        self
    }

    /// Scenery that sits at the tail of the world list and never collides
    pub fn is_decorative(&self) -> bool {
        matches!(
            self.kind,
            EntityKind::Blade { .. } | EntityKind::Decoration | EntityKind::Background
        )
    }

    /// Semi-implicit Euler step; acceleration is applied to `vel` by callers
    #[inline]
    pub fn update(&mut self, dt: f32) {
        self.pos += self.vel * dt;
    }

    /// Has a scheduled despawn time passed?
    pub fn despawn_due(&self, now: f64) -> bool {
        self.despawn_at.is_some_and(|at| now > at)
    }

    /// Mark dead, stop, and switch to the dead look
    pub fn kill(&mut self) {
        self.deceased = true;
        self.vel = Vec2::ZERO;
        self.shader = Shader::Dead;
    }

    /// translation × rotation
    pub fn frame(&self) -> Mat4 {
        Mat4::from_translation(self.pos.extend(self.depth)) * Mat4::from_rotation_z(self.heading)
    }

    /// translation × rotation × scale
    pub fn transform(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            self.scale.extend(1.0),
            Quat::from_rotation_z(self.heading),
            self.pos.extend(self.depth),
        )
    }

    /// Draw with `parent` (a frame, not a scaled transform) applied first
    pub fn render_in(&self, parent: Mat4, renderer: &mut dyn Renderer) {
        renderer.draw(&DrawCall {
            mesh: self.mesh,
            shader: self.shader,
            texture: self.texture,
            transform: parent * self.transform(),
            tiles: self.tiles,
        });
    }

    pub fn render(&self, renderer: &mut dyn Renderer) {
        self.render_in(Mat4::IDENTITY, renderer);
    }
}

/// Local transform for a blade: its spin replaces the heading
pub fn blade_local(blade: &Entity, spin: f32) -> Mat4 {
    Mat4::from_translation(blade.pos.extend(blade.depth))
        * Mat4::from_rotation_z(spin)
        * Mat4::from_scale(Vec3::new(blade.scale.x, blade.scale.y, 1.0))
}
