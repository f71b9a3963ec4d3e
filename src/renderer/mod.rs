//! Rendering collaborator
//!
//! The simulation never touches a graphics API. It issues [`DrawCall`]s
//! against a [`Renderer`]; a backend owns meshes, shaders and textures and
//! resolves the handles below.

pub mod instance;

pub use instance::DrawInstance;

use glam::Mat4;
use serde::{Deserialize, Serialize};

/// Mesh handles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mesh {
    /// Unit textured quad
    Sprite,
    /// Radial burst particle cloud
    ExplosionParticles,
    /// Streak particle cloud trailing a bullet
    TrailParticles,
}

/// Shader handles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Shader {
    Sprite,
    /// Greyed-out look for destroyed entities
    Dead,
    Particle,
}

/// Texture handles, in load order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Texture {
    PlayerBody,
    PlayerInvulnerable,
    EnemyBody,
    Stars,
    Orb,
    Item,
    BlackHole,
    Bullet,
    Blade,
}

/// A single transformed, textured mesh draw
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCall {
    pub mesh: Mesh,
    pub shader: Shader,
    pub texture: Texture,
    pub transform: Mat4,
    /// Texture repeat count (tiled background)
    pub tiles: u32,
}

/// Draw sink used by the frame updater
pub trait Renderer {
    /// Called once per frame before any draw with the camera view matrix
    fn begin_frame(&mut self, _view: Mat4) {}

    fn draw(&mut self, call: &DrawCall);
}

/// Renderer that keeps the current frame's draws as packed instances
///
/// Used by the headless runner and by tests to observe what was drawn.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    pub view: Mat4,
    pub instances: Vec<DrawInstance>,
    /// Draws issued since creation
    pub total_draws: u64,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of draws this frame using `texture`
    pub fn count_texture(&self, texture: Texture) -> usize {
        self.instances
            .iter()
            .filter(|i| i.texture == texture as u32)
            .count()
    }

    /// Raw instance bytes, ready for a GPU buffer
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.instances)
    }
}

impl Renderer for RecordingRenderer {
    fn begin_frame(&mut self, view: Mat4) {
        self.view = view;
        self.instances.clear();
    }

    fn draw(&mut self, call: &DrawCall) {
        self.instances.push(DrawInstance::from_call(call));
        self.total_draws += 1;
    }
}
