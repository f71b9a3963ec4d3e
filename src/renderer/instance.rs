//! Per-draw instance record for GPU upload

use bytemuck::{Pod, Zeroable};
use glam::Mat4;

use super::DrawCall;

/// One draw call packed for a GPU instance buffer
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct DrawInstance {
    /// Column-major world transform
    pub transform: [[f32; 4]; 4],
    pub tiles: u32,
    pub mesh: u32,
    pub shader: u32,
    pub texture: u32,
}

impl DrawInstance {
    pub fn from_call(call: &DrawCall) -> Self {
        Self {
            transform: call.transform.to_cols_array_2d(),
            tiles: call.tiles,
            mesh: call.mesh as u32,
            shader: call.shader as u32,
            texture: call.texture as u32,
        }
    }

    pub fn transform(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.transform)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::{Mesh, Shader, Texture};
    use glam::Vec3;

    #[test]
    fn test_instance_layout_is_tight() {
        assert_eq!(std::mem::size_of::<DrawInstance>(), 80);
    }

    #[test]
    fn test_instance_bytes_carry_transform() {
        let call = DrawCall {
            mesh: Mesh::Sprite,
            shader: Shader::Sprite,
            texture: Texture::Stars,
            transform: Mat4::from_translation(Vec3::new(1.0, 2.0, 0.0)),
            tiles: 10,
        };
        let batch = [DrawInstance::from_call(&call)];
        let bytes: &[u8] = bytemuck::cast_slice(&batch);
        assert_eq!(bytes.len(), 80);

        let back: &[DrawInstance] = bytemuck::cast_slice(bytes);
        assert_eq!(back[0].tiles, 10);
        assert_eq!(back[0].texture, Texture::Stars as u32);
        assert_eq!(back[0].transform(), call.transform);
    }
}
