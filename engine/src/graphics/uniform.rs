//! GPU uniform buffer types
//!
//! Layout matches a WGSL `CameraUniform { view_proj: mat4x4<f32>, camera_offset: vec4<f32> }`.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

/// Camera uniform buffer data
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct CameraUniform {
    /// Combined view-projection matrix
    pub view_proj: [[f32; 4]; 4],
    /// Eye position relative to the render origin (w unused)
    pub camera_offset: [f32; 4],
}

impl CameraUniform {
    pub fn new(view_proj: Mat4, camera_offset: Vec3) -> Self {
        Self {
            view_proj: view_proj.to_cols_array_2d(),
            camera_offset: camera_offset.extend(1.0).to_array(),
        }
    }

    /// Raw bytes for a buffer upload
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new(Mat4::IDENTITY, Vec3::ZERO)
    }
}
