//! GPU-facing data blocks.
//!
//! Layouts mirror the WGSL structs in `shaders/`; field names are part of the
//! uniform contract checked in [`crate::shaders`].

use bytemuck::{Pod, Zeroable};

/// Per-frame scene block shared by every screen-pass shader (192 bytes).
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct SceneUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub resolution: [f32; 2],
    pub time: f32,
    pub pixel_ratio: f32,
    pub pointer: [f32; 2],
    pub scroll: f32,
    pub distortion: f32,
    pub palette: [[f32; 4]; 4],
    pub camera_pos: [f32; 3],
    pub point_size: f32,
    pub schwarzschild: f32,
    pub orbit_speed: f32,
    pub opacity: f32,
    pub _pad0: f32,
}

/// Feedback simulation block (32 bytes).
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct SimUniforms {
    pub time: f32,
    pub dt: f32,
    pub side: f32,
    pub respawn: f32,
    pub multi_time: [f32; 2],
    pub bounds: f32,
    pub force: f32,
}

/// One CPU-driven sprite (trail particle or grid dot), 48 bytes.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct SpriteInstance {
    pub position: [f32; 3],
    pub scale: f32,
    pub color: [f32; 4],
    pub rotation: f32,
    pub size: f32,
    pub _pad: [f32; 2],
}

/// Immutable per-star attributes: orbit = (radius, angle, angular velocity, z).
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct StarInstance {
    pub orbit: [f32; 4],
    pub color_size: [f32; 4],
}

/// One point of the particle grid cloud: rest position and brightness scale.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct PointInstance {
    pub position: [f32; 3],
    pub scale: f32,
}

/// End point of a grid lattice segment; pairs form a line list.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct LineVertex {
    pub position: [f32; 3],
    pub alpha: f32,
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_sizes_match_wgsl_layout() {
        assert_eq!(std::mem::size_of::<SceneUniforms>(), 192);
        assert_eq!(std::mem::size_of::<SimUniforms>(), 32);
        assert_eq!(std::mem::size_of::<SpriteInstance>(), 48);
        assert_eq!(std::mem::size_of::<StarInstance>(), 32);
        assert_eq!(std::mem::size_of::<MeshVertex>(), 24);
        assert_eq!(std::mem::size_of::<PointInstance>(), 16);
        assert_eq!(std::mem::size_of::<LineVertex>(), 16);
    }
}
