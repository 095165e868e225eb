use fx_core::shaders::PARTICLE_GRID;
use fx_core::{PointInstance, ResourceError};
use wgpu::util::DeviceExt;

use super::{LayerBuild, ADDITIVE_BLEND};
use crate::helpers;

const POINT_ATTRIBUTES: [wgpu::VertexAttribute; 2] =
    wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32];

/// Particle grid cloud. Rest positions are uploaded once; wave, pointer push
/// and sway are evaluated in the vertex shader.
pub(crate) struct PointsLayer {
    pipeline: wgpu::RenderPipeline,
    instances: wgpu::Buffer,
    count: u32,
}

impl PointsLayer {
    pub(crate) fn new(build: &LayerBuild<'_>, points: &[PointInstance]) -> Result<Self, ResourceError> {
        let shader = helpers::shader_module(build.device, &PARTICLE_GRID)?;
        let instances = build
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("grid_point_instances"),
                contents: bytemuck::cast_slice(points),
                usage: wgpu::BufferUsages::VERTEX,
            });
        let pipeline = helpers::make_layer_pipeline(
            build.device,
            "particle_grid_pipeline",
            &build.pipeline_layout("particle_grid_pl", &[]),
            &shader,
            ("vs_main", "fs_main"),
            &[wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<PointInstance>() as u64,
                step_mode: wgpu::VertexStepMode::Instance,
                attributes: &POINT_ATTRIBUTES,
            }],
            build.color_format,
            ADDITIVE_BLEND,
        );
        Ok(Self {
            pipeline,
            instances,
            count: points.len() as u32,
        })
    }

    pub(crate) fn draw(&self, pass: &mut wgpu::RenderPass<'_>, scene: &wgpu::BindGroup) {
        if self.count == 0 {
            return;
        }
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, scene, &[]);
        pass.set_vertex_buffer(0, self.instances.slice(..));
        pass.draw(0..6, 0..self.count);
    }

    pub(crate) fn destroy(&self) {
        self.instances.destroy();
    }
}
