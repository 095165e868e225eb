use fx_core::shaders::STARS;
use fx_core::{ResourceError, StarInstance};
use wgpu::util::DeviceExt;

use super::{LayerBuild, SCREEN_BLEND};
use crate::helpers;

const STAR_ATTRIBUTES: [wgpu::VertexAttribute; 2] =
    wgpu::vertex_attr_array![0 => Float32x4, 1 => Float32x4];

/// Star disk. Per-star attributes never change after upload; the orbit is
/// evaluated in the vertex shader from time and scroll.
pub(crate) struct StarsLayer {
    pipeline: wgpu::RenderPipeline,
    instances: wgpu::Buffer,
    count: u32,
}

impl StarsLayer {
    pub(crate) fn new(build: &LayerBuild<'_>, stars: &[StarInstance]) -> Result<Self, ResourceError> {
        let shader = helpers::shader_module(build.device, &STARS)?;
        let instances = build
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("star_instances"),
                contents: bytemuck::cast_slice(stars),
                usage: wgpu::BufferUsages::VERTEX,
            });
        let pipeline = helpers::make_layer_pipeline(
            build.device,
            "stars_pipeline",
            &build.pipeline_layout("stars_pl", &[]),
            &shader,
            ("vs_main", "fs_main"),
            &[wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<StarInstance>() as u64,
                step_mode: wgpu::VertexStepMode::Instance,
                attributes: &STAR_ATTRIBUTES,
            }],
            build.color_format,
            SCREEN_BLEND,
        );
        Ok(Self {
            pipeline,
            instances,
            count: stars.len() as u32,
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
