use fx_core::shaders::SPRITES;
use fx_core::{ResourceError, SpriteInstance};

use super::{LayerBuild, SCREEN_BLEND};
use crate::helpers;

/// Trail sprites and grid dots. The instance buffer is rewritten every
/// frame and grows when a frame brings more sprites than it holds.
pub(crate) struct SpritesLayer {
    pipeline: wgpu::RenderPipeline,
    instances: wgpu::Buffer,
    capacity: usize,
    count: u32,
}

impl SpritesLayer {
    pub(crate) fn new(build: &LayerBuild<'_>, capacity: usize) -> Result<Self, ResourceError> {
        let shader = helpers::shader_module(build.device, &SPRITES)?;
        let capacity = capacity.max(1);
        let vertex_buffers = [wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<SpriteInstance>() as u64,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &[
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x3,
                    offset: 0,
                    shader_location: 0,
                },
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32,
                    offset: 12,
                    shader_location: 1,
                },
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x4,
                    offset: 16,
                    shader_location: 2,
                },
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32,
                    offset: 32,
                    shader_location: 3,
                },
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32,
                    offset: 36,
                    shader_location: 4,
                },
            ],
        }];
        let pipeline = helpers::make_layer_pipeline(
            build.device,
            "sprites_pipeline",
            &build.pipeline_layout("sprites_pl", &[]),
            &shader,
            ("vs_main", "fs_main"),
            &vertex_buffers,
            build.color_format,
            SCREEN_BLEND,
        );
        Ok(Self {
            pipeline,
            instances: instance_buffer(build.device, capacity),
            capacity,
            count: 0,
        })
    }

    pub(crate) fn upload(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, sprites: &[SpriteInstance]) {
        if sprites.len() > self.capacity {
            self.instances.destroy();
            self.capacity = sprites.len().next_power_of_two();
            self.instances = instance_buffer(device, self.capacity);
            log::debug!("sprite buffer grown to {}", self.capacity);
        }
        if !sprites.is_empty() {
            queue.write_buffer(&self.instances, 0, bytemuck::cast_slice(sprites));
        }
        self.count = sprites.len() as u32;
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

fn instance_buffer(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("sprite_instances"),
        size: (std::mem::size_of::<SpriteInstance>() * capacity) as u64,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}
