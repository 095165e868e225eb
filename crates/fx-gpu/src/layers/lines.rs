use fx_core::shaders::GRID_LINES;
use fx_core::{LineVertex, ResourceError};

use super::{LayerBuild, SCREEN_BLEND};
use crate::helpers;

const LINE_ATTRIBUTES: [wgpu::VertexAttribute; 2] =
    wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32];

/// Grid lattice. Vertices are rewritten every frame as brightness moves.
pub(crate) struct LinesLayer {
    pipeline: wgpu::RenderPipeline,
    vertices: wgpu::Buffer,
    capacity: usize,
    count: u32,
}

impl LinesLayer {
    pub(crate) fn new(build: &LayerBuild<'_>, capacity: usize) -> Result<Self, ResourceError> {
        let shader = helpers::shader_module(build.device, &GRID_LINES)?;
        let capacity = capacity.max(2);
        let pipeline = helpers::make_line_pipeline(
            build.device,
            "grid_lines_pipeline",
            &build.pipeline_layout("grid_lines_pl", &[]),
            &shader,
            ("vs_main", "fs_main"),
            &[wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<LineVertex>() as u64,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &LINE_ATTRIBUTES,
            }],
            build.color_format,
            SCREEN_BLEND,
        );
        Ok(Self {
            pipeline,
            vertices: vertex_buffer(build.device, capacity),
            capacity,
            count: 0,
        })
    }

    pub(crate) fn upload(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, lines: &[LineVertex]) {
        if lines.len() > self.capacity {
            self.vertices.destroy();
            self.capacity = lines.len().next_power_of_two();
            self.vertices = vertex_buffer(device, self.capacity);
            log::debug!("line buffer grown to {}", self.capacity);
        }
        if !lines.is_empty() {
            queue.write_buffer(&self.vertices, 0, bytemuck::cast_slice(lines));
        }
        self.count = lines.len() as u32;
    }

    pub(crate) fn draw(&self, pass: &mut wgpu::RenderPass<'_>, scene: &wgpu::BindGroup) {
        if self.count < 2 {
            return;
        }
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, scene, &[]);
        pass.set_vertex_buffer(0, self.vertices.slice(..));
        pass.draw(0..self.count, 0..1);
    }

    pub(crate) fn destroy(&self) {
        self.vertices.destroy();
    }
}

fn vertex_buffer(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("grid_line_vertices"),
        size: (std::mem::size_of::<LineVertex>() * capacity) as u64,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}
