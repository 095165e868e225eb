use fx_core::constants::{BLOB_RADIUS, BLOB_SEGMENTS};
use fx_core::geometry::uv_sphere;
use fx_core::shaders::BLOB;
use fx_core::{MeshVertex, ResourceError};
use wgpu::util::DeviceExt;

use super::{LayerBuild, SCREEN_BLEND};
use crate::helpers;

const BLOB_ATTRIBUTES: [wgpu::VertexAttribute; 2] =
    wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];

pub(crate) struct BlobLayer {
    pipeline: wgpu::RenderPipeline,
    vertices: wgpu::Buffer,
    indices: wgpu::Buffer,
    index_count: u32,
}

impl BlobLayer {
    pub(crate) fn new(build: &LayerBuild<'_>) -> Result<Self, ResourceError> {
        let shader = helpers::shader_module(build.device, &BLOB)?;
        let (mesh, index_data) = uv_sphere(BLOB_RADIUS, BLOB_SEGMENTS);
        let vertices = build
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("blob_vertices"),
                contents: bytemuck::cast_slice(&mesh),
                usage: wgpu::BufferUsages::VERTEX,
            });
        let indices = build
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("blob_indices"),
                contents: bytemuck::cast_slice(&index_data),
                usage: wgpu::BufferUsages::INDEX,
            });
        let pipeline = helpers::make_layer_pipeline(
            build.device,
            "blob_pipeline",
            &build.pipeline_layout("blob_pl", &[]),
            &shader,
            ("vs_main", "fs_main"),
            &[wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<MeshVertex>() as u64,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &BLOB_ATTRIBUTES,
            }],
            build.color_format,
            SCREEN_BLEND,
        );
        Ok(Self {
            pipeline,
            vertices,
            indices,
            index_count: index_data.len() as u32,
        })
    }

    pub(crate) fn draw(&self, pass: &mut wgpu::RenderPass<'_>, scene: &wgpu::BindGroup) {
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, scene, &[]);
        pass.set_vertex_buffer(0, self.vertices.slice(..));
        pass.set_index_buffer(self.indices.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..self.index_count, 0, 0..1);
    }

    pub(crate) fn destroy(&self) {
        self.vertices.destroy();
        self.indices.destroy();
    }
}
