//! One pipeline set per `fx_core::Layer`. Every layer binds the shared
//! scene uniforms at group 0.

mod background;
mod blob;
mod flow;
mod lines;
mod points;
mod sprites;
mod stars;

pub(crate) use background::BackgroundLayer;
pub(crate) use blob::BlobLayer;
pub(crate) use flow::FlowLayer;
pub(crate) use lines::LinesLayer;
pub(crate) use points::PointsLayer;
pub(crate) use sprites::SpritesLayer;
pub(crate) use stars::StarsLayer;

/// Shared state a layer needs while it builds its pipelines.
pub(crate) struct LayerBuild<'a> {
    pub(crate) device: &'a wgpu::Device,
    pub(crate) queue: &'a wgpu::Queue,
    pub(crate) scene_layout: &'a wgpu::BindGroupLayout,
    pub(crate) color_format: wgpu::TextureFormat,
}

impl LayerBuild<'_> {
    pub(crate) fn pipeline_layout(
        &self,
        label: &str,
        extra: &[&wgpu::BindGroupLayout],
    ) -> wgpu::PipelineLayout {
        let mut groups = vec![self.scene_layout];
        groups.extend_from_slice(extra);
        self.device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some(label),
                bind_group_layouts: &groups,
                push_constant_ranges: &[],
            })
    }
}

/// Screen output is premultiplied by every layer shader.
pub(crate) const SCREEN_BLEND: Option<wgpu::BlendState> =
    Some(wgpu::BlendState::PREMULTIPLIED_ALPHA_BLENDING);

/// Premultiplied color added onto what is already there.
pub(crate) const ADDITIVE_BLEND: Option<wgpu::BlendState> = Some(wgpu::BlendState {
    color: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::One,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
    alpha: wgpu::BlendComponent::OVER,
});
