use fx_core::shaders::FLOW_POINTS;
use fx_core::ResourceError;

use super::{LayerBuild, SCREEN_BLEND};
use crate::feedback::GpuFeedback;
use crate::helpers;

/// Draws one quad per mover, reading positions straight from the velocity texture.
pub(crate) struct FlowLayer {
    pipeline: wgpu::RenderPipeline,
    count: u32,
}

impl FlowLayer {
    pub(crate) fn new(build: &LayerBuild<'_>, feedback: &GpuFeedback) -> Result<Self, ResourceError> {
        let shader = helpers::shader_module(build.device, &FLOW_POINTS)?;
        let layout = build.pipeline_layout("flow_points_pl", &[feedback.read_layout()]);
        let pipeline = helpers::make_layer_pipeline(
            build.device,
            "flow_points_pipeline",
            &layout,
            &shader,
            ("vs_main", "fs_main"),
            &[],
            build.color_format,
            SCREEN_BLEND,
        );
        Ok(Self {
            pipeline,
            count: feedback.layout().count as u32,
        })
    }

    pub(crate) fn draw(
        &self,
        pass: &mut wgpu::RenderPass<'_>,
        scene: &wgpu::BindGroup,
        feedback: &GpuFeedback,
    ) {
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, scene, &[]);
        pass.set_bind_group(1, feedback.current_velocity(), &[]);
        pass.draw(0..6, 0..self.count);
    }
}
