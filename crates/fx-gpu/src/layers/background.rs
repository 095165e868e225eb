use fx_core::shaders::BACKGROUND;
use fx_core::ResourceError;

use super::LayerBuild;
use crate::helpers;
use crate::targets::{NoiseTarget, NOISE_FORMAT};

/// Noise render-to-texture plus the full-screen plane that samples it.
pub(crate) struct BackgroundLayer {
    noise_pipeline: wgpu::RenderPipeline,
    plane_pipeline: wgpu::RenderPipeline,
    noise_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    target: NoiseTarget,
    noise_group: wgpu::BindGroup,
}

impl BackgroundLayer {
    pub(crate) fn new(build: &LayerBuild<'_>, width: u32, height: u32) -> Result<Self, ResourceError> {
        let device = build.device;
        let shader = helpers::shader_module(device, &BACKGROUND)?;

        let noise_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("background_noise_bgl"),
            entries: &[
                helpers::texture_entry(0, wgpu::ShaderStages::FRAGMENT, true),
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("background_sampler"),
            address_mode_u: wgpu::AddressMode::MirrorRepeat,
            address_mode_v: wgpu::AddressMode::MirrorRepeat,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let noise_pipeline = helpers::make_fullscreen_pipeline(
            device,
            "background_noise_pipeline",
            &build.pipeline_layout("background_noise_pl", &[]),
            &shader,
            "fs_noise",
            NOISE_FORMAT,
            None,
        );
        let plane_pipeline = helpers::make_fullscreen_pipeline(
            device,
            "background_plane_pipeline",
            &build.pipeline_layout("background_plane_pl", &[&noise_layout]),
            &shader,
            "fs_distort",
            build.color_format,
            Some(wgpu::BlendState::REPLACE),
        );

        let target = NoiseTarget::new(device, width, height);
        let noise_group = noise_group(device, &noise_layout, &target, &sampler);
        Ok(Self {
            noise_pipeline,
            plane_pipeline,
            noise_layout,
            sampler,
            target,
            noise_group,
        })
    }

    pub(crate) fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.target.recreate(device, width, height);
        // the old group still points at the destroyed view
        self.noise_group = noise_group(device, &self.noise_layout, &self.target, &self.sampler);
        let (w, h) = self.target.size();
        log::debug!("noise target {w}x{h}");
    }

    /// Off-screen pass; must be encoded before the screen pass samples it.
    pub(crate) fn encode_noise(&self, encoder: &mut wgpu::CommandEncoder, scene: &wgpu::BindGroup) {
        helpers::blit(
            encoder,
            "background_noise",
            &self.target.view,
            &self.noise_pipeline,
            &[scene],
        );
    }

    pub(crate) fn draw_plane(&self, pass: &mut wgpu::RenderPass<'_>, scene: &wgpu::BindGroup) {
        pass.set_pipeline(&self.plane_pipeline);
        pass.set_bind_group(0, scene, &[]);
        pass.set_bind_group(1, &self.noise_group, &[]);
        pass.draw(0..3, 0..1);
    }

    pub(crate) fn destroy(&self) {
        self.target.tex.destroy();
    }
}

fn noise_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    target: &NoiseTarget,
    sampler: &wgpu::Sampler,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("background_noise_group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&target.view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    })
}
