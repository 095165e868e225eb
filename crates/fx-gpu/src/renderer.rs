use fx_core::constants::CLEAR_COLOR;
use fx_core::geometry::{grid_points, star_instances};
use fx_core::{
    Background, EffectBackend, EffectKind, EffectSettings, FlowRule, FlowSeed, Frame, FrameError,
    Layer, ResourceError, SceneUniforms, SimStep, Viewport,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::context::GpuContext;
use crate::feedback::GpuFeedback;
use crate::helpers;
use crate::layers::{
    BackgroundLayer, BlobLayer, FlowLayer, LayerBuild, LinesLayer, PointsLayer, SpritesLayer,
    StarsLayer,
};

/// Pipelines and buffers for the layers one effect kind draws.
struct Layers {
    background: Option<BackgroundLayer>,
    feedback: Option<GpuFeedback>,
    flow: Option<FlowLayer>,
    points: Option<PointsLayer>,
    stars: Option<StarsLayer>,
    blob: Option<BlobLayer>,
    sprites: Option<SpritesLayer>,
    lines: Option<LinesLayer>,
}

/// The wgpu [`EffectBackend`].
pub struct GpuRenderer {
    ctx: GpuContext,
    scene_buffer: wgpu::Buffer,
    scene_group: wgpu::BindGroup,
    layers: Option<Layers>,
    clear: wgpu::Color,
}

impl GpuRenderer {
    /// Brings up the device on `target` and builds every resource the
    /// effect kind needs. Shader contract or validation failures come back
    /// as [`ResourceError::Shader`].
    pub async fn create(
        target: impl Into<wgpu::SurfaceTarget<'static>>,
        settings: &EffectSettings,
        viewport: &Viewport,
    ) -> Result<Self, ResourceError> {
        let (width, height) = viewport.physical_size();
        let ctx = GpuContext::new(target, width, height).await?;
        let device = &ctx.device;

        let scene_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("scene_bgl"),
            entries: &[helpers::uniform_entry(
                0,
                wgpu::ShaderStages::VERTEX_FRAGMENT,
            )],
        });
        let scene_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("scene_uniforms"),
            size: std::mem::size_of::<SceneUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let scene_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("scene_group"),
            layout: &scene_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: scene_buffer.as_entire_binding(),
            }],
        });

        let build = LayerBuild {
            device,
            queue: &ctx.queue,
            scene_layout: &scene_layout,
            color_format: ctx.format(),
        };
        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let built = build_layers(&build, settings, width, height);
        if let Some(err) = device.pop_error_scope().await {
            return Err(ResourceError::Shader {
                name: settings.kind.name(),
                reason: err.to_string(),
            });
        }
        let layers = built?;

        log::info!("{}: renderer built", settings.kind.name());
        Ok(Self {
            ctx,
            scene_buffer,
            scene_group,
            layers: Some(layers),
            clear: wgpu::Color {
                r: CLEAR_COLOR[0],
                g: CLEAR_COLOR[1],
                b: CLEAR_COLOR[2],
                a: CLEAR_COLOR[3],
            },
        })
    }

    pub fn context(&self) -> &GpuContext {
        &self.ctx
    }

    /// Simulation steps run so far, zero for kinds without feedback.
    pub fn feedback_steps(&self) -> u64 {
        self.layers
            .as_ref()
            .and_then(|l| l.feedback.as_ref())
            .map_or(0, GpuFeedback::steps)
    }
}

fn build_layers(
    build: &LayerBuild<'_>,
    settings: &EffectSettings,
    width: u32,
    height: u32,
) -> Result<Layers, ResourceError> {
    let mut rng = StdRng::seed_from_u64(settings.seed);
    let background = match settings.background {
        Background::Noise => Some(BackgroundLayer::new(build, width, height)?),
        Background::None => None,
    };
    let mut layers = Layers {
        background,
        feedback: None,
        flow: None,
        points: None,
        stars: None,
        blob: None,
        sprites: None,
        lines: None,
    };
    match settings.kind {
        EffectKind::FlowField => {
            let seed = FlowSeed::generate(settings.particle_count, &mut rng);
            let feedback = GpuFeedback::start(
                build.device,
                build.queue,
                &seed,
                FlowRule::from_options(&settings.flow),
            )?;
            layers.flow = Some(FlowLayer::new(build, &feedback)?);
            layers.feedback = Some(feedback);
        }
        EffectKind::ParticleGrid => {
            let points = grid_points(settings.particle_count, &mut rng);
            layers.points = Some(PointsLayer::new(build, &points)?);
        }
        EffectKind::Starfield => {
            let stars = star_instances(settings.particle_count, &settings.palette, &mut rng);
            layers.stars = Some(StarsLayer::new(build, &stars)?);
        }
        EffectKind::GlassBlob => layers.blob = Some(BlobLayer::new(build)?),
        EffectKind::GridGlow => {
            layers.sprites = Some(SpritesLayer::new(build, settings.particle_count)?);
            // sized on the first upload, once the lattice is known
            layers.lines = Some(LinesLayer::new(build, 0)?);
        }
        EffectKind::Trail => {
            layers.sprites = Some(SpritesLayer::new(build, settings.particle_count)?)
        }
    }
    Ok(layers)
}

impl EffectBackend for GpuRenderer {
    fn resize(&mut self, viewport: &Viewport) {
        let (width, height) = viewport.physical_size();
        self.ctx.resize(width, height);
        if let Some(bg) = self.layers.as_mut().and_then(|l| l.background.as_mut()) {
            bg.resize(&self.ctx.device, width, height);
        }
    }

    fn simulate(&mut self, step: &SimStep) -> bool {
        let Some(feedback) = self.layers.as_mut().and_then(|l| l.feedback.as_mut()) else {
            return false;
        };
        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("flow_sim_encoder"),
            });
        if !feedback.encode(&self.ctx.queue, &mut encoder, step) {
            return false;
        }
        self.ctx.queue.submit(Some(encoder.finish()));
        true
    }

    fn render(&mut self, frame: &Frame<'_>) -> Result<(), FrameError> {
        let Some(layers) = self.layers.as_mut() else {
            return Err(FrameError::Other("renderer released".into()));
        };
        let (device, queue) = (&self.ctx.device, &self.ctx.queue);
        queue.write_buffer(&self.scene_buffer, 0, bytemuck::bytes_of(frame.uniforms));
        if let Some(sprites) = layers.sprites.as_mut() {
            sprites.upload(device, queue, frame.sprites);
        }
        if let Some(lines) = layers.lines.as_mut() {
            lines.upload(device, queue, frame.lines);
        }

        let output = self.ctx.acquire()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("frame_encoder"),
        });

        for layer in frame.layers.iter().filter(|l| l.is_offscreen()) {
            if let (Layer::NoisePass, Some(bg)) = (layer, layers.background.as_ref()) {
                bg.encode_noise(&mut encoder, &self.scene_group);
            }
        }

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("screen_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            let scene = &self.scene_group;
            for layer in frame.layers.iter().filter(|l| !l.is_offscreen()) {
                match layer {
                    Layer::DistortionPlane => {
                        if let Some(bg) = &layers.background {
                            bg.draw_plane(&mut pass, scene);
                        }
                    }
                    Layer::FlowPoints => {
                        if let (Some(flow), Some(feedback)) = (&layers.flow, &layers.feedback) {
                            flow.draw(&mut pass, scene, feedback);
                        }
                    }
                    Layer::PointCloud => {
                        if let Some(points) = &layers.points {
                            points.draw(&mut pass, scene);
                        }
                    }
                    Layer::GridLines => {
                        if let Some(lines) = &layers.lines {
                            lines.draw(&mut pass, scene);
                        }
                    }
                    Layer::Stars => {
                        if let Some(stars) = &layers.stars {
                            stars.draw(&mut pass, scene);
                        }
                    }
                    Layer::Blob => {
                        if let Some(blob) = &layers.blob {
                            blob.draw(&mut pass, scene);
                        }
                    }
                    Layer::Sprites => {
                        if let Some(sprites) = &layers.sprites {
                            sprites.draw(&mut pass, scene);
                        }
                    }
                    Layer::NoisePass => {}
                }
            }
        }

        queue.submit(Some(encoder.finish()));
        output.present();
        Ok(())
    }

    fn release(&mut self) {
        let Some(mut layers) = self.layers.take() else {
            return;
        };
        if let Some(bg) = &layers.background {
            bg.destroy();
        }
        if let Some(feedback) = layers.feedback.as_mut() {
            feedback.destroy();
        }
        if let Some(points) = &layers.points {
            points.destroy();
        }
        if let Some(stars) = &layers.stars {
            stars.destroy();
        }
        if let Some(blob) = &layers.blob {
            blob.destroy();
        }
        if let Some(sprites) = &layers.sprites {
            sprites.destroy();
        }
        if let Some(lines) = &layers.lines {
            lines.destroy();
        }
        self.scene_buffer.destroy();
        log::info!("gpu resources released");
    }
}
