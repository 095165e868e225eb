//! GPU side of the flow-field feedback loop.
//!
//! Acceleration and velocity each live in a pair of `Rgba32Float` textures
//! wrapped in a [`DoubleBuffer`]: a pass samples the current slot and renders
//! into the other, then the pair flips. The constant inputs (noise, delay,
//! mass and the spawn state) sit in one bind group shared by both passes.

use fx_core::shaders::FLOW_SIM;
use fx_core::{DoubleBuffer, FeedbackLayout, FlowRule, FlowSeed, ResourceError, SimStep, SimUniforms};
use glam::Vec2;

use crate::helpers::{self, DATA_FORMAT};

pub(crate) struct FeedbackSlot {
    tex: wgpu::Texture,
    view: wgpu::TextureView,
    /// Binds this slot as the single texture of a read group.
    read_group: wgpu::BindGroup,
}

pub struct GpuFeedback {
    layout: FeedbackLayout,
    rule: FlowRule,
    multi_time: Vec2,
    uniform_buffer: wgpu::Buffer,
    constants: Vec<wgpu::Texture>,
    constants_group: wgpu::BindGroup,
    read_layout: wgpu::BindGroupLayout,
    acceleration_pipeline: wgpu::RenderPipeline,
    velocity_pipeline: wgpu::RenderPipeline,
    acceleration: DoubleBuffer<FeedbackSlot>,
    velocity: DoubleBuffer<FeedbackSlot>,
    time: f32,
}

impl GpuFeedback {
    /// Uploads both ping-pong pairs from `seed` and builds the two passes.
    pub fn start(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        seed: &FlowSeed,
        rule: FlowRule,
    ) -> Result<Self, ResourceError> {
        let shader = helpers::shader_module(device, &FLOW_SIM)?;
        let layout = seed.layout;
        let side = layout.side;
        let frag = wgpu::ShaderStages::FRAGMENT;

        let constants_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("flow_constants_bgl"),
            entries: &[
                helpers::uniform_entry(0, frag),
                helpers::texture_entry(1, frag, false),
                helpers::texture_entry(2, frag, false),
                helpers::texture_entry(3, frag, false),
                helpers::texture_entry(4, frag, false),
            ],
        });
        // also bound by the point layer, which reads velocity in its vertex stage
        let read_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("flow_read_bgl"),
            entries: &[helpers::texture_entry(
                0,
                wgpu::ShaderStages::VERTEX_FRAGMENT,
                false,
            )],
        });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("flow_sim_uniforms"),
            size: std::mem::size_of::<SimUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let noise_side = seed.noise.side;
        let none = wgpu::TextureUsages::empty();
        let (noise_tex, noise_view) =
            helpers::create_data_texture(device, queue, "flow_noise", noise_side, &seed.noise.texels, none);
        let (delay_tex, delay_view) = helpers::create_data_texture(
            device,
            queue,
            "flow_delay",
            side,
            &helpers::scalar_texels(&seed.delay),
            none,
        );
        let (mass_tex, mass_view) = helpers::create_data_texture(
            device,
            queue,
            "flow_mass",
            side,
            &helpers::scalar_texels(&seed.mass),
            none,
        );
        let (first_tex, first_view) =
            helpers::create_data_texture(device, queue, "flow_velocity_first", side, &seed.velocity_first, none);

        let constants_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("flow_constants"),
            layout: &constants_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&noise_view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&delay_view),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::TextureView(&mass_view),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: wgpu::BindingResource::TextureView(&first_view),
                },
            ],
        });

        let slot = |label: &str, texels: &[glam::Vec4]| {
            let (tex, view) = helpers::create_data_texture(
                device,
                queue,
                label,
                side,
                texels,
                wgpu::TextureUsages::RENDER_ATTACHMENT,
            );
            let read_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(label),
                layout: &read_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                }],
            });
            FeedbackSlot {
                tex,
                view,
                read_group,
            }
        };
        let acceleration = DoubleBuffer::new(
            slot("flow_acceleration_a", &seed.initial_acceleration),
            slot("flow_acceleration_b", &seed.initial_acceleration),
        );
        let velocity = DoubleBuffer::new(
            slot("flow_velocity_a", &seed.initial_velocity),
            slot("flow_velocity_b", &seed.initial_velocity),
        );

        // group 1 acceleration, group 2 velocity; both use the read layout
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("flow_sim_pl"),
            bind_group_layouts: &[&constants_layout, &read_layout, &read_layout],
            push_constant_ranges: &[],
        });
        let acceleration_pipeline = helpers::make_fullscreen_pipeline(
            device,
            "flow_acceleration_pipeline",
            &pipeline_layout,
            &shader,
            "fs_acceleration",
            DATA_FORMAT,
            None,
        );
        let velocity_pipeline = helpers::make_fullscreen_pipeline(
            device,
            "flow_velocity_pipeline",
            &pipeline_layout,
            &shader,
            "fs_velocity",
            DATA_FORMAT,
            None,
        );

        log::info!(
            "flow feedback: {} movers on {side}x{side} texels",
            layout.count
        );
        Ok(Self {
            layout,
            rule,
            multi_time: seed.multi_time,
            uniform_buffer,
            constants: vec![noise_tex, delay_tex, mass_tex, first_tex],
            constants_group,
            read_layout,
            acceleration_pipeline,
            velocity_pipeline,
            acceleration,
            velocity,
            time: 0.0,
        })
    }

    pub fn layout(&self) -> FeedbackLayout {
        self.layout
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn steps(&self) -> u64 {
        self.velocity.swap_count()
    }

    pub(crate) fn read_layout(&self) -> &wgpu::BindGroupLayout {
        &self.read_layout
    }

    /// Read group of the readable velocity slot, for the draw pass.
    pub(crate) fn current_velocity(&self) -> &wgpu::BindGroup {
        &self.velocity.current().read_group
    }

    /// Encodes the acceleration pass then the velocity pass. Encodes nothing
    /// and returns false when `step.dt` is not positive.
    pub(crate) fn encode(
        &mut self,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        step: &SimStep,
    ) -> bool {
        if step.dt <= 0.0 || !step.dt.is_finite() {
            return false;
        }
        self.time = step.time;
        let uniforms = self
            .rule
            .uniforms(&self.layout, self.multi_time, step.time, step.dt);
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));

        let Self {
            constants_group,
            acceleration_pipeline,
            velocity_pipeline,
            acceleration,
            velocity,
            ..
        } = self;

        let velocity_now = &velocity.current().read_group;
        acceleration.write_and_swap(|read, write| {
            helpers::blit(
                encoder,
                "flow_acceleration",
                &write.view,
                acceleration_pipeline,
                &[constants_group, &read.read_group, velocity_now],
            );
        });

        let acceleration_now = &acceleration.current().read_group;
        velocity.write_and_swap(|read, write| {
            helpers::blit(
                encoder,
                "flow_velocity",
                &write.view,
                velocity_pipeline,
                &[constants_group, acceleration_now, &read.read_group],
            );
        });
        true
    }

    /// Frees every texture now instead of waiting for the drop.
    pub(crate) fn destroy(&mut self) {
        for tex in self.constants.drain(..) {
            tex.destroy();
        }
        for slot in self.acceleration.slots().iter().chain(self.velocity.slots()) {
            slot.tex.destroy();
        }
    }
}
