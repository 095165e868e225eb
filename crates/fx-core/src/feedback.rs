//! Flow-field feedback simulation.
//!
//! Two ping-pong quantities per particle, stored one texel per particle:
//!
//! * acceleration: `xyz` is the motion vector integrated from the noise
//!   force, `w` is unused;
//! * velocity: `xyz` is the integrated mover state that the draw pass reads
//!   as its position, `w` is the particle age in seconds.
//!
//! Each step runs the acceleration pass, then the velocity pass. Particles
//! hold their spawn state until simulation time passes their delay, and are
//! reset to it (acceleration zeroed) once they age past the respawn lifetime
//! or leave the bounds sphere, so the live count never changes.
//!
//! [`CpuFeedback`] is the reference implementation of the rule; the GPU
//! passes in `shaders/flow_sim.wgsl` implement the same arithmetic.

use glam::{Vec2, Vec3, Vec4, Vec4Swizzles};
use rand::Rng;

use crate::constants::*;
use crate::double_buffer::DoubleBuffer;
use crate::options::FlowOptions;
use crate::uniforms::SimUniforms;

const NOISE_SCALE: f32 = 0.02;
const NOISE_Z_SKEW: f32 = 0.5;

/// Particle index to texel mapping on a `side × side` texture.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FeedbackLayout {
    pub count: usize,
    pub side: u32,
}

impl FeedbackLayout {
    pub fn new(count: usize) -> Self {
        let side = (count as f64).sqrt().ceil().max(1.0) as u32;
        Self { count, side }
    }

    pub fn texel_count(&self) -> usize {
        (self.side * self.side) as usize
    }

    pub fn texel(&self, index: usize) -> (u32, u32) {
        let i = index as u32;
        (i % self.side, i / self.side)
    }

    /// Texel center in normalized coordinates.
    pub fn uv(&self, index: usize) -> [f32; 2] {
        let (x, y) = self.texel(index);
        let side = self.side as f32;
        [(x as f32 + 0.5) / side, (y as f32 + 0.5) / side]
    }
}

/// Square RGBA noise texture used as the force input.
#[derive(Clone, Debug, PartialEq)]
pub struct NoiseField {
    pub side: u32,
    pub texels: Vec<Vec4>,
}

impl NoiseField {
    pub fn random(side: u32, rng: &mut impl Rng) -> Self {
        let texels = (0..side * side)
            .map(|_| Vec4::new(rng.gen(), rng.gen(), rng.gen(), 1.0))
            .collect();
        Self { side, texels }
    }

    /// Nearest texel at `uv`, wrapping.
    pub fn sample(&self, uv: Vec2) -> Vec4 {
        let (x, y) = self.texel_at(uv);
        self.texels[(y * self.side + x) as usize]
    }

    pub fn texel_at(&self, uv: Vec2) -> (u32, u32) {
        let side = self.side as f32;
        let wrap = |v: f32| {
            let t = (v - v.floor()) * side;
            (t as u32).min(self.side - 1)
        };
        (wrap(uv.x), wrap(uv.y))
    }
}

/// Initial state and per-particle constants for one flow field.
#[derive(Clone, Debug)]
pub struct FlowSeed {
    pub layout: FeedbackLayout,
    pub initial_acceleration: Vec<Vec4>,
    pub initial_velocity: Vec<Vec4>,
    /// Spawn state restored on respawn. Identical to `initial_velocity`.
    pub velocity_first: Vec<Vec4>,
    pub delay: Vec<f32>,
    pub mass: Vec<f32>,
    pub multi_time: Vec2,
    pub noise: NoiseField,
}

impl FlowSeed {
    /// Movers start on the plane x = -29.99, on a ring of radius 5..15,
    /// with staggered launch delays. Padding texels stay at rest.
    pub fn generate(count: usize, rng: &mut impl Rng) -> Self {
        let layout = FeedbackLayout::new(count);
        let texels = layout.texel_count();
        let mut initial_velocity = vec![Vec4::ZERO; texels];
        let mut delay = vec![0.0; texels];
        let mut mass = vec![0.0; texels];

        for i in 0..count {
            let angle = rng.gen_range(0.0f32..360.0).to_radians();
            let radius = rng.gen::<f32>() * FLOW_RING_RADIUS_SPAN + FLOW_RING_MIN_RADIUS;
            initial_velocity[i] = Vec4::new(
                FLOW_START_X,
                angle.cos() * radius,
                angle.sin() * radius,
                0.0,
            );
            delay[i] = rng.gen::<f32>() * FLOW_MAX_DELAY_SEC;
            mass[i] = rng.gen();
        }
        let multi_time = Vec2::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0));
        let noise = NoiseField::random(NOISE_TEXTURE_SIZE, rng);

        Self {
            layout,
            initial_acceleration: vec![Vec4::ZERO; texels],
            velocity_first: initial_velocity.clone(),
            initial_velocity,
            delay,
            mass,
            multi_time,
            noise,
        }
    }
}

/// Tunables of the update rule.
#[derive(Clone, Debug, PartialEq)]
pub struct FlowRule {
    pub respawn_lifetime: f32,
    pub bounds: f32,
    pub force: f32,
    pub damping: f32,
    pub drift: Vec3,
}

impl FlowRule {
    pub fn from_options(opts: &FlowOptions) -> Self {
        Self {
            respawn_lifetime: opts.respawn_lifetime,
            bounds: opts.bounds,
            force: opts.force,
            damping: FLOW_ACCEL_DAMPING,
            drift: flow_drift_vec3(),
        }
    }

    pub fn uniforms(&self, layout: &FeedbackLayout, multi_time: Vec2, time: f32, dt: f32) -> SimUniforms {
        SimUniforms {
            time,
            dt,
            side: layout.side as f32,
            respawn: self.respawn_lifetime,
            multi_time: multi_time.to_array(),
            bounds: self.bounds,
            force: self.force,
        }
    }

    pub fn should_respawn(&self, velocity: Vec4) -> bool {
        velocity.w > self.respawn_lifetime || velocity.xyz().length() > self.bounds
    }

    /// Where a mover reads the noise field at simulation time `time`.
    pub fn noise_uv(&self, position: Vec3, multi_time: Vec2, time: f32) -> Vec2 {
        Vec2::new(
            (position.x + multi_time.x * time) * NOISE_SCALE,
            (position.y + position.z * NOISE_Z_SKEW + multi_time.y * time) * NOISE_SCALE,
        )
    }

    #[allow(clippy::too_many_arguments)]
    pub fn step_acceleration(
        &self,
        acceleration: Vec4,
        velocity: Vec4,
        noise: Vec4,
        mass: f32,
        delay: f32,
        time: f32,
        dt: f32,
    ) -> Vec4 {
        if time <= delay || self.should_respawn(velocity) {
            return Vec4::ZERO;
        }
        let push = (noise.xyz() * 2.0 - Vec3::ONE) * self.force * (0.5 + mass);
        let a = acceleration.xyz() * self.damping + (push + self.drift) * dt;
        a.extend(0.0)
    }

    pub fn step_velocity(
        &self,
        velocity: Vec4,
        acceleration: Vec4,
        first: Vec4,
        delay: f32,
        time: f32,
        dt: f32,
    ) -> Vec4 {
        if time <= delay || self.should_respawn(velocity) {
            return first.xyz().extend(0.0);
        }
        (velocity.xyz() + acceleration.xyz() * dt).extend(velocity.w + dt)
    }
}

/// Host-side feedback simulation over texel arrays.
pub struct CpuFeedback {
    layout: FeedbackLayout,
    rule: FlowRule,
    acceleration: DoubleBuffer<Vec<Vec4>>,
    velocity: DoubleBuffer<Vec<Vec4>>,
    velocity_first: Vec<Vec4>,
    delay: Vec<f32>,
    mass: Vec<f32>,
    multi_time: Vec2,
    noise: NoiseField,
    time: f32,
}

impl CpuFeedback {
    pub fn start(seed: &FlowSeed, rule: FlowRule) -> Self {
        Self {
            layout: seed.layout,
            rule,
            acceleration: DoubleBuffer::filled(seed.initial_acceleration.clone()),
            velocity: DoubleBuffer::filled(seed.initial_velocity.clone()),
            velocity_first: seed.velocity_first.clone(),
            delay: seed.delay.clone(),
            mass: seed.mass.clone(),
            multi_time: seed.multi_time,
            noise: seed.noise.clone(),
            time: 0.0,
        }
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

    pub fn current_acceleration(&self) -> &[Vec4] {
        self.acceleration.current()
    }

    pub fn current_velocity(&self) -> &[Vec4] {
        self.velocity.current()
    }

    pub fn acceleration_buffers(&self) -> &DoubleBuffer<Vec<Vec4>> {
        &self.acceleration
    }

    pub fn velocity_buffers(&self) -> &DoubleBuffer<Vec<Vec4>> {
        &self.velocity
    }

    /// One step; returns false and touches nothing when `dt <= 0`.
    pub fn update(&mut self, dt: f32) -> bool {
        if dt <= 0.0 || !dt.is_finite() {
            return false;
        }
        self.time += dt;
        let (time, rule) = (self.time, &self.rule);
        let velocity = self.velocity.current();
        let (noise, mass, delay, multi_time) =
            (&self.noise, &self.mass, &self.delay, self.multi_time);

        self.acceleration.write_and_swap(|read, write| {
            for i in 0..read.len() {
                let v = velocity[i];
                let n = noise.sample(rule.noise_uv(v.xyz(), multi_time, time));
                write[i] = rule.step_acceleration(read[i], v, n, mass[i], delay[i], time, dt);
            }
        });

        let acceleration = self.acceleration.current();
        let first = &self.velocity_first;
        self.velocity.write_and_swap(|read, write| {
            for i in 0..read.len() {
                write[i] = rule.step_velocity(read[i], acceleration[i], first[i], delay[i], time, dt);
            }
        });
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_side_is_ceil_sqrt() {
        assert_eq!(FeedbackLayout::new(10_000).side, 100);
        assert_eq!(FeedbackLayout::new(10_001).side, 101);
        assert_eq!(FeedbackLayout::new(0).side, 1);
        let l = FeedbackLayout::new(9);
        assert_eq!(l.texel(4), (1, 1));
        assert_eq!(l.uv(0), [1.0 / 6.0, 1.0 / 6.0]);
    }

    #[test]
    fn noise_sampling_wraps() {
        let noise = NoiseField {
            side: 2,
            texels: vec![Vec4::X, Vec4::Y, Vec4::Z, Vec4::W],
        };
        assert_eq!(noise.sample(Vec2::new(0.75, 0.25)), Vec4::Y);
        assert_eq!(noise.sample(Vec2::new(-0.25, 1.75)), Vec4::W);
    }
}
