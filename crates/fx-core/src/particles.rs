//! Fixed-capacity sprite pool for the pointer trail.
//!
//! Slots are reused round-robin; a spawn past capacity overwrites the oldest
//! slot whether or not it is still visible. All randomness is drawn at spawn
//! time from a seeded RNG, so the same spawn sequence and frame deltas always
//! produce the same trajectories.

use std::f32::consts::TAU;

use glam::{Vec2, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::camera::Camera;
use crate::constants::TRAIL_SPAWN_SCALE;
use crate::ease::lerp;
use crate::options::EffectSettings;
use crate::uniforms::SpriteInstance;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Particle {
    pub position: Vec3,
    pub velocity: Vec3,
    pub opacity: f32,
    pub scale: f32,
    pub rotation: f32,
    pub spin: f32,
    pub tint: usize,
    pub active: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ParticleParams {
    pub decay: f32,
    pub target_scale: f32,
    pub scale_ease: f32,
    pub threshold: f32,
    pub move_threshold: f32,
    pub size: f32,
    pub rotation_speed: f32,
    pub palette_len: usize,
}

impl ParticleParams {
    pub fn from_settings(settings: &EffectSettings) -> Self {
        let t = &settings.trail;
        Self {
            decay: t.decay,
            target_scale: t.target_scale,
            scale_ease: t.scale_ease,
            threshold: t.threshold,
            move_threshold: t.move_threshold,
            size: t.size,
            rotation_speed: settings.speeds.rotation,
            palette_len: settings.palette_len.max(1),
        }
    }
}

pub struct ParticleField {
    slots: Vec<Particle>,
    next: usize,
    params: ParticleParams,
    rng: StdRng,
    last_spawn: Option<Vec2>,
}

impl ParticleField {
    pub fn new(capacity: usize, params: ParticleParams, seed: u64) -> Self {
        Self {
            slots: vec![Particle::default(); capacity.max(1)],
            next: 0,
            params,
            rng: StdRng::seed_from_u64(seed),
            last_spawn: None,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn particles(&self) -> &[Particle] {
        &self.slots
    }

    pub fn slot(&self, index: usize) -> Option<&Particle> {
        self.slots.get(index)
    }

    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|p| p.active).count()
    }

    pub fn params(&self) -> &ParticleParams {
        &self.params
    }

    /// Activates the next slot at a canvas position, mapped through `camera`.
    /// Returns the slot index used.
    pub fn spawn(&mut self, x: f32, y: f32, camera: &Camera) -> usize {
        let world = camera.screen_to_world(x, y);
        self.last_spawn = Some(Vec2::new(x, y));
        self.spawn_at(world)
    }

    /// Spawns only when the pointer travelled farther than the move threshold
    /// since the previous spawn.
    pub fn spawn_on_move(&mut self, x: f32, y: f32, camera: &Camera) -> Option<usize> {
        let here = Vec2::new(x, y);
        if let Some(last) = self.last_spawn {
            if here.distance(last) <= self.params.move_threshold {
                return None;
            }
        }
        Some(self.spawn(x, y, camera))
    }

    /// Forgets the previous spawn point so the next move spawns immediately.
    pub fn reset_motion(&mut self) {
        self.last_spawn = None;
    }

    pub fn spawn_at(&mut self, position: Vec3) -> usize {
        let index = self.next;
        self.next = (self.next + 1) % self.slots.len();

        let heading = self.rng.gen_range(0.0..TAU);
        let speed = self.rng.gen_range(4.0..24.0);
        let rotation = self.rng.gen_range(0.0..TAU);
        let spin = self.rng.gen_range(-1.0..=1.0) * self.params.rotation_speed;
        let tint = self.rng.gen_range(0..self.params.palette_len);

        self.slots[index] = Particle {
            position,
            velocity: Vec3::new(heading.cos() * speed, heading.sin() * speed, 0.0),
            opacity: 1.0,
            scale: TRAIL_SPAWN_SCALE * self.params.target_scale,
            rotation,
            spin,
            tint,
            active: true,
        };
        index
    }

    /// Advances every active particle by one frame. `dt == 0` leaves the pool untouched.
    pub fn update(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }
        let p = &self.params;
        for slot in self.slots.iter_mut().filter(|s| s.active) {
            slot.opacity *= p.decay;
            slot.scale = lerp(slot.scale, p.target_scale, p.scale_ease);
            slot.rotation += slot.spin * dt;
            slot.position += slot.velocity * dt;
            if slot.opacity < p.threshold {
                slot.active = false;
            }
        }
    }

    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            slot.active = false;
        }
        self.next = 0;
        self.last_spawn = None;
    }

    /// Writes one instance per active particle into `out` (cleared first).
    pub fn write_instances(&self, palette: &[[f32; 4]; 4], out: &mut Vec<SpriteInstance>) {
        out.clear();
        out.extend(self.slots.iter().filter(|s| s.active).map(|s| {
            let c = palette[s.tint.min(palette.len() - 1)];
            SpriteInstance {
                position: s.position.to_array(),
                scale: s.scale,
                color: [c[0], c[1], c[2], s.opacity],
                rotation: s.rotation,
                size: self.params.size,
                _pad: [0.0; 2],
            }
        }));
    }
}

/// Frames until a fresh particle (opacity 1) falls below `threshold`.
pub fn frames_to_expire(decay: f32, threshold: f32) -> u32 {
    (threshold.ln() / decay.ln()).ceil() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> ParticleParams {
        ParticleParams {
            decay: 0.92,
            target_scale: 1.0,
            scale_ease: 0.12,
            threshold: 0.002,
            move_threshold: 8.0,
            size: 28.0,
            rotation_speed: 1.0,
            palette_len: 4,
        }
    }

    #[test]
    fn small_moves_do_not_spawn() {
        let cam = Camera::orthographic(800.0, 600.0);
        let mut field = ParticleField::new(8, params(), 1);
        assert!(field.spawn_on_move(100.0, 100.0, &cam).is_some());
        assert!(field.spawn_on_move(103.0, 104.0, &cam).is_none());
        assert!(field.spawn_on_move(110.0, 100.0, &cam).is_some());
        assert_eq!(field.active_count(), 2);
    }

    #[test]
    fn zero_dt_is_a_no_op() {
        let cam = Camera::orthographic(800.0, 600.0);
        let mut field = ParticleField::new(4, params(), 1);
        field.spawn(10.0, 10.0, &cam);
        let before = field.particles().to_vec();
        field.update(0.0);
        assert_eq!(field.particles(), &before[..]);
    }

    #[test]
    fn expiry_frame_count_for_defaults() {
        assert_eq!(frames_to_expire(0.92, 0.002), 75);
    }
}
