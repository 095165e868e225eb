use std::f32::consts::{PI, TAU};

use rand::Rng;

use crate::constants::{
    PARTICLE_GRID_EXTENT, STAR_ISCO_RADIUS, STAR_RADIUS_SPAN, STAR_SCHWARZSCHILD_RADIUS,
};
use crate::uniforms::{MeshVertex, PointInstance, StarInstance};

/// Indexed UV sphere; `segments` rings and `segments` slices.
pub fn uv_sphere(radius: f32, segments: u32) -> (Vec<MeshVertex>, Vec<u32>) {
    let segments = segments.max(3);
    let rings = segments;
    let mut vertices = Vec::with_capacity(((rings + 1) * (segments + 1)) as usize);
    for r in 0..=rings {
        let v = r as f32 / rings as f32;
        let phi = v * PI;
        for s in 0..=segments {
            let u = s as f32 / segments as f32;
            let theta = u * TAU;
            let n = [phi.sin() * theta.cos(), phi.cos(), phi.sin() * theta.sin()];
            vertices.push(MeshVertex {
                position: [n[0] * radius, n[1] * radius, n[2] * radius],
                normal: n,
            });
        }
    }

    let stride = segments + 1;
    let mut indices = Vec::with_capacity((rings * segments * 6) as usize);
    for r in 0..rings {
        for s in 0..segments {
            let a = r * stride + s;
            let b = a + stride;
            indices.extend_from_slice(&[a, b, a + 1, a + 1, b, b + 1]);
        }
    }
    (vertices, indices)
}

/// Star disk: radius biased toward the inner orbit, a thin tilt around the
/// disk plane, angular velocity falling off with `sqrt(r / rs)`.
/// Colors pick from the first three palette entries by temperature.
pub fn star_instances(count: usize, palette: &[[f32; 4]; 4], rng: &mut impl Rng) -> Vec<StarInstance> {
    let rs = STAR_SCHWARZSCHILD_RADIUS;
    (0..count)
        .map(|_| {
            let u: f32 = rng.gen();
            let radius = STAR_ISCO_RADIUS + u * u * STAR_RADIUS_SPAN;
            let theta = rng.gen::<f32>() * TAU;
            let phi = PI / 2.0 + (rng.gen::<f32>() - 0.5) * 0.8;
            let z = radius * phi.cos();
            let velocity = (0.8 + rng.gen::<f32>() * 0.4) / (radius / rs).sqrt();

            let temp: f32 = rng.gen();
            let c = if temp > 0.6 {
                palette[0]
            } else if temp > 0.25 {
                palette[1]
            } else {
                palette[2]
            };
            let size = 1.0 + rng.gen::<f32>() * 2.5;
            StarInstance {
                orbit: [radius, theta, velocity, z],
                color_size: [c[0], c[1], c[2], size],
            }
        })
        .collect()
}

/// Uniform random cloud centred on the origin; the wave and pointer push are
/// applied in the vertex shader.
pub fn grid_points(count: usize, rng: &mut impl Rng) -> Vec<PointInstance> {
    let [ex, ey, ez] = PARTICLE_GRID_EXTENT;
    (0..count)
        .map(|_| PointInstance {
            position: [
                (rng.gen::<f32>() - 0.5) * ex,
                (rng.gen::<f32>() - 0.5) * ey,
                (rng.gen::<f32>() - 0.5) * ez,
            ],
            scale: rng.gen(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn sphere_indices_stay_in_range() {
        let (v, i) = uv_sphere(1.0, 8);
        assert_eq!(v.len(), 81);
        assert_eq!(i.len(), 8 * 8 * 6);
        assert!(i.iter().all(|&ix| (ix as usize) < v.len()));
    }

    #[test]
    fn stars_start_outside_isco() {
        let mut rng = StdRng::seed_from_u64(3);
        let palette = [[1.0; 4]; 4];
        let stars = star_instances(500, &palette, &mut rng);
        assert_eq!(stars.len(), 500);
        assert!(stars.iter().all(|s| s.orbit[0] >= STAR_ISCO_RADIUS));
    }

    #[test]
    fn grid_points_fill_the_cloud_box() {
        let mut rng = StdRng::seed_from_u64(11);
        let points = grid_points(2000, &mut rng);
        assert_eq!(points.len(), 2000);
        for p in &points {
            assert!(p.position[0].abs() <= 50.0 && p.position[1].abs() <= 50.0);
            assert!(p.position[2].abs() <= 15.0);
            assert!((0.0..1.0).contains(&p.scale));
        }
    }
}
