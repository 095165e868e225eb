//! Dot grid whose brightness follows the pointer.

use glam::Vec2;

use crate::camera::Camera;
use crate::constants::{
    GRID_BASE_OPACITY, GRID_GLOW_OPACITY, GRID_LINE_BASE_OPACITY, GRID_LINE_GLOW_OPACITY,
};
use crate::options::GridOptions;
use crate::uniforms::{LineVertex, SpriteInstance};

const OFFSCREEN: Vec2 = Vec2::new(-1000.0, -1000.0);
const PULSE_AMPLITUDE: f32 = 0.1;
const PULSE_FREQUENCY: f32 = 0.01;
const DOT_DIAMETER_PX: f32 = 2.0;
const DIM_GREY: f32 = 130.0 / 255.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridDot {
    /// CSS pixels, canvas origin top-left.
    pub position: Vec2,
    pub brightness: f32,
}

/// Dots are stored column-major: `index = col * rows + row`.
pub struct GridGlow {
    dots: Vec<GridDot>,
    cols: usize,
    rows: usize,
    spacing: f32,
    glow_radius: f32,
    fade: f32,
    time: f32,
    anchor: Vec2,
}

impl GridGlow {
    pub fn new(opts: &GridOptions) -> Self {
        Self {
            dots: Vec::new(),
            cols: 0,
            rows: 0,
            spacing: opts.spacing,
            glow_radius: opts.glow_radius,
            fade: opts.fade,
            time: 0.0,
            anchor: OFFSCREEN,
        }
    }

    /// Rebuilds the lattice to cover `width × height` plus one spacing of overscan.
    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.dots.clear();
        self.cols = steps(width, self.spacing);
        self.rows = steps(height, self.spacing);
        for col in 0..self.cols {
            for row in 0..self.rows {
                self.dots.push(GridDot {
                    position: Vec2::new(col as f32, row as f32) * self.spacing,
                    brightness: 0.0,
                });
            }
        }
        log::debug!("grid: {} dots for {}x{}", self.dots.len(), width, height);
    }

    pub fn dots(&self) -> &[GridDot] {
        &self.dots
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    /// Lattice segments: each dot to its right and bottom neighbour.
    pub fn segment_count(&self) -> usize {
        let (c, r) = (self.cols, self.rows);
        (c.saturating_sub(1) * r) + (c * r.saturating_sub(1))
    }

    /// Dots inside the glow radius take `1 - dist / radius`; the rest fade by
    /// the fade factor. A stopped clock (`dt == 0`) freezes the grid.
    pub fn update(&mut self, dt: f32, pointer: Option<Vec2>) {
        if dt <= 0.0 {
            return;
        }
        self.time += dt;
        self.anchor = pointer.unwrap_or(OFFSCREEN);
        for dot in &mut self.dots {
            let dist = pointer.map(|p| dot.position.distance(p));
            match dist {
                Some(d) if d < self.glow_radius => dot.brightness = 1.0 - d / self.glow_radius,
                _ => dot.brightness *= self.fade,
            }
        }
    }

    /// Brightness after the time pulse, in [0, 1].
    pub fn shaded_brightness(&self, dot: &GridDot) -> f32 {
        let dist = dot.position.distance(self.anchor);
        let pulse = (self.time + dist * PULSE_FREQUENCY).sin() * PULSE_AMPLITUDE;
        (dot.brightness + pulse).clamp(0.0, 1.0)
    }

    pub fn write_instances(&self, camera: &Camera, out: &mut Vec<SpriteInstance>) {
        out.clear();
        out.extend(self.dots.iter().map(|dot| {
            let b = self.shaded_brightness(dot);
            let grey = DIM_GREY + (1.0 - DIM_GREY) * b;
            let world = camera.screen_to_world(dot.position.x, dot.position.y);
            SpriteInstance {
                position: world.to_array(),
                scale: 1.0,
                color: [grey, grey, grey, GRID_BASE_OPACITY + b * GRID_GLOW_OPACITY],
                rotation: 0.0,
                size: DOT_DIAMETER_PX,
                _pad: [0.0; 2],
            }
        }));
    }

    /// Line opacity follows the unshaded brightness of both ends.
    pub fn line_alpha(a: &GridDot, b: &GridDot) -> f32 {
        GRID_LINE_BASE_OPACITY + (a.brightness + b.brightness) * 0.5 * GRID_LINE_GLOW_OPACITY
    }

    /// Two vertices per segment, for a line-list draw.
    pub fn write_lines(&self, camera: &Camera, out: &mut Vec<LineVertex>) {
        out.clear();
        let rows = self.rows;
        let mut push = |a: &GridDot, b: &GridDot| {
            let alpha = Self::line_alpha(a, b);
            for dot in [a, b] {
                out.push(LineVertex {
                    position: camera.screen_to_world(dot.position.x, dot.position.y).to_array(),
                    alpha,
                });
            }
        };
        for (i, dot) in self.dots.iter().enumerate() {
            let (col, row) = (i / rows, i % rows);
            if col + 1 < self.cols {
                push(dot, &self.dots[i + rows]);
            }
            if row + 1 < rows {
                push(dot, &self.dots[i + 1]);
            }
        }
    }
}

/// Positions `0, spacing, ..` strictly below `extent + spacing`.
fn steps(extent: f32, spacing: f32) -> usize {
    let mut n = 0;
    while (n as f32) * spacing < extent + spacing {
        n += 1;
    }
    n
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lattice_covers_viewport_with_overscan() {
        let mut grid = GridGlow::new(&GridOptions::default());
        grid.set_viewport(80.0, 40.0);
        // x: 0, 40, 80; y: 0, 40
        assert_eq!(grid.dots().len(), 6);
    }

    #[test]
    fn brightness_follows_pointer_then_fades() {
        let mut grid = GridGlow::new(&GridOptions::default());
        grid.set_viewport(400.0, 400.0);
        grid.update(0.016, Some(Vec2::new(0.0, 0.0)));
        assert_eq!(grid.dots()[0].brightness, 1.0);
        grid.update(0.016, None);
        assert!((grid.dots()[0].brightness - 0.95).abs() < 1e-6);
    }

    #[test]
    fn lines_brighten_with_their_end_dots() {
        let mut grid = GridGlow::new(&GridOptions::default());
        grid.set_viewport(80.0, 40.0);
        // 3 columns x 2 rows: 2 horizontal segments per row, 1 vertical per column
        assert_eq!(grid.segment_count(), 7);

        let camera = Camera::orthographic(80.0, 40.0);
        let mut lines = Vec::new();
        grid.write_lines(&camera, &mut lines);
        assert_eq!(lines.len(), 14);
        assert!(lines.iter().all(|v| (v.alpha - GRID_LINE_BASE_OPACITY).abs() < 1e-6));

        // pointer on the top-left dot: it reaches 1.0, its right neighbour 0.8
        grid.update(0.016, Some(Vec2::ZERO));
        grid.write_lines(&camera, &mut lines);
        let first = lines[0].alpha;
        assert_eq!(first, lines[1].alpha);
        assert!((first - (0.1 + 0.9 * 0.3)).abs() < 1e-5, "{first}");
        let faint = lines.iter().map(|v| v.alpha).fold(f32::MAX, f32::min);
        assert!(first > faint);
    }

    #[test]
    fn pulse_recentres_offscreen_after_leave() {
        let mut grid = GridGlow::new(&GridOptions::default());
        grid.set_viewport(400.0, 400.0);
        grid.update(0.016, Some(Vec2::new(200.0, 200.0)));
        assert_eq!(grid.anchor, Vec2::new(200.0, 200.0));
        grid.update(0.016, None);
        assert_eq!(grid.anchor, OFFSCREEN);
    }
}
