//! Scene composition: camera, layer order and the per-frame uniform block.

use bytemuck::Zeroable;
use glam::Vec3;
use smallvec::SmallVec;

use crate::camera::{Camera, Viewport};
use crate::constants::*;
use crate::ease::EasedValue;
use crate::input::InputState;
use crate::options::{Background, EffectKind, EffectSettings};
use crate::uniforms::SceneUniforms;

const FADE_IN_RATE: f32 = 0.05;
const FLOW_PARALLAX: f32 = 10.0;
const BLOB_PARALLAX: f32 = 0.3;

/// One draw step. Off-screen passes sort before everything that samples them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Layer {
    /// Noise rendered into an off-screen target.
    NoisePass,
    /// Full-screen plane sampling the noise target.
    DistortionPlane,
    FlowPoints,
    PointCloud,
    Stars,
    Blob,
    Sprites,
    /// Lattice segments between neighbouring grid dots.
    GridLines,
}

impl Layer {
    pub fn is_offscreen(self) -> bool {
        matches!(self, Layer::NoisePass)
    }
}

pub type LayerList = SmallVec<[Layer; 4]>;

pub struct SceneComposer {
    kind: EffectKind,
    camera: Camera,
    layers: LayerList,
    distortion: EasedValue,
    base_distortion: f32,
    hover_distortion: f32,
    fade: EasedValue,
    pointer_sensitivity: f32,
    scroll_sensitivity: f32,
    palette: [[f32; 4]; 4],
    point_size: f32,
    orbit_speed: f32,
    uniforms: SceneUniforms,
}

impl SceneComposer {
    pub fn new(settings: &EffectSettings, viewport: &Viewport) -> Self {
        let mut camera = match settings.kind {
            EffectKind::GridGlow | EffectKind::Trail => Camera::orthographic(1.0, 1.0),
            EffectKind::Starfield => Camera::perspective(75.0, 0.1, 3000.0, STAR_CAMERA_Z),
            EffectKind::FlowField => Camera::perspective(60.0, 0.1, 1000.0, FLOW_CAMERA_Z),
            EffectKind::ParticleGrid => {
                Camera::perspective(75.0, 0.1, 1000.0, PARTICLE_GRID_CAMERA_Z)
            }
            EffectKind::GlassBlob => Camera::perspective(45.0, 0.1, 100.0, PERSPECTIVE_CAMERA_Z),
        };
        camera.set_viewport(viewport);

        let mut composer = Self {
            kind: settings.kind,
            camera,
            layers: layers_for(settings.kind, settings.background),
            distortion: EasedValue::new(settings.distortion.base, settings.input.ease_rate),
            base_distortion: settings.distortion.base,
            hover_distortion: settings.distortion.hover,
            fade: EasedValue::new(0.0, FADE_IN_RATE),
            pointer_sensitivity: settings.input.pointer_sensitivity,
            scroll_sensitivity: settings.input.scroll_sensitivity,
            palette: settings.palette,
            point_size: settings.flow.point_size,
            orbit_speed: settings.speeds.orbit,
            uniforms: SceneUniforms::zeroed(),
        };
        composer.fade.set_target(1.0);
        composer.uniforms.palette = composer.palette;
        composer
    }

    pub fn kind(&self) -> EffectKind {
        self.kind
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Draw order for this effect, off-screen passes first.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn uniforms(&self) -> &SceneUniforms {
        &self.uniforms
    }

    pub fn distortion(&self) -> f32 {
        self.distortion.value()
    }

    pub fn resize(&mut self, viewport: &Viewport) {
        self.camera.set_viewport(viewport);
    }

    /// Hover moves the distortion target; the visible value eases toward it.
    pub fn set_hover(&mut self, hovering: bool) {
        self.distortion.set_target(if hovering {
            self.hover_distortion
        } else {
            self.base_distortion
        });
    }

    /// Advances eased parameters and the camera rig, then rebuilds the uniform
    /// block. A zero `dt` rebuilds without advancing anything.
    pub fn compose(&mut self, input: &InputState, viewport: &Viewport, time: f32, dt: f32) -> &SceneUniforms {
        if dt > 0.0 {
            self.distortion.step();
            self.fade.step();
        }
        let pointer = input.pointer_ndc() * self.pointer_sensitivity;
        let scroll = (input.scroll_progress() * self.scroll_sensitivity).clamp(0.0, 1.0);

        match self.kind {
            EffectKind::Starfield => {
                self.camera.position = starfield_camera(pointer.x, pointer.y, scroll, time)
            }
            EffectKind::FlowField => {
                self.camera.position = Vec3::new(
                    pointer.x * FLOW_PARALLAX,
                    pointer.y * FLOW_PARALLAX,
                    FLOW_CAMERA_Z,
                )
            }
            EffectKind::GlassBlob => {
                self.camera.position = Vec3::new(
                    pointer.x * BLOB_PARALLAX,
                    pointer.y * BLOB_PARALLAX,
                    PERSPECTIVE_CAMERA_Z,
                )
            }
            // the cloud sways in its own shader; the camera stays put
            EffectKind::ParticleGrid | EffectKind::GridGlow | EffectKind::Trail => {}
        }

        let (w, h) = viewport.physical_size();
        let u = &mut self.uniforms;
        u.view_proj = self.camera.view_proj().to_cols_array_2d();
        u.resolution = [w as f32, h as f32];
        u.time = time;
        u.pixel_ratio = viewport.pixel_ratio;
        u.pointer = pointer.to_array();
        u.scroll = scroll;
        u.distortion = self.distortion.value();
        u.palette = self.palette;
        u.camera_pos = self.camera.position.to_array();
        u.point_size = self.point_size;
        u.schwarzschild = STAR_SCHWARZSCHILD_RADIUS;
        u.orbit_speed = self.orbit_speed;
        u.opacity = self.fade.value();
        &self.uniforms
    }
}

/// Dolly in with scroll, parallax with the pointer (y up), shake once deep in.
pub fn starfield_camera(pointer_x: f32, pointer_y: f32, scroll: f32, time: f32) -> Vec3 {
    let p = scroll * scroll;
    let mut pos = Vec3::new(
        pointer_x * 25.0 * (1.0 - p * 0.4),
        pointer_y * 18.0 * (1.0 - p * 0.4),
        STAR_CAMERA_Z - p * STAR_CAMERA_DOLLY,
    );
    if p > 0.3 {
        let shake = (p - 0.3) * 3.0;
        let ms = time * 1000.0;
        pos.x += (ms * 0.008).sin() * shake;
        pos.y += (ms * 0.01).cos() * shake;
    }
    pos
}

fn layers_for(kind: EffectKind, background: Background) -> LayerList {
    let mut layers = LayerList::new();
    if background == Background::Noise {
        layers.push(Layer::NoisePass);
        layers.push(Layer::DistortionPlane);
    }
    match kind {
        EffectKind::FlowField => layers.push(Layer::FlowPoints),
        EffectKind::ParticleGrid => layers.push(Layer::PointCloud),
        EffectKind::Starfield => layers.push(Layer::Stars),
        EffectKind::GlassBlob => layers.push(Layer::Blob),
        EffectKind::GridGlow => {
            layers.push(Layer::Sprites);
            layers.push(Layer::GridLines);
        }
        EffectKind::Trail => layers.push(Layer::Sprites),
    }
    layers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{DisplayEnv, EffectOptions};

    #[test]
    fn offscreen_passes_come_first() {
        let settings = EffectOptions::for_kind(EffectKind::GlassBlob)
            .resolve(DisplayEnv::default())
            .unwrap();
        let vp = Viewport::new(800.0, 600.0, 1.0, 2.0);
        let composer = SceneComposer::new(&settings, &vp);
        assert_eq!(
            composer.layers(),
            &[Layer::NoisePass, Layer::DistortionPlane, Layer::Blob]
        );
    }

    #[test]
    fn starfield_rig_dollies_with_scroll() {
        let rest = starfield_camera(0.0, 0.0, 0.0, 0.0);
        assert_eq!(rest, Vec3::new(0.0, 0.0, 1000.0));
        let deep = starfield_camera(1.0, 0.0, 1.0, 0.0);
        // p = 1: z = 200, x = 25 * 0.6, shake adds sin(0) = 0
        assert!((deep.z - 200.0).abs() < 1e-4);
        assert!((deep.x - 15.0).abs() < 1e-4);
    }

    #[test]
    fn grid_glow_draws_lines_over_dots() {
        let settings = EffectOptions::for_kind(EffectKind::GridGlow)
            .resolve(DisplayEnv::default())
            .unwrap();
        let vp = Viewport::new(800.0, 600.0, 1.0, 2.0);
        let composer = SceneComposer::new(&settings, &vp);
        assert_eq!(composer.layers(), &[Layer::Sprites, Layer::GridLines]);
    }
}
