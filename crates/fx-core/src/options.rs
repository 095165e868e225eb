//! Effect configuration.
//!
//! [`EffectOptions`] is the loosely-typed surface hosts hand in (JSON with
//! camelCase keys, every field optional). [`EffectOptions::resolve`] validates
//! it against the display it will run on and produces [`EffectSettings`], the
//! concrete values the rest of the runtime reads.
//!
//! Invalid values are rejected with a [`ConfigError`]. The only values that are
//! adjusted silently are the performance clamps: the pixel-ratio cap and the
//! reduced particle count on mobile viewports.

use serde::{Deserialize, Serialize};

use crate::camera::capped_pixel_ratio;
use crate::constants::*;
use crate::error::ConfigError;

pub const MAX_PALETTE_COLORS: usize = 4;

/// Which composition the controller builds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EffectKind {
    #[default]
    FlowField,
    /// Drifting 3D point cloud pushed by the pointer.
    ParticleGrid,
    Starfield,
    GlassBlob,
    GridGlow,
    Trail,
}

impl EffectKind {
    pub const ALL: [EffectKind; 6] = [
        EffectKind::FlowField,
        EffectKind::ParticleGrid,
        EffectKind::Starfield,
        EffectKind::GlassBlob,
        EffectKind::GridGlow,
        EffectKind::Trail,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "flow-field" | "flow" => Some(Self::FlowField),
            "particle-grid" | "particles" => Some(Self::ParticleGrid),
            "starfield" | "stars" => Some(Self::Starfield),
            "glass-blob" | "blob" => Some(Self::GlassBlob),
            "grid-glow" | "grid" => Some(Self::GridGlow),
            "trail" => Some(Self::Trail),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::FlowField => "flow-field",
            Self::ParticleGrid => "particle-grid",
            Self::Starfield => "starfield",
            Self::GlassBlob => "glass-blob",
            Self::GridGlow => "grid-glow",
            Self::Trail => "trail",
        }
    }

    /// 2D-styled effects draw in CSS-pixel world units with an orthographic camera.
    pub fn is_planar(self) -> bool {
        matches!(self, Self::GridGlow | Self::Trail)
    }

    pub fn uses_feedback(self) -> bool {
        matches!(self, Self::FlowField)
    }

    pub fn default_particle_count(self) -> usize {
        match self {
            Self::FlowField => DEFAULT_FLOW_COUNT,
            Self::ParticleGrid => DEFAULT_PARTICLE_GRID_COUNT,
            Self::Starfield => DEFAULT_STAR_COUNT,
            Self::Trail => DEFAULT_TRAIL_CAPACITY,
            // grid dots follow the viewport; the blob has no particles
            Self::GlassBlob | Self::GridGlow => 0,
        }
    }

    fn default_background(self) -> Background {
        match self {
            Self::GlassBlob => Background::Noise,
            _ => Background::None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Background {
    #[default]
    None,
    /// Noise render-to-texture sampled by a full-screen distortion plane.
    Noise,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct SpeedOptions {
    pub orbit: f32,
    pub decay: f32,
    pub rotation: f32,
}

impl Default for SpeedOptions {
    fn default() -> Self {
        Self {
            orbit: 1.0,
            decay: 1.0,
            rotation: 1.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct InputOptions {
    pub pointer_sensitivity: f32,
    pub scroll_sensitivity: f32,
    pub smoothing: f32,
    pub scroll_smoothing: f32,
    pub ease_rate: f32,
}

impl Default for InputOptions {
    fn default() -> Self {
        Self {
            pointer_sensitivity: 1.0,
            scroll_sensitivity: 1.0,
            smoothing: DEFAULT_POINTER_SMOOTHING,
            scroll_smoothing: DEFAULT_SCROLL_SMOOTHING,
            ease_rate: DEFAULT_EASE_RATE,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct DisplayOptions {
    pub max_pixel_ratio: f32,
    pub mobile_max_pixel_ratio: f32,
    pub mobile_breakpoint: f32,
    pub max_delta: f32,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            max_pixel_ratio: DEFAULT_MAX_PIXEL_RATIO,
            mobile_max_pixel_ratio: DEFAULT_MOBILE_MAX_PIXEL_RATIO,
            mobile_breakpoint: DEFAULT_MOBILE_BREAKPOINT_PX,
            max_delta: DEFAULT_MAX_DELTA_SEC,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct TrailOptions {
    pub decay: f32,
    pub target_scale: f32,
    pub scale_ease: f32,
    pub threshold: f32,
    pub move_threshold: f32,
    pub size: f32,
}

impl Default for TrailOptions {
    fn default() -> Self {
        Self {
            decay: DEFAULT_TRAIL_DECAY,
            target_scale: DEFAULT_TRAIL_TARGET_SCALE,
            scale_ease: DEFAULT_TRAIL_SCALE_EASE,
            threshold: DEFAULT_TRAIL_THRESHOLD,
            move_threshold: DEFAULT_TRAIL_MOVE_THRESHOLD_PX,
            size: DEFAULT_TRAIL_SIZE_PX,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct FlowOptions {
    pub respawn_lifetime: f32,
    pub bounds: f32,
    pub force: f32,
    pub point_size: f32,
}

impl Default for FlowOptions {
    fn default() -> Self {
        Self {
            respawn_lifetime: DEFAULT_FLOW_RESPAWN_SEC,
            bounds: DEFAULT_FLOW_BOUNDS,
            force: DEFAULT_FLOW_FORCE,
            point_size: DEFAULT_FLOW_POINT_SIZE_PX,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct GridOptions {
    pub spacing: f32,
    pub glow_radius: f32,
    pub fade: f32,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            spacing: DEFAULT_GRID_SPACING_PX,
            glow_radius: DEFAULT_GRID_GLOW_RADIUS_PX,
            fade: DEFAULT_GRID_FADE,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct DistortionOptions {
    pub base: f32,
    pub hover: f32,
}

impl Default for DistortionOptions {
    fn default() -> Self {
        Self {
            base: DEFAULT_BASE_DISTORTION,
            hover: DEFAULT_HOVER_DISTORTION,
        }
    }
}

/// Host-facing options. Every field is optional and falls back to the
/// documented default.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct EffectOptions {
    pub kind: EffectKind,
    pub particle_count: Option<usize>,
    pub mobile_particle_count: Option<usize>,
    pub palette: Option<Vec<[f32; 3]>>,
    pub speeds: SpeedOptions,
    pub input: InputOptions,
    pub display: DisplayOptions,
    pub trail: TrailOptions,
    pub flow: FlowOptions,
    pub grid: GridOptions,
    pub distortion: DistortionOptions,
    pub background: Option<Background>,
    pub seed: Option<u64>,
}

/// What the host knows about the display at construction time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DisplayEnv {
    pub viewport_width: f32,
    pub viewport_height: f32,
    pub device_pixel_ratio: f32,
}

impl Default for DisplayEnv {
    fn default() -> Self {
        Self {
            viewport_width: 1280.0,
            viewport_height: 720.0,
            device_pixel_ratio: 1.0,
        }
    }
}

/// Validated, concrete configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct EffectSettings {
    pub kind: EffectKind,
    pub particle_count: usize,
    pub palette: [[f32; 4]; MAX_PALETTE_COLORS],
    pub palette_len: usize,
    pub speeds: SpeedOptions,
    pub input: InputOptions,
    pub trail: TrailOptions,
    pub flow: FlowOptions,
    pub grid: GridOptions,
    pub distortion: DistortionOptions,
    pub background: Background,
    pub seed: u64,
    pub is_mobile: bool,
    pub pixel_ratio_cap: f32,
    pub max_delta: f32,
}

impl EffectOptions {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        if json.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn for_kind(kind: EffectKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    pub fn resolve(&self, env: DisplayEnv) -> Result<EffectSettings, ConfigError> {
        let d = &self.display;
        positive("display.maxPixelRatio", d.max_pixel_ratio)?;
        positive("display.mobileMaxPixelRatio", d.mobile_max_pixel_ratio)?;
        non_negative("display.mobileBreakpoint", d.mobile_breakpoint)?;
        positive("display.maxDelta", d.max_delta)?;

        let s = &self.speeds;
        non_negative("speeds.orbit", s.orbit)?;
        positive("speeds.decay", s.decay)?;
        non_negative("speeds.rotation", s.rotation)?;

        let i = &self.input;
        non_negative("input.pointerSensitivity", i.pointer_sensitivity)?;
        non_negative("input.scrollSensitivity", i.scroll_sensitivity)?;
        unit_interval("input.smoothing", i.smoothing)?;
        unit_interval("input.scrollSmoothing", i.scroll_smoothing)?;
        unit_interval("input.easeRate", i.ease_rate)?;

        let t = &self.trail;
        open_unit("trail.decay", t.decay)?;
        positive("trail.targetScale", t.target_scale)?;
        unit_interval("trail.scaleEase", t.scale_ease)?;
        open_unit("trail.threshold", t.threshold)?;
        non_negative("trail.moveThreshold", t.move_threshold)?;
        positive("trail.size", t.size)?;

        let f = &self.flow;
        positive("flow.respawnLifetime", f.respawn_lifetime)?;
        positive("flow.bounds", f.bounds)?;
        non_negative("flow.force", f.force)?;
        positive("flow.pointSize", f.point_size)?;

        let g = &self.grid;
        positive("grid.spacing", g.spacing)?;
        positive("grid.glowRadius", g.glow_radius)?;
        open_unit("grid.fade", g.fade)?;

        non_negative("distortion.base", self.distortion.base)?;
        non_negative("distortion.hover", self.distortion.hover)?;

        let mut trail = t.clone();
        // speeds.decay stretches the per-frame falloff; the result must still decay
        trail.decay = 1.0 - (1.0 - t.decay) * s.decay;
        open_unit("trail.decay * speeds.decay", trail.decay)?;

        let desktop_count = match self.particle_count {
            Some(0) => {
                return Err(ConfigError::OutOfRange {
                    field: "particleCount",
                    value: 0.0,
                    expected: "greater than zero",
                })
            }
            Some(n) => n,
            None => self.kind.default_particle_count(),
        };
        if self.mobile_particle_count == Some(0) {
            return Err(ConfigError::OutOfRange {
                field: "mobileParticleCount",
                value: 0.0,
                expected: "greater than zero",
            });
        }

        let is_mobile = env.viewport_width < d.mobile_breakpoint;
        let particle_count = if is_mobile {
            self.mobile_particle_count
                .unwrap_or_else(|| mobile_share(desktop_count))
                .min(desktop_count)
        } else {
            desktop_count
        };
        let pixel_ratio_cap = if is_mobile {
            d.mobile_max_pixel_ratio.min(d.max_pixel_ratio)
        } else {
            d.max_pixel_ratio
        };

        let (palette, palette_len) = pack_palette(self.palette.as_deref())?;

        Ok(EffectSettings {
            kind: self.kind,
            particle_count,
            palette,
            palette_len,
            speeds: s.clone(),
            input: i.clone(),
            trail,
            flow: f.clone(),
            grid: g.clone(),
            distortion: self.distortion.clone(),
            background: self
                .background
                .unwrap_or_else(|| self.kind.default_background()),
            seed: self.seed.unwrap_or_else(rand::random),
            is_mobile,
            pixel_ratio_cap,
            max_delta: d.max_delta,
        })
    }
}

impl EffectSettings {
    /// Device pixel ratio after the performance cap, as used by [`Viewport`].
    ///
    /// [`Viewport`]: crate::Viewport
    pub fn effective_pixel_ratio(&self, device_pixel_ratio: f32) -> f32 {
        capped_pixel_ratio(device_pixel_ratio, self.pixel_ratio_cap)
    }
}

fn mobile_share(count: usize) -> usize {
    if count == 0 {
        return 0;
    }
    ((count as f32 * MOBILE_PARTICLE_RATIO).round() as usize).max(1)
}

fn pack_palette(
    colors: Option<&[[f32; 3]]>,
) -> Result<([[f32; 4]; MAX_PALETTE_COLORS], usize), ConfigError> {
    let colors = colors.unwrap_or(&DEFAULT_PALETTE);
    if colors.is_empty() || colors.len() > MAX_PALETTE_COLORS {
        return Err(ConfigError::Palette {
            len: colors.len(),
            max: MAX_PALETTE_COLORS,
        });
    }
    let mut packed = [[0.0; 4]; MAX_PALETTE_COLORS];
    for (slot, out) in packed.iter_mut().enumerate() {
        // unused slots repeat the last color so shaders can index freely
        let c = colors[slot.min(colors.len() - 1)];
        for (ch, v) in c.iter().enumerate() {
            finite("palette", *v)?;
            if !(0.0..=1.0).contains(v) {
                return Err(ConfigError::OutOfRange {
                    field: "palette",
                    value: *v as f64,
                    expected: "within [0, 1]",
                });
            }
            out[ch] = *v;
        }
        out[3] = 1.0;
    }
    Ok((packed, colors.len()))
}

fn finite(field: &'static str, v: f32) -> Result<(), ConfigError> {
    if v.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NotFinite { field })
    }
}

fn positive(field: &'static str, v: f32) -> Result<(), ConfigError> {
    finite(field, v)?;
    if v > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value: v as f64,
            expected: "greater than zero",
        })
    }
}

fn non_negative(field: &'static str, v: f32) -> Result<(), ConfigError> {
    finite(field, v)?;
    if v >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value: v as f64,
            expected: "zero or greater",
        })
    }
}

/// (0, 1]
fn unit_interval(field: &'static str, v: f32) -> Result<(), ConfigError> {
    finite(field, v)?;
    if v > 0.0 && v <= 1.0 {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value: v as f64,
            expected: "within (0, 1]",
        })
    }
}

/// (0, 1)
fn open_unit(field: &'static str, v: f32) -> Result<(), ConfigError> {
    finite(field, v)?;
    if v > 0.0 && v < 1.0 {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value: v as f64,
            expected: "within (0, 1)",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn desktop() -> DisplayEnv {
        DisplayEnv {
            viewport_width: 1440.0,
            viewport_height: 900.0,
            device_pixel_ratio: 3.0,
        }
    }

    #[test]
    fn defaults_resolve_for_every_kind() {
        for kind in EffectKind::ALL {
            let s = EffectOptions::for_kind(kind).resolve(desktop()).unwrap();
            assert_eq!(s.kind, kind);
            assert_eq!(s.particle_count, kind.default_particle_count());
            assert_eq!(s.palette_len, DEFAULT_PALETTE.len());
        }
    }

    #[test]
    fn kind_names_round_trip() {
        for kind in EffectKind::ALL {
            assert_eq!(EffectKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(EffectKind::from_name("nope"), None);
    }

    #[test]
    fn short_palette_repeats_last_color() {
        let opts = EffectOptions {
            palette: Some(vec![[1.0, 0.0, 0.0], [0.0, 0.0, 1.0]]),
            ..EffectOptions::default()
        };
        let s = opts.resolve(desktop()).unwrap();
        assert_eq!(s.palette_len, 2);
        assert_eq!(s.palette[3], [0.0, 0.0, 1.0, 1.0]);
    }

    #[test]
    fn blob_defaults_to_noise_background() {
        let s = EffectOptions::for_kind(EffectKind::GlassBlob)
            .resolve(desktop())
            .unwrap();
        assert_eq!(s.background, Background::Noise);
    }
}
