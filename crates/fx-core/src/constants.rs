use glam::Vec3;

// Shared tuning constants used by the core, the GPU layers and both hosts.

// Display
pub const DEFAULT_MAX_PIXEL_RATIO: f32 = 2.0; // desktop cap on devicePixelRatio
pub const DEFAULT_MOBILE_MAX_PIXEL_RATIO: f32 = 1.0; // performance floor on phones
pub const DEFAULT_MOBILE_BREAKPOINT_PX: f32 = 768.0; // viewport width below which a device counts as mobile
pub const MOBILE_PARTICLE_RATIO: f32 = 0.2; // mobile share of the desktop particle count
pub const DEFAULT_MAX_DELTA_SEC: f32 = 0.1; // long frames (tab switches) are clamped to this

// Input
pub const DEFAULT_POINTER_SMOOTHING: f32 = 0.05;
pub const DEFAULT_SCROLL_SMOOTHING: f32 = 0.06;
pub const DEFAULT_EASE_RATE: f32 = 0.08; // hover/distortion easing per frame
pub const INPUT_QUEUE_CAPACITY: usize = 64;

// Pointer trail pool
pub const DEFAULT_TRAIL_CAPACITY: usize = 50;
pub const DEFAULT_TRAIL_DECAY: f32 = 0.92;
pub const DEFAULT_TRAIL_TARGET_SCALE: f32 = 1.0;
pub const DEFAULT_TRAIL_SCALE_EASE: f32 = 0.12;
pub const DEFAULT_TRAIL_THRESHOLD: f32 = 0.002;
pub const DEFAULT_TRAIL_MOVE_THRESHOLD_PX: f32 = 8.0;
pub const DEFAULT_TRAIL_SIZE_PX: f32 = 28.0;
pub const TRAIL_SPAWN_SCALE: f32 = 0.2; // scale a sprite starts from before easing up

// Flow field (GPU feedback)
pub const DEFAULT_FLOW_COUNT: usize = 10_000;
pub const FLOW_START_X: f32 = -29.99;
pub const FLOW_RING_MIN_RADIUS: f32 = 5.0;
pub const FLOW_RING_RADIUS_SPAN: f32 = 10.0;
pub const FLOW_MAX_DELAY_SEC: f32 = 10.0;
pub const DEFAULT_FLOW_RESPAWN_SEC: f32 = 12.0;
pub const DEFAULT_FLOW_BOUNDS: f32 = 60.0;
pub const DEFAULT_FLOW_FORCE: f32 = 1.0;
pub const DEFAULT_FLOW_POINT_SIZE_PX: f32 = 2.0;
pub const FLOW_ACCEL_DAMPING: f32 = 0.96;
pub const FLOW_DRIFT: [f32; 3] = [4.0, 0.0, 0.0]; // steady push along +x
pub const NOISE_TEXTURE_SIZE: u32 = 256;

// Starfield
pub const DEFAULT_STAR_COUNT: usize = 10_000;
pub const STAR_SCHWARZSCHILD_RADIUS: f32 = 50.0;
pub const STAR_ISCO_RADIUS: f32 = 150.0;
pub const STAR_RADIUS_SPAN: f32 = 1200.0;
pub const STAR_CAMERA_Z: f32 = 1000.0;
pub const STAR_CAMERA_DOLLY: f32 = 800.0;

// Particle grid
pub const DEFAULT_PARTICLE_GRID_COUNT: usize = 2000; // 400 on mobile
pub const PARTICLE_GRID_EXTENT: [f32; 3] = [100.0, 100.0, 30.0]; // cloud size around the origin
pub const PARTICLE_GRID_CAMERA_Z: f32 = 50.0;

// Grid glow
pub const DEFAULT_GRID_SPACING_PX: f32 = 40.0;
pub const DEFAULT_GRID_GLOW_RADIUS_PX: f32 = 200.0;
pub const DEFAULT_GRID_FADE: f32 = 0.95;
pub const GRID_BASE_OPACITY: f32 = 0.15;
pub const GRID_GLOW_OPACITY: f32 = 0.6;
pub const GRID_LINE_BASE_OPACITY: f32 = 0.1;
pub const GRID_LINE_GLOW_OPACITY: f32 = 0.3;

// Glass blob
pub const DEFAULT_BASE_DISTORTION: f32 = 0.3;
pub const DEFAULT_HOVER_DISTORTION: f32 = 1.0;
pub const BLOB_RADIUS: f32 = 1.6;
pub const BLOB_SEGMENTS: u32 = 64;
pub const PERSPECTIVE_CAMERA_Z: f32 = 6.0;
pub const FLOW_CAMERA_Z: f32 = 80.0;

pub const DEFAULT_PALETTE: [[f32; 3]; 4] = [
    [0.95, 0.97, 1.0],  // cold white
    [1.0, 0.98, 0.93],  // warm white
    [1.0, 0.88, 0.75],  // amber
    [0.81, 0.81, 0.79], // grey (#cfcecd)
];

pub const CLEAR_COLOR: [f64; 4] = [0.039, 0.039, 0.039, 1.0]; // 0x0a0a0a

#[inline]
pub fn flow_drift_vec3() -> Vec3 {
    Vec3::new(FLOW_DRIFT[0], FLOW_DRIFT[1], FLOW_DRIFT[2])
}
