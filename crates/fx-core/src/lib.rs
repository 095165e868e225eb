pub mod bindings;
pub mod camera;
pub mod clock;
pub mod composer;
pub mod constants;
pub mod controller;
pub mod double_buffer;
pub mod ease;
pub mod error;
pub mod feedback;
pub mod geometry;
pub mod grid;
pub mod input;
pub mod options;
pub mod particles;
pub mod shaders;
pub mod uniforms;

pub use bindings::{BindingGuard, BindingRegistry};
pub use camera::{Camera, Projection, Viewport};
pub use clock::{Clock, InstantTime, ManualTime, TimeSource};
pub use composer::{Layer, SceneComposer};
pub use controller::{EffectBackend, EffectController, Frame, FrameStats, Lifecycle, SimStep, StartTicket};
pub use double_buffer::DoubleBuffer;
pub use error::{ConfigError, FrameError, FxError, FxResult, ResourceError};
pub use feedback::{CpuFeedback, FeedbackLayout, FlowRule, FlowSeed, NoiseField};
pub use grid::GridGlow;
pub use input::{InputEvent, InputQueue, InputSource, InputState};
pub use options::{Background, DisplayEnv, EffectKind, EffectOptions, EffectSettings};
pub use particles::{Particle, ParticleField, ParticleParams};
pub use uniforms::{
    LineVertex, MeshVertex, PointInstance, SceneUniforms, SimUniforms, SpriteInstance, StarInstance,
};
