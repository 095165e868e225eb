//! wgpu implementation of [`fx_core::EffectBackend`].
//!
//! [`GpuRenderer::create`] takes anything wgpu can present to (a canvas on
//! the web, a window natively) and builds only the layers the effect kind
//! draws. Per frame it runs off-screen passes first, then one screen pass.

mod context;
mod feedback;
mod helpers;
mod layers;
mod renderer;
mod targets;

pub use context::GpuContext;
pub use feedback::GpuFeedback;
pub use renderer::GpuRenderer;
