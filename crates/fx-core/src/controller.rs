//! Lifecycle façade.
//!
//! ```text
//! Uninitialized -> Starting -> Ready -> Running <-> Paused
//!        \______________\_________\________\_________\____-> Disposed
//! ```
//!
//! Starting is split in two: [`EffectController::begin_start`] claims the
//! instance and hands out a ticket, [`EffectController::finish_start`] installs
//! the backend that the host built asynchronously. A dispose in between bumps
//! the epoch, so the late backend is released instead of installed.

use std::future::Future;

use crate::bindings::BindingGuard;
use crate::camera::{Camera, Viewport};
use crate::clock::{Clock, InstantTime, TimeSource};
use crate::composer::{Layer, SceneComposer};
use crate::error::{FrameError, FxError, FxResult, ResourceError};
use crate::grid::GridGlow;
use crate::input::{EventBatch, InputEvent, InputSource, InputState};
use crate::options::{EffectKind, EffectSettings};
use crate::particles::{ParticleField, ParticleParams};
use crate::uniforms::{LineVertex, SceneUniforms, SpriteInstance};

/// One feedback simulation step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimStep {
    /// Simulation time after this step.
    pub time: f32,
    pub dt: f32,
}

/// Everything a backend needs to draw one frame.
#[derive(Clone, Copy, Debug)]
pub struct Frame<'a> {
    pub kind: EffectKind,
    pub layers: &'a [Layer],
    pub uniforms: &'a SceneUniforms,
    pub sprites: &'a [SpriteInstance],
    pub lines: &'a [LineVertex],
    pub viewport: &'a Viewport,
}

/// The renderer side of an effect. `wgpu` in production, a recorder in tests.
pub trait EffectBackend {
    /// Reconfigure surfaces and full-screen targets to the physical size.
    fn resize(&mut self, viewport: &Viewport);
    /// Run one feedback step. Returns true when work was dispatched.
    fn simulate(&mut self, step: &SimStep) -> bool;
    /// Off-screen passes, then the screen pass, for one frame.
    fn render(&mut self, frame: &Frame<'_>) -> Result<(), FrameError>;
    /// Drop GPU resources. Called at most once.
    fn release(&mut self);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lifecycle {
    Uninitialized,
    Starting,
    Ready,
    Running,
    Paused,
    Disposed,
}

/// Proof that `begin_start` ran; stale once the controller is disposed.
#[derive(Debug, PartialEq, Eq)]
pub struct StartTicket {
    epoch: u64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub frames: u64,
    pub sim_steps: u64,
    pub degraded: u64,
}

pub struct EffectController<B: EffectBackend, S: TimeSource = InstantTime> {
    settings: EffectSettings,
    state: Lifecycle,
    epoch: u64,
    clock: Clock<S>,
    input: InputState,
    source: Box<dyn InputSource>,
    events: EventBatch,
    composer: SceneComposer,
    trail: Option<ParticleField>,
    grid: Option<GridGlow>,
    sprites: Vec<SpriteInstance>,
    lines: Vec<LineVertex>,
    backend: Option<B>,
    binding: Option<BindingGuard>,
    viewport: Viewport,
    device_pixel_ratio: f32,
    pending_resize: Option<(f32, f32)>,
    stats: FrameStats,
}

impl<B: EffectBackend, S: TimeSource> EffectController<B, S> {
    pub fn new(
        settings: EffectSettings,
        viewport: Viewport,
        time: S,
        source: impl InputSource + 'static,
    ) -> Self {
        let mut input = InputState::new(settings.input.smoothing, settings.input.scroll_smoothing);
        input.set_viewport(viewport.css_width, viewport.css_height);

        let trail = (settings.kind == EffectKind::Trail).then(|| {
            ParticleField::new(
                settings.particle_count,
                ParticleParams::from_settings(&settings),
                settings.seed,
            )
        });
        let grid = (settings.kind == EffectKind::GridGlow).then(|| {
            let mut grid = GridGlow::new(&settings.grid);
            grid.set_viewport(viewport.css_width, viewport.css_height);
            grid
        });
        let sprite_capacity = trail.as_ref().map_or(0, |t| t.capacity())
            + grid.as_ref().map_or(0, |g| g.dots().len());
        let line_capacity = grid.as_ref().map_or(0, |g| g.segment_count() * 2);

        Self {
            clock: Clock::new(time, settings.max_delta),
            composer: SceneComposer::new(&settings, &viewport),
            device_pixel_ratio: viewport.pixel_ratio,
            settings,
            state: Lifecycle::Uninitialized,
            epoch: 0,
            input,
            source: Box::new(source),
            events: EventBatch::new(),
            trail,
            grid,
            sprites: Vec::with_capacity(sprite_capacity),
            lines: Vec::with_capacity(line_capacity),
            backend: None,
            binding: None,
            viewport,
            pending_resize: None,
            stats: FrameStats::default(),
        }
    }

    pub fn state(&self) -> Lifecycle {
        self.state
    }

    pub fn is_disposed(&self) -> bool {
        self.state == Lifecycle::Disposed
    }

    pub fn settings(&self) -> &EffectSettings {
        &self.settings
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn camera(&self) -> &Camera {
        self.composer.camera()
    }

    pub fn composer(&self) -> &SceneComposer {
        &self.composer
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    pub fn trail(&self) -> Option<&ParticleField> {
        self.trail.as_ref()
    }

    pub fn grid(&self) -> Option<&GridGlow> {
        self.grid.as_ref()
    }

    pub fn backend(&self) -> Option<&B> {
        self.backend.as_ref()
    }

    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    pub fn elapsed(&self) -> f32 {
        self.clock.elapsed()
    }

    pub fn has_pending_resize(&self) -> bool {
        self.pending_resize.is_some()
    }

    pub fn begin_start(&mut self, binding: Option<BindingGuard>) -> FxResult<StartTicket> {
        match self.state {
            Lifecycle::Uninitialized => {}
            Lifecycle::Disposed => return Err(FxError::Disposed),
            _ => return Err(FxError::AlreadyStarted),
        }
        self.state = Lifecycle::Starting;
        self.binding = binding;
        self.epoch += 1;
        log::info!("{}: starting", self.settings.kind.name());
        Ok(StartTicket { epoch: self.epoch })
    }

    /// Installs the backend built for `ticket`. A failed build tears the
    /// instance down; a build that lands after `dispose` is released at once.
    pub fn finish_start(&mut self, ticket: StartTicket, built: Result<B, ResourceError>) -> FxResult<()> {
        if self.state != Lifecycle::Starting || ticket.epoch != self.epoch {
            if let Ok(mut backend) = built {
                backend.release();
            }
            log::info!("{}: start abandoned", self.settings.kind.name());
            return Err(ResourceError::Abandoned.into());
        }
        let mut backend = match built {
            Ok(b) => b,
            Err(e) => {
                log::error!("{}: start failed: {e}", self.settings.kind.name());
                self.teardown();
                return Err(e.into());
            }
        };

        let pending = self.pending_resize.take();
        if pending.is_none() {
            backend.resize(&self.viewport);
        }
        self.backend = Some(backend);
        self.state = Lifecycle::Ready;
        if let Some((w, h)) = pending {
            self.apply_resize(w, h);
        }
        log::info!("{}: ready", self.settings.kind.name());
        Ok(())
    }

    /// `begin_start` + await + `finish_start` for hosts that can hold the
    /// controller across the await.
    pub async fn start<F>(&mut self, binding: Option<BindingGuard>, build: F) -> FxResult<()>
    where
        F: Future<Output = Result<B, ResourceError>>,
    {
        let ticket = self.begin_start(binding)?;
        let built = build.await;
        self.finish_start(ticket, built)
    }

    pub fn play(&mut self) -> FxResult<()> {
        match self.state {
            Lifecycle::Ready | Lifecycle::Paused => {
                self.clock.start();
                self.state = Lifecycle::Running;
                log::info!("{}: running", self.settings.kind.name());
                Ok(())
            }
            Lifecycle::Running => Ok(()),
            Lifecycle::Uninitialized | Lifecycle::Starting => Err(FxError::NotReady),
            Lifecycle::Disposed => Err(FxError::Disposed),
        }
    }

    pub fn pause(&mut self) -> FxResult<()> {
        match self.state {
            Lifecycle::Running => {
                self.clock.stop();
                self.state = Lifecycle::Paused;
                log::info!("{}: paused", self.settings.kind.name());
                Ok(())
            }
            Lifecycle::Disposed => Err(FxError::Disposed),
            _ => Ok(()),
        }
    }

    pub fn set_device_pixel_ratio(&mut self, dpr: f32) {
        self.device_pixel_ratio = dpr;
    }

    /// Resizes to `width × height` CSS pixels. While starting, only the last
    /// request is kept and applied once the backend is installed.
    pub fn resize(&mut self, width: f32, height: f32) -> FxResult<()> {
        match self.state {
            Lifecycle::Disposed => Err(FxError::Disposed),
            Lifecycle::Starting => {
                self.pending_resize = Some((width, height));
                Ok(())
            }
            _ => {
                self.apply_resize(width, height);
                Ok(())
            }
        }
    }

    fn apply_resize(&mut self, width: f32, height: f32) {
        self.viewport = Viewport::new(
            width,
            height,
            self.device_pixel_ratio,
            self.settings.pixel_ratio_cap,
        );
        self.input.set_viewport(self.viewport.css_width, self.viewport.css_height);
        self.composer.resize(&self.viewport);
        if let Some(grid) = self.grid.as_mut() {
            grid.set_viewport(self.viewport.css_width, self.viewport.css_height);
        }
        if let Some(backend) = self.backend.as_mut() {
            backend.resize(&self.viewport);
        }
        let (pw, ph) = self.viewport.physical_size();
        log::debug!("resize {width}x{height} -> {pw}x{ph}");
    }

    /// One frame. Does nothing unless running; never fails.
    pub fn update(&mut self) {
        if self.state != Lifecycle::Running {
            return;
        }

        self.events.clear();
        self.source.drain(&mut self.events);
        for ev in self.events.drain(..) {
            self.input.apply(ev);
            match ev {
                InputEvent::PointerMove { x, y } => {
                    if let Some(trail) = self.trail.as_mut().filter(|_| x.is_finite() && y.is_finite()) {
                        trail.spawn_on_move(x, y, self.composer.camera());
                    }
                }
                InputEvent::PointerLeave => {
                    if let Some(trail) = self.trail.as_mut() {
                        trail.reset_motion();
                    }
                    self.composer.set_hover(false);
                }
                InputEvent::Hover(on) => self.composer.set_hover(on),
                InputEvent::Scroll { .. } => {}
            }
        }

        let dt = self.clock.delta();
        self.input.tick();

        let Some(backend) = self.backend.as_mut() else {
            return;
        };

        if dt > 0.0 && self.settings.kind.uses_feedback() {
            let step = SimStep {
                time: self.clock.elapsed(),
                dt,
            };
            if backend.simulate(&step) {
                self.stats.sim_steps += 1;
            }
        }

        self.sprites.clear();
        if let Some(trail) = self.trail.as_mut() {
            trail.update(dt);
            trail.write_instances(&self.settings.palette, &mut self.sprites);
        }
        if let Some(grid) = self.grid.as_mut() {
            grid.update(dt, self.input.raw_pointer());
            grid.write_instances(self.composer.camera(), &mut self.sprites);
            grid.write_lines(self.composer.camera(), &mut self.lines);
        }

        self.composer
            .compose(&self.input, &self.viewport, self.clock.elapsed(), dt);
        let frame = Frame {
            kind: self.settings.kind,
            layers: self.composer.layers(),
            uniforms: self.composer.uniforms(),
            sprites: &self.sprites,
            lines: &self.lines,
            viewport: &self.viewport,
        };

        match backend.render(&frame) {
            Ok(()) => self.stats.frames += 1,
            Err(err) => {
                self.stats.degraded += 1;
                if self.stats.degraded.is_power_of_two() {
                    log::warn!("degraded frame #{}: {err}", self.stats.degraded);
                }
                if err == FrameError::SurfaceLost {
                    backend.resize(&self.viewport);
                }
            }
        }
    }

    /// Releases the backend and the canvas binding. Safe in every state.
    pub fn dispose(&mut self) {
        if self.state == Lifecycle::Disposed {
            return;
        }
        self.teardown();
        log::info!("{}: disposed", self.settings.kind.name());
    }

    fn teardown(&mut self) {
        if let Some(mut backend) = self.backend.take() {
            backend.release();
        }
        self.binding = None;
        self.pending_resize = None;
        self.clock.stop();
        if let Some(trail) = self.trail.as_mut() {
            trail.clear();
        }
        self.epoch += 1;
        self.state = Lifecycle::Disposed;
    }
}
