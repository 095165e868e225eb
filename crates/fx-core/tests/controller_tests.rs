// Host-side lifecycle tests: a recording backend stands in for wgpu and a
// manual time source drives the clock.

use std::cell::RefCell;
use std::rc::Rc;

use fx_core::{
    BindingRegistry, DisplayEnv, EffectBackend, EffectController, EffectKind, EffectOptions, Frame,
    FrameError, FxError, InputEvent, InputQueue, Layer, Lifecycle, ManualTime, ResourceError,
    SceneUniforms, SimStep, Viewport,
};

#[derive(Debug, Default)]
struct Log {
    resizes: Vec<(u32, u32)>,
    steps: Vec<SimStep>,
    frames: Vec<SceneUniforms>,
    layers: Vec<Layer>,
    line_alphas: Vec<f32>,
    releases: u32,
}

struct Recorder {
    log: Rc<RefCell<Log>>,
    fail_frames: bool,
}

impl EffectBackend for Recorder {
    fn resize(&mut self, viewport: &Viewport) {
        self.log.borrow_mut().resizes.push(viewport.physical_size());
    }

    fn simulate(&mut self, step: &SimStep) -> bool {
        self.log.borrow_mut().steps.push(*step);
        true
    }

    fn render(&mut self, frame: &Frame<'_>) -> Result<(), FrameError> {
        if self.fail_frames {
            return Err(FrameError::Timeout);
        }
        let mut log = self.log.borrow_mut();
        log.frames.push(*frame.uniforms);
        log.layers = frame.layers.to_vec();
        log.line_alphas = frame.lines.iter().map(|v| v.alpha).collect();
        Ok(())
    }

    fn release(&mut self) {
        self.log.borrow_mut().releases += 1;
    }
}

struct Harness {
    fx: EffectController<Recorder, ManualTime>,
    time: ManualTime,
    queue: InputQueue,
    log: Rc<RefCell<Log>>,
}

fn harness(kind: EffectKind) -> Harness {
    let env = DisplayEnv {
        viewport_width: 1280.0,
        viewport_height: 720.0,
        device_pixel_ratio: 1.0,
    };
    let opts = EffectOptions {
        seed: Some(9),
        particle_count: if kind == EffectKind::FlowField { Some(256) } else { None },
        ..EffectOptions::for_kind(kind)
    };
    let settings = opts.resolve(env).unwrap();
    let viewport = Viewport::new(1280.0, 720.0, 1.0, settings.pixel_ratio_cap);
    let time = ManualTime::new();
    let queue = InputQueue::new();
    let fx = EffectController::new(settings, viewport, time.clone(), queue.clone());
    Harness {
        fx,
        time,
        queue,
        log: Rc::default(),
    }
}

fn recorder(log: &Rc<RefCell<Log>>) -> Recorder {
    Recorder {
        log: log.clone(),
        fail_frames: false,
    }
}

fn started(kind: EffectKind) -> Harness {
    let mut h = harness(kind);
    let backend = recorder(&h.log);
    pollster::block_on(h.fx.start(None, async { Ok(backend) })).unwrap();
    h.fx.play().unwrap();
    h
}

fn frame(h: &mut Harness, dt: f64) {
    h.time.advance(dt);
    h.fx.update();
}

#[test]
fn lifecycle_walks_the_documented_states() {
    let mut h = harness(EffectKind::Starfield);
    assert_eq!(h.fx.state(), Lifecycle::Uninitialized);
    assert_eq!(h.fx.play(), Err(FxError::NotReady));

    let ticket = h.fx.begin_start(None).unwrap();
    assert_eq!(h.fx.state(), Lifecycle::Starting);
    h.fx.finish_start(ticket, Ok(recorder(&h.log))).unwrap();
    assert_eq!(h.fx.state(), Lifecycle::Ready);

    h.fx.play().unwrap();
    h.fx.play().unwrap();
    assert_eq!(h.fx.state(), Lifecycle::Running);
    h.fx.pause().unwrap();
    h.fx.pause().unwrap();
    assert_eq!(h.fx.state(), Lifecycle::Paused);
    h.fx.play().unwrap();
    assert_eq!(h.fx.state(), Lifecycle::Running);
}

#[test]
fn second_start_is_rejected() {
    let mut h = started(EffectKind::Starfield);
    let again = recorder(&h.log);
    let err = pollster::block_on(h.fx.start(None, async { Ok(again) })).unwrap_err();
    assert_eq!(err, FxError::AlreadyStarted);
}

#[test]
fn update_before_play_renders_nothing() {
    let mut h = harness(EffectKind::Starfield);
    frame(&mut h, 0.016);
    let ticket = h.fx.begin_start(None).unwrap();
    h.fx.finish_start(ticket, Ok(recorder(&h.log))).unwrap();
    frame(&mut h, 0.016);
    assert!(h.log.borrow().frames.is_empty());
}

#[test]
fn pause_freezes_every_output() {
    let mut h = started(EffectKind::Trail);
    h.queue.push(InputEvent::PointerMove { x: 100.0, y: 100.0 });
    frame(&mut h, 0.016);
    h.queue.push(InputEvent::PointerMove { x: 200.0, y: 140.0 });
    frame(&mut h, 0.016);

    h.fx.pause().unwrap();
    let particles = h.fx.trail().unwrap().particles().to_vec();
    let uniforms = *h.fx.composer().uniforms();
    let elapsed = h.fx.elapsed();
    let frames = h.log.borrow().frames.len();

    for _ in 0..20 {
        h.queue.push(InputEvent::PointerMove { x: 600.0, y: 500.0 });
        frame(&mut h, 0.5);
    }

    assert_eq!(h.fx.trail().unwrap().particles(), &particles[..]);
    assert_eq!(bytemuck::bytes_of(h.fx.composer().uniforms()), bytemuck::bytes_of(&uniforms));
    assert_eq!(h.fx.elapsed().to_bits(), elapsed.to_bits());
    assert_eq!(h.log.borrow().frames.len(), frames);
}

#[test]
fn resume_does_not_catch_up() {
    let mut h = started(EffectKind::Starfield);
    frame(&mut h, 0.016);
    frame(&mut h, 0.016);
    let before = h.fx.elapsed();

    h.fx.pause().unwrap();
    h.time.advance(60.0);
    h.fx.play().unwrap();
    frame(&mut h, 0.016);

    let jump = h.fx.elapsed() - before;
    assert!((jump - 0.016).abs() < 1e-4, "jumped {jump}s");
}

#[test]
fn long_stalls_are_clamped_to_max_delta() {
    let mut h = started(EffectKind::Starfield);
    frame(&mut h, 5.0);
    assert!((h.fx.elapsed() - 0.1).abs() < 1e-6);
}

#[test]
fn feedback_runs_only_when_time_advances() {
    let mut h = started(EffectKind::FlowField);
    frame(&mut h, 0.0);
    assert!(h.log.borrow().steps.is_empty());
    frame(&mut h, 0.016);
    frame(&mut h, 0.016);
    let log = h.log.borrow();
    assert_eq!(log.steps.len(), 2);
    assert!((log.steps[1].time - 0.032).abs() < 1e-5);
    assert_eq!(h.fx.stats().sim_steps, 2);
    assert_eq!(log.frames.len(), 3);
}

#[test]
fn resize_sets_aspect_and_physical_targets() {
    let mut h = started(EffectKind::GlassBlob);
    h.fx.set_device_pixel_ratio(3.0);
    h.fx.resize(1000.0, 400.0).unwrap();
    assert_eq!(h.fx.camera().aspect(), 1000.0 / 400.0);
    // desktop cap is 2.0
    assert_eq!(h.fx.viewport().physical_size(), (2000, 800));
    assert_eq!(h.log.borrow().resizes.last(), Some(&(2000, 800)));
}

#[test]
fn resize_while_starting_is_applied_once_after_start() {
    let mut h = harness(EffectKind::Starfield);
    let ticket = h.fx.begin_start(None).unwrap();
    h.fx.resize(300.0, 200.0).unwrap();
    h.fx.resize(640.0, 480.0).unwrap();
    assert!(h.fx.has_pending_resize());
    assert!(h.log.borrow().resizes.is_empty());

    h.fx.finish_start(ticket, Ok(recorder(&h.log))).unwrap();
    assert_eq!(h.log.borrow().resizes, vec![(640, 480)]);
    assert_eq!(h.fx.camera().aspect(), 640.0 / 480.0);
    assert!(!h.fx.has_pending_resize());
}

#[test]
fn dispose_twice_is_silent() {
    let mut h = started(EffectKind::Starfield);
    h.fx.dispose();
    h.fx.dispose();
    assert!(h.fx.is_disposed());
    assert_eq!(h.log.borrow().releases, 1);
}

#[test]
fn calls_after_dispose_report_disposed() {
    let mut h = started(EffectKind::Starfield);
    h.fx.dispose();
    assert_eq!(h.fx.play(), Err(FxError::Disposed));
    assert_eq!(h.fx.pause(), Err(FxError::Disposed));
    assert_eq!(h.fx.resize(10.0, 10.0), Err(FxError::Disposed));
    assert_eq!(h.fx.begin_start(None).unwrap_err(), FxError::Disposed);
    let frames = h.log.borrow().frames.len();
    frame(&mut h, 0.016);
    assert_eq!(h.log.borrow().frames.len(), frames);
}

#[test]
fn dispose_mid_start_releases_the_late_backend() {
    let registry = BindingRegistry::new();
    let mut h = harness(EffectKind::Starfield);
    let guard = registry.claim("world").unwrap();
    let ticket = h.fx.begin_start(Some(guard)).unwrap();
    h.fx.dispose();
    assert!(!registry.is_bound("world"));

    let err = h.fx.finish_start(ticket, Ok(recorder(&h.log))).unwrap_err();
    assert_eq!(err, FxError::Resource(ResourceError::Abandoned));
    assert_eq!(h.log.borrow().releases, 1);
    assert!(h.fx.backend().is_none());
}

#[test]
fn abandoned_start_is_told_apart_from_a_failed_one() {
    let mut h = harness(EffectKind::Starfield);
    let ticket = h.fx.begin_start(None).unwrap();
    h.fx.dispose();
    let err = h.fx.finish_start(ticket, Err(ResourceError::NoAdapter)).unwrap_err();
    assert_eq!(err, FxError::Resource(ResourceError::Abandoned));
    assert_eq!(h.log.borrow().releases, 0);
}

#[test]
fn failed_start_releases_the_binding() {
    let registry = BindingRegistry::new();
    let mut h = harness(EffectKind::Starfield);
    let guard = registry.claim("world").unwrap();
    let ticket = h.fx.begin_start(Some(guard)).unwrap();
    let err = h.fx.finish_start(ticket, Err(ResourceError::NoAdapter)).unwrap_err();
    assert_eq!(err, FxError::Resource(ResourceError::NoAdapter));
    assert!(h.fx.is_disposed());
    assert!(!registry.is_bound("world"));
}

#[test]
fn failing_frames_are_counted_not_raised() {
    let mut h = harness(EffectKind::Starfield);
    let backend = Recorder {
        log: h.log.clone(),
        fail_frames: true,
    };
    pollster::block_on(h.fx.start(None, async { Ok(backend) })).unwrap();
    h.fx.play().unwrap();
    for _ in 0..5 {
        frame(&mut h, 0.016);
    }
    assert_eq!(h.fx.stats().degraded, 5);
    assert_eq!(h.fx.stats().frames, 0);
    assert_eq!(h.fx.state(), Lifecycle::Running);
}

#[test]
fn hover_eases_distortion_up_and_back() {
    let mut h = started(EffectKind::GlassBlob);
    let base = h.fx.composer().distortion();
    h.queue.push(InputEvent::Hover(true));
    frame(&mut h, 0.016);
    let first = h.fx.composer().distortion();
    assert!(first > base && first < 1.0);
    for _ in 0..200 {
        frame(&mut h, 0.016);
    }
    assert!((h.fx.composer().distortion() - 1.0).abs() < 1e-3);

    h.queue.push(InputEvent::Hover(false));
    frame(&mut h, 0.016);
    let leaving = h.fx.composer().distortion();
    assert!(leaving < 1.0 && leaving > base);
}

#[test]
fn hover_leave_queued_while_paused_survives_a_scroll_burst() {
    let mut h = started(EffectKind::GlassBlob);
    let base = h.fx.settings().distortion.base;
    h.queue.push(InputEvent::Hover(true));
    for _ in 0..300 {
        frame(&mut h, 0.016);
    }
    assert!((h.fx.composer().distortion() - 1.0).abs() < 1e-3);

    h.fx.pause().unwrap();
    h.queue.push(InputEvent::Hover(false));
    for i in 0..64 {
        h.queue.push(InputEvent::Scroll {
            scroll_y: i as f32 * 10.0,
            scroll_height: 4000.0,
            viewport_height: 720.0,
        });
    }
    h.fx.play().unwrap();
    for _ in 0..300 {
        frame(&mut h, 0.016);
    }
    let d = h.fx.composer().distortion();
    assert!((d - base).abs() < 1e-3, "distortion stuck at {d}");
}

#[test]
fn pointer_moves_spawn_trail_sprites() {
    let mut h = started(EffectKind::Trail);
    h.queue.push(InputEvent::PointerMove { x: 10.0, y: 10.0 });
    h.queue.push(InputEvent::PointerMove { x: 12.0, y: 10.0 });
    h.queue.push(InputEvent::PointerMove { x: 40.0, y: 10.0 });
    frame(&mut h, 0.016);
    assert_eq!(h.fx.trail().unwrap().active_count(), 2);
}

#[test]
fn particle_grid_draws_a_point_cloud_from_afar() {
    let mut h = started(EffectKind::ParticleGrid);
    frame(&mut h, 0.016);
    assert_eq!(h.log.borrow().layers, vec![Layer::PointCloud]);
    assert_eq!(h.fx.camera().position.z, 50.0);
    assert!(h.log.borrow().line_alphas.is_empty());
}

#[test]
fn grid_glow_sends_lattice_lines_every_frame() {
    let mut h = started(EffectKind::GridGlow);
    frame(&mut h, 0.016);
    let log = h.log.borrow();
    assert_eq!(log.layers, vec![Layer::Sprites, Layer::GridLines]);
    assert!(!log.line_alphas.is_empty());
    assert_eq!(log.line_alphas.len() % 2, 0);
    assert!(log.line_alphas.iter().all(|a| (0.1..=0.4 + 1e-6).contains(a)));
}
