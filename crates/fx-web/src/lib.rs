#![cfg(target_arch = "wasm32")]
//! Browser host for the effect runtime.
//!
//! ```js
//! const host = new EffectHost();
//! const fx = host.create(canvas, { kind: "starfield" });
//! fx.on();
//! await fx.start();
//! fx.play();
//! requestAnimationFrame(function loop() { fx.update(); requestAnimationFrame(loop); });
//! ```
//!
//! `mountBackground(canvasId, options)` does all of the above with its own
//! frame loop and falls back to a static `fx-static` class when the GPU is
//! unavailable.

mod dom;
mod events;
mod frame;
mod input;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use fx_core::{
    BindingGuard, BindingRegistry, EffectController, EffectOptions, FxError, InputQueue, InstantTime,
    Lifecycle, ResourceError,
};
use fx_gpu::GpuRenderer;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;
use web_sys as web;

use crate::events::ListenerSet;
use crate::frame::FrameLoop;
use crate::input::HostRequests;

type WebController = EffectController<GpuRenderer, InstantTime>;

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("fx-web ready");
    Ok(())
}

fn js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn parse_options(options: &JsValue) -> Result<EffectOptions, JsValue> {
    if options.is_undefined() || options.is_null() {
        return Ok(EffectOptions::default());
    }
    let json = String::from(js_sys::JSON::stringify(options)?);
    EffectOptions::from_json(&json).map_err(js_error)
}

struct Shared {
    controller: RefCell<WebController>,
    canvas: web::HtmlCanvasElement,
    queue: InputQueue,
    requests: Rc<HostRequests>,
    listeners: RefCell<ListenerSet>,
    registry: Option<BindingRegistry>,
    key: String,
    auto_paused: Cell<bool>,
}

impl Shared {
    fn new(
        canvas: web::HtmlCanvasElement,
        options: &JsValue,
        registry: Option<BindingRegistry>,
    ) -> Result<Self, JsValue> {
        let settings = parse_options(options)?
            .resolve(dom::display_env(&canvas))
            .map_err(js_error)?;
        let viewport = dom::sync_canvas_backing_size(&canvas, settings.pixel_ratio_cap);
        let queue = InputQueue::new();
        log::info!(
            "{}: {} particles, mobile={}",
            settings.kind.name(),
            settings.particle_count,
            settings.is_mobile
        );
        let controller = EffectController::new(settings, viewport, InstantTime::default(), queue.clone());
        Ok(Self {
            controller: RefCell::new(controller),
            key: dom::canvas_key(&canvas),
            canvas,
            queue,
            requests: Rc::new(HostRequests::default()),
            listeners: RefCell::new(ListenerSet::default()),
            registry,
            auto_paused: Cell::new(false),
        })
    }

    fn claim(&self) -> Result<Option<BindingGuard>, FxError> {
        self.registry
            .as_ref()
            .map(|r| r.claim(&self.key))
            .transpose()
    }

    async fn start(self: Rc<Self>) -> Result<(), FxError> {
        let (ticket, settings, viewport) = {
            let mut c = self.controller.borrow_mut();
            match c.state() {
                Lifecycle::Uninitialized => {}
                Lifecycle::Disposed => return Err(FxError::Disposed),
                _ => return Err(FxError::AlreadyStarted),
            }
            let ticket = c.begin_start(self.claim()?)?;
            (ticket, c.settings().clone(), *c.viewport())
        };
        // the controller is not borrowed across the await, so resize and
        // dispose stay callable while the device comes up
        let target = wgpu::SurfaceTarget::Canvas(self.canvas.clone());
        let built = GpuRenderer::create(target, &settings, &viewport).await;
        self.controller.borrow_mut().finish_start(ticket, built)
    }

    fn apply_requests(&self) {
        let mut c = self.controller.borrow_mut();
        if self.requests.resize.replace(false) {
            let viewport = dom::sync_canvas_backing_size(&self.canvas, c.settings().pixel_ratio_cap);
            c.set_device_pixel_ratio(dom::device_pixel_ratio());
            let _ = c.resize(viewport.css_width, viewport.css_height);
        }
        match self.requests.visible.take() {
            Some(false) if c.state() == Lifecycle::Running => {
                if c.pause().is_ok() {
                    self.auto_paused.set(true);
                }
            }
            Some(true) if self.auto_paused.get() => {
                if c.play().is_ok() {
                    self.auto_paused.set(false);
                }
            }
            _ => {}
        }
    }

    fn update(&self) {
        if self.controller.borrow().is_disposed() {
            return;
        }
        self.apply_requests();
        self.controller.borrow_mut().update();
    }

    fn dispose(&self) {
        self.listeners.borrow_mut().remove_all();
        self.queue.clear();
        self.controller.borrow_mut().dispose();
    }
}

/// One effect bound to one canvas.
#[wasm_bindgen]
pub struct WebEffect {
    shared: Rc<Shared>,
}

#[wasm_bindgen]
impl WebEffect {
    /// Validates `options` against the canvas; throws on invalid options.
    /// An effect created this way is not tracked by any [`EffectHost`].
    #[wasm_bindgen(constructor)]
    pub fn new(canvas: web::HtmlCanvasElement, options: JsValue) -> Result<WebEffect, JsValue> {
        Ok(Self {
            shared: Rc::new(Shared::new(canvas, &options, None)?),
        })
    }

    /// Acquires the GPU device and builds every pipeline. Rejects with the
    /// error message on failure.
    pub fn start(&self) -> js_sys::Promise {
        let shared = self.shared.clone();
        future_to_promise(async move {
            shared.start().await.map_err(js_error)?;
            Ok(JsValue::UNDEFINED)
        })
    }

    /// Attaches pointer, scroll, resize, blur/focus and visibility listeners.
    pub fn on(&self) -> Result<(), JsValue> {
        let s = &self.shared;
        if s.controller.borrow().is_disposed() {
            return Err(js_error(FxError::Disposed));
        }
        let mut listeners = s.listeners.borrow_mut();
        if !listeners.is_empty() {
            return Ok(());
        }
        input::bind(&mut listeners, &s.canvas, &s.queue, &s.requests).map_err(js_error)
    }

    pub fn play(&self) -> Result<(), JsValue> {
        self.shared.auto_paused.set(false);
        self.shared.controller.borrow_mut().play().map_err(js_error)
    }

    pub fn pause(&self) -> Result<(), JsValue> {
        self.shared.auto_paused.set(false);
        self.shared.controller.borrow_mut().pause().map_err(js_error)
    }

    /// Resizes to `width × height` CSS pixels.
    pub fn resize(&self, width: f32, height: f32) -> Result<(), JsValue> {
        let mut c = self.shared.controller.borrow_mut();
        c.set_device_pixel_ratio(dom::device_pixel_ratio());
        c.resize(width, height).map_err(js_error)
    }

    /// One frame; call from the host's animation frame callback.
    pub fn update(&self) {
        self.shared.update();
    }

    pub fn dispose(&self) {
        self.shared.dispose();
    }

    #[wasm_bindgen(getter, js_name = isDisposed)]
    pub fn is_disposed(&self) -> bool {
        self.shared.controller.borrow().is_disposed()
    }
}

/// Creates effects and refuses a second live effect on the same canvas.
#[wasm_bindgen]
#[derive(Default)]
pub struct EffectHost {
    registry: BindingRegistry,
}

#[wasm_bindgen]
impl EffectHost {
    #[wasm_bindgen(constructor)]
    pub fn new() -> EffectHost {
        Self::default()
    }

    pub fn create(&self, canvas: web::HtmlCanvasElement, options: JsValue) -> Result<WebEffect, JsValue> {
        Ok(WebEffect {
            shared: Rc::new(Shared::new(canvas, &options, Some(self.registry.clone()))?),
        })
    }

    #[wasm_bindgen(js_name = isBound)]
    pub fn is_bound(&self, canvas: &web::HtmlCanvasElement) -> bool {
        self.registry.is_bound(&dom::canvas_key(canvas))
    }

    #[wasm_bindgen(js_name = liveCount)]
    pub fn live_count(&self) -> usize {
        self.registry.len()
    }

    /// Full boot for a page background. Resolves with the running mount, or
    /// with a static mount (class `fx-static` on the container) when the GPU
    /// cannot be used.
    #[wasm_bindgen(js_name = mountBackground)]
    pub fn mount_background(&self, canvas_id: String, options: JsValue) -> js_sys::Promise {
        let registry = self.registry.clone();
        future_to_promise(async move {
            let canvas = dom::canvas_by_id(&canvas_id).map_err(js_error)?;
            let shared = Rc::new(Shared::new(canvas, &options, Some(registry))?);
            mount(shared).await.map(JsValue::from)
        })
    }
}

/// A background started by `mountBackground`.
#[wasm_bindgen]
pub struct BackgroundMount {
    effect: WebEffect,
    frame_loop: RefCell<Option<FrameLoop>>,
}

#[wasm_bindgen]
impl BackgroundMount {
    #[wasm_bindgen(getter)]
    pub fn running(&self) -> bool {
        self.frame_loop.borrow().is_some()
    }

    pub fn pause(&self) -> Result<(), JsValue> {
        self.effect.pause()
    }

    pub fn play(&self) -> Result<(), JsValue> {
        self.effect.play()
    }

    pub fn dispose(&self) {
        self.frame_loop.borrow_mut().take();
        self.effect.dispose();
    }
}

async fn mount(shared: Rc<Shared>) -> Result<BackgroundMount, JsValue> {
    let container = dom::container(&shared.canvas);
    let effect = WebEffect {
        shared: shared.clone(),
    };
    match shared.clone().start().await {
        Ok(()) => {}
        Err(FxError::Resource(ResourceError::Abandoned)) => {
            log::debug!("mount abandoned: disposed during start");
            return Ok(BackgroundMount {
                effect,
                frame_loop: RefCell::new(None),
            });
        }
        Err(FxError::Resource(err)) => {
            log::warn!("gpu unavailable, static background: {err}");
            effect.dispose();
            dom::add_class(&container, "fx-static");
            return Ok(BackgroundMount {
                effect,
                frame_loop: RefCell::new(None),
            });
        }
        Err(err) => {
            effect.dispose();
            return Err(js_error(err));
        }
    }
    effect.on()?;
    effect.play()?;

    let tick = shared.clone();
    let frame_loop = FrameLoop::start(move || tick.update());
    dom::add_class(&container, "loaded");
    Ok(BackgroundMount {
        effect,
        frame_loop: RefCell::new(Some(frame_loop)),
    })
}

/// `new EffectHost().mountBackground(canvasId, options)`.
#[wasm_bindgen(js_name = mountBackground)]
pub fn mount_background(canvas_id: String, options: JsValue) -> js_sys::Promise {
    EffectHost::new().mount_background(canvas_id, options)
}
