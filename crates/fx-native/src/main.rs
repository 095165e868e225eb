use std::sync::Arc;

use anyhow::Context;
use fx_core::{
    DisplayEnv, EffectController, EffectKind, EffectOptions, InputEvent, InputQueue, InstantTime,
    Viewport,
};
use fx_gpu::GpuRenderer;
use winit::event::{ElementState, Event, KeyEvent, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{Key, NamedKey};
use winit::window::WindowBuilder;

const LINE_HEIGHT_PX: f32 = 40.0;
/// Height of the virtual page the mouse wheel scrolls through, in viewports.
const VIRTUAL_PAGE_VIEWPORTS: f32 = 4.0;

/// Mouse wheel mapped onto a page so scroll-driven effects can be explored
/// without a browser.
struct VirtualScroll {
    y: f32,
}

impl VirtualScroll {
    fn scroll(&mut self, delta_px: f32, viewport_height: f32) -> InputEvent {
        let page = viewport_height * VIRTUAL_PAGE_VIEWPORTS;
        self.y = (self.y - delta_px).clamp(0.0, page - viewport_height);
        InputEvent::Scroll {
            scroll_y: self.y,
            scroll_height: page,
            viewport_height,
        }
    }
}

fn load_options() -> anyhow::Result<EffectOptions> {
    let mut args = std::env::args().skip(1);
    let kind = match args.next() {
        Some(name) => EffectKind::from_name(&name).with_context(|| {
            let known: Vec<_> = EffectKind::ALL.iter().map(|k| k.name()).collect();
            format!("unknown effect `{name}`; expected one of {}", known.join(", "))
        })?,
        None => EffectKind::default(),
    };
    let mut options = match args.next() {
        Some(path) => {
            let json = std::fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;
            EffectOptions::from_json(&json)?
        }
        None => EffectOptions::default(),
    };
    options.kind = kind;
    Ok(options)
}

fn main() -> anyhow::Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let options = load_options()?;
    let event_loop = EventLoop::new()?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(format!("fx: {}", options.kind.name()))
            .build(&event_loop)?,
    );

    let scale = window.scale_factor() as f32;
    let css = window.inner_size().to_logical::<f32>(window.scale_factor());
    let settings = options.resolve(DisplayEnv {
        viewport_width: css.width,
        viewport_height: css.height,
        device_pixel_ratio: scale,
    })?;
    let viewport = Viewport::new(css.width, css.height, scale, settings.pixel_ratio_cap);
    let queue = InputQueue::new();
    let mut controller: EffectController<GpuRenderer> =
        EffectController::new(settings.clone(), viewport, InstantTime::default(), queue.clone());

    pollster::block_on(controller.start(
        None,
        GpuRenderer::create(window.clone(), &settings, &viewport),
    ))?;
    controller.play()?;

    let mut scroll = VirtualScroll { y: 0.0 };
    let mut user_paused = false;
    event_loop.run(move |event, elwt| {
        elwt.set_control_flow(ControlFlow::Poll);
        match event {
            Event::WindowEvent { event, .. } => match event {
                WindowEvent::CloseRequested => {
                    controller.dispose();
                    elwt.exit();
                }
                WindowEvent::Resized(size) => {
                    let css = size.to_logical::<f32>(window.scale_factor());
                    let _ = controller.resize(css.width, css.height);
                }
                WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                    controller.set_device_pixel_ratio(scale_factor as f32);
                    let css = window.inner_size().to_logical::<f32>(scale_factor);
                    let _ = controller.resize(css.width, css.height);
                }
                WindowEvent::CursorMoved { position, .. } => {
                    let p = position.to_logical::<f32>(window.scale_factor());
                    queue.push(InputEvent::PointerMove { x: p.x, y: p.y });
                }
                WindowEvent::CursorEntered { .. } => queue.push(InputEvent::Hover(true)),
                WindowEvent::CursorLeft { .. } => queue.push(InputEvent::PointerLeave),
                WindowEvent::MouseWheel { delta, .. } => {
                    let dy = match delta {
                        MouseScrollDelta::LineDelta(_, y) => y * LINE_HEIGHT_PX,
                        MouseScrollDelta::PixelDelta(p) => {
                            p.to_logical::<f32>(window.scale_factor()).y
                        }
                    };
                    queue.push(scroll.scroll(dy, controller.viewport().css_height));
                }
                WindowEvent::Focused(focused) if !user_paused => {
                    let _ = if focused {
                        controller.play()
                    } else {
                        controller.pause()
                    };
                }
                WindowEvent::KeyboardInput {
                    event:
                        KeyEvent {
                            logical_key: Key::Named(NamedKey::Space),
                            state: ElementState::Pressed,
                            ..
                        },
                    ..
                } => {
                    user_paused = !user_paused;
                    let _ = if user_paused {
                        controller.pause()
                    } else {
                        controller.play()
                    };
                }
                _ => {}
            },
            Event::AboutToWait => {
                controller.update();
                let stats = controller.stats();
                if stats.frames > 0 && stats.frames % 600 == 0 {
                    log::debug!(
                        "{} frames, {} sim steps, {} degraded",
                        stats.frames,
                        stats.sim_steps,
                        stats.degraded
                    );
                }
            }
            _ => {}
        }
    })?;
    Ok(())
}
