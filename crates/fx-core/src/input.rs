use std::cell::RefCell;
use std::collections::VecDeque;
use std::mem::discriminant;
use std::rc::Rc;

use glam::Vec2;
use smallvec::SmallVec;

use crate::constants::INPUT_QUEUE_CAPACITY;

/// Raw input as delivered by the host (browser listeners, winit, tests).
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InputEvent {
    /// Pointer position in CSS pixels relative to the canvas.
    PointerMove { x: f32, y: f32 },
    PointerLeave,
    Scroll {
        scroll_y: f32,
        scroll_height: f32,
        viewport_height: f32,
    },
    /// Pointer entered/left an element that raises the distortion.
    Hover(bool),
}

pub type EventBatch = SmallVec<[InputEvent; 16]>;

/// Anything that can hand the controller the events gathered since the last frame.
pub trait InputSource {
    fn drain(&self, out: &mut EventBatch);
}

/// Cheap, cloneable event queue. Handlers push; the controller drains once per frame.
#[derive(Clone, Debug, Default)]
pub struct InputQueue {
    events: Rc<RefCell<VecDeque<InputEvent>>>,
}

impl InputQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `ev`. A full queue makes room by dropping an entry a newer
    /// event of the same kind supersedes, so the latest pointer, scroll,
    /// hover and leave always survive until the next drain.
    pub fn push(&self, ev: InputEvent) {
        let mut q = self.events.borrow_mut();
        if q.len() >= INPUT_QUEUE_CAPACITY {
            evict_superseded(&mut q, ev);
        }
        q.push_back(ev);
    }

    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}

fn evict_superseded(q: &mut VecDeque<InputEvent>, incoming: InputEvent) {
    let kind = discriminant(&incoming);
    let slot = q
        .iter()
        .rposition(|e| discriminant(e) == kind)
        .or_else(|| {
            (0..q.len()).find(|&i| {
                let k = discriminant(&q[i]);
                q.iter().skip(i + 1).any(|later| discriminant(later) == k)
            })
        });
    match slot {
        Some(i) => {
            q.remove(i);
        }
        None => {
            q.pop_front();
        }
    }
}

impl InputSource for InputQueue {
    fn drain(&self, out: &mut EventBatch) {
        out.extend(self.events.borrow_mut().drain(..));
    }
}

/// Pointer and scroll state, smoothed once per frame.
#[derive(Clone, Debug)]
pub struct InputState {
    raw: Vec2,
    smoothed: Vec2,
    inside: bool,
    hovering: bool,
    scroll_target: f32,
    scroll: f32,
    viewport: Vec2,
    smoothing: f32,
    scroll_smoothing: f32,
}

impl InputState {
    pub fn new(smoothing: f32, scroll_smoothing: f32) -> Self {
        Self {
            raw: Vec2::ZERO,
            smoothed: Vec2::ZERO,
            inside: false,
            hovering: false,
            scroll_target: 0.0,
            scroll: 0.0,
            viewport: Vec2::ZERO,
            smoothing,
            scroll_smoothing,
        }
    }

    /// Updates the viewport; the pointer rests at its center until the first move.
    pub fn set_viewport(&mut self, width: f32, height: f32) {
        let had_viewport = self.viewport.x > 0.0 && self.viewport.y > 0.0;
        self.viewport = Vec2::new(width.max(1.0), height.max(1.0));
        if !had_viewport && !self.inside {
            self.raw = self.viewport * 0.5;
            self.smoothed = self.raw;
        }
    }

    pub fn apply(&mut self, ev: InputEvent) {
        match ev {
            InputEvent::PointerMove { x, y } => self.on_pointer_move(x, y),
            InputEvent::PointerLeave => self.on_pointer_leave(),
            InputEvent::Scroll {
                scroll_y,
                scroll_height,
                viewport_height,
            } => self.on_scroll(scroll_y, scroll_height, viewport_height),
            InputEvent::Hover(on) => self.hovering = on,
        }
    }

    pub fn on_pointer_move(&mut self, x: f32, y: f32) {
        if !x.is_finite() || !y.is_finite() {
            return;
        }
        self.raw = Vec2::new(x, y);
        self.inside = true;
    }

    pub fn on_pointer_leave(&mut self) {
        self.inside = false;
        self.hovering = false;
    }

    /// Progress is `scroll_y / (scroll_height - viewport_height)` in [0, 1]; 0 when
    /// the page cannot scroll.
    pub fn on_scroll(&mut self, scroll_y: f32, scroll_height: f32, viewport_height: f32) {
        let range = scroll_height - viewport_height;
        self.scroll_target = if range > 0.0 && scroll_y.is_finite() {
            (scroll_y / range).clamp(0.0, 1.0)
        } else {
            0.0
        };
    }

    pub fn set_scroll_target(&mut self, progress: f32) {
        if progress.is_finite() {
            self.scroll_target = progress.clamp(0.0, 1.0);
        }
    }

    /// Called exactly once per rendered frame.
    pub fn tick(&mut self) {
        self.smoothed += (self.raw - self.smoothed) * self.smoothing;
        self.scroll += (self.scroll_target - self.scroll) * self.scroll_smoothing;
    }

    pub fn raw_pointer(&self) -> Option<Vec2> {
        self.inside.then_some(self.raw)
    }

    pub fn smoothed_pointer(&self) -> Vec2 {
        self.smoothed
    }

    /// Smoothed pointer in [-1, 1] with y up; zero before a viewport is known.
    pub fn pointer_ndc(&self) -> Vec2 {
        if self.viewport.x <= 0.0 || self.viewport.y <= 0.0 {
            return Vec2::ZERO;
        }
        let uv = self.smoothed / self.viewport;
        Vec2::new(uv.x * 2.0 - 1.0, 1.0 - uv.y * 2.0).clamp(Vec2::splat(-1.0), Vec2::ONE)
    }

    pub fn scroll_progress(&self) -> f32 {
        self.scroll
    }

    pub fn scroll_target(&self) -> f32 {
        self.scroll_target
    }

    pub fn is_hovering(&self) -> bool {
        self.hovering
    }

    pub fn is_inside(&self) -> bool {
        self.inside
    }
}
