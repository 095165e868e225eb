use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

struct LoopState {
    tick: RefCell<Option<Closure<dyn FnMut()>>>,
    pending: Cell<Option<i32>>,
    stopped: Cell<bool>,
}

impl LoopState {
    fn request(&self) {
        if self.stopped.get() {
            return;
        }
        let Some(window) = web::window() else {
            return;
        };
        if let Some(tick) = self.tick.borrow().as_ref() {
            self.pending
                .set(window.request_animation_frame(tick.as_ref().unchecked_ref()).ok());
        }
    }
}

/// `requestAnimationFrame` loop; dropping it cancels the pending frame.
pub struct FrameLoop {
    state: Rc<LoopState>,
}

impl FrameLoop {
    pub fn start(mut frame: impl FnMut() + 'static) -> Self {
        let state = Rc::new(LoopState {
            tick: RefCell::new(None),
            pending: Cell::new(None),
            stopped: Cell::new(false),
        });
        let weak: Weak<LoopState> = Rc::downgrade(&state);
        *state.tick.borrow_mut() = Some(Closure::wrap(Box::new(move || {
            let Some(state) = weak.upgrade() else {
                return;
            };
            state.pending.set(None);
            frame();
            state.request();
        }) as Box<dyn FnMut()>));
        state.request();
        Self { state }
    }
}

impl Drop for FrameLoop {
    fn drop(&mut self) {
        self.state.stopped.set(true);
        if let (Some(window), Some(id)) = (web::window(), self.state.pending.take()) {
            let _ = window.cancel_animation_frame(id);
        }
    }
}
