use std::cell::Cell;
use std::rc::Rc;

use anyhow::anyhow;
use fx_core::{InputEvent, InputQueue};
use wasm_bindgen::JsCast;
use web_sys as web;

use crate::dom;
use crate::events::ListenerSet;

/// Requests from DOM handlers that touch the controller; applied at the
/// start of the next `update`, never inside the handler.
#[derive(Default)]
pub(crate) struct HostRequests {
    pub(crate) resize: Cell<bool>,
    pub(crate) visible: Cell<Option<bool>>,
}

#[inline]
pub(crate) fn pointer_css(ev: &web::MouseEvent, canvas: &web::HtmlCanvasElement) -> (f32, f32) {
    let rect = canvas.get_bounding_client_rect();
    (
        ev.client_x() as f32 - rect.left() as f32,
        ev.client_y() as f32 - rect.top() as f32,
    )
}

fn push_scroll(queue: &InputQueue) {
    if let Some((scroll_y, scroll_height, viewport_height)) = dom::scroll_metrics() {
        queue.push(InputEvent::Scroll {
            scroll_y,
            scroll_height,
            viewport_height,
        });
    }
}

/// Wires pointer, hover, scroll, resize, blur/focus and visibility to the
/// queue and `requests`. Handlers only record; they never call into the
/// controller.
pub(crate) fn bind(
    listeners: &mut ListenerSet,
    canvas: &web::HtmlCanvasElement,
    queue: &InputQueue,
    requests: &Rc<HostRequests>,
) -> anyhow::Result<()> {
    let window = web::window().ok_or_else(|| anyhow!("no window"))?;
    let document = window.document().ok_or_else(|| anyhow!("no document"))?;
    let root = document
        .document_element()
        .ok_or_else(|| anyhow!("no document element"))?;
    let win: &web::EventTarget = window.as_ref();

    {
        let queue = queue.clone();
        let canvas = canvas.clone();
        listeners.add(win, "pointermove", move |ev| {
            if let Some(ev) = ev.dyn_ref::<web::MouseEvent>() {
                let (x, y) = pointer_css(ev, &canvas);
                queue.push(InputEvent::PointerMove { x, y });
            }
        });
    }
    {
        let queue = queue.clone();
        listeners.add(root.as_ref(), "mouseleave", move |_| queue.push(InputEvent::PointerLeave));
    }

    let container = dom::container(canvas);
    {
        let queue = queue.clone();
        listeners.add(container.as_ref(), "pointerenter", move |_| {
            queue.push(InputEvent::Hover(true))
        });
    }
    {
        let queue = queue.clone();
        listeners.add(container.as_ref(), "pointerleave", move |_| {
            queue.push(InputEvent::Hover(false))
        });
    }

    {
        let queue = queue.clone();
        listeners.add(win, "scroll", move |_| push_scroll(&queue));
    }
    push_scroll(queue);

    {
        let requests = requests.clone();
        listeners.add(win, "resize", move |_| requests.resize.set(true));
    }
    {
        let requests = requests.clone();
        listeners.add(win, "blur", move |_| requests.visible.set(Some(false)));
    }
    {
        let requests = requests.clone();
        listeners.add(win, "focus", move |_| requests.visible.set(Some(true)));
    }
    {
        let requests = requests.clone();
        listeners.add(document.as_ref(), "visibilitychange", move |_| {
            requests.visible.set(Some(dom::page_visible()))
        });
    }
    Ok(())
}
