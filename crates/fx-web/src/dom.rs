use anyhow::anyhow;
use fx_core::{DisplayEnv, Viewport};
use wasm_bindgen::JsCast;
use web_sys as web;

const KEY_ATTRIBUTE: &str = "data-fx-canvas";

#[inline]
pub fn window_document() -> Option<web::Document> {
    web::window().and_then(|w| w.document())
}

pub fn canvas_by_id(id: &str) -> anyhow::Result<web::HtmlCanvasElement> {
    let document = window_document().ok_or_else(|| anyhow!("no document"))?;
    document
        .get_element_by_id(id)
        .ok_or_else(|| anyhow!("missing #{id}"))?
        .dyn_into::<web::HtmlCanvasElement>()
        .map_err(|_| anyhow!("#{id} is not a canvas"))
}

pub fn device_pixel_ratio() -> f32 {
    web::window().map_or(1.0, |w| w.device_pixel_ratio() as f32)
}

/// Layout size of the canvas in CSS pixels.
pub fn css_size(canvas: &web::HtmlCanvasElement) -> (f32, f32) {
    let rect = canvas.get_bounding_client_rect();
    (rect.width() as f32, rect.height() as f32)
}

/// Sets the drawing buffer to the physical size of the canvas viewport, the
/// same size the GPU surface is configured with, and returns that viewport.
pub fn sync_canvas_backing_size(canvas: &web::HtmlCanvasElement, pixel_ratio_cap: f32) -> Viewport {
    let (w, h) = css_size(canvas);
    let viewport = Viewport::new(w, h, device_pixel_ratio(), pixel_ratio_cap);
    let (pw, ph) = viewport.physical_size();
    canvas.set_width(pw);
    canvas.set_height(ph);
    viewport
}

pub fn display_env(canvas: &web::HtmlCanvasElement) -> DisplayEnv {
    let (w, h) = css_size(canvas);
    let viewport_width = web::window()
        .and_then(|win| win.inner_width().ok())
        .and_then(|v| v.as_f64())
        .map_or(w, |v| v as f32);
    DisplayEnv {
        viewport_width,
        viewport_height: h,
        device_pixel_ratio: device_pixel_ratio(),
    }
}

/// Stable identity of a canvas for the binding registry: its id, or a
/// generated key stored on the element.
pub fn canvas_key(canvas: &web::HtmlCanvasElement) -> String {
    let id = canvas.id();
    if !id.is_empty() {
        return id;
    }
    if let Some(key) = canvas.get_attribute(KEY_ATTRIBUTE) {
        return key;
    }
    let key = format!("fx-{:08x}", (js_sys::Math::random() * u32::MAX as f64) as u32);
    let _ = canvas.set_attribute(KEY_ATTRIBUTE, &key);
    key
}

/// Parent element when there is one; hover and the `loaded` class go there.
pub fn container(canvas: &web::HtmlCanvasElement) -> web::Element {
    canvas
        .parent_element()
        .unwrap_or_else(|| canvas.clone().unchecked_into())
}

pub fn add_class(el: &web::Element, class: &str) {
    if let Err(e) = el.class_list().add_1(class) {
        log::warn!("could not add class `{class}`: {e:?}");
    }
}

pub fn scroll_metrics() -> Option<(f32, f32, f32)> {
    let window = web::window()?;
    let scroll_y = window.scroll_y().ok()? as f32;
    let viewport_height = window.inner_height().ok()?.as_f64()? as f32;
    let scroll_height = window.document()?.document_element()?.scroll_height() as f32;
    Some((scroll_y, scroll_height, viewport_height))
}

pub fn page_visible() -> bool {
    window_document().map_or(true, |d| d.visibility_state() == web::VisibilityState::Visible)
}
