// Host-side tests for input smoothing and the event queue.

use fx_core::input::EventBatch;
use fx_core::{InputEvent, InputQueue, InputSource, InputState};

#[test]
fn scroll_progress_is_page_relative() {
    let mut input = InputState::new(0.05, 0.06);
    input.on_scroll(500.0, 2000.0, 1000.0);
    assert_eq!(input.scroll_target(), 0.5);
    input.on_scroll(5000.0, 2000.0, 1000.0);
    assert_eq!(input.scroll_target(), 1.0);
    input.on_scroll(-20.0, 2000.0, 1000.0);
    assert_eq!(input.scroll_target(), 0.0);
}

#[test]
fn unscrollable_page_reports_zero() {
    let mut input = InputState::new(0.05, 0.06);
    input.on_scroll(100.0, 800.0, 800.0);
    assert_eq!(input.scroll_target(), 0.0);
}

#[test]
fn scroll_smoothing_converges_monotonically() {
    let mut input = InputState::new(0.05, 0.06);
    let mut prev = input.scroll_progress();
    let mut converged_at = None;
    // target ramps up over the first ticks, then holds at 1.0
    for tick in 0..150 {
        input.set_scroll_target(((tick + 1) as f32 / 4.0).min(1.0));
        input.tick();
        let now = input.scroll_progress();
        assert!(now > prev, "tick {tick}: {now} <= {prev}");
        prev = now;
        if converged_at.is_none() && (1.0 - now).abs() < 1e-3 {
            converged_at = Some(tick);
        }
    }
    assert!(converged_at.is_some(), "smoothed value stuck at {prev}");
    assert!(prev <= 1.0);
}

#[test]
fn smoothed_pointer_never_snaps_in_one_frame() {
    let mut input = InputState::new(0.05, 0.06);
    input.set_viewport(800.0, 600.0);
    input.on_pointer_move(700.0, 100.0);
    input.tick();
    let p = input.smoothed_pointer();
    assert_ne!(p, glam::Vec2::new(700.0, 100.0));
    assert!(p.x > 400.0 && p.y < 300.0);
}

#[test]
fn pointer_ndc_has_y_up() {
    let mut input = InputState::new(1.0, 1.0);
    input.set_viewport(800.0, 600.0);
    input.on_pointer_move(800.0, 0.0);
    input.tick();
    assert_eq!(input.pointer_ndc(), glam::Vec2::new(1.0, 1.0));
}

#[test]
fn leave_drops_raw_pointer_and_hover() {
    let mut input = InputState::new(0.05, 0.06);
    input.apply(InputEvent::PointerMove { x: 10.0, y: 10.0 });
    input.apply(InputEvent::Hover(true));
    assert!(input.raw_pointer().is_some());
    assert!(input.is_hovering());
    input.apply(InputEvent::PointerLeave);
    assert!(input.raw_pointer().is_none());
    assert!(!input.is_hovering());
}

#[test]
fn non_finite_pointer_is_ignored() {
    let mut input = InputState::new(0.05, 0.06);
    input.on_pointer_move(f32::NAN, 3.0);
    assert!(input.raw_pointer().is_none());
}

#[test]
fn queue_drains_in_order_and_empties() {
    let queue = InputQueue::new();
    let handle = queue.clone();
    handle.push(InputEvent::Hover(true));
    handle.push(InputEvent::PointerMove { x: 1.0, y: 2.0 });
    let mut out = EventBatch::new();
    queue.drain(&mut out);
    assert_eq!(
        out.as_slice(),
        &[InputEvent::Hover(true), InputEvent::PointerMove { x: 1.0, y: 2.0 }]
    );
    assert!(queue.is_empty());
}

#[test]
fn full_queue_coalesces_pointer_moves() {
    let queue = InputQueue::new();
    for i in 0..1000 {
        queue.push(InputEvent::PointerMove {
            x: i as f32,
            y: 0.0,
        });
    }
    assert_eq!(queue.len(), fx_core::constants::INPUT_QUEUE_CAPACITY);
    let mut out = EventBatch::new();
    queue.drain(&mut out);
    assert_eq!(out.last(), Some(&InputEvent::PointerMove { x: 999.0, y: 0.0 }));
}

#[test]
fn full_queue_keeps_latest_of_each_kind() {
    let queue = InputQueue::new();
    queue.push(InputEvent::Hover(true));
    queue.push(InputEvent::PointerMove { x: 5.0, y: 5.0 });
    queue.push(InputEvent::Hover(false));
    for i in 0..200 {
        queue.push(InputEvent::Scroll {
            scroll_y: i as f32,
            scroll_height: 2000.0,
            viewport_height: 1000.0,
        });
    }
    assert_eq!(queue.len(), fx_core::constants::INPUT_QUEUE_CAPACITY);

    let mut out = EventBatch::new();
    queue.drain(&mut out);
    let hovers: Vec<_> = out
        .iter()
        .filter(|e| matches!(e, InputEvent::Hover(_)))
        .collect();
    assert_eq!(hovers.last(), Some(&&InputEvent::Hover(false)));
    assert!(out.contains(&InputEvent::PointerMove { x: 5.0, y: 5.0 }));
    assert_eq!(
        out.last(),
        Some(&InputEvent::Scroll {
            scroll_y: 199.0,
            scroll_height: 2000.0,
            viewport_height: 1000.0,
        })
    );

    let mut input = InputState::new(0.05, 0.06);
    for ev in out {
        input.apply(ev);
    }
    assert!(!input.is_hovering());
}
