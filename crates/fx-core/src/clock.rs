//! Frame clock with pause/resume.
//!
//! `delta()` returns 0 while stopped, which is how every time-dependent
//! consumer freezes on pause without special-casing. `start()` re-anchors the
//! reference instant, so resuming never hands out the time spent paused.

use std::cell::Cell;
use std::rc::Rc;

use instant::Instant;

/// Monotonic seconds. Abstracted so tests can drive time by hand.
pub trait TimeSource {
    fn now_sec(&self) -> f64;
}

/// Wall-clock time via `instant` (performance.now() on wasm).
#[derive(Clone, Debug)]
pub struct InstantTime {
    origin: Instant,
}

impl Default for InstantTime {
    fn default() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl TimeSource for InstantTime {
    fn now_sec(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// Hand-driven time; clones share the same counter.
#[derive(Clone, Debug, Default)]
pub struct ManualTime(Rc<Cell<f64>>);

impl ManualTime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, seconds: f64) {
        self.0.set(self.0.get() + seconds);
    }

    pub fn set(&self, seconds: f64) {
        self.0.set(seconds);
    }
}

impl TimeSource for ManualTime {
    fn now_sec(&self) -> f64 {
        self.0.get()
    }
}

#[derive(Debug)]
pub struct Clock<S: TimeSource = InstantTime> {
    source: S,
    running: bool,
    last: f64,
    elapsed: f64,
    max_delta: f32,
}

impl<S: TimeSource> Clock<S> {
    /// A stopped clock. `max_delta` clamps frames after long stalls.
    pub fn new(source: S, max_delta: f32) -> Self {
        Self {
            source,
            running: false,
            last: 0.0,
            elapsed: 0.0,
            max_delta: max_delta.max(0.0),
        }
    }

    pub fn start(&mut self) {
        if self.running {
            return;
        }
        self.running = true;
        self.last = self.source.now_sec();
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Seconds since the previous call, clamped to `[0, max_delta]`.
    pub fn delta(&mut self) -> f32 {
        if !self.running {
            return 0.0;
        }
        let now = self.source.now_sec();
        let raw = (now - self.last).max(0.0);
        self.last = now;
        let dt = raw.min(self.max_delta as f64);
        self.elapsed += dt;
        dt as f32
    }

    /// Sum of every delta handed out so far; frozen while stopped.
    pub fn elapsed(&self) -> f32 {
        self.elapsed as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stopped_clock_reports_zero() {
        let t = ManualTime::new();
        let mut clock = Clock::new(t.clone(), 1.0);
        t.advance(0.5);
        assert_eq!(clock.delta(), 0.0);
        assert_eq!(clock.elapsed(), 0.0);
    }

    #[test]
    fn restart_skips_paused_interval() {
        let t = ManualTime::new();
        let mut clock = Clock::new(t.clone(), 1.0);
        clock.start();
        t.advance(0.016);
        assert!((clock.delta() - 0.016).abs() < 1e-6);
        clock.stop();
        t.advance(30.0);
        clock.start();
        t.advance(0.016);
        assert!((clock.delta() - 0.016).abs() < 1e-6);
        assert!((clock.elapsed() - 0.032).abs() < 1e-6);
    }

    #[test]
    fn long_frames_are_clamped() {
        let t = ManualTime::new();
        let mut clock = Clock::new(t.clone(), 0.1);
        clock.start();
        t.advance(5.0);
        assert!((clock.delta() - 0.1).abs() < 1e-6);
    }
}
