#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// A parameter that approaches its target by a fixed fraction each frame.
///
/// Triggers only move the target, so rapid hover on/off never snaps the
/// visible value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EasedValue {
    current: f32,
    target: f32,
    rate: f32,
}

impl EasedValue {
    pub fn new(value: f32, rate: f32) -> Self {
        Self {
            current: value,
            target: value,
            rate: rate.clamp(0.0, 1.0),
        }
    }

    pub fn set_target(&mut self, target: f32) {
        self.target = target;
    }

    pub fn step(&mut self) -> f32 {
        self.current += (self.target - self.current) * self.rate;
        self.current
    }

    pub fn value(&self) -> f32 {
        self.current
    }

    pub fn target(&self) -> f32 {
        self.target
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn approaches_target_without_overshoot() {
        let mut v = EasedValue::new(0.3, 0.08);
        v.set_target(1.0);
        let mut prev = v.value();
        for _ in 0..200 {
            let now = v.step();
            assert!(now >= prev && now <= 1.0);
            prev = now;
        }
        assert!((v.value() - 1.0).abs() < 1e-3);
    }
}
