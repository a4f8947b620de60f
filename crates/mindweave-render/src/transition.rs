use mindweave_core::Viewport;
use std::time::Duration;

/// `1 - (1 - t)^3`, with `t` clamped to `[0, 1]`.
pub fn ease_out_cubic(t: f64) -> f64 {
    let t = if t.is_nan() { 1.0 } else { t.clamp(0.0, 1.0) };
    1.0 - (1.0 - t).powi(3)
}

/// An animated move between two viewports.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportTransition {
    from: Viewport,
    to: Viewport,
    duration: Duration,
}

impl ViewportTransition {
    pub fn new(from: Viewport, to: Viewport, duration: Duration) -> Self {
        Self { from, to, duration }
    }

    pub fn from(&self) -> &Viewport {
        &self.from
    }

    pub fn target(&self) -> &Viewport {
        &self.to
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Viewport `elapsed` into the transition. A zero duration jumps to the target.
    pub fn sample(&self, elapsed: Duration) -> Viewport {
        if self.is_finished(elapsed) {
            return self.to;
        }
        let t = elapsed.as_secs_f64() / self.duration.as_secs_f64();
        self.from.lerp(&self.to, ease_out_cubic(t))
    }

    pub fn is_finished(&self, elapsed: Duration) -> bool {
        elapsed >= self.duration
    }
}
