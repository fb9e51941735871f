//! Scroll signal handed from the host to the petal field.

/// Snapshot of the host's scrolling state.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollState {
    /// Whether the viewport is currently scrolling.
    pub is_scrolling: bool,
    /// Scroll speed in pixels per 100ms of wall time.
    pub speed: f32,
}

impl ScrollState {
    /// Create a scroll state. Negative or non-finite speeds read as zero.
    pub fn new(is_scrolling: bool, speed: f32) -> Self {
        let speed = if speed.is_finite() { speed.max(0.0) } else { 0.0 };
        Self {
            is_scrolling,
            speed,
        }
    }

    /// The resting state: not scrolling, zero speed.
    pub fn idle() -> Self {
        Self::default()
    }

    /// Scrolling faster than `threshold`.
    pub fn is_fast(&self, threshold: f32) -> bool {
        self.is_scrolling && self.speed > threshold
    }
}
