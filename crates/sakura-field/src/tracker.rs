//! Scroll speed detection owned by the host.

use std::time::Duration;

use sakura_core::ScrollState;

/// Turns raw scroll positions into the signal the petal field consumes.
///
/// The host records every scroll event and polls once per frame; the
/// tracker reports scrolling until `settle` has passed without an event.
#[derive(Debug, Clone)]
pub struct ScrollTracker {
    settle: Duration,
    last_position: Option<f32>,
    last_event: Option<Duration>,
    /// Pixels per 100ms.
    speed: f32,
    scrolling: bool,
}

impl ScrollTracker {
    /// Create a tracker that settles `settle` after the last event.
    pub fn new(settle: Duration) -> Self {
        Self {
            settle,
            last_position: None,
            last_event: None,
            speed: 0.0,
            scrolling: false,
        }
    }

    /// Change the settle delay, e.g. after the size class changed.
    pub fn set_settle(&mut self, settle: Duration) {
        self.settle = settle;
    }

    /// Record a scroll event: the page is at `position` pixels at `now`.
    pub fn record(&mut self, position: f32, now: Duration) {
        if let (Some(last_position), Some(last_event)) = (self.last_position, self.last_event) {
            let elapsed_ms = now.saturating_sub(last_event).as_secs_f32() * 1000.0;
            if elapsed_ms > 0.0 {
                self.speed = (position - last_position).abs() / elapsed_ms * 100.0;
            }
        }
        self.last_position = Some(position);
        self.last_event = Some(now);
        self.scrolling = true;
    }

    /// End the scrolling state once the page has been still long enough.
    pub fn poll(&mut self, now: Duration) {
        if let Some(last_event) = self.last_event
            && self.scrolling
            && now.saturating_sub(last_event) >= self.settle
        {
            self.scrolling = false;
            self.speed = 0.0;
        }
    }

    /// Current signal for [`crate::ParticleField::set_scroll_state`].
    pub fn state(&self) -> ScrollState {
        ScrollState::new(self.scrolling, self.speed)
    }

    pub fn is_scrolling(&self) -> bool {
        self.scrolling
    }

    /// Pixels per 100ms of wall time.
    pub fn speed(&self) -> f32 {
        self.speed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn assert_speed(tracker: &ScrollTracker, expected: f32) {
        assert!(
            (tracker.speed() - expected).abs() < 1e-3,
            "speed {} != {expected}",
            tracker.speed()
        );
    }

    #[test]
    fn test_speed_in_pixels_per_100ms() {
        let mut tracker = ScrollTracker::new(ms(150));
        tracker.record(0.0, ms(1_000));
        assert!(tracker.is_scrolling());
        assert_eq!(tracker.speed(), 0.0);

        tracker.record(40.0, ms(1_050));
        assert_speed(&tracker, 80.0);

        tracker.record(20.0, ms(1_150));
        assert_speed(&tracker, 20.0);
    }

    #[test]
    fn test_settles_after_quiet_period() {
        let mut tracker = ScrollTracker::new(ms(150));
        tracker.record(0.0, ms(0));
        tracker.record(100.0, ms(20));

        tracker.poll(ms(100));
        assert!(tracker.state().is_scrolling);

        tracker.poll(ms(170));
        assert_eq!(tracker.state(), ScrollState::idle());
    }

    #[test]
    fn test_same_instant_keeps_previous_speed() {
        let mut tracker = ScrollTracker::new(ms(150));
        tracker.record(0.0, ms(0));
        tracker.record(30.0, ms(10));
        tracker.record(60.0, ms(10));
        assert_speed(&tracker, 300.0);
    }
}
