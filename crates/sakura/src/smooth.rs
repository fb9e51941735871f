//! Eased page scrolling.

use std::time::Duration;

use sakura_core::SizeClass;

/// Distances below this jump straight to the target.
const MIN_ANIMATED_DISTANCE: f32 = 50.0;

/// Mobile-sized viewports jump below this distance.
const MOBILE_MIN_ANIMATED_DISTANCE: f32 = 150.0;

/// Milliseconds per step for stepped scrolls.
const MOBILE_STEP_MS: u64 = 40;

/// Most steps a stepped scroll takes.
const MOBILE_MAX_STEPS: u64 = 6;

/// How to reach a scroll target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScrollPlan {
    /// Move there immediately.
    Jump(f32),
    /// Animate over time.
    Animate(SmoothScroll),
}

/// A running eased scroll between two page positions, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothScroll {
    from: f32,
    to: f32,
    started: Duration,
    duration: Duration,
    /// Discrete steps for the mobile size class, `None` for continuous.
    steps: Option<u64>,
}

impl SmoothScroll {
    /// Plan a scroll from `from` to `to` starting at `now`.
    ///
    /// Desktop viewports ease in and out continuously; mobile viewports
    /// take a few discrete eased-out steps and jump over short distances.
    pub fn plan(
        from: f32,
        to: f32,
        now: Duration,
        class: SizeClass,
        duration: Duration,
    ) -> ScrollPlan {
        let distance = (to - from).abs();
        if distance < MIN_ANIMATED_DISTANCE || duration.is_zero() {
            return ScrollPlan::Jump(to);
        }

        let steps = match class {
            SizeClass::Desktop => None,
            SizeClass::Mobile => {
                if distance < MOBILE_MIN_ANIMATED_DISTANCE {
                    return ScrollPlan::Jump(to);
                }
                let steps = (duration.as_millis() as u64 / MOBILE_STEP_MS).min(MOBILE_MAX_STEPS);
                Some(steps.max(1))
            }
        };

        ScrollPlan::Animate(Self {
            from,
            to,
            started: now,
            duration,
            steps,
        })
    }

    /// Target position.
    pub fn target(&self) -> f32 {
        self.to
    }

    /// Page position at `now`.
    pub fn position_at(&self, now: Duration) -> f32 {
        let elapsed = now.saturating_sub(self.started).as_secs_f32();
        let progress = (elapsed / self.duration.as_secs_f32()).clamp(0.0, 1.0);

        let eased = match self.steps {
            None => ease_in_out_quad(progress),
            Some(steps) => {
                let step = (progress * steps as f32).floor();
                ease_out_cubic(step / steps as f32)
            }
        };
        if progress >= 1.0 {
            return self.to;
        }
        self.from + (self.to - self.from) * eased
    }

    /// Whether the target has been reached at `now`.
    pub fn is_finished(&self, now: Duration) -> bool {
        now.saturating_sub(self.started) >= self.duration
    }
}

fn ease_in_out_quad(t: f32) -> f32 {
    if t < 0.5 {
        2.0 * t * t
    } else {
        -1.0 + (4.0 - 2.0 * t) * t
    }
}

fn ease_out_cubic(t: f32) -> f32 {
    1.0 - (1.0 - t).powi(3)
}
