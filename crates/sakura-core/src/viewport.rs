//! Viewport dimensions and the classifications derived from them.

use serde::{Deserialize, Serialize};

use crate::tuning::{TierLimits, TierTable};

/// Visible region in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Width in pixels.
    pub width: f32,
    /// Height in pixels.
    pub height: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1920.0, 1080.0)
    }
}

impl Viewport {
    /// Create a viewport from pixel dimensions.
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Whether both dimensions are usable.
    pub fn is_known(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    /// Return this viewport, or `fallback` when a dimension is missing.
    pub fn or(self, fallback: Viewport) -> Viewport {
        if self.is_known() { self } else { fallback }
    }

    /// Area in square pixels.
    pub fn area(&self) -> f32 {
        self.width * self.height
    }
}

/// Viewport tier, selected from area. Drives initial and maximum counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewportTier {
    Small,
    Medium,
    Large,
}

impl ViewportTier {
    /// Classify a viewport by area.
    pub fn classify(viewport: Viewport, table: &TierTable) -> Self {
        let area = viewport.area();
        if area < table.small_area_below {
            ViewportTier::Small
        } else if area < table.medium_area_below {
            ViewportTier::Medium
        } else {
            ViewportTier::Large
        }
    }

    /// Initial and maximum particle counts for this tier.
    pub fn limits(self, table: &TierTable) -> TierLimits {
        match self {
            ViewportTier::Small => table.small,
            ViewportTier::Medium => table.medium,
            ViewportTier::Large => table.large,
        }
    }
}

/// Size class used for particle dimensions and spawn cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeClass {
    Mobile,
    Desktop,
}

impl SizeClass {
    /// Mobile when the width is at or below the breakpoint.
    pub fn classify(viewport: Viewport, mobile_max_width: f32) -> Self {
        if viewport.width <= mobile_max_width {
            SizeClass::Mobile
        } else {
            SizeClass::Desktop
        }
    }

    pub fn is_mobile(self) -> bool {
        self == SizeClass::Mobile
    }
}
