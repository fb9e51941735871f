//! Fidelity tiers for scroll-adaptive rendering.

use serde::{Deserialize, Serialize};

use crate::scroll::ScrollState;
use crate::tuning::{FidelityConfig, TierSettings};

/// Rendering and computation cost level, chosen per frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FidelityTier {
    /// Normal cadence, full motion, visual effects enabled.
    #[default]
    Full,
    /// Throttled cadence, damped motion, no effects.
    Reduced,
    /// Reduced plus a capped, dimmer subset of particles.
    Minimal,
}

impl FidelityTier {
    /// Select the tier for the current signals.
    ///
    /// Nothing latches: the result depends only on the arguments, so a
    /// frame after scrolling stops is always [`FidelityTier::Full`].
    pub fn select(scroll: ScrollState, low_powered: bool, fast_threshold: f32) -> Self {
        if !scroll.is_scrolling {
            FidelityTier::Full
        } else if low_powered && scroll.is_fast(fast_threshold) {
            FidelityTier::Minimal
        } else {
            FidelityTier::Reduced
        }
    }

    /// Tunables for this tier.
    pub fn settings(self, config: &FidelityConfig) -> &TierSettings {
        match self {
            FidelityTier::Full => &config.full,
            FidelityTier::Reduced => &config.reduced,
            FidelityTier::Minimal => &config.minimal,
        }
    }

    /// Short label for status lines.
    pub fn label(self) -> &'static str {
        match self {
            FidelityTier::Full => "full",
            FidelityTier::Reduced => "reduced",
            FidelityTier::Minimal => "minimal",
        }
    }
}
