//! Tunable parameters for the petal field.
//!
//! Every struct deserializes with `#[serde(default)]`, so a configuration
//! file only needs to name the values it overrides.

use serde::{Deserialize, Serialize};

use crate::viewport::{SizeClass, Viewport};

/// All tunables of the petal field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    /// Widths at or below this are treated as the mobile size class.
    pub mobile_max_width: f32,
    /// Viewport used when the host reports a missing or zero dimension.
    pub fallback_viewport: Viewport,
    /// Initial and maximum counts per viewport tier.
    pub tiers: TierTable,
    /// Spawn timer and per-particle draws.
    pub spawn: SpawnConfig,
    /// Per-frame motion.
    pub motion: MotionConfig,
    /// Degradation policy.
    pub fidelity: FidelityConfig,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            mobile_max_width: 768.0,
            fallback_viewport: Viewport::new(1920.0, 1080.0),
            tiers: TierTable::default(),
            spawn: SpawnConfig::default(),
            motion: MotionConfig::default(),
            fidelity: FidelityConfig::default(),
        }
    }
}

impl FieldConfig {
    /// Particle dimensions for a size class.
    pub fn profile(&self, class: SizeClass) -> &ParticleProfile {
        match class {
            SizeClass::Mobile => &self.spawn.mobile,
            SizeClass::Desktop => &self.spawn.desktop,
        }
    }
}

/// Initial and maximum particle counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierLimits {
    pub initial: usize,
    pub max: usize,
}

/// Area thresholds and limits for the three viewport tiers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierTable {
    /// Areas below this (px²) are small.
    pub small_area_below: f32,
    /// Areas below this (px²) are medium; anything larger is large.
    pub medium_area_below: f32,
    pub small: TierLimits,
    pub medium: TierLimits,
    pub large: TierLimits,
}

impl Default for TierTable {
    fn default() -> Self {
        Self {
            small_area_below: 500_000.0,
            medium_area_below: 1_000_000.0,
            small: TierLimits {
                initial: 25,
                max: 60,
            },
            medium: TierLimits {
                initial: 35,
                max: 90,
            },
            large: TierLimits {
                initial: 45,
                max: 120,
            },
        }
    }
}

/// Batch size drawn as `base + floor(r * variation)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSize {
    pub base: usize,
    pub variation: usize,
}

/// Size-class dependent particle dimensions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleProfile {
    pub base_size: f32,
    pub size_variation: f32,
    pub base_scale: f32,
    pub scale_variation: f32,
    /// Fall speed in px per frame before the size ratio is applied.
    pub base_fall_speed: f32,
    pub fall_speed_variation: f32,
}

impl ParticleProfile {
    fn mobile() -> Self {
        Self {
            base_size: 22.0,
            size_variation: 12.0,
            base_scale: 0.5,
            scale_variation: 0.3,
            base_fall_speed: 0.5,
            fall_speed_variation: 0.4,
        }
    }

    fn desktop() -> Self {
        Self {
            base_size: 32.0,
            size_variation: 22.0,
            base_scale: 0.6,
            scale_variation: 0.5,
            base_fall_speed: 0.6,
            fall_speed_variation: 0.6,
        }
    }
}

impl Default for ParticleProfile {
    fn default() -> Self {
        Self::desktop()
    }
}

/// Spawn timer cadence and the random draws made at creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    pub mobile_interval_ms: u64,
    pub desktop_interval_ms: u64,
    /// Particles start at least this far above the top edge.
    pub top_offset: f32,
    /// Extra random height above `top_offset` for the initial batch.
    pub initial_height_spread: f32,
    /// Extra random height above `top_offset` for periodic batches.
    pub periodic_height_spread: f32,
    pub base_rotation_speed: f32,
    pub rotation_speed_variation: f32,
    /// Gravity: per-frame fall speed increment, lower bound.
    pub min_acceleration: f32,
    pub acceleration_variation: f32,
    /// Horizontal drift is drawn from `[-max_drift / 2, max_drift / 2)`.
    pub max_drift: f32,
    pub min_opacity: f32,
    pub opacity_variation: f32,
    pub depth_layers: u8,
    pub variants: u8,
    pub mobile_batch: BatchSize,
    pub desktop_batch: BatchSize,
    /// Batch used while the host reports scrolling.
    pub scrolling_batch: BatchSize,
    pub mobile: ParticleProfile,
    pub desktop: ParticleProfile,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            mobile_interval_ms: 1000,
            desktop_interval_ms: 800,
            top_offset: 50.0,
            initial_height_spread: 500.0,
            periodic_height_spread: 800.0,
            base_rotation_speed: 0.8,
            rotation_speed_variation: 1.8,
            min_acceleration: 0.002,
            acceleration_variation: 0.005,
            max_drift: 0.5,
            min_opacity: 0.6,
            opacity_variation: 0.4,
            depth_layers: 10,
            variants: 5,
            mobile_batch: BatchSize {
                base: 2,
                variation: 1,
            },
            desktop_batch: BatchSize {
                base: 3,
                variation: 2,
            },
            scrolling_batch: BatchSize {
                base: 1,
                variation: 1,
            },
            mobile: ParticleProfile::mobile(),
            desktop: ParticleProfile::desktop(),
        }
    }
}

/// Per-frame motion constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    /// Sway is `sin(y / sway_wavelength) * sway_amplitude`.
    pub sway_wavelength: f32,
    pub sway_amplitude: f32,
    /// Multiplier on horizontal drift when not scrolling.
    pub drift_dampening: f32,
    /// Multiplier on horizontal drift while scrolling.
    pub scrolling_drift_dampening: f32,
    /// Overall rotation gain.
    pub spin_gain: f32,
    /// Spin boost is `1 + velocity / spin_divisor`.
    pub spin_divisor: f32,
    /// Rotation wobble is `sin(y / wobble_wavelength) * wobble_amplitude`.
    pub wobble_amplitude: f32,
    pub wobble_wavelength: f32,
    /// Particles are dropped once below `height + removal_margin`.
    pub removal_margin: f32,
    /// Particles are dropped outside `[-margin, width + margin]`.
    pub horizontal_margin: f32,
    /// Duration of one reference frame.
    pub reference_frame_ms: f32,
    /// Upper bound on frames advanced by one driver tick.
    pub max_catch_up_frames: f32,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            sway_wavelength: 200.0,
            sway_amplitude: 1.96,
            drift_dampening: 0.8,
            scrolling_drift_dampening: 0.3,
            spin_gain: 1.2,
            spin_divisor: 5.0,
            wobble_amplitude: 2.0,
            wobble_wavelength: 30.0,
            removal_margin: 1500.0,
            horizontal_margin: 100.0,
            reference_frame_ms: 1000.0 / 60.0,
            max_catch_up_frames: 4.0,
        }
    }
}

/// Settings for one fidelity tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierSettings {
    /// Minimum wall time between executed frames.
    pub frame_interval_ms: u64,
    /// Multiplier on sway amplitude.
    pub sway_scale: f32,
    /// Multiplier on rotation speed.
    pub rotation_scale: f32,
    /// Multiplier on particle opacity.
    pub opacity_scale: f32,
    /// Blur and drop-shadow descriptors.
    pub effects: bool,
}

/// Degradation policy tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FidelityConfig {
    /// Scroll speed (px per 100ms) above which scrolling counts as fast.
    pub fast_scroll_threshold: f32,
    /// Most particles rendered in the minimal tier.
    pub minimal_render_cap: usize,
    pub full: TierSettings,
    pub reduced: TierSettings,
    pub minimal: TierSettings,
}

impl Default for FidelityConfig {
    fn default() -> Self {
        Self {
            fast_scroll_threshold: 30.0,
            minimal_render_cap: 40,
            full: TierSettings {
                frame_interval_ms: 16,
                sway_scale: 1.0,
                rotation_scale: 1.0,
                opacity_scale: 1.0,
                effects: true,
            },
            reduced: TierSettings {
                frame_interval_ms: 33,
                sway_scale: 0.25,
                rotation_scale: 0.25,
                opacity_scale: 0.7,
                effects: false,
            },
            minimal: TierSettings {
                frame_interval_ms: 50,
                sway_scale: 0.25,
                rotation_scale: 0.25,
                opacity_scale: 0.4,
                effects: false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: FieldConfig = toml::from_str(
            r#"
            mobile_max_width = 600.0

            [tiers.large]
            initial = 30
            max = 80

            [fidelity]
            minimal_render_cap = 12
            "#,
        )
        .expect("valid toml");

        assert_eq!(config.mobile_max_width, 600.0);
        assert_eq!(config.tiers.large, TierLimits { initial: 30, max: 80 });
        assert_eq!(config.tiers.small, TierTable::default().small);
        assert_eq!(config.fidelity.minimal_render_cap, 12);
        assert_eq!(config.fidelity.full, FidelityConfig::default().full);
        assert_eq!(config.motion, MotionConfig::default());
    }

    #[test]
    fn test_profile_by_size_class() {
        let config = FieldConfig::default();
        assert!(
            config.profile(SizeClass::Mobile).base_size
                < config.profile(SizeClass::Desktop).base_size
        );
    }
}
