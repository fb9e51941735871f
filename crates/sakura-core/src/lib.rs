//! Core types shared by the sakura crates.
//!
//! Viewport classification, scroll signals, fidelity tiers and the tunables
//! that drive the petal field all live here so that the simulator, the
//! configuration loader and the terminal host agree on one vocabulary.

mod fidelity;
mod scroll;
mod tuning;
mod viewport;

pub use fidelity::FidelityTier;
pub use scroll::ScrollState;
pub use tuning::{
    BatchSize, FidelityConfig, FieldConfig, MotionConfig, ParticleProfile, SpawnConfig,
    TierLimits, TierSettings, TierTable,
};
pub use viewport::{SizeClass, Viewport, ViewportTier};
