//! Falling petal particle field.
//!
//! This crate simulates a bounded, continuously replenished set of petals
//! that fall down a viewport with sway and rotation. The host drives it
//! once per display frame and paints the returned draw descriptors; while
//! the host reports scrolling the field drops to cheaper fidelity tiers
//! without ever stalling or going blank.

mod descriptor;
mod field;
mod particle;
mod random;
mod tracker;

pub use descriptor::{DrawDescriptor, Effects};
pub use field::ParticleField;
pub use particle::{Particle, StepParams};
pub use random::{RandomSource, ScriptedSource};
pub use tracker::ScrollTracker;
