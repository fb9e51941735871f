//! Pluggable source of randomness for particle creation.

use rand::{Rng, RngCore};

/// Uniform draws in `[0, 1)`.
///
/// Every random parameter of a particle goes through this trait, so a
/// seeded or scripted source makes the whole field reproducible.
pub trait RandomSource {
    /// Next draw in `[0, 1)`.
    fn next_unit(&mut self) -> f32;

    /// Draw in `[base, base + spread)`.
    fn spread(&mut self, base: f32, spread: f32) -> f32 {
        base + self.next_unit() * spread
    }

    /// Index in `0..len`. Returns 0 when `len` is 0.
    fn index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        ((self.next_unit() * len as f32) as usize).min(len - 1)
    }
}

impl<R: RngCore> RandomSource for R {
    fn next_unit(&mut self) -> f32 {
        self.random::<f32>()
    }
}

/// Replays a fixed list of draws, cycling when exhausted.
#[derive(Debug, Clone)]
pub struct ScriptedSource {
    draws: Vec<f32>,
    cursor: usize,
}

impl ScriptedSource {
    /// Create a source from draws; values are clamped into `[0, 1)`.
    pub fn new(draws: impl Into<Vec<f32>>) -> Self {
        let mut draws: Vec<f32> = draws.into();
        if draws.is_empty() {
            draws.push(0.5);
        }
        for d in &mut draws {
            *d = d.clamp(0.0, 1.0 - f32::EPSILON);
        }
        Self { draws, cursor: 0 }
    }

    /// Every draw returns `value`.
    pub fn constant(value: f32) -> Self {
        Self::new(vec![value])
    }
}

impl RandomSource for ScriptedSource {
    fn next_unit(&mut self) -> f32 {
        let value = self.draws[self.cursor % self.draws.len()];
        self.cursor = self.cursor.wrapping_add(1);
        value
    }
}
