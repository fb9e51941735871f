//! A single falling petal.

use sakura_core::{ParticleProfile, SpawnConfig, Viewport};

use crate::random::RandomSource;

/// One decorative falling particle.
///
/// All parameters except position, rotation and fall speed are fixed at
/// creation. Only [`Particle::step`] mutates a live particle.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    /// Sequence number, unique within a field.
    pub id: u64,
    /// Horizontal position in pixels.
    pub x: f32,
    /// Vertical position in pixels, growing downward.
    pub y: f32,
    /// Edge length in pixels.
    pub size: f32,
    /// Visual scale factor.
    pub scale: f32,
    /// Rotation in degrees, unbounded.
    pub rotation: f32,
    /// Signed degrees per frame.
    pub rotation_speed: f32,
    /// Sign of `rotation_speed`, used for wobble.
    pub rotation_direction: f32,
    /// Pixels per frame, grows by `acceleration` every frame.
    pub fall_speed: f32,
    /// Pixels per frame squared.
    pub acceleration: f32,
    /// Constant signed horizontal bias.
    pub horizontal_drift: f32,
    pub opacity: f32,
    /// Stacking order, higher is drawn later.
    pub depth_layer: u8,
    /// Glyph index.
    pub variant: u8,
}

/// Motion parameters for one advance step, derived from the fidelity tier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepParams {
    pub sway_wavelength: f32,
    pub sway_amplitude: f32,
    pub drift_dampening: f32,
    pub rotation_scale: f32,
    pub spin_gain: f32,
    pub spin_divisor: f32,
    pub wobble_amplitude: f32,
    pub wobble_wavelength: f32,
}

impl Particle {
    /// Create a particle at `(x, y)` drawing its remaining parameters from
    /// `rng`.
    pub fn spawn<R: RandomSource + ?Sized>(
        id: u64,
        x: f32,
        y: f32,
        profile: &ParticleProfile,
        spawn: &SpawnConfig,
        rng: &mut R,
    ) -> Self {
        let scale = rng.spread(profile.base_scale, profile.scale_variation);
        let size = rng.spread(profile.base_size, profile.size_variation);
        let largest = profile.base_size + profile.size_variation;
        let size_ratio = if largest > 0.0 { size / largest } else { 1.0 };

        let base_rotation = rng.spread(spawn.base_rotation_speed, spawn.rotation_speed_variation);
        let rotation_direction = if rng.next_unit() > 0.5 { 1.0 } else { -1.0 };
        // Smaller petals spin faster, larger ones fall faster.
        let rotation_speed = if size_ratio > 0.0 {
            base_rotation * rotation_direction / size_ratio
        } else {
            base_rotation * rotation_direction
        };
        let fall_speed =
            rng.spread(profile.base_fall_speed, profile.fall_speed_variation) * size_ratio;

        let horizontal_drift = (rng.next_unit() - 0.5) * spawn.max_drift;
        let acceleration = rng.spread(spawn.min_acceleration, spawn.acceleration_variation);

        Self {
            id,
            x,
            y,
            size,
            scale,
            rotation: rng.spread(0.0, 360.0),
            rotation_speed,
            rotation_direction,
            fall_speed,
            acceleration,
            horizontal_drift,
            opacity: rng.spread(spawn.min_opacity, spawn.opacity_variation),
            depth_layer: rng.index(spawn.depth_layers as usize) as u8,
            variant: rng.index(spawn.variants as usize) as u8,
        }
    }

    /// Advance by `dt` reference frames.
    pub fn step(&mut self, dt: f32, params: &StepParams) {
        self.fall_speed += self.acceleration * dt;

        // Sway phase comes from position, so motion resumes cleanly after a pause.
        let sway = (self.y / params.sway_wavelength).sin() * params.sway_amplitude;
        self.x += (self.horizontal_drift * params.drift_dampening + sway) * dt;
        self.y += self.fall_speed * dt;

        let spin_boost = 1.0 + self.fall_speed / params.spin_divisor;
        let wobble = (self.y / params.wobble_wavelength).sin()
            * params.wobble_amplitude
            * self.rotation_direction;
        self.rotation += (self.rotation_speed * params.spin_gain * spin_boost + wobble)
            * params.rotation_scale
            * dt;
    }

    /// Whether the particle is still inside the retention region.
    ///
    /// A particle survives until its `y` exceeds `height + removal_margin`
    /// or its `x` leaves `[-horizontal_margin, width + horizontal_margin]`.
    pub fn is_retained(
        &self,
        viewport: Viewport,
        removal_margin: f32,
        horizontal_margin: f32,
    ) -> bool {
        self.y <= viewport.height + removal_margin
            && self.x >= -horizontal_margin
            && self.x <= viewport.width + horizontal_margin
    }

    /// Whether any part of the particle overlaps the viewport.
    pub fn is_visible(&self, viewport: Viewport) -> bool {
        self.y + self.size > 0.0
            && self.y < viewport.height
            && self.x + self.size > 0.0
            && self.x < viewport.width
    }
}
