//! Render-ready particle descriptions handed to the host.

use sakura_core::{TierSettings, Viewport};

use crate::particle::Particle;

/// Largest tilt from rotation alone, in degrees.
const TILT_AMPLITUDE: f32 = 25.0;
/// Radians of tilt phase per degree of rotation.
const TILT_RATE: f32 = 0.01;
const TILT_WOBBLE_AMPLITUDE: f32 = 10.0;
/// Fall distance in pixels per radian of tilt wobble.
const TILT_WOBBLE_WAVELENGTH: f32 = 50.0;

/// Optional visual effects, only produced at full fidelity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Effects {
    /// Blur radius in pixels.
    pub blur: f32,
    /// Drop shadow vertical offset in pixels.
    pub shadow_offset: f32,
    /// Drop shadow blur radius in pixels.
    pub shadow_blur: f32,
    /// Drop shadow opacity in `[0, 0.2]`.
    pub shadow_opacity: f32,
    /// Tilt about the horizontal axis in degrees, including a wobble that
    /// follows the fall.
    pub tilt_x: f32,
    /// Tilt about the vertical axis in degrees.
    pub tilt_y: f32,
}

/// Everything the host needs to paint one particle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawDescriptor {
    pub id: u64,
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub scale: f32,
    /// Rotation in `[0, 360)` degrees.
    pub rotation: f32,
    pub opacity: f32,
    pub depth_layer: u8,
    pub variant: u8,
    pub effects: Option<Effects>,
}

impl DrawDescriptor {
    /// Describe `particle` under the given tier settings.
    pub fn new(particle: &Particle, viewport: Viewport, settings: &TierSettings) -> Self {
        let effects = settings.effects.then(|| Effects {
            blur: ((1.0 - particle.scale) * 0.5).max(0.0),
            shadow_offset: particle.fall_speed * 2.0,
            shadow_blur: particle.fall_speed,
            shadow_opacity: (particle.y / viewport.height * 0.3).clamp(0.0, 0.2),
            tilt_x: (particle.rotation * TILT_RATE).sin() * TILT_AMPLITUDE
                + (particle.y / TILT_WOBBLE_WAVELENGTH).sin() * TILT_WOBBLE_AMPLITUDE,
            tilt_y: (particle.rotation * TILT_RATE).cos() * TILT_AMPLITUDE,
        });

        // rem_euclid can round up to exactly 360 for tiny negative angles.
        let rotation = particle.rotation.rem_euclid(360.0);
        let rotation = if rotation >= 360.0 { 0.0 } else { rotation };

        Self {
            id: particle.id,
            x: particle.x,
            y: particle.y,
            size: particle.size,
            scale: particle.scale,
            rotation,
            opacity: (particle.opacity * settings.opacity_scale).clamp(0.0, 1.0),
            depth_layer: particle.depth_layer,
            variant: particle.variant,
            effects,
        }
    }
}

#[cfg(test)]
mod tests {
    use sakura_core::{FidelityConfig, SpawnConfig};

    use super::*;
    use crate::random::ScriptedSource;

    fn particle(y: f32, rotation: f32) -> Particle {
        let spawn = SpawnConfig::default();
        let mut p = Particle::spawn(
            7,
            100.0,
            y,
            &spawn.desktop,
            &spawn,
            &mut ScriptedSource::constant(0.5),
        );
        p.rotation = rotation;
        p
    }

    #[test]
    fn test_full_fidelity_tilts_with_rotation() {
        let viewport = Viewport::new(1920.0, 1080.0);
        let full = FidelityConfig::default().full;

        let flat = DrawDescriptor::new(&particle(0.0, 0.0), viewport, &full);
        let effects = flat.effects.expect("full fidelity has effects");
        assert_eq!(effects.tilt_x, 0.0);
        assert_eq!(effects.tilt_y, 25.0);

        let turned = DrawDescriptor::new(&particle(0.0, 157.0), viewport, &full);
        let effects = turned.effects.expect("full fidelity has effects");
        assert!(effects.tilt_x > 24.9);
        assert!(effects.tilt_y.abs() < 0.1);
    }

    #[test]
    fn test_tilt_wobbles_with_fall() {
        let viewport = Viewport::new(1920.0, 1080.0);
        let full = FidelityConfig::default().full;
        let y = 50.0 * std::f32::consts::FRAC_PI_2;
        let d = DrawDescriptor::new(&particle(y, 0.0), viewport, &full);
        let effects = d.effects.expect("full fidelity has effects");
        assert!((effects.tilt_x - 10.0).abs() < 1e-3);
        assert_eq!(effects.tilt_y, 25.0);
    }

    #[test]
    fn test_degraded_tiers_drop_effects() {
        let viewport = Viewport::new(1920.0, 1080.0);
        let fidelity = FidelityConfig::default();
        let p = particle(300.0, -30.0);
        for settings in [&fidelity.reduced, &fidelity.minimal] {
            let d = DrawDescriptor::new(&p, viewport, settings);
            assert_eq!(d.effects, None);
            assert_eq!(d.rotation, 330.0);
            assert!(d.opacity < p.opacity);
        }
    }
}
