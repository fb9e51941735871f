//! The petal field simulator.

use std::time::Duration;

use log::{debug, trace, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;
use sakura_core::{
    BatchSize, FidelityTier, FieldConfig, ScrollState, SizeClass, TierLimits, Viewport,
    ViewportTier,
};

use crate::descriptor::DrawDescriptor;
use crate::particle::{Particle, StepParams};
use crate::random::RandomSource;

/// Timer state while the field is running.
#[derive(Debug, Clone, Copy, Default)]
struct Schedule {
    /// Time of the last executed frame.
    last_frame: Option<Duration>,
    /// When the spawn timer fires next.
    next_spawn: Option<Duration>,
}

/// A bounded, continuously replenished set of falling petals.
///
/// The field owns its live set and is driven from a single loop: the host
/// calls [`ParticleField::tick`] once per display frame, which runs the
/// spawn timer and, unless the current fidelity tier throttles the frame,
/// advances and renders. [`ParticleField::advance`] is the underlying
/// fixed-step update and can be driven directly.
#[derive(Debug)]
pub struct ParticleField<R: RandomSource = StdRng> {
    config: FieldConfig,
    rng: R,
    /// Live set in creation order.
    particles: Vec<Particle>,
    next_id: u64,
    viewport: Viewport,
    scroll: ScrollState,
    low_powered: bool,
    /// `Some` while started.
    schedule: Option<Schedule>,
    last_tier: FidelityTier,
}

impl ParticleField<StdRng> {
    /// Create a field with a reproducible random sequence.
    pub fn seeded(config: FieldConfig, seed: u64) -> Self {
        Self::new(config, StdRng::seed_from_u64(seed))
    }

    /// Create a field seeded from the operating system.
    pub fn from_entropy(config: FieldConfig) -> Self {
        Self::new(config, StdRng::from_os_rng())
    }
}

impl<R: RandomSource> ParticleField<R> {
    /// Create a stopped, empty field.
    pub fn new(config: FieldConfig, rng: R) -> Self {
        let viewport = config.fallback_viewport;
        Self {
            config,
            rng,
            particles: Vec::new(),
            next_id: 0,
            viewport,
            scroll: ScrollState::idle(),
            low_powered: false,
            schedule: None,
            last_tier: FidelityTier::Full,
        }
    }

    /// Seed the initial batch and arm the frame loop and spawn timer.
    ///
    /// Starting a running field re-arms its timers without adding a second
    /// loop. Starting a stopped field resumes it, topping the live set up
    /// to the tier's initial count.
    pub fn start(&mut self, viewport: Viewport) {
        self.viewport = self.resolve(viewport);

        if self.schedule.is_some() {
            debug!("petal field already running, re-arming timers");
            self.enforce_cap();
            self.schedule = Some(Schedule::default());
            return;
        }

        self.enforce_cap();
        let limits = self.limits();
        let missing = limits.initial.min(limits.max).saturating_sub(self.particles.len());
        let spread = self.config.spawn.initial_height_spread;
        for _ in 0..missing {
            let x = self.rng.next_unit() * self.viewport.width;
            let y = -self.config.spawn.top_offset - self.rng.next_unit() * spread;
            let particle = self.create(x, y);
            self.particles.push(particle);
        }

        self.schedule = Some(Schedule::default());
        debug!(
            "petal field started: {}x{} viewport, {:?} tier, {} petals (max {})",
            self.viewport.width,
            self.viewport.height,
            self.viewport_tier(),
            self.particles.len(),
            limits.max
        );
    }

    /// Cancel the frame loop and the spawn timer. Safe to call repeatedly.
    pub fn stop(&mut self) {
        if self.schedule.take().is_some() {
            debug!("petal field stopped with {} petals", self.particles.len());
        }
    }

    /// Whether the field has been started and not stopped.
    pub fn is_running(&self) -> bool {
        self.schedule.is_some()
    }

    /// Store new viewport dimensions. Existing particles keep their
    /// positions; on a running field a shrink into a smaller tier evicts
    /// the oldest ones down to the new maximum. A stopped field is left
    /// alone until the next `start`.
    pub fn on_viewport_resize(&mut self, viewport: Viewport) {
        self.viewport = self.resolve(viewport);
        if self.schedule.is_some() {
            self.enforce_cap();
        }
        debug!(
            "petal field resized to {}x{} ({:?} tier)",
            self.viewport.width,
            self.viewport.height,
            self.viewport_tier()
        );
    }

    /// Update the scroll signal. The latest call wins.
    pub fn set_scroll_state(&mut self, is_scrolling: bool, scroll_speed: f32) {
        self.scroll = ScrollState::new(is_scrolling, scroll_speed);
    }

    /// Mark the host device as low-powered.
    pub fn set_low_powered(&mut self, low_powered: bool) {
        self.low_powered = low_powered;
    }

    /// Low-powered by host classification or by a mobile-sized viewport.
    pub fn is_low_powered(&self) -> bool {
        self.low_powered || self.size_class().is_mobile()
    }

    /// Run one display frame at wall time `now`.
    ///
    /// Returns the frame's draw descriptors, or `None` when the field is
    /// stopped or the frame was throttled away. The host keeps painting its
    /// previous descriptors in that case.
    pub fn tick(&mut self, now: Duration) -> Option<Vec<DrawDescriptor>> {
        let mut schedule = self.schedule?;

        let interval = self.spawn_interval();
        match schedule.next_spawn {
            None => schedule.next_spawn = Some(now + interval),
            Some(due) if now >= due => {
                self.spawn_batch();
                // Fire at most once per tick; a stalled host does not get a burst.
                let next = due + interval;
                schedule.next_spawn = Some(if next <= now { now + interval } else { next });
            }
            Some(_) => {}
        }

        let tier = self.fidelity();
        if tier != self.last_tier {
            trace!("fidelity {} -> {}", self.last_tier.label(), tier.label());
            self.last_tier = tier;
        }

        let frame_interval =
            Duration::from_millis(tier.settings(&self.config.fidelity).frame_interval_ms);
        let dt = match schedule.last_frame {
            Some(last) => {
                let elapsed = now.saturating_sub(last);
                if elapsed < frame_interval {
                    self.schedule = Some(schedule);
                    return None;
                }
                let frame_ms = self.config.motion.reference_frame_ms.max(1.0);
                (elapsed.as_secs_f32() * 1000.0 / frame_ms)
                    .min(self.config.motion.max_catch_up_frames.max(1.0))
            }
            None => 1.0,
        };
        schedule.last_frame = Some(now);
        self.schedule = Some(schedule);

        self.advance(dt);
        Some(self.render())
    }

    /// Advance every live particle by `dt` reference frames and drop those
    /// that left the retention region. Does nothing while stopped.
    pub fn advance(&mut self, dt: f32) {
        if self.schedule.is_none() || !dt.is_finite() || dt <= 0.0 {
            return;
        }

        let params = self.step_params(self.fidelity());
        let viewport = self.viewport;
        let removal_margin = self.config.motion.removal_margin;
        let horizontal_margin = self.config.motion.horizontal_margin;

        self.particles.retain_mut(|particle| {
            particle.step(dt, &params);
            particle.is_retained(viewport, removal_margin, horizontal_margin)
        });
    }

    /// Fire the spawn timer once: append a batch spread across the width,
    /// then evict the oldest particles above the tier maximum.
    ///
    /// Returns the number of particles created.
    pub fn spawn_batch(&mut self) -> usize {
        if self.schedule.is_none() {
            return 0;
        }

        let batch = self.batch_size();
        let count = batch.base + (self.rng.next_unit() * batch.variation as f32) as usize;
        let lane = self.viewport.width / count.max(1) as f32;
        let spread = self.config.spawn.periodic_height_spread;

        for i in 0..count {
            let x = lane * i as f32 + self.rng.next_unit() * lane;
            let y = -self.config.spawn.top_offset - self.rng.next_unit() * spread;
            let particle = self.create(x, y);
            self.particles.push(particle);
        }

        self.enforce_cap();

        trace!(
            "spawned {count} petals, {} live (max {})",
            self.particles.len(),
            self.limits().max
        );
        count
    }

    /// Draw descriptors for the visible particles under the current tier.
    ///
    /// The minimal tier renders a capped subset of the live set; no tier
    /// renders nothing while particles are visible. Output is ordered by
    /// depth layer.
    pub fn render(&self) -> Vec<DrawDescriptor> {
        let tier = self.fidelity();
        let settings = tier.settings(&self.config.fidelity);
        let cap = match tier {
            FidelityTier::Minimal => self.config.fidelity.minimal_render_cap.max(1),
            FidelityTier::Full | FidelityTier::Reduced => usize::MAX,
        };

        let mut descriptors: Vec<DrawDescriptor> = self
            .particles
            .iter()
            .filter(|p| p.is_visible(self.viewport))
            .take(cap)
            .map(|p| DrawDescriptor::new(p, self.viewport, settings))
            .collect();
        descriptors.sort_by_key(|d| d.depth_layer);
        descriptors
    }

    /// Fidelity tier for the current signals.
    pub fn fidelity(&self) -> FidelityTier {
        FidelityTier::select(
            self.scroll,
            self.is_low_powered(),
            self.config.fidelity.fast_scroll_threshold,
        )
    }

    /// The live set, oldest first.
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn scroll_state(&self) -> ScrollState {
        self.scroll
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    pub fn viewport_tier(&self) -> ViewportTier {
        ViewportTier::classify(self.viewport, &self.config.tiers)
    }

    pub fn size_class(&self) -> SizeClass {
        SizeClass::classify(self.viewport, self.config.mobile_max_width)
    }

    /// Maximum live set size for the current viewport.
    pub fn max_particles(&self) -> usize {
        self.limits().max
    }

    /// Spawn timer period for the current viewport.
    pub fn spawn_interval(&self) -> Duration {
        let ms = match self.size_class() {
            SizeClass::Mobile => self.config.spawn.mobile_interval_ms,
            SizeClass::Desktop => self.config.spawn.desktop_interval_ms,
        };
        Duration::from_millis(ms.max(1))
    }

    fn limits(&self) -> TierLimits {
        self.viewport_tier().limits(&self.config.tiers)
    }

    /// Evict the oldest particles above the current tier maximum.
    fn enforce_cap(&mut self) {
        let max = self.limits().max;
        if self.particles.len() > max {
            let excess = self.particles.len() - max;
            self.particles.drain(..excess);
            trace!("evicted {excess} petals over the cap of {max}");
        }
    }

    fn batch_size(&self) -> BatchSize {
        if self.scroll.is_scrolling {
            self.config.spawn.scrolling_batch
        } else {
            match self.size_class() {
                SizeClass::Mobile => self.config.spawn.mobile_batch,
                SizeClass::Desktop => self.config.spawn.desktop_batch,
            }
        }
    }

    fn resolve(&self, viewport: Viewport) -> Viewport {
        if !viewport.is_known() {
            warn!(
                "viewport {}x{} unknown, using {}x{}",
                viewport.width,
                viewport.height,
                self.config.fallback_viewport.width,
                self.config.fallback_viewport.height
            );
        }
        viewport.or(self.config.fallback_viewport)
    }

    fn create(&mut self, x: f32, y: f32) -> Particle {
        let id = self.next_id;
        self.next_id += 1;
        let profile = self.config.profile(self.size_class());
        Particle::spawn(id, x, y, profile, &self.config.spawn, &mut self.rng)
    }

    fn step_params(&self, tier: FidelityTier) -> StepParams {
        let motion = &self.config.motion;
        let settings = tier.settings(&self.config.fidelity);
        StepParams {
            sway_wavelength: motion.sway_wavelength.max(1.0),
            sway_amplitude: motion.sway_amplitude * settings.sway_scale,
            drift_dampening: if self.scroll.is_scrolling {
                motion.scrolling_drift_dampening
            } else {
                motion.drift_dampening
            },
            rotation_scale: settings.rotation_scale,
            spin_gain: motion.spin_gain,
            spin_divisor: motion.spin_divisor.max(f32::EPSILON),
            wobble_amplitude: motion.wobble_amplitude,
            wobble_wavelength: motion.wobble_wavelength.max(1.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::ScriptedSource;

    const DESKTOP: Viewport = Viewport::new(1920.0, 1080.0);

    fn desktop_field(seed: u64) -> ParticleField {
        let mut field = ParticleField::seeded(FieldConfig::default(), seed);
        field.start(DESKTOP);
        field
    }

    /// Replace the live set with `count` particles spread over the viewport.
    fn fill_visible<R: RandomSource>(field: &mut ParticleField<R>, count: usize) {
        field.particles.clear();
        let viewport = field.viewport;
        for i in 0..count {
            let x = (i as f32 * 37.0) % (viewport.width - 60.0);
            let y = (i as f32 * 53.0) % (viewport.height - 60.0);
            let particle = field.create(x, y);
            field.particles.push(particle);
        }
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_desktop_start_seeds_initial_count() {
        let field = desktop_field(1);
        assert!(field.is_running());
        assert_eq!(field.viewport_tier(), ViewportTier::Large);
        assert_eq!(field.len(), 45);
        assert_eq!(field.max_particles(), 120);
        assert!(
            field
                .particles()
                .iter()
                .all(|p| p.y <= -50.0 && p.y >= -550.0)
        );
    }

    #[test]
    fn test_growth_is_capped() {
        let mut field = desktop_field(2);
        for _ in 0..100 {
            field.spawn_batch();
            assert!(field.len() <= field.max_particles());
        }
        assert_eq!(field.len(), 120);
    }

    #[test]
    fn test_cap_evicts_oldest_first() {
        let mut field = desktop_field(3);
        for _ in 0..100 {
            field.spawn_batch();
        }
        let oldest = field.particles()[0].id;
        field.spawn_batch();
        assert!(field.particles()[0].id > oldest);
    }

    #[test]
    fn test_ids_strictly_increase() {
        let mut field = desktop_field(4);
        let mut highest_seen = None;
        for frame in 0..2_000u64 {
            field.tick(ms(frame * 17));
            for pair in field.particles().windows(2) {
                assert!(pair[0].id < pair[1].id);
            }
            if let Some(last) = field.particles().last() {
                if let Some(seen) = highest_seen {
                    assert!(last.id >= seen);
                }
                highest_seen = Some(last.id);
            }
        }
    }

    #[test]
    fn test_live_set_stays_above_removal_line() {
        let mut field = desktop_field(5);
        let limit = DESKTOP.height + field.config().motion.removal_margin;
        for frame in 0..10_000u64 {
            field.tick(ms(frame * 17));
            assert!(field.particles().iter().all(|p| p.y <= limit));
            assert!(field.len() <= field.max_particles());
        }
    }

    #[test]
    fn test_particle_evicted_on_frame_1176() {
        let mut field = ParticleField::seeded(FieldConfig::default(), 6);
        field.start(Viewport::new(1920.0, 800.0));
        field.particles.clear();

        let mut particle = field.create(960.0, -50.0);
        particle.fall_speed = 2.0;
        particle.acceleration = 0.0;
        particle.horizontal_drift = 0.0;
        let id = particle.id;
        field.particles.push(particle);

        for _ in 0..1175 {
            field.advance(1.0);
        }
        let survivor = field.particles().iter().find(|p| p.id == id);
        assert_eq!(survivor.map(|p| p.y), Some(2300.0));

        field.advance(1.0);
        assert!(field.particles().iter().all(|p| p.id != id));
    }

    #[test]
    fn test_stop_is_idempotent() {
        let mut field = desktop_field(7);
        for frame in 0..30u64 {
            field.tick(ms(frame * 17));
        }
        field.stop();
        field.stop();
        assert!(!field.is_running());

        let frozen = field.particles().to_vec();
        assert_eq!(field.tick(ms(5_000)), None);
        field.advance(1.0);
        assert_eq!(field.spawn_batch(), 0);
        assert_eq!(field.particles(), frozen.as_slice());
    }

    #[test]
    fn test_restart_does_not_reseed_running_field() {
        let mut field = desktop_field(8);
        field.start(DESKTOP);
        assert_eq!(field.len(), 45);

        field.stop();
        field.particles.truncate(10);
        field.start(DESKTOP);
        assert_eq!(field.len(), 45);
    }

    #[test]
    fn test_same_seed_same_positions() {
        let mut a = desktop_field(99);
        let mut b = desktop_field(99);
        for frame in 0..600 {
            if frame % 48 == 0 {
                a.spawn_batch();
                b.spawn_batch();
            }
            a.advance(1.0);
            b.advance(1.0);
        }

        assert_eq!(a.len(), b.len());
        for (pa, pb) in a.particles().iter().zip(b.particles()) {
            assert_eq!(pa.id, pb.id);
            assert_eq!(pa.x.to_bits(), pb.x.to_bits());
            assert_eq!(pa.y.to_bits(), pb.y.to_bits());
            assert_eq!(pa.rotation.to_bits(), pb.rotation.to_bits());
        }
    }

    #[test]
    fn test_fast_scroll_on_low_power_caps_render() {
        let mut field = desktop_field(10);
        field.set_low_powered(true);
        fill_visible(&mut field, 100);

        field.set_scroll_state(true, 80.0);
        assert_eq!(field.fidelity(), FidelityTier::Minimal);

        let frame = field.tick(ms(0)).expect("first frame runs");
        assert!(!frame.is_empty());
        assert!(frame.len() <= 40);
        assert!(frame.iter().all(|d| d.effects.is_none()));
        assert!(field.len() > 40);
    }

    #[test]
    fn test_fast_scroll_without_low_power_renders_all() {
        let mut field = desktop_field(11);
        fill_visible(&mut field, 100);

        field.set_scroll_state(true, 80.0);
        assert_eq!(field.fidelity(), FidelityTier::Reduced);
        assert_eq!(field.render().len(), 100);
    }

    #[test]
    fn test_mobile_viewport_counts_as_low_powered() {
        let mut field = ParticleField::seeded(FieldConfig::default(), 12);
        field.start(Viewport::new(390.0, 844.0));
        assert_eq!(field.size_class(), SizeClass::Mobile);
        field.set_scroll_state(true, 80.0);
        assert_eq!(field.fidelity(), FidelityTier::Minimal);
    }

    #[test]
    fn test_recovery_to_full_is_immediate() {
        let mut field = desktop_field(13);
        field.set_low_powered(true);
        fill_visible(&mut field, 60);

        field.set_scroll_state(true, 80.0);
        let degraded = field.tick(ms(0)).expect("first frame runs");
        assert!(degraded.len() <= 40);

        field.set_scroll_state(false, 0.0);
        assert_eq!(field.fidelity(), FidelityTier::Full);
        let frame = field.tick(ms(50)).expect("full frame runs");
        assert!(frame.len() > 40);
        assert!(frame.iter().all(|d| d.effects.is_some()));
    }

    #[test]
    fn test_scrolling_throttles_frames() {
        let mut field = desktop_field(14);
        assert!(field.tick(ms(0)).is_some());
        assert!(field.tick(ms(17)).is_some());

        field.set_scroll_state(true, 10.0);
        assert_eq!(field.fidelity(), FidelityTier::Reduced);
        assert!(field.tick(ms(34)).is_none());
        assert!(field.tick(ms(50)).is_some());
    }

    #[test]
    fn test_scroll_state_is_reread_each_frame() {
        let mut field = desktop_field(15);
        assert!(field.tick(ms(0)).is_some());
        field.set_scroll_state(true, 10.0);
        assert!(field.tick(ms(20)).is_none());
        field.set_scroll_state(false, 0.0);
        assert!(field.tick(ms(20)).is_some());
    }

    #[test]
    fn test_spawn_timer_fires_from_tick() {
        let mut field = desktop_field(16);
        let before = field.len();
        let mut now = 0;
        while now <= 850 {
            field.tick(ms(now));
            now += 17;
        }
        // One 800ms interval elapsed; early petals are still far above the fold.
        assert!(field.len() >= before + 3);
    }

    #[test]
    fn test_scrolling_spawns_smaller_batches() {
        let mut field = ParticleField::new(FieldConfig::default(), ScriptedSource::constant(0.5));
        field.start(DESKTOP);
        assert_eq!(field.spawn_batch(), 4);

        field.set_scroll_state(true, 5.0);
        assert_eq!(field.spawn_batch(), 1);
    }

    #[test]
    fn test_unknown_viewport_uses_fallback() {
        let mut field = ParticleField::seeded(FieldConfig::default(), 17);
        field.start(Viewport::new(0.0, 0.0));
        assert_eq!(field.viewport(), FieldConfig::default().fallback_viewport);
        assert_eq!(field.len(), 45);

        field.on_viewport_resize(Viewport::new(f32::NAN, 300.0));
        assert_eq!(field.viewport(), FieldConfig::default().fallback_viewport);
    }

    #[test]
    fn test_resize_changes_tier_not_particles() {
        let mut field = ParticleField::seeded(FieldConfig::default(), 18);
        field.start(Viewport::new(600.0, 400.0));
        assert_eq!(field.viewport_tier(), ViewportTier::Small);
        let before = field.particles().to_vec();

        field.on_viewport_resize(DESKTOP);
        assert_eq!(field.viewport_tier(), ViewportTier::Large);
        assert_eq!(field.max_particles(), 120);
        assert_eq!(field.particles(), before.as_slice());
    }

    #[test]
    fn test_resize_to_smaller_tier_trims_live_set() {
        let mut field = desktop_field(21);
        for _ in 0..100 {
            field.spawn_batch();
        }
        assert_eq!(field.len(), 120);
        let newest = field.particles().last().map(|p| p.id);

        field.on_viewport_resize(Viewport::new(1920.0, 250.0));
        assert_eq!(field.viewport_tier(), ViewportTier::Small);
        assert_eq!(field.max_particles(), 60);
        assert_eq!(field.len(), 60);
        assert_eq!(field.particles().last().map(|p| p.id), newest);

        for frame in 0..40 {
            field.tick(ms(frame * 17));
            assert!(field.len() <= field.max_particles());
        }
    }

    #[test]
    fn test_shrink_while_stopped_trims_on_start() {
        let mut field = desktop_field(22);
        for _ in 0..100 {
            field.spawn_batch();
        }
        field.stop();
        field.on_viewport_resize(Viewport::new(1920.0, 250.0));
        assert_eq!(field.len(), 120);

        field.start(Viewport::new(1920.0, 250.0));
        assert!(field.is_running());
        assert_eq!(field.len(), 60);

        // Re-arming a running field applies the cap as well.
        field.on_viewport_resize(DESKTOP);
        for _ in 0..100 {
            field.spawn_batch();
        }
        field.start(Viewport::new(600.0, 400.0));
        assert_eq!(field.len(), field.max_particles());
    }

    #[test]
    fn test_tick_before_start_is_noop() {
        let mut field = ParticleField::seeded(FieldConfig::default(), 19);
        assert_eq!(field.tick(ms(0)), None);
        assert!(field.is_empty());
    }

    #[test]
    fn test_render_orders_by_depth() {
        let mut field = desktop_field(20);
        fill_visible(&mut field, 50);
        let frame = field.render();
        assert!(frame.windows(2).all(|w| w[0].depth_layer <= w[1].depth_layer));
        assert!(frame.iter().all(|d| (0.0..360.0).contains(&d.rotation)));
    }
}
