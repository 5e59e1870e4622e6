//! Vehicle-level coordinator for per-wheel surface particle emitters.

use bevy::prelude::*;

use crate::backend::ParticleBackend;
use crate::data::{SlipCoefficients, SurfaceParticleSettings};
use crate::effect::{EffectContext, VehicleEffect};
use crate::emitter::SurfaceParticleEmitter;
use crate::error::SurfaceParticleError;
use crate::vehicle::WheelId;

/// Owns one [`SurfaceParticleEmitter`] per wheel and the vehicle-wide tuning
/// pushed into them every frame.
///
/// The emitter list is built once by [`initialize`](VehicleEffect::initialize)
/// and never resized afterwards.
#[derive(Component, Debug, Default)]
pub struct SurfaceParticleManager {
    /// Slip, size and emission multipliers shared by every wheel.
    pub coefficients: SlipCoefficients,
    /// Emit fully or not at all, with no smoothing in between.
    pub binary_emission: bool,
    emitters: Vec<SurfaceParticleEmitter>,
    init_failures: Vec<SurfaceParticleError>,
    initialized: bool,
    active: bool,
    particle_count: usize,
}

impl SurfaceParticleManager {
    pub fn new(settings: SurfaceParticleSettings) -> Self {
        Self {
            coefficients: settings.coefficients,
            binary_emission: settings.binary_emission,
            ..default()
        }
    }

    pub fn settings(&self) -> SurfaceParticleSettings {
        SurfaceParticleSettings {
            coefficients: self.coefficients,
            binary_emission: self.binary_emission,
        }
    }

    pub fn apply_settings(&mut self, settings: &SurfaceParticleSettings) {
        self.coefficients = settings.coefficients;
        self.binary_emission = settings.binary_emission;
    }

    /// Live particles across all wheels after the last update.
    pub fn active_particle_count(&self) -> usize {
        self.particle_count
    }

    /// Emitters that initialized successfully, in wheel order.
    pub fn emitters(&self) -> &[SurfaceParticleEmitter] {
        &self.emitters
    }

    pub fn emitter(&self, wheel: WheelId) -> Option<&SurfaceParticleEmitter> {
        self.emitters.iter().find(|e| e.wheel() == wheel)
    }

    /// Wheels that could not get an emitter during initialization.
    pub fn init_failures(&self) -> &[SurfaceParticleError] {
        &self.init_failures
    }
}

impl VehicleEffect for SurfaceParticleManager {
    fn name(&self) -> &'static str {
        "Surface Particles"
    }

    fn initialize(&mut self, ctx: &mut EffectContext) {
        if self.initialized {
            warn!("{} already initialized, ignoring", self.name());
            return;
        }

        for index in 0..ctx.vehicle.wheel_count() {
            let mut emitter = SurfaceParticleEmitter::new(WheelId(index));
            match emitter.initialize(ctx) {
                Ok(()) => {
                    if self.active {
                        emitter.enable(ctx.backend);
                    }
                    self.emitters.push(emitter);
                }
                Err(e) => {
                    warn!("Surface particles disabled for wheel {}: {}", index, e);
                    self.init_failures.push(e);
                }
            }
        }
        self.initialized = true;

        info!(
            "Initialized surface particles: {} emitters, {} failed",
            self.emitters.len(),
            self.init_failures.len()
        );
    }

    fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn update(&mut self, ctx: &mut EffectContext) {
        self.particle_count = 0;

        if !self.active {
            return;
        }

        let settings = self.settings();
        for emitter in &mut self.emitters {
            self.particle_count += emitter.update(&settings, ctx);
        }
    }

    /// Emission follows the frame update only; particles need no physics sync.
    fn fixed_update(&mut self, _ctx: &mut EffectContext) {}

    fn enable(&mut self, backend: &mut dyn ParticleBackend) {
        if !self.active {
            debug!("{} enabled", self.name());
        }
        self.active = true;
        for emitter in &mut self.emitters {
            emitter.enable(backend);
        }
    }

    fn disable(&mut self, backend: &mut dyn ParticleBackend) {
        if self.active {
            debug!("{} disabled", self.name());
        }
        self.active = false;
        for emitter in &mut self.emitters {
            emitter.disable(backend);
        }
    }

    fn release(&mut self, backend: &mut dyn ParticleBackend) {
        for mut emitter in self.emitters.drain(..) {
            emitter.release(backend);
        }
        self.init_failures.clear();
        self.initialized = false;
        self.particle_count = 0;
        debug!("{} released", self.name());
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::CpuParticleBackend;
    use crate::constants::surfaces;
    use crate::data::SurfaceMap;
    use crate::emitter::EmitterState;
    use crate::presets::default_surface_map;
    use crate::vehicle::WheelState;

    const DT: f32 = 0.1;

    struct Rig {
        wheels: Vec<WheelState>,
        backend: CpuParticleBackend,
        surfaces: SurfaceMap,
        manager: SurfaceParticleManager,
    }

    impl Rig {
        fn new(wheel_count: usize) -> Self {
            Self::with_backend(wheel_count, CpuParticleBackend::default())
        }

        fn with_backend(wheel_count: usize, backend: CpuParticleBackend) -> Self {
            let mut rig = Self {
                wheels: vec![WheelState::on(surfaces::ASPHALT); wheel_count],
                backend,
                surfaces: default_surface_map(),
                manager: SurfaceParticleManager::default(),
            };
            let mut ctx = EffectContext::new(&rig.wheels, &mut rig.backend, &rig.surfaces, DT);
            rig.manager.initialize(&mut ctx);
            rig.manager.enable(&mut rig.backend);
            rig
        }

        fn tick(&mut self) -> usize {
            let mut ctx = EffectContext::new(&self.wheels, &mut self.backend, &self.surfaces, DT);
            self.manager.update(&mut ctx);
            self.manager.active_particle_count()
        }

        fn sum_of_emitters(&self) -> usize {
            self.manager.emitters().iter().map(|e| e.particle_count()).sum()
        }
    }

    #[test]
    fn one_sliding_wheel_of_four() {
        let mut rig = Rig::new(4);
        rig.wheels[0] = rig.wheels[0].with_slip(0.8, 0.0);
        let total = rig.tick();

        let counts: Vec<_> = rig.manager.emitters().iter().map(|e| e.particle_count()).collect();
        assert!(counts[0] > 0);
        assert_eq!(&counts[1..], &[0, 0, 0]);
        assert_eq!(total, counts[0]);
    }

    #[test]
    fn total_is_sum_of_emitters_every_tick() {
        let mut rig = Rig::new(4);
        for _ in 0..60 {
            for wheel in &mut rig.wheels {
                *wheel = wheel.with_slip(fastrand::f32() * 2.0 - 1.0, fastrand::f32() * 2.0 - 1.0);
            }
            let total = rig.tick();
            assert_eq!(total, rig.sum_of_emitters());
        }
    }

    #[test]
    fn inactive_update_resets_count() {
        let mut rig = Rig::new(2);
        rig.wheels[1] = rig.wheels[1].with_slip(1.0, 1.0);
        assert!(rig.tick() > 0);

        rig.manager.disable(&mut rig.backend);
        for _ in 0..3 {
            assert_eq!(rig.tick(), 0);
        }
    }

    #[test]
    fn enable_then_disable_leaves_emitters_disabled_and_empty() {
        let mut rig = Rig::with_backend(4, CpuParticleBackend::default());
        rig.manager.disable(&mut rig.backend);
        rig.manager.enable(&mut rig.backend);
        rig.manager.disable(&mut rig.backend);

        assert!(!rig.manager.is_active());
        for emitter in rig.manager.emitters() {
            assert_eq!(emitter.state(), EmitterState::Disabled);
            assert_eq!(emitter.particle_count(), 0);
        }
        assert_eq!(rig.backend.total_live(), 0);
    }

    #[test]
    fn enable_is_idempotent() {
        let mut rig = Rig::new(2);
        rig.wheels[0] = rig.wheels[0].with_slip(1.0, 0.0);
        rig.manager.enable(&mut rig.backend);
        rig.manager.enable(&mut rig.backend);
        assert!(rig.manager.is_active());
        assert!(rig.tick() > 0);
        assert_eq!(rig.manager.emitter(WheelId(0)).unwrap().state(), EmitterState::Emitting);
    }

    #[test]
    fn zero_coefficients_never_emit() {
        let mut rig = Rig::new(4);
        rig.manager.coefficients = SlipCoefficients::ZERO;
        rig.wheels[0] = WheelState::on(surfaces::ASPHALT).with_slip(5.0, -5.0);
        rig.wheels[1] = WheelState::on(surfaces::DIRT).with_slip(1.0, 1.0).with_speed(30.0);
        rig.wheels[2] = WheelState::on(surfaces::SNOW).with_slip(f32::MAX, 0.5);
        rig.wheels[3] = WheelState::on(surfaces::GRAVEL).with_speed(-40.0);
        for _ in 0..20 {
            assert_eq!(rig.tick(), 0);
        }
    }

    #[test]
    fn binary_emission_pushes_full_rate() {
        let mut rig = Rig::new(1);
        rig.manager.binary_emission = true;
        rig.wheels[0] = rig.wheels[0].with_slip(1.0, 0.0);
        rig.tick();

        let emitter = &rig.manager.emitters()[0];
        assert!(emitter.settings().binary_emission);
        assert_eq!(emitter.emission().intensity, 1.0);
        assert_eq!(emitter.emission().rate, rig.surfaces.get(surfaces::ASPHALT).max_emission_rate);
    }

    #[test]
    fn particles_drain_at_rest() {
        let mut rig = Rig::new(4);
        for wheel in &mut rig.wheels {
            *wheel = wheel.with_slip(1.2, 0.6);
        }
        for _ in 0..10 {
            rig.tick();
        }
        assert!(rig.manager.active_particle_count() > 0);

        for wheel in &mut rig.wheels {
            *wheel = wheel.with_slip(0.0, 0.0);
        }
        let mut ticks = 0;
        while rig.tick() > 0 {
            ticks += 1;
            assert!(ticks < 60, "particles still alive after {ticks} ticks at rest");
        }
    }

    #[test]
    fn vehicle_without_wheels_is_inert() {
        let mut rig = Rig::new(0);
        assert!(rig.manager.is_initialized());
        assert!(rig.manager.emitters().is_empty());
        assert!(rig.manager.init_failures().is_empty());
        assert_eq!(rig.tick(), 0);
    }

    #[test]
    fn update_before_initialize_is_a_no_op() {
        let wheels = vec![WheelState::default().with_slip(1.0, 1.0); 4];
        let mut backend = CpuParticleBackend::default();
        let surfaces = default_surface_map();
        let mut manager = SurfaceParticleManager::default();
        manager.enable(&mut backend);

        let mut ctx = EffectContext::new(&wheels, &mut backend, &surfaces, DT);
        manager.update(&mut ctx);
        manager.fixed_update(&mut ctx);
        assert_eq!(manager.active_particle_count(), 0);
        assert!(manager.emitters().is_empty());
    }

    #[test]
    fn enabled_before_initialize_starts_emitting() {
        let wheels = vec![WheelState::default().with_slip(1.0, 0.0)];
        let mut backend = CpuParticleBackend::default();
        let surfaces = default_surface_map();
        let mut manager = SurfaceParticleManager::default();
        manager.enable(&mut backend);

        let mut ctx = EffectContext::new(&wheels, &mut backend, &surfaces, DT);
        manager.initialize(&mut ctx);
        manager.update(&mut ctx);
        assert!(manager.active_particle_count() > 0);
    }

    #[test]
    fn failed_wheels_are_skipped() {
        let mut rig = Rig::with_backend(4, CpuParticleBackend::with_budget(2));
        assert_eq!(rig.manager.emitters().len(), 2);
        assert_eq!(rig.manager.init_failures().len(), 2);
        assert!(matches!(
            rig.manager.init_failures()[0],
            SurfaceParticleError::NoParticleResource { wheel: 2, .. }
        ));

        for wheel in &mut rig.wheels {
            *wheel = wheel.with_slip(1.0, 0.0);
        }
        assert!(rig.tick() > 0);
        assert!(rig.manager.emitter(WheelId(3)).is_none());
    }

    #[test]
    fn initialize_runs_once() {
        let mut rig = Rig::new(4);
        let mut ctx = EffectContext::new(&rig.wheels, &mut rig.backend, &rig.surfaces, DT);
        rig.manager.initialize(&mut ctx);
        assert_eq!(rig.manager.emitters().len(), 4);
        assert_eq!(rig.backend.emitter_count(), 4);
    }

    #[test]
    fn settings_round_trip_through_manager() {
        let settings = SurfaceParticleSettings {
            coefficients: SlipCoefficients {
                lateral: 0.5,
                ..default()
            },
            binary_emission: true,
        };
        let mut manager = SurfaceParticleManager::new(SurfaceParticleSettings::default());
        manager.apply_settings(&settings);
        assert_eq!(manager.settings(), settings);
    }

    #[test]
    fn release_frees_every_wheel_for_the_next_vehicle() {
        let mut rig = Rig::with_backend(4, CpuParticleBackend::with_budget(4));
        for wheel in &mut rig.wheels {
            *wheel = wheel.with_slip(1.0, 0.0);
        }
        assert!(rig.tick() > 0);

        rig.manager.release(&mut rig.backend);
        assert!(!rig.manager.is_initialized());
        assert!(rig.manager.emitters().is_empty());
        assert_eq!(rig.manager.active_particle_count(), 0);
        assert_eq!(rig.backend.emitter_count(), 0);
        assert_eq!(rig.backend.total_live(), 0);

        let mut next = SurfaceParticleManager::default();
        let mut ctx = EffectContext::new(&rig.wheels, &mut rig.backend, &rig.surfaces, DT);
        next.initialize(&mut ctx);
        assert_eq!(next.emitters().len(), 4);
        assert!(next.init_failures().is_empty());
    }
}
