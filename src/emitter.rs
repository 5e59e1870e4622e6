//! Per-wheel particle emitter.
//!
//! Each frame an emitter turns its wheel's slip (or speed, for dust surfaces)
//! into a target intensity in [0, 1], shapes it (smoothing or binary
//! thresholding), converts it into an [`EmissionRequest`] and reads back the
//! wheel's live particle count.

use bevy_particle_pool::EmissionRequest;

use crate::backend::{ParticleBackend, ParticleHandle};
use crate::constants::emission::{
    BINARY_THRESHOLD, INTENSITY_SMOOTHING, MIN_INTENSITY, MIN_SIZE_FRACTION,
};
use crate::data::{SlipCoefficients, SurfaceParticleSettings, SurfaceParticleType, SurfacePreset};
use crate::effect::EffectContext;
use crate::error::{Result, SurfaceParticleError};
use crate::vehicle::{WheelId, WheelState};

/// Lifecycle state of one emitter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EmitterState {
    /// Not emitting and ignoring slip. Live particles are kept.
    Disabled,
    /// Enabled, but the current intensity is zero.
    Idle,
    /// Enabled and emitting.
    Emitting,
}

/// Emission parameters computed for one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Emission {
    /// Shaped intensity in [0, 1].
    pub intensity: f32,
    /// Particles per second.
    pub rate: f32,
    /// Initial particle size.
    pub size: f32,
}

impl Emission {
    /// Emission parameters for `intensity` on `preset`, scaled by the vehicle coefficients.
    pub fn from_intensity(
        intensity: f32,
        preset: &SurfacePreset,
        coefficients: &SlipCoefficients,
    ) -> Self {
        if intensity <= 0.0 || preset.particle_type == SurfaceParticleType::None {
            return Self::default();
        }
        let size_fraction = MIN_SIZE_FRACTION + (1.0 - MIN_SIZE_FRACTION) * intensity;
        Self {
            intensity,
            rate: preset.max_emission_rate * intensity * coefficients.emission_rate,
            size: preset.particle_size * coefficients.particle_size * size_fraction,
        }
    }
}

/// Combined slip magnitude after applying the vehicle coefficients.
///
/// Non-finite inputs yield zero.
pub fn combined_slip(wheel: &WheelState, coefficients: &SlipCoefficients) -> f32 {
    let longitudinal = wheel.longitudinal_slip * coefficients.longitudinal;
    let lateral = wheel.lateral_slip * coefficients.lateral;
    if !longitudinal.is_finite() || !lateral.is_finite() {
        return 0.0;
    }
    longitudinal.hypot(lateral)
}

/// Linear remap of `value` from `[lo, hi]` to `[0, 1]`, clamped. NaN maps to zero.
fn saturate_between(value: f32, lo: f32, hi: f32) -> f32 {
    let span = (hi - lo).max(f32::EPSILON);
    let t = (value - lo) / span;
    if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) }
}

/// Unshaped intensity in [0, 1] for a wheel on the given surface.
pub fn target_intensity(
    wheel: &WheelState,
    preset: &SurfacePreset,
    coefficients: &SlipCoefficients,
) -> f32 {
    if !wheel.grounded {
        return 0.0;
    }
    match preset.particle_type {
        SurfaceParticleType::Smoke => {
            let threshold = preset.slip_threshold.max(0.0);
            saturate_between(combined_slip(wheel, coefficients), threshold, threshold.max(1.0))
        }
        SurfaceParticleType::Dust => {
            if !wheel.speed.is_finite() {
                return 0.0;
            }
            saturate_between(wheel.speed.abs(), preset.min_speed, preset.max_speed)
        }
        SurfaceParticleType::None => 0.0,
    }
}

/// Exponential approach of `current` towards `target` over `dt` seconds.
fn smooth_towards(current: f32, target: f32, dt: f32) -> f32 {
    if !dt.is_finite() || dt <= 0.0 {
        return current;
    }
    let alpha = 1.0 - (-dt / INTENSITY_SMOOTHING).exp();
    let next = current + (target - current) * alpha;
    if next < MIN_INTENSITY { 0.0 } else { next.min(1.0) }
}

/// Emits particles for a single wheel.
#[derive(Debug)]
pub struct SurfaceParticleEmitter {
    wheel: WheelId,
    handle: Option<ParticleHandle>,
    /// Coefficients and mode copied in from the manager on every update.
    settings: SurfaceParticleSettings,
    enabled: bool,
    intensity: f32,
    emission: Emission,
    particle_count: usize,
}

impl SurfaceParticleEmitter {
    pub fn new(wheel: WheelId) -> Self {
        Self {
            wheel,
            handle: None,
            settings: SurfaceParticleSettings::default(),
            enabled: false,
            intensity: 0.0,
            emission: Emission::default(),
            particle_count: 0,
        }
    }

    pub fn wheel(&self) -> WheelId {
        self.wheel
    }

    pub fn handle(&self) -> Option<ParticleHandle> {
        self.handle
    }

    pub fn is_initialized(&self) -> bool {
        self.handle.is_some()
    }

    pub fn settings(&self) -> &SurfaceParticleSettings {
        &self.settings
    }

    /// Live particles after the last update.
    pub fn particle_count(&self) -> usize {
        self.particle_count
    }

    /// Shaped intensity after the last update.
    pub fn intensity(&self) -> f32 {
        self.intensity
    }

    /// Emission parameters requested on the last update.
    pub fn emission(&self) -> Emission {
        self.emission
    }

    pub fn state(&self) -> EmitterState {
        if !self.enabled || self.handle.is_none() {
            EmitterState::Disabled
        } else if self.intensity > 0.0 {
            EmitterState::Emitting
        } else {
            EmitterState::Idle
        }
    }

    /// Bind to the wheel and obtain a particle resource from the backend.
    ///
    /// The emitter starts disabled.
    pub fn initialize(&mut self, ctx: &mut EffectContext) -> Result<()> {
        let wheel_count = ctx.vehicle.wheel_count();
        let Some(wheel) = ctx.vehicle.wheel(self.wheel) else {
            return Err(SurfaceParticleError::UnknownWheel {
                wheel: self.wheel.0,
                wheel_count,
            });
        };

        // Allocate for the hungriest surface so the wheel can change surfaces
        // without reallocating; each frame caps at the current surface.
        let mut config = ctx.surfaces.get(wheel.surface).pool_config();
        config.capacity = ctx.surfaces.max_capacity();

        let handle = ctx
            .backend
            .create_emitter(self.wheel, &config)
            .map_err(|reason| SurfaceParticleError::NoParticleResource {
                wheel: self.wheel.0,
                reason,
            })?;
        ctx.backend.set_paused(handle, true);
        self.handle = Some(handle);
        Ok(())
    }

    /// Recompute emission from the wheel's current state and report the live count.
    pub fn update(&mut self, settings: &SurfaceParticleSettings, ctx: &mut EffectContext) -> usize {
        self.settings = *settings;

        let Some(handle) = self.handle else {
            self.particle_count = 0;
            return 0;
        };

        if !self.enabled {
            self.particle_count = ctx.backend.live_count(handle);
            return self.particle_count;
        }

        let (target, preset) = match ctx.vehicle.wheel(self.wheel) {
            Some(wheel) => {
                let preset = ctx.surfaces.get(wheel.surface);
                (target_intensity(wheel, preset, &self.settings.coefficients), preset)
            }
            None => (0.0, &ctx.surfaces.fallback),
        };

        self.intensity = if self.settings.binary_emission {
            if target >= BINARY_THRESHOLD { 1.0 } else { 0.0 }
        } else {
            smooth_towards(self.intensity, target, ctx.dt)
        };
        self.emission =
            Emission::from_intensity(self.intensity, preset, &self.settings.coefficients);

        let request = EmissionRequest {
            rate: self.emission.rate,
            size: self.emission.size,
            color: preset.color,
            lifetime: Some(preset.lifetime),
            end_size_factor: Some(preset.end_size_factor),
            capacity: Some(preset.capacity),
        };
        ctx.backend.emit(handle, &request, ctx.dt);

        self.particle_count = ctx.backend.live_count(handle);
        self.particle_count
    }

    /// Hand the particle resource back to the backend, dropping live particles.
    ///
    /// The emitter is left uninitialized and disabled.
    pub fn release(&mut self, backend: &mut dyn ParticleBackend) {
        if let Some(handle) = self.handle.take() {
            backend.destroy_emitter(handle);
        }
        self.enabled = false;
        self.intensity = 0.0;
        self.emission = Emission::default();
        self.particle_count = 0;
    }

    /// Resume emission. Calling this on an enabled emitter does nothing.
    pub fn enable(&mut self, backend: &mut dyn ParticleBackend) {
        if self.enabled {
            return;
        }
        self.enabled = true;
        if let Some(handle) = self.handle {
            backend.set_paused(handle, false);
        }
    }

    /// Stop emitting. Live particles stay with the backend.
    pub fn disable(&mut self, backend: &mut dyn ParticleBackend) {
        if !self.enabled {
            return;
        }
        self.enabled = false;
        self.intensity = 0.0;
        self.emission = Emission::default();
        if let Some(handle) = self.handle {
            backend.set_paused(handle, true);
        }
    }
}
