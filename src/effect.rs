//! Common lifecycle shared by pluggable vehicle effects.

use crate::backend::ParticleBackend;
use crate::data::SurfaceMap;
use crate::vehicle::VehicleWheels;

/// Everything an effect may read or drive during one tick.
pub struct EffectContext<'a> {
    pub vehicle: &'a dyn VehicleWheels,
    pub backend: &'a mut dyn ParticleBackend,
    pub surfaces: &'a SurfaceMap,
    /// Seconds since the previous call of the same kind.
    pub dt: f32,
}

impl<'a> EffectContext<'a> {
    pub fn new(
        vehicle: &'a dyn VehicleWheels,
        backend: &'a mut dyn ParticleBackend,
        surfaces: &'a SurfaceMap,
        dt: f32,
    ) -> Self {
        Self {
            vehicle,
            backend,
            surfaces,
            dt,
        }
    }
}

/// A visual or audio effect attached to a vehicle and ticked by its host.
///
/// `update` runs once per rendered frame at a possibly variable rate;
/// `fixed_update` runs once per physics step. Effects are inert until
/// `initialize` has been called, and inactive until `enable`.
pub trait VehicleEffect {
    fn name(&self) -> &'static str;

    fn initialize(&mut self, ctx: &mut EffectContext);

    fn is_initialized(&self) -> bool;

    fn update(&mut self, ctx: &mut EffectContext);

    fn fixed_update(&mut self, ctx: &mut EffectContext);

    fn enable(&mut self, backend: &mut dyn ParticleBackend);

    fn disable(&mut self, backend: &mut dyn ParticleBackend);

    /// Return every backend resource the effect holds. The effect goes back
    /// to its uninitialized state.
    fn release(&mut self, backend: &mut dyn ParticleBackend);

    fn is_active(&self) -> bool;
}
