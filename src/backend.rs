//! Seam between emitters and whatever actually draws particles.
//!
//! Emitters never own particle buffers. They ask a [`ParticleBackend`] for a
//! handle once, push one [`EmissionRequest`] per frame through it and read the
//! live count back.

use bevy::prelude::*;
use bevy_particle_pool::{EmissionRequest, ParticlePool, PoolConfig};

use crate::constants;
use crate::error::BackendError;
use crate::vehicle::WheelId;

/// Opaque handle to one emitter slot inside a backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ParticleHandle(pub u32);

/// A particle renderer that emitters can drive.
pub trait ParticleBackend {
    /// Create or locate the particle resource for `wheel`.
    fn create_emitter(
        &mut self,
        wheel: WheelId,
        config: &PoolConfig,
    ) -> Result<ParticleHandle, BackendError>;

    /// Free the emitter slot and drop its live particles. Unknown handles are ignored.
    fn destroy_emitter(&mut self, handle: ParticleHandle);

    /// Advance the emitter by `dt` seconds, spawning according to `request`.
    fn emit(&mut self, handle: ParticleHandle, request: &EmissionRequest, dt: f32);

    /// Pause or resume spawning without dropping live particles.
    fn set_paused(&mut self, handle: ParticleHandle, paused: bool);

    /// Number of live particles. Unknown handles report zero.
    fn live_count(&self, handle: ParticleHandle) -> usize;
}

/// Default backend: one CPU [`ParticlePool`] per emitter, up to a fixed budget.
///
/// Destroyed emitters leave an empty slot that the next emitter reuses.
#[derive(Resource, Debug)]
pub struct CpuParticleBackend {
    slots: Vec<Option<ParticlePool>>,
    free: Vec<u32>,
    max_emitters: usize,
}

impl Default for CpuParticleBackend {
    fn default() -> Self {
        Self::with_budget(constants::backend::DEFAULT_MAX_EMITTERS)
    }
}

impl CpuParticleBackend {
    pub fn with_budget(max_emitters: usize) -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            max_emitters,
        }
    }

    /// Emitters currently holding a slot.
    pub fn emitter_count(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub fn max_emitters(&self) -> usize {
        self.max_emitters
    }

    pub fn pool(&self, handle: ParticleHandle) -> Option<&ParticlePool> {
        self.slots.get(handle.0 as usize).and_then(Option::as_ref)
    }

    fn pool_mut(&mut self, handle: ParticleHandle) -> Option<&mut ParticlePool> {
        self.slots.get_mut(handle.0 as usize).and_then(Option::as_mut)
    }

    /// Total live particles across every emitter.
    pub fn total_live(&self) -> usize {
        self.slots.iter().flatten().map(ParticlePool::live_count).sum()
    }
}

impl ParticleBackend for CpuParticleBackend {
    fn create_emitter(
        &mut self,
        wheel: WheelId,
        config: &PoolConfig,
    ) -> Result<ParticleHandle, BackendError> {
        let pool = ParticlePool::new(config.clone());
        let handle = if let Some(index) = self.free.pop() {
            self.slots[index as usize] = Some(pool);
            ParticleHandle(index)
        } else if self.slots.len() < self.max_emitters {
            self.slots.push(Some(pool));
            ParticleHandle(self.slots.len() as u32 - 1)
        } else {
            return Err(BackendError::Exhausted {
                max_emitters: self.max_emitters,
            });
        };
        debug!("Created particle pool {:?} for wheel {}", handle, wheel.0);
        Ok(handle)
    }

    fn destroy_emitter(&mut self, handle: ParticleHandle) {
        let Some(slot) = self.slots.get_mut(handle.0 as usize) else {
            return;
        };
        if slot.take().is_some() {
            self.free.push(handle.0);
            debug!("Released particle pool {:?}", handle);
        }
    }

    fn emit(&mut self, handle: ParticleHandle, request: &EmissionRequest, dt: f32) {
        if let Some(pool) = self.pool_mut(handle) {
            pool.emit(request, dt);
        }
    }

    fn set_paused(&mut self, handle: ParticleHandle, paused: bool) {
        if let Some(pool) = self.pool_mut(handle) {
            pool.set_paused(paused);
        }
    }

    fn live_count(&self, handle: ParticleHandle) -> usize {
        self.pool(handle).map_or(0, ParticlePool::live_count)
    }
}
