//! # Bevy Surface Particles
//!
//! Per-wheel tyre smoke and surface dust for Bevy vehicles.
//!
//! Every wheel gets a [`SurfaceParticleEmitter`] that turns its longitudinal
//! and lateral slip (or rolling speed, on loose surfaces) into an emission
//! rate and particle size. A [`SurfaceParticleManager`] on the vehicle owns the
//! emitters, pushes the vehicle-wide [`SlipCoefficients`] into them every frame
//! and sums their live particle counts.
//!
//! ## Quick Start
//!
//! ```ignore
//! use bevy::prelude::*;
//! use bevy_surface_particles::prelude::*;
//!
//! fn main() {
//!     App::new()
//!         .add_plugins(DefaultPlugins)
//!         .add_plugins(SurfaceParticlePlugin)
//!         .add_systems(Startup, setup)
//!         .run();
//! }
//!
//! fn setup(mut commands: Commands) {
//!     commands.spawn((
//!         SurfaceParticleManager::default(),
//!         WheelStates(vec![WheelState::default(); 4]),
//!     ));
//! }
//! ```
//!
//! The vehicle controller writes fresh [`WheelStates`] every frame; the plugin
//! initializes managers once wheels are present and drives them from `Update`.
//!
//! ## Without Bevy schedules
//!
//! [`SurfaceParticleManager`] implements [`VehicleEffect`], so a host can call
//! `initialize`, `update`, `fixed_update`, `enable` and `disable` directly with
//! an [`EffectContext`] and any [`ParticleBackend`], and `release` when the
//! vehicle goes away.

pub mod backend;
pub mod constants;
pub mod data;
pub mod effect;
pub mod emitter;
pub mod error;
pub mod manager;
pub mod plugin;
pub mod presets;
pub mod vehicle;

pub use backend::{CpuParticleBackend, ParticleBackend, ParticleHandle};
pub use data::*;
pub use effect::{EffectContext, VehicleEffect};
pub use emitter::{Emission, EmitterState, SurfaceParticleEmitter};
pub use error::{BackendError, SurfaceParticleError};
pub use manager::SurfaceParticleManager;
pub use plugin::{
    LifecycleRequested, SetSurfaceParticlesEnabled, SurfaceParticlePlugin, SurfaceParticleSystems,
};
pub use vehicle::{SurfaceId, VehicleWheels, WheelId, WheelState, WheelStates};

/// Convenient re-exports of commonly used types.
pub mod prelude {
    pub use crate::backend::{CpuParticleBackend, ParticleBackend};
    pub use crate::data::{SlipCoefficients, SurfaceMap, SurfaceParticleSettings, SurfacePreset};
    pub use crate::effect::{EffectContext, VehicleEffect};
    pub use crate::manager::SurfaceParticleManager;
    pub use crate::plugin::{SetSurfaceParticlesEnabled, SurfaceParticlePlugin};
    pub use crate::vehicle::{SurfaceId, WheelState, WheelStates};
}
