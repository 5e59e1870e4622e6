//! # bevy_particle_pool
//!
//! Small CPU particle pools for effects that only need to know *how many*
//! particles are alive and how big they are, not where they are.
//!
//! A pool is fed one [`EmissionRequest`] per frame. It ages its live
//! particles, culls the expired ones and spawns new ones from a fractional
//! rate accumulator, capped by the pool capacity.
//!
//! ```ignore
//! use bevy_particle_pool::{EmissionRequest, ParticlePool, PoolConfig};
//!
//! let mut pool = ParticlePool::new(PoolConfig::default());
//! pool.emit(&EmissionRequest::rate(40.0), 1.0 / 60.0);
//! assert!(pool.live_count() > 0);
//! ```

pub mod data;
pub mod pool;

pub use data::*;
pub use pool::{LiveParticle, ParticlePool};
