//! Configuration and per-frame request types for particle pools.
//!
//! Config types are serializable (serde + RON) and reflectable so they can be
//! embedded in presets and inspected at runtime.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Scalar ranges
// ---------------------------------------------------------------------------

/// A scalar that is either fixed or drawn uniformly from a range on each use.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Reflect)]
pub enum ScalarRange {
    Constant(f32),
    Random(f32, f32),
}

impl Default for ScalarRange {
    fn default() -> Self {
        Self::Constant(1.0)
    }
}

impl ScalarRange {
    /// Draw a value using the thread-local `fastrand` generator.
    pub fn sample(&self) -> f32 {
        match *self {
            Self::Constant(v) => v,
            Self::Random(a, b) => a + (b - a) * fastrand::f32(),
        }
    }
}

// ---------------------------------------------------------------------------
// Pool configuration
// ---------------------------------------------------------------------------

/// Static configuration of one pool, fixed when the pool is created.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Reflect)]
pub struct PoolConfig {
    /// Maximum number of concurrently live particles.
    pub capacity: u32,
    /// Lifetime drawn for each particle when no per-request override is set.
    pub lifetime: ScalarRange,
    /// Size multiplier reached at the end of a particle's life (1.0 = no change).
    pub end_size_factor: f32,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            capacity: 256,
            lifetime: ScalarRange::Random(0.8, 1.6),
            end_size_factor: 2.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Per-frame emission request
// ---------------------------------------------------------------------------

/// What a pool should emit during one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EmissionRequest {
    /// Particles per second. Non-finite or non-positive rates spawn nothing.
    pub rate: f32,
    /// Initial particle size.
    pub size: f32,
    /// Tint applied to particles spawned this frame.
    pub color: LinearRgba,
    /// Overrides `PoolConfig::lifetime` for particles spawned this frame.
    pub lifetime: Option<ScalarRange>,
    /// Overrides `PoolConfig::end_size_factor` for particles spawned this frame.
    pub end_size_factor: Option<f32>,
    /// Live particle limit for this frame, never above `PoolConfig::capacity`.
    pub capacity: Option<u32>,
}

impl Default for EmissionRequest {
    fn default() -> Self {
        Self {
            rate: 0.0,
            size: 1.0,
            color: LinearRgba::WHITE,
            lifetime: None,
            end_size_factor: None,
            capacity: None,
        }
    }
}

impl EmissionRequest {
    /// A request that emits at `rate` with default appearance.
    pub fn rate(rate: f32) -> Self {
        Self {
            rate,
            ..default()
        }
    }

    /// Whether this request would spawn anything given enough time.
    pub fn is_emitting(&self) -> bool {
        self.rate.is_finite() && self.rate > 0.0 && self.size.is_finite() && self.size > 0.0
    }
}
