//! CPU-side particle pool.
//!
//! Particles carry no position or velocity: a pool only tracks age, lifetime,
//! size and tint, which is all a count- and appearance-driven effect needs.

use bevy::prelude::*;

use crate::data::*;

/// A single live particle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LiveParticle {
    pub age: f32,
    pub lifetime: f32,
    pub initial_size: f32,
    /// Size multiplier reached at the end of life.
    pub end_size_factor: f32,
    pub color: LinearRgba,
}

impl LiveParticle {
    /// Normalized age in [0..1].
    pub fn life_fraction(&self) -> f32 {
        if self.lifetime <= 0.0 {
            return 1.0;
        }
        (self.age / self.lifetime).clamp(0.0, 1.0)
    }

    /// Current size, interpolated towards `end_size_factor`.
    pub fn size(&self) -> f32 {
        let t = self.life_fraction();
        self.initial_size * (1.0 + (self.end_size_factor - 1.0) * t)
    }
}

/// Fixed-capacity pool of CPU particles driven by per-frame emission requests.
#[derive(Clone, Debug)]
pub struct ParticlePool {
    config: PoolConfig,
    particles: Vec<LiveParticle>,
    /// Fractional spawn accumulator (particles owed but not yet spawned).
    spawn_accumulator: f32,
    /// Whether the previous frame requested emission.
    was_emitting: bool,
    paused: bool,
}

impl ParticlePool {
    pub fn new(config: PoolConfig) -> Self {
        let capacity = config.capacity as usize;
        Self {
            config,
            particles: Vec::with_capacity(capacity),
            spawn_accumulator: 0.0,
            was_emitting: false,
            paused: false,
        }
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    pub fn live_count(&self) -> usize {
        self.particles.len()
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Iterate over live particles, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &LiveParticle> {
        self.particles.iter()
    }

    /// Pause or resume spawning. Live particles are kept either way.
    pub fn set_paused(&mut self, paused: bool) {
        if self.paused == paused {
            return;
        }
        self.paused = paused;
        self.spawn_accumulator = 0.0;
        self.was_emitting = false;
    }

    /// Advance the pool by `dt` seconds and spawn according to `request`.
    ///
    /// Returns the number of particles spawned this frame.
    pub fn emit(&mut self, request: &EmissionRequest, dt: f32) -> u32 {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };

        for p in &mut self.particles {
            p.age += dt;
        }
        self.particles.retain(|p| p.age < p.lifetime);

        if self.paused || !request.is_emitting() {
            self.spawn_accumulator = 0.0;
            self.was_emitting = false;
            return 0;
        }

        // Starting from rest owes one particle immediately, so short frames
        // at a low rate still show the onset.
        if !self.was_emitting {
            self.spawn_accumulator = self.spawn_accumulator.max(1.0);
        }
        self.was_emitting = true;

        self.spawn_accumulator += request.rate * dt;
        let owed = self.spawn_accumulator as u32;
        self.spawn_accumulator -= owed as f32;

        let capacity = request
            .capacity
            .map_or(self.config.capacity, |c| c.min(self.config.capacity));
        let free = (capacity as usize).saturating_sub(self.particles.len());
        let count = (owed as usize).min(free);
        let lifetime = request.lifetime.unwrap_or(self.config.lifetime);
        let end_size_factor = request.end_size_factor.unwrap_or(self.config.end_size_factor);
        for _ in 0..count {
            self.particles.push(LiveParticle {
                age: 0.0,
                lifetime: lifetime.sample(),
                initial_size: request.size,
                end_size_factor,
                color: request.color,
            });
        }

        count as u32
    }
}
