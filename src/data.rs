//! Data model for surface particles.
//!
//! Vehicle-wide tuning ([`SlipCoefficients`], [`SurfaceParticleSettings`]) and
//! per-surface appearance ([`SurfacePreset`]) are serializable (serde + RON)
//! and reflectable so they can be tweaked at runtime and saved to disk.

use std::collections::HashMap;
use std::path::Path;

use bevy::prelude::*;
use bevy_particle_pool::{PoolConfig, ScalarRange};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SurfaceParticleError};
use crate::vehicle::SurfaceId;

// ---------------------------------------------------------------------------
// Vehicle-wide coefficients
// ---------------------------------------------------------------------------

/// Multipliers applied uniformly to every wheel of a vehicle.
///
/// The documented ranges are what tuning UIs should offer; runtime code
/// accepts any non-negative value.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Reflect)]
#[serde(default)]
pub struct SlipCoefficients {
    /// How much lateral slip contributes to emission (0..5). Smoke surfaces only.
    pub lateral: f32,
    /// How much longitudinal slip contributes to emission (0..5). Smoke surfaces only.
    pub longitudinal: f32,
    /// Particle size multiplier for this vehicle (0..2).
    pub particle_size: f32,
    /// Emission rate multiplier for this vehicle (0..2).
    pub emission_rate: f32,
}

impl Default for SlipCoefficients {
    fn default() -> Self {
        Self {
            lateral: 1.0,
            longitudinal: 1.0,
            particle_size: 1.0,
            emission_rate: 1.0,
        }
    }
}

impl SlipCoefficients {
    pub const SLIP_RANGE: (f32, f32) = (0.0, 5.0);
    pub const SIZE_RANGE: (f32, f32) = (0.0, 2.0);
    pub const EMISSION_RANGE: (f32, f32) = (0.0, 2.0);

    /// All coefficients set to zero. Nothing is emitted with these.
    pub const ZERO: Self = Self {
        lateral: 0.0,
        longitudinal: 0.0,
        particle_size: 0.0,
        emission_rate: 0.0,
    };

    /// Copy with every field clamped to its UI range.
    pub fn clamped(&self) -> Self {
        let clamp = |v: f32, (lo, hi): (f32, f32)| if v.is_nan() { lo } else { v.clamp(lo, hi) };
        Self {
            lateral: clamp(self.lateral, Self::SLIP_RANGE),
            longitudinal: clamp(self.longitudinal, Self::SLIP_RANGE),
            particle_size: clamp(self.particle_size, Self::SIZE_RANGE),
            emission_rate: clamp(self.emission_rate, Self::EMISSION_RANGE),
        }
    }
}

/// Everything a vehicle's surface particle manager is tuned with.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Reflect)]
#[serde(default)]
pub struct SurfaceParticleSettings {
    pub coefficients: SlipCoefficients,
    /// Emit fully or not at all, with no smoothing in between.
    pub binary_emission: bool,
}

impl SurfaceParticleSettings {
    /// Parse settings from RON text. Missing fields keep their defaults.
    pub fn from_ron_str(text: &str) -> Result<Self> {
        Ok(ron::from_str(text)?)
    }

    /// Load settings from a `.ron` file on disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| SurfaceParticleError::SettingsIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron_str(&text)
    }

    pub fn to_ron_string(&self) -> String {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default()).unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Surfaces
// ---------------------------------------------------------------------------

/// What kind of particles a surface throws up.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, Reflect)]
pub enum SurfaceParticleType {
    /// Tyre smoke, driven by combined wheel slip.
    #[default]
    Smoke,
    /// Loose material kicked up by rolling speed. Slip coefficients are ignored.
    Dust,
    /// The surface never emits.
    None,
}

impl SurfaceParticleType {
    pub const ALL: [Self; 3] = [Self::Smoke, Self::Dust, Self::None];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Smoke => "Smoke",
            Self::Dust => "Dust",
            Self::None => "None",
        }
    }
}

/// Particle appearance and emission limits for one ground surface.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Reflect)]
#[serde(default)]
pub struct SurfacePreset {
    /// Display name.
    pub name: String,
    pub particle_type: SurfaceParticleType,
    /// Particles per second at full intensity.
    pub max_emission_rate: f32,
    /// Particle size at full intensity, before the vehicle size coefficient.
    pub particle_size: f32,
    pub lifetime: ScalarRange,
    /// Size multiplier reached at the end of a particle's life.
    pub end_size_factor: f32,
    pub color: LinearRgba,
    /// Combined slip below which smoke does not start.
    pub slip_threshold: f32,
    /// Wheel speed (m/s) at which dust starts.
    pub min_speed: f32,
    /// Wheel speed (m/s) at which dust reaches full intensity.
    pub max_speed: f32,
    /// Maximum live particles per wheel.
    pub capacity: u32,
}

impl Default for SurfacePreset {
    fn default() -> Self {
        Self {
            name: "Surface".to_string(),
            particle_type: SurfaceParticleType::Smoke,
            max_emission_rate: 60.0,
            particle_size: 0.6,
            lifetime: ScalarRange::Random(1.0, 2.0),
            end_size_factor: 3.0,
            color: LinearRgba::new(0.85, 0.85, 0.85, 0.6),
            slip_threshold: 0.1,
            min_speed: 2.0,
            max_speed: 20.0,
            capacity: 200,
        }
    }
}

impl SurfacePreset {
    /// Pool configuration for a wheel emitting this surface's particles.
    pub fn pool_config(&self) -> PoolConfig {
        PoolConfig {
            capacity: self.capacity,
            lifetime: self.lifetime,
            end_size_factor: self.end_size_factor,
        }
    }
}

/// A preset bound to a surface id, as stored in `*.surface.ron` files.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SurfaceDefinition {
    pub id: SurfaceId,
    pub preset: SurfacePreset,
}

/// Lookup from ground surface to particle preset.
#[derive(Resource, Clone, Debug)]
pub struct SurfaceMap {
    pub presets: HashMap<SurfaceId, SurfacePreset>,
    /// Used for any surface without its own preset.
    pub fallback: SurfacePreset,
}

impl Default for SurfaceMap {
    fn default() -> Self {
        crate::presets::default_surface_map()
    }
}

impl SurfaceMap {
    /// A map with no surface-specific presets.
    pub fn with_fallback(fallback: SurfacePreset) -> Self {
        Self {
            presets: HashMap::new(),
            fallback,
        }
    }

    pub fn get(&self, surface: SurfaceId) -> &SurfacePreset {
        self.presets.get(&surface).unwrap_or(&self.fallback)
    }

    pub fn insert(&mut self, surface: SurfaceId, preset: SurfacePreset) -> Option<SurfacePreset> {
        self.presets.insert(surface, preset)
    }

    /// Largest per-wheel capacity any preset asks for.
    pub fn max_capacity(&self) -> u32 {
        self.presets
            .values()
            .map(|p| p.capacity)
            .chain(std::iter::once(self.fallback.capacity))
            .max()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamped_applies_ui_ranges() {
        let wild = SlipCoefficients {
            lateral: 9.0,
            longitudinal: -1.0,
            particle_size: f32::NAN,
            emission_rate: 1.5,
        };
        let c = wild.clamped();
        assert_eq!(c.lateral, 5.0);
        assert_eq!(c.longitudinal, 0.0);
        assert_eq!(c.particle_size, 0.0);
        assert_eq!(c.emission_rate, 1.5);
    }

    #[test]
    fn settings_parse_with_defaults() {
        let settings = SurfaceParticleSettings::from_ron_str(
            "(coefficients: (lateral: 2.5, emission_rate: 0.5), binary_emission: true)",
        )
        .unwrap();
        assert!(settings.binary_emission);
        assert_eq!(settings.coefficients.lateral, 2.5);
        assert_eq!(settings.coefficients.longitudinal, 1.0);
        assert_eq!(settings.coefficients.emission_rate, 0.5);
    }

    #[test]
    fn settings_parse_error_is_reported() {
        let err = SurfaceParticleSettings::from_ron_str("(binary_emission: maybe)").unwrap_err();
        assert!(matches!(err, SurfaceParticleError::SettingsParse(_)));
    }

    #[test]
    fn settings_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vehicle.ron");
        let settings = SurfaceParticleSettings {
            coefficients: SlipCoefficients {
                particle_size: 1.75,
                ..default()
            },
            binary_emission: false,
        };
        std::fs::write(&path, settings.to_ron_string()).unwrap();
        assert_eq!(SurfaceParticleSettings::load(&path).unwrap(), settings);

        let missing = SurfaceParticleSettings::load(dir.path().join("missing.ron")).unwrap_err();
        assert!(matches!(missing, SurfaceParticleError::SettingsIo { .. }));
    }

    #[test]
    fn unknown_surface_uses_fallback() {
        let mut map = SurfaceMap::with_fallback(SurfacePreset {
            name: "Fallback".into(),
            ..default()
        });
        map.insert(
            SurfaceId(7),
            SurfacePreset {
                name: "Mud".into(),
                capacity: 500,
                ..default()
            },
        );
        assert_eq!(map.get(SurfaceId(7)).name, "Mud");
        assert_eq!(map.get(SurfaceId(8)).name, "Fallback");
        assert_eq!(map.max_capacity(), 500);
    }

    #[test]
    fn partial_preset_parses() {
        let preset: SurfacePreset =
            ron::from_str("(name: \"Mud\", particle_type: Dust, max_emission_rate: 80.0)").unwrap();
        assert_eq!(preset.particle_type, SurfaceParticleType::Dust);
        assert_eq!(preset.max_emission_rate, 80.0);
        assert_eq!(preset.capacity, SurfacePreset::default().capacity);
    }
}
