//! Built-in surface presets and disk overrides.

use std::path::Path;

use bevy::prelude::*;
use bevy_particle_pool::ScalarRange;

use crate::constants::surfaces;
use crate::data::*;

const SURFACE_EXTENSION: &str = ".surface.ron";

/// Return the built-in surface presets as `(id, preset)` pairs.
pub fn default_presets() -> Vec<(crate::vehicle::SurfaceId, SurfacePreset)> {
    vec![
        (surfaces::ASPHALT, asphalt()),
        (surfaces::GRAVEL, gravel()),
        (surfaces::DIRT, dirt()),
        (surfaces::SAND, sand()),
        (surfaces::GRASS, grass()),
        (surfaces::SNOW, snow()),
        (surfaces::ICE, ice()),
    ]
}

/// Built-in presets, with asphalt smoke as the fallback for unknown surfaces.
pub fn default_surface_map() -> SurfaceMap {
    let mut map = SurfaceMap::with_fallback(asphalt());
    for (id, preset) in default_presets() {
        map.insert(id, preset);
    }
    map
}

/// Grey tyre smoke that only appears under real slip.
fn asphalt() -> SurfacePreset {
    SurfacePreset {
        name: "Asphalt".to_string(),
        particle_type: SurfaceParticleType::Smoke,
        max_emission_rate: 80.0,
        particle_size: 0.8,
        lifetime: ScalarRange::Random(1.5, 3.0),
        end_size_factor: 4.0,
        color: LinearRgba::new(0.8, 0.8, 0.8, 0.5),
        slip_threshold: 0.15,
        capacity: 300,
        ..default()
    }
}

fn gravel() -> SurfacePreset {
    SurfacePreset {
        name: "Gravel".to_string(),
        particle_type: SurfaceParticleType::Dust,
        max_emission_rate: 60.0,
        particle_size: 0.5,
        lifetime: ScalarRange::Random(0.6, 1.2),
        end_size_factor: 2.0,
        color: LinearRgba::new(0.55, 0.5, 0.45, 0.7),
        min_speed: 3.0,
        max_speed: 25.0,
        capacity: 200,
        ..default()
    }
}

fn dirt() -> SurfacePreset {
    SurfacePreset {
        name: "Dirt".to_string(),
        particle_type: SurfaceParticleType::Dust,
        max_emission_rate: 70.0,
        particle_size: 0.7,
        lifetime: ScalarRange::Random(1.0, 2.0),
        end_size_factor: 3.0,
        color: LinearRgba::new(0.45, 0.35, 0.25, 0.6),
        min_speed: 2.0,
        max_speed: 20.0,
        capacity: 250,
        ..default()
    }
}

fn sand() -> SurfacePreset {
    SurfacePreset {
        name: "Sand".to_string(),
        particle_type: SurfaceParticleType::Dust,
        max_emission_rate: 90.0,
        particle_size: 0.6,
        lifetime: ScalarRange::Random(1.0, 2.5),
        end_size_factor: 3.5,
        color: LinearRgba::new(0.85, 0.75, 0.55, 0.6),
        min_speed: 1.5,
        max_speed: 18.0,
        capacity: 300,
        ..default()
    }
}

/// Grass only throws up a few bits at speed.
fn grass() -> SurfacePreset {
    SurfacePreset {
        name: "Grass".to_string(),
        particle_type: SurfaceParticleType::Dust,
        max_emission_rate: 25.0,
        particle_size: 0.3,
        lifetime: ScalarRange::Random(0.4, 0.8),
        end_size_factor: 1.5,
        color: LinearRgba::new(0.3, 0.45, 0.2, 0.8),
        min_speed: 5.0,
        max_speed: 30.0,
        capacity: 80,
        ..default()
    }
}

/// Snow spray behaves like smoke: it needs the wheel to slide.
fn snow() -> SurfacePreset {
    SurfacePreset {
        name: "Snow".to_string(),
        particle_type: SurfaceParticleType::Smoke,
        max_emission_rate: 70.0,
        particle_size: 0.5,
        lifetime: ScalarRange::Random(0.8, 1.5),
        end_size_factor: 2.5,
        color: LinearRgba::new(0.95, 0.95, 1.0, 0.7),
        slip_threshold: 0.05,
        capacity: 250,
        ..default()
    }
}

fn ice() -> SurfacePreset {
    SurfacePreset {
        name: "Ice".to_string(),
        particle_type: SurfaceParticleType::None,
        max_emission_rate: 0.0,
        capacity: 0,
        ..default()
    }
}

// ---------------------------------------------------------------------------
// Disk overrides
// ---------------------------------------------------------------------------

/// Load every `*.surface.ron` file in `dir` into `map`, replacing built-ins
/// with the same id. Returns how many surfaces were loaded.
pub fn load_surfaces_from_disk(dir: &Path, map: &mut SurfaceMap) -> usize {
    if !dir.is_dir() {
        return 0;
    }

    let Ok(entries) = std::fs::read_dir(dir) else {
        return 0;
    };

    let mut loaded = 0;
    for entry in entries.flatten() {
        let path = entry.path();
        let fname = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
        if !fname.ends_with(SURFACE_EXTENSION) {
            continue;
        }

        let Ok(contents) = std::fs::read_to_string(&path) else {
            warn!("Failed to read surface preset file: {:?}", path);
            continue;
        };

        match ron::from_str::<SurfaceDefinition>(&contents) {
            Ok(def) => {
                info!("Loaded surface preset '{}' ({:?}) from disk", def.preset.name, def.id);
                map.insert(def.id, def.preset);
                loaded += 1;
            }
            Err(e) => {
                warn!("Failed to parse surface preset '{:?}': {}", path, e);
            }
        }
    }
    loaded
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vehicle::SurfaceId;

    #[test]
    fn built_ins_cover_every_particle_type() {
        let map = default_surface_map();
        for ty in SurfaceParticleType::ALL {
            assert!(map.presets.values().any(|p| p.particle_type == ty), "{}", ty.label());
        }
        assert_eq!(map.get(surfaces::ICE).particle_type, SurfaceParticleType::None);
        assert_eq!(map.get(SurfaceId(999)).name, "Asphalt");
    }

    #[test]
    fn disk_overrides_replace_built_ins() {
        let dir = tempfile::tempdir().unwrap();
        let def = SurfaceDefinition {
            id: surfaces::GRASS,
            preset: SurfacePreset {
                name: "Wet Grass".into(),
                particle_type: SurfaceParticleType::None,
                ..default()
            },
        };
        let text = ron::ser::to_string_pretty(&def, ron::ser::PrettyConfig::default()).unwrap();
        std::fs::write(dir.path().join("wet_grass.surface.ron"), text).unwrap();
        std::fs::write(dir.path().join("broken.surface.ron"), "(id: oops").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let mut map = default_surface_map();
        let loaded = load_surfaces_from_disk(dir.path(), &mut map);
        assert_eq!(loaded, 1);
        assert_eq!(map.get(surfaces::GRASS).name, "Wet Grass");
    }

    #[test]
    fn missing_directory_loads_nothing() {
        let mut map = default_surface_map();
        let before = map.presets.len();
        assert_eq!(load_surfaces_from_disk(Path::new("/nonexistent/surfaces"), &mut map), 0);
        assert_eq!(map.presets.len(), before);
    }
}
