//! Shared constants for surface particle emission.

/// Well-known surface ids used by the built-in presets.
pub mod surfaces {
    use crate::vehicle::SurfaceId;

    pub const ASPHALT: SurfaceId = SurfaceId(0);
    pub const GRAVEL: SurfaceId = SurfaceId(1);
    pub const DIRT: SurfaceId = SurfaceId(2);
    pub const SAND: SurfaceId = SurfaceId(3);
    pub const GRASS: SurfaceId = SurfaceId(4);
    pub const SNOW: SurfaceId = SurfaceId(5);
    pub const ICE: SurfaceId = SurfaceId(6);
}

/// Emission shaping.
pub mod emission {
    /// Time constant (seconds) of the smoothing applied to continuous intensity.
    pub const INTENSITY_SMOOTHING: f32 = 0.15;
    /// Smoothed intensity below this snaps to zero.
    pub const MIN_INTENSITY: f32 = 0.01;
    /// Target intensity at or above which binary emission switches fully on.
    pub const BINARY_THRESHOLD: f32 = 0.5;
    /// Fraction of the preset size used at the lowest non-zero intensity.
    pub const MIN_SIZE_FRACTION: f32 = 0.5;
}

/// Rendering backend defaults.
pub mod backend {
    /// Emitter budget of the default CPU backend (64 four-wheel vehicles).
    pub const DEFAULT_MAX_EMITTERS: usize = 256;
}

/// Directory scanned for `*.surface.ron` preset overrides.
pub const SURFACES_DIR: &str = "assets/surfaces";
