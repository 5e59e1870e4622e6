//! Error types for surface particle setup and configuration.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while setting up surface particles or loading their settings.
///
/// None of these are fatal to the host: a failed wheel is skipped and a bad
/// settings file leaves the previous settings in place.
#[derive(Error, Debug)]
pub enum SurfaceParticleError {
    /// The rendering backend could not provide a particle resource for a wheel.
    #[error("no particle resource available for wheel {wheel}: {reason}")]
    NoParticleResource {
        wheel: usize,
        #[source]
        reason: BackendError,
    },

    /// An emitter was bound to a wheel index the vehicle does not have.
    #[error("wheel {wheel} does not exist (vehicle has {wheel_count} wheels)")]
    UnknownWheel { wheel: usize, wheel_count: usize },

    /// Settings file could not be read.
    #[error("failed to read settings {path:?}: {source}")]
    SettingsIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Settings text is not valid RON for the expected type.
    #[error("failed to parse settings: {0}")]
    SettingsParse(#[from] ron::error::SpannedError),
}

/// Errors reported by a [`ParticleBackend`](crate::backend::ParticleBackend).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// Every emitter slot is already in use.
    #[error("emitter budget exhausted ({max_emitters} emitters)")]
    Exhausted { max_emitters: usize },
}

pub type Result<T> = std::result::Result<T, SurfaceParticleError>;
