//! Error types for oscillo
//!
//! Centralized error handling using thiserror.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the playback and visualization engine
#[derive(Error, Debug)]
pub enum PlayerError {
    /// The host has no usable audio output subsystem.
    #[error("audio output unavailable on this platform: {0}")]
    UnsupportedPlatform(String),

    /// The platform accepted the device but refused to start playback.
    #[error("playback refused by audio backend: {0}")]
    PlaybackBlocked(String),

    /// The track could not be opened or decoded.
    #[error("failed to load {}: {reason}", path.display())]
    Load { path: PathBuf, reason: String },

    /// The raster surface could not be created or painted.
    #[error("render error: {0}")]
    Render(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for the engine
pub type Result<T> = std::result::Result<T, PlayerError>;
