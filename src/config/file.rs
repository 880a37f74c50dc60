//! Configuration file management for oscillo.
//!
//! This module handles loading and saving application configuration from TOML files.
//! Configuration is stored in the user's config directory.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Waveform visualizer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisualizerConfig {
    /// How often the analysis window is snapshotted, in milliseconds
    #[serde(default = "default_sampling_cadence_ms")]
    pub sampling_cadence_ms: u64,
    /// Horizontal resolution divisor: higher values draw fewer, wider slices
    #[serde(default = "default_smoothness")]
    pub smoothness: u32,
    /// Stroke width of the waveform polyline in pixels
    #[serde(default = "default_line_width")]
    pub line_width: f32,
    /// Vertical scale applied to normalized sample amplitudes
    #[serde(default = "default_amplitude_scale")]
    pub amplitude_scale: f32,
    /// Stroke color as "#RRGGBB"
    #[serde(default = "default_line_color")]
    pub line_color: String,
    /// Raster surface width in pixels
    #[serde(default = "default_surface_width")]
    pub surface_width: u32,
    /// Raster surface height in pixels
    #[serde(default = "default_surface_height")]
    pub surface_height: u32,
}

fn default_sampling_cadence_ms() -> u64 {
    100
}

fn default_smoothness() -> u32 {
    2
}

fn default_line_width() -> f32 {
    2.0
}

fn default_amplitude_scale() -> f32 {
    500.0
}

fn default_line_color() -> String {
    "#00FF00".to_string()
}

fn default_surface_width() -> u32 {
    1920
}

fn default_surface_height() -> u32 {
    480
}

impl Default for VisualizerConfig {
    fn default() -> Self {
        VisualizerConfig {
            sampling_cadence_ms: default_sampling_cadence_ms(),
            smoothness: default_smoothness(),
            line_width: default_line_width(),
            amplitude_scale: default_amplitude_scale(),
            line_color: default_line_color(),
            surface_width: default_surface_width(),
            surface_height: default_surface_height(),
        }
    }
}

/// Complete application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OscilloConfig {
    #[serde(default)]
    pub visualizer: VisualizerConfig,
}

impl OscilloConfig {
    /// Loads configuration from the user's config directory, falling
    /// back to defaults when no config file exists yet.
    ///
    /// # Errors
    /// - If the config directory cannot be determined
    /// - If an existing config file cannot be read
    /// - If the TOML is malformed
    pub fn load() -> anyhow::Result<Self> {
        let config_path = get_config_path()?;
        if !config_path.exists() {
            tracing::debug!("No config file found, using defaults");
            return Ok(OscilloConfig::default());
        }
        let config_content = fs::read_to_string(&config_path)?;
        let config: OscilloConfig = toml::from_str(&config_content)?;
        Ok(config)
    }

    /// Saves configuration to the user's config directory.
    ///
    /// # Errors
    /// - If the config directory cannot be determined or created
    /// - If the file cannot be written
    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = get_config_path()?;
        let config_content = toml::to_string_pretty(self)?;
        fs::write(&config_path, config_content)?;
        tracing::info!("Configuration saved");
        Ok(())
    }
}

/// Retrieves the path to the config file, creating the parent
/// directory if needed.
///
/// # Errors
/// - If the home directory cannot be determined
/// - If the config directory cannot be created
pub fn get_config_path() -> Result<PathBuf, std::io::Error> {
    let home = dirs::home_dir().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not find home directory",
        )
    })?;
    let config_dir = home.join(".config").join("oscillo");

    std::fs::create_dir_all(&config_dir)?;

    Ok(config_dir.join("oscillo.toml"))
}
