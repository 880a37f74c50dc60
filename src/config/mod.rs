//! Configuration management for oscillo.
//!
//! Handles loading and saving application configuration from TOML
//! files in the user's config directory.

pub mod file;

pub use file::{get_config_path, OscilloConfig, VisualizerConfig};
