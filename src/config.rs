//! Application configuration, read from an optional TOML file.
//!
//! Every section and field has a default, so an absent file or a partial one
//! is valid. A file that exists but does not parse is an error.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

pub const DEFAULT_CONFIG_FILE: &str = "detectview.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub logging: LoggingConfig,
    pub database: DatabaseConfig,
    pub render: RenderConfig,
    pub detector: DetectorConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// env_logger filter directive, e.g. `"info"` or `"staging=debug"`
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("detections.db"),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// TrueType font for captions and plot text. When unset a few common
    /// system locations are tried.
    pub font_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    pub min_area: u32,
    pub min_radius: f32,
    pub max_radius: f32,
    pub circularity_threshold: f32,
    pub brightness_threshold: f32,
    pub blur_sigma: f32,
    pub canny_low: f32,
    pub canny_high: f32,
    pub max_detections: usize,
    /// Reuse the last detection result for the same image path
    pub cache_results: bool,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            min_area: 10,
            min_radius: 10.0,
            max_radius: 200.0,
            circularity_threshold: 2.0,
            brightness_threshold: 200.0,
            blur_sigma: 1.5,
            canny_low: 50.0,
            canny_high: 100.0,
            max_detections: 20,
            cache_results: false,
        }
    }
}

impl Config {
    pub fn from_toml_str(source: &str) -> anyhow::Result<Self> {
        toml::from_str(source).context("Invalid configuration")
    }

    /// Load `path`, or the defaults when the file does not exist.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Ok(Self::default());
        }
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        Self::from_toml_str(&source).with_context(|| format!("In config file {:?}", path))
    }
}
