//! Configuration file support
//!
//! Settings are read from TOML. Lookup order:
//!
//! 1. `--config <path>` on the command line
//! 2. `<config_dir>/investigator/config.toml` (e.g. `~/.config` on Linux)
//! 3. Built-in defaults
//!
//! Command-line flags override file values through [`CliOverrides`].
//!
//! ```toml
//! [server]
//! port = 8000
//! bind = "0.0.0.0"
//!
//! [segment]
//! matting_command = "rembg"
//! graph_cut_iterations = 3
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::editor::{EditorOptions, DEFAULT_BLUR_RADIUS};
use crate::enhance::EnhanceOptions;
use crate::segment::matting::{
    DEFAULT_BACKGROUND_THRESHOLD, DEFAULT_ERODE_SIZE, DEFAULT_FOREGROUND_THRESHOLD,
    DEFAULT_MATTING_COMMAND, DEFAULT_MATTING_TIMEOUT_SECS,
};
use crate::segment::graphcut::DEFAULT_ITERATIONS;
use crate::segment::{MattingParams, SegmentOptions};

// ============================================================
// Constants
// ============================================================

/// Application directory under the platform config dir
const APP_DIR: &str = "investigator";

/// Config file name
const CONFIG_FILE: &str = "config.toml";

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 8000;

/// Default bind address
pub const DEFAULT_BIND: &str = "0.0.0.0";

/// Default request body limit in megabytes
pub const DEFAULT_UPLOAD_LIMIT_MB: usize = 50;

// ============================================================
// Error Types
// ============================================================

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

// ============================================================
// Sections
// ============================================================

/// `[server]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub port: u16,
    pub bind: String,
    pub upload_limit_mb: usize,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind: DEFAULT_BIND.to_string(),
            upload_limit_mb: DEFAULT_UPLOAD_LIMIT_MB,
        }
    }
}

/// `[editor]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSection {
    pub blur_radius: f32,
}

impl Default for EditorSection {
    fn default() -> Self {
        Self {
            blur_radius: DEFAULT_BLUR_RADIUS,
        }
    }
}

/// `[segment]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentSection {
    pub graph_cut_iterations: usize,
    pub saliency: bool,
    /// Background-removal executable; empty disables matting
    pub matting_command: String,
    /// Model name passed to the executable
    pub matting_model: Option<String>,
    pub matting_timeout_secs: u64,
    pub alpha_matting: bool,
    pub foreground_threshold: u8,
    pub background_threshold: u8,
    pub erode_size: u32,
}

impl Default for SegmentSection {
    fn default() -> Self {
        Self {
            graph_cut_iterations: DEFAULT_ITERATIONS,
            saliency: true,
            matting_command: DEFAULT_MATTING_COMMAND.to_string(),
            matting_model: None,
            matting_timeout_secs: DEFAULT_MATTING_TIMEOUT_SECS,
            alpha_matting: true,
            foreground_threshold: DEFAULT_FOREGROUND_THRESHOLD,
            background_threshold: DEFAULT_BACKGROUND_THRESHOLD,
            erode_size: DEFAULT_ERODE_SIZE,
        }
    }
}

/// `[enhance]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnhanceSection {
    pub clahe_clip_limit: f32,
    pub clahe_tiles: u32,
    pub sharpen_sigma: f32,
    pub sharpen_amount: f32,
}

impl Default for EnhanceSection {
    fn default() -> Self {
        let defaults = EnhanceOptions::default();
        Self {
            clahe_clip_limit: defaults.clahe_clip_limit,
            clahe_tiles: defaults.clahe_tiles,
            sharpen_sigma: defaults.sharpen_sigma,
            sharpen_amount: defaults.sharpen_amount,
        }
    }
}

// ============================================================
// Config
// ============================================================

/// Complete configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerSection,
    pub editor: EditorSection,
    pub segment: SegmentSection,
    pub enhance: EnhanceSection,
}

/// Values given on the command line; `None` keeps the file value
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub port: Option<u16>,
    pub bind: Option<String>,
    pub upload_limit_mb: Option<usize>,
    pub blur_radius: Option<f32>,
    pub matting_command: Option<String>,
    pub no_matting: bool,
    pub no_saliency: bool,
    pub graph_cut_iterations: Option<usize>,
}

impl CliOverrides {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Config {
    /// Default config file location
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Load from the default location, falling back to defaults when absent
    pub fn load() -> Result<Self, ConfigError> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load_from_path(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load from an explicit path
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(path = %path.display(), "config loaded");
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Apply command-line overrides (CLI wins)
    #[must_use]
    pub fn merge_with_cli(mut self, cli: &CliOverrides) -> Self {
        if let Some(port) = cli.port {
            self.server.port = port;
        }
        if let Some(bind) = &cli.bind {
            self.server.bind = bind.clone();
        }
        if let Some(limit) = cli.upload_limit_mb {
            self.server.upload_limit_mb = limit;
        }
        if let Some(radius) = cli.blur_radius {
            self.editor.blur_radius = radius;
        }
        if let Some(command) = &cli.matting_command {
            self.segment.matting_command = command.clone();
        }
        if cli.no_matting {
            self.segment.matting_command.clear();
        }
        if cli.no_saliency {
            self.segment.saliency = false;
        }
        if let Some(iterations) = cli.graph_cut_iterations {
            self.segment.graph_cut_iterations = iterations;
        }
        self
    }

    pub fn editor_options(&self) -> EditorOptions {
        EditorOptions::builder()
            .blur_radius(self.editor.blur_radius)
            .build()
    }

    pub fn segment_options(&self) -> SegmentOptions {
        let s = &self.segment;
        SegmentOptions::builder()
            .graph_cut_iterations(s.graph_cut_iterations)
            .use_saliency(s.saliency)
            .matting(MattingParams {
                alpha_matting: s.alpha_matting,
                foreground_threshold: s.foreground_threshold,
                background_threshold: s.background_threshold,
                erode_size: s.erode_size,
            })
            .build()
    }

    pub fn enhance_options(&self) -> EnhanceOptions {
        let e = &self.enhance;
        EnhanceOptions::builder()
            .clahe_clip_limit(e.clahe_clip_limit)
            .clahe_tiles(e.clahe_tiles)
            .sharpen_sigma(e.sharpen_sigma)
            .sharpen_amount(e.sharpen_amount)
            .build()
    }

    pub fn matting_timeout(&self) -> Duration {
        Duration::from_secs(self.segment.matting_timeout_secs)
    }

    pub fn upload_limit_bytes(&self) -> usize {
        self.server.upload_limit_mb.saturating_mul(1024 * 1024)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.server.bind, "0.0.0.0");
        assert_eq!(config.editor.blur_radius, 10.0);
        assert_eq!(config.segment.graph_cut_iterations, 3);
        assert_eq!(config.segment.foreground_threshold, 240);
        assert_eq!(config.segment.background_threshold, 10);
        assert_eq!(config.segment.erode_size, 10);
        assert_eq!(config.enhance.clahe_tiles, 8);
    }

    #[test]
    fn test_partial_toml() {
        let config = Config::from_toml_str(
            r#"
            [server]
            port = 9100

            [segment]
            saliency = false
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 9100);
        assert_eq!(config.server.bind, DEFAULT_BIND);
        assert!(!config.segment.saliency);
        assert_eq!(config.segment.matting_command, "rembg");
    }

    #[test]
    fn test_invalid_toml() {
        let result = Config::from_toml_str("[server]\nport = \"high\"");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = Config::default();
        config.segment.matting_model = Some("u2net".to_string());
        let text = config.to_toml().unwrap();
        assert_eq!(Config::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_load_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[editor]\nblur_radius = 4.5\n").unwrap();

        let config = Config::load_from_path(&path).unwrap();
        assert_eq!(config.editor.blur_radius, 4.5);

        let missing = Config::load_from_path(&dir.path().join("nope.toml"));
        assert!(matches!(missing, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn test_merge_with_cli() {
        let overrides = CliOverrides {
            port: Some(1234),
            no_matting: true,
            no_saliency: true,
            ..CliOverrides::new()
        };
        let config = Config::default().merge_with_cli(&overrides);
        assert_eq!(config.server.port, 1234);
        assert!(config.segment.matting_command.is_empty());
        assert!(!config.segment.saliency);
        assert_eq!(config.server.bind, DEFAULT_BIND);
    }

    #[test]
    fn test_option_conversions() {
        let mut config = Config::default();
        config.segment.graph_cut_iterations = 0;
        config.editor.blur_radius = 2.0;

        assert_eq!(config.segment_options().graph_cut_iterations, 1);
        assert_eq!(config.editor_options().blur_radius, 2.0);
        assert_eq!(config.enhance_options(), EnhanceOptions::default());
        assert_eq!(config.upload_limit_bytes(), 50 * 1024 * 1024);
        assert_eq!(config.matting_timeout(), Duration::from_secs(30));
    }
}
