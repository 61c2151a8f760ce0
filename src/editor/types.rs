//! Region editor types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================
// Constants
// ============================================================

/// Default Gaussian blur radius in pixels
pub const DEFAULT_BLUR_RADIUS: f32 = 10.0;

/// Upper bound for the configurable blur radius
const MAX_BLUR_RADIUS: f32 = 200.0;

// ============================================================
// Types
// ============================================================

/// Redaction operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RedactOp {
    Crop,
    Blackout,
    Blur,
}

impl fmt::Display for RedactOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RedactOp::Crop => write!(f, "crop"),
            RedactOp::Blackout => write!(f, "blackout"),
            RedactOp::Blur => write!(f, "blur"),
        }
    }
}

impl FromStr for RedactOp {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "crop" => Ok(RedactOp::Crop),
            "blackout" => Ok(RedactOp::Blackout),
            "blur" => Ok(RedactOp::Blur),
            other => Err(format!("unknown operator: {}", other)),
        }
    }
}

/// Options for the region editor
#[derive(Debug, Clone, PartialEq)]
pub struct EditorOptions {
    /// Gaussian blur radius (standard deviation) in pixels
    pub blur_radius: f32,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            blur_radius: DEFAULT_BLUR_RADIUS,
        }
    }
}

impl EditorOptions {
    /// Create a builder
    pub fn builder() -> EditorOptionsBuilder {
        EditorOptionsBuilder::default()
    }
}

/// Builder for EditorOptions
#[derive(Debug, Default)]
pub struct EditorOptionsBuilder {
    options: EditorOptions,
}

impl EditorOptionsBuilder {
    /// Set blur radius
    #[must_use]
    pub fn blur_radius(mut self, radius: f32) -> Self {
        self.options.blur_radius = radius.clamp(0.0, MAX_BLUR_RADIUS);
        self
    }

    /// Build the options
    #[must_use]
    pub fn build(self) -> EditorOptions {
        self.options
    }
}
