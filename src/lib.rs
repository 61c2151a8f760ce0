//! investigator - region redaction and object extraction for still images
//!
//! # Modules
//!
//! - [`selection`] - rectangles and selection sets
//! - [`editor`] - crop, blackout and blur over selections
//! - [`segment`] - cascading foreground extraction (matting, graph-cut, full region)
//! - [`enhance`] - alpha tightening, CLAHE and unsharp masking of cutouts
//! - [`codec`] - base64 image transport
//! - [`config`] - TOML configuration
//! - `web` - HTTP API (feature `web`)
//!
//! Saliency, graph-cut refinement and CLAHE run on OpenCV and need the
//! `opencv` feature.
//!
//! # Example
//!
//! ```rust
//! use image::{Rgba, RgbaImage};
//! use investigator::{Investigator, RedactOp, Rect, SelectionSet};
//!
//! let image = RgbaImage::from_pixel(100, 100, Rgba([200, 200, 200, 255]));
//! let selections = SelectionSet::new().add(Rect::new(10, 10, 20, 20));
//!
//! let investigator = Investigator::default();
//! let cropped = investigator.redact(RedactOp::Crop, &image, &selections);
//! assert_eq!(cropped.dimensions(), (20, 20));
//! ```

pub mod cli;
pub mod codec;
pub mod config;
#[cfg(feature = "opencv")]
mod cv;
pub mod editor;
pub mod enhance;
pub mod segment;
pub mod selection;
pub mod service;

#[cfg(feature = "web")]
pub mod web;

// Re-exports for convenience
pub use cli::{Cli, Commands, RedactArgs, SelectObjectArgs};
pub use codec::{decode_image, encode_image, encode_png, CodecError};
pub use config::{CliOverrides, Config, ConfigError};
pub use editor::{EditorOptions, EditorOptionsBuilder, RedactOp, RegionEditor};
pub use enhance::{EnhanceOptions, EnhanceOptionsBuilder, PostProcessor};
pub use segment::{
    CommandMatting, Extraction, GraphCut, MattingError, MattingParams,
    MattingProvider, NoMatting, SaliencyDetector, SegmentError, SegmentOptions,
    SegmentOptionsBuilder, SegmentationPipeline, SegmentationStrategy, UnsupportedSaliency,
};
pub use selection::{ClampedRegion, Rect, SelectionSet};
pub use service::Investigator;

#[cfg(feature = "web")]
pub use cli::ServeArgs;
#[cfg(feature = "web")]
pub use web::{ServerConfig, WebServer};

/// Process exit codes
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL_ERROR: i32 = 1;
    pub const INVALID_ARGS: i32 = 2;
    pub const INPUT_NOT_FOUND: i32 = 3;
}
