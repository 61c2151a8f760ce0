//! Object segmentation module
//!
//! Extracts the dominant foreground object inside a rectangle as an
//! alpha-masked cutout.
//!
//! # Strategies
//!
//! Tried in order until one yields a usable mask:
//!
//! 1. **Matting** ([`matting`]) - external background-removal model
//! 2. **Graph-cut** ([`graphcut`]) - GrabCut refinement seeded from a
//!    [`saliency`] map, or from the whole region when saliency seeding is
//!    switched off. A detector that is unsupported or fails hands over to
//!    the full region.
//! 3. **Full region** - keep every pixel of the rectangle
//!
//! The saliency detector and the graph-cut solver come from OpenCV and are
//! only compiled with the `opencv` feature. Without it strategy 2 always
//! declines.
//!
//! Strategy failures are logged and never surface; the only fatal error is
//! an image with no pixels.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use image::{Rgba, RgbaImage};
//! use investigator::{NoMatting, Rect, SegmentOptions, SegmentationPipeline, SelectionSet};
//!
//! let options = SegmentOptions::builder().use_saliency(false).build();
//! let pipeline = SegmentationPipeline::new(Arc::new(NoMatting), &options);
//!
//! let image = RgbaImage::from_pixel(50, 50, Rgba([90, 90, 90, 255]));
//! let selections = SelectionSet::from(vec![Rect::new(5, 5, 20, 20)]);
//!
//! let cutout = pipeline.extract(&image, &selections).unwrap();
//! assert_eq!(cutout.image.dimensions(), (20, 20));
//! ```

pub mod graphcut;
pub mod matting;
mod pipeline;
pub mod saliency;
mod types;

// Re-export public API
pub use graphcut::GraphCut;
pub use matting::{CommandMatting, MattingParams, MattingProvider, NoMatting};
pub use pipeline::{
    Extraction, FullRegionStrategy, GraphCutStrategy, MattingStrategy, SegmentContext,
    SegmentationPipeline, SegmentationStrategy,
};
#[cfg(feature = "opencv")]
pub use saliency::FineGrainedSaliency;
pub use saliency::{default_detector, seed_from_saliency, SaliencyDetector, UnsupportedSaliency};
pub use types::{
    foreground_count, full_mask, has_foreground, segmentation_roi, GraphCutError, Label, Mask,
    MattingError, Result, SaliencyError, SegmentError, SegmentOptions, SegmentOptionsBuilder,
    Trimap, MASK_BACKGROUND, MASK_FOREGROUND,
};
