//! Segmentation core types
//!
//! Error enums for the pipeline and its collaborators, the binary [`Mask`]
//! and the [`Trimap`] that seeds graph-cut refinement.

use image::{GrayImage, Luma};
use thiserror::Error;

use super::graphcut::DEFAULT_ITERATIONS;
use super::matting::MattingParams;
use crate::selection::{ClampedRegion, Rect};

// ============================================================
// Constants
// ============================================================

/// Mask value for foreground
pub const MASK_FOREGROUND: u8 = 255;

/// Mask value for background
pub const MASK_BACKGROUND: u8 = 0;

// ============================================================
// Error Types
// ============================================================

/// Fatal segmentation errors returned to the caller
#[derive(Debug, Error)]
pub enum SegmentError {
    #[error("Image has zero area ({0}x{1})")]
    EmptyImage(u32, u32),

    #[error("No segmentation strategy produced a mask")]
    StrategiesExhausted,
}

/// Matting collaborator errors
#[derive(Debug, Error)]
pub enum MattingError {
    #[error("Matting provider unavailable: {0}")]
    Unavailable(String),

    #[error("Matting timed out after {0} seconds")]
    Timeout(u64),

    #[error("Matting failed: {0}")]
    Failed(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Saliency detector errors
#[derive(Debug, Error)]
pub enum SaliencyError {
    #[error("Saliency detection unsupported")]
    Unsupported,

    #[error("Region too small for saliency: {0}x{1}")]
    TooSmall(u32, u32),

    #[error("Saliency backend error: {0}")]
    Backend(String),
}

#[cfg(feature = "opencv")]
impl From<opencv::Error> for SaliencyError {
    fn from(e: opencv::Error) -> Self {
        SaliencyError::Backend(e.to_string())
    }
}

/// Graph-cut solver errors
#[derive(Debug, Error)]
pub enum GraphCutError {
    #[error("No {0} samples to build a colour model from")]
    EmptySampleSet(&'static str),

    #[error("Graph-cut solver not available in this build")]
    Unavailable,

    #[error("Graph-cut solver error: {0}")]
    Backend(String),

    #[error("Trimap is {trimap:?} but image is {image:?}")]
    DimensionMismatch {
        trimap: (u32, u32),
        image: (u32, u32),
    },

    #[error("Empty region of interest")]
    EmptyRegion,
}

#[cfg(feature = "opencv")]
impl From<opencv::Error> for GraphCutError {
    fn from(e: opencv::Error) -> Self {
        GraphCutError::Backend(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SegmentError>;

// ============================================================
// Mask
// ============================================================

/// Binary single-channel mask, 255 = foreground, 0 = background
pub type Mask = GrayImage;

/// Mask of the given size with every pixel set to foreground
pub fn full_mask(width: u32, height: u32) -> Mask {
    GrayImage::from_pixel(width, height, Luma([MASK_FOREGROUND]))
}

/// Whether any pixel of the mask is foreground
pub fn has_foreground(mask: &Mask) -> bool {
    mask.as_raw().iter().any(|&v| v != MASK_BACKGROUND)
}

/// Number of foreground pixels
pub fn foreground_count(mask: &Mask) -> usize {
    mask.as_raw().iter().filter(|&&v| v != MASK_BACKGROUND).count()
}

// ============================================================
// Region of interest
// ============================================================

/// Clamp `rect` for segmentation, forcing at least one pixel on each axis.
///
/// Returns `None` only when the image itself has no pixels.
pub fn segmentation_roi(rect: &Rect, width: u32, height: u32) -> Option<ClampedRegion> {
    if width == 0 || height == 0 {
        return None;
    }

    let (w, h) = (width as i64, height as i64);
    let left = (rect.x as i64).clamp(0, w - 1);
    let top = (rect.y as i64).clamp(0, h - 1);
    let right = rect.right().min(w).max(left + 1);
    let bottom = rect.bottom().min(h).max(top + 1);

    Some(ClampedRegion {
        left: left as u32,
        top: top as u32,
        right: right as u32,
        bottom: bottom as u32,
    })
}

// ============================================================
// Trimap
// ============================================================

/// Per-pixel graph-cut label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Label {
    /// Hard background, never relabelled
    Background,
    /// Hard foreground, never relabelled
    Foreground,
    ProbableBackground,
    ProbableForeground,
}

impl Label {
    /// Definite or probable foreground
    pub fn is_foreground(self) -> bool {
        matches!(self, Label::Foreground | Label::ProbableForeground)
    }

    /// Labels the solver is allowed to change
    pub fn is_probable(self) -> bool {
        matches!(self, Label::ProbableBackground | Label::ProbableForeground)
    }
}

/// Full-image labelling used to seed and record graph-cut segmentation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trimap {
    width: u32,
    height: u32,
    labels: Vec<Label>,
}

impl Trimap {
    /// Trimap with every pixel set to `label`
    pub fn new(width: u32, height: u32, label: Label) -> Self {
        Self {
            width,
            height,
            labels: vec![label; width as usize * height as usize],
        }
    }

    /// Seeded trimap: outside `roi` is background, inside is probable
    /// foreground where `seed` is set and probable background elsewhere.
    ///
    /// `seed` is in ROI coordinates.
    pub fn from_seed(width: u32, height: u32, roi: &ClampedRegion, seed: &Mask) -> Self {
        let mut trimap = Self::new(width, height, Label::Background);

        for y in roi.top..roi.bottom {
            for x in roi.left..roi.right {
                let (sx, sy) = (x - roi.left, y - roi.top);
                let seeded = sx < seed.width()
                    && sy < seed.height()
                    && seed.get_pixel(sx, sy)[0] != MASK_BACKGROUND;
                let label = if seeded {
                    Label::ProbableForeground
                } else {
                    Label::ProbableBackground
                };
                trimap.set(x, y, label);
            }
        }

        trimap
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    pub fn get(&self, x: u32, y: u32) -> Label {
        self.labels[self.index(x, y)]
    }

    pub fn set(&mut self, x: u32, y: u32, label: Label) {
        let idx = self.index(x, y);
        self.labels[idx] = label;
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    /// Collapse the labels inside `roi` to a binary mask in ROI coordinates
    pub fn foreground_mask(&self, roi: &ClampedRegion) -> Mask {
        GrayImage::from_fn(roi.width(), roi.height(), |x, y| {
            if self.get(roi.left + x, roi.top + y).is_foreground() {
                Luma([MASK_FOREGROUND])
            } else {
                Luma([MASK_BACKGROUND])
            }
        })
    }
}

// ============================================================
// Options
// ============================================================

/// Maximum graph-cut iterations accepted by the builder
const MAX_GRAPH_CUT_ITERATIONS: usize = 20;

/// Options for the segmentation pipeline
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentOptions {
    /// Graph-cut refinement iterations
    pub graph_cut_iterations: usize,
    /// Seed graph-cut from a saliency map (otherwise the whole ROI)
    pub use_saliency: bool,
    /// Parameters handed to the matting provider
    pub matting: MattingParams,
}

impl Default for SegmentOptions {
    fn default() -> Self {
        Self {
            graph_cut_iterations: DEFAULT_ITERATIONS,
            use_saliency: true,
            matting: MattingParams::default(),
        }
    }
}

impl SegmentOptions {
    /// Create a builder
    pub fn builder() -> SegmentOptionsBuilder {
        SegmentOptionsBuilder::default()
    }
}

/// Builder for SegmentOptions
#[derive(Debug, Default)]
pub struct SegmentOptionsBuilder {
    options: SegmentOptions,
}

impl SegmentOptionsBuilder {
    /// Set graph-cut iterations (1-20)
    #[must_use]
    pub fn graph_cut_iterations(mut self, iterations: usize) -> Self {
        self.options.graph_cut_iterations = iterations.clamp(1, MAX_GRAPH_CUT_ITERATIONS);
        self
    }

    /// Enable or disable saliency seeding
    #[must_use]
    pub fn use_saliency(mut self, enabled: bool) -> Self {
        self.options.use_saliency = enabled;
        self
    }

    /// Set matting parameters
    #[must_use]
    pub fn matting(mut self, params: MattingParams) -> Self {
        self.options.matting = params;
        self
    }

    /// Build the options
    #[must_use]
    pub fn build(self) -> SegmentOptions {
        self.options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segmentation_roi_inside() {
        let roi = segmentation_roi(&Rect::new(10, 10, 20, 20), 100, 100).unwrap();
        assert_eq!((roi.left, roi.top, roi.width(), roi.height()), (10, 10, 20, 20));
    }

    #[test]
    fn test_segmentation_roi_zero_area_coerced() {
        let roi = segmentation_roi(&Rect::new(5, 5, 0, 0), 100, 100).unwrap();
        assert_eq!((roi.left, roi.top, roi.width(), roi.height()), (5, 5, 1, 1));

        let roi = segmentation_roi(&Rect::new(5, 5, -10, 3), 100, 100).unwrap();
        assert_eq!((roi.width(), roi.height()), (1, 3));
    }

    #[test]
    fn test_segmentation_roi_outside_coerced_to_edge() {
        let roi = segmentation_roi(&Rect::new(500, -20, 10, 10), 100, 100).unwrap();
        assert_eq!((roi.left, roi.top, roi.width(), roi.height()), (99, 0, 1, 1));
    }

    #[test]
    fn test_segmentation_roi_empty_image() {
        assert!(segmentation_roi(&Rect::new(0, 0, 10, 10), 0, 10).is_none());
    }

    #[test]
    fn test_trimap_from_seed() {
        let roi = ClampedRegion { left: 2, top: 2, right: 6, bottom: 6 };
        let mut seed = GrayImage::new(4, 4);
        seed.put_pixel(1, 1, Luma([255]));

        let trimap = Trimap::from_seed(8, 8, &roi, &seed);
        assert_eq!(trimap.get(0, 0), Label::Background);
        assert_eq!(trimap.get(7, 7), Label::Background);
        assert_eq!(trimap.get(3, 3), Label::ProbableForeground);
        assert_eq!(trimap.get(2, 2), Label::ProbableBackground);
        assert_eq!(trimap.get(5, 5), Label::ProbableBackground);
    }

    #[test]
    fn test_trimap_foreground_mask() {
        let roi = ClampedRegion { left: 1, top: 1, right: 4, bottom: 3 };
        let mut trimap = Trimap::new(5, 5, Label::Background);
        trimap.set(1, 1, Label::Foreground);
        trimap.set(3, 2, Label::ProbableForeground);
        trimap.set(2, 2, Label::ProbableBackground);

        let mask = trimap.foreground_mask(&roi);
        assert_eq!(mask.dimensions(), (3, 2));
        assert_eq!(mask.get_pixel(0, 0)[0], MASK_FOREGROUND);
        assert_eq!(mask.get_pixel(2, 1)[0], MASK_FOREGROUND);
        assert_eq!(mask.get_pixel(1, 1)[0], MASK_BACKGROUND);
        assert_eq!(foreground_count(&mask), 2);
    }

    #[test]
    fn test_label_predicates() {
        assert!(Label::Foreground.is_foreground());
        assert!(Label::ProbableForeground.is_foreground());
        assert!(!Label::ProbableBackground.is_foreground());
        assert!(Label::ProbableBackground.is_probable());
        assert!(!Label::Background.is_probable());
    }

    #[test]
    fn test_full_mask() {
        let mask = full_mask(3, 2);
        assert!(has_foreground(&mask));
        assert_eq!(foreground_count(&mask), 6);
        assert!(!has_foreground(&GrayImage::new(3, 2)));
    }

    #[test]
    fn test_segment_options_builder() {
        let options = SegmentOptions::builder()
            .graph_cut_iterations(0)
            .use_saliency(false)
            .build();
        assert_eq!(options.graph_cut_iterations, 1);
        assert!(!options.use_saliency);
        assert_eq!(options.matting, MattingParams::default());

        let options = SegmentOptions::builder().graph_cut_iterations(99).build();
        assert_eq!(options.graph_cut_iterations, MAX_GRAPH_CUT_ITERATIONS);
    }
}
