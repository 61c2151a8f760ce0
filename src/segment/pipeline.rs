//! Cascading object extraction
//!
//! Strategies are tried in order and the first one that yields a usable
//! mask wins. Failures of individual strategies are logged and never reach
//! the caller.

use std::fmt;
use std::sync::Arc;

use image::buffer::ConvertBuffer;
use image::{imageops, GrayImage, Luma, Rgba, RgbImage, RgbaImage};

use super::graphcut::GraphCut;
use super::matting::{MattingParams, MattingProvider};
use super::saliency::{default_detector, seed_from_saliency, SaliencyDetector};
use super::types::{
    full_mask, has_foreground, segmentation_roi, Mask, Result, SegmentError, SegmentOptions,
    Trimap, MASK_BACKGROUND, MASK_FOREGROUND,
};
use crate::enhance::PostProcessor;
use crate::selection::{ClampedRegion, Rect, SelectionSet};

// ============================================================
// Constants
// ============================================================

/// Matte alpha above this value counts as foreground
const MATTE_ALPHA_CUTOFF: u8 = 127;

// ============================================================
// Strategy trait
// ============================================================

/// Inputs shared by every strategy for one extraction
#[derive(Debug)]
pub struct SegmentContext<'a> {
    /// Full source image
    pub image: &'a RgbaImage,
    /// Clamped region of interest, at least 1x1
    pub roi: ClampedRegion,
    /// Pixels of the region of interest
    pub roi_image: RgbaImage,
}

impl<'a> SegmentContext<'a> {
    pub fn new(image: &'a RgbaImage, roi: ClampedRegion) -> Self {
        let roi_image =
            imageops::crop_imm(image, roi.left, roi.top, roi.width(), roi.height()).to_image();
        Self {
            image,
            roi,
            roi_image,
        }
    }
}

/// One way of producing a foreground mask for the region of interest
pub trait SegmentationStrategy: Send + Sync {
    /// Identifier reported with the result and in logs
    fn name(&self) -> &'static str;

    /// ROI-sized mask, or `None` when this strategy cannot produce a usable one
    fn attempt(&self, ctx: &SegmentContext<'_>) -> Option<Mask>;
}

// ============================================================
// Strategies
// ============================================================

/// Background removal through a [`MattingProvider`]
pub struct MattingStrategy {
    provider: Arc<dyn MattingProvider>,
    params: MattingParams,
}

impl MattingStrategy {
    pub fn new(provider: Arc<dyn MattingProvider>, params: MattingParams) -> Self {
        Self { provider, params }
    }
}

impl SegmentationStrategy for MattingStrategy {
    fn name(&self) -> &'static str {
        "matting"
    }

    fn attempt(&self, ctx: &SegmentContext<'_>) -> Option<Mask> {
        if !self.provider.is_available() {
            tracing::debug!(provider = self.provider.name(), "matting provider unavailable");
            return None;
        }

        let matte = match self.provider.matte(&ctx.roi_image, &self.params) {
            Ok(matte) => matte,
            Err(e) => {
                tracing::warn!(provider = self.provider.name(), error = %e, "matting failed");
                return None;
            }
        };

        if matte.dimensions() != ctx.roi_image.dimensions() {
            tracing::warn!(
                expected = ?ctx.roi_image.dimensions(),
                actual = ?matte.dimensions(),
                "matte has wrong dimensions"
            );
            return None;
        }

        let mask = GrayImage::from_fn(matte.width(), matte.height(), |x, y| {
            if matte.get_pixel(x, y)[3] > MATTE_ALPHA_CUTOFF {
                Luma([MASK_FOREGROUND])
            } else {
                Luma([MASK_BACKGROUND])
            }
        });

        if !has_foreground(&mask) {
            tracing::debug!("matte has no foreground");
            return None;
        }
        Some(mask)
    }
}

/// Graph-cut refinement seeded from a saliency map.
///
/// Without a detector the whole ROI is the seed. A detector that is
/// unsupported or fails makes the strategy decline, so the full-region
/// fallback keeps every pixel of the rectangle.
pub struct GraphCutStrategy {
    saliency: Option<Arc<dyn SaliencyDetector>>,
    graph_cut: GraphCut,
}

impl GraphCutStrategy {
    pub fn new(saliency: Option<Arc<dyn SaliencyDetector>>, graph_cut: GraphCut) -> Self {
        Self {
            saliency,
            graph_cut,
        }
    }

    fn seed(&self, roi_rgb: &RgbImage) -> Option<Mask> {
        let (width, height) = roi_rgb.dimensions();
        let Some(detector) = &self.saliency else {
            return Some(full_mask(width, height));
        };

        match detector.saliency_map(roi_rgb) {
            Ok(map) => Some(seed_from_saliency(&map)),
            Err(e) => {
                tracing::debug!(error = %e, "saliency unavailable, deferring to full region");
                None
            }
        }
    }
}

impl SegmentationStrategy for GraphCutStrategy {
    fn name(&self) -> &'static str {
        "graph_cut"
    }

    fn attempt(&self, ctx: &SegmentContext<'_>) -> Option<Mask> {
        let roi_rgb: RgbImage = ctx.roi_image.convert();
        let seed = self.seed(&roi_rgb)?;

        let (width, height) = ctx.image.dimensions();
        let mut trimap = Trimap::from_seed(width, height, &ctx.roi, &seed);
        let image_rgb: RgbImage = ctx.image.convert();

        if let Err(e) = self.graph_cut.refine(&image_rgb, &mut trimap, &ctx.roi) {
            tracing::warn!(error = %e, "graph-cut refinement failed");
            return None;
        }

        let mask = trimap.foreground_mask(&ctx.roi);
        if !has_foreground(&mask) {
            tracing::debug!("graph-cut left no foreground");
            return None;
        }
        Some(mask)
    }
}

/// Keeps the entire region of interest
#[derive(Debug, Clone, Copy, Default)]
pub struct FullRegionStrategy;

impl SegmentationStrategy for FullRegionStrategy {
    fn name(&self) -> &'static str {
        "full_region"
    }

    fn attempt(&self, ctx: &SegmentContext<'_>) -> Option<Mask> {
        Some(full_mask(ctx.roi.width(), ctx.roi.height()))
    }
}

// ============================================================
// Pipeline
// ============================================================

/// Result of one extraction
#[derive(Debug, Clone)]
pub struct Extraction {
    /// RGBA cutout; alpha marks the object
    pub image: RgbaImage,
    /// Name of the strategy that produced the mask
    pub strategy: &'static str,
    /// Region the cutout was taken from
    pub roi: ClampedRegion,
}

/// Ordered strategies plus the post-processor applied to every cutout
pub struct SegmentationPipeline {
    strategies: Vec<Box<dyn SegmentationStrategy>>,
    post: PostProcessor,
}

impl fmt::Debug for SegmentationPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SegmentationPipeline")
            .field("strategies", &self.strategy_names())
            .field("post", &self.post)
            .finish()
    }
}

impl SegmentationPipeline {
    /// Matting, then graph-cut, then the full region
    pub fn new(matting: Arc<dyn MattingProvider>, options: &SegmentOptions) -> Self {
        let saliency = options.use_saliency.then(default_detector);

        Self::with_strategies(vec![
            Box::new(MattingStrategy::new(matting, options.matting)),
            Box::new(GraphCutStrategy::new(
                saliency,
                GraphCut::new(options.graph_cut_iterations),
            )),
            Box::new(FullRegionStrategy),
        ])
    }

    /// Custom strategy order
    pub fn with_strategies(strategies: Vec<Box<dyn SegmentationStrategy>>) -> Self {
        Self {
            strategies,
            post: PostProcessor::default(),
        }
    }

    #[must_use]
    pub fn with_post_processor(mut self, post: PostProcessor) -> Self {
        self.post = post;
        self
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    pub fn post_processor(&self) -> &PostProcessor {
        &self.post
    }

    /// Extract the object inside the first selection.
    ///
    /// An empty selection set extracts from the whole image.
    pub fn extract(&self, image: &RgbaImage, selections: &SelectionSet) -> Result<Extraction> {
        let (width, height) = image.dimensions();
        let rect = selections
            .first()
            .copied()
            .unwrap_or_else(|| Rect::new(0, 0, width as i32, height as i32));

        let roi = segmentation_roi(&rect, width, height)
            .ok_or(SegmentError::EmptyImage(width, height))?;
        let ctx = SegmentContext::new(image, roi);

        for strategy in &self.strategies {
            let Some(mask) = strategy.attempt(&ctx) else {
                tracing::debug!(strategy = strategy.name(), "strategy produced no mask");
                continue;
            };

            tracing::info!(
                strategy = strategy.name(),
                left = roi.left,
                top = roi.top,
                width = roi.width(),
                height = roi.height(),
                "object extracted"
            );
            return Ok(Extraction {
                image: compose_cutout(&ctx.roi_image, &mask),
                strategy: strategy.name(),
                roi,
            });
        }

        Err(SegmentError::StrategiesExhausted)
    }

    /// [`extract`](Self::extract) followed by tightening and enhancement
    pub fn select_object(&self, image: &RgbaImage, selections: &SelectionSet) -> Result<Extraction> {
        let mut extraction = self.extract(image, selections)?;
        extraction.image = self.post.process(&extraction.image);
        Ok(extraction)
    }
}

/// ROI colour with alpha taken from `mask`
fn compose_cutout(roi_image: &RgbaImage, mask: &Mask) -> RgbaImage {
    RgbaImage::from_fn(roi_image.width(), roi_image.height(), |x, y| {
        let c = roi_image.get_pixel(x, y).0;
        let alpha = if x < mask.width() && y < mask.height() {
            mask.get_pixel(x, y)[0]
        } else {
            MASK_BACKGROUND
        };
        Rgba([c[0], c[1], c[2], alpha])
    })
}
