//! Redaction operators

use image::{imageops, Rgba, RgbaImage};
use rayon::prelude::*;

use super::types::{EditorOptions, RedactOp};
use crate::selection::{ClampedRegion, SelectionSet};

/// Opaque black used by blackout
const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Applies redaction operators to RGBA buffers
#[derive(Debug, Clone, Default)]
pub struct RegionEditor {
    options: EditorOptions,
}

impl RegionEditor {
    /// Create an editor with the given options
    pub fn new(options: EditorOptions) -> Self {
        Self { options }
    }

    /// Get the editor options
    pub fn options(&self) -> &EditorOptions {
        &self.options
    }

    /// Dispatch to the operator named by `op`
    pub fn apply(&self, op: RedactOp, image: &RgbaImage, selections: &SelectionSet) -> RgbaImage {
        match op {
            RedactOp::Crop => self.crop(image, selections),
            RedactOp::Blackout => self.blackout(image, selections),
            RedactOp::Blur => self.blur(image, selections),
        }
    }

    /// Crop to the first rectangle.
    ///
    /// An empty selection set returns a copy of the input. A rectangle that
    /// does not intersect the image yields a 0x0 buffer.
    pub fn crop(&self, image: &RgbaImage, selections: &SelectionSet) -> RgbaImage {
        let Some(rect) = selections.first() else {
            return image.clone();
        };

        let region = rect.clamp_to(image.width(), image.height());
        if region.is_empty() {
            tracing::debug!(?rect, "crop rectangle misses the image");
            return RgbaImage::new(0, 0);
        }

        extract(image, &region)
    }

    /// Fill every rectangle with opaque black, in set order.
    pub fn blackout(&self, image: &RgbaImage, selections: &SelectionSet) -> RgbaImage {
        let mut output = image.clone();

        for rect in selections {
            let region = rect.clamp_to(image.width(), image.height());
            for y in region.top..region.bottom {
                for x in region.left..region.right {
                    output.put_pixel(x, y, BLACK);
                }
            }
        }

        output
    }

    /// Gaussian-blur every rectangle.
    ///
    /// Each region is read from the untouched input, so overlapping
    /// rectangles do not compound. Results are pasted in set order and a later
    /// rectangle overwrites an earlier one where they overlap.
    pub fn blur(&self, image: &RgbaImage, selections: &SelectionSet) -> RgbaImage {
        let sigma = self.options.blur_radius;

        let regions: Vec<ClampedRegion> = selections
            .iter()
            .map(|rect| rect.clamp_to(image.width(), image.height()))
            .filter(|region| !region.is_empty())
            .collect();

        let patches: Vec<(ClampedRegion, RgbaImage)> = regions
            .into_par_iter()
            .map(|region| {
                let patch = extract(image, &region);
                let blurred = if sigma > 0.0 {
                    imageproc::filter::gaussian_blur_f32(&patch, sigma)
                } else {
                    patch
                };
                (region, blurred)
            })
            .collect();

        let mut output = image.clone();
        for (region, patch) in &patches {
            imageops::replace(&mut output, patch, region.left as i64, region.top as i64);
        }

        output
    }
}

/// Copy a non-empty clamped region out of `image`
pub(crate) fn extract(image: &RgbaImage, region: &ClampedRegion) -> RgbaImage {
    imageops::crop_imm(image, region.left, region.top, region.width(), region.height()).to_image()
}
