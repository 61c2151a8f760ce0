//! Post-processing for extracted objects
//!
//! Every cutout from the segmentation pipeline passes through
//! [`PostProcessor::process`]:
//!
//! 1. **Tighten** - crop to the bounding box of non-transparent pixels
//! 2. **Enhance** - CLAHE on the Lab lightness channel, then an unsharp
//!    mask on the colour channels; alpha is carried through untouched.
//!    CLAHE needs the `opencv` feature and is skipped without it.
//!
//! # Example
//!
//! ```rust
//! use image::{Rgba, RgbaImage};
//! use investigator::PostProcessor;
//!
//! let mut cutout = RgbaImage::from_pixel(10, 10, Rgba([0, 0, 0, 0]));
//! cutout.put_pixel(4, 5, Rgba([200, 10, 10, 255]));
//!
//! let result = PostProcessor::default().process(&cutout);
//! assert_eq!(result.dimensions(), (1, 1));
//! assert_eq!(result.get_pixel(0, 0)[3], 255);
//! ```

mod clahe;
mod color;
mod sharpen;
mod tighten;
mod types;

pub use clahe::{Clahe, ClaheError};
pub use color::{lab_planes_to_rgb, rgb_to_lab_planes, LabPlanes};
pub use sharpen::unsharp_mask;
pub use tighten::{alpha_bounding_box, tighten_to_alpha};
pub use types::{EnhanceOptions, EnhanceOptionsBuilder};

use image::{Rgba, RgbaImage};

/// Tightening and enhancement applied to segmentation output
#[derive(Debug, Clone, Default)]
pub struct PostProcessor {
    options: EnhanceOptions,
}

impl PostProcessor {
    pub fn new(options: EnhanceOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &EnhanceOptions {
        &self.options
    }

    /// Tighten then enhance
    pub fn process(&self, cutout: &RgbaImage) -> RgbaImage {
        let tightened = tighten_to_alpha(cutout);
        self.enhance(&tightened)
    }

    /// Local contrast and sharpness enhancement; alpha is never modified
    pub fn enhance(&self, image: &RgbaImage) -> RgbaImage {
        if image.width() == 0 || image.height() == 0 {
            return image.clone();
        }

        let mut lab = rgb_to_lab_planes(image);
        let clahe = Clahe::new(self.options.clahe_clip_limit, self.options.clahe_tiles);
        match clahe.apply(&lab.lightness) {
            Ok(equalized) => lab.lightness = equalized,
            Err(e) => tracing::debug!(error = %e, "lightness left unequalized"),
        }

        let rgb = lab_planes_to_rgb(&lab);
        let sharpened = unsharp_mask(&rgb, self.options.sharpen_sigma, self.options.sharpen_amount);

        RgbaImage::from_fn(image.width(), image.height(), |x, y| {
            let c = sharpened.get_pixel(x, y).0;
            Rgba([c[0], c[1], c[2], image.get_pixel(x, y)[3]])
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient_cutout() -> RgbaImage {
        RgbaImage::from_fn(32, 24, |x, y| {
            let alpha = if (4..28).contains(&x) && (2..20).contains(&y) {
                (x * 8 + y) as u8
            } else {
                0
            };
            Rgba([(x * 6) as u8, (y * 9) as u8, 100, alpha])
        })
    }

    #[test]
    fn test_process_never_expands() {
        let cutout = gradient_cutout();
        let out = PostProcessor::default().process(&cutout);
        assert!(out.width() <= cutout.width());
        assert!(out.height() <= cutout.height());
    }

    #[test]
    fn test_process_tightens_to_alpha() {
        let out = PostProcessor::default().process(&gradient_cutout());
        assert_eq!(out.dimensions(), (24, 18));
    }

    #[test]
    fn test_enhance_preserves_alpha() {
        let cutout = gradient_cutout();
        let out = PostProcessor::default().enhance(&cutout);
        assert_eq!(out.dimensions(), cutout.dimensions());
        for (a, b) in cutout.pixels().zip(out.pixels()) {
            assert_eq!(a[3], b[3]);
        }
    }

    #[test]
    fn test_process_fully_transparent_keeps_size() {
        let cutout = RgbaImage::from_pixel(7, 5, Rgba([50, 60, 70, 0]));
        let out = PostProcessor::default().process(&cutout);
        assert_eq!(out.dimensions(), (7, 5));
        assert!(out.pixels().all(|p| p[3] == 0));
    }

    #[test]
    fn test_enhance_empty_image() {
        let out = PostProcessor::default().enhance(&RgbaImage::new(0, 0));
        assert_eq!(out.dimensions(), (0, 0));
    }

    #[test]
    fn test_enhance_flat_color_stays_close() {
        let image = RgbaImage::from_pixel(128, 128, Rgba([128, 128, 128, 255]));
        let out = PostProcessor::default().enhance(&image);
        for p in out.pixels() {
            for c in 0..3 {
                assert!((p[c] as i32 - 128).abs() <= 6, "{:?}", p);
            }
        }
    }
}
