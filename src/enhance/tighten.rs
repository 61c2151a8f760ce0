//! Alpha bounding-box tightening

use image::{imageops, RgbaImage};

use crate::selection::ClampedRegion;

/// Bounding box of pixels with non-zero alpha, `None` if fully transparent
pub fn alpha_bounding_box(image: &RgbaImage) -> Option<ClampedRegion> {
    let mut bounds: Option<ClampedRegion> = None;

    for (x, y, p) in image.enumerate_pixels() {
        if p[3] == 0 {
            continue;
        }
        bounds = Some(match bounds {
            None => ClampedRegion {
                left: x,
                top: y,
                right: x + 1,
                bottom: y + 1,
            },
            Some(b) => ClampedRegion {
                left: b.left.min(x),
                top: b.top.min(y),
                right: b.right.max(x + 1),
                bottom: b.bottom.max(y + 1),
            },
        });
    }

    bounds
}

/// Crop to the alpha bounding box; fully transparent images are returned as is
pub fn tighten_to_alpha(image: &RgbaImage) -> RgbaImage {
    match alpha_bounding_box(image) {
        Some(b) => imageops::crop_imm(image, b.left, b.top, b.width(), b.height()).to_image(),
        None => image.clone(),
    }
}
