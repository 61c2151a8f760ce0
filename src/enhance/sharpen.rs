//! Unsharp masking

use image::{Rgb, RgbImage};

/// `(1 + amount) * original - amount * gaussian(original, sigma)`
pub fn unsharp_mask(image: &RgbImage, sigma: f32, amount: f32) -> RgbImage {
    if sigma <= 0.0 || amount == 0.0 || image.width() == 0 || image.height() == 0 {
        return image.clone();
    }

    let blurred = imageproc::filter::gaussian_blur_f32(image, sigma);
    let keep = 1.0 + amount;

    RgbImage::from_fn(image.width(), image.height(), |x, y| {
        let o = image.get_pixel(x, y).0;
        let b = blurred.get_pixel(x, y).0;
        let mix = |c: usize| (keep * o[c] as f32 - amount * b[c] as f32).round().clamp(0.0, 255.0) as u8;
        Rgb([mix(0), mix(1), mix(2)])
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_is_identity() {
        let image = RgbImage::from_fn(5, 5, |x, y| Rgb([(x * 50) as u8, (y * 50) as u8, 3]));
        assert_eq!(unsharp_mask(&image, 0.0, 0.35), image);
        assert_eq!(unsharp_mask(&image, 1.0, 0.0), image);
    }

    #[test]
    fn test_increases_edge_contrast() {
        let image = RgbImage::from_fn(20, 10, |x, _| {
            if x < 10 {
                Rgb([80, 80, 80])
            } else {
                Rgb([170, 170, 170])
            }
        });
        let out = unsharp_mask(&image, 1.0, 0.35);
        assert!(out.get_pixel(9, 5)[0] < 80);
        assert!(out.get_pixel(10, 5)[0] > 170);
        assert_eq!(out.dimensions(), image.dimensions());
    }
}
