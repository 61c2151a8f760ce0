//! Static saliency and foreground seeding
//!
//! # Algorithm
//!
//! 1. Fine-grained static saliency (OpenCV, `opencv` feature), stretched
//!    to 0-255; builds without the feature report the detector unsupported
//! 2. Otsu global threshold of the saliency map
//! 3. Morphological closing, 5x5 square, two iterations
//! 4. Keep the outermost contour with the largest area and fill it

use image::{GrayImage, Luma, RgbImage};
use imageproc::contours::{find_contours, BorderType, Contour};
use imageproc::distance_transform::Norm;
use imageproc::drawing::draw_polygon_mut;
use imageproc::point::Point;
use std::sync::Arc;

use super::types::{Mask, SaliencyError, MASK_BACKGROUND, MASK_FOREGROUND};

// ============================================================
// Constants
// ============================================================

/// Smallest region the detector accepts on either axis
#[cfg(feature = "opencv")]
const MIN_SALIENCY_SIZE: u32 = 3;

/// Half-width of the 5x5 closing element
const CLOSE_RADIUS: u8 = 2;

/// Closing iterations
const CLOSE_ITERATIONS: u8 = 2;

// ============================================================
// Detectors
// ============================================================

/// Per-pixel visual prominence estimator
pub trait SaliencyDetector: Send + Sync {
    /// Saliency map with the dimensions of `roi`, 0-255
    fn saliency_map(&self, roi: &RgbImage) -> Result<GrayImage, SaliencyError>;
}

/// Detector that is never available
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedSaliency;

impl SaliencyDetector for UnsupportedSaliency {
    fn saliency_map(&self, _roi: &RgbImage) -> Result<GrayImage, SaliencyError> {
        Err(SaliencyError::Unsupported)
    }
}

/// OpenCV `StaticSaliencyFineGrained`, stretched to the full 0-255 range
#[cfg(feature = "opencv")]
#[derive(Debug, Clone, Copy, Default)]
pub struct FineGrainedSaliency;

#[cfg(feature = "opencv")]
impl SaliencyDetector for FineGrainedSaliency {
    fn saliency_map(&self, roi: &RgbImage) -> Result<GrayImage, SaliencyError> {
        use opencv::core::{self, Mat, CV_8U, NORM_MINMAX};
        use opencv::prelude::*;
        use opencv::saliency::StaticSaliencyFineGrained;

        let (width, height) = roi.dimensions();
        if width < MIN_SALIENCY_SIZE || height < MIN_SALIENCY_SIZE {
            return Err(SaliencyError::TooSmall(width, height));
        }

        let bgr = crate::cv::rgb_to_bgr_mat(roi)?;
        let mut detector = StaticSaliencyFineGrained::create()?;
        let mut map = Mat::default();
        if !detector.compute_saliency(&bgr, &mut map)? {
            return Err(SaliencyError::Backend("no saliency map computed".to_string()));
        }

        // A flat response normalizes to all zeros
        let mut stretched = Mat::default();
        core::normalize(&map, &mut stretched, 0.0, 255.0, NORM_MINMAX, CV_8U, &Mat::default())?;

        Ok(crate::cv::mat_to_gray(&stretched)?)
    }
}

/// The best detector this build carries
pub fn default_detector() -> Arc<dyn SaliencyDetector> {
    #[cfg(feature = "opencv")]
    {
        Arc::new(FineGrainedSaliency)
    }
    #[cfg(not(feature = "opencv"))]
    {
        Arc::new(UnsupportedSaliency)
    }
}

// ============================================================
// Seeding
// ============================================================

/// Turn a saliency map into a single filled foreground blob.
///
/// When the closed mask has no contours the closed mask itself is returned.
pub fn seed_from_saliency(saliency: &GrayImage) -> Mask {
    let level = imageproc::contrast::otsu_level(saliency);
    let binary = GrayImage::from_fn(saliency.width(), saliency.height(), |x, y| {
        if saliency.get_pixel(x, y)[0] > level {
            Luma([MASK_FOREGROUND])
        } else {
            Luma([MASK_BACKGROUND])
        }
    });

    // Closing twice with a 5x5 square dilates then erodes by twice the radius
    let closed = imageproc::morphology::close(&binary, Norm::LInf, CLOSE_RADIUS * CLOSE_ITERATIONS);

    match largest_outer_contour(&closed) {
        Some(contour) => fill_contour(closed.width(), closed.height(), &contour.points),
        None => closed,
    }
}

/// Outermost contour enclosing the largest area
fn largest_outer_contour(mask: &GrayImage) -> Option<Contour<i32>> {
    find_contours::<i32>(mask)
        .into_iter()
        .filter(|c| c.parent.is_none() && c.border_type == BorderType::Outer)
        .fold(None, |best: Option<(f64, Contour<i32>)>, contour| {
            let area = polygon_area(&contour.points);
            match best {
                Some((best_area, _)) if best_area >= area => best,
                _ => Some((area, contour)),
            }
        })
        .map(|(_, contour)| contour)
}

/// Shoelace area of a closed polygon
fn polygon_area(points: &[Point<i32>]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }

    let twice: i64 = points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(a, b)| a.x as i64 * b.y as i64 - b.x as i64 * a.y as i64)
        .sum();

    (twice as f64 / 2.0).abs()
}

/// Rasterize a contour (outline and interior) into a fresh mask
fn fill_contour(width: u32, height: u32, points: &[Point<i32>]) -> Mask {
    let mut mask = GrayImage::new(width, height);

    let mut polygon = points.to_vec();
    while polygon.len() > 1 && polygon.first() == polygon.last() {
        polygon.pop();
    }
    if polygon.len() >= 3 {
        draw_polygon_mut(&mut mask, &polygon, Luma([MASK_FOREGROUND]));
    }

    for p in points {
        if p.x >= 0 && p.y >= 0 && (p.x as u32) < width && (p.y as u32) < height {
            mask.put_pixel(p.x as u32, p.y as u32, Luma([MASK_FOREGROUND]));
        }
    }

    mask
}
