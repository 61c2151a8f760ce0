//! Contrast-limited adaptive histogram equalization
//!
//! Runs OpenCV's CLAHE (`imgproc::create_clahe`) over an 8-bit plane.
//! Builds without the `opencv` feature report [`ClaheError::Unavailable`]
//! and the caller keeps the plane as it was.

use image::GrayImage;
use thiserror::Error;

/// CLAHE errors
#[derive(Debug, Error)]
pub enum ClaheError {
    #[error("CLAHE not available in this build")]
    Unavailable,

    #[error("CLAHE backend error: {0}")]
    Backend(String),
}

#[cfg(feature = "opencv")]
impl From<opencv::Error> for ClaheError {
    fn from(e: opencv::Error) -> Self {
        ClaheError::Backend(e.to_string())
    }
}

/// CLAHE operator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Clahe {
    clip_limit: f32,
    tiles: u32,
}

impl Default for Clahe {
    fn default() -> Self {
        Self::new(2.0, 8)
    }
}

impl Clahe {
    /// `clip_limit <= 0` disables clipping (plain adaptive equalization)
    pub fn new(clip_limit: f32, tiles: u32) -> Self {
        Self {
            clip_limit: clip_limit.max(0.0),
            tiles: tiles.max(1),
        }
    }

    pub fn clip_limit(&self) -> f32 {
        self.clip_limit
    }

    pub fn tiles(&self) -> u32 {
        self.tiles
    }

    /// Whether this build can equalize
    pub fn is_available() -> bool {
        cfg!(feature = "opencv")
    }

    /// Equalize `src`; an empty plane is returned as is
    pub fn apply(&self, src: &GrayImage) -> Result<GrayImage, ClaheError> {
        if src.width() == 0 || src.height() == 0 {
            return Ok(src.clone());
        }
        self.equalize(src)
    }

    #[cfg(feature = "opencv")]
    fn equalize(&self, src: &GrayImage) -> Result<GrayImage, ClaheError> {
        use opencv::core::{Mat, Size};
        use opencv::imgproc;
        use opencv::prelude::*;

        let tiles = self.tiles as i32;
        let mut clahe = imgproc::create_clahe(self.clip_limit as f64, Size::new(tiles, tiles))?;

        let input = crate::cv::gray_to_mat(src)?;
        let mut output = Mat::default();
        clahe.apply(&input, &mut output)?;

        Ok(crate::cv::mat_to_gray(&output)?)
    }

    #[cfg(not(feature = "opencv"))]
    fn equalize(&self, _src: &GrayImage) -> Result<GrayImage, ClaheError> {
        Err(ClaheError::Unavailable)
    }
}
