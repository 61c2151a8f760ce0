//! Interactive graph-cut (GrabCut) refinement
//!
//! The trimap becomes an OpenCV `GC_*` mask, `imgproc::grab_cut` refines it
//! in mask-initialisation mode (colour mixture models plus 8-connected
//! smoothness), and the refined classes are copied back.
//!
//! Hard labels, including everything outside the ROI, never change. The
//! solver needs at least one foreground and one background pixel, which is
//! checked up front so the failure is reported by class.
//!
//! Built without the `opencv` feature, [`GraphCut::refine`] always returns
//! [`GraphCutError::Unavailable`].

use image::RgbImage;

#[cfg(feature = "opencv")]
use super::types::Label;
use super::types::{GraphCutError, Trimap};
use crate::selection::ClampedRegion;

/// Default number of refinement iterations
pub const DEFAULT_ITERATIONS: usize = 3;

/// GrabCut refinement of a trimap
#[derive(Debug, Clone)]
pub struct GraphCut {
    iterations: usize,
}

impl Default for GraphCut {
    fn default() -> Self {
        Self::new(DEFAULT_ITERATIONS)
    }
}

impl GraphCut {
    /// Refinement with a fixed iteration count (at least one)
    pub fn new(iterations: usize) -> Self {
        Self {
            iterations: iterations.max(1),
        }
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Whether this build carries a graph-cut solver
    pub fn is_available() -> bool {
        cfg!(feature = "opencv")
    }

    /// Relabel the probable pixels of `trimap` inside `roi`.
    ///
    /// `image` and `trimap` cover the full image.
    pub fn refine(
        &self,
        image: &RgbImage,
        trimap: &mut Trimap,
        roi: &ClampedRegion,
    ) -> Result<(), GraphCutError> {
        if trimap.dimensions() != image.dimensions() {
            return Err(GraphCutError::DimensionMismatch {
                trimap: trimap.dimensions(),
                image: image.dimensions(),
            });
        }
        if roi.is_empty() || roi.right > image.width() || roi.bottom > image.height() {
            return Err(GraphCutError::EmptyRegion);
        }

        let foreground = trimap.labels().iter().filter(|l| l.is_foreground()).count();
        if foreground == 0 {
            return Err(GraphCutError::EmptySampleSet("foreground"));
        }
        if foreground == trimap.labels().len() {
            return Err(GraphCutError::EmptySampleSet("background"));
        }

        self.solve(image, trimap)
    }

    #[cfg(feature = "opencv")]
    fn solve(&self, image: &RgbImage, trimap: &mut Trimap) -> Result<(), GraphCutError> {
        use opencv::core::{Mat, Rect, Scalar, CV_8UC1};
        use opencv::imgproc;
        use opencv::prelude::*;

        let (width, height) = trimap.dimensions();
        let bgr = crate::cv::rgb_to_bgr_mat(image)?;

        let mut mask =
            Mat::new_rows_cols_with_default(height as i32, width as i32, CV_8UC1, Scalar::all(0.0))?;
        for y in 0..height {
            for x in 0..width {
                *mask.at_2d_mut::<u8>(y as i32, x as i32)? = gc_class(trimap.get(x, y));
            }
        }

        let mut bgd_model = Mat::default();
        let mut fgd_model = Mat::default();
        imgproc::grab_cut(
            &bgr,
            &mut mask,
            Rect::default(),
            &mut bgd_model,
            &mut fgd_model,
            self.iterations as i32,
            imgproc::GC_INIT_WITH_MASK,
        )?;

        for y in 0..height {
            for x in 0..width {
                let class = *mask.at_2d::<u8>(y as i32, x as i32)?;
                trimap.set(x, y, label_from_gc(class));
            }
        }

        tracing::debug!(iterations = self.iterations, "grab_cut finished");
        Ok(())
    }

    #[cfg(not(feature = "opencv"))]
    fn solve(&self, _image: &RgbImage, _trimap: &mut Trimap) -> Result<(), GraphCutError> {
        Err(GraphCutError::Unavailable)
    }
}

#[cfg(feature = "opencv")]
fn gc_class(label: Label) -> u8 {
    use opencv::imgproc::{GC_BGD, GC_FGD, GC_PR_BGD, GC_PR_FGD};

    let class = match label {
        Label::Background => GC_BGD,
        Label::Foreground => GC_FGD,
        Label::ProbableBackground => GC_PR_BGD,
        Label::ProbableForeground => GC_PR_FGD,
    };
    class as u8
}

#[cfg(feature = "opencv")]
fn label_from_gc(class: u8) -> Label {
    use opencv::imgproc::{GC_FGD, GC_PR_BGD, GC_PR_FGD};

    match class as i32 {
        GC_FGD => Label::Foreground,
        GC_PR_FGD => Label::ProbableForeground,
        GC_PR_BGD => Label::ProbableBackground,
        _ => Label::Background,
    }
}
