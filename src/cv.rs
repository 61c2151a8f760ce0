//! Conversions between `image` buffers and OpenCV matrices
//!
//! Colour matrices are BGR, the channel order OpenCV's colour algorithms
//! assume.

use image::{GrayImage, Luma, RgbImage};
use opencv::core::{Mat, Scalar, Vec3b, CV_8UC1, CV_8UC3};
use opencv::prelude::*;

/// 8-bit single channel matrix from a grayscale image
pub(crate) fn gray_to_mat(image: &GrayImage) -> opencv::Result<Mat> {
    let (width, height) = image.dimensions();
    let mut mat =
        Mat::new_rows_cols_with_default(height as i32, width as i32, CV_8UC1, Scalar::all(0.0))?;

    for (x, y, p) in image.enumerate_pixels() {
        *mat.at_2d_mut::<u8>(y as i32, x as i32)? = p[0];
    }

    Ok(mat)
}

/// Grayscale image from an 8-bit single channel matrix
pub(crate) fn mat_to_gray(mat: &Mat) -> opencv::Result<GrayImage> {
    let (width, height) = (mat.cols().max(0) as u32, mat.rows().max(0) as u32);
    let mut image = GrayImage::new(width, height);

    for y in 0..height {
        for x in 0..width {
            let v = *mat.at_2d::<u8>(y as i32, x as i32)?;
            image.put_pixel(x, y, Luma([v]));
        }
    }

    Ok(image)
}

/// 8-bit BGR matrix from an RGB image
pub(crate) fn rgb_to_bgr_mat(image: &RgbImage) -> opencv::Result<Mat> {
    let (width, height) = image.dimensions();
    let mut mat =
        Mat::new_rows_cols_with_default(height as i32, width as i32, CV_8UC3, Scalar::all(0.0))?;

    for (x, y, p) in image.enumerate_pixels() {
        *mat.at_2d_mut::<Vec3b>(y as i32, x as i32)? = Vec3b::from([p[2], p[1], p[0]]);
    }

    Ok(mat)
}
