//! sRGB <-> CIE Lab conversion
//!
//! Lightness is stored 8-bit (`L * 255 / 100`) so it can go through
//! histogram equalization; a and b stay floating point to avoid a second
//! round of quantization on the way back.

use image::{GrayImage, Luma, Rgb, RgbImage, RgbaImage};
use palette::{Clamp, IntoColor, Lab, LinSrgb, Srgb};

/// Lab planes of an image
#[derive(Debug, Clone)]
pub struct LabPlanes {
    /// Lightness, 0-255
    pub lightness: GrayImage,
    pub a: Vec<f32>,
    pub b: Vec<f32>,
}

fn to_lab(rgb: [u8; 3]) -> Lab {
    let linear: LinSrgb = Srgb::new(rgb[0], rgb[1], rgb[2]).into_format::<f32>().into_linear();
    linear.into_color()
}

fn from_lab(lab: Lab) -> [u8; 3] {
    let linear: LinSrgb = lab.into_color();
    let srgb: Srgb<u8> = Srgb::<f32>::from_linear(linear).clamp().into_format();
    [srgb.red, srgb.green, srgb.blue]
}

/// Split the colour channels of `image` into Lab planes (alpha is ignored)
pub fn rgb_to_lab_planes(image: &RgbaImage) -> LabPlanes {
    let (width, height) = image.dimensions();
    let n = width as usize * height as usize;
    let mut lightness = GrayImage::new(width, height);
    let mut a = Vec::with_capacity(n);
    let mut b = Vec::with_capacity(n);

    for (x, y, p) in image.enumerate_pixels() {
        let lab = to_lab([p[0], p[1], p[2]]);
        let l8 = (lab.l * 255.0 / 100.0).round().clamp(0.0, 255.0) as u8;
        lightness.put_pixel(x, y, Luma([l8]));
        a.push(lab.a);
        b.push(lab.b);
    }

    LabPlanes { lightness, a, b }
}

/// Recombine Lab planes into an RGB image
pub fn lab_planes_to_rgb(planes: &LabPlanes) -> RgbImage {
    let (width, height) = planes.lightness.dimensions();
    RgbImage::from_fn(width, height, |x, y| {
        let idx = y as usize * width as usize + x as usize;
        let l = planes.lightness.get_pixel(x, y)[0] as f32 * 100.0 / 255.0;
        Rgb(from_lab(Lab::new(l, planes.a[idx], planes.b[idx])))
    })
}
