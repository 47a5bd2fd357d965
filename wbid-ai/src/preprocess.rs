//! Image preprocessing
//!
//! Matches the transform the model was trained with: resize the shorter side
//! to 256 (bilinear), center crop 224x224, scale to [0, 1], normalize with the
//! ImageNet channel statistics, lay out as NCHW.

use image::imageops::{self, FilterType};
use image::DynamicImage;

pub const RESIZE_SHORTER_SIDE: u32 = 256;
pub const CROP_SIZE: u32 = 224;
pub const MEAN: [f32; 3] = [0.485, 0.456, 0.406];
pub const STD: [f32; 3] = [0.229, 0.224, 0.225];

/// Input tensor shape `[batch, channels, height, width]`
pub const INPUT_SHAPE: [usize; 4] = [1, 3, CROP_SIZE as usize, CROP_SIZE as usize];

/// Target dimensions when scaling `(width, height)` so the shorter side is `shorter`
pub fn resized_dimensions(width: u32, height: u32, shorter: u32) -> (u32, u32) {
    if width <= height {
        let h = (u64::from(shorter) * u64::from(height) / u64::from(width.max(1))) as u32;
        (shorter, h.max(shorter))
    } else {
        let w = (u64::from(shorter) * u64::from(width) / u64::from(height.max(1))) as u32;
        (w.max(shorter), shorter)
    }
}

/// Top-left offset of a centered `crop` window inside `len`
fn center_offset(len: u32, crop: u32) -> u32 {
    ((f64::from(len.saturating_sub(crop))) / 2.0).round() as u32
}

/// Convert an image into a normalized NCHW float buffer of `INPUT_SHAPE`
pub fn preprocess(image: &DynamicImage) -> Vec<f32> {
    let rgb = image.to_rgb8();
    let (w, h) = resized_dimensions(rgb.width(), rgb.height(), RESIZE_SHORTER_SIDE);
    let resized = imageops::resize(&rgb, w, h, FilterType::Triangle);

    let left = center_offset(w, CROP_SIZE);
    let top = center_offset(h, CROP_SIZE);
    let cropped = imageops::crop_imm(&resized, left, top, CROP_SIZE, CROP_SIZE).to_image();

    let plane = (CROP_SIZE * CROP_SIZE) as usize;
    let mut data = vec![0.0f32; 3 * plane];
    for (x, y, pixel) in cropped.enumerate_pixels() {
        let offset = (y * CROP_SIZE + x) as usize;
        for c in 0..3 {
            let value = f32::from(pixel[c]) / 255.0;
            data[c * plane + offset] = (value - MEAN[c]) / STD[c];
        }
    }
    data
}
