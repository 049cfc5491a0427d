use image::{DynamicImage, GrayImage};
use imageproc::edges::canny;
use imageproc::filter::gaussian_blur_f32;

/// Grayscale, blur, then Canny: the edge map the contour search runs on.
pub fn edge_map(img: &DynamicImage, sigma: f32, low_threshold: f32, high_threshold: f32) -> GrayImage {
    let gray = img.to_luma8();
    let blurred = if sigma > 0.0 {
        gaussian_blur_f32(&gray, sigma)
    } else {
        gray
    };
    canny(&blurred, low_threshold, high_threshold)
}
