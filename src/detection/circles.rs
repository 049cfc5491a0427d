use image::DynamicImage;
use crate::models::Contour;

/// Bounding-box circularity of a perfect circle (4/π).
const IDEAL_CIRCULARITY: f32 = 4.0 / std::f32::consts::PI;

#[derive(Debug, Clone, Copy)]
pub struct CircleFilter {
    pub min_radius: f32,
    pub max_radius: f32,
    pub circularity_threshold: f32,
    pub brightness_threshold: f32,
}

impl CircleFilter {
    pub fn is_circle(&self, contour: &Contour) -> bool {
        let aspect = contour.aspect_ratio();
        contour.is_circular(self.circularity_threshold)
            && contour.is_reasonable_size(self.min_radius, self.max_radius)
            && (0.7..=1.4).contains(&aspect) // roughly square bounding box
    }

    pub fn is_white_circle(&self, contour: &Contour, img: &DynamicImage) -> bool {
        self.is_circle(contour) && contour.is_white(img, self.brightness_threshold)
    }
}

/// Score in `[0, 1]`, 1.0 for a perfectly round outline.
pub fn roundness(contour: &Contour) -> f32 {
    let deviation = (contour.circularity() - IDEAL_CIRCULARITY).abs();
    (1.0 / (1.0 + deviation)).clamp(0.0, 1.0)
}
