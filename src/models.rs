use std::fmt;

use image::DynamicImage;

/// Bounding box in original-image pixel space
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }
}

impl From<(u32, u32, u32, u32)> for BoundingBox {
    fn from((x, y, width, height): (u32, u32, u32, u32)) -> Self {
        Self { x, y, width, height }
    }
}

/// One `(label, box, confidence)` result from a detection backend.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectedObject {
    pub label: String,
    pub bbox: BoundingBox,
    pub confidence: f32,
}

impl DetectedObject {
    pub fn new(label: impl Into<String>, bbox: impl Into<BoundingBox>, confidence: f32) -> Self {
        Self {
            label: label.into(),
            bbox: bbox.into(),
            confidence,
        }
    }

    /// `"label (NN.NN%)"`
    pub fn caption(&self) -> String {
        format_caption(&self.label, self.confidence)
    }
}

impl fmt::Display for DetectedObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "('{}', ({}, {}, {}, {}), {})",
            self.label,
            self.bbox.x,
            self.bbox.y,
            self.bbox.width,
            self.bbox.height,
            self.confidence
        )
    }
}

pub fn format_caption(label: &str, confidence: f32) -> String {
    format!("{} ({:.2}%)", label, confidence * 100.0)
}

/// Connected edge region found by the contour detector
#[derive(Debug, Clone)]
pub struct Contour {
    pub min_x: u32,
    pub min_y: u32,
    pub max_x: u32,
    pub max_y: u32,
    pub pixel_count: u32,
}

impl Contour {
    pub fn width(&self) -> u32 {
        self.max_x - self.min_x + 1
    }

    pub fn height(&self) -> u32 {
        self.max_y - self.min_y + 1
    }

    pub fn bbox_area(&self) -> u32 {
        self.width() * self.height()
    }

    pub fn perimeter(&self) -> f32 {
        // Approximate perimeter from bounding box
        2.0 * (self.width() as f32 + self.height() as f32)
    }

    pub fn circularity(&self) -> f32 {
        let perimeter = self.perimeter();
        // Bounding box area gives a steadier estimate than the edge pixel count
        let area = self.bbox_area() as f32;

        if area == 0.0 {
            return 0.0;
        }

        // Circularity = perimeter² / (4π × area)
        (perimeter * perimeter) / (4.0 * std::f32::consts::PI * area)
    }

    pub fn aspect_ratio(&self) -> f32 {
        let w = self.width() as f32;
        let h = self.height() as f32;
        if h == 0.0 {
            return 0.0;
        }
        w / h
    }

    pub fn is_circular(&self, threshold: f32) -> bool {
        let circ = self.circularity();
        circ >= 0.7 && circ <= threshold
    }

    pub fn radius(&self) -> f32 {
        let w = self.width() as f32;
        let h = self.height() as f32;
        (w + h) / 4.0
    }

    pub fn is_reasonable_size(&self, min_radius: f32, max_radius: f32) -> bool {
        let r = self.radius();
        r >= min_radius && r <= max_radius
    }

    /// Average brightness of the pixels inside the inscribed circle
    pub fn average_brightness(&self, img: &DynamicImage) -> f32 {
        let gray = img.to_luma8();
        let mut sum: u64 = 0;
        let mut count: u64 = 0;

        let center_x = (self.min_x + self.max_x) / 2;
        let center_y = (self.min_y + self.max_y) / 2;
        let radius = self.radius();

        for y in self.min_y..=self.max_y {
            for x in self.min_x..=self.max_x {
                let dx = x as f32 - center_x as f32;
                let dy = y as f32 - center_y as f32;
                let distance = (dx * dx + dy * dy).sqrt();

                if distance <= radius && x < gray.width() && y < gray.height() {
                    sum += gray.get_pixel(x, y)[0] as u64;
                    count += 1;
                }
            }
        }

        if count > 0 {
            sum as f32 / count as f32
        } else {
            0.0
        }
    }

    pub fn is_white(&self, img: &DynamicImage, threshold: f32) -> bool {
        self.average_brightness(img) >= threshold
    }

    pub fn to_bbox(&self) -> BoundingBox {
        BoundingBox::new(self.min_x, self.min_y, self.width(), self.height())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caption_uses_two_decimal_percent() {
        let obj = DetectedObject::new("cat", (100, 100, 200, 200), 0.87);
        assert_eq!(obj.caption(), "cat (87.00%)");
        assert_eq!(format_caption("dog", 0.9), "dog (90.00%)");
        assert_eq!(format_caption("bird", 1.0), "bird (100.00%)");
    }

    #[test]
    fn contour_bbox_is_inclusive() {
        let contour = Contour {
            min_x: 10,
            min_y: 20,
            max_x: 19,
            max_y: 24,
            pixel_count: 30,
        };
        assert_eq!(contour.to_bbox(), BoundingBox::new(10, 20, 10, 5));
        assert_eq!(contour.bbox_area(), 50);
    }
}
