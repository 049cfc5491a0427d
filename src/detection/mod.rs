pub mod preprocessing;
pub mod contours;
pub mod circles;

use std::cell::RefCell;
use std::path::{Path, PathBuf};

use anyhow::Context;
use image::DynamicImage;

use crate::config::DetectorConfig;
use crate::models::DetectedObject;
use circles::CircleFilter;

/// Object-detection backend.
///
/// Called again on every redraw, so implementations must tolerate repeated
/// calls for the same path.
pub trait Detector {
    fn detect(&self, image_path: &Path) -> anyhow::Result<Vec<DetectedObject>>;
}

impl<D: Detector + ?Sized> Detector for Box<D> {
    fn detect(&self, image_path: &Path) -> anyhow::Result<Vec<DetectedObject>> {
        (**self).detect(image_path)
    }
}

/// Shape detector built from edge contours.
///
/// Labels each outline `"white circle"`, `"circle"` or `"region"` and scores
/// it by how round its bounding box is.
pub struct ContourDetector {
    pub min_area: u32,
    pub blur_sigma: f32,
    pub canny_low: f32,
    pub canny_high: f32,
    pub max_detections: usize,
    pub filter: CircleFilter,
}

impl ContourDetector {
    pub fn new() -> Self {
        Self::from_config(&DetectorConfig::default())
    }

    pub fn from_config(config: &DetectorConfig) -> Self {
        Self {
            min_area: config.min_area,
            blur_sigma: config.blur_sigma,
            canny_low: config.canny_low,
            canny_high: config.canny_high,
            max_detections: config.max_detections,
            filter: CircleFilter {
                min_radius: config.min_radius,
                max_radius: config.max_radius,
                circularity_threshold: config.circularity_threshold,
                brightness_threshold: config.brightness_threshold,
            },
        }
    }

    pub fn detect_in_image(&self, img: &DynamicImage) -> Vec<DetectedObject> {
        let edges = preprocessing::edge_map(img, self.blur_sigma, self.canny_low, self.canny_high);
        let mut found = contours::find_contours(&edges, self.min_area);
        log::debug!(target: crate::logging::TARGET, "Found {} contours", found.len());
        found.truncate(self.max_detections);

        found
            .iter()
            .map(|contour| {
                let label = if self.filter.is_white_circle(contour, img) {
                    "white circle"
                } else if self.filter.is_circle(contour) {
                    "circle"
                } else {
                    "region"
                };
                DetectedObject::new(label, contour.to_bbox(), circles::roundness(contour))
            })
            .collect()
    }
}

impl Default for ContourDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for ContourDetector {
    fn detect(&self, image_path: &Path) -> anyhow::Result<Vec<DetectedObject>> {
        let img = image::open(image_path)
            .with_context(|| format!("Failed to open image {:?}", image_path))?;
        Ok(self.detect_in_image(&img))
    }
}

/// Remembers the last result, keyed by image path.
pub struct CachedDetector<D> {
    inner: D,
    last: RefCell<Option<(PathBuf, Vec<DetectedObject>)>>,
}

impl<D: Detector> CachedDetector<D> {
    pub fn new(inner: D) -> Self {
        Self {
            inner,
            last: RefCell::new(None),
        }
    }

    pub fn invalidate(&self) {
        self.last.borrow_mut().take();
    }
}

impl<D: Detector> Detector for CachedDetector<D> {
    fn detect(&self, image_path: &Path) -> anyhow::Result<Vec<DetectedObject>> {
        if let Some((path, objects)) = self.last.borrow().as_ref() {
            if path == image_path {
                return Ok(objects.clone());
            }
        }
        let objects = self.inner.detect(image_path)?;
        *self.last.borrow_mut() = Some((image_path.to_path_buf(), objects.clone()));
        Ok(objects)
    }
}

/// Detector selected by configuration.
pub fn from_config(config: &DetectorConfig) -> Box<dyn Detector> {
    let detector = ContourDetector::from_config(config);
    if config.cache_results {
        Box::new(CachedDetector::new(detector))
    } else {
        Box::new(detector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use imageproc::drawing::draw_filled_rect_mut;
    use imageproc::rect::Rect;
    use std::cell::Cell;

    struct Counting {
        calls: Cell<usize>,
    }

    impl Detector for Counting {
        fn detect(&self, _image_path: &Path) -> anyhow::Result<Vec<DetectedObject>> {
            self.calls.set(self.calls.get() + 1);
            Ok(vec![DetectedObject::new("cat", (1, 2, 3, 4), 0.5)])
        }
    }

    #[test]
    fn cache_reuses_result_for_same_path_only() -> anyhow::Result<()> {
        let cached = CachedDetector::new(Counting { calls: Cell::new(0) });
        cached.detect(Path::new("a.png"))?;
        cached.detect(Path::new("a.png"))?;
        assert_eq!(cached.inner.calls.get(), 1);

        cached.detect(Path::new("b.png"))?;
        assert_eq!(cached.inner.calls.get(), 2);

        cached.invalidate();
        cached.detect(Path::new("b.png"))?;
        assert_eq!(cached.inner.calls.get(), 3);
        Ok(())
    }

    #[test]
    fn bright_square_on_dark_background_is_found() {
        let mut img = RgbImage::from_pixel(200, 200, Rgb([0u8, 0, 0]));
        draw_filled_rect_mut(&mut img, Rect::at(60, 60).of_size(60, 60), Rgb([255u8, 255, 255]));

        let detections = ContourDetector::new().detect_in_image(&DynamicImage::ImageRgb8(img));
        assert!(!detections.is_empty());
        for detection in &detections {
            // the blurred edge may spread a few pixels past the square
            assert!(detection.bbox.x >= 55 && detection.bbox.y >= 55);
            assert!(detection.bbox.x + detection.bbox.width <= 125);
            assert!(detection.bbox.y + detection.bbox.height <= 125);
            assert!((0.0..=1.0).contains(&detection.confidence));
        }
    }
}
