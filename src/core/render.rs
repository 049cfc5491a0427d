use std::path::Path;

use ab_glyph::{FontArc, PxScale};
use image::imageops::FilterType;
use image::{DynamicImage, Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;

use crate::core::coords::{CoordinateAdapter, CANVAS_SIZE};
use crate::logging::TARGET;
use crate::models::{BoundingBox, DetectedObject};

pub const BOX_COLOR: Rgb<u8> = Rgb([255, 255, 0]);
pub const CAPTION_COLOR: Rgb<u8> = Rgb([0, 0, 0]);
/// Caption baseline sits this far below the box's bottom edge.
const CAPTION_OFFSET: i32 = 20;
const CAPTION_SCALE: f32 = 16.0;

/// DejaVu Sans, used whenever no font is configured or the configured one fails to load.
static BUNDLED_FONT: &[u8] = include_bytes!("../../fonts/DejaVuSans.ttf");

/// Shared handle to a parsed TrueType font.
#[derive(Clone)]
pub struct Typeface(FontArc);

impl std::fmt::Debug for Typeface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Typeface")
    }
}

impl Default for Typeface {
    fn default() -> Self {
        Self::bundled()
    }
}

impl Typeface {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let data = std::fs::read(path)
            .map_err(|e| anyhow::anyhow!("Cannot read font file {:?}: {}", path, e))?;
        let font = FontArc::try_from_vec(data)
            .map_err(|_| anyhow::anyhow!("Unable to parse font data in {:?}", path))?;
        Ok(Self(font))
    }

    pub fn bundled() -> Self {
        Self(FontArc::try_from_slice(BUNDLED_FONT).expect("Bundled font load failed"))
    }

    /// The configured font, else the bundled one.
    pub fn locate(configured: Option<&Path>) -> Self {
        if let Some(path) = configured {
            match Self::from_file(path) {
                Ok(face) => return face,
                Err(e) => log::warn!(target: TARGET, "{:#}; falling back to the bundled font", e),
            }
        }
        Self::bundled()
    }

    pub fn font(&self) -> &FontArc {
        &self.0
    }

    /// Draw `text` with its top-left corner at `(x, y)`.
    pub fn draw(&self, canvas: &mut RgbImage, color: Rgb<u8>, x: i32, y: i32, scale: f32, text: &str) {
        draw_text_mut(canvas, color, x, y, PxScale::from(scale), self.font(), text);
    }

    pub fn measure(&self, scale: f32, text: &str) -> (u32, u32) {
        text_size(PxScale::from(scale), self.font(), text)
    }
}

/// Draws detections onto the fixed-size display canvas.
#[derive(Debug, Clone, Default)]
pub struct Renderer {
    typeface: Typeface,
}

impl Renderer {
    pub fn new(typeface: Typeface) -> Self {
        Self { typeface }
    }

    pub fn typeface(&self) -> &Typeface {
        &self.typeface
    }

    /// The whole image with every detection boxed and captioned.
    pub fn render_full(&self, image: &DynamicImage, detections: &[DetectedObject]) -> RgbImage {
        let adapter = CoordinateAdapter::new(image.width(), image.height());
        let mut canvas = base_canvas(image);
        for detection in detections {
            self.draw_detection(&mut canvas, adapter.to_display(detection.bbox), &detection.caption());
        }
        canvas
    }

    /// Only the detections labelled `label`. Returns the canvas and how many
    /// boxes were drawn.
    pub fn render_highlight(
        &self,
        image: &DynamicImage,
        detections: &[DetectedObject],
        label: &str,
    ) -> (RgbImage, usize) {
        let adapter = CoordinateAdapter::new(image.width(), image.height());
        let mut canvas = base_canvas(image);
        let mut drawn = 0;
        for detection in detections.iter().filter(|d| d.label == label) {
            self.draw_detection(&mut canvas, adapter.to_display(detection.bbox), &detection.caption());
            drawn += 1;
        }
        (canvas, drawn)
    }

    fn draw_detection(&self, canvas: &mut RgbImage, display: BoundingBox, caption: &str) {
        draw_box(canvas, display);
        let (_, text_height) = self.typeface.measure(CAPTION_SCALE, caption);
        let baseline = display.y as i32 + display.height as i32 + CAPTION_OFFSET;
        self.typeface.draw(
            canvas,
            CAPTION_COLOR,
            display.x as i32,
            baseline - text_height as i32,
            CAPTION_SCALE,
            caption,
        );
    }
}

/// Copy of `image` resized to the canvas.
pub fn base_canvas(image: &DynamicImage) -> RgbImage {
    image::imageops::resize(&image.to_rgb8(), CANVAS_SIZE, CANVAS_SIZE, FilterType::Triangle)
}

/// Two-pixel outline covering `(x, y)` to `(x + width, y + height)`.
pub fn draw_box(canvas: &mut RgbImage, bbox: BoundingBox) {
    let outer = Rect::at(bbox.x as i32, bbox.y as i32).of_size(bbox.width + 1, bbox.height + 1);
    draw_hollow_rect_mut(canvas, outer, BOX_COLOR);
    if bbox.width >= 2 && bbox.height >= 2 {
        let inner = Rect::at(bbox.x as i32 + 1, bbox.y as i32 + 1).of_size(bbox.width - 1, bbox.height - 1);
        draw_hollow_rect_mut(canvas, inner, BOX_COLOR);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gray_image(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([90u8, 90, 90])))
    }

    #[test]
    fn canvas_is_always_display_sized() {
        let canvas = Renderer::default().render_full(&gray_image(1000, 300), &[]);
        assert_eq!(canvas.dimensions(), (CANVAS_SIZE, CANVAS_SIZE));
    }

    #[test]
    fn full_render_boxes_scaled_detection() {
        let detections = vec![DetectedObject::new("cat", (100, 100, 200, 200), 0.87)];
        let canvas = Renderer::default().render_full(&gray_image(1000, 1000), &detections);

        // scaled box is (50, 50, 100, 100)
        assert_eq!(*canvas.get_pixel(50, 75), BOX_COLOR);
        assert_eq!(*canvas.get_pixel(150, 75), BOX_COLOR);
        assert_eq!(*canvas.get_pixel(100, 50), BOX_COLOR);
        assert_eq!(*canvas.get_pixel(100, 150), BOX_COLOR);
        assert_ne!(*canvas.get_pixel(100, 100), BOX_COLOR);
        assert_ne!(*canvas.get_pixel(40, 40), BOX_COLOR);
    }

    #[test]
    fn highlight_skips_other_labels() {
        let detections = vec![
            DetectedObject::new("dog", (0, 0, 50, 50), 0.5),
            DetectedObject::new("cat", (200, 200, 50, 50), 0.7),
            DetectedObject::new("dog", (10, 10, 60, 60), 0.9),
        ];
        let (canvas, drawn) = Renderer::default().render_highlight(&gray_image(500, 500), &detections, "dog");
        assert_eq!(drawn, 2);
        assert_eq!(*canvas.get_pixel(0, 25), BOX_COLOR);
        assert_eq!(*canvas.get_pixel(10, 40), BOX_COLOR);
        assert_ne!(*canvas.get_pixel(200, 225), BOX_COLOR);
    }

    #[test]
    fn boxes_at_canvas_edge_are_clipped() {
        let mut canvas = RgbImage::new(CANVAS_SIZE, CANVAS_SIZE);
        draw_box(&mut canvas, BoundingBox::new(480, 480, 100, 100));
        assert_eq!(*canvas.get_pixel(480, 499), BOX_COLOR);
    }

    /// Pixels that are neither the background nor part of a box.
    fn text_pixels(canvas: &RgbImage, background: Rgb<u8>) -> Vec<(u32, u32)> {
        canvas
            .enumerate_pixels()
            .filter(|(_, _, p)| **p != background && **p != BOX_COLOR)
            .map(|(x, y, _)| (x, y))
            .collect()
    }

    #[test]
    fn bundled_font_measures_text() {
        let (width, height) = Typeface::bundled().measure(CAPTION_SCALE, "cat (87.00%)");
        assert!(width > 40, "width was {}", width);
        assert!(height > 8, "height was {}", height);
    }

    #[test]
    fn unreadable_font_path_falls_back_to_bundled() {
        let face = Typeface::locate(Some(Path::new("/nonexistent/font.ttf")));
        assert!(face.measure(CAPTION_SCALE, "cat").0 > 0);
    }

    #[test]
    fn caption_is_drawn_just_below_box() {
        let detections = vec![DetectedObject::new("cat", (100, 100, 100, 100), 0.87)];
        let canvas = Renderer::default().render_full(&gray_image(500, 500), &detections);

        let text = text_pixels(&canvas, Rgb([90, 90, 90]));
        assert!(text.len() > 20, "caption should be drawn, found {} pixels", text.len());
        let bottom = 200;
        for (x, y) in text {
            assert!(
                y > bottom && y <= bottom + CAPTION_OFFSET as u32 + 6,
                "caption pixel ({}, {}) outside the band below the box",
                x,
                y
            );
            assert!(x >= 98, "caption pixel ({}, {}) left of the box", x, y);
        }
    }

    #[test]
    fn highlight_captions_only_selected_label() {
        let detections = vec![
            DetectedObject::new("dog", (50, 50, 50, 50), 0.5),
            DetectedObject::new("cat", (300, 300, 50, 50), 0.7),
        ];
        let (canvas, _) = Renderer::default().render_highlight(&gray_image(500, 500), &detections, "dog");
        let text = text_pixels(&canvas, Rgb([90, 90, 90]));
        assert!(!text.is_empty());
        assert!(text.iter().all(|&(_, y)| y < 300), "cat caption should not be drawn");
    }
}
