//! Mapping between original-image pixels and the fixed display canvas.

use crate::models::BoundingBox;

/// Side length of the square display canvas, in pixels.
pub const CANVAS_SIZE: u32 = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinateAdapter {
    pub original_width: u32,
    pub original_height: u32,
    pub display_width: u32,
    pub display_height: u32,
}

impl CoordinateAdapter {
    pub fn new(original_width: u32, original_height: u32) -> Self {
        Self::with_display(original_width, original_height, CANVAS_SIZE, CANVAS_SIZE)
    }

    pub fn with_display(
        original_width: u32,
        original_height: u32,
        display_width: u32,
        display_height: u32,
    ) -> Self {
        Self {
            original_width,
            original_height,
            display_width,
            display_height,
        }
    }

    /// Original → canvas. Each component truncates toward zero.
    pub fn to_display(&self, bbox: BoundingBox) -> BoundingBox {
        BoundingBox {
            x: scale(bbox.x, self.display_width, self.original_width),
            y: scale(bbox.y, self.display_height, self.original_height),
            width: scale(bbox.width, self.display_width, self.original_width),
            height: scale(bbox.height, self.display_height, self.original_height),
        }
    }

    /// Canvas → original, truncating the same way.
    pub fn to_original(&self, bbox: BoundingBox) -> BoundingBox {
        BoundingBox {
            x: scale(bbox.x, self.original_width, self.display_width),
            y: scale(bbox.y, self.original_height, self.display_height),
            width: scale(bbox.width, self.original_width, self.display_width),
            height: scale(bbox.height, self.original_height, self.display_height),
        }
    }
}

fn scale(value: u32, numerator: u32, denominator: u32) -> u32 {
    if denominator == 0 {
        return 0;
    }
    (value as u64 * numerator as u64 / denominator as u64) as u32
}
