use image::{GrayImage, Luma};
use imageproc::region_labelling::{connected_components, Connectivity};
use std::collections::HashMap;
use crate::models::Contour;

/// Find contours in a binary edge image using connected components.
///
/// Results are ordered largest bounding box first, ties broken top-left
/// first, so repeated runs over the same image agree.
pub fn find_contours(edges: &GrayImage, min_area: u32) -> Vec<Contour> {
    // White pixels are edges
    let labeled = connected_components(edges, Connectivity::Eight, Luma([0]));

    let mut regions: HashMap<u32, (u32, u32, u32, u32, u32)> = HashMap::new();

    for (x, y, label) in labeled.enumerate_pixels() {
        let label_val = label[0];
        if label_val == 0 {
            continue; // background
        }

        regions.entry(label_val)
            .and_modify(|(min_x, min_y, max_x, max_y, count)| {
                *min_x = (*min_x).min(x);
                *min_y = (*min_y).min(y);
                *max_x = (*max_x).max(x);
                *max_y = (*max_y).max(y);
                *count += 1;
            })
            .or_insert((x, y, x, y, 1));
    }

    let mut contours: Vec<Contour> = regions.into_values()
        .map(|(min_x, min_y, max_x, max_y, count)| {
            Contour {
                min_x,
                min_y,
                max_x,
                max_y,
                pixel_count: count,
            }
        })
        .filter(|c| c.pixel_count >= min_area)
        .collect();

    contours.sort_by(|a, b| {
        b.bbox_area()
            .cmp(&a.bbox_area())
            .then(a.min_y.cmp(&b.min_y))
            .then(a.min_x.cmp(&b.min_x))
    });
    contours
}

#[cfg(test)]
mod tests {
    use super::*;
    use imageproc::drawing::draw_hollow_rect_mut;
    use imageproc::rect::Rect;

    #[test]
    fn separate_outlines_become_separate_contours() {
        let mut edges = GrayImage::new(100, 100);
        draw_hollow_rect_mut(&mut edges, Rect::at(5, 5).of_size(10, 10), Luma([255u8]));
        draw_hollow_rect_mut(&mut edges, Rect::at(40, 40).of_size(30, 20), Luma([255u8]));

        let contours = find_contours(&edges, 4);
        assert_eq!(contours.len(), 2);
        // largest first
        assert_eq!((contours[0].min_x, contours[0].min_y), (40, 40));
        assert_eq!((contours[0].width(), contours[0].height()), (30, 20));
        assert_eq!((contours[1].min_x, contours[1].min_y), (5, 5));
    }

    #[test]
    fn small_specks_are_dropped() {
        let mut edges = GrayImage::new(20, 20);
        edges.put_pixel(3, 3, Luma([255u8]));
        assert!(find_contours(&edges, 2).is_empty());
    }
}
