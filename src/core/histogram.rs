//! Per-channel intensity histograms for a detected region.

use std::path::{Path, PathBuf};

use anyhow::Context;
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_line_segment_mut;

use crate::core::render::Typeface;
use crate::logging::TARGET;
use crate::models::{BoundingBox, DetectedObject};

pub const BINS: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelHistogram {
    pub red: [u32; BINS],
    pub green: [u32; BINS],
    pub blue: [u32; BINS],
}

impl ChannelHistogram {
    pub fn from_image(region: &RgbImage) -> Self {
        let mut histogram = Self {
            red: [0; BINS],
            green: [0; BINS],
            blue: [0; BINS],
        };
        for Rgb([r, g, b]) in region.pixels() {
            histogram.red[*r as usize] += 1;
            histogram.green[*g as usize] += 1;
            histogram.blue[*b as usize] += 1;
        }
        histogram
    }

    /// `(name, bins)` for each channel, in plot order.
    pub fn channels(&self) -> [(&'static str, &[u32; BINS]); 3] {
        [("R", &self.red), ("G", &self.green), ("B", &self.blue)]
    }

    pub fn max_count(&self) -> u32 {
        self.channels()
            .iter()
            .flat_map(|(_, bins)| bins.iter().copied())
            .max()
            .unwrap_or(0)
    }

    /// Pixels counted; the same for every channel.
    pub fn pixel_count(&self) -> u64 {
        self.red.iter().map(|&c| c as u64).sum()
    }
}

/// Histogram of the last detection for one label.
#[derive(Debug, Clone)]
pub struct HistogramReport {
    pub image_path: PathBuf,
    pub label: String,
    pub bbox: BoundingBox,
    pub histogram: ChannelHistogram,
}

/// Shows a report to the user. The controller calls this after a highlight.
pub trait HistogramPresenter {
    fn present(&mut self, report: &HistogramReport) -> anyhow::Result<()>;
}

impl<P: HistogramPresenter + ?Sized> HistogramPresenter for Box<P> {
    fn present(&mut self, report: &HistogramReport) -> anyhow::Result<()> {
        (**self).present(report)
    }
}

/// Crop `bbox` (original coordinates) out of a fresh read of `image_path`.
///
/// The box is clamped to the image; a crop with no pixels left is an error.
pub fn extract_region(image_path: &Path, bbox: BoundingBox) -> anyhow::Result<RgbImage> {
    let img = image::open(image_path)
        .with_context(|| format!("Failed to re-read image {:?}", image_path))?;
    let region = img.crop_imm(bbox.x, bbox.y, bbox.width, bbox.height).to_rgb8();
    if region.width() == 0 || region.height() == 0 {
        anyhow::bail!(
            "Region ({}, {}, {}, {}) lies outside the {}x{} image",
            bbox.x,
            bbox.y,
            bbox.width,
            bbox.height,
            img.width(),
            img.height()
        );
    }
    Ok(region)
}

/// Build the report from the last of `entries`.
pub fn report_for(image_path: &Path, entries: &[DetectedObject]) -> anyhow::Result<HistogramReport> {
    let last = entries.last().context("No detections to build a histogram from")?;
    let region = extract_region(image_path, last.bbox)?;
    Ok(HistogramReport {
        image_path: image_path.to_path_buf(),
        label: last.label.clone(),
        bbox: last.bbox,
        histogram: ChannelHistogram::from_image(&region),
    })
}

pub const PLOT_WIDTH: u32 = 1000;
pub const PLOT_HEIGHT: u32 = 600;
const MARGIN_LEFT: f32 = 90.0;
const MARGIN_RIGHT: f32 = 30.0;
const MARGIN_TOP: f32 = 60.0;
const MARGIN_BOTTOM: f32 = 70.0;
const GRID_COLOR: Rgb<u8> = Rgb([220, 220, 220]);
const AXIS_COLOR: Rgb<u8> = Rgb([0, 0, 0]);
const TEXT_COLOR: Rgb<u8> = Rgb([20, 20, 20]);

fn series_color(channel: &str) -> Rgb<u8> {
    match channel {
        "R" => Rgb([220, 40, 40]),
        "G" => Rgb([40, 160, 40]),
        _ => Rgb([40, 70, 220]),
    }
}

/// Line plot of the three channels with title, axis labels, grid and legend.
pub fn render_plot(report: &HistogramReport, face: &Typeface) -> RgbImage {
    let mut plot = RgbImage::from_pixel(PLOT_WIDTH, PLOT_HEIGHT, Rgb([255, 255, 255]));
    let left = MARGIN_LEFT;
    let right = PLOT_WIDTH as f32 - MARGIN_RIGHT;
    let top = MARGIN_TOP;
    let bottom = PLOT_HEIGHT as f32 - MARGIN_BOTTOM;
    let max_count = report.histogram.max_count().max(1) as f32;

    let x_of = |bin: usize| left + (right - left) * bin as f32 / (BINS - 1) as f32;
    let y_of = |count: u32| bottom - (bottom - top) * count as f32 / max_count;

    for tick in (0..BINS).step_by(50) {
        let x = x_of(tick);
        draw_line_segment_mut(&mut plot, (x, top), (x, bottom), GRID_COLOR);
    }
    for quarter in 1..=4 {
        let y = bottom - (bottom - top) * quarter as f32 / 4.0;
        draw_line_segment_mut(&mut plot, (left, y), (right, y), GRID_COLOR);
    }
    draw_line_segment_mut(&mut plot, (left, bottom), (right, bottom), AXIS_COLOR);
    draw_line_segment_mut(&mut plot, (left, top), (left, bottom), AXIS_COLOR);

    for (name, bins) in report.histogram.channels() {
        let color = series_color(name);
        for bin in 0..BINS - 1 {
            draw_line_segment_mut(
                &mut plot,
                (x_of(bin), y_of(bins[bin])),
                (x_of(bin + 1), y_of(bins[bin + 1])),
                color,
            );
        }
    }

    let title = "Color Channels Histogram";
    let (title_width, _) = face.measure(26.0, title);
    face.draw(&mut plot, TEXT_COLOR, (PLOT_WIDTH as i32 - title_width as i32) / 2, 15, 26.0, title);

    let x_label = "Pixel Value";
    let (x_label_width, _) = face.measure(18.0, x_label);
    face.draw(
        &mut plot,
        TEXT_COLOR,
        (left + (right - left) / 2.0) as i32 - x_label_width as i32 / 2,
        PLOT_HEIGHT as i32 - 32,
        18.0,
        x_label,
    );
    face.draw(&mut plot, TEXT_COLOR, 8, top as i32 - 28, 18.0, "Frequency");

    for tick in (0..BINS).step_by(50) {
        face.draw(&mut plot, TEXT_COLOR, x_of(tick) as i32 - 8, bottom as i32 + 6, 14.0, &tick.to_string());
    }
    let max_label = report.histogram.max_count().to_string();
    let (max_width, _) = face.measure(14.0, &max_label);
    face.draw(&mut plot, TEXT_COLOR, left as i32 - max_width as i32 - 6, top as i32 - 7, 14.0, &max_label);
    face.draw(&mut plot, TEXT_COLOR, left as i32 - 16, bottom as i32 - 7, 14.0, "0");

    let legend_x = right - 130.0;
    for (row, (name, _)) in report.histogram.channels().iter().enumerate() {
        let y = top + 16.0 + row as f32 * 22.0;
        let color = series_color(name);
        draw_line_segment_mut(&mut plot, (legend_x, y), (legend_x + 30.0, y), color);
        draw_line_segment_mut(&mut plot, (legend_x, y + 1.0), (legend_x + 30.0, y + 1.0), color);
        face.draw(&mut plot, TEXT_COLOR, legend_x as i32 + 38, y as i32 - 8, 16.0, &format!("Channel {}", name));
    }

    plot
}

/// Writes each report as a PNG plot.
pub struct PngPresenter {
    path: PathBuf,
    typeface: Typeface,
}

impl PngPresenter {
    pub fn new(path: impl Into<PathBuf>, typeface: Typeface) -> Self {
        Self {
            path: path.into(),
            typeface,
        }
    }
}

impl HistogramPresenter for PngPresenter {
    fn present(&mut self, report: &HistogramReport) -> anyhow::Result<()> {
        render_plot(report, &self.typeface)
            .save(&self.path)
            .with_context(|| format!("Failed to save histogram plot {:?}", self.path))?;
        log::info!(target: TARGET, "Histogram for '{}' written to {:?}", report.label, self.path);
        Ok(())
    }
}

/// Logs a one-line summary instead of drawing anything.
#[derive(Debug, Default)]
pub struct LogPresenter;

impl HistogramPresenter for LogPresenter {
    fn present(&mut self, report: &HistogramReport) -> anyhow::Result<()> {
        log::info!(
            target: TARGET,
            "Histogram for '{}': {} pixels, peak bin count {}",
            report.label,
            report.histogram.pixel_count(),
            report.histogram.max_count()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_each_channel_independently() {
        let mut region = RgbImage::from_pixel(4, 2, Rgb([10u8, 20, 30]));
        region.put_pixel(0, 0, Rgb([255, 20, 0]));
        let histogram = ChannelHistogram::from_image(&region);

        assert_eq!(histogram.red[10], 7);
        assert_eq!(histogram.red[255], 1);
        assert_eq!(histogram.green[20], 8);
        assert_eq!(histogram.blue[30], 7);
        assert_eq!(histogram.blue[0], 1);
        assert_eq!(histogram.pixel_count(), 8);
        assert_eq!(histogram.max_count(), 8);
    }

    #[test]
    fn plot_has_fixed_size_and_draws_series() {
        let region = RgbImage::from_pixel(10, 10, Rgb([0u8, 128, 255]));
        let report = HistogramReport {
            image_path: PathBuf::from("unused.png"),
            label: "cat".to_string(),
            bbox: BoundingBox::new(0, 0, 10, 10),
            histogram: ChannelHistogram::from_image(&region),
        };
        let plot = render_plot(&report, &Typeface::bundled());
        assert_eq!(plot.dimensions(), (PLOT_WIDTH, PLOT_HEIGHT));
        assert!(plot.pixels().any(|p| *p == series_color("R")));
        assert!(plot.pixels().any(|p| *p == series_color("B")));
    }

    fn dark_pixels_in(plot: &RgbImage, xs: std::ops::Range<u32>, ys: std::ops::Range<u32>) -> usize {
        ys.flat_map(|y| xs.clone().map(move |x| (x, y)))
            .filter(|&(x, y)| plot.get_pixel(x, y).0.iter().all(|&c| c < 100))
            .count()
    }

    #[test]
    fn plot_carries_title_axis_label_and_legend() {
        let region = RgbImage::from_pixel(10, 10, Rgb([0u8, 128, 255]));
        let report = HistogramReport {
            image_path: PathBuf::from("unused.png"),
            label: "cat".to_string(),
            bbox: BoundingBox::new(0, 0, 10, 10),
            histogram: ChannelHistogram::from_image(&region),
        };
        let plot = render_plot(&report, &Typeface::bundled());

        assert!(dark_pixels_in(&plot, 300..700, 0..55) > 50, "title missing");
        assert!(dark_pixels_in(&plot, 400..700, 560..600) > 20, "x axis label missing");
        assert!(dark_pixels_in(&plot, 880..995, 60..140) > 50, "legend missing");
        // nothing dark in the empty plot area between the series
        assert_eq!(dark_pixels_in(&plot, 600..800, 200..400), 0);
    }
}
