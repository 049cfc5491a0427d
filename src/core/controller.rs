use std::path::{Path, PathBuf};

use image::{DynamicImage, RgbImage};

use crate::core::coords::{CoordinateAdapter, CANVAS_SIZE};
use crate::core::db::DetectionStore;
use crate::core::histogram::{self, HistogramPresenter};
use crate::core::registry::SelectionRegistry;
use crate::core::render::Renderer;
use crate::detection::Detector;
use crate::error::{InspectorError, Operation, Result};
use crate::logging::TARGET;
use crate::models::{BoundingBox, DetectedObject};

pub const STATUS_DETECTING: &str = "Detected Objects: Detecting...";
pub const STATUS_NO_OBJECTS: &str = "Detected Objects: No objects detected";
pub const STATUS_UNKNOWN_LABEL: &str = "Selected object button does not exist.";

/// Where the inspector is in its interaction cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    NoImage,
    ImageLoaded,
    ObjectsDetected,
    ObjectHighlighted,
    /// A histogram report is with the presenter.
    HistogramShown,
}

/// The decoded image together with the path it came from.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub path: PathBuf,
    pub image: DynamicImage,
}

/// Owns the display state and sequences detection, persistence, rendering
/// and histogram presentation.
///
/// Every operation logs its own failure on the `staging` target, tagged with
/// the operation name, and then returns it. Nothing that already changed is
/// rolled back.
pub struct InspectorController<D, S, P> {
    detector: D,
    store: S,
    presenter: P,
    renderer: Renderer,
    loaded: Option<LoadedImage>,
    registry: SelectionRegistry,
    canvas: Option<RgbImage>,
    status: String,
    view: ViewState,
}

impl<D, S, P> InspectorController<D, S, P>
where
    D: Detector,
    S: DetectionStore,
    P: HistogramPresenter,
{
    pub fn new(detector: D, store: S, presenter: P, renderer: Renderer) -> Self {
        Self {
            detector,
            store,
            presenter,
            renderer,
            loaded: None,
            registry: SelectionRegistry::new(),
            canvas: None,
            status: String::new(),
            view: ViewState::NoImage,
        }
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn canvas(&self) -> Option<&RgbImage> {
        self.canvas.as_ref()
    }

    pub fn registry(&self) -> &SelectionRegistry {
        &self.registry
    }

    pub fn view_state(&self) -> ViewState {
        self.view
    }

    pub fn loaded_image(&self) -> Option<&LoadedImage> {
        self.loaded.as_ref()
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    pub fn detector(&self) -> &D {
        &self.detector
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }

    /// Original-image pixel under canvas position `(x, y)`, if an image is
    /// loaded and the position lies on the canvas.
    pub fn canvas_to_original(&self, x: u32, y: u32) -> Option<(u32, u32)> {
        let loaded = self.loaded.as_ref()?;
        if x >= CANVAS_SIZE || y >= CANVAS_SIZE {
            return None;
        }
        let adapter = CoordinateAdapter::new(loaded.image.width(), loaded.image.height());
        let original = adapter.to_original(BoundingBox::new(x, y, 0, 0));
        Some((original.x, original.y))
    }

    /// Result of the file dialog. `None` (dialog cancelled) does nothing.
    pub fn select_image(&mut self, selection: Option<PathBuf>) -> Result<()> {
        match selection {
            Some(path) => self.load_image(&path),
            None => Ok(()),
        }
    }

    /// Decode `path`, then render it and run a detection pass.
    ///
    /// A decode failure leaves the previous image and controls in place.
    pub fn load_image(&mut self, path: &Path) -> Result<()> {
        logged(Operation::SelectImage, self.decode(path))?;
        // failures are logged under display_image; detection still runs
        let _ = self.render_full();
        self.detect_objects()
    }

    fn decode(&mut self, path: &Path) -> Result<()> {
        log::info!(target: TARGET, "Selected image path: {}", path.display());
        let image = image::open(path).map_err(|source| InspectorError::Load {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!(target: TARGET, "Image loaded successfully.");
        self.loaded = Some(LoadedImage {
            path: path.to_path_buf(),
            image,
        });
        self.view = ViewState::ImageLoaded;
        Ok(())
    }

    /// Redraw the canvas with every detection boxed.
    pub fn render_full(&mut self) -> Result<()> {
        logged(Operation::DisplayImage, self.run_render_full())
    }

    fn run_render_full(&mut self) -> Result<()> {
        let loaded = self.loaded.as_ref().ok_or(InspectorError::NoImage)?;
        let detections = self
            .detector
            .detect(&loaded.path)
            .map_err(InspectorError::Detection)?;
        self.canvas = Some(self.renderer.render_full(&loaded.image, &detections));
        Ok(())
    }

    /// Detect, persist, redraw, and rebuild the controls.
    pub fn detect_objects(&mut self) -> Result<()> {
        logged(Operation::DetectObjects, self.run_detect_objects())
    }

    fn run_detect_objects(&mut self) -> Result<()> {
        let loaded = self.loaded.as_ref().ok_or(InspectorError::NoImage)?;
        let detections = self
            .detector
            .detect(&loaded.path)
            .map_err(InspectorError::Detection)?;

        log::info!(target: TARGET, "Image path: {}", loaded.path.display());
        log::info!(target: TARGET, "Detected objects: [{}]", describe(&detections));
        self.status = STATUS_DETECTING.to_string();

        let inserted = self.store.insert_batch(&detections);
        let closed = self.store.close();
        inserted.and(closed).map_err(InspectorError::Persistence)?;

        self.canvas = Some(self.renderer.render_full(&loaded.image, &detections));

        if detections.is_empty() {
            self.registry = SelectionRegistry::new();
            self.status = STATUS_NO_OBJECTS.to_string();
            self.view = ViewState::ImageLoaded;
            return Err(InspectorError::EmptyDetection);
        }

        self.registry = SelectionRegistry::from_detections(&detections);
        self.status = self.registry.status_line();
        self.view = ViewState::ObjectsDetected;
        Ok(())
    }

    /// Draw only the detections labelled `label`, then present a histogram of
    /// the last one. Returns how many boxes were drawn.
    ///
    /// A histogram failure is logged under `generate_histogram` and leaves the
    /// view at `ObjectHighlighted`; the highlight itself still succeeds.
    pub fn highlight(&mut self, label: &str) -> Result<usize> {
        logged(Operation::DisplaySelectedObject, self.run_highlight(label))
    }

    fn run_highlight(&mut self, label: &str) -> Result<usize> {
        if !self.registry.contains(label) {
            self.status = STATUS_UNKNOWN_LABEL.to_string();
            return Err(InspectorError::UnknownLabel(label.to_string()));
        }
        let loaded = self.loaded.as_ref().ok_or(InspectorError::NoImage)?;
        let detections = self
            .detector
            .detect(&loaded.path)
            .map_err(InspectorError::Detection)?;

        let (canvas, drawn) = self.renderer.render_highlight(&loaded.image, &detections, label);
        self.canvas = Some(canvas);
        self.view = ViewState::ObjectHighlighted;

        let selected: Vec<DetectedObject> = detections
            .into_iter()
            .filter(|d| d.label == label)
            .collect();
        if !selected.is_empty() {
            let _ = self.generate_histogram(&selected);
        }
        Ok(drawn)
    }

    /// Histogram of the last of `entries`, cropped from a fresh read of the
    /// image file with unscaled coordinates, handed to the presenter.
    pub fn generate_histogram(&mut self, entries: &[DetectedObject]) -> Result<()> {
        logged(Operation::GenerateHistogram, self.run_generate_histogram(entries))
    }

    fn run_generate_histogram(&mut self, entries: &[DetectedObject]) -> Result<()> {
        let path = self.loaded.as_ref().ok_or(InspectorError::NoImage)?.path.clone();
        let report = histogram::report_for(&path, entries).map_err(InspectorError::Histogram)?;
        self.view = ViewState::HistogramShown;
        self.presenter
            .present(&report)
            .map_err(InspectorError::Presentation)
    }

    /// The presenter's view was closed.
    pub fn dismiss_histogram(&mut self) {
        if self.view == ViewState::HistogramShown {
            self.view = ViewState::ObjectHighlighted;
        }
    }
}

fn describe(detections: &[DetectedObject]) -> String {
    detections
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn logged<T>(operation: Operation, result: Result<T>) -> Result<T> {
    if let Err(err) = &result {
        log::error!(target: TARGET, "An error occurred in {}: {}", operation, err);
    }
    result
}
