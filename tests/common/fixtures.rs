use std::cell::{Cell, RefCell};
use std::path::Path;
use std::rc::Rc;

use detectview::core::histogram::{HistogramPresenter, HistogramReport};
use detectview::core::{DetectionStore, InspectorController, Renderer};
use detectview::{DetectedObject, Detector};
use image::{ImageBuffer, Rgb};
use tempfile::NamedTempFile;

/// Creates a `width`x`height` PNG filled with `color`.
/// The file will be automatically cleaned up when dropped.
pub fn create_test_image(width: u32, height: u32, color: [u8; 3]) -> NamedTempFile {
    let file = tempfile::Builder::new()
        .suffix(".png")
        .tempfile()
        .expect("Failed to create temp image file");
    overwrite_test_image(file.path(), width, height, color);
    file
}

/// Replace the image at `path` with a solid `color` one.
pub fn overwrite_test_image(path: &Path, width: u32, height: u32, color: [u8; 3]) {
    let img = ImageBuffer::from_fn(width, height, |_, _| Rgb(color));
    img.save_with_format(path, image::ImageFormat::Png)
        .expect("Failed to save test image");
}

/// A `.png` file whose contents are not an image.
pub fn create_garbage_image() -> NamedTempFile {
    let file = tempfile::Builder::new()
        .suffix(".png")
        .tempfile()
        .expect("Failed to create temp file");
    std::fs::write(file.path(), b"definitely not a png").expect("Failed to write temp file");
    file
}

/// Detector returning whatever the test last scripted.
pub struct ScriptedDetector {
    objects: RefCell<Vec<DetectedObject>>,
    fail: Cell<bool>,
    calls: Rc<Cell<usize>>,
}

impl ScriptedDetector {
    pub fn new(objects: Vec<DetectedObject>) -> Self {
        Self {
            objects: RefCell::new(objects),
            fail: Cell::new(false),
            calls: Rc::new(Cell::new(0)),
        }
    }

    pub fn set(&self, objects: Vec<DetectedObject>) {
        *self.objects.borrow_mut() = objects;
    }

    pub fn fail_next(&self, fail: bool) {
        self.fail.set(fail);
    }

    pub fn calls(&self) -> usize {
        self.calls.get()
    }

    pub fn calls_handle(&self) -> Rc<Cell<usize>> {
        self.calls.clone()
    }
}

impl Detector for ScriptedDetector {
    fn detect(&self, _image_path: &Path) -> anyhow::Result<Vec<DetectedObject>> {
        self.calls.set(self.calls.get() + 1);
        if self.fail.get() {
            anyhow::bail!("backend unavailable");
        }
        Ok(self.objects.borrow().clone())
    }
}

/// In-memory store that tracks the connection lifecycle.
#[derive(Debug, Default)]
pub struct MemoryStore {
    pub batches: Vec<Vec<DetectedObject>>,
    pub open: bool,
    pub closes: usize,
    pub fail_inserts: bool,
}

impl DetectionStore for MemoryStore {
    fn insert_batch(&mut self, detections: &[DetectedObject]) -> anyhow::Result<()> {
        self.open = true;
        if self.fail_inserts {
            anyhow::bail!("disk full");
        }
        self.batches.push(detections.to_vec());
        Ok(())
    }

    fn close(&mut self) -> anyhow::Result<()> {
        self.open = false;
        self.closes += 1;
        Ok(())
    }
}

/// Keeps every report it is shown.
#[derive(Debug, Default)]
pub struct RecordingPresenter {
    pub reports: Vec<HistogramReport>,
}

impl HistogramPresenter for RecordingPresenter {
    fn present(&mut self, report: &HistogramReport) -> anyhow::Result<()> {
        self.reports.push(report.clone());
        Ok(())
    }
}

pub type TestController = InspectorController<ScriptedDetector, MemoryStore, RecordingPresenter>;

/// Controller over scripted collaborators, drawing with the bundled font.
pub fn create_test_controller(objects: Vec<DetectedObject>) -> TestController {
    InspectorController::new(
        ScriptedDetector::new(objects),
        MemoryStore::default(),
        RecordingPresenter::default(),
        Renderer::default(),
    )
}

pub const BOX_YELLOW: Rgb<u8> = Rgb([255, 255, 0]);
pub const GRAY: [u8; 3] = [90, 90, 90];
