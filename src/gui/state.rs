use iced::widget::image::Handle;

use crate::config::Config;
use crate::core::db::{DetectionStore, SqliteStore};
use crate::core::histogram::{HistogramPresenter, HistogramReport};
use crate::core::render::{Renderer, Typeface};
use crate::core::InspectorController;
use crate::detection::{self, Detector};

pub type GuiController =
    InspectorController<Box<dyn Detector>, Box<dyn DetectionStore>, ModalPresenter>;

/// Holds the latest report until the shell opens the histogram view.
#[derive(Debug, Default)]
pub struct ModalPresenter {
    pending: Option<HistogramReport>,
}

impl ModalPresenter {
    pub fn take(&mut self) -> Option<HistogramReport> {
        self.pending.take()
    }
}

impl HistogramPresenter for ModalPresenter {
    fn present(&mut self, report: &HistogramReport) -> anyhow::Result<()> {
        self.pending = Some(report.clone());
        Ok(())
    }
}

pub struct AppState {
    pub controller: GuiController,
    pub canvas: Option<Handle>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("view", &self.controller.view_state())
            .field("status", &self.controller.status())
            .finish()
    }
}

impl AppState {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let store: Box<dyn DetectionStore> = Box::new(SqliteStore::new(&config.database.path)?);
        let renderer = Renderer::new(Typeface::locate(config.render.font_path.as_deref()));
        let controller = InspectorController::new(
            detection::from_config(&config.detector),
            store,
            ModalPresenter::default(),
            renderer,
        );
        Ok(Self {
            controller,
            canvas: None,
        })
    }

    /// Re-upload the controller's canvas bitmap for display.
    pub fn refresh_canvas(&mut self) {
        self.canvas = self.controller.canvas().map(|canvas| {
            let rgba = ::image::DynamicImage::ImageRgb8(canvas.clone()).to_rgba8();
            Handle::from_rgba(rgba.width(), rgba.height(), rgba.into_raw())
        });
    }
}
