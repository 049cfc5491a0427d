pub mod config;
pub mod core;
pub mod detection;
pub mod error;
pub mod logging;
pub mod models;

pub use config::Config;
pub use crate::core::{
    CoordinateAdapter, Control, DetectionStore, HistogramPresenter, HistogramReport,
    InspectorController, Renderer, SelectionRegistry, SqliteStore, ViewState, CANVAS_SIZE,
};
pub use detection::{CachedDetector, ContourDetector, Detector};
pub use error::{InspectorError, Operation};
pub use models::{BoundingBox, DetectedObject};

#[cfg(feature = "gui")]
pub mod gui;
