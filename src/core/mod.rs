pub mod controller;
pub mod coords;
pub mod db;
pub mod histogram;
pub mod registry;
pub mod render;

pub use controller::{InspectorController, LoadedImage, ViewState};
pub use coords::{CoordinateAdapter, CANVAS_SIZE};
pub use db::{DetectionStore, SqliteStore, StoredDetection};
pub use histogram::{ChannelHistogram, HistogramPresenter, HistogramReport, LogPresenter, PngPresenter};
pub use registry::{Control, SelectionRegistry};
pub use render::{Renderer, Typeface};
