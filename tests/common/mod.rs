#![allow(dead_code)]

mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from detectview for tests
pub use detectview::core::controller::{STATUS_DETECTING, STATUS_NO_OBJECTS, STATUS_UNKNOWN_LABEL};
pub use detectview::core::{ChannelHistogram, SqliteStore, StoredDetection};
pub use detectview::{
    BoundingBox, CachedDetector, DetectedObject, DetectionStore, InspectorController,
    InspectorError, Renderer, SelectionRegistry, ViewState,
};
