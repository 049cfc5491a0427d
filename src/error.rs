use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Controller operation names, used to tag log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    SelectImage,
    DetectObjects,
    DisplayImage,
    DisplaySelectedObject,
    GenerateHistogram,
}

impl Operation {
    pub fn name(self) -> &'static str {
        match self {
            Operation::SelectImage => "select_image",
            Operation::DetectObjects => "detect_objects",
            Operation::DisplayImage => "display_image",
            Operation::DisplaySelectedObject => "display_selected_object",
            Operation::GenerateHistogram => "generate_histogram",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error)]
pub enum InspectorError {
    #[error("failed to load image {path:?}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("no objects detected")]
    EmptyDetection,

    #[error("selected object button does not exist: {0}")]
    UnknownLabel(String),

    #[error("image not loaded")]
    NoImage,

    #[error("detection failed: {0:#}")]
    Detection(anyhow::Error),

    #[error("persisting detections failed: {0:#}")]
    Persistence(anyhow::Error),

    #[error("rendering failed: {0:#}")]
    Render(anyhow::Error),

    #[error("histogram generation failed: {0:#}")]
    Histogram(anyhow::Error),

    #[error("presenting histogram failed: {0:#}")]
    Presentation(anyhow::Error),
}

pub type Result<T> = std::result::Result<T, InspectorError>;
