use std::collections::HashMap;

use crate::models::{format_caption, DetectedObject};

/// The interactive element bound to one label.
#[derive(Debug, Clone, PartialEq)]
pub struct Control {
    pub label: String,
    pub confidence: f32,
}

impl Control {
    /// `"label (NN.NN%)"`
    pub fn caption(&self) -> String {
        format_caption(&self.label, self.confidence)
    }
}

/// Label → control, iterated in first-seen order.
///
/// Never edited in place: each detection pass builds a new registry with
/// [`SelectionRegistry::from_detections`] and the controller swaps it in.
#[derive(Debug, Clone, Default)]
pub struct SelectionRegistry {
    controls: Vec<Control>,
    index: HashMap<String, usize>,
}

impl SelectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// One control per unique label. Order follows each label's first
    /// appearance; the confidence is that of its last appearance.
    pub fn from_detections(detections: &[DetectedObject]) -> Self {
        let mut registry = Self::new();
        for detection in detections {
            match registry.index.get(&detection.label) {
                Some(&slot) => registry.controls[slot].confidence = detection.confidence,
                None => {
                    registry.index.insert(detection.label.clone(), registry.controls.len());
                    registry.controls.push(Control {
                        label: detection.label.clone(),
                        confidence: detection.confidence,
                    });
                }
            }
        }
        registry
    }

    pub fn get(&self, label: &str) -> Option<&Control> {
        self.index.get(label).map(|&slot| &self.controls[slot])
    }

    pub fn contains(&self, label: &str) -> bool {
        self.index.contains_key(label)
    }

    pub fn controls(&self) -> &[Control] {
        &self.controls
    }

    pub fn len(&self) -> usize {
        self.controls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controls.is_empty()
    }

    /// `"Detected Objects: a (10.00%), b (20.00%)"`
    pub fn status_line(&self) -> String {
        let captions: Vec<String> = self.controls.iter().map(Control::caption).collect();
        format!("Detected Objects: {}", captions.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_labels_collapse_with_last_confidence() {
        let detections = vec![
            DetectedObject::new("dog", (0, 0, 50, 50), 0.5),
            DetectedObject::new("cat", (5, 5, 10, 10), 0.3),
            DetectedObject::new("dog", (10, 10, 60, 60), 0.9),
        ];
        let registry = SelectionRegistry::from_detections(&detections);

        assert_eq!(registry.len(), 2);
        let labels: Vec<&str> = registry.controls().iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, ["dog", "cat"]);
        assert_eq!(registry.get("dog").map(Control::caption).as_deref(), Some("dog (90.00%)"));
        assert_eq!(
            registry.status_line(),
            "Detected Objects: dog (90.00%), cat (30.00%)"
        );
    }

    #[test]
    fn empty_detections_give_empty_registry() {
        let registry = SelectionRegistry::from_detections(&[]);
        assert!(registry.is_empty());
        assert!(!registry.contains("cat"));
    }
}
