use crate::gui::screens::{histogram::HistogramScreen, inspector::InspectorScreen, ScreenMessage};

#[derive(Debug)]
pub enum Message {
    Inspector(ScreenMessage<InspectorScreen>),
    Histogram(ScreenMessage<HistogramScreen>),
}
