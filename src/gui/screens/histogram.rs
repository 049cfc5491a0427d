use std::convert::Infallible;

use iced::{
    Alignment::Center,
    Element, Length, Task,
    widget::{button, column, container, text, image::{Handle, Image}},
};

use crate::core::histogram::{render_plot, HistogramReport, PLOT_HEIGHT, PLOT_WIDTH};
use crate::core::Typeface;
use crate::gui::{
    AppState,
    screens::{Screen, ScreenMessage},
};

#[derive(Debug, Clone)]
pub struct HistogramScreen {
    caption: String,
    plot: Handle,
}

#[derive(Debug, Clone)]
pub enum HistogramParentMessage {
    Dismissed,
}

impl HistogramScreen {
    pub fn new(report: &HistogramReport, typeface: &Typeface) -> Self {
        let plot = ::image::DynamicImage::ImageRgb8(render_plot(report, typeface)).to_rgba8();
        Self {
            caption: format!(
                "{} at ({}, {}, {}, {}), {} pixels",
                report.label,
                report.bbox.x,
                report.bbox.y,
                report.bbox.width,
                report.bbox.height,
                report.histogram.pixel_count()
            ),
            plot: Handle::from_rgba(plot.width(), plot.height(), plot.into_raw()),
        }
    }
}

impl Screen for HistogramScreen {
    type Message = Infallible;
    type ParentMessage = HistogramParentMessage;

    fn view<'a>(&'a self, _state: &'a AppState) -> Element<'a, ScreenMessage<Self>> {
        let content = column![
            text(&self.caption),
            Image::new(self.plot.clone())
                .width(Length::Fixed(PLOT_WIDTH as f32 / 2.0))
                .height(Length::Fixed(PLOT_HEIGHT as f32 / 2.0)),
            button("Close").on_press(ScreenMessage::ParentMessage(
                HistogramParentMessage::Dismissed
            )),
        ]
        .spacing(12)
        .padding(10)
        .align_x(Center);

        container(content)
            .center_x(Length::Fill)
            .center_y(Length::Fill)
            .into()
    }

    fn update(
        &mut self,
        message: Self::Message,
        _state: &mut AppState,
    ) -> Task<ScreenMessage<Self>> {
        match message {}
    }
}
