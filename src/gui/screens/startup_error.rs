use iced::{
    Alignment::Center,
    Element, Length,
    widget::{column, container, text},
};

/// Shown instead of the inspector when the application state could not be built.
#[derive(Debug, Clone)]
pub struct StartupErrorScreen {
    pub error: String,
}

impl StartupErrorScreen {
    pub fn view<'a, Message: 'a>(&'a self) -> Element<'a, Message> {
        container(
            column![
                text("Failed to start").size(24),
                text(&self.error),
            ]
            .spacing(12)
            .align_x(Center),
        )
        .center_x(Length::Fill)
        .center_y(Length::Fill)
        .into()
    }
}
