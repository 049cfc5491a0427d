use iced::{
    Color, Element, Length, Theme, border,
    widget::{container, container::Style, image::{Handle, Image}, text},
};

use crate::core::CANVAS_SIZE;

fn canvas_style(theme: &Theme) -> Style {
    let palette = theme.palette();
    Style::default()
        .background(Color {
            a: 0.4,
            ..palette.background
        })
        .border(border::width(1).color(palette.text))
}

/// Fixed-size canvas showing `bitmap`, or a placeholder before any image is loaded.
pub fn canvas<'a, Message: 'a>(bitmap: Option<&Handle>) -> Element<'a, Message> {
    let side = Length::Fixed(CANVAS_SIZE as f32);
    match bitmap {
        Some(handle) => Image::new(handle.clone()).width(side).height(side).into(),
        None => container(text("No image selected"))
            .width(side)
            .height(side)
            .center_x(side)
            .center_y(side)
            .style(canvas_style)
            .into(),
    }
}
