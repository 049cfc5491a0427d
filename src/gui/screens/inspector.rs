use std::path::PathBuf;

use iced::{
    Alignment::Center,
    Element, Length, Point, Task,
    widget::{button, column, container, mouse_area, scrollable, text, Column},
};
use rfd::AsyncFileDialog;

use crate::core::HistogramReport;
use crate::gui::{
    AppState,
    screens::{Screen, ScreenMessage},
    widgets,
};

#[derive(Debug, Clone, Default)]
pub struct InspectorScreen {
    /// Original-image pixel under the pointer.
    hovered: Option<(u32, u32)>,
}

#[derive(Debug, Clone)]
pub enum InspectorMessage {
    SelectImage,
    ImagePicked(Option<PathBuf>),
    SelectObject(String),
    CanvasHovered(Point),
    CanvasLeft,
}

#[derive(Debug, Clone)]
pub enum ParentMessage {
    ShowHistogram(HistogramReport),
}

impl Screen for InspectorScreen {
    type Message = InspectorMessage;
    type ParentMessage = ParentMessage;

    fn view<'a>(&'a self, state: &'a AppState) -> Element<'a, ScreenMessage<Self>> {
        let controls: Vec<Element<'a, ScreenMessage<Self>>> = state
            .controller
            .registry()
            .controls()
            .iter()
            .map(|control| {
                button(text(format!("Generate histogram for object: {}", control.caption())))
                    .on_press(ScreenMessage::ScreenMessage(InspectorMessage::SelectObject(
                        control.label.clone(),
                    )))
                    .into()
            })
            .collect();

        let pointer = match self.hovered {
            Some((x, y)) => format!("Pixel: ({}, {})", x, y),
            None => String::new(),
        };

        let canvas = mouse_area(widgets::canvas(state.canvas.as_ref()))
            .on_move(|point| ScreenMessage::ScreenMessage(InspectorMessage::CanvasHovered(point)))
            .on_exit(ScreenMessage::ScreenMessage(InspectorMessage::CanvasLeft));

        let content = column![
            canvas,
            text(pointer).size(12),
            button("Select Image").on_press(ScreenMessage::ScreenMessage(
                InspectorMessage::SelectImage
            )),
            text(state.controller.status()),
            scrollable(Column::with_children(controls).spacing(6).align_x(Center))
                .height(Length::Fill),
        ]
        .spacing(10)
        .padding(10)
        .align_x(Center);

        container(content).center_x(Length::Fill).into()
    }

    fn update(
        &mut self,
        message: Self::Message,
        state: &mut AppState,
    ) -> Task<ScreenMessage<Self>> {
        match message {
            InspectorMessage::SelectImage => Task::perform(
                AsyncFileDialog::new()
                    .set_title("Select Image")
                    .add_filter("Image files", &["jpg", "png"])
                    .pick_file(),
                |handle| {
                    ScreenMessage::ScreenMessage(InspectorMessage::ImagePicked(
                        handle.map(|data| data.path().to_path_buf()),
                    ))
                },
            ),
            InspectorMessage::ImagePicked(selection) => {
                // logged by the controller; the status line carries the outcome
                let _ = state.controller.select_image(selection);
                state.refresh_canvas();
                Task::none()
            }
            InspectorMessage::CanvasHovered(point) => {
                self.hovered = state
                    .controller
                    .canvas_to_original(point.x.max(0.0) as u32, point.y.max(0.0) as u32);
                Task::none()
            }
            InspectorMessage::CanvasLeft => {
                self.hovered = None;
                Task::none()
            }
            InspectorMessage::SelectObject(label) => {
                let _ = state.controller.highlight(&label);
                state.refresh_canvas();
                match state.controller.presenter_mut().take() {
                    Some(report) => Task::done(ScreenMessage::ParentMessage(
                        ParentMessage::ShowHistogram(report),
                    )),
                    None => Task::none(),
                }
            }
        }
    }
}
