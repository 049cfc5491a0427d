use iced::{Element, Task, Theme};

use crate::config::Config;
use crate::gui::{
    AppState, Message,
    screens::{
        Screen, ScreenData, ScreenMessage,
        histogram::{HistogramParentMessage, HistogramScreen},
        inspector::{self, InspectorScreen},
        startup_error::StartupErrorScreen,
    },
};
use crate::logging::TARGET;

const WINDOW_WIDTH: f32 = 540.0;
const WINDOW_HEIGHT: f32 = 860.0;

pub struct InspectorApp {
    state: Result<AppState, StartupErrorScreen>,
    screen: ScreenData,
}

impl InspectorApp {
    pub fn new(config: &Config) -> Self {
        let state = AppState::new(config).map_err(|e| {
            log::error!(target: TARGET, "An error occurred during UI initialization: {:#}", e);
            StartupErrorScreen {
                error: format!("{:#}", e),
            }
        });
        Self {
            state,
            screen: ScreenData::Inspector(InspectorScreen::default()),
        }
    }

    pub fn title(&self) -> String {
        "Object Detection Application".to_string()
    }

    pub fn theme(&self) -> Theme {
        Theme::Light
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        let Ok(state) = &mut self.state else {
            return Task::none();
        };
        let mut next_screen = None;
        let task = match (&mut self.screen, message) {
            (ScreenData::Inspector(screen), Message::Inspector(msg)) => match msg {
                ScreenMessage::ScreenMessage(msg) => {
                    screen.update(msg, state).map(Message::Inspector)
                }
                ScreenMessage::ParentMessage(inspector::ParentMessage::ShowHistogram(report)) => {
                    next_screen = Some(ScreenData::Histogram(HistogramScreen::new(
                        &report,
                        state.controller.renderer().typeface(),
                    )));
                    Task::none()
                }
            },
            (ScreenData::Histogram(screen), Message::Histogram(msg)) => match msg {
                ScreenMessage::ScreenMessage(msg) => {
                    screen.update(msg, state).map(Message::Histogram)
                }
                ScreenMessage::ParentMessage(HistogramParentMessage::Dismissed) => {
                    state.controller.dismiss_histogram();
                    next_screen = Some(ScreenData::Inspector(InspectorScreen::default()));
                    Task::none()
                }
            },
            // stale message for a screen that is no longer shown
            _ => Task::none(),
        };
        if let Some(screen) = next_screen {
            self.screen = screen;
        }
        task
    }

    pub fn view(&self) -> Element<'_, Message> {
        match &self.state {
            Err(startup_error) => startup_error.view(),
            Ok(state) => match &self.screen {
                ScreenData::Inspector(screen) => screen.view(state).map(Message::Inspector),
                ScreenData::Histogram(screen) => screen.view(state).map(Message::Histogram),
            },
        }
    }
}

/// Open the main window and block until it closes.
pub fn run(config: Config) -> anyhow::Result<()> {
    iced::application(
        move || (InspectorApp::new(&config), Task::none()),
        InspectorApp::update,
        InspectorApp::view,
    )
    .title(InspectorApp::title)
    .theme(InspectorApp::theme)
    .window_size((WINDOW_WIDTH, WINDOW_HEIGHT))
    .resizable(false)
    .run()
    .map_err(|e| anyhow::anyhow!("GUI terminated with an error: {}", e))
}
