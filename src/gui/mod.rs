mod app;
mod message;
mod state;
mod screens;
mod widgets;

pub use app::{run, InspectorApp};
pub use message::Message;
pub use state::{AppState, GuiController, ModalPresenter};
