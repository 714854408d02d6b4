//! Vocamark Application
//!
//! The application shell providing windowing, event routing, the egui
//! presentation layer, and the cpal audio driver behind the core capture
//! protocol.

mod app;
mod audio;
mod event_handler;
mod ui;

pub use app::{App, AppConfig};
pub use event_handler::EventHandler;
pub use ui::{render_ui, UiAction, UiState};
