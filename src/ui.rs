//! Ratatui front-end: one tab per table, modal popups for forms and
//! confirmations, and a footer for status messages and key hints.

mod app;
mod forms;
mod helpers;
mod screens;
mod terminal;

pub use app::App;
pub use terminal::run_app;
