//! Terminal front end: configuration, logging, the session loop and effect wiring.
mod app;
mod config;
mod effects;
mod logging;
mod ui;

pub use app::run_app;
