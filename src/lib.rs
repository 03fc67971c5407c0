//! scenegui - demo application for the UI scene bridge
//!
//! Holds the application configuration and a quad-based immediate-mode UI
//! used by the `scenegui-demo` binary.

pub mod config;
pub mod quad_ui;
pub mod scene;

pub use config::{AppConfig, ConfigError, LogLevel};
pub use quad_ui::QuadUi;
