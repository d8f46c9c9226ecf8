pub mod app_config;
pub mod logging;

// Re-export main types for easier imports
pub use app_config::{AppConfig, ENV_PREFIX};
pub use logging::LogFormat;
