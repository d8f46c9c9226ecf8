pub mod config;
pub mod errors;
pub mod logging;
pub mod models;
pub mod traits;

pub use config::{AppConfig, LogFormat};
pub use errors::*;
pub use traits::{AdmissionPolicy, Notifier, ObjectResolver, RegistrationSource};

/// 统一的Result类型
pub type EventRouterResult<T> = std::result::Result<T, EventRouterError>;
