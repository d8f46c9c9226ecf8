//! EventRouter
//!
//! 监听集群事件，沿所有权链解析组合ID，为事件打上处理标记，
//! 并把通知推送到每个已注册的端点。

pub mod app;
pub mod cli;
pub mod shutdown;

pub use app::{Application, Components};
pub use shutdown::ShutdownManager;
