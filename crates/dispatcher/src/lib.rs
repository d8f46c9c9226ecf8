//! Event Router
//!
//! 监听集群事件，为每个新事件解析组合ID、打上已处理标记，
//! 然后把通知分发给所有注册的端点。

pub mod admission;
pub mod handler;
pub mod router;

pub use admission::AllowListPolicy;
pub use handler::{is_stale, EventHandler, HandleOutcome, HandlerConfig};
pub use router::{EventRouter, RouterConfig, RouterState};
