pub mod notifier;
pub mod queue;

pub use notifier::HttpNotifier;
pub use queue::{NotificationQueue, QueueConfig, QueueStats};
