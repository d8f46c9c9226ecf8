use async_trait::async_trait;

use crate::models::NotificationJob;
use crate::Result;

/// 通知投递接口，每次调用完成一次投递，不重试
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, job: &NotificationJob) -> Result<()>;
}
