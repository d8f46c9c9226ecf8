use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::models::Registration;
use crate::Result;

/// 通知目标快照来源，每次调用都重新读取
#[async_trait]
pub trait RegistrationSource: Send + Sync {
    /// 返回 实例名 -> 注册信息，没有目标时返回空映射
    async fn registrations(&self) -> Result<BTreeMap<String, Registration>>;
}
