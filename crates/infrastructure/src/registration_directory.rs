use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use eventrouter_core::{
    errors::Result,
    models::{registration::FIXED_ENDPOINT_SERVICE, registration_gvk, Registration},
    traits::{ObjectResolver, RegistrationSource},
};
use tracing::{debug, error, warn};

/// 从 Registration 自定义资源读取通知目标
///
/// 不做缓存：注册可能在两个事件之间增删，过期快照会把通知发错地方。
pub struct RegistrationDirectory {
    resolver: Arc<dyn ObjectResolver>,
    namespace: Option<String>,
}

impl RegistrationDirectory {
    pub fn new(resolver: Arc<dyn ObjectResolver>, namespace: Option<String>) -> Self {
        Self {
            resolver,
            namespace,
        }
    }

    /// 实例名 -> 注册信息；字段不完整的实例记录日志后跳过
    pub async fn list_registrations(&self) -> Result<BTreeMap<String, Registration>> {
        let objects = self
            .resolver
            .list(&registration_gvk(), self.namespace.as_deref())
            .await?;

        let mut registrations = BTreeMap::new();
        for object in &objects {
            let Some(name) = object.metadata.name.clone().filter(|n| !n.is_empty()) else {
                warn!("跳过没有名称的Registration资源");
                continue;
            };

            match Registration::from_object(object) {
                Ok(registration) => {
                    registrations.insert(name, registration);
                }
                Err(e) => {
                    error!(registration = %name, "读取Registration失败: {}", e);
                }
            }
        }

        debug!(
            "读取到 {} 个有效注册（共 {} 个实例）",
            registrations.len(),
            objects.len()
        );
        Ok(registrations)
    }
}

#[async_trait]
impl RegistrationSource for RegistrationDirectory {
    async fn registrations(&self) -> Result<BTreeMap<String, Registration>> {
        self.list_registrations().await
    }
}

/// 单端点模式：始终只有一个固定目标
pub struct FixedRegistration {
    registration: Registration,
}

impl FixedRegistration {
    pub fn new(endpoint: &str) -> Self {
        Self {
            registration: Registration::fixed(endpoint),
        }
    }
}

#[async_trait]
impl RegistrationSource for FixedRegistration {
    async fn registrations(&self) -> Result<BTreeMap<String, Registration>> {
        let mut registrations = BTreeMap::new();
        registrations.insert(FIXED_ENDPOINT_SERVICE.to_string(), self.registration.clone());
        Ok(registrations)
    }
}
