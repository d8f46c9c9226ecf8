use std::collections::HashMap;

use async_trait::async_trait;
use eventrouter_core::{
    errors::{EventRouterError, Result},
    models::ObjectReference,
    traits::ObjectResolver,
};
use kube::api::{Api, ApiResource, DynamicObject, GroupVersionKind, ListParams, Patch, PatchParams};
use kube::discovery::{self, Scope};
use kube::Client;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::debug;

type GvkKey = (String, String, String);

/// 基于 kube 动态API的通用资源访问实现
///
/// 每次调用都是一次新的API请求；只缓存 kind -> ApiResource 的发现结果。
pub struct KubeObjectResolver {
    client: Client,
    resources: RwLock<HashMap<GvkKey, (ApiResource, Scope)>>,
}

impl KubeObjectResolver {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            resources: RwLock::new(HashMap::new()),
        }
    }

    /// 通过API发现确定 kind 对应的资源路径和作用域
    async fn discover(&self, gvk: &GroupVersionKind) -> Result<(ApiResource, Scope)> {
        let key = (gvk.group.clone(), gvk.version.clone(), gvk.kind.clone());
        if let Some(found) = self.resources.read().await.get(&key) {
            return Ok(found.clone());
        }

        let (resource, capabilities) = discovery::pinned_kind(&self.client, gvk).await?;
        debug!(
            "发现资源类型: {}/{} {} -> {} ({:?})",
            gvk.group, gvk.version, gvk.kind, resource.plural, capabilities.scope
        );

        let entry = (resource, capabilities.scope);
        self.resources.write().await.insert(key, entry.clone());
        Ok(entry)
    }

    /// 列表用：命名空间为空时跨全部命名空间
    async fn list_api(
        &self,
        gvk: &GroupVersionKind,
        namespace: Option<&str>,
    ) -> Result<Api<DynamicObject>> {
        let (resource, scope) = self.discover(gvk).await?;
        let api = match (scope, namespace) {
            (Scope::Namespaced, Some(ns)) => {
                Api::namespaced_with(self.client.clone(), ns, &resource)
            }
            _ => Api::all_with(self.client.clone(), &resource),
        };
        Ok(api)
    }

    /// 单个对象用：命名空间资源缺少命名空间时使用客户端默认命名空间
    async fn object_api(&self, reference: &ObjectReference) -> Result<Api<DynamicObject>> {
        let (resource, scope) = self.discover(&reference.gvk()).await?;
        let api = match (scope, reference.namespace.as_deref()) {
            (Scope::Cluster, _) => Api::all_with(self.client.clone(), &resource),
            (Scope::Namespaced, Some(ns)) => {
                Api::namespaced_with(self.client.clone(), ns, &resource)
            }
            (Scope::Namespaced, None) => {
                Api::default_namespaced_with(self.client.clone(), &resource)
            }
        };
        Ok(api)
    }
}

#[async_trait]
impl ObjectResolver for KubeObjectResolver {
    async fn list(
        &self,
        gvk: &GroupVersionKind,
        namespace: Option<&str>,
    ) -> Result<Vec<DynamicObject>> {
        let api = self.list_api(gvk, namespace).await?;
        let list = api.list(&ListParams::default()).await?;

        debug!("列出 {} 个 {} 资源", list.items.len(), gvk.kind);
        Ok(list.items)
    }

    async fn get(&self, reference: &ObjectReference) -> Result<Option<DynamicObject>> {
        reference.validate()?;

        let api = match self.object_api(reference).await {
            Ok(api) => api,
            // 未知的 kind 与不存在的对象同样处理
            Err(EventRouterError::Kube(kube::Error::Discovery(e))) => {
                debug!("无法发现资源类型 {}: {}", reference, e);
                return Ok(None);
            }
            Err(e) if e.is_not_found() => return Ok(None),
            Err(e) => return Err(e),
        };

        Ok(api.get_opt(&reference.name).await?)
    }

    async fn patch(&self, reference: &ObjectReference, patch: &Value) -> Result<()> {
        reference.validate()?;

        let api = self.object_api(reference).await?;
        api.patch(&reference.name, &PatchParams::default(), &Patch::Merge(patch))
            .await?;

        debug!("已对 {} 应用merge patch", reference);
        Ok(())
    }
}
