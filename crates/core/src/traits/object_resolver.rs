//! 通用资源访问接口
//!
//! 资源以 `DynamicObject`（元数据 + 无类型JSON）统一表示，
//! 因此可以沿所有权链遍历任意 kind 的 owner，无需封闭的类型层次。

use async_trait::async_trait;
use kube::api::{DynamicObject, GroupVersionKind};
use serde_json::Value;

use crate::models::ObjectReference;
use crate::Result;

/// 按 kind 描述访问集群资源，实现必须可并发使用
#[async_trait]
pub trait ObjectResolver: Send + Sync {
    /// 列出指定 kind 的所有资源，namespace 为 None 时跨命名空间
    async fn list(&self, gvk: &GroupVersionKind, namespace: Option<&str>)
        -> Result<Vec<DynamicObject>>;

    /// 按引用获取单个资源，不存在时返回 None
    async fn get(&self, reference: &ObjectReference) -> Result<Option<DynamicObject>>;

    /// 对资源应用 merge patch
    async fn patch(&self, reference: &ObjectReference, patch: &Value) -> Result<()>;
}
