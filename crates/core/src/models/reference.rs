use std::fmt;

use k8s_openapi::api::core::v1::{Event, ObjectReference as CoreObjectReference};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ObjectMeta, OwnerReference};
use kube::api::GroupVersionKind;
use serde::{Deserialize, Serialize};

use crate::errors::{EventRouterError, Result};

/// 任意资源的引用，既用于事件的 involvedObject，也用于所有权链上的 owner
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectReference {
    pub api_version: String,
    pub kind: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
}

impl ObjectReference {
    pub fn new(api_version: &str, kind: &str, name: &str) -> Self {
        Self {
            api_version: api_version.to_string(),
            kind: kind.to_string(),
            name: name.to_string(),
            namespace: None,
            uid: None,
        }
    }

    pub fn with_namespace(mut self, namespace: &str) -> Self {
        self.namespace = if namespace.is_empty() {
            None
        } else {
            Some(namespace.to_string())
        };
        self
    }

    pub fn with_uid(mut self, uid: &str) -> Self {
        self.uid = Some(uid.to_string());
        self
    }

    /// 指向事件资源本身的引用（打补丁时使用）
    pub fn for_event(event: &Event) -> Self {
        let meta = &event.metadata;
        let mut reference = Self::new("v1", "Event", meta.name.as_deref().unwrap_or_default())
            .with_namespace(meta.namespace.as_deref().unwrap_or_default());
        reference.uid = meta.uid.clone();
        reference
    }

    /// 由 ownerReference 构造引用；owner 与子资源同命名空间（集群级 owner 忽略命名空间）
    pub fn from_owner(owner: &OwnerReference, namespace: Option<&str>) -> Self {
        let mut reference = Self::new(&owner.api_version, &owner.kind, &owner.name);
        reference.namespace = namespace.filter(|ns| !ns.is_empty()).map(str::to_string);
        reference.uid = Some(owner.uid.clone());
        reference
    }

    /// API组，核心组为空字符串
    pub fn group(&self) -> &str {
        match self.api_version.split_once('/') {
            Some((group, _)) => group,
            None => "",
        }
    }

    pub fn version(&self) -> &str {
        match self.api_version.split_once('/') {
            Some((_, version)) => version,
            None => &self.api_version,
        }
    }

    pub fn gvk(&self) -> GroupVersionKind {
        GroupVersionKind::gvk(self.group(), self.version(), &self.kind)
    }

    /// 环检测使用的键：(kind, namespace, name)
    pub fn visit_key(&self) -> (String, String, String) {
        (
            self.kind.clone(),
            self.namespace.clone().unwrap_or_default(),
            self.name.clone(),
        )
    }

    pub fn validate(&self) -> Result<()> {
        if self.kind.is_empty() {
            return Err(EventRouterError::InvalidReference(format!(
                "缺少kind: {self}"
            )));
        }
        if self.name.is_empty() {
            return Err(EventRouterError::InvalidReference(format!(
                "缺少name: {self}"
            )));
        }
        if self.version().is_empty() {
            return Err(EventRouterError::InvalidReference(format!(
                "缺少apiVersion: {self}"
            )));
        }
        Ok(())
    }
}

impl From<&CoreObjectReference> for ObjectReference {
    fn from(reference: &CoreObjectReference) -> Self {
        Self {
            api_version: reference.api_version.clone().unwrap_or_default(),
            kind: reference.kind.clone().unwrap_or_default(),
            name: reference.name.clone().unwrap_or_default(),
            namespace: reference.namespace.clone().filter(|ns| !ns.is_empty()),
            uid: reference.uid.clone(),
        }
    }
}

impl fmt::Display for ObjectReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{}/{} {}/{}", self.api_version, self.kind, ns, self.name),
            None => write!(f, "{}/{} {}", self.api_version, self.kind, self.name),
        }
    }
}

/// 资源到其 owner 的一条所有权边
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerEdge {
    pub owner: ObjectReference,
    pub is_controller: bool,
}

impl OwnerEdge {
    /// 读取资源元数据中的全部所有权边
    pub fn from_metadata(meta: &ObjectMeta) -> Vec<OwnerEdge> {
        let namespace = meta.namespace.as_deref();
        meta.owner_references
            .iter()
            .flatten()
            .map(|owner| OwnerEdge {
                owner: ObjectReference::from_owner(owner, namespace),
                is_controller: owner.controller.unwrap_or(false),
            })
            .collect()
    }

    /// 选出控制者 owner，按约定最多只有一个
    pub fn controlling(edges: &[OwnerEdge]) -> Option<&OwnerEdge> {
        edges.iter().find(|edge| edge.is_controller)
    }
}
