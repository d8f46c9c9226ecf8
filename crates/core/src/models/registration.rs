use kube::api::{DynamicObject, GroupVersionKind};
use serde::{Deserialize, Serialize};

use crate::errors::{EventRouterError, Result};

pub const REGISTRATION_GROUP: &str = "eventrouter.krateo.io";
pub const REGISTRATION_VERSION: &str = "v1alpha1";
pub const REGISTRATION_KIND: &str = "Registration";

/// 固定端点模式下使用的服务名
pub const FIXED_ENDPOINT_SERVICE: &str = "fixed-endpoint";

pub fn registration_gvk() -> GroupVersionKind {
    GroupVersionKind::gvk(REGISTRATION_GROUP, REGISTRATION_VERSION, REGISTRATION_KIND)
}

/// 通知目标
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub service_name: String,
    pub endpoint: String,
}

impl Registration {
    pub fn new(service_name: &str, endpoint: &str) -> Self {
        Self {
            service_name: service_name.to_string(),
            endpoint: endpoint.to_string(),
        }
    }

    pub fn fixed(endpoint: &str) -> Self {
        Self::new(FIXED_ENDPOINT_SERVICE, endpoint)
    }

    /// 从 Registration 自定义资源中提取 spec.serviceName 和 spec.endpoint
    ///
    /// 字段缺失、类型不是字符串或为空串时返回错误，调用方应丢弃该条目
    pub fn from_object(object: &DynamicObject) -> Result<Self> {
        let name = object.metadata.name.clone().unwrap_or_default();
        let service_name = required_spec_string(object, &name, "serviceName")?;
        let endpoint = required_spec_string(object, &name, "endpoint")?;

        Ok(Self {
            service_name,
            endpoint,
        })
    }
}

fn required_spec_string(object: &DynamicObject, name: &str, field: &str) -> Result<String> {
    let value = object
        .data
        .get("spec")
        .and_then(|spec| spec.get(field))
        .ok_or_else(|| EventRouterError::InvalidRegistration {
            name: name.to_string(),
            message: format!("缺少字段 spec.{field}"),
        })?;

    match value.as_str() {
        Some(s) if !s.is_empty() => Ok(s.to_string()),
        Some(_) => Err(EventRouterError::InvalidRegistration {
            name: name.to_string(),
            message: format!("字段 spec.{field} 为空"),
        }),
        None => Err(EventRouterError::InvalidRegistration {
            name: name.to_string(),
            message: format!("字段 spec.{field} 不是字符串: {value}"),
        }),
    }
}
