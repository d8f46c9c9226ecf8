use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use k8s_openapi::api::core::v1::Event;
use serde::{Deserialize, Serialize};

use super::event::{last_observed, source_component};
use super::registration::Registration;
use crate::errors::{EventRouterError, Result};

/// 通知负载格式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayloadFormat {
    /// 完整事件信息（默认）
    #[default]
    Rich,
    /// 精简格式：level/time/message/source/reason/deploymentId
    Flat,
}

impl FromStr for PayloadFormat {
    type Err = EventRouterError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "rich" => Ok(PayloadFormat::Rich),
            "flat" => Ok(PayloadFormat::Flat),
            _ => Err(EventRouterError::Configuration(format!(
                "不支持的负载格式: {s}，支持的格式: rich, flat"
            ))),
        }
    }
}

impl fmt::Display for PayloadFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PayloadFormat::Rich => write!(f, "rich"),
            PayloadFormat::Flat => write!(f, "flat"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvolvedObject {
    pub api_version: String,
    pub kind: String,
    pub name: String,
    pub uid: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventMetadata {
    pub creation_timestamp: String,
    pub name: String,
    pub namespace: String,
    pub uid: String,
}

/// 推送给注册端点的完整事件信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventInfo {
    #[serde(rename = "type")]
    pub event_type: String,
    pub reason: String,
    pub deployment_id: String,
    pub time: i64,
    pub message: String,
    pub source: String,
    pub involved_object: InvolvedObject,
    pub metadata: EventMetadata,
}

impl EventInfo {
    pub fn new(deployment_id: &str, event: &Event) -> Self {
        let involved = &event.involved_object;
        let meta = &event.metadata;

        Self {
            event_type: event.type_.clone().unwrap_or_default(),
            reason: event.reason.clone().unwrap_or_default(),
            deployment_id: deployment_id.to_string(),
            time: last_observed(event).map(|t| t.timestamp()).unwrap_or_default(),
            message: event.message.clone().unwrap_or_default(),
            source: source_component(event),
            involved_object: InvolvedObject {
                api_version: involved.api_version.clone().unwrap_or_default(),
                kind: involved.kind.clone().unwrap_or_default(),
                name: involved.name.clone().unwrap_or_default(),
                uid: involved.uid.clone().unwrap_or_default(),
            },
            metadata: EventMetadata {
                creation_timestamp: meta
                    .creation_timestamp
                    .as_ref()
                    .map(|t| t.0.to_rfc3339_opts(SecondsFormat::Secs, true))
                    .unwrap_or_default(),
                name: meta.name.clone().unwrap_or_default(),
                namespace: meta.namespace.clone().unwrap_or_default(),
                uid: meta.uid.clone().unwrap_or_default(),
            },
        }
    }
}

/// 单端点模式使用的精简通知
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlatNotification {
    pub level: String,
    pub time: i64,
    pub message: String,
    pub source: String,
    pub reason: String,
    pub deployment_id: String,
}

impl FlatNotification {
    pub fn new(deployment_id: &str, event: &Event, now: DateTime<Utc>) -> Self {
        let level = match event.type_.as_deref() {
            Some("Normal") => "info",
            _ => "error",
        };

        Self {
            level: level.to_string(),
            time: now.timestamp(),
            message: event.message.clone().unwrap_or_default(),
            source: event.involved_object.name.clone().unwrap_or_default(),
            reason: event.reason.clone().unwrap_or_default(),
            deployment_id: deployment_id.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NotificationPayload {
    Rich(EventInfo),
    Flat(FlatNotification),
}

impl NotificationPayload {
    /// 将事件和组合ID转换为线上负载，纯函数
    pub fn encode(
        format: PayloadFormat,
        deployment_id: Option<&str>,
        event: &Event,
        now: DateTime<Utc>,
    ) -> Self {
        let deployment_id = deployment_id.unwrap_or_default();
        match format {
            PayloadFormat::Rich => NotificationPayload::Rich(EventInfo::new(deployment_id, event)),
            PayloadFormat::Flat => {
                NotificationPayload::Flat(FlatNotification::new(deployment_id, event, now))
            }
        }
    }

    pub fn deployment_id(&self) -> &str {
        match self {
            NotificationPayload::Rich(info) => &info.deployment_id,
            NotificationPayload::Flat(n) => &n.deployment_id,
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}

/// 一次投递工作：目标 + 负载，入队后不可变
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationJob {
    pub registration: Registration,
    pub payload: NotificationPayload,
}

impl NotificationJob {
    pub fn new(registration: Registration, payload: NotificationPayload) -> Self {
        Self {
            registration,
            payload,
        }
    }
}
