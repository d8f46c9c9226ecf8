use chrono::{DateTime, Utc};
use k8s_openapi::api::core::v1::Event;

/// 事件最后一次被观察到的时间
///
/// 依次取 lastTimestamp、eventTime、firstTimestamp、creationTimestamp
pub fn last_observed(event: &Event) -> Option<DateTime<Utc>> {
    event
        .last_timestamp
        .as_ref()
        .map(|t| t.0)
        .or_else(|| event.event_time.as_ref().map(|t| t.0))
        .or_else(|| event.first_timestamp.as_ref().map(|t| t.0))
        .or_else(|| event.metadata.creation_timestamp.as_ref().map(|t| t.0))
}

/// 事件的 namespace/name 标识，用于日志
pub fn event_identity(event: &Event) -> String {
    let name = event.metadata.name.as_deref().unwrap_or("<unnamed>");
    match event.metadata.namespace.as_deref() {
        Some(ns) if !ns.is_empty() => format!("{ns}/{name}"),
        _ => name.to_string(),
    }
}

/// 事件来源组件，旧版事件使用 source.component，新版使用 reportingComponent
pub fn source_component(event: &Event) -> String {
    event
        .source
        .as_ref()
        .and_then(|s| s.component.clone())
        .filter(|c| !c.is_empty())
        .or_else(|| event.reporting_component.clone())
        .unwrap_or_default()
}
