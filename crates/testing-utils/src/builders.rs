//! Test data builders for creating test entities
//!
//! This module provides builder patterns for creating cluster events, owned
//! resources and Registration instances with sensible defaults.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use eventrouter_core::models::{
    registration::{REGISTRATION_GROUP, REGISTRATION_KIND, REGISTRATION_VERSION},
    ObjectReference,
};
use k8s_openapi::api::core::v1::{Event, EventSource, ObjectReference as CoreObjectReference};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ObjectMeta, OwnerReference, Time};
use kube::api::{DynamicObject, TypeMeta};
use serde_json::{json, Map, Value};

/// Builder for creating test Event resources
pub struct EventBuilder {
    event: Event,
}

impl EventBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            event: Event {
                metadata: ObjectMeta {
                    name: Some(name.to_string()),
                    namespace: Some("default".to_string()),
                    uid: Some(format!("{name}-uid")),
                    ..Default::default()
                },
                reason: Some("Created".to_string()),
                message: Some("Created container".to_string()),
                type_: Some("Normal".to_string()),
                source: Some(EventSource {
                    component: Some("kubelet".to_string()),
                    host: None,
                }),
                last_timestamp: Some(Time(Utc::now())),
                ..Default::default()
            },
        }
    }

    pub fn with_namespace(mut self, namespace: &str) -> Self {
        self.event.metadata.namespace = Some(namespace.to_string());
        self
    }

    pub fn with_reason(mut self, reason: &str) -> Self {
        self.event.reason = Some(reason.to_string());
        self
    }

    pub fn with_message(mut self, message: &str) -> Self {
        self.event.message = Some(message.to_string());
        self
    }

    pub fn with_type(mut self, event_type: &str) -> Self {
        self.event.type_ = Some(event_type.to_string());
        self
    }

    pub fn with_source(mut self, component: &str) -> Self {
        self.event.source = Some(EventSource {
            component: Some(component.to_string()),
            host: None,
        });
        self
    }

    /// Point the event at an object
    pub fn involving(mut self, reference: &ObjectReference) -> Self {
        self.event.involved_object = CoreObjectReference {
            api_version: Some(reference.api_version.clone()),
            kind: Some(reference.kind.clone()),
            name: Some(reference.name.clone()),
            namespace: reference.namespace.clone(),
            uid: reference.uid.clone(),
            ..Default::default()
        };
        self
    }

    pub fn with_label(mut self, key: &str, value: &str) -> Self {
        self.event
            .metadata
            .labels
            .get_or_insert_with(BTreeMap::new)
            .insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_last_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.event.last_timestamp = Some(Time(timestamp));
        self
    }

    pub fn without_timestamps(mut self) -> Self {
        self.event.last_timestamp = None;
        self.event.first_timestamp = None;
        self.event.event_time = None;
        self.event.metadata.creation_timestamp = None;
        self
    }

    pub fn build(self) -> Event {
        self.event
    }
}

/// Builder for creating arbitrary resources as `DynamicObject`
pub struct ObjectBuilder {
    object: DynamicObject,
}

impl ObjectBuilder {
    pub fn new(api_version: &str, kind: &str, name: &str) -> Self {
        Self {
            object: DynamicObject {
                types: Some(TypeMeta {
                    api_version: api_version.to_string(),
                    kind: kind.to_string(),
                }),
                metadata: ObjectMeta {
                    name: Some(name.to_string()),
                    uid: Some(format!("{}-{name}-uid", kind.to_lowercase())),
                    ..Default::default()
                },
                data: json!({}),
            },
        }
    }

    pub fn with_namespace(mut self, namespace: &str) -> Self {
        self.object.metadata.namespace = Some(namespace.to_string());
        self
    }

    pub fn with_label(mut self, key: &str, value: &str) -> Self {
        self.object
            .metadata
            .labels
            .get_or_insert_with(BTreeMap::new)
            .insert(key.to_string(), value.to_string());
        self
    }

    /// Add an ownerReference; `controller` marks it as the managing controller
    pub fn owned_by(mut self, owner: &ObjectReference, controller: bool) -> Self {
        self.object
            .metadata
            .owner_references
            .get_or_insert_with(Vec::new)
            .push(OwnerReference {
                api_version: owner.api_version.clone(),
                kind: owner.kind.clone(),
                name: owner.name.clone(),
                uid: owner
                    .uid
                    .clone()
                    .unwrap_or_else(|| format!("{}-uid", owner.name)),
                controller: Some(controller),
                block_owner_deletion: None,
            });
        self
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.object.data = data;
        self
    }

    /// Reference to the object being built
    pub fn reference(&self) -> ObjectReference {
        let types = self.object.types.clone().unwrap_or_default();
        let mut reference = ObjectReference::new(
            &types.api_version,
            &types.kind,
            self.object.metadata.name.as_deref().unwrap_or_default(),
        )
        .with_namespace(self.object.metadata.namespace.as_deref().unwrap_or_default());
        reference.uid = self.object.metadata.uid.clone();
        reference
    }

    pub fn build(self) -> DynamicObject {
        self.object
    }
}

/// Builder for Registration custom resources
pub struct RegistrationBuilder {
    name: String,
    namespace: Option<String>,
    spec: Map<String, Value>,
}

impl RegistrationBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            namespace: None,
            spec: Map::new(),
        }
    }

    pub fn with_namespace(mut self, namespace: &str) -> Self {
        self.namespace = Some(namespace.to_string());
        self
    }

    pub fn with_service_name(mut self, service_name: &str) -> Self {
        self.spec
            .insert("serviceName".to_string(), Value::String(service_name.to_string()));
        self
    }

    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.spec
            .insert("endpoint".to_string(), Value::String(endpoint.to_string()));
        self
    }

    pub fn build(self) -> DynamicObject {
        let api_version = format!("{REGISTRATION_GROUP}/{REGISTRATION_VERSION}");
        let mut builder = ObjectBuilder::new(&api_version, REGISTRATION_KIND, &self.name)
            .with_data(json!({ "spec": Value::Object(self.spec) }));
        if let Some(namespace) = &self.namespace {
            builder = builder.with_namespace(namespace);
        }
        builder.build()
    }
}

/// Registration with both fields set
pub fn registration_object(name: &str, service_name: &str, endpoint: &str) -> DynamicObject {
    RegistrationBuilder::new(name)
        .with_service_name(service_name)
        .with_endpoint(endpoint)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use eventrouter_core::models::Registration;

    #[test]
    fn test_object_builder_owner_chain() {
        let deployment = ObjectBuilder::new("apps/v1", "Deployment", "web").with_namespace("demo");
        let owner = deployment.reference();
        let replica_set = ObjectBuilder::new("apps/v1", "ReplicaSet", "web-7d9")
            .with_namespace("demo")
            .owned_by(&owner, true)
            .build();

        let owners = replica_set.metadata.owner_references.unwrap();
        assert_eq!(owners.len(), 1);
        assert_eq!(owners[0].kind, "Deployment");
        assert_eq!(owners[0].controller, Some(true));
    }

    #[test]
    fn test_registration_builder_roundtrip() {
        let object = registration_object("reg-a", "svc-a", "http://a.local/hook");
        let registration = Registration::from_object(&object).unwrap();
        assert_eq!(registration.service_name, "svc-a");
        assert_eq!(registration.endpoint, "http://a.local/hook");
    }

    #[test]
    fn test_event_builder_involving() {
        let pod = ObjectReference::new("v1", "Pod", "p1").with_namespace("demo");
        let event = EventBuilder::new("p1.17a").involving(&pod).build();
        assert_eq!(event.involved_object.kind.as_deref(), Some("Pod"));
        assert_eq!(event.involved_object.namespace.as_deref(), Some("demo"));
    }
}
