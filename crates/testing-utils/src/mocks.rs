//! In-memory doubles for the cluster and notification seams
//!
//! The mocks keep their state behind `Arc`s so a test can hand a clone to the
//! component under test and keep another clone for assertions.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use eventrouter_core::{
    errors::{EventRouterError, Result},
    models::{NotificationJob, ObjectReference},
    traits::{Notifier, ObjectResolver},
};
use kube::api::{DynamicObject, GroupVersionKind};
use serde_json::Value;

/// (apiVersion, kind, namespace, name)
type ObjectKey = (String, String, String, String);

fn object_key(object: &DynamicObject) -> ObjectKey {
    let (api_version, kind) = object
        .types
        .as_ref()
        .map(|t| (t.api_version.clone(), t.kind.clone()))
        .unwrap_or_default();
    (
        api_version,
        kind,
        object.metadata.namespace.clone().unwrap_or_default(),
        object.metadata.name.clone().unwrap_or_default(),
    )
}

fn api_version_of(gvk: &GroupVersionKind) -> String {
    if gvk.group.is_empty() {
        gvk.version.clone()
    } else {
        format!("{}/{}", gvk.group, gvk.version)
    }
}

/// Mock implementation of ObjectResolver for testing
#[derive(Debug, Clone, Default)]
pub struct MockObjectResolver {
    objects: Arc<Mutex<HashMap<ObjectKey, DynamicObject>>>,
    patches: Arc<Mutex<Vec<(ObjectReference, Value)>>>,
    get_calls: Arc<AtomicUsize>,
    fail_get: Arc<AtomicBool>,
    fail_list: Arc<AtomicBool>,
    fail_patch: Arc<AtomicBool>,
}

impl MockObjectResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_objects(objects: Vec<DynamicObject>) -> Self {
        let resolver = Self::new();
        for object in objects {
            resolver.insert(object);
        }
        resolver
    }

    pub fn insert(&self, object: DynamicObject) {
        self.objects
            .lock()
            .unwrap()
            .insert(object_key(&object), object);
    }

    pub fn set_fail_get(&self, fail: bool) {
        self.fail_get.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_list(&self, fail: bool) {
        self.fail_list.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_patch(&self, fail: bool) {
        self.fail_patch.store(fail, Ordering::SeqCst);
    }

    pub fn get_calls(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
    }

    pub fn patches(&self) -> Vec<(ObjectReference, Value)> {
        self.patches.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.objects.lock().unwrap().len()
    }
}

#[async_trait]
impl ObjectResolver for MockObjectResolver {
    async fn list(
        &self,
        gvk: &GroupVersionKind,
        namespace: Option<&str>,
    ) -> Result<Vec<DynamicObject>> {
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(EventRouterError::Internal("mock list failure".to_string()));
        }

        let api_version = api_version_of(gvk);
        let objects = self.objects.lock().unwrap();
        let mut items: Vec<DynamicObject> = objects
            .iter()
            .filter(|((av, kind, ns, _), _)| {
                *av == api_version && *kind == gvk.kind && namespace.is_none_or(|n| n == ns.as_str())
            })
            .map(|(_, object)| object.clone())
            .collect();
        items.sort_by(|a, b| a.metadata.name.cmp(&b.metadata.name));
        Ok(items)
    }

    async fn get(&self, reference: &ObjectReference) -> Result<Option<DynamicObject>> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_get.load(Ordering::SeqCst) {
            return Err(EventRouterError::Internal("mock get failure".to_string()));
        }

        let objects = self.objects.lock().unwrap();
        let namespaced = (
            reference.api_version.clone(),
            reference.kind.clone(),
            reference.namespace.clone().unwrap_or_default(),
            reference.name.clone(),
        );
        // 集群级资源以空命名空间存储
        let cluster_scoped = (
            reference.api_version.clone(),
            reference.kind.clone(),
            String::new(),
            reference.name.clone(),
        );

        Ok(objects
            .get(&namespaced)
            .or_else(|| objects.get(&cluster_scoped))
            .cloned())
    }

    async fn patch(&self, reference: &ObjectReference, patch: &Value) -> Result<()> {
        if self.fail_patch.load(Ordering::SeqCst) {
            return Err(EventRouterError::Internal("mock patch failure".to_string()));
        }

        self.patches
            .lock()
            .unwrap()
            .push((reference.clone(), patch.clone()));

        let key = (
            reference.api_version.clone(),
            reference.kind.clone(),
            reference.namespace.clone().unwrap_or_default(),
            reference.name.clone(),
        );
        if let Some(object) = self.objects.lock().unwrap().get_mut(&key) {
            if let Some(labels) = patch["metadata"]["labels"].as_object() {
                let target = object.metadata.labels.get_or_insert_with(Default::default);
                for (k, v) in labels {
                    if let Some(v) = v.as_str() {
                        target.insert(k.clone(), v.to_string());
                    }
                }
            }
        }

        Ok(())
    }
}

/// Notifier double that records every job it is asked to deliver
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    jobs: Arc<Mutex<Vec<NotificationJob>>>,
    failing_endpoints: Arc<Mutex<HashSet<String>>>,
    delay: Option<Duration>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    /// Deliveries to this endpoint fail without being recorded
    pub fn fail_endpoint(&self, endpoint: &str) {
        self.failing_endpoints
            .lock()
            .unwrap()
            .insert(endpoint.to_string());
    }

    pub fn jobs(&self) -> Vec<NotificationJob> {
        self.jobs.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.jobs.lock().unwrap().len()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, job: &NotificationJob) -> Result<()> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if self
            .failing_endpoints
            .lock()
            .unwrap()
            .contains(&job.registration.endpoint)
        {
            return Err(EventRouterError::Delivery {
                service_name: job.registration.service_name.clone(),
                endpoint: job.registration.endpoint.clone(),
                message: "mock delivery failure".to_string(),
            });
        }

        self.jobs.lock().unwrap().push(job.clone());
        Ok(())
    }
}
