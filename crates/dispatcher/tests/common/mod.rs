#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use eventrouter_core::models::{ObjectReference, KEY_COMPOSITION_ID};
use eventrouter_core::AppConfig;
use eventrouter_dispatcher::{AllowListPolicy, EventHandler, HandlerConfig};
use eventrouter_infrastructure::{CompositionResolver, RegistrationDirectory};
use eventrouter_testing_utils::{
    registration_object, EventBuilder, MockObjectResolver, ObjectBuilder, RecordingNotifier,
};
use eventrouter_worker::{NotificationQueue, QueueConfig};
use k8s_openapi::api::core::v1::Event;
use kube::api::DynamicObject;

pub struct Fixture {
    pub resolver: Arc<MockObjectResolver>,
    pub notifier: RecordingNotifier,
    pub queue: Arc<NotificationQueue>,
    pub handler: Arc<EventHandler>,
}

/// Deployment demo/web（带组合ID abc123）和它控制的 Pod demo/web-1
pub fn workload_objects() -> Vec<DynamicObject> {
    let deployment = ObjectBuilder::new("apps/v1", "Deployment", "web")
        .with_namespace("demo")
        .with_label(KEY_COMPOSITION_ID, "abc123");
    let pod = ObjectBuilder::new("v1", "Pod", "web-1")
        .with_namespace("demo")
        .owned_by(&deployment.reference(), true);

    vec![deployment.build(), pod.build()]
}

/// 集群中有 workload_objects 以及三个完整的 Registration
pub async fn fixture(config: HandlerConfig) -> Fixture {
    let mut objects = workload_objects();
    objects.extend([
        registration_object("reg-a", "svc-a", "http://a.local/hook"),
        registration_object("reg-b", "svc-b", "http://b.local/hook"),
        registration_object("reg-c", "svc-c", "http://c.local/hook"),
    ]);

    fixture_with(Arc::new(MockObjectResolver::with_objects(objects)), config).await
}

pub async fn fixture_with(resolver: Arc<MockObjectResolver>, config: HandlerConfig) -> Fixture {
    fixture_with_queue(
        resolver,
        config,
        QueueConfig {
            capacity: 16,
            workers: 4,
            job_timeout: Duration::from_secs(5),
        },
        RecordingNotifier::new(),
    )
    .await
}

pub async fn fixture_with_queue(
    resolver: Arc<MockObjectResolver>,
    config: HandlerConfig,
    queue_config: QueueConfig,
    notifier: RecordingNotifier,
) -> Fixture {
    let queue = Arc::new(NotificationQueue::new(
        queue_config,
        Arc::new(notifier.clone()),
    ));
    queue.run().await;

    let defaults = AppConfig::default();
    let handler = Arc::new(EventHandler::new(
        resolver.clone(),
        CompositionResolver::new(resolver.clone(), defaults.max_owner_depth),
        Arc::new(RegistrationDirectory::new(resolver.clone(), None)),
        Arc::new(AllowListPolicy::new(
            defaults.admission_kinds,
            defaults.admission_groups,
        )),
        queue.clone(),
        config,
    ));

    Fixture {
        resolver,
        notifier,
        queue,
        handler,
    }
}

pub fn pod_reference() -> ObjectReference {
    ObjectReference::new("v1", "Pod", "web-1")
        .with_namespace("demo")
        .with_uid("pod-web-1-uid")
}

/// 关于 demo/web-1 的一条未处理事件
pub fn pod_event(name: &str) -> EventBuilder {
    EventBuilder::new(name)
        .with_namespace("demo")
        .with_reason("Pulled")
        .with_message("Successfully pulled image")
        .involving(&pod_reference())
}

pub fn unprocessed_event() -> Event {
    pod_event("web-1.17a8c").build()
}
