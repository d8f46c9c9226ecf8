use std::sync::Arc;

use eventrouter_core::models::{ObjectReference, KEY_COMPOSITION_ID};
use eventrouter_infrastructure::CompositionResolver;
use eventrouter_testing_utils::{MockObjectResolver, ObjectBuilder};

fn pod(name: &str) -> ObjectBuilder {
    ObjectBuilder::new("v1", "Pod", name).with_namespace("demo")
}

fn resolver_with(objects: Vec<kube::api::DynamicObject>) -> (Arc<MockObjectResolver>, CompositionResolver) {
    let mock = Arc::new(MockObjectResolver::with_objects(objects));
    let composition = CompositionResolver::new(mock.clone(), 10);
    (mock, composition)
}

#[tokio::test]
async fn test_resolve_follows_controller_chain() {
    let deployment = ObjectBuilder::new("apps/v1", "Deployment", "web")
        .with_namespace("demo")
        .with_label(KEY_COMPOSITION_ID, "abc123");
    let replica_set = ObjectBuilder::new("apps/v1", "ReplicaSet", "web-7d9")
        .with_namespace("demo")
        .owned_by(&deployment.reference(), true);
    let pod = pod("web-7d9-x1").owned_by(&replica_set.reference(), true);
    let start = pod.reference();

    let (mock, composition) =
        resolver_with(vec![deployment.build(), replica_set.build(), pod.build()]);

    let id = composition.resolve(&start).await.unwrap();
    assert_eq!(id.as_deref(), Some("abc123"));
    assert_eq!(mock.get_calls(), 3);
}

#[tokio::test]
async fn test_resolve_label_on_involved_object() {
    let pod = pod("p1").with_label(KEY_COMPOSITION_ID, "direct");
    let start = pod.reference();
    let (mock, composition) = resolver_with(vec![pod.build()]);

    let id = composition.resolve(&start).await.unwrap();
    assert_eq!(id.as_deref(), Some("direct"));
    assert_eq!(mock.get_calls(), 1);
}

#[tokio::test]
async fn test_resolve_ignores_non_controller_owner() {
    let deployment = ObjectBuilder::new("apps/v1", "Deployment", "web")
        .with_namespace("demo")
        .with_label(KEY_COMPOSITION_ID, "abc123");
    let pod = pod("p1").owned_by(&deployment.reference(), false);
    let start = pod.reference();
    let (_, composition) = resolver_with(vec![deployment.build(), pod.build()]);

    assert_eq!(composition.resolve(&start).await.unwrap(), None);
}

#[tokio::test]
async fn test_resolve_missing_owner_is_none() {
    let ghost = ObjectReference::new("apps/v1", "ReplicaSet", "gone").with_namespace("demo");
    let pod = pod("p1").owned_by(&ghost, true);
    let start = pod.reference();
    let (_, composition) = resolver_with(vec![pod.build()]);

    assert_eq!(composition.resolve(&start).await.unwrap(), None);
}

#[tokio::test]
async fn test_resolve_missing_involved_object_is_none() {
    let (mock, composition) = resolver_with(vec![]);
    let start = ObjectReference::new("v1", "Pod", "nowhere").with_namespace("demo");

    assert_eq!(composition.resolve(&start).await.unwrap(), None);
    assert_eq!(mock.get_calls(), 1);
}

#[tokio::test]
async fn test_resolve_terminates_on_cycle() {
    let a_ref = ObjectReference::new("example.io/v1", "Widget", "a").with_namespace("demo");
    let b_ref = ObjectReference::new("example.io/v1", "Widget", "b").with_namespace("demo");
    let c_ref = ObjectReference::new("example.io/v1", "Widget", "c").with_namespace("demo");

    let a = ObjectBuilder::new("example.io/v1", "Widget", "a")
        .with_namespace("demo")
        .owned_by(&b_ref, true)
        .build();
    let b = ObjectBuilder::new("example.io/v1", "Widget", "b")
        .with_namespace("demo")
        .owned_by(&c_ref, true)
        .build();
    let c = ObjectBuilder::new("example.io/v1", "Widget", "c")
        .with_namespace("demo")
        .owned_by(&a_ref, true)
        .build();

    let (mock, composition) = resolver_with(vec![a, b, c]);

    assert_eq!(composition.resolve(&a_ref).await.unwrap(), None);
    // 每个环上的节点只读取一次
    assert_eq!(mock.get_calls(), 3);
}

#[tokio::test]
async fn test_resolve_self_owned_object() {
    let self_ref = ObjectReference::new("example.io/v1", "Widget", "loop").with_namespace("demo");
    let object = ObjectBuilder::new("example.io/v1", "Widget", "loop")
        .with_namespace("demo")
        .owned_by(&self_ref, true)
        .build();
    let (mock, composition) = resolver_with(vec![object]);

    assert_eq!(composition.resolve(&self_ref).await.unwrap(), None);
    assert_eq!(mock.get_calls(), 1);
}

#[tokio::test]
async fn test_resolve_stops_at_depth_budget() {
    // w0 -> w1 -> ... -> w5，只有 w5 带组合ID
    let mut objects = Vec::new();
    for i in 0..6 {
        let mut builder =
            ObjectBuilder::new("example.io/v1", "Widget", &format!("w{i}")).with_namespace("demo");
        if i < 5 {
            let next = ObjectReference::new("example.io/v1", "Widget", &format!("w{}", i + 1))
                .with_namespace("demo");
            builder = builder.owned_by(&next, true);
        } else {
            builder = builder.with_label(KEY_COMPOSITION_ID, "deep");
        }
        objects.push(builder.build());
    }
    let start = ObjectReference::new("example.io/v1", "Widget", "w0").with_namespace("demo");

    let mock = Arc::new(MockObjectResolver::with_objects(objects));
    let shallow = CompositionResolver::new(mock.clone(), 3);
    assert_eq!(shallow.resolve(&start).await.unwrap(), None);
    assert_eq!(mock.get_calls(), 3);

    let deep = CompositionResolver::new(mock.clone(), 6);
    assert_eq!(deep.resolve(&start).await.unwrap().as_deref(), Some("deep"));
}

#[tokio::test]
async fn test_resolve_propagates_api_errors() {
    let pod = pod("p1");
    let start = pod.reference();
    let (mock, composition) = resolver_with(vec![pod.build()]);
    mock.set_fail_get(true);

    assert!(composition.resolve(&start).await.is_err());
}

#[test]
fn test_zero_depth_is_clamped() {
    let composition = CompositionResolver::new(Arc::new(MockObjectResolver::new()), 0);
    assert_eq!(composition.max_depth(), 1);
}
