mod common;

use std::time::Duration;

use common::{job, spawn_black_hole, spawn_receiver};
use eventrouter_core::{errors::EventRouterError, traits::Notifier};
use eventrouter_worker::HttpNotifier;

#[tokio::test]
async fn test_notify_posts_json_payload() {
    let (base, mut rx) = spawn_receiver().await;
    let notifier = HttpNotifier::new(Duration::from_secs(5), false, true).unwrap();

    notifier
        .notify(&job("svc-a", &format!("{base}/hook")))
        .await
        .unwrap();

    let (content_type, body) = tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(content_type.as_deref(), Some("application/json"));
    assert_eq!(body["deploymentId"], "abc123");
    assert_eq!(body["reason"], "BackOff");
    assert_eq!(body["type"], "Normal");
}

#[tokio::test]
async fn test_notify_non_success_status_is_error() {
    let (base, _rx) = spawn_receiver().await;
    let notifier = HttpNotifier::new(Duration::from_secs(5), false, false).unwrap();

    let err = notifier
        .notify(&job("svc-fail", &format!("{base}/fail")))
        .await
        .unwrap_err();

    match err {
        EventRouterError::Delivery {
            service_name,
            message,
            ..
        } => {
            assert_eq!(service_name, "svc-fail");
            assert!(message.contains("500"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_notify_times_out_on_silent_endpoint() {
    let endpoint = spawn_black_hole().await;
    let notifier = HttpNotifier::new(Duration::from_millis(200), false, false).unwrap();

    let result = tokio::time::timeout(Duration::from_secs(5), notifier.notify(&job("svc", &endpoint)))
        .await
        .expect("client timeout should fire first");
    assert!(matches!(result, Err(EventRouterError::Delivery { .. })));
}

#[tokio::test]
async fn test_notify_unreachable_endpoint_is_error() {
    // 先占用端口再释放，保证连接被拒绝
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let notifier = HttpNotifier::new(Duration::from_secs(2), false, false).unwrap();
    let result = notifier.notify(&job("svc", &format!("http://{addr}/hook"))).await;
    assert!(result.is_err());
}
