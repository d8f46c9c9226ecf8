mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{job, spawn_black_hole, spawn_receiver};
use eventrouter_core::errors::EventRouterError;
use eventrouter_testing_utils::RecordingNotifier;
use eventrouter_worker::{HttpNotifier, NotificationQueue, QueueConfig};

fn config(capacity: usize, workers: usize) -> QueueConfig {
    QueueConfig {
        capacity,
        workers,
        job_timeout: Duration::from_secs(5),
    }
}

#[tokio::test]
async fn test_terminate_drains_buffered_jobs() {
    let notifier = RecordingNotifier::new();
    let queue = NotificationQueue::new(config(5, 3), Arc::new(notifier.clone()));
    queue.run().await;

    for i in 0..20 {
        queue
            .push(job(&format!("svc-{i}"), "http://sink.local/hook"))
            .await
            .unwrap();
    }
    queue.terminate().await;

    assert_eq!(notifier.count(), 20);
    let stats = queue.stats();
    assert_eq!(stats.enqueued, 20);
    assert_eq!(stats.delivered, 20);
    assert_eq!(stats.failed, 0);
}

#[tokio::test]
async fn test_push_after_terminate_is_rejected() {
    let queue = NotificationQueue::new(config(2, 1), Arc::new(RecordingNotifier::new()));
    queue.run().await;
    queue.terminate().await;

    assert!(queue.is_closed().await);
    let err = queue
        .push(job("svc", "http://sink.local/hook"))
        .await
        .unwrap_err();
    assert!(matches!(err, EventRouterError::QueueClosed));
}

#[tokio::test]
async fn test_push_blocks_when_buffer_full() {
    let notifier = RecordingNotifier::with_delay(Duration::from_secs(30));
    let queue = NotificationQueue::new(config(2, 1), Arc::new(notifier));
    queue.run().await;

    // 一个在投递中，两个在缓冲区
    for i in 0..3 {
        tokio::time::timeout(
            Duration::from_secs(2),
            queue.push(job(&format!("svc-{i}"), "http://sink.local/hook")),
        )
        .await
        .expect("push should not block while there is room")
        .unwrap();
    }

    let blocked = tokio::time::timeout(
        Duration::from_millis(200),
        queue.push(job("svc-overflow", "http://sink.local/hook")),
    )
    .await;
    assert!(blocked.is_err(), "push should wait for a free slot");
}

#[tokio::test]
async fn test_failed_delivery_does_not_affect_others() {
    let notifier = RecordingNotifier::new();
    notifier.fail_endpoint("http://bad.local/hook");
    let queue = NotificationQueue::new(config(10, 2), Arc::new(notifier.clone()));
    queue.run().await;

    queue.push(job("bad", "http://bad.local/hook")).await.unwrap();
    queue.push(job("good-1", "http://good.local/a")).await.unwrap();
    queue.push(job("good-2", "http://good.local/b")).await.unwrap();
    queue.terminate().await;

    let delivered: Vec<String> = notifier
        .jobs()
        .into_iter()
        .map(|j| j.registration.service_name)
        .collect();
    assert_eq!(delivered.len(), 2);
    assert!(delivered.contains(&"good-1".to_string()));
    assert!(delivered.contains(&"good-2".to_string()));
    assert_eq!(queue.stats().failed, 1);
}

#[tokio::test]
async fn test_job_timeout_counts_as_failure() {
    let notifier = RecordingNotifier::with_delay(Duration::from_secs(10));
    let queue = NotificationQueue::new(
        QueueConfig {
            capacity: 1,
            workers: 1,
            job_timeout: Duration::from_millis(50),
        },
        Arc::new(notifier.clone()),
    );
    queue.run().await;

    queue.push(job("slow", "http://slow.local/hook")).await.unwrap();
    queue.terminate().await;

    assert_eq!(notifier.count(), 0);
    assert_eq!(queue.stats().failed, 1);
}

#[tokio::test]
async fn test_hanging_endpoint_does_not_block_other_targets() {
    let black_hole = spawn_black_hole().await;
    let (base, mut rx) = spawn_receiver().await;

    let notifier = HttpNotifier::new(Duration::from_secs(30), false, false).unwrap();
    let queue = NotificationQueue::new(
        QueueConfig {
            capacity: 10,
            workers: 2,
            job_timeout: Duration::from_secs(30),
        },
        Arc::new(notifier),
    );
    queue.run().await;

    queue.push(job("stuck", &black_hole)).await.unwrap();
    queue
        .push(job("healthy", &format!("{base}/hook")))
        .await
        .unwrap();

    let (_, body) = tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("healthy target should be notified while the other hangs")
        .unwrap();
    assert_eq!(body["deploymentId"], "abc123");
}

#[tokio::test]
async fn test_run_twice_keeps_worker_count() {
    let notifier = RecordingNotifier::new();
    let queue = NotificationQueue::new(config(4, 2), Arc::new(notifier.clone()));
    queue.run().await;
    queue.run().await;

    queue.push(job("svc", "http://sink.local/hook")).await.unwrap();
    queue.terminate().await;
    assert_eq!(notifier.count(), 1);
}
