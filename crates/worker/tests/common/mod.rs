#![allow(dead_code)]

use axum::{
    extract::State,
    http::{header::CONTENT_TYPE, HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use chrono::Utc;
use eventrouter_core::models::{NotificationJob, NotificationPayload, PayloadFormat, Registration};
use eventrouter_testing_utils::EventBuilder;
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

pub type Received = (Option<String>, Value);

pub fn job(service_name: &str, endpoint: &str) -> NotificationJob {
    let event = EventBuilder::new("p1.17a")
        .with_reason("BackOff")
        .with_message("Back-off restarting failed container")
        .build();
    NotificationJob::new(
        Registration::new(service_name, endpoint),
        NotificationPayload::encode(PayloadFormat::Rich, Some("abc123"), &event, Utc::now()),
    )
}

async fn receive(
    State(tx): State<mpsc::UnboundedSender<Received>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> StatusCode {
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let _ = tx.send((content_type, body));
    StatusCode::OK
}

/// 本地通知接收端：/hook 返回 200，/fail 返回 500
pub async fn spawn_receiver() -> (String, mpsc::UnboundedReceiver<Received>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let app = Router::new()
        .route("/hook", post(receive))
        .route("/fail", post(|| async { StatusCode::INTERNAL_SERVER_ERROR }))
        .with_state(tx);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}"), rx)
}

/// 接受连接但从不响应的端点
pub async fn spawn_black_hole() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    format!("http://{addr}/hook")
}
