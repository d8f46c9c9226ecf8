use std::time::{Duration, Instant};

use async_trait::async_trait;
use eventrouter_core::{
    errors::{EventRouterError, Result},
    models::NotificationJob,
    traits::Notifier,
};
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, info};

/// 通过 HTTP POST 推送 JSON 通知
pub struct HttpNotifier {
    /// HTTP客户端
    client: reqwest::Client,
    /// 是否打印请求与响应详情
    verbose: bool,
}

impl HttpNotifier {
    /// `insecure` 为 true 时不校验服务端证书
    pub fn new(timeout: Duration, insecure: bool, verbose: bool) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .danger_accept_invalid_certs(insecure)
            .build()
            .map_err(|e| EventRouterError::Configuration(format!("创建HTTP客户端失败: {e}")))?;

        Ok(Self { client, verbose })
    }

    fn delivery_error(job: &NotificationJob, message: String) -> EventRouterError {
        EventRouterError::Delivery {
            service_name: job.registration.service_name.clone(),
            endpoint: job.registration.endpoint.clone(),
            message,
        }
    }
}

#[async_trait]
impl Notifier for HttpNotifier {
    async fn notify(&self, job: &NotificationJob) -> Result<()> {
        let start_time = Instant::now();
        let endpoint = &job.registration.endpoint;
        let body = job.payload.to_bytes()?;

        if self.verbose {
            debug!(
                service_name = %job.registration.service_name,
                "HTTP请求: POST {}\n{}",
                endpoint,
                String::from_utf8_lossy(&body)
            );
        }

        let response = self
            .client
            .post(endpoint)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| Self::delivery_error(job, format!("HTTP请求失败: {e}")))?;

        let status = response.status();
        if self.verbose {
            let response_body = response
                .text()
                .await
                .unwrap_or_else(|e| format!("读取响应体失败: {e}"));
            debug!(
                service_name = %job.registration.service_name,
                "HTTP响应: {} {}\n{}",
                status,
                endpoint,
                response_body
            );
        }

        if !status.is_success() {
            return Err(Self::delivery_error(
                job,
                format!("HTTP请求失败，状态码: {}", status.as_u16()),
            ));
        }

        info!(
            service_name = %job.registration.service_name,
            endpoint = %endpoint,
            deployment_id = %job.payload.deployment_id(),
            "通知已送达: status={}, duration={}ms",
            status.as_u16(),
            start_time.elapsed().as_millis()
        );
        Ok(())
    }
}
