use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use eventrouter_core::{
    models::{
        event_identity, labels, last_observed, NotificationJob, NotificationPayload,
        ObjectReference, PayloadFormat,
    },
    traits::{AdmissionPolicy, ObjectResolver, RegistrationSource},
};
use eventrouter_infrastructure::CompositionResolver;
use eventrouter_worker::NotificationQueue;
use k8s_openapi::api::core::v1::Event;
use tracing::{debug, error, info, warn};

/// 单个事件的处理参数
#[derive(Debug, Clone)]
pub struct HandlerConfig {
    /// 0 表示不做过期判定
    pub throttle_period: Duration,
    pub payload_format: PayloadFormat,
    /// 解析、打补丁、读取注册、入队的总时限
    pub event_timeout: Duration,
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self {
            throttle_period: Duration::ZERO,
            payload_format: PayloadFormat::Rich,
            event_timeout: Duration::from_secs(60),
        }
    }
}

/// 一次投递的处理结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleOutcome {
    /// 事件已带处理标记（通常是自身补丁触发的更新）
    AlreadyProcessed,
    /// 早于节流窗口
    Stale,
    /// 准入策略拒绝
    Rejected,
    PatchFailed,
    ListingFailed,
    EnqueueFailed,
    TimedOut,
    /// 已为 n 个注册入队
    Dispatched(usize),
}

/// 事件最后观察时间早于 `now - period` 时视为过期；没有时间信息的事件不过期
pub fn is_stale(observed: Option<DateTime<Utc>>, now: DateTime<Utc>, period: Duration) -> bool {
    if period.is_zero() {
        return false;
    }
    let Some(observed) = observed else {
        return false;
    };
    let Ok(period) = chrono::Duration::from_std(period) else {
        return false;
    };

    observed < now - period
}

/// 单个事件的处理流程：标记检查 -> 节流 -> 准入 -> 解析 -> 打补丁 -> 分发
pub struct EventHandler {
    resolver: Arc<dyn ObjectResolver>,
    composition: CompositionResolver,
    registrations: Arc<dyn RegistrationSource>,
    admission: Arc<dyn AdmissionPolicy>,
    queue: Arc<NotificationQueue>,
    config: HandlerConfig,
}

impl EventHandler {
    pub fn new(
        resolver: Arc<dyn ObjectResolver>,
        composition: CompositionResolver,
        registrations: Arc<dyn RegistrationSource>,
        admission: Arc<dyn AdmissionPolicy>,
        queue: Arc<NotificationQueue>,
        config: HandlerConfig,
    ) -> Self {
        Self {
            resolver,
            composition,
            registrations,
            admission,
            queue,
            config,
        }
    }

    pub async fn handle(&self, event: &Event) -> HandleOutcome {
        let identity = event_identity(event);

        // 标记必须每次都重新检查：自身补丁会产生一次新的更新投递
        if labels::was_patched(event.metadata.labels.as_ref()) {
            debug!(event = %identity, "事件已处理，跳过");
            return HandleOutcome::AlreadyProcessed;
        }

        if is_stale(last_observed(event), Utc::now(), self.config.throttle_period) {
            debug!(
                event = %identity,
                "事件早于节流窗口 {:?}，跳过", self.config.throttle_period
            );
            return HandleOutcome::Stale;
        }

        let involved = ObjectReference::from(&event.involved_object);
        if !self.admission.accept(&involved) {
            debug!(event = %identity, involved = %involved, "准入策略拒绝，跳过");
            return HandleOutcome::Rejected;
        }

        match tokio::time::timeout(
            self.config.event_timeout,
            self.enrich_and_dispatch(event, &involved, &identity),
        )
        .await
        {
            Ok(outcome) => outcome,
            Err(_) => {
                error!(
                    event = %identity,
                    "事件处理超时 ({:?})", self.config.event_timeout
                );
                HandleOutcome::TimedOut
            }
        }
    }

    async fn enrich_and_dispatch(
        &self,
        event: &Event,
        involved: &ObjectReference,
        identity: &str,
    ) -> HandleOutcome {
        // 解析失败不阻止打标记，否则下次投递还会再处理一遍
        let composition_id = match self.composition.resolve(involved).await {
            Ok(id) => id,
            Err(e) => {
                warn!(event = %identity, involved = %involved, "解析组合ID失败: {}", e);
                None
            }
        };
        if composition_id.is_none() {
            debug!(event = %identity, involved = %involved, "未找到组合ID");
        }

        let patch = labels::marker_patch(composition_id.as_deref());
        if let Err(e) = self
            .resolver
            .patch(&ObjectReference::for_event(event), &patch)
            .await
        {
            error!(event = %identity, "为事件打标记失败: {}", e);
            return HandleOutcome::PatchFailed;
        }

        let registrations = match self.registrations.registrations().await {
            Ok(registrations) => registrations,
            Err(e) => {
                error!(event = %identity, "读取注册列表失败: {}", e);
                return HandleOutcome::ListingFailed;
            }
        };

        let payload = NotificationPayload::encode(
            self.config.payload_format,
            composition_id.as_deref(),
            event,
            Utc::now(),
        );

        let total = registrations.len();
        let mut dispatched = 0;
        for (name, registration) in registrations {
            let job = NotificationJob::new(registration, payload.clone());
            if let Err(e) = self.queue.push(job).await {
                error!(
                    event = %identity,
                    registration = %name,
                    "通知入队失败，放弃剩余 {} 个: {}", total - dispatched, e
                );
                return HandleOutcome::EnqueueFailed;
            }
            dispatched += 1;
        }

        info!(
            event = %identity,
            composition_id = composition_id.as_deref().unwrap_or_default(),
            "事件已处理，分发给 {} 个注册", dispatched
        );
        HandleOutcome::Dispatched(dispatched)
    }
}
