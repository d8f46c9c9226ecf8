use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use eventrouter_core::errors::{EventRouterError, Result};
use eventrouter_core::models::event_identity;
use futures::{Stream, StreamExt};
use k8s_openapi::api::core::v1::Event;
use kube::runtime::reflector::{self, Store};
use kube::runtime::{watcher, WatchStreamExt};
use kube::{Api, Client};
use tokio::sync::{broadcast, RwLock};
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::handler::EventHandler;

/// 路由器运行状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouterState {
    Idle,
    Syncing,
    Watching,
    Stopped,
}

impl fmt::Display for RouterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouterState::Idle => write!(f, "idle"),
            RouterState::Syncing => write!(f, "syncing"),
            RouterState::Watching => write!(f, "watching"),
            RouterState::Stopped => write!(f, "stopped"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// None 表示全部命名空间
    pub namespace: Option<String>,
    /// 0 表示不做周期性重放
    pub resync_interval: Duration,
    pub sync_timeout: Duration,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            namespace: None,
            resync_interval: Duration::from_secs(180),
            sync_timeout: Duration::from_secs(60),
        }
    }
}

/// 事件监听主循环
pub struct EventRouter {
    handler: Arc<EventHandler>,
    config: RouterConfig,
    state: Arc<RwLock<RouterState>>,
}

impl EventRouter {
    pub fn new(handler: Arc<EventHandler>, config: RouterConfig) -> Self {
        Self {
            handler,
            config,
            state: Arc::new(RwLock::new(RouterState::Idle)),
        }
    }

    pub async fn state(&self) -> RouterState {
        *self.state.read().await
    }

    async fn set_state(&self, state: RouterState) {
        let mut current = self.state.write().await;
        if *current != state {
            debug!("路由器状态: {} -> {}", *current, state);
            *current = state;
        }
    }

    /// 监听集群事件直到收到关闭信号；初始同步超时返回错误
    pub async fn run(&self, client: Client, shutdown: broadcast::Receiver<()>) -> Result<()> {
        let api: Api<Event> = match &self.config.namespace {
            Some(ns) => Api::namespaced(client, ns),
            None => Api::all(client),
        };

        info!(
            "开始监听事件: namespace={}, resync={:?}",
            self.config.namespace.as_deref().unwrap_or("<all>"),
            self.config.resync_interval
        );

        let (store, writer) = reflector::store();
        let stream = reflector::reflector(
            writer,
            watcher::watcher(api, watcher::Config::default()).default_backoff(),
        );

        self.run_stream(stream, store, shutdown).await
    }

    /// 驱动已经接入 reflector 的监听流
    pub async fn run_stream<S>(
        &self,
        stream: S,
        store: Store<Event>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<()>
    where
        S: Stream<Item = std::result::Result<watcher::Event<Event>, watcher::Error>> + Send,
    {
        self.set_state(RouterState::Syncing).await;

        let mut stream = std::pin::pin!(stream);
        let sync_deadline = tokio::time::sleep(self.config.sync_timeout);
        tokio::pin!(sync_deadline);
        let mut synced = false;

        let resync_enabled = !self.config.resync_interval.is_zero();
        let mut resync =
            tokio::time::interval(self.config.resync_interval.max(Duration::from_millis(1)));
        resync.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let result = loop {
            tokio::select! {
                _ = shutdown.recv() => {
                    info!("收到关闭信号，停止事件监听");
                    break Ok(());
                }
                _ = &mut sync_deadline, if !synced => {
                    error!("等待事件缓存同步超时 ({:?})", self.config.sync_timeout);
                    break Err(EventRouterError::CacheSyncTimeout(self.config.sync_timeout));
                }
                _ = resync.tick(), if synced && resync_enabled => {
                    self.resync(&store).await;
                }
                item = stream.next() => match item {
                    Some(Ok(watcher::Event::InitDone)) => {
                        let delivery = if synced { "relist" } else { "added" };
                        if !synced {
                            synced = true;
                            resync.reset();
                            self.set_state(RouterState::Watching).await;
                            info!("事件缓存已同步，共 {} 个事件", store.state().len());
                        }
                        // 同步期限只约束列举本身，缓存中的事件在同步完成后再处理
                        self.replay(delivery, &store).await;
                    }
                    Some(Ok(watcher::Event::Init)) => {
                        debug!("开始事件全量列举");
                    }
                    Some(Ok(watcher::Event::InitApply(event))) => {
                        debug!(event = %event_identity(&event), "列举到事件，等待同步完成");
                    }
                    Some(Ok(watcher::Event::Apply(event))) => {
                        self.dispatch("updated", &event).await;
                    }
                    Some(Ok(watcher::Event::Delete(event))) => {
                        debug!(event = %event_identity(&event), "事件已删除");
                    }
                    Some(Err(e)) => {
                        warn!("事件监听出错，将自动重试: {}", e);
                    }
                    None => {
                        error!("事件监听流意外结束");
                        break Err(EventRouterError::WatchStreamEnded);
                    }
                },
            }
        };

        self.set_state(RouterState::Stopped).await;
        result
    }

    /// 周期性重放：把缓存中的全部事件作为更新重新投递
    async fn resync(&self, store: &Store<Event>) {
        self.replay("resync", store).await;
    }

    async fn replay(&self, delivery: &str, store: &Store<Event>) {
        let events = store.state();
        debug!("投递 {} 个缓存事件 ({})", events.len(), delivery);

        for event in events {
            self.dispatch(delivery, &event).await;
        }
    }

    async fn dispatch(&self, delivery: &str, event: &Event) {
        let outcome = self.handler.handle(event).await;
        debug!(
            event = %event_identity(event),
            delivery,
            outcome = ?outcome,
            "事件投递处理完成"
        );
    }
}
