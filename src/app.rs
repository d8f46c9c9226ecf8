use std::sync::Arc;

use anyhow::{Context, Result};
use eventrouter_core::{
    traits::{Notifier, ObjectResolver, RegistrationSource},
    AppConfig,
};
use eventrouter_dispatcher::{
    AllowListPolicy, EventHandler, EventRouter, HandlerConfig, RouterConfig,
};
use eventrouter_infrastructure::{
    CompositionResolver, FixedRegistration, KubeObjectResolver, RegistrationDirectory,
};
use eventrouter_worker::{HttpNotifier, NotificationQueue, QueueConfig};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};
use tokio::sync::broadcast;
use tracing::info;

/// 与集群连接无关的处理组件
pub struct Components {
    pub handler: Arc<EventHandler>,
    pub queue: Arc<NotificationQueue>,
    pub router: Arc<EventRouter>,
}

impl Components {
    pub fn build(
        config: &AppConfig,
        resolver: Arc<dyn ObjectResolver>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let registrations: Arc<dyn RegistrationSource> = match config.fixed_endpoint() {
            Some(endpoint) => {
                info!("单端点模式，所有通知发往 {}", endpoint);
                Arc::new(FixedRegistration::new(endpoint))
            }
            None => Arc::new(RegistrationDirectory::new(resolver.clone(), None)),
        };

        let queue = Arc::new(NotificationQueue::new(
            QueueConfig {
                capacity: config.queue_max_capacity,
                workers: config.queue_worker_threads,
                job_timeout: config.notify_timeout,
            },
            notifier,
        ));

        let admission = Arc::new(AllowListPolicy::new(
            config.admission_kinds.clone(),
            config.admission_groups.clone(),
        ));

        let composition = CompositionResolver::new(resolver.clone(), config.max_owner_depth);
        info!("所有权链最大遍历深度: {}", composition.max_depth());

        let handler = Arc::new(EventHandler::new(
            resolver,
            composition,
            registrations,
            admission,
            queue.clone(),
            HandlerConfig {
                throttle_period: config.throttle_period,
                payload_format: config.payload_format,
                event_timeout: config.event_timeout,
            },
        ));

        let router = Arc::new(EventRouter::new(
            handler.clone(),
            RouterConfig {
                namespace: config.namespace().map(str::to_string),
                resync_interval: config.resync_interval,
                sync_timeout: config.sync_timeout,
            },
        ));

        Self {
            handler,
            queue,
            router,
        }
    }
}

/// 主应用程序
pub struct Application {
    client: Client,
    components: Components,
}

impl Application {
    pub async fn new(config: &AppConfig, kubeconfig: Option<&str>) -> Result<Self> {
        let client = create_client(kubeconfig).await?;

        let resolver = Arc::new(KubeObjectResolver::new(client.clone()));
        let notifier = Arc::new(
            HttpNotifier::new(config.notify_timeout, config.insecure, config.debug)
                .context("创建通知HTTP客户端失败")?,
        );

        Ok(Self {
            client,
            components: Components::build(config, resolver, notifier),
        })
    }

    /// 运行到事件监听结束，然后排空通知队列
    pub async fn run(&self, shutdown: broadcast::Receiver<()>) -> Result<()> {
        self.components.queue.run().await;

        let result = self
            .components
            .router
            .run(self.client.clone(), shutdown)
            .await;

        info!("停止通知队列，等待剩余通知发送完成");
        self.components.queue.terminate().await;

        result.context("事件路由器退出")
    }
}

async fn create_client(kubeconfig: Option<&str>) -> Result<Client> {
    let config = match kubeconfig {
        Some(path) => {
            let kubeconfig = Kubeconfig::read_from(path)
                .with_context(|| format!("读取kubeconfig失败: {path}"))?;
            Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
                .await
                .context("解析kubeconfig失败")?
        }
        None => Config::infer().await.context("推断集群连接配置失败")?,
    };

    info!("连接集群: {}", config.cluster_url);
    Client::try_from(config).context("创建Kubernetes客户端失败")
}
