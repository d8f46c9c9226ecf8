use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use eventrouter_core::{
    errors::{EventRouterError, Result},
    models::NotificationJob,
    traits::Notifier,
};
use tokio::sync::{mpsc, Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// 通知队列配置
#[derive(Debug, Clone)]
pub struct QueueConfig {
    /// 缓冲区容量，满时 push 阻塞
    pub capacity: usize,
    /// 固定的工作协程数量
    pub workers: usize,
    /// 单次投递的最长时间
    pub job_timeout: Duration,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            capacity: 10,
            workers: 50,
            job_timeout: Duration::from_secs(60),
        }
    }
}

/// 队列统计信息
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueStats {
    pub enqueued: u64,
    pub delivered: u64,
    pub failed: u64,
}

#[derive(Debug, Default)]
struct QueueCounters {
    enqueued: AtomicU64,
    delivered: AtomicU64,
    failed: AtomicU64,
}

/// 有界通知队列
///
/// 固定数量的工作协程共享同一个接收端。单个慢端点只占用一个工作协程，
/// 不会阻塞其他投递；缓冲区满时生产者在 push 上等待。
pub struct NotificationQueue {
    config: QueueConfig,
    notifier: Arc<dyn Notifier>,
    sender: RwLock<Option<mpsc::Sender<NotificationJob>>>,
    receiver: Arc<Mutex<mpsc::Receiver<NotificationJob>>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    counters: Arc<QueueCounters>,
}

impl NotificationQueue {
    pub fn new(config: QueueConfig, notifier: Arc<dyn Notifier>) -> Self {
        let config = QueueConfig {
            capacity: config.capacity.max(1),
            workers: config.workers.max(1),
            ..config
        };
        let (sender, receiver) = mpsc::channel(config.capacity);

        Self {
            config,
            notifier,
            sender: RwLock::new(Some(sender)),
            receiver: Arc::new(Mutex::new(receiver)),
            workers: Mutex::new(Vec::new()),
            counters: Arc::new(QueueCounters::default()),
        }
    }

    pub fn config(&self) -> &QueueConfig {
        &self.config
    }

    /// 启动工作协程，重复调用无效
    pub async fn run(&self) {
        let mut workers = self.workers.lock().await;
        if !workers.is_empty() {
            warn!("通知队列已在运行，忽略重复启动");
            return;
        }

        for worker_id in 0..self.config.workers {
            let receiver = Arc::clone(&self.receiver);
            let notifier = Arc::clone(&self.notifier);
            let counters = Arc::clone(&self.counters);
            let job_timeout = self.config.job_timeout;

            workers.push(tokio::spawn(async move {
                worker_loop(worker_id, receiver, notifier, counters, job_timeout).await;
            }));
        }

        info!(
            "通知队列已启动: capacity={}, workers={}",
            self.config.capacity, self.config.workers
        );
    }

    /// 入队一个投递工作，缓冲区满时等待空位
    pub async fn push(&self, job: NotificationJob) -> Result<()> {
        let sender = self
            .sender
            .read()
            .await
            .clone()
            .ok_or(EventRouterError::QueueClosed)?;

        sender
            .send(job)
            .await
            .map_err(|_| EventRouterError::QueueClosed)?;

        self.counters.enqueued.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// 停止接收新工作，等待缓冲区中已有的工作全部投递完成
    pub async fn terminate(&self) {
        if self.sender.write().await.take().is_none() {
            debug!("通知队列已关闭");
        }

        let handles: Vec<JoinHandle<()>> = self.workers.lock().await.drain(..).collect();
        let count = handles.len();
        for handle in handles {
            if let Err(e) = handle.await {
                error!("通知工作协程异常退出: {}", e);
            }
        }

        let stats = self.stats();
        info!(
            "通知队列已停止: workers={}, enqueued={}, delivered={}, failed={}",
            count, stats.enqueued, stats.delivered, stats.failed
        );
    }

    pub async fn is_closed(&self) -> bool {
        self.sender.read().await.is_none()
    }

    pub fn stats(&self) -> QueueStats {
        QueueStats {
            enqueued: self.counters.enqueued.load(Ordering::Relaxed),
            delivered: self.counters.delivered.load(Ordering::Relaxed),
            failed: self.counters.failed.load(Ordering::Relaxed),
        }
    }
}

async fn worker_loop(
    worker_id: usize,
    receiver: Arc<Mutex<mpsc::Receiver<NotificationJob>>>,
    notifier: Arc<dyn Notifier>,
    counters: Arc<QueueCounters>,
    job_timeout: Duration,
) {
    loop {
        // 只在取工作时持有锁，投递期间其他协程可以继续取
        let job = {
            let mut receiver = receiver.lock().await;
            receiver.recv().await
        };
        let Some(job) = job else {
            break;
        };

        let service_name = &job.registration.service_name;
        let endpoint = &job.registration.endpoint;

        match tokio::time::timeout(job_timeout, notifier.notify(&job)).await {
            Ok(Ok(())) => {
                counters.delivered.fetch_add(1, Ordering::Relaxed);
                debug!(
                    worker_id,
                    service_name = %service_name,
                    endpoint = %endpoint,
                    deployment_id = %job.payload.deployment_id(),
                    "通知发送成功"
                );
            }
            Ok(Err(e)) => {
                counters.failed.fetch_add(1, Ordering::Relaxed);
                error!(
                    worker_id,
                    service_name = %service_name,
                    endpoint = %endpoint,
                    "通知发送失败: {}", e
                );
            }
            Err(_) => {
                counters.failed.fetch_add(1, Ordering::Relaxed);
                error!(
                    worker_id,
                    service_name = %service_name,
                    endpoint = %endpoint,
                    "通知发送超时 ({:?})", job_timeout
                );
            }
        }
    }

    debug!(worker_id, "通知工作协程退出");
}
