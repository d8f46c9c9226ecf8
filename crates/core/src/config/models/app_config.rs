use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use super::logging::LogFormat;
use crate::models::PayloadFormat;

/// 环境变量前缀，例如 EVENT_ROUTER_RESYNC_INTERVAL
pub const ENV_PREFIX: &str = "EVENT_ROUTER";

/// 进程级配置，启动时构建一次后传给各组件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// 输出调试日志并转储通知请求
    pub debug: bool,
    /// 通知端点允许无效TLS证书
    pub insecure: bool,
    /// 周期性重新投递缓存中的事件，0表示禁用
    #[serde(with = "humantime_serde")]
    pub resync_interval: Duration,
    /// 早于 now - throttle_period 的事件被丢弃，0表示禁用
    #[serde(with = "humantime_serde")]
    pub throttle_period: Duration,
    /// 监听的命名空间，空字符串表示全部
    pub namespace: String,
    /// 通知队列缓冲区大小
    pub queue_max_capacity: usize,
    /// 通知队列工作协程数
    pub queue_worker_threads: usize,
    /// 单端点模式，非空时替代 Registration 目录
    pub fixed_endpoint: String,
    pub payload_format: PayloadFormat,
    /// 初始缓存同步窗口
    #[serde(with = "humantime_serde")]
    pub sync_timeout: Duration,
    /// 单个事件的处理时限
    #[serde(with = "humantime_serde")]
    pub event_timeout: Duration,
    /// 单次通知请求超时
    #[serde(with = "humantime_serde")]
    pub notify_timeout: Duration,
    /// 所有权链最大遍历深度
    pub max_owner_depth: usize,
    pub admission_kinds: Vec<String>,
    pub admission_groups: Vec<String>,
    pub log_format: LogFormat,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            debug: false,
            insecure: false,
            resync_interval: Duration::from_secs(180),
            throttle_period: Duration::ZERO,
            namespace: String::new(),
            queue_max_capacity: 10,
            queue_worker_threads: 50,
            fixed_endpoint: String::new(),
            payload_format: PayloadFormat::Rich,
            sync_timeout: Duration::from_secs(60),
            event_timeout: Duration::from_secs(60),
            notify_timeout: Duration::from_secs(40),
            max_owner_depth: 10,
            admission_kinds: [
                "Pod",
                "Deployment",
                "ReplicaSet",
                "StatefulSet",
                "DaemonSet",
                "Job",
                "CronJob",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            admission_groups: vec!["*.krateo.io".to_string(), "*.crossplane.io".to_string()],
            log_format: LogFormat::Json,
        }
    }
}

impl AppConfig {
    /// 加载配置：默认值 -> TOML文件 -> EVENT_ROUTER_* 环境变量
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        Self::load_with_env_prefix(config_path, ENV_PREFIX)
    }

    pub fn load_with_env_prefix(config_path: Option<&str>, env_prefix: &str) -> Result<Self> {
        let mut builder = ConfigBuilder::builder();

        if let Some(path) = config_path {
            if !Path::new(path).exists() {
                return Err(anyhow::anyhow!("配置文件不存在: {}", path));
            }
            builder = builder.add_source(File::new(path, FileFormat::Toml));
        }

        builder = builder.add_source(
            Environment::with_prefix(env_prefix)
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("admission_kinds")
                .with_list_parse_key("admission_groups"),
        );

        let config: AppConfig = builder
            .build()
            .context("构建配置失败")?
            .try_deserialize()
            .context("反序列化配置失败")?;

        config.validate()?;

        Ok(config)
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(toml_str).context("解析TOML配置失败")?;

        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("序列化配置为TOML失败")
    }

    pub fn namespace(&self) -> Option<&str> {
        Some(self.namespace.as_str()).filter(|ns| !ns.is_empty())
    }

    pub fn fixed_endpoint(&self) -> Option<&str> {
        Some(self.fixed_endpoint.as_str()).filter(|url| !url.is_empty())
    }

    pub fn validate(&self) -> Result<()> {
        if self.queue_max_capacity == 0 {
            return Err(anyhow::anyhow!("通知队列容量必须大于0"));
        }

        if self.queue_worker_threads == 0 {
            return Err(anyhow::anyhow!("通知队列工作协程数必须大于0"));
        }

        if self.max_owner_depth == 0 {
            return Err(anyhow::anyhow!("所有权链遍历深度必须大于0"));
        }

        if self.sync_timeout.is_zero() {
            return Err(anyhow::anyhow!("缓存同步超时必须大于0"));
        }

        if self.notify_timeout.is_zero() {
            return Err(anyhow::anyhow!("通知请求超时必须大于0"));
        }

        if self.event_timeout.is_zero() {
            return Err(anyhow::anyhow!("事件处理超时必须大于0"));
        }

        if let Some(endpoint) = self.fixed_endpoint() {
            let url = url::Url::parse(endpoint)
                .with_context(|| format!("无效的固定端点URL: {endpoint}"))?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(anyhow::anyhow!(
                    "固定端点只支持http/https: {}",
                    endpoint
                ));
            }
        }

        Ok(())
    }
}
