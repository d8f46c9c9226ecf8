use std::time::Duration;

use thiserror::Error;

/// 事件路由器错误类型定义
#[derive(Debug, Error)]
pub enum EventRouterError {
    #[error("Kubernetes API错误: {0}")]
    Kube(#[from] kube::Error),

    #[error("序列化错误: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("无效的资源引用: {0}")]
    InvalidReference(String),

    #[error("无效的注册信息 {name}: {message}")]
    InvalidRegistration { name: String, message: String },

    #[error("配置错误: {0}")]
    Configuration(String),

    #[error("等待缓存同步超时: {0:?}")]
    CacheSyncTimeout(Duration),

    #[error("事件监听流意外结束")]
    WatchStreamEnded,

    #[error("通知队列已关闭")]
    QueueClosed,

    #[error("通知发送失败 (serviceName:{service_name}, endpoint:{endpoint}): {message}")]
    Delivery {
        service_name: String,
        endpoint: String,
        message: String,
    },

    #[error("内部错误: {0}")]
    Internal(String),
}

impl EventRouterError {
    /// 404类错误，所有权链遍历时按"不存在"处理
    pub fn is_not_found(&self) -> bool {
        match self {
            EventRouterError::Kube(kube::Error::Api(response)) => response.code == 404,
            _ => false,
        }
    }
}

/// 统一的Result类型
pub type Result<T> = std::result::Result<T, EventRouterError>;
