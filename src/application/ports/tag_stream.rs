//! Tag Stream Port - 服务端推送订阅抽象
//!
//! 定义长连接单向推送流的抽象接口，具体实现在 infrastructure/adapters 层

use async_trait::async_trait;
use futures_util::stream::BoxStream;
use thiserror::Error;

/// 推送流错误
#[derive(Debug, Clone, Error)]
pub enum StreamError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Connect timeout")]
    Timeout,

    #[error("Subscription rejected: {0}")]
    Rejected(String),

    #[error("Stream already consumed")]
    AlreadyConsumed,
}

/// 一条原始推送消息
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PushMessage {
    /// 事件名（SSE `event:` 字段）
    pub event: Option<String>,
    /// 消息体
    pub data: String,
    /// 服务端消息 id（SSE `id:` 字段）
    pub id: Option<String>,
}

impl PushMessage {
    pub fn new(data: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            ..Default::default()
        }
    }
}

/// 推送消息流；流结束表示服务端关闭订阅
pub type PushStream = BoxStream<'static, Result<PushMessage, StreamError>>;

/// Tag Stream Port
#[async_trait]
pub trait TagStreamPort: Send + Sync {
    /// 建立到 endpoint 的订阅
    async fn connect(&self, endpoint: &str) -> Result<PushStream, StreamError>;
}
