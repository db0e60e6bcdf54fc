//! Channel Tag Stream - 进程内推送流
//!
//! 通过 mpsc 发送端手动投递消息，用于测试与本地演示

use async_trait::async_trait;
use futures_util::StreamExt;
use parking_lot::Mutex;
use tokio::sync::mpsc;

use crate::application::ports::{PushMessage, PushStream, StreamError, TagStreamPort};

type Item = Result<PushMessage, StreamError>;

/// 进程内推送流，只能被订阅一次
pub struct ChannelTagStream {
    receiver: Mutex<Option<mpsc::UnboundedReceiver<Item>>>,
}

/// 推送端
#[derive(Clone)]
pub struct PushSender {
    tx: mpsc::UnboundedSender<Item>,
}

impl ChannelTagStream {
    pub fn new() -> (Self, PushSender) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                receiver: Mutex::new(Some(rx)),
            },
            PushSender { tx },
        )
    }
}

impl PushSender {
    /// 投递一条消息，订阅已释放时返回 false
    pub fn send_data(&self, data: impl Into<String>) -> bool {
        self.tx.send(Ok(PushMessage::new(data))).is_ok()
    }

    /// 投递一次传输层错误
    pub fn send_error(&self, error: StreamError) -> bool {
        self.tx.send(Err(error)).is_ok()
    }

    /// 订阅端是否已释放
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

#[async_trait]
impl TagStreamPort for ChannelTagStream {
    async fn connect(&self, endpoint: &str) -> Result<PushStream, StreamError> {
        let rx = self.receiver.lock().take().ok_or(StreamError::AlreadyConsumed)?;
        tracing::debug!(endpoint = %endpoint, "ChannelTagStream subscribed");

        let stream = futures_util::stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|item| (item, rx))
        });
        Ok(stream.boxed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_messages_flow_in_order() {
        let (port, sender) = ChannelTagStream::new();
        let stream = port.connect("local").await.unwrap();

        sender.send_data("a");
        sender.send_data("b");
        drop(sender);

        let items: Vec<_> = stream.collect().await;
        let data: Vec<_> = items.into_iter().map(|i| i.unwrap().data).collect();
        assert_eq!(data, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_single_subscription() {
        let (port, _sender) = ChannelTagStream::new();
        let _stream = port.connect("local").await.unwrap();
        assert!(matches!(port.connect("local").await, Err(StreamError::AlreadyConsumed)));
    }

    #[tokio::test]
    async fn test_sender_sees_release() {
        let (port, sender) = ChannelTagStream::new();
        let stream = port.connect("local").await.unwrap();
        assert!(!sender.is_closed());
        drop(stream);
        assert!(sender.is_closed());
    }
}
