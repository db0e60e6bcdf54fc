//! Tag Ingestion Channel - 标签推送接收通道
//!
//! 持有唯一一条长连接订阅，逐条解码推送消息并前插到标签序列。
//! 单条消息解码失败只丢弃该消息；订阅本身出错则关闭通道、不自动重连

use futures_util::StreamExt;
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::application::ports::{
    FeedError, NotificationCuePort, PushMessage, PushStream, StreamError, TagFeedPort, TagStreamPort,
};
use crate::domain::{Tag, TagError};
use crate::infrastructure::events::EventPublisher;

/// 通道错误
#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("Subscription failed: {0}")]
    Subscribe(#[from] StreamError),
}

/// 通道状态
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum ChannelStatus {
    Closed,
    Connecting,
    Open,
    Failed(String),
}

impl ChannelStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Closed => "closed",
            Self::Connecting => "connecting",
            Self::Open => "open",
            Self::Failed(_) => "failed",
        }
    }

    fn reason(&self) -> Option<&str> {
        match self {
            Self::Failed(reason) => Some(reason),
            _ => None,
        }
    }
}

/// 状态单元，变更时广播
struct StatusCell {
    status: RwLock<ChannelStatus>,
    publisher: Arc<EventPublisher>,
}

impl StatusCell {
    fn get(&self) -> ChannelStatus {
        self.status.read().clone()
    }

    fn set(&self, next: ChannelStatus) {
        let mut status = self.status.write();
        if *status == next {
            return;
        }
        tracing::info!(from = status.as_str(), to = next.as_str(), reason = ?next.reason(), "Channel status changed");
        self.publisher.publish_channel_status(next.as_str(), next.reason());
        *status = next;
    }
}

/// 消息解码与入列
struct Ingestor {
    feed: Arc<dyn TagFeedPort>,
    notifier: Arc<dyn NotificationCuePort>,
    publisher: Arc<EventPublisher>,
}

impl Ingestor {
    fn ingest(&self, message: PushMessage) {
        match self.accept(&message) {
            Ok(tag) => {
                tracing::info!(tag_id = %tag.id(), content = %tag.content(), "Tag received");
                self.notifier.cue(&tag);
                self.publisher.publish_tag_arrived(&tag);
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    event = ?message.event,
                    payload_len = message.data.len(),
                    "Dropping malformed push message"
                );
                self.publisher.publish_tag_rejected(&e.to_string());
            }
        }
    }

    fn accept(&self, message: &PushMessage) -> Result<Tag, TagError> {
        let tag = Tag::decode(&message.data)?;
        self.feed.prepend(tag.clone()).map_err(|e| match e {
            FeedError::AlreadyExists(id) => TagError::DuplicateId(id.to_string()),
        })?;
        Ok(tag)
    }
}

/// 当前订阅
struct Subscription {
    endpoint: String,
    token: CancellationToken,
    task: JoinHandle<()>,
}

impl Subscription {
    /// 取消并等待接收任务退出，释放底层连接
    async fn release(self) {
        self.token.cancel();
        if let Err(e) = self.task.await {
            if e.is_panic() {
                tracing::error!(endpoint = %self.endpoint, error = %e, "Ingestion task panicked");
            }
        }
    }
}

/// 标签接收通道
pub struct TagChannel {
    endpoint: String,
    stream: Arc<dyn TagStreamPort>,
    ingestor: Arc<Ingestor>,
    status: Arc<StatusCell>,
    subscription: tokio::sync::Mutex<Option<Subscription>>,
}

impl TagChannel {
    pub fn new(
        endpoint: impl Into<String>,
        stream: Arc<dyn TagStreamPort>,
        feed: Arc<dyn TagFeedPort>,
        notifier: Arc<dyn NotificationCuePort>,
        publisher: Arc<EventPublisher>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            stream,
            ingestor: Arc::new(Ingestor {
                feed,
                notifier,
                publisher: publisher.clone(),
            }),
            status: Arc::new(StatusCell {
                status: RwLock::new(ChannelStatus::Closed),
                publisher,
            }),
            subscription: tokio::sync::Mutex::new(None),
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn status(&self) -> ChannelStatus {
        self.status.get()
    }

    /// 订阅配置的 endpoint
    pub async fn open(&self) -> Result<(), ChannelError> {
        let endpoint = self.endpoint.clone();
        self.open_at(&endpoint).await
    }

    /// 订阅指定 endpoint；同一 endpoint 已打开时无操作
    pub async fn open_at(&self, endpoint: &str) -> Result<(), ChannelError> {
        let endpoint = endpoint.trim();
        if endpoint.is_empty() {
            return Err(ChannelError::InvalidEndpoint("endpoint is empty".to_string()));
        }

        let mut subscription = self.subscription.lock().await;
        if let Some(current) = subscription.as_ref() {
            if current.endpoint == endpoint && self.status.get() == ChannelStatus::Open {
                tracing::debug!(endpoint = %endpoint, "Channel already open");
                return Ok(());
            }
        }
        if let Some(previous) = subscription.take() {
            previous.release().await;
        }

        self.status.set(ChannelStatus::Connecting);
        let stream = match self.stream.connect(endpoint).await {
            Ok(stream) => stream,
            Err(e) => {
                tracing::error!(endpoint = %endpoint, error = %e, "Failed to open tag channel");
                self.status.set(ChannelStatus::Failed(e.to_string()));
                return Err(e.into());
            }
        };
        self.status.set(ChannelStatus::Open);

        let token = CancellationToken::new();
        let task = tokio::spawn(pump(
            stream,
            token.clone(),
            self.ingestor.clone(),
            self.status.clone(),
        ));
        *subscription = Some(Subscription {
            endpoint: endpoint.to_string(),
            token,
            task,
        });

        tracing::info!(endpoint = %endpoint, "Tag channel opened");
        Ok(())
    }

    /// 释放订阅；未打开时无操作
    pub async fn close(&self) {
        let mut subscription = self.subscription.lock().await;
        if let Some(current) = subscription.take() {
            let endpoint = current.endpoint.clone();
            current.release().await;
            self.status.set(ChannelStatus::Closed);
            tracing::info!(endpoint = %endpoint, "Tag channel closed");
        }
    }
}

impl Drop for TagChannel {
    fn drop(&mut self) {
        if let Some(subscription) = self.subscription.get_mut().take() {
            subscription.token.cancel();
            tracing::debug!(endpoint = %subscription.endpoint, "Tag channel released on drop");
        }
    }
}

/// 按接收顺序逐条处理推送消息
async fn pump(
    mut stream: PushStream,
    token: CancellationToken,
    ingestor: Arc<Ingestor>,
    status: Arc<StatusCell>,
) {
    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => break,
            next = stream.next() => match next {
                Some(Ok(message)) => ingestor.ingest(message),
                Some(Err(e)) => {
                    tracing::error!(error = %e, "Tag stream failed");
                    status.set(ChannelStatus::Failed(e.to_string()));
                    break;
                }
                None => {
                    tracing::warn!("Tag stream ended by server");
                    status.set(ChannelStatus::Failed("stream ended by server".to_string()));
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::adapters::{ChannelTagStream, PushSender};
    use crate::infrastructure::events::OverlayEvent;
    use crate::infrastructure::memory::InMemoryTagFeed;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[derive(Default)]
    struct CountingCue(AtomicUsize);

    impl NotificationCuePort for CountingCue {
        fn cue(&self, _tag: &Tag) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct Fixture {
        channel: TagChannel,
        sender: PushSender,
        feed: Arc<InMemoryTagFeed>,
        cue: Arc<CountingCue>,
        publisher: Arc<EventPublisher>,
    }

    fn fixture() -> Fixture {
        let (stream, sender) = ChannelTagStream::new();
        let feed = Arc::new(InMemoryTagFeed::new());
        let cue = Arc::new(CountingCue::default());
        let publisher = Arc::new(EventPublisher::new());
        let channel = TagChannel::new(
            "http://localhost:8000/events",
            Arc::new(stream),
            feed.clone(),
            cue.clone(),
            publisher.clone(),
        );
        Fixture {
            channel,
            sender,
            feed,
            cue,
            publisher,
        }
    }

    fn payload(n: usize) -> String {
        format!(r#"{{"justification": "claim {n}", "audio_url": "https://x.io/{n}.mp3"}}"#)
    }

    async fn settle() {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_n_payloads_yield_n_tags_newest_first() {
        let f = fixture();
        f.channel.open().await.unwrap();
        assert_eq!(f.channel.status(), ChannelStatus::Open);

        for n in 0..5 {
            assert!(f.sender.send_data(payload(n)));
        }
        settle().await;

        let tags = f.feed.list();
        assert_eq!(tags.len(), 5);
        let contents: Vec<_> = tags.iter().map(|t| t.content().to_string()).collect();
        assert_eq!(contents, vec!["claim 4", "claim 3", "claim 2", "claim 1", "claim 0"]);
        let ids: HashSet<_> = tags.iter().map(|t| t.id().clone()).collect();
        assert_eq!(ids.len(), 5);
        assert_eq!(f.cue.0.load(Ordering::SeqCst), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_malformed_payload_is_dropped() {
        let f = fixture();
        let mut rx = f.publisher.subscribe();
        f.channel.open().await.unwrap();

        f.sender.send_data(payload(0));
        f.sender.send_data("{not json");
        f.sender.send_data(r#"{"justification": "no audio"}"#);
        f.sender.send_data(payload(1));
        settle().await;

        assert_eq!(f.feed.len(), 2);
        assert_eq!(f.cue.0.load(Ordering::SeqCst), 2);
        assert_eq!(f.channel.status(), ChannelStatus::Open);

        let mut rejected = 0;
        while let Ok(event) = rx.try_recv() {
            if matches!(event, OverlayEvent::TagRejected { .. }) {
                rejected += 1;
            }
        }
        assert_eq!(rejected, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_duplicate_server_id_is_dropped() {
        let f = fixture();
        f.channel.open().await.unwrap();

        let dup = r#"{"id": "7", "justification": "a", "audio_url": "https://x.io/a.mp3"}"#;
        f.sender.send_data(dup);
        f.sender.send_data(dup);
        settle().await;

        assert_eq!(f.feed.len(), 1);
        assert_eq!(f.cue.0.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_open_is_idempotent() {
        let f = fixture();
        f.channel.open().await.unwrap();
        // 第二次 connect 会因流已被消费而失败，成功返回说明没有重连
        f.channel.open().await.unwrap();
        assert_eq!(f.channel.status(), ChannelStatus::Open);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transport_failure_closes_channel() {
        let f = fixture();
        let mut rx = f.publisher.subscribe();
        f.channel.open().await.unwrap();

        f.sender.send_data(payload(0));
        f.sender.send_error(StreamError::NetworkError("connection reset".into()));
        f.sender.send_data(payload(1));
        settle().await;

        assert!(matches!(f.channel.status(), ChannelStatus::Failed(_)));
        assert_eq!(f.feed.len(), 1);
        assert!(f.sender.is_closed());

        let mut failed = false;
        while let Ok(event) = rx.try_recv() {
            if let OverlayEvent::ChannelStatusChanged { status, error } = event {
                if status == "failed" {
                    assert!(error.unwrap().contains("connection reset"));
                    failed = true;
                }
            }
        }
        assert!(failed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_server_end_marks_failed() {
        let f = fixture();
        f.channel.open().await.unwrap();
        drop(f.sender);
        settle().await;
        assert!(matches!(f.channel.status(), ChannelStatus::Failed(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_connect_failure_is_reported() {
        let f = fixture();
        f.channel.open().await.unwrap();
        f.channel.close().await;

        let result = f.channel.open().await;
        assert!(matches!(result, Err(ChannelError::Subscribe(StreamError::AlreadyConsumed))));
        assert!(matches!(f.channel.status(), ChannelStatus::Failed(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_releases_subscription() {
        let f = fixture();
        f.channel.open().await.unwrap();
        f.channel.close().await;

        assert_eq!(f.channel.status(), ChannelStatus::Closed);
        assert!(f.sender.is_closed());
        assert!(!f.sender.send_data(payload(0)));

        // 重复关闭无副作用
        f.channel.close().await;
        assert_eq!(f.channel.status(), ChannelStatus::Closed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_releases_subscription() {
        let f = fixture();
        f.channel.open().await.unwrap();
        let sender = f.sender.clone();
        drop(f);
        settle().await;
        assert!(sender.is_closed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_endpoint_rejected() {
        let f = fixture();
        assert!(matches!(
            f.channel.open_at("  ").await,
            Err(ChannelError::InvalidEndpoint(_))
        ));
        assert_eq!(f.channel.status(), ChannelStatus::Closed);
    }
}
