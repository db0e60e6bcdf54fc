//! Overlay - 浮层用例入口
//!
//! 组合标签序列、接收通道与播放控制器，对外暴露按标签 id 操作的用例

use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::ingestion::{ChannelStatus, TagChannel};
use crate::application::playback::{PlaybackController, PlaybackSnapshot, SelectOutcome};
use crate::application::ports::TagFeedPort;
use crate::domain::{Tag, TagId};

pub struct Overlay {
    feed: Arc<dyn TagFeedPort>,
    channel: Arc<TagChannel>,
    playback: Arc<PlaybackController>,
}

impl Overlay {
    pub fn new(feed: Arc<dyn TagFeedPort>, channel: Arc<TagChannel>, playback: Arc<PlaybackController>) -> Self {
        Self {
            feed,
            channel,
            playback,
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// 全部标签，最新在前
    pub fn tags(&self) -> Vec<Tag> {
        self.feed.list()
    }

    pub fn playback(&self) -> PlaybackSnapshot {
        self.playback.snapshot()
    }

    pub fn channel_status(&self) -> ChannelStatus {
        self.channel.status()
    }

    /// 选中标签并播放其音频
    pub async fn select_tag(&self, tag_id: &TagId) -> Result<SelectOutcome, ApplicationError> {
        let tag = self
            .feed
            .get(tag_id)
            .ok_or_else(|| ApplicationError::not_found("Tag", tag_id.as_str()))?;

        tracing::info!(tag_id = %tag_id, "Tag selected");
        Ok(self.playback.select(tag).await?)
    }

    pub async fn stop(&self) {
        self.playback.stop().await;
    }

    pub async fn cancel_all(&self) {
        self.playback.cancel_all().await;
    }

    /// 打开接收通道；endpoint 为空时使用配置的地址
    pub async fn open_channel(&self, endpoint: Option<&str>) -> Result<ChannelStatus, ApplicationError> {
        match endpoint {
            Some(endpoint) => self.channel.open_at(endpoint).await?,
            None => self.channel.open().await?,
        }
        Ok(self.channel.status())
    }

    pub async fn close_channel(&self) -> ChannelStatus {
        self.channel.close().await;
        self.channel.status()
    }

    /// 停止播放并释放订阅
    pub async fn shutdown(&self) {
        self.playback.stop().await;
        self.channel.close().await;
        tracing::info!("Overlay shut down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::playback::PlaybackConfig;
    use crate::domain::PlaybackState;
    use crate::infrastructure::adapters::{ChannelTagStream, ClipScript, LogNotifier, PushSender, ScriptedTransport};
    use crate::infrastructure::events::EventPublisher;
    use crate::infrastructure::memory::InMemoryTagFeed;
    use std::time::Duration;

    fn overlay() -> (Overlay, PushSender, Arc<ScriptedTransport>) {
        let publisher = EventPublisher::new().arc();
        let feed = InMemoryTagFeed::new().arc();
        let (stream, sender) = ChannelTagStream::new();
        let channel = TagChannel::new(
            "http://localhost:8000/events",
            Arc::new(stream),
            feed.clone(),
            Arc::new(LogNotifier::new()),
            publisher.clone(),
        )
        .arc();
        let transport = ScriptedTransport::new(ClipScript::new(Duration::from_secs(1))).arc();
        let playback =
            PlaybackController::new(PlaybackConfig::default(), transport.clone(), publisher).arc();
        (Overlay::new(feed, channel, playback), sender, transport)
    }

    #[tokio::test(start_paused = true)]
    async fn test_select_unknown_tag_is_not_found() {
        let (overlay, _sender, transport) = overlay();
        let result = overlay.select_tag(&TagId::from("missing")).await;
        assert!(matches!(result, Err(ApplicationError::NotFound { .. })));
        assert_eq!(transport.acquired(), 0);
        assert_eq!(overlay.playback().state, PlaybackState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_select_received_tag_plays() {
        let (overlay, sender, _transport) = overlay();
        overlay.open_channel(None).await.unwrap();
        sender.send_data(r#"{"id": "t1", "justification": "claim", "audio_url": "https://x.io/1.mp3"}"#);
        tokio::time::sleep(Duration::from_millis(5)).await;

        assert_eq!(overlay.tags().len(), 1);
        let outcome = overlay.select_tag(&TagId::from("t1")).await.unwrap();
        assert!(matches!(outcome, SelectOutcome::Playing(_)));

        let snapshot = overlay.playback();
        assert_eq!(snapshot.state, PlaybackState::Playing);
        assert_eq!(snapshot.active_tag.map(|t| t.id().clone()), Some(TagId::from("t1")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_all_keeps_tags() {
        let (overlay, sender, _transport) = overlay();
        overlay.open_channel(None).await.unwrap();
        sender.send_data(r#"{"id": "t1", "justification": "claim", "audio_url": "https://x.io/1.mp3"}"#);
        tokio::time::sleep(Duration::from_millis(5)).await;

        overlay.select_tag(&TagId::from("t1")).await.unwrap();
        overlay.cancel_all().await;

        assert_eq!(overlay.playback().state, PlaybackState::Stopped);
        assert_eq!(overlay.tags().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_releases_everything() {
        let (overlay, sender, transport) = overlay();
        overlay.open_channel(None).await.unwrap();
        sender.send_data(r#"{"id": "t1", "justification": "claim", "audio_url": "https://x.io/1.mp3"}"#);
        tokio::time::sleep(Duration::from_millis(5)).await;
        overlay.select_tag(&TagId::from("t1")).await.unwrap();

        overlay.shutdown().await;

        assert_eq!(transport.sounding(), 0);
        assert_eq!(overlay.channel_status(), ChannelStatus::Closed);
        assert!(sender.is_closed());
    }
}
