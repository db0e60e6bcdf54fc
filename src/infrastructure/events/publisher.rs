//! Event Publisher Implementation
//!
//! 浮层事件广播：既是观测状态的推送通道，也是解码/传输错误的上报出口

use serde::Serialize;
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::domain::{PlaybackState, Progress, SessionId, Tag, TagId};

/// 广播通道容量（进度事件约每 50ms 一条）
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// 浮层事件类型
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "data")]
pub enum OverlayEvent {
    /// 新标签到达
    TagArrived { tag: Tag },
    /// 推送消息被丢弃
    TagRejected { reason: String },
    /// 通道状态变更
    ChannelStatusChanged {
        status: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
    /// 播放会话状态变更
    PlaybackStateChanged {
        session_id: SessionId,
        tag_id: TagId,
        state: PlaybackState,
    },
    /// 播放进度
    PlaybackProgress {
        session_id: SessionId,
        progress: Progress,
    },
    /// 音频获取失败
    PlaybackFailed {
        session_id: SessionId,
        tag_id: TagId,
        error: String,
    },
    /// cancel_all 清理了会话上下文
    ContextCleared,
}

/// 事件发布器
pub struct EventPublisher {
    channel: broadcast::Sender<OverlayEvent>,
}

impl EventPublisher {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { channel: tx }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// 订阅全部事件
    pub fn subscribe(&self) -> broadcast::Receiver<OverlayEvent> {
        self.channel.subscribe()
    }

    /// 发布标签到达事件
    pub fn publish_tag_arrived(&self, tag: &Tag) {
        self.publish(OverlayEvent::TagArrived { tag: tag.clone() });
    }

    /// 发布消息丢弃事件
    pub fn publish_tag_rejected(&self, reason: &str) {
        self.publish(OverlayEvent::TagRejected {
            reason: reason.to_string(),
        });
    }

    /// 发布通道状态事件
    pub fn publish_channel_status(&self, status: &str, error: Option<&str>) {
        self.publish(OverlayEvent::ChannelStatusChanged {
            status: status.to_string(),
            error: error.map(str::to_string),
        });
    }

    /// 发布播放状态事件
    pub fn publish_playback_state(&self, session_id: SessionId, tag_id: &TagId, state: PlaybackState) {
        self.publish(OverlayEvent::PlaybackStateChanged {
            session_id,
            tag_id: tag_id.clone(),
            state,
        });
    }

    /// 发布播放进度事件
    pub fn publish_progress(&self, session_id: SessionId, progress: Progress) {
        self.publish(OverlayEvent::PlaybackProgress {
            session_id,
            progress,
        });
    }

    /// 发布音频获取失败事件
    pub fn publish_playback_failed(&self, session_id: SessionId, tag_id: &TagId, error: &str) {
        self.publish(OverlayEvent::PlaybackFailed {
            session_id,
            tag_id: tag_id.clone(),
            error: error.to_string(),
        });
    }

    /// 发布上下文清理事件
    pub fn publish_context_cleared(&self) {
        self.publish(OverlayEvent::ContextCleared);
    }

    fn publish(&self, event: OverlayEvent) {
        if let Err(e) = self.channel.send(event) {
            tracing::trace!(error = %e, "Failed to publish event (no receivers)");
        }
    }
}

impl Default for EventPublisher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_without_subscribers_is_harmless() {
        let publisher = EventPublisher::new();
        publisher.publish_context_cleared();
    }

    #[tokio::test]
    async fn test_subscriber_receives_events_in_order() {
        let publisher = EventPublisher::new();
        let mut rx = publisher.subscribe();

        publisher.publish_tag_rejected("bad json");
        publisher.publish_channel_status("open", None);

        assert!(matches!(rx.recv().await.unwrap(), OverlayEvent::TagRejected { .. }));
        assert!(matches!(
            rx.recv().await.unwrap(),
            OverlayEvent::ChannelStatusChanged { ref status, error: None } if status == "open"
        ));
    }

    #[test]
    fn test_event_wire_format() {
        let event = OverlayEvent::PlaybackProgress {
            session_id: SessionId::new(3),
            progress: Progress::new(0.5),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "PlaybackProgress");
        assert_eq!(json["data"]["session_id"], 3);
        assert_eq!(json["data"]["progress"], 0.5);
    }
}
