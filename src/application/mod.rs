//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（TagStream、TagFeed、AudioTransport、NotificationCue）
//! - ingestion: 推送订阅与标签入列
//! - playback: 独占式播放会话
//! - overlay: 面向浮层的用例入口
//! - error: 应用层错误定义

pub mod error;
pub mod ingestion;
pub mod overlay;
pub mod playback;
pub mod ports;

pub use error::ApplicationError;
pub use ingestion::{ChannelError, ChannelStatus, TagChannel};
pub use overlay::Overlay;
pub use playback::{PlaybackConfig, PlaybackController, PlaybackError, PlaybackSnapshot, SelectOutcome};

pub use ports::{
    AudioTransportPort, FeedError, NotificationCuePort, PushMessage, PushStream, StreamError, TagFeedPort,
    TagStreamPort, TransportError, TransportHandle,
};
