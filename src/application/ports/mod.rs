//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod audio_transport;
mod notification_cue;
mod tag_feed;
mod tag_stream;

pub use audio_transport::{AudioTransportPort, TransportError, TransportHandle};
pub use notification_cue::NotificationCuePort;
pub use tag_feed::{FeedError, TagFeedPort};
pub use tag_stream::{PushMessage, PushStream, StreamError, TagStreamPort};
