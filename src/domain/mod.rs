//! Domain Layer - 领域层
//!
//! 包含两个限界上下文:
//! - Tag Context: 标签记录与推送载荷
//! - Playback Context: 播放会话状态机与进度

pub mod playback;
pub mod tag;

pub use playback::{PlaybackState, Progress, SessionId};
pub use tag::{AudioRef, Classification, Tag, TagError, TagId};
