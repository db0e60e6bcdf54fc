//! Playback Context - 播放限界上下文
//!
//! 职责:
//! - 会话状态机
//! - 进度比例
//! - 会话代号（用于丢弃过期回调）

mod progress;
mod state;

pub use progress::Progress;
pub use state::{InvalidTransition, PlaybackState};

use serde::{Deserialize, Serialize};

/// 播放会话标识
///
/// 单调递增的代号；每个异步回调都携带创建它的会话代号，
/// 与当前代号不一致的回调一律丢弃
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(u64);

impl SessionId {
    pub fn new(generation: u64) -> Self {
        Self(generation)
    }

    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
