//! Playback - 独占式音频播放编排
//!
//! - controller: 会话的开启、取代、停止
//! - sampler: 进度采样任务
//! - slot: 当前会话的可观测状态

mod controller;
mod sampler;
mod slot;

pub use controller::{PlaybackConfig, PlaybackController, SelectOutcome};
pub use slot::PlaybackSnapshot;

use thiserror::Error;

use crate::application::ports::TransportError;
use crate::domain::{SessionId, TagId};

/// 播放错误
#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("Failed to acquire audio for session {session_id}: {source}")]
    Acquire {
        session_id: SessionId,
        #[source]
        source: TransportError,
    },

    /// 会话切换任务异常结束（panic 或运行时关闭）
    #[error("Playback task for tag {tag_id} did not finish: {reason}")]
    Interrupted { tag_id: TagId, reason: String },
}
