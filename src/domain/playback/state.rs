//! Playback Context - 会话状态机

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 非法状态迁移
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid playback transition: {from:?} -> {to:?}")]
pub struct InvalidTransition {
    pub from: PlaybackState,
    pub to: PlaybackState,
}

/// 播放会话状态
///
/// Idle -> Starting -> Playing -> {Completed | Stopped}
/// Starting -> Stopped（获取失败、被取代或手动停止）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackState {
    #[default]
    Idle,
    Starting,
    Playing,
    Completed,
    Stopped,
}

impl PlaybackState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Starting => "starting",
            Self::Playing => "playing",
            Self::Completed => "completed",
            Self::Stopped => "stopped",
        }
    }

    /// Starting 或 Playing
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Starting | Self::Playing)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Stopped)
    }

    pub fn can_transition_to(&self, next: PlaybackState) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Starting)
                | (Self::Starting, Self::Playing)
                | (Self::Starting, Self::Stopped)
                | (Self::Playing, Self::Completed)
                | (Self::Playing, Self::Stopped)
        )
    }

    pub fn transition(self, next: PlaybackState) -> Result<PlaybackState, InvalidTransition> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(InvalidTransition { from: self, to: next })
        }
    }
}

impl std::fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
