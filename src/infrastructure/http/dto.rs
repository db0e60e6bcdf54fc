//! Data Transfer Objects

use serde::{Deserialize, Serialize};

use crate::application::{ChannelStatus, PlaybackSnapshot, SelectOutcome};
use crate::domain::Tag;

// ============================================================================
// 统一响应结构
// ============================================================================

/// 统一 API 响应格式
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub errno: i32,
    pub error: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// 成功响应
    pub fn success(data: T) -> Self {
        Self {
            errno: 0,
            error: String::new(),
            data: Some(data),
        }
    }
}

/// 空数据响应
#[derive(Debug, Serialize)]
pub struct Empty {}

impl ApiResponse<Empty> {
    /// 成功但无数据
    pub fn ok() -> Self {
        Self {
            errno: 0,
            error: String::new(),
            data: Some(Empty {}),
        }
    }
}

// ============================================================================
// Tag DTOs
// ============================================================================

#[derive(Debug, Serialize)]
pub struct TagResponse {
    pub id: String,
    pub content: String,
    /// 本地时区 12 小时制到达时间
    pub timestamp: String,
    pub received_at: String,
    pub audio_url: String,
    pub classification: Option<&'static str>,
}

impl From<&Tag> for TagResponse {
    fn from(tag: &Tag) -> Self {
        Self {
            id: tag.id().to_string(),
            content: tag.content().to_string(),
            timestamp: tag.timestamp_label(),
            received_at: tag.received_at().to_rfc3339(),
            audio_url: tag.audio_ref().to_string(),
            classification: tag.classification().map(|c| c.as_str()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TagListResponse {
    pub total: usize,
    pub tags: Vec<TagResponse>,
}

// ============================================================================
// Playback DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SelectTagRequest {
    pub tag_id: String,
}

#[derive(Debug, Serialize)]
pub struct SelectTagResponse {
    pub session_id: u64,
    /// playing | superseded
    pub outcome: &'static str,
}

impl From<SelectOutcome> for SelectTagResponse {
    fn from(outcome: SelectOutcome) -> Self {
        match outcome {
            SelectOutcome::Playing(id) => Self {
                session_id: id.as_u64(),
                outcome: "playing",
            },
            SelectOutcome::Superseded(id) => Self {
                session_id: id.as_u64(),
                outcome: "superseded",
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PlaybackResponse {
    pub session_id: u64,
    pub state: &'static str,
    pub progress: f32,
    pub active_tag_id: Option<String>,
}

impl From<PlaybackSnapshot> for PlaybackResponse {
    fn from(snapshot: PlaybackSnapshot) -> Self {
        Self {
            session_id: snapshot.session_id.as_u64(),
            state: snapshot.state.as_str(),
            progress: snapshot.progress.ratio(),
            active_tag_id: snapshot.active_tag.map(|t| t.id().to_string()),
        }
    }
}

// ============================================================================
// Channel DTOs
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct OpenChannelRequest {
    /// 为空时使用配置的 endpoint
    #[serde(default)]
    pub endpoint: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChannelResponse {
    pub status: &'static str,
    pub reason: Option<String>,
}

impl From<ChannelStatus> for ChannelResponse {
    fn from(status: ChannelStatus) -> Self {
        let name = status.as_str();
        let reason = match status {
            ChannelStatus::Failed(reason) => Some(reason),
            _ => None,
        };
        Self { status: name, reason }
    }
}
