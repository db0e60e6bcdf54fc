//! Tag Context - Entity

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

use super::{AudioRef, Classification, TagError, TagId};

/// 标签 - 一条被标记的发言及其对应的语音反驳/补充片段
///
/// 不变量:
/// - 创建后不可变
/// - id 在一次接收会话内唯一
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tag {
    id: TagId,
    content: String,
    received_at: DateTime<Utc>,
    audio_ref: AudioRef,
    #[serde(skip_serializing_if = "Option::is_none")]
    classification: Option<Classification>,
}

impl Tag {
    pub fn new(
        id: TagId,
        content: impl Into<String>,
        audio_ref: AudioRef,
        classification: Option<Classification>,
    ) -> Result<Self, TagError> {
        let content = content.into().trim().to_string();
        if content.is_empty() {
            return Err(TagError::EmptyContent);
        }
        Ok(Self {
            id,
            content,
            received_at: Utc::now(),
            audio_ref,
            classification,
        })
    }

    /// 由推送载荷合成标签，时间戳取到达时刻
    pub fn from_payload(payload: TagPayload) -> Result<Self, TagError> {
        let id = payload
            .id
            .filter(|id| !id.trim().is_empty())
            .map(TagId::from_string)
            .unwrap_or_default();
        let audio_ref = AudioRef::parse(payload.audio_url)?;
        let classification = payload
            .kind
            .as_deref()
            .and_then(Classification::parse)
            .or_else(|| {
                payload.is_true.map(|is_true| {
                    if is_true {
                        Classification::Enrichment
                    } else {
                        Classification::Misinformation
                    }
                })
            });
        Self::new(id, payload.justification, audio_ref, classification)
    }

    /// 解码一条推送消息
    pub fn decode(raw: &str) -> Result<Self, TagError> {
        let payload: TagPayload = serde_json::from_str(raw)?;
        Self::from_payload(payload)
    }

    pub fn id(&self) -> &TagId {
        &self.id
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn received_at(&self) -> DateTime<Utc> {
        self.received_at
    }

    pub fn audio_ref(&self) -> &AudioRef {
        &self.audio_ref
    }

    pub fn classification(&self) -> Option<Classification> {
        self.classification
    }

    /// 本地时间标签，如 "11:49:51 AM"
    pub fn timestamp_label(&self) -> String {
        self.received_at
            .with_timezone(&Local)
            .format("%-I:%M:%S %p")
            .to_string()
    }
}

/// 推送消息载荷
#[derive(Debug, Clone, Deserialize)]
pub struct TagPayload {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(alias = "content", alias = "text", alias = "message")]
    pub justification: String,

    #[serde(alias = "audio", alias = "audioRef", alias = "audio_ref", alias = "url", alias = "s3url")]
    pub audio_url: String,

    #[serde(default, rename = "type", alias = "classification")]
    pub kind: Option<String>,

    /// 发言是否属实：true 为补充，false 为纠错；`type` 优先
    #[serde(default, rename = "isTrue", alias = "is_true")]
    pub is_true: Option<bool>,
}
