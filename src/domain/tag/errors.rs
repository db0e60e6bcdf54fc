//! Tag Context - Errors

use thiserror::Error;

/// 推送消息解码错误
///
/// 单条消息解码失败不影响通道，消息被丢弃
#[derive(Debug, Error)]
pub enum TagError {
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("Missing justification text")]
    EmptyContent,

    #[error("Invalid audio locator: {0}")]
    InvalidAudioRef(String),

    #[error("Duplicate tag id: {0}")]
    DuplicateId(String),
}

impl From<serde_json::Error> for TagError {
    fn from(err: serde_json::Error) -> Self {
        TagError::MalformedPayload(err.to_string())
    }
}
