//! 应用层错误定义
//!
//! 统一的用例错误类型

use thiserror::Error;

use crate::application::ingestion::ChannelError;
use crate::application::playback::PlaybackError;

/// 应用层错误
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// 资源未找到
    #[error("{resource_type} not found: {id}")]
    NotFound {
        resource_type: &'static str,
        id: String,
    },

    /// 验证错误
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// 外部服务错误
    #[error("External service error: {0}")]
    ExternalServiceError(String),

    /// 内部错误
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ApplicationError {
    /// 创建 NotFound 错误
    pub fn not_found(resource_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource_type,
            id: id.into(),
        }
    }

    /// 创建内部错误
    pub fn internal(message: impl Into<String>) -> Self {
        Self::InternalError(message.into())
    }
}

impl From<PlaybackError> for ApplicationError {
    fn from(err: PlaybackError) -> Self {
        match err {
            PlaybackError::Acquire { .. } => Self::ExternalServiceError(err.to_string()),
            PlaybackError::Interrupted { .. } => Self::internal(err.to_string()),
        }
    }
}

impl From<ChannelError> for ApplicationError {
    fn from(err: ChannelError) -> Self {
        match err {
            ChannelError::InvalidEndpoint(message) => Self::ValidationError(message),
            ChannelError::Subscribe(e) => Self::ExternalServiceError(e.to_string()),
        }
    }
}
