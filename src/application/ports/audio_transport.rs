//! Audio Transport Port - 音频传输抽象
//!
//! 定义按定位符获取并播放音频的接口，具体实现在 infrastructure/adapters 层

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::domain::AudioRef;

/// 音频传输错误
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    #[error("Audio resource not found: {0}")]
    NotFound(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Decode error: {0}")]
    DecodeError(String),

    #[error("Audio output error: {0}")]
    OutputError(String),

    #[error("Acquire timeout")]
    Timeout,
}

/// 一次会话独占的传输句柄
///
/// 由控制器与该会话的进度采样器共享，会话结束后即弃用
pub trait TransportHandle: Send + Sync {
    /// 开始发声；acquire 返回的句柄处于静默状态
    fn play(&self);

    /// 停止并释放底层音源，可重复调用
    fn stop(&self);

    /// 当前播放位置
    fn position(&self) -> Duration;

    /// 总时长（未知时为 None）
    fn duration(&self) -> Option<Duration>;

    /// 是否已自然播完
    fn is_finished(&self) -> bool;
}

/// Audio Transport Port
#[async_trait]
pub trait AudioTransportPort: Send + Sync {
    /// 获取（拉取 + 解码）音频，返回尚未发声的句柄
    async fn acquire(&self, audio_ref: &AudioRef) -> Result<Arc<dyn TransportHandle>, TransportError>;
}
