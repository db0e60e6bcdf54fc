//! Playback Controller - 当前唯一音频会话的所有者
//!
//! 会话拆除（停止采样 + 停止传输）总是在下一会话的传输开始发声之前完成；
//! 获取音频期间不持锁，获取结果回来时按会话代号校验，过期句柄直接停止丢弃

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

use super::sampler::ProgressSampler;
use super::slot::{PlaybackSnapshot, SessionSlot};
use super::PlaybackError;
use crate::application::ports::{AudioTransportPort, TransportError, TransportHandle};
use crate::domain::{SessionId, Tag};
use crate::infrastructure::events::EventPublisher;

/// cancel_all 时调用的上下文清理钩子
pub type ContextHook = Box<dyn Fn() + Send + Sync>;

/// 播放控制器配置
#[derive(Debug, Clone)]
pub struct PlaybackConfig {
    /// 进度采样间隔
    pub sample_interval: Duration,
    /// 获取音频超时，None 表示不限
    pub acquire_timeout: Option<Duration>,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            sample_interval: Duration::from_millis(50),
            acquire_timeout: Some(Duration::from_secs(30)),
        }
    }
}

/// select 的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectOutcome {
    /// 会话已进入 Playing
    Playing(SessionId),
    /// 获取期间被后续操作取代，结果已丢弃
    Superseded(SessionId),
}

/// 正在进行的会话（Starting 时尚无句柄）
struct LiveSession {
    id: SessionId,
    handle: Option<Arc<dyn TransportHandle>>,
    sampler: Option<ProgressSampler>,
}

/// 播放控制器
pub struct PlaybackController {
    config: PlaybackConfig,
    transport: Arc<dyn AudioTransportPort>,
    slot: Arc<SessionSlot>,
    live: tokio::sync::Mutex<Option<LiveSession>>,
    hooks: Mutex<Vec<ContextHook>>,
    publisher: Arc<EventPublisher>,
}

impl PlaybackController {
    pub fn new(
        config: PlaybackConfig,
        transport: Arc<dyn AudioTransportPort>,
        publisher: Arc<EventPublisher>,
    ) -> Self {
        Self {
            config,
            transport,
            slot: Arc::new(SessionSlot::new(publisher.clone())),
            live: tokio::sync::Mutex::new(None),
            hooks: Mutex::new(Vec::new()),
            publisher,
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// 当前会话快照
    pub fn snapshot(&self) -> PlaybackSnapshot {
        self.slot.snapshot()
    }

    /// 注册 cancel_all 钩子
    pub fn on_cancel_all(&self, hook: impl Fn() + Send + Sync + 'static) {
        self.hooks.lock().push(Box::new(hook));
    }

    /// 播放标签对应的音频，无条件取代之前的会话
    ///
    /// 会话切换在独立任务中执行到底；调用方的 future 被丢弃（如 HTTP 客户端断开）
    /// 不会让会话停留在拆除一半或 Starting 的状态
    pub async fn select(self: &Arc<Self>, tag: Tag) -> Result<SelectOutcome, PlaybackError> {
        let this = Arc::clone(self);
        let tag_id = tag.id().clone();
        match tokio::spawn(async move { this.run_select(tag).await }).await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(tag_id = %tag_id, error = %e, "Select task did not finish");
                Err(PlaybackError::Interrupted {
                    tag_id,
                    reason: e.to_string(),
                })
            }
        }
    }

    async fn run_select(&self, tag: Tag) -> Result<SelectOutcome, PlaybackError> {
        let session_id = {
            let mut live = self.live.lock().await;
            if let Some(previous) = live.take() {
                self.teardown(previous).await;
            }
            let session_id = self.slot.begin(&tag);
            *live = Some(LiveSession {
                id: session_id,
                handle: None,
                sampler: None,
            });
            session_id
        };

        tracing::debug!(
            session_id = %session_id,
            tag_id = %tag.id(),
            audio_ref = %tag.audio_ref(),
            "Acquiring audio transport"
        );

        let acquired = self.acquire(&tag).await;

        let mut live = self.live.lock().await;
        let is_current = live.as_ref().is_some_and(|s| s.id == session_id);

        match acquired {
            Ok(handle) if is_current => {
                handle.play();
                if !self.slot.mark_playing(session_id) {
                    handle.stop();
                    *live = None;
                    return Ok(SelectOutcome::Superseded(session_id));
                }
                let sampler = ProgressSampler::spawn(
                    session_id,
                    handle.clone(),
                    self.slot.clone(),
                    self.config.sample_interval,
                );
                if let Some(session) = live.as_mut() {
                    session.handle = Some(handle);
                    session.sampler = Some(sampler);
                }
                Ok(SelectOutcome::Playing(session_id))
            }
            Ok(handle) => {
                handle.stop();
                tracing::debug!(session_id = %session_id, "Discarding transport for superseded session");
                Ok(SelectOutcome::Superseded(session_id))
            }
            Err(e) if is_current => {
                *live = None;
                tracing::error!(session_id = %session_id, tag_id = %tag.id(), error = %e, "Audio acquisition failed");
                self.slot.fail(session_id, &e.to_string());
                Err(PlaybackError::Acquire {
                    session_id,
                    source: e,
                })
            }
            Err(e) => {
                tracing::debug!(session_id = %session_id, error = %e, "Ignoring acquisition error for superseded session");
                Ok(SelectOutcome::Superseded(session_id))
            }
        }
    }

    /// 停止当前会话；无活动会话时无操作
    pub async fn stop(&self) {
        let mut live = self.live.lock().await;
        match live.take() {
            Some(session) => self.teardown(session).await,
            None => tracing::trace!("Stop requested with no live session"),
        }
    }

    /// stop() 并清理协作者持有的会话上下文；不清空标签序列
    pub async fn cancel_all(&self) {
        self.stop().await;
        for hook in self.hooks.lock().iter() {
            hook();
        }
        self.publisher.publish_context_cleared();
        tracing::info!("All playback context cancelled");
    }

    async fn acquire(&self, tag: &Tag) -> Result<Arc<dyn TransportHandle>, TransportError> {
        let fut = self.transport.acquire(tag.audio_ref());
        match self.config.acquire_timeout {
            Some(limit) => tokio::time::timeout(limit, fut)
                .await
                .unwrap_or(Err(TransportError::Timeout)),
            None => fut.await,
        }
    }

    /// 状态变更全部在第一个 await 之前完成；之后采样器的写入都会被拒绝
    async fn teardown(&self, session: LiveSession) {
        if self.slot.stop(session.id) {
            tracing::debug!(session_id = %session.id, "Session torn down");
        }
        if let Some(handle) = session.handle {
            handle.stop();
        }
        if let Some(sampler) = session.sampler {
            sampler.shutdown().await;
        }
    }
}

impl Drop for PlaybackController {
    fn drop(&mut self) {
        if let Some(session) = self.live.get_mut().take() {
            if let Some(handle) = session.handle {
                handle.stop();
            }
        }
    }
}
