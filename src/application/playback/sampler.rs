//! Progress Sampler - 定时读取传输位置并换算进度
//!
//! 每个 Playing 会话一个采样任务；会话被停止或取代时先取消再 join，
//! 保证拆除完成后不会再有任何进度写入

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use super::slot::SessionSlot;
use crate::application::ports::TransportHandle;
use crate::domain::{Progress, SessionId};

pub(crate) struct ProgressSampler {
    token: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl ProgressSampler {
    pub(crate) fn spawn(
        session_id: SessionId,
        handle: Arc<dyn TransportHandle>,
        slot: Arc<SessionSlot>,
        interval: Duration,
    ) -> Self {
        let token = CancellationToken::new();
        let cancelled = token.clone();

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    biased;
                    _ = cancelled.cancelled() => {
                        tracing::trace!(session_id = %session_id, "Sampler cancelled");
                        break;
                    }
                    _ = ticker.tick() => {
                        if handle.is_finished() {
                            if slot.complete(session_id) {
                                tracing::debug!(session_id = %session_id, "Playback reached end of media");
                            }
                            break;
                        }

                        let sample = Progress::from_position(handle.position(), handle.duration());
                        if !slot.record_progress(session_id, sample) {
                            break;
                        }
                    }
                }
            }
        });

        Self {
            token,
            task: Some(task),
        }
    }

    /// 取消并等待采样任务退出
    pub(crate) async fn shutdown(mut self) {
        self.token.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                if e.is_panic() {
                    tracing::error!(error = %e, "Progress sampler panicked");
                }
            }
        }
    }
}

impl Drop for ProgressSampler {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
