//! Session Slot - 当前播放会话的唯一可观测状态
//!
//! 所有写入都带会话代号校验，代号过期的写入被丢弃且不可见

use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;

use crate::domain::{PlaybackState, Progress, SessionId, Tag};
use crate::infrastructure::events::EventPublisher;

/// 面向协作者的播放状态快照
#[derive(Debug, Clone, Default, Serialize)]
pub struct PlaybackSnapshot {
    pub session_id: SessionId,
    pub active_tag: Option<Tag>,
    pub state: PlaybackState,
    pub progress: Progress,
}

pub(crate) struct SessionSlot {
    snapshot: Mutex<PlaybackSnapshot>,
    publisher: Arc<EventPublisher>,
}

impl SessionSlot {
    pub(crate) fn new(publisher: Arc<EventPublisher>) -> Self {
        Self {
            snapshot: Mutex::new(PlaybackSnapshot::default()),
            publisher,
        }
    }

    pub(crate) fn snapshot(&self) -> PlaybackSnapshot {
        self.snapshot.lock().clone()
    }

    /// 开启新会话，进入 Starting
    ///
    /// 上一会话仍处于活动状态时先强制停止
    pub(crate) fn begin(&self, tag: &Tag) -> SessionId {
        let mut snap = self.snapshot.lock();
        if snap.state.is_active() {
            let orphaned = snap.session_id;
            tracing::warn!(session_id = %orphaned, state = %snap.state, "Forcing stop of orphaned session");
            if self.apply(&mut snap, orphaned, PlaybackState::Stopped) {
                snap.progress = Progress::ZERO;
            }
        }

        let session_id = snap.session_id.next();
        *snap = PlaybackSnapshot {
            session_id,
            active_tag: Some(tag.clone()),
            state: PlaybackState::Idle,
            progress: Progress::ZERO,
        };
        self.apply(&mut snap, session_id, PlaybackState::Starting);
        session_id
    }

    /// Starting -> Playing
    pub(crate) fn mark_playing(&self, session_id: SessionId) -> bool {
        let mut snap = self.snapshot.lock();
        if !self.admits(&snap, session_id, "mark_playing") {
            return false;
        }
        self.apply(&mut snap, session_id, PlaybackState::Playing)
    }

    /// 写入采样进度；返回 false 表示采样器应退出
    pub(crate) fn record_progress(&self, session_id: SessionId, sample: Progress) -> bool {
        let mut snap = self.snapshot.lock();
        if !self.admits(&snap, session_id, "progress") || snap.state != PlaybackState::Playing {
            return false;
        }
        let next = snap.progress.advance(sample);
        if next != snap.progress {
            snap.progress = next;
            self.publisher.publish_progress(session_id, next);
        }
        true
    }

    /// 自然播完：Playing -> Completed，进度强制为 1.0
    pub(crate) fn complete(&self, session_id: SessionId) -> bool {
        let mut snap = self.snapshot.lock();
        if !self.admits(&snap, session_id, "complete") {
            return false;
        }
        if !self.apply(&mut snap, session_id, PlaybackState::Completed) {
            return false;
        }
        snap.progress = Progress::COMPLETE;
        self.publisher.publish_progress(session_id, Progress::COMPLETE);
        true
    }

    /// 停止活动会话并将进度清零；非活动会话不做任何修改
    pub(crate) fn stop(&self, session_id: SessionId) -> bool {
        let mut snap = self.snapshot.lock();
        if snap.session_id != session_id || !snap.state.is_active() {
            return false;
        }
        if !self.apply(&mut snap, session_id, PlaybackState::Stopped) {
            return false;
        }
        snap.progress = Progress::ZERO;
        true
    }

    /// 获取失败：Starting -> Stopped 并上报错误
    pub(crate) fn fail(&self, session_id: SessionId, error: &str) -> bool {
        if !self.stop(session_id) {
            return false;
        }
        let snap = self.snapshot.lock();
        if let Some(tag) = snap.active_tag.as_ref() {
            self.publisher.publish_playback_failed(session_id, tag.id(), error);
        }
        true
    }

    fn admits(&self, snap: &PlaybackSnapshot, session_id: SessionId, what: &'static str) -> bool {
        if snap.session_id == session_id {
            return true;
        }
        tracing::debug!(
            stale_session = %session_id,
            current_session = %snap.session_id,
            callback = what,
            "Discarding callback for superseded session"
        );
        false
    }

    fn apply(&self, snap: &mut PlaybackSnapshot, session_id: SessionId, next: PlaybackState) -> bool {
        match snap.state.transition(next) {
            Ok(state) => {
                snap.state = state;
                let tag_id = snap.active_tag.as_ref().map(|t| t.id().clone()).unwrap_or_default();
                tracing::info!(session_id = %session_id, tag_id = %tag_id, state = %state, "Playback state changed");
                self.publisher.publish_playback_state(session_id, &tag_id, state);
                true
            }
            Err(e) => {
                tracing::debug!(session_id = %session_id, error = %e, "Ignoring playback transition");
                false
            }
        }
    }
}
