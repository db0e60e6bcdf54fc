//! Scripted Transport - 基于虚拟时钟的音频传输
//!
//! 不输出声音，按脚本模拟获取延迟、片段时长与失败；
//! 同时统计同时发声的句柄数峰值，用于验证播放互斥

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use crate::application::ports::{AudioTransportPort, TransportError, TransportHandle};
use crate::domain::AudioRef;

/// 单个音频片段的脚本
#[derive(Debug, Clone)]
pub struct ClipScript {
    /// 实际播放长度
    pub length: Duration,
    /// 是否向调用方报告时长
    pub reports_duration: bool,
    /// 获取延迟
    pub acquire_delay: Duration,
    /// 获取失败
    pub failure: Option<TransportError>,
}

impl ClipScript {
    pub fn new(length: Duration) -> Self {
        Self {
            length,
            reports_duration: true,
            acquire_delay: Duration::from_millis(20),
            failure: None,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.acquire_delay = delay;
        self
    }

    pub fn without_duration(mut self) -> Self {
        self.reports_duration = false;
        self
    }

    pub fn failing(mut self, error: TransportError) -> Self {
        self.failure = Some(error);
        self
    }
}

#[derive(Default)]
struct Meter {
    sounding: AtomicUsize,
    peak: AtomicUsize,
    started: AtomicUsize,
}

impl Meter {
    fn enter(&self) {
        let now = self.sounding.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        self.started.fetch_add(1, Ordering::SeqCst);
    }

    fn leave(&self) {
        self.sounding.fetch_sub(1, Ordering::SeqCst);
    }
}

/// 脚本化音频传输
pub struct ScriptedTransport {
    default_clip: ClipScript,
    clips: DashMap<String, ClipScript>,
    meter: Arc<Meter>,
    acquired: AtomicUsize,
}

impl ScriptedTransport {
    pub fn new(default_clip: ClipScript) -> Self {
        Self {
            default_clip,
            clips: DashMap::new(),
            meter: Arc::new(Meter::default()),
            acquired: AtomicUsize::new(0),
        }
    }

    pub fn with_clip(self, locator: &str, clip: ClipScript) -> Self {
        self.clips.insert(locator.to_string(), clip);
        self
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// 当前正在发声的句柄数
    pub fn sounding(&self) -> usize {
        self.meter.sounding.load(Ordering::SeqCst)
    }

    /// 同时发声句柄数的历史峰值
    pub fn peak_concurrent(&self) -> usize {
        self.meter.peak.load(Ordering::SeqCst)
    }

    /// 开始发声的句柄总数
    pub fn started(&self) -> usize {
        self.meter.started.load(Ordering::SeqCst)
    }

    /// 成功获取的次数
    pub fn acquired(&self) -> usize {
        self.acquired.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AudioTransportPort for ScriptedTransport {
    async fn acquire(&self, audio_ref: &AudioRef) -> Result<Arc<dyn TransportHandle>, TransportError> {
        let clip = self
            .clips
            .get(audio_ref.as_str())
            .map(|c| c.clone())
            .unwrap_or_else(|| self.default_clip.clone());

        tokio::time::sleep(clip.acquire_delay).await;

        if let Some(error) = clip.failure {
            tracing::debug!(audio_ref = %audio_ref, error = %error, "ScriptedTransport: scripted failure");
            return Err(error);
        }

        self.acquired.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(ScriptedHandle {
            length: clip.length,
            reports_duration: clip.reports_duration,
            started_at: Mutex::new(None),
            stopped: AtomicBool::new(false),
            sounding: AtomicBool::new(false),
            meter: self.meter.clone(),
        }))
    }
}

struct ScriptedHandle {
    length: Duration,
    reports_duration: bool,
    started_at: Mutex<Option<Instant>>,
    stopped: AtomicBool,
    sounding: AtomicBool,
    meter: Arc<Meter>,
}

impl ScriptedHandle {
    fn elapsed(&self) -> Option<Duration> {
        let started_at = *self.started_at.lock();
        started_at.map(|start| start.elapsed())
    }

    fn release(&self) {
        if self.sounding.swap(false, Ordering::SeqCst) {
            self.meter.leave();
        }
    }
}

impl TransportHandle for ScriptedHandle {
    fn play(&self) {
        if self.stopped.load(Ordering::SeqCst) {
            return;
        }
        let mut started_at = self.started_at.lock();
        if started_at.is_none() {
            *started_at = Some(Instant::now());
            self.sounding.store(true, Ordering::SeqCst);
            self.meter.enter();
        }
    }

    fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
        self.release();
    }

    fn position(&self) -> Duration {
        // 允许略微越过结尾，由进度换算负责截断
        self.elapsed().unwrap_or(Duration::ZERO)
    }

    fn duration(&self) -> Option<Duration> {
        self.reports_duration.then_some(self.length)
    }

    fn is_finished(&self) -> bool {
        if self.stopped.load(Ordering::SeqCst) {
            return false;
        }
        let finished = self.elapsed().is_some_and(|e| e >= self.length);
        if finished {
            self.release();
        }
        finished
    }
}
