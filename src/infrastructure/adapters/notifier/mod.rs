//! Notification Cue Adapters - 新标签提示
//!
//! - ChimeNotifier: 短促正弦提示音
//! - LogNotifier: 只记录日志（无音频设备时使用）

use rodio::source::{SineWave, Source};
use std::sync::Arc;
use std::time::Duration;

use super::audio::AudioOutput;
use crate::application::ports::NotificationCuePort;
use crate::domain::Tag;

/// 提示音配置
#[derive(Debug, Clone)]
pub struct ChimeConfig {
    pub frequency_hz: f32,
    pub duration: Duration,
    pub amplitude: f32,
}

impl Default for ChimeConfig {
    fn default() -> Self {
        Self {
            frequency_hz: 880.0,
            duration: Duration::from_millis(150),
            amplitude: 0.2,
        }
    }
}

/// 提示音通知
///
/// 每次提示使用独立的分离 Sink，与当前播放会话互不影响
pub struct ChimeNotifier {
    output: Arc<AudioOutput>,
    config: ChimeConfig,
}

impl ChimeNotifier {
    pub fn new(output: Arc<AudioOutput>, config: ChimeConfig) -> Self {
        Self { output, config }
    }
}

impl NotificationCuePort for ChimeNotifier {
    fn cue(&self, tag: &Tag) {
        match self.output.sink() {
            Ok(sink) => {
                let tone = SineWave::new(self.config.frequency_hz)
                    .take_duration(self.config.duration)
                    .amplify(self.config.amplitude);
                sink.append(tone);
                sink.detach();
                tracing::trace!(tag_id = %tag.id(), "Chime played");
            }
            Err(e) => {
                tracing::warn!(tag_id = %tag.id(), error = %e, "Failed to play chime");
            }
        }
    }
}

/// 日志通知
#[derive(Debug, Default)]
pub struct LogNotifier;

impl LogNotifier {
    pub fn new() -> Self {
        Self
    }
}

impl NotificationCuePort for LogNotifier {
    fn cue(&self, tag: &Tag) {
        tracing::info!(
            tag_id = %tag.id(),
            classification = ?tag.classification(),
            "New tag notification"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AudioRef, TagId};

    #[test]
    fn test_log_notifier_does_not_block() {
        let tag = Tag::new(
            TagId::new(),
            "claim",
            AudioRef::parse("https://x.io/a.mp3").unwrap(),
            None,
        )
        .unwrap();
        LogNotifier::new().cue(&tag);
    }

    #[test]
    fn test_chime_defaults() {
        let config = ChimeConfig::default();
        assert_eq!(config.frequency_hz, 880.0);
        assert_eq!(config.duration, Duration::from_millis(150));
    }
}
