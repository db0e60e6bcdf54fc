//! Playback Context - 进度比例

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 播放进度，取值 [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Progress(f32);

impl Progress {
    pub const ZERO: Progress = Progress(0.0);
    pub const COMPLETE: Progress = Progress(1.0);

    /// 构造并截断到 [0, 1]，NaN 视为 0
    pub fn new(ratio: f32) -> Self {
        if ratio.is_nan() {
            return Self::ZERO;
        }
        Self(ratio.clamp(0.0, 1.0))
    }

    /// 由播放位置和总时长计算；时长未知或为 0 时返回 0
    pub fn from_position(position: Duration, duration: Option<Duration>) -> Self {
        match duration {
            Some(total) if !total.is_zero() => {
                Self::new((position.as_secs_f64() / total.as_secs_f64()) as f32)
            }
            _ => Self::ZERO,
        }
    }

    pub fn ratio(&self) -> f32 {
        self.0
    }

    pub fn percent(&self) -> f32 {
        self.0 * 100.0
    }

    /// 同一会话内进度只增不减
    pub fn advance(self, sample: Progress) -> Progress {
        if sample.0 > self.0 {
            sample
        } else {
            self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamped() {
        assert_eq!(Progress::new(-0.5), Progress::ZERO);
        assert_eq!(Progress::new(1.3), Progress::COMPLETE);
        assert_eq!(Progress::new(f32::NAN), Progress::ZERO);
    }

    #[test]
    fn test_from_position() {
        let p = Progress::from_position(Duration::from_millis(750), Some(Duration::from_secs(3)));
        assert!((p.ratio() - 0.25).abs() < 1e-6);
        assert!((p.percent() - 25.0).abs() < 1e-4);
    }

    #[test]
    fn test_overshoot_is_clamped() {
        let p = Progress::from_position(Duration::from_millis(3050), Some(Duration::from_secs(3)));
        assert_eq!(p, Progress::COMPLETE);
    }

    #[test]
    fn test_unknown_duration() {
        assert_eq!(Progress::from_position(Duration::from_secs(2), None), Progress::ZERO);
        assert_eq!(Progress::from_position(Duration::from_secs(2), Some(Duration::ZERO)), Progress::ZERO);
    }

    #[test]
    fn test_advance_never_goes_back() {
        let p = Progress::new(0.4).advance(Progress::new(0.3));
        assert_eq!(p, Progress::new(0.4));
        assert_eq!(p.advance(Progress::new(0.6)), Progress::new(0.6));
    }
}
