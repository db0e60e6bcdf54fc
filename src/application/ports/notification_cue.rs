//! Notification Cue Port - 新标签到达提示

use crate::domain::Tag;

/// Notification Cue Port
///
/// 每条成功解码的标签触发一次，实现方不得阻塞调用方
pub trait NotificationCuePort: Send + Sync {
    fn cue(&self, tag: &Tag);
}
