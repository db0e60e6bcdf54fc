//! Tag Feed Port - 标签有序序列
//!
//! 仅接收通道写入（前插），其他协作者只读

use thiserror::Error;

use crate::domain::{Tag, TagId};

/// 标签序列错误
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("Tag already exists: {0}")]
    AlreadyExists(TagId),
}

/// Tag Feed Port
pub trait TagFeedPort: Send + Sync {
    /// 前插一条标签（最新在前），重复 id 拒绝
    fn prepend(&self, tag: Tag) -> Result<(), FeedError>;

    /// 最新在前的完整序列
    fn list(&self) -> Vec<Tag>;

    /// 按 id 查找
    fn get(&self, id: &TagId) -> Option<Tag>;

    fn contains(&self, id: &TagId) -> bool {
        self.get(id).is_some()
    }

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
