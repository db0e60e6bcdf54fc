//! In-Memory Tag Feed Implementation

use dashmap::DashMap;
use parking_lot::RwLock;
use std::collections::VecDeque;
use std::sync::Arc;

use crate::application::ports::{FeedError, TagFeedPort};
use crate::domain::{Tag, TagId};

/// 内存标签序列
///
/// order 保存最新在前的 id 顺序，tags 为按 id 的索引。
/// 写入只发生在接收通道内，条目写入后不再修改或删除
pub struct InMemoryTagFeed {
    order: RwLock<VecDeque<TagId>>,
    tags: DashMap<TagId, Tag>,
}

impl InMemoryTagFeed {
    pub fn new() -> Self {
        Self {
            order: RwLock::new(VecDeque::new()),
            tags: DashMap::new(),
        }
    }

    /// 以静态数据预填充（按给定顺序依次前插）
    pub fn with_tags(tags: impl IntoIterator<Item = Tag>) -> Result<Self, FeedError> {
        let feed = Self::new();
        for tag in tags {
            feed.prepend(tag)?;
        }
        Ok(feed)
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }
}

impl Default for InMemoryTagFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl TagFeedPort for InMemoryTagFeed {
    fn prepend(&self, tag: Tag) -> Result<(), FeedError> {
        // 持有 order 写锁完成查重与插入
        let mut order = self.order.write();
        let id = tag.id().clone();
        if self.tags.contains_key(&id) {
            return Err(FeedError::AlreadyExists(id));
        }
        self.tags.insert(id.clone(), tag);
        order.push_front(id.clone());
        tracing::debug!(tag_id = %id, total = order.len(), "Tag prepended");
        Ok(())
    }

    fn list(&self) -> Vec<Tag> {
        self.order
            .read()
            .iter()
            .filter_map(|id| self.tags.get(id).map(|t| t.clone()))
            .collect()
    }

    fn get(&self, id: &TagId) -> Option<Tag> {
        self.tags.get(id).map(|t| t.clone())
    }

    fn len(&self) -> usize {
        self.order.read().len()
    }
}
