//! Memory Layer - In-Memory State Management
//!
//! 实现 TagFeed，保存本次会话内接收到的标签

mod tag_feed;

pub use tag_feed::InMemoryTagFeed;
