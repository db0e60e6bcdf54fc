//! Events - 浮层事件发布

mod publisher;

pub use publisher::{EventPublisher, OverlayEvent};
